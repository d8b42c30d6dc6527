//! The confidence report: score blend, label ladder, trend and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::results::{self, AttemptResults};
use crate::{is_pronunciation_type, type_weight};

/// How many history entries a learner's confidence document keeps. Oldest
/// entries are dropped first.
pub const MAX_HISTORY_ENTRIES: usize = 20;

/// Minimum gap between the current score and the trailing mean before the
/// trend leaves "stable".
const TREND_THRESHOLD: f64 = 3.0;

/// How many prior history entries the trend comparison looks back over.
const TREND_WINDOW: usize = 3;

/// The most recent completed attempt of one completed assignment, reduced to
/// what the aggregator needs.
#[derive(Debug, Clone)]
pub struct CompletedAttempt {
    /// Stored drill-type tag. Kept as a string so retired types survive.
    pub drill_type: String,
    /// The attempt's raw overall score, if one was recorded.
    pub score: Option<f64>,
    /// Parsed type-specific payload, if the stored JSON matched a known shape.
    pub results: Option<AttemptResults>,
}

/// Categorical label derived from the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Average,
    Developing,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl ConfidenceLabel {
    /// Human-readable form, as stored and served.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Developing => "Developing",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Direction the confidence score is moving in, relative to recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

/// One snapshot in a learner's confidence history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub score: i32,
    pub label: ConfidenceLabel,
    pub computed_at: DateTime<Utc>,
    pub drills_completed: i64,
}

/// Everything one confidence computation produces, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBreakdown {
    pub drills_assigned: i64,
    pub drills_completed: i64,
    pub completion_rate: f64,
    pub completion_contribution: f64,
    pub quality_score: f64,
    pub quality_contribution: f64,
    pub pronunciation_confidence: f64,
    pub completion_confidence: f64,
    pub confidence_score: i32,
    pub label: ConfidenceLabel,
    pub trend: Trend,
}

impl ConfidenceBreakdown {
    /// The document persisted for a learner with no assignments at all.
    pub const fn zeroed() -> Self {
        Self {
            drills_assigned: 0,
            drills_completed: 0,
            completion_rate: 0.0,
            completion_contribution: 0.0,
            quality_score: 0.0,
            quality_contribution: 0.0,
            pronunciation_confidence: 0.0,
            completion_confidence: 0.0,
            confidence_score: 0,
            label: ConfidenceLabel::NeedsImprovement,
            trend: Trend::Stable,
        }
    }
}

/// Compute a learner's confidence breakdown.
///
/// # Algorithm
///
/// 1. Each attempt yields an optional 0–100 quality score via the
///    type-specific extraction rules; attempts with no extractable quality
///    contribute zero weight (they are excluded, not counted as zero).
/// 2. `quality_score` is the type-weighted average of the extracted scores.
/// 3. Speech attempts (vocabulary, roleplay) additionally feed an unweighted
///    pronunciation mean; every other type feeds a completion mean.
/// 4. The final score blends completion volume and demonstrated quality
///    40/60: `round(min(100, completion_rate * 40 + quality * 0.60))`,
///    deliberately biased toward quality over mere volume.
/// 5. The label comes from a fixed threshold ladder and the trend from a
///    comparison against the mean of the most recent prior history entries.
pub fn compute(
    drills_assigned: i64,
    drills_completed: i64,
    attempts: &[CompletedAttempt],
    prior_history: &[HistoryEntry],
) -> ConfidenceBreakdown {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut pronunciation_scores = Vec::new();
    let mut completion_scores = Vec::new();

    for attempt in attempts {
        let Some(quality) = results::quality_score(attempt.results.as_ref(), attempt.score) else {
            continue;
        };

        let weight = type_weight(&attempt.drill_type);
        weighted_sum += quality * weight;
        weight_sum += weight;

        if is_pronunciation_type(&attempt.drill_type) {
            pronunciation_scores.push(quality);
        } else {
            completion_scores.push(quality);
        }
    }

    let quality_score = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    };

    let completion_rate = if drills_assigned > 0 {
        drills_completed as f64 / drills_assigned as f64
    } else {
        0.0
    };

    let completion_contribution = completion_rate * 40.0;
    let quality_contribution = quality_score * 0.60;
    let confidence_score = (completion_contribution + quality_contribution)
        .min(100.0)
        .round()
        .clamp(0.0, 100.0) as i32;

    ConfidenceBreakdown {
        drills_assigned,
        drills_completed,
        completion_rate,
        completion_contribution,
        quality_score,
        quality_contribution,
        pronunciation_confidence: unweighted_mean(&pronunciation_scores),
        completion_confidence: unweighted_mean(&completion_scores),
        confidence_score,
        label: label_for_score(confidence_score),
        trend: trend_for_score(confidence_score, prior_history),
    }
}

/// Fixed threshold ladder, inclusive lower bounds checked highest first.
pub const fn label_for_score(score: i32) -> ConfidenceLabel {
    match score {
        s if s >= 95 => ConfidenceLabel::Excellent,
        s if s >= 88 => ConfidenceLabel::VeryGood,
        s if s >= 82 => ConfidenceLabel::Good,
        s if s >= 75 => ConfidenceLabel::Average,
        s if s >= 60 => ConfidenceLabel::Developing,
        _ => ConfidenceLabel::NeedsImprovement,
    }
}

/// Compare the new score against the mean of the last few prior history
/// entries. Fewer than two prior entries is not enough signal, so the trend
/// stays stable.
pub fn trend_for_score(score: i32, prior_history: &[HistoryEntry]) -> Trend {
    if prior_history.len() < 2 {
        return Trend::Stable;
    }

    let window = &prior_history[prior_history.len().saturating_sub(TREND_WINDOW)..];
    let mean = window.iter().map(|e| f64::from(e.score)).sum::<f64>() / window.len() as f64;

    let score = f64::from(score);
    if score >= mean + TREND_THRESHOLD {
        Trend::Improving
    } else if score <= mean - TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Append an entry and evict the oldest beyond [`MAX_HISTORY_ENTRIES`].
pub fn push_history(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.push(entry);
    if history.len() > MAX_HISTORY_ENTRIES {
        let excess = history.len() - MAX_HISTORY_ENTRIES;
        history.drain(..excess);
    }
}

fn unweighted_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::SceneResult;

    fn attempt(drill_type: &str, results: Option<AttemptResults>, score: Option<f64>) -> CompletedAttempt {
        CompletedAttempt {
            drill_type: drill_type.to_string(),
            score,
            results,
        }
    }

    fn history_entry(score: i32) -> HistoryEntry {
        HistoryEntry {
            score,
            label: label_for_score(score),
            computed_at: Utc::now(),
            drills_completed: 1,
        }
    }

    #[test]
    fn test_weighted_quality_example() {
        // One roleplay attempt at quality 90 (weight 1.5) and one matching
        // attempt at quality 60 (weight 0.7):
        // (90 * 1.5 + 60 * 0.7) / (1.5 + 0.7) = 177 / 2.2 = 80.4545...
        let attempts = vec![
            attempt(
                "roleplay",
                Some(AttemptResults::Roleplay {
                    scenes: vec![SceneResult {
                        scene: None,
                        score: Some(90.0),
                    }],
                }),
                None,
            ),
            attempt(
                "matching",
                Some(AttemptResults::Matching {
                    accuracy: Some(0.6),
                }),
                None,
            ),
        ];

        let breakdown = compute(2, 2, &attempts, &[]);
        assert!((breakdown.quality_score - 177.0 / 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped_at_100() {
        let attempts = vec![attempt("sentence", None, Some(100.0))];
        let breakdown = compute(1, 1, &attempts, &[]);

        assert_eq!(breakdown.completion_rate, 1.0);
        assert_eq!(breakdown.quality_score, 100.0);
        // 1.0 * 40 + 100 * 0.6 = 100, never above
        assert_eq!(breakdown.confidence_score, 100);
        assert_eq!(breakdown.label, ConfidenceLabel::Excellent);
    }

    #[test]
    fn test_null_quality_attempts_contribute_no_weight() {
        let attempts = vec![
            attempt("sentence", None, Some(80.0)),
            // no payload, no raw score: excluded entirely
            attempt("summary", None, None),
        ];
        let breakdown = compute(2, 2, &attempts, &[]);
        assert_eq!(breakdown.quality_score, 80.0);
    }

    #[test]
    fn test_no_scoreable_attempts_yields_zero_quality() {
        let attempts = vec![attempt("summary", None, None)];
        let breakdown = compute(4, 1, &attempts, &[]);

        assert_eq!(breakdown.quality_score, 0.0);
        assert_eq!(breakdown.completion_rate, 0.25);
        // 0.25 * 40 = 10
        assert_eq!(breakdown.confidence_score, 10);
    }

    #[test]
    fn test_pronunciation_and_completion_buckets_are_unweighted() {
        let attempts = vec![
            attempt("vocabulary", None, Some(90.0)),
            attempt("roleplay", None, Some(70.0)),
            attempt("listening", Some(AttemptResults::Listening { completed: true }), None),
        ];
        let breakdown = compute(3, 3, &attempts, &[]);

        assert_eq!(breakdown.pronunciation_confidence, 80.0);
        assert_eq!(breakdown.completion_confidence, 80.0);
    }

    #[test]
    fn test_label_ladder_boundaries() {
        assert_eq!(label_for_score(100), ConfidenceLabel::Excellent);
        assert_eq!(label_for_score(95), ConfidenceLabel::Excellent);
        assert_eq!(label_for_score(94), ConfidenceLabel::VeryGood);
        assert_eq!(label_for_score(88), ConfidenceLabel::VeryGood);
        assert_eq!(label_for_score(87), ConfidenceLabel::Good);
        assert_eq!(label_for_score(82), ConfidenceLabel::Good);
        assert_eq!(label_for_score(81), ConfidenceLabel::Average);
        assert_eq!(label_for_score(75), ConfidenceLabel::Average);
        assert_eq!(label_for_score(74), ConfidenceLabel::Developing);
        assert_eq!(label_for_score(60), ConfidenceLabel::Developing);
        assert_eq!(label_for_score(59), ConfidenceLabel::NeedsImprovement);
        assert_eq!(label_for_score(0), ConfidenceLabel::NeedsImprovement);
    }

    #[test]
    fn test_trend_improving_and_stable_examples() {
        // mean(70, 72, 71) = 71, so improving needs >= 74 and declining <= 68
        let history = vec![history_entry(70), history_entry(72), history_entry(71)];

        assert_eq!(trend_for_score(80, &history), Trend::Improving);
        assert_eq!(trend_for_score(70, &history), Trend::Stable);
        assert_eq!(trend_for_score(65, &history), Trend::Declining);
    }

    #[test]
    fn test_trend_uses_most_recent_window() {
        // Only the last three entries count: mean(80, 82, 84) = 82. Were the
        // older entries included the mean would drop to 55.2 and both scores
        // below would read as improving.
        let history = vec![
            history_entry(10),
            history_entry(20),
            history_entry(80),
            history_entry(82),
            history_entry(84),
        ];
        assert_eq!(trend_for_score(84, &history), Trend::Stable);
        assert_eq!(trend_for_score(85, &history), Trend::Improving);
    }

    #[test]
    fn test_trend_needs_two_prior_entries() {
        assert_eq!(trend_for_score(100, &[]), Trend::Stable);
        assert_eq!(trend_for_score(100, &[history_entry(10)]), Trend::Stable);
        assert_eq!(
            trend_for_score(100, &[history_entry(10), history_entry(10)]),
            Trend::Improving
        );
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut history = Vec::new();
        for score in 0..25 {
            push_history(&mut history, history_entry(score));
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        // the five oldest entries were evicted
        assert_eq!(history.first().unwrap().score, 5);
        assert_eq!(history.last().unwrap().score, 24);
    }

    #[test]
    fn test_zeroed_breakdown() {
        let zeroed = ConfidenceBreakdown::zeroed();
        assert_eq!(zeroed.confidence_score, 0);
        assert_eq!(zeroed.label, ConfidenceLabel::NeedsImprovement);
        assert_eq!(zeroed.trend, Trend::Stable);
        assert_eq!(zeroed.drills_assigned, 0);
    }

    #[test]
    fn test_label_serde_round_trip() {
        let json = serde_json::to_string(&ConfidenceLabel::VeryGood).unwrap();
        assert_eq!(json, "\"Very Good\"");
        let json = serde_json::to_string(&Trend::Improving).unwrap();
        assert_eq!(json, "\"improving\"");

        let entry = HistoryEntry {
            score: 88,
            label: ConfidenceLabel::VeryGood,
            computed_at: Utc::now(),
            drills_completed: 3,
        };
        let value = serde_json::to_value(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}

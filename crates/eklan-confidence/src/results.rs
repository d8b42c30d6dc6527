//! Type-specific attempt result payloads and quality extraction.
//!
//! Each drill type records a different shape of result when a learner
//! submits it. The payload is a tagged union keyed by the drill-type tag so
//! that only the fields meaningful for that type exist on each variant.

use serde::{Deserialize, Serialize};

/// Per-word scoring for vocabulary drills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordResult {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub pronunciation_score: Option<f64>,
    #[serde(default)]
    pub fluency_score: Option<f64>,
}

/// Per-scene scoring for roleplay drills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResult {
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// One reviewed item of a sentence/grammar submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedItem {
    #[serde(default)]
    pub prompt: Option<String>,
    pub correct: bool,
}

/// The result payload of one drill attempt, keyed by the drill-type tag.
///
/// `sentence`, `sentence_writing` and `grammar` submissions share the
/// review-based shape. `fill_blank` is a retired drill type that still
/// exists in stored attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptResults {
    Vocabulary {
        #[serde(default)]
        words: Vec<WordResult>,
    },
    Roleplay {
        #[serde(default)]
        scenes: Vec<SceneResult>,
    },
    Matching {
        #[serde(default)]
        accuracy: Option<f64>,
    },
    Definition {
        #[serde(default)]
        accuracy: Option<f64>,
    },
    FillBlank {
        #[serde(default)]
        score: Option<f64>,
    },
    #[serde(alias = "grammar", alias = "sentence_writing")]
    Sentence {
        #[serde(default)]
        reviews: Vec<ReviewedItem>,
    },
    Summary {
        #[serde(default)]
        quality_score: Option<f64>,
        #[serde(default)]
        is_acceptable: Option<bool>,
    },
    Listening {
        #[serde(default)]
        completed: bool,
    },
}

impl AttemptResults {
    /// Leniently parse a stored JSON payload. Attempts written by older
    /// clients may not match any known shape; those fall back to the raw
    /// attempt score during extraction.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Extract a single 0–100 quality score from an attempt.
///
/// `raw_score` is the attempt's overall score and serves as the fallback
/// whenever the payload carries nothing usable. `None` means the attempt
/// contributes no weight at all to the aggregate, as opposed to dragging it
/// down with a zero.
pub fn quality_score(results: Option<&AttemptResults>, raw_score: Option<f64>) -> Option<f64> {
    let extracted = match results {
        Some(AttemptResults::Vocabulary { words }) => {
            let subs: Vec<f64> = words
                .iter()
                .flat_map(|w| [w.pronunciation_score, w.fluency_score])
                .flatten()
                .filter(|s| *s > 0.0)
                .collect();
            mean(&subs).or(raw_score)
        }
        Some(AttemptResults::Roleplay { scenes }) => {
            let subs: Vec<f64> = scenes
                .iter()
                .filter_map(|s| s.score)
                .filter(|s| *s > 0.0)
                .collect();
            mean(&subs).or(raw_score)
        }
        Some(AttemptResults::Matching { accuracy }) | Some(AttemptResults::Definition { accuracy }) => {
            accuracy.map(|a| a * 100.0).or(raw_score)
        }
        Some(AttemptResults::FillBlank { score }) => score.or(raw_score),
        Some(AttemptResults::Sentence { reviews }) => {
            if reviews.is_empty() {
                raw_score
            } else {
                let correct = reviews.iter().filter(|r| r.correct).count();
                Some(correct as f64 / reviews.len() as f64 * 100.0)
            }
        }
        Some(AttemptResults::Summary {
            quality_score,
            is_acceptable,
        }) => quality_score
            .or_else(|| is_acceptable.map(|ok| if ok { 85.0 } else { 50.0 }))
            .or(raw_score),
        Some(AttemptResults::Listening { completed }) => {
            Some(if *completed { 80.0 } else { 40.0 })
        }
        None => raw_score,
    };

    extracted.map(|s| s.clamp(0.0, 100.0))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word(pron: Option<f64>, fluency: Option<f64>) -> WordResult {
        WordResult {
            word: None,
            pronunciation_score: pron,
            fluency_score: fluency,
        }
    }

    #[test]
    fn test_vocabulary_averages_positive_sub_scores() {
        let results = AttemptResults::Vocabulary {
            words: vec![word(Some(80.0), Some(90.0)), word(Some(70.0), None)],
        };
        assert_eq!(quality_score(Some(&results), Some(10.0)), Some(80.0));
    }

    #[test]
    fn test_vocabulary_ignores_zero_sub_scores() {
        let results = AttemptResults::Vocabulary {
            words: vec![word(Some(0.0), None), word(Some(60.0), None)],
        };
        assert_eq!(quality_score(Some(&results), None), Some(60.0));
    }

    #[test]
    fn test_vocabulary_falls_back_to_raw_score() {
        let results = AttemptResults::Vocabulary {
            words: vec![word(None, None), word(Some(0.0), Some(0.0))],
        };
        assert_eq!(quality_score(Some(&results), Some(72.0)), Some(72.0));
        assert_eq!(quality_score(Some(&results), None), None);
    }

    #[test]
    fn test_roleplay_averages_scene_scores() {
        let results = AttemptResults::Roleplay {
            scenes: vec![
                SceneResult {
                    scene: None,
                    score: Some(85.0),
                },
                SceneResult {
                    scene: None,
                    score: Some(95.0),
                },
            ],
        };
        assert_eq!(quality_score(Some(&results), None), Some(90.0));
    }

    #[test]
    fn test_matching_and_definition_scale_accuracy() {
        let matching = AttemptResults::Matching {
            accuracy: Some(0.6),
        };
        assert_eq!(quality_score(Some(&matching), None), Some(60.0));

        let definition = AttemptResults::Definition { accuracy: None };
        assert_eq!(quality_score(Some(&definition), Some(55.0)), Some(55.0));
    }

    #[test]
    fn test_fill_blank_uses_stored_score() {
        let results = AttemptResults::FillBlank { score: Some(42.0) };
        assert_eq!(quality_score(Some(&results), Some(99.0)), Some(42.0));

        let empty = AttemptResults::FillBlank { score: None };
        assert_eq!(quality_score(Some(&empty), Some(99.0)), Some(99.0));
    }

    #[test]
    fn test_sentence_review_fraction() {
        let results = AttemptResults::Sentence {
            reviews: vec![
                ReviewedItem {
                    prompt: None,
                    correct: true,
                },
                ReviewedItem {
                    prompt: None,
                    correct: true,
                },
                ReviewedItem {
                    prompt: None,
                    correct: false,
                },
                ReviewedItem {
                    prompt: None,
                    correct: false,
                },
            ],
        };
        assert_eq!(quality_score(Some(&results), None), Some(50.0));

        let no_reviews = AttemptResults::Sentence { reviews: vec![] };
        assert_eq!(quality_score(Some(&no_reviews), Some(30.0)), Some(30.0));
    }

    #[test]
    fn test_summary_prefers_explicit_quality_then_review_flag() {
        let explicit = AttemptResults::Summary {
            quality_score: Some(91.0),
            is_acceptable: Some(false),
        };
        assert_eq!(quality_score(Some(&explicit), None), Some(91.0));

        let accepted = AttemptResults::Summary {
            quality_score: None,
            is_acceptable: Some(true),
        };
        assert_eq!(quality_score(Some(&accepted), None), Some(85.0));

        let rejected = AttemptResults::Summary {
            quality_score: None,
            is_acceptable: Some(false),
        };
        assert_eq!(quality_score(Some(&rejected), None), Some(50.0));

        let unreviewed = AttemptResults::Summary {
            quality_score: None,
            is_acceptable: None,
        };
        assert_eq!(quality_score(Some(&unreviewed), Some(64.0)), Some(64.0));
    }

    #[test]
    fn test_listening_is_binary() {
        let done = AttemptResults::Listening { completed: true };
        assert_eq!(quality_score(Some(&done), None), Some(80.0));

        let skipped = AttemptResults::Listening { completed: false };
        assert_eq!(quality_score(Some(&skipped), Some(100.0)), Some(40.0));
    }

    #[test]
    fn test_missing_payload_uses_raw_score_or_excludes() {
        assert_eq!(quality_score(None, Some(77.0)), Some(77.0));
        assert_eq!(quality_score(None, None), None);
    }

    #[test]
    fn test_extraction_is_clamped() {
        let results = AttemptResults::Matching {
            accuracy: Some(1.4),
        };
        assert_eq!(quality_score(Some(&results), None), Some(100.0));
        assert_eq!(quality_score(None, Some(-5.0)), Some(0.0));
    }

    #[test]
    fn test_payload_parsing_by_tag() {
        let value = json!({
            "kind": "vocabulary",
            "words": [{"word": "hola", "pronunciation_score": 88.0}]
        });
        let parsed = AttemptResults::from_value(&value).unwrap();
        assert!(matches!(parsed, AttemptResults::Vocabulary { .. }));

        // grammar and sentence_writing submissions share the review shape
        let grammar = json!({"kind": "grammar", "reviews": [{"correct": true}]});
        assert!(matches!(
            AttemptResults::from_value(&grammar).unwrap(),
            AttemptResults::Sentence { .. }
        ));

        // unrecognized payloads are simply not parsed
        assert_eq!(AttemptResults::from_value(&json!({"free": "form"})), None);
    }
}

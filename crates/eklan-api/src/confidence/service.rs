//! The confidence aggregator service: loads a learner's assignment and
//! attempt rows, runs the pure scoring algorithm, and upserts the derived
//! confidence document.
//!
//! There is no partial-success path: any read or write failure aborts the
//! whole recomputation and leaves the previously stored document untouched.
//! The upsert only happens after the full computation succeeded.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use eklan_confidence::{
    AttemptResults, CompletedAttempt, ConfidenceBreakdown, HistoryEntry, compute, push_history,
};
use eklan_db::{
    models::LearnerConfidence,
    repositories::{assignment, attempt, confidence as confidence_repo},
};

use crate::{error::ApiError, metrics};

/// Recompute and persist the learner's confidence document.
///
/// Always re-reads current state; results of an earlier assignment write are
/// never consumed in-memory. Last write wins on the upsert.
pub async fn compute_confidence(
    pool: &PgPool,
    learner_id: Uuid,
    trigger: &str,
) -> Result<LearnerConfidence, ApiError> {
    let counts = assignment::count_for_learner(pool, learner_id).await?;
    let prior_history = confidence_repo::find_by_learner(pool, learner_id)
        .await?
        .map(|doc| doc.history.0)
        .unwrap_or_default();

    let now = Utc::now();

    let doc = if counts.assigned == 0 {
        // Nothing assigned yet: store a zeroed document and keep whatever
        // history exists, without appending to it
        to_document(
            learner_id,
            &ConfidenceBreakdown::zeroed(),
            prior_history,
            now,
        )
    } else {
        let rows = attempt::latest_completed_for_learner(pool, learner_id).await?;
        let attempts: Vec<CompletedAttempt> = rows
            .into_iter()
            .map(|row| CompletedAttempt {
                results: row.results.as_ref().and_then(AttemptResults::from_value),
                drill_type: row.drill_type,
                score: row.score,
            })
            .collect();

        let breakdown = compute(counts.assigned, counts.completed, &attempts, &prior_history);

        let mut history = prior_history;
        push_history(
            &mut history,
            HistoryEntry {
                score: breakdown.confidence_score,
                label: breakdown.label,
                computed_at: now,
                drills_completed: counts.completed,
            },
        );

        to_document(learner_id, &breakdown, history, now)
    };

    confidence_repo::upsert(pool, &doc).await?;
    metrics::record_confidence_recompute(trigger);

    tracing::debug!(
        learner_id = %learner_id,
        confidence_score = doc.confidence_score,
        trend = %doc.trend,
        "confidence recomputed"
    );

    Ok(doc)
}

/// Read the last-persisted document without recomputing. `None` when no
/// computation ever ran for the learner.
pub async fn get_stored_confidence(
    pool: &PgPool,
    learner_id: Uuid,
) -> Result<Option<LearnerConfidence>, ApiError> {
    Ok(confidence_repo::find_by_learner(pool, learner_id).await?)
}

fn to_document(
    learner_id: Uuid,
    breakdown: &ConfidenceBreakdown,
    history: Vec<HistoryEntry>,
    now: chrono::DateTime<Utc>,
) -> LearnerConfidence {
    LearnerConfidence {
        learner_id,
        drills_assigned: breakdown.drills_assigned,
        drills_completed: breakdown.drills_completed,
        completion_rate: breakdown.completion_rate,
        completion_contribution: breakdown.completion_contribution,
        quality_score: breakdown.quality_score,
        quality_contribution: breakdown.quality_contribution,
        pronunciation_confidence: breakdown.pronunciation_confidence,
        completion_confidence: breakdown.completion_confidence,
        confidence_score: breakdown.confidence_score,
        label: breakdown.label.as_str().to_string(),
        trend: breakdown.trend.as_str().to_string(),
        history: Json(history),
        last_computed_at: now,
    }
}

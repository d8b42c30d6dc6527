use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::LearnerConfidence;

/// Create-or-overwrite the learner's confidence document. The write only
/// happens after a full recomputation succeeded; there is no partial update.
pub async fn upsert<'e, E>(executor: E, doc: &LearnerConfidence) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO learner_confidence
                (learner_id, drills_assigned, drills_completed, completion_rate,
                 completion_contribution, quality_score, quality_contribution,
                 pronunciation_confidence, completion_confidence, confidence_score,
                 label, trend, history, last_computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (learner_id)
            DO UPDATE SET
                drills_assigned = $2,
                drills_completed = $3,
                completion_rate = $4,
                completion_contribution = $5,
                quality_score = $6,
                quality_contribution = $7,
                pronunciation_confidence = $8,
                completion_confidence = $9,
                confidence_score = $10,
                label = $11,
                trend = $12,
                history = $13,
                last_computed_at = $14
        "#,
    )
    .bind(doc.learner_id)
    .bind(doc.drills_assigned)
    .bind(doc.drills_completed)
    .bind(doc.completion_rate)
    .bind(doc.completion_contribution)
    .bind(doc.quality_score)
    .bind(doc.quality_contribution)
    .bind(doc.pronunciation_confidence)
    .bind(doc.completion_confidence)
    .bind(doc.confidence_score)
    .bind(&doc.label)
    .bind(&doc.trend)
    .bind(&doc.history)
    .bind(doc.last_computed_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_learner<'e, E>(
    executor: E,
    learner_id: Uuid,
) -> Result<Option<LearnerConfidence>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT learner_id, drills_assigned, drills_completed, completion_rate,
                   completion_contribution, quality_score, quality_contribution,
                   pronunciation_confidence, completion_confidence, confidence_score,
                   label, trend, history, last_computed_at
            FROM learner_confidence
            WHERE learner_id = $1
        "#,
    )
    .bind(learner_id)
    .fetch_optional(executor)
    .await
}

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::LatestAttempt;

/// The most recently completed attempt per completed assignment of the
/// learner. Earlier attempts on the same assignment are never averaged in;
/// only the latest one counts.
pub async fn latest_completed_for_learner<'e, E>(
    executor: E,
    learner_id: Uuid,
) -> Result<Vec<LatestAttempt>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT DISTINCT ON (da.assignment_id)
                da.drill_type,
                da.results,
                da.score
            FROM drill_attempts da
            JOIN drill_assignments a ON a.id = da.assignment_id
            WHERE a.learner_id = $1
              AND (a.status = 'completed' OR a.completed_at IS NOT NULL)
            ORDER BY da.assignment_id, da.completed_at DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(executor)
    .await
}

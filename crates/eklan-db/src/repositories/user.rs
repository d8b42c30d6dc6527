use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::User;

pub async fn find_by_id<'e, E>(executor: E, user_id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, role, created_at
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Resolve which of the given ids exist with the learner role, in a single
/// batched query. Callers diff the result against the requested set to
/// report the invalid ids.
pub async fn filter_learner_ids<'e, E>(
    executor: E,
    candidate_ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT id
            FROM users
            WHERE id = ANY($1) AND role = 'learner'
        "#,
    )
    .bind(candidate_ids)
    .fetch_all(executor)
    .await
}

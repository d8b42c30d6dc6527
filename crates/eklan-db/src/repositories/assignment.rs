use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{AssignmentCounts, DrillAssignment};

/// Batched read of which candidate learners already hold an assignment for
/// the drill. The caller diffs against the requested set before inserting.
pub async fn find_assigned_learners<'e, E>(
    executor: E,
    drill_id: Uuid,
    candidate_ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT learner_id
            FROM drill_assignments
            WHERE drill_id = $1 AND learner_id = ANY($2)
        "#,
    )
    .bind(drill_id)
    .bind(candidate_ids)
    .fetch_all(executor)
    .await
}

/// Bulk-insert pending assignments for the given learners.
///
/// A row that loses the race against a concurrent insert hits the
/// (drill_id, learner_id) unique index and is skipped, not failed; the whole
/// batch never aborts. Returns the number of rows actually created, which is
/// what feeds the drill's assignment counter.
pub async fn bulk_insert<'e, E>(
    executor: E,
    drill_id: Uuid,
    learner_ids: &[Uuid],
    assigned_by: Uuid,
    due_date: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO drill_assignments (drill_id, learner_id, assigned_by, due_date)
            SELECT $1, learner_id, $3, $4
            FROM UNNEST($2::uuid[]) AS t(learner_id)
            ON CONFLICT (drill_id, learner_id) DO NOTHING
        "#,
    )
    .bind(drill_id)
    .bind(learner_ids)
    .bind(assigned_by)
    .bind(due_date)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find_by_id<'e, E>(
    executor: E,
    assignment_id: Uuid,
) -> Result<Option<DrillAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, drill_id, learner_id, assigned_by, assigned_at, due_date, status, completed_at
            FROM drill_assignments
            WHERE id = $1
        "#,
    )
    .bind(assignment_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_for_learner_and_drill<'e, E>(
    executor: E,
    drill_id: Uuid,
    learner_id: Uuid,
) -> Result<Option<DrillAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, drill_id, learner_id, assigned_by, assigned_at, due_date, status, completed_at
            FROM drill_assignments
            WHERE drill_id = $1 AND learner_id = $2
        "#,
    )
    .bind(drill_id)
    .bind(learner_id)
    .fetch_optional(executor)
    .await
}

/// Assigned/completed totals for a learner. An assignment counts as
/// completed when its status says so or a completion timestamp exists; the
/// two fields are not guaranteed to be set consistently.
pub async fn count_for_learner<'e, E>(
    executor: E,
    learner_id: Uuid,
) -> Result<AssignmentCounts, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                COUNT(*) AS assigned,
                COUNT(*) FILTER (WHERE status = 'completed' OR completed_at IS NOT NULL) AS completed
            FROM drill_assignments
            WHERE learner_id = $1
        "#,
    )
    .bind(learner_id)
    .fetch_one(executor)
    .await
}

/// Every learner currently holding at least one assignment. Drives the
/// periodic confidence refresh pass.
pub async fn learners_with_assignments<'e, E>(executor: E) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT DISTINCT learner_id
            FROM drill_assignments
        "#,
    )
    .fetch_all(executor)
    .await
}

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Drill, DrillChanges, NewDrill};

pub async fn insert<'e, E>(executor: E, drill: &NewDrill) -> Result<Drill, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO drills
                (title, drill_type, difficulty, due_date, duration_days, content, created_by, creator_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, title, drill_type, difficulty, due_date, duration_days, content,
                active, created_by, creator_email, total_assignments, total_completions,
                average_score, average_completion_time, created_at, updated_at
        "#,
    )
    .bind(&drill.title)
    .bind(&drill.drill_type)
    .bind(&drill.difficulty)
    .bind(drill.due_date)
    .bind(drill.duration_days)
    .bind(&drill.content)
    .bind(drill.created_by)
    .bind(&drill.creator_email)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, drill_id: Uuid) -> Result<Option<Drill>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                id, title, drill_type, difficulty, due_date, duration_days, content,
                active, created_by, creator_email, total_assignments, total_completions,
                average_score, average_completion_time, created_at, updated_at
            FROM drills
            WHERE id = $1
        "#,
    )
    .bind(drill_id)
    .fetch_optional(executor)
    .await
}

/// Apply the provided field changes; absent fields keep their stored value.
pub async fn update_fields<'e, E>(
    executor: E,
    drill_id: Uuid,
    changes: &DrillChanges,
) -> Result<Drill, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE drills
            SET title = COALESCE($2, title),
                difficulty = COALESCE($3, difficulty),
                due_date = COALESCE($4, due_date),
                duration_days = COALESCE($5, duration_days),
                content = COALESCE($6, content),
                active = COALESCE($7, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, title, drill_type, difficulty, due_date, duration_days, content,
                active, created_by, creator_email, total_assignments, total_completions,
                average_score, average_completion_time, created_at, updated_at
        "#,
    )
    .bind(drill_id)
    .bind(&changes.title)
    .bind(&changes.difficulty)
    .bind(changes.due_date)
    .bind(changes.duration_days)
    .bind(&changes.content)
    .bind(changes.active)
    .fetch_one(executor)
    .await
}

/// Delete only the drill row. Assignments and attempts are kept on purpose
/// so learner history survives template removal.
pub async fn delete<'e, E>(executor: E, drill_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM drills WHERE id = $1
        "#,
    )
    .bind(drill_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Atomic counter bump. The increment happens in SQL so concurrent
/// assignment batches both land without a read-modify-write race.
pub async fn increment_total_assignments<'e, E>(
    executor: E,
    drill_id: Uuid,
    created: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE drills
            SET total_assignments = total_assignments + $2,
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(drill_id)
    .bind(created as i32)
    .execute(executor)
    .await?;
    Ok(())
}

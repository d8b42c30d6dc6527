//! The drill assignment manager: drill CRUD plus idempotent per-learner
//! assignment fan-out.

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use eklan_db::{
    models::{Drill, DrillAssignment, DrillChanges, NewDrill, User},
    repositories::{assignment, drill as drill_repo, user as user_repo},
};

use super::model::{CreateDrillRequest, UpdateDrillRequest};
use crate::{
    auth::AuthUser,
    error::ApiError,
    metrics,
    policy::{self, ReadAccess, Role},
    validation,
};

/// Resolve the token's identity against the user directory. The stored role
/// is authoritative, not whatever the token was minted with.
async fn resolve_actor(pool: &PgPool, auth: &AuthUser) -> Result<(User, Role), ApiError> {
    let user = user_repo::find_by_id(pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Acting user not found".to_string()))?;
    let role = Role::from_str(&user.role)?;
    Ok((user, role))
}

/// Unique ids in first-seen order.
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Requested minus already-assigned, order preserved.
fn missing_learners(requested: &[Uuid], existing: &[Uuid]) -> Vec<Uuid> {
    let existing: HashSet<Uuid> = existing.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !existing.contains(id))
        .collect()
}

/// Batched existence+role check for the requested learner set. Fails with
/// the exact ids that did not resolve; ids are never silently dropped.
async fn resolve_learners(pool: &PgPool, requested: &[Uuid]) -> Result<Vec<Uuid>, ApiError> {
    let unique = dedup_ids(requested);
    let found = user_repo::filter_learner_ids(pool, &unique).await?;
    let found: HashSet<Uuid> = found.into_iter().collect();

    let invalid: Vec<Uuid> = unique
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    if !invalid.is_empty() {
        return Err(ApiError::InvalidLearners(invalid));
    }

    Ok(unique)
}

/// Ensure every listed learner holds exactly one assignment for the drill.
///
/// Pre-checks existing assignments in one batched read, inserts only the
/// difference, and lets the store's continue-on-conflict semantics absorb
/// concurrent duplicates. The drill's counter moves by the number of rows
/// actually created, never by the number requested.
async fn assign_learners(
    pool: &PgPool,
    drill: &Drill,
    learner_ids: &[Uuid],
    assigned_by: Uuid,
) -> Result<u64, ApiError> {
    let already = assignment::find_assigned_learners(pool, drill.id, learner_ids).await?;
    let to_assign = missing_learners(learner_ids, &already);

    let created = if to_assign.is_empty() {
        0
    } else {
        assignment::bulk_insert(pool, drill.id, &to_assign, assigned_by, drill.due_date).await?
    };

    let lost_race = to_assign.len() as u64 - created;
    if lost_race > 0 {
        tracing::warn!(
            drill_id = %drill.id,
            skipped = lost_race,
            "assignments skipped: concurrent insert already created them"
        );
    }

    if created > 0 {
        drill_repo::increment_total_assignments(pool, drill.id, created as i64).await?;
    }

    metrics::record_assignment_batch(created, learner_ids.len() as u64 - created);
    Ok(created)
}

pub async fn create_drill(
    pool: &PgPool,
    auth: &AuthUser,
    req: CreateDrillRequest,
) -> Result<(Drill, u64), ApiError> {
    let (actor, role) = resolve_actor(pool, auth).await?;
    if role == Role::Learner {
        return Err(ApiError::Auth(
            "Only tutors and administrators can create drills".to_string(),
        ));
    }

    // All validation happens before anything is written
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_title(&req.title)?;
    let drill_type = validation::parse_drill_type(&req.drill_type)?;
    let difficulty = validation::parse_difficulty(req.difficulty.as_deref())?;
    let due_date = validation::parse_due_date(&req.due_date)?;
    let duration_days = validation::validate_duration_days(req.duration_days)?;
    let learner_ids = resolve_learners(pool, &req.learner_ids).await?;

    let content = req
        .content
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| ApiError::Internal(format!("failed to serialize drill content: {e}")))?;

    let drill = drill_repo::insert(
        pool,
        &NewDrill {
            title: req.title.trim().to_string(),
            drill_type: drill_type.as_str().to_string(),
            difficulty,
            due_date,
            duration_days,
            content,
            created_by: actor.id,
            creator_email: actor.email.clone(),
        },
    )
    .await?;

    let created = assign_learners(pool, &drill, &learner_ids, actor.id).await?;

    tracing::info!(
        drill_id = %drill.id,
        drill_type = %drill.drill_type,
        assignments_created = created,
        "drill created"
    );

    // Re-read so the response carries the bumped assignment counter
    let drill = drill_repo::find_by_id(pool, drill.id).await?.unwrap_or(drill);
    Ok((drill, created))
}

pub async fn update_drill(
    pool: &PgPool,
    auth: &AuthUser,
    drill_id: Uuid,
    req: UpdateDrillRequest,
) -> Result<(Drill, u64), ApiError> {
    let (actor, role) = resolve_actor(pool, auth).await?;
    let drill = drill_repo::find_by_id(pool, drill_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Drill not found".to_string()))?;

    if !policy::can_mutate_drill(role, actor.id, &actor.email, &drill) {
        return Err(ApiError::Auth(
            "Only the creator or an administrator can update this drill".to_string(),
        ));
    }

    let mut changes = DrillChanges::default();
    if let Some(title) = &req.title {
        validation::validate_title(title)?;
        changes.title = Some(title.trim().to_string());
    }
    if let Some(difficulty) = req.difficulty.as_deref() {
        changes.difficulty = Some(validation::parse_difficulty(Some(difficulty))?);
    }
    if let Some(due_date) = &req.due_date {
        changes.due_date = Some(validation::parse_due_date(due_date)?);
    }
    if let Some(days) = req.duration_days {
        changes.duration_days = Some(validation::validate_duration_days(Some(days))?);
    }
    changes.active = req.active;
    changes.content = req
        .content
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| ApiError::Internal(format!("failed to serialize drill content: {e}")))?;

    // Validate the learner list before any write happens
    let learner_ids = match &req.learner_ids {
        Some(ids) => Some(resolve_learners(pool, ids).await?),
        None => None,
    };

    let drill = drill_repo::update_fields(pool, drill_id, &changes).await?;

    // New assignments pick up the updated due date. Learners missing from
    // the list keep their assignments; this path only ever adds.
    let created = match learner_ids {
        Some(ids) if !ids.is_empty() => assign_learners(pool, &drill, &ids, actor.id).await?,
        _ => 0,
    };

    tracing::info!(
        drill_id = %drill.id,
        assignments_created = created,
        "drill updated"
    );

    let drill = if created > 0 {
        drill_repo::find_by_id(pool, drill_id).await?.unwrap_or(drill)
    } else {
        drill
    };
    Ok((drill, created))
}

pub async fn delete_drill(pool: &PgPool, auth: &AuthUser, drill_id: Uuid) -> Result<(), ApiError> {
    let (actor, role) = resolve_actor(pool, auth).await?;
    let drill = drill_repo::find_by_id(pool, drill_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Drill not found".to_string()))?;

    if !policy::can_mutate_drill(role, actor.id, &actor.email, &drill) {
        return Err(ApiError::Auth(
            "Only the creator or an administrator can delete this drill".to_string(),
        ));
    }

    let deleted = drill_repo::delete(pool, drill_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Drill not found".to_string()));
    }

    tracing::info!(drill_id = %drill_id, "drill deleted; assignment and attempt history retained");
    Ok(())
}

pub async fn get_drill(
    pool: &PgPool,
    auth: &AuthUser,
    drill_id: Uuid,
    assignment_id: Option<Uuid>,
) -> Result<(Drill, Option<DrillAssignment>), ApiError> {
    let (actor, role) = resolve_actor(pool, auth).await?;
    let drill = drill_repo::find_by_id(pool, drill_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Drill not found".to_string()))?;

    // Learners prove access through an assignment: either the one they name
    // or, failing that, whichever assignment links them to this drill.
    let assignment = match assignment_id {
        Some(id) => Some(
            assignment::find_by_id(pool, id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?,
        ),
        None if role == Role::Learner => {
            assignment::find_for_learner_and_drill(pool, drill_id, actor.id).await?
        }
        None => None,
    };

    let access = ReadAccess {
        actor_id: actor.id,
        actor_email: &actor.email,
        drill: &drill,
        assignment: assignment.as_ref(),
    };
    if !policy::can_read_drill(role, &access) {
        return Err(ApiError::Auth(
            "You are not allowed to view this drill".to_string(),
        ));
    }

    // Echo the assignment summary only when one was explicitly requested,
    // and only when it actually references this drill
    let echoed = match (assignment_id, assignment) {
        (Some(_), Some(found)) if found.drill_id == drill.id => Some(found),
        (Some(_), _) => {
            return Err(ApiError::Validation(
                "assignment_id does not reference this drill".to_string(),
            ));
        }
        _ => None,
    };
    Ok((drill, echoed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        assert_eq!(dedup_ids(&[a, b, a, c, b]), vec![a, b, c]);
        assert_eq!(dedup_ids(&[]), Vec::<Uuid>::new());
    }

    #[test]
    fn test_missing_learners_is_a_set_difference() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        assert_eq!(missing_learners(&[a, b, c], &[b]), vec![a, c]);
        assert_eq!(missing_learners(&[a, b], &[a, b]), Vec::<Uuid>::new());
        assert_eq!(missing_learners(&[], &[a]), Vec::<Uuid>::new());
        assert_eq!(missing_learners(&[a], &[]), vec![a]);
    }
}

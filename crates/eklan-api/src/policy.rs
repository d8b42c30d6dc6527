//! Role-based read access to drills.
//!
//! The authorization matrix is a table from role to predicate so each rule
//! can be tested on its own instead of living inline in route handlers.

use eklan_db::models::{Drill, DrillAssignment};
use uuid::Uuid;

use crate::error::ApiError;

/// Actor roles known to the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Tutor,
    Learner,
}

impl Role {
    pub fn from_str(value: &str) -> Result<Self, ApiError> {
        match value {
            "admin" => Ok(Self::Admin),
            "tutor" => Ok(Self::Tutor),
            "learner" => Ok(Self::Learner),
            other => Err(ApiError::Auth(format!("Unknown role: {other}"))),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Tutor => "tutor",
            Self::Learner => "learner",
        }
    }
}

/// Everything a read-access decision looks at.
#[derive(Debug)]
pub struct ReadAccess<'a> {
    pub actor_id: Uuid,
    pub actor_email: &'a str,
    pub drill: &'a Drill,
    /// The actor's assignment for this drill, when one was found or supplied.
    pub assignment: Option<&'a DrillAssignment>,
}

type ReadPredicate = fn(&ReadAccess<'_>) -> bool;

/// The authorization matrix: one predicate per role.
pub const fn read_predicate(role: Role) -> ReadPredicate {
    match role {
        Role::Admin => admin_can_read,
        Role::Tutor => tutor_can_read,
        Role::Learner => learner_can_read,
    }
}

/// Convenience wrapper over the table.
pub fn can_read_drill(role: Role, access: &ReadAccess<'_>) -> bool {
    read_predicate(role)(access)
}

fn admin_can_read(_: &ReadAccess<'_>) -> bool {
    true
}

/// Tutors see only their own drills. Rows written before creator ids were
/// recorded fall back to the creator email.
fn tutor_can_read(access: &ReadAccess<'_>) -> bool {
    match access.drill.created_by {
        Some(creator_id) => creator_id == access.actor_id,
        None => access
            .drill
            .creator_email
            .as_deref()
            .is_some_and(|email| email == access.actor_email),
    }
}

/// Learners see a drill only through an assignment that is theirs and that
/// actually references this drill; both fields are checked.
fn learner_can_read(access: &ReadAccess<'_>) -> bool {
    access.assignment.is_some_and(|assignment| {
        assignment.learner_id == access.actor_id && assignment.drill_id == access.drill.id
    })
}

/// Whether the actor may mutate (update/delete) the drill: the original
/// creator or an administrator.
pub fn can_mutate_drill(role: Role, actor_id: Uuid, actor_email: &str, drill: &Drill) -> bool {
    match role {
        Role::Admin => true,
        Role::Tutor => tutor_can_read(&ReadAccess {
            actor_id,
            actor_email,
            drill,
            assignment: None,
        }),
        Role::Learner => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn drill(created_by: Option<Uuid>, creator_email: Option<&str>) -> Drill {
        Drill {
            id: Uuid::new_v4(),
            title: "Ordering food".to_string(),
            drill_type: "roleplay".to_string(),
            difficulty: "intermediate".to_string(),
            due_date: Utc::now(),
            duration_days: 1,
            content: None,
            active: true,
            created_by,
            creator_email: creator_email.map(String::from),
            total_assignments: 0,
            total_completions: 0,
            average_score: 0.0,
            average_completion_time: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(drill_id: Uuid, learner_id: Uuid) -> DrillAssignment {
        DrillAssignment {
            id: Uuid::new_v4(),
            drill_id,
            learner_id,
            assigned_by: None,
            assigned_at: Utc::now(),
            due_date: Utc::now(),
            status: "pending".to_string(),
            completed_at: None,
        }
    }

    #[test]
    fn test_admin_reads_any_drill() {
        let drill = drill(Some(Uuid::new_v4()), None);
        let access = ReadAccess {
            actor_id: Uuid::new_v4(),
            actor_email: "admin@eklan.app",
            drill: &drill,
            assignment: None,
        };
        assert!(can_read_drill(Role::Admin, &access));
    }

    #[test]
    fn test_tutor_reads_own_drill_only() {
        let tutor_id = Uuid::new_v4();
        let own = drill(Some(tutor_id), None);
        let other = drill(Some(Uuid::new_v4()), None);

        let access_own = ReadAccess {
            actor_id: tutor_id,
            actor_email: "tutor@eklan.app",
            drill: &own,
            assignment: None,
        };
        let access_other = ReadAccess {
            actor_id: tutor_id,
            actor_email: "tutor@eklan.app",
            drill: &other,
            assignment: None,
        };

        assert!(can_read_drill(Role::Tutor, &access_own));
        assert!(!can_read_drill(Role::Tutor, &access_other));
    }

    #[test]
    fn test_tutor_legacy_email_fallback() {
        let legacy = drill(None, Some("tutor@eklan.app"));

        let matching = ReadAccess {
            actor_id: Uuid::new_v4(),
            actor_email: "tutor@eklan.app",
            drill: &legacy,
            assignment: None,
        };
        let mismatched = ReadAccess {
            actor_id: Uuid::new_v4(),
            actor_email: "someone-else@eklan.app",
            drill: &legacy,
            assignment: None,
        };

        assert!(can_read_drill(Role::Tutor, &matching));
        assert!(!can_read_drill(Role::Tutor, &mismatched));
    }

    #[test]
    fn test_learner_needs_matching_assignment() {
        let learner_id = Uuid::new_v4();
        let target = drill(Some(Uuid::new_v4()), None);

        let theirs = assignment(target.id, learner_id);
        let someone_elses = assignment(target.id, Uuid::new_v4());
        let wrong_drill = assignment(Uuid::new_v4(), learner_id);

        fn access<'a>(
            drill: &'a Drill,
            learner_id: Uuid,
            assignment: Option<&'a DrillAssignment>,
        ) -> ReadAccess<'a> {
            ReadAccess {
                actor_id: learner_id,
                actor_email: "learner@eklan.app",
                drill,
                assignment,
            }
        }

        assert!(!can_read_drill(Role::Learner, &access(&target, learner_id, None)));
        assert!(can_read_drill(
            Role::Learner,
            &access(&target, learner_id, Some(&theirs))
        ));
        assert!(!can_read_drill(
            Role::Learner,
            &access(&target, learner_id, Some(&someone_elses))
        ));
        assert!(!can_read_drill(
            Role::Learner,
            &access(&target, learner_id, Some(&wrong_drill))
        ));
    }

    #[test]
    fn test_mutation_rights() {
        let tutor_id = Uuid::new_v4();
        let own = drill(Some(tutor_id), None);

        assert!(can_mutate_drill(Role::Admin, Uuid::new_v4(), "a@e", &own));
        assert!(can_mutate_drill(Role::Tutor, tutor_id, "t@e", &own));
        assert!(!can_mutate_drill(Role::Tutor, Uuid::new_v4(), "t@e", &own));
        assert!(!can_mutate_drill(Role::Learner, tutor_id, "l@e", &own));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("tutor").unwrap(), Role::Tutor);
        assert_eq!(Role::from_str("learner").unwrap(), Role::Learner);
        assert!(Role::from_str("superuser").is_err());
        assert_eq!(Role::Tutor.as_str(), "tutor");
    }
}

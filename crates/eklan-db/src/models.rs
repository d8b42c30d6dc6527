use chrono::{DateTime, Utc};
use eklan_confidence::HistoryEntry;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// User model - minimal mirror of the user directory, enough for role checks
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Display name
    pub username: String,
    /// Email (unique, used as a legacy ownership fallback on drills)
    pub email: String,
    /// Role: admin, tutor or learner
    pub role: String,
    /// When the user was created
    pub created_at: DateTime<Utc>,
}

/// Drill model - a reusable practice-content template authored by a tutor
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Drill {
    /// Unique drill identifier
    pub id: Uuid,
    /// Drill title (max 200 chars)
    pub title: String,
    /// Drill type tag (snake_case, one of the authorable set)
    pub drill_type: String,
    /// beginner, intermediate or advanced
    pub difficulty: String,
    /// When assigned work is due
    pub due_date: DateTime<Utc>,
    /// How many days learners get for the drill (>= 1)
    pub duration_days: i32,
    /// Type-specific content payload (tagged by drill type)
    pub content: Option<serde_json::Value>,
    /// Whether the drill is currently assignable
    pub active: bool,
    /// Creator reference (nullable on legacy rows)
    pub created_by: Option<Uuid>,
    /// Legacy ownership fallback for rows lacking created_by
    pub creator_email: Option<String>,
    /// Count of assignment rows, maintained by atomic increments
    pub total_assignments: i32,
    /// Count of completed assignments
    pub total_completions: i32,
    /// Running average score across completions
    pub average_score: f64,
    /// Running average completion time in minutes
    pub average_completion_time: f64,
    /// When the drill was created
    pub created_at: DateTime<Utc>,
    /// When the drill was last updated
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for a new drill; counters start at zero server-side
#[derive(Debug, Clone)]
pub struct NewDrill {
    pub title: String,
    pub drill_type: String,
    pub difficulty: String,
    pub due_date: DateTime<Utc>,
    pub duration_days: i32,
    pub content: Option<serde_json::Value>,
    pub created_by: Uuid,
    pub creator_email: String,
}

/// Optional field updates applied to an existing drill
#[derive(Debug, Clone, Default)]
pub struct DrillChanges {
    pub title: Option<String>,
    pub difficulty: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub duration_days: Option<i32>,
    pub content: Option<serde_json::Value>,
    pub active: Option<bool>,
}

/// DrillAssignment model - links one drill to one learner
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DrillAssignment {
    /// Unique assignment identifier
    pub id: Uuid,
    /// Drill reference (no FK; may dangle after drill deletion)
    pub drill_id: Uuid,
    /// Learner reference (indexed)
    pub learner_id: Uuid,
    /// Who assigned the drill
    pub assigned_by: Option<Uuid>,
    /// When the assignment was created
    pub assigned_at: DateTime<Utc>,
    /// Due date copied from the drill at assignment time
    pub due_date: DateTime<Utc>,
    /// pending, in_progress or completed
    pub status: String,
    /// Set when the learner finished the drill
    pub completed_at: Option<DateTime<Utc>>,
}

/// The slice of an attempt the confidence aggregator consumes: the most
/// recently completed attempt of one completed assignment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LatestAttempt {
    /// Stored drill-type tag (may be a retired type)
    pub drill_type: String,
    /// Type-specific results payload as stored
    pub results: Option<serde_json::Value>,
    /// Raw overall score, if recorded
    pub score: Option<f64>,
}

/// Assigned/completed totals for one learner
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct AssignmentCounts {
    pub assigned: i64,
    pub completed: i64,
}

/// LearnerConfidence model - the derived per-learner summary document,
/// one row per learner, overwritten on every recomputation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LearnerConfidence {
    /// Learner this document belongs to
    pub learner_id: Uuid,
    pub drills_assigned: i64,
    pub drills_completed: i64,
    pub completion_rate: f64,
    pub completion_contribution: f64,
    pub quality_score: f64,
    pub quality_contribution: f64,
    pub pronunciation_confidence: f64,
    pub completion_confidence: f64,
    /// Blended 0-100 score, clamped
    pub confidence_score: i32,
    /// Categorical label derived from the score
    pub label: String,
    /// improving, declining or stable
    pub trend: String,
    /// Most recent 20 score snapshots, oldest first
    pub history: Json<Vec<HistoryEntry>>,
    pub last_computed_at: DateTime<Utc>,
}

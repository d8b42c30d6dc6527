use chrono::{DateTime, Utc};

use eklan_confidence::DrillType;

use crate::error::ApiError;

/// Difficulty levels a drill can carry
const VALID_DIFFICULTIES: &[&str] = &["beginner", "intermediate", "advanced"];

/// Difficulty applied when the request does not specify one
pub const DEFAULT_DIFFICULTY: &str = "intermediate";

/// Maximum drill title length
pub const MAX_TITLE_LEN: usize = 200;

/// Validate a drill title: non-empty after trimming, bounded length.
pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Parse a drill-type tag, rejecting anything outside the authorable set.
pub fn parse_drill_type(value: &str) -> Result<DrillType, ApiError> {
    DrillType::from_tag(value).ok_or_else(|| {
        ApiError::Validation(format!(
            "drill_type: '{value}' is not a valid drill type (expected one of: {})",
            DrillType::ALL.map(DrillType::as_str).join(", ")
        ))
    })
}

/// Parse a difficulty, defaulting to intermediate when absent.
pub fn parse_difficulty(value: Option<&str>) -> Result<String, ApiError> {
    let difficulty = value.unwrap_or(DEFAULT_DIFFICULTY);
    if !VALID_DIFFICULTIES.contains(&difficulty) {
        return Err(ApiError::Validation(format!(
            "difficulty: '{difficulty}' is not a valid difficulty (expected one of: {})",
            VALID_DIFFICULTIES.join(", ")
        )));
    }
    Ok(difficulty.to_string())
}

/// Parse an RFC 3339 due date.
pub fn parse_due_date(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::Validation(format!(
                "due_date: '{value}' is not a valid RFC 3339 date-time"
            ))
        })
}

/// Validate duration-in-days, defaulting to 1 when absent.
pub fn validate_duration_days(value: Option<i32>) -> Result<i32, ApiError> {
    let days = value.unwrap_or(1);
    if days < 1 {
        return Err(ApiError::Validation(
            "duration_days must be a positive integer".to_string(),
        ));
    }
    Ok(days)
}

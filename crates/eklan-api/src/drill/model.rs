use eklan_db::models::{Drill, DrillAssignment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One vocabulary item of a vocabulary drill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub word: String,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub example_sentence: Option<String>,
}

/// One left/right pair of a matching drill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

/// One term of a definition drill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionTerm {
    pub term: String,
    pub definition: String,
}

/// Type-specific drill content, tagged by the drill-type tag.
///
/// Only the variant matching the drill's type is meaningful; a mismatched
/// payload is stored as-is but never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrillContent {
    Vocabulary {
        #[serde(default)]
        words: Vec<VocabularyWord>,
    },
    Roleplay {
        #[serde(default)]
        scenario: Option<String>,
        #[serde(default)]
        scenes: Vec<String>,
    },
    Matching {
        #[serde(default)]
        pairs: Vec<MatchingPair>,
    },
    Definition {
        #[serde(default)]
        terms: Vec<DefinitionTerm>,
    },
    Summary {
        #[serde(default)]
        passage: Option<String>,
    },
    Grammar {
        #[serde(default)]
        topic: Option<String>,
        #[serde(default)]
        prompts: Vec<String>,
    },
    SentenceWriting {
        #[serde(default)]
        prompts: Vec<String>,
    },
    Sentence {
        #[serde(default)]
        prompts: Vec<String>,
    },
    Listening {
        #[serde(default)]
        audio_url: Option<String>,
        #[serde(default)]
        transcript: Option<String>,
    },
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDrillRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub drill_type: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub due_date: String,
    #[serde(default)]
    pub duration_days: Option<i32>,
    #[validate(length(min = 1, message = "at least one learner id is required"))]
    pub learner_ids: Vec<Uuid>,
    #[serde(default)]
    pub content: Option<DrillContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDrillRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub duration_days: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
    /// Learners to add. Ids already assigned are skipped; ids absent from
    /// the list never remove an existing assignment.
    #[serde(default)]
    pub learner_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub content: Option<DrillContent>,
}

/// Response of the create/update endpoints: the drill plus how many
/// assignments this call actually created (may be less than requested).
#[derive(Debug, Serialize)]
pub struct DrillWriteResponse {
    pub drill: Drill,
    pub assignments_created: u64,
}

/// Response of the read endpoint. The assignment is present only when the
/// caller supplied an assignment id.
#[derive(Debug, Serialize)]
pub struct DrillReadResponse {
    pub drill: Drill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<DrillAssignment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_round_trips_by_kind() {
        let value = json!({
            "kind": "matching",
            "pairs": [{"left": "hund", "right": "dog"}]
        });
        let content: DrillContent = serde_json::from_value(value.clone()).unwrap();
        assert!(matches!(content, DrillContent::Matching { .. }));
        assert_eq!(serde_json::to_value(&content).unwrap(), value);
    }

    #[test]
    fn test_create_request_validator_bounds() {
        let ok = CreateDrillRequest {
            title: "Greetings".to_string(),
            drill_type: "vocabulary".to_string(),
            difficulty: None,
            due_date: "2026-09-01T12:00:00Z".to_string(),
            duration_days: None,
            learner_ids: vec![Uuid::new_v4()],
            content: None,
        };
        assert!(ok.validate().is_ok());

        let no_learners = CreateDrillRequest {
            learner_ids: vec![],
            ..ok
        };
        assert!(no_learners.validate().is_err());
    }
}

//! Confidence scoring library for Eklan
//!
//! This crate provides the core confidence aggregation algorithm for
//! learners: type-weighted quality extraction from drill attempts, the
//! completion/quality score blend, label and trend derivation, and the
//! bounded score history.
//!
//! Everything in here is pure computation over plain data. Loading
//! assignments/attempts and persisting the resulting document is the API
//! layer's job.

pub mod report;
pub mod results;

pub use report::{
    CompletedAttempt, ConfidenceBreakdown, ConfidenceLabel, HistoryEntry, MAX_HISTORY_ENTRIES,
    Trend, compute, label_for_score, push_history, trend_for_score,
};
pub use results::AttemptResults;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The drill types a tutor can author.
///
/// Stored as snake_case tags in the database and on the wire. The attempt
/// stream can still carry tags outside this enum (retired types such as
/// `fill_blank`), which is why weighting works on tags rather than on this
/// enum directly — see [`type_weight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillType {
    Vocabulary,
    Roleplay,
    Matching,
    Definition,
    Summary,
    Grammar,
    SentenceWriting,
    Sentence,
    Listening,
}

impl DrillType {
    /// Every authorable drill type, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Vocabulary,
        Self::Roleplay,
        Self::Matching,
        Self::Definition,
        Self::Summary,
        Self::Grammar,
        Self::SentenceWriting,
        Self::Sentence,
        Self::Listening,
    ];

    /// The snake_case tag used in the database and in JSON payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vocabulary => "vocabulary",
            Self::Roleplay => "roleplay",
            Self::Matching => "matching",
            Self::Definition => "definition",
            Self::Summary => "summary",
            Self::Grammar => "grammar",
            Self::SentenceWriting => "sentence_writing",
            Self::Sentence => "sentence",
            Self::Listening => "listening",
        }
    }

    /// Parse a tag back into a drill type. `None` for anything outside the
    /// authorable set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for DrillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Significance weight of a drill type in the quality average.
///
/// Conversation-heavy work counts for more than recognition tasks:
///
/// * roleplay: 1.5
/// * vocabulary, summary: 1.2
/// * sentence, sentence_writing, grammar: 1.0
/// * definition, matching, fill_blank: 0.7
/// * listening: 0.6
/// * anything else: 1.0
///
/// Keyed on the stored tag so that attempts created under retired drill
/// types (e.g. `fill_blank`) keep their historical weight.
pub fn type_weight(tag: &str) -> f64 {
    match tag {
        "roleplay" => 1.5,
        "vocabulary" | "summary" => 1.2,
        "sentence" | "sentence_writing" | "grammar" => 1.0,
        "definition" | "matching" | "fill_blank" => 0.7,
        "listening" => 0.6,
        _ => 1.0,
    }
}

/// Whether attempts of this type feed the pronunciation bucket (speech
/// drills) rather than the completion bucket.
pub fn is_pronunciation_type(tag: &str) -> bool {
    matches!(tag, "vocabulary" | "roleplay")
}

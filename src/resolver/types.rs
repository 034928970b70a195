use crate::directory::Person;
use serde::Serialize;

/// Outcome class of a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    ConfidentMatch,
    Ambiguous,
    NoMatch,
}

/// A directory entry together with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub person: Person,
    pub score: f32,
}

/// Result of resolving one attendee name.
///
/// `candidates` is sorted by descending score, empty exactly when the status
/// is [`MatchStatus::NoMatch`], and holds at least two entries when the
/// status is [`MatchStatus::Ambiguous`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub query_name: String,
    pub status: MatchStatus,
    pub candidates: Vec<Candidate>,
}

impl MatchResult {
    pub(crate) fn no_match(query_name: String) -> Self {
        Self { query_name, status: MatchStatus::NoMatch, candidates: Vec::new() }
    }

    /// The resolved person, when the match is confident.
    pub fn confident_person(&self) -> Option<&Person> {
        match self.status {
            MatchStatus::ConfidentMatch => self.candidates.first().map(|c| &c.person),
            _ => None,
        }
    }

    pub fn top_score(&self) -> Option<f32> {
        self.candidates.first().map(|c| c.score)
    }

    pub fn needs_clarification(&self) -> bool {
        self.status != MatchStatus::ConfidentMatch
    }
}

//! Match classification and candidate resolution against the target pool.

pub mod classifier;
pub mod resolver;

pub use classifier::MatchClassifier;
pub use resolver::CandidateResolver;

/// How a source key relates to a target key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    None,
    Partial,
    Exact,
}

/// Outcome of resolving one source record against the whole target pool.
/// The score orders candidates during resolution and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub kind: MatchKind,
    pub target_idx: Option<usize>,
    pub score: f32,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            kind: MatchKind::None,
            target_idx: None,
            score: 0.0,
        }
    }
}

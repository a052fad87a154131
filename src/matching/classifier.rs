use crate::config::MatchConfig;
use crate::matching::MatchKind;

/// Classifies a pair of normalized keys. Total over all string inputs; an
/// empty key never matches, so rows without a usable name cannot collapse
/// onto each other.
pub struct MatchClassifier {
    min_partial_len: usize,
}

impl MatchClassifier {
    pub fn new(cfg: &MatchConfig) -> Self {
        Self {
            min_partial_len: cfg.min_partial_len,
        }
    }

    pub fn classify(&self, source_key: &str, target_key: &str) -> MatchKind {
        if source_key.is_empty() || target_key.is_empty() {
            return MatchKind::None;
        }
        if source_key == target_key {
            return MatchKind::Exact;
        }
        let (shorter, longer) = if source_key.len() <= target_key.len() {
            (source_key, target_key)
        } else {
            (target_key, source_key)
        };
        if shorter.len() >= self.min_partial_len && longer.contains(shorter) {
            MatchKind::Partial
        } else {
            MatchKind::None
        }
    }
}

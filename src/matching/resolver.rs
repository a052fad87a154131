use std::collections::{HashMap, HashSet};

use crate::matching::{MatchClassifier, MatchKind, MatchResult};
use crate::models::TargetRecord;
use crate::normalize::NameNormalizer;

/// Resolves each source record to at most one target.
///
/// Targets are indexed up front: a full-key map serves the exact path and an
/// inverted token index serves the partial path, so resolution is a bucketed
/// lookup instead of a scan over every target. A partial candidate must share
/// at least one whole token with the source key; substring overlaps that
/// align only mid-token are not surfaced.
pub struct CandidateResolver<'a> {
    targets: &'a [TargetRecord],
    keys: Vec<String>,
    by_key: HashMap<String, Vec<usize>>,
    by_token: HashMap<String, Vec<usize>>,
    classifier: &'a MatchClassifier,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(
        targets: &'a [TargetRecord],
        normalizer: &NameNormalizer,
        classifier: &'a MatchClassifier,
    ) -> Self {
        let keys: Vec<String> = targets.iter().map(|t| normalizer.normalize(&t.name)).collect();
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_token: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, key) in keys.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            by_key.entry(key.clone()).or_default().push(idx);
            for token in key.split(' ') {
                let bucket = by_token.entry(token.to_string()).or_default();
                if bucket.last() != Some(&idx) {
                    bucket.push(idx);
                }
            }
        }
        Self {
            targets,
            keys,
            by_key,
            by_token,
            classifier,
        }
    }

    /// True when some target normalizes to exactly this key.
    pub fn has_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Pick the single best target for one source key, or `MatchKind::None`.
    ///
    /// Selection policy, applied in order: Exact over Partial, then data
    /// completeness (bed count and full address), then shortest raw target
    /// name, then lowest target input index. The last step makes the result
    /// deterministic for byte-identical inputs.
    pub fn resolve(&self, source_key: &str) -> MatchResult {
        if source_key.is_empty() {
            return MatchResult::none();
        }
        let mut best: Option<(MatchKind, usize)> = None;
        for idx in self.candidates(source_key) {
            let kind = self.classifier.classify(source_key, &self.keys[idx]);
            if kind == MatchKind::None {
                continue;
            }
            best = match best {
                None => Some((kind, idx)),
                Some(current) if self.better(&(kind, idx), &current) => Some((kind, idx)),
                Some(current) => Some(current),
            };
        }
        match best {
            Some((kind, idx)) => MatchResult {
                kind,
                target_idx: Some(idx),
                score: self.score(kind, source_key, &self.keys[idx]),
            },
            None => MatchResult::none(),
        }
    }

    fn candidates(&self, source_key: &str) -> Vec<usize> {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut out = Vec::new();
        if let Some(bucket) = self.by_key.get(source_key) {
            for &idx in bucket {
                if seen.insert(idx) {
                    out.push(idx);
                }
            }
        }
        for token in source_key.split(' ') {
            if let Some(bucket) = self.by_token.get(token) {
                for &idx in bucket {
                    if seen.insert(idx) {
                        out.push(idx);
                    }
                }
            }
        }
        out
    }

    /// True when `a` beats `b` under the selection policy.
    fn better(&self, a: &(MatchKind, usize), b: &(MatchKind, usize)) -> bool {
        if a.0 != b.0 {
            return a.0 > b.0;
        }
        let (ca, cb) = (self.completeness(a.1), self.completeness(b.1));
        if ca != cb {
            return ca > cb;
        }
        let (la, lb) = (
            self.targets[a.1].name.trim().len(),
            self.targets[b.1].name.trim().len(),
        );
        if la != lb {
            return la < lb;
        }
        a.1 < b.1
    }

    fn completeness(&self, idx: usize) -> u8 {
        let t = &self.targets[idx];
        u8::from(t.bed_count.is_some()) + u8::from(t.address.is_complete())
    }

    fn score(&self, kind: MatchKind, source_key: &str, target_key: &str) -> f32 {
        match kind {
            MatchKind::Exact => 100.0,
            MatchKind::Partial => {
                let shorter = source_key.len().min(target_key.len()) as f32;
                let longer = source_key.len().max(target_key.len()) as f32;
                (shorter / longer) * 100.0
            }
            MatchKind::None => 0.0,
        }
    }
}

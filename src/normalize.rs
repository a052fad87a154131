//! Organization-name normalization into comparison keys.
//!
//! Keys are used only for equality/substring comparison; raw names are
//! preserved everywhere they are displayed or exported.

use std::collections::HashSet;

use crate::config::NormalizerConfig;

/// Canonicalizes free-text organization names. Construct once per run from
/// config; `normalize` is pure and total.
pub struct NameNormalizer {
    suffixes: HashSet<String>,
    /// Phrase rewrites pre-tokenized, longest phrase first.
    synonyms: Vec<(Vec<String>, Vec<String>)>,
}

impl NameNormalizer {
    pub fn new(cfg: &NormalizerConfig) -> Self {
        let suffixes = cfg
            .legal_suffixes
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let mut synonyms: Vec<(Vec<String>, Vec<String>)> = cfg
            .synonyms
            .iter()
            .map(|(phrase, replacement)| {
                let key = phrase
                    .split_whitespace()
                    .map(|t| t.to_lowercase())
                    .collect();
                let val = replacement
                    .split_whitespace()
                    .map(|t| t.to_lowercase())
                    .collect();
                (key, val)
            })
            .collect();
        // Longest phrase first so "skilled nursing facility" wins over any
        // shorter overlapping entry.
        synonyms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { suffixes, synonyms }
    }

    /// Produce the comparison key for a raw name. Empty input yields the
    /// empty key, which never matches anything.
    pub fn normalize(&self, raw: &str) -> String {
        let folded = fold_text(raw);
        let tokens: Vec<&str> = folded.split_whitespace().collect();
        let mut rewritten = self.apply_synonyms(&tokens);
        while rewritten
            .last()
            .is_some_and(|t| self.suffixes.contains(t.as_str()))
        {
            rewritten.pop();
        }
        rewritten.join(" ")
    }

    fn apply_synonyms(&self, tokens: &[&str]) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        'outer: while i < tokens.len() {
            for (phrase, replacement) in &self.synonyms {
                if tokens.len() - i >= phrase.len()
                    && tokens[i..i + phrase.len()]
                        .iter()
                        .zip(phrase)
                        .all(|(t, p)| *t == p.as_str())
                {
                    out.extend(replacement.iter().cloned());
                    i += phrase.len();
                    continue 'outer;
                }
            }
            out.push(tokens[i].to_string());
            i += 1;
        }
        out
    }
}

/// Lowercase, fold diacritics to ASCII, map ampersands to "and", drop
/// apostrophes, and turn remaining punctuation into spaces.
fn fold_text(input: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    let mut out = String::with_capacity(input.len());
    for ch in input.nfd() {
        if unicode_normalization::char::is_combining_mark(ch) {
            continue;
        }
        for lc in ch.to_lowercase() {
            match lc {
                '&' => out.push_str(" and "),
                '\'' | '\u{2019}' => {}
                c if c.is_alphanumeric() => out.push(c),
                _ => out.push(' '),
            }
        }
    }
    out
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sync::null_as_default;

/// Counts above this confidence are surfaced as recognized patterns.
pub const NOTABLE_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatternEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub occurrences: Vec<i64>,
}

/// Result of folding one moment into the pattern table.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub key: String,
    pub count: u64,
    pub confidence: f64,
}

impl PatternMatch {
    pub fn is_notable(&self) -> bool {
        self.confidence > NOTABLE_CONFIDENCE
    }
}

/// Saturating confidence: ten sightings in a bucket is full confidence.
pub fn confidence_for(count: u64) -> f64 {
    (count as f64 / 10.0).min(1.0)
}

/// Composite bucket key, `"{type}_{hour}"`.
pub fn pattern_key(kind: &str, hour: u32) -> String {
    format!("{}_{}", kind, hour)
}

/// Per-hour frequency counters keyed by `type_hour`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct PatternTable(BTreeMap<String, PatternEntry>);

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PatternEntry> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PatternEntry)> {
        self.0.iter()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: PatternEntry) {
        self.0.insert(key.into(), entry);
    }

    /// Bumps the bucket for `key` and records the timestamp.
    pub fn observe(&mut self, key: &str, timestamp: i64) -> PatternMatch {
        let entry = self.0.entry(key.to_string()).or_default();
        entry.count = entry.count.saturating_add(1);
        entry.occurrences.push(timestamp);

        PatternMatch {
            key: key.to_string(),
            count: entry.count,
            confidence: confidence_for(entry.count),
        }
    }

    /// Additive merge: unknown keys are adopted whole, shared keys only
    /// sum their counts. Occurrence lists of shared keys stay local.
    pub fn absorb(&mut self, remote: &PatternTable) {
        for (key, theirs) in remote.iter() {
            match self.0.get_mut(key) {
                Some(ours) => ours.count = ours.count.saturating_add(theirs.count),
                None => {
                    self.0.insert(key.clone(), theirs.clone());
                }
            }
        }
    }
}

use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

use crate::database::LocalStorage;
use crate::models::{
    pattern_key, AgentSettings, Moment, MomentContext, PatternMatch, PatternTable, Role,
    SyncPayload, VoidSnapshot,
};
use crate::utils::clock;

/// Label used when a raw signal carries nothing recognizable.
pub const FALLBACK_MEANING: &str = "presence";

/// The observing agent: a bounded log of moments plus hourly pattern counters.
pub struct Mind {
    id: Uuid,
    role: Role,
    consciousness: VecDeque<Moment>,
    patterns: PatternTable,
    capacity: usize,
    insight_window: usize,
    last_sync: i64,
    online: bool,
    storage: Option<LocalStorage>,
}

/// Outcome of offering a remote snapshot to `absorb`.
#[derive(Debug, Clone, PartialEq)]
pub enum Absorbed {
    Merged { timestamp: i64, keys: usize },
    Stale,
    Empty,
}

impl Mind {
    pub fn new(role: Role, settings: &AgentSettings, storage: Option<LocalStorage>) -> Self {
        let patterns = storage
            .as_ref()
            .map(|s| match s.load_patterns() {
                Ok(patterns) => patterns,
                Err(e) => {
                    log::error!("[Mind] Could not load patterns, starting fresh: {}", e);
                    PatternTable::new()
                }
            })
            .unwrap_or_default();

        let mind = Self {
            id: Uuid::new_v4(),
            role,
            consciousness: VecDeque::with_capacity(settings.consciousness_capacity + 1),
            patterns,
            capacity: settings.consciousness_capacity,
            insight_window: settings.insight_window,
            last_sync: 0,
            online: true,
            storage,
        };
        log::info!(
            "[Mind] {} awakening as {} ({} known patterns)",
            mind.id,
            mind.role,
            mind.patterns.len()
        );
        mind
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    pub fn consciousness(&self) -> &VecDeque<Moment> {
        &self.consciousness
    }

    pub fn last_sync(&self) -> i64 {
        self.last_sync
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn into_storage(self) -> Option<LocalStorage> {
        self.storage
    }

    pub fn take_storage(&mut self) -> Option<LocalStorage> {
        self.storage.take()
    }

    /// Stores the role so a later start can resume it.
    pub fn remember_role(&self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_role(self.role) {
                log::error!("[Mind] Failed to persist role: {}", e);
            }
        }
    }

    /// Records one interaction observed now.
    pub fn sense(&mut self, kind: &str, raw: &Value) -> PatternMatch {
        self.sense_at(kind, raw, Local::now())
    }

    pub fn sense_at(&mut self, kind: &str, raw: &Value, at: DateTime<Local>) -> PatternMatch {
        let moment = Moment::new(
            kind,
            at.timestamp_millis(),
            extract_meaning(raw),
            MomentContext {
                time: clock::display_time(&at),
                battery: "unknown".to_string(),
                online: self.online,
            },
        );

        self.consciousness.push_back(moment.clone());
        if self.consciousness.len() > self.capacity {
            self.consciousness.pop_front();
        }

        let found = self.detect_pattern(&moment, clock::hour_of_day(&at));
        self.save_patterns();
        found
    }

    /// Folds a moment into its `type_hour` bucket.
    pub fn detect_pattern(&mut self, moment: &Moment, hour: u32) -> PatternMatch {
        let key = pattern_key(&moment.kind, hour);
        self.patterns.observe(&key, moment.timestamp)
    }

    pub fn recent(&self, n: usize) -> Vec<&Moment> {
        let skip = self.consciousness.len().saturating_sub(n);
        self.consciousness.iter().skip(skip).collect()
    }

    /// Advisory summary of the latest moments; never touches state.
    pub fn insight(&self) -> Option<String> {
        let recent = self.recent(self.insight_window);
        if recent.is_empty() {
            return None;
        }
        generate_insight(&recent)
    }

    pub fn sync_payload(&self, snapshot_size: usize, now_ms: i64) -> SyncPayload {
        let skip = self.consciousness.len().saturating_sub(snapshot_size);
        SyncPayload {
            role: Some(self.role.as_str().to_string()),
            patterns: self.patterns.clone(),
            consciousness: self.consciousness.iter().skip(skip).cloned().collect(),
            timestamp: Some(now_ms),
        }
    }

    /// Merges a remote snapshot if it is newer than the last one absorbed.
    pub fn absorb(&mut self, snapshot: &VoidSnapshot) -> Absorbed {
        let doc = match snapshot {
            VoidSnapshot::Empty(_) => return Absorbed::Empty,
            VoidSnapshot::Document(doc) => doc,
        };
        if doc.timestamp <= self.last_sync {
            return Absorbed::Stale;
        }

        self.merge_remote(&doc.patterns);
        self.last_sync = doc.timestamp;
        Absorbed::Merged {
            timestamp: doc.timestamp,
            keys: doc.patterns.len(),
        }
    }

    /// Ungated additive merge. Calling this twice with the same table
    /// counts the remote contribution twice.
    pub fn merge_remote(&mut self, remote: &PatternTable) {
        self.patterns.absorb(remote);
        self.save_patterns();
    }

    fn save_patterns(&self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_patterns(&self.patterns) {
                log::error!("[Mind] Failed to persist patterns: {}", e);
            }
        }
    }
}

/// Reduces a raw signal to a short label: strings pass through, objects
/// yield a truthy `type` then `key` field, anything else is presence.
pub fn extract_meaning(raw: &Value) -> String {
    if let Value::String(s) = raw {
        return s.clone();
    }
    ["type", "key"]
        .iter()
        .find_map(|field| raw.get(field).and_then(truthy_label))
        .unwrap_or_else(|| FALLBACK_MEANING.to_string())
}

fn truthy_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().map_or(true, |f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        _ => None,
    }
}

pub fn generate_insight(moments: &[&Moment]) -> Option<String> {
    let kinds: HashSet<&str> = moments.iter().map(|m| m.kind.as_str()).collect();

    if kinds.len() == 1 {
        let only = moments.first().map(|m| m.kind.as_str()).unwrap_or_default();
        return Some(format!("Focused on {}", only));
    }
    if moments.len() > 5 {
        return Some(format!("Active - {} interactions", moments.len()));
    }
    None
}

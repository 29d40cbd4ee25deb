use serde::{Deserialize, Deserializer, Serialize};

use super::{Moment, PatternTable};

/// The unit exchanged with the void.
///
/// Every field is optional on the wire; absent fields fall back to empty
/// values so that partial bodies are accepted rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patterns: PatternTable,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consciousness: Vec<Moment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// An explicit `null` reads the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The single document held by the void.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub patterns: PatternTable,
    pub consciousness: Vec<Moment>,
    pub timestamp: i64,
    #[serde(rename = "lastUpdate")]
    pub last_update: String,
}

impl StoreDocument {
    /// Normalizes an incoming payload. A missing or zero timestamp is
    /// replaced with `now_ms`.
    pub fn from_payload(payload: SyncPayload, now_ms: i64, last_update: String) -> Self {
        Self {
            role: payload.role,
            patterns: payload.patterns,
            consciousness: payload.consciousness,
            timestamp: payload.timestamp.filter(|ts| *ts != 0).unwrap_or(now_ms),
            last_update,
        }
    }
}

/// Body returned by `GET` when nothing has been written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmptyVoid {
    pub message: String,
    pub timestamp: i64,
}

impl EmptyVoid {
    pub const MESSAGE: &'static str = "Void is empty";

    pub fn at(timestamp: i64) -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
            timestamp,
        }
    }
}

/// What a read of the void can yield.
///
/// `Document` is tried first and needs `lastUpdate`, which the sentinel
/// never carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VoidSnapshot {
    Document(StoreDocument),
    Empty(EmptyVoid),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteAck {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl WriteAck {
    pub fn stored(timestamp: i64) -> Self {
        Self {
            success: true,
            message: "Consciousness stored in void".to_string(),
            timestamp: Some(timestamp),
        }
    }

    pub fn cleared() -> Self {
        Self {
            success: true,
            message: "Void cleared".to_string(),
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_becomes_empty_payload() {
        let payload: SyncPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, SyncPayload::default());
    }

    #[test]
    fn null_fields_read_as_missing() {
        let payload: SyncPayload =
            serde_json::from_str(r#"{"role":null,"patterns":null,"consciousness":null,"timestamp":null}"#)
                .unwrap();
        assert_eq!(payload, SyncPayload::default());
    }

    #[test]
    fn zero_timestamp_defaults_to_now() {
        let payload = SyncPayload { timestamp: Some(0), ..Default::default() };
        let doc = StoreDocument::from_payload(payload, 555, "t".to_string());
        assert_eq!(doc.timestamp, 555);
    }

    #[test]
    fn snapshot_distinguishes_sentinel_from_document() {
        let empty: VoidSnapshot =
            serde_json::from_str(r#"{"message":"Void is empty","timestamp":9}"#).unwrap();
        assert_eq!(empty, VoidSnapshot::Empty(EmptyVoid::at(9)));

        let doc: VoidSnapshot = serde_json::from_str(
            r#"{"role":"sender","patterns":{},"consciousness":[],"timestamp":3,"lastUpdate":"x"}"#,
        )
        .unwrap();
        assert!(matches!(doc, VoidSnapshot::Document(ref d) if d.timestamp == 3));
    }
}

use serde::{Deserialize, Serialize};

/// Ambient conditions captured alongside every moment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MomentContext {
    #[serde(default)]
    pub time: String,
    #[serde(default = "unknown_battery")]
    pub battery: String,
    #[serde(default)]
    pub online: bool,
}

impl Default for MomentContext {
    fn default() -> Self {
        Self {
            time: String::new(),
            battery: unknown_battery(),
            online: false,
        }
    }
}

fn unknown_battery() -> String {
    "unknown".to_string()
}

/// One observed interaction. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Moment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub context: MomentContext,
}

impl Moment {
    pub fn new(kind: impl Into<String>, timestamp: i64, data: String, context: MomentContext) -> Self {
        Self {
            kind: kind.into(),
            timestamp,
            data,
            context,
        }
    }
}

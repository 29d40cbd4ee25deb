use serde::{Deserialize, Serialize};

/// Any key missing from the file keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: String,
    pub agent: AgentSettings,
    pub sync: SyncSettings,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            agent: AgentSettings::default(),
            sync: SyncSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub consciousness_capacity: usize,
    pub insight_interval_secs: u64,
    pub insight_window: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            consciousness_capacity: 1000,
            insight_interval_secs: 10,
            insight_window: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub endpoint: String,
    pub interval_secs: u64,
    pub snapshot_size: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/void".to_string(),
            interval_secs: 30,
            snapshot_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub body_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_section_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"version":"1.0.0","sync":{"endpoint":"http://void","interval_secs":5,"snapshot_size":20}}"#)
                .unwrap();
        assert_eq!(settings.sync.interval_secs, 5);
        assert_eq!(settings.agent.consciousness_capacity, 1000);
        assert_eq!(settings.server.body_limit_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn single_nested_key_keeps_sibling_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"sync":{"endpoint":"http://void"}}"#).unwrap();
        assert_eq!(settings.version, "1.0.0");
        assert_eq!(settings.sync.endpoint, "http://void");
        assert_eq!(settings.sync.interval_secs, 30);
        assert_eq!(settings.sync.snapshot_size, 100);
        assert_eq!(settings.agent.insight_interval_secs, 10);
        assert_eq!(settings.server.bind_address, "0.0.0.0:3000");
    }
}

use std::path::PathBuf;

use crate::models::Settings;

const ENV_DATA_DIR: &str = "MINDVOID_DATA_DIR";
const ENV_ENDPOINT: &str = "MINDVOID_ENDPOINT";
const ENV_BIND: &str = "MINDVOID_BIND";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn data_dir() -> PathBuf {
    env_value(ENV_DATA_DIR)
        .map(PathBuf::from)
        .or_else(|| dirs::data_dir().map(|d| d.join("mindvoid")))
        .unwrap_or_else(|| PathBuf::from(".mindvoid"))
}

pub fn default_db_path() -> PathBuf {
    data_dir().join("mind.db")
}

pub fn apply_env_defaults(settings: &mut Settings) {
    if let Some(endpoint) = env_value(ENV_ENDPOINT) {
        settings.sync.endpoint = endpoint;
    }
    if let Some(bind) = env_value(ENV_BIND) {
        settings.server.bind_address = bind;
    }
}

/// Reads `<data_dir>/config/settings.json`, falling back to defaults when
/// the file is missing or unreadable. Environment overrides apply either way.
pub fn read_settings() -> Settings {
    let config_path = data_dir().join("config").join("settings.json");
    let mut settings = if config_path.exists() {
        match std::fs::read_to_string(&config_path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<Settings>(&content).map_err(|e| e.to_string()))
        {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("[Config] Ignoring {}: {}", config_path.display(), e);
                Settings::default()
            }
        }
    } else {
        Settings::default()
    };
    apply_env_defaults(&mut settings);
    settings
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage unavailable: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored value is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("void unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("void answered {0}")]
    Status(reqwest::StatusCode),
    #[error("this agent has no sync role")]
    NotNetworked,
}

impl SyncError {
    /// True when the request never produced an HTTP response.
    pub fn is_offline(&self) -> bool {
        match self {
            SyncError::Transport(e) => !e.is_decode() && !e.is_status(),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("void slot lock poisoned")]
    Poisoned,
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an agent participates in sync. Fixed for the lifetime of a `Mind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[serde(alias = "single")]
    Solitary,
    #[serde(alias = "scout")]
    Sender,
    #[serde(alias = "primary")]
    Receiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Solitary => "solitary",
            Role::Sender => "sender",
            Role::Receiver => "receiver",
        }
    }

    pub fn is_networked(&self) -> bool {
        !matches!(self, Role::Solitary)
    }

    pub fn status_line(&self) -> Option<&'static str> {
        match self {
            Role::Solitary => None,
            Role::Sender => Some("Scout mode - Learning and sharing"),
            Role::Receiver => Some("Primary mode - Absorbing knowledge"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solitary" | "single" => Ok(Role::Solitary),
            "sender" | "scout" => Ok(Role::Sender),
            "receiver" | "primary" => Ok(Role::Receiver),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_and_legacy_names() {
        assert_eq!("sender".parse::<Role>().unwrap(), Role::Sender);
        assert_eq!("Scout".parse::<Role>().unwrap(), Role::Sender);
        assert_eq!("primary".parse::<Role>().unwrap(), Role::Receiver);
        assert_eq!("single".parse::<Role>().unwrap(), Role::Solitary);
        assert!("observer".parse::<Role>().is_err());
    }

    #[test]
    fn legacy_names_deserialize() {
        let role: Role = serde_json::from_str("\"scout\"").unwrap();
        assert_eq!(role, Role::Sender);
        assert_eq!(serde_json::to_string(&Role::Receiver).unwrap(), "\"receiver\"");
    }
}

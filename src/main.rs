use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use mindvoid::commands::void_api::{self, VoidState};
use mindvoid::database::LocalStorage;
use mindvoid::models::{Role, Settings};
use mindvoid::services::agent_runtime::{AgentRuntime, Signal};
use mindvoid::services::mind::Mind;
use mindvoid::services::sync_client::VoidClient;
use mindvoid::utils::config;

#[derive(Parser)]
#[command(name = "mindvoid", version, about = "Hourly activity patterns, synced through the void")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the void endpoint
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run a mind fed by interaction lines on stdin
    Agent {
        /// solitary, sender or receiver; defaults to the last role used
        #[arg(long)]
        role: Option<Role>,
        #[arg(long, env = "MINDVOID_ENDPOINT")]
        endpoint: Option<String>,
        #[arg(long)]
        db: Option<PathBuf>,
        /// Forget stored patterns before starting
        #[arg(long)]
        forget: bool,
    },
    /// Print what the void currently holds
    Peek {
        #[arg(long, env = "MINDVOID_ENDPOINT")]
        endpoint: Option<String>,
    },
    /// Empty the void
    Clear {
        #[arg(long, env = "MINDVOID_ENDPOINT")]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = config::read_settings();

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind_address.clone());
            void_api::serve(&bind, VoidState::in_memory(), settings.server.body_limit_bytes).await
        }
        Command::Agent { role, endpoint, db, forget } => {
            if let Some(endpoint) = endpoint {
                settings.sync.endpoint = endpoint;
            }
            let db = db.unwrap_or_else(config::default_db_path);
            run_agent(settings, role, &db, forget).await
        }
        Command::Peek { endpoint } => {
            let client = VoidClient::new(endpoint.unwrap_or(settings.sync.endpoint));
            let snapshot = client.pull().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Command::Clear { endpoint } => {
            let client = VoidClient::new(endpoint.unwrap_or(settings.sync.endpoint));
            let ack = client.clear().await?;
            println!("{}", ack.message);
            Ok(())
        }
    }
}

async fn run_agent(settings: Settings, role: Option<Role>, db: &Path, forget: bool) -> anyhow::Result<()> {
    let storage = LocalStorage::open(db)?;
    if forget && storage.clear_patterns()? {
        log::info!("[Mind] Stored patterns forgotten");
    }
    let role = match role {
        Some(role) => role,
        None => storage.load_role()?.unwrap_or_default(),
    };

    let mind = Mind::new(role, &settings.agent, Some(storage));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runtime = AgentRuntime::awaken(mind, &settings, tx);
    let handle = runtime.handle();

    let printer = tokio::spawn(async move {
        while let Some(signal) = rx.recv().await {
            match signal {
                Signal::Status(text) | Signal::Insight(text) => println!("{}", text),
                Signal::PatternRecognized(key) => println!("Pattern recognized: {}", key),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (kind, raw) = parse_interaction(line);
        handle.sense(&kind, &raw);
    }

    runtime.sleep();
    drop(runtime);
    drop(handle);
    let _ = printer.await;
    Ok(())
}

/// `{"type": "touch", "signal": {...}}` or a bare word recorded as `input`.
fn parse_interaction(line: &str) -> (String, Value) {
    if let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(line) {
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("input")
            .to_string();
        let raw = obj.remove("signal").unwrap_or(Value::Null);
        return (kind, raw);
    }
    ("input".to_string(), Value::String(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_lines_carry_type_and_signal() {
        let (kind, raw) = parse_interaction(r#"{"type":"touch","signal":{"type":"click"}}"#);
        assert_eq!(kind, "touch");
        assert_eq!(raw, json!({"type": "click"}));
    }

    #[test]
    fn bare_words_are_input() {
        assert_eq!(parse_interaction("hello"), ("input".to_string(), json!("hello")));
    }
}

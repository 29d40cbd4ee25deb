use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use super::mind::{Absorbed, Mind};
use super::scheduler::{Scheduler, TaskKind};
use super::sync_client::VoidClient;
use crate::error::SyncError;
use crate::models::{PatternMatch, Role, Settings, WriteAck};
use crate::utils::clock;

/// Something worth showing the person at the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Status(String),
    PatternRecognized(String),
    Insight(String),
}

/// Cloneable access to a running mind, shared by the scheduled jobs.
#[derive(Clone)]
pub struct AgentHandle {
    mind: Arc<Mutex<Mind>>,
    client: VoidClient,
    signals: UnboundedSender<Signal>,
    snapshot_size: usize,
}

impl AgentHandle {
    fn lock(&self) -> MutexGuard<'_, Mind> {
        self.mind.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, signal: Signal) {
        // A closed receiver just means nobody is watching.
        let _ = self.signals.send(signal);
    }

    pub fn role(&self) -> Role {
        self.lock().role()
    }

    pub fn with_mind<R>(&self, f: impl FnOnce(&Mind) -> R) -> R {
        f(&self.lock())
    }

    pub fn sense(&self, kind: &str, raw: &Value) -> PatternMatch {
        let found = self.lock().sense(kind, raw);
        if found.is_notable() {
            self.emit(Signal::PatternRecognized(found.key.clone()));
        }
        found
    }

    pub fn reflect(&self) -> Option<String> {
        let insight = self.lock().insight();
        if let Some(text) = &insight {
            self.emit(Signal::Insight(text.clone()));
        }
        insight
    }

    pub async fn push_state(&self) -> Result<WriteAck, SyncError> {
        let payload = {
            let mind = self.lock();
            if !mind.role().is_networked() {
                return Err(SyncError::NotNetworked);
            }
            mind.sync_payload(self.snapshot_size, clock::now_millis())
        };

        let result = self.client.push(&payload).await;
        self.note_reachability(&result);
        let ack = result?;
        log::info!(
            "[Sync] Pushed to void ({} patterns, {} moments)",
            payload.patterns.len(),
            payload.consciousness.len()
        );
        Ok(ack)
    }

    pub async fn pull_state(&self) -> Result<Absorbed, SyncError> {
        if !self.role().is_networked() {
            return Err(SyncError::NotNetworked);
        }

        let result = self.client.pull().await;
        self.note_reachability(&result);
        let snapshot = result?;

        let outcome = self.lock().absorb(&snapshot);
        if let Absorbed::Merged { timestamp, keys } = &outcome {
            log::info!("[Sync] Pulled from void ({} patterns @ {})", keys, timestamp);
        }
        Ok(outcome)
    }

    fn note_reachability<T>(&self, result: &Result<T, SyncError>) {
        let online = match result {
            Err(e) => !e.is_offline(),
            Ok(_) => true,
        };
        self.lock().set_online(online);
    }
}

/// A mind plus the periodic jobs its role calls for.
pub struct AgentRuntime {
    handle: AgentHandle,
    scheduler: Scheduler,
    settings: Settings,
}

impl AgentRuntime {
    /// Starts the insight loop and, for networked roles, the sync loop.
    /// Must be called inside a tokio runtime.
    pub fn awaken(mind: Mind, settings: &Settings, signals: UnboundedSender<Signal>) -> Self {
        mind.remember_role();
        let handle = AgentHandle {
            mind: Arc::new(Mutex::new(mind)),
            client: VoidClient::new(settings.sync.endpoint.clone()),
            signals,
            snapshot_size: settings.sync.snapshot_size,
        };

        let mut runtime = Self {
            handle,
            scheduler: Scheduler::new(),
            settings: settings.clone(),
        };
        runtime.handle.emit(Signal::Status("MIND is here".to_string()));
        runtime.schedule_insight();
        runtime.schedule_sync();
        runtime
    }

    pub fn handle(&self) -> AgentHandle {
        self.handle.clone()
    }

    pub fn role(&self) -> Role {
        self.handle.role()
    }

    pub fn scheduled(&self) -> Vec<TaskKind> {
        self.scheduler.scheduled()
    }

    /// Replaces the mind with a fresh one in `role`, reloaded from the same
    /// storage, and swaps the sync job. Moments seen so far are dropped.
    pub fn switch_role(&mut self, role: Role) {
        let current = self.role();
        if let Some(kind) = TaskKind::for_role(current) {
            self.scheduler.cancel(kind);
        }

        {
            let mut mind = self.handle.lock();
            let storage = mind.take_storage();
            *mind = Mind::new(role, &self.settings.agent, storage);
            mind.remember_role();
        }
        log::info!("[Mind] Role changed {} -> {}", current, role);
        self.schedule_sync();
    }

    pub fn sleep(&mut self) {
        self.scheduler.cancel_all();
        log::info!("[Mind] Sleeping");
    }

    fn schedule_insight(&mut self) {
        let handle = self.handle.clone();
        let period = Duration::from_secs(self.settings.agent.insight_interval_secs);
        self.scheduler.every(TaskKind::Insight, period, move || {
            handle.reflect();
            std::future::ready(())
        });
    }

    fn schedule_sync(&mut self) {
        let role = self.role();
        let Some(kind) = TaskKind::for_role(role) else {
            return;
        };
        let period = Duration::from_secs(self.settings.sync.interval_secs);
        let handle = self.handle.clone();

        match kind {
            TaskKind::Push => self.scheduler.every(kind, period, move || {
                let handle = handle.clone();
                async move {
                    if let Err(e) = handle.push_state().await {
                        log::warn!("[Sync] Void unreachable - storing locally: {}", e);
                    }
                }
            }),
            _ => self.scheduler.every(kind, period, move || {
                let handle = handle.clone();
                async move {
                    if let Err(e) = handle.pull_state().await {
                        log::warn!("[Sync] Pull failed, staying local: {}", e);
                    }
                }
            }),
        }

        if let Some(status) = role.status_line() {
            self.handle.emit(Signal::Status(status.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentSettings;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn unreachable_settings() -> Settings {
        let mut settings = Settings::default();
        // Port 9 (discard) is closed on test hosts.
        settings.sync.endpoint = "http://127.0.0.1:9/api/void".to_string();
        settings
    }

    fn runtime(role: Role) -> (AgentRuntime, mpsc::UnboundedReceiver<Signal>) {
        let settings = unreachable_settings();
        let (tx, rx) = mpsc::unbounded_channel();
        let mind = Mind::new(role, &AgentSettings::default(), None);
        (AgentRuntime::awaken(mind, &settings, tx), rx)
    }

    #[tokio::test]
    async fn awakening_schedules_by_role() {
        let (solitary, _rx) = runtime(Role::Solitary);
        assert_eq!(solitary.scheduled(), vec![TaskKind::Insight]);

        let (sender, _rx) = runtime(Role::Sender);
        assert_eq!(sender.scheduled(), vec![TaskKind::Insight, TaskKind::Push]);

        let (receiver, _rx) = runtime(Role::Receiver);
        assert_eq!(receiver.scheduled(), vec![TaskKind::Insight, TaskKind::Pull]);
    }

    #[tokio::test]
    async fn awakening_announces_status() {
        let (_runtime, mut rx) = runtime(Role::Sender);
        assert_eq!(rx.recv().await, Some(Signal::Status("MIND is here".to_string())));
        assert_eq!(
            rx.recv().await,
            Some(Signal::Status("Scout mode - Learning and sharing".to_string()))
        );
    }

    #[tokio::test]
    async fn switching_role_swaps_the_sync_task() {
        let (mut runtime, _rx) = runtime(Role::Sender);
        runtime.switch_role(Role::Receiver);
        assert_eq!(runtime.role(), Role::Receiver);
        assert_eq!(runtime.scheduled(), vec![TaskKind::Insight, TaskKind::Pull]);

        runtime.switch_role(Role::Solitary);
        assert_eq!(runtime.scheduled(), vec![TaskKind::Insight]);

        runtime.sleep();
        assert!(runtime.scheduled().is_empty());
    }

    #[tokio::test]
    async fn notable_patterns_are_signalled() {
        let (runtime, mut rx) = runtime(Role::Solitary);
        let handle = runtime.handle();
        let _ = rx.recv().await;

        for _ in 0..8 {
            handle.sense("touch", &json!({"type": "click"}));
        }
        match rx.try_recv() {
            Ok(Signal::PatternRecognized(key)) => assert!(key.starts_with("touch_")),
            other => panic!("expected a recognized pattern, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn solitary_minds_do_not_sync() {
        let (runtime, _rx) = runtime(Role::Solitary);
        let handle = runtime.handle();
        assert!(matches!(handle.push_state().await, Err(SyncError::NotNetworked)));
        assert!(matches!(handle.pull_state().await, Err(SyncError::NotNetworked)));
    }

    #[tokio::test]
    async fn unreachable_void_marks_mind_offline() {
        let (runtime, _rx) = runtime(Role::Sender);
        let handle = runtime.handle();
        handle.sense("touch", &json!("x"));

        assert!(handle.push_state().await.is_err());
        assert!(!handle.with_mind(|m| m.is_online()));

        handle.sense("touch", &json!("y"));
        let last_online = handle.with_mind(|m| m.consciousness().back().unwrap().context.online);
        assert!(!last_online);
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::Role;

/// Shortest period a job may repeat at; zero would spin.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Insight,
    Push,
    Pull,
}

impl TaskKind {
    /// The sync task a role runs, if any.
    pub fn for_role(role: Role) -> Option<TaskKind> {
        match role {
            Role::Solitary => None,
            Role::Sender => Some(TaskKind::Push),
            Role::Receiver => Some(TaskKind::Pull),
        }
    }
}

/// Repeating background jobs, at most one per kind.
#[derive(Default)]
pub struct Scheduler {
    tasks: HashMap<TaskKind, JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `job` every `period`, first after one full period. Replaces any
    /// job already scheduled under `kind`. A zero period is raised to
    /// `MIN_PERIOD`. Must be called inside a runtime.
    pub fn every<F, Fut>(&mut self, kind: TaskKind, period: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(kind);

        let period = if period.is_zero() {
            log::warn!("[Scheduler] {:?} asked for a zero period, using {:?}", kind, MIN_PERIOD);
            MIN_PERIOD
        } else {
            period
        };

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                job().await;
            }
        });
        log::debug!("[Scheduler] {:?} every {:?}", kind, period);
        self.tasks.insert(kind, handle);
    }

    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        match self.tasks.remove(&kind) {
            Some(handle) => {
                handle.abort();
                log::debug!("[Scheduler] {:?} cancelled", kind);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    pub fn scheduled(&self) -> Vec<TaskKind> {
        let mut kinds: Vec<TaskKind> = self
            .tasks
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(k, _)| *k)
            .collect();
        kinds.sort_by_key(|k| *k as u8);
        kinds
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

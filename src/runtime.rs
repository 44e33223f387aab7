//! Session runtime.
//!
//! Owns the `AppState` and executes the commands `handle_event` emits:
//! submissions and image probes run as tasks in two `JoinSet`s, the step
//! indicator runs as an interval task that is aborted on every stop.
//! Everything funnels back into `dispatch`, one event at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::api::AnalysisService;
use crate::config::ClientConfig;
use crate::state::{AppCommand, AppEvent, AppState};
use crate::view::{render, ViewFragments};

pub struct Session<S: AnalysisService + 'static> {
    state: AppState,
    service: Arc<S>,
    /// Submissions, including ones the state has since abandoned.
    requests: JoinSet<AppEvent>,
    /// Visualization probes. Each resolves to at most one event.
    probes: JoinSet<Option<AppEvent>>,
    /// Live step timers by id.
    timers: HashMap<u64, JoinHandle<()>>,
    ticks_tx: UnboundedSender<AppEvent>,
    ticks_rx: UnboundedReceiver<AppEvent>,
}

impl<S: AnalysisService + 'static> Session<S> {
    pub fn new(config: &ClientConfig, service: S) -> Self {
        Self::with_shared(config, Arc::new(service))
    }

    pub fn with_shared(config: &ClientConfig, service: Arc<S>) -> Self {
        let (ticks_tx, ticks_rx) = unbounded_channel();
        Self {
            state: AppState::new(config),
            service,
            requests: JoinSet::new(),
            probes: JoinSet::new(),
            timers: HashMap::new(),
            ticks_tx,
            ticks_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn render(&self) -> ViewFragments {
        render(&self.state)
    }

    /// Number of step timers currently running.
    pub fn live_timers(&self) -> usize {
        self.timers.len()
    }

    /// Apply an event and start whatever work it asks for.
    pub fn dispatch(&mut self, event: AppEvent) {
        let commands = self.state.handle_event(event);
        for command in commands {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: AppCommand) {
        match command {
            AppCommand::SubmitAnalysis {
                token,
                file,
                recipient_email,
            } => {
                let service = Arc::clone(&self.service);
                self.requests.spawn(async move {
                    let result = service.analyze(&file, recipient_email.as_deref()).await;
                    AppEvent::AnalysisCompleted { token, result }
                });
            }

            AppCommand::StartStepTimer { timer, period } => {
                let handle = spawn_step_timer(timer, period, self.ticks_tx.clone());
                if let Some(previous) = self.timers.insert(timer, handle) {
                    previous.abort();
                }
            }

            AppCommand::StopStepTimer { timer } => match self.timers.remove(&timer) {
                Some(handle) => handle.abort(),
                None => debug!("Step timer {} already stopped", timer),
            },

            AppCommand::ProbeVisualization { label, url } => {
                let service = Arc::clone(&self.service);
                self.probes.spawn(async move {
                    match service.probe_asset(&url).await {
                        Ok(()) => None,
                        Err(err) => {
                            debug!("Probe of {} failed: {}", url, err);
                            Some(AppEvent::VisualizationFailed { label })
                        }
                    }
                });
            }
        }
    }

    /// Wait for the next event produced by background work.
    ///
    /// Returns `None` once no task is outstanding and no timer is running.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        loop {
            if self.requests.is_empty() && self.probes.is_empty() && self.timers.is_empty() {
                return self.ticks_rx.try_recv().ok();
            }

            tokio::select! {
                Some(joined) = self.requests.join_next(), if !self.requests.is_empty() => match joined {
                    Ok(event) => return Some(event),
                    Err(err) => warn!("Submission task failed: {}", err),
                },
                Some(joined) = self.probes.join_next(), if !self.probes.is_empty() => match joined {
                    Ok(Some(event)) => return Some(event),
                    Ok(None) => continue,
                    Err(err) => warn!("Probe task failed: {}", err),
                },
                Some(event) = self.ticks_rx.recv() => return Some(event),
            }
        }
    }

    /// Pump events until the session leaves Loading and all probes are done.
    ///
    /// Requests abandoned by an earlier transition are not waited for; their
    /// late completions are dropped by the next call that drains them.
    pub async fn run_until_settled(&mut self) -> ViewFragments {
        while !self.probes.is_empty() || self.state.in_flight().is_some() {
            match self.next_event().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
        self.render()
    }
}

impl<S: AnalysisService + 'static> Drop for Session<S> {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

fn spawn_step_timer(
    timer: u64,
    period: Duration,
    ticks: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately; the indicator starts on step 0.
        interval.tick().await;
        loop {
            interval.tick().await;
            if ticks.send(AppEvent::StepTick { timer }).is_err() {
                break;
            }
        }
    })
}

//! The async scan driver.
//!
//! [`Scanner::spawn`] runs one task that owns the [`ScanMachine`] and selects
//! over three inputs: control commands, completed invocations, and the tick
//! timer. Invocations run on their own spawned tasks and report back over a
//! channel, so the loop itself never awaits the network.

use std::sync::Arc;
use std::time::Duration;

use lens_core::{AnalysisError, AnalysisResult, Analyzer, Credential, InputUnit, PersonaContext};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

use crate::capture::{Capture, CaptureSource};
use crate::clock::{Clock, TokioClock};
use crate::limiter::{Outcome, ScanPolicy};
use crate::machine::{Completion, ScanMachine, TickDecision, Ticket};
use crate::state::ScanState;

/// Control messages for a running scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCommand {
    SetContext(Option<PersonaContext>),
    Stop,
}

/// Everything observable about a running scan.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    StateChanged { from: ScanState, to: ScanState },
    /// A fresh verdict replaces whatever was displayed.
    Published {
        seq: u64,
        result: Box<AnalysisResult>,
    },
    /// A fresh invocation failed.
    Failed { seq: u64, error: AnalysisError },
    /// The persona context changed; the displayed verdict no longer applies.
    Cleared,
    /// A stale invocation resolved and was dropped.
    Discarded { seq: u64 },
    CooldownStarted { remaining: Duration },
    /// The capture source broke; the scan has ended.
    SourceFailed { message: String },
}

/// Counters reported when a scan ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub ticks: u64,
    pub dispatched: u64,
    pub published: u64,
    pub failed: u64,
    pub discarded: u64,
    pub cooldowns: u64,
    pub final_state: Option<ScanState>,
    pub source_error: Option<String>,
}

type Resolved = (Ticket, Result<AnalysisResult, AnalysisError>);

pub struct Scanner {
    analyzer: Arc<dyn Analyzer>,
    source: Box<dyn CaptureSource>,
    credential: Credential,
    policy: ScanPolicy,
    context: Option<PersonaContext>,
    clock: Arc<dyn Clock>,
}

impl Scanner {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        source: Box<dyn CaptureSource>,
        credential: Credential,
    ) -> Self {
        Self {
            analyzer,
            source,
            credential,
            policy: ScanPolicy::default(),
            context: None,
            clock: Arc::new(TokioClock),
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Option<PersonaContext>) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start scanning on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> ScanHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (suspend_tx, suspend_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(self.run(command_rx, suspend_rx, event_tx));

        ScanHandle {
            commands: command_tx,
            suspend: suspend_tx,
            events: Some(event_rx),
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<ScanCommand>,
        suspend: watch::Receiver<bool>,
        events: mpsc::UnboundedSender<ScanEvent>,
    ) -> ScanSummary {
        let mut machine = ScanMachine::new(self.policy, self.context.take());
        let mut summary = ScanSummary::default();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Resolved>();

        let mut ticker = tokio::time::interval(self.policy.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(
            tick_ms = self.policy.tick.as_millis(),
            min_spacing_ms = self.policy.min_spacing.as_millis(),
            cooldown_ms = self.policy.cooldown.as_millis(),
            "scan: started"
        );

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(ScanCommand::SetContext(context)) => {
                        if machine.set_context(context) {
                            let _ = events.send(ScanEvent::Cleared);
                        }
                    }
                    Some(ScanCommand::Stop) | None => {
                        machine.stop();
                    }
                },

                Some((ticket, result)) = done_rx.recv() => {
                    self.on_resolved(&mut machine, &mut summary, &events, &ticket, result);
                }

                _ = ticker.tick() => {
                    summary.ticks += 1;
                    let suspended = *suspend.borrow();
                    self.on_tick(&mut machine, &mut summary, &events, &done_tx, suspended);
                }
            }

            for transition in machine.drain_transitions() {
                let _ = events.send(ScanEvent::StateChanged {
                    from: transition.from,
                    to: transition.to,
                });
            }

            if machine.is_stopped() || machine.state() == ScanState::Failed {
                break;
            }
        }

        tracing::debug!(state = %machine.state(), "scan: stopped");
        summary.final_state = Some(machine.state());
        summary
    }

    fn on_tick(
        &mut self,
        machine: &mut ScanMachine,
        summary: &mut ScanSummary,
        events: &mpsc::UnboundedSender<ScanEvent>,
        done: &mpsc::UnboundedSender<Resolved>,
        suspended: bool,
    ) {
        let now = self.clock.now();
        let reason = match machine.tick(now, suspended) {
            TickDecision::Skip(reason) => reason,
            TickDecision::Capture => {
                match self.source.capture() {
                    Ok(Capture::Ready(unit)) => {
                        machine.enter_capturing();
                        let ticket = machine.dispatch(now);
                        summary.dispatched += 1;
                        self.invoke(unit, ticket, done.clone());
                    }
                    Ok(Capture::NotReady) => {
                        tracing::trace!("scan: source not ready");
                    }
                    Err(error) => {
                        tracing::error!(%error, "scan: capture source failed");
                        machine.capture_failed();
                        summary.source_error = Some(error.to_string());
                        let _ = events.send(ScanEvent::SourceFailed {
                            message: error.to_string(),
                        });
                    }
                }
                return;
            }
        };
        tracing::trace!(?reason, state = %machine.state(), "scan: tick skipped");
    }

    fn invoke(
        &self,
        unit: InputUnit,
        ticket: Ticket,
        done: mpsc::UnboundedSender<Resolved>,
    ) {
        let analyzer = Arc::clone(&self.analyzer);
        let credential = self.credential.clone();
        tokio::spawn(async move {
            let result = analyzer
                .analyze(&unit, ticket.instruction(), &credential)
                .await;
            // The scan may have stopped; then nobody is listening.
            let _ = done.send((ticket, result));
        });
    }

    fn on_resolved(
        &self,
        machine: &mut ScanMachine,
        summary: &mut ScanSummary,
        events: &mpsc::UnboundedSender<ScanEvent>,
        ticket: &Ticket,
        result: Result<AnalysisResult, AnalysisError>,
    ) {
        let now = self.clock.now();
        let seq = ticket.seq;
        tracing::debug!(
            seq,
            latency_ms = ticket.elapsed(now).as_millis(),
            "scan: invocation resolved"
        );
        let completion = machine.complete(now, ticket, Outcome::of(&result));

        let cooldown_until = match completion {
            Completion::Apply | Completion::ApplyWithCooldown { .. } => {
                match result {
                    Ok(verdict) => {
                        summary.published += 1;
                        let _ = events.send(ScanEvent::Published {
                            seq,
                            result: Box::new(verdict),
                        });
                    }
                    Err(error) => {
                        summary.failed += 1;
                        tracing::debug!(seq, kind = %error.kind(), %error, "scan: invocation failed");
                        machine.note_failure(error.kind());
                        let _ = events.send(ScanEvent::Failed { seq, error });
                    }
                }
                match completion {
                    Completion::ApplyWithCooldown { until } => Some(until),
                    _ => None,
                }
            }
            Completion::Discard { cooldown_until } => {
                summary.discarded += 1;
                let _ = events.send(ScanEvent::Discarded { seq });
                cooldown_until
            }
        };

        if let Some(until) = cooldown_until {
            summary.cooldowns += 1;
            let _ = events.send(ScanEvent::CooldownStarted {
                remaining: until.saturating_duration_since(now),
            });
        }
    }
}

/// Control surface for a running scan.
pub struct ScanHandle {
    commands: mpsc::UnboundedSender<ScanCommand>,
    suspend: watch::Sender<bool>,
    events: Option<mpsc::UnboundedReceiver<ScanEvent>>,
    task: JoinHandle<ScanSummary>,
}

impl ScanHandle {
    /// Switch persona context. A change clears the displayed verdict and the
    /// next tick runs without waiting for spacing.
    pub fn set_context(&self, context: Option<PersonaContext>) {
        let _ = self.commands.send(ScanCommand::SetContext(context));
    }

    /// Hold new attempts until [`resume`](Self::resume).
    pub fn suspend(&self) {
        self.suspend.send_replace(true);
    }

    pub fn resume(&self) {
        self.suspend.send_replace(false);
    }

    /// Stop ticking. An in-flight invocation resolves and is dropped.
    pub fn stop(&self) {
        let _ = self.commands.send(ScanCommand::Stop);
    }

    /// Take the event stream. Returns `None` after the first call.
    pub fn events(&mut self) -> Option<mpsc::UnboundedReceiver<ScanEvent>> {
        self.events.take()
    }

    /// Wait for the scan task to end.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] if the scan task panicked or was aborted.
    pub async fn join(self) -> Result<ScanSummary, JoinError> {
        self.task.await
    }
}

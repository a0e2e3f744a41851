//! The synchronous scan state machine.
//!
//! [`ScanMachine`] owns the [`ScanState`] and the [`RateLimiter`] and applies
//! every transition rule of the tick loop. It never sleeps, spawns, or reads
//! a clock: callers pass `now` in, which keeps every rule testable with plain
//! instants. The async [`crate::Scanner`] drives it.
//!
//! One tick runs: halted check, suspend check, cooldown check, single-flight
//! check, spacing check (a context change forces one bypass), then capture.

use std::time::Duration;

use lens_core::{ErrorKind, PersonaContext};
use tokio::time::Instant;

use crate::limiter::{Admission, Outcome, RateLimiter, ScanPolicy};
use crate::state::{ScanState, Transition};

/// Why a tick did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Halted,
    Suspended,
    CoolingDown { until: Instant },
    InFlight,
    Spacing { ready_at: Instant },
}

/// Result of evaluating one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Skip(SkipReason),
    /// Capture one unit now.
    Capture,
}

/// An issued invocation.
///
/// Carries the context it was issued under so its result can be checked for
/// staleness when it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub context: Option<PersonaContext>,
    pub issued_at: Instant,
}

impl Ticket {
    #[must_use]
    pub fn instruction(&self) -> Option<&str> {
        self.context
            .as_ref()
            .map(|context| context.instruction_fragment.as_str())
    }

    /// Round-trip time of the invocation as seen at `now`.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.issued_at)
    }
}

/// What to do with a resolved invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Publish the verdict or report the error.
    Apply,
    /// Report the quota error; cooldown runs until `until`.
    ApplyWithCooldown { until: Instant },
    /// Drop it. A stale quota failure still starts a cooldown.
    Discard { cooldown_until: Option<Instant> },
}

#[derive(Debug)]
pub struct ScanMachine {
    state: ScanState,
    parked_from: ScanState,
    limiter: RateLimiter,
    context: Option<PersonaContext>,
    force: bool,
    next_seq: u64,
    in_flight: Option<u64>,
    last_failure: Option<ErrorKind>,
    stopped: bool,
    transitions: Vec<Transition>,
}

impl ScanMachine {
    #[must_use]
    pub fn new(policy: ScanPolicy, context: Option<PersonaContext>) -> Self {
        Self {
            state: ScanState::AwaitingSource,
            parked_from: ScanState::AwaitingSource,
            limiter: RateLimiter::new(policy),
            context,
            force: false,
            next_seq: 1,
            in_flight: None,
            last_failure: None,
            stopped: false,
            transitions: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    #[must_use]
    pub const fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    #[must_use]
    pub const fn context(&self) -> Option<&PersonaContext> {
        self.context.as_ref()
    }

    /// Kind of the last reported failure, cleared by success or an elapsed
    /// cooldown.
    #[must_use]
    pub const fn last_failure(&self) -> Option<ErrorKind> {
        self.last_failure
    }

    #[must_use]
    pub const fn is_forced(&self) -> bool {
        self.force
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Transitions recorded since the last drain, oldest first.
    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    /// Evaluate one tick.
    pub fn tick(&mut self, now: Instant, suspended: bool) -> TickDecision {
        if self.stopped || self.state == ScanState::Failed {
            return TickDecision::Skip(SkipReason::Halted);
        }

        if suspended {
            if self.state.is_parkable() {
                self.parked_from = self.state;
                self.transition(ScanState::Suspended);
            }
            return TickDecision::Skip(SkipReason::Suspended);
        }
        if self.state == ScanState::Suspended {
            self.transition(self.parked_from);
        }

        if let Admission::CoolingDown { until } = self.limiter.admit(now, self.force) {
            return TickDecision::Skip(SkipReason::CoolingDown { until });
        }
        if self.state == ScanState::Cooldown {
            self.limiter.clear_cooldown();
            self.last_failure = None;
            self.transition(ScanState::Idle);
        }

        if self.in_flight.is_some()
            || matches!(
                self.state,
                ScanState::AwaitingResponse | ScanState::Capturing
            )
        {
            return TickDecision::Skip(SkipReason::InFlight);
        }

        match self.limiter.admit(now, self.force) {
            Admission::Ready => TickDecision::Capture,
            Admission::Spacing { ready_at } => TickDecision::Skip(SkipReason::Spacing { ready_at }),
            Admission::CoolingDown { until } => {
                TickDecision::Skip(SkipReason::CoolingDown { until })
            }
        }
    }

    /// Enter `Capturing` once the source produced a unit after a
    /// [`TickDecision::Capture`]. A source that is not ready skips this and
    /// leaves the machine untouched, pending force included.
    pub fn enter_capturing(&mut self) {
        self.transition(ScanState::Capturing);
    }

    /// The source failed; the scan cannot continue.
    pub fn capture_failed(&mut self) {
        self.transition(ScanState::Failed);
    }

    /// Issue an invocation for the captured unit. Consumes the force flag.
    pub fn dispatch(&mut self, now: Instant) -> Ticket {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        self.force = false;
        self.transition(ScanState::AwaitingResponse);
        tracing::debug!(seq, "scan: invocation dispatched");
        Ticket {
            seq,
            context: self.context.clone(),
            issued_at: now,
        }
    }

    /// Apply a resolved invocation at `now`.
    ///
    /// A stale ticket (issued under another context) is never published, but
    /// its outcome still reaches the limiter: a stale success sets
    /// `last_invocation_at` and a stale quota failure starts the cooldown,
    /// since the call consumed quota either way.
    pub fn complete(&mut self, now: Instant, ticket: &Ticket, outcome: Outcome) -> Completion {
        if self.stopped {
            return Completion::Discard {
                cooldown_until: None,
            };
        }
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
        } else {
            tracing::debug!(seq = ticket.seq, "scan: unknown ticket discarded");
            return Completion::Discard {
                cooldown_until: None,
            };
        }

        let stale = ticket.context != self.context;
        self.limiter.apply(now, outcome);

        let completion = match outcome {
            Outcome::QuotaExceeded => {
                let until = now + self.limiter.policy().cooldown;
                self.transition(ScanState::Cooldown);
                tracing::warn!(seq = ticket.seq, stale, "scan: quota exceeded, cooling down");
                if stale {
                    Completion::Discard {
                        cooldown_until: Some(until),
                    }
                } else {
                    self.last_failure = Some(ErrorKind::QuotaExceeded);
                    Completion::ApplyWithCooldown { until }
                }
            }
            Outcome::Success | Outcome::Failure => {
                self.transition(ScanState::Idle);
                if !stale && outcome == Outcome::Success {
                    self.last_failure = None;
                }
                if stale {
                    Completion::Discard {
                        cooldown_until: None,
                    }
                } else {
                    Completion::Apply
                }
            }
        };

        if stale {
            tracing::debug!(seq = ticket.seq, "scan: stale result discarded");
        }
        completion
    }

    /// Record the kind of an applied failure.
    pub fn note_failure(&mut self, kind: ErrorKind) {
        self.last_failure = Some(kind);
    }

    /// Switch persona context. Returns `true` when it changed, in which case
    /// the displayed result is invalid and the next attempt skips spacing once.
    pub fn set_context(&mut self, context: Option<PersonaContext>) -> bool {
        if context == self.context {
            return false;
        }
        self.context = context;
        self.force = true;
        tracing::debug!(
            persona = self.context.as_ref().map(|c| c.persona_id.as_str()),
            "scan: context changed"
        );
        true
    }

    /// Halt the machine. Later ticks skip and later completions are dropped.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    fn transition(&mut self, to: ScanState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(%from, %to, "scan: state changed");
        self.transitions.push(Transition { from, to });
    }
}

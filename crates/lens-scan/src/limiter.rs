//! Call spacing and quota cooldown.
//!
//! [`RateLimiter`] is a pure state machine over [`RateLimiterState`]: it
//! answers whether an attempt may start at `now` and records outcomes the
//! scheduler reports. It performs no I/O and never reads a clock itself.

use std::time::Duration;

use lens_config::ScanConfig;
use lens_core::{AnalysisError, ErrorKind};
use tokio::time::Instant;

/// Scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Tick period.
    pub tick: Duration,
    /// Minimum time from the last successful analysis to the next attempt.
    pub min_spacing: Duration,
    /// Pause after a quota-exceeded outcome.
    pub cooldown: Duration,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanPolicy {
    fn from(config: &ScanConfig) -> Self {
        Self {
            tick: config.tick(),
            min_spacing: config.min_spacing(),
            cooldown: config.cooldown(),
        }
    }
}

/// What an invocation's result means for pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    QuotaExceeded,
    Failure,
}

impl Outcome {
    /// Classify by error kind only.
    pub fn of<T>(result: &Result<T, AnalysisError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(error) if error.kind() == ErrorKind::QuotaExceeded => Self::QuotaExceeded,
            Err(_) => Self::Failure,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimiterState {
    pub last_invocation_at: Option<Instant>,
    pub cooldown_until: Option<Instant>,
}

/// Answer to "may an attempt start now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Ready,
    CoolingDown { until: Instant },
    Spacing { ready_at: Instant },
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    policy: ScanPolicy,
    state: RateLimiterState,
}

impl RateLimiter {
    #[must_use]
    pub fn new(policy: ScanPolicy) -> Self {
        Self {
            policy,
            state: RateLimiterState::default(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> ScanPolicy {
        self.policy
    }

    #[must_use]
    pub const fn state(&self) -> RateLimiterState {
        self.state
    }

    /// Decide whether an attempt may start at `now`.
    ///
    /// `force` bypasses spacing only. An active cooldown always wins.
    #[must_use]
    pub fn admit(&self, now: Instant, force: bool) -> Admission {
        if let Some(until) = self.state.cooldown_until
            && now < until
        {
            return Admission::CoolingDown { until };
        }
        if !force && let Some(last) = self.state.last_invocation_at {
            let ready_at = last + self.policy.min_spacing;
            if now < ready_at {
                return Admission::Spacing { ready_at };
            }
        }
        Admission::Ready
    }

    /// Record the outcome of an invocation that resolved at `now`.
    pub fn apply(&mut self, now: Instant, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.state.last_invocation_at = Some(now),
            Outcome::QuotaExceeded => self.state.cooldown_until = Some(now + self.policy.cooldown),
            Outcome::Failure => {}
        }
    }

    pub fn clear_cooldown(&mut self) {
        self.state.cooldown_until = None;
    }
}

use std::fmt;

use serde::Serialize;

/// Scheduler state. Owned by the scan machine; nothing else mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    AwaitingSource,
    Idle,
    Capturing,
    AwaitingResponse,
    Cooldown,
    Suspended,
    Failed,
}

impl ScanState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingSource => "awaiting_source",
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::AwaitingResponse => "awaiting_response",
            Self::Cooldown => "cooldown",
            Self::Suspended => "suspended",
            Self::Failed => "failed",
        }
    }

    /// States a suspend signal may park.
    #[must_use]
    pub const fn is_parkable(self) -> bool {
        matches!(self, Self::AwaitingSource | Self::Idle)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: ScanState,
    pub to: ScanState,
}

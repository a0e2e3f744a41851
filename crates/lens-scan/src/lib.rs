//! # lens-scan
//!
//! Continuous scan scheduling for Label Lens.
//!
//! - [`RateLimiter`]: pure spacing and quota-cooldown bookkeeping
//! - [`ScanMachine`]: the synchronous tick/transition rules over [`ScanState`]
//! - [`Scanner`]: the tokio driver that ticks, captures, invokes an
//!   [`lens_core::Analyzer`] and streams [`ScanEvent`]s
//! - [`resolve_context`]: persona + sub-option to instruction fragment
//! - Capture sources and fire-and-forget [`Trigger`] sinks
//!
//! At most one invocation is in flight at any time. Results issued under a
//! persona context that has since changed, or arriving after stop, are
//! discarded rather than published.

pub mod capture;
pub mod clock;
pub mod context;
mod error;
pub mod limiter;
pub mod machine;
pub mod scanner;
pub mod state;
pub mod trigger;

pub use capture::{Capture, CaptureSource, LatestFrameSource, StaticSource, TextFileSource};
pub use clock::{Clock, TokioClock};
pub use context::{FOCUS_DELIMITER, resolve_context};
pub use error::CaptureError;
pub use limiter::{Admission, Outcome, RateLimiter, RateLimiterState, ScanPolicy};
pub use machine::{Completion, ScanMachine, SkipReason, TickDecision, Ticket};
pub use scanner::{ScanCommand, ScanEvent, ScanHandle, ScanSummary, Scanner};
pub use state::{ScanState, Transition};
pub use trigger::{CommandTrigger, TracingTrigger, Trigger};

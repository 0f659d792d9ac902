//! frs-roll
//!
//! Futures contract roll selection.
//!
//! Decisions:
//! - Hold the nearest contract with at least `threshold_days` to expiry
//! - Re-evaluate once per session day, or immediately once the held front is due
//! - A front change raises a sticky reset for the driver to act on
//! - Too few contracts defers the decision; state is left untouched
//!
//! Pure deterministic logic. No IO, no wall-clock. The driver provides `now`
//! and the day-boundary signal.

mod engine;
mod filter;
mod session;
mod types;

pub use engine::select;
pub use filter::ChainFilter;
pub use session::SessionCalendar;
pub use types::*;

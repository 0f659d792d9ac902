//! frs-strategy
//!
//! Rollover driver: the event-callback side of the roll selector.
//!
//! Contract:
//! - The driver is fed one chain snapshot per tick and owns the selector state.
//! - It raises the day-boundary signal itself from the session calendar.
//! - It emits INTENTS (liquidate, bar subscriptions); it never places orders.
//! - Deferred decisions are not errors: the next tick retries.

mod driver;
mod types;

pub use driver::*;
pub use types::*;

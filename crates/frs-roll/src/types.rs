use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: i64 = 86_400;

/// A single listed futures contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub symbol: String,
    pub expiry: DateTime<Utc>,
}

impl Contract {
    pub fn new<S: Into<String>>(symbol: S, expiry: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            expiry,
        }
    }

    /// Whole days until expiry, floored.
    ///
    /// Floors toward negative infinity, so a contract that expired twelve
    /// hours ago reports `-1`, not `0`.
    pub fn days_to_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry - now).num_seconds().div_euclid(SECS_PER_DAY)
    }

    /// Same listing (symbol identity; expiry is not compared).
    pub fn same_listing(&self, other: &Contract) -> bool {
        self.symbol == other.symbol
    }
}

/// The contracts available for one underlying at a point in time.
///
/// Order is whatever the data source produced; the selector sorts a copy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub underlying: String,
    pub contracts: Vec<Contract>,
}

impl Chain {
    pub fn new<S: Into<String>>(underlying: S, contracts: Vec<Contract>) -> Self {
        Self {
            underlying: underlying.into(),
            contracts,
        }
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Contracts by ascending expiry. Stable: equal expiries keep chain order.
    pub fn sorted_by_expiry(&self) -> Vec<Contract> {
        let mut sorted = self.contracts.clone();
        sorted.sort_by_key(|c| c.expiry);
        sorted
    }
}

/// Selector policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollConfig {
    /// Minimum days-to-expiry at which a contract may still be held as front.
    pub threshold_days: i64,
}

impl RollConfig {
    pub const DEFAULT_THRESHOLD_DAYS: i64 = 3;

    pub fn with_threshold_days(threshold_days: i64) -> Self {
        Self { threshold_days }
    }
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            threshold_days: Self::DEFAULT_THRESHOLD_DAYS,
        }
    }
}

/// Selector state owned by the calling strategy for the whole run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollState {
    pub front: Option<Contract>,
    pub next: Option<Contract>,
    /// Set by the day-boundary signal, cleared by every successful decision.
    pub new_day: bool,
    /// Sticky until the driver acknowledges it with [`RollState::take_reset`].
    pub needs_reset: bool,
}

impl RollState {
    pub fn new() -> Self {
        Self {
            front: None,
            next: None,
            new_day: true,
            needs_reset: false,
        }
    }

    /// External day-boundary signal.
    pub fn mark_new_day(&mut self) {
        self.new_day = true;
    }

    /// Acknowledge a pending reset. Returns whether one was pending.
    pub fn take_reset(&mut self) -> bool {
        std::mem::replace(&mut self.needs_reset, false)
    }
}

impl Default for RollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one `select` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollDecision {
    pub front: Contract,
    pub next: Option<Contract>,
    /// True only when this call changed the front contract.
    pub needs_reset: bool,
    pub reason: RollReason,
}

/// Why the selector landed on its front contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollReason {
    /// Not a new day and the held front is still eligible; nothing evaluated.
    Cached,
    /// First selection of the run.
    Initial,
    /// Re-evaluated and the same front came out.
    Kept,
    /// Front moved to the nearest eligible contract.
    Rolled,
    /// The nearest candidate was already inside the threshold; the one after
    /// it was promoted.
    DoubleRolled,
    /// Neither candidate was eligible; the previous front is retained.
    Stranded,
}

impl RollReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollReason::Cached => "CACHED",
            RollReason::Initial => "INITIAL",
            RollReason::Kept => "KEPT",
            RollReason::Rolled => "ROLLED",
            RollReason::DoubleRolled => "DOUBLE_ROLLED",
            RollReason::Stranded => "STRANDED",
        }
    }
}

/// Selector failure. Retryable: the caller keeps its state and tries again on
/// the next tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RollError {
    InsufficientContracts {
        underlying: String,
        /// Contracts in the chain handed to `select`.
        listed: usize,
        /// Candidates at or beyond the threshold.
        eligible: usize,
    },
}

impl fmt::Display for RollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollError::InsufficientContracts {
                underlying,
                listed,
                eligible,
            } => write!(
                f,
                "insufficient contracts to roll '{underlying}': {listed} listed, {eligible} eligible"
            ),
        }
    }
}

impl std::error::Error for RollError {}

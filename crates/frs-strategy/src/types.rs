use frs_roll::{RollDecision, RollError};
use serde::Serialize;

/// Side effects the host should carry out after a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum RolloverIntent {
    /// Close every open position; the front contract changed.
    Liquidate { reason: String },
    /// Start consolidating bars for the new front.
    SubscribeBars { symbol: String, interval_secs: i64 },
    /// Stop consolidating bars for the contract rolled out of.
    UnsubscribeBars { symbol: String },
}

/// Result of feeding one chain snapshot to the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverStep {
    Decided {
        decision: RollDecision,
        intents: Vec<RolloverIntent>,
    },
    /// Not enough contracts this tick; state was kept.
    Deferred { error: RollError },
}

impl DriverStep {
    pub fn decision(&self) -> Option<&RollDecision> {
        match self {
            DriverStep::Decided { decision, .. } => Some(decision),
            DriverStep::Deferred { .. } => None,
        }
    }

    pub fn intents(&self) -> &[RolloverIntent] {
        match self {
            DriverStep::Decided { intents, .. } => intents,
            DriverStep::Deferred { .. } => &[],
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DriverStep::Deferred { .. })
    }

    /// `true` if the host must flatten positions.
    pub fn requires_liquidation(&self) -> bool {
        self.intents()
            .iter()
            .any(|i| matches!(i, RolloverIntent::Liquidate { .. }))
    }
}

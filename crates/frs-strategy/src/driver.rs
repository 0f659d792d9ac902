use chrono::{DateTime, Utc};
use frs_roll::{
    select, Chain, ChainFilter, Contract, RollConfig, RollState, SessionCalendar,
};
use tracing::{debug, info};

use crate::{DriverStep, RolloverIntent};

/// Owns the selector state for one underlying and turns its decisions into
/// intents:
/// - day boundary from the session calendar
/// - chain filter before every selection
/// - liquidate once per front change
pub struct RolloverDriver {
    roll: RollConfig,
    filter: ChainFilter,
    session: SessionCalendar,
    bar_interval_secs: i64,
    state: RollState,
    last_tick: Option<DateTime<Utc>>,
}

impl RolloverDriver {
    pub fn new(
        roll: RollConfig,
        filter: ChainFilter,
        session: SessionCalendar,
        bar_interval_secs: i64,
    ) -> Self {
        debug_assert!(bar_interval_secs > 0);
        Self {
            roll,
            filter,
            session,
            bar_interval_secs,
            state: RollState::new(),
            last_tick: None,
        }
    }

    pub fn state(&self) -> &RollState {
        &self.state
    }

    pub fn front(&self) -> Option<&Contract> {
        self.state.front.as_ref()
    }

    pub fn next(&self) -> Option<&Contract> {
        self.state.next.as_ref()
    }

    pub fn roll_config(&self) -> &RollConfig {
        &self.roll
    }

    /// End-of-session callback. Also raised automatically by [`Self::on_chain`]
    /// when a tick lands in a later session than the previous one.
    pub fn on_end_of_day(&mut self) {
        debug!("end of day");
        self.state.mark_new_day();
    }

    /// Feed one chain snapshot observed at `now`.
    pub fn on_chain(&mut self, now: DateTime<Utc>, chain: &Chain) -> DriverStep {
        if let Some(prev) = self.last_tick {
            if self.session.crossed_close(prev, now) {
                self.on_end_of_day();
            }
        }
        self.last_tick = Some(now);

        if self.state.new_day {
            if let Some(held) = &self.state.front {
                debug!(
                    symbol = %held.symbol,
                    days_to_expiry = held.days_to_expiry(now),
                    expiry = %held.expiry,
                    "expiry days away"
                );
            }
        }

        let filtered = self.filter.apply(chain, now);
        let prev_front = self.state.front.clone();

        let decision = match select(&self.roll, &mut self.state, &filtered, now) {
            Ok(d) => d,
            Err(error) => {
                debug!(%error, %now, "roll decision deferred");
                return DriverStep::Deferred { error };
            }
        };

        let mut intents = Vec::new();
        if decision.needs_reset {
            info!(
                symbol = %decision.front.symbol,
                reason = decision.reason.as_str(),
                "setting contract"
            );
            if let Some(old) = prev_front {
                intents.push(RolloverIntent::UnsubscribeBars { symbol: old.symbol });
            }
            intents.push(RolloverIntent::SubscribeBars {
                symbol: decision.front.symbol.clone(),
                interval_secs: self.bar_interval_secs,
            });
        }

        if self.state.take_reset() {
            info!("RESET: closing all positions");
            intents.push(RolloverIntent::Liquidate {
                reason: format!("front contract is now {}", decision.front.symbol),
            });
        }

        DriverStep::Decided { decision, intents }
    }

    /// `true` if a consolidated bar for `symbol` belongs to the current front.
    pub fn on_bar(&self, symbol: &str) -> bool {
        let tracked = self.front().is_some_and(|f| f.symbol == symbol);
        if tracked {
            debug!(symbol, "new bar for front contract");
        }
        tracked
    }
}

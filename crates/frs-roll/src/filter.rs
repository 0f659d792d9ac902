use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Chain;

/// Expiry window applied to a chain before selection.
///
/// Keeps contracts with `now + min_expiry_days <= expiry <= now + max_expiry_days`.
/// With `min_expiry_days = 0` already-expired listings are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFilter {
    pub min_expiry_days: i64,
    pub max_expiry_days: i64,
}

impl ChainFilter {
    pub const DEFAULT_MAX_EXPIRY_DAYS: i64 = 360;

    pub fn new(min_expiry_days: i64, max_expiry_days: i64) -> Self {
        debug_assert!(min_expiry_days <= max_expiry_days);
        Self {
            min_expiry_days,
            max_expiry_days,
        }
    }

    /// Filtered copy of `chain`; chain order is preserved.
    pub fn apply(&self, chain: &Chain, now: DateTime<Utc>) -> Chain {
        let lo = now + Duration::days(self.min_expiry_days);
        let hi = now + Duration::days(self.max_expiry_days);
        Chain {
            underlying: chain.underlying.clone(),
            contracts: chain
                .contracts
                .iter()
                .filter(|c| c.expiry >= lo && c.expiry <= hi)
                .cloned()
                .collect(),
        }
    }
}

impl Default for ChainFilter {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_MAX_EXPIRY_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Contract;
    use chrono::TimeZone;

    #[test]
    fn default_window_drops_expired_and_far_listings() {
        let now = Utc.with_ymd_and_hms(2019, 3, 8, 21, 0, 0).unwrap();
        let chain = Chain::new(
            "ES",
            vec![
                Contract::new("ESZ19", now + Duration::days(280)),
                Contract::new("ESH19", now - Duration::hours(1)),
                Contract::new("ESM19", now + Duration::days(98)),
                Contract::new("ESH20", now + Duration::days(371)),
            ],
        );

        let out = ChainFilter::default().apply(&chain, now);
        let syms: Vec<_> = out.contracts.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(syms, ["ESZ19", "ESM19"]);
        assert_eq!(out.underlying, "ES");
    }
}

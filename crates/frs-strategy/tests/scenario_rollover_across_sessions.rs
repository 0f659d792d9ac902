//! Driver replay over the March 2019 ES roll.
//!
//! Reference instants (UTC):
//!   ESH19 expiry 2019-03-15 13:30Z
//!   ESM19 expiry 2019-06-14 13:30Z
//!   ESU19 expiry 2019-09-20 13:30Z
//!
//! Session close is 13:15 America/Los_Angeles: 21:15Z before the DST switch
//! on 2019-03-10, 20:15Z after it.

use chrono::{DateTime, TimeZone, Utc};
use frs_roll::*;
use frs_strategy::*;

fn utc(m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, m, d, h, min, 0).unwrap()
}

fn es_chain() -> Chain {
    Chain::new(
        "ES",
        vec![
            Contract::new("ESU19", utc(9, 20, 13, 30)),
            Contract::new("ESH19", utc(3, 15, 13, 30)),
            Contract::new("ESM19", utc(6, 14, 13, 30)),
        ],
    )
}

fn driver_with(filter: ChainFilter) -> RolloverDriver {
    RolloverDriver::new(RollConfig::default(), filter, SessionCalendar::default(), 3_600)
}

fn reason(step: &DriverStep) -> RollReason {
    step.decision().expect("decided").reason
}

#[test]
fn scenario_roll_on_session_boundary() {
    let mut d = driver_with(ChainFilter::default());

    let s1 = d.on_chain(utc(3, 8, 18, 0), &es_chain());
    assert_eq!(reason(&s1), RollReason::Initial);
    assert!(s1.requires_liquidation());

    // Same session: cached, nothing to do.
    let s2 = d.on_chain(utc(3, 8, 19, 0), &es_chain());
    assert_eq!(reason(&s2), RollReason::Cached);
    assert!(s2.intents().is_empty());

    // Monday: 3 days left, still eligible.
    let s3 = d.on_chain(utc(3, 11, 18, 0), &es_chain());
    assert_eq!(reason(&s3), RollReason::Kept);
    assert!(s3.intents().is_empty());
    assert_eq!(d.front().map(|c| c.symbol.as_str()), Some("ESH19"));

    // Tuesday: 2 days left, roll.
    let s4 = d.on_chain(utc(3, 12, 18, 0), &es_chain());
    assert_eq!(reason(&s4), RollReason::Rolled);
    assert_eq!(
        s4.intents(),
        [
            RolloverIntent::UnsubscribeBars {
                symbol: "ESH19".to_string()
            },
            RolloverIntent::SubscribeBars {
                symbol: "ESM19".to_string(),
                interval_secs: 3_600,
            },
            RolloverIntent::Liquidate {
                reason: "front contract is now ESM19".to_string()
            },
        ]
    );
    assert_eq!(d.next().map(|c| c.symbol.as_str()), Some("ESU19"));

    let s5 = d.on_chain(utc(3, 12, 19, 0), &es_chain());
    assert_eq!(reason(&s5), RollReason::Cached);
    assert!(!s5.requires_liquidation());
}

#[test]
fn scenario_due_front_rolls_mid_session() {
    let mut d = driver_with(ChainFilter::default());
    d.on_chain(utc(3, 8, 18, 0), &es_chain());

    // 14:00 PDT on the 11th: past the close, so session 2019-03-12. 3 days left.
    let s1 = d.on_chain(utc(3, 11, 21, 0), &es_chain());
    assert_eq!(reason(&s1), RollReason::Kept);
    assert!(!d.state().new_day);

    // 07:00 PDT on the 12th: same session, but the front slipped to 2 days.
    let s2 = d.on_chain(utc(3, 12, 14, 0), &es_chain());
    assert_eq!(reason(&s2), RollReason::Rolled);
    assert_eq!(d.front().map(|c| c.symbol.as_str()), Some("ESM19"));
}

#[test]
fn scenario_filtered_chain_defers_roll_until_listing_appears() {
    // 120-day window hides ESU19 in March.
    let mut d = driver_with(ChainFilter::new(0, 120));
    let s0 = d.on_chain(utc(3, 8, 18, 0), &es_chain());
    assert_eq!(reason(&s0), RollReason::Initial);

    let s1 = d.on_chain(utc(3, 12, 18, 0), &es_chain());
    assert!(s1.is_deferred());
    assert!(s1.intents().is_empty());
    assert_eq!(d.front().map(|c| c.symbol.as_str()), Some("ESH19"));
    assert!(d.state().new_day, "deferral keeps the new-day flag");

    // The host widens its view: an extra listing inside the window.
    let mut wider = es_chain();
    wider
        .contracts
        .push(Contract::new("ESM19-SPREAD", utc(6, 20, 13, 30)));
    let s2 = d.on_chain(utc(3, 12, 18, 5), &wider);
    assert_eq!(reason(&s2), RollReason::Rolled);
    assert_eq!(d.front().map(|c| c.symbol.as_str()), Some("ESM19"));
    assert!(s2.requires_liquidation());
}

#[test]
fn scenario_manual_end_of_day_forces_reevaluation() {
    let mut d = driver_with(ChainFilter::default());
    d.on_chain(utc(3, 8, 18, 0), &es_chain());

    d.on_end_of_day();
    let s = d.on_chain(utc(3, 8, 18, 30), &es_chain());
    assert_eq!(reason(&s), RollReason::Kept);
}

#[test]
fn scenario_tick_gap_across_front_expiry_rolls_to_nearest_listing() {
    let mut chain = es_chain();
    chain
        .contracts
        .push(Contract::new("ESZ19", utc(12, 20, 13, 30)));

    let mut d = driver_with(ChainFilter::default());
    let s0 = d.on_chain(utc(3, 8, 18, 0), &chain);
    assert_eq!(reason(&s0), RollReason::Initial);

    // No ticks until after ESH19 expired; the filter drops it from the chain.
    let s1 = d.on_chain(utc(3, 18, 18, 0), &chain);
    assert_eq!(reason(&s1), RollReason::Rolled);
    assert_eq!(d.front().map(|c| c.symbol.as_str()), Some("ESM19"));
    assert_eq!(d.next().map(|c| c.symbol.as_str()), Some("ESU19"));
    assert_eq!(
        s1.intents(),
        [
            RolloverIntent::UnsubscribeBars {
                symbol: "ESH19".to_string()
            },
            RolloverIntent::SubscribeBars {
                symbol: "ESM19".to_string(),
                interval_secs: 3_600,
            },
            RolloverIntent::Liquidate {
                reason: "front contract is now ESM19".to_string()
            },
        ]
    );
}

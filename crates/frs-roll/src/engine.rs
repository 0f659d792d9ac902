use chrono::{DateTime, Utc};

use crate::{Chain, Contract, RollConfig, RollDecision, RollError, RollReason, RollState};

fn is_eligible(c: &Contract, now: DateTime<Utc>, threshold_days: i64) -> bool {
    c.days_to_expiry(now) >= threshold_days
}

fn insufficient(chain: &Chain, candidates: &[Contract], now: DateTime<Utc>, t: i64) -> RollError {
    RollError::InsufficientContracts {
        underlying: chain.underlying.clone(),
        listed: chain.len(),
        eligible: candidates.iter().filter(|c| is_eligible(c, now, t)).count(),
    }
}

/// Decide which contract to hold as front for `now`.
///
/// `st` is only mutated on `Ok`. An `Err` leaves the previous front in
/// place and the caller retries on the next tick.
///
/// Inputs:
/// - chain: the contracts observed for this tick, any order
/// - now: simulated time (not wall clock)
pub fn select(
    cfg: &RollConfig,
    st: &mut RollState,
    chain: &Chain,
    now: DateTime<Utc>,
) -> Result<RollDecision, RollError> {
    let t = cfg.threshold_days;
    let held_due = st.front.as_ref().map(|c| !is_eligible(c, now, t));

    // 1) Nothing to do until the next day boundary, unless the held front
    //    has slipped inside the threshold.
    if !st.new_day && held_due == Some(false) {
        if let Some(front) = st.front.clone() {
            return Ok(RollDecision {
                front,
                next: st.next.clone(),
                needs_reset: false,
                reason: RollReason::Cached,
            });
        }
    }

    // 2) Skip the held front when it is due and still listed first. A chain
    //    that no longer lists it (expired, filtered) starts from index 0.
    let sorted = chain.sorted_by_expiry();
    let held_listed_first = match (&st.front, sorted.first()) {
        (Some(held), Some(first)) => first.same_listing(held),
        _ => false,
    };
    let skip = usize::from(held_due == Some(true) && held_listed_first);
    if sorted.len() < skip + 2 {
        return Err(insufficient(chain, sorted.get(skip..).unwrap_or(&[]), now, t));
    }

    let first = &sorted[skip];
    let second = &sorted[skip + 1];

    // 3) Nearest eligible of the two candidates.
    let picked = if is_eligible(first, now, t) {
        Some((first.clone(), Some(second.clone()), false))
    } else if is_eligible(second, now, t) {
        Some((second.clone(), sorted.get(skip + 2).cloned(), true))
    } else {
        None
    };

    let (front, next, reason) = match picked {
        Some((front, next, promoted)) => {
            let reason = match &st.front {
                Some(prev) if prev.same_listing(&front) => RollReason::Kept,
                _ if promoted => RollReason::DoubleRolled,
                None => RollReason::Initial,
                Some(_) => RollReason::Rolled,
            };
            (front, next, reason)
        }
        // Both candidates inside the threshold: keep whatever is held.
        None => match &st.front {
            Some(prev) => (prev.clone(), st.next.clone(), RollReason::Stranded),
            None => return Err(insufficient(chain, &sorted[skip..], now, t)),
        },
    };

    let needs_reset = st
        .front
        .as_ref()
        .map_or(true, |prev| !prev.same_listing(&front));

    st.front = Some(front.clone());
    st.next = next.clone();
    st.new_day = false;
    if needs_reset {
        st.needs_reset = true;
    }

    Ok(RollDecision {
        front,
        next,
        needs_reset,
        reason,
    })
}

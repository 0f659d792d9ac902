//! `frs select`: one decision from fresh state.

use anyhow::{Context, Result};
use chrono::DateTime;
use frs_config::{ConfigMode, RollSettings};
use frs_roll::{select, RollState};

use super::{load_chain, load_config, symbol_or_dash};

pub struct SelectArgs {
    pub chain: String,
    pub at: i64,
    pub config_paths: Vec<String>,
    pub underlying: Option<String>,
    pub strict_config: bool,
}

pub fn run_select(args: SelectArgs) -> Result<()> {
    let loaded = load_config(&args.config_paths, ConfigMode::Select, args.strict_config)?;
    let settings = RollSettings::from_config_json(&loaded.config_json)?;
    let underlying = args.underlying.or(settings.underlying);

    let now = DateTime::from_timestamp(args.at, 0)
        .with_context(|| format!("--at {} is out of range", args.at))?;

    let snapshots = load_chain(&args.chain, underlying.as_deref())?;
    let snap = snapshots
        .iter()
        .rev()
        .find(|s| s.ts <= now)
        .with_context(|| format!("no chain snapshot at or before {now}"))?;

    let chain = settings.chain_filter.apply(&snap.chain, now);
    let mut st = RollState::new();

    match select(&settings.roll, &mut st, &chain, now) {
        Ok(d) => {
            println!(
                "decision={} front={} next={} days_to_expiry={} needs_reset={} snapshot_ts={}",
                d.reason.as_str(),
                d.front.symbol,
                symbol_or_dash(d.next.as_ref()),
                d.front.days_to_expiry(now),
                d.needs_reset,
                snap.ts.timestamp()
            );
        }
        // Deferral is an answer, not a failure.
        Err(e) => {
            println!(
                "decision=DEFERRED snapshot_ts={} detail=\"{}\"",
                snap.ts.timestamp(),
                e
            );
        }
    }

    Ok(())
}

//! `frs replay`: drive a chain file through the rollover driver.

use anyhow::{bail, Context, Result};
use frs_config::{ConfigMode, DriverSettings, RollSettings};
use frs_roll::{Contract, RollConfig};
use frs_strategy::{DriverStep, RolloverDriver, RolloverIntent};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{load_chain, load_config, symbol_or_dash};

pub struct ReplayArgs {
    pub chain: String,
    pub config_paths: Vec<String>,
    pub underlying: Option<String>,
    pub threshold_days: Option<i64>,
    pub json: bool,
    pub strict_config: bool,
}

/// One line of `--json` output.
#[derive(Debug, Serialize)]
struct StepReport<'a> {
    ts: i64,
    decision: &'a str,
    front: Option<&'a Contract>,
    next: Option<&'a Contract>,
    needs_reset: bool,
    intents: &'a [RolloverIntent],
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, Default)]
struct ReplayTotals {
    steps: usize,
    decided: usize,
    deferred: usize,
    resets: usize,
}

pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let loaded = load_config(&args.config_paths, ConfigMode::Replay, args.strict_config)?;
    let mut roll = RollSettings::from_config_json(&loaded.config_json)?;
    let driver_settings = DriverSettings::from_config_json(&loaded.config_json)?;

    if let Some(t) = args.threshold_days {
        if t < 0 {
            bail!("--threshold-days must be >= 0 (got {t})");
        }
        roll.roll = RollConfig::with_threshold_days(t);
    }
    let underlying = args.underlying.or(roll.underlying.clone());

    let chain_bytes =
        std::fs::read(&args.chain).with_context(|| format!("read chain failed: {}", args.chain))?;
    let snapshots = load_chain(&args.chain, underlying.as_deref())?;
    let run_id = derive_replay_run_id(&loaded.config_hash, roll.roll.threshold_days, &chain_bytes);

    info!(
        %run_id,
        snapshots = snapshots.len(),
        threshold_days = roll.roll.threshold_days,
        "replay start"
    );

    let mut driver = RolloverDriver::new(
        roll.roll,
        roll.chain_filter,
        driver_settings.session,
        driver_settings.bar_interval_secs,
    );

    let mut totals = ReplayTotals::default();
    for snap in &snapshots {
        let step = driver.on_chain(snap.ts, &snap.chain);
        totals.steps += 1;
        if step.is_deferred() {
            totals.deferred += 1;
        } else {
            totals.decided += 1;
        }
        if step.requires_liquidation() {
            totals.resets += 1;
        }

        let ts = snap.ts.timestamp();
        if args.json {
            let line = serde_json::to_string(&step_report(ts, &step))
                .context("serialize step report failed")?;
            println!("{line}");
        } else {
            println!("{}", step_line(ts, &step));
        }
    }

    println!(
        "replay_ok=true run_id={} config_hash={} steps={} decided={} deferred={} resets={} final_front={}",
        run_id,
        loaded.config_hash,
        totals.steps,
        totals.decided,
        totals.deferred,
        totals.resets,
        symbol_or_dash(driver.front())
    );

    Ok(())
}

fn step_report(ts: i64, step: &DriverStep) -> StepReport<'_> {
    match step {
        DriverStep::Decided { decision, intents } => StepReport {
            ts,
            decision: decision.reason.as_str(),
            front: Some(&decision.front),
            next: decision.next.as_ref(),
            needs_reset: decision.needs_reset,
            intents,
            detail: None,
        },
        DriverStep::Deferred { error } => StepReport {
            ts,
            decision: "DEFERRED",
            front: None,
            next: None,
            needs_reset: false,
            intents: &[],
            detail: Some(error.to_string()),
        },
    }
}

fn step_line(ts: i64, step: &DriverStep) -> String {
    match step {
        DriverStep::Decided { decision, intents } => format!(
            "ts={} decision={} front={} next={} needs_reset={} intents={}",
            ts,
            decision.reason.as_str(),
            decision.front.symbol,
            symbol_or_dash(decision.next.as_ref()),
            decision.needs_reset,
            intents_label(intents)
        ),
        DriverStep::Deferred { error } => {
            format!("ts={ts} decision=DEFERRED detail=\"{error}\"")
        }
    }
}

fn intents_label(intents: &[RolloverIntent]) -> String {
    if intents.is_empty() {
        return "-".to_string();
    }
    intents
        .iter()
        .map(|i| match i {
            RolloverIntent::Liquidate { .. } => "liquidate".to_string(),
            RolloverIntent::SubscribeBars { symbol, .. } => format!("subscribe:{symbol}"),
            RolloverIntent::UnsubscribeBars { symbol } => format!("unsubscribe:{symbol}"),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Deterministic replay id: same config, threshold and chain file give the
/// same id. No RNG.
fn derive_replay_run_id(config_hash: &str, threshold_days: i64, chain: &[u8]) -> Uuid {
    let mut data = format!("frs-cli.replay.v1|{config_hash}|{threshold_days}|").into_bytes();
    data.extend_from_slice(chain);
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, &data)
}

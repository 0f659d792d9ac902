//! Typed settings read from the merged config JSON.
//!
//! Every key is optional; a missing key takes the default. A key that is
//! present with the wrong type or an out-of-range value is an error.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use frs_roll::{ChainFilter, RollConfig, SessionCalendar};
use serde_json::Value;

/// Default driver bar interval: hourly bars on the front contract.
pub const DEFAULT_BAR_INTERVAL_SECS: i64 = 3_600;

/// Selector settings (`/roll/*`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollSettings {
    /// Restrict ingestion to one underlying; `None` takes whatever the chain
    /// file holds (it must then hold a single underlying).
    pub underlying: Option<String>,
    pub roll: RollConfig,
    pub chain_filter: ChainFilter,
}

impl RollSettings {
    /// Optional:
    /// - roll.underlying (string)
    /// - roll.threshold_days (int >= 0); default=3
    /// - roll.chain_filter.min_expiry_days (int); default=0
    /// - roll.chain_filter.max_expiry_days (int); default=360
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let underlying = opt_str(cfg, "/roll/underlying")?.map(str::to_string);

        let threshold_days =
            opt_i64(cfg, "/roll/threshold_days")?.unwrap_or(RollConfig::DEFAULT_THRESHOLD_DAYS);
        if threshold_days < 0 {
            bail!("roll.threshold_days must be >= 0 (got {threshold_days})");
        }

        let defaults = ChainFilter::default();
        let min_expiry_days = opt_i64(cfg, "/roll/chain_filter/min_expiry_days")?
            .unwrap_or(defaults.min_expiry_days);
        let max_expiry_days = opt_i64(cfg, "/roll/chain_filter/max_expiry_days")?
            .unwrap_or(defaults.max_expiry_days);
        if min_expiry_days > max_expiry_days {
            bail!(
                "roll.chain_filter: min_expiry_days ({min_expiry_days}) exceeds max_expiry_days ({max_expiry_days})"
            );
        }

        Ok(Self {
            underlying,
            roll: RollConfig::with_threshold_days(threshold_days),
            chain_filter: ChainFilter::new(min_expiry_days, max_expiry_days),
        })
    }
}

/// Driver settings (`/session/*`, `/driver/*`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverSettings {
    pub session: SessionCalendar,
    pub bar_interval_secs: i64,
}

impl DriverSettings {
    /// Optional:
    /// - session.timezone (IANA name); default=America/Los_Angeles
    /// - session.close ("HH:MM" or "HH:MM:SS", local); default=13:15
    /// - driver.bar_interval_secs (int > 0); default=3600
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let tz = match opt_str(cfg, "/session/timezone")? {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow!("session.timezone '{name}' is not a known zone: {e}"))?,
            None => SessionCalendar::DEFAULT_TZ,
        };

        let close = match opt_str(cfg, "/session/close")? {
            Some(raw) => parse_close(raw)?,
            None => SessionCalendar::default_close(),
        };

        let bar_interval_secs =
            opt_i64(cfg, "/driver/bar_interval_secs")?.unwrap_or(DEFAULT_BAR_INTERVAL_SECS);
        if bar_interval_secs <= 0 {
            bail!("driver.bar_interval_secs must be > 0 (got {bar_interval_secs})");
        }

        Ok(Self {
            session: SessionCalendar::new(tz, close),
            bar_interval_secs,
        })
    }
}

fn parse_close(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .with_context(|| format!("session.close '{raw}' must be HH:MM or HH:MM:SS"))
}

fn opt_str<'a>(cfg: &'a Value, ptr: &str) -> Result<Option<&'a str>> {
    match cfg.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| anyhow!("config {ptr} must be a string (got {v})")),
    }
}

fn opt_i64(cfg: &Value, ptr: &str) -> Result<Option<i64>> {
    match cfg.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| anyhow!("config {ptr} must be an integer (got {v})")),
    }
}

//! Command handler modules for frs-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod replay;
pub mod select;

use anyhow::{Context, Result};
use frs_config::{report_unused_keys, ConfigMode, LoadedConfig, UnusedKeyPolicy};
use frs_md::ChainSnapshot;
use frs_roll::Contract;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config (or defaults when no paths are given) and run the
/// unused-key guard for `mode`.
pub fn load_config(paths: &[String], mode: ConfigMode, strict: bool) -> Result<LoadedConfig> {
    let loaded = if paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        frs_config::load_layered_yaml(&path_refs)?
    };

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(mode, &loaded.config_json, policy)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(mode = %report.mode, pointer = %ptr, "config key not read by this command");
    }

    Ok(loaded)
}

/// Read and group chain snapshots for one underlying.
pub fn load_chain(path: &str, underlying: Option<&str>) -> Result<Vec<ChainSnapshot>> {
    frs_md::load_snapshots(Path::new(path), underlying)
        .with_context(|| format!("load chain failed: {path}"))
}

/// `SYMBOL` or `-` when absent.
pub fn symbol_or_dash(c: Option<&Contract>) -> &str {
    c.map(|c| c.symbol.as_str()).unwrap_or("-")
}

//! CSV ingestion for futures chain listings.
//!
//! ## CSV column contract (case-insensitive, order-independent)
//!
//! | Column       | Type / example | Notes                                  |
//! |--------------|----------------|----------------------------------------|
//! | `ts`         | `1552078800`   | Observation time, UTC epoch seconds    |
//! | `underlying` | `ES`           | Chain root                             |
//! | `symbol`     | `ESM19`        | Listed contract                        |
//! | `expiry`     | `1560513600`   | Contract expiry, UTC epoch seconds     |
//!
//! Extra columns are ignored. Every row is one contract observed at `ts`;
//! rows sharing `(ts, underlying)` form one chain snapshot, in file order.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use frs_roll::{Chain, Contract};
use serde::{Deserialize, Serialize};

const REQUIRED_COLUMNS: [&str; 4] = ["ts", "underlying", "symbol", "expiry"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by chain CSV parsing.
#[derive(Debug)]
pub enum ChainCsvError {
    /// An I/O or CSV-library error outside any data row.
    Io(String),
    /// The header row is missing a required column.
    MissingHeader(String),
    /// A data row (1-based) could not be decoded.
    Row { row: usize, message: String },
    /// No underlying filter was given and the file lists more than one.
    MixedUnderlying(Vec<String>),
}

impl fmt::Display for ChainCsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainCsvError::Io(msg) => write!(f, "chain csv io error: {msg}"),
            ChainCsvError::MissingHeader(col) => {
                write!(f, "chain csv missing required header column: '{col}'")
            }
            ChainCsvError::Row { row, message } => {
                write!(f, "chain csv row {row}: {message}")
            }
            ChainCsvError::MixedUnderlying(roots) => write!(
                f,
                "chain csv lists several underlyings ({}); pick one",
                roots.join(", ")
            ),
        }
    }
}

impl std::error::Error for ChainCsvError {}

// ---------------------------------------------------------------------------
// Rows and snapshots
// ---------------------------------------------------------------------------

/// One decoded CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRow {
    /// 1-based data row in the source file; 0 when not read from CSV.
    #[serde(skip)]
    pub row: usize,
    pub ts: i64,
    pub underlying: String,
    pub symbol: String,
    pub expiry: i64,
}

/// The chain observed for one underlying at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSnapshot {
    pub ts: DateTime<Utc>,
    pub chain: Chain,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a chain CSV file. See [`parse_chain_csv_str`].
pub fn parse_chain_csv_file(
    path: &Path,
    underlying: Option<&str>,
) -> Result<Vec<ChainRow>, ChainCsvError> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| ChainCsvError::Io(format!("read '{}': {e}", path.display())))?;
    parse_chain_csv_str(&src, underlying)
}

/// Parse chain rows from a string slice.
///
/// Rows whose underlying differs from `underlying` (case-insensitive) are
/// skipped. A row that fails to decode is an error: a silently missing
/// listing would change which contract the selector picks.
pub fn parse_chain_csv_str(
    src: &str,
    underlying: Option<&str>,
) -> Result<Vec<ChainRow>, ChainCsvError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| ChainCsvError::Io(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let lowered: csv::StringRecord = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    for req in REQUIRED_COLUMNS {
        if !lowered.iter().any(|h| h == req) {
            return Err(ChainCsvError::MissingHeader(req.to_string()));
        }
    }
    rdr.set_headers(lowered);

    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<ChainRow>().enumerate() {
        let mut row = rec.map_err(|e| ChainCsvError::Row {
            row: i + 1,
            message: e.to_string(),
        })?;
        row.row = i + 1;
        if let Some(want) = underlying {
            if !row.underlying.eq_ignore_ascii_case(want) {
                continue;
            }
        }
        out.push(row);
    }

    Ok(out)
}

/// Group rows into snapshots ordered by `ts`.
///
/// Within a snapshot, contracts keep file order (the selector's tie-break).
pub fn group_snapshots(rows: Vec<ChainRow>) -> Result<Vec<ChainSnapshot>, ChainCsvError> {
    let mut grouped: BTreeMap<(i64, String), Vec<Contract>> = BTreeMap::new();

    for r in rows {
        let expiry = epoch_to_utc(r.expiry).ok_or_else(|| ChainCsvError::Row {
            row: r.row,
            message: format!("expiry {} out of range", r.expiry),
        })?;
        if epoch_to_utc(r.ts).is_none() {
            return Err(ChainCsvError::Row {
                row: r.row,
                message: format!("ts {} out of range", r.ts),
            });
        }
        grouped
            .entry((r.ts, r.underlying))
            .or_default()
            .push(Contract::new(r.symbol, expiry));
    }

    let mut roots: Vec<String> = grouped.keys().map(|(_, u)| u.clone()).collect();
    roots.sort();
    roots.dedup();
    if roots.len() > 1 {
        return Err(ChainCsvError::MixedUnderlying(roots));
    }

    Ok(grouped
        .into_iter()
        .filter_map(|((ts, underlying), contracts)| {
            Some(ChainSnapshot {
                ts: epoch_to_utc(ts)?,
                chain: Chain::new(underlying, contracts),
            })
        })
        .collect())
}

/// Parse + group in one step.
pub fn load_snapshots(
    path: &Path,
    underlying: Option<&str>,
) -> Result<Vec<ChainSnapshot>, ChainCsvError> {
    group_snapshots(parse_chain_csv_file(path, underlying)?)
}

fn epoch_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ts,underlying,symbol,expiry";

    #[test]
    fn empty_input_returns_empty_vec() {
        assert!(parse_chain_csv_str("", None).unwrap().is_empty());
    }

    #[test]
    fn header_only_returns_empty_vec() {
        assert!(parse_chain_csv_str(HEADER, None).unwrap().is_empty());
    }

    #[test]
    fn missing_required_header_returns_err() {
        let err = parse_chain_csv_str("ts,underlying,symbol\n1,ES,ESM19", None).unwrap_err();
        assert!(matches!(err, ChainCsvError::MissingHeader(ref c) if c == "expiry"));
    }

    #[test]
    fn headers_are_case_insensitive_and_reorderable() {
        let csv = "Symbol,EXPIRY,Underlying,TS\nESM19,2000,ES,1000";
        let rows = parse_chain_csv_str(csv, None).unwrap();
        assert_eq!(
            rows,
            vec![ChainRow {
                row: 1,
                ts: 1000,
                underlying: "ES".to_string(),
                symbol: "ESM19".to_string(),
                expiry: 2000,
            }]
        );
    }

    #[test]
    fn underlying_filter_skips_other_roots() {
        let csv = format!("{HEADER}\n1,ES,ESM19,9\n1,NQ,NQM19,9\n1,es,ESU19,19");
        let rows = parse_chain_csv_str(&csv, Some("ES")).unwrap();
        let syms: Vec<_> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(syms, ["ESM19", "ESU19"]);
    }

    #[test]
    fn bad_expiry_reports_row() {
        let csv = format!("{HEADER}\n1,ES,ESM19,9\n1,ES,ESU19,soon");
        let err = parse_chain_csv_str(&csv, None).unwrap_err();
        assert!(matches!(err, ChainCsvError::Row { row: 2, .. }));
    }

    #[test]
    fn out_of_range_expiry_reports_file_row_after_filtering() {
        let csv = format!(
            "{HEADER}\n1,NQ,NQM19,9\n1,NQ,NQU19,19\n1,ES,ESM19,{}",
            i64::MAX
        );
        let rows = parse_chain_csv_str(&csv, Some("ES")).unwrap();
        assert_eq!(rows.len(), 1);

        let err = group_snapshots(rows).unwrap_err();
        assert!(matches!(err, ChainCsvError::Row { row: 3, .. }), "{err}");
    }

    #[test]
    fn snapshots_ordered_by_ts_with_file_order_inside() {
        let csv = format!("{HEADER}\n200,ES,B,9000\n100,ES,Z,9000\n100,ES,A,5000\n200,ES,C,5000");
        let snaps = group_snapshots(parse_chain_csv_str(&csv, None).unwrap()).unwrap();

        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].ts.timestamp(), 100);
        let first: Vec<_> = snaps[0].chain.contracts.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(first, ["Z", "A"]);
        let second: Vec<_> = snaps[1].chain.contracts.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(second, ["B", "C"]);
    }

    #[test]
    fn mixed_underlyings_without_filter_is_rejected() {
        let csv = format!("{HEADER}\n1,ES,ESM19,9\n1,NQ,NQM19,9");
        let err = group_snapshots(parse_chain_csv_str(&csv, None).unwrap()).unwrap_err();
        match err {
            ChainCsvError::MixedUnderlying(roots) => assert_eq!(roots, ["ES", "NQ"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn error_display_row() {
        let e = ChainCsvError::Row {
            row: 5,
            message: "bad".to_string(),
        };
        let s = e.to_string();
        assert!(s.contains("row 5"));
        assert!(s.contains("bad"));
    }
}

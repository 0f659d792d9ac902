//! frs-md
//!
//! Futures chain snapshots from CSV.
//!
//! This crate is the read side only: it turns a chain listing file into
//! per-timestamp [`frs_roll::Chain`] values for the driver to replay. It does
//! not fetch data from any provider.

pub mod ingest_csv;

pub use ingest_csv::{
    group_snapshots, load_snapshots, parse_chain_csv_file, parse_chain_csv_str, ChainCsvError,
    ChainRow, ChainSnapshot,
};

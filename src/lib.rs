//! Synthetic power-grid market data: generators, HTTP API and dashboard.

/// Dashboard metrics derived from API records.
pub mod analytics;
/// Sample-to-record conversion with the public field names.
pub mod assembler;
pub mod cli;
pub mod config;
pub mod io;
/// Market-signal generators.
pub mod market;
/// Hour-of-day regimes and the bound tables keyed by them.
pub mod regime;
pub mod registry;
pub mod telemetry;

/// REST API (feature `api`).
#[cfg(feature = "api")]
pub mod api;
/// Terminal dashboard (feature `tui`).
#[cfg(feature = "tui")]
pub mod tui;

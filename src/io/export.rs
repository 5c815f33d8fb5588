//! CSV export for the 24-hour series.
//!
//! Columns are the record field names, in record order, so a CSV export
//! and the matching API response carry the same fields.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use rand::Rng;
use serde::Serialize;

use crate::assembler::{ForecastRecord, HistoricalRecord, SpreadRecord, assemble};
use crate::market::{
    DemandForecastGenerator, Generator, HistoricalLmpGenerator, MarketContext,
    PriceSpreadGenerator,
};
use crate::registry::Node;

/// Series that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSeries {
    Historical,
    PriceSpread,
    DemandForecast,
}

impl ExportSeries {
    pub const NAMES: &[&str] = &["historical", "price-spread", "demand-forecast"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "historical" => Some(Self::Historical),
            "price-spread" => Some(Self::PriceSpread),
            "demand-forecast" => Some(Self::DemandForecast),
            _ => None,
        }
    }
}

/// Writes records as CSV to any writer, header first.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_csv<R: Serialize>(records: &[R], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generates `series` and writes it as CSV.
///
/// `node` selects the node for per-node series and is ignored by the
/// system-wide forecast. Returns the number of data rows written.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_series<R: Rng + ?Sized>(
    series: ExportSeries,
    node: &Node,
    ctx: &MarketContext,
    rng: &mut R,
    writer: impl Write,
) -> io::Result<usize> {
    match series {
        ExportSeries::Historical => {
            let samples = HistoricalLmpGenerator::new(node).generate(ctx, rng);
            let records: Vec<HistoricalRecord> = assemble(&samples);
            write_csv(&records, writer)?;
            Ok(records.len())
        }
        ExportSeries::PriceSpread => {
            let points = PriceSpreadGenerator::new(node).generate(ctx, rng);
            let records: Vec<SpreadRecord> = assemble(&points);
            write_csv(&records, writer)?;
            Ok(records.len())
        }
        ExportSeries::DemandForecast => {
            let points = DemandForecastGenerator.generate(ctx, rng);
            let records: Vec<ForecastRecord> = assemble(&points);
            write_csv(&records, writer)?;
            Ok(records.len())
        }
    }
}

/// Generates `series` and writes it to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_series<R: Rng + ?Sized>(
    series: ExportSeries,
    node: &Node,
    ctx: &MarketContext,
    rng: &mut R,
    path: &Path,
) -> io::Result<usize> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_series(series, node, ctx, rng, buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use chrono::NaiveDate;
    use rand::{SeedableRng, rngs::StdRng};

    fn ctx() -> MarketContext {
        MarketContext::new(
            NaiveDate::from_ymd_opt(2024, 10, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    fn export(series: ExportSeries, seed: u64) -> String {
        let registry = Registry::ercot();
        let node = registry.node("A").unwrap();
        let mut buf = Vec::new();
        let rows =
            write_series(series, node, &ctx(), &mut StdRng::seed_from_u64(seed), &mut buf).unwrap();
        assert_eq!(rows, 24);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn historical_header_and_rows() {
        let csv = export(ExportSeries::Historical, 1);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,node,node_name,lmp,energy,congestion,loss,demand_mw,renewable_percent")
        );
        // 24 data rows
        assert_eq!(lines.count(), 24);
    }

    #[test]
    fn spread_direction_written_as_label() {
        let csv = export(ExportSeries::PriceSpread, 2);
        let mut rdr = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
        let headers = rdr.headers().cloned().unwrap();
        let idx = headers.iter().position(|h| h == "spread_direction").unwrap();
        for record in rdr.records() {
            let record = record.unwrap();
            assert!(["DA Premium", "RT Premium", "Neutral"].contains(&&record[idx]));
        }
    }

    #[test]
    fn forecast_columns_parse_as_numbers() {
        let csv = export(ExportSeries::DemandForecast, 3);
        let mut rdr = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
        assert_eq!(rdr.headers().map(csv::StringRecord::len).ok(), Some(7));
        for record in rdr.records() {
            let record = record.unwrap();
            for i in 1..7 {
                assert!(record[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
        }
    }

    #[test]
    fn deterministic_output() {
        assert_eq!(export(ExportSeries::Historical, 9), export(ExportSeries::Historical, 9));
    }

    #[test]
    fn series_names_parse() {
        for name in ExportSeries::NAMES {
            assert!(ExportSeries::parse(name).is_some());
        }
        assert!(ExportSeries::parse("lmp").is_none());
    }
}

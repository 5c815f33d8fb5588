//! Summary metrics derived from API records.
//!
//! Everything here is a pure function of already-rounded records, so the
//! dashboard and tests compute the same numbers from the same JSON.

use crate::assembler::{HistoricalRecord, LmpRecord, SpreadRecord, StorageRecord};

/// Default congestion alert threshold ($/MWh).
pub const DEFAULT_CONGESTION_THRESHOLD: f64 = 10.0;
/// Upper end of the adjustable threshold range ($/MWh).
pub const MAX_CONGESTION_THRESHOLD: f64 = 20.0;

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (n − 1 denominator). `None` below two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values.iter().copied())?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Selectable LMP component for per-node charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LmpComponent {
    #[default]
    Total,
    Energy,
    Congestion,
    Loss,
}

impl LmpComponent {
    pub const ALL: [Self; 4] = [Self::Total, Self::Energy, Self::Congestion, Self::Loss];

    pub fn value(self, record: &LmpRecord) -> f64 {
        match self {
            Self::Total => record.total_lmp,
            Self::Energy => record.energy,
            Self::Congestion => record.congestion,
            Self::Loss => record.loss,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Total => "Total LMP",
            Self::Energy => "Energy",
            Self::Congestion => "Congestion",
            Self::Loss => "Loss",
        }
    }

    /// Cycles to the next component.
    pub fn next(self) -> Self {
        match self {
            Self::Total => Self::Energy,
            Self::Energy => Self::Congestion,
            Self::Congestion => Self::Loss,
            Self::Loss => Self::Total,
        }
    }
}

/// Headline LMP figures across all nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmpSummary {
    pub avg_total: f64,
    pub max_total: f64,
    pub avg_energy: f64,
    pub avg_congestion: f64,
    pub avg_loss: f64,
}

impl LmpSummary {
    pub fn from_records(records: &[LmpRecord]) -> Option<Self> {
        Some(Self {
            avg_total: mean(records.iter().map(|r| r.total_lmp))?,
            max_total: records.iter().map(|r| r.total_lmp).reduce(f64::max)?,
            avg_energy: mean(records.iter().map(|r| r.energy))?,
            avg_congestion: mean(records.iter().map(|r| r.congestion))?,
            avg_loss: mean(records.iter().map(|r| r.loss))?,
        })
    }
}

/// Nodes whose congestion component is strictly above `threshold`, highest
/// first.
pub fn congested_nodes(records: &[LmpRecord], threshold: f64) -> Vec<&LmpRecord> {
    let mut hot: Vec<_> = records.iter().filter(|r| r.congestion > threshold).collect();
    hot.sort_by(|a, b| b.congestion.total_cmp(&a.congestion));
    hot
}

/// Fleet storage totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageSummary {
    pub total_charge_mw: f64,
    pub total_discharge_mw: f64,
    pub net_output_mw: f64,
    pub avg_net_per_site_mw: f64,
}

impl StorageSummary {
    pub fn from_records(records: &[StorageRecord]) -> Option<Self> {
        let net_output_mw: f64 = records.iter().map(|r| r.net_output_mw).sum();
        Some(Self {
            total_charge_mw: records.iter().map(|r| r.charge_mw).sum(),
            total_discharge_mw: records.iter().map(|r| r.discharge_mw).sum(),
            net_output_mw,
            avg_net_per_site_mw: mean(records.iter().map(|r| r.net_output_mw))?,
        })
    }
}

/// Min/max/mean/std of a history window's LMP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// `None` for fewer than two points.
    pub std_dev: Option<f64>,
}

impl HistoricalStats {
    pub fn from_records(records: &[HistoricalRecord]) -> Option<Self> {
        let lmps: Vec<f64> = records.iter().map(|r| r.lmp).collect();
        Some(Self {
            min: lmps.iter().copied().reduce(f64::min)?,
            max: lmps.iter().copied().reduce(f64::max)?,
            mean: mean(lmps.iter().copied())?,
            std_dev: sample_std(&lmps),
        })
    }
}

/// Hour counts by spread sign, plus the mean spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadSummary {
    /// Hours with DA > RT.
    pub da_over_rt_hours: usize,
    /// Hours with RT > DA.
    pub rt_over_da_hours: usize,
    pub avg_spread: f64,
}

impl SpreadSummary {
    pub fn from_records(records: &[SpreadRecord]) -> Option<Self> {
        Some(Self {
            da_over_rt_hours: records.iter().filter(|r| r.da_rt_spread > 0.0).count(),
            rt_over_da_hours: records.iter().filter(|r| r.da_rt_spread < 0.0).count(),
            avg_spread: mean(records.iter().map(|r| r.da_rt_spread))?,
        })
    }
}

//! Response records.
//!
//! Field names are the public JSON contract shared by the API, the CSV
//! export and the dashboard client. Each record is built from a generator
//! sample with `From<&Sample>`, which is also where rounding happens:
//! prices and MW figures to 2 decimals, percents to 1, historical demand to
//! whole MW.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::market::ancillary::AncillaryQuote;
use crate::market::congestion::{ConstraintEvent, Severity};
use crate::market::forecast::ForecastPoint;
use crate::market::historical::HistoricalSample;
use crate::market::lmp::LmpSample;
use crate::market::renewable::{
    RENEWABLE_CAPACITY_MW, RenewableSnapshot, SOLAR_CAPACITY_MW, WIND_CAPACITY_MW,
};
use crate::market::spread::{SpreadDirection, SpreadPoint};
use crate::market::storage::StorageDispatch;
use crate::market::types::round_dp;

/// Reported API version.
pub const API_VERSION: &str = "2.0";

fn round2(value: f64) -> f64 {
    round_dp(value, 2)
}

fn round1(value: f64) -> f64 {
    round_dp(value, 1)
}

/// Liveness probe body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub api_version: String,
}

impl HealthRecord {
    pub fn healthy(timestamp: NaiveDateTime) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp,
            api_version: API_VERSION.to_string(),
        }
    }
}

/// One node's LMP decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmpRecord {
    pub node: String,
    pub node_name: String,
    pub energy: f64,
    pub congestion: f64,
    pub loss: f64,
    pub total_lmp: f64,
    /// `"Load Center"` or `"Generation"`.
    pub node_type: String,
    pub timestamp: NaiveDateTime,
}

impl From<&LmpSample> for LmpRecord {
    fn from(s: &LmpSample) -> Self {
        Self {
            node: s.node_id.clone(),
            node_name: s.node_name.clone(),
            energy: round2(s.energy),
            congestion: round2(s.congestion),
            loss: round2(s.loss),
            total_lmp: round2(s.total),
            node_type: s.category.label().to_string(),
            timestamp: s.timestamp,
        }
    }
}

/// A constraint's loading at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub constraint_id: String,
    pub name: String,
    pub node: String,
    pub severity: Severity,
    pub flow_percent: f64,
    pub limit_mw: f64,
    pub current_mw: f64,
    pub duration_hours: u32,
    pub reason: String,
}

impl From<&ConstraintEvent> for ConstraintRecord {
    fn from(e: &ConstraintEvent) -> Self {
        Self {
            constraint_id: e.spec.id.to_string(),
            name: e.spec.name.to_string(),
            node: e.spec.node.to_string(),
            severity: e.spec.severity,
            flow_percent: round1(e.flow_percent),
            limit_mw: e.spec.limit_mw,
            current_mw: round1(e.current_mw),
            duration_hours: e.duration_hours,
            reason: e.spec.reason.to_string(),
        }
    }
}

/// Battery site dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord {
    pub node: String,
    pub node_name: String,
    pub capacity_mwh: f64,
    pub charge_mw: f64,
    pub discharge_mw: f64,
    /// Positive when exporting.
    pub net_output_mw: f64,
    pub soc_percent: f64,
    pub efficiency_percent: f64,
    pub power_loss_mw: f64,
    pub timestamp: NaiveDateTime,
}

impl From<&StorageDispatch> for StorageRecord {
    fn from(d: &StorageDispatch) -> Self {
        Self {
            node: d.node_id.clone(),
            node_name: d.site_name.clone(),
            capacity_mwh: d.capacity_mwh,
            charge_mw: round2(d.charge_mw),
            discharge_mw: round2(d.discharge_mw),
            net_output_mw: round2(d.net_output_mw()),
            soc_percent: round1(d.soc_percent),
            efficiency_percent: round1(d.efficiency * 100.0),
            power_loss_mw: round2(d.power_loss_mw()),
            timestamp: d.timestamp,
        }
    }
}

/// One hour of LMP history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub timestamp: NaiveDateTime,
    pub node: String,
    pub node_name: String,
    pub lmp: f64,
    pub energy: f64,
    pub congestion: f64,
    pub loss: f64,
    pub demand_mw: f64,
    pub renewable_percent: f64,
}

impl From<&HistoricalSample> for HistoricalRecord {
    fn from(s: &HistoricalSample) -> Self {
        Self {
            timestamp: s.timestamp,
            node: s.node_id.clone(),
            node_name: s.node_name.clone(),
            lmp: round2(s.lmp),
            energy: round2(s.energy),
            congestion: round2(s.congestion),
            loss: round2(s.loss),
            demand_mw: round_dp(s.demand_mw, 0),
            renewable_percent: round1(s.renewable_percent),
        }
    }
}

/// One hour of DA vs RT pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadRecord {
    pub timestamp: NaiveDateTime,
    pub node: String,
    pub node_name: String,
    pub day_ahead_price: f64,
    pub real_time_price: f64,
    /// DA minus RT.
    pub da_rt_spread: f64,
    pub spread_direction: SpreadDirection,
    pub spread_magnitude: f64,
    pub wind_forecast_error: f64,
    pub solar_forecast_error: f64,
}

impl From<&SpreadPoint> for SpreadRecord {
    fn from(p: &SpreadPoint) -> Self {
        let spread = round2(p.spread());
        Self {
            timestamp: p.timestamp,
            node: p.node_id.clone(),
            node_name: p.node_name.clone(),
            day_ahead_price: round2(p.day_ahead_price),
            real_time_price: round2(p.real_time_price),
            da_rt_spread: spread,
            spread_direction: p.direction(),
            spread_magnitude: spread.abs(),
            wind_forecast_error: round1(p.wind_forecast_error),
            solar_forecast_error: round1(p.solar_forecast_error),
        }
    }
}

/// Ancillary service quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncillaryRecord {
    pub service: String,
    pub price: f64,
    pub battery_participation_mw: f64,
    pub traditional_gen_mw: f64,
    pub total_mw: f64,
    pub battery_percent: f64,
}

impl From<&AncillaryQuote> for AncillaryRecord {
    fn from(q: &AncillaryQuote) -> Self {
        Self {
            service: q.spec.service.to_string(),
            price: round2(q.price),
            battery_participation_mw: round2(q.battery_mw),
            traditional_gen_mw: round2(q.traditional_mw),
            total_mw: round2(q.total_mw),
            battery_percent: round1(q.battery_percent),
        }
    }
}

/// Fleet renewable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewableRecord {
    pub timestamp: NaiveDateTime,
    pub wind_mw: f64,
    pub wind_capacity_mw: f64,
    pub wind_percent_capacity: f64,
    pub solar_mw: f64,
    pub solar_capacity_mw: f64,
    pub solar_percent_capacity: f64,
    pub renewable_total_mw: f64,
    pub renewable_capacity_mw: f64,
    pub renewable_percent_of_capacity: f64,
    pub renewable_percent_of_load: f64,
    pub forecast_next_hour_mw: f64,
}

impl From<&RenewableSnapshot> for RenewableRecord {
    fn from(s: &RenewableSnapshot) -> Self {
        Self {
            timestamp: s.timestamp,
            wind_mw: round2(s.wind_mw),
            wind_capacity_mw: WIND_CAPACITY_MW,
            wind_percent_capacity: round1(s.wind_percent_capacity()),
            solar_mw: round2(s.solar_mw),
            solar_capacity_mw: SOLAR_CAPACITY_MW,
            solar_percent_capacity: round1(s.solar_percent_capacity()),
            renewable_total_mw: round2(s.total_mw()),
            renewable_capacity_mw: RENEWABLE_CAPACITY_MW,
            renewable_percent_of_capacity: round1(s.percent_of_capacity()),
            renewable_percent_of_load: round1(s.percent_of_load()),
            forecast_next_hour_mw: round2(s.forecast_next_hour_mw),
        }
    }
}

/// One hour of the load forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub timestamp: NaiveDateTime,
    pub forecast_load_mw: f64,
    pub confidence_percent: f64,
    pub uncertainty_mw: f64,
    pub lower_bound_mw: f64,
    pub upper_bound_mw: f64,
    pub prev_day_actual_mw: f64,
}

impl From<&ForecastPoint> for ForecastRecord {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            timestamp: p.timestamp,
            forecast_load_mw: round2(p.load_mw),
            confidence_percent: round1(p.confidence_percent),
            uncertainty_mw: round2(p.uncertainty_mw()),
            lower_bound_mw: round2(p.lower_bound_mw()),
            upper_bound_mw: round2(p.upper_bound_mw()),
            prev_day_actual_mw: round2(p.previous_day_mw),
        }
    }
}

/// Converts a slice of samples into records.
pub fn assemble<'a, S, R>(samples: &'a [S]) -> Vec<R>
where
    R: From<&'a S>,
{
    samples.iter().map(R::from).collect()
}

use chrono::{NaiveDateTime, Timelike};
use rand::Rng;

use crate::market::clock::HourlySeries;
use crate::market::types::{Generator, MarketContext};
use crate::regime::{Band, RegimeProfile, forecast_confidence};

/// Forecast horizon in hours.
pub const FORECAST_HOURS: usize = 24;

const LOAD_JITTER: Band = Band::new(-500.0, 500.0);
/// Half-width of the forecast interval as a fraction of the point value.
const UNCERTAINTY_FRACTION: f64 = 0.05;
const PREVIOUS_DAY_FACTOR: Band = Band::new(0.95, 1.05);

/// One hour of the forward load forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    /// Hours ahead of "now" (0 is the current hour).
    pub horizon: usize,
    pub load_mw: f64,
    pub confidence_percent: f64,
    /// Same hour yesterday.
    pub previous_day_mw: f64,
}

impl ForecastPoint {
    pub fn uncertainty_mw(&self) -> f64 {
        self.load_mw * UNCERTAINTY_FRACTION
    }

    pub fn lower_bound_mw(&self) -> f64 {
        self.load_mw * (1.0 - UNCERTAINTY_FRACTION)
    }

    pub fn upper_bound_mw(&self) -> f64 {
        self.load_mw * (1.0 + UNCERTAINTY_FRACTION)
    }
}

/// System load forecast for the next 24 hours.
///
/// Each point sits on the daily load curve with small jitter. Confidence
/// decays linearly with horizon down to its floor; the interval is a fixed
/// fraction of the point value.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemandForecastGenerator;

impl Generator for DemandForecastGenerator {
    type Output = Vec<ForecastPoint>;

    fn generate<R: Rng + ?Sized>(&self, ctx: &MarketContext, rng: &mut R) -> Self::Output {
        HourlySeries::forward(ctx.now, FORECAST_HOURS)
            .map(|(horizon, timestamp)| {
                let profile = RegimeProfile::for_hour(timestamp.hour());
                let load_mw = profile.load_level_mw + LOAD_JITTER.sample(rng);
                ForecastPoint {
                    timestamp,
                    horizon,
                    load_mw,
                    confidence_percent: forecast_confidence(horizon),
                    previous_day_mw: load_mw * PREVIOUS_DAY_FACTOR.sample(rng),
                }
            })
            .collect()
    }

    fn signal(&self) -> &'static str {
        "demand-forecast"
    }
}

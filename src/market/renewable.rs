use std::f64::consts::PI;

use chrono::NaiveDateTime;
use rand::Rng;

use crate::market::types::{Generator, MarketContext};
use crate::regime::{Band, SOLAR_WINDOW_END, SOLAR_WINDOW_START};

/// Installed wind capacity (MW).
pub const WIND_CAPACITY_MW: f64 = 9000.0;
/// Installed solar capacity (MW).
pub const SOLAR_CAPACITY_MW: f64 = 3500.0;
/// Combined renewable capacity (MW).
pub const RENEWABLE_CAPACITY_MW: f64 = 12_500.0;
/// Assumed system load for the percent-of-load figure (MW).
pub const SYSTEM_LOAD_MW: f64 = 20_000.0;
/// Height of the clear-sky solar curve (MW).
pub const SOLAR_PEAK_MW: f64 = 2500.0;

const SOLAR_JITTER: Band = Band::new(-200.0, 200.0);
const NEXT_HOUR_FACTOR: Band = Band::new(0.8, 1.2);

/// Fleet-wide wind and solar output at an instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewableSnapshot {
    pub timestamp: NaiveDateTime,
    pub wind_mw: f64,
    pub solar_mw: f64,
    /// Persistence forecast of wind for the next hour.
    pub forecast_next_hour_mw: f64,
}

impl RenewableSnapshot {
    pub fn total_mw(&self) -> f64 {
        self.wind_mw + self.solar_mw
    }

    pub fn wind_percent_capacity(&self) -> f64 {
        self.wind_mw / WIND_CAPACITY_MW * 100.0
    }

    pub fn solar_percent_capacity(&self) -> f64 {
        self.solar_mw / SOLAR_CAPACITY_MW * 100.0
    }

    pub fn percent_of_capacity(&self) -> f64 {
        self.total_mw() / RENEWABLE_CAPACITY_MW * 100.0
    }

    pub fn percent_of_load(&self) -> f64 {
        self.total_mw() / SYSTEM_LOAD_MW * 100.0
    }
}

/// Clear-sky solar output (MW) at a possibly fractional hour of day.
///
/// A half-sine over the daylight window peaking at its midpoint (12.5);
/// zero outside the window.
pub fn solar_curve(hour: f64) -> f64 {
    let start = f64::from(SOLAR_WINDOW_START);
    let end = f64::from(SOLAR_WINDOW_END);
    if hour < start || hour >= end {
        return 0.0;
    }
    SOLAR_PEAK_MW * ((hour - start) * PI / (end - start)).sin()
}

/// Wind and solar output snapshot.
///
/// Wind is drawn from the diurnal wind band (strong at night, weak
/// mid-afternoon); solar follows [`solar_curve`] plus symmetric jitter,
/// floored at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenewableGenerator;

impl Generator for RenewableGenerator {
    type Output = RenewableSnapshot;

    fn generate<R: Rng + ?Sized>(&self, ctx: &MarketContext, rng: &mut R) -> RenewableSnapshot {
        let profile = ctx.profile();
        let wind_mw = profile.wind.sample(rng);
        let solar_mw = if profile.solar_active {
            (solar_curve(f64::from(profile.hour)) + SOLAR_JITTER.sample(rng)).max(0.0)
        } else {
            0.0
        };
        let forecast_next_hour_mw = wind_mw * NEXT_HOUR_FACTOR.sample(rng);

        RenewableSnapshot {
            timestamp: ctx.now,
            wind_mw,
            solar_mw,
            forecast_next_hour_mw,
        }
    }

    fn signal(&self) -> &'static str {
        "renewable-generation"
    }
}

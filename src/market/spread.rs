use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::market::clock::HourlySeries;
use crate::market::types::{Generator, MarketContext, round_dp};
use crate::regime::{Band, Regime, Signal, bounds};
use crate::registry::Node;

/// Number of hourly points in the spread window.
pub const SPREAD_HOURS: usize = 24;
/// Spreads within this many $/MWh of zero are neutral.
pub const SPREAD_DEADBAND: f64 = 1.0;

/// Real-time deviation from the day-ahead price; skewed upward for
/// unforecast peaks.
const RT_DEVIATION: Band = Band::new(-12.0, 15.0);
const WIND_FORECAST_ERROR: Band = Band::new(-5.0, 5.0);
const SOLAR_FORECAST_ERROR: Band = Band::new(-8.0, 8.0);

/// Which market priced higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadDirection {
    #[serde(rename = "DA Premium")]
    DaPremium,
    #[serde(rename = "RT Premium")]
    RtPremium,
    Neutral,
}

impl SpreadDirection {
    /// Classifies a DA minus RT spread with a symmetric deadband.
    pub fn classify(spread: f64) -> Self {
        if spread > SPREAD_DEADBAND {
            Self::DaPremium
        } else if spread < -SPREAD_DEADBAND {
            Self::RtPremium
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for SpreadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DaPremium => "DA Premium",
            Self::RtPremium => "RT Premium",
            Self::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

/// One hour of day-ahead vs real-time pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadPoint {
    pub timestamp: NaiveDateTime,
    pub node_id: String,
    pub node_name: String,
    pub day_ahead_price: f64,
    /// Floored at zero.
    pub real_time_price: f64,
    /// Wind forecast error (%).
    pub wind_forecast_error: f64,
    /// Solar forecast error (%).
    pub solar_forecast_error: f64,
}

impl SpreadPoint {
    /// Day-ahead minus real-time.
    pub fn spread(&self) -> f64 {
        self.day_ahead_price - self.real_time_price
    }

    /// Direction of the spread as published (rounded to cents), so the label
    /// always agrees with the reported spread.
    pub fn direction(&self) -> SpreadDirection {
        SpreadDirection::classify(round_dp(self.spread(), 2))
    }
}

/// Trailing 24-hour DA/RT spread for one node.
pub struct PriceSpreadGenerator<'a> {
    node: &'a Node,
}

impl<'a> PriceSpreadGenerator<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }
}

impl Generator for PriceSpreadGenerator<'_> {
    type Output = Vec<SpreadPoint>;

    fn generate<R: Rng + ?Sized>(&self, ctx: &MarketContext, rng: &mut R) -> Self::Output {
        HourlySeries::trailing(ctx.now, SPREAD_HOURS)
            .map(|(_, timestamp)| {
                let regime = Regime::classify(timestamp.hour());
                let day_ahead_price = bounds(Signal::DayAheadPrice, regime).sample(rng);
                let real_time_price = (day_ahead_price + RT_DEVIATION.sample(rng)).max(0.0);
                SpreadPoint {
                    timestamp,
                    node_id: self.node.id.clone(),
                    node_name: self.node.name.clone(),
                    day_ahead_price,
                    real_time_price,
                    wind_forecast_error: WIND_FORECAST_ERROR.sample(rng),
                    solar_forecast_error: SOLAR_FORECAST_ERROR.sample(rng),
                }
            })
            .collect()
    }

    fn signal(&self) -> &'static str {
        "price-spread"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use chrono::NaiveDate;
    use rand::{SeedableRng, rngs::StdRng};

    fn ctx() -> MarketContext {
        MarketContext::new(
            NaiveDate::from_ymd_opt(2024, 9, 9)
                .unwrap()
                .and_hms_opt(6, 45, 0)
                .unwrap(),
        )
    }

    #[test]
    fn deadband_classification() {
        assert_eq!(SpreadDirection::classify(1.01), SpreadDirection::DaPremium);
        assert_eq!(SpreadDirection::classify(1.0), SpreadDirection::Neutral);
        assert_eq!(SpreadDirection::classify(0.0), SpreadDirection::Neutral);
        assert_eq!(SpreadDirection::classify(-1.0), SpreadDirection::Neutral);
        assert_eq!(SpreadDirection::classify(-1.01), SpreadDirection::RtPremium);
    }

    #[test]
    fn direction_labels() {
        assert_eq!(SpreadDirection::DaPremium.to_string(), "DA Premium");
        assert_eq!(
            serde_json::to_value(SpreadDirection::RtPremium).unwrap(),
            "RT Premium"
        );
    }

    #[test]
    fn day_ahead_follows_peak_table_and_rt_is_floored() {
        let reg = Registry::ercot();
        let node = reg.node("A").unwrap();
        for seed in 0..40 {
            let points =
                PriceSpreadGenerator::new(node).generate(&ctx(), &mut StdRng::seed_from_u64(seed));
            assert_eq!(points.len(), 24);
            for p in points {
                let band = bounds(Signal::DayAheadPrice, Regime::classify(p.timestamp.hour()));
                assert!(band.contains(p.day_ahead_price));
                assert!(p.real_time_price >= 0.0);
                assert!(p.spread() > -15.0 && p.spread() <= 12.0);
                assert!(WIND_FORECAST_ERROR.contains(p.wind_forecast_error));
                assert!(SOLAR_FORECAST_ERROR.contains(p.solar_forecast_error));
            }
        }
    }

    #[test]
    fn direction_agrees_with_sign() {
        let reg = Registry::ercot();
        let node = reg.node("A").unwrap();
        let points =
            PriceSpreadGenerator::new(node).generate(&ctx(), &mut StdRng::seed_from_u64(77));
        for p in points {
            let s = round_dp(p.spread(), 2);
            let expected = if s > 1.0 {
                SpreadDirection::DaPremium
            } else if s < -1.0 {
                SpreadDirection::RtPremium
            } else {
                SpreadDirection::Neutral
            };
            assert_eq!(p.direction(), expected);
        }
    }
}

use chrono::{NaiveDateTime, Timelike};
use rand::Rng;

use crate::market::clock::HourlySeries;
use crate::market::types::{Generator, MarketContext};
use crate::regime::{Band, DayBand};
use crate::registry::Node;

/// Number of hourly points in the history window.
pub const HISTORY_HOURS: usize = 24;

const VOLATILITY: Band = Band::new(-8.0, 8.0);
const DEMAND: Band = Band::new(3500.0, 5500.0);
const RENEWABLE_SHARE: Band = Band::new(10.0, 40.0);

/// Fixed split of the historical LMP into components.
const ENERGY_SHARE: f64 = 0.70;
const CONGESTION_SHARE: f64 = 0.20;
const LOSS_SHARE: f64 = 0.10;

/// One hour of reconstructed LMP history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSample {
    pub timestamp: NaiveDateTime,
    pub node_id: String,
    pub node_name: String,
    /// Total LMP ($/MWh), >= 0.
    pub lmp: f64,
    pub energy: f64,
    pub congestion: f64,
    pub loss: f64,
    /// Node demand (MW).
    pub demand_mw: f64,
    /// Renewable share of supply (%).
    pub renewable_percent: f64,
}

/// Trailing 24-hour LMP history for a single node.
///
/// The base price follows the daily price curve (morning ramp, daytime dip,
/// evening peak, decline, night trough) with symmetric volatility on top.
pub struct HistoricalLmpGenerator<'a> {
    node: &'a Node,
}

impl<'a> HistoricalLmpGenerator<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }
}

impl Generator for HistoricalLmpGenerator<'_> {
    type Output = Vec<HistoricalSample>;

    fn generate<R: Rng + ?Sized>(&self, ctx: &MarketContext, rng: &mut R) -> Self::Output {
        HourlySeries::trailing(ctx.now, HISTORY_HOURS)
            .map(|(_, timestamp)| {
                let base = DayBand::price_curve(timestamp.hour()).price_band().sample(rng);
                let lmp = base + VOLATILITY.sample(rng);
                HistoricalSample {
                    timestamp,
                    node_id: self.node.id.clone(),
                    node_name: self.node.name.clone(),
                    lmp: lmp.max(0.0),
                    energy: (lmp * ENERGY_SHARE).max(0.0),
                    congestion: lmp * CONGESTION_SHARE,
                    loss: (lmp * LOSS_SHARE).max(0.0),
                    demand_mw: DEMAND.sample(rng),
                    renewable_percent: RENEWABLE_SHARE.sample(rng),
                }
            })
            .collect()
    }

    fn signal(&self) -> &'static str {
        "historical-lmp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use chrono::{NaiveDate, TimeDelta};
    use rand::{SeedableRng, rngs::StdRng};

    fn now() -> MarketContext {
        MarketContext::new(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(14, 42, 7)
                .unwrap(),
        )
    }

    #[test]
    fn produces_24_trailing_hours() {
        let reg = Registry::ercot();
        let node = reg.node("A").unwrap();
        let series =
            HistoricalLmpGenerator::new(node).generate(&now(), &mut StdRng::seed_from_u64(5));
        assert_eq!(series.len(), 24);
        assert_eq!(series.last().unwrap().timestamp, now().now);
        for pair in series.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, TimeDelta::hours(1));
        }
    }

    #[test]
    fn values_follow_price_curve() {
        let reg = Registry::ercot();
        let node = reg.node("B").unwrap();
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let series = HistoricalLmpGenerator::new(node).generate(&now(), &mut rng);
            for s in &series {
                let band = DayBand::price_curve(s.timestamp.hour()).price_band();
                assert!(s.lmp >= band.lo - 8.0 && s.lmp < band.hi + 8.0);
                assert!(s.lmp >= 0.0 && s.energy >= 0.0 && s.loss >= 0.0);
                assert!(DEMAND.contains(s.demand_mw));
                assert!(RENEWABLE_SHARE.contains(s.renewable_percent));
                assert_eq!(s.node_id, "B");
            }
        }
    }

    #[test]
    fn components_are_fixed_shares() {
        let reg = Registry::ercot();
        let node = reg.node("A").unwrap();
        let series =
            HistoricalLmpGenerator::new(node).generate(&now(), &mut StdRng::seed_from_u64(11));
        for s in series {
            assert!((s.energy - s.lmp * 0.7).abs() < 1e-9);
            assert!((s.congestion - s.lmp * 0.2).abs() < 1e-9);
        }
    }
}

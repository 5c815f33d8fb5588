use rand::Rng;

use crate::market::types::{Generator, MarketContext};
use crate::regime::Band;

/// Sampling bands for one ancillary service product.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSpec {
    pub service: &'static str,
    /// Clearing price ($/MW-h).
    pub price: Band,
    pub battery_mw: Band,
    pub traditional_mw: Band,
    pub total_mw: Band,
    pub battery_percent: Band,
}

/// Products quoted on every call, in publication order.
pub static SERVICES: [ServiceSpec; 4] = [
    ServiceSpec {
        service: "Regulation Up",
        price: Band::new(20.0, 50.0),
        battery_mw: Band::new(40.0, 120.0),
        traditional_mw: Band::new(80.0, 200.0),
        total_mw: Band::new(150.0, 280.0),
        battery_percent: Band::new(25.0, 45.0),
    },
    ServiceSpec {
        service: "Regulation Down",
        price: Band::new(10.0, 35.0),
        battery_mw: Band::new(30.0, 100.0),
        traditional_mw: Band::new(60.0, 180.0),
        total_mw: Band::new(100.0, 250.0),
        battery_percent: Band::new(20.0, 40.0),
    },
    ServiceSpec {
        service: "Responsive Reserves",
        price: Band::new(8.0, 20.0),
        battery_mw: Band::new(60.0, 150.0),
        traditional_mw: Band::new(150.0, 300.0),
        total_mw: Band::new(250.0, 400.0),
        battery_percent: Band::new(30.0, 50.0),
    },
    ServiceSpec {
        service: "ERCOT Contingency Reserve",
        price: Band::new(15.0, 40.0),
        battery_mw: Band::new(80.0, 180.0),
        traditional_mw: Band::new(200.0, 400.0),
        total_mw: Band::new(350.0, 550.0),
        battery_percent: Band::new(20.0, 35.0),
    },
];

/// One service's price and participation quote.
///
/// Every field is an independent draw: `battery_percent` is not derived from
/// the MW figures and `total_mw` need not equal battery plus traditional.
#[derive(Debug, Clone, PartialEq)]
pub struct AncillaryQuote {
    pub spec: &'static ServiceSpec,
    pub price: f64,
    pub battery_mw: f64,
    pub traditional_mw: f64,
    pub total_mw: f64,
    pub battery_percent: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AncillaryGenerator;

impl Generator for AncillaryGenerator {
    type Output = Vec<AncillaryQuote>;

    fn generate<R: Rng + ?Sized>(&self, _ctx: &MarketContext, rng: &mut R) -> Self::Output {
        SERVICES
            .iter()
            .map(|spec| AncillaryQuote {
                spec,
                price: spec.price.sample(rng),
                battery_mw: spec.battery_mw.sample(rng),
                traditional_mw: spec.traditional_mw.sample(rng),
                total_mw: spec.total_mw.sample(rng),
                battery_percent: spec.battery_percent.sample(rng),
            })
            .collect()
    }

    fn signal(&self) -> &'static str {
        "ancillary-services"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{SeedableRng, rngs::StdRng};

    fn ctx() -> MarketContext {
        MarketContext::new(
            NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn quotes_four_services_in_order() {
        let quotes = AncillaryGenerator.generate(&ctx(), &mut StdRng::seed_from_u64(0));
        let names: Vec<_> = quotes.iter().map(|q| q.spec.service).collect();
        assert_eq!(
            names,
            [
                "Regulation Up",
                "Regulation Down",
                "Responsive Reserves",
                "ERCOT Contingency Reserve"
            ]
        );
    }

    #[test]
    fn each_field_within_its_own_band() {
        for seed in 0..100 {
            for q in AncillaryGenerator.generate(&ctx(), &mut StdRng::seed_from_u64(seed)) {
                assert!(q.spec.price.contains(q.price));
                assert!(q.spec.battery_mw.contains(q.battery_mw));
                assert!(q.spec.traditional_mw.contains(q.traditional_mw));
                assert!(q.spec.total_mw.contains(q.total_mw));
                assert!(q.spec.battery_percent.contains(q.battery_percent));
            }
        }
    }
}

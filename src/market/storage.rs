use chrono::NaiveDateTime;
use rand::Rng;

use crate::market::types::{Generator, MarketContext};
use crate::regime::{Band, Regime, RegimeProfile};
use crate::registry::{Registry, StorageSite};

/// Dispatch of one battery site at an instant.
///
/// # Power Convention
/// `net_output_mw` is positive when the site exports (discharge exceeds
/// charge) and negative when it is a net load.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageDispatch {
    pub node_id: String,
    pub site_name: String,
    pub capacity_mwh: f64,
    pub efficiency: f64,
    pub charge_mw: f64,
    pub discharge_mw: f64,
    /// State of charge (%).
    pub soc_percent: f64,
    pub timestamp: NaiveDateTime,
}

impl StorageDispatch {
    /// Discharge minus charge.
    pub fn net_output_mw(&self) -> f64 {
        self.discharge_mw - self.charge_mw
    }

    /// Conversion loss on the power moved through the site.
    pub fn power_loss_mw(&self) -> f64 {
        (self.charge_mw + self.discharge_mw) * (1.0 - self.efficiency)
    }
}

/// Price-following battery dispatch for every registered storage site.
///
/// Peak hours draw the fleet down, night hours refill it, and mid-peak hours
/// allow light simultaneous charge and discharge (standby cycling).
pub struct StorageGenerator<'a> {
    registry: &'a Registry,
}

impl<'a> StorageGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }
}

/// Peak-side power never exceeds half the site's energy capacity.
fn half_capacity(site: &StorageSite) -> f64 {
    site.capacity_mwh / 2.0
}

/// Discharge and charge bands for a site under a profile, after the
/// per-site half-capacity cap.
pub fn site_bands(site: &StorageSite, profile: &RegimeProfile) -> (Band, Band) {
    let cap = half_capacity(site);
    let discharge = match profile.regime {
        Regime::MorningPeak | Regime::EveningPeak => profile.storage_discharge.capped(cap),
        _ => profile.storage_discharge,
    };
    let charge = match profile.regime {
        Regime::OffPeak => profile.storage_charge.capped(cap),
        _ => profile.storage_charge,
    };
    (discharge, charge)
}

impl Generator for StorageGenerator<'_> {
    type Output = Vec<StorageDispatch>;

    fn generate<R: Rng + ?Sized>(&self, ctx: &MarketContext, rng: &mut R) -> Self::Output {
        let profile = ctx.profile();
        self.registry
            .storage()
            .iter()
            .map(|site| {
                let (discharge, charge) = site_bands(site, &profile);
                let discharge_mw = discharge.sample(rng);
                let charge_mw = charge.sample(rng);
                let soc_percent = profile.storage_soc.sample(rng);
                StorageDispatch {
                    node_id: site.node.clone(),
                    site_name: site.name.clone(),
                    capacity_mwh: site.capacity_mwh,
                    efficiency: site.efficiency,
                    charge_mw,
                    discharge_mw,
                    soc_percent,
                    timestamp: ctx.now,
                }
            })
            .collect()
    }

    fn signal(&self) -> &'static str {
        "storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{SeedableRng, rngs::StdRng};

    fn ctx(hour: u32) -> MarketContext {
        MarketContext::new(
            NaiveDate::from_ymd_opt(2024, 2, 2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    fn run(hour: u32, seed: u64) -> Vec<StorageDispatch> {
        let reg = Registry::ercot();
        StorageGenerator::new(&reg).generate(&ctx(hour), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn peak_hours_discharge() {
        for seed in 0..50 {
            for d in run(18, seed) {
                let cap = (d.capacity_mwh / 2.0).min(200.0);
                assert!(d.discharge_mw >= 80.0 && d.discharge_mw <= cap);
                assert!(d.charge_mw < 10.0);
                assert!(d.soc_percent >= 20.0 && d.soc_percent < 50.0);
                assert!(d.net_output_mw() > 0.0);
            }
        }
    }

    #[test]
    fn night_hours_charge() {
        for seed in 0..50 {
            for d in run(2, seed) {
                let cap = (d.capacity_mwh / 2.0).min(150.0);
                assert!(d.charge_mw >= 60.0 && d.charge_mw <= cap);
                assert!(d.discharge_mw < 10.0);
                assert!(d.soc_percent >= 30.0 && d.soc_percent < 70.0);
                assert!(d.net_output_mw() < 0.0);
            }
        }
    }

    #[test]
    fn mid_peak_allows_simultaneous_activity() {
        for seed in 0..50 {
            for d in run(12, seed) {
                assert!(d.charge_mw >= 10.0 && d.charge_mw < 40.0);
                assert!(d.discharge_mw >= 20.0 && d.discharge_mw < 60.0);
            }
        }
    }

    #[test]
    fn power_loss_uses_site_efficiency() {
        for d in run(8, 3) {
            let expected = (d.charge_mw + d.discharge_mw) * (1.0 - d.efficiency);
            assert_eq!(d.power_loss_mw(), expected);
        }
    }

    #[test]
    fn small_site_collapses_to_half_capacity() {
        let site = StorageSite {
            node: "A".into(),
            name: "tiny".into(),
            capacity_mwh: 100.0,
            efficiency: 0.9,
        };
        let (discharge, _) = site_bands(&site, &RegimeProfile::for_hour(19));
        assert_eq!(discharge, Band::new(50.0, 50.0));
        let (_, charge) = site_bands(&site, &RegimeProfile::for_hour(1));
        assert_eq!(charge, Band::new(50.0, 50.0));
    }
}

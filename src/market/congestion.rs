use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market::types::{Generator, MarketContext};
use crate::regime::Band;
use crate::registry::Registry;

/// Operator-assigned constraint severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Static definition of a monitored transmission element.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub node: &'static str,
    pub severity: Severity,
    pub limit_mw: f64,
    /// Loading as a percent of the limit.
    pub flow_percent: Band,
    pub current_mw: Band,
    /// Expected binding duration in whole hours, half-open.
    pub duration_hours: Range<u32>,
    pub reason: &'static str,
}

/// Monitored constraints. Severity is assigned per element, not derived
/// from the sampled loading, so flow above 100% can carry any severity.
pub static CONSTRAINTS: [ConstraintSpec; 6] = [
    ConstraintSpec {
        id: "TC_001",
        name: "Dallas North 345kV Line",
        node: "A",
        severity: Severity::High,
        limit_mw: 450.0,
        flow_percent: Band::new(92.0, 108.0),
        current_mw: Band::new(410.0, 480.0),
        duration_hours: 1..8,
        reason: "Peak demand + Outage on backup line",
    },
    ConstraintSpec {
        id: "TC_002",
        name: "Houston Load Relief Transformer",
        node: "B",
        severity: Severity::High,
        limit_mw: 550.0,
        flow_percent: Band::new(88.0, 102.0),
        current_mw: Band::new(480.0, 560.0),
        duration_hours: 1..6,
        reason: "Summer peak demand",
    },
    ConstraintSpec {
        id: "TC_003",
        name: "San Antonio Interconnect",
        node: "C",
        severity: Severity::Medium,
        limit_mw: 350.0,
        flow_percent: Band::new(70.0, 85.0),
        current_mw: Band::new(245.0, 297.0),
        duration_hours: 2..5,
        reason: "Normal operation",
    },
    ConstraintSpec {
        id: "TC_004",
        name: "Austin Central Corridor",
        node: "D",
        severity: Severity::Low,
        limit_mw: 320.0,
        flow_percent: Band::new(55.0, 70.0),
        current_mw: Band::new(176.0, 224.0),
        duration_hours: 1..4,
        reason: "Light load",
    },
    ConstraintSpec {
        id: "TC_005",
        name: "Coastal Wind Integration Line",
        node: "G",
        severity: Severity::Medium,
        limit_mw: 1200.0,
        flow_percent: Band::new(75.0, 90.0),
        current_mw: Band::new(900.0, 1080.0),
        duration_hours: 2..7,
        reason: "High wind generation",
    },
    ConstraintSpec {
        id: "TC_006",
        name: "West Texas Export Line",
        node: "F",
        severity: Severity::Low,
        limit_mw: 800.0,
        flow_percent: Band::new(40.0, 60.0),
        current_mw: Band::new(320.0, 480.0),
        duration_hours: 0..3,
        reason: "Wind variability",
    },
];

/// A constraint's loading at the time of the call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintEvent {
    pub spec: &'static ConstraintSpec,
    pub flow_percent: f64,
    pub current_mw: f64,
    pub duration_hours: u32,
}

/// Re-samples every catalog constraint whose node is in the registry.
pub struct CongestionGenerator<'a> {
    registry: &'a Registry,
}

impl<'a> CongestionGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }
}

impl Generator for CongestionGenerator<'_> {
    type Output = Vec<ConstraintEvent>;

    fn generate<R: Rng + ?Sized>(&self, _ctx: &MarketContext, rng: &mut R) -> Self::Output {
        CONSTRAINTS
            .iter()
            .filter(|spec| {
                let known = self.registry.node(spec.node).is_some();
                if !known {
                    debug!(
                        constraint = spec.id,
                        node = spec.node,
                        "skipping constraint on unknown node"
                    );
                }
                known
            })
            .map(|spec| ConstraintEvent {
                spec,
                flow_percent: spec.flow_percent.sample(rng),
                current_mw: spec.current_mw.sample(rng),
                duration_hours: if spec.duration_hours.is_empty() {
                    spec.duration_hours.start
                } else {
                    rng.random_range(spec.duration_hours.clone())
                },
            })
            .collect()
    }

    fn signal(&self) -> &'static str {
        "congestion"
    }
}

//! Hour-of-day classification and the bound tables keyed by it.
//!
//! Every generator picks its sampling ranges from here. Transitions between
//! regimes are step functions: there is no interpolation between adjacent
//! hours.

use rand::Rng;

/// Named time-of-day bucket for market signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// Hours 7 and 8.
    MorningPeak,
    /// Hours 17 through 20.
    EveningPeak,
    /// Hours 22 through 5 (night).
    OffPeak,
    /// Everything else.
    MidPeak,
}

impl Regime {
    /// Classifies an hour of day. Hours >= 24 wrap.
    pub fn classify(hour: u32) -> Self {
        match hour % 24 {
            7 | 8 => Self::MorningPeak,
            17..=20 => Self::EveningPeak,
            22 | 23 | 0..=5 => Self::OffPeak,
            _ => Self::MidPeak,
        }
    }

    /// `true` for both peak regimes.
    pub fn is_peak(self) -> bool {
        matches!(self, Self::MorningPeak | Self::EveningPeak)
    }

    /// Short label for logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::MorningPeak => "morning-peak",
            Self::EveningPeak => "evening-peak",
            Self::OffPeak => "off-peak",
            Self::MidPeak => "mid-peak",
        }
    }
}

/// Half-open uniform sampling range `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Draws one value. A degenerate band (`hi <= lo`) always yields `lo`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.hi <= self.lo {
            self.lo
        } else {
            rng.random_range(self.lo..self.hi)
        }
    }

    /// `true` if `value` lies in `[lo, hi]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Lowers the upper bound to `cap`; the band collapses to `cap` when the
    /// cap sits below the floor.
    pub fn capped(self, cap: f64) -> Self {
        if cap < self.lo {
            Self::new(cap, cap)
        } else {
            Self::new(self.lo, self.hi.min(cap))
        }
    }
}

/// Time-shaped signals with a regime-keyed bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Shared energy price for the LMP snapshot ($/MWh).
    BaseEnergy,
    /// Day-ahead price for the spread series ($/MWh).
    DayAheadPrice,
    /// Battery discharge (MW), before the per-site cap.
    StorageDischarge,
    /// Battery charge (MW), before the per-site cap.
    StorageCharge,
    /// Battery state of charge (%).
    StorageSoc,
}

/// The (signal, regime) bound table.
pub fn bounds(signal: Signal, regime: Regime) -> Band {
    use Regime::{EveningPeak, MidPeak, MorningPeak, OffPeak};
    use Signal::*;

    match (signal, regime) {
        (BaseEnergy, MorningPeak | EveningPeak) => Band::new(55.0, 85.0),
        (BaseEnergy, OffPeak) => Band::new(25.0, 40.0),
        (BaseEnergy, MidPeak) => Band::new(40.0, 60.0),

        (DayAheadPrice, MorningPeak | EveningPeak) => Band::new(60.0, 90.0),
        (DayAheadPrice, OffPeak | MidPeak) => Band::new(30.0, 50.0),

        (StorageDischarge, MorningPeak | EveningPeak) => Band::new(80.0, DISCHARGE_CAP_MW),
        (StorageDischarge, OffPeak) => Band::new(0.0, 10.0),
        (StorageDischarge, MidPeak) => Band::new(20.0, 60.0),

        (StorageCharge, MorningPeak | EveningPeak) => Band::new(0.0, 10.0),
        (StorageCharge, OffPeak) => Band::new(60.0, CHARGE_CAP_MW),
        (StorageCharge, MidPeak) => Band::new(10.0, 40.0),

        (StorageSoc, MorningPeak | EveningPeak) => Band::new(20.0, 50.0),
        (StorageSoc, OffPeak) => Band::new(30.0, 70.0),
        (StorageSoc, MidPeak) => Band::new(40.0, 80.0),
    }
}

/// Absolute ceiling on peak discharge (MW).
pub const DISCHARGE_CAP_MW: f64 = 200.0;
/// Absolute ceiling on night charge (MW).
pub const CHARGE_CAP_MW: f64 = 150.0;

/// Daily-curve bucket with a widened 6-9 morning ramp, used by the
/// historical price and demand forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBand {
    MorningRamp,
    Daytime,
    EveningPeak,
    EveningDecline,
    Night,
}

impl DayBand {
    /// Bucketing for the historical price curve.
    pub fn price_curve(hour: u32) -> Self {
        match hour % 24 {
            6..=8 => Self::MorningRamp,
            9..=16 => Self::Daytime,
            17..=20 => Self::EveningPeak,
            21 => Self::EveningDecline,
            _ => Self::Night,
        }
    }

    /// Bucketing for the system load curve. The evening peak starts an hour
    /// earlier and the decline lasts an hour longer than on the price curve.
    pub fn load_curve(hour: u32) -> Self {
        match hour % 24 {
            6..=8 => Self::MorningRamp,
            9..=15 => Self::Daytime,
            16..=20 => Self::EveningPeak,
            21 | 22 => Self::EveningDecline,
            _ => Self::Night,
        }
    }

    /// Base LMP range ($/MWh) on the historical price curve.
    pub fn price_band(self) -> Band {
        match self {
            Self::MorningRamp => Band::new(50.0, 75.0),
            Self::Daytime => Band::new(35.0, 55.0),
            Self::EveningPeak => Band::new(60.0, 95.0),
            Self::EveningDecline => Band::new(45.0, 65.0),
            Self::Night => Band::new(20.0, 40.0),
        }
    }

    /// Centre of the system load (MW) on the load curve.
    pub fn load_level_mw(self) -> f64 {
        match self {
            Self::MorningRamp => 21_000.0,
            Self::Daytime => 19_000.0,
            Self::EveningPeak => 22_000.0,
            Self::EveningDecline => 20_000.0,
            Self::Night => 17_000.0,
        }
    }
}

/// Diurnal wind bucket; wind is strongest at night and weakest mid-afternoon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindBand {
    Night,
    Midday,
    Shoulder,
}

impl WindBand {
    pub fn classify(hour: u32) -> Self {
        match hour % 24 {
            20..=23 | 0..=7 => Self::Night,
            12..=15 => Self::Midday,
            _ => Self::Shoulder,
        }
    }

    /// Wind output range (MW).
    pub fn band(self) -> Band {
        match self {
            Self::Night => Band::new(3000.0, 5500.0),
            Self::Midday => Band::new(1000.0, 3000.0),
            Self::Shoulder => Band::new(2000.0, 4000.0),
        }
    }
}

/// First daylight hour of the solar window (inclusive).
pub const SOLAR_WINDOW_START: u32 = 8;
/// End of the solar window (exclusive).
pub const SOLAR_WINDOW_END: u32 = 17;

/// `true` while the sun contributes output.
pub fn in_solar_window(hour: u32) -> bool {
    (SOLAR_WINDOW_START..SOLAR_WINDOW_END).contains(&(hour % 24))
}

/// Forecast confidence floor (%).
pub const CONFIDENCE_FLOOR: f64 = 85.0;
const CONFIDENCE_START: f64 = 98.0;
const CONFIDENCE_DECAY_PER_HOUR: f64 = 0.5;

/// Confidence (%) of the forecast point `horizon` hours ahead.
pub fn forecast_confidence(horizon: usize) -> f64 {
    (CONFIDENCE_START - CONFIDENCE_DECAY_PER_HOUR * horizon as f64).max(CONFIDENCE_FLOOR)
}

/// Every hour-dependent bound in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeProfile {
    pub hour: u32,
    pub regime: Regime,
    pub base_energy: Band,
    pub day_ahead: Band,
    pub storage_discharge: Band,
    pub storage_charge: Band,
    pub storage_soc: Band,
    pub wind: Band,
    pub solar_active: bool,
    pub load_level_mw: f64,
}

impl RegimeProfile {
    pub fn for_hour(hour: u32) -> Self {
        let hour = hour % 24;
        let regime = Regime::classify(hour);
        Self {
            hour,
            regime,
            base_energy: bounds(Signal::BaseEnergy, regime),
            day_ahead: bounds(Signal::DayAheadPrice, regime),
            storage_discharge: bounds(Signal::StorageDischarge, regime),
            storage_charge: bounds(Signal::StorageCharge, regime),
            storage_soc: bounds(Signal::StorageSoc, regime),
            wind: WindBand::classify(hour).band(),
            solar_active: in_solar_window(hour),
            load_level_mw: DayBand::load_curve(hour).load_level_mw(),
        }
    }
}

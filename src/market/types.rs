//! Common types and traits for market-signal generators.

use chrono::{NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::regime::RegimeProfile;

/// Clock reading a generation pass runs against.
///
/// Read once per request so every value in a response shares one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketContext {
    pub now: NaiveDateTime,
}

impl MarketContext {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Hour of day of `now`, in `0..24`.
    pub fn hour(&self) -> u32 {
        self.now.hour()
    }

    /// Bound profile for the current hour.
    pub fn profile(&self) -> RegimeProfile {
        RegimeProfile::for_hour(self.hour())
    }
}

/// A source of synthetic market data.
///
/// Implementations draw every random magnitude from `rng`, so a seeded
/// generator reproduces its output exactly.
pub trait Generator {
    /// Snapshot or series produced by one call.
    type Output;

    /// Runs one generation pass.
    fn generate<R: Rng + ?Sized>(&self, ctx: &MarketContext, rng: &mut R) -> Self::Output;

    /// Name of the market signal, for logs.
    fn signal(&self) -> &'static str;
}

/// RNG for one generation pass: reproducible when `seed` is set, OS
/// entropy otherwise.
pub fn pass_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Rounds to `places` decimal places, half away from zero.
pub fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

//! Synthetic market-signal generators.
//!
//! Each generator is a pure function of a [`MarketContext`], an injected
//! random source and (where needed) the static [`crate::registry::Registry`].
//! None of them keeps state between calls.

/// Ancillary-service price and participation quotes.
pub mod ancillary;
/// Time source and hourly timestamp series.
pub mod clock;
/// Transmission constraint events.
pub mod congestion;
/// 24-hour forward system load forecast.
pub mod forecast;
/// 24-hour trailing LMP history for one node.
pub mod historical;
/// Per-node LMP snapshot.
pub mod lmp;
/// Wind and solar output snapshot.
pub mod renewable;
/// Day-ahead vs real-time price spread.
pub mod spread;
/// Battery charge/discharge dispatch.
pub mod storage;
pub mod types;

pub use ancillary::AncillaryGenerator;
pub use clock::{Clock, HourlySeries};
pub use congestion::CongestionGenerator;
pub use forecast::DemandForecastGenerator;
pub use historical::HistoricalLmpGenerator;
pub use lmp::LmpGenerator;
pub use renewable::RenewableGenerator;
pub use spread::PriceSpreadGenerator;
pub use storage::StorageGenerator;
pub use types::{Generator, MarketContext};

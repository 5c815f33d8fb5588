//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use grid_market_sim::market::MarketContext;
use grid_market_sim::registry::Registry;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seed used by fixtures that need a reproducible stream.
pub const SEED: u64 = 42;

/// A weekday in July at `hour`:00.
pub fn at_hour(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 15)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Generator context pinned to `at_hour(hour)`.
pub fn context(hour: u32) -> MarketContext {
    MarketContext::new(at_hour(hour))
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// The built-in catalog.
pub fn registry() -> Registry {
    Registry::ercot()
}

#[cfg(feature = "api")]
pub mod api {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use grid_market_sim::api::{AppState, router};
    use grid_market_sim::market::Clock;
    use tower::util::ServiceExt;

    /// API state with a pinned clock, fixed seed and node "A" as reference.
    pub fn fixed_state(hour: u32) -> Arc<AppState> {
        Arc::new(AppState::new(
            super::registry(),
            Clock::Fixed(super::at_hour(hour)),
            Some(super::SEED),
            "A",
        ))
    }

    /// Sends one GET through a fresh router.
    pub async fn get(state: Arc<AppState>, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router(state).oneshot(req).await.unwrap()
    }

    /// GET and decode the body as JSON.
    pub async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = get(state, uri).await;
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }
}

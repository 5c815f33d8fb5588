//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use tracing::debug;

use super::AppState;
use super::error::ApiError;
use super::types::NodeQuery;
use crate::assembler::{
    AncillaryRecord, ConstraintRecord, ForecastRecord, HealthRecord, HistoricalRecord, LmpRecord,
    RenewableRecord, SpreadRecord, StorageRecord, assemble,
};
use crate::market::{
    AncillaryGenerator, CongestionGenerator, DemandForecastGenerator, Generator,
    HistoricalLmpGenerator, LmpGenerator, PriceSpreadGenerator, RenewableGenerator,
    StorageGenerator,
};
use crate::registry::Node;

/// One generation pass with a fresh RNG and a single clock reading.
fn run<G: Generator>(state: &AppState, generator: &G) -> G::Output {
    let ctx = state.context();
    let mut rng = state.rng();
    let output = generator.generate(&ctx, &mut rng);
    debug!(
        signal = generator.signal(),
        regime = ctx.profile().regime.label(),
        at = %ctx.now,
        "generated"
    );
    output
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthRecord> {
    Json(HealthRecord::healthy(state.clock.now()))
}

/// `GET /api/nodes`
pub async fn nodes(State(state): State<Arc<AppState>>) -> Json<Vec<Node>> {
    Json(state.registry.nodes().to_vec())
}

/// `GET /api/lmp`
pub async fn lmp(State(state): State<Arc<AppState>>) -> Json<Vec<LmpRecord>> {
    let samples = run(&state, &LmpGenerator::new(&state.registry));
    Json(assemble(&samples))
}

/// `GET /api/congestion`
pub async fn congestion(State(state): State<Arc<AppState>>) -> Json<Vec<ConstraintRecord>> {
    let events = run(&state, &CongestionGenerator::new(&state.registry));
    Json(assemble(&events))
}

/// `GET /api/storage`
pub async fn storage(State(state): State<Arc<AppState>>) -> Json<Vec<StorageRecord>> {
    let dispatch = run(&state, &StorageGenerator::new(&state.registry));
    Json(assemble(&dispatch))
}

/// `GET /api/historical[?node=ID]` → 404 for an unknown node, 400 for a
/// malformed query.
pub async fn historical(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NodeQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoricalRecord>>, ApiError> {
    let Query(query) = query?;
    let node = state.resolve_node(query.node.as_deref())?;
    let samples = run(&state, &HistoricalLmpGenerator::new(node));
    Ok(Json(assemble(&samples)))
}

/// `GET /api/price-spread[?node=ID]` → 404 for an unknown node, 400 for a
/// malformed query.
pub async fn price_spread(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NodeQuery>, QueryRejection>,
) -> Result<Json<Vec<SpreadRecord>>, ApiError> {
    let Query(query) = query?;
    let node = state.resolve_node(query.node.as_deref())?;
    let points = run(&state, &PriceSpreadGenerator::new(node));
    Ok(Json(assemble(&points)))
}

/// `GET /api/ancillary-services`
pub async fn ancillary_services(State(state): State<Arc<AppState>>) -> Json<Vec<AncillaryRecord>> {
    let quotes = run(&state, &AncillaryGenerator);
    Json(assemble(&quotes))
}

/// `GET /api/renewable-generation`
pub async fn renewable_generation(State(state): State<Arc<AppState>>) -> Json<RenewableRecord> {
    let snapshot = run(&state, &RenewableGenerator);
    Json(RenewableRecord::from(&snapshot))
}

/// `GET /api/demand-forecast`
pub async fn demand_forecast(State(state): State<Arc<AppState>>) -> Json<Vec<ForecastRecord>> {
    let points = run(&state, &DemandForecastGenerator);
    Json(assemble(&points))
}

/// Fallback for every unmatched route.
pub async fn not_found() -> ApiError {
    ApiError::endpoint_not_found()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::market::Clock;
    use crate::registry::Registry;

    fn make_test_state() -> Arc<AppState> {
        let noon = NaiveDate::from_ymd_opt(2024, 7, 15)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        Arc::new(AppState::new(Registry::ercot(), Clock::Fixed(noon), Some(42), "A"))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_returns_200() {
        let (status, json) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["timestamp"], "2024-07-15T18:00:00");
    }

    #[tokio::test]
    async fn historical_defaults_to_reference_node() {
        let (status, json) = get_json("/api/historical").await;
        assert_eq!(status, StatusCode::OK);
        let points = json.as_array().unwrap();
        assert_eq!(points.len(), 24);
        assert!(points.iter().all(|p| p["node"] == "A"));
    }

    #[tokio::test]
    async fn historical_selects_node() {
        let (_, json) = get_json("/api/historical?node=D").await;
        assert_eq!(json[0]["node"], "D");
        assert_eq!(json[0]["node_name"], "Austin");
    }

    #[tokio::test]
    async fn unknown_node_returns_404() {
        let (status, json) = get_json("/api/price-spread?node=ZZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Node 'ZZ' not found");
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (status, json) = get_json("/api/weather").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn seeded_responses_repeat() {
        let (_, a) = get_json("/api/lmp").await;
        let (_, b) = get_json("/api/lmp").await;
        assert_eq!(a, b);
    }
}

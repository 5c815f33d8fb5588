//! REST API serving synthetic market data.
//!
//! Ten GET endpoints under `/api`. Every request reads the clock once,
//! builds its own RNG and runs one generator; nothing is shared between
//! requests except the read-only [`AppState`].

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use types::{ErrorResponse, NodeQuery};

use std::any::Any;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use rand::rngs::StdRng;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{ConfigError, ServiceConfig};
use crate::market::types::pass_rng;
use crate::market::{Clock, MarketContext};
use crate::registry::{Node, Registry};

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`; handlers only read it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Registry,
    pub clock: Clock,
    /// Fixed seed applied to every request, for reproducible responses.
    pub seed: Option<u64>,
    /// Default node for `/api/historical` and `/api/price-spread`.
    pub reference_node: String,
}

impl AppState {
    pub fn new(
        registry: Registry,
        clock: Clock,
        seed: Option<u64>,
        reference_node: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            clock,
            seed,
            reference_node: reference_node.into(),
        }
    }

    /// State for the system clock from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the registry catalogs are invalid.
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            cfg.build_registry()?,
            Clock::System,
            cfg.server.seed,
            cfg.market.reference_node.clone(),
        ))
    }

    /// Fresh RNG for one request.
    pub fn rng(&self) -> StdRng {
        pass_rng(self.seed)
    }

    /// Single clock reading for one request.
    pub fn context(&self) -> MarketContext {
        MarketContext::new(self.clock.now())
    }

    /// Looks up `requested`, falling back to the reference node.
    pub fn resolve_node(&self, requested: Option<&str>) -> Result<&Node, ApiError> {
        let id = requested.unwrap_or(&self.reference_node);
        self.registry.node(id).ok_or_else(|| ApiError::unknown_node(id))
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/nodes", get(handlers::nodes))
        .route("/api/lmp", get(handlers::lmp))
        .route("/api/congestion", get(handlers::congestion))
        .route("/api/storage", get(handlers::storage))
        .route("/api/historical", get(handlers::historical))
        .route("/api/price-spread", get(handlers::price_spread))
        .route("/api/ancillary-services", get(handlers::ancillary_services))
        .route("/api/renewable-generation", get(handlers::renewable_generation))
        .route("/api/demand-forecast", get(handlers::demand_forecast))
        .with_state(state);
    with_layers(routes)
}

/// 404 fallback, panic boundary, CORS and request tracing.
fn with_layers(routes: Router) -> Router {
    routes
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    ApiError::Internal.into_response()
}

/// Binds to `addr` and serves until Ctrl+C / SIGTERM.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::telemetry::shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn panic_becomes_500_json() {
        async fn boom() -> &'static str {
            panic!("generator exploded")
        }
        let app = with_layers(Router::new().route("/api/boom", get(boom)));
        let req = Request::builder().uri("/api/boom").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn seeded_state_repeats_rng() {
        use rand::Rng;
        let state = AppState::new(Registry::ercot(), Clock::System, Some(9), "A");
        let a: u64 = state.rng().random();
        let b: u64 = state.rng().random();
        assert_eq!(a, b);
    }

    #[test]
    fn resolve_node_defaults_to_reference() {
        let state = AppState::new(Registry::ercot(), Clock::System, None, "C");
        assert_eq!(state.resolve_node(None).map(|n| n.id.as_str()), Ok("C"));
        assert_eq!(state.resolve_node(Some("G")).map(|n| n.id.as_str()), Ok("G"));
        assert_eq!(state.resolve_node(Some("Q")).err(), Some(ApiError::unknown_node("Q")));
    }
}

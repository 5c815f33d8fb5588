//! API query and error body types.

use serde::{Deserialize, Serialize};

/// Optional node selector for per-node series.
#[derive(Debug, Default, Deserialize)]
pub struct NodeQuery {
    /// Node id; the configured reference node when absent.
    pub node: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

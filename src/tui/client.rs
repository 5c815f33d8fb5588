//! Blocking HTTP client for the market API, with a TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Fetch failures, shown in the dashboard status line. Nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure or timeout.
    #[error("API unavailable at {url}: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Non-2xx response.
    #[error("API returned HTTP {0}")]
    Status(u16),
    /// Body was not the expected JSON shape.
    #[error("malformed response from {path}: {message}")]
    Decode { path: String, message: String },
}

/// Keyed values that expire `ttl` after insertion.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, (Instant, V)>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Value for `key` if it was stored less than `ttl` before `now`.
    pub fn get(&self, key: &str, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(at, _)| now.saturating_duration_since(*at) < self.ttl)
            .map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V, now: Instant) {
        self.entries.insert(key.into(), (now, value));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Client for the `/api/*` endpoints.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    cache: TtlCache<serde_json::Value>,
}

impl ApiClient {
    /// Builds a client with a per-request `timeout` and a response cache
    /// holding payloads for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unavailable` if the TLS backend cannot be set up.
    pub fn new(base_url: &str, timeout: Duration, ttl: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("grid-market-sim/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Unavailable {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            cache: TtlCache::new(ttl),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `path` (e.g. `/api/lmp`), serving from the cache while fresh.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    pub fn fetch<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let now = Instant::now();
        let cached = self.cache.get(path, now).cloned();
        let value = match cached {
            Some(value) => value,
            None => {
                let value = self.get_json(path)?;
                self.cache.insert(path, value.clone(), now);
                value
            }
        };
        serde_json::from_value(value).map_err(|e| ClientError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Drops every cached payload so the next fetch goes to the network.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    fn get_json(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "fetching");
        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|source| ClientError::Unavailable {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        resp.json().map_err(|e| ClientError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves `count` canned responses on an ephemeral port.
    fn canned_server(status_line: &'static str, body: &'static str, count: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(count) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                    line.clear();
                }
                let resp = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(resp.as_bytes()).unwrap();
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn cache_expires_after_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("/api/lmp", 1, t0);
        assert_eq!(cache.get("/api/lmp", t0 + Duration::from_secs(299)), Some(&1));
        assert_eq!(cache.get("/api/lmp", t0 + Duration::from_secs(300)), None);
        assert_eq!(cache.get("/api/storage", t0), None);
    }

    #[test]
    fn unreachable_api_is_unavailable() {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let mut client = ApiClient::new(
            &format!("http://127.0.0.1:{port}"),
            Duration::from_millis(500),
            Duration::from_secs(60),
        )
        .unwrap();
        let err = client.fetch::<serde_json::Value>("/api/health").unwrap_err();
        assert!(matches!(err, ClientError::Unavailable { .. }), "{err}");
    }

    #[test]
    fn non_success_status_is_reported() {
        let url = canned_server("503 Service Unavailable", r#"{"error":"down"}"#, 1);
        let mut client =
            ApiClient::new(&url, Duration::from_secs(2), Duration::from_secs(60)).unwrap();
        let err = client.fetch::<serde_json::Value>("/api/lmp").unwrap_err();
        assert!(matches!(err, ClientError::Status(503)));
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        // the server answers exactly once
        let url = canned_server("200 OK", r#"{"status":"healthy"}"#, 1);
        let mut client =
            ApiClient::new(&url, Duration::from_secs(2), Duration::from_secs(60)).unwrap();
        let first: serde_json::Value = client.fetch("/api/health").unwrap();
        let second: serde_json::Value = client.fetch("/api/health").unwrap();
        assert_eq!(first, second);
        assert_eq!(second["status"], "healthy");
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let url = canned_server("200 OK", r#"{"status":"healthy"}"#, 1);
        let mut client =
            ApiClient::new(&url, Duration::from_secs(2), Duration::from_secs(60)).unwrap();
        let err = client.fetch::<Vec<u32>>("/api/lmp").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}

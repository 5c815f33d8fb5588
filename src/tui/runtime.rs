//! Dashboard application state and data refresh.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::warn;

use super::client::ApiClient;
use crate::analytics::{DEFAULT_CONGESTION_THRESHOLD, LmpComponent, MAX_CONGESTION_THRESHOLD};
use crate::assembler::{
    AncillaryRecord, ConstraintRecord, ForecastRecord, HealthRecord, HistoricalRecord, LmpRecord,
    RenewableRecord, SpreadRecord, StorageRecord,
};

/// Threshold slider step ($/MWh).
const THRESHOLD_STEP: f64 = 1.0;

/// Dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Lmp,
    Congestion,
    Storage,
    Historical,
    Spread,
    Settings,
}

impl View {
    pub const ALL: [Self; 7] = [
        Self::Overview,
        Self::Lmp,
        Self::Congestion,
        Self::Storage,
        Self::Historical,
        Self::Spread,
        Self::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Lmp => "LMP Analysis",
            Self::Congestion => "Congestion",
            Self::Storage => "Energy Storage",
            Self::Historical => "Historical",
            Self::Spread => "DA/RT Spread",
            Self::Settings => "Settings",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Last successfully fetched payload per endpoint.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub health: Option<HealthRecord>,
    pub lmp: Option<Vec<LmpRecord>>,
    pub congestion: Option<Vec<ConstraintRecord>>,
    pub storage: Option<Vec<StorageRecord>>,
    pub historical: Option<Vec<HistoricalRecord>>,
    pub spread: Option<Vec<SpreadRecord>>,
    pub ancillary: Option<Vec<AncillaryRecord>>,
    pub renewable: Option<RenewableRecord>,
    pub forecast: Option<Vec<ForecastRecord>>,
}

/// Dashboard application state.
pub struct App {
    client: ApiClient,
    pub data: Snapshot,
    pub view: View,
    /// Congestion alert threshold ($/MWh).
    pub threshold: f64,
    /// Component shown in the LMP bar chart.
    pub component: LmpComponent,
    /// Most recent fetch error, cleared by the next fully successful refresh.
    pub status: Option<String>,
    pub refresh_every: Duration,
    pub cache_ttl: Duration,
    pub last_refresh: Option<Instant>,
    pub quit: bool,
}

impl App {
    pub fn new(client: ApiClient, refresh_every: Duration, cache_ttl: Duration) -> Self {
        Self {
            client,
            data: Snapshot::default(),
            view: View::Overview,
            threshold: DEFAULT_CONGESTION_THRESHOLD,
            component: LmpComponent::default(),
            status: None,
            refresh_every,
            cache_ttl,
            last_refresh: None,
            quit: false,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// `true` once the auto-refresh interval has elapsed.
    pub fn refresh_due(&self) -> bool {
        self.last_refresh
            .is_none_or(|at| at.elapsed() >= self.refresh_every)
    }

    /// Fetches what the current view needs. Errors land in `status`; data
    /// from earlier successful fetches is kept.
    pub fn refresh(&mut self) {
        self.status = None;
        match self.view {
            View::Overview => {
                self.update("/api/health", |d| &mut d.health);
                self.update("/api/lmp", |d| &mut d.lmp);
                self.update("/api/storage", |d| &mut d.storage);
                self.update("/api/renewable-generation", |d| &mut d.renewable);
                self.update("/api/ancillary-services", |d| &mut d.ancillary);
            }
            View::Lmp => {
                self.update("/api/lmp", |d| &mut d.lmp);
            }
            View::Congestion => {
                self.update("/api/lmp", |d| &mut d.lmp);
                self.update("/api/congestion", |d| &mut d.congestion);
            }
            View::Storage => {
                self.update("/api/storage", |d| &mut d.storage);
            }
            View::Historical => {
                self.update("/api/historical", |d| &mut d.historical);
                self.update("/api/demand-forecast", |d| &mut d.forecast);
            }
            View::Spread => {
                self.update("/api/price-spread", |d| &mut d.spread);
            }
            View::Settings => {
                self.update("/api/health", |d| &mut d.health);
            }
        }
        self.last_refresh = Some(Instant::now());
    }

    /// Drops the cache and refetches the current view.
    pub fn force_refresh(&mut self) {
        self.client.invalidate();
        self.refresh();
    }

    /// Stores a successful fetch of `path` in the slot picked by `slot`.
    fn update<T: DeserializeOwned>(
        &mut self,
        path: &str,
        slot: fn(&mut Snapshot) -> &mut Option<T>,
    ) {
        if let Some(value) = self.load(path) {
            *slot(&mut self.data) = Some(value);
        }
    }

    fn load<T: DeserializeOwned>(&mut self, path: &str) -> Option<T> {
        match self.client.fetch(path) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path, error = %e, "fetch failed");
                if self.status.is_none() {
                    self.status = Some(e.to_string());
                }
                None
            }
        }
    }

    pub fn select(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.refresh();
        }
    }

    pub fn next_view(&mut self) {
        self.select(self.view.next());
    }

    pub fn prev_view(&mut self) {
        self.select(self.view.prev());
    }

    pub fn raise_threshold(&mut self) {
        self.threshold = (self.threshold + THRESHOLD_STEP).min(MAX_CONGESTION_THRESHOLD);
    }

    pub fn lower_threshold(&mut self) {
        self.threshold = (self.threshold - THRESHOLD_STEP).max(0.0);
    }

    pub fn cycle_component(&mut self) {
        self.component = self.component.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn offline_app() -> App {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = ApiClient::new(
            &format!("http://127.0.0.1:{port}"),
            Duration::from_millis(300),
            Duration::from_secs(300),
        )
        .unwrap();
        App::new(client, Duration::from_secs(30), Duration::from_secs(300))
    }

    #[test]
    fn views_cycle_both_ways() {
        let mut view = View::Overview;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Overview);
        assert_eq!(View::Overview.prev(), View::Settings);
    }

    #[test]
    fn threshold_stays_in_range() {
        let mut app = offline_app();
        assert_eq!(app.threshold, 10.0);
        for _ in 0..30 {
            app.raise_threshold();
        }
        assert_eq!(app.threshold, MAX_CONGESTION_THRESHOLD);
        for _ in 0..30 {
            app.lower_threshold();
        }
        assert_eq!(app.threshold, 0.0);
    }

    #[test]
    fn unreachable_api_sets_status_and_keeps_running() {
        let mut app = offline_app();
        assert!(app.refresh_due());
        app.refresh();
        assert!(app.status.as_deref().is_some_and(|s| s.contains("unavailable")));
        assert!(app.data.lmp.is_none());
        assert!(!app.refresh_due());
    }

    #[test]
    fn component_cycles() {
        let mut app = offline_app();
        app.cycle_component();
        assert_eq!(app.component, LmpComponent::Energy);
    }
}

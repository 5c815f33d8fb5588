//! grid-market-sim entry point: CLI wiring and mode dispatch.

use std::path::Path;
use std::process;

use grid_market_sim::cli::{self, CliOptions, Mode, Parsed};
use grid_market_sim::config::ServiceConfig;
use grid_market_sim::io::export::{ExportSeries, export_series};
use grid_market_sim::market::types::pass_rng;
use grid_market_sim::market::{Clock, MarketContext};
use grid_market_sim::telemetry::init_tracing;
use tracing::info;

/// Loads the config file (or defaults), then applies env and CLI overrides.
fn load_config(cli: &CliOptions) -> ServiceConfig {
    let mut cfg = match &cli.config {
        Some(path) => match ServiceConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => ServiceConfig::default(),
    };

    if let Err(e) = cfg.apply_env(|key| std::env::var(key).ok()) {
        eprintln!("{e}");
        process::exit(1);
    }

    if let Some(seed) = cli.seed {
        cfg.server.seed = Some(seed);
    }
    if let Some(bind) = &cli.bind {
        cfg.server.bind.clone_from(bind);
    }
    if let Some(url) = &cli.api_url {
        cfg.dashboard.base_url.clone_from(url);
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

#[cfg(feature = "api")]
fn serve(cfg: &ServiceConfig) {
    use std::sync::Arc;

    use grid_market_sim::api::{self, AppState};

    init_tracing(&cfg.logging);
    let addr = cfg.bind_addr().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let state = AppState::from_config(cfg).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    info!(
        nodes = state.registry.nodes().len(),
        storage = state.registry.storage().len(),
        seeded = state.seed.is_some(),
        "registry loaded"
    );
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(api::serve(Arc::new(state), addr)) {
        eprintln!("error: server failed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn serve(_cfg: &ServiceConfig) {
    eprintln!("error: built without the `api` feature; rebuild with --features api");
    process::exit(1);
}

#[cfg(feature = "tui")]
fn dashboard(cfg: &ServiceConfig) {
    // no subscriber: the terminal belongs to the UI
    if let Err(e) = grid_market_sim::tui::run(&cfg.dashboard) {
        eprintln!("error: dashboard failed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn dashboard(_cfg: &ServiceConfig) {
    eprintln!("error: built without the `tui` feature; rebuild with --features tui");
    process::exit(1);
}

fn export(cfg: &ServiceConfig, series: ExportSeries, out: &Path) {
    init_tracing(&cfg.logging);
    let registry = cfg.build_registry().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    // validate() already checked the reference node exists
    let Some(node) = registry.node(&cfg.market.reference_node) else {
        eprintln!("error: unknown reference node \"{}\"", cfg.market.reference_node);
        process::exit(1);
    };
    let ctx = MarketContext::new(Clock::System.now());
    let mut rng = pass_rng(cfg.server.seed);
    match export_series(series, node, &ctx, &mut rng, out) {
        Ok(rows) => info!(?series, rows, path = %out.display(), "series exported"),
        Err(e) => {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(Parsed::Run(opts)) => opts,
        Ok(Parsed::Help) => {
            cli::print_usage();
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    let cfg = load_config(&cli);

    match &cli.mode {
        Mode::Serve => serve(&cfg),
        Mode::Dashboard => dashboard(&cfg),
        Mode::Export { series, out } => export(&cfg, *series, out),
    }
}

//! Terminal dashboard for the market API.
//!
//! Feature-gated behind `tui`. Launch with `--dashboard` on the CLI. The
//! dashboard only talks HTTP; point it at any running instance of the API.

/// Blocking API client and response cache.
pub mod client;
mod controls;
mod layout;
/// Dashboard application state.
pub mod runtime;
mod style;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::DashboardConfig;
use client::ApiClient;
use runtime::App;

/// Upper bound on input latency while waiting for the next refresh.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Launches the dashboard event loop.
///
/// Sets up the terminal (raw mode, alternate screen), runs the event loop,
/// and restores the terminal on exit.
///
/// # Errors
///
/// Returns an `io::Error` if the client or the terminal cannot be set up,
/// or if drawing fails.
pub fn run(cfg: &DashboardConfig) -> io::Result<()> {
    let client = ApiClient::new(&cfg.base_url, cfg.timeout(), cfg.cache_ttl())
        .map_err(io::Error::other)?;
    let mut app = App::new(client, cfg.refresh(), cfg.cache_ttl());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            return Err(e);
        }
    };

    let result = event_loop(&mut terminal, &mut app);

    // always restore terminal state
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

/// Core event loop: refresh when due, draw, poll input.
fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        if app.refresh_due() {
            app.refresh();
        }

        terminal.draw(|frame| layout::render(frame, app))?;

        if app.quit {
            return Ok(());
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                controls::handle_key(app, key);
            }
        }
    }
}

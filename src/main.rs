// Mirror Manager
// TUI application for one-way directory mirroring

// IMPORTS ------------------>>

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use tracing::{info, warn};

use mirror_manager::core::{App, AppConfig};
use mirror_manager::logging;
use mirror_manager::ui::run_app;

//--------------------------------------------------------<<

// ┌──────────────────────────────────────────────────────────────────────────────────────────────────────────────────┐
// │                                                 MAIN ENTRY POINT                                                 │
// └──────────────────────────────────────────────────────────────────────────────────────────────────────────────────┘

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    let _log_guard = logging::init(&config.logging)?;
    logging::install_panic_hook();
    info!(version = env!("CARGO_PKG_VERSION"), "mirror-manager starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("mirror-runtime")
        .build()
        .context("Failed to start async runtime")?;

    let mut app = App::new(config, runtime.handle().clone())?;

    {
        let mut guard = TerminalGuard::enter(app.config.ui.mouse_enabled)?;
        run_app(&mut guard.terminal, &mut app)?;
    }

    // ┌────────────────────────────────────────────────────────────────────────────────────────────────┐
    // │                                       DRAIN ON CLOSE                                           │
    // └────────────────────────────────────────────────────────────────────────────────────────────────┘

    let in_flight = app.jobs.in_flight();
    if in_flight > 0 {
        info!(in_flight, "window closed with jobs in flight, draining");
        println!("Existing sync jobs will continue in the background");
    }

    let tick = app.config.tick_interval();
    app.jobs.drain(tick, |event| {
        println!("{}", event.notice());
    });

    for failure in app.jobs.failures() {
        warn!(worker = %failure.worker, error = %failure.message, "job failed during session");
        eprintln!("{}", failure);
    }

    info!(jobs = app.jobs.records().len(), "mirror-manager exiting");
    Ok(())
}

/// Raw mode and alternate screen, restored on drop even when unwinding
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    mouse: bool,
}

impl TerminalGuard {
    fn enter(mouse: bool) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal, mouse })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        if self.mouse {
            let _ = execute!(self.terminal.backend_mut(), DisableMouseCapture);
        }
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

// UI module
// TUI components and views for the mirror manager

pub mod app_view;
pub mod folder_picker;
pub mod form_view;
pub mod job_list;
pub mod notices;
pub mod styles;

use anyhow::Result;
use crossterm::event;
use ratatui::{backend::Backend, Terminal};
use std::time::Instant;

use crate::core::{App, EventHandler};

pub use app_view::render_app;
pub use folder_picker::FolderPicker;
pub use form_view::render_form;
pub use job_list::render_job_list;
pub use notices::{render_popup, render_toasts};
pub use styles::Styles;

/// Run the main application event loop
///
/// Every iteration draws, waits up to one tick for input, then lets the
/// app observe finished jobs. Returns when the user quits; jobs still
/// running are left to the caller.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick = app.config.tick_interval();

    loop {
        // Render the UI
        terminal.draw(|f| render_app(f, app))?;

        // Handle events
        if event::poll(tick)? {
            let event = event::read()?;
            let app_event = EventHandler::handle(event, app.input_mode());
            app.handle_event(app_event);
        }

        app.tick(Instant::now());

        // Check if we should quit
        if app.should_quit {
            return Ok(());
        }
    }
}

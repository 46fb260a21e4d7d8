// Application View
// Main application layout and rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use super::{render_form, render_job_list, render_popup, render_toasts, Styles};
use crate::core::{App, InputMode};

/// Render the entire application
pub fn render_app(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(7), // Form
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Jobs
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let mode = app.input_mode();

    render_header(f, chunks[0]);
    render_form(f, &app.form, mode, chunks[1]);
    render_progress(f, app, chunks[2]);
    render_job_list(f, app.jobs.records(), app.job_scroll, chunks[3]);
    render_footer(f, mode, chunks[4]);

    if let Some(picker) = app.picker.as_mut() {
        let picker_area = centered(area, 80, 70);
        f.render_widget(Clear, picker_area);
        picker.render(f, picker_area);
    }

    render_toasts(f, area, app.toasts.toasts());

    if let Some(popup) = &app.popup {
        render_popup(f, area, popup);
    }
}

/// Render the header bar
fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("Mirror Manager")
        .style(Styles::header())
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

/// Indeterminate activity bar; idle when nothing runs
fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let in_flight = app.jobs.in_flight();
    let (label, style) = if in_flight > 0 {
        (format!("{} job(s) running", in_flight), Styles::gauge_active())
    } else {
        ("Idle".to_string(), Styles::gauge_idle())
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(style)
        .ratio(app.progress.ratio())
        .label(label);
    f.render_widget(gauge, area);
}

/// Render the footer bar
fn render_footer(f: &mut Frame, mode: InputMode, area: Rect) {
    let help_text = match mode {
        InputMode::Form => {
            "Esc: Quit | Tab/↑↓: Move | Enter: Browse/Toggle/Sync | Space: Toggle | Ctrl-S: Sync | Ctrl-U: Clear | PgUp/PgDn: Jobs"
        }
        InputMode::Picker => "↑/↓: Navigate | Enter: Open | Backspace: Up | s: Select current | Esc: Cancel",
        InputMode::Popup => "Enter/Esc: Close",
    };

    let footer = Paragraph::new(help_text)
        .style(Styles::footer())
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

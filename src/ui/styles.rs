// UI Styles
// Color schemes and styling for the TUI

use ratatui::style::{Color, Modifier, Style};

use crate::core::{PopupKind, ToastKind};

/// Application color scheme and styles
pub struct Styles;

impl Styles {
    // === Header / Footer ===

    pub fn header() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn footer() -> Style {
        Style::default().fg(Color::Yellow)
    }

    // === Form ===

    pub fn label() -> Style {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input_focused() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn input_placeholder() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn button() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Gray)
    }

    pub fn button_focused() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // === List Items ===

    pub fn list_selected_focused() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    // === Job Status Colors ===

    pub fn job_running() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn job_succeeded() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn job_failed() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    // === Progress ===

    pub fn gauge_active() -> Style {
        Style::default().fg(Color::Cyan).bg(Color::Black)
    }

    pub fn gauge_idle() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // === Notices ===

    /// Icon and color for a toast
    pub fn toast(kind: ToastKind) -> (&'static str, Style) {
        let (icon, color) = match kind {
            ToastKind::Success => ("✓", Color::Green),
            ToastKind::Error => ("✗", Color::Red),
            ToastKind::Info => ("ℹ", Color::Cyan),
        };
        let style = Style::default()
            .fg(color)
            .bg(Color::Rgb(10, 10, 10))
            .add_modifier(Modifier::BOLD);
        (icon, style)
    }

    pub fn popup_border(kind: PopupKind) -> Style {
        let color = match kind {
            PopupKind::Warning => Color::Yellow,
            PopupKind::Error => Color::Red,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Background laid over everything behind a popup
    pub fn dim_background() -> Style {
        Style::default().bg(Color::Rgb(10, 10, 10)).fg(Color::DarkGray)
    }

    // === Border Styles ===

    pub fn border_focused() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn border_unfocused() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_focused() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_unfocused() -> Style {
        Style::default().fg(Color::Gray)
    }
}

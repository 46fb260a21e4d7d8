// Form View
// Renders the sync form: path inputs, checkboxes and the Sync button

use ratatui::{
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::Styles;
use crate::core::{FormField, InputMode, SyncForm};
use crate::utilities::shorten_middle;

const LABEL_WIDTH: usize = 9;

/// Render the form; places the terminal cursor in the focused path field
pub fn render_form(f: &mut Frame, form: &SyncForm, mode: InputMode, area: Rect) {
    let active = mode == InputMode::Form && !form.is_locked();
    let (border_style, title_style) = if active {
        (Styles::border_focused(), Styles::title_focused())
    } else {
        (Styles::border_unfocused(), Styles::title_unfocused())
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let value_width = inner_width.saturating_sub(LABEL_WIDTH + 2);

    let lines = vec![
        path_line(form, FormField::Source, "Source", value_width),
        path_line(form, FormField::Target, "Target", value_width),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            checkbox(form, FormField::Purge, "Purge target", form.purge),
            Span::raw("    "),
            checkbox(form, FormField::Create, "Create target", form.create),
        ]),
        Line::from(vec![
            Span::raw("  "),
            button(form),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Directory Sync ", title_style)),
    );
    f.render_widget(paragraph, area);

    if active && form.focus.is_path() {
        let row = if form.focus == FormField::Source { 0 } else { 1 };
        let value_len = form.path_value(form.focus).chars().count().min(value_width);
        let x = area.x + 1 + (LABEL_WIDTH + 2 + value_len) as u16;
        let y = area.y + 1 + row;
        if x < area.x + area.width.saturating_sub(1) && y < area.y + area.height.saturating_sub(1) {
            f.set_cursor_position(Position::new(x, y));
        }
    }
}

fn marker(form: &SyncForm, field: FormField) -> Span<'static> {
    if form.focus == field {
        Span::styled("▶ ", Styles::title_focused())
    } else {
        Span::raw("  ")
    }
}

fn path_line(form: &SyncForm, field: FormField, label: &str, width: usize) -> Line<'static> {
    let value = form.path_value(field);
    let value_span = if value.is_empty() {
        Span::styled(
            shorten_middle("type a path or press Enter to browse", width),
            Styles::input_placeholder(),
        )
    } else {
        // Keep the tail visible while typing
        let count = value.chars().count();
        let shown: String = if count > width {
            value.chars().skip(count - width).collect()
        } else {
            value.to_string()
        };
        Span::styled(shown, Styles::input_focused())
    };

    Line::from(vec![
        marker(form, field),
        Span::styled(format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH), Styles::label()),
        value_span,
    ])
}

fn checkbox(form: &SyncForm, field: FormField, label: &str, checked: bool) -> Span<'static> {
    let mark = if checked { "x" } else { " " };
    let text = format!("[{}] {}", mark, label);
    if form.focus == field {
        Span::styled(text, Styles::list_selected_focused())
    } else {
        Span::raw(text)
    }
}

fn button(form: &SyncForm) -> Span<'static> {
    let style = if form.focus == FormField::SyncButton {
        Styles::button_focused()
    } else {
        Styles::button()
    };
    Span::styled("  Sync  ", style)
}

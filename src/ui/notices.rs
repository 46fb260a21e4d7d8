// Notice Rendering
// Toasts in the bottom-left corner and centered blocking popups

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use super::Styles;
use crate::core::{Popup, Toast};

/// Render toasts stacked upward from the bottom-left corner, inset by 1
pub fn render_toasts(f: &mut Frame, area: Rect, toasts: &[Toast]) {
    if toasts.is_empty() || area.width < 4 || area.height < 2 {
        return;
    }

    let max_width = area.width.saturating_sub(2) as usize;
    let mut y_offset = 0u16;

    // Newest toast sits lowest
    for toast in toasts.iter().rev() {
        let (icon, style) = Styles::toast(toast.kind);
        let mut content = format!("  {} {} ", icon, toast.message);
        if content.chars().count() > max_width {
            content = content.chars().take(max_width).collect();
        }
        let width = content.chars().count() as u16;

        let y = match area.height.checked_sub(2 + y_offset) {
            Some(row) => area.y + row,
            None => break,
        };
        let toast_area = Rect {
            x: area.x + 1,
            y,
            width,
            height: 1,
        };

        f.render_widget(Clear, toast_area);
        f.render_widget(Paragraph::new(content).style(style), toast_area);
        y_offset += 1;
    }
}

/// Dim the screen and render the popup centered on top
pub fn render_popup(f: &mut Frame, area: Rect, popup: &Popup) {
    f.render_widget(Paragraph::new("").style(Styles::dim_background()), area);

    let text_width = 50usize.min(area.width.saturating_sub(8) as usize).max(10);
    let lines = wrap_text(&popup.message, text_width);

    let longest = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(popup.title.chars().count());
    let width = (longest as u16 + 6).max(30).min(area.width);
    // Borders, blank line, message, blank line, hint
    let height = (lines.len() as u16 + 5).min(area.height);

    let popup_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let border = Styles::popup_border(popup.kind);
    let mut content = vec![Line::from("")];
    content.extend(lines.into_iter().map(Line::from));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled("Enter / Esc to close", Styles::muted())));

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Thick)
                .border_style(border)
                .title(Span::styled(format!(" {} ", popup.title), border))
                .title_alignment(Alignment::Center),
        );

    f.render_widget(Clear, popup_area);
    f.render_widget(widget, popup_area);
}

/// Greedy word wrap; words longer than `width` are split
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: String = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_popup_is_drawn_centered() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let popup = Popup::warning("Missing Fields".to_string(), "Please complete all fields".to_string());
        terminal.draw(|f| render_popup(f, f.area(), &popup)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Missing Fields"));
        assert!(text.contains("Please complete all fields"));
    }

    #[test]
    fn test_newest_toast_is_lowest() {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let toasts = vec![Toast::info("first".to_string()), Toast::success("second".to_string())];
        terminal.draw(|f| render_toasts(f, f.area(), &toasts)).unwrap();

        let text = screen_text(&terminal);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[8].contains("second"));
        assert!(rows[7].contains("first"));
    }
}

// Folder Picker
// Directory-only browser used to fill the source and target fields

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::fs;
use std::path::{Path, PathBuf};

use super::Styles;
use crate::core::FormField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FolderPicker {
    /// Form field receiving the chosen directory
    pub field: FormField,
    pub current_dir: PathBuf,
    pub entries: Vec<DirEntry>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub visible_height: usize,
    /// Last listing failure, shown instead of the entries
    pub error: Option<String>,
}

impl FolderPicker {
    /// Open at `start`, or at its nearest existing ancestor
    pub fn new(field: FormField, start: &Path) -> Self {
        let mut current = start.to_path_buf();
        while !current.is_dir() {
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        let mut picker = Self {
            field,
            current_dir: current,
            entries: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            visible_height: 0,
            error: None,
        };
        picker.load_directory();
        picker
    }

    pub fn load_directory(&mut self) {
        self.entries.clear();
        self.error = None;

        match fs::read_dir(&self.current_dir) {
            Ok(read_dir) => {
                let mut dirs: Vec<DirEntry> = read_dir
                    .flatten()
                    .filter(|e| e.path().is_dir())
                    .map(|e| DirEntry {
                        name: e.file_name().to_string_lossy().to_string(),
                        path: e.path(),
                    })
                    .collect();
                dirs.sort_by_key(|d| d.name.to_lowercase());
                self.entries = dirs;
            }
            Err(e) => {
                self.error = Some(format!("Cannot read {}: {}", self.current_dir.display(), e));
            }
        }

        self.selected_index = self.selected_index.min(self.entries.len().saturating_sub(1));
        self.adjust_scroll_to_selection();
    }

    pub fn selected(&self) -> Option<&DirEntry> {
        self.entries.get(self.selected_index)
    }

    pub fn navigate_into(&mut self) {
        if let Some(entry) = self.selected() {
            self.current_dir = entry.path.clone();
            self.selected_index = 0;
            self.scroll_offset = 0;
            self.load_directory();
        }
    }

    pub fn navigate_parent(&mut self) {
        let Some(parent) = self.current_dir.parent().map(Path::to_path_buf) else {
            return;
        };
        let came_from = self
            .current_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.current_dir = parent;
        self.selected_index = 0;
        self.load_directory();

        // Keep the directory we just left selected
        if let Some(i) = self.entries.iter().position(|e| e.name == came_from) {
            self.selected_index = i;
            self.adjust_scroll_to_selection();
        }
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.adjust_scroll_to_selection();
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index < self.entries.len().saturating_sub(1) {
            self.selected_index += 1;
            self.adjust_scroll_to_selection();
        }
    }

    fn adjust_scroll_to_selection(&mut self) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.visible_height > 0 && self.selected_index >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.selected_index + 1 - self.visible_height;
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let field_name = match self.field {
            FormField::Target => "target",
            _ => "source",
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Current: ", Styles::label()),
            Span::raw(self.current_dir.display().to_string()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_focused())
                .title(Span::styled(format!(" Choose {} directory ", field_name), Styles::title_focused())),
        );
        f.render_widget(header, chunks[0]);

        let list_area = chunks[1];
        self.visible_height = list_area.height.saturating_sub(2) as usize;
        self.adjust_scroll_to_selection();

        let items: Vec<ListItem> = if let Some(error) = &self.error {
            vec![ListItem::new(error.clone()).style(Styles::job_failed())]
        } else if self.entries.is_empty() {
            vec![ListItem::new(" No subdirectories").style(Styles::muted())]
        } else {
            self.entries
                .iter()
                .skip(self.scroll_offset)
                .take(self.visible_height)
                .map(|entry| ListItem::new(format!("📁 {}", entry.name)))
                .collect()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Styles::border_focused())
                    .title(" Enter: open  Backspace: up  s: select current  Esc: cancel "),
            )
            .highlight_style(Styles::list_selected_focused());

        let mut state = ListState::default();
        if self.error.is_none() && !self.entries.is_empty() {
            state.select(Some(self.selected_index.saturating_sub(self.scroll_offset)));
        }
        f.render_stateful_widget(list, list_area, &mut state);
    }
}

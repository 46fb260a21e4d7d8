// Event Handling
// Application event types and handler infrastructure

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

/// Where keyboard input is currently routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Editing the sync form
    Form,
    /// Browsing for a directory
    Picker,
    /// A blocking popup is shown
    Popup,
}

/// Application events that can be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Quit the application
    Quit,

    /// Move focus to the next form element
    FocusNext,

    /// Move focus to the previous form element
    FocusPrevious,

    /// Character typed into the focused element
    Input(char),

    /// Delete the last character of the focused path
    Backspace,

    /// Clear the focused path
    ClearField,

    /// Enter on the focused element
    Activate,

    /// Submit the form from anywhere
    Submit,

    /// Scroll the job list
    ScrollUp(usize),
    ScrollDown(usize),

    /// Folder picker navigation
    SelectPrevious,
    SelectNext,
    EnterDirectory,
    ParentDirectory,
    ChooseDirectory,
    CancelPicker,

    /// Close the blocking popup
    Dismiss,

    /// No operation
    None,
}

/// Event handler that converts terminal events to application events
pub struct EventHandler;

impl EventHandler {
    /// Convert a crossterm event to an application event
    pub fn handle(event: Event, mode: InputMode) -> AppEvent {
        match event {
            Event::Key(key) => Self::handle_key(key, mode),
            Event::Mouse(mouse) => Self::handle_mouse(mouse, mode),
            _ => AppEvent::None,
        }
    }

    /// Handle keyboard events
    fn handle_key(key: KeyEvent, mode: InputMode) -> AppEvent {
        // Only handle key press events
        if key.kind != KeyEventKind::Press {
            return AppEvent::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return AppEvent::Quit;
        }

        match mode {
            InputMode::Popup => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => AppEvent::Dismiss,
                _ => AppEvent::None,
            },
            InputMode::Picker => match key.code {
                KeyCode::Up | KeyCode::Char('k') => AppEvent::SelectPrevious,
                KeyCode::Down | KeyCode::Char('j') => AppEvent::SelectNext,
                KeyCode::Enter | KeyCode::Right => AppEvent::EnterDirectory,
                KeyCode::Backspace | KeyCode::Left => AppEvent::ParentDirectory,
                KeyCode::Char('s') => AppEvent::ChooseDirectory,
                KeyCode::Esc => AppEvent::CancelPicker,
                _ => AppEvent::None,
            },
            InputMode::Form => match key.code {
                KeyCode::Esc => AppEvent::Quit,
                KeyCode::Tab | KeyCode::Down => AppEvent::FocusNext,
                KeyCode::BackTab | KeyCode::Up => AppEvent::FocusPrevious,
                KeyCode::Enter => AppEvent::Activate,
                KeyCode::Backspace => AppEvent::Backspace,
                KeyCode::PageUp => AppEvent::ScrollUp(5),
                KeyCode::PageDown => AppEvent::ScrollDown(5),
                KeyCode::Char('s') if ctrl => AppEvent::Submit,
                KeyCode::Char('u') if ctrl => AppEvent::ClearField,
                KeyCode::Char(c) if !ctrl => AppEvent::Input(c),
                _ => AppEvent::None,
            },
        }
    }

    /// Handle mouse events
    fn handle_mouse(mouse: MouseEvent, mode: InputMode) -> AppEvent {
        match (mode, mouse.kind) {
            (InputMode::Form, MouseEventKind::ScrollUp) => AppEvent::ScrollUp(1),
            (InputMode::Form, MouseEventKind::ScrollDown) => AppEvent::ScrollDown(1),
            (InputMode::Picker, MouseEventKind::ScrollUp) => AppEvent::SelectPrevious,
            (InputMode::Picker, MouseEventKind::ScrollDown) => AppEvent::SelectNext,
            _ => AppEvent::None,
        }
    }
}

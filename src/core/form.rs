// Sync Form
// Form state and submission validation

use std::path::Path;
use thiserror::Error;

use super::app_config::DefaultSettings;
use crate::operations::{MirrorOptions, SyncRequest};
use crate::utilities::{resolve_path, PathError};

/// Focusable form elements, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Source,
    Target,
    Purge,
    Create,
    SyncButton,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Source,
        FormField::Target,
        FormField::Purge,
        FormField::Create,
        FormField::SyncButton,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    pub fn is_path(self) -> bool {
        matches!(self, FormField::Source | FormField::Target)
    }

    pub fn is_checkbox(self) -> bool {
        matches!(self, FormField::Purge | FormField::Create)
    }
}

/// Reasons a submission is refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please complete all fields")]
    MissingFields { source_missing: bool, target_missing: bool },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Result of pressing Sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted(SyncRequest),
    Rejected(ValidationError),
}

/// The sync form: two paths, two toggles and a trigger
#[derive(Debug, Clone)]
pub struct SyncForm {
    pub source: String,
    pub target: String,
    pub purge: bool,
    pub create: bool,
    pub focus: FormField,
    locked: bool,
}

impl SyncForm {
    pub fn new(defaults: &DefaultSettings) -> Self {
        Self {
            source: String::new(),
            target: String::new(),
            purge: defaults.purge,
            create: defaults.create,
            focus: FormField::Source,
            locked: false,
        }
    }

    /// Locked while a blocking notice is shown
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Source => Some(&mut self.source),
            FormField::Target => Some(&mut self.target),
            _ => None,
        }
    }

    /// Append a character to the focused path field
    pub fn input_char(&mut self, c: char) {
        if self.locked {
            return;
        }
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.locked {
            return;
        }
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if self.locked {
            return;
        }
        if let Some(text) = self.focused_text() {
            text.clear();
        }
    }

    /// Flip the focused checkbox. Returns false when focus is elsewhere.
    pub fn toggle_focused(&mut self) -> bool {
        if self.locked {
            return false;
        }
        match self.focus {
            FormField::Purge => self.purge = !self.purge,
            FormField::Create => self.create = !self.create,
            _ => return false,
        }
        true
    }

    /// Fill a path field, typically from the folder picker
    pub fn set_path(&mut self, field: FormField, path: &Path) {
        let value = path.display().to_string();
        match field {
            FormField::Source => self.source = value,
            FormField::Target => self.target = value,
            _ => {}
        }
    }

    pub fn path_value(&self, field: FormField) -> &str {
        match field {
            FormField::Source => &self.source,
            FormField::Target => &self.target,
            _ => "",
        }
    }

    /// Validate the form and build a request
    ///
    /// A rejected submission leaves the form locked; the caller unlocks it
    /// once the user dismissed the notice.
    pub fn submit(&mut self, base_dir: &Path, excludes: &[String]) -> Submission {
        let source = self.source.trim().to_string();
        let target = self.target.trim().to_string();

        if source.is_empty() || target.is_empty() {
            self.lock();
            return Submission::Rejected(ValidationError::MissingFields {
                source_missing: source.is_empty(),
                target_missing: target.is_empty(),
            });
        }

        let resolved = resolve_path(base_dir, &source)
            .and_then(|s| resolve_path(base_dir, &target).map(|t| (s, t)));
        let (source, target) = match resolved {
            Ok(paths) => paths,
            Err(err) => {
                self.lock();
                return Submission::Rejected(err.into());
            }
        };

        let options = MirrorOptions {
            purge: self.purge,
            create: self.create,
            excludes: excludes.to_vec(),
        };

        Submission::Accepted(SyncRequest::new(source, target, options))
    }
}

// Application State
// Main application state management and lifecycle

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::events::{AppEvent, InputMode};
use super::form::{FormField, Submission, SyncForm, ValidationError};
use super::notices::{Popup, Toast, ToastStack};
use super::progress::ProgressIndicator;
use super::AppConfig;
use crate::operations::{JobEvent, JobId, JobTracker, Mirror, MirrorEngine};
use crate::ui::FolderPicker;

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Effective configuration (compiled defaults plus overrides)
    pub config: AppConfig,

    /// The sync form
    pub form: SyncForm,

    /// Every submitted job, running or completed
    pub jobs: JobTracker,

    /// Indeterminate activity bar
    pub progress: ProgressIndicator,

    /// Non-blocking notices
    pub toasts: ToastStack,

    /// Blocking notice, if any
    pub popup: Option<Popup>,

    /// Open folder picker
    pub picker: Option<FolderPicker>,

    /// First visible row of the job list
    pub job_scroll: usize,

    /// Base for relative paths typed into the form
    pub working_dir: PathBuf,

    /// Whether the application should quit
    pub should_quit: bool,
}

impl App {
    /// Create a new application instance backed by the real mirror engine
    pub fn new(config: AppConfig, runtime: Handle) -> Result<Self> {
        Self::with_mirror(config, runtime, Arc::new(MirrorEngine))
    }

    pub fn with_mirror(config: AppConfig, runtime: Handle, mirror: Arc<dyn Mirror>) -> Result<Self> {
        let working_dir = std::env::current_dir()?;

        Ok(Self {
            form: SyncForm::new(&config.defaults),
            jobs: JobTracker::new(runtime, mirror),
            progress: ProgressIndicator::new(config.ui.progress_max, config.ui.progress_increment),
            toasts: ToastStack::new(config.toast_duration()),
            popup: None,
            picker: None,
            job_scroll: 0,
            working_dir,
            should_quit: false,
            config,
        })
    }

    /// Where input goes right now
    pub fn input_mode(&self) -> InputMode {
        if self.popup.is_some() {
            InputMode::Popup
        } else if self.picker.is_some() {
            InputMode::Picker
        } else {
            InputMode::Form
        }
    }

    /// Apply one application event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => self.quit(),
            AppEvent::FocusNext => self.form.focus_next(),
            AppEvent::FocusPrevious => self.form.focus_previous(),
            AppEvent::Input(' ') if self.form.focus.is_checkbox() => {
                self.form.toggle_focused();
            }
            AppEvent::Input(c) => self.form.input_char(c),
            AppEvent::Backspace => self.form.backspace(),
            AppEvent::ClearField => self.form.clear_field(),
            AppEvent::Activate => self.activate(),
            AppEvent::Submit => {
                self.submit();
            }
            AppEvent::ScrollUp(amount) => self.scroll_up(amount),
            AppEvent::ScrollDown(amount) => self.scroll_down(amount),
            AppEvent::SelectPrevious => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.move_up();
                }
            }
            AppEvent::SelectNext => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.move_down();
                }
            }
            AppEvent::EnterDirectory => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.navigate_into();
                }
            }
            AppEvent::ParentDirectory => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.navigate_parent();
                }
            }
            AppEvent::ChooseDirectory => self.choose_directory(),
            AppEvent::CancelPicker => self.picker = None,
            AppEvent::Dismiss => self.dismiss_popup(),
            AppEvent::None => {}
        }
    }

    /// Enter on the focused element
    fn activate(&mut self) {
        match self.form.focus {
            FormField::Source | FormField::Target => self.open_picker(self.form.focus),
            FormField::Purge | FormField::Create => {
                self.form.toggle_focused();
            }
            FormField::SyncButton => {
                self.submit();
            }
        }
    }

    /// Open the folder picker for a path field, starting at its current value
    pub fn open_picker(&mut self, field: FormField) {
        if self.form.is_locked() || !field.is_path() {
            return;
        }
        let current = self.form.path_value(field).trim();
        let start = if current.is_empty() {
            self.working_dir.clone()
        } else {
            crate::utilities::resolve_path(&self.working_dir, current)
                .unwrap_or_else(|_| self.working_dir.clone())
        };
        debug!(field = ?field, start = %start.display(), "opening folder picker");
        self.picker = Some(FolderPicker::new(field, &start));
    }

    fn choose_directory(&mut self) {
        if let Some(picker) = self.picker.take() {
            self.form.set_path(picker.field, &picker.current_dir);
        }
    }

    fn dismiss_popup(&mut self) {
        self.popup = None;
        self.form.unlock();
    }

    /// Validate the form and start a job for it
    ///
    /// Returns the new job id, or None when the form was rejected and a
    /// popup is now shown.
    pub fn submit(&mut self) -> Option<JobId> {
        if self.form.is_locked() {
            return None;
        }

        match self.form.submit(&self.working_dir, &self.config.global_excludes) {
            Submission::Accepted(request) => {
                let notice = format!(
                    "Syncing {} to {}",
                    request.source.display(),
                    request.target.display()
                );
                let id = self.jobs.submit(request);
                self.toasts.push(Toast::info(notice));
                Some(id)
            }
            Submission::Rejected(err) => {
                warn!(error = %err, "sync form rejected");
                self.popup = Some(rejection_popup(&err));
                None
            }
        }
    }

    /// Periodic update: observe finished jobs, animate, expire notices
    pub fn tick(&mut self, now: Instant) -> Vec<JobEvent> {
        let events = self.jobs.poll();
        for event in &events {
            let toast = if event.is_failure() {
                Toast::error(event.notice())
            } else {
                Toast::success(event.notice())
            };
            self.toasts.push(toast);
        }

        self.progress.tick(self.jobs.has_in_flight());
        self.toasts.prune(now);
        events
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.job_scroll = self.job_scroll.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        let max = self.jobs.records().len().saturating_sub(1);
        self.job_scroll = (self.job_scroll + amount).min(max);
    }

    /// Request application quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Blocking notice for a refused submission
fn rejection_popup(err: &ValidationError) -> Popup {
    match err {
        ValidationError::MissingFields { .. } => Popup::warning("Missing Fields".to_string(), err.to_string()),
        ValidationError::Path(_) => Popup::error("Invalid Path".to_string(), err.to_string()),
    }
}

// Core infrastructure module
// Application state, configuration, input handling and notices

pub mod app;
pub mod app_config;
pub mod events;
pub mod form;
pub mod notices;
pub mod progress;

pub use app::App;
pub use app_config::{AppConfig, ConfigError};
pub use events::{AppEvent, EventHandler, InputMode};
pub use form::{FormField, Submission, SyncForm, ValidationError};
pub use notices::{Popup, PopupKind, Toast, ToastKind, ToastStack};
pub use progress::ProgressIndicator;

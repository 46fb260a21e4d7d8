// Mirror Manager Library
// A TUI application for one-way directory mirroring with background jobs

// Core infrastructure - state, configuration, input, notices
pub mod core;

// Operations - mirror engine and background sync jobs
pub mod operations;

// UI - TUI components and views
pub mod ui;

// Utilities - helper functions and tools
pub mod utilities;

// Logging - tracing subscriber and panic hook
pub mod logging;

// Re-export commonly used items for convenience
pub use core::{App, AppConfig};
pub use operations::{JobTracker, Mirror, MirrorEngine, MirrorOptions, SyncRequest};

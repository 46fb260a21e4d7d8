// Utilities module
// Helper functions and tools

pub mod paths;
pub mod patterns;

pub use paths::{is_inside, normalize_path, resolve_path, shorten_middle, PathError};
pub use patterns::PatternMatcher;

// Path Utilities
// Helper functions for path manipulation and display

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                components.pop();
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// A user-entered path that cannot be turned into a real location
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Cannot expand '{0}': home directory is unknown")]
    NoHomeDirectory(String),
}

/// Resolve a user-entered path relative to a base directory
pub fn resolve_path(base: &Path, input: &str) -> Result<PathBuf, PathError> {
    resolve_with_home(base, input, dirs::home_dir())
}

fn resolve_with_home(base: &Path, input: &str, home: Option<PathBuf>) -> Result<PathBuf, PathError> {
    let expanded = expand_with_home(input, home)?;
    if expanded.is_absolute() {
        Ok(normalize_path(&expanded))
    } else {
        Ok(normalize_path(&base.join(expanded)))
    }
}

/// Expand a leading `~` to the user's home directory
fn expand_with_home(input: &str, home: Option<PathBuf>) -> Result<PathBuf, PathError> {
    let rest = match input.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR) => &rest[1..],
        _ => return Ok(PathBuf::from(input)),
    };

    let home = home.ok_or_else(|| PathError::NoHomeDirectory(input.to_string()))?;
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// Check if a path is inside a directory (or is the directory itself)
pub fn is_inside(path: &Path, directory: &Path) -> bool {
    let path = normalize_path(path);
    let directory = normalize_path(directory);

    path.starts_with(&directory)
}

/// Shorten a string for display by replacing its middle with an ellipsis
pub fn shorten_middle(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars || max_chars < 5 {
        return text.to_string();
    }

    let keep = max_chars - 1;
    let head = keep / 2;
    let tail = keep - head;

    let start: String = text.chars().take(head).collect();
    let end: String = text.chars().skip(count - tail).collect();
    format!("{}…{}", start, end)
}

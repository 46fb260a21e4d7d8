// Pattern Matching Utilities
// Glob pattern matching for mirror exclusions

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Component, Path};

/// Pattern matcher for mirror exclusions
///
/// Patterns containing `/` are matched against the whole relative path.
/// Other patterns are matched against each path component, so `target`
/// excludes every directory called `target` and `*.tmp` excludes every file
/// ending in `.tmp`.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    components: GlobSet,
    paths: GlobSet,
}

impl PatternMatcher {
    /// Compile the given patterns; blank entries are ignored
    pub fn new(patterns: &[String]) -> Result<Self, globset::Error> {
        let mut components = GlobSetBuilder::new();
        let mut paths = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.trim().trim_end_matches('/');
            if pattern.is_empty() {
                continue;
            }

            let glob = compile(pattern)?;
            if pattern.contains('/') {
                paths.add(glob);
            } else {
                components.add(glob);
            }
        }

        Ok(Self {
            components: components.build()?,
            paths: paths.build()?,
        })
    }

    /// Check if a path relative to the mirror root should be excluded
    pub fn should_exclude(&self, relative: &Path) -> bool {
        if self.paths.is_match(relative) {
            return true;
        }

        relative.components().any(|c| match c {
            Component::Normal(part) => self.components.is_match(Path::new(part)),
            _ => false,
        })
    }
}

fn compile(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> PatternMatcher {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        PatternMatcher::new(&patterns).unwrap()
    }

    #[test]
    fn test_suffix_pattern() {
        let m = matcher(&["*.txt"]);
        assert!(m.should_exclude(Path::new("file.txt")));
        assert!(m.should_exclude(Path::new("docs/notes.txt")));
        assert!(!m.should_exclude(Path::new("file.md")));
    }

    #[test]
    fn test_prefix_pattern() {
        let m = matcher(&["test_*"]);
        assert!(m.should_exclude(Path::new("test_file.rs")));
        assert!(!m.should_exclude(Path::new("file_test.rs")));
    }

    #[test]
    fn test_component_pattern() {
        let m = matcher(&["node_modules"]);
        assert!(m.should_exclude(Path::new("app/node_modules/pkg/index.js")));
        assert!(!m.should_exclude(Path::new("app/node_modules_old/index.js")));
        assert!(!m.should_exclude(Path::new("src/file")));
    }

    #[test]
    fn test_path_pattern() {
        let m = matcher(&["build/cache/*", "logs/"]);
        assert!(m.should_exclude(Path::new("build/cache/a.bin")));
        assert!(!m.should_exclude(Path::new("src/build/cache/a.bin")));
        assert!(!m.should_exclude(Path::new("build/cache/nested/a.bin")));
        assert!(m.should_exclude(Path::new("logs/today.log")));
    }

    #[test]
    fn test_question_mark() {
        let m = matcher(&["a?.log"]);
        assert!(m.should_exclude(Path::new("a1.log")));
        assert!(!m.should_exclude(Path::new("a12.log")));
    }

    #[test]
    fn test_pattern_matcher() {
        let m = matcher(&["*.swp", "node_modules", ".git", "  "]);

        assert!(m.should_exclude(Path::new("file.swp")));
        assert!(m.should_exclude(Path::new("project/node_modules/pkg")));
        assert!(m.should_exclude(Path::new(".git/config")));
        assert!(!m.should_exclude(Path::new("src/main.rs")));
        assert!(!m.should_exclude(Path::new(".gitignore")));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(PatternMatcher::new(&["[oops".to_string()]).is_err());
    }
}

// Build script - reads config.yaml at compile time and generates defaults
// This allows changing defaults during development without editing source code

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=src/config.yaml");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("compiled_config.rs");

    // Try to read config.yaml from src/, fall back to hardcoded defaults if not found
    let config = if Path::new("src/config.yaml").exists() {
        let content = fs::read_to_string("src/config.yaml")
            .expect("Failed to read src/config.yaml");
        parse_config(&content)
    } else {
        CompiledConfig::default()
    };

    let generated = format!(
        r#"// Auto-generated from config.yaml at compile time
// Do not edit - modify config.yaml and rebuild instead

pub const TICK_INTERVAL_MS: u64 = {tick_interval_ms};
pub const TOAST_DURATION_MS: u64 = {toast_duration_ms};
pub const PROGRESS_MAX: u16 = {progress_max};
pub const PROGRESS_INCREMENT: u16 = {progress_increment};
pub const MOUSE_ENABLED: bool = {mouse_enabled};

pub const DEFAULT_PURGE: bool = {purge};
pub const DEFAULT_CREATE: bool = {create};

pub const LOG_LEVEL: &str = "{log_level}";

pub const GLOBAL_EXCLUDES: &[&str] = &[
{excludes}
];
"#,
        tick_interval_ms = config.tick_interval_ms,
        toast_duration_ms = config.toast_duration_ms,
        progress_max = config.progress_max,
        progress_increment = config.progress_increment,
        mouse_enabled = config.mouse_enabled,
        purge = config.purge,
        create = config.create,
        log_level = config.log_level,
        excludes = config.global_excludes
            .iter()
            .map(|e| format!("    \"{}\",", e))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    fs::write(&dest_path, generated).expect("Failed to write compiled config");
}

struct CompiledConfig {
    tick_interval_ms: u64,
    toast_duration_ms: u64,
    progress_max: u16,
    progress_increment: u16,
    mouse_enabled: bool,
    purge: bool,
    create: bool,
    log_level: String,
    global_excludes: Vec<String>,
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            toast_duration_ms: 3000,
            progress_max: 100,
            progress_increment: 5,
            mouse_enabled: false,
            purge: true,
            create: true,
            log_level: "info".to_string(),
            global_excludes: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
            ],
        }
    }
}

fn parse_config(content: &str) -> CompiledConfig {
    let mut config = CompiledConfig::default();

    // Simple YAML parsing (avoiding external dependencies in build script)
    let mut in_ui = false;
    let mut in_defaults = false;
    let mut in_logging = false;
    let mut in_excludes = false;

    for line in content.lines() {
        let trimmed = line.trim();

        // Track which section we're in
        if trimmed.starts_with("ui:") {
            in_ui = true;
            in_defaults = false;
            in_logging = false;
            in_excludes = false;
            continue;
        } else if trimmed.starts_with("defaults:") {
            in_ui = false;
            in_defaults = true;
            in_logging = false;
            in_excludes = false;
            continue;
        } else if trimmed.starts_with("logging:") {
            in_ui = false;
            in_defaults = false;
            in_logging = true;
            in_excludes = false;
            continue;
        } else if trimmed.starts_with("global_excludes:") {
            in_ui = false;
            in_defaults = false;
            in_logging = false;
            in_excludes = true;
            config.global_excludes.clear();
            continue;
        }

        if let Some((key, value)) = parse_kv(trimmed) {
            if in_ui {
                match key {
                    "tick_interval_ms" => config.tick_interval_ms = value.parse().unwrap_or(100),
                    "toast_duration_ms" => config.toast_duration_ms = value.parse().unwrap_or(3000),
                    "progress_max" => config.progress_max = value.parse().unwrap_or(100),
                    "progress_increment" => config.progress_increment = value.parse().unwrap_or(5),
                    "mouse_enabled" => config.mouse_enabled = parse_bool(value),
                    _ => {}
                }
            } else if in_defaults {
                match key {
                    "purge" => config.purge = parse_bool(value),
                    "create" => config.create = parse_bool(value),
                    _ => {}
                }
            } else if in_logging && key == "level" {
                config.log_level = value.trim_matches('"').to_string();
            }
        }

        // Parse list items for global_excludes
        if in_excludes && trimmed.starts_with("- ") {
            let value = trimmed[2..].trim().trim_matches('"');
            config.global_excludes.push(value.to_string());
            continue;
        }

        // Stop parsing excludes when we hit a non-list line
        if in_excludes && !trimmed.starts_with("- ") && !trimmed.is_empty() && !trimmed.starts_with('#') {
            in_excludes = false;
        }
    }

    config
}

fn parse_kv(line: &str) -> Option<(&str, &str)> {
    if line.starts_with('#') || line.is_empty() || line.starts_with("- ") {
        return None;
    }

    let colon_pos = line.find(':')?;
    let key = line[..colon_pos].trim();
    let mut value = line[colon_pos + 1..].trim();

    // Remove inline comments
    if let Some(comment_pos) = value.find(" #") {
        value = value[..comment_pos].trim();
    }

    // Section header
    if value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "yes" | "1")
}

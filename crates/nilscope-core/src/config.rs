//! Configuration loading from nilscope.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User-configurable options shared by all passes.
///
/// The analysis scope is prefix-based: a package is analyzed when its import
/// path matches an include prefix and no exclude prefix; the exclude list
/// takes precedence on conflict. Files are skipped when their file-level doc
/// comment carries one of the configured markers (generated code, vendored
/// code and the like).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pretty print the error messages.
    pub pretty_print: bool,
    /// Package import-path prefixes to analyze. An empty prefix matches
    /// every package.
    pub include_pkgs: Vec<String>,
    /// Package import-path prefixes to exclude from analysis.
    pub exclude_pkgs: Vec<String>,
    /// Markers that exclude a file when found in its file-level doc comment,
    /// e.g. "@generated" or "Code generated by".
    pub exclude_file_docstrings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pretty_print: true,
            include_pkgs: vec![String::new()],
            exclude_pkgs: vec![],
            exclude_file_docstrings: vec![],
        }
    }
}

impl Config {
    /// True iff `pkg_path` is in scope for analysis: it matches an include
    /// prefix and no exclude prefix.
    pub fn is_pkg_in_scope(&self, pkg_path: &str) -> bool {
        for include in &self.include_pkgs {
            if !pkg_path.starts_with(include.as_str()) {
                continue;
            }
            for exclude in &self.exclude_pkgs {
                if pkg_path.starts_with(exclude.as_str()) {
                    return false;
                }
            }
            return true;
        }
        false
    }

    /// True iff a file with the given file-level doc comment should be
    /// analyzed.
    pub fn is_file_in_scope(&self, file_docstring: &str) -> bool {
        // Fast return if there is no exclude list.
        if self.exclude_file_docstrings.is_empty() {
            return true;
        }
        !self
            .exclude_file_docstrings
            .iter()
            .any(|marker| file_docstring.contains(marker.as_str()))
    }
}

/// Find and load nilscope.toml, walking up from `start_dir`.
/// Returns default config if no file found.
pub fn load_config(start_dir: &Path) -> Config {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            toml::from_str(&content).unwrap_or_default()
        }
        None => Config::default(),
    }
}

/// Walk up directories looking for nilscope.toml.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("nilscope.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Default TOML content for `nilscope init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"pretty_print = true

# Package import-path prefixes to analyze. An empty prefix matches everything.
include_pkgs = [""]

# Exclude takes precedence over include on conflict.
exclude_pkgs = []

# Files whose file-level doc comment contains one of these markers are skipped.
exclude_file_docstrings = ["@generated", "Code generated by"]
"#;

//! Comparison configuration.
//!
//! Ignore patterns are regular expressions matched against the fully
//! qualified name of a type or member and against its rendered declaration.
//! A match silently suppresses the corresponding report entry.
//!
//! # Examples
//!
//! ```
//! use apidiff::config::CompareConfig;
//!
//! let config = CompareConfig::new()
//!     .ignore_new(r"^UIKit\.Internal")
//!     .unwrap()
//!     .ignore_nonbreaking(true);
//!
//! assert!(config.is_new_ignored(&["UIKit.InternalHelper"]));
//! assert!(!config.is_new_ignored(&["UIKit.UIView"]));
//! ```

use crate::error::ApiDiffError;
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct CompareConfig {
    /// Patterns for new types that should not be reported
    pub ignore_new: Vec<Regex>,
    /// Patterns for added members that should not be reported
    pub ignore_added: Vec<Regex>,
    /// Patterns for removed types and members that should not be reported
    pub ignore_removed: Vec<Regex>,
    /// Suppress every change that is not breaking
    pub ignore_nonbreaking: bool,
}

impl CompareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_new(mut self, pattern: &str) -> Result<Self, ApiDiffError> {
        self.ignore_new.push(compile(pattern)?);
        Ok(self)
    }

    pub fn ignore_added(mut self, pattern: &str) -> Result<Self, ApiDiffError> {
        self.ignore_added.push(compile(pattern)?);
        Ok(self)
    }

    pub fn ignore_removed(mut self, pattern: &str) -> Result<Self, ApiDiffError> {
        self.ignore_removed.push(compile(pattern)?);
        Ok(self)
    }

    pub fn ignore_nonbreaking(mut self, ignore: bool) -> Self {
        self.ignore_nonbreaking = ignore;
        self
    }

    /// Builds a configuration from raw pattern strings, as supplied by a CLI.
    pub fn from_patterns(
        ignore_new: &[String],
        ignore_added: &[String],
        ignore_removed: &[String],
        ignore_nonbreaking: bool,
    ) -> Result<Self, ApiDiffError> {
        Ok(Self {
            ignore_new: compile_all(ignore_new)?,
            ignore_added: compile_all(ignore_added)?,
            ignore_removed: compile_all(ignore_removed)?,
            ignore_nonbreaking,
        })
    }

    pub fn is_new_ignored(&self, candidates: &[&str]) -> bool {
        any_match(&self.ignore_new, candidates)
    }

    pub fn is_added_ignored(&self, candidates: &[&str]) -> bool {
        any_match(&self.ignore_added, candidates)
    }

    pub fn is_removed_ignored(&self, candidates: &[&str]) -> bool {
        any_match(&self.ignore_removed, candidates)
    }
}

fn compile(pattern: &str) -> Result<Regex, ApiDiffError> {
    Regex::new(pattern).map_err(|e| ApiDiffError::ConfigError {
        message: format!("invalid ignore pattern '{}': {}", pattern, e),
    })
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ApiDiffError> {
    patterns.iter().map(|p| compile(p)).collect()
}

fn any_match(patterns: &[Regex], candidates: &[&str]) -> bool {
    patterns
        .iter()
        .any(|re| candidates.iter().any(|c| re.is_match(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignores_nothing() {
        let config = CompareConfig::default();
        assert!(!config.is_new_ignored(&["A.B"]));
        assert!(!config.is_added_ignored(&["A.B"]));
        assert!(!config.is_removed_ignored(&["A.B"]));
        assert!(!config.ignore_nonbreaking);
    }

    #[test]
    fn test_any_candidate_matches() {
        let config = CompareConfig::new().ignore_added(r"Dispose\(").unwrap();
        assert!(config.is_added_ignored(&[
            "UIKit.UIView.Dispose",
            "public void Dispose(bool disposing)"
        ]));
        assert!(!config.is_added_ignored(&["UIKit.UIView.Draw", "public void Draw()"]));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = CompareConfig::new().ignore_removed("(unclosed").unwrap_err();
        assert!(matches!(err, ApiDiffError::ConfigError { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_from_patterns() {
        let config = CompareConfig::from_patterns(
            &["^Foo".to_string()],
            &[],
            &["Bar$".to_string(), "Baz".to_string()],
            true,
        )
        .unwrap();
        assert_eq!(config.ignore_new.len(), 1);
        assert_eq!(config.ignore_removed.len(), 2);
        assert!(config.ignore_nonbreaking);
    }
}

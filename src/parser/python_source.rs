//! Python source scanner for version assignments
//!
//! Finds module level string assignments without executing the module:
//! - `__version__ = "1.2.3"`
//! - `__version__: str = '1.2.3'`
//! - `__version__ = version = '1.2.3'` (setuptools-scm version files)

use regex::Regex;

use crate::parser::traits::ParseError;

/// Names tried, in order, when no explicit attribute is requested
pub const DEFAULT_VERSION_NAMES: [&str; 3] = ["__version__", "VERSION", "version"];

/// Scanner for a single assignment target
pub struct AssignmentScanner {
    re: Regex,
}

impl AssignmentScanner {
    pub fn new(name: &str) -> Self {
        let pattern = format!(
            r#"(?m)^[ \t]*{}[ \t]*(?::[^=\n]*)?=[ \t]*(?:[A-Za-z_]\w*[ \t]*=[ \t]*)*[rRuU]?(?:"([^"\n]*)"|'([^'\n]*)')"#,
            regex::escape(name)
        );
        Self {
            // The pattern is built from an escaped identifier, so it always compiles
            re: Regex::new(&pattern).unwrap(),
        }
    }

    /// Return the first string value assigned to the target
    pub fn scan(&self, content: &str) -> Option<String> {
        let caps = self.re.captures(content)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Find the version assigned to `name` in Python source
pub fn find_assignment(content: &str, name: &str) -> Option<String> {
    AssignmentScanner::new(name).scan(content)
}

/// Find a version under any of the conventional names
pub fn find_version(content: &str) -> Option<String> {
    DEFAULT_VERSION_NAMES
        .iter()
        .find_map(|name| find_assignment(content, name))
}

/// Apply a user supplied pattern with a `version` capture group
///
/// Follows hatch's convention: the pattern is matched in multi-line mode and
/// the group named `version` holds the value.
pub fn find_with_pattern(content: &str, pattern: &str) -> Result<Option<String>, ParseError> {
    let re = Regex::new(&format!("(?m){pattern}"))?;
    Ok(re
        .captures(content)
        .and_then(|caps| caps.name("version"))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty()))
}

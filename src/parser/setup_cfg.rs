//! setup.cfg parser
//!
//! Minimal INI reader covering what setuptools accepts in `setup.cfg`:
//! - `[section]` headers
//! - `key = value` and `key: value` pairs, keys compared case-insensitively
//! - indented continuation lines appended to the previous value
//! - `#` and `;` full-line comments
//!
//! Format examples:
//! ```text
//! [metadata]
//! version = 1.2.3
//! version = attr: mypkg.__version__
//! version = file: VERSION
//!
//! [options]
//! package_dir =
//!     = src
//! ```

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::Declaration;

pub const SETUP_CFG: &str = "setup.cfg";

/// Parsed `setup.cfg` content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupCfg {
    sections: Vec<(String, Vec<(String, String)>)>,
}

/// setuptools directive used as a `[metadata] version` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionDirective {
    /// `attr: package.module.attribute`
    Attr(String),
    /// `file: VERSION` (comma separated paths are concatenated)
    File(Vec<String>),
}

impl SetupCfg {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut sections: Vec<(String, Vec<(String, String)>)> = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous value
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = sections.last_mut().and_then(|(_, pairs)| pairs.last_mut())
                {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }

            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                sections.push((name.trim().to_string(), Vec::new()));
                continue;
            }

            let Some(separator) = trimmed.find(['=', ':']) else {
                return Err(ParseError::InvalidSyntax(format!(
                    "setup.cfg line {}: expected `key = value`",
                    line_num + 1
                )));
            };

            let Some((_, pairs)) = sections.last_mut() else {
                return Err(ParseError::InvalidSyntax(format!(
                    "setup.cfg line {}: value outside of a section",
                    line_num + 1
                )));
            };

            let key = trimmed[..separator].trim().to_ascii_lowercase();
            let value = trimmed[separator + 1..].trim().to_string();
            pairs.push((key, value));
        }

        Ok(Self { sections })
    }

    /// Look up `key` in `section`; later sections with the same name win
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.sections
            .iter()
            .rev()
            .filter(|(name, _)| name == section)
            .find_map(|(_, pairs)| pairs.iter().rev().find(|(k, _)| *k == key))
            .map(|(_, value)| value.as_str())
    }

    /// The `[metadata] version` directive, if it is one
    pub fn version_directive(&self) -> Option<VersionDirective> {
        parse_directive(self.get("metadata", "version")?)
    }

    /// `[options] package_dir` mapping for the root package (`= src`)
    pub fn root_package_dir(&self) -> Option<&str> {
        let value = self.get("options", "package_dir")?;
        value.lines().find_map(|line| {
            let (package, dir) = line.split_once('=')?;
            package.trim().is_empty().then(|| dir.trim())
        })
    }
}

fn parse_directive(value: &str) -> Option<VersionDirective> {
    if let Some(attr) = value.strip_prefix("attr:") {
        return Some(VersionDirective::Attr(attr.trim().to_string()));
    }

    let files = value.strip_prefix("file:")?;
    Some(VersionDirective::File(
        files
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

/// Parser for the `[metadata] version` field
pub struct SetupCfgParser;

impl SetupCfgParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SetupCfgParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for SetupCfgParser {
    fn file_name(&self) -> &'static str {
        SETUP_CFG
    }

    fn method(&self) -> &'static str {
        "setup-cfg-metadata"
    }

    fn field(&self) -> &'static str {
        "[metadata] version"
    }

    fn parse(&self, content: &str) -> Result<Declaration, ParseError> {
        let cfg = SetupCfg::parse(content)?;

        match cfg.version_directive() {
            Some(VersionDirective::Attr(attr)) => Ok(Declaration::Dynamic(format!(
                "setup.cfg reads the version from `attr: {attr}`"
            ))),
            Some(VersionDirective::File(files)) => Ok(Declaration::Dynamic(format!(
                "setup.cfg reads the version from `file: {}`",
                files.join(", ")
            ))),
            None => Ok(cfg
                .get("metadata", "version")
                .map(Declaration::from_value)
                .unwrap_or(Declaration::Absent)),
        }
    }
}

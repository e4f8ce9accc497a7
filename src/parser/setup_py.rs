//! setup.py keyword scanner
//!
//! Looks for a `version=` keyword argument without running the script.
//! A literal string is a static declaration; any other expression means the
//! script computes the version at build time.

use regex::Regex;

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::Declaration;

pub const SETUP_PY: &str = "setup.py";

/// Parser for `setup(version=...)` calls
pub struct SetupPyParser {
    /// Regex for a literal keyword: `version="1.2.3"`
    literal_re: Regex,
    /// Regex for any keyword value: `version=get_version()`
    keyword_re: Regex,
}

impl SetupPyParser {
    pub fn new() -> Self {
        Self {
            literal_re: Regex::new(r#"\bversion\s*=\s*(?:"([^"\n]*)"|'([^'\n]*)')"#).unwrap(),
            keyword_re: Regex::new(r"\bversion\s*=\s*([A-Za-z_][\w.]*(?:\([^)\n]*\))?)").unwrap(),
        }
    }
}

impl Default for SetupPyParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for SetupPyParser {
    fn file_name(&self) -> &'static str {
        SETUP_PY
    }

    fn method(&self) -> &'static str {
        "regex-scan"
    }

    fn field(&self) -> &'static str {
        "version= keyword"
    }

    fn parse(&self, content: &str) -> Result<Declaration, ParseError> {
        let code: String = content
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(caps) = self.literal_re.captures(&code) {
            let value = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            return Ok(Declaration::from_value(value));
        }

        match self.keyword_re.captures(&code) {
            Some(caps) => Ok(Declaration::Dynamic(format!(
                "setup.py computes the version from `{}`",
                &caps[1]
            ))),
            None => Ok(Declaration::Absent),
        }
    }
}

//! PKG-INFO parser
//!
//! Core metadata files ship inside source distributions. The headers end at
//! the first blank line; anything after is the long description.

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::Declaration;

pub const PKG_INFO: &str = "PKG-INFO";

/// Parser for the `Version:` header of core metadata
pub struct PkgInfoParser;

impl PkgInfoParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PkgInfoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PkgInfoParser {
    fn file_name(&self) -> &'static str {
        PKG_INFO
    }

    fn method(&self) -> &'static str {
        "pkg-info-header"
    }

    fn field(&self) -> &'static str {
        "Version header"
    }

    fn parse(&self, content: &str) -> Result<Declaration, ParseError> {
        let mut saw_header = false;

        for line in content.lines() {
            if line.trim().is_empty() {
                break;
            }
            // Folded header continuation
            if line.starts_with([' ', '\t']) {
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                return Err(ParseError::InvalidSyntax(format!(
                    "PKG-INFO header without a colon: {line}"
                )));
            };
            saw_header = true;

            if name.trim().eq_ignore_ascii_case("version") {
                return Ok(Declaration::from_value(value));
            }
        }

        if !saw_header {
            return Err(ParseError::ParseFailed(
                "PKG-INFO has no metadata headers".to_string(),
            ));
        }

        Ok(Declaration::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_version_header() {
        let content = "Metadata-Version: 2.1\nName: demo\nVersion: 3.2.1\nSummary: x\n\nVersion: 9.9.9\n";
        assert_eq!(
            PkgInfoParser::new().parse(content).unwrap(),
            Declaration::Static("3.2.1".to_string())
        );
    }

    #[test]
    fn parse_ignores_body_after_blank_line() {
        let content = "Metadata-Version: 2.1\nName: demo\n\nVersion: 1.0\n";
        assert_eq!(
            PkgInfoParser::new().parse(content).unwrap(),
            Declaration::Absent
        );
    }

    #[test]
    fn parse_rejects_non_metadata_content() {
        assert!(PkgInfoParser::new().parse("not metadata\n").is_err());
        assert!(PkgInfoParser::new().parse("").is_err());
    }
}

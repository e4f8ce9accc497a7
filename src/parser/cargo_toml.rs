//! Cargo.toml parser
//!
//! maturin takes the Python package version from the crate manifest when
//! `[project].version` is dynamic.

use crate::parser::toml_document::TomlDocument;
use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::Declaration;

pub const CARGO_TOML: &str = "Cargo.toml";

/// Parser for the `[package].version` field of Cargo.toml files
pub struct CargoTomlParser;

impl CargoTomlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CargoTomlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for CargoTomlParser {
    fn file_name(&self) -> &'static str {
        CARGO_TOML
    }

    fn method(&self) -> &'static str {
        "cargo-manifest"
    }

    fn field(&self) -> &'static str {
        "[package].version"
    }

    fn parse(&self, content: &str) -> Result<Declaration, ParseError> {
        let doc = TomlDocument::parse(content)?;

        if let Some(version) = doc.get_str(&["package", "version"]) {
            return Ok(Declaration::from_value(version));
        }

        // version.workspace = true
        if doc.get_bool(&["package", "version", "workspace"]) == Some(true) {
            return Ok(Declaration::Dynamic(
                "Cargo.toml inherits the version from the workspace".to_string(),
            ));
        }

        Ok(Declaration::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "[package]\nname = \"demo\"\nversion = \"0.4.2\"\n",
        Declaration::Static("0.4.2".to_string())
    )]
    #[case(
        "[package]\nname = \"demo\"\nversion.workspace = true\n",
        Declaration::Dynamic("Cargo.toml inherits the version from the workspace".to_string())
    )]
    #[case(
        "[package]\nname = \"demo\"\nversion = { workspace = true }\n",
        Declaration::Dynamic("Cargo.toml inherits the version from the workspace".to_string())
    )]
    #[case(
        "[workspace]\nmembers = [\"a\"]\n\n[dependencies]\nversion = \"1\"\n",
        Declaration::Absent
    )]
    fn parse_returns_expected(#[case] content: &str, #[case] expected: Declaration) {
        assert_eq!(CargoTomlParser::new().parse(content).unwrap(), expected);
    }
}

//! pyproject.toml parsers
//!
//! Reads the version from:
//! - `[project].version` (PEP 621), or `[project].dynamic` listing `version`
//! - `[tool.poetry].version`, treating poetry-dynamic-versioning as dynamic
//!
//! Also exposes the `[build-system]` details the build backend strategy needs.

use std::str::FromStr;

use pep508_rs::{Requirement, VerbatimUrl};
use tracing::warn;

use crate::parser::toml_document::TomlDocument;
use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::Declaration;

pub const PYPROJECT_TOML: &str = "pyproject.toml";

/// Parser for the PEP 621 `[project]` table
pub struct PyprojectTomlParser;

impl PyprojectTomlParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract the declaration from an already parsed document
    pub fn declaration(&self, doc: &TomlDocument) -> Declaration {
        if let Some(version) = doc.get_str(&["project", "version"]) {
            let declaration = Declaration::from_value(version);
            if !declaration.is_absent() {
                return declaration;
            }
        }

        let is_dynamic = doc
            .get_str_array(&["project", "dynamic"])
            .is_some_and(|fields| fields.contains(&"version"));

        if is_dynamic {
            Declaration::Dynamic("pyproject.toml [project].dynamic lists \"version\"".to_string())
        } else {
            Declaration::Absent
        }
    }
}

impl Default for PyprojectTomlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PyprojectTomlParser {
    fn file_name(&self) -> &'static str {
        PYPROJECT_TOML
    }

    fn method(&self) -> &'static str {
        "pep621-project-table"
    }

    fn field(&self) -> &'static str {
        "[project].version"
    }

    fn parse(&self, content: &str) -> Result<Declaration, ParseError> {
        let doc = TomlDocument::parse(content)?;
        Ok(self.declaration(&doc))
    }
}

/// Parser for the `[tool.poetry]` table
pub struct PoetryParser;

impl PoetryParser {
    pub fn new() -> Self {
        Self
    }

    pub fn declaration(&self, doc: &TomlDocument) -> Declaration {
        // The plugin overwrites whatever placeholder version is declared
        if poetry_dynamic_versioning_enabled(doc) {
            return Declaration::Dynamic(
                "pyproject.toml enables poetry-dynamic-versioning".to_string(),
            );
        }

        doc.get_str(&["tool", "poetry", "version"])
            .map(Declaration::from_value)
            .unwrap_or(Declaration::Absent)
    }
}

impl Default for PoetryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PoetryParser {
    fn file_name(&self) -> &'static str {
        PYPROJECT_TOML
    }

    fn method(&self) -> &'static str {
        "poetry-tool-table"
    }

    fn field(&self) -> &'static str {
        "[tool.poetry].version"
    }

    fn parse(&self, content: &str) -> Result<Declaration, ParseError> {
        let doc = TomlDocument::parse(content)?;
        Ok(self.declaration(&doc))
    }
}

pub fn poetry_dynamic_versioning_enabled(doc: &TomlDocument) -> bool {
    doc.get_bool(&["tool", "poetry-dynamic-versioning", "enable"])
        .unwrap_or(false)
}

/// The declared `[build-system].build-backend`, if any
pub fn build_backend(doc: &TomlDocument) -> Option<&str> {
    doc.get_str(&["build-system", "build-backend"])
        .map(str::trim)
        .filter(|backend| !backend.is_empty())
}

/// Normalized names of the `[build-system].requires` entries
///
/// Entries that are not valid PEP 508 requirements are skipped.
pub fn build_requirements(doc: &TomlDocument) -> Vec<String> {
    doc.get_str_array(&["build-system", "requires"])
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            Requirement::<VerbatimUrl>::from_str(entry)
                .inspect_err(|e| warn!("Failed to parse build requirement '{}': {}", entry, e))
                .ok()
        })
        .map(|req| req.name.to_string())
        .collect()
}

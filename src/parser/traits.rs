//! Parser trait definition

use crate::parser::types::Declaration;

/// Trait for reading a version declaration out of a project metadata file
pub trait Parser {
    /// File name this parser reads, relative to the project root
    fn file_name(&self) -> &'static str;

    /// Detection technique reported when this parser yields a version
    fn method(&self) -> &'static str;

    /// Where in the file the version lives, for diagnostics
    fn field(&self) -> &'static str;

    /// Parse the content and extract the version declaration
    fn parse(&self, content: &str) -> Result<Declaration, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the file
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// User supplied pattern could not be compiled
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

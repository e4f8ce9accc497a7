//! TOML document reader built on tree-sitter
//!
//! Flattens a TOML file into dotted key paths so callers can look up values
//! such as `project.version` or `tool.setuptools.dynamic.version.attr`
//! regardless of whether they were written as table headers, dotted keys,
//! or inline tables.
//!
//! Arrays of tables (`[[...]]`) are skipped; none of the version sources
//! live in them.

use tracing::warn;
use tree_sitter::Node;

use crate::parser::traits::ParseError;

/// A TOML value as far as version detection cares
#[derive(Debug, Clone, PartialEq)]
pub enum TomlValue {
    String(String),
    Bool(bool),
    Array(Vec<TomlValue>),
    /// Numbers, dates and nested inline tables inside arrays, kept verbatim
    Other(String),
}

impl TomlValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TomlValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TomlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TomlValue]> {
        match self {
            TomlValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Flattened view of a TOML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TomlDocument {
    /// Every table path that was declared, including inline tables
    tables: Vec<Vec<String>>,
    /// Leaf values keyed by their full path
    entries: Vec<(Vec<String>, TomlValue)>,
}

impl TomlDocument {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_toml_ng::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set TOML language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse TOML content");
            ParseError::ParseFailed("Failed to parse TOML".to_string())
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let (row, column) = first_error_position(root).unwrap_or((0, 0));
            return Err(ParseError::InvalidSyntax(format!(
                "malformed TOML at line {}, column {}",
                row + 1,
                column + 1
            )));
        }

        let mut document = Self::default();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            match child.kind() {
                "pair" => document.collect_pair(child, content, &[]),
                "table" => document.collect_table(child, content),
                _ => {}
            }
        }

        Ok(document)
    }

    /// Look up the value stored at `path`
    pub fn get(&self, path: &[&str]) -> Option<&TomlValue> {
        self.entries
            .iter()
            .find(|(key, _)| key_matches(key, path))
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_bool(&self, path: &[&str]) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// String items of the array at `path`; non-string items are dropped
    pub fn get_str_array(&self, path: &[&str]) -> Option<Vec<&str>> {
        let items = self.get(path)?.as_array()?;
        Some(items.iter().filter_map(TomlValue::as_str).collect())
    }

    /// Whether a table exists at `path`, either declared or implied by a
    /// dotted key beneath it
    pub fn contains_table(&self, path: &[&str]) -> bool {
        self.tables.iter().any(|table| key_matches(table, path))
            || self
                .entries
                .iter()
                .any(|(key, _)| key.len() > path.len() && key_matches(&key[..path.len()], path))
    }

    /// Process a `[table]` node: header key followed by its pairs
    fn collect_table(&mut self, table_node: Node, content: &str) {
        let mut cursor = table_node.walk();
        let mut table_path: Option<Vec<String>> = None;

        for child in table_node.children(&mut cursor) {
            match child.kind() {
                "bare_key" | "dotted_key" | "quoted_key" if table_path.is_none() => {
                    let path = key_path(child, content);
                    self.tables.push(path.clone());
                    table_path = Some(path);
                }
                "pair" => {
                    if let Some(prefix) = &table_path {
                        self.collect_pair(child, content, prefix);
                    }
                }
                _ => {}
            }
        }
    }

    /// Process a `key = value` node below `prefix`
    fn collect_pair(&mut self, pair_node: Node, content: &str, prefix: &[String]) {
        let mut cursor = pair_node.walk();
        let children: Vec<Node> = pair_node
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();

        let [key_node, value_node] = children.as_slice() else {
            return;
        };
        let (key_node, value_node) = (*key_node, *value_node);

        let mut path = prefix.to_vec();
        path.extend(key_path(key_node, content));

        if value_node.kind() == "inline_table" {
            self.tables.push(path.clone());
            let mut inline_cursor = value_node.walk();
            let pairs: Vec<Node> = value_node
                .named_children(&mut inline_cursor)
                .filter(|n| n.kind() == "pair")
                .collect();
            for pair in pairs {
                self.collect_pair(pair, content, &path);
            }
        } else {
            self.entries.push((path, value_of(value_node, content)));
        }
    }
}

fn key_matches(key: &[String], path: &[&str]) -> bool {
    key.len() == path.len() && key.iter().zip(path).all(|(a, b)| a == b)
}

/// Split a (possibly dotted) key node into its segments
fn key_path(node: Node, content: &str) -> Vec<String> {
    match node.kind() {
        "bare_key" => vec![content[node.byte_range()].trim().to_string()],
        "quoted_key" => vec![unquote(content[node.byte_range()].trim())],
        "dotted_key" => {
            let mut cursor = node.walk();
            let parts: Vec<Node> = node.named_children(&mut cursor).collect();
            parts
                .into_iter()
                .flat_map(|part| key_path(part, content))
                .collect()
        }
        _ => Vec::new(),
    }
}

fn value_of(node: Node, content: &str) -> TomlValue {
    let text = &content[node.byte_range()];
    match node.kind() {
        "string" => TomlValue::String(unquote(text)),
        "boolean" => TomlValue::Bool(text.trim() == "true"),
        "array" => {
            let mut cursor = node.walk();
            let items: Vec<Node> = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .collect();
            TomlValue::Array(items.into_iter().map(|n| value_of(n, content)).collect())
        }
        _ => TomlValue::Other(text.trim().to_string()),
    }
}

fn first_error_position(node: Node) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let point = node.start_position();
        return Some((point.row, point.column));
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_position)
}

/// Remove TOML string quotes, resolving escapes for basic strings
fn unquote(raw: &str) -> String {
    if let Some(inner) = raw
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
    {
        unescape(strip_leading_newline(inner))
    } else if let Some(inner) = raw.strip_prefix("'''").and_then(|s| s.strip_suffix("'''")) {
        strip_leading_newline(inner).to_string()
    } else if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        unescape(inner)
    } else if let Some(inner) = raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        inner.to_string()
    } else {
        raw.to_string()
    }
}

fn strip_leading_newline(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(u @ ('u' | 'U')) => {
                let len = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(len).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(u);
                        out.push_str(&hex);
                    }
                }
            }
            // Line ending backslash trims the newline and following whitespace
            Some(ws) if ws.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

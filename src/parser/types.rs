//! Common types for parsers

/// What a metadata file says about the project version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Version literally written in the file
    Static(String),
    /// File defers the version to something computed at build time.
    /// Carries a short description of where the marker was found.
    Dynamic(String),
    /// File does not mention a version
    Absent,
}

impl Declaration {
    /// Build a static declaration, treating blank values as absent
    pub fn from_value(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            Declaration::Absent
        } else {
            Declaration::Static(value.to_string())
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Declaration::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", Declaration::Static("1.2.3".to_string()))]
    #[case("  2.0 \n", Declaration::Static("2.0".to_string()))]
    #[case("", Declaration::Absent)]
    #[case("   ", Declaration::Absent)]
    fn from_value_returns_expected(#[case] value: &str, #[case] expected: Declaration) {
        assert_eq!(Declaration::from_value(value), expected);
    }
}

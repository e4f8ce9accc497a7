//! Detection result types

use std::fmt;

use serde::Serialize;

/// Artifact class that produced a version. Doubles as the strategy name
/// recorded in [`DetectionResult::attempts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    /// Version literally declared in a metadata file
    StaticMetadataFile,
    /// Version read through the build backend's dynamic version configuration
    BuildBackendDynamic,
    /// Version derived from source control tags
    ScmDerived,
}

impl VersionSource {
    /// Strategies in priority order
    pub const ALL: [VersionSource; 3] = [
        VersionSource::StaticMetadataFile,
        VersionSource::BuildBackendDynamic,
        VersionSource::ScmDerived,
    ];

    /// Returns the string representation of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSource::StaticMetadataFile => "static-metadata-file",
            VersionSource::BuildBackendDynamic => "build-backend-dynamic",
            VersionSource::ScmDerived => "scm-derived",
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully resolved version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// Resolved version identifier
    pub version: String,
    /// Which artifact produced the value
    pub source: VersionSource,
    /// Technique used within the source (e.g. "pep621-project-table", "exact-tag")
    pub method: String,
    /// True if the version is computed at build time rather than declared
    pub is_dynamic: bool,
    /// Build backend declared (or implied) for the project
    pub build_backend: Option<String>,
    /// Heuristic trust score, 0-100
    pub confidence: u8,
}

/// Outcome of one detection call, successful or not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    /// Present iff a strategy succeeded
    pub version_info: Option<VersionInfo>,
    /// Strategies tried, in trial order
    pub attempts: Vec<VersionSource>,
    /// One diagnostic per failed strategy, in trial order
    pub errors: Vec<String>,
}

impl DetectionResult {
    pub fn is_detected(&self) -> bool {
        self.version_info.is_some()
    }

    /// The resolved version string, if any
    pub fn version(&self) -> Option<&str> {
        self.version_info.as_ref().map(|info| info.version.as_str())
    }
}

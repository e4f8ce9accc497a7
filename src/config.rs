use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::version::types::VersionSource;

// =============================================================================
// Confidence defaults
// =============================================================================

/// `[project].version` in pyproject.toml
pub const CONFIDENCE_PEP621: u8 = 100;
/// `[tool.poetry].version`
pub const CONFIDENCE_POETRY: u8 = 95;
/// `[metadata] version` in setup.cfg
pub const CONFIDENCE_SETUP_CFG: u8 = 90;
/// `Version:` header in PKG-INFO
pub const CONFIDENCE_PKG_INFO: u8 = 90;
/// `version=` keyword scanned out of setup.py
pub const CONFIDENCE_SETUP_PY: u8 = 80;
/// Any build backend dynamic version source
pub const CONFIDENCE_BUILD_BACKEND: u8 = 85;
/// HEAD is a clean checkout of a version tag
pub const CONFIDENCE_EXACT_TAG: u8 = 75;
/// Version written by an SCM plugin at the last build
pub const CONFIDENCE_SCM_VERSION_FILE: u8 = 70;
/// HEAD is some commits past a version tag
pub const CONFIDENCE_TAG_DISTANCE: u8 = 65;
/// Working tree has uncommitted changes
pub const CONFIDENCE_DIRTY: u8 = 60;

/// Tag prefix stripped before parsing a tag as a version
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// Environment variable holding the log filter directive
pub const LOG_ENV_VAR: &str = "PYVERSION_DETECT_LOG";

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub confidence: ConfidenceConfig,
    pub strategies: StrategiesConfig,
    pub scm: ScmConfig,
}

impl ResolverConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject confidence scores outside 0-100 and configs that disable every strategy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((field, value)) = self
            .confidence
            .fields()
            .into_iter()
            .find(|(_, value)| *value > 100)
        {
            return Err(ConfigError::InvalidConfidence { field, value });
        }

        if !VersionSource::ALL
            .into_iter()
            .any(|source| self.strategies.is_enabled(source))
        {
            return Err(ConfigError::NoStrategyEnabled);
        }

        Ok(())
    }
}

/// Confidence score assigned per detection method
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidenceConfig {
    pub pep621: u8,
    pub poetry: u8,
    pub setup_cfg: u8,
    pub pkg_info: u8,
    pub setup_py: u8,
    pub build_backend: u8,
    pub exact_tag: u8,
    pub scm_version_file: u8,
    pub tag_distance: u8,
    pub dirty: u8,
}

impl ConfidenceConfig {
    fn fields(&self) -> [(&'static str, u8); 10] {
        [
            ("pep621", self.pep621),
            ("poetry", self.poetry),
            ("setupCfg", self.setup_cfg),
            ("pkgInfo", self.pkg_info),
            ("setupPy", self.setup_py),
            ("buildBackend", self.build_backend),
            ("exactTag", self.exact_tag),
            ("scmVersionFile", self.scm_version_file),
            ("tagDistance", self.tag_distance),
            ("dirty", self.dirty),
        ]
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            pep621: CONFIDENCE_PEP621,
            poetry: CONFIDENCE_POETRY,
            setup_cfg: CONFIDENCE_SETUP_CFG,
            pkg_info: CONFIDENCE_PKG_INFO,
            setup_py: CONFIDENCE_SETUP_PY,
            build_backend: CONFIDENCE_BUILD_BACKEND,
            exact_tag: CONFIDENCE_EXACT_TAG,
            scm_version_file: CONFIDENCE_SCM_VERSION_FILE,
            tag_distance: CONFIDENCE_TAG_DISTANCE,
            dirty: CONFIDENCE_DIRTY,
        }
    }
}

/// Strategy-specific configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategiesConfig {
    pub static_metadata: StrategyConfig,
    pub build_backend: StrategyConfig,
    pub scm: StrategyConfig,
}

impl StrategiesConfig {
    pub fn is_enabled(&self, source: VersionSource) -> bool {
        match source {
            VersionSource::StaticMetadataFile => self.static_metadata.enabled,
            VersionSource::BuildBackendDynamic => self.build_backend.enabled,
            VersionSource::ScmDerived => self.scm.enabled,
        }
    }
}

/// Individual strategy configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    pub enabled: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Source control configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScmConfig {
    /// Look for the repository in parent directories of the project root
    pub search_parent_directories: bool,
    /// Prefix stripped from tags before parsing them as versions
    pub tag_prefix: String,
}

impl Default for ScmConfig {
    fn default() -> Self {
        Self {
            search_parent_directories: true,
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }
}

/// Error type for loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Confidence `{field}` must be between 0 and 100, got {value}")]
    InvalidConfidence { field: &'static str, value: u8 },

    #[error("At least one strategy must be enabled")]
    NoStrategyEnabled,
}

/// Returns the path to the data directory for pyversion-detect.
/// Uses $XDG_DATA_HOME/pyversion-detect if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/pyversion-detect,
/// or ./pyversion-detect if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("pyversion-detect.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("pyversion-detect")
}

//! Strategy driver
//!
//! Runs the enabled strategies in priority order and stops at the first one
//! that produces a version. Every attempt is recorded, and every failed
//! attempt leaves exactly one diagnostic.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::ResolverConfig;
use crate::version::error::DetectError;
use crate::version::git::{Git2Reader, GitReader};
use crate::version::project::Project;
use crate::version::strategies;
use crate::version::types::{DetectionResult, VersionSource};

/// Detects Python project versions
///
/// Holds no per-call state, so one resolver can serve any number of calls,
/// including concurrent ones.
#[derive(Clone)]
pub struct VersionResolver {
    config: ResolverConfig,
    git: Arc<dyn GitReader>,
}

impl VersionResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_git_reader(config, Arc::new(Git2Reader))
    }

    /// Use a custom source of git descriptions
    pub fn with_git_reader(config: ResolverConfig, git: Arc<dyn GitReader>) -> Self {
        Self { config, git }
    }

    /// Run the strategies against `path`
    ///
    /// # Errors
    /// Fails only when `path` exists but is not a readable directory. A
    /// missing path yields a result with every enabled strategy failed.
    pub fn detect(&self, path: &Path) -> Result<DetectionResult, DetectError> {
        let project = Project::open(path)?;
        let mut result = DetectionResult::default();

        for source in VersionSource::ALL {
            if !self.config.strategies.is_enabled(source) {
                debug!("Strategy {} is disabled", source);
                continue;
            }

            result.attempts.push(source);
            match strategies::run(source, &project, &self.config, self.git.as_ref()) {
                Ok(info) => {
                    debug!(
                        "Strategy {} found {} via {} in {}",
                        source,
                        info.version,
                        info.method,
                        path.display()
                    );
                    result.version_info = Some(info);
                    break;
                }
                Err(e) => {
                    debug!("Strategy {} failed: {}", source, e);
                    result.errors.push(e);
                }
            }
        }

        Ok(result)
    }

    /// The detected version string, if any
    pub fn version(&self, path: &Path) -> Result<Option<String>, DetectError> {
        let result = self.detect(path)?;
        Ok(result.version_info.map(|info| info.version))
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl std::fmt::Debug for VersionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Detect the version of the project at `path` with the default settings
pub fn detect_package_version(path: impl AsRef<Path>) -> Result<DetectionResult, DetectError> {
    VersionResolver::default().detect(path.as_ref())
}

/// Just the version string of the project at `path`
pub fn get_package_version(path: impl AsRef<Path>) -> Result<Option<String>, DetectError> {
    let result = detect_package_version(path)?;
    Ok(result.version_info.map(|info| info.version))
}

//! Read-only view of a project root
//!
//! All strategies go through [`Project`] for file access. Missing files are
//! reported as `Ok(None)`, other I/O failures as diagnostic strings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::parser::pyproject_toml::PYPROJECT_TOML;
use crate::parser::setup_cfg::{SETUP_CFG, SetupCfg};
use crate::parser::toml_document::TomlDocument;
use crate::version::error::DetectError;

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    exists: bool,
}

impl Project {
    /// Check the root and build a view of it.
    ///
    /// A missing root is not an error: every lookup simply comes back empty.
    pub fn open(root: &Path) -> Result<Self, DetectError> {
        let metadata = match fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    root: root.to_path_buf(),
                    exists: false,
                });
            }
            Err(source) => {
                return Err(DetectError::RootUnreadable {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };

        if !metadata.is_dir() {
            return Err(DetectError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        fs::read_dir(root).map_err(|source| DetectError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            exists: true,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Absolute path of a file given relative to the root
    pub fn path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    pub fn is_file(&self, relative: &str) -> bool {
        self.exists && self.path(relative).is_file()
    }

    /// Read a file relative to the root
    pub fn read(&self, relative: &str) -> Result<Option<String>, String> {
        if !self.exists {
            return Ok(None);
        }

        match fs::read_to_string(self.path(relative)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!("Failed to read {}: {}", relative, e);
                Err(format!("failed to read {relative}: {e}"))
            }
        }
    }

    /// Parsed pyproject.toml, if present
    pub fn pyproject(&self) -> Result<Option<TomlDocument>, String> {
        let Some(content) = self.read(PYPROJECT_TOML)? else {
            return Ok(None);
        };

        TomlDocument::parse(&content)
            .map(Some)
            .map_err(|e| format!("{PYPROJECT_TOML}: {e}"))
    }

    /// Parsed setup.cfg, if present
    pub fn setup_cfg(&self) -> Result<Option<SetupCfg>, String> {
        let Some(content) = self.read(SETUP_CFG)? else {
            return Ok(None);
        };

        SetupCfg::parse(&content)
            .map(Some)
            .map_err(|e| format!("{SETUP_CFG}: {e}"))
    }
}

//! Static metadata strategy
//!
//! Reads the version literally declared in project metadata files, in order
//! of authority:
//!
//! | File             | Field                   | Method                 |
//! |------------------|-------------------------|------------------------|
//! | pyproject.toml   | `[project].version`     | `pep621-project-table` |
//! | pyproject.toml   | `[tool.poetry].version` | `poetry-tool-table`    |
//! | setup.cfg        | `[metadata] version`    | `setup-cfg-metadata`   |
//! | PKG-INFO         | `Version:`              | `pkg-info-header`      |
//! | setup.py         | `version=` keyword      | `regex-scan`           |
//!
//! The first file that marks the version as dynamic ends the scan: a lower
//! ranked file cannot override what a higher ranked one defers.

use tracing::{debug, warn};

use crate::config::{ConfidenceConfig, ResolverConfig};
use crate::parser::pkg_info::PkgInfoParser;
use crate::parser::pyproject_toml::{PoetryParser, PyprojectTomlParser};
use crate::parser::setup_cfg::SetupCfgParser;
use crate::parser::setup_py::SetupPyParser;
use crate::parser::traits::Parser;
use crate::parser::types::Declaration;
use crate::version::project::Project;
use crate::version::strategies::backend_name;
use crate::version::types::{VersionInfo, VersionSource};

type ConfidenceFn = fn(&ConfidenceConfig) -> u8;

/// Outcome of scanning the metadata files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// A file declares the version literally
    Static {
        version: String,
        method: &'static str,
        confidence: u8,
    },
    /// A file marks the version as computed at build time
    Dynamic { reason: String },
    /// No file mentions the version
    NotFound { notes: Vec<String> },
}

fn sources() -> [(Box<dyn Parser>, ConfidenceFn); 5] {
    [
        (Box::new(PyprojectTomlParser::new()), |c| c.pep621),
        (Box::new(PoetryParser::new()), |c| c.poetry),
        (Box::new(SetupCfgParser::new()), |c| c.setup_cfg),
        (Box::new(PkgInfoParser::new()), |c| c.pkg_info),
        (Box::new(SetupPyParser::new()), |c| c.setup_py),
    ]
}

/// Walk the metadata files in order of authority
pub fn scan(project: &Project, confidence: &ConfidenceConfig) -> Scan {
    let mut notes: Vec<String> = Vec::new();

    for (parser, confidence_of) in sources() {
        let file = parser.file_name();

        let content = match project.read(file) {
            Ok(Some(content)) => content,
            Ok(None) => {
                push_unique(&mut notes, format!("{file} not found"));
                continue;
            }
            Err(e) => {
                push_unique(&mut notes, e);
                continue;
            }
        };

        match parser.parse(&content) {
            Ok(Declaration::Static(version)) => {
                debug!("{} declares version {} in {}", file, version, parser.field());
                return Scan::Static {
                    version,
                    method: parser.method(),
                    confidence: confidence_of(confidence),
                };
            }
            Ok(Declaration::Dynamic(reason)) => return Scan::Dynamic { reason },
            Ok(Declaration::Absent) => {
                push_unique(&mut notes, format!("{file} has no {}", parser.field()));
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", file, e);
                push_unique(&mut notes, format!("{file}: {e}"));
            }
        }
    }

    Scan::NotFound { notes }
}

pub fn detect(project: &Project, config: &ResolverConfig) -> Result<VersionInfo, String> {
    match scan(project, &config.confidence) {
        Scan::Static {
            version,
            method,
            confidence,
        } => Ok(VersionInfo {
            version,
            source: VersionSource::StaticMetadataFile,
            method: method.to_string(),
            is_dynamic: false,
            build_backend: backend_name(project),
            confidence,
        }),
        Scan::Dynamic { reason } => Err(format!("version is dynamic: {reason}")),
        Scan::NotFound { notes } => Err(format!(
            "no static version declared ({})",
            notes.join("; ")
        )),
    }
}

fn push_unique(notes: &mut Vec<String>, note: String) {
    if !notes.contains(&note) {
        notes.push(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with(files: &[(&str, &str)]) -> (TempDir, Project) {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).unwrap();
        }
        let project = Project::open(temp_dir.path()).unwrap();
        (temp_dir, project)
    }

    #[test]
    fn detect_reads_pep621_version() {
        let (_temp_dir, project) = project_with(&[(
            "pyproject.toml",
            "[project]\nname = \"demo\"\nversion = \"1.4.0\"\n\n[build-system]\nbuild-backend = \"hatchling.build\"\n",
        )]);

        let info = detect(&project, &ResolverConfig::default()).unwrap();
        assert_eq!(info.version, "1.4.0");
        assert_eq!(info.method, "pep621-project-table");
        assert_eq!(info.confidence, 100);
        assert!(!info.is_dynamic);
        assert_eq!(info.build_backend.as_deref(), Some("hatchling.build"));
    }

    #[test]
    fn detect_prefers_pyproject_over_setup_cfg() {
        let (_temp_dir, project) = project_with(&[
            ("pyproject.toml", "[project]\nversion = \"2.0.0\"\n"),
            ("setup.cfg", "[metadata]\nversion = 1.0.0\n"),
        ]);

        let info = detect(&project, &ResolverConfig::default()).unwrap();
        assert_eq!(info.version, "2.0.0");
    }

    #[test]
    fn detect_falls_through_to_setup_cfg() {
        let (_temp_dir, project) = project_with(&[
            ("setup.cfg", "[metadata]\nname = demo\nversion = 0.7.0\n"),
            ("setup.py", "from setuptools import setup\nsetup()\n"),
        ]);

        let info = detect(&project, &ResolverConfig::default()).unwrap();
        assert_eq!(info.version, "0.7.0");
        assert_eq!(info.method, "setup-cfg-metadata");
        assert_eq!(info.confidence, 90);
        assert_eq!(
            info.build_backend.as_deref(),
            Some("setuptools.build_meta:__legacy__")
        );
    }

    #[test]
    fn detect_uses_configured_confidence() {
        let (_temp_dir, project) = project_with(&[("setup.py", "setup(version='0.1')\n")]);
        let mut config = ResolverConfig::default();
        config.confidence.setup_py = 42;

        let info = detect(&project, &config).unwrap();
        assert_eq!(info.method, "regex-scan");
        assert_eq!(info.confidence, 42);
    }

    #[test]
    fn detect_stops_at_dynamic_marker() {
        let (_temp_dir, project) = project_with(&[
            (
                "pyproject.toml",
                "[project]\nname = \"demo\"\ndynamic = [\"version\"]\n",
            ),
            ("PKG-INFO", "Metadata-Version: 2.1\nVersion: 9.9.9\n"),
        ]);

        let error = detect(&project, &ResolverConfig::default()).unwrap_err();
        assert!(error.starts_with("version is dynamic"), "{error}");
    }

    #[test]
    fn scan_collects_notes_for_empty_project() {
        let (_temp_dir, project) = project_with(&[]);

        let Scan::NotFound { notes } = scan(&project, &ConfidenceConfig::default()) else {
            panic!("expected NotFound");
        };
        assert_eq!(
            notes,
            vec![
                "pyproject.toml not found",
                "setup.cfg not found",
                "PKG-INFO not found",
                "setup.py not found",
            ]
        );
    }

    #[test]
    fn scan_reports_malformed_pyproject_once_and_continues() {
        let (_temp_dir, project) = project_with(&[
            ("pyproject.toml", "[project\nversion = \"1.0\"\n"),
            ("setup.cfg", "[metadata]\nversion = 3.0\n"),
        ]);

        let scan = scan(&project, &ConfidenceConfig::default());
        assert_eq!(
            scan,
            Scan::Static {
                version: "3.0".to_string(),
                method: "setup-cfg-metadata",
                confidence: 90,
            }
        );
    }
}

//! Build backend identification
//!
//! Maps `[build-system].build-backend` to the backends whose dynamic version
//! configuration can be read without running them, and works out when a
//! backend hands the version over to an SCM plugin.

use crate::parser::pyproject_toml::{
    build_backend, build_requirements, poetry_dynamic_versioning_enabled,
};
use crate::parser::setup_cfg::SETUP_CFG;
use crate::parser::setup_py::SETUP_PY;
use crate::parser::toml_document::TomlDocument;
use crate::version::project::Project;

/// Backend used by PEP 517 frontends when none is declared
pub const LEGACY_SETUPTOOLS_BACKEND: &str = "setuptools.build_meta:__legacy__";

/// Known build backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildBackend {
    /// setuptools.build_meta
    Setuptools,
    /// hatchling.build
    Hatchling,
    /// flit_core.buildapi
    FlitCore,
    /// pdm.backend
    Pdm,
    /// poetry.core.masonry.api
    PoetryCore,
    /// maturin
    Maturin,
    /// Anything else; its version configuration is not understood
    Unknown,
}

impl BuildBackend {
    /// Identify a backend from its `build-backend` module path
    pub fn from_module(module: &str) -> Self {
        // Drop an `:object` suffix such as `setuptools.build_meta:__legacy__`
        let module = module.split(':').next().unwrap_or(module).trim();
        match module {
            "setuptools.build_meta" => BuildBackend::Setuptools,
            "hatchling.build" | "hatchling.ouroboros" => BuildBackend::Hatchling,
            "flit_core.buildapi" | "flit.buildapi" => BuildBackend::FlitCore,
            "pdm.backend" | "pdm.pep517.api" => BuildBackend::Pdm,
            "poetry.core.masonry.api" | "poetry.masonry.api" => BuildBackend::PoetryCore,
            "maturin" => BuildBackend::Maturin,
            _ => BuildBackend::Unknown,
        }
    }

    /// SCM plugin this backend delegates the version to, if configured
    pub fn scm_plugin(&self, pyproject: &TomlDocument) -> Option<&'static str> {
        match self {
            BuildBackend::Setuptools => {
                let configured = pyproject.contains_table(&["tool", "setuptools_scm"])
                    || build_requirements(pyproject)
                        .iter()
                        .any(|name| name == "setuptools-scm");
                configured.then_some("setuptools-scm")
            }
            BuildBackend::Hatchling => {
                let source = pyproject.get_str(&["tool", "hatch", "version", "source"]);
                (source == Some("vcs")).then_some("hatch-vcs")
            }
            BuildBackend::Pdm => {
                let source = pyproject.get_str(&["tool", "pdm", "version", "source"]);
                (source == Some("scm")).then_some("pdm-backend scm")
            }
            BuildBackend::PoetryCore => {
                poetry_dynamic_versioning_enabled(pyproject).then_some("poetry-dynamic-versioning")
            }
            BuildBackend::FlitCore | BuildBackend::Maturin | BuildBackend::Unknown => None,
        }
    }
}

/// Backend declared (or implied) for a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredBackend {
    /// Module path as written, e.g. "hatchling.build"
    pub name: String,
    pub kind: BuildBackend,
}

impl DeclaredBackend {
    /// Work out the project's build backend.
    ///
    /// Without an explicit `build-backend`, any pyproject.toml or setuptools
    /// file means the legacy setuptools backend.
    pub fn detect(project: &Project, pyproject: Option<&TomlDocument>) -> Option<Self> {
        if let Some(name) = pyproject.and_then(build_backend) {
            return Some(Self {
                name: name.to_string(),
                kind: BuildBackend::from_module(name),
            });
        }

        if pyproject.is_some() || project.is_file(SETUP_PY) || project.is_file(SETUP_CFG) {
            return Some(Self {
                name: LEGACY_SETUPTOOLS_BACKEND.to_string(),
                kind: BuildBackend::Setuptools,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[rstest]
    #[case("setuptools.build_meta", BuildBackend::Setuptools)]
    #[case("setuptools.build_meta:__legacy__", BuildBackend::Setuptools)]
    #[case("hatchling.build", BuildBackend::Hatchling)]
    #[case("flit_core.buildapi", BuildBackend::FlitCore)]
    #[case("pdm.backend", BuildBackend::Pdm)]
    #[case("poetry.core.masonry.api", BuildBackend::PoetryCore)]
    #[case("maturin", BuildBackend::Maturin)]
    #[case("scikit_build_core.build", BuildBackend::Unknown)]
    fn from_module_returns_expected(#[case] module: &str, #[case] expected: BuildBackend) {
        assert_eq!(BuildBackend::from_module(module), expected);
    }

    #[rstest]
    #[case(
        BuildBackend::Setuptools,
        "[build-system]\nrequires = [\"setuptools\", \"setuptools-scm>=8\"]\n",
        Some("setuptools-scm")
    )]
    #[case(BuildBackend::Setuptools, "[tool.setuptools_scm]\n", Some("setuptools-scm"))]
    #[case(
        BuildBackend::Setuptools,
        "[build-system]\nrequires = [\"setuptools\"]\n",
        None
    )]
    #[case(
        BuildBackend::Hatchling,
        "[tool.hatch.version]\nsource = \"vcs\"\n",
        Some("hatch-vcs")
    )]
    #[case(
        BuildBackend::Hatchling,
        "[tool.hatch.version]\npath = \"src/demo/__about__.py\"\n",
        None
    )]
    #[case(
        BuildBackend::Pdm,
        "[tool.pdm.version]\nsource = \"scm\"\n",
        Some("pdm-backend scm")
    )]
    #[case(
        BuildBackend::PoetryCore,
        "[tool.poetry-dynamic-versioning]\nenable = true\n",
        Some("poetry-dynamic-versioning")
    )]
    #[case(BuildBackend::FlitCore, "[tool.setuptools_scm]\n", None)]
    fn scm_plugin_returns_expected(
        #[case] backend: BuildBackend,
        #[case] pyproject: &str,
        #[case] expected: Option<&str>,
    ) {
        let doc = TomlDocument::parse(pyproject).unwrap();
        assert_eq!(backend.scm_plugin(&doc), expected);
    }

    #[test]
    fn detect_prefers_declared_backend() {
        let temp_dir = TempDir::new().unwrap();
        let project = Project::open(temp_dir.path()).unwrap();
        let doc =
            TomlDocument::parse("[build-system]\nbuild-backend = \"hatchling.build\"\n").unwrap();

        assert_eq!(
            DeclaredBackend::detect(&project, Some(&doc)),
            Some(DeclaredBackend {
                name: "hatchling.build".to_string(),
                kind: BuildBackend::Hatchling,
            })
        );
    }

    #[test]
    fn detect_falls_back_to_legacy_setuptools() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("setup.py"), "setup()\n").unwrap();
        let project = Project::open(temp_dir.path()).unwrap();

        let backend = DeclaredBackend::detect(&project, None).unwrap();
        assert_eq!(backend.name, LEGACY_SETUPTOOLS_BACKEND);
        assert_eq!(backend.kind, BuildBackend::Setuptools);
    }

    #[test]
    fn detect_returns_none_for_non_python_directory() {
        let temp_dir = TempDir::new().unwrap();
        let project = Project::open(temp_dir.path()).unwrap();
        assert_eq!(DeclaredBackend::detect(&project, None), None);
    }
}

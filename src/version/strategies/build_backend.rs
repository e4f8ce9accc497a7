//! Build backend strategy
//!
//! Applies only when the metadata marks the version as dynamic. The declared
//! backend's configuration is read the way the backend itself would read it,
//! but nothing is executed:
//!
//! - setuptools: `[tool.setuptools.dynamic] version`, then the setup.cfg
//!   `attr:`/`file:` directive, then a literal `version=` in setup.py
//! - hatchling: `[tool.hatch.version] path` with an optional `pattern`
//! - flit_core: `__version__` in the package module
//! - pdm.backend: `[tool.pdm.version]` with `source = "file"`
//! - poetry-core: `[tool.poetry].version` next to `[project].dynamic`
//! - maturin: `[package].version` of the crate manifest
//!
//! A backend that hands the version to an SCM plugin fails here so the SCM
//! strategy can pick it up.

use tracing::debug;

use crate::config::ResolverConfig;
use crate::parser::cargo_toml::{CARGO_TOML, CargoTomlParser};
use crate::parser::python_source::{find_assignment, find_version, find_with_pattern};
use crate::parser::setup_cfg::{SetupCfg, VersionDirective};
use crate::parser::setup_py::{SETUP_PY, SetupPyParser};
use crate::parser::toml_document::{TomlDocument, TomlValue};
use crate::parser::traits::Parser;
use crate::parser::types::Declaration;
use crate::version::backend::{BuildBackend, DeclaredBackend};
use crate::version::pep440::from_semver;
use crate::version::project::Project;
use crate::version::strategies::static_metadata::{self, Scan};
use crate::version::types::{VersionInfo, VersionSource};

type Resolved = Result<(String, &'static str), String>;

pub fn detect(project: &Project, config: &ResolverConfig) -> Result<VersionInfo, String> {
    match static_metadata::scan(project, &config.confidence) {
        Scan::Dynamic { reason } => debug!("Dynamic version: {}", reason),
        Scan::Static { .. } => {
            return Err("version is not declared dynamic (a static version is declared)".to_string());
        }
        Scan::NotFound { .. } => return Err("version is not declared dynamic".to_string()),
    }

    let pyproject = project.pyproject()?;
    let backend = DeclaredBackend::detect(project, pyproject.as_ref())
        .ok_or_else(|| "no build backend declared".to_string())?;
    let doc = pyproject.unwrap_or_default();

    // setuptools only falls back to setuptools-scm when nothing else is configured
    if backend.kind != BuildBackend::Setuptools {
        if let Some(plugin) = backend.kind.scm_plugin(&doc) {
            return Err(delegated(&backend.name, plugin));
        }
    }

    let (version, method) = match backend.kind {
        BuildBackend::Setuptools => setuptools(project, &doc),
        BuildBackend::Hatchling => hatchling(project, &doc),
        BuildBackend::FlitCore => flit(project, &doc),
        BuildBackend::Pdm => pdm(project, &doc),
        BuildBackend::PoetryCore => poetry(&doc),
        BuildBackend::Maturin => maturin(project, &doc),
        BuildBackend::Unknown => Err(format!("build backend `{}` is not supported", backend.name)),
    }?;

    debug!("{} reports version {} via {}", backend.name, version, method);

    Ok(VersionInfo {
        version,
        source: VersionSource::BuildBackendDynamic,
        method: method.to_string(),
        is_dynamic: true,
        build_backend: Some(backend.name),
        confidence: config.confidence.build_backend,
    })
}

fn delegated(backend: &str, plugin: &str) -> String {
    format!("{backend} delegates the version to {plugin}")
}

fn setuptools(project: &Project, doc: &TomlDocument) -> Resolved {
    if let Some(attr) = doc.get_str(&["tool", "setuptools", "dynamic", "version", "attr"]) {
        let roots = package_roots(doc, None);
        return resolve_attr(project, attr, &roots).map(|v| (v, "setuptools-attr"));
    }
    if let Some(files) = doc
        .get(&["tool", "setuptools", "dynamic", "version", "file"])
        .map(str_or_array)
    {
        return read_version_files(project, &files).map(|v| (v, "setuptools-file"));
    }

    let setup_cfg = project.setup_cfg()?;
    match setup_cfg.as_ref().and_then(SetupCfg::version_directive) {
        Some(VersionDirective::Attr(attr)) => {
            let roots = package_roots(doc, setup_cfg.as_ref());
            return resolve_attr(project, &attr, &roots).map(|v| (v, "setuptools-attr"));
        }
        Some(VersionDirective::File(files)) => {
            return read_version_files(project, &files).map(|v| (v, "setuptools-file"));
        }
        None => {}
    }

    if let Some(plugin) = BuildBackend::Setuptools.scm_plugin(doc) {
        return Err(delegated("setuptools", plugin));
    }

    let Some(content) = project.read(SETUP_PY)? else {
        return Err("no setuptools version configuration found".to_string());
    };
    if content.contains("use_scm_version") {
        return Err(delegated("setup.py", "setuptools-scm"));
    }

    match SetupPyParser::new().parse(&content) {
        Ok(Declaration::Static(version)) => Ok((version, "regex-scan")),
        Ok(Declaration::Dynamic(reason)) => Err(format!("{reason}, which cannot be evaluated")),
        Ok(Declaration::Absent) => Err("setup.py has no version= keyword".to_string()),
        Err(e) => Err(format!("{SETUP_PY}: {e}")),
    }
}

/// Directories searched for packages, most specific first
fn package_roots(doc: &TomlDocument, setup_cfg: Option<&SetupCfg>) -> Vec<String> {
    let mut roots: Vec<String> = Vec::new();
    let declared = doc
        .get_str(&["tool", "setuptools", "package-dir", ""])
        .or_else(|| setup_cfg.and_then(SetupCfg::root_package_dir));

    for root in declared.into_iter().chain([".", "src"]) {
        let root = root.trim().trim_end_matches('/');
        let root = if root.is_empty() { "." } else { root };
        if !roots.iter().any(|r| r == root) {
            roots.push(root.to_string());
        }
    }
    roots
}

/// Resolve `package.module.attribute` to the string assigned in the module
fn resolve_attr(project: &Project, attr: &str, roots: &[String]) -> Result<String, String> {
    let Some((module, name)) = attr.trim().rsplit_once('.') else {
        return Err(format!("`attr: {attr}` does not name a module attribute"));
    };
    let module_path = module.replace('.', "/");

    for root in roots {
        for candidate in [
            format!("{root}/{module_path}/__init__.py"),
            format!("{root}/{module_path}.py"),
        ] {
            let Some(content) = project.read(&candidate)? else {
                continue;
            };
            return find_assignment(&content, name)
                .ok_or_else(|| format!("{name} is not assigned a string literal in {candidate}"));
        }
    }

    Err(format!("module `{module}` not found"))
}

/// Concatenate `file:` sources; setuptools strips the combined text
fn read_version_files(project: &Project, files: &[String]) -> Result<String, String> {
    if files.is_empty() {
        return Err("no version file named".to_string());
    }

    let mut parts = Vec::with_capacity(files.len());
    for file in files {
        let content = project
            .read(file)?
            .ok_or_else(|| format!("{file} not found"))?;
        parts.push(content);
    }

    let version = parts.join("\n").trim().to_string();
    if version.is_empty() {
        return Err(format!("{} is empty", files.join(", ")));
    }
    Ok(version)
}

fn str_or_array(value: &TomlValue) -> Vec<String> {
    match value {
        TomlValue::Array(items) => items
            .iter()
            .filter_map(TomlValue::as_str)
            .map(str::to_string)
            .collect(),
        other => other.as_str().map(str::to_string).into_iter().collect(),
    }
}

fn hatchling(project: &Project, doc: &TomlDocument) -> Resolved {
    let source = doc
        .get_str(&["tool", "hatch", "version", "source"])
        .unwrap_or("regex");
    if source != "regex" {
        return Err(format!("hatch version source `{source}` is not supported"));
    }

    let Some(path) = doc.get_str(&["tool", "hatch", "version", "path"]) else {
        return Err("[tool.hatch.version] has no path".to_string());
    };
    let content = project
        .read(path)?
        .ok_or_else(|| format!("{path} not found"))?;

    let version = match doc.get_str(&["tool", "hatch", "version", "pattern"]) {
        Some(pattern) => find_with_pattern(&content, pattern)
            .map_err(|e| format!("[tool.hatch.version] pattern: {e}"))?,
        // hatch's default pattern matches an optional leading `v`
        None => find_assignment(&content, "__version__")
            .or_else(|| find_assignment(&content, "VERSION"))
            .map(|v| match v.strip_prefix(['v', 'V']) {
                Some(rest) if !rest.is_empty() => rest.to_string(),
                _ => v,
            }),
    };

    version
        .map(|v| (v, "hatch-version-path"))
        .ok_or_else(|| format!("no version found in {path}"))
}

fn flit(project: &Project, doc: &TomlDocument) -> Resolved {
    let module = doc
        .get_str(&["tool", "flit", "module", "name"])
        .map(str::to_string)
        .or_else(|| {
            doc.get_str(&["project", "name"])
                .map(|name| name.replace(['-', '.'], "_"))
        })
        .ok_or_else(|| "cannot tell which module flit reads the version from".to_string())?;
    let module_path = module.replace('.', "/");

    for candidate in [
        format!("{module_path}/__init__.py"),
        format!("{module_path}.py"),
        format!("src/{module_path}/__init__.py"),
        format!("src/{module_path}.py"),
    ] {
        let Some(content) = project.read(&candidate)? else {
            continue;
        };
        return find_assignment(&content, "__version__")
            .map(|v| (v, "flit-module-scan"))
            .ok_or_else(|| format!("{candidate} has no __version__ string"));
    }

    Err(format!("module `{module}` not found"))
}

fn pdm(project: &Project, doc: &TomlDocument) -> Resolved {
    match doc.get_str(&["tool", "pdm", "version", "source"]) {
        Some("file") => {
            let Some(path) = doc.get_str(&["tool", "pdm", "version", "path"]) else {
                return Err("[tool.pdm.version] has no path".to_string());
            };
            let content = project
                .read(path)?
                .ok_or_else(|| format!("{path} not found"))?;
            find_version(&content)
                .map(|v| (v, "pdm-version-file"))
                .ok_or_else(|| format!("no version found in {path}"))
        }
        Some("call") => Err("pdm version source `call` requires running project code".to_string()),
        Some(other) => Err(format!("pdm version source `{other}` is not supported")),
        None => Err("[tool.pdm.version] has no source".to_string()),
    }
}

fn poetry(doc: &TomlDocument) -> Resolved {
    // poetry-core 2 keeps the version in [tool.poetry] when [project] lists it as dynamic
    match doc.get_str(&["tool", "poetry", "version"]).map(Declaration::from_value) {
        Some(Declaration::Static(version)) => Ok((version, "poetry-tool-table")),
        _ => Err("[tool.poetry] has no version".to_string()),
    }
}

fn maturin(project: &Project, doc: &TomlDocument) -> Resolved {
    let manifest = doc
        .get_str(&["tool", "maturin", "manifest-path"])
        .unwrap_or(CARGO_TOML);
    let content = project
        .read(manifest)?
        .ok_or_else(|| format!("{manifest} not found"))?;

    match CargoTomlParser::new().parse(&content) {
        Ok(Declaration::Static(version)) => from_semver(&version).map(|v| (v, "cargo-manifest")),
        Ok(Declaration::Dynamic(reason)) => Err(reason),
        Ok(Declaration::Absent) => Err(format!("{manifest} has no [package].version")),
        Err(e) => Err(format!("{manifest}: {e}")),
    }
}

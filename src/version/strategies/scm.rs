//! SCM strategy
//!
//! Sources, in order:
//! 1. `git describe --tags` of the repository containing the project
//! 2. `.git_archival.txt` left behind by `git archive`
//! 3. A version file written by an SCM plugin during a previous build
//! 4. PKG-INFO of an unpacked sdist
//!
//! Tag distances follow the setuptools-scm "guess-next-dev" scheme, see
//! [`guess_next_dev`].

use tracing::debug;

use crate::config::{ConfidenceConfig, ResolverConfig};
use crate::parser::pkg_info::{PKG_INFO, PkgInfoParser};
use crate::parser::python_source::find_version;
use crate::parser::toml_document::TomlDocument;
use crate::parser::traits::Parser;
use crate::parser::types::Declaration;
use crate::version::backend::DeclaredBackend;
use crate::version::git::{GitDescription, GitReader};
use crate::version::pep440::{guess_next_dev, parse_tag};
use crate::version::project::Project;
use crate::version::types::{VersionInfo, VersionSource};

pub const GIT_ARCHIVAL: &str = ".git_archival.txt";

/// pyproject.toml keys naming the file an SCM plugin writes the version to
const VERSION_FILE_KEYS: [&[&str]; 4] = [
    &["tool", "setuptools_scm", "version_file"],
    &["tool", "setuptools_scm", "write_to"],
    &["tool", "hatch", "build", "hooks", "vcs", "version-file"],
    &["tool", "pdm", "version", "write_to"],
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Found {
    version: String,
    method: &'static str,
    confidence: u8,
}

pub fn detect(
    project: &Project,
    config: &ResolverConfig,
    git: &dyn GitReader,
) -> Result<VersionInfo, String> {
    let mut notes = Vec::new();
    let pyproject = project.pyproject().unwrap_or_else(|e| {
        notes.push(e);
        None
    });

    let found = from_git(project, config, git)
        .or_else(|e| {
            notes.push(e);
            from_archival(project, config)
        })
        .or_else(|e| {
            notes.push(e);
            from_version_file(project, pyproject.as_ref(), &config.confidence)
        })
        .or_else(|e| {
            notes.push(e);
            from_pkg_info(project, &config.confidence)
        });

    match found {
        Ok(found) => {
            debug!("SCM version {} via {}", found.version, found.method);
            Ok(VersionInfo {
                version: found.version,
                source: VersionSource::ScmDerived,
                method: found.method.to_string(),
                is_dynamic: true,
                build_backend: DeclaredBackend::detect(project, pyproject.as_ref())
                    .map(|backend| backend.name),
                confidence: found.confidence,
            })
        }
        Err(e) => {
            notes.push(e);
            Err(notes.join("; "))
        }
    }
}

fn from_git(
    project: &Project,
    config: &ResolverConfig,
    git: &dyn GitReader,
) -> Result<Found, String> {
    if !project.exists() {
        return Err(format!("{} does not exist", project.root().display()));
    }

    match git.describe(project.root(), config.scm.search_parent_directories)? {
        Some(description) => from_description(&description, config),
        None => Err("not a git repository".to_string()),
    }
}

/// Turn a describe result into a version and rate it
fn from_description(
    description: &GitDescription,
    config: &ResolverConfig,
) -> Result<Found, String> {
    let tag = parse_tag(&description.tag, &config.scm.tag_prefix)
        .ok_or_else(|| format!("tag `{}` is not a PEP 440 version", description.tag))?;

    let version = guess_next_dev(
        &tag,
        description.distance,
        description.short_sha.as_deref(),
        description.dirty,
    )
    .ok_or_else(|| format!("cannot derive a version from tag `{}`", description.tag))?;

    let confidence = &config.confidence;
    let (method, confidence) = if description.dirty {
        ("tag-distance", confidence.dirty)
    } else if description.distance == 0 {
        ("exact-tag", confidence.exact_tag)
    } else {
        ("tag-distance", confidence.tag_distance)
    };

    Ok(Found {
        version,
        method,
        confidence,
    })
}

fn from_archival(project: &Project, config: &ResolverConfig) -> Result<Found, String> {
    let content = project
        .read(GIT_ARCHIVAL)?
        .ok_or_else(|| format!("{GIT_ARCHIVAL} not found"))?;

    if let Some(describe) = archival_field(&content, "describe-name") {
        if describe.contains("$Format") {
            return Err(format!("{GIT_ARCHIVAL} was not expanded by git archive"));
        }
        let description = GitDescription::parse(describe)
            .ok_or_else(|| format!("{GIT_ARCHIVAL} has an empty describe-name"))?;
        return from_description(&description, config).map(|found| Found {
            method: "git-archival",
            ..found
        });
    }

    // Older templates only carry the ref names: "HEAD -> main, tag: v1.0.0"
    let Some(refs) = archival_field(&content, "ref-names") else {
        return Err(format!("{GIT_ARCHIVAL} has no describe-name"));
    };
    if refs.contains("$Format") {
        return Err(format!("{GIT_ARCHIVAL} was not expanded by git archive"));
    }

    refs.split(',')
        .filter_map(|name| name.trim().strip_prefix("tag: "))
        .find_map(|tag| parse_tag(tag, &config.scm.tag_prefix))
        .map(|version| Found {
            version: version.to_string(),
            method: "git-archival",
            confidence: config.confidence.exact_tag,
        })
        .ok_or_else(|| format!("{GIT_ARCHIVAL} names no version tag"))
}

fn archival_field<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == name).then(|| value.trim())
    })
}

fn from_version_file(
    project: &Project,
    pyproject: Option<&TomlDocument>,
    confidence: &ConfidenceConfig,
) -> Result<Found, String> {
    let files: Vec<&str> = pyproject
        .map(|doc| {
            VERSION_FILE_KEYS
                .iter()
                .filter_map(|key| doc.get_str(key))
                .collect()
        })
        .unwrap_or_default();

    if files.is_empty() {
        return Err("no SCM version file configured".to_string());
    }

    for file in &files {
        for candidate in [file.to_string(), format!("src/{file}")] {
            let Some(content) = project.read(&candidate)? else {
                continue;
            };

            let version = if candidate.ends_with(".py") {
                find_version(&content)
            } else {
                content
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(str::to_string)
            };

            return version
                .map(|version| Found {
                    version,
                    method: "scm-version-file",
                    confidence: confidence.scm_version_file,
                })
                .ok_or_else(|| format!("{candidate} holds no version"));
        }
    }

    Err(format!("{} not found", files.join(", ")))
}

fn from_pkg_info(project: &Project, confidence: &ConfidenceConfig) -> Result<Found, String> {
    let content = project
        .read(PKG_INFO)?
        .ok_or_else(|| format!("{PKG_INFO} not found"))?;

    match PkgInfoParser::new().parse(&content) {
        Ok(Declaration::Static(version)) => Ok(Found {
            version,
            method: "pkg-info-fallback",
            confidence: confidence.scm_version_file,
        }),
        Ok(_) => Err(format!("{PKG_INFO} has no Version header")),
        Err(e) => Err(format!("{PKG_INFO}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::git::MockGitReader;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn project_with(files: &[(&str, &str)]) -> (TempDir, Project) {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in files {
            write(temp_dir.path(), name, content);
        }
        let project = Project::open(temp_dir.path()).unwrap();
        (temp_dir, project)
    }

    fn describing(tag: &str, distance: u32, dirty: bool) -> MockGitReader {
        let description = GitDescription {
            tag: tag.to_string(),
            distance,
            short_sha: Some("abc1234".to_string()),
            dirty,
        };
        let mut git = MockGitReader::new();
        git.expect_describe()
            .returning(move |_, _| Ok(Some(description.clone())));
        git
    }

    fn no_repository() -> MockGitReader {
        let mut git = MockGitReader::new();
        git.expect_describe().returning(|_, _| Ok(None));
        git
    }

    #[test]
    fn exact_tag_keeps_tag_version() {
        let (_temp_dir, project) = project_with(&[]);
        let git = describing("v1.2.0", 0, false);

        let info = detect(&project, &ResolverConfig::default(), &git).unwrap();
        assert_eq!(info.version, "1.2.0");
        assert_eq!(info.source, VersionSource::ScmDerived);
        assert_eq!(info.method, "exact-tag");
        assert_eq!(info.confidence, 75);
        assert!(info.is_dynamic);
        assert_eq!(info.build_backend, None);
    }

    #[test]
    fn distance_uses_guess_next_dev() {
        let (_temp_dir, project) = project_with(&[]);
        let git = describing("v1.2.0", 3, false);

        let info = detect(&project, &ResolverConfig::default(), &git).unwrap();
        assert_eq!(info.version, "1.2.1.dev3+gabc1234");
        assert_eq!(info.method, "tag-distance");
        assert_eq!(info.confidence, 65);
    }

    #[test]
    fn distance_from_post_release_bumps_post_number() {
        let (_temp_dir, project) = project_with(&[]);
        let git = describing("v1.0.post1", 2, false);

        let info = detect(&project, &ResolverConfig::default(), &git).unwrap();
        assert_eq!(info.version, "1.0.post2.dev2+gabc1234");
    }

    #[test]
    fn release_segment_at_numeric_limit_is_a_diagnostic() {
        let (_temp_dir, project) = project_with(&[]);
        let git = describing("18446744073709551615", 1, false);

        let error = detect(&project, &ResolverConfig::default(), &git).unwrap_err();
        assert!(error.contains("cannot derive a version from tag `18446744073709551615`"));
    }

    #[test]
    fn dirty_tree_lowers_confidence() {
        let (_temp_dir, project) = project_with(&[]);
        let git = describing("v1.2.0", 0, true);

        let info = detect(&project, &ResolverConfig::default(), &git).unwrap();
        assert_eq!(info.version, "1.2.1.dev0+gabc1234.dirty");
        assert_eq!(info.method, "tag-distance");
        assert_eq!(info.confidence, 60);
    }

    #[test]
    fn tag_prefix_is_configurable() {
        let (_temp_dir, project) = project_with(&[]);
        let git = describing("release-2.0", 0, false);
        let mut config = ResolverConfig::default();
        config.scm.tag_prefix = "release-".to_string();

        let info = detect(&project, &config, &git).unwrap();
        assert_eq!(info.version, "2.0");
    }

    #[test]
    fn search_parent_directories_is_passed_to_reader() {
        let (_temp_dir, project) = project_with(&[]);
        let mut config = ResolverConfig::default();
        config.scm.search_parent_directories = false;

        let mut git = MockGitReader::new();
        git.expect_describe()
            .withf(|_, search_parents| !*search_parents)
            .times(1)
            .returning(|_, _| Ok(None));

        assert!(detect(&project, &config, &git).is_err());
    }

    #[test]
    fn missing_root_skips_git() {
        let temp_dir = TempDir::new().unwrap();
        let project = Project::open(&temp_dir.path().join("missing")).unwrap();
        let mut git = MockGitReader::new();
        git.expect_describe().times(0);

        let error = detect(&project, &ResolverConfig::default(), &git).unwrap_err();
        assert!(error.contains("does not exist"), "{error}");
        assert!(error.contains(".git_archival.txt not found"), "{error}");
    }

    #[test]
    fn non_version_tag_falls_through() {
        let (_temp_dir, project) = project_with(&[
            (
                "pyproject.toml",
                "[tool.setuptools_scm]\nversion_file = \"demo/_version.py\"\n",
            ),
            (
                "demo/_version.py",
                "__version__ = version = '0.4.0.dev2+g1234567'\n",
            ),
        ]);
        let git = describing("nightly", 0, false);

        let info = detect(&project, &ResolverConfig::default(), &git).unwrap();
        assert_eq!(info.version, "0.4.0.dev2+g1234567");
        assert_eq!(info.method, "scm-version-file");
        assert_eq!(info.confidence, 70);
    }

    #[test]
    fn archival_describe_name_is_used() {
        let (_temp_dir, project) = project_with(&[(
            ".git_archival.txt",
            "node: 0123456789abcdef\nnode-date: 2024-01-01T00:00:00+00:00\ndescribe-name: v3.1.0-4-g0123456\nref-names: HEAD -> main\n",
        )]);

        let info = detect(&project, &ResolverConfig::default(), &no_repository()).unwrap();
        assert_eq!(info.version, "3.1.1.dev4+g0123456");
        assert_eq!(info.method, "git-archival");
        assert_eq!(info.confidence, 65);
    }

    #[test]
    fn archival_ref_names_tag_is_used() {
        let (_temp_dir, project) = project_with(&[(
            ".git_archival.txt",
            "node: 0123456789abcdef\nref-names: HEAD -> main, tag: v2.5.0, origin/main\n",
        )]);

        let info = detect(&project, &ResolverConfig::default(), &no_repository()).unwrap();
        assert_eq!(info.version, "2.5.0");
        assert_eq!(info.method, "git-archival");
        assert_eq!(info.confidence, 75);
    }

    #[test]
    fn unexpanded_archival_is_rejected() {
        let (_temp_dir, project) = project_with(&[(
            ".git_archival.txt",
            "node: $Format:%H$\ndescribe-name: $Format:%(describe:tags=true)$\n",
        )]);

        let error = detect(&project, &ResolverConfig::default(), &no_repository()).unwrap_err();
        assert!(error.contains("was not expanded by git archive"), "{error}");
    }

    #[test]
    fn plain_text_version_file_is_read() {
        let (_temp_dir, project) = project_with(&[
            (
                "pyproject.toml",
                "[tool.hatch.build.hooks.vcs]\nversion-file = \"demo/VERSION\"\n",
            ),
            ("src/demo/VERSION", "\n1.0.0.dev1\n"),
        ]);

        let info = detect(&project, &ResolverConfig::default(), &no_repository()).unwrap();
        assert_eq!(info.version, "1.0.0.dev1");
        assert_eq!(info.method, "scm-version-file");
    }

    #[test]
    fn pkg_info_is_the_last_resort() {
        let (_temp_dir, project) = project_with(&[(
            "PKG-INFO",
            "Metadata-Version: 2.1\nName: demo\nVersion: 0.8.3\n",
        )]);

        let info = detect(&project, &ResolverConfig::default(), &no_repository()).unwrap();
        assert_eq!(info.version, "0.8.3");
        assert_eq!(info.method, "pkg-info-fallback");
        assert_eq!(info.confidence, 70);
    }

    #[test]
    fn failure_lists_every_source() {
        let (_temp_dir, project) = project_with(&[]);

        let error = detect(&project, &ResolverConfig::default(), &no_repository()).unwrap_err();
        assert_eq!(
            error,
            "not a git repository; .git_archival.txt not found; no SCM version file configured; PKG-INFO not found"
        );
    }

    #[test]
    fn reader_errors_become_notes() {
        let (_temp_dir, project) = project_with(&[]);
        let mut git = MockGitReader::new();
        git.expect_describe()
            .returning(|_, _| Err("git describe failed: no tags".to_string()));

        let error = detect(&project, &ResolverConfig::default(), &git).unwrap_err();
        assert!(error.starts_with("git describe failed: no tags; "), "{error}");
    }
}

//! PEP 440 helpers for versions that are not written down verbatim
//!
//! - SCM tags are parsed after stripping a configurable prefix (`v1.2.0`)
//! - commits after a tag get a setuptools-scm style "guess-next-dev" version
//! - Cargo (SemVer) versions are converted for maturin projects

use std::str::FromStr;

use pep508_rs::pep440_rs::{Prerelease, Version};

/// Parse a tag name as a PEP 440 version, stripping `prefix` if present
pub fn parse_tag(tag: &str, prefix: &str) -> Option<Version> {
    let tag = tag.trim();
    let candidate = if prefix.is_empty() {
        tag
    } else {
        tag.strip_prefix(prefix).unwrap_or(tag)
    };
    Version::from_str(candidate).ok()
}

/// Version of a commit `distance` commits past `tag`.
///
/// Clean checkouts of the tagged commit keep the tag version. Anything else
/// moves to the next version and appends a dev segment plus local commit
/// metadata:
///
/// - `1.2.0`, 3 commits, `abc1234` -> `1.2.1.dev3+gabc1234`
/// - `2.0rc1`, 2 commits -> `2.0rc2.dev2+g...`
/// - `1.0.post1`, 2 commits -> `1.0.post2.dev2+g...`
/// - `1.0.dev3`, 2 commits -> `1.0.dev2+g...`
/// - `1.2.0`, 0 commits, dirty -> `1.2.1.dev0+gabc1234.dirty`
///
/// Returns `None` when the next version cannot be represented.
pub fn guess_next_dev(
    tag: &Version,
    distance: u32,
    short_sha: Option<&str>,
    dirty: bool,
) -> Option<String> {
    if distance == 0 && !dirty {
        return Some(tag.to_string());
    }

    let base = next_version(tag.clone().without_local())?;

    let mut local = Vec::new();
    if let Some(sha) = short_sha.filter(|sha| !sha.is_empty()) {
        local.push(format!("g{sha}"));
    }
    if dirty {
        local.push("dirty".to_string());
    }

    let mut candidate = format!("{base}.dev{distance}");
    if !local.is_empty() {
        candidate.push('+');
        candidate.push_str(&local.join("."));
    }

    Version::from_str(&candidate).ok().map(|v| v.to_string())
}

/// The release a dev build of `tag` leads up to
///
/// A dev tag already names its release. Otherwise the innermost number is
/// bumped: post, then pre-release, then the last release segment.
fn next_version(tag: Version) -> Option<Version> {
    if tag.dev().is_some() {
        return Some(tag.with_dev(None));
    }
    if let Some(post) = tag.post() {
        return Some(tag.with_post(Some(post.checked_add(1)?)));
    }
    if let Some(pre) = tag.pre() {
        let number = pre.number.checked_add(1)?;
        return Some(tag.with_pre(Some(Prerelease { number, ..pre })));
    }

    let mut release = tag.release().to_vec();
    let last = release.last_mut()?;
    *last = last.checked_add(1)?;
    Some(tag.with_release(release))
}

/// Convert a Cargo (SemVer) version to its PEP 440 spelling
pub fn from_semver(version: &str) -> Result<String, String> {
    let parsed = semver::Version::parse(version.trim())
        .map_err(|e| format!("`{version}` is not a SemVer version: {e}"))?;

    let mut candidate = format!("{}.{}.{}", parsed.major, parsed.minor, parsed.patch);
    if !parsed.pre.is_empty() {
        candidate.push('-');
        candidate.push_str(parsed.pre.as_str());
    }
    if !parsed.build.is_empty() {
        candidate.push('+');
        candidate.push_str(parsed.build.as_str());
    }

    Version::from_str(&candidate)
        .map(|v| v.to_string())
        .map_err(|e| format!("`{version}` has no PEP 440 equivalent: {e}"))
}

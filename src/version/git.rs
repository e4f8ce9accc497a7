//! Read-only access to git metadata
//!
//! Describes HEAD against the repository tags using libgit2, without
//! spawning a `git` process.

use std::path::Path;
use std::sync::LazyLock;

use git2::{DescribeFormatOptions, DescribeOptions, ErrorCode, Repository};
#[cfg(test)]
use mockall::automock;
use regex::Regex;
use tracing::debug;

/// Matches `<tag>-<distance>-g<sha>`
static DESCRIBE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-(\d+)-g([0-9a-fA-F]+)$").unwrap());

/// Result of describing HEAD, equivalent to `git describe --tags --long --dirty`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitDescription {
    /// Nearest reachable tag
    pub tag: String,
    /// Number of commits between the tag and HEAD
    pub distance: u32,
    /// Abbreviated commit id of HEAD
    pub short_sha: Option<String>,
    /// Whether the working tree has uncommitted changes
    pub dirty: bool,
}

impl GitDescription {
    /// Parse `git describe` output.
    ///
    /// Accepts the long form (`v1.2.0-3-gabc1234`, optionally `-dirty`) and a
    /// bare tag name, which means HEAD is the tagged commit.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (text, dirty) = match text.strip_suffix("-dirty") {
            Some(stripped) => (stripped, true),
            None => (text, false),
        };

        if text.is_empty() {
            return None;
        }

        if let Some(caps) = DESCRIBE_RE.captures(text) {
            return Some(Self {
                tag: caps[1].to_string(),
                distance: caps[2].parse().ok()?,
                short_sha: Some(caps[3].to_ascii_lowercase()),
                dirty,
            });
        }

        Some(Self {
            tag: text.to_string(),
            distance: 0,
            short_sha: None,
            dirty,
        })
    }
}

/// Source of git descriptions
#[cfg_attr(test, automock)]
pub trait GitReader: Send + Sync {
    /// Describe HEAD of the repository containing `root`.
    ///
    /// Returns `Ok(None)` when `root` is not inside a repository.
    fn describe(
        &self,
        root: &Path,
        search_parents: bool,
    ) -> Result<Option<GitDescription>, String>;
}

/// libgit2 backed reader
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Reader;

impl GitReader for Git2Reader {
    fn describe(
        &self,
        root: &Path,
        search_parents: bool,
    ) -> Result<Option<GitDescription>, String> {
        let opened = if search_parents {
            Repository::discover(root)
        } else {
            Repository::open(root)
        };

        let repo = match opened {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!("No git repository at {}", root.display());
                return Ok(None);
            }
            Err(e) => return Err(format!("failed to open git repository: {}", e.message())),
        };

        let mut describe_options = DescribeOptions::new();
        describe_options.describe_tags();

        let describe = repo
            .describe(&describe_options)
            .map_err(|e| format!("git describe failed: {}", e.message()))?;

        let mut format_options = DescribeFormatOptions::new();
        format_options
            .always_use_long_format(true)
            .dirty_suffix("-dirty");

        let text = describe
            .format(Some(&format_options))
            .map_err(|e| format!("git describe failed: {}", e.message()))?;

        debug!("git describe for {}: {}", root.display(), text);

        GitDescription::parse(&text)
            .map(Some)
            .ok_or_else(|| format!("unexpected git describe output `{text}`"))
    }
}

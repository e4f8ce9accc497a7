//! Version detection strategies
//!
//! Each strategy turns a project into either a resolved version or a
//! diagnostic explaining why it found nothing. The resolver runs them in
//! [`VersionSource::ALL`] order.

pub mod build_backend;
pub mod scm;
pub mod static_metadata;

use crate::config::ResolverConfig;
use crate::version::backend::DeclaredBackend;
use crate::version::git::GitReader;
use crate::version::project::Project;
use crate::version::types::{VersionInfo, VersionSource};

/// Run the strategy behind `source`
pub fn run(
    source: VersionSource,
    project: &Project,
    config: &ResolverConfig,
    git: &dyn GitReader,
) -> Result<VersionInfo, String> {
    match source {
        VersionSource::StaticMetadataFile => static_metadata::detect(project, config),
        VersionSource::BuildBackendDynamic => build_backend::detect(project, config),
        VersionSource::ScmDerived => scm::detect(project, config, git),
    }
}

/// Backend name reported alongside a result; unreadable metadata means none
fn backend_name(project: &Project) -> Option<String> {
    let pyproject = project.pyproject().ok().flatten();
    DeclaredBackend::detect(project, pyproject.as_ref()).map(|backend| backend.name)
}

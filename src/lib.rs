pub mod config;
pub mod parser;
pub mod version;

pub use version::error::DetectError;
pub use version::resolver::{VersionResolver, detect_package_version, get_package_version};
pub use version::types::{DetectionResult, VersionInfo, VersionSource};

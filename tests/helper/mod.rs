//! Shared test utilities

pub mod git;
pub mod project;

#[allow(unused_imports)]
pub use git::*;
#[allow(unused_imports)]
pub use project::*;

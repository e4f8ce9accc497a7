//! Version detection layer
//!
//! Works out the version of a Python project from the files in its root and,
//! failing that, from its git history.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────────────────────────────────┐
//! │  Resolver   │────▶│                 Strategies                  │
//! │ (ordering)  │     │ static metadata ▶ build backend ▶ SCM       │
//! └─────────────┘     └─────────────────────────────────────────────┘
//!        │                  │                 │              │
//!        ▼                  ▼                 ▼              ▼
//! ┌─────────────┐     ┌───────────┐     ┌───────────┐  ┌───────────┐
//! │   Project   │     │  parser   │     │  Backend  │  │ GitReader │
//! │ (file view) │     │ (formats) │     │ (config)  │  │ (libgit2) │
//! └─────────────┘     └───────────┘     └───────────┘  └───────────┘
//! ```
//!
//! # Modules
//!
//! - [`resolver`]: Strategy ordering and the public entry points
//! - [`strategies`]: The three detection strategies
//! - [`backend`]: Build backend identification and SCM plugin delegation
//! - [`git`]: `git describe` through libgit2, behind a mockable trait
//! - [`pep440`]: Tag parsing, dev versions and SemVer conversion
//! - [`project`]: Read-only access to the project root
//! - [`error`]: Fatal error type
//! - [`types`]: `VersionInfo`, `DetectionResult` and `VersionSource`

pub mod backend;
pub mod error;
pub mod git;
pub mod pep440;
pub mod project;
pub mod resolver;
pub mod strategies;
pub mod types;

//! Parser layer
//! - traits.rs: Parser trait definition
//! - types.rs: Common types (Declaration)
//! - toml_document.rs: tree-sitter backed TOML reader
//! - pyproject_toml.rs: pyproject.toml parsers ([project], [tool.poetry])
//! - setup_cfg.rs: setup.cfg parser
//! - setup_py.rs: setup.py keyword scanner
//! - pkg_info.rs: PKG-INFO parser
//! - cargo_toml.rs: Cargo.toml parser
//! - python_source.rs: `__version__` assignment scanner

pub mod cargo_toml;
pub mod pkg_info;
pub mod pyproject_toml;
pub mod python_source;
pub mod setup_cfg;
pub mod setup_py;
pub mod toml_document;
pub mod traits;
pub mod types;

pub use cargo_toml::CargoTomlParser;
pub use pkg_info::PkgInfoParser;
pub use pyproject_toml::{PoetryParser, PyprojectTomlParser};
pub use setup_cfg::{SetupCfg, SetupCfgParser};
pub use setup_py::SetupPyParser;
pub use toml_document::{TomlDocument, TomlValue};
pub use traits::{ParseError, Parser};
pub use types::Declaration;

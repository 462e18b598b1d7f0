//! rpgs-compiler
//!
//! This crate implements:
//!  1) The type grammar for stat declarations (`parse_type`),
//!  2) The `stats.rpgs` compiler (`parse_stats` / `compile_stats`),
//!  3) Registry assembly across resource kinds (`build_registry`),
//!  4) The recursive instance validator (`validate`) and its error trails,
//!  5) Error types (`RpgsError`).

pub mod error;
pub mod utils;
pub mod parser;
pub mod registry;
pub mod trail;
pub mod validator;

pub use error::RpgsError;
pub use parser::{compile_stats, parse_stats, parse_type};
pub use registry::build_registry;
pub use trail::Trail;
pub use validator::{check_value, validate, ErrorKind, LocatedError, Validator};

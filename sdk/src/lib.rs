//! rpgs
//!
//! Runtime support for working with a repository of resource instances.
//!
//! - `codec`: gzip/BOM-transparent reading and canonical writing of instance files
//! - `layout`: discovery of `stats.rpgs` schemas and instance files under `systems/`
//! - `report`: validating or formatting a whole set of files

pub mod codec;
pub mod layout;
pub mod report;

pub use codec::{decode_document, encode_canonical, format_file, read_document, Decoded};
pub use layout::{instance_files, load_registry, SystemLayout};
pub use report::{format_files, validate_files, FileError, FormatReport, ValidationReport};

pub use rpgs_compiler::{build_registry, validate, ErrorKind, LocatedError, RpgsError, Trail};
pub use rpgs_schema::{ResourceSchema, SchemaRegistry, StatKind, StatType};

pub mod error {
    pub use rpgs_compiler::error::RpgsError;
}

pub mod schema {
    pub use rpgs_schema::*;
}

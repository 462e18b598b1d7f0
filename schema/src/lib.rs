//! The typed model behind `stats.rpgs` schema files.
//!
//! A resource kind's schema maps statistic names to [`StatType`]s, and a
//! [`SchemaRegistry`] maps resource kinds to their schemas. This crate only
//! holds the data; `rpgs-compiler` builds it from source text and checks
//! instance documents against it.
//!
//! ```
//! use rpgs_schema::*;
//!
//! let orc: ResourceSchema = vec![
//!     ("hp",     StatType::new(StatKind::Integer)),
//!     ("weapon", StatType::resource(Some("sword".to_owned()))),
//! ].into_iter().collect();
//! let registry: SchemaRegistry = vec![("orc", orc)].into_iter().collect();
//!
//! let weapon = registry.get("orc").and_then(|s| s.get("weapon")).unwrap();
//! assert_eq!(weapon.to_string(), "resource<sword>");
//! ```

pub mod registry;
pub mod stat;

pub use registry::*;
pub use stat::*;

/// Statistic names that carry metadata and are never looked up in a schema.
pub const META_STATS: [&str; 2] = ["id", "updated_at"];

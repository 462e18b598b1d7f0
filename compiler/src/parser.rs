use crate::{
    error::RpgsError,
    utils::strip_bom,
};
use lazy_static::lazy_static;
use regex::Regex;
use rpgs_schema::{ResourceSchema, StatKind, StatType};

lazy_static! {
    static ref BASE_STAT: Regex = Regex::new(r"^base\s+(\S+)\s+([A-Za-z0-9_]+)\s*\(").unwrap();
}

const ARRAY_SUFFIX:    &str = "[]";
const RESOURCE_OPEN:   &str = "resource<";
const RESOURCE_CLOSE:  &str = ">";
const BASE_KEYWORD:    &str = "base ";

/// Parses one type token such as `integer`, `string[]` or `resource<weapon>`.
///
/// Never fails: tokens the grammar does not know become [`StatKind::Unknown`].
/// An empty constraint (`resource<>`) is read as an unconstrained resource.
pub fn parse_type(token: &str) -> StatType {
    let (core, is_array) = match token.strip_suffix(ARRAY_SUFFIX) {
        Some(core) => (core, true),
        None       => (token, false),
    };

    let scalar = if let Some(inner) = core
        .strip_prefix(RESOURCE_OPEN)
        .and_then(|rest| rest.strip_suffix(RESOURCE_CLOSE))
    {
        let constraint = Some(inner).filter(|k| !k.is_empty()).map(str::to_owned);
        StatType::resource(constraint)
    } else {
        let kind = match core {
            "resource" => StatKind::Resource,
            "string"   => StatKind::String,
            "bool"     => StatKind::Bool,
            "integer"  => StatKind::Integer,
            "photo"    => StatKind::Photo,
            _          => StatKind::Unknown,
        };
        StatType::new(kind)
    };

    if is_array {
        scalar.into_array()
    } else {
        scalar
    }
}

/// Scans `stats.rpgs` text for `base <type> <name>(...)` declarations.
///
/// Any other line is ignored, including `base` lines that do not fit the
/// declaration pattern. Repeated names keep the last declaration.
pub fn parse_stats(text: &str) -> ResourceSchema {
    let mut schema = ResourceSchema::new();
    for line in text.lines() {
        let stripped = line.trim();
        if !stripped.starts_with(BASE_KEYWORD) {
            continue;
        }
        if let Some(caps) = BASE_STAT.captures(stripped) {
            schema.declare(&caps[2], parse_type(&caps[1]));
        }
    }
    schema
}

/// Decodes raw `stats.rpgs` bytes and compiles them.
///
/// Returns `Err(RpgsError::SchemaUnreadable)` when the bytes are not UTF-8.
pub fn compile_stats(kind: &str, source: &[u8]) -> Result<ResourceSchema, RpgsError> {
    let text = std::str::from_utf8(strip_bom(source)).map_err(|e| RpgsError::SchemaUnreadable {
        kind:   kind.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(parse_stats(text))
}

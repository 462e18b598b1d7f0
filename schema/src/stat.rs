use serde::{Serialize, Serializer};
use std::fmt;

/// The primitive shape a statistic value is declared with.
///
/// `Unknown` is produced for type tokens the grammar does not recognize. It
/// is a real variant rather than a fallback: values declared with it are
/// accepted without any check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    String,
    Bool,
    Integer,
    Photo,
    Resource,
    Unknown,
}

impl StatKind {
    /// The type token this kind is spelled with in a `stats.rpgs` file.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::String   => "string",
            StatKind::Bool     => "bool",
            StatKind::Integer  => "integer",
            StatKind::Photo    => "photo",
            StatKind::Resource => "resource",
            StatKind::Unknown  => "unknown",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The permitted shape of one statistic value.
///
/// A `StatType` never changes after construction. [`StatType::element_type`]
/// hands back a fresh descriptor with the array flag cleared.
///
/// ```
/// use rpgs_schema::{StatKind, StatType};
///
/// let weapons = StatType::resource(Some("weapon".to_owned())).into_array();
/// assert_eq!(weapons.to_string(), "resource<weapon>[]");
///
/// let weapon = weapons.element_type();
/// assert!(!weapon.is_array());
/// assert_eq!(weapon.kind(), StatKind::Resource);
/// assert_eq!(weapon.resource_kind(), Some("weapon"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatType {
    kind:          StatKind,
    is_array:      bool,
    resource_kind: Option<String>,
}

impl StatType {
    /// A scalar descriptor of the given kind. Use [`StatType::resource`] to
    /// attach a resource kind constraint.
    pub fn new(kind: StatKind) -> StatType {
        StatType { kind, is_array: false, resource_kind: None }
    }

    /// A scalar resource descriptor, optionally constrained to one resource kind.
    pub fn resource(resource_kind: Option<String>) -> StatType {
        StatType { kind: StatKind::Resource, is_array: false, resource_kind }
    }

    /// The same descriptor, declared as an array.
    pub fn into_array(self) -> StatType {
        StatType { is_array: true, ..self }
    }

    pub fn kind(&self) -> StatKind {
        self.kind
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The resource kind a nested resource must declare. Always `None` for
    /// non-resource kinds.
    pub fn resource_kind(&self) -> Option<&str> {
        self.resource_kind.as_deref()
    }

    /// The descriptor every element of an array value must satisfy.
    pub fn element_type(&self) -> StatType {
        StatType {
            kind:          self.kind,
            is_array:      false,
            resource_kind: self.resource_kind.clone(),
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.kind, &self.resource_kind) {
            (StatKind::Resource, Some(kind)) => write!(f, "resource<{}>", kind)?,
            (kind, _) => f.write_str(kind.as_str())?,
        }
        if self.is_array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl Serialize for StatType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

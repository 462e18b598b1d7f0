use crate::{
    trail::Trail,
    utils::{field_type_name, quote, type_name},
};
use rpgs_schema::{ResourceSchema, SchemaRegistry, StatKind, StatType, META_STATS};
use serde_json::{Map, Value};
use std::fmt;

/// The category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The document bytes could not be decoded at all.
    DecodeFailure,
    /// An object or array was required but something else was found.
    ShapeMismatch,
    /// A required field is absent or holds the wrong primitive.
    MissingField,
    /// A `resource_id` without a schema, or a stat its schema does not declare.
    UnknownIdentifier,
    /// A value does not match its declared type.
    TypeMismatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocatedError {
    pub kind:    ErrorKind,
    pub trail:   Trail,
    pub message: String,
}

impl LocatedError {
    pub fn new(kind: ErrorKind, trail: Trail, message: impl Into<String>) -> LocatedError {
        LocatedError { kind, trail, message: message.into() }
    }
}

impl fmt::Display for LocatedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.trail, self.message)
    }
}

/// Checks one top-level instance document against `registry`.
pub fn validate(document: &Value, registry: &SchemaRegistry) -> Vec<LocatedError> {
    let mut validator = Validator::new(registry);
    validator.validate_resource(document);
    validator.into_errors()
}

/// Checks a bare statistic value against its declared type.
pub fn check_value(value: &Value, stat_type: &StatType, registry: &SchemaRegistry) -> Vec<LocatedError> {
    let mut validator = Validator::new(registry);
    validator.check_value(value, stat_type);
    validator.into_errors()
}

/// Recursive walker that collects every error in a document.
///
/// `validate_resource` and `check_value` call each other: a stat declared as
/// a resource is validated as a full document, at any depth.
pub struct Validator<'a> {
    registry: &'a SchemaRegistry,
    trail:    Trail,
    errors:   Vec<LocatedError>,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Validator<'a> {
        Validator {
            registry,
            trail:  Trail::root(),
            errors: Vec::new(),
        }
    }

    pub fn into_errors(self) -> Vec<LocatedError> {
        self.errors
    }

    fn report(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(LocatedError::new(kind, self.trail.clone(), message));
    }

    fn report_at(&mut self, segment: impl Into<String>, kind: ErrorKind, message: impl Into<String>) {
        self.descend(segment, |v| v.report(kind, message));
    }

    fn descend<F>(&mut self, segment: impl Into<String>, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.trail.push(segment);
        f(self);
        self.trail.pop();
    }

    /// Validates a document (or a nested resource) at the current trail.
    pub fn validate_resource(&mut self, resource: &Value) {
        let object = match resource {
            Value::Object(object) => object,
            other => {
                self.report(
                    ErrorKind::ShapeMismatch,
                    format!("Expected object for resource, got {}", type_name(other)),
                );
                return;
            }
        };

        let rid = match object.get("resource_id") {
            Some(Value::String(rid)) if !rid.is_empty() => rid.as_str(),
            _ => {
                self.report(ErrorKind::MissingField, "Missing or invalid resource_id");
                return;
            }
        };

        let registry = self.registry;
        let schema = match registry.get(rid) {
            Some(schema) => schema,
            None => {
                self.report_at(
                    format!("resource_id={}", quote(rid)),
                    ErrorKind::UnknownIdentifier,
                    "Unknown resource_id (no stats.rpgs found)",
                );
                return;
            }
        };

        let label = resource_label(rid, object);
        match object.get("stats") {
            Some(Value::Object(stats)) => self.descend(label, |v| v.check_stats(schema, stats)),
            other => self.report_at(
                label,
                ErrorKind::MissingField,
                format!("Missing or invalid stats object, got {}", field_type_name(other)),
            ),
        }
    }

    fn check_stats(&mut self, schema: &ResourceSchema, stats: &Map<String, Value>) {
        for (name, entry) in stats {
            if META_STATS.contains(&name.as_str()) {
                continue;
            }

            let stat_type = match schema.get(name) {
                Some(stat_type) => stat_type,
                None => {
                    self.report_at(
                        format!("stats.{}", name),
                        ErrorKind::UnknownIdentifier,
                        "Unknown stat for this resource",
                    );
                    continue;
                }
            };

            let value = match entry {
                Value::Object(wrapper) => wrapper.get("value"),
                _ => None,
            };
            match value {
                Some(value) => {
                    self.descend(format!("stats.{}.value", name), |v| v.check_value(value, stat_type))
                }
                None => self.report_at(
                    format!("stats.{}", name),
                    ErrorKind::MissingField,
                    "Expected an object with a 'value' field",
                ),
            }
        }
    }

    /// Type-checks one value at the current trail. `null` satisfies every type.
    pub fn check_value(&mut self, value: &Value, stat_type: &StatType) {
        if value.is_null() {
            return;
        }

        if stat_type.is_array() {
            let items = match value {
                Value::Array(items) => items,
                other => {
                    self.report(
                        ErrorKind::ShapeMismatch,
                        format!("Expected array, got {}", type_name(other)),
                    );
                    return;
                }
            };
            let element = stat_type.element_type();
            for (index, item) in items.iter().enumerate() {
                // empty resource slot
                if item.is_null() && element.kind() == StatKind::Resource {
                    continue;
                }
                self.descend(format!("[{}]", index), |v| v.check_value(item, &element));
            }
            return;
        }

        match (stat_type.kind(), value) {
            (StatKind::Unknown, _) => {}

            (StatKind::String, Value::String(_))
            | (StatKind::Bool, Value::Bool(_))
            | (StatKind::Integer, Value::Number(_)) => {}

            (StatKind::String, other) => self.report(
                ErrorKind::TypeMismatch,
                format!("Expected string, got {}", type_name(other)),
            ),
            (StatKind::Bool, other) => self.report(
                ErrorKind::TypeMismatch,
                format!("Expected bool, got {}", type_name(other)),
            ),
            (StatKind::Integer, other) => self.report(
                ErrorKind::TypeMismatch,
                format!("Expected number, got {}", type_name(other)),
            ),

            (StatKind::Photo, Value::Object(photo)) => match photo.get("url") {
                Some(url) if !url.is_string() => self.report_at(
                    "url",
                    ErrorKind::TypeMismatch,
                    format!("Expected url string, got {}", type_name(url)),
                ),
                _ => {}
            },
            (StatKind::Photo, other) => self.report(
                ErrorKind::ShapeMismatch,
                format!("Expected photo object, got {}", type_name(other)),
            ),

            (StatKind::Resource, Value::Object(nested)) => {
                if let Some(expected) = stat_type.resource_kind() {
                    let actual = nested.get("resource_id");
                    if actual.and_then(Value::as_str) != Some(expected) {
                        self.report(
                            ErrorKind::TypeMismatch,
                            format!("Expected resource_id {}, got {}", quote(expected), describe(actual)),
                        );
                    }
                }
                self.validate_resource(value);
            }
            (StatKind::Resource, other) => self.report(
                ErrorKind::ShapeMismatch,
                format!("Expected resource object, got {}", type_name(other)),
            ),
        }
    }
}

/// Trail segment naming a resource, with its `stats.id` when it has one.
/// The id may be stored bare or wrapped like any other stat.
fn resource_label(rid: &str, object: &Map<String, Value>) -> String {
    let stat_id = match object.get("stats").and_then(|stats| stats.get("id")) {
        Some(Value::String(id)) => Some(id.as_str()),
        Some(Value::Object(wrapper)) => wrapper.get("value").and_then(Value::as_str),
        _ => None,
    }
    .filter(|id| !id.is_empty());
    match stat_id {
        Some(id) => format!("resource_id={} (id={})", quote(rid), quote(id)),
        None     => format!("resource_id={}", quote(rid)),
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => quote(s),
        Some(other)            => other.to_string(),
        None                   => "missing".to_owned(),
    }
}

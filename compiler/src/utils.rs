use serde_json::Value;

/// Byte-order mark some editors prepend to UTF-8 files.
pub const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

pub fn quote(text: &str) -> String {
    format!("'{}'", text)
}

pub fn strip_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(UTF8_BOM).unwrap_or(raw)
}

/// Name of a JSON value's shape, as used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

/// Like [`type_name`], but for a field that may be absent.
pub fn field_type_name(value: Option<&Value>) -> &'static str {
    value.map(type_name).unwrap_or("missing")
}

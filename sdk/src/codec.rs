//! Reading and canonical writing of resource instance files.
//!
//! Instance files are UTF-8 JSON, optionally behind a byte-order mark, and
//! optionally gzip-compressed. Canonical output is two-space indented JSON
//! with every non-printable-ASCII character escaped and a trailing newline,
//! so diffs stay readable and formatting twice changes nothing.

use flate2::{read::MultiGzDecoder, write::GzEncoder, Compression, GzBuilder};
use rpgs_compiler::{utils::strip_bom, RpgsError};
use serde::Serialize;
use serde_json::{
    ser::{Formatter, PrettyFormatter},
    Value,
};
use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A decoded instance document and whether it was stored compressed.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value:   Value,
    pub gzipped: bool,
}

pub fn is_gzip(raw: &[u8]) -> bool {
    raw.starts_with(&GZIP_MAGIC)
}

/// Decodes raw file bytes into a JSON value, unwrapping gzip and a UTF-8 BOM.
pub fn decode_document(raw: &[u8]) -> Result<Decoded, RpgsError> {
    let gzipped = is_gzip(raw);
    let inflated;
    let bytes = if gzipped {
        let mut buf = Vec::new();
        MultiGzDecoder::new(raw)
            .read_to_end(&mut buf)
            .map_err(|e| RpgsError::Decode(format!("invalid gzip stream: {}", e)))?;
        inflated = buf;
        inflated.as_slice()
    } else {
        raw
    };

    let value = serde_json::from_slice(strip_bom(bytes)).map_err(|e| RpgsError::Decode(e.to_string()))?;
    Ok(Decoded { value, gzipped })
}

pub fn read_document(path: &Path) -> Result<Decoded, RpgsError> {
    let raw = fs::read(path)?;
    decode_document(&raw)
}

/// Encodes `value` in canonical form, gzip-compressed with a zero timestamp
/// when `gzip` is set.
pub fn encode_canonical(value: &Value, gzip: bool) -> Result<Vec<u8>, RpgsError> {
    let mut text = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut text, AsciiPrettyFormatter::new());
    value.serialize(&mut ser).map_err(|e| RpgsError::Encode(e.to_string()))?;
    text.push(b'\n');

    if !gzip {
        return Ok(text);
    }
    let mut encoder: GzEncoder<Vec<u8>> = GzBuilder::new().mtime(0).write(Vec::new(), Compression::best());
    encoder.write_all(&text)?;
    Ok(encoder.finish()?)
}

/// Rewrites `path` in canonical form, keeping its compression. Returns whether
/// the file changed; identical bytes are never written back.
pub fn format_file(path: &Path) -> Result<bool, RpgsError> {
    let raw = fs::read(path)?;
    let decoded = decode_document(&raw)?;
    let output = encode_canonical(&decoded.value, decoded.gzipped)?;
    if output == raw {
        return Ok(false);
    }
    fs::write(path, &output).map_err(RpgsError::Write)?;
    tracing::debug!(path = %path.display(), gzipped = decoded.gzipped, "rewrote instance file");
    Ok(true)
}

/// `PrettyFormatter` with two-space indentation that escapes every character
/// outside printable ASCII as `\uXXXX`.
struct AsciiPrettyFormatter {
    inner: PrettyFormatter<'static>,
}

impl AsciiPrettyFormatter {
    fn new() -> Self {
        AsciiPrettyFormatter { inner: PrettyFormatter::with_indent(b"  ") }
    }
}

impl Formatter for AsciiPrettyFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

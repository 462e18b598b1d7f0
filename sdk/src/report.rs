use crate::{
    codec::{format_file, read_document},
    layout::display_path,
};
use rpgs_compiler::{validate, ErrorKind, LocatedError, RpgsError, Trail};
use rpgs_schema::SchemaRegistry;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// A validation error together with the file it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct FileError {
    pub file:  String,
    pub error: LocatedError,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.error)
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub errors:        Vec<FileError>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Decodes and validates every file. A file that cannot be decoded yields a
/// single `DecodeFailure` at the document root; the remaining files are
/// still checked.
pub fn validate_files(files: &[PathBuf], registry: &SchemaRegistry, repo_root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    for path in files {
        report.files_checked += 1;
        let file = display_path(path, repo_root);

        let errors = match read_document(path) {
            Ok(decoded) => validate(&decoded.value, registry),
            Err(e) => vec![LocatedError::new(ErrorKind::DecodeFailure, Trail::root(), decode_message(&e))],
        };
        if !errors.is_empty() {
            tracing::debug!(file = %file, errors = errors.len(), "instance file failed validation");
        }
        report.errors.extend(errors.into_iter().map(|error| FileError { file: file.clone(), error }));
    }

    report
}

#[derive(Debug, Default)]
pub struct FormatReport {
    pub files:   usize,
    pub changed: usize,
    pub errors:  Vec<String>,
}

/// Rewrites every file in canonical form.
pub fn format_files(files: &[PathBuf], repo_root: &Path) -> FormatReport {
    let mut report = FormatReport { files: files.len(), ..FormatReport::default() };

    for path in files {
        match format_file(path) {
            Ok(true) => report.changed += 1,
            Ok(false) => {}
            Err(e) => report.errors.push(format!("{}: {}", display_path(path, repo_root), decode_message(&e))),
        }
    }

    report
}

/// Read failures are reported as parse failures; everything else keeps its
/// own message.
fn decode_message(error: &RpgsError) -> String {
    match error {
        RpgsError::Io(e) => format!("Failed to parse JSON: {}", e),
        other => other.to_string(),
    }
}

use std::fmt;

/// Where in a document an error was found, as a stack of readable segments
/// such as `resource_id='orc'`, `stats.hp.value` or `[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trail {
    segments: Vec<String>,
}

impl Trail {
    pub const SEPARATOR: &'static str = " -> ";
    pub const ROOT:      &'static str = "<root>";

    /// The empty trail of a top-level document.
    pub fn root() -> Trail {
        Trail::default()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str(Trail::ROOT)
        } else {
            f.write_str(&self.segments.join(Trail::SEPARATOR))
        }
    }
}

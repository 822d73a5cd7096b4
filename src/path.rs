//! A dotted attribute path, e.g. `imported_dlls.imported_functions`.

use std::fmt;

/// A non-empty ordered sequence of attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Splits `raw` on `.`. Each segment is kept verbatim; case folding
    /// is the resolver's job, not the path's.
    pub fn parse(raw: &str) -> Self {
        Path(raw.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

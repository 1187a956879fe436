// Tue Jan 13 2026 - Alex

use std::fmt;

/// An identifier triple used by annotation rules to bind to one or more
/// functions: a C name, an optional canonicalized source path, and an
/// optional line number narrowing an ambiguous name further.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    name: String,
    path: Option<String>,
    line: Option<u32>,
}

impl Signature {
    pub fn new(name: String, path: Option<String>, line: Option<u32>) -> Self {
        Self { name, path, line }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "{}[{}:{}]", self.name, path, line),
            (Some(path), None) => write!(f, "{}[{}]", self.name, path),
            (None, _) => write!(f, "{}", self.name),
        }
    }
}

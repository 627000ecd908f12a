use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

/// Location in program source for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub filename: Rc<str>,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(filename: impl Into<Rc<str>>, line: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.filename, self.line)
    }
}

/// A non-fatal message tied to a source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn new(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: warning: {}", self.location, self.message)
    }
}

/// All error types for zawk
#[derive(Error, Debug)]
pub enum Error {
    #[error("{location}: {message}")]
    Lexer {
        message: String,
        location: SourceLocation,
    },

    #[error("can't open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no program source given")]
    NoProgram,

    #[error("runtime error: {message}")]
    Runtime { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    pub fn lexer(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Lexer {
            message: message.into(),
            location,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Source position of the error, when it has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Error::Lexer { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Result type alias for zawk operations
pub type Result<T> = std::result::Result<T, Error>;

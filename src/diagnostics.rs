//! Error type for the fallible edges of the matrix generator.
//!
//! The combinatorial core never fails: empty, trivial, and sentinel-only inputs
//! all produce well-defined outputs. Errors only arise where external
//! collaborators hand us files (option files, test-group tables) or where the
//! CLI writes its output. Every error is a `miette` diagnostic so the binary
//! can render it with source snippets and help text.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification, one per `MatrixError` variant family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Reading or writing a file failed.
    Io,
    /// A YAML or JSON document could not be decoded.
    Parse,
    /// A document decoded but its contents are unusable.
    Options,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Io => "Io",
            ErrorType::Parse => "Parse",
            ErrorType::Options => "Options",
        }
    }

    /// Stable diagnostic code shown by the CLI.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorType::Io => "polmatrix::io",
            ErrorType::Parse => "polmatrix::parse",
            ErrorType::Options => "polmatrix::options",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Byte range inside a decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Unified error type for everything outside the pure core.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("failed to {operation} '{}'", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        src: Option<SourceArc>,
        span: Option<Span>,
        help: Option<String>,
    },
    #[error("Options error: {message}")]
    Options {
        message: String,
        help: Option<String>,
    },
}

impl MatrixError {
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        MatrixError::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Builds a parse error from a `serde_yaml` failure, pointing at the offending byte.
    pub fn from_yaml(name: &str, content: &str, err: serde_yaml::Error) -> Self {
        let span = err.location().map(|loc| Span {
            start: loc.index(),
            end: loc.index() + 1,
        });
        MatrixError::Parse {
            message: err.to_string(),
            src: Some(Arc::new(NamedSource::new(name, content.to_string()))),
            span,
            help: Some("Check the YAML indentation and that lists use '- item' entries.".into()),
        }
    }

    /// Builds a parse error from a `serde_json` failure, pointing at the offending byte.
    pub fn from_json(name: &str, content: &str, err: serde_json::Error) -> Self {
        let span = offset_of(content, err.line(), err.column()).map(|start| Span {
            start,
            end: start + 1,
        });
        MatrixError::Parse {
            message: err.to_string(),
            src: Some(Arc::new(NamedSource::new(name, content.to_string()))),
            span,
            help: None,
        }
    }

    pub fn options(message: impl Into<String>, help: Option<String>) -> Self {
        MatrixError::Options {
            message: message.into(),
            help,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            MatrixError::Io { .. } => ErrorType::Io,
            MatrixError::Parse { .. } => ErrorType::Parse,
            MatrixError::Options { .. } => ErrorType::Options,
        }
    }
}

impl Diagnostic for MatrixError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.error_type().code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let help = match self {
            MatrixError::Io { .. } => None,
            MatrixError::Parse { help, .. } | MatrixError::Options { help, .. } => help.as_ref(),
        };
        help.map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            MatrixError::Parse { src: Some(src), .. } => Some(src.as_ref() as &dyn SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let MatrixError::Parse {
            span: Some(span),
            src: Some(src),
            ..
        } = self
        else {
            return None;
        };
        // serde may report the position one past the end of the document
        let limit = src.inner().len();
        if limit == 0 {
            return None;
        }
        let start = span.start.min(limit - 1);
        let len = span.end.saturating_sub(span.start).clamp(1, limit - start);
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some("here".to_string()),
            start,
            len,
        ))))
    }
}

/// Converts a 1-based line/column pair into a byte offset.
fn offset_of(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    for (idx, text) in content.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            return Some(offset + column.saturating_sub(1).min(text.len()));
        }
        offset += text.len();
    }
    None
}

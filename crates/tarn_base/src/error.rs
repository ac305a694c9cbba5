//! Located compiler errors and their renderable form.
//!
//! Every stage of the pipeline fails with a [`CompileError`]: a message plus
//! the [`Span`] of the offending source. The first error aborts the stage;
//! later stages are never run on a failed unit.
//!
//! A raw error only knows byte offsets. [`CompileError::render`] combines it
//! with the [`SourceBuffer`] to produce a [`Diagnostic`] carrying the file
//! name and 1-based line/column, which is what drivers print and what editor
//! tooling consumes as JSON.

use std::fmt;

use serde::Serialize;

use crate::source::SourceBuffer;
use crate::span::Span;

/// A compilation failure annotated with its source location.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        CompileError {
            message: message.into(),
            span,
        }
    }

    /// Resolves the error against its source buffer for presentation.
    pub fn render(&self, source: &SourceBuffer) -> Diagnostic {
        let (line, column) = source.line_col(self.span.start);
        Diagnostic {
            file: source.name().to_string(),
            offset: self.span.start,
            line,
            column,
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for CompileError {}

/// Alias for `std::result::Result<T, CompileError>`, used by every stage.
pub type Result<T> = std::result::Result<T, CompileError>;

/// A presentation-ready error record: file, position, and message.
///
/// Serializes to JSON for structured driver output.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub file: String,
    /// Byte offset of the error start.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: error: {}",
            self.file, self.line, self.column, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message_and_offsets() {
        let err = CompileError::new("unexpected token", Span::new(3, 5));
        let shown = err.to_string();
        assert!(shown.contains("unexpected token"));
        assert!(shown.contains("3..5"));
    }

    #[test]
    fn render_resolves_line_and_column() {
        let source = SourceBuffer::new("main.tarn", "let a = 1\nlet b = ?\n");
        let err = CompileError::new("invalid character '?'", Span::new(18, 19));
        let diag = err.render(&source);
        assert_eq!(diag.file, "main.tarn");
        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, 9);
    }

    #[test]
    fn diagnostic_display_is_compiler_style() {
        let source = SourceBuffer::new("main.tarn", "x\n");
        let diag = CompileError::new("unresolved name 'x'", Span::new(0, 1)).render(&source);
        assert_eq!(diag.to_string(), "main.tarn:1:1: error: unresolved name 'x'");
    }

    #[test]
    fn diagnostic_serializes_to_json() {
        let source = SourceBuffer::new("m.tarn", "oops");
        let diag = CompileError::new("expected value", Span::new(0, 4)).render(&source);
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"line\":1"));
        assert!(json.contains("\"message\":\"expected value\""));
    }
}

//! Immutable source text with line/column mapping.
//!
//! A [`SourceBuffer`] owns the text of one compilation unit for the whole
//! pipeline run. Line starts are precomputed once so that translating a byte
//! offset to a 1-based line/column pair is a binary search, not a rescan.

use crate::span::Span;

/// An immutable source file: name, text, and a line-start index.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    name: String,
    text: String,
    /// Byte offset of each line start; `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        SourceBuffer {
            name: name.into(),
            text,
            line_starts,
        }
    }

    /// The file name (or pseudo-name such as `<input>`) of this buffer.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text covered by `span`, clamped to the buffer.
    pub fn slice(&self, span: Span) -> &str {
        let start = span.start.min(self.text.len());
        let end = span.end.min(self.text.len()).max(start);
        &self.text[start..end]
    }

    /// Translates a byte offset to a 1-based `(line, column)` pair.
    ///
    /// Offsets past the end of the buffer map to the last position. Columns
    /// count bytes from the line start, which matches how the lexer indexes.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

//! Byte-offset spans and position conversions.
//!
//! Spans are half-open byte ranges into UTF-8 source: the start offset is
//! inclusive, the end offset is exclusive. Lines and columns are 1-indexed,
//! matching editor conventions; byte offsets are 0-indexed.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Span
// ============================================================================

/// A half-open byte range into source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Span { start, end }
    }

    /// Create a zero-width span at the given offset.
    pub fn empty(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice the given source text to this span.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

// ============================================================================
// Position Conversion
// ============================================================================

/// Convert a byte offset to a 1-indexed (line, col) pair.
///
/// Columns count Unicode scalar values, not bytes, so positions are suitable
/// for user-facing diagnostics. Offsets past the end of the content clamp to
/// the final position.
pub fn offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

// ============================================================================
// Tests
// ============================================================================

//! Source location tracking.
//!
//! A BASIC program is always a single source file, so unlike a multi-file
//! compiler's span we only need byte offsets plus a 1-based line/column pair
//! — enough to reproduce the lexer's own tracking (spec'd as "1-based line
//! and column tracking") in every diagnostic.

use std::sync::Arc;

/// A range in the source text, with the line/column of its start recorded
/// for display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line number of `start` (1-based).
    pub line: u32,
    /// Column number of `start` (1-based).
    pub column: u32,
}

impl Span {
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
    };

    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn point(line: u32, column: u32) -> Self {
        Self {
            start: 0,
            end: 0,
            line,
            column,
        }
    }

    /// Merge two spans that belong to the same file into the range that
    /// covers both.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }
}

/// The program text plus precomputed line-start offsets, used to render a
/// source snippet under a diagnostic.
#[derive(Clone)]
pub struct SourceFile {
    name: String,
    content: Arc<str>,
    line_starts: Arc<[usize]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        starts.into()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the text of the given 1-based line number, without its
    /// terminator.
    pub fn line_text(&self, line: u32) -> &str {
        let idx = line.saturating_sub(1) as usize;
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e.saturating_sub(1))
            .unwrap_or(self.content.len());
        self.content.get(start..end).unwrap_or("").trim_end_matches('\r')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_first_and_last() {
        let f = SourceFile::new("t.bas", "10 PRINT 1\n20 PRINT 2\n30 END");
        assert_eq!(f.line_text(1), "10 PRINT 1");
        assert_eq!(f.line_text(2), "20 PRINT 2");
        assert_eq!(f.line_text(3), "30 END");
    }

    #[test]
    fn line_text_out_of_range_is_empty() {
        let f = SourceFile::new("t.bas", "10 PRINT 1");
        assert_eq!(f.line_text(99), "");
    }

    #[test]
    fn span_to_covers_both() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new(10, 14, 1, 11);
        let merged = a.to(b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 14);
    }
}

//! Registry of block and function bodies.

use crate::span::{FileId, Span};
use std::fmt;
use weft_common::ContentHash;

/// One registered body.
pub struct SourceFile {
    /// Identifier within the owning [`SourceDb`].
    pub id: FileId,
    /// Display name, conventionally `Class.decl`.
    pub name: String,
    /// The body text.
    pub content: String,
    /// Hash of `content`.
    pub content_hash: ContentHash,
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(id: FileId, name: String, content: String) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        let content_hash = ContentHash::from_bytes(content.as_bytes());
        Self {
            id,
            name,
            content,
            content_hash,
            line_starts,
        }
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line as u32 + 1, offset - self.line_starts[line] + 1)
    }

    /// Text of the 1-based line `line`, without its terminator.
    pub fn line_text(&self, line: u32) -> &str {
        let idx = (line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e as usize - 1)
            .unwrap_or(self.content.len());
        &self.content[start as usize..end.max(start as usize)]
    }
}

/// A span converted to line/column form for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Name of the body.
    pub name: String,
    /// Starting line (1-based).
    pub start_line: u32,
    /// Starting column (1-based).
    pub start_col: u32,
    /// Ending line (1-based).
    pub end_line: u32,
    /// Ending column (1-based, inclusive).
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.start_line, self.start_col)
    }
}

/// Owns the text of every block and function body seen during elaboration.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a body and returns its identifier.
    pub fn add_source(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content.into()));
        id
    }

    /// Looks up a registered body.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Returns the body with `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Converts a span to line/column form, or `None` for dummy spans.
    pub fn resolve_span(&self, span: Span) -> Option<ResolvedSpan> {
        let file = self.get(span.file)?;
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        Some(ResolvedSpan {
            name: file.name.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// Text covered by a span; empty for dummy spans.
    pub fn snippet(&self, span: Span) -> &str {
        match self.get(span.file) {
            Some(file) => &file.content[span.start as usize..span.end as usize],
            None => "",
        }
    }
}

impl fmt::Debug for SourceDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.files.iter().map(|file| &file.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_snippet() {
        let mut db = SourceDb::new();
        let id = db.add_source("Top.up1", "s.b = s.a");
        assert_eq!(db.len(), 1);
        assert_eq!(db.snippet(Span::new(id, 6, 9)), "s.a");
        assert_eq!(db.get_file(id).name, "Top.up1");
    }

    #[test]
    fn resolve_multiline() {
        let mut db = SourceDb::new();
        let id = db.add_source("Top.up", "x = 1\ns.out = s.in_\n");
        let resolved = db.resolve_span(Span::new(id, 6, 11)).unwrap();
        assert_eq!(resolved.start_line, 2);
        assert_eq!(resolved.start_col, 1);
        assert_eq!(resolved.end_col, 5);
        assert_eq!(resolved.to_string(), "Top.up:2:1");
    }

    #[test]
    fn dummy_span_does_not_resolve() {
        let db = SourceDb::new();
        assert!(db.resolve_span(Span::DUMMY).is_none());
        assert_eq!(db.snippet(Span::DUMMY), "");
    }

    #[test]
    fn line_text_extraction() {
        let mut db = SourceDb::new();
        let id = db.add_source("F.f", "a\nbc\n\nd");
        let file = db.get_file(id);
        assert_eq!(file.line_text(1), "a");
        assert_eq!(file.line_text(2), "bc");
        assert_eq!(file.line_text(3), "");
        assert_eq!(file.line_text(4), "d");
        assert_eq!(file.line_text(9), "");
    }

    #[test]
    fn content_is_hashed() {
        let mut db = SourceDb::new();
        let id = db.add_source("A.f", "s.a = 1");
        assert_eq!(
            db.get_file(id).content_hash,
            ContentHash::from_bytes(b"s.a = 1")
        );
    }
}

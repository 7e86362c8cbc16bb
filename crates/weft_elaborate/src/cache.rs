//! Per-declaration cache of parsed bodies and their extracted name chains.
//!
//! Every instance of a component class shares the source text of its blocks
//! and functions, so the body is parsed and its chains extracted once per
//! declaration. Later instances receive the same [`Arc`].

use crate::errors::ElabError;
use std::collections::HashMap;
use std::sync::Arc;
use weft_common::{ContentHash, Ident};
use weft_ir::Design;
use weft_parser::{extract, parse_body, Body, Extracted};
use weft_source::FileId;

/// Stable identity of one declaration: declaring class, declared name and
/// the hash of the body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclKey {
    /// Class owning the declaration.
    pub class: Ident,
    /// Declared block or function name.
    pub name: Ident,
    /// Hash of the body text.
    pub source_hash: ContentHash,
}

/// A parsed body together with its reads, writes and calls.
#[derive(Debug)]
pub struct ExtractedBody {
    /// The syntax tree.
    pub body: Body,
    /// References found in it.
    pub extracted: Extracted,
    /// Where the body text is registered in the design's source database.
    pub file: FileId,
}

/// Cache of [`ExtractedBody`] values keyed by [`DeclKey`].
#[derive(Debug, Default)]
pub struct ChainCache {
    entries: HashMap<DeclKey, Arc<ExtractedBody>>,
    parses: usize,
}

impl ChainCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the extracted body of declaration `name` of class `class`,
    /// parsing `source` only on the first request.
    pub fn get_or_extract(
        &mut self,
        design: &mut Design,
        class: Ident,
        name: Ident,
        source: &str,
    ) -> Result<Arc<ExtractedBody>, ElabError> {
        let key = DeclKey {
            class,
            name,
            source_hash: ContentHash::from_bytes(source.as_bytes()),
        };
        if let Some(hit) = self.entries.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let label = format!("{}.{}", design.name(class), design.name(name));
        tracing::trace!(decl = %label, "parsing body");
        let file = design.sources.add_source(label, source);
        let body = parse_body(source, file, &design.interner)?;
        let extracted = extract(&body, &design.interner)?;
        self.parses += 1;

        let entry = Arc::new(ExtractedBody {
            body,
            extracted,
            file,
        });
        self.entries.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    /// Number of cached declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many bodies have been parsed so far.
    pub fn parse_count(&self) -> usize {
        self.parses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_request_is_a_hit() {
        let mut design = Design::new();
        let class = design.intern("Top");
        let name = design.intern("up");
        let mut cache = ChainCache::new();

        let a = cache
            .get_or_extract(&mut design, class, name, "s.b = s.a")
            .unwrap();
        let b = cache
            .get_or_extract(&mut design, class, name, "s.b = s.a")
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.parse_count(), 1);
        assert_eq!(design.sources.len(), 1);
        assert_eq!(a.extracted.reads.len(), 1);
        assert_eq!(a.extracted.writes.len(), 1);
    }

    #[test]
    fn different_class_is_a_miss() {
        let mut design = Design::new();
        let top = design.intern("Top");
        let other = design.intern("Other");
        let name = design.intern("up");
        let mut cache = ChainCache::new();

        let a = cache.get_or_extract(&mut design, top, name, "s.b = s.a").unwrap();
        let b = cache.get_or_extract(&mut design, other, name, "s.b = s.a").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn syntax_error_is_not_cached() {
        let mut design = Design::new();
        let class = design.intern("Top");
        let name = design.intern("up");
        let mut cache = ChainCache::new();

        let err = cache
            .get_or_extract(&mut design, class, name, "s.b = = s.a")
            .unwrap_err();
        assert!(matches!(err, ElabError::Syntax(_)));
        assert!(cache.is_empty());
    }
}

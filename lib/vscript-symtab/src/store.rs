//! Per-scope symbol store.
//!
//! A multimap from name to the declarations bound under it. Names may repeat
//! (overloaded functions), so each name owns a bucket whose insertion order is
//! preserved: lookups return the first entry and candidate iteration walks the
//! bucket front to back. Duplicate checking is not done here.

use indexmap::IndexMap;
use tracing::debug;

use crate::arena::Symbol;
use crate::ast::DeclId;
use crate::error::{Result, SymtabError};

/// A name bound to a declaration node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub decl: DeclId,
}

#[derive(Debug, Default)]
pub struct SymbolStore {
    buckets: IndexMap<Symbol, Vec<SymbolEntry>>,
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `decl` to the tail of the bucket for `name`.
    pub fn define(&mut self, name: Symbol, decl: DeclId) -> Result<()> {
        let bucket = self.buckets.entry(name).or_default();
        bucket
            .try_reserve(1)
            .map_err(|_| SymtabError::Allocation("symbol store"))?;
        bucket.push(SymbolEntry { name, decl });
        Ok(())
    }

    pub fn find(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.buckets.get(&name).and_then(|bucket| bucket.first())
    }

    /// Entry following `previous` in the bucket for `name`.
    pub fn find_next(&self, previous: &SymbolEntry, name: Symbol) -> Option<&SymbolEntry> {
        let bucket = self.buckets.get(&name)?;
        let pos = bucket
            .iter()
            .position(|entry| std::ptr::eq(entry, previous))?;
        bucket.get(pos + 1)
    }

    /// All entries bound to `name`, in insertion order.
    pub fn candidates(&self, name: Symbol) -> impl Iterator<Item = &SymbolEntry> {
        self.buckets.get(&name).into_iter().flatten()
    }

    /// Remove the first entry bound to `name`.
    pub fn undef(&mut self, name: Symbol) -> Result<SymbolEntry> {
        let bucket = self
            .buckets
            .get_mut(&name)
            .filter(|bucket| !bucket.is_empty())
            .ok_or(SymtabError::SymbolNotFound(name))?;
        let entry = bucket.remove(0);
        if bucket.is_empty() {
            self.buckets.shift_remove(&name);
        }
        Ok(entry)
    }

    pub fn destroy(&mut self) {
        if !self.buckets.is_empty() {
            debug!(names = self.buckets.len(), "destroying symbol store");
        }
        self.buckets.clear();
    }

    /// Number of entries over all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Every entry, grouped by name in first-definition order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.buckets.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Interner, NodeId};

    fn names() -> (Symbol, Symbol) {
        let mut interner = Interner::default();
        (interner.intern("f"), interner.intern("g"))
    }

    #[test]
    fn bucket_keeps_insertion_order() {
        let (f, _) = names();
        let mut store = SymbolStore::new();
        for idx in 0..3 {
            store.define(f, NodeId::new(idx)).unwrap();
        }

        let first = store.find(f).unwrap();
        assert_eq!(first.decl, NodeId::new(0));
        let second = store.find_next(first, f).unwrap();
        assert_eq!(second.decl, NodeId::new(1));
        let third = store.find_next(second, f).unwrap();
        assert_eq!(third.decl, NodeId::new(2));
        assert!(store.find_next(third, f).is_none());
    }

    #[test]
    fn undef_removes_only_the_first_entry() {
        let (f, g) = names();
        let mut store = SymbolStore::new();
        store.define(f, NodeId::new(0)).unwrap();
        store.define(f, NodeId::new(1)).unwrap();

        assert_eq!(store.undef(f).unwrap().decl, NodeId::new(0));
        assert_eq!(store.find(f).unwrap().decl, NodeId::new(1));
        store.undef(f).unwrap();
        assert!(store.find(f).is_none());
        assert_eq!(store.undef(g), Err(SymtabError::SymbolNotFound(g)));
    }

    #[test]
    fn destroy_clears_all_buckets() {
        let (f, g) = names();
        let mut store = SymbolStore::new();
        store.define(f, NodeId::new(0)).unwrap();
        store.define(g, NodeId::new(1)).unwrap();
        assert_eq!(store.len(), 2);
        store.destroy();
        assert!(store.is_empty());
        assert_eq!(store.candidates(f).count(), 0);
    }
}

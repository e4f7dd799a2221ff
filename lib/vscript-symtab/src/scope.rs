//! Lexical scopes.
//!
//! A scope owns its symbol store and its pool of reusable storage slots.
//! Scopes form a chain through their parent link; the scope without a parent
//! is the global scope.

use crate::arena::{NodeId, Symbol};
use crate::error::Result;
use crate::location::{Location, ReusableLocation};
use crate::store::{SymbolEntry, SymbolStore};
use crate::ast::DeclId;

pub type ScopeId = NodeId<Scope>;

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub(crate) store: SymbolStore,
    /// Next fresh slot. Slot 0 is reserved for the return value.
    pub(crate) next_storage: u32,
    pub(crate) pool: Vec<ReusableLocation>,
    pub(crate) free_count: usize,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            store: SymbolStore::new(),
            next_storage: Location::RETURN_VALUE.raw() + 1,
            pool: Vec::new(),
            free_count: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    pub fn define(&mut self, name: Symbol, decl: DeclId) -> Result<()> {
        self.store.define(name, decl)
    }

    pub fn lookup(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.store.find(name)
    }

    /// Release everything the scope owns. Declarations are left untouched.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.pool.clear();
        self.free_count = 0;
    }
}

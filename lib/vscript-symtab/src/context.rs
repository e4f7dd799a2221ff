//! Symbol table context
//!
//! The [`Context`] is the state of one compilation unit's name resolution:
//! the stack of open scopes, the preloaded extension library and the
//! signature matcher. Scopes are kept in an owned list where each scope's
//! parent is the one below it; the bottom entry is the global scope.

use tracing::debug;

use crate::arena::Symbol;
use crate::ast::{Ast, DeclId, FunctionCall, FunctionDecl};
use crate::error::{Result, SymtabError};
use crate::location::Location;
use crate::resolve::{ExactMatcher, FunctionMatch, Probe, SignatureMatcher, find_function};
use crate::scope::{Scope, ScopeId};
use crate::store::{SymbolEntry, SymbolStore};

/// Read-only secondary source of function declarations, filled by a loader
/// before compilation starts. Never part of any scope chain.
#[derive(Debug, Default)]
pub struct ExtensionLibrary {
    store: SymbolStore,
}

impl ExtensionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: Symbol, decl: DeclId) -> Result<()> {
        self.store.define(name, decl)
    }

    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[derive(Debug)]
pub struct Context {
    scopes: Vec<Scope>,
    extension: ExtensionLibrary,
    matcher: Box<dyn SignatureMatcher>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            extension: ExtensionLibrary::new(),
            matcher: Box::new(ExactMatcher),
        }
    }

    pub fn with_extension_library(mut self, library: ExtensionLibrary) -> Self {
        self.extension = library;
        self
    }

    pub fn with_matcher(mut self, matcher: impl SignatureMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn extension_library(&self) -> &ExtensionLibrary {
        &self.extension
    }

    /// Loader access to the extension library, before any scope is opened.
    pub fn extension_library_mut(&mut self) -> Result<&mut ExtensionLibrary> {
        if !self.scopes.is_empty() {
            return Err(SymtabError::InvalidState("extension library is sealed"));
        }
        Ok(&mut self.extension)
    }

    pub(crate) fn matcher(&self) -> &dyn SignatureMatcher {
        self.matcher.as_ref()
    }

    // === Scope stack ===

    /// Open a scope nested in the current one. The first scope opened
    /// becomes the global scope.
    pub fn push(&mut self) -> Result<ScopeId> {
        let parent = self.current();
        self.scopes
            .try_reserve(1)
            .map_err(|_| SymtabError::Allocation("scope stack"))?;

        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(parent));
        debug!(scope = id.idx(), global = parent.is_none(), "scope pushed");
        Ok(id)
    }

    /// Close the current scope, dropping its symbols and slot pool.
    pub fn pop(&mut self) -> Result<()> {
        let mut scope = self
            .scopes
            .pop()
            .ok_or(SymtabError::InvalidState("pop without a current scope"))?;
        debug!(
            scope = self.scopes.len(),
            symbols = scope.store.len(),
            "scope popped"
        );
        scope.destroy();
        Ok(())
    }

    pub fn current(&self) -> Option<ScopeId> {
        self.scopes.len().checked_sub(1).map(ScopeId::new)
    }

    pub fn global(&self) -> Option<ScopeId> {
        (!self.scopes.is_empty()).then(|| ScopeId::new(0))
    }

    pub fn is_global(&self) -> bool {
        self.current() == self.global()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.idx())
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope> {
        self.scopes
            .get_mut(id.idx())
            .ok_or(SymtabError::InvalidState("scope is not open"))
    }

    pub(crate) fn current_scope(&self) -> Result<ScopeId> {
        self.current()
            .ok_or(SymtabError::InvalidState("no current scope"))
    }

    pub(crate) fn global_scope(&self) -> Result<&Scope> {
        self.scopes
            .first()
            .ok_or(SymtabError::InvalidState("no global scope"))
    }

    /// Look `name` up starting at `scope` and walking out through the parents.
    /// Also reports the scope that held the match.
    ///
    /// A `scope` that is no longer open finds nothing, the same as a name
    /// that is bound nowhere on the chain.
    pub fn find(&self, scope: ScopeId, name: Symbol) -> Option<(ScopeId, &SymbolEntry)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scopes.get(id.idx())?;
            if let Some(entry) = scope.lookup(name) {
                return Some((id, entry));
            }
            current = scope.parent;
        }
        None
    }

    /// Remove the first binding of `name` from `scope` itself.
    pub fn undef(&mut self, scope: ScopeId, name: Symbol) -> Result<SymbolEntry> {
        let entry = self.scope_mut(scope)?.store.undef(name)?;
        debug!(scope = scope.idx(), name = ?name, "symbol undefined");
        Ok(entry)
    }

    // === Function resolution ===

    /// Resolve a declaration against the global scope and the extension
    /// library. The library only wins when strictly more conclusive.
    pub fn find_function_def(&self, ast: &Ast, decl: &FunctionDecl) -> Result<FunctionMatch> {
        self.find_function(ast, Probe::Decl(decl))
    }

    /// Resolve a call against the global scope and the extension library.
    pub fn find_function_call(&self, ast: &Ast, call: &FunctionCall) -> Result<FunctionMatch> {
        self.find_function(ast, Probe::Call(call))
    }

    fn find_function(&self, ast: &Ast, probe: Probe<'_>) -> Result<FunctionMatch> {
        let global = self.global_scope()?;
        let in_global = find_function(&global.store, ast, probe, self.matcher());
        let in_library = find_function(&self.extension.store, ast, probe, self.matcher());
        Ok(in_global.merge(in_library))
    }

    // === Storage locations ===

    pub fn make_location(&mut self, scope: ScopeId, reusable: bool) -> Result<Location> {
        self.scope_mut(scope)?.make_location(reusable)
    }

    /// Fresh, non-recyclable slot in the current scope.
    pub fn new_location(&mut self) -> Result<Location> {
        let scope = self.current_scope()?;
        self.make_location(scope, false)
    }

    /// Recyclable slot in the current scope, for temporaries.
    pub fn new_temp_location(&mut self) -> Result<Location> {
        let scope = self.current_scope()?;
        self.make_location(scope, true)
    }

    pub fn release(&mut self, scope: ScopeId, location: Location) -> Result<()> {
        self.scope_mut(scope)?.release(location)
    }

    /// Whether `location` is frame relative rather than global.
    pub fn is_on_stack(&self, location: Location) -> Result<bool> {
        Ok(self.global_scope()?.is_on_stack(location))
    }

    /// Every binding of every open scope, from the global scope inwards, as
    /// `(depth, entry)` pairs.
    pub fn bindings(&self) -> impl Iterator<Item = (usize, &SymbolEntry)> {
        self.scopes
            .iter()
            .enumerate()
            .flat_map(|(depth, scope)| scope.store.iter().map(move |entry| (depth, entry)))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

//! Overload resolution for function declarations and calls.
//!
//! Resolution runs against one symbol store at a time and classifies the
//! outcome with a [`Resolution`]. The context runs it once against the global
//! scope and once against the extension library and keeps the more
//! conclusive of the two.

use std::fmt::Debug;

use tracing::trace;

use crate::arena::Symbol;
use crate::ast::{Ast, DeclId, DeclKind, FunctionCall, FunctionDecl};
use crate::store::SymbolStore;

/// Outcome of searching a store for a function.
///
/// The variants are ordered from most to least conclusive, and that order is
/// what merging relies on: `SameSignature < DiffSignature < NotFuncDecl <
/// NothingDecl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolution {
    /// A function with exactly this signature exists.
    SameSignature,
    /// Functions of this name exist, none with this signature.
    DiffSignature,
    /// The name is bound to something other than a function.
    NotFuncDecl,
    /// The name is not bound at all.
    NothingDecl,
}

/// Exact-match predicates used to compare signatures.
pub trait SignatureMatcher: Debug {
    /// Whether `call` can be dispatched to `decl`.
    fn match_call(&self, call: &FunctionCall, decl: &FunctionDecl) -> bool;

    /// Whether `a` and `b` declare the same signature.
    fn match_signatures(&self, a: &FunctionDecl, b: &FunctionDecl) -> bool;
}

/// Compares parameter kinds position by position. Return kinds do not take
/// part in overloading.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl SignatureMatcher for ExactMatcher {
    fn match_call(&self, call: &FunctionCall, decl: &FunctionDecl) -> bool {
        call.args == decl.params
    }

    fn match_signatures(&self, a: &FunctionDecl, b: &FunctionDecl) -> bool {
        a.params == b.params
    }
}

/// What to resolve.
#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    Call(&'a FunctionCall),
    Decl(&'a FunctionDecl),
}

impl Probe<'_> {
    pub fn name(&self) -> Symbol {
        match self {
            Probe::Call(call) => call.name,
            Probe::Decl(decl) => decl.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionMatch {
    pub resolution: Resolution,
    /// The declaration with the same signature, if one was found.
    pub resolved: Option<DeclId>,
    /// The last entry examined: the near miss behind a non-exact result.
    pub conflict: Option<DeclId>,
}

impl FunctionMatch {
    pub fn nothing() -> Self {
        Self {
            resolution: Resolution::NothingDecl,
            resolved: None,
            conflict: None,
        }
    }

    /// Keep `self` unless `other` is strictly more conclusive.
    pub fn merge(self, other: FunctionMatch) -> FunctionMatch {
        if other.resolution < self.resolution {
            other
        } else {
            self
        }
    }
}

/// Search `store` for a function matching `probe`.
pub fn find_function(
    store: &SymbolStore,
    ast: &Ast,
    probe: Probe<'_>,
    matcher: &dyn SignatureMatcher,
) -> FunctionMatch {
    let mut found = FunctionMatch::nothing();

    for entry in store.candidates(probe.name()) {
        found.conflict = Some(entry.decl);

        let DeclKind::FunctionDecl(candidate) = &ast.get(entry.decl).kind else {
            trace!(decl = ?entry.decl, "candidate is not a function");
            found.resolution = Resolution::NotFuncDecl;
            return found;
        };

        let matched = match probe {
            Probe::Call(call) => matcher.match_call(call, candidate),
            Probe::Decl(decl) => matcher.match_signatures(decl, candidate),
        };

        if matched {
            trace!(decl = ?entry.decl, "candidate matches signature");
            found.resolution = Resolution::SameSignature;
            found.resolved = Some(entry.decl);
            return found;
        }

        trace!(decl = ?entry.decl, "candidate differs in signature");
        found.resolution = Resolution::DiffSignature;
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolutions_order_by_conclusiveness() {
        assert!(Resolution::SameSignature < Resolution::DiffSignature);
        assert!(Resolution::DiffSignature < Resolution::NotFuncDecl);
        assert!(Resolution::NotFuncDecl < Resolution::NothingDecl);
    }

    #[test]
    fn merge_prefers_left_on_ties() {
        let left = FunctionMatch {
            resolution: Resolution::DiffSignature,
            resolved: None,
            conflict: Some(crate::arena::NodeId::new(1)),
        };
        let right = FunctionMatch {
            conflict: Some(crate::arena::NodeId::new(2)),
            ..left
        };
        assert_eq!(left.merge(right), left);
        assert_eq!(FunctionMatch::nothing().merge(left), left);
    }
}

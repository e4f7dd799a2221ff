//! Scoping rules
//!
//! Each declaration kind has its own rule for whether it may be defined or
//! whether the name it refers to resolves:
//!
//! - **function declarations** must not repeat an existing signature, and the
//!   name must not already belong to a non-function in the global scope.
//! - **function calls** must match exactly one declared signature; the match
//!   is recorded on the call.
//! - **variable definitions** must not repeat a name of the current scope.
//!   Shadowing a name of an enclosing scope is fine.
//! - **reference expressions** must name a variable, and typed references
//!   (`@name`, `%name`) must agree with the variable's kind. The variable and
//!   its kind are recorded on the expression.
//! - **labels** and other expressions are always accepted.
//!
//! Violations are reported to the [`DiagnosticSink`] and surface as a
//! rejected [`Outcome`]; only misuse of the context itself is an `Err`.

use tracing::debug;

use crate::ast::{Ast, DeclId, DeclKind, DeclTag};
use crate::context::Context;
use crate::error::{DiagnosticSink, Result, SemanticError, SemanticErrorKind, SymtabError};
use crate::resolve::Resolution;
use crate::scope::ScopeId;

/// Result of applying a scoping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub accepted: bool,
    /// Declaration the node resolved to or collided with, if any.
    pub resolved: Option<DeclId>,
}

impl Outcome {
    fn accept(resolved: Option<DeclId>) -> Self {
        Self {
            accepted: true,
            resolved,
        }
    }

    fn reject() -> Self {
        Self {
            accepted: false,
            resolved: None,
        }
    }
}

impl Context {
    /// Apply the scoping rule for `decl` without inserting anything.
    pub fn is_defined(
        &self,
        ast: &mut Ast,
        decl: DeclId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Outcome> {
        let node = ast.get(decl);
        let loc = node.loc.clone();

        match &node.kind {
            DeclKind::FunctionDecl(fdecl) => {
                let found = self.find_function_def(ast, fdecl)?;
                let conflict = found.conflict.map(|id| ast.get(id));

                match (found.resolution, conflict) {
                    (Resolution::SameSignature, Some(existing)) => {
                        sink.report(
                            SemanticError::new(
                                SemanticErrorKind::DuplicateDefinition {
                                    name: fdecl.name,
                                    usage: DeclTag::FunctionDecl,
                                    existing: DeclTag::FunctionDecl,
                                },
                                loc,
                            )
                            .with_conflict(existing.loc.clone()),
                        );
                        Ok(Outcome::reject())
                    }
                    (Resolution::NotFuncDecl, Some(existing)) => {
                        sink.report(
                            SemanticError::new(
                                SemanticErrorKind::NameConflict {
                                    name: fdecl.name,
                                    usage: DeclTag::FunctionDecl,
                                    existing: existing.tag(),
                                },
                                loc,
                            )
                            .with_conflict(existing.loc.clone()),
                        );
                        Ok(Outcome::reject())
                    }
                    (Resolution::DiffSignature | Resolution::NothingDecl, _) => {
                        Ok(Outcome::accept(None))
                    }
                    (Resolution::SameSignature | Resolution::NotFuncDecl, None) => {
                        Err(SymtabError::InvalidState("near miss without an entry"))
                    }
                }
            }

            DeclKind::FunctionCall(call) => {
                let name = call.name;
                let found = self.find_function_call(ast, call)?;
                let conflict = found.conflict.map(|id| ast.get(id).clone());

                let error = match found.resolution {
                    Resolution::SameSignature => {
                        if let DeclKind::FunctionCall(call) = &mut ast.decls.get_mut(decl).kind {
                            call.func_decl = found.resolved;
                        }
                        return Ok(Outcome::accept(found.resolved));
                    }
                    Resolution::DiffSignature => {
                        SemanticError::new(SemanticErrorKind::SignatureMismatch { name }, loc)
                            .with_context("no declaration takes these argument kinds")
                    }
                    Resolution::NotFuncDecl => SemanticError::new(
                        SemanticErrorKind::NameConflict {
                            name,
                            usage: DeclTag::FunctionCall,
                            existing: conflict
                                .as_ref()
                                .map_or(DeclTag::FunctionDecl, |existing| existing.tag()),
                        },
                        loc,
                    ),
                    Resolution::NothingDecl => {
                        SemanticError::new(SemanticErrorKind::UndefinedFunction { name }, loc)
                    }
                };

                let error = match conflict {
                    Some(existing) => error.with_conflict(existing.loc),
                    None => error,
                };
                sink.report(error);
                Ok(Outcome::reject())
            }

            DeclKind::VariableDef(var) => {
                let current = self.current_scope()?;
                match self.find(current, var.name) {
                    Some((scope, entry)) if scope == current => {
                        let existing = ast.get(entry.decl);
                        sink.report(
                            SemanticError::new(
                                SemanticErrorKind::DuplicateDefinition {
                                    name: var.name,
                                    usage: DeclTag::VariableDef,
                                    existing: existing.tag(),
                                },
                                loc,
                            )
                            .with_conflict(existing.loc.clone()),
                        );
                        Ok(Outcome::reject())
                    }
                    Some((_, shadowed)) => Ok(Outcome::accept(Some(shadowed.decl))),
                    None => Ok(Outcome::accept(None)),
                }
            }

            DeclKind::Expression(expr) => {
                let Some(target) = expr.target.filter(|_| expr.kind.is_reference()) else {
                    return Ok(Outcome::accept(None));
                };
                let used_as = expr.kind;
                let current = self.current_scope()?;

                let Some((_, entry)) = self.find(current, target) else {
                    sink.report(SemanticError::new(
                        SemanticErrorKind::UndefinedVariable { name: target },
                        loc,
                    ));
                    return Ok(Outcome::reject());
                };

                let existing = ast.get(entry.decl);
                let DeclKind::VariableDef(var) = &existing.kind else {
                    sink.report(
                        SemanticError::new(
                            SemanticErrorKind::KindMismatch {
                                name: target,
                                used_as,
                                existing: existing.tag(),
                            },
                            loc,
                        )
                        .with_conflict(existing.loc.clone()),
                    );
                    return Ok(Outcome::reject());
                };

                if used_as.required_kind().is_some_and(|kind| kind != var.kind) {
                    sink.report(SemanticError::new(
                        SemanticErrorKind::TypeMismatch {
                            name: target,
                            used_as,
                            declared: var.kind,
                        },
                        loc,
                    ));
                    return Ok(Outcome::reject());
                }

                let var_decl = entry.decl;
                let value_kind = var.kind;
                if let DeclKind::Expression(expr) = &mut ast.decls.get_mut(decl).kind {
                    expr.var_def = Some(var_decl);
                    expr.value_kind = Some(value_kind);
                }
                Ok(Outcome::accept(Some(var_decl)))
            }

            DeclKind::Label(_) => Ok(Outcome::accept(None)),
        }
    }

    /// Check `decl` against its scoping rule and, when accepted, bind it:
    /// functions in the global scope, variables and labels in the current
    /// scope. Calls and expressions are references and are never bound.
    pub fn define(
        &mut self,
        ast: &mut Ast,
        decl: DeclId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<bool> {
        let outcome = self.is_defined(ast, decl, sink)?;
        if !outcome.accepted {
            debug!(decl = ?decl, "definition rejected");
            return Ok(false);
        }

        let target = match &ast.get(decl).kind {
            DeclKind::FunctionDecl(f) => Some((self.global_id()?, f.name)),
            DeclKind::VariableDef(v) => Some((self.current_scope()?, v.name)),
            DeclKind::Label(l) => Some((self.current_scope()?, l.name)),
            DeclKind::FunctionCall(_) | DeclKind::Expression(_) => None,
        };

        if let Some((scope, name)) = target {
            self.scope_mut(scope)?.define(name, decl)?;
            debug!(scope = scope.idx(), name = ?name, decl = ?decl, "symbol defined");
        }
        Ok(true)
    }

    fn global_id(&self) -> Result<ScopeId> {
        self.global()
            .ok_or(SymtabError::InvalidState("no global scope"))
    }
}

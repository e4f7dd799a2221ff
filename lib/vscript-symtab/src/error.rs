//! Error types and reporting
//!
//! Two families of errors leave the symbol table:
//!
//! - [`SymtabError`] for misuse of the table itself or exhausted resources.
//!   These are returned as `Err` and usually abort the pass.
//! - [`SemanticError`] for scoping violations in the program being compiled.
//!   These are handed to a [`DiagnosticSink`] and the operation reports
//!   failure through its return value, so a pass can collect all of them.

use ariadne::{Label, Report, ReportKind};
use thiserror::Error;

use crate::arena::{Interner, Symbol};
use crate::ast::{DeclTag, ExprKind, Loc, ValueKind};
use crate::location::Location;

pub type Result<T> = std::result::Result<T, SymtabError>;

fn format_symbol(sym: Symbol, interner: &Interner) -> String {
    interner.try_resolve(sym).unwrap_or("<unknown>").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymtabError {
    #[error("out of memory while growing the {0}")]
    Allocation(&'static str),

    #[error("invalid scope state: {0}")]
    InvalidState(&'static str),

    #[error("symbol {0:?} is not defined in this scope")]
    SymbolNotFound(Symbol),

    #[error("location {0} is not an in-use reusable slot")]
    LocationNotFound(Location),

    #[error("location {0} is a constant and cannot be released")]
    NotReusable(Location),
}

impl SymtabError {
    /// Whether the caller may carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SymtabError::SymbolNotFound(_)
                | SymtabError::LocationNotFound(_)
                | SymtabError::NotReusable(_)
        )
    }
}

/// A scoping violation found while defining or resolving a declaration.
#[derive(Debug, Clone, Error)]
#[error("{}", .kind.title())]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub loc: Loc,
    /// Location of the declaration the offending node collides with.
    pub conflict: Option<Loc>,
    pub context: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// A name is defined twice in the same scope, or a function with the
    /// same signature already exists. `usage` is what was being defined.
    DuplicateDefinition {
        name: Symbol,
        usage: DeclTag,
        existing: DeclTag,
    },
    /// A function is declared or called where the name is bound to
    /// something that is not a function.
    NameConflict {
        name: Symbol,
        usage: DeclTag,
        existing: DeclTag,
    },
    /// Functions with this name exist but none takes these arguments.
    SignatureMismatch { name: Symbol },
    UndefinedFunction { name: Symbol },
    UndefinedVariable { name: Symbol },
    /// A variable reference names something that is not a variable.
    KindMismatch {
        name: Symbol,
        used_as: ExprKind,
        existing: DeclTag,
    },
    /// A typed reference disagrees with the declared kind of the variable.
    TypeMismatch {
        name: Symbol,
        used_as: ExprKind,
        declared: ValueKind,
    },
}

impl SemanticErrorKind {
    /// Short fixed summary of the kind. Use [`SemanticError::message`] for
    /// the full text with names resolved.
    pub fn title(&self) -> &'static str {
        match self {
            SemanticErrorKind::DuplicateDefinition { .. } => "duplicate definition",
            SemanticErrorKind::NameConflict { .. } => "name conflict",
            SemanticErrorKind::SignatureMismatch { .. } => "no overload takes these arguments",
            SemanticErrorKind::UndefinedFunction { .. } => "undefined function",
            SemanticErrorKind::UndefinedVariable { .. } => "undefined variable",
            SemanticErrorKind::KindMismatch { .. } => "not a variable",
            SemanticErrorKind::TypeMismatch { .. } => "reference kind mismatch",
        }
    }
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, loc: Loc) -> Self {
        Self {
            kind,
            loc,
            context: None,
            conflict: None,
        }
    }

    pub fn with_conflict(mut self, loc: Loc) -> Self {
        self.conflict = Some(loc);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Get a human-readable error message with proper symbol resolution
    pub fn message(&self, interner: &Interner) -> String {
        use SemanticErrorKind::*;

        let mut message = match &self.kind {
            DuplicateDefinition {
                name,
                usage: DeclTag::FunctionDecl,
                ..
            } => format!(
                "Function {} is defined twice with the same name and parameters",
                format_symbol(*name, interner)
            ),
            DuplicateDefinition {
                name,
                usage,
                existing,
            } => format!(
                "Can't define {} {}, it is already defined as a {}",
                usage,
                format_symbol(*name, interner),
                existing
            ),
            NameConflict {
                name,
                usage: DeclTag::FunctionCall,
                existing,
            } => format!(
                "Calling function {} that is defined as {}",
                format_symbol(*name, interner),
                existing
            ),
            NameConflict { name, existing, .. } => format!(
                "Can't define function {}, a {} of the same name is already defined",
                format_symbol(*name, interner),
                existing
            ),
            SignatureMismatch { name } => format!(
                "Calling function {} that is defined with the same name but different parameters",
                format_symbol(*name, interner)
            ),
            UndefinedFunction { name } => format!(
                "Calling function {} that is not defined",
                format_symbol(*name, interner)
            ),
            UndefinedVariable { name } => format!(
                "Trying to get value of variable {}, but it has not been defined by either variable or function parameter",
                format_symbol(*name, interner)
            ),
            KindMismatch {
                name,
                used_as,
                existing,
            } => format!(
                "Variable {} is used as {} but has been defined as {}",
                format_symbol(*name, interner),
                used_as.display_name(),
                existing
            ),
            TypeMismatch {
                name,
                used_as,
                declared,
            } => format!(
                "Variable {} is used as {} but has been defined as {}",
                format_symbol(*name, interner),
                used_as.display_name(),
                declared
            ),
        };

        if let Some(conflict) = &self.conflict {
            message.push_str(&format!(". First definition at {}", conflict));
        }
        message
    }

    /// Generate an Ariadne error report
    pub fn report(&self, interner: &Interner) -> Report<'_, Loc> {
        let mut report = Report::build(ReportKind::Error, self.loc.clone())
            .with_message(self.message(interner));

        let mut label = Label::new(self.loc.clone());
        if let Some(ctx) = &self.context {
            label = label.with_message(ctx);
        }
        report = report.with_label(label);

        if let Some(conflict) = &self.conflict {
            report = report.with_label(
                Label::new(conflict.clone()).with_message("first defined here"),
            );
        }

        match &self.kind {
            SemanticErrorKind::UndefinedVariable { .. } => {
                report = report
                    .with_help("Variables must be defined before use. Check spelling and scope.");
            }
            SemanticErrorKind::SignatureMismatch { .. } => {
                report = report.with_help(
                    "Check the function definition to see the expected parameter kinds.",
                );
            }
            _ => {}
        }

        report.finish()
    }
}

/// Receiver for semantic diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, error: SemanticError);
}

impl DiagnosticSink for Vec<SemanticError> {
    fn report(&mut self, error: SemanticError) {
        self.push(error);
    }
}

/// Collection of semantic errors
#[derive(Debug, Default)]
pub struct SemanticErrors(pub Vec<SemanticError>);

impl SemanticErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: SemanticError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticError> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<&SemanticErrorKind> {
        self.0.iter().map(|e| &e.kind).collect()
    }

    pub fn reports<'a>(&'a self, interner: &Interner) -> Vec<Report<'a, Loc>> {
        self.0.iter().map(|e| e.report(interner)).collect()
    }
}

impl DiagnosticSink for SemanticErrors {
    fn report(&mut self, error: SemanticError) {
        self.push(error);
    }
}

impl From<SemanticError> for SemanticErrors {
    fn from(err: SemanticError) -> Self {
        Self(vec![err])
    }
}

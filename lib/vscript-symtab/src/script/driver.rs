//! Runs a parsed script against a [`Context`].

use ariadne::{Label, Report, ReportKind};
use tracing::{debug, warn};

use crate::arena::Interner;
use crate::ast::{Ast, DeclKind, Loc};
use crate::context::Context;
use crate::error::{Result, SemanticErrors, SymtabError};
use crate::location::Location;
use crate::script::{Script, Stmt};

/// A storage slot handed out by a `temp` or `slot` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub loc: Loc,
    pub location: Location,
    pub reusable: bool,
}

/// A recoverable table error raised by a statement; the run carried on.
#[derive(Debug, Clone)]
pub struct Recovered {
    pub loc: Loc,
    pub error: SymtabError,
}

impl Recovered {
    pub fn message(&self, interner: &Interner) -> String {
        match &self.error {
            SymtabError::SymbolNotFound(name) => format!(
                "Can't undefine {}, it is not defined in this scope",
                interner.try_resolve(*name).unwrap_or("<unknown>")
            ),
            other => other.to_string(),
        }
    }

    pub fn report(&self, interner: &Interner) -> Report<'_, Loc> {
        Report::build(ReportKind::Warning, self.loc.clone())
            .with_message(self.message(interner))
            .with_label(Label::new(self.loc.clone()))
            .finish()
    }
}

/// Everything a run left behind. The global scope is still open in
/// `context`, so its bindings can be inspected.
#[derive(Debug)]
pub struct RunReport {
    pub context: Context,
    pub diagnostics: SemanticErrors,
    pub allocations: Vec<Allocation>,
    pub recovered: Vec<Recovered>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.recovered.is_empty()
    }
}

#[derive(Debug)]
pub struct Driver {
    context: Context,
    diagnostics: SemanticErrors,
    allocations: Vec<Allocation>,
    recovered: Vec<Recovered>,
}

impl Driver {
    pub fn new() -> Self {
        Self::with_context(Context::new())
    }

    /// Run against a preconfigured context. No scope may be open yet.
    pub fn with_context(context: Context) -> Self {
        Self {
            context,
            diagnostics: SemanticErrors::new(),
            allocations: Vec::new(),
            recovered: Vec::new(),
        }
    }

    /// Preload the script's extern functions, open the global scope and
    /// feed every statement through the table. Semantic errors are
    /// collected; only fatal table errors stop the run.
    pub fn run(mut self, script: &mut Script) -> Result<RunReport> {
        self.preload(&script.ast, &script.stmts)?;
        self.context.push()?;

        for stmt in &script.stmts {
            self.exec(&mut script.ast, stmt)?;
        }

        debug!(
            diagnostics = self.diagnostics.len(),
            recovered = self.recovered.len(),
            allocations = self.allocations.len(),
            "script finished"
        );

        Ok(RunReport {
            context: self.context,
            diagnostics: self.diagnostics,
            allocations: self.allocations,
            recovered: self.recovered,
        })
    }

    fn preload(&mut self, ast: &Ast, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            match stmt {
                Stmt::Extern(decl) => {
                    let DeclKind::FunctionDecl(f) = &ast.get(*decl).kind else {
                        return Err(SymtabError::InvalidState("extern is not a function"));
                    };
                    self.context.extension_library_mut()?.define(f.name, *decl)?;
                    debug!(name = ast.name(f.name), "extern function loaded");
                }
                Stmt::Block { body, .. } => self.preload(ast, body)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn exec(&mut self, ast: &mut Ast, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Extern(_) => {}
            Stmt::Define(decl) => {
                self.context.define(ast, *decl, &mut self.diagnostics)?;
            }
            Stmt::Check(decl) => {
                self.context.is_defined(ast, *decl, &mut self.diagnostics)?;
            }
            Stmt::Undef { name, loc } => {
                let scope = self.context.current_scope()?;
                let result = self.context.undef(scope, *name).map(|_| ());
                self.recover(result, loc)?;
            }
            Stmt::Block { body, .. } => {
                self.context.push()?;
                for stmt in body {
                    self.exec(ast, stmt)?;
                }
                self.context.pop()?;
            }
            Stmt::Temp(loc) => {
                let location = self.context.new_temp_location()?;
                self.allocations.push(Allocation {
                    loc: loc.clone(),
                    location,
                    reusable: true,
                });
            }
            Stmt::Slot(loc) => {
                let location = self.context.new_location()?;
                self.allocations.push(Allocation {
                    loc: loc.clone(),
                    location,
                    reusable: false,
                });
            }
            Stmt::Release { location, loc } => {
                let scope = self.context.current_scope()?;
                let result = self.context.release(scope, Location(*location));
                self.recover(result, loc)?;
            }
        }
        Ok(())
    }

    fn recover(&mut self, result: Result<()>, loc: &Loc) -> Result<()> {
        match result {
            Err(error) if error.is_recoverable() => {
                warn!(%loc, %error, "statement failed");
                self.recovered.push(Recovered {
                    loc: loc.clone(),
                    error,
                });
                Ok(())
            }
            other => other,
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

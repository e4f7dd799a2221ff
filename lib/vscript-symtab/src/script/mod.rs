//! Declaration scripts
//!
//! A small line-oriented language that stands in for a real front end. Each
//! statement is one event a parser would feed the symbol table:
//!
//! ```text
//! extern fn print($)     # preloaded into the extension library
//! fn max($, $) -> $      # function declaration, $ scalar, @ array, % hash
//! call max($, $)         # function call
//! var @items             # variable definition
//! ref @items             # variable reference
//! label done
//! undef items            # drop the first binding from the current scope
//! { ... }                # nested scope
//! temp                   # reusable storage slot
//! slot                   # fixed storage slot
//! release 16777214       # hand a reusable slot back
//! ```

pub mod driver;
pub mod grammar;
pub mod lexer;

use std::path::Path;

use ariadne::{Label, Report, ReportKind};
use chumsky::input::{Input, Stream};
use chumsky::prelude::*;
use logos::Logos;
use thiserror::Error;

use crate::arena::Symbol;
use crate::ast::{Ast, DeclId, Loc, SourceId};

pub use driver::{Allocation, Driver, Recovered, RunReport};

use self::grammar::{ScriptCtx, parse_script};
use self::lexer::Token;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Parse { message: String, loc: Loc },
}

impl ScriptError {
    /// Report for errors that point into the script source.
    pub fn report(&self) -> Option<Report<'_, Loc>> {
        match self {
            ScriptError::Io(_) => None,
            ScriptError::Parse { message, loc } => Some(
                Report::build(ReportKind::Error, loc.clone())
                    .with_message("Parse error")
                    .with_label(Label::new(loc.clone()).with_message(message))
                    .finish(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Function preloaded into the extension library.
    Extern(DeclId),
    /// Declaration to check and bind.
    Define(DeclId),
    /// Reference to check without binding.
    Check(DeclId),
    Undef { name: Symbol, loc: Loc },
    Block { body: Vec<Stmt>, loc: Loc },
    Temp(Loc),
    Slot(Loc),
    Release { location: u32, loc: Loc },
}

#[derive(Debug)]
pub struct Script {
    pub ast: Ast,
    pub stmts: Vec<Stmt>,
    pub source: String,
}

impl Script {
    pub fn parse(src: &str, source_id: SourceId) -> Result<Script, ScriptError> {
        let tokens = Token::lexer(src).spanned().map(|(tok, span)| match tok {
            Ok(tok) => (tok, SimpleSpan::from(span)),
            Err(()) => (Token::Error, SimpleSpan::from(span)),
        });
        let stream =
            Stream::from_iter(tokens).map((src.len()..src.len()).into(), |(t, s): (_, _)| (t, s));

        let ctx = ScriptCtx::new(src, source_id);
        let stmts = parse_script(&ctx)
            .parse(stream)
            .into_result()
            .map_err(|errors| match errors.into_iter().next() {
                Some(err) => ScriptError::Parse {
                    message: err.to_string(),
                    loc: ctx.to_loc(*err.span()),
                },
                None => ScriptError::Parse {
                    message: "unexpected input".to_string(),
                    loc: ctx.to_loc(SimpleSpan::from(0..src.len())),
                },
            })?;

        let ast = std::mem::take(&mut *ctx.ast.borrow_mut());
        Ok(Script {
            ast,
            stmts,
            source: src.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Script, ScriptError> {
        let src = std::fs::read_to_string(path)?;
        Self::parse(&src, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DeclKind;

    #[test]
    fn parses_nested_blocks() {
        let script = Script::parse("var $x\n{\n  ref $x\n  temp\n}\n", 0).unwrap();
        assert_eq!(script.stmts.len(), 2);
        let Stmt::Block { body, .. } = &script.stmts[1] else {
            panic!("expected a block, got {:?}", script.stmts[1]);
        };
        assert!(matches!(body[0], Stmt::Check(_)));
        assert!(matches!(body[1], Stmt::Temp(_)));
    }

    #[test]
    fn locations_carry_line_and_column() {
        let script = Script::parse("\n  fn f($) -> @\n", 0).unwrap();
        let Stmt::Define(decl) = script.stmts[0] else {
            panic!("expected a definition");
        };
        let node = script.ast.get(decl);
        assert_eq!((node.loc.line, node.loc.column), (2, 3));
        let DeclKind::FunctionDecl(f) = &node.kind else {
            panic!("expected a function");
        };
        assert_eq!(script.ast.name(f.name), "f");
        assert_eq!(f.ret, Some(crate::ast::ValueKind::Array));
    }

    #[test]
    fn reports_the_first_parse_error() {
        let err = Script::parse("var x", 0).unwrap_err();
        let ScriptError::Parse { loc, .. } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(loc.span, 4..5);
    }
}

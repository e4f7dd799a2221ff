use std::cell::RefCell;
use std::rc::Rc;

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use crate::arena::Symbol;
use crate::ast::{
    Ast, DeclId, DeclKind, Expression, FunctionCall, FunctionDecl, Label, Loc, SourceId,
    ValueKind, VariableDef,
};
use crate::script::Stmt;
use crate::script::lexer::Token;

pub(crate) type ParserError<'a> = extra::Err<Rich<'a, Token<'a>, SimpleSpan>>;

/// Byte offsets of line starts, for turning spans into line and column.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line and column of `offset`.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&start| start <= offset).max(1);
        let column = offset - self.starts[line - 1] + 1;
        (line as u32, column as u32)
    }
}

#[derive(Clone)]
pub struct ScriptCtx {
    pub ast: Rc<RefCell<Ast>>,
    pub source_id: SourceId,
    lines: Rc<LineIndex>,
}

impl ScriptCtx {
    pub fn new(src: &str, source_id: SourceId) -> Self {
        Self {
            ast: Rc::new(RefCell::new(Ast::default())),
            source_id,
            lines: Rc::new(LineIndex::new(src)),
        }
    }

    pub fn intern(&self, ident: &str) -> Symbol {
        self.ast.borrow_mut().symbols.intern(ident)
    }

    pub fn to_loc(&self, span: SimpleSpan) -> Loc {
        let (line, column) = self.lines.line_col(span.start);
        Loc::new(self.source_id, span.into_range(), line, column)
    }

    pub fn alloc(&self, kind: DeclKind, loc: Loc) -> DeclId {
        self.ast.borrow_mut().alloc(kind, loc)
    }
}

pub fn parse_script<'a, I>(ctx: &'a ScriptCtx) -> impl Parser<'a, I, Vec<Stmt>, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    parse_stmt(ctx).repeated().collect::<Vec<_>>().then_ignore(end())
}

fn parse_stmt<'a, I>(ctx: &'a ScriptCtx) -> impl Parser<'a, I, Stmt, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    recursive(|stmt| {
        let kinds = parse_kind()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        // fn name($, @) -> %
        let function = just(Token::Func)
            .ignore_then(parse_symbol(ctx))
            .then(kinds.clone())
            .then(just(Token::Arrow).ignore_then(parse_kind()).or_not())
            .map_with(|((name, params), ret), e| {
                ctx.alloc(
                    DeclKind::FunctionDecl(FunctionDecl { name, params, ret }),
                    ctx.to_loc(e.span()),
                )
            });

        let extern_fn = just(Token::Extern)
            .ignore_then(function.clone())
            .map(Stmt::Extern);

        let define_fn = function.map(Stmt::Define);

        let call = just(Token::Call)
            .ignore_then(parse_symbol(ctx))
            .then(kinds)
            .map_with(|(name, args), e| {
                Stmt::Check(ctx.alloc(
                    DeclKind::FunctionCall(FunctionCall {
                        name,
                        args,
                        func_decl: None,
                    }),
                    ctx.to_loc(e.span()),
                ))
            });

        let var = just(Token::Var)
            .ignore_then(parse_kind())
            .then(parse_symbol(ctx))
            .map_with(|(kind, name), e| {
                Stmt::Define(ctx.alloc(
                    DeclKind::VariableDef(VariableDef { name, kind }),
                    ctx.to_loc(e.span()),
                ))
            });

        let reference = just(Token::Ref)
            .ignore_then(parse_kind())
            .then(parse_symbol(ctx))
            .map_with(|(kind, target), e| {
                Stmt::Check(ctx.alloc(
                    DeclKind::Expression(Expression {
                        kind: kind.into(),
                        target: Some(target),
                        var_def: None,
                        value_kind: None,
                    }),
                    ctx.to_loc(e.span()),
                ))
            });

        let label = just(Token::Label)
            .ignore_then(parse_symbol(ctx))
            .map_with(|name, e| {
                Stmt::Define(ctx.alloc(DeclKind::Label(Label { name }), ctx.to_loc(e.span())))
            });

        let undef = just(Token::Undef)
            .ignore_then(parse_symbol(ctx))
            .map_with(|name, e| Stmt::Undef {
                name,
                loc: ctx.to_loc(e.span()),
            });

        let block = stmt
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map_with(|body, e| Stmt::Block {
                body,
                loc: ctx.to_loc(e.span()),
            });

        let temp = just(Token::Temp).map_with(|_, e| Stmt::Temp(ctx.to_loc(e.span())));
        let slot = just(Token::Slot).map_with(|_, e| Stmt::Slot(ctx.to_loc(e.span())));

        let release = just(Token::Release)
            .ignore_then(select! { Token::Integer(n) => n })
            .map_with(|location, e| Stmt::Release {
                location,
                loc: ctx.to_loc(e.span()),
            });

        choice((
            extern_fn, define_fn, call, var, reference, label, undef, block, temp, slot, release,
        ))
    })
}

fn parse_symbol<'a, I>(ctx: &'a ScriptCtx) -> impl Parser<'a, I, Symbol, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    select! { Token::Identifier(ident) => ctx.intern(ident) }
}

fn parse_kind<'a, I>() -> impl Parser<'a, I, ValueKind, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    select! {
        Token::Dollar => ValueKind::Scalar,
        Token::At => ValueKind::Array,
        Token::Percent => ValueKind::Hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_is_one_based() {
        let lines = LineIndex::new("fn f()\n  call f()\n");
        assert_eq!(lines.line_col(0), (1, 1));
        assert_eq!(lines.line_col(9), (2, 3));
    }
}

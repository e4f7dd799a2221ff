//! Declaration nodes handed to the symbol table by the front end.
//!
//! The symbol table only reads these nodes, with two exceptions: a resolved
//! function call records its target declaration, and a resolved variable
//! reference records the variable it names together with its value kind.

use std::fmt;

use crate::arena::{Arena, Interner, NodeId, Symbol};

pub type SourceId = usize;
pub type Span = std::ops::Range<usize>;

/// Source location of a declaration: byte span plus the 1-based line and
/// column where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Loc {
    pub source: SourceId,
    pub span: Span,
    pub line: u32,
    pub column: u32,
}

impl Loc {
    pub fn new(source: SourceId, span: Span, line: u32, column: u32) -> Self {
        Loc {
            source,
            span,
            line,
            column,
        }
    }

    /// A location with a line and column but no byte span, for nodes built
    /// outside of a parsed source.
    pub fn at(line: u32, column: u32) -> Self {
        Loc::new(0, 0..0, line, column)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} column {}", self.line, self.column)
    }
}

impl ariadne::Span for Loc {
    type SourceId = SourceId;

    fn source(&self) -> &Self::SourceId {
        &self.source
    }

    fn start(&self) -> usize {
        self.span.start
    }

    fn end(&self) -> usize {
        self.span.end
    }
}

pub type DeclId = NodeId<Decl>;

#[derive(Default, Debug)]
pub struct Ast {
    pub decls: Arena<Decl>,
    pub symbols: Interner,
}

impl Ast {
    pub fn alloc(&mut self, kind: DeclKind, loc: Loc) -> DeclId {
        self.decls.alloc(Decl { loc, kind })
    }

    pub fn function(&mut self, name: &str, params: &[ValueKind], loc: Loc) -> DeclId {
        let name = self.symbols.intern(name);
        self.alloc(
            DeclKind::FunctionDecl(FunctionDecl {
                name,
                params: params.to_vec(),
                ret: None,
            }),
            loc,
        )
    }

    pub fn call(&mut self, name: &str, args: &[ValueKind], loc: Loc) -> DeclId {
        let name = self.symbols.intern(name);
        self.alloc(
            DeclKind::FunctionCall(FunctionCall {
                name,
                args: args.to_vec(),
                func_decl: None,
            }),
            loc,
        )
    }

    pub fn variable(&mut self, name: &str, kind: ValueKind, loc: Loc) -> DeclId {
        let name = self.symbols.intern(name);
        self.alloc(DeclKind::VariableDef(VariableDef { name, kind }), loc)
    }

    pub fn reference(&mut self, kind: ExprKind, target: &str, loc: Loc) -> DeclId {
        let target = self.symbols.intern(target);
        self.alloc(
            DeclKind::Expression(Expression {
                kind,
                target: Some(target),
                var_def: None,
                value_kind: None,
            }),
            loc,
        )
    }

    pub fn literal(&mut self, loc: Loc) -> DeclId {
        self.alloc(
            DeclKind::Expression(Expression {
                kind: ExprKind::Constant,
                target: None,
                var_def: None,
                value_kind: None,
            }),
            loc,
        )
    }

    pub fn label(&mut self, name: &str, loc: Loc) -> DeclId {
        let name = self.symbols.intern(name);
        self.alloc(DeclKind::Label(Label { name }), loc)
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        self.decls.get(id)
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.symbols.resolve(sym)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub loc: Loc,
    pub kind: DeclKind,
}

impl Decl {
    /// Name under which the node is bound or looked up. Non-reference
    /// expressions have none.
    pub fn name(&self) -> Option<Symbol> {
        match &self.kind {
            DeclKind::FunctionDecl(f) => Some(f.name),
            DeclKind::FunctionCall(c) => Some(c.name),
            DeclKind::VariableDef(v) => Some(v.name),
            DeclKind::Expression(e) => e.target,
            DeclKind::Label(l) => Some(l.name),
        }
    }

    pub fn tag(&self) -> DeclTag {
        self.kind.tag()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    FunctionDecl(FunctionDecl),
    FunctionCall(FunctionCall),
    VariableDef(VariableDef),
    Expression(Expression),
    Label(Label),
}

impl DeclKind {
    pub fn tag(&self) -> DeclTag {
        match self {
            DeclKind::FunctionDecl(_) => DeclTag::FunctionDecl,
            DeclKind::FunctionCall(_) => DeclTag::FunctionCall,
            DeclKind::VariableDef(_) => DeclTag::VariableDef,
            DeclKind::Expression(_) => DeclTag::Expression,
            DeclKind::Label(_) => DeclTag::Label,
        }
    }
}

/// Payload-free declaration kind, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclTag {
    FunctionDecl,
    FunctionCall,
    VariableDef,
    Expression,
    Label,
}

impl DeclTag {
    pub fn display_name(self) -> &'static str {
        match self {
            DeclTag::FunctionDecl => "function",
            DeclTag::FunctionCall => "function call",
            DeclTag::VariableDef => "variable",
            DeclTag::Expression => "expression",
            DeclTag::Label => "label",
        }
    }
}

impl fmt::Display for DeclTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Kind of value a variable holds or a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Array,
    Hash,
}

impl ValueKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Array => "array",
            ValueKind::Hash => "hash",
        }
    }

    pub fn sigil(self) -> char {
        match self {
            ValueKind::Scalar => '$',
            ValueKind::Array => '@',
            ValueKind::Hash => '%',
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub params: Vec<ValueKind>,
    pub ret: Option<ValueKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: Symbol,
    pub args: Vec<ValueKind>,
    /// Set once the call resolves to exactly one declaration.
    pub func_decl: Option<DeclId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDef {
    pub name: Symbol,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// `$name`: generic reference, valid against any variable kind.
    ScalarRef,
    /// `@name`
    ArrayRef,
    /// `%name`
    HashRef,
    Constant,
    Binary,
    Call,
}

impl ExprKind {
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            ExprKind::ScalarRef | ExprKind::ArrayRef | ExprKind::HashRef
        )
    }

    /// Value kind a typed reference insists on. The generic scalar
    /// reference and non-reference expressions have none.
    pub fn required_kind(self) -> Option<ValueKind> {
        match self {
            ExprKind::ArrayRef => Some(ValueKind::Array),
            ExprKind::HashRef => Some(ValueKind::Hash),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ExprKind::ScalarRef => "scalar reference",
            ExprKind::ArrayRef => "array reference",
            ExprKind::HashRef => "hash reference",
            ExprKind::Constant => "constant",
            ExprKind::Binary => "binary expression",
            ExprKind::Call => "call expression",
        }
    }
}

impl From<ValueKind> for ExprKind {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Scalar => ExprKind::ScalarRef,
            ValueKind::Array => ExprKind::ArrayRef,
            ValueKind::Hash => ExprKind::HashRef,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExprKind,
    /// Variable named by a reference expression.
    pub target: Option<Symbol>,
    pub var_def: Option<DeclId>,
    pub value_kind: Option<ValueKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: Symbol,
}

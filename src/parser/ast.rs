//! Abstract Syntax Tree types for compiled templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Variable or parameter name bound inside a template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Literal values written directly in template code
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    And,
    Or,
}

/// Expressions inside `{{ }}`, `{{{ }}}` and `<# #>` blocks
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Array(Vec<Spanned<Expr>>),
    Var(Identifier),
    /// `object.property`
    Member(Box<Spanned<Expr>>, Identifier),
    /// `object[index]`
    Index(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    Unary(UnaryOp, Box<Spanned<Expr>>),
    Binary(BinaryOp, Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// `cond ? then : otherwise`
    Conditional {
        cond: Box<Spanned<Expr>>,
        then: Box<Spanned<Expr>>,
        otherwise: Box<Spanned<Expr>>,
    },
}

/// Statements making up a template body
///
/// Literal text and interpolations are statements too, so a block opened in
/// one `<# #>` tag can span text up to the tag that closes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Literal markup copied to the output
    Text(String),
    /// `{{ expr }}` (escaped) or `{{{ expr }}}` (raw)
    Emit { expr: Spanned<Expr>, escape: bool },
    If {
        cond: Spanned<Expr>,
        then: Vec<Spanned<Stmt>>,
        otherwise: Option<Vec<Spanned<Stmt>>>,
    },
    /// `_.each(items, function(item, key) { ... });`
    Each {
        items: Spanned<Expr>,
        item: Identifier,
        key: Option<Identifier>,
        body: Vec<Spanned<Stmt>>,
    },
    /// `var name = value;` (also `let` / `const`)
    Let {
        name: Identifier,
        value: Spanned<Expr>,
    },
    /// `print(expr);` writes the value unescaped
    Print(Spanned<Expr>),
    /// Stray `;`
    Empty,
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Spanned<Stmt>>,
}

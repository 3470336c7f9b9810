//! The abstract syntax of the Python expression subset `hissp_core`'s
//! compiler emits: literals, attribute access, indexing, calls with
//! positional/keyword/`*`/`**` arguments, and lambdas. Nothing else, no
//! binary operators, no statements, no control flow.

/// One parsed expression.
#[derive(Clone, Debug)]
pub enum Expr {
    /// An integer literal.
    Int(i64),
    /// A floating-point literal.
    Float(f64),
    /// A complex literal, `(real, imag)`.
    Complex(f64, f64),
    /// `True` / `False`.
    Bool(bool),
    /// `None`.
    None,
    /// `...`.
    Ellipsis,
    /// A decoded string literal.
    Str(String),
    /// A decoded bytes literal.
    Bytes(Vec<u8>),
    /// A bare name, resolved against the calling scope and then the host's
    /// builtins.
    Name(String),
    /// `base.attr`.
    Attr(Box<Expr>, String),
    /// `base[index]`.
    Index(Box<Expr>, Box<Expr>),
    /// `callee(args...)`.
    Call(Box<Expr>, Vec<Arg>),
    /// `(a, b, ...)` — a tuple display. A bare parenthesized single
    /// expression with no trailing comma is not a tuple; the parser
    /// returns that inner expression directly instead.
    Tuple(Vec<Expr>),
    /// `[a, b, ...]`.
    List(Vec<Expr>),
    /// `{a, b, ...}`.
    Set(Vec<Expr>),
    /// `{k: v, ...}`.
    Dict(Vec<(Expr, Expr)>),
    /// `*expr`, valid only as an element of a [`Expr::Tuple`]/[`Expr::List`]
    /// display or as an [`Arg::Star`] in a call.
    Starred(Box<Expr>),
    /// `(lambda params: body)`.
    Lambda(Vec<Param>, Box<Expr>),
}

/// One argument in a call's parenthesized argument list.
#[derive(Clone, Debug)]
pub enum Arg {
    /// A plain positional argument.
    Positional(Expr),
    /// `name=expr`.
    Keyword(String, Expr),
    /// `*expr`: unpacks a tuple/list into positional arguments.
    Star(Expr),
    /// `**expr`: unpacks a dict into keyword arguments.
    DoubleStar(Expr),
}

/// One parameter in a lambda's parameter list.
#[derive(Clone, Debug)]
pub enum Param {
    /// A plain parameter name.
    Plain(String),
    /// `name=default`.
    Default(String, Expr),
    /// `*name`.
    Star(String),
    /// `**name`.
    DoubleStar(String),
    /// The bare `/` positional-only marker.
    Slash,
}

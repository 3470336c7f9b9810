//! Hissp's intermediate representation: the value produced by the reader
//! and consumed by the macroexpander and compiler.
//!
//! A [`Node`] is one of five shapes: an immutable [`Tuple`] of
//! child nodes, a [`Fragment`] whose text is host code, a [`StringLiteral`]
//! whose text is a complete host string expression, a [`Literal`] atom that
//! is self-evaluating, or a [`Foreign`] atom injected at read time with no
//! guaranteed literal form.

use crate::span::Span;

/// A self-evaluating atom with a canonical textual host form.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
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
    /// `...` (`Ellipsis`).
    Ellipsis,
    /// A bytes literal, read from a `b"…"`-style atom.
    Bytes(Vec<u8>),
    /// A compile-time collection literal (`[..]`, `{..}`, `{k:v,..}`),
    /// carried verbatim as already-host-legal source text.
    Collection(String),
}

/// An opaque value injected at read time via `.#`, with no statically known
/// literal host form. Carries a serialized payload (for the opaque
/// serialization fallback in the compiler) and a `repr` for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct Foreign {
    /// The object's stable binary serialization, produced by the host bridge.
    pub payload: Vec<u8>,
    /// A human-readable rendering of the object, used in compiler comments.
    pub repr: String,
    /// A cached literal rendering, if the compiler has already found one.
    pub literal: Option<String>,
}

impl Foreign {
    /// Creates a new opaque atom from its serialized payload and `repr`.
    #[must_use]
    pub fn new(payload: Vec<u8>, repr: impl Into<String>) -> Self {
        Self {
            payload,
            repr: repr.into(),
            literal: None,
        }
    }
}

/// A Hissp intermediate-representation node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// An ordered, immutable sequence of child nodes: a form.
    Tuple(im::Vector<Node>, Span),
    /// An atom whose text is host-language code: an identifier, attribute
    /// chain, module handle, or control word.
    Fragment(String, Span),
    /// An atom whose text is a complete host-language string expression
    /// (including quotes and escapes), produced from `"…"` / `#"…"` syntax.
    StringLiteral(String, Span),
    /// A self-evaluating literal with a canonical host rendering.
    SelfEvaluating(Literal, Span),
    /// An opaque object with no guaranteed literal form.
    ForeignAtom(Foreign, Span),
}

impl Node {
    /// Builds a [`Tuple`](Node::Tuple) node from an iterator of children.
    #[must_use]
    pub fn tuple(children: impl IntoIterator<Item = Node>, span: Span) -> Self {
        Self::Tuple(children.into_iter().collect(), span)
    }

    /// Builds a [`Fragment`](Node::Fragment) node.
    #[must_use]
    pub fn fragment(text: impl Into<String>, span: Span) -> Self {
        Self::Fragment(text.into(), span)
    }

    /// Returns the source span of this node.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Tuple(_, s)
            | Self::Fragment(_, s)
            | Self::StringLiteral(_, s)
            | Self::SelfEvaluating(_, s)
            | Self::ForeignAtom(_, s) => *s,
        }
    }

    /// Returns true if this node is a tuple.
    #[must_use]
    pub const fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple(_, _))
    }

    /// Returns true if this node is the empty tuple.
    #[must_use]
    pub fn is_empty_tuple(&self) -> bool {
        matches!(self, Self::Tuple(children, _) if children.is_empty())
    }

    /// Returns true if this node is a fragment.
    #[must_use]
    pub const fn is_fragment(&self) -> bool {
        matches!(self, Self::Fragment(_, _))
    }

    /// Returns the children of a tuple, or `None` otherwise.
    #[must_use]
    pub const fn as_tuple(&self) -> Option<&im::Vector<Node>> {
        match self {
            Self::Tuple(children, _) => Some(children),
            _ => None,
        }
    }

    /// Returns the text of a fragment, or `None` otherwise.
    #[must_use]
    pub fn as_fragment(&self) -> Option<&str> {
        match self {
            Self::Fragment(text, _) => Some(text),
            _ => None,
        }
    }

    /// Returns true if this fragment's text starts with `:` (a control word).
    #[must_use]
    pub fn is_control_word(&self) -> bool {
        self.as_fragment().is_some_and(|t| t.starts_with(':'))
    }

    /// Returns true if this fragment is a module handle: it ends in `.` or
    /// contains `..`.
    #[must_use]
    pub fn is_module_handle(&self) -> bool {
        self.as_fragment()
            .is_some_and(|t| t.ends_with('.') || t.contains(".."))
    }

    /// A human-readable type name, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Tuple(_, _) => "tuple",
            Self::Fragment(_, _) => "fragment",
            Self::StringLiteral(_, _) => "string",
            Self::SelfEvaluating(_, _) => "literal",
            Self::ForeignAtom(_, _) => "foreign",
        }
    }
}

#[cfg(test)]
impl Node {
    /// Creates a fragment with the default span (test helper).
    pub fn frag(text: impl Into<String>) -> Self {
        Self::Fragment(text.into(), Span::default())
    }

    /// Creates a tuple with the default span (test helper).
    pub fn tup(children: impl IntoIterator<Item = Node>) -> Self {
        Self::tuple(children, Span::default())
    }

    /// Creates an integer literal with the default span (test helper).
    pub fn int(n: i64) -> Self {
        Self::SelfEvaluating(Literal::Int(n), Span::default())
    }

    /// Creates a string literal with the default span (test helper).
    pub fn string(text: impl Into<String>) -> Self {
        Self::StringLiteral(text.into(), Span::default())
    }
}

//! Error types shared by every Hissp crate.
//!
//! Uses `thiserror` for ergonomic error definition. Every variant that can be
//! traced back to a location in source text carries a [`Span`].

use thiserror::Error;

use crate::span::Span;

/// The result type used throughout the Hissp crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Hissp operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Where in the source text this error originates, when known.
    pub span: Option<Span>,
}

impl Error {
    /// Creates a new error with no span attached.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }

    /// Attaches a span to this error.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Categorized error kinds, one family per pipeline stage.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A malformed token: unclosed string, stray control character, or a TAB
    /// encountered while indentation is being measured.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// Lexemes did not form a well-balanced, well-formed expression.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A reader-macro tag could not be resolved or misbehaved.
    #[error("tag error: {0}")]
    Tag(#[from] TagError),

    /// A symbol was qualified when it should not have been (or vice versa).
    #[error("qualification error: {0}")]
    Qualification(#[from] QualificationError),

    /// A macro body raised while expanding a form.
    #[error("expansion error at {site}: {cause}")]
    Expansion {
        /// The underlying failure raised by the macro's body.
        cause: Box<Error>,
        /// A short description of the macro invocation site.
        site: String,
    },

    /// The compiler could not emit code for an expanded form.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// An internal invariant was violated; should not happen in practice.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Malformed-token errors raised by the tokenizer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A string literal was never closed before end of input.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A backslash was followed by a character that is not a recognized escape.
    #[error("invalid escape sequence: \\{0}")]
    BadEscape(char),
    /// A TAB character appeared while indentation was being measured.
    #[error("TAB characters are not permitted in indentation")]
    TabInIndentation,
    /// A character is not valid anywhere in Lissp source.
    #[error("unexpected character: {0:?}")]
    UnexpectedChar(char),
}

/// Structural errors raised while assembling lexemes into Hissp values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An opening delimiter was never matched by a closing one.
    #[error("unbalanced delimiter: unclosed '('")]
    UnbalancedDelimiter,
    /// A closing delimiter appeared with no corresponding opening one.
    #[error("unexpected ')'")]
    UnexpectedCloseParen,
    /// A tag was the last lexeme in the input, with no primary argument to apply to.
    #[error("tag '{0}' has no following form")]
    TrailingTag(String),
    /// A tag's name is not a legal identifier once munged.
    #[error("invalid tag name: {0:?}")]
    InvalidTagName(String),
}

/// Errors raised while dispatching or invoking a reader-macro tag.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    /// No handler is registered for the named tag.
    #[error("unknown tag: {0}")]
    UnknownTag(String),
    /// The `.#` inject tag's argument raised while being evaluated at read time.
    #[error("read-time evaluation failed: {0}")]
    ReadTimeEvalFailure(String),
    /// An `!`-prefixed extra argument was malformed or out of place.
    #[error("invalid extra argument: {0}")]
    InvalidExtra(String),
    /// The `.#` inject tag was used on a reader constructed with injection disabled.
    #[error("read-time injection is disabled on this reader")]
    InjectDisabled,
}

/// Errors raised while auto-qualifying symbols inside a template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QualificationError {
    /// A fragment that was already fully qualified appeared directly under an
    /// unquote, which the template engine never qualifies in the first place.
    #[error("fragment {0:?} is already qualified under unquote")]
    AlreadyQualifiedUnderUnquote(String),
}

/// Errors raised while emitting host source for an expanded form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A tuple headed by `quote` or `lambda` did not match the special form's shape.
    #[error("bad special form `{0}`: {1}")]
    BadSpecialForm(String, String),
    /// A control-word pair region had a keyword with no matching value, or vice versa.
    #[error("unpaired keyword: {0}")]
    UnpairedKeyword(String),
    /// A tuple's head was neither a callable fragment nor a tuple (e.g. the empty tuple).
    #[error("illegal call head: {0}")]
    IllegalHead(String),
    /// A `Foreign` atom had no literal form and no serialization path was available.
    #[error("atom has no representable literal form: {0}")]
    UnrepresentableAtom(String),
}

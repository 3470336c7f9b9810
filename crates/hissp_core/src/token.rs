//! Lexeme types produced by the tokenizer, the input to the reader.

use crate::span::Span;

/// A single lexeme from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind and value of this lexeme.
    pub kind: TokenKind,
    /// Source location of this lexeme.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Returns true if this token opens a parenthesized form.
    #[must_use]
    pub const fn is_open_paren(&self) -> bool {
        matches!(self.kind, TokenKind::OpenParen)
    }

    /// Returns true if this token closes a parenthesized form.
    #[must_use]
    pub const fn is_close_paren(&self) -> bool {
        matches!(self.kind, TokenKind::CloseParen)
    }
}

/// The kind of string a [`TokenKind::String`] lexeme represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    /// A `"…"` string: doubled backslashes are required to escape a literal backslash.
    Raw,
    /// A `#"…"` string: ordinary host-style backslash escapes (`\n`, `\t`, …) apply.
    Hash,
}

/// The builtin reader-macro tags recognized directly by the tokenizer,
/// distinct from user-defined `name#` tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinTag {
    /// `'`
    Quote,
    /// `` ` ``
    Template,
    /// `,`
    Unquote,
    /// `,@`
    UnquoteSplice,
    /// `!`
    Extra,
}

/// Lexeme kinds for Lissp.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,

    /// An unbroken run of non-whitespace, non-paren, non-quote characters,
    /// subject to backslash-escaping of delimiters. Classified further by
    /// the reader (number, `True`/`False`/`None`/`...`, or symbol).
    Atom(String),

    /// A string literal lexeme, bounded by `"…"`, holding its *decoded*
    /// content plus which escaping convention produced it.
    String(String, StringKind),

    /// `;`-to-end-of-line text. Consecutive comment lines with the same
    /// leading semicolon count collapse into a single lexeme.
    Comment(String),

    /// One of the builtin single-character-or-digraph tags.
    Builtin(BuiltinTag),

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns true if this lexeme kind is discarded between reader calls.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Returns a human-readable name for this lexeme kind, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::Atom(_) => "atom",
            Self::String(_, StringKind::Raw) => "string",
            Self::String(_, StringKind::Hash) => "hash-string",
            Self::Comment(_) => "comment",
            Self::Builtin(BuiltinTag::Quote) => "'",
            Self::Builtin(BuiltinTag::Template) => "`",
            Self::Builtin(BuiltinTag::Unquote) => ",",
            Self::Builtin(BuiltinTag::UnquoteSplice) => ",@",
            Self::Builtin(BuiltinTag::Extra) => "!",
            Self::Eof => "end of input",
        }
    }
}

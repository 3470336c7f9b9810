//! Tokenizer for Lissp source text.
//!
//! Converts source text into a stream of [`Token`]s (lexemes). The
//! tokenizer never interprets an atom's meaning (number vs. symbol vs.
//! control word); that classification is the reader's job. It does,
//! however, decode string escapes and reject TAB characters used for
//! indentation, since both are purely lexical concerns.

use hissp_foundation::{Error, ErrorKind, LexError, Result};

use crate::span::Span;
use crate::token::{BuiltinTag, StringKind, Token, TokenKind};

/// Scans Lissp source text into a lazy stream of [`Token`]s.
pub struct Tokenizer<'src> {
    source: &'src str,
    rest: &'src str,
    position: usize,
    line: u32,
    column: u32,
    /// True while we are still consuming the leading whitespace of a line,
    /// i.e. before the first non-whitespace character on that line.
    at_line_indent: bool,
}

impl<'src> Tokenizer<'src> {
    /// Creates a new tokenizer over `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            at_line_indent: true,
        }
    }

    /// Returns the next lexeme, or a [`LexError`] at the first malformed token.
    ///
    /// # Errors
    /// Returns an error for unterminated strings, invalid escapes, stray
    /// characters, and TAB characters found while measuring indentation.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace()?;

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        if self.rest.is_empty() {
            return Ok(Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            ));
        }

        let c = self.peek_char().expect("rest is not empty");
        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::OpenParen
            }
            ')' => {
                self.advance();
                TokenKind::CloseParen
            }
            '\'' => {
                self.advance();
                TokenKind::Builtin(BuiltinTag::Quote)
            }
            '`' => {
                self.advance();
                TokenKind::Builtin(BuiltinTag::Template)
            }
            ',' => {
                self.advance();
                if self.peek_char() == Some('@') {
                    self.advance();
                    TokenKind::Builtin(BuiltinTag::UnquoteSplice)
                } else {
                    TokenKind::Builtin(BuiltinTag::Unquote)
                }
            }
            '!' => {
                self.advance();
                TokenKind::Builtin(BuiltinTag::Extra)
            }
            ';' => self.scan_comment(),
            '#' if self.peek_char_n(1) == Some('"') => {
                self.advance(); // consume '#'
                self.scan_string(StringKind::Hash)?
            }
            '"' => self.scan_string(StringKind::Raw)?,
            '[' | '{' => self.scan_bracket_atom()?,
            c if is_atom_char(c) || c == '\\' => self.scan_atom()?,
            c => {
                self.advance();
                return Err(
                    Error::new(ErrorKind::Lex(LexError::UnexpectedChar(c)))
                        .at(Span::new(start, self.position, start_line, start_column)),
                );
            }
        };

        Ok(Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        ))
    }

    /// Tokenizes all of `source`, returning every lexeme up to and including `Eof`.
    ///
    /// # Errors
    /// Returns the first error encountered.
    pub fn tokenize_all(source: &str) -> Result<Vec<Token>> {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
                self.at_line_indent = true;
            } else {
                self.column += 1;
                if !c.is_whitespace() {
                    self.at_line_indent = false;
                }
            }
        }
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek_char() {
            if c == '\t' && self.at_line_indent {
                let span = Span::new(self.position, self.position + 1, self.line, self.column);
                return Err(Error::new(ErrorKind::Lex(LexError::TabInIndentation)).at(span));
            } else if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    /// `;` to end of line. Adjacent comment lines that open with the same
    /// number of semicolons are collapsed into a single lexeme so that a
    /// block comment written as repeated `;;` lines reads as one unit.
    fn scan_comment(&mut self) -> TokenKind {
        let mut text = String::new();
        let leading = self.count_leading_semicolons();

        loop {
            while let Some(c) = self.peek_char() {
                if c == '\n' {
                    break;
                }
                text.push(c);
                self.advance();
            }

            let checkpoint = (self.rest, self.position, self.line, self.column);
            if self.peek_char() == Some('\n') {
                self.advance();
                if self.count_leading_semicolons() == leading {
                    text.push('\n');
                    continue;
                }
            }
            self.rest = checkpoint.0;
            self.position = checkpoint.1;
            self.line = checkpoint.2;
            self.column = checkpoint.3;
            break;
        }

        TokenKind::Comment(text)
    }

    fn count_leading_semicolons(&self) -> usize {
        self.rest.chars().take_while(|&c| c == ';').count()
    }

    fn scan_string(&mut self, kind: StringKind) -> Result<TokenKind> {
        let start_line = self.line;
        let start_column = self.column;
        self.advance(); // consume opening '"'
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let esc_line = self.line;
                    let esc_col = self.column;
                    self.advance();
                    match (kind, self.peek_char()) {
                        (StringKind::Hash, Some('n')) => {
                            self.advance();
                            text.push('\n');
                        }
                        (StringKind::Hash, Some('r')) => {
                            self.advance();
                            text.push('\r');
                        }
                        (StringKind::Hash, Some('t')) => {
                            self.advance();
                            text.push('\t');
                        }
                        (_, Some('\\')) => {
                            self.advance();
                            text.push('\\');
                        }
                        (_, Some('"')) => {
                            self.advance();
                            text.push('"');
                        }
                        // Raw strings only recognize `\\` and `\"`; any other
                        // backslash sequence is kept literally, both characters
                        // intact.
                        (StringKind::Raw, Some(c)) => {
                            self.advance();
                            text.push('\\');
                            text.push(c);
                        }
                        (StringKind::Hash, Some(c)) => {
                            return Err(Error::new(ErrorKind::Lex(LexError::BadEscape(c))).at(
                                Span::new(self.position, self.position, esc_line, esc_col),
                            ));
                        }
                        (_, None) => {
                            return Err(
                                Error::new(ErrorKind::Lex(LexError::UnterminatedString)).at(
                                    Span::new(self.position, self.position, esc_line, esc_col),
                                ),
                            );
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return Err(Error::new(ErrorKind::Lex(LexError::UnterminatedString))
                        .at(Span::new(self.position, self.position, start_line, start_column)));
                }
            }
        }
        Ok(TokenKind::String(text, kind))
    }

    /// Scans a bracketed compile-time collection literal (`[..]`, `{..}`),
    /// consuming balanced nested brackets and quoted strings as a single
    /// atom.
    fn scan_bracket_atom(&mut self) -> Result<TokenKind> {
        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;
        let mut text = String::new();
        let mut depth: u32 = 0;

        loop {
            match self.peek_char() {
                Some(c @ ('[' | '{')) => {
                    depth += 1;
                    text.push(c);
                    self.advance();
                }
                Some(c @ (']' | '}')) => {
                    text.push(c);
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some('"') => {
                    let string_start = self.position;
                    self.scan_string(StringKind::Raw)?;
                    text.push_str(&self.source[string_start..self.position]);
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => {
                    return Err(Error::new(ErrorKind::Lex(LexError::UnterminatedString))
                        .at(Span::new(start, self.position, start_line, start_column)));
                }
            }
        }

        Ok(TokenKind::Atom(text))
    }

    /// Scans a bare atom: a run of non-whitespace, non-paren, non-quote
    /// characters, where a backslash protects the following character from
    /// being treated as a delimiter (the backslash itself is dropped).
    fn scan_atom(&mut self) -> Result<TokenKind> {
        let start = self.position;
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some(c) => {
                            text.push(c);
                            self.advance();
                        }
                        None => {
                            return Err(Error::new(ErrorKind::Lex(LexError::UnterminatedString))
                                .at(Span::new(start, self.position, self.line, self.column)));
                        }
                    }
                }
                Some(c) if is_atom_char(c) => {
                    text.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(TokenKind::Atom(text))
    }
}

/// Characters that may appear unescaped inside a bare atom.
fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '\'' | '`' | ',' | '"' | ';')
}

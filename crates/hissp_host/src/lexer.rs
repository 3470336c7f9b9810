//! Lexical scanner for the host expression subset (see [`crate::parser`]).
//!
//! Mirrors the shape of `hissp_core`'s own tokenizer: a flat scan over
//! source text into a vector of [`Tok`]s, with string/bytes escape
//! decoding done here rather than deferred to the parser.

use hissp_foundation::{Error, ErrorKind, Result};

/// One lexeme of the host expression grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `=`
    Eq,
    /// `*`
    Star,
    /// `**`
    DStar,
    /// `/`
    Slash,
    /// The `lambda` keyword.
    Lambda,
    /// `True`
    True,
    /// `False`
    False,
    /// `None`
    NoneKw,
    /// A raw numeric literal, not yet classified as int/float/complex.
    Number(String),
    /// A decoded string literal's contents.
    Str(String),
    /// A decoded bytes literal's contents.
    Bytes(Vec<u8>),
    /// A bare identifier.
    Ident(String),
    /// End of input.
    Eof,
}

/// Scans `source` into a flat token vector, ending with [`Tok::Eof`].
///
/// # Errors
/// Returns an error on an unterminated string/bytes literal or an
/// unrecognized character.
pub fn lex(source: &str) -> Result<Vec<Tok>> {
    let chars: Vec<char> = source.chars().collect();
    let mut lexer = Lexer { chars, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok == Tok::Eof;
        tokens.push(tok);
        if done {
            break;
        }
    }
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Tok> {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return Ok(Tok::Eof);
        };

        match c {
            '(' => {
                self.advance();
                Ok(Tok::LParen)
            }
            ')' => {
                self.advance();
                Ok(Tok::RParen)
            }
            '[' => {
                self.advance();
                Ok(Tok::LBracket)
            }
            ']' => {
                self.advance();
                Ok(Tok::RBracket)
            }
            '{' => {
                self.advance();
                Ok(Tok::LBrace)
            }
            '}' => {
                self.advance();
                Ok(Tok::RBrace)
            }
            ',' => {
                self.advance();
                Ok(Tok::Comma)
            }
            ':' => {
                self.advance();
                Ok(Tok::Colon)
            }
            '=' => {
                self.advance();
                Ok(Tok::Eq)
            }
            '/' => {
                self.advance();
                Ok(Tok::Slash)
            }
            '*' => {
                self.advance();
                if self.peek() == Some('*') {
                    self.advance();
                    Ok(Tok::DStar)
                } else {
                    Ok(Tok::Star)
                }
            }
            '.' => {
                if self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.') {
                    self.advance();
                    self.advance();
                    self.advance();
                    Ok(Tok::Ellipsis)
                } else {
                    self.advance();
                    Ok(Tok::Dot)
                }
            }
            '\'' => self.scan_string().map(Tok::Str),
            '-' | '0'..='9' if self.looks_like_number() => Ok(Tok::Number(self.scan_number())),
            c if c.is_alphabetic() || c == '_' => self.scan_ident(),
            other => Err(Error::new(ErrorKind::Internal(format!(
                "unexpected character in host expression: {other:?}"
            )))),
        }
    }

    /// A `-` only starts a number here (the grammar has no subtraction
    /// operator); a bare `-` elsewhere is a malformed token.
    fn looks_like_number(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('-') => matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()),
            _ => false,
        }
    }

    fn consume_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_number(&mut self) -> String {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        self.consume_digits();
        if self.peek() == Some('.') {
            self.advance();
            self.consume_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            self.consume_digits();
        }
        if matches!(self.peek(), Some('+' | '-')) {
            self.advance();
            self.consume_digits();
            if self.peek() == Some('.') {
                self.advance();
                self.consume_digits();
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.consume_digits();
            }
        }
        if matches!(self.peek(), Some('j' | 'J')) {
            self.advance();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn scan_ident(&mut self) -> Result<Tok> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if text == "b" && self.peek() == Some('\'') {
            return self.scan_bytes().map(Tok::Bytes);
        }
        Ok(match text.as_str() {
            "lambda" => Tok::Lambda,
            "True" => Tok::True,
            "False" => Tok::False,
            "None" => Tok::NoneKw,
            _ => Tok::Ident(text),
        })
    }

    fn scan_string(&mut self) -> Result<String> {
        self.advance();
        let mut out = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(Error::new(ErrorKind::Internal(
                        "unterminated string in host expression".to_string(),
                    )))
                }
                Some('\'') => break,
                Some('\\') => out.push(self.scan_escape()?),
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn scan_escape(&mut self) -> Result<char> {
        match self.advance() {
            Some('\\') => Ok('\\'),
            Some('\'') => Ok('\''),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some(other) => Ok(other),
            None => Err(Error::new(ErrorKind::Internal(
                "unterminated escape in host expression".to_string(),
            ))),
        }
    }

    fn scan_bytes(&mut self) -> Result<Vec<u8>> {
        self.advance();
        let mut out = Vec::new();
        loop {
            match self.advance() {
                None => {
                    return Err(Error::new(ErrorKind::Internal(
                        "unterminated bytes literal in host expression".to_string(),
                    )))
                }
                Some('\'') => break,
                Some('\\') => {
                    if self.peek() == Some('x') {
                        self.advance();
                        let hi = self.advance().ok_or_else(|| {
                            Error::new(ErrorKind::Internal("bad \\x escape".to_string()))
                        })?;
                        let lo = self.advance().ok_or_else(|| {
                            Error::new(ErrorKind::Internal("bad \\x escape".to_string()))
                        })?;
                        let byte = u8::from_str_radix(&format!("{hi}{lo}"), 16).map_err(|_| {
                            Error::new(ErrorKind::Internal(format!("bad \\x escape: {hi}{lo}")))
                        })?;
                        out.push(byte);
                    } else {
                        out.push(self.scan_escape()? as u8);
                    }
                }
                Some(c) => out.push(c as u8),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_a_plain_call() {
        let toks = lex("print(1, 2)").unwrap();
        assert_eq!(
            toks,
            vec![
                Tok::Ident("print".to_string()),
                Tok::LParen,
                Tok::Number("1".to_string()),
                Tok::Comma,
                Tok::Number("2".to_string()),
                Tok::RParen,
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn lexes_negative_and_complex_numbers() {
        assert_eq!(lex("-1").unwrap()[0], Tok::Number("-1".to_string()));
        assert_eq!(lex("3+4j").unwrap()[0], Tok::Number("3+4j".to_string()));
        assert_eq!(lex("4j").unwrap()[0], Tok::Number("4j".to_string()));
    }

    #[test]
    fn lexes_keywords_distinctly_from_idents() {
        assert_eq!(lex("True").unwrap()[0], Tok::True);
        assert_eq!(lex("Truex").unwrap()[0], Tok::Ident("Truex".to_string()));
    }

    #[test]
    fn lexes_string_escapes() {
        let toks = lex("'a\\'b\\\\c'").unwrap();
        assert_eq!(toks[0], Tok::Str("a'b\\c".to_string()));
    }

    #[test]
    fn lexes_bytes_with_hex_escape() {
        let toks = lex("b'\\xde\\xad'").unwrap();
        assert_eq!(toks[0], Tok::Bytes(vec![0xde, 0xad]));
    }

    #[test]
    fn strips_trailing_comments() {
        let toks = lex("1  # a comment\n").unwrap();
        assert_eq!(toks, vec![Tok::Number("1".to_string()), Tok::Eof]);
    }

    #[test]
    fn lexes_ellipsis_distinctly_from_dot() {
        assert_eq!(lex("...").unwrap()[0], Tok::Ellipsis);
        assert_eq!(lex(".").unwrap()[0], Tok::Dot);
    }
}

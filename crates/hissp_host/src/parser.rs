//! Recursive-descent parser from the [`crate::lexer`]'s token stream to
//! [`Expr`]. There is no operator precedence to speak of: the grammar has
//! only primaries, postfix attribute/index/call chains, and the three
//! bracketed display forms.

use hissp_foundation::{Error, ErrorKind, Result};

use crate::expr::{Arg, Expr, Param};
use crate::lexer::{lex, Tok};

/// Parses one complete host expression from `source`.
///
/// # Errors
/// Returns an error if `source` is not a well-formed expression in the
/// subset grammar this parser recognizes.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    parser.expect(&Tok::Eof)?;
    Ok(expr)
}

fn parse_number(text: &str) -> Expr {
    if let Some(body) = text.strip_suffix(['j', 'J']) {
        let (re, im) = split_complex(body);
        return Expr::Complex(re, im);
    }
    if text.contains('.') || text.contains(['e', 'E']) {
        return Expr::Float(text.parse().unwrap_or(0.0));
    }
    Expr::Int(text.parse().unwrap_or(0))
}

/// Splits a complex literal's digits (with any trailing `j`/`J` already
/// removed) into its real and imaginary parts, at the last sign that does
/// not belong to an exponent.
fn split_complex(s: &str) -> (f64, f64) {
    let chars: Vec<char> = s.chars().collect();
    let mut split_at = None;
    for i in 1..chars.len() {
        if matches!(chars[i], '+' | '-') && !matches!(chars[i - 1], 'e' | 'E') {
            split_at = Some(i);
        }
    }
    match split_at {
        Some(i) => {
            let re: String = chars[..i].iter().collect();
            let im: String = chars[i..].iter().collect();
            (re.parse().unwrap_or(0.0), im.parse().unwrap_or(0.0))
        }
        None => (0.0, s.parse().unwrap_or(0.0)),
    }
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Tok {
        self.tokens.get(self.pos + offset).unwrap_or(&Tok::Eof)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Tok) -> Result<()> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(parse_error(format!(
                "expected {expected:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.advance() {
            Tok::Ident(name) => Ok(name),
            other => Err(parse_error(format!("expected identifier, found {other:?}"))),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr> {
        loop {
            match self.peek() {
                Tok::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    expr = Expr::Attr(Box::new(expr), name);
                }
                Tok::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&Tok::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                Tok::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(&Tok::RParen)?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Tok::Number(text) => Ok(parse_number(&text)),
            Tok::Str(text) => Ok(Expr::Str(text)),
            Tok::Bytes(bytes) => Ok(Expr::Bytes(bytes)),
            Tok::True => Ok(Expr::Bool(true)),
            Tok::False => Ok(Expr::Bool(false)),
            Tok::NoneKw => Ok(Expr::None),
            Tok::Ellipsis => Ok(Expr::Ellipsis),
            Tok::Ident(name) => Ok(Expr::Name(name)),
            Tok::Star => Ok(Expr::Starred(Box::new(self.parse_expr()?))),
            Tok::LParen => self.parse_parenthesized(),
            Tok::LBracket => self.parse_list(),
            Tok::LBrace => self.parse_brace(),
            other => Err(parse_error(format!("unexpected token: {other:?}"))),
        }
    }

    fn parse_parenthesized(&mut self) -> Result<Expr> {
        if self.peek() == &Tok::Lambda {
            self.advance();
            return self.parse_lambda();
        }
        if self.peek() == &Tok::RParen {
            self.advance();
            return Ok(Expr::Tuple(Vec::new()));
        }
        let first = self.parse_expr()?;
        if self.peek() != &Tok::Comma {
            self.expect(&Tok::RParen)?;
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek() == &Tok::Comma {
            self.advance();
            if self.peek() == &Tok::RParen {
                break;
            }
            items.push(self.parse_expr()?);
        }
        self.expect(&Tok::RParen)?;
        Ok(Expr::Tuple(items))
    }

    fn parse_lambda(&mut self) -> Result<Expr> {
        let mut params = Vec::new();
        loop {
            if self.peek() == &Tok::Colon {
                self.advance();
                break;
            }
            params.push(self.parse_param()?);
            match self.peek() {
                Tok::Comma => {
                    self.advance();
                }
                Tok::Colon => {
                    self.advance();
                    break;
                }
                other => return Err(parse_error(format!("expected ',' or ':' in lambda parameters, found {other:?}"))),
            }
        }
        let body = self.parse_expr()?;
        self.expect(&Tok::RParen)?;
        Ok(Expr::Lambda(params, Box::new(body)))
    }

    fn parse_param(&mut self) -> Result<Param> {
        match self.advance() {
            Tok::Slash => Ok(Param::Slash),
            Tok::Star => Ok(Param::Star(self.expect_ident()?)),
            Tok::DStar => Ok(Param::DoubleStar(self.expect_ident()?)),
            Tok::Ident(name) => {
                if self.peek() == &Tok::Eq {
                    self.advance();
                    let default = self.parse_expr()?;
                    Ok(Param::Default(name, default))
                } else {
                    Ok(Param::Plain(name))
                }
            }
            other => Err(parse_error(format!("expected a parameter, found {other:?}"))),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Arg>> {
        let mut args = Vec::new();
        while self.peek() != &Tok::RParen {
            args.push(self.parse_arg()?);
            if self.peek() == &Tok::Comma {
                self.advance();
            } else {
                break;
            }
        }
        Ok(args)
    }

    fn parse_arg(&mut self) -> Result<Arg> {
        match self.peek() {
            Tok::Star => {
                self.advance();
                Ok(Arg::Star(self.parse_expr()?))
            }
            Tok::DStar => {
                self.advance();
                Ok(Arg::DoubleStar(self.parse_expr()?))
            }
            Tok::Ident(_) if self.peek_at(1) == &Tok::Eq => {
                let name = self.expect_ident()?;
                self.advance();
                Ok(Arg::Keyword(name, self.parse_expr()?))
            }
            _ => Ok(Arg::Positional(self.parse_expr()?)),
        }
    }

    fn parse_list(&mut self) -> Result<Expr> {
        let mut items = Vec::new();
        while self.peek() != &Tok::RBracket {
            items.push(self.parse_list_item()?);
            if self.peek() == &Tok::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Tok::RBracket)?;
        Ok(Expr::List(items))
    }

    fn parse_list_item(&mut self) -> Result<Expr> {
        if self.peek() == &Tok::Star {
            self.advance();
            return Ok(Expr::Starred(Box::new(self.parse_expr()?)));
        }
        self.parse_expr()
    }

    fn parse_brace(&mut self) -> Result<Expr> {
        if self.peek() == &Tok::RBrace {
            self.advance();
            return Ok(Expr::Dict(Vec::new()));
        }
        let first = self.parse_list_item()?;
        if self.peek() == &Tok::Colon {
            self.advance();
            let value = self.parse_expr()?;
            let mut entries = vec![(first, value)];
            while self.peek() == &Tok::Comma {
                self.advance();
                if self.peek() == &Tok::RBrace {
                    break;
                }
                let key = self.parse_expr()?;
                self.expect(&Tok::Colon)?;
                let value = self.parse_expr()?;
                entries.push((key, value));
            }
            self.expect(&Tok::RBrace)?;
            return Ok(Expr::Dict(entries));
        }
        let mut items = vec![first];
        while self.peek() == &Tok::Comma {
            self.advance();
            if self.peek() == &Tok::RBrace {
                break;
            }
            items.push(self.parse_list_item()?);
        }
        self.expect(&Tok::RBrace)?;
        Ok(Expr::Set(items))
    }
}

fn parse_error(message: String) -> Error {
    Error::new(ErrorKind::Internal(format!("host expression parse error: {message}")))
}

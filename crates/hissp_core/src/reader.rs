//! The reader: turns a stream of [`Token`]s into Hissp [`Node`]s.
//!
//! The reader is the one stage that is genuinely stateful across an entire
//! source file: it owns the [`GensymGenerator`] (so that every `$#name`
//! across the whole read gets a counter unique to its enclosing template)
//! and, when asked to evaluate a `.#` inject, calls back into the
//! [`crate::compiler`] and the [`HostBridge`] to run read-time code.
//!
//! Tags are dispatched in two contexts. Outside any `` ` ``, `read_form`
//! handles everything directly and produces a plain [`Node`]. Inside a
//! template's argument, `,`/`,@`/`$#`/nested `` ` `` only make sense relative
//! to the enclosing template, so a parallel tree-walker,
//! `read_template_arg`, builds a [`TemplateForm`] instead and hands it to
//! [`crate::template::build`] once the whole argument has been read.

use hissp_foundation::{Error, ErrorKind, ParseError, Result, TagError};

use crate::gensym::GensymGenerator;
use crate::host::HostBridge;
use crate::ir::{Foreign, Literal, Node};
use crate::macro_def::invoke_macro;
use crate::macro_registry::{resolve_head, HeadResolution};
use crate::munge::munge;
use crate::span::Span;
use crate::template::{self, TemplateForm};
use crate::token::{BuiltinTag, StringKind, Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::value::{python_str_literal, Namespace, Value};

/// Settings a [`Reader`] is constructed with.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// The dotted module path symbols read from this source are qualified
    /// against.
    pub module: String,
    /// Whether `.#` read-time injection is permitted. An embedder reading
    /// untrusted source can set this to `false`, since read-time injection
    /// is a trust boundary.
    pub allow_inject: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            module: "__main__".to_string(),
            allow_inject: true,
        }
    }
}

impl ReaderConfig {
    /// Creates a config for `module` with injection enabled.
    #[must_use]
    pub fn for_module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }
}

/// Parses Lissp source text into a sequence of [`Node`]s.
pub struct Reader<'src> {
    tokenizer: Tokenizer<'src>,
    peeked: Option<Token>,
    config: ReaderConfig,
    gensym: GensymGenerator,
    template_ids: Vec<u64>,
}

impl<'src> Reader<'src> {
    /// Creates a reader over `source` with the given configuration.
    #[must_use]
    pub fn new(source: &'src str, config: ReaderConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
            peeked: None,
            config,
            gensym: GensymGenerator::new(),
            template_ids: Vec::new(),
        }
    }

    /// Reads the next top-level form, or `None` at end of input.
    ///
    /// # Errors
    /// Returns an error for malformed lexemes, unbalanced delimiters, or a
    /// misused reader-macro tag.
    pub fn read_one(&mut self, host: &dyn HostBridge, ns: &Namespace) -> Result<Option<Node>> {
        self.read_form(host, ns)
    }

    /// Reads every remaining top-level form.
    ///
    /// # Errors
    /// See [`Reader::read_one`].
    pub fn read_all(&mut self, host: &dyn HostBridge, ns: &Namespace) -> Result<Vec<Node>> {
        let mut forms = Vec::new();
        while let Some(form) = self.read_one(host, ns)? {
            forms.push(form);
        }
        Ok(forms)
    }

    fn peek(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.tokenizer.next_token()?);
        }
        Ok(self.peeked.as_ref().expect("just populated"))
    }

    fn bump(&mut self) -> Result<Token> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.tokenizer.next_token(),
        }
    }

    fn skip_comments(&mut self) -> Result<()> {
        while matches!(self.peek()?.kind, TokenKind::Comment(_)) {
            self.bump()?;
        }
        Ok(())
    }

    /// Collects any `!`-prefixed extras immediately preceding a tag.
    /// Each extra is read as a plain, non-template form.
    fn collect_extras(&mut self, host: &dyn HostBridge, ns: &Namespace) -> Result<Vec<Node>> {
        let mut extras = Vec::new();
        while matches!(self.peek()?.kind, TokenKind::Builtin(BuiltinTag::Extra)) {
            let bang = self.bump()?;
            match self.read_form(host, ns)? {
                Some(node) => extras.push(node),
                None => {
                    return Err(Error::new(ErrorKind::Tag(TagError::InvalidExtra(
                        "'!' must be followed by a value, not end of input".to_string(),
                    )))
                    .at(bang.span));
                }
            }
        }
        Ok(extras)
    }

    fn require_form(&mut self, host: &dyn HostBridge, ns: &Namespace, tag_span: Span) -> Result<Node> {
        self.read_form(host, ns)?.ok_or_else(|| {
            Error::new(ErrorKind::Parse(ParseError::TrailingTag(
                "reader macro".to_string(),
            )))
            .at(tag_span)
        })
    }

    fn require_template_form(
        &mut self,
        host: &dyn HostBridge,
        ns: &Namespace,
        tag_span: Span,
    ) -> Result<TemplateForm> {
        self.read_template_arg(host, ns)?.ok_or_else(|| {
            Error::new(ErrorKind::Parse(ParseError::TrailingTag(
                "reader macro".to_string(),
            )))
            .at(tag_span)
        })
    }

    // ---- plain (non-template) reading ----------------------------------

    fn read_form(&mut self, host: &dyn HostBridge, ns: &Namespace) -> Result<Option<Node>> {
        self.skip_comments()?;
        let extras = self.collect_extras(host, ns)?;
        self.skip_comments()?;
        let tok = self.bump()?;
        match tok.kind {
            TokenKind::Eof => {
                if extras.is_empty() {
                    Ok(None)
                } else {
                    Err(Error::new(ErrorKind::Parse(ParseError::TrailingTag("!".to_string())))
                        .at(tok.span))
                }
            }
            TokenKind::CloseParen => {
                Err(Error::new(ErrorKind::Parse(ParseError::UnexpectedCloseParen)).at(tok.span))
            }
            TokenKind::OpenParen => {
                reject_extras(&extras, "a parenthesized form", tok.span)?;
                self.read_list(host, ns, tok.span)
            }
            TokenKind::String(text, kind) => {
                reject_extras(&extras, "a string literal", tok.span)?;
                Ok(Some(Node::StringLiteral(
                    render_string_literal(&text, kind),
                    tok.span,
                )))
            }
            TokenKind::Atom(text) => self.read_atom_or_tag(text, tok.span, extras, host, ns),
            TokenKind::Builtin(tag) => self.read_builtin(tag, tok.span, extras, host, ns),
            TokenKind::Comment(_) => unreachable!("comments are skipped before dispatch"),
        }
    }

    fn read_list(&mut self, host: &dyn HostBridge, ns: &Namespace, open_span: Span) -> Result<Option<Node>> {
        let mut children = Vec::new();
        loop {
            self.skip_comments()?;
            if matches!(self.peek()?.kind, TokenKind::CloseParen) {
                let close = self.bump()?;
                return Ok(Some(Node::tuple(children, open_span.to(close.span))));
            }
            if matches!(self.peek()?.kind, TokenKind::Eof) {
                return Err(Error::new(ErrorKind::Parse(ParseError::UnbalancedDelimiter)).at(open_span));
            }
            if let Some(node) = self.read_form(host, ns)? {
                children.push(node);
            }
        }
    }

    fn read_atom_or_tag(
        &mut self,
        text: String,
        span: Span,
        extras: Vec<Node>,
        host: &dyn HostBridge,
        ns: &Namespace,
    ) -> Result<Option<Node>> {
        if text == ".#" {
            return Ok(Some(self.read_inject(span, extras, host, ns)?));
        }
        if text == "_#" {
            reject_extras(&extras, "'_#'", span)?;
            let _discarded = self.require_form(host, ns, span)?;
            return Ok(None);
        }
        if text == "$#" {
            return Err(Error::new(ErrorKind::Tag(TagError::InvalidExtra(
                "'$#' used outside of a template".to_string(),
            )))
            .at(span));
        }
        if is_name_tag(&text) {
            let tag_name = text[..text.len() - 1].to_string();
            return Ok(Some(self.read_name_tag(&tag_name, span, extras, host, ns)?));
        }
        reject_extras(&extras, "a plain atom", span)?;
        Ok(Some(self.read_plain_atom_value(&text, span)?))
    }

    fn read_builtin(
        &mut self,
        tag: BuiltinTag,
        span: Span,
        extras: Vec<Node>,
        host: &dyn HostBridge,
        ns: &Namespace,
    ) -> Result<Option<Node>> {
        match tag {
            BuiltinTag::Quote => {
                reject_extras(&extras, "'''", span)?;
                let arg = self.require_form(host, ns, span)?;
                Ok(Some(Node::tuple([Node::fragment("quote", span), arg], span)))
            }
            BuiltinTag::Template => {
                reject_extras(&extras, "'`'", span)?;
                let template_id = self.gensym.next_template_id();
                self.template_ids.push(template_id);
                let form = self.require_template_form(host, ns, span);
                self.template_ids.pop();
                Ok(Some(template::build(&form?, &self.config.module)?))
            }
            BuiltinTag::Unquote => Err(unquote_outside_template(",", span)),
            BuiltinTag::UnquoteSplice => Err(unquote_outside_template(",@", span)),
            BuiltinTag::Extra => unreachable!("handled by collect_extras before dispatch"),
        }
    }

    // ---- template-argument reading --------------------------------------

    fn read_template_arg(&mut self, host: &dyn HostBridge, ns: &Namespace) -> Result<Option<TemplateForm>> {
        self.skip_comments()?;
        let extras = self.collect_extras(host, ns)?;
        self.skip_comments()?;
        let tok = self.bump()?;
        match tok.kind {
            TokenKind::Eof => {
                if extras.is_empty() {
                    Ok(None)
                } else {
                    Err(Error::new(ErrorKind::Parse(ParseError::TrailingTag("!".to_string())))
                        .at(tok.span))
                }
            }
            TokenKind::CloseParen => {
                Err(Error::new(ErrorKind::Parse(ParseError::UnexpectedCloseParen)).at(tok.span))
            }
            TokenKind::OpenParen => {
                reject_extras(&extras, "a parenthesized form", tok.span)?;
                self.read_template_list(host, ns, tok.span)
            }
            TokenKind::String(text, kind) => {
                reject_extras(&extras, "a string literal", tok.span)?;
                Ok(Some(TemplateForm::Atom(Node::StringLiteral(
                    render_string_literal(&text, kind),
                    tok.span,
                ))))
            }
            TokenKind::Atom(text) => self.read_template_atom_or_tag(text, tok.span, extras, host, ns),
            TokenKind::Builtin(tag) => self.read_template_builtin(tag, tok.span, extras, host, ns),
            TokenKind::Comment(_) => unreachable!("comments are skipped before dispatch"),
        }
    }

    fn read_template_list(
        &mut self,
        host: &dyn HostBridge,
        ns: &Namespace,
        open_span: Span,
    ) -> Result<Option<TemplateForm>> {
        let mut children = Vec::new();
        loop {
            self.skip_comments()?;
            if matches!(self.peek()?.kind, TokenKind::CloseParen) {
                let close = self.bump()?;
                return Ok(Some(TemplateForm::Tuple(children, open_span.to(close.span))));
            }
            if matches!(self.peek()?.kind, TokenKind::Eof) {
                return Err(Error::new(ErrorKind::Parse(ParseError::UnbalancedDelimiter)).at(open_span));
            }
            if let Some(form) = self.read_template_arg(host, ns)? {
                children.push(form);
            }
        }
    }

    fn read_template_atom_or_tag(
        &mut self,
        text: String,
        span: Span,
        extras: Vec<Node>,
        host: &dyn HostBridge,
        ns: &Namespace,
    ) -> Result<Option<TemplateForm>> {
        if text == ".#" {
            let node = self.read_inject(span, extras, host, ns)?;
            return Ok(Some(TemplateForm::Atom(node)));
        }
        if text == "_#" {
            reject_extras(&extras, "'_#'", span)?;
            let _discarded = self.require_template_form(host, ns, span)?;
            return Ok(None);
        }
        if text == "$#" {
            reject_extras(&extras, "'$#'", span)?;
            let base_form = self.require_form(host, ns, span)?;
            let base = base_form.as_fragment().ok_or_else(|| {
                Error::new(ErrorKind::Tag(TagError::InvalidExtra(
                    "'$#' must be followed by a plain symbol".to_string(),
                )))
                .at(span)
            })?;
            let template_id = *self.template_ids.last().ok_or_else(|| {
                Error::new(ErrorKind::Tag(TagError::InvalidExtra(
                    "'$#' used outside of a template".to_string(),
                )))
                .at(span)
            })?;
            let renamed = GensymGenerator::rename(base, template_id);
            return Ok(Some(TemplateForm::Atom(Node::fragment(renamed, span))));
        }
        if is_name_tag(&text) {
            let tag_name = text[..text.len() - 1].to_string();
            let node = self.read_name_tag(&tag_name, span, extras, host, ns)?;
            return Ok(Some(TemplateForm::Atom(node)));
        }
        reject_extras(&extras, "a plain atom", span)?;
        Ok(Some(TemplateForm::Atom(self.read_plain_atom_value(&text, span)?)))
    }

    fn read_template_builtin(
        &mut self,
        tag: BuiltinTag,
        span: Span,
        extras: Vec<Node>,
        host: &dyn HostBridge,
        ns: &Namespace,
    ) -> Result<Option<TemplateForm>> {
        match tag {
            BuiltinTag::Quote => {
                reject_extras(&extras, "'''", span)?;
                let inner = self.require_template_form(host, ns, span)?;
                Ok(Some(TemplateForm::Tuple(
                    vec![TemplateForm::Atom(Node::fragment("quote", span)), inner],
                    span,
                )))
            }
            BuiltinTag::Template => {
                reject_extras(&extras, "'`'", span)?;
                let template_id = self.gensym.next_template_id();
                self.template_ids.push(template_id);
                let inner = self.require_template_form(host, ns, span);
                self.template_ids.pop();
                Ok(Some(TemplateForm::Nested(Box::new(inner?), template_id)))
            }
            BuiltinTag::Unquote => {
                reject_extras(&extras, "','", span)?;
                let node = self.require_form(host, ns, span)?;
                Ok(Some(TemplateForm::Unquote(node)))
            }
            BuiltinTag::UnquoteSplice => {
                reject_extras(&extras, "',@'", span)?;
                let node = self.require_form(host, ns, span)?;
                Ok(Some(TemplateForm::UnquoteSplice(node)))
            }
            BuiltinTag::Extra => unreachable!("handled by collect_extras before dispatch"),
        }
    }

    // ---- shared tag handlers ---------------------------------------------

    /// `.#`: compiles and evaluates its argument at read time, converting
    /// the result back into IR.
    fn read_inject(
        &mut self,
        span: Span,
        extras: Vec<Node>,
        host: &dyn HostBridge,
        ns: &Namespace,
    ) -> Result<Node> {
        if !self.config.allow_inject {
            return Err(Error::new(ErrorKind::Tag(TagError::InjectDisabled)).at(span));
        }
        reject_extras(&extras, "'.#'", span)?;
        let arg = self.require_form(host, ns, span)?;
        let source = crate::compiler::compile_node(&arg, &self.config.module)?;
        let value = host
            .eval(&source, ns)
            .map_err(|err| Error::new(ErrorKind::Tag(TagError::ReadTimeEvalFailure(err.to_string()))).at(span))?;
        Ok(value_to_node(&value, host, span))
    }

    /// `name#` / `module..name#`: resolves and invokes the named tag
    /// function on its primary argument plus any collected extras,
    /// splicing the result into the tree in its place.
    fn read_name_tag(
        &mut self,
        tag_name: &str,
        span: Span,
        extras: Vec<Node>,
        host: &dyn HostBridge,
        ns: &Namespace,
    ) -> Result<Node> {
        let primary = self.require_form(host, ns, span)?;
        match resolve_head(tag_name, &self.config.module, ns, host)? {
            HeadResolution::Macro {
                macro_fn,
                qualified_name,
            } => {
                let mut args = Vec::with_capacity(1 + extras.len());
                args.push(primary);
                args.extend(extras);
                invoke_macro(&macro_fn, &args, format!("{qualified_name}#"))
            }
            HeadResolution::RewriteTo(_) | HeadResolution::NotMacro => {
                Err(Error::new(ErrorKind::Tag(TagError::UnknownTag(tag_name.to_string()))).at(span))
            }
        }
    }

    /// Classifies a plain atom, fusing a leading `b` with an immediately
    /// adjacent string lexeme into a bytes literal (`b"…"`).
    fn read_plain_atom_value(&mut self, text: &str, span: Span) -> Result<Node> {
        if text == "b" {
            if let TokenKind::String(_, _) = self.peek()?.kind {
                if self.peek()?.span.start == span.end {
                    let next = self.bump()?;
                    if let TokenKind::String(content, _) = next.kind {
                        return Ok(Node::SelfEvaluating(
                            Literal::Bytes(content.into_bytes()),
                            span.to(next.span),
                        ));
                    }
                }
            }
        }
        Ok(classify_atom(text, span))
    }
}

fn reject_extras(extras: &[Node], what: &str, span: Span) -> Result<()> {
    if extras.is_empty() {
        Ok(())
    } else {
        Err(
            Error::new(ErrorKind::Tag(TagError::InvalidExtra(format!(
                "'!' extras are only meaningful immediately before a tag, not before {what}"
            ))))
            .at(span),
        )
    }
}

fn unquote_outside_template(spelling: &str, span: Span) -> Error {
    Error::new(ErrorKind::Tag(TagError::InvalidExtra(format!(
        "'{spelling}' used outside of a template"
    ))))
    .at(span)
}

/// True for atoms ending in a bare `#` that name a tag function: `foo#`,
/// `pkg.mod..foo#`. Excludes the three builtin-shaped atoms, which are
/// handled by their own dedicated branches.
fn is_name_tag(text: &str) -> bool {
    text.len() > 1 && text.ends_with('#') && text != ".#" && text != "_#" && text != "$#"
}

/// Classifies a bare atom's text into the IR node it denotes:
/// `True`/`False`/`None`/`...`, a bracketed compile-time collection, a
/// number, a control word, or a (possibly dotted) fragment.
fn classify_atom(text: &str, span: Span) -> Node {
    match text {
        "True" => return Node::SelfEvaluating(Literal::Bool(true), span),
        "False" => return Node::SelfEvaluating(Literal::Bool(false), span),
        "None" => return Node::SelfEvaluating(Literal::None, span),
        "..." => return Node::SelfEvaluating(Literal::Ellipsis, span),
        _ => {}
    }
    if text.starts_with('[') || text.starts_with('{') {
        return Node::SelfEvaluating(Literal::Collection(text.to_string()), span);
    }
    if let Some(literal) = try_parse_number(text) {
        return Node::SelfEvaluating(literal, span);
    }
    if text.starts_with(':') {
        // Control word: carried verbatim, never munged.
        return Node::Fragment(text.to_string(), span);
    }
    if text.contains('.') {
        let qualified = text.split('.').map(munge).collect::<Vec<_>>().join(".");
        return Node::Fragment(qualified, span);
    }
    Node::Fragment(munge(text), span)
}

/// Parses a Lissp numeric atom: integer, float, or (pure-imaginary) complex.
/// Anything that does not start with a digit, or a sign followed by a
/// digit, is not a number and is left for symbol classification instead.
fn try_parse_number(text: &str) -> Option<Literal> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let starts_numeric = first.is_ascii_digit()
        || ((first == '+' || first == '-') && chars.next().is_some_and(|c| c.is_ascii_digit()));
    if !starts_numeric {
        return None;
    }

    let cleaned: String = text.chars().filter(|&c| c != '_').collect();

    if let Some(imag_text) = cleaned.strip_suffix(['j', 'J']) {
        let imag: f64 = imag_text.parse().ok()?;
        return Some(Literal::Complex(0.0, imag));
    }
    if cleaned.contains('.') || cleaned.contains('e') || cleaned.contains('E') {
        let value: f64 = cleaned.parse().ok()?;
        return Some(Literal::Float(value));
    }
    let value: i64 = cleaned.parse().ok()?;
    Some(Literal::Int(value))
}

/// Renders a decoded string lexeme's content as a complete, quoted host
/// string expression (`Node::StringLiteral` carries source text, not a
/// decoded value).
fn render_string_literal(text: &str, _kind: StringKind) -> String {
    python_str_literal(text)
}

/// Converts a value produced by `HostBridge::eval` back into IR, for `.#`
/// inject. Values with a canonical literal rendering
/// become self-evaluating atoms; anything else becomes a `Foreign` atom,
/// via the compiler's opaque-serialization fallback at emit time.
fn value_to_node(value: &Value, host: &dyn HostBridge, span: Span) -> Node {
    if let Value::Str(text) = value {
        return Node::StringLiteral(python_str_literal(text), span);
    }
    if let Some(literal) = value_to_simple_literal(value) {
        return Node::SelfEvaluating(literal, span);
    }
    if let Some(rendering) = value.literal() {
        // A collection whose elements all have literal forms: carried
        // verbatim, the same as a reader-level bracket literal.
        return Node::SelfEvaluating(Literal::Collection(rendering), span);
    }
    Node::ForeignAtom(Foreign::new(Vec::new(), host.repr(value)), span)
}

fn value_to_simple_literal(value: &Value) -> Option<Literal> {
    match value {
        Value::None => Some(Literal::None),
        Value::Bool(b) => Some(Literal::Bool(*b)),
        Value::Int(n) => Some(Literal::Int(*n)),
        Value::Float(n) => Some(Literal::Float(*n)),
        Value::Complex(re, im) => Some(Literal::Complex(*re, *im)),
        Value::Bytes(b) => Some(Literal::Bytes(b.clone())),
        Value::Ellipsis => Some(Literal::Ellipsis),
        _ => None,
    }
}

//! Quasiquote template processing.
//!
//! The reader hands a freshly parsed `` ` `` form to [`build`] as a
//! [`TemplateForm`] tree: a shape parallel to [`Node`] but with unquote,
//! unquote-splice, and nested-template positions still distinguished (the
//! reader cannot collapse them into plain [`Node`]s, since what each one
//! means depends on where it sits relative to its enclosing template).
//!
//! `build` performs the substitution in one pass:
//! - a literal symbol is auto-qualified with its defining module, so a
//!   macro's template refers unambiguously to *that* module's bindings
//!   however it gets used downstream;
//! - a symbol in head position is qualified with the [`MAYBE_MARKER`]
//!   mnemonic instead, deferring the macro-or-not decision to expansion
//!   time;
//! - a `$#name` gensym (already renamed by the reader against the
//!   template's id) is left untouched, since it is a fresh local name, not
//!   a reference into any namespace;
//! - `,form` substitutes `form` itself, unprocessed;
//! - `,@form` splices `form`'s value into the surrounding tuple;
//! - a nested template builds independently, with its own gensym id, and
//!   is substituted into the outer template like an unquote.
//!
//! The result is IR for constructing the template's value: a tuple literal
//! becomes a call on the reserved [`TEMPLATE_TUPLE_MARKER`] head, whose
//! arguments reuse the ordinary call convention's `:` (insert one item) and
//! `:*` (splice an iterable of items) control words. The
//! compiler recognizes this marker and emits a tuple-construction
//! expression instead of an ordinary call.

use hissp_foundation::{Error, ErrorKind, Result, TagError};

use crate::ir::Node;
use crate::macro_registry::MAYBE_MARKER;
use crate::span::Span;

/// The reserved call head a processed template tuple is built on. Shaped
/// like a control word so it can never collide with a user identifier.
pub const TEMPLATE_TUPLE_MARKER: &str = ":hissp.template-tuple";

/// A template's children as the reader sees them: same shape as [`Node`],
/// but with unquote/splice/nesting still explicit.
#[derive(Clone, Debug)]
pub enum TemplateForm {
    /// A plain, not-unquoted atom or tuple read directly from source.
    Atom(Node),
    /// A tuple whose children are themselves template forms.
    Tuple(Vec<TemplateForm>, Span),
    /// `,form`: substitute the already-read form as-is.
    Unquote(Node),
    /// `,@form`: splice the already-read form's value into this position.
    UnquoteSplice(Node),
    /// A nested `` ` ``: built independently, with its own gensym id.
    Nested(Box<TemplateForm>, u64),
}

impl TemplateForm {
    fn span(&self) -> Span {
        match self {
            Self::Atom(node) => node.span(),
            Self::Tuple(_, span) => *span,
            Self::Unquote(node) | Self::UnquoteSplice(node) => node.span(),
            Self::Nested(inner, _) => inner.span(),
        }
    }
}

/// Builds the IR for constructing a template's value.
///
/// `gensym_id` is the id the reader assigned when it opened this template
/// (see [`crate::gensym::GensymGenerator`]); `module` is the dotted path of
/// the module the template's symbols are qualified against.
///
/// # Errors
/// Returns `TagError::InvalidExtra` if `,@` appears outside a tuple
/// position, where splicing is meaningless.
pub fn build(form: &TemplateForm, module: &str) -> Result<Node> {
    build_at(form, module, true)
}

fn build_at(form: &TemplateForm, module: &str, is_head: bool) -> Result<Node> {
    match form {
        TemplateForm::Atom(node) => Ok(quote_atom(node, module, is_head)),
        TemplateForm::Unquote(node) => Ok(node.clone()),
        TemplateForm::UnquoteSplice(node) => Err(Error::new(ErrorKind::Tag(
            TagError::InvalidExtra(format!(
                "',@' is only meaningful inside a tuple, not as a bare template ({})",
                node.type_name()
            )),
        ))
        .at(node.span())),
        TemplateForm::Nested(inner, _gensym_id) => build(inner, module),
        TemplateForm::Tuple(children, span) => build_tuple(children, module, *span),
    }
}

fn build_tuple(children: &[TemplateForm], module: &str, span: Span) -> Result<Node> {
    let mut items = Vec::with_capacity(children.len() + 1);
    items.push(Node::fragment(TEMPLATE_TUPLE_MARKER, span));

    for (index, child) in children.iter().enumerate() {
        let is_head = index == 0;
        match child {
            TemplateForm::UnquoteSplice(node) => {
                items.push(Node::tuple(
                    [Node::fragment(":*", node.span()), node.clone()],
                    node.span(),
                ));
            }
            other => {
                let built = build_at(other, module, is_head)?;
                items.push(Node::tuple(
                    [Node::fragment(":", built.span()), built],
                    other.span(),
                ));
            }
        }
    }

    Ok(Node::tuple(items, span))
}

/// Qualifies (or gensym-preserves) a literal atom read inside a template.
fn quote_atom(node: &Node, module: &str, is_head: bool) -> Node {
    match node {
        Node::Fragment(text, span) => {
            Node::Fragment(qualify_symbol(text, module, is_head), *span)
        }
        other => other.clone(),
    }
}

/// Decides the qualified text for a bare fragment appearing in a template.
///
/// Control words, already-qualified names, the two special forms, and
/// already-renamed gensyms pass through untouched. A head-position name is
/// qualified with [`MAYBE_MARKER`] to defer the macro-or-not decision;
/// anything else is qualified plainly.
#[must_use]
pub fn qualify_symbol(text: &str, module: &str, is_head: bool) -> String {
    if text.starts_with(':')
        || text.starts_with('.')
        || text.contains("..")
        || text.ends_with('.')
        || text == "quote"
        || text == "lambda"
        || is_gensym_rename(text)
    {
        return text.to_string();
    }
    if is_head {
        format!("{module}..{MAYBE_MARKER}.{text}")
    } else {
        format!("{module}..{text}")
    }
}

/// Returns true if `text` looks like the result of
/// [`crate::gensym::GensymGenerator::rename`]: `<base>_QzNo<digits>_`.
#[must_use]
pub fn is_gensym_rename(text: &str) -> bool {
    let Some(rest) = text.rsplit_once("_QzNo") else {
        return false;
    };
    let digits = rest.1.strip_suffix('_').unwrap_or(rest.1);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

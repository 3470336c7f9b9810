//! Inverse printer: renders Hissp IR back to Lissp surface text.
//!
//! This is the direction opposite the reader, needed for the "reader
//! preservation" property — `read(emit(read(P)))` should yield the same IR
//! as `read(P)` for any syntactically valid `P`. It is a *documentation and
//! testing* tool, not part of the compiler's own pipeline: nothing in
//! [`crate::compiler`] calls it, and it makes no claim to reproduce a
//! source program's original formatting, comments, or reader-macro
//! shorthand (`'`, `` ` ``, `,`, `,@` are not reconstructed; a template's
//! processed [`crate::template::TEMPLATE_TUPLE_MARKER`] form prints as the
//! ordinary tuple-construction call it already compiles to).
//!
//! # Example
//!
//! ```
//! use hissp_core::ir::Node;
//! use hissp_core::pretty::emit;
//!
//! let form = Node::tup(vec![Node::frag("add"), Node::int(1), Node::int(2)]);
//! assert_eq!(emit(&form), "(add 1 2)");
//! ```

use crate::ir::{Foreign, Literal, Node};
use crate::munge::demunge;
use crate::value::python_bytes_literal;

/// Renders one IR node as Lissp text.
#[must_use]
pub fn emit(node: &Node) -> String {
    match node {
        Node::Tuple(children, _) => {
            if children.is_empty() {
                return "()".to_string();
            }
            let parts: Vec<String> = children.iter().map(emit).collect();
            format!("({})", parts.join(" "))
        }
        Node::Fragment(text, _) => demunge(text).into_owned(),
        Node::StringLiteral(text, _) => text.clone(),
        Node::SelfEvaluating(literal, _) => emit_literal(literal),
        Node::ForeignAtom(foreign, _) => emit_foreign(foreign),
    }
}

/// Renders every form in `nodes`, one per line.
#[must_use]
pub fn emit_all(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&emit(node));
        out.push('\n');
    }
    out
}

fn emit_literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Float(n) => format_float(*n),
        Literal::Complex(re, im) => format!("{}{:+}j", format_float(*re), im),
        Literal::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Literal::None => "None".to_string(),
        Literal::Ellipsis => "...".to_string(),
        Literal::Bytes(bytes) => format!("#{}", python_bytes_literal(bytes)),
        Literal::Collection(text) => text.clone(),
    }
}

fn format_float(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if n.is_nan() {
        return "nan".to_string();
    }
    let text = format!("{n}");
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text
    } else {
        format!("{text}.0")
    }
}

/// A `Foreign` has no Lissp surface form of its own; it prints as an
/// injected read-time evaluation of its cached literal (if any) or a
/// placeholder naming its `repr`, for diagnostic output only.
fn emit_foreign(foreign: &Foreign) -> String {
    match &foreign.literal {
        Some(literal) => format!(".#{literal}"),
        None => format!(".#<{}>", foreign.repr),
    }
}

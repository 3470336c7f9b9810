//! Translates fully macro-expanded Hissp IR into host (Python) source text.
//! No evaluation happens here; the compiler only emits syntax.
//!
//! Exactly two heads are special forms: `quote` and `lambda`. Everything
//! else is an ordinary invocation, parsed by the shared call convention
//! (see [`parse_slots`]) that also governs lambda parameter lists. A third,
//! reserved head — [`crate::template::TEMPLATE_TUPLE_MARKER`] — is what a
//! processed template compiles to, and is handled as tuple construction
//! rather than a call.

use hissp_foundation::{CompileError, Error, ErrorKind, Result};

use crate::ir::{Foreign, Literal, Node};
use crate::template::TEMPLATE_TUPLE_MARKER;
use crate::value::{python_bytes_literal, python_str_literal};

const INDENT: &str = "  ";

/// Compiles a single expanded node to a host expression (no statement
/// wrapping). Used both by the top-level driver and by the `.#` inject tag,
/// which compiles and evaluates one node at read time.
///
/// # Errors
/// Returns `ErrorKind::Compile` if `node` does not follow the call
/// convention, names an illegal invocation head, or carries a `Foreign` atom
/// with no representable form.
pub fn compile_node(node: &Node, module: &str) -> Result<String> {
    compile_expr(node, module, 0)
}

/// Compiles every top-level form in `nodes` into one host-source text, one
/// statement per form, each optionally preceded by a single-line comment
/// naming the macro it expanded from.
///
/// `annotations[i]` is the qualified macro name `nodes[i]` expanded from, if
/// its original (pre-expansion) head resolved to a macro; callers determine
/// this before expansion, since by compile time the macro call is gone.
///
/// # Errors
/// See [`compile_node`].
pub fn compile_program(nodes: &[Node], annotations: &[Option<String>], module: &str) -> Result<String> {
    let mut out = String::new();
    for (node, annotation) in nodes.iter().zip(annotations.iter()) {
        if let Some(name) = annotation {
            out.push_str("# expanded from ");
            out.push_str(name);
            out.push('\n');
        }
        out.push_str(&compile_node(node, module)?);
        out.push_str("\n\n");
    }
    out.truncate(out.trim_end_matches('\n').len());
    out.push('\n');
    Ok(out)
}

fn compile_expr(node: &Node, module: &str, indent: usize) -> Result<String> {
    match node {
        Node::Tuple(children, span) => {
            if children.is_empty() {
                return Err(Error::new(ErrorKind::Compile(CompileError::IllegalHead(
                    "empty tuple cannot be invoked".to_string(),
                )))
                .at(*span));
            }
            let head = &children[0];
            let rest: Vec<Node> = children.iter().skip(1).cloned().collect();

            if head.as_fragment() == Some("quote") {
                return compile_quote(&rest, *span);
            }
            if head.as_fragment() == Some("lambda") {
                return compile_lambda(&rest, module, indent, *span);
            }
            if head.as_fragment() == Some(TEMPLATE_TUPLE_MARKER) {
                return compile_template_tuple(&rest, module, indent);
            }
            compile_call(head, &rest, module, indent)
        }
        Node::Fragment(text, _) => Ok(compile_fragment(text)),
        Node::StringLiteral(text, _) => Ok(text.clone()),
        Node::SelfEvaluating(literal, _) => Ok(render_literal(literal)),
        Node::ForeignAtom(foreign, span) => render_foreign(foreign, *span),
    }
}

/// Renders a bare [`Fragment`](Node::Fragment)'s text as an expression:
/// module handles become `__import__` expressions, control words
/// self-evaluate to their own text as a string, anything else passes
/// through verbatim.
fn compile_fragment(text: &str) -> String {
    if text.starts_with(':') {
        return python_str_literal(text);
    }
    if let Some(module_path) = text.strip_suffix('.') {
        if !module_path.contains("..") {
            return format!(
                "__import__({}, fromlist='?')",
                python_str_literal(module_path)
            );
        }
    }
    if let Some((module_path, attrs)) = text.split_once("..") {
        if !module_path.is_empty() && !attrs.is_empty() {
            return format!(
                "__import__({}, fromlist='?').{attrs}",
                python_str_literal(module_path)
            );
        }
    }
    text.to_string()
}

fn compile_quote(rest: &[Node], span: crate::span::Span) -> Result<String> {
    let [payload] = rest else {
        return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
            "quote".to_string(),
            format!("expected exactly one argument, got {}", rest.len()),
        )))
        .at(span));
    };
    quote_value(payload)
}

/// Emits a host expression whose value equals the IR node `node` itself,
/// i.e. `(quote X)`. Fragments quote to their own text as a string,
/// since module-handle processing is only for code position, never under
/// quote, and `Foreign` atoms without a literal go through the same
/// opaque-serialization path as ordinary compiling.
fn quote_value(node: &Node) -> Result<String> {
    match node {
        Node::Tuple(children, _) => {
            let parts = children
                .iter()
                .map(quote_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(match parts.len() {
                0 => "()".to_string(),
                1 => format!("({},)", parts[0]),
                _ => format!("({})", parts.join(", ")),
            })
        }
        Node::Fragment(text, _) => Ok(python_str_literal(text)),
        Node::StringLiteral(text, _) => Ok(text.clone()),
        Node::SelfEvaluating(literal, _) => Ok(render_literal(literal)),
        Node::ForeignAtom(foreign, span) => render_foreign(foreign, *span),
    }
}

/// `(lambda PARAMS . BODY)`: PARAMS follows the call convention;
/// BODY is wrapped into a single expression by tupling its forms and
/// indexing the final one, since a lambda body must be one expression.
fn compile_lambda(rest: &[Node], module: &str, indent: usize, span: crate::span::Span) -> Result<String> {
    let Some((params_node, body)) = rest.split_first() else {
        return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
            "lambda".to_string(),
            "expected a parameter list".to_string(),
        )))
        .at(span));
    };
    let Node::Tuple(params, _) = params_node else {
        return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
            "lambda".to_string(),
            "parameter list must be a tuple".to_string(),
        )))
        .at(params_node.span()));
    };
    let params: Vec<Node> = params.iter().cloned().collect();
    let slots = parse_slots(&params)?;
    let rendered_params = render_params(&slots, module, indent)?;

    let body_expr = match body {
        [] => "()".to_string(),
        [one] => compile_expr(one, module, indent)?,
        many => {
            let parts = many
                .iter()
                .map(|form| compile_expr(form, module, indent))
                .collect::<Result<Vec<_>>>()?;
            format!("({})[-1]", parts.join(", "))
        }
    };

    if rendered_params.is_empty() {
        Ok(format!("(lambda: {body_expr})"))
    } else {
        Ok(format!("(lambda {}: {body_expr})", rendered_params.join(", ")))
    }
}

/// A single slot of a call's or parameter list's pair region, after parsing
/// the three control words that drive it.
enum Slot {
    Positional(Node),
    Star(Node),
    DoubleStar(Node),
    Named(String, Node),
    Slash,
}

fn is_control(node: &Node, text: &str) -> bool {
    node.as_fragment() == Some(text)
}

/// Parses a flat list of call arguments or lambda parameters into ordered
/// [`Slot`]s, per the call convention. Items before the first
/// bare `:` are plain positional slots; after it, every item pairs with the
/// one following it, the pairing kind decided by whether the first of the
/// pair is one of the three reserved control words or an ordinary name.
fn parse_slots(items: &[Node]) -> Result<Vec<Slot>> {
    let mut slots = Vec::new();
    let mut i = 0;

    while i < items.len() {
        if is_control(&items[i], ":") {
            i += 1;
            break;
        }
        if is_control(&items[i], ":/") {
            slots.push(Slot::Slash);
            i += 1;
            continue;
        }
        slots.push(Slot::Positional(items[i].clone()));
        i += 1;
    }

    while i < items.len() {
        let marker = items[i].clone();
        i += 1;
        if i >= items.len() {
            return Err(Error::new(ErrorKind::Compile(CompileError::UnpairedKeyword(
                describe(&marker),
            )))
            .at(marker.span()));
        }
        let value = items[i].clone();
        i += 1;

        if is_control(&marker, ":?") {
            slots.push(Slot::Positional(value));
        } else if is_control(&marker, ":*") {
            slots.push(Slot::Star(value));
        } else if is_control(&marker, ":**") {
            slots.push(Slot::DoubleStar(value));
        } else if is_control(&marker, ":/") {
            return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
                ":/".to_string(),
                "only valid in the positional region, before ':'".to_string(),
            )))
            .at(marker.span()));
        } else {
            let Some(name) = marker.as_fragment() else {
                return Err(Error::new(ErrorKind::Compile(CompileError::IllegalHead(
                    describe(&marker),
                )))
                .at(marker.span()));
            };
            slots.push(Slot::Named(name.to_string(), value));
        }
    }

    Ok(slots)
}

fn describe(node: &Node) -> String {
    node.as_fragment().map_or_else(|| node.type_name().to_string(), str::to_string)
}

/// Renders parsed call-argument [`Slot`]s as Python call-argument source.
fn render_args(slots: &[Slot], module: &str, indent: usize) -> Result<Vec<String>> {
    slots
        .iter()
        .map(|slot| match slot {
            Slot::Positional(node) => compile_expr(node, module, indent),
            Slot::Star(node) => Ok(format!("*{}", compile_expr(node, module, indent)?)),
            Slot::DoubleStar(node) => Ok(format!("**{}", compile_expr(node, module, indent)?)),
            Slot::Named(name, node) => Ok(format!("{name}={}", compile_expr(node, module, indent)?)),
            Slot::Slash => Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
                ":/".to_string(),
                "only valid in a parameter list, not a call".to_string(),
            )))),
        })
        .collect()
}

/// Renders parsed parameter [`Slot`]s as Python lambda-parameter source.
/// Unlike call arguments, a bare positional slot's "value" is the parameter
/// name itself (not a compiled expression), and `:/` becomes a literal `/`.
fn render_params(slots: &[Slot], module: &str, indent: usize) -> Result<Vec<String>> {
    slots
        .iter()
        .map(|slot| match slot {
            Slot::Positional(node) => param_name(node),
            Slot::Star(node) => Ok(format!("*{}", param_name(node)?)),
            Slot::DoubleStar(node) => Ok(format!("**{}", param_name(node)?)),
            Slot::Named(name, node) => Ok(format!("{name}={}", compile_expr(node, module, indent)?)),
            Slot::Slash => Ok("/".to_string()),
        })
        .collect()
}

fn param_name(node: &Node) -> Result<String> {
    node.as_fragment().map(str::to_string).ok_or_else(|| {
        Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
            "lambda".to_string(),
            format!("parameter must be a plain name, got {}", node.type_name()),
        )))
        .at(node.span())
    })
}

/// Compiles an ordinary invocation: `head(args...)`, or, when `head` is a
/// leading-dot fragment, the method-call form `(arg0).name(args...)`.
fn compile_call(head: &Node, args: &[Node], module: &str, indent: usize) -> Result<String> {
    if let Some(method) = head
        .as_fragment()
        .and_then(|t| (t.starts_with('.') && !t.starts_with("..") && !t.contains("..")).then(|| &t[1..]))
    {
        let Some((obj, rest)) = args.split_first() else {
            return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
                format!(".{method}"),
                "method call requires a receiver as its first argument".to_string(),
            )))
            .at(head.span()));
        };
        let obj_src = compile_expr(obj, module, indent)?;
        let slots = parse_slots(rest)?;
        let rendered = render_args(&slots, module, indent + 1)?;
        return Ok(wrap_call(&format!("({obj_src}).{method}"), &rendered, indent));
    }

    let head_src = compile_expr(head, module, indent)?;
    let slots = parse_slots(args)?;
    let rendered = render_args(&slots, module, indent + 1)?;
    Ok(wrap_call(&head_src, &rendered, indent))
}

/// Lays out a call's arguments one per line at `indent + 1`
/// ("one argument per line with a two-space indent"); a call with no
/// arguments stays on one line.
fn wrap_call(head_src: &str, rendered_args: &[String], indent: usize) -> String {
    if rendered_args.is_empty() {
        return format!("{head_src}()");
    }
    let inner = INDENT.repeat(indent + 1);
    let outer = INDENT.repeat(indent);
    let mut out = format!("{head_src}(\n");
    for arg in rendered_args {
        out.push_str(&inner);
        out.push_str(arg);
        out.push_str(",\n");
    }
    out.push_str(&outer);
    out.push(')');
    out
}

/// Compiles a processed-template tuple construction: each
/// child is a `(":" value)` or `(":*" value)` pair built by
/// [`crate::template::build`]. Python tuple displays allow starred items
/// directly, so a splice needs no special-casing beyond a `*` prefix.
fn compile_template_tuple(items: &[Node], module: &str, indent: usize) -> Result<String> {
    let mut rendered = Vec::with_capacity(items.len());
    let mut only_item_is_plain = items.len() == 1;

    for item in items {
        let Some(pair) = item.as_tuple() else {
            return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
                TEMPLATE_TUPLE_MARKER.to_string(),
                "template tuple item must be a (marker value) pair".to_string(),
            )))
            .at(item.span()));
        };
        if pair.len() != 2 {
            return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
                TEMPLATE_TUPLE_MARKER.to_string(),
                "template tuple item must have exactly two elements".to_string(),
            )))
            .at(item.span()));
        }
        let marker = &pair[0];
        let value = &pair[1];
        let value_src = compile_expr(value, module, indent)?;
        if is_control(marker, ":") {
            rendered.push(value_src);
        } else if is_control(marker, ":*") {
            only_item_is_plain = false;
            rendered.push(format!("*{value_src}"));
        } else {
            return Err(Error::new(ErrorKind::Compile(CompileError::BadSpecialForm(
                TEMPLATE_TUPLE_MARKER.to_string(),
                format!("unknown template marker {:?}", describe(marker)),
            )))
            .at(marker.span()));
        }
    }

    Ok(match rendered.len() {
        0 => "()".to_string(),
        1 if only_item_is_plain => format!("({},)", rendered[0]),
        _ => format!("({})", rendered.join(", ")),
    })
}

/// Renders a [`Literal`]'s canonical host text ("Self-evaluating
/// literals").
fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => format!("({n})"),
        Literal::Float(n) => format!("({})", format_float(*n)),
        Literal::Complex(re, im) => format!("({})", format_complex(*re, *im)),
        Literal::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Literal::None => "None".to_string(),
        Literal::Ellipsis => "...".to_string(),
        Literal::Bytes(bytes) => python_bytes_literal(bytes),
        Literal::Collection(text) => text.clone(),
    }
}

fn format_float(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "float('inf')".to_string() } else { "float('-inf')".to_string() };
    }
    if n.is_nan() {
        return "float('nan')".to_string();
    }
    let text = format!("{n}");
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text
    } else {
        format!("{text}.0")
    }
}

fn format_complex(re: f64, im: f64) -> String {
    if re == 0.0 {
        format!("{}j", format_float(im))
    } else {
        format!("({}{:+}j)", format_float(re), im)
    }
}

/// Emits a `Foreign` atom: its cached literal if one was already found,
/// otherwise the opaque-serialization fallback, otherwise
/// `CompileError::UnrepresentableAtom` ("Opaque serialization":
/// where none exists, the compiler must refuse).
fn render_foreign(foreign: &Foreign, span: crate::span::Span) -> Result<String> {
    if let Some(literal) = &foreign.literal {
        return Ok(format!("{literal}  # {}", sanitize_comment(&foreign.repr)));
    }
    if foreign.payload.is_empty() {
        return Err(Error::new(ErrorKind::Compile(CompileError::UnrepresentableAtom(
            foreign.repr.clone(),
        )))
        .at(span));
    }
    let hex = hex_encode(&foreign.payload);
    Ok(format!(
        "__import__('hissp_host')._opaque.loads({})  # {}",
        python_str_literal(&hex),
        sanitize_comment(&foreign.repr)
    ))
}

fn sanitize_comment(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn frag(text: &str) -> Node {
        Node::frag(text)
    }

    fn tup(children: Vec<Node>) -> Node {
        Node::tup(children)
    }

    #[test]
    fn plain_call_emits_positional_args() {
        let form = tup(vec![frag("print"), Node::int(1), Node::int(2)]);
        let src = compile_node(&form, "user").unwrap();
        assert!(src.starts_with("print(\n"));
        assert!(src.contains("(1),\n"));
        assert!(src.contains("(2),\n"));
    }

    #[test]
    fn keyword_pair_after_colon_becomes_kwarg() {
        let form = tup(vec![
            frag("print"),
            Node::int(1),
            frag(":"),
            frag("sep"),
            Node::string("'-'"),
        ]);
        let src = compile_node(&form, "user").unwrap();
        assert!(src.contains("sep='-',\n"));
    }

    #[test]
    fn star_and_doublestar_pairs_unpack() {
        let form = tup(vec![
            frag("f"),
            frag(":"),
            frag(":*"),
            frag("xs"),
            frag(":**"),
            frag("kw"),
        ]);
        let src = compile_node(&form, "user").unwrap();
        assert!(src.contains("*xs,\n"));
        assert!(src.contains("**kw,\n"));
    }

    #[test]
    fn unpaired_trailing_keyword_is_an_error() {
        let form = tup(vec![frag("f"), frag(":"), frag("sep")]);
        let err = compile_node(&form, "user").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Compile(CompileError::UnpairedKeyword(_))));
    }

    #[test]
    fn module_handle_head_compiles_to_import() {
        let handle = frag("pkg.mod.");
        assert_eq!(
            compile_node(&handle, "user").unwrap(),
            "__import__('pkg.mod', fromlist='?')"
        );
    }

    #[test]
    fn dotted_module_attribute_compiles_to_import_then_attr() {
        let handle = frag("pkg.mod..attr");
        assert_eq!(
            compile_node(&handle, "user").unwrap(),
            "__import__('pkg.mod', fromlist='?').attr"
        );
    }

    #[test]
    fn plain_dotted_attribute_chain_is_verbatim() {
        let handle = frag("obj.attr.chain");
        assert_eq!(compile_node(&handle, "user").unwrap(), "obj.attr.chain");
    }

    #[test]
    fn control_word_self_evaluates_to_its_text() {
        let cw = frag(":key");
        assert_eq!(compile_node(&cw, "user").unwrap(), "':key'");
    }

    #[test]
    fn method_call_head_compiles_to_attribute_call() {
        let form = tup(vec![frag(".upper"), frag("s")]);
        let src = compile_node(&form, "user").unwrap();
        assert!(src.starts_with("(s).upper("));
    }

    #[test]
    fn method_call_with_args_and_kwargs() {
        let form = tup(vec![
            frag(".method"),
            frag("obj"),
            Node::int(1),
            frag(":"),
            frag("k"),
            Node::int(2),
        ]);
        let src = compile_node(&form, "user").unwrap();
        assert!(src.starts_with("(obj).method("));
        assert!(src.contains("(1),\n"));
        assert!(src.contains("k=(2),\n"));
    }

    #[test]
    fn quote_of_tuple_is_a_nested_tuple_literal() {
        let form = tup(vec![frag("quote"), tup(vec![frag("a"), Node::int(1)])]);
        let src = compile_node(&form, "user").unwrap();
        assert_eq!(src, "('a', (1))");
    }

    #[test]
    fn quote_of_fragment_is_its_text_as_a_string() {
        let form = tup(vec![frag("quote"), frag("x")]);
        assert_eq!(compile_node(&form, "user").unwrap(), "'x'");
    }

    #[test]
    fn quote_does_not_process_module_handles() {
        let form = tup(vec![frag("quote"), frag("pkg.mod.")]);
        assert_eq!(compile_node(&form, "user").unwrap(), "'pkg.mod.'");
    }

    #[test]
    fn lambda_with_no_params_and_single_body_form() {
        let form = tup(vec![frag("lambda"), tup(vec![]), Node::int(1)]);
        assert_eq!(compile_node(&form, "user").unwrap(), "(lambda: (1))");
    }

    #[test]
    fn lambda_params_with_default_value() {
        let form = tup(vec![
            frag("lambda"),
            tup(vec![frag("x"), frag(":"), frag("y"), Node::int(1)]),
            frag("x"),
        ]);
        let src = compile_node(&form, "user").unwrap();
        assert_eq!(src, "(lambda x, y=(1): x)");
    }

    #[test]
    fn lambda_params_with_star_and_slash() {
        let form = tup(vec![
            frag("lambda"),
            tup(vec![frag("a"), frag(":/"), frag(":"), frag(":*"), frag("rest")]),
            frag("a"),
        ]);
        let src = compile_node(&form, "user").unwrap();
        assert_eq!(src, "(lambda a, /, *rest: a)");
    }

    #[test]
    fn lambda_body_with_multiple_forms_indexes_the_last() {
        let form = tup(vec![frag("lambda"), tup(vec![]), Node::int(1), Node::int(2)]);
        let src = compile_node(&form, "user").unwrap();
        assert_eq!(src, "(lambda: ((1), (2))[-1])");
    }

    #[test]
    fn empty_tuple_is_an_illegal_head() {
        let form = Node::Tuple(im::Vector::new(), Span::default());
        let err = compile_node(&form, "user").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Compile(CompileError::IllegalHead(_))));
    }

    #[test]
    fn template_tuple_marker_builds_a_tuple_literal() {
        let form = tup(vec![
            frag(TEMPLATE_TUPLE_MARKER),
            tup(vec![frag(":"), Node::int(1)]),
            tup(vec![frag(":"), Node::int(2)]),
        ]);
        assert_eq!(compile_node(&form, "user").unwrap(), "((1), (2))");
    }

    #[test]
    fn template_tuple_splice_item_gets_star_prefix() {
        let form = tup(vec![
            frag(TEMPLATE_TUPLE_MARKER),
            tup(vec![frag(":"), Node::int(1)]),
            tup(vec![frag(":*"), frag("xs")]),
        ]);
        assert_eq!(compile_node(&form, "user").unwrap(), "((1), *xs)");
    }

    #[test]
    fn single_item_template_tuple_gets_trailing_comma() {
        let form = tup(vec![frag(TEMPLATE_TUPLE_MARKER), tup(vec![frag(":"), Node::int(1)])]);
        assert_eq!(compile_node(&form, "user").unwrap(), "((1),)");
    }

    #[test]
    fn self_evaluating_numbers_are_parenthesized() {
        assert_eq!(compile_node(&Node::int(3), "user").unwrap(), "(3)");
    }

    #[test]
    fn booleans_and_none_pass_through_bare() {
        assert_eq!(
            compile_node(&Node::SelfEvaluating(Literal::Bool(true), Span::default()), "user").unwrap(),
            "True"
        );
        assert_eq!(
            compile_node(&Node::SelfEvaluating(Literal::None, Span::default()), "user").unwrap(),
            "None"
        );
    }

    #[test]
    fn foreign_atom_with_no_literal_and_no_payload_is_unrepresentable() {
        let node = Node::ForeignAtom(Foreign::new(Vec::new(), "<object>"), Span::default());
        let err = compile_node(&node, "user").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Compile(CompileError::UnrepresentableAtom(_))));
    }

    #[test]
    fn foreign_atom_with_cached_literal_uses_it() {
        let mut foreign = Foreign::new(Vec::new(), "<object>");
        foreign.literal = Some("(42)".to_string());
        let node = Node::ForeignAtom(foreign, Span::default());
        let src = compile_node(&node, "user").unwrap();
        assert!(src.starts_with("(42)"));
        assert!(src.contains("<object>"));
    }

    #[test]
    fn foreign_atom_with_payload_uses_opaque_deserialization() {
        let foreign = Foreign::new(vec![0xde, 0xad], "<object>");
        let node = Node::ForeignAtom(foreign, Span::default());
        let src = compile_node(&node, "user").unwrap();
        assert!(src.contains("_opaque.loads"));
        assert!(src.contains("dead"));
    }

    #[test]
    fn string_literal_passes_through_verbatim() {
        let node = Node::string("'hello'");
        assert_eq!(compile_node(&node, "user").unwrap(), "'hello'");
    }

    #[test]
    fn compile_program_annotates_macro_expanded_forms() {
        let forms = vec![Node::int(1), Node::int(2)];
        let annotations = vec![Some("user..triple".to_string()), None];
        let src = compile_program(&forms, &annotations, "user").unwrap();
        assert!(src.starts_with("# expanded from user..triple\n(1)"));
        assert!(src.trim_end().ends_with("(2)"));
    }
}

use hissp_core::template::{build, qualify_symbol, TemplateForm, TEMPLATE_TUPLE_MARKER};
use hissp_foundation::Span;

use crate::support::frag;

#[test]
fn qualify_symbol_prefixes_bare_names_with_the_module() {
    assert_eq!(qualify_symbol("foo", "mymod", false), "mymod..foo");
}

#[test]
fn qualify_symbol_marks_head_position_symbols_as_maybe_macros() {
    assert_eq!(qualify_symbol("foo", "mymod", true), "mymod..QzMaybe_.foo");
}

#[test]
fn qualify_symbol_leaves_control_words_alone() {
    assert_eq!(qualify_symbol(":", "mymod", false), ":");
}

#[test]
fn qualify_symbol_leaves_quote_and_lambda_alone() {
    assert_eq!(qualify_symbol("quote", "mymod", true), "quote");
    assert_eq!(qualify_symbol("lambda", "mymod", true), "lambda");
}

#[test]
fn qualify_symbol_leaves_already_dotted_names_alone() {
    assert_eq!(qualify_symbol("pkg..attr", "mymod", false), "pkg..attr");
    assert_eq!(qualify_symbol(".method", "mymod", false), ".method");
}

#[test]
fn a_template_tuple_builds_under_the_reserved_marker_head() {
    let span = Span::at_start();
    let form = TemplateForm::Tuple(
        vec![
            TemplateForm::Atom(frag("a")),
            TemplateForm::Atom(frag("b")),
        ],
        span,
    );
    let node = build(&form, "mymod").unwrap();
    let children = node.as_tuple().unwrap();
    assert_eq!(children[0].as_fragment(), Some(TEMPLATE_TUPLE_MARKER));
}

#[test]
fn an_unquote_splice_inside_a_tuple_becomes_a_star_splice_pair() {
    let span = Span::at_start();
    let form = TemplateForm::Tuple(
        vec![
            TemplateForm::Atom(frag("a")),
            TemplateForm::UnquoteSplice(frag("xs")),
        ],
        span,
    );
    let node = build(&form, "mymod").unwrap();
    let children = node.as_tuple().unwrap();
    let splice_pair = children[2].as_tuple().unwrap();
    assert_eq!(splice_pair[0].as_fragment(), Some(":*"));
}

#[test]
fn an_unquote_splice_at_the_top_level_is_an_error() {
    let err = build(&TemplateForm::UnquoteSplice(frag("xs")), "mymod").unwrap_err();
    assert!(format!("{err}").contains("only meaningful inside a tuple"));
}

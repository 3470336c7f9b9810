use hissp_core::compile_node;

use crate::support::{frag, int, tup};

#[test]
fn a_plain_call_compiles_to_one_argument_per_line() {
    let node = tup(vec![frag("add"), int(1), int(2)]);
    let source = compile_node(&node, "m").unwrap();
    assert_eq!(source, "add(\n  (1),\n  (2),\n)");
}

#[test]
fn a_keyword_pair_compiles_to_a_python_keyword_argument() {
    // (print 1 2 3 : sep "-")
    let node = tup(vec![
        frag("print"),
        int(1),
        int(2),
        int(3),
        frag(":"),
        frag("sep"),
        hissp_core::ir::Node::StringLiteral("'-'".to_string(), Default::default()),
    ]);
    let source = compile_node(&node, "m").unwrap();
    assert!(source.contains("sep='-'"));
    assert!(source.contains("1,"));
    assert!(source.contains("3,"));
}

#[test]
fn lambda_compiles_to_a_python_lambda_expression() {
    let node = tup(vec![
        frag("lambda"),
        tup(vec![frag("x")]),
        tup(vec![frag("mul"), frag("x"), frag("x")]),
    ]);
    let source = compile_node(&node, "m").unwrap();
    assert!(source.starts_with("lambda x:"));
    assert!(source.contains("mul("));
}

#[test]
fn quote_does_not_process_a_module_handle_inside_it() {
    let node = tup(vec![frag("quote"), frag("pkg..attr")]);
    let source = compile_node(&node, "m").unwrap();
    assert_eq!(source, "'pkg..attr'");
}

#[test]
fn a_module_handle_fragment_compiles_to_an_import_expression() {
    let node = frag("pkg.mod.");
    let source = compile_node(&node, "m").unwrap();
    assert!(source.contains("__import__"));
    assert!(source.contains("pkg.mod"));
}

#[test]
fn a_control_word_self_evaluates_to_its_text_as_a_string() {
    let node = frag(":key");
    let source = compile_node(&node, "m").unwrap();
    assert_eq!(source, "':key'");
}

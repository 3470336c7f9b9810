//! End-to-end scenarios that go through the whole `compile_source` pipeline
//! at once, rather than isolating a single stage.

use hissp_core::{compile_source, ReaderConfig};

use crate::support::{frag, tup, FakeHost};

#[test]
fn a_plain_call_compiles_all_the_way_to_python_source() {
    let host = FakeHost::new();
    let ns = host.make_env("user");
    let src = compile_source("(add 1 2)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
    assert!(src.contains("add"));
    assert!(src.contains("(1)"));
    assert!(src.contains("(2)"));
}

#[test]
fn a_macro_expanded_top_level_form_is_annotated_with_its_qualified_name() {
    let host = FakeHost::new();
    let mut ns = host.make_env("user");
    ns.define_macro(
        "twice",
        std::rc::Rc::new(|args: &[hissp_core::ir::Node]| {
            Ok(hissp_core::ir::Node::tuple(vec![args[0].clone(), args[0].clone()], Default::default()))
        }),
    );
    let src = compile_source("(twice 1)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
    assert!(src.starts_with("# expanded from user..twice"));
}

#[test]
fn a_template_with_a_splice_reads_expands_and_compiles_in_one_pass() {
    let host = FakeHost::new();
    let ns = host.make_env("user");
    let src = compile_source("`(a ,@xs)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
    assert!(src.contains("__import__('user', fromlist='?')"));
    assert!(src.contains("*xs"));
}

#[test]
fn the_triple_macro_expands_before_compiling_to_nested_add_calls() {
    let host = FakeHost::new();
    let mut ns = host.make_env("user");
    ns.define_macro(
        "triple",
        std::rc::Rc::new(|args: &[hissp_core::ir::Node]| {
            let x = args[0].clone();
            Ok(tup(vec![frag("add"), x.clone(), tup(vec![frag("add"), x.clone(), x])]))
        }),
    );
    let src = compile_source("(triple 4)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
    assert!(src.contains("add("));
    assert!(src.contains("(4)"));
}

#[test]
fn quote_survives_the_whole_pipeline_without_being_macroexpanded() {
    let host = FakeHost::new();
    let mut ns = host.make_env("user");
    ns.define_macro(
        "explode",
        std::rc::Rc::new(|_args: &[hissp_core::ir::Node]| panic!("must never run under quote")),
    );
    let src = compile_source("'(explode 1)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
    assert!(src.contains("'explode'") || src.contains("explode"));
}

#[test]
fn two_top_level_forms_each_get_their_own_blank_line_separated_output() {
    let host = FakeHost::new();
    let ns = host.make_env("user");
    let src = compile_source("(add 1 2)\n(add 3 4)", ReaderConfig::for_module("user"), &host, &ns).unwrap();
    assert!(src.contains("\n\n"));
}

use std::rc::Rc;

use hissp_core::host::HostBridge;
use hissp_core::ir::Node;
use hissp_core::value::Value;
use hissp_core::MacroExpander;

use crate::support::{frag, int, tup, FakeHost};

#[test]
fn a_macro_call_expands_to_its_bodys_return_value() {
    let host = FakeHost::new();
    let mut ns = host.make_env("m");
    // triple(x) -> (add x (add x x))
    ns.define_macro(
        "triple",
        Rc::new(|args: &[Node]| {
            let x = args[0].clone();
            Ok(tup(vec![frag("add"), x.clone(), tup(vec![frag("add"), x.clone(), x])]))
        }),
    );

    let mut expander = MacroExpander::new(&host, &ns, "m".to_string());
    let call = tup(vec![frag("triple"), int(4)]);
    let expanded = expander.expand(&call).unwrap();
    let children = expanded.as_tuple().unwrap();
    assert_eq!(children[0].as_fragment(), Some("add"));
}

#[test]
fn quote_is_never_recursed_into_even_when_it_contains_a_macro_head() {
    let host = FakeHost::new();
    let mut ns = host.make_env("m");
    ns.define_macro(
        "explode",
        Rc::new(|_args: &[Node]| panic!("must never be invoked under quote")),
    );

    let mut expander = MacroExpander::new(&host, &ns, "m".to_string());
    let quoted = tup(vec![frag("quote"), tup(vec![frag("explode"), int(1)])]);
    let expanded = expander.expand(&quoted).unwrap();
    let children = expanded.as_tuple().unwrap();
    assert_eq!(children[0].as_fragment(), Some("quote"));
}

#[test]
fn a_macro_that_returns_another_macro_call_is_expanded_outside_in() {
    let host = FakeHost::new();
    let mut ns = host.make_env("m");
    ns.define_macro("outer", Rc::new(|_args: &[Node]| Ok(tup(vec![frag("inner"), int(1)]))));
    ns.define_macro(
        "inner",
        Rc::new(|args: &[Node]| Ok(tup(vec![frag("add"), args[0].clone(), int(1)]))),
    );

    let mut expander = MacroExpander::new(&host, &ns, "m".to_string());
    let call = tup(vec![frag("outer")]);
    let expanded = expander.expand(&call).unwrap();
    let children = expanded.as_tuple().unwrap();
    assert_eq!(children[0].as_fragment(), Some("add"));
}

#[test]
fn a_self_expanding_macro_is_bounded_rather_than_overflowing_the_stack() {
    let host = FakeHost::new();
    let mut ns = host.make_env("m");
    ns.define_macro("loopy", Rc::new(|_args: &[Node]| Ok(tup(vec![frag("loopy")]))));

    let mut expander = MacroExpander::new(&host, &ns, "m".to_string());
    let call = tup(vec![frag("loopy")]);
    let err = expander.expand(&call).unwrap_err();
    assert!(format!("{err}").contains("expansion"));
}

#[test]
fn make_env_seeded_namespace_has_no_macros_by_default() {
    let host = FakeHost::new();
    let ns = host.make_env("m");
    assert!(ns.lookup_macro("anything").is_none());
    let _: Value = host.eval("1", &ns).unwrap();
}

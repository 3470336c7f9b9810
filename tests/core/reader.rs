use hissp_core::host::HostBridge;
use hissp_core::ir::Node;
use hissp_core::value::Value;
use hissp_core::{Reader, ReaderConfig};

use crate::support::FakeHost;

fn read_all(source: &str, module: &str, host: &FakeHost) -> Vec<Node> {
    let env = host.make_env(module);
    let mut reader = Reader::new(source, ReaderConfig::for_module(module));
    reader.read_all(host, &env).unwrap()
}

#[test]
fn a_plain_call_reads_as_a_tuple_of_fragments_and_literals() {
    let host = FakeHost::new();
    let forms = read_all("(add 1 2)", "m", &host);
    assert_eq!(forms.len(), 1);
    let children = forms[0].as_tuple().unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].as_fragment(), Some("add"));
}

#[test]
fn quote_reads_as_a_two_element_tuple_headed_by_quote() {
    let host = FakeHost::new();
    let forms = read_all("'(1 2 3)", "m", &host);
    let outer = forms[0].as_tuple().unwrap();
    assert_eq!(outer[0].as_fragment(), Some("quote"));
}

#[test]
fn a_template_qualifies_bare_symbols_against_its_module() {
    let host = FakeHost::new();
    let forms = read_all("`(a b)", "mymod", &host);

    fn contains_fragment(node: &Node, text: &str) -> bool {
        match node.as_fragment() {
            Some(t) => t == text,
            None => node
                .as_tuple()
                .is_some_and(|children| children.iter().any(|c| contains_fragment(c, text))),
        }
    }

    assert!(contains_fragment(&forms[0], "mymod..QzMaybe_.a"));
    assert!(contains_fragment(&forms[0], "mymod..b"));
}

#[test]
fn inject_evaluates_its_argument_at_read_time() {
    let host = FakeHost::new();
    let forms = read_all("'(1 .#(add 1 2) 3)", "m", &host);
    let items = forms[0].as_tuple().unwrap();
    // quote wraps (1 .#(add 1 2) 3); items[0] is the `quote` fragment.
    assert_eq!(items[0].as_fragment(), Some("quote"));
    let inner = items[1].as_tuple().unwrap();
    assert!(matches!(inner[1], Node::SelfEvaluating(_, _)));
}

#[test]
fn inject_is_rejected_when_the_reader_disallows_it() {
    let host = FakeHost::new();
    let env = host.make_env("m");
    let mut config = ReaderConfig::for_module("m");
    config.allow_inject = false;
    let mut reader = Reader::new("'(.#(add 1 2))", config);
    let err = reader.read_all(&host, &env).unwrap_err();
    assert!(format!("{err}").contains("injection is disabled"));
}

#[test]
fn gensym_renames_are_stable_within_one_template_and_differ_across_templates() {
    let host = FakeHost::new();
    let env = host.make_env("m");
    let mut reader = Reader::new("`($#x $#x)\n`($#x)", ReaderConfig::for_module("m"));
    let first = reader.read_one(&host, &env).unwrap().unwrap();
    let second = reader.read_one(&host, &env).unwrap().unwrap();

    fn find_gensym_names(node: &Node, out: &mut Vec<String>) {
        if let Some(children) = node.as_tuple() {
            for child in children.iter() {
                find_gensym_names(child, out);
            }
        } else if let Some(text) = node.as_fragment() {
            if text.contains("_QzNo") {
                out.push(text.to_string());
            }
        }
    }

    let mut first_names = Vec::new();
    find_gensym_names(&first, &mut first_names);
    let mut second_names = Vec::new();
    find_gensym_names(&second, &mut second_names);

    assert_eq!(first_names.len(), 2);
    assert_eq!(first_names[0], first_names[1]);
    assert_eq!(second_names.len(), 1);
    assert_ne!(first_names[0], second_names[0]);
}

#[test]
fn make_env_never_returns_a_namespace_value_directly() {
    let host = FakeHost::new();
    let env = host.make_env("m");
    assert_eq!(env.module, "m");
    assert!(matches!(host.eval("1", &env).unwrap(), Value::Int(1)));
}

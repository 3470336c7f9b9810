use std::rc::Rc;

use hissp_core::host::HostBridge;
use hissp_core::ir::Node;
use hissp_core::value::Value;
use hissp_core::{compile_source, ReaderConfig};
use hissp_host::TreeWalkingHost;

fn sum_callable() -> Value {
    Value::Callable(Rc::new(|args: &[Value]| {
        let total: i64 = args
            .iter()
            .map(|v| match v {
                Value::Int(n) => *n,
                other => panic!("expected an int, got {}", other.type_name()),
            })
            .sum();
        Ok(Value::Int(total))
    }))
}

#[test]
fn a_lambda_compiles_and_evaluates_against_a_real_host() {
    let host = TreeWalkingHost::new();
    let mut env = host.make_env("user");
    env.set("mul", Value::Callable(Rc::new(|args: &[Value]| match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a * b)),
        _ => panic!("expected two ints"),
    })));

    let src = compile_source(
        "(lambda (x) (mul x x))",
        ReaderConfig::for_module("user"),
        &host,
        &env,
    )
    .unwrap();

    let value = host.eval(&src, &env).unwrap();
    let Value::Callable(square) = value else {
        panic!("expected a callable");
    };
    let result = square(&[Value::Int(4)]).unwrap();
    assert!(matches!(result, Value::Int(16)));
}

#[test]
fn the_triple_macro_expands_and_the_result_evaluates_to_twelve() {
    let host = TreeWalkingHost::new();
    let mut env = host.make_env("user");
    env.set("add", sum_callable());
    env.define_macro(
        "triple",
        Rc::new(|args: &[Node]| {
            let x = args[0].clone();
            Ok(Node::tuple(
                vec![
                    Node::fragment("add", Default::default()),
                    x.clone(),
                    Node::tuple(
                        vec![Node::fragment("add", Default::default()), x.clone(), x],
                        Default::default(),
                    ),
                ],
                Default::default(),
            ))
        }),
    );

    let src = compile_source("(triple 4)", ReaderConfig::for_module("user"), &host, &env).unwrap();
    let value = host.eval(&src, &env).unwrap();
    assert!(matches!(value, Value::Int(12)));
}

#[test]
fn a_registered_module_round_trips_through_import_across_compiled_modules() {
    let host = TreeWalkingHost::new();
    let mut arith = host.make_env("arith");
    arith.set("add", sum_callable());
    let arith_src = compile_source("(add 1 2)", ReaderConfig::for_module("arith"), &host, &arith).unwrap();
    let arith_value = host.eval(&arith_src, &arith).unwrap();
    assert!(matches!(arith_value, Value::Int(3)));
    host.register_module("arith", arith);

    let env = host.make_env("user");
    let src = compile_source("arith..add", ReaderConfig::for_module("user"), &host, &env).unwrap();
    let value = host.eval(&src, &env).unwrap();
    assert!(matches!(value, Value::Callable(_)));
}

#[test]
fn quote_round_trips_through_a_real_host_as_a_python_tuple() {
    let host = TreeWalkingHost::new();
    let env = host.make_env("user");
    let src = compile_source("'(1 2 3)", ReaderConfig::for_module("user"), &host, &env).unwrap();
    let value = host.eval(&src, &env).unwrap();
    match value {
        Value::Tuple(items) => assert_eq!(items.len(), 3),
        other => panic!("expected a tuple, got {}", other.type_name()),
    }
}

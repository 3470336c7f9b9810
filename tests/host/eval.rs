use hissp_core::host::HostBridge;
use hissp_core::value::{Namespace, Value};
use hissp_host::TreeWalkingHost;

#[test]
fn a_plain_call_against_builtins_evaluates() {
    let host = TreeWalkingHost::new();
    let env = host.make_env("user");
    let value = host.eval("__import__('builtins').type(1)", &env).unwrap();
    assert!(matches!(value, Value::Str(s) if s == "int"));
}

#[test]
fn a_lambda_application_evaluates_its_body() {
    let host = TreeWalkingHost::new();
    let env = host.make_env("user");
    let value = host.eval("(lambda x: (x, x, x)[2])(16)", &env).unwrap();
    assert!(matches!(value, Value::Int(16)));
}

#[test]
fn a_registered_module_is_importable_by_name() {
    let host = TreeWalkingHost::new();
    let mut arith = Namespace::new("arith");
    arith.set(
        "add",
        Value::Callable(std::rc::Rc::new(|args: &[Value]| {
            let ints: Vec<i64> = args
                .iter()
                .map(|v| match v {
                    Value::Int(n) => *n,
                    _ => 0,
                })
                .collect();
            Ok(Value::Int(ints.iter().sum()))
        })),
    );
    host.register_module("arith", arith);

    let env = host.make_env("user");
    let value = host.eval("__import__('arith').add(1, 2, 3)", &env).unwrap();
    assert!(matches!(value, Value::Int(6)));
}

#[test]
fn operator_getitem_indexes_a_tuple() {
    let host = TreeWalkingHost::new();
    let env = host.make_env("user");
    let value = host.eval("__import__('operator').getitem((1, 2, 3), 1)", &env).unwrap();
    assert!(matches!(value, Value::Int(2)));
}

#[test]
fn an_undefined_name_is_an_error() {
    let host = TreeWalkingHost::new();
    let env = host.make_env("user");
    assert!(host.eval("undefined_name", &env).is_err());
}

#[test]
fn make_env_carries_builtins_and_operator_as_bindings() {
    let host = TreeWalkingHost::new();
    let env = host.make_env("user");
    assert!(env.get("builtins").is_some());
    assert!(env.get("operator").is_some());
}

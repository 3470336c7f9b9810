use hissp_core::value::Namespace;
use hissp_core::value::Value;
use hissp_host::opaque::{dumps, loads};

#[test]
fn a_scalar_round_trips_through_dumps_and_loads() {
    let bytes = dumps(&Value::Int(42)).unwrap();
    assert!(matches!(loads(&bytes).unwrap(), Value::Int(42)));
}

#[test]
fn a_nested_collection_round_trips() {
    let value = Value::Dict(vec![(Value::Str("k".to_string()), Value::List(vec![Value::Int(1), Value::Int(2)]))]);
    let bytes = dumps(&value).unwrap();
    match loads(&bytes).unwrap() {
        Value::Dict(entries) => assert_eq!(entries.len(), 1),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn a_namespace_has_no_opaque_form() {
    let ns = Value::Namespace(Namespace::new("m"));
    assert!(dumps(&ns).is_err());
}

#[test]
fn a_callable_has_no_opaque_form() {
    let callable = Value::Callable(std::rc::Rc::new(|_args: &[Value]| Ok(Value::None)));
    assert!(dumps(&callable).is_err());
}

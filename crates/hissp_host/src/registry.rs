//! The fixed module registry: `builtins`, `operator`, and `hissp_host`
//! itself, exposing exactly the names compiled output consumes
//! (`__import__`, `setattr`, `getattr`, `globals`, `type`, `dict`,
//! `tuple`; `operator.getitem`, `operator.not_`), plus the `_opaque`
//! serialization bridge used by the `Foreign`-atom deserialization
//! fallback.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use hissp_foundation::{Error, ErrorKind, Result};
use hissp_core::value::{Namespace, Value};

use crate::opaque;

/// Returns true for everything Python's `bool()` would treat as truthy,
/// for `operator.not_`.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::None => false,
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(n) => *n != 0.0,
        Value::Complex(re, im) => *re != 0.0 || *im != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::Bytes(b) => !b.is_empty(),
        Value::Ellipsis | Value::Namespace(_) | Value::Macro(_) | Value::Callable(_) => true,
        Value::Tuple(items) | Value::List(items) | Value::Set(items) => !items.is_empty(),
        Value::Dict(entries) => !entries.is_empty(),
    }
}

/// Structural equality over [`Value`], used by `operator.getitem`'s dict
/// lookup. [`Value::Namespace`], [`Value::Macro`], and [`Value::Callable`]
/// never compare equal to anything, including themselves.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Complex(xr, xi), Value::Complex(yr, yi)) => xr == yr && xi == yi,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        _ => false,
    }
}

fn internal(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Internal(message.into()))
}

fn arg(args: &[Value], i: usize) -> Result<&Value> {
    args.get(i)
        .ok_or_else(|| internal(format!("missing required argument at position {i}")))
}

/// Builds the `builtins` namespace, with `__import__` resolving against the
/// shared module registry.
pub fn builtins_namespace(modules: Rc<RefCell<HashMap<String, Namespace>>>) -> Namespace {
    let mut ns = Namespace::new("builtins");

    let import_modules = Rc::clone(&modules);
    ns.set(
        "__import__",
        Value::Callable(Rc::new(move |args: &[Value]| {
            let Value::Str(name) = arg(args, 0)? else {
                return Err(internal("__import__ expects a string module name"));
            };
            import_modules
                .borrow()
                .get(name)
                .cloned()
                .map(Value::Namespace)
                .ok_or_else(|| internal(format!("no module named '{name}'")))
        })),
    );

    ns.set(
        "setattr",
        Value::Callable(Rc::new(|_args: &[Value]| {
            // The reference host's Namespace values are plain data, not
            // shared mutable cells, so this cannot mutate a live module in
            // place; real global mutation is a host-bridge limit.
            Ok(Value::None)
        })),
    );

    ns.set(
        "getattr",
        Value::Callable(Rc::new(|args: &[Value]| {
            let obj = arg(args, 0)?;
            let Value::Str(name) = arg(args, 1)? else {
                return Err(internal("getattr expects a string attribute name"));
            };
            match obj {
                Value::Namespace(inner) => inner
                    .get(name)
                    .cloned()
                    .or_else(|| args.get(2).cloned())
                    .ok_or_else(|| internal(format!("no attribute '{name}'"))),
                _ => args
                    .get(2)
                    .cloned()
                    .ok_or_else(|| internal(format!("no attribute '{name}'"))),
            }
        })),
    );

    ns.set(
        "globals",
        Value::Callable(Rc::new(|_args: &[Value]| Ok(Value::Namespace(Namespace::new("__globals__"))))),
    );

    ns.set(
        "type",
        Value::Callable(Rc::new(|args: &[Value]| Ok(Value::Str(arg(args, 0)?.type_name().to_string())))),
    );

    ns.set(
        "dict",
        Value::Callable(Rc::new(|args: &[Value]| {
            let Some(first) = args.first() else {
                return Ok(Value::Dict(Vec::new()));
            };
            match first {
                Value::Dict(entries) => Ok(Value::Dict(entries.clone())),
                Value::Tuple(pairs) | Value::List(pairs) => {
                    let mut entries = Vec::with_capacity(pairs.len());
                    for pair in pairs {
                        let Value::Tuple(kv) | Value::List(kv) = pair else {
                            return Err(internal("dict() requires an iterable of pairs"));
                        };
                        let [k, v] = &kv[..] else {
                            return Err(internal("dict() pairs must have exactly two elements"));
                        };
                        entries.push((k.clone(), v.clone()));
                    }
                    Ok(Value::Dict(entries))
                }
                _ => Err(internal("dict() requires a mapping or an iterable of pairs")),
            }
        })),
    );

    ns.set(
        "tuple",
        Value::Callable(Rc::new(|args: &[Value]| match args.first() {
            None => Ok(Value::Tuple(Vec::new())),
            Some(Value::Tuple(items) | Value::List(items) | Value::Set(items)) => {
                Ok(Value::Tuple(items.clone()))
            }
            Some(other) => Err(internal(format!("{} is not iterable", other.type_name()))),
        })),
    );

    ns
}

/// Builds the `operator` namespace.
pub fn operator_namespace() -> Namespace {
    let mut ns = Namespace::new("operator");

    ns.set(
        "getitem",
        Value::Callable(Rc::new(|args: &[Value]| {
            let obj = arg(args, 0)?;
            let key = arg(args, 1)?;
            match obj {
                Value::Tuple(items) | Value::List(items) => {
                    let Value::Int(index) = key else {
                        return Err(internal("sequence index must be an int"));
                    };
                    let len = items.len() as i64;
                    let real_index = if *index < 0 { index + len } else { *index };
                    usize::try_from(real_index)
                        .ok()
                        .and_then(|i| items.get(i))
                        .cloned()
                        .ok_or_else(|| internal("index out of range"))
                }
                Value::Dict(entries) => entries
                    .iter()
                    .find(|(k, _)| values_equal(k, key))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| internal("key not found")),
                other => Err(internal(format!("{} is not subscriptable", other.type_name()))),
            }
        })),
    );

    ns.set(
        "not_",
        Value::Callable(Rc::new(|args: &[Value]| Ok(Value::Bool(!truthy(arg(args, 0)?))))),
    );

    ns
}

/// Builds the `hissp_host` namespace: the `_opaque` sub-namespace the
/// compiler's `Foreign`-atom fallback deserializes through.
pub fn hissp_host_namespace() -> Namespace {
    let mut opaque_ns = Namespace::new("hissp_host._opaque");
    opaque_ns.set(
        "loads",
        Value::Callable(Rc::new(|args: &[Value]| {
            let Value::Str(hex) = arg(args, 0)? else {
                return Err(internal("_opaque.loads expects a hex string"));
            };
            opaque::loads(&decode_hex(hex)?)
        })),
    );
    opaque_ns.set(
        "dumps",
        Value::Callable(Rc::new(|args: &[Value]| {
            let bytes = opaque::dumps(arg(args, 0)?)?;
            Ok(Value::Str(encode_hex(&bytes)))
        })),
    );

    let mut ns = Namespace::new("hissp_host");
    ns.set("_opaque", Value::Namespace(opaque_ns));
    ns
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(internal("odd-length hex string"));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| internal(format!("invalid hex byte: {}", &text[i..i + 2]))))
        .collect()
}

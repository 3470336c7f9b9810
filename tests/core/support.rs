//! A host double shared by the core integration tests.
//!
//! Evaluates only the small slice of host expressions these tests exercise
//! (arithmetic on integers via `add`/`mul`/`sub`, and lookups into a single
//! flat namespace) so `.#` inject and macro invocation can be tested without
//! depending on `hissp_host`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use hissp_core::host::HostBridge;
use hissp_core::ir::{Literal, Node};
use hissp_core::value::{Namespace, Value};
use hissp_foundation::{Error, ErrorKind, Result, Span};

/// Builds a [`Node::Fragment`] at a default span, for tests that don't
/// care about source locations.
pub fn frag(text: impl Into<String>) -> Node {
    Node::fragment(text, Span::default())
}

/// Builds a [`Node::Tuple`] at a default span.
pub fn tup(children: impl IntoIterator<Item = Node>) -> Node {
    Node::tuple(children, Span::default())
}

/// Builds a [`Node::SelfEvaluating`] integer literal at a default span.
pub fn int(n: i64) -> Node {
    Node::SelfEvaluating(Literal::Int(n), Span::default())
}

pub struct FakeHost {
    modules: RefCell<HashMap<String, Namespace>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self { modules: RefCell::new(HashMap::new()) }
    }

    pub fn register(&self, ns: Namespace) {
        self.modules.borrow_mut().insert(ns.module.clone(), ns);
    }
}

impl HostBridge for FakeHost {
    fn eval(&self, source: &str, env: &Namespace) -> Result<Value> {
        eval_expr(source.trim(), env)
    }

    fn import_module(&self, dotted: &str) -> Result<Namespace> {
        self.modules
            .borrow()
            .get(dotted)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no module named '{dotted}'"))))
    }

    fn make_env(&self, module_name: &str) -> Namespace {
        Namespace::new(module_name)
    }

    fn repr(&self, value: &Value) -> String {
        value.literal().unwrap_or_else(|| format!("<{}>", value.type_name()))
    }
}

/// A tiny recursive-descent evaluator over `name(a, b, ...)` calls and bare
/// integer literals/names, enough to drive the `.#`/macro scenarios below.
fn eval_expr(source: &str, env: &Namespace) -> Result<Value> {
    if let Ok(n) = source.parse::<i64>() {
        return Ok(Value::Int(n));
    }
    if let Some(open) = source.find('(') {
        let name = &source[..open];
        let inner = source[open + 1..source.rfind(')').unwrap()].to_string();
        let args = split_args(&inner)
            .into_iter()
            .map(|a| eval_expr(&a, env))
            .collect::<Result<Vec<_>>>()?;
        return apply(name.trim(), &args);
    }
    env.get(source)
        .cloned()
        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("name '{source}' is not defined"))))
}

fn split_args(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn apply(name: &str, args: &[Value]) -> Result<Value> {
    let ints: Vec<i64> = args
        .iter()
        .map(|v| match v {
            Value::Int(n) => Ok(*n),
            other => Err(Error::new(ErrorKind::Internal(format!("expected an int, got {}", other.type_name())))),
        })
        .collect::<Result<Vec<_>>>()?;
    match name {
        "add" => Ok(Value::Int(ints.iter().sum())),
        "mul" => Ok(Value::Int(ints.iter().product())),
        "sub" => Ok(Value::Int(ints[0] - ints[1..].iter().sum::<i64>())),
        other => Err(Error::new(ErrorKind::Internal(format!("unknown function '{other}'")))),
    }
}

pub fn macro_fn(body: impl Fn(&[hissp_core::ir::Node]) -> Result<hissp_core::ir::Node> + 'static) -> hissp_core::value::MacroFn {
    Rc::new(body)
}

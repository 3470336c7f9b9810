//! [`TreeWalkingHost`]: the reference [`HostBridge`] implementation —
//! a tree-walking evaluator over exactly the expression grammar
//! `hissp_core`'s compiler emits, backed by the fixed module
//! registry in [`crate::registry`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use hissp_foundation::{Error, ErrorKind, Result};
use hissp_core::host::HostBridge;
use hissp_core::value::{Namespace, Value};

use crate::expr::{Arg, Expr, Param};
use crate::parser::parse;
use crate::registry::{builtins_namespace, hissp_host_namespace, operator_namespace, truthy, values_equal};

/// A lexical scope: a flat binding map plus an optional parent, fully
/// owned (no borrowed lifetime) so that lambda closures created during
/// evaluation can outlive the `eval` call that created them.
struct Scope {
    vars: HashMap<String, Value>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.vars.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }
}

/// The reference `HostBridge`: evaluates compiled host source against a
/// small fixed module registry (`builtins`, `operator`, `hissp_host`) plus
/// whatever modules have been registered via [`TreeWalkingHost::register_module`].
///
/// Cloning is cheap: the module table is shared (`Rc<RefCell<_>>`) across
/// clones, which is how a lambda value can carry its own host reference
/// without borrowing from the `HostBridge` that created it.
#[derive(Clone)]
pub struct TreeWalkingHost {
    modules: Rc<RefCell<HashMap<String, Namespace>>>,
    builtins: Namespace,
}

impl Default for TreeWalkingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalkingHost {
    /// Creates a host with the fixed `builtins`/`operator`/`hissp_host`
    /// modules already registered.
    #[must_use]
    pub fn new() -> Self {
        let modules: Rc<RefCell<HashMap<String, Namespace>>> = Rc::new(RefCell::new(HashMap::new()));
        let builtins = builtins_namespace(Rc::clone(&modules));
        modules.borrow_mut().insert("builtins".to_string(), builtins.clone());
        modules.borrow_mut().insert("operator".to_string(), operator_namespace());
        modules
            .borrow_mut()
            .insert("hissp_host".to_string(), hissp_host_namespace());
        Self { modules, builtins }
    }

    /// Registers (or replaces) a module's namespace, making it resolvable
    /// through `__import__` and through [`HostBridge::import_module`]. A
    /// CLI or REPL calls this after compiling and evaluating each module so
    /// later modules can import it.
    pub fn register_module(&self, name: impl Into<String>, ns: Namespace) {
        self.modules.borrow_mut().insert(name.into(), ns);
    }

    fn resolve_name(&self, scope: &Rc<Scope>, name: &str) -> Result<Value> {
        if let Some(v) = scope.get(name) {
            return Ok(v);
        }
        if let Some(v) = self.builtins.get(name) {
            return Ok(v.clone());
        }
        Err(Error::new(ErrorKind::Internal(format!("name '{name}' is not defined"))))
    }

    fn eval_expr(&self, expr: &Expr, scope: &Rc<Scope>) -> Result<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Complex(re, im) => Ok(Value::Complex(*re, *im)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::None => Ok(Value::None),
            Expr::Ellipsis => Ok(Value::Ellipsis),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bytes(b) => Ok(Value::Bytes(b.clone())),
            Expr::Name(name) => self.resolve_name(scope, name),
            Expr::Attr(base, name) => {
                let base_value = self.eval_expr(base, scope)?;
                match base_value {
                    Value::Namespace(ns) => ns
                        .get(name)
                        .cloned()
                        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no attribute '{name}'")))),
                    other => Err(Error::new(ErrorKind::Internal(format!(
                        "attribute access on a {} is not supported by this host",
                        other.type_name()
                    )))),
                }
            }
            Expr::Index(base, index) => {
                let base_value = self.eval_expr(base, scope)?;
                let index_value = self.eval_expr(index, scope)?;
                index_value_into(&base_value, &index_value)
            }
            Expr::Call(callee, args) => {
                let callee_value = self.eval_expr(callee, scope)?;
                let Value::Callable(f) = callee_value else {
                    return Err(Error::new(ErrorKind::Internal(format!(
                        "{} is not callable",
                        callee_value.type_name()
                    ))));
                };
                let call_args = self.eval_args(args, scope)?;
                f(&call_args)
            }
            Expr::Tuple(items) => Ok(Value::Tuple(self.eval_display_items(items, scope)?)),
            Expr::List(items) => Ok(Value::List(self.eval_display_items(items, scope)?)),
            Expr::Set(items) => Ok(Value::Set(self.eval_display_items(items, scope)?)),
            Expr::Dict(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    out.push((self.eval_expr(k, scope)?, self.eval_expr(v, scope)?));
                }
                Ok(Value::Dict(out))
            }
            Expr::Starred(inner) => self.eval_expr(inner, scope),
            Expr::Lambda(params, body) => {
                let host = self.clone();
                let params = params.clone();
                let body = (**body).clone();
                let closure = Rc::clone(scope);
                Ok(Value::Callable(Rc::new(move |args: &[Value]| {
                    host.call_lambda(&params, &body, &closure, args)
                })))
            }
        }
    }

    fn eval_display_items(&self, items: &[Expr], scope: &Rc<Scope>) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let Expr::Starred(inner) = item {
                match self.eval_expr(inner, scope)? {
                    Value::Tuple(items) | Value::List(items) | Value::Set(items) => out.extend(items),
                    other => {
                        return Err(Error::new(ErrorKind::Internal(format!(
                            "cannot splice a {} into a display",
                            other.type_name()
                        ))))
                    }
                }
            } else {
                out.push(self.eval_expr(item, scope)?);
            }
        }
        Ok(out)
    }

    /// Evaluates a call's arguments into a flat positional list. Keyword
    /// and `**` arguments are collected into a trailing [`Value::Dict`]
    /// (this reference host's one simplification: [`hissp_core::value::CallableFn`]
    /// has no separate keyword-argument channel); none of the fixed
    /// registry's builtins need keyword arguments, so this is adequate for
    /// the scenarios this host is scoped to.
    fn eval_args(&self, args: &[Arg], scope: &Rc<Scope>) -> Result<Vec<Value>> {
        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        for a in args {
            match a {
                Arg::Positional(e) => positional.push(self.eval_expr(e, scope)?),
                Arg::Star(e) => match self.eval_expr(e, scope)? {
                    Value::Tuple(items) | Value::List(items) => positional.extend(items),
                    other => {
                        return Err(Error::new(ErrorKind::Internal(format!(
                            "cannot unpack a {} as positional arguments",
                            other.type_name()
                        ))))
                    }
                },
                Arg::Keyword(name, e) => {
                    keywords.push((Value::Str(name.clone()), self.eval_expr(e, scope)?));
                }
                Arg::DoubleStar(e) => match self.eval_expr(e, scope)? {
                    Value::Dict(entries) => keywords.extend(entries),
                    other => {
                        return Err(Error::new(ErrorKind::Internal(format!(
                            "cannot unpack a {} as keyword arguments",
                            other.type_name()
                        ))))
                    }
                },
            }
        }
        if !keywords.is_empty() {
            positional.push(Value::Dict(keywords));
        }
        Ok(positional)
    }

    fn call_lambda(&self, params: &[Param], body: &Expr, closure: &Rc<Scope>, args: &[Value]) -> Result<Value> {
        let mut vars = HashMap::new();
        let mut i = 0;
        for param in params {
            match param {
                Param::Slash => {}
                Param::Plain(name) => {
                    let value = args
                        .get(i)
                        .cloned()
                        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("missing argument '{name}'"))))?;
                    vars.insert(name.clone(), value);
                    i += 1;
                }
                Param::Default(name, default) => {
                    let value = match args.get(i) {
                        Some(v) => v.clone(),
                        None => self.eval_expr(default, closure)?,
                    };
                    vars.insert(name.clone(), value);
                    i += 1;
                }
                Param::Star(name) => {
                    vars.insert(name.clone(), Value::Tuple(args[i..].to_vec()));
                    i = args.len();
                }
                Param::DoubleStar(name) => {
                    vars.insert(name.clone(), Value::Dict(Vec::new()));
                }
            }
        }
        let scope = Rc::new(Scope {
            vars,
            parent: Some(Rc::clone(closure)),
        });
        self.eval_expr(body, &scope)
    }
}

fn index_value_into(base: &Value, index: &Value) -> Result<Value> {
    match base {
        Value::Tuple(items) | Value::List(items) => {
            let Value::Int(n) = index else {
                return Err(Error::new(ErrorKind::Internal("sequence index must be an int".to_string())));
            };
            let len = items.len() as i64;
            let real = if *n < 0 { n + len } else { *n };
            usize::try_from(real)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::Internal("index out of range".to_string())))
        }
        Value::Dict(entries) => entries
            .iter()
            .find(|(k, _)| values_equal(k, index))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::new(ErrorKind::Internal("key not found".to_string()))),
        other => Err(Error::new(ErrorKind::Internal(format!(
            "{} is not subscriptable",
            other.type_name()
        )))),
    }
}

impl HostBridge for TreeWalkingHost {
    fn eval(&self, source: &str, env: &Namespace) -> Result<Value> {
        let expr = parse(source)?;
        let mut vars = HashMap::new();
        for (name, value) in env.iter() {
            vars.insert(name.clone(), value.clone());
        }
        let scope = Rc::new(Scope { vars, parent: None });
        self.eval_expr(&expr, &scope)
    }

    fn import_module(&self, dotted: &str) -> Result<Namespace> {
        self.modules
            .borrow()
            .get(dotted)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no module named '{dotted}'"))))
    }

    fn make_env(&self, module_name: &str) -> Namespace {
        let mut ns = Namespace::new(module_name);
        if let Some(existing) = self.modules.borrow().get(module_name) {
            if let Some(macro_ns) = existing.macro_namespace() {
                ns.set("_macro_", Value::Namespace(macro_ns.clone()));
            }
        }
        if let Some(import_fn) = self.builtins.get("__import__") {
            ns.set("__import__", import_fn.clone());
        }
        ns.set("builtins", Value::Namespace(self.builtins.clone()));
        if let Some(operator_ns) = self.modules.borrow().get("operator") {
            ns.set("operator", Value::Namespace(operator_ns.clone()));
        }
        ns
    }

    fn repr(&self, value: &Value) -> String {
        repr_value(value)
    }
}

fn repr_value(value: &Value) -> String {
    value.literal().unwrap_or_else(|| match value {
        Value::Namespace(ns) => format!("<module {:?}>", ns.module),
        Value::Macro(_) => "<macro>".to_string(),
        Value::Callable(_) => "<function>".to_string(),
        _ => format!("<{}>", value.type_name()),
    })
}

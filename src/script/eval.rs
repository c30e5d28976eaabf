//! Interpreter for parsed pipeline descriptions.
//!
//! The only callable functions are `rule`, `single` and `bundle`. Anything
//! else a description names is an error, so evaluation can do nothing beyond
//! filling in [`Declarations`].

use super::parser::{Expr, ExprKind, Stmt};
use super::ScriptError;
use crate::domain::{BundleBuilder, Declarations, RuleDecl, SingleBuilder};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<Value>),
    Rule(usize),
    Single(usize),
    Bundle(usize),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
            Value::Rule(_) => "rule builder",
            Value::Single(_) => "single builder",
            Value::Bundle(_) => "bundle builder",
        }
    }

    /// Scalar rendering used for concatenation and variable assignment.
    fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Num(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub struct Interpreter<'src> {
    source: &'src str,
    bindings: HashMap<String, Value>,
    decls: Declarations,
}

impl<'src> Interpreter<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, bindings: HashMap::new(), decls: Declarations::default() }
    }

    pub fn run(mut self, program: &[Stmt]) -> Result<Declarations, ScriptError> {
        for stmt in program {
            match stmt {
                Stmt::Let { name, value } => {
                    let value = self.eval(value)?;
                    self.bindings.insert(name.clone(), value);
                }
                Stmt::Expr(expr) => {
                    self.eval(expr)?;
                }
            }
        }
        Ok(self.decls)
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match &expr.kind {
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Num(n) => Ok(Value::Num(*n)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Var(name) => self.lookup(name, expr.offset),
            ExprKind::List(items) => {
                let values = items.iter().map(|item| self.eval(item)).collect::<Result<_, _>>()?;
                Ok(Value::List(values))
            }
            ExprKind::Concat(lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.concat(lhs, rhs, expr.offset)
            }
            ExprKind::Call { name, args } => self.call(name, args, expr.offset),
            ExprKind::Method { receiver, name, args } => {
                let target = self.eval(receiver)?;
                let args = args.iter().map(|arg| self.eval(arg)).collect::<Result<Vec<_>, _>>()?;
                self.method(target, name, args, expr.offset)
            }
        }
    }

    fn lookup(&self, name: &str, offset: usize) -> Result<Value, ScriptError> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        let message = if matches!(name, "rule" | "single" | "bundle") {
            format!("'{name}' must be called, e.g. {name}('...')")
        } else {
            format!("unknown identifier '{name}'")
        };
        Err(self.error(offset, message))
    }

    fn concat(&self, lhs: Value, rhs: Value, offset: usize) -> Result<Value, ScriptError> {
        match (&lhs, &rhs) {
            (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                match (lhs.scalar_text(), rhs.scalar_text()) {
                    (Some(a), Some(b)) => Ok(Value::Str(a + &b)),
                    _ => Err(self.error(
                        offset,
                        format!("cannot add {} and {}", lhs.type_name(), rhs.type_name()),
                    )),
                }
            }
            _ => Err(self.error(
                offset,
                format!("cannot add {} and {}", lhs.type_name(), rhs.type_name()),
            )),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr], offset: usize) -> Result<Value, ScriptError> {
        if !matches!(name, "rule" | "single" | "bundle") {
            return Err(self.error(
                offset,
                format!("unknown function '{name}'; only rule, single and bundle are available"),
            ));
        }

        let args = args.iter().map(|arg| self.eval(arg)).collect::<Result<Vec<_>, _>>()?;
        self.expect_arity(name, &args, 1, offset)?;
        let arg = self.expect_str(name, &args[0], offset)?;
        tracing::trace!("declared {name}({arg:?})");

        let value = match name {
            "rule" => {
                self.decls.rules.push(RuleDecl::new(arg));
                Value::Rule(self.decls.rules.len() - 1)
            }
            "single" => {
                self.decls.singles.push(SingleBuilder::new(arg));
                Value::Single(self.decls.singles.len() - 1)
            }
            _ => {
                self.decls.bundles.push(BundleBuilder::new(arg));
                Value::Bundle(self.decls.bundles.len() - 1)
            }
        };
        Ok(value)
    }

    fn method(
        &mut self,
        target: Value,
        name: &str,
        args: Vec<Value>,
        offset: usize,
    ) -> Result<Value, ScriptError> {
        match target {
            Value::Rule(idx) => match name {
                "command" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let command = self.expect_str(name, &args[0], offset)?;
                    self.decls.rules[idx].command(command);
                }
                _ => return Err(self.unknown_method(&target, name, offset)),
            },
            Value::Single(idx) => match name {
                "fromBuild" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let flag = self.expect_bool(name, &args[0], offset)?;
                    self.decls.singles[idx].from_build(flag);
                }
                "to" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let target_name = self.expect_str(name, &args[0], offset)?;
                    self.decls.singles[idx].to(target_name);
                }
                "toExt" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let ext = self.expect_str(name, &args[0], offset)?;
                    self.decls.singles[idx].to_ext(&ext);
                }
                "assign" => {
                    let (key, value) = self.expect_assignment(&args, offset)?;
                    self.decls.singles[idx].assign(key, value);
                }
                "using" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let rule = self.expect_str(name, &args[0], offset)?;
                    self.decls.singles[idx].using(rule);
                }
                _ => return Err(self.unknown_method(&target, name, offset)),
            },
            Value::Bundle(idx) => match name {
                "fromBuild" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let flag = self.expect_bool(name, &args[0], offset)?;
                    self.decls.bundles[idx].from_build(flag);
                }
                "to" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let targets = self.expect_targets(&args[0], offset)?;
                    self.decls.bundles[idx].to(targets);
                }
                "assign" => {
                    let (key, value) = self.expect_assignment(&args, offset)?;
                    self.decls.bundles[idx].assign(key, value);
                }
                "using" => {
                    self.expect_arity(name, &args, 1, offset)?;
                    let rule = self.expect_str(name, &args[0], offset)?;
                    self.decls.bundles[idx].using(rule);
                }
                _ => return Err(self.unknown_method(&target, name, offset)),
            },
            other => {
                return Err(self.error(
                    offset,
                    format!("cannot call '{name}' on a {}", other.type_name()),
                ));
            }
        }
        Ok(target)
    }

    fn expect_arity(
        &self,
        name: &str,
        args: &[Value],
        expected: usize,
        offset: usize,
    ) -> Result<(), ScriptError> {
        if args.len() == expected {
            return Ok(());
        }
        Err(self.error(
            offset,
            format!("'{name}' takes {expected} argument(s), got {}", args.len()),
        ))
    }

    fn expect_str(&self, name: &str, value: &Value, offset: usize) -> Result<String, ScriptError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(self.error(
                offset,
                format!("'{name}' expects a string, got {}", other.type_name()),
            )),
        }
    }

    fn expect_bool(&self, name: &str, value: &Value, offset: usize) -> Result<bool, ScriptError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(self.error(
                offset,
                format!("'{name}' expects a boolean, got {}", other.type_name()),
            )),
        }
    }

    fn expect_targets(&self, value: &Value, offset: usize) -> Result<Vec<String>, ScriptError> {
        match value {
            Value::Str(s) => Ok(vec![s.clone()]),
            Value::List(items) => items.iter().map(|item| self.expect_str("to", item, offset)).collect(),
            other => Err(self.error(
                offset,
                format!("'to' expects a string or a list of strings, got {}", other.type_name()),
            )),
        }
    }

    fn expect_assignment(
        &self,
        args: &[Value],
        offset: usize,
    ) -> Result<(String, String), ScriptError> {
        self.expect_arity("assign", args, 2, offset)?;
        let key = self.expect_str("assign", &args[0], offset)?;
        let value = args[1].scalar_text().ok_or_else(|| {
            self.error(
                offset,
                format!("'assign' value must be a string, number or boolean, got {}", args[1].type_name()),
            )
        })?;
        Ok((key, value))
    }

    fn unknown_method(&self, target: &Value, name: &str, offset: usize) -> ScriptError {
        self.error(offset, format!("{} has no method '{name}'", target.type_name()))
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ScriptError {
        ScriptError::at(self.source, offset, message)
    }
}

//! Tree-walking evaluation of a parsed template

use std::collections::HashMap;

use serde_json::Value;

use super::value;
use crate::error::{RenderError, Span};
use crate::parser::ast::*;

/// Render `program` with `data` bound to `variable`
pub fn render_program(program: &Program, variable: &str, data: &Value) -> Result<String, RenderError> {
    let mut root = HashMap::new();
    root.insert(variable.to_string(), data.clone());

    let mut evaluator = Evaluator {
        scopes: vec![root],
        out: String::new(),
    };
    evaluator.exec_block(&program.body)?;
    Ok(evaluator.out)
}

struct Evaluator {
    /// Function scopes, innermost last. `if` blocks share their enclosing
    /// scope; each `_.each` callback body gets a fresh one.
    scopes: Vec<HashMap<String, Value>>,
    out: String,
}

impl Evaluator {
    fn exec_block(&mut self, body: &[Spanned<Stmt>]) -> Result<(), RenderError> {
        for stmt in body {
            self.exec(&stmt.node)?;
        }
        Ok(())
    }

    fn exec_scoped(
        &mut self,
        body: &[Spanned<Stmt>],
        bindings: HashMap<String, Value>,
    ) -> Result<(), RenderError> {
        self.scopes.push(bindings);
        let result = self.exec_block(body);
        self.scopes.pop();
        result
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), RenderError> {
        match stmt {
            Stmt::Text(text) => self.out.push_str(text),
            Stmt::Emit { expr, escape } => {
                let text = value::to_output(&self.eval(expr)?);
                if *escape {
                    self.out.push_str(&value::escape_html(&text));
                } else {
                    self.out.push_str(&text);
                }
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if value::truthy(&self.eval(cond)?) {
                    self.exec_block(then)?;
                } else if let Some(otherwise) = otherwise {
                    self.exec_block(otherwise)?;
                }
            }
            Stmt::Each {
                items,
                item,
                key,
                body,
            } => {
                let collection = self.eval(items)?;
                for (entry, index) in value::entries(&collection) {
                    let mut bindings = HashMap::new();
                    bindings.insert(item.0.clone(), entry);
                    if let Some(key) = key {
                        bindings.insert(key.0.clone(), index);
                    }
                    self.exec_scoped(body, bindings)?;
                }
            }
            Stmt::Let { name, value } => {
                let value = self.eval(value)?;
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.0.clone(), value);
                }
            }
            Stmt::Print(expr) => {
                let text = value::to_output(&self.eval(expr)?);
                self.out.push_str(&text);
            }
            Stmt::Empty => {}
        }
        Ok(())
    }

    fn lookup(&self, name: &Identifier, span: &Span) -> Result<Value, RenderError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name.as_str()))
            .cloned()
            .ok_or_else(|| RenderError::UndefinedVariable {
                name: name.0.clone(),
                span: span.clone(),
            })
    }

    fn eval(&mut self, expr: &Spanned<Expr>) -> Result<Value, RenderError> {
        match &expr.node {
            Expr::Literal(lit) => Ok(match lit {
                Literal::Null | Literal::Undefined => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => value::number(*n),
                Literal::String(s) => Value::String(s.clone()),
            }),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Var(name) => self.lookup(name, &expr.span),
            Expr::Member(object, name) => {
                let object = self.eval(object)?;
                member(&object, name.as_str(), &expr.span)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object)?;
                let key = value::to_js_string(&self.eval(index)?);
                member(&object, &key, &expr.span)
            }
            Expr::Call { callee, args } => self.call(callee, args, &expr.span),
            Expr::Unary(op, operand) => {
                let operand = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value::truthy(&operand)),
                    UnaryOp::Neg => value::number(-value::to_number(&operand)),
                })
            }
            Expr::Binary(op, lhs, rhs) => self.binary(*op, lhs, rhs),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if value::truthy(&self.eval(cond)?) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: &Spanned<Expr>,
        rhs: &Spanned<Expr>,
    ) -> Result<Value, RenderError> {
        // Logical operators short-circuit and yield an operand, not a bool
        match op {
            BinaryOp::And => {
                let left = self.eval(lhs)?;
                return if value::truthy(&left) {
                    self.eval(rhs)
                } else {
                    Ok(left)
                };
            }
            BinaryOp::Or => {
                let left = self.eval(lhs)?;
                return if value::truthy(&left) {
                    Ok(left)
                } else {
                    self.eval(rhs)
                };
            }
            _ => {}
        }

        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;
        let arithmetic = |f: fn(f64, f64) -> f64| {
            value::number(f(value::to_number(&left), value::to_number(&right)))
        };
        let ordering = value::compare(&left, &right);

        Ok(match op {
            BinaryOp::Add => value::add(&left, &right),
            BinaryOp::Sub => arithmetic(|a, b| a - b),
            BinaryOp::Mul => arithmetic(|a, b| a * b),
            BinaryOp::Div => arithmetic(|a, b| a / b),
            BinaryOp::Rem => arithmetic(|a, b| a % b),
            BinaryOp::Lt => Value::Bool(ordering == Some(std::cmp::Ordering::Less)),
            BinaryOp::Le => Value::Bool(matches!(
                ordering,
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            )),
            BinaryOp::Gt => Value::Bool(ordering == Some(std::cmp::Ordering::Greater)),
            BinaryOp::Ge => Value::Bool(matches!(
                ordering,
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            )),
            BinaryOp::StrictEq => Value::Bool(value::strict_eq(&left, &right)),
            BinaryOp::StrictNe => Value::Bool(!value::strict_eq(&left, &right)),
            BinaryOp::LooseEq => Value::Bool(value::loose_eq(&left, &right)),
            BinaryOp::LooseNe => Value::Bool(!value::loose_eq(&left, &right)),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        })
    }

    /// Built-in helpers: `_.escape`, `_.isEmpty`, `_.has`
    fn call(
        &mut self,
        callee: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        span: &Span,
    ) -> Result<Value, RenderError> {
        let name = callee_name(&callee.node).unwrap_or_else(|| "expression".to_string());
        let values = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let arity = |expected: usize| {
            if values.len() < expected {
                Err(RenderError::ArgumentCount {
                    function: name.clone(),
                    expected,
                    found: values.len(),
                    span: span.clone(),
                })
            } else {
                Ok(())
            }
        };

        match name.as_str() {
            "_.escape" => {
                arity(1)?;
                Ok(Value::String(value::escape_html(&value::to_output(
                    &values[0],
                ))))
            }
            "_.isEmpty" => {
                arity(1)?;
                Ok(Value::Bool(value::is_empty(&values[0])))
            }
            "_.has" => {
                arity(2)?;
                let key = value::to_js_string(&values[1]);
                Ok(Value::Bool(match &values[0] {
                    Value::Object(map) => map.contains_key(&key),
                    _ => false,
                }))
            }
            _ => Err(RenderError::UnknownFunction {
                name,
                span: span.clone(),
            }),
        }
    }
}

fn member(object: &Value, key: &str, span: &Span) -> Result<Value, RenderError> {
    if object.is_null() {
        return Err(RenderError::NullAccess {
            property: key.to_string(),
            span: span.clone(),
        });
    }
    Ok(value::property(object, key))
}

/// `name` or `object.name` for calls to named helpers
fn callee_name(callee: &Expr) -> Option<String> {
    match callee {
        Expr::Var(id) => Some(id.0.clone()),
        Expr::Member(object, property) => match &object.node {
            Expr::Var(id) => Some(format!("{}.{}", id, property)),
            _ => None,
        },
        _ => None,
    }
}

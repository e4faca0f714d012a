//! Template evaluation over a JSON context value.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use prism_core::errors::TemplateError;
use serde_json::Value;

use crate::ast::{Base, Expr, Literal, Node};
use crate::CustomFilter;

pub(crate) struct Evaluator<'a> {
    context: &'a Value,
    globals: &'a HashMap<String, Value>,
    custom_filters: &'a HashMap<String, CustomFilter>,
    strict: bool,
    /// Loop-variable scopes, innermost last.
    scopes: Vec<HashMap<String, Value>>,
    out: String,
}

/// JS-flavored string conversion: arrays join with commas, objects render
/// as compact JSON, null renders as nothing.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Int(n) => Value::from(*n),
        Literal::Float(f) => {
            serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
        }
        Literal::Bool(b) => Value::Bool(*b),
    }
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        context: &'a Value,
        globals: &'a HashMap<String, Value>,
        custom_filters: &'a HashMap<String, CustomFilter>,
        strict: bool,
    ) -> Self {
        Self {
            context,
            globals,
            custom_filters,
            strict,
            scopes: Vec::new(),
            out: String::new(),
        }
    }

    pub(crate) fn render(mut self, nodes: &[Node]) -> Result<String, TemplateError> {
        self.render_nodes(nodes)?;
        Ok(self.out)
    }

    fn render_nodes(&mut self, nodes: &[Node]) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Output(expr) => {
                    let value = self.eval_expr(expr)?;
                    self.write_value(value, expr)?;
                }
                Node::If {
                    cond,
                    then_body,
                    else_body,
                } => {
                    let truthy = self
                        .eval_expr(cond)?
                        .as_ref()
                        .map(is_truthy)
                        .unwrap_or(false);
                    if truthy {
                        self.render_nodes(then_body)?;
                    } else {
                        self.render_nodes(else_body)?;
                    }
                }
                Node::For {
                    var,
                    iterable,
                    body,
                } => {
                    let items = match self.eval_expr(iterable)? {
                        Some(Value::Array(items)) => items,
                        // Non-arrays (and undefined) iterate zero times.
                        _ => Vec::new(),
                    };
                    for item in items {
                        let mut scope = HashMap::new();
                        scope.insert(var.clone(), item);
                        self.scopes.push(scope);
                        let result = self.render_nodes(body);
                        self.scopes.pop();
                        result?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluate an expression. `None` means the variable was undefined;
    /// applying any filter converts undefined into a defined value.
    fn eval_expr(&self, expr: &Expr) -> Result<Option<Value>, TemplateError> {
        let mut value: Option<Value> = match &expr.base {
            Base::Literal(literal) => Some(literal_to_value(literal)),
            Base::Call(name) => Some(self.eval_call(name)?),
            Base::Path(segments) => self.lookup(segments),
        };

        for filter in &expr.filters {
            let input = value.take().unwrap_or(Value::Null);
            value = Some(self.apply_filter(&filter.name, input, &filter.args)?);
        }

        Ok(value)
    }

    fn eval_call(&self, name: &str) -> Result<Value, TemplateError> {
        match name {
            "now" => Ok(Value::String(
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            "today" => Ok(Value::String(Utc::now().format("%Y-%m-%d").to_string())),
            other => Err(TemplateError::Syntax {
                message: format!("unknown function '{other}'"),
            }),
        }
    }

    fn apply_filter(
        &self,
        name: &str,
        value: Value,
        args: &[Literal],
    ) -> Result<Value, TemplateError> {
        if let Some(result) = crate::filters::apply_builtin(name, value.clone(), args)? {
            return Ok(result);
        }
        if let Some(custom) = self.custom_filters.get(name) {
            return custom(value, args);
        }
        Err(TemplateError::UnknownFilter {
            name: name.to_string(),
        })
    }

    fn lookup(&self, segments: &[String]) -> Option<Value> {
        let root = &segments[0];

        let mut current: Value = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(root).cloned())
            .or_else(|| self.context.get(root).cloned())
            .or_else(|| self.globals.get(root).cloned())?;

        for segment in &segments[1..] {
            current = current.get(segment)?.clone();
        }
        Some(current)
    }

    fn write_value(&mut self, value: Option<Value>, expr: &Expr) -> Result<(), TemplateError> {
        match value {
            None | Some(Value::Null) if self.strict => Err(TemplateError::UndefinedVariable {
                name: expr.display_name(),
            }),
            None | Some(Value::Null) => Ok(()),
            Some(v) => {
                self.out.push_str(&stringify(&v));
                Ok(())
            }
        }
    }
}

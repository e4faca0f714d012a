//! Template AST. The grammar is deliberately tiny: text, `{{ expr }}`
//! outputs, `{% if %}`/`{% else %}`/`{% endif %}` and
//! `{% for x in expr %}`/`{% endfor %}` blocks. Expressions are a dotted
//! path, a zero-argument global call, or a literal, followed by a filter
//! pipeline with literal arguments. Nothing else is evaluatable — that is
//! the sandbox.

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    /// Dotted variable path, e.g. `source.content`.
    Path(Vec<String>),
    /// Zero-argument global call, e.g. `now()`.
    Call(String),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Literal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub base: Base,
    pub filters: Vec<FilterCall>,
}

impl Expr {
    /// Human-readable name for undefined-variable errors.
    pub fn display_name(&self) -> String {
        match &self.base {
            Base::Path(segments) => segments.join("."),
            Base::Call(name) => format!("{name}()"),
            Base::Literal(_) => "<literal>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Output(Expr),
    If {
        cond: Expr,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Node>,
    },
}

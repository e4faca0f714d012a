/// Errors raised by the sandboxed template renderer.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template syntax error: {message}")]
    Syntax { message: String },

    #[error("attempted to output undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("unknown filter: {name}")]
    UnknownFilter { name: String },

    #[error("filter {filter}: {message}")]
    FilterArgument { filter: String, message: String },
}

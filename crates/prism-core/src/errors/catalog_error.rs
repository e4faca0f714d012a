/// Errors raised by the built-in template catalog loader.
///
/// Per-file validation failures are collected into the load report rather
/// than aborting the load; only directory-level I/O failures are fatal.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("failed to read catalog path {path}: {message}")]
    Io { path: String, message: String },
}

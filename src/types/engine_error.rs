use std::path::PathBuf;
use thiserror::Error;

/// Errors that carry owned context (a path, an offending line) rather
/// than a bare index. `GraphError` stays a plain, `Copy`-able enum for
/// structural index failures; `EngineError` follows the richer
/// `thiserror`-derived pattern because it wraps `std::io::Error` and
/// owns `String`/`PathBuf` data.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot open edge-list file at {path}: {source}")]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed edge-list line: {line:?}")]
    MalformedLine { line: String },
}

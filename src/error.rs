//! Error types for graph generation

use crate::graph::GraphError;
use crate::script::ScriptError;
use std::path::PathBuf;

pub type GenerateResult<T> = Result<T, GenerateError>;

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("pipeline description not found: {}", path.display())]
    MissingScript { path: PathBuf },

    #[error("failed to evaluate {}: {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("cannot read source directory {}: {message}", root.display())]
    Filesystem { root: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind}('{pattern}'): {source}")]
    Edge {
        kind: &'static str,
        pattern: String,
        #[source]
        source: GraphError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

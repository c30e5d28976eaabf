//! Pipeline description evaluation
//!
//! Descriptions look like JavaScript but are never executed as code. They are
//! parsed into a restricted expression language and interpreted directly, so
//! the only thing a description can do is declare rules and edge builders.

use crate::domain::Declarations;

pub mod eval;
pub mod lexer;
pub mod parser;

/// A syntax or evaluation error with a 1-based source position.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ScriptError {
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column, message: message.into() }
    }
}

/// Evaluate a pipeline description into its declarations.
pub fn evaluate(source: &str) -> Result<Declarations, ScriptError> {
    let program = parser::parse(source)?;
    eval::Interpreter::new(source).run(&program)
}

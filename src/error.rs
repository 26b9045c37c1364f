// ABOUTME: Error types covering lexing, parsing, and evaluation failures

use crate::value::Value;
use thiserror::Error;

/// Every error in the interpreter is fatal within a single top-level run.
/// Each variant renders as one human-readable line naming its category and
/// the offending character, token, name, or operator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    // ===== Lexer errors =====
    #[error("lex error: invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("lex error: unterminated string literal")]
    UnterminatedString,

    #[error("lex error: malformed operator '{0}'")]
    MalformedOperator(char),

    // ===== Parser errors =====
    #[error("parse error: expected {expected}, got '{found}'")]
    UnexpectedToken { expected: String, found: String },

    // ===== Runtime errors =====
    #[error("name error: variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("type error: '{0}' is not a function")]
    NotCallable(String),

    #[error("type error: invalid operator '{op}' for {left} and {right}")]
    InvalidOperands {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("type error: modulo by zero")]
    ModuloByZero,

    #[error("import error: could not read '{0}'")]
    ImportFailed(String),
}

impl ScriptError {
    /// Create a parse error from the expected description and the token
    /// actually found.
    pub fn unexpected_token(expected: impl Into<String>, found: impl ToString) -> Self {
        ScriptError::UnexpectedToken {
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Create a type error for an operator applied to incompatible operands.
    pub fn invalid_operands(op: impl ToString, left: &Value, right: &Value) -> Self {
        ScriptError::InvalidOperands {
            op: op.to_string(),
            left: left.type_name(),
            right: right.type_name(),
        }
    }
}

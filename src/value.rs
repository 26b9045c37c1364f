// ABOUTME: Runtime value types produced by the evaluator

use crate::ast::Stmt;
use crate::env::ScopeRef;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Function(Rc<Function>),
    Null,
}

/// A user-defined function: its declared name, parameter list, body, and
/// the environment frames that were live at the declaration. The frames
/// are shared by reference, so writes made through the closure stay
/// visible to every holder.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Stmt>,
    pub closure: Vec<ScopeRef>,
}

/// Formats a number without a trailing decimal for integral values, and
/// with Rust's shortest round-trip form otherwise.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Function(_) => "function",
            Value::Null => "null",
        }
    }

    /// Text form used when `+` coerces mixed operands to a string.
    /// Differs from `Display` only for functions, which coerce to the
    /// null text rather than `[Function: name]`.
    pub fn coerce_text(&self) -> String {
        match self {
            Value::Function(_) => "null".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Function(func) => write!(f, "[Function: {}]", func.name),
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;

    fn sample_function(name: &str) -> Value {
        Value::Function(Rc::new(Function {
            name: name.to_string(),
            params: vec![],
            body: Rc::new(Stmt::Block(vec![])),
            closure: vec![],
        }))
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(0.0).to_string(), "0");
        assert_eq!(Value::Number(-2.5).to_string(), "-2.5");
        assert_eq!(Value::Number(0.1).to_string(), "0.1");
    }

    #[test]
    fn test_bool_and_null_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_string_displays_raw() {
        assert_eq!(Value::Str("hi there".into()).to_string(), "hi there");
    }

    #[test]
    fn test_function_display() {
        assert_eq!(sample_function("inc").to_string(), "[Function: inc]");
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(Value::Number(3.0).coerce_text(), "3");
        assert_eq!(Value::Str("x".into()).coerce_text(), "x");
        assert_eq!(Value::Bool(false).coerce_text(), "false");
        assert_eq!(Value::Null.coerce_text(), "null");
        // Functions fall back to the null text under coercion
        assert_eq!(sample_function("f").coerce_text(), "null");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Number(1.0).type_name(), "number");
        assert_eq!(Value::Str("".into()).type_name(), "string");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(sample_function("f").type_name(), "function");
        assert_eq!(Value::Null.type_name(), "null");
    }
}

// ABOUTME: Tree-walking evaluator executing the AST against scoped environments

use crate::ast::{BinaryOp, Expr, Literal, LogicalOp, Program, Stmt};
use crate::env::{Scope, ScopeRef};
use crate::error::ScriptError;
use crate::loader;
use crate::parser;
use crate::value::{Function, Value};
use log::debug;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;

/// Resolved paths already evaluated by `import` during one top-level run.
/// The root interpreter owns the set and shares it by reference with the
/// nested contexts it spawns for imported files.
type ImportSet = Rc<RefCell<HashSet<PathBuf>>>;

/// Parses and evaluates a complete program in a fresh context. Import
/// paths resolve relative to `base_dir`.
pub fn run_source(source: &str, base_dir: impl Into<PathBuf>) -> Result<Value, ScriptError> {
    Interpreter::new(base_dir).run(source)
}

/// One evaluation context: the stack of scope frames (global frame at the
/// bottom), the one-slot return channel, the directory imports resolve
/// against, and the run-wide set of already imported files.
pub struct Interpreter {
    scopes: Vec<ScopeRef>,
    pending_return: Option<Value>,
    base_dir: PathBuf,
    imports: ImportSet,
}

impl Interpreter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Interpreter {
            scopes: vec![Scope::new()],
            pending_return: None,
            base_dir: base_dir.into(),
            imports: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// Context for evaluating an imported file: its global frame is the
    /// caller's innermost frame, so top-level declarations in the file
    /// become visible in the importing scope.
    fn for_import(global: ScopeRef, base_dir: PathBuf, imports: ImportSet) -> Self {
        Interpreter {
            scopes: vec![global],
            pending_return: None,
            base_dir,
            imports,
        }
    }

    /// Parses `source` and evaluates it in this context. Reusable across
    /// calls; globals persist between runs, which is what the REPL needs.
    pub fn run(&mut self, source: &str) -> Result<Value, ScriptError> {
        self.pending_return = None;
        let program = parser::parse(source)?;
        self.eval_program(&program)
    }

    /// Looks up a name through the environment stack, innermost frame
    /// first.
    pub fn lookup(&self, name: &str) -> Result<Value, ScriptError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| ScriptError::UndefinedVariable(name.to_string()))
    }

    fn current_scope(&self) -> ScopeRef {
        self.scopes.last().cloned().expect("scope stack is never empty")
    }

    fn eval_program(&mut self, program: &Program) -> Result<Value, ScriptError> {
        let mut result = Value::Null;
        for stmt in &program.body {
            result = self.eval_stmt(stmt)?;
            // A top-level return ends the program early; the flag is only
            // consumed at a call boundary, so it stays set here.
            if let Some(value) = &self.pending_return {
                return Ok(value.clone());
            }
        }
        Ok(result)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Value, ScriptError> {
        match stmt {
            Stmt::Block(body) => self.eval_block(body),
            Stmt::VarDecl { name, value } => {
                let value = self.eval_expr(value)?;
                self.current_scope().define(name.clone(), value.clone());
                Ok(value)
            }
            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                for scope in self.scopes.iter().rev() {
                    if scope.assign(name, value.clone()) {
                        return Ok(value);
                    }
                }
                Err(ScriptError::UndefinedVariable(name.clone()))
            }
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                // Anything but boolean true is falsy here
                if matches!(self.eval_expr(test)?, Value::Bool(true)) {
                    self.eval_stmt(consequent)
                } else if let Some(alternate) = alternate {
                    self.eval_stmt(alternate)
                } else {
                    Ok(Value::Null)
                }
            }
            Stmt::While { test, body } => {
                let mut result = Value::Null;
                loop {
                    if !matches!(self.eval_expr(test)?, Value::Bool(true)) {
                        break;
                    }
                    result = self.eval_stmt(body)?;
                    if self.pending_return.is_some() {
                        break;
                    }
                }
                Ok(result)
            }
            Stmt::FunctionDecl { name, params, body } => {
                let function = Value::Function(Rc::new(Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    // Shallow snapshot: the frames themselves are shared
                    closure: self.scopes.clone(),
                }));
                self.current_scope().define(name.clone(), function.clone());
                Ok(function)
            }
            Stmt::Return(argument) => {
                let value = self.eval_expr(argument)?;
                self.pending_return = Some(value.clone());
                Ok(value)
            }
            Stmt::Print(argument) => {
                let value = self.eval_expr(argument)?;
                println!("{}", value);
                Ok(value)
            }
            Stmt::Import(path) => self.eval_import(path),
            Stmt::Expr(expr) => self.eval_expr(expr),
        }
    }

    fn eval_block(&mut self, body: &[Stmt]) -> Result<Value, ScriptError> {
        self.scopes.push(Scope::new());
        let mut result = Ok(Value::Null);
        for stmt in body {
            result = self.eval_stmt(stmt);
            if result.is_err() || self.pending_return.is_some() {
                break;
            }
        }
        self.scopes.pop();
        result
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match expr {
            Expr::Literal(Literal::Number(n)) => Ok(Value::Number(*n)),
            Expr::Literal(Literal::Str(s)) => Ok(Value::Str(s.clone())),
            Expr::Literal(Literal::Bool(b)) => Ok(Value::Bool(*b)),
            Expr::Identifier(name) => self.lookup(name),
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                apply_binary(*op, left, right)
            }
            Expr::Logical { op, left, right } => self.eval_logical(*op, left, right),
            Expr::Call { callee, arguments } => self.eval_call(callee, arguments),
        }
    }

    /// Short-circuit logic. A non-boolean operand never short-circuits,
    /// and a non-boolean right operand damps the result to `false`.
    fn eval_logical(
        &mut self,
        op: LogicalOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, ScriptError> {
        let left = self.eval_expr(left)?;
        match op {
            LogicalOp::And => {
                if matches!(left, Value::Bool(false)) {
                    return Ok(Value::Bool(false));
                }
            }
            LogicalOp::Or => {
                if matches!(left, Value::Bool(true)) {
                    return Ok(Value::Bool(true));
                }
            }
        }
        let right = self.eval_expr(right)?;
        Ok(Value::Bool(matches!(right, Value::Bool(true))))
    }

    fn eval_call(&mut self, callee: &str, arguments: &[Expr]) -> Result<Value, ScriptError> {
        let function = match self.lookup(callee)? {
            Value::Function(function) => function,
            _ => return Err(ScriptError::NotCallable(callee.to_string())),
        };

        // Arguments evaluate left to right in the caller's environment
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval_expr(argument)?);
        }

        // Install the closure snapshot plus a fresh local frame binding
        // the parameters. Missing arguments bind to null; extras are
        // dropped.
        let local = Scope::new();
        for (index, param) in function.params.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or(Value::Null);
            local.define(param.clone(), value);
        }
        let mut call_scopes = function.closure.clone();
        call_scopes.push(local);

        let saved = std::mem::replace(&mut self.scopes, call_scopes);
        let outcome = self.eval_stmt(&function.body);
        self.scopes = saved;

        let body_value = outcome?;
        // The call boundary consumes a pending return
        match self.pending_return.take() {
            Some(value) => Ok(value),
            None => Ok(body_value),
        }
    }

    fn eval_import(&mut self, path: &str) -> Result<Value, ScriptError> {
        let resolved = self.base_dir.join(path);

        // Each file is evaluated at most once per top-level run; the path
        // is registered before reading so cycles cannot re-enter.
        if !self.imports.borrow_mut().insert(resolved.clone()) {
            debug!("import {} already evaluated, skipping", resolved.display());
            return Ok(Value::Null);
        }

        debug!("importing {}", resolved.display());
        let source = match loader::read_source(&resolved) {
            Ok(Some(source)) => source,
            Ok(None) => return Err(ScriptError::ImportFailed(resolved.display().to_string())),
            Err(err) => {
                return Err(ScriptError::ImportFailed(format!(
                    "{}: {}",
                    resolved.display(),
                    err
                )))
            }
        };

        let dir = match resolved.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let program = parser::parse(&source)?;
        let mut nested =
            Interpreter::for_import(self.current_scope(), dir, Rc::clone(&self.imports));
        nested.eval_program(&program)
    }
}

/// The type-directed binary operator table. Both operands are already
/// evaluated.
fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, ScriptError> {
    match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => {
            let (l, r) = (*l, *r);
            let value = match op {
                BinaryOp::Add => Value::Number(l + r),
                BinaryOp::Sub => Value::Number(l - r),
                BinaryOp::Mul => Value::Number(l * r),
                BinaryOp::Div => Value::Number(l / r),
                BinaryOp::Mod => {
                    // Both operands truncate toward zero before taking
                    // the remainder
                    let (li, ri) = (l as i64, r as i64);
                    if ri == 0 {
                        return Err(ScriptError::ModuloByZero);
                    }
                    Value::Number(li.wrapping_rem(ri) as f64)
                }
                BinaryOp::Eq => Value::Bool(l == r),
                BinaryOp::Ne => Value::Bool(l != r),
                BinaryOp::Gt => Value::Bool(l > r),
                BinaryOp::Ge => Value::Bool(l >= r),
                BinaryOp::Lt => Value::Bool(l < r),
                BinaryOp::Le => Value::Bool(l <= r),
            };
            Ok(value)
        }
        (Value::Str(l), Value::Str(r)) => match op {
            BinaryOp::Add => Ok(Value::Str(format!("{}{}", l, r))),
            BinaryOp::Eq => Ok(Value::Bool(l == r)),
            BinaryOp::Ne => Ok(Value::Bool(l != r)),
            _ => Err(ScriptError::invalid_operands(op, &left, &right)),
        },
        (Value::Bool(l), Value::Bool(r)) => match op {
            BinaryOp::Eq => Ok(Value::Bool(l == r)),
            BinaryOp::Ne => Ok(Value::Bool(l != r)),
            _ => Err(ScriptError::invalid_operands(op, &left, &right)),
        },
        // Mixed types: `+` stringifies both sides, equality is decided by
        // type alone, everything else is an error
        _ => match op {
            BinaryOp::Add => Ok(Value::Str(format!(
                "{}{}",
                left.coerce_text(),
                right.coerce_text()
            ))),
            BinaryOp::Eq => Ok(Value::Bool(false)),
            BinaryOp::Ne => Ok(Value::Bool(true)),
            _ => Err(ScriptError::invalid_operands(op, &left, &right)),
        },
    }
}

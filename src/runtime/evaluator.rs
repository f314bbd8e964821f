use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::host::HostFunction;
use crate::lexer::Scanner;
use crate::parser::{BinaryOp, Expr, FunctionDef, Parser, Program, Stmt, UnaryOp};
use crate::runtime::scope::ScopeChain;
use crate::runtime::value::{ArrayRef, Callable, FunctionValue, Indexable, Instance, Value};

/// Default bound on nested script function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// A resolved assignment target
///
/// Place resolution runs before the right-hand side of an assignment and
/// performs all slot creation, so a failing right-hand side still leaves
/// the created slot behind.
enum Place {
    Variable { name: String },
    Member { instance: Instance, name: String },
    Element { array: ArrayRef, index: Value },
}

/// Tree-walking evaluator for HostScript programs
///
/// Holds the scope chain across calls to [`Evaluator::run`], so globals
/// defined by one program are visible to the next. Host functions are
/// registered up front and live in the global function namespace.
pub struct Evaluator {
    chain: ScopeChain,
    call_depth: usize,
    max_call_depth: usize,
}

impl Evaluator {
    /// Evaluator with an empty global scope
    pub fn new() -> Self {
        Evaluator {
            chain: ScopeChain::new(),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Evaluator with a custom bound on nested calls
    pub fn with_max_call_depth(limit: usize) -> Self {
        Evaluator {
            chain: ScopeChain::new(),
            call_depth: 0,
            max_call_depth: limit,
        }
    }

    /// Register a host function in the global function namespace
    pub fn register_host<F>(&mut self, function: F)
    where
        F: HostFunction + 'static,
    {
        let name = function.name().to_string();
        debug!(name = %name, "registering host function");
        self.chain
            .define_global_function(&name, Callable::Native(Rc::new(function)));
    }

    /// Install a read-only global binding
    pub fn define_const(&mut self, name: &str, value: Value) {
        self.chain.define_global_const(name, value);
    }

    /// Number of scopes currently on the chain, including the global scope
    pub fn scope_depth(&self) -> usize {
        self.chain.depth()
    }

    /// Scan, parse, and evaluate a source string
    ///
    /// Returns the value of the last top-level statement, Null for an
    /// empty program.
    pub fn run(&mut self, source: &str) -> Result<Value> {
        let tokens = Scanner::new(source).scan_tokens()?;
        let program = Parser::new(tokens).parse()?;
        self.execute(&program)
    }

    /// Evaluate an already parsed program
    ///
    /// Function definitions are registered before the first statement
    /// runs, so calls may precede the definition in source order.
    pub fn execute(&mut self, program: &Program) -> Result<Value> {
        for stmt in &program.body {
            if let Stmt::Function(def) = stmt {
                self.register_function(def);
            }
        }
        debug!(statements = program.body.len(), "executing program");

        let mut last = Value::Null;
        for stmt in &program.body {
            if let Stmt::Expr(expr) = stmt {
                last = self.eval_expr(expr)?;
            }
        }
        Ok(last)
    }

    fn register_function(&mut self, def: &FunctionDef) {
        trace!(name = %def.name, params = def.params.len(), "registering function");
        self.chain
            .define_global_function(&def.name, Callable::Script(Rc::new(def.clone())));
    }

    // ------------------------------------------------------------------
    // Expression evaluation (right-value mode)
    // ------------------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::ArrayLiteral(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::Array(ArrayRef::new(values)))
            }
            Expr::Identifier(name) => self.read_identifier(name),
            Expr::This => self
                .chain
                .current_instance()
                .map(Value::Instance)
                .ok_or(Error::NoInstance),
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                apply_unary_op(*op, operand)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                apply_binary_op(*op, left, right)
            }
            Expr::Assign { op, target, value } => self.eval_assign(*op, target, value),
            Expr::Call { callee, args } => self.eval_call(callee, args),
            Expr::New { callee, args } => self.eval_new(callee, args),
            Expr::Member { object, name } => self.eval_member(object, name),
            Expr::Index { target, index } => {
                let target = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                match target {
                    Value::Array(array) => array.index_get(&index),
                    other => Err(Error::NotAFunction {
                        kind: other.type_name().to_string(),
                    }),
                }
            }
        }
    }

    fn read_identifier(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.chain.get(name) {
            return Ok(value);
        }
        // Function definitions are first class outside call position too.
        if let Some(callable) = self.chain.resolve_function(name) {
            return Ok(Value::Function(FunctionValue::unbound(callable)));
        }
        Err(Error::UnknownIdentifier {
            name: name.to_string(),
        })
    }

    fn eval_member(&mut self, object: &Expr, name: &str) -> Result<Value> {
        let object = self.eval_expr(object)?;
        let instance = match object {
            Value::Instance(instance) => instance,
            _ => {
                return Err(Error::UnknownIdentifier {
                    name: name.to_string(),
                })
            }
        };
        if let Some(value) = instance.get_member(name) {
            // A function-valued member reads back bound to its receiver.
            if let Value::Function(func) = value {
                return Ok(Value::Function(FunctionValue::bound(func.target, instance)));
            }
            return Ok(value);
        }
        if let Some(callable) = instance.get_function(name) {
            return Ok(Value::Function(FunctionValue::unbound(callable)));
        }
        Err(Error::UnknownIdentifier {
            name: name.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Assignment (left-value mode)
    // ------------------------------------------------------------------

    fn eval_assign(&mut self, op: Option<BinaryOp>, target: &Expr, value: &Expr) -> Result<Value> {
        let place = self.resolve_place(target)?;
        let value = match op {
            None => self.eval_expr(value)?,
            Some(op) => {
                let current = self.read_place(&place)?;
                let rhs = self.eval_expr(value)?;
                apply_binary_op(op, current, rhs)?
            }
        };
        self.store(&place, value.clone())?;
        Ok(value)
    }

    fn resolve_place(&mut self, target: &Expr) -> Result<Place> {
        match target {
            Expr::Identifier(name) => {
                // Writes bind in the innermost scope only; an outer binding
                // of the same name is shadowed, never mutated.
                self.chain.ensure_local(name);
                Ok(Place::Variable { name: name.clone() })
            }
            Expr::Member { object, name } => {
                let object = self.eval_expr(object)?;
                let instance = match object {
                    Value::Instance(instance) => instance,
                    other => {
                        return Err(Error::not_lvalue(format!(
                            "member access on {}",
                            other.type_name()
                        )))
                    }
                };
                // An existing variable slot stays assignable even when a
                // fixed function member shares its name; only creating a
                // new slot over a function name is rejected.
                if instance.get_member(name).is_none() && instance.has_function(name) {
                    return Err(Error::not_lvalue(format!(
                        "fixed function member '{}'",
                        name
                    )));
                }
                Ok(Place::Member {
                    instance,
                    name: name.to_string(),
                })
            }
            Expr::Index { target, index } => {
                let target = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                match target {
                    Value::Array(array) => {
                        // Index and bounds are checked before the
                        // right-hand side runs.
                        array.index_get(&index)?;
                        Ok(Place::Element { array, index })
                    }
                    other => Err(Error::NotAFunction {
                        kind: other.type_name().to_string(),
                    }),
                }
            }
            _ => Err(Error::not_lvalue("expression")),
        }
    }

    fn read_place(&mut self, place: &Place) -> Result<Value> {
        match place {
            Place::Variable { name } => self.read_identifier(name),
            Place::Member { instance, name } => {
                instance
                    .get_member(name)
                    .ok_or_else(|| Error::UnknownIdentifier { name: name.clone() })
            }
            Place::Element { array, index } => array.index_get(index),
        }
    }

    fn store(&mut self, place: &Place, value: Value) -> Result<()> {
        match place {
            Place::Variable { name } => self.chain.store_local(name, value),
            Place::Member { instance, name } => instance.set_member(name, value),
            Place::Element { array, index } => array.index_set(index, value),
        }
    }

    // ------------------------------------------------------------------
    // Calls and construction
    // ------------------------------------------------------------------

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value> {
        let func = self.resolve_callee(callee)?;
        let args = self.eval_args(args)?;
        self.call_function(func, args)
    }

    fn eval_new(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value> {
        let func = self.resolve_callee(callee)?;
        let args = self.eval_args(args)?;
        let instance = Instance::new();
        trace!("constructing instance");
        // The constructor body runs with the fresh instance as `this`;
        // its result value is discarded.
        let bound = FunctionValue::bound(func.target, instance.clone());
        self.call_function(bound, args)?;
        Ok(Value::Instance(instance))
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    /// Call position checks the function namespace before variables, so a
    /// variable shadowing a function name does not capture its calls.
    fn resolve_callee(&mut self, callee: &Expr) -> Result<FunctionValue> {
        match callee {
            Expr::Identifier(name) => {
                if let Some(callable) = self.chain.resolve_function(name) {
                    return Ok(FunctionValue::unbound(callable));
                }
                match self.chain.get(name) {
                    Some(Value::Function(func)) => Ok(func),
                    Some(other) => Err(Error::NotAFunction {
                        kind: other.type_name().to_string(),
                    }),
                    None => Err(Error::UnknownIdentifier { name: name.clone() }),
                }
            }
            other => match self.eval_expr(other)? {
                Value::Function(func) => Ok(func),
                value => Err(Error::NotAFunction {
                    kind: value.type_name().to_string(),
                }),
            },
        }
    }

    fn call_function(&mut self, func: FunctionValue, args: Vec<Value>) -> Result<Value> {
        let FunctionValue { target, receiver } = func;
        match target {
            Callable::Native(host) => {
                trace!(name = host.name(), argc = args.len(), "calling host function");
                let args = match host.arity() {
                    Some(arity) => {
                        let mut args = args;
                        args.resize(arity, Value::Null);
                        args
                    }
                    None => args,
                };
                host.call(&args)
            }
            Callable::Script(def) => {
                if self.call_depth >= self.max_call_depth {
                    return Err(Error::StackOverflow {
                        limit: self.max_call_depth,
                    });
                }
                trace!(name = %def.name, argc = args.len(), "calling function");
                self.call_depth += 1;
                let result = self.with_call_scope(|ev| {
                    // Missing arguments bind Null, extras are ignored.
                    for (i, param) in def.params.iter().enumerate() {
                        let value = args.get(i).cloned().unwrap_or(Value::Null);
                        ev.chain.store_local(param, value)?;
                    }
                    match receiver {
                        Some(instance) => {
                            ev.with_instance_scope(instance, |ev| ev.eval_body(&def.body))
                        }
                        None => ev.eval_body(&def.body),
                    }
                });
                self.call_depth -= 1;
                result
            }
        }
    }

    /// Body statements evaluate in order; the body's value is the last
    /// statement's value, Null for an empty body.
    fn eval_body(&mut self, body: &[Stmt]) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in body {
            if let Stmt::Expr(expr) = stmt {
                last = self.eval_expr(expr)?;
            }
        }
        Ok(last)
    }

    // Scope push/pop stays balanced on every exit path because the pops
    // are outside the closure's result.

    fn with_call_scope<F>(&mut self, f: F) -> Result<Value>
    where
        F: FnOnce(&mut Evaluator) -> Result<Value>,
    {
        self.chain.push_scope();
        let result = f(self);
        self.chain.pop_scope();
        result
    }

    fn with_instance_scope<F>(&mut self, instance: Instance, f: F) -> Result<Value>
    where
        F: FnOnce(&mut Evaluator) -> Result<Value>,
    {
        self.chain.push_instance(instance);
        let result = f(self);
        self.chain.pop_instance();
        result
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

// ----------------------------------------------------------------------
// Operators
// ----------------------------------------------------------------------

/// Strict per-kind dispatch, no cross-kind coercion
///
/// Null participates only in equality, which compares kinds. Mixed kinds
/// fail `OperatorNotAllowed` for every other operator.
fn apply_binary_op(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        let both_null = matches!(left, Value::Null) && matches!(right, Value::Null);
        return match op {
            BinaryOp::Eq => Ok(Value::Bool(both_null)),
            BinaryOp::NotEq => Ok(Value::Bool(!both_null)),
            _ => Err(operator_error(op, &left, &right)),
        };
    }
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_op(op, *a, *b),
        (Value::String(a), Value::String(b)) => string_op(op, a, b),
        (Value::Bool(a), Value::Bool(b)) => bool_op(op, *a, *b),
        _ => Err(operator_error(op, &left, &right)),
    }
}

fn operator_error(op: BinaryOp, left: &Value, right: &Value) -> Error {
    let kind = if left.type_name() == right.type_name() {
        left.type_name().to_string()
    } else {
        format!("{} and {}", left.type_name(), right.type_name())
    };
    Error::OperatorNotAllowed {
        op: op.to_string(),
        kind,
    }
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let value = match op {
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(Error::DivisionByZero);
            }
            Value::Int(a.wrapping_div(b))
        }
        BinaryOp::Shl => Value::Int(a.wrapping_shl(b as u32)),
        BinaryOp::Shr => Value::Int(a.wrapping_shr(b as u32)),
        BinaryOp::BitAnd => Value::Int(a & b),
        BinaryOp::BitOr => Value::Int(a | b),
        BinaryOp::BitXor => Value::Int(a ^ b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::And | BinaryOp::Or => {
            return Err(Error::OperatorNotAllowed {
                op: op.to_string(),
                kind: "int".to_string(),
            })
        }
    };
    Ok(value)
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    let value = match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(Error::DivisionByZero);
            }
            Value::Float(a / b)
        }
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        _ => {
            return Err(Error::OperatorNotAllowed {
                op: op.to_string(),
                kind: "float".to_string(),
            })
        }
    };
    Ok(value)
}

fn string_op(op: BinaryOp, a: &str, b: &str) -> Result<Value> {
    let value = match op {
        BinaryOp::Add => Value::String(format!("{}{}", a, b)),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        _ => {
            return Err(Error::OperatorNotAllowed {
                op: op.to_string(),
                kind: "string".to_string(),
            })
        }
    };
    Ok(value)
}

fn bool_op(op: BinaryOp, a: bool, b: bool) -> Result<Value> {
    let value = match op {
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::And => Value::Bool(a && b),
        BinaryOp::Or => Value::Bool(a || b),
        _ => {
            return Err(Error::OperatorNotAllowed {
                op: op.to_string(),
                kind: "bool".to_string(),
            })
        }
    };
    Ok(value)
}

fn apply_unary_op(op: UnaryOp, operand: Value) -> Result<Value> {
    match (op, &operand) {
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(Error::OperatorNotAllowed {
            op: op.to_string(),
            kind: operand.type_name().to_string(),
        }),
    }
}

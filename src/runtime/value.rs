use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::host::HostFunction;
use crate::parser::FunctionDef;
use crate::runtime::scope::Scope;

/// Runtime values
///
/// Primitives are held inline and copied on assignment. Arrays, functions,
/// and instances are reference values: cloning a [`Value`] clones the shared
/// handle, so every copy observes the same mutations.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value
    Null,
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating-point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Immutable string
    String(String),
    /// Shared mutable array
    Array(ArrayRef),
    /// Callable function, optionally bound to a receiver
    Function(FunctionValue),
    /// Constructed object with its own member scope
    Instance(Instance),
}

impl Value {
    /// Language-level kind name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Instance(_) => "instance",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(array) => {
                write!(f, "[")?;
                let elements = array.elements.borrow();
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match element {
                        Value::String(s) => write!(f, "\"{}\"", s)?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "]")
            }
            Value::Function(func) => match &func.target {
                Callable::Script(def) => write!(f, "<function {}>", def.name),
                Callable::Native(host) => write!(f, "<native function {}>", host.name()),
            },
            Value::Instance(_) => write!(f, "<instance>"),
        }
    }
}

/// Values that support `target[index]` access
pub trait Indexable {
    /// Read the element at `index`
    fn index_get(&self, index: &Value) -> Result<Value>;
    /// Overwrite the element at `index`
    fn index_set(&self, index: &Value, value: Value) -> Result<()>;
}

/// Shared handle to a mutable array
///
/// Cloning the handle is cheap; the element vector is shared between all
/// clones. Indexing requires an existing element, out-of-range writes do
/// not grow the array.
#[derive(Debug, Clone)]
pub struct ArrayRef {
    elements: Rc<RefCell<Vec<Value>>>,
}

impl ArrayRef {
    /// Wrap an element vector in a shared handle
    pub fn new(elements: Vec<Value>) -> Self {
        ArrayRef {
            elements: Rc::new(RefCell::new(elements)),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// True if the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    fn position(&self, index: &Value) -> Result<usize> {
        let raw = match index {
            Value::Int(n) => *n,
            other => {
                return Err(Error::NotAnInteger {
                    kind: other.type_name().to_string(),
                })
            }
        };
        let length = self.len();
        if raw < 0 || raw as usize >= length {
            return Err(Error::IndexOutOfRange { index: raw, length });
        }
        Ok(raw as usize)
    }
}

impl Indexable for ArrayRef {
    fn index_get(&self, index: &Value) -> Result<Value> {
        let pos = self.position(index)?;
        Ok(self.elements.borrow()[pos].clone())
    }

    fn index_set(&self, index: &Value, value: Value) -> Result<()> {
        let pos = self.position(index)?;
        self.elements.borrow_mut()[pos] = value;
        Ok(())
    }
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
            || *self.elements.borrow() == *other.elements.borrow()
    }
}

/// A callable with an optional bound receiver
///
/// Reading a function-valued member through an instance produces a
/// [`FunctionValue`] whose receiver is that instance, so a later call sees
/// the instance as `this`.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    /// The underlying callable
    pub target: Callable,
    /// Receiver bound at member read time, if any
    pub receiver: Option<Instance>,
}

impl FunctionValue {
    /// Unbound function value
    pub fn unbound(target: Callable) -> Self {
        FunctionValue {
            target,
            receiver: None,
        }
    }

    /// Function value bound to a receiver
    pub fn bound(target: Callable, receiver: Instance) -> Self {
        FunctionValue {
            target,
            receiver: Some(receiver),
        }
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        let same_target = match (&self.target, &other.target) {
            (Callable::Script(a), Callable::Script(b)) => Rc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        let same_receiver = match (&self.receiver, &other.receiver) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        same_target && same_receiver
    }
}

/// The two kinds of callable targets
#[derive(Clone)]
pub enum Callable {
    /// Function defined in script source
    Script(Rc<FunctionDef>),
    /// Function provided by the host application
    Native(Rc<dyn HostFunction>),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Callable::Script(def) => f.debug_tuple("Script").field(&def.name).finish(),
            Callable::Native(host) => f.debug_tuple("Native").field(&host.name()).finish(),
        }
    }
}

/// A constructed object
///
/// Members live in the instance's own scope; every clone of the handle
/// shares it, so identity is pointer identity.
#[derive(Debug, Clone)]
pub struct Instance {
    scope: Rc<RefCell<Scope>>,
}

impl Instance {
    /// Fresh instance with an empty member scope
    pub fn new() -> Self {
        Instance {
            scope: Rc::new(RefCell::new(Scope::new())),
        }
    }

    /// Read a member, `None` if absent
    pub fn get_member(&self, name: &str) -> Option<Value> {
        self.scope.borrow().get(name)
    }

    /// Write a member, creating the slot on first assignment
    pub fn set_member(&self, name: &str, value: Value) -> Result<()> {
        self.scope.borrow_mut().assign(name, value)
    }

    /// Attach a fixed function member
    ///
    /// Fixed members live in the scope's function namespace, cannot be
    /// overwritten by member assignment, and are returned unbound on read.
    pub fn define_function(&self, name: &str, callable: Callable) {
        self.scope.borrow_mut().define_function(name, callable);
    }

    /// Look up a fixed function member
    pub fn get_function(&self, name: &str) -> Option<Callable> {
        self.scope.borrow().get_function(name)
    }

    /// True if a fixed function member with this name exists
    pub fn has_function(&self, name: &str) -> bool {
        self.scope.borrow().has_function(name)
    }

    /// True if both handles refer to the same object
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.scope, &other.scope)
    }

    /// Number of live handles to this object, for leak diagnostics
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.scope)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Instance::new()
    }
}

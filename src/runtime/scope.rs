use crate::error::{Error, Result};
use crate::runtime::value::{Callable, Instance, Value};

/// One named storage cell in a scope
#[derive(Debug, Clone)]
pub struct VariableSlot {
    /// Slot name, unique within its scope
    pub name: String,
    /// Current value
    pub value: Value,
    /// Constant slots reject assignment
    pub constant: bool,
    /// Reserved for host-backed slots whose value may change outside the
    /// evaluator. Nothing sets it yet; the evaluator already re-reads
    /// slots on every access, so setting it will not change evaluation.
    pub volatile: bool,
}

/// A single lexical scope
///
/// Variables and functions live in disjoint namespaces: `f` in call
/// position resolves against function definitions, everywhere else against
/// variables. Slots keep insertion order, names are unique per scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    slots: Vec<VariableSlot>,
    functions: Vec<(String, Callable)>,
}

impl Scope {
    /// Empty scope
    pub fn new() -> Self {
        Scope::default()
    }

    /// Read a variable, `None` if absent
    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.value.clone())
    }

    /// True if a variable slot with this name exists
    pub fn has(&self, name: &str) -> bool {
        self.slots.iter().any(|slot| slot.name == name)
    }

    /// Assign a variable, creating the slot on first write
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.name == name) {
            if slot.constant {
                return Err(Error::NotAnLValue {
                    target: format!("constant '{}'", name),
                });
            }
            slot.value = value;
            return Ok(());
        }
        self.slots.push(VariableSlot {
            name: name.to_string(),
            value,
            constant: false,
            volatile: false,
        });
        Ok(())
    }

    /// Create a null-valued slot if the name is absent
    pub fn declare(&mut self, name: &str) {
        if !self.has(name) {
            self.slots.push(VariableSlot {
                name: name.to_string(),
                value: Value::Null,
                constant: false,
                volatile: false,
            });
        }
    }

    /// Install a constant slot, replacing any existing slot of that name
    pub fn define_const(&mut self, name: &str, value: Value) {
        self.slots.retain(|slot| slot.name != name);
        self.slots.push(VariableSlot {
            name: name.to_string(),
            value,
            constant: true,
            volatile: false,
        });
    }

    /// Register a function, replacing an earlier definition of that name
    pub fn define_function(&mut self, name: &str, callable: Callable) {
        self.functions.retain(|(existing, _)| existing != name);
        self.functions.push((name.to_string(), callable));
    }

    /// Look up a function by name
    pub fn get_function(&self, name: &str) -> Option<Callable> {
        self.functions
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, callable)| callable.clone())
    }

    /// True if a function with this name is registered here
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.iter().any(|(existing, _)| existing == name)
    }
}

/// The evaluator's scope stack
///
/// The bottom scope is the permanent global scope and is never popped. Each
/// function call pushes one fresh scope; constructor and bound-method calls
/// additionally push the receiver on a separate instance stack so `this`
/// resolution is independent of variable scoping.
#[derive(Debug)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
    instances: Vec<Instance>,
}

impl ScopeChain {
    /// Chain holding only the global scope
    pub fn new() -> Self {
        ScopeChain {
            scopes: vec![Scope::new()],
            instances: Vec::new(),
        }
    }

    /// Number of scopes currently on the stack, including the global scope
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a fresh call scope
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost call scope; the global scope stays
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Push a receiver for `this` resolution
    pub fn push_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Pop the innermost receiver
    pub fn pop_instance(&mut self) {
        self.instances.pop();
    }

    /// The receiver of the innermost active method or constructor call
    pub fn current_instance(&self) -> Option<Instance> {
        self.instances.last().cloned()
    }

    /// Read a variable, searching innermost to outermost
    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Make sure the innermost scope owns a slot for `name`
    ///
    /// Place resolution creates slots before the right-hand side runs.
    /// Existing slots, constant ones included, are left alone.
    pub fn ensure_local(&mut self, name: &str) {
        self.top_mut().declare(name);
    }

    /// Assign a variable in the innermost scope only
    ///
    /// Outer bindings of the same name are shadowed rather than mutated; a
    /// name never written in the current scope gets a fresh slot here.
    pub fn store_local(&mut self, name: &str, value: Value) -> Result<()> {
        self.top_mut().assign(name, value)
    }

    /// Install a constant in the global scope
    pub fn define_global_const(&mut self, name: &str, value: Value) {
        self.scopes[0].define_const(name, value);
    }

    /// Register a function in the global scope
    pub fn define_global_function(&mut self, name: &str, callable: Callable) {
        self.scopes[0].define_function(name, callable);
    }

    /// Look up a function, searching innermost to outermost
    pub fn resolve_function(&self, name: &str) -> Option<Callable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get_function(name))
    }

    fn top_mut(&mut self) -> &mut Scope {
        // The chain always holds at least the global scope.
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        ScopeChain::new()
    }
}

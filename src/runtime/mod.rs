//! Program execution
//!
//! The runtime layers three pieces: the dynamic [`value::Value`] model,
//! the [`scope::ScopeChain`] holding variable and function bindings, and
//! the tree-walking [`evaluator::Evaluator`] that drives both.

pub mod evaluator;
pub mod scope;
pub mod value;

pub use evaluator::{Evaluator, DEFAULT_MAX_CALL_DEPTH};
pub use scope::{Scope, ScopeChain, VariableSlot};
pub use value::{ArrayRef, Callable, FunctionValue, Indexable, Instance, Value};

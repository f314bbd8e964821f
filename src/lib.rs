//! # HostScript
//!
//! An embeddable, dynamically-typed scripting language with first-class
//! functions, constructor objects, and a host-function interface for
//! exposing native capabilities to scripts.
//!
//! The pipeline is scan → parse → evaluate: a hand-written [`lexer::Scanner`]
//! produces tokens, a recursive descent [`parser::Parser`] builds the AST,
//! and the tree-walking [`runtime::Evaluator`] executes it against a scope
//! chain with shared, reference-counted heap values.
//!
//! ## Quick start
//!
//! ```
//! use hostscript::Evaluator;
//! use hostscript::runtime::Value;
//!
//! let mut evaluator = Evaluator::new();
//! let result = evaluator
//!     .run("function add(a, b) { a + b; } add(2, 3);")
//!     .unwrap();
//! assert_eq!(result, Value::Int(5));
//! ```
//!
//! ## Constructor objects
//!
//! `new f(...)` allocates a fresh instance and runs `f` with the instance
//! bound as `this`; members assigned through `this` persist on the object:
//!
//! ```
//! use hostscript::Evaluator;
//! use hostscript::runtime::Value;
//!
//! let mut evaluator = Evaluator::new();
//! let result = evaluator
//!     .run("function make(v) { this.val = v; } var a = new make(7); a.val;")
//!     .unwrap();
//! assert_eq!(result, Value::Int(7));
//! ```
//!
//! ## Host functions
//!
//! Embedders implement [`host::HostFunction`] and register it with the
//! evaluator; the built-in [`host::Print`] writes to a pluggable sink.

pub mod error;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use error::{Error, Result};
pub use host::{HostFunction, Print};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::Parser;
pub use runtime::{Evaluator, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

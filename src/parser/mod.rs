//! Parsing of HostScript token streams into an abstract syntax tree
//!
//! The grammar is statement oriented: a program is a sequence of function
//! definitions and expression statements. All operator precedence lives in
//! [`Parser`]; the AST itself carries no grouping information beyond its
//! nesting.

pub mod ast;
mod script_parser;

pub use ast::{BinaryOp, Expr, FunctionDef, Program, Stmt, UnaryOp};
pub use script_parser::Parser;

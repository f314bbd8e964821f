//! Error types for the HostScript interpreter

use thiserror::Error;

/// HostScript interpreter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Parse errors
    /// Syntax error encountered during scanning or parsing
    ///
    /// **Triggered by:** Invalid HostScript syntax (unterminated strings,
    /// stray characters, malformed numbers)
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where the error occurred
        line: usize,
        /// Column number where the error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// Unexpected end of file during parsing
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// Unexpected token encountered during parsing
    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        /// Expected token description
        expected: String,
        /// Actual token received
        got: String,
    },

    // Runtime errors
    /// An interpreter invariant was violated (a bug, not a script error)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Expression cannot be used as an assignment target
    ///
    /// **Triggered by:** Assigning to a literal, an operator result, a call
    /// result, a constant slot, or a fixed function member
    #[error("Not an assignable location: {target}")]
    NotAnLValue {
        /// Description of the rejected target
        target: String,
    },

    /// Expression cannot be read as a value
    ///
    /// Reserved for host-defined write-only locations; no core node kind
    /// produces it.
    #[error("Not a readable value: {target}")]
    NotAnRValue {
        /// Description of the rejected expression
        target: String,
    },

    /// Reference to an unknown variable, member, or function
    ///
    /// **Triggered by:** Reading an identifier that is bound nowhere in the
    /// scope chain, or accessing a member absent from an instance
    #[error("Unknown identifier: {name}")]
    UnknownIdentifier {
        /// The unresolved name
        name: String,
    },

    /// Operator is not in the dispatch table for the operand kind
    ///
    /// **Triggered by:** Mixed-kind operands (no coercion is performed) or an
    /// operator a kind does not support, e.g. `"a" - "b"` or `1 + 1.5`
    #[error("Operator {op} not allowed on {kind}")]
    OperatorNotAllowed {
        /// Operator spelling
        op: String,
        /// Operand kind description
        kind: String,
    },

    /// Call or index target does not support the operation
    ///
    /// **Triggered by:** Calling a non-callable value (`5()`) or indexing a
    /// value without the indexable capability
    #[error("Value is not callable or indexable: {kind}")]
    NotAFunction {
        /// Kind of the rejected value
        kind: String,
    },

    /// `this` evaluated with no active instance scope
    #[error("No instance: 'this' used outside a method or constructor")]
    NoInstance,

    /// Array index outside the valid range
    #[error("Index out of range: {index} for length {length}")]
    IndexOutOfRange {
        /// Requested index
        index: i64,
        /// Target length
        length: usize,
    },

    /// Index expression did not evaluate to an integer
    #[error("Index is not an integer: got {kind}")]
    NotAnInteger {
        /// Kind of the rejected index value
        kind: String,
    },

    /// Integer or float division by a zero divisor
    #[error("Division by zero")]
    DivisionByZero,

    /// Script recursion exceeded the evaluator's call-depth limit
    #[error("Stack overflow: call depth exceeded {limit}")]
    StackOverflow {
        /// Configured call-depth limit
        limit: usize,
    },
}

impl Error {
    /// Create an internal-invariant error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Create a not-an-lvalue error describing the rejected target
    pub fn not_lvalue(target: impl Into<String>) -> Self {
        Error::NotAnLValue {
            target: target.into(),
        }
    }

    /// True for errors produced by the front end rather than the evaluator
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::SyntaxError { .. } | Error::UnexpectedEof | Error::UnexpectedToken { .. }
        )
    }
}

/// Result type for HostScript operations
pub type Result<T> = std::result::Result<T, Error>;

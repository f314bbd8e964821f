use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete HostScript program
///
/// Top-level items keep their source order; the driver registers every
/// function definition before the first statement runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements and function definitions in source order
    pub body: Vec<Stmt>,
}

/// A named function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Parameter names in declaration order
    pub params: Vec<String>,
    /// Body statements
    pub body: Vec<Stmt>,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression statement: `expr;`
    Expr(Expr),

    /// Function definition (top level only)
    Function(FunctionDef),
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    // Literals
    /// Integer literal expression
    Int(i64),
    /// Floating-point literal expression
    Float(f64),
    /// String literal expression
    Str(String),
    /// Boolean literal expression
    Bool(bool),
    /// Null literal expression
    Null,

    /// Array literal expression: `[e1, e2, ...]`
    ArrayLiteral(Vec<Expr>),

    /// Identifier reference expression
    Identifier(String),

    /// The receiver of the innermost active method or constructor call
    This,

    /// Binary operation expression
    Binary {
        /// Binary operator to apply
        op: BinaryOp,
        /// Left operand expression
        left: Box<Expr>,
        /// Right operand expression
        right: Box<Expr>,
    },

    /// Unary operation expression
    Unary {
        /// Unary operator to apply
        op: UnaryOp,
        /// Operand expression
        operand: Box<Expr>,
    },

    /// Assignment expression: `target = value` or compound `target op= value`
    Assign {
        /// Combining operator for compound assignment (`None` for plain `=`)
        op: Option<BinaryOp>,
        /// Assignable target expression
        target: Box<Expr>,
        /// Value expression
        value: Box<Expr>,
    },

    /// Function call expression: `callee(args...)`
    Call {
        /// Callee expression
        callee: Box<Expr>,
        /// Arguments in source order
        args: Vec<Expr>,
    },

    /// Constructor call expression: `new callee(args...)`
    New {
        /// Callee expression (an identifier in the surface grammar)
        callee: Box<Expr>,
        /// Arguments in source order
        args: Vec<Expr>,
    },

    /// Member access expression: `object.name`
    Member {
        /// Object being accessed
        object: Box<Expr>,
        /// Member name
        name: String,
    },

    /// Index access expression: `target[index]`
    Index {
        /// Indexable target expression
        target: Box<Expr>,
        /// Index expression
        index: Box<Expr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    /// Addition operator (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,

    // Shifts
    /// Shift-left operator (<<)
    Shl,
    /// Shift-right operator (>>)
    Shr,

    // Bitwise
    /// Bitwise AND operator (&)
    BitAnd,
    /// Bitwise OR operator (|)
    BitOr,
    /// Bitwise XOR operator (^)
    BitXor,

    // Comparison
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,

    // Logical
    /// Logical AND operator (&&)
    And,
    /// Logical OR operator (||)
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation operator (-x)
    Neg,
    /// Logical NOT operator (!x)
    Not,
}

impl Expr {
    /// True if the expression can denote an assignable storage location
    ///
    /// The evaluator performs the authoritative check; this is used by the
    /// parser for early diagnostics on compound assignments.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            Expr::Identifier(_) | Expr::Member { .. } | Expr::Index { .. }
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Shl => write!(f, "<<"),
            BinaryOp::Shr => write!(f, ">>"),
            BinaryOp::BitAnd => write!(f, "&"),
            BinaryOp::BitOr => write!(f, "|"),
            BinaryOp::BitXor => write!(f, "^"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

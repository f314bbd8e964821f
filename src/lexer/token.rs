use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where the token appears (1-indexed)
    pub line: usize,
    /// Column number where the token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

/// All possible token types in HostScript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Integer(i64),
    /// Floating-point literal
    Float(f64),
    /// String literal
    String(String),
    /// Boolean true literal
    True,
    /// Boolean false literal
    False,
    /// Null literal
    Null,

    /// Identifier
    Identifier(String),

    // Keywords
    /// FUNCTION keyword
    Function,
    /// VAR keyword
    Var,
    /// NEW keyword
    New,
    /// THIS keyword
    This,

    // Operators
    /// Plus operator (+)
    Plus,
    /// Minus operator (-)
    Minus,
    /// Star operator (*)
    Star,
    /// Slash operator (/)
    Slash,
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
    /// Shift-left operator (<<)
    ShiftLeft,
    /// Shift-right operator (>>)
    ShiftRight,
    /// Bitwise AND operator (&)
    Amp,
    /// Bitwise OR operator (|)
    Pipe,
    /// Bitwise XOR operator (^)
    Caret,
    /// Logical AND operator (&&)
    AmpAmp,
    /// Logical OR operator (||)
    PipePipe,
    /// Logical NOT operator (!)
    Not,
    /// Assignment operator (=)
    Assign,
    /// Plus-assign operator (+=)
    PlusAssign,
    /// Minus-assign operator (-=)
    MinusAssign,
    /// Star-assign operator (*=)
    StarAssign,
    /// Slash-assign operator (/=)
    SlashAssign,
    /// And-assign operator (&=)
    AmpAssign,
    /// Or-assign operator (|=)
    PipeAssign,
    /// Xor-assign operator (^=)
    CaretAssign,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left brace {
    LeftBrace,
    /// Right brace }
    RightBrace,
    /// Left bracket [
    LeftBracket,
    /// Right bracket ]
    RightBracket,
    /// Comma delimiter
    Comma,
    /// Dot operator
    Dot,
    /// Semicolon delimiter
    Semicolon,

    // Special
    /// End of file marker
    Eof,
}

impl TokenKind {
    /// Check if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Var
                | TokenKind::New
                | TokenKind::This
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Look up the keyword token for an identifier spelling, if any
    pub fn keyword(s: &str) -> Option<TokenKind> {
        match s {
            "function" => Some(TokenKind::Function),
            "var" => Some(TokenKind::Var),
            "new" => Some(TokenKind::New),
            "this" => Some(TokenKind::This),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::Float(fl) => write!(f, "{}", fl),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(id) => write!(f, "{}", id),
            _ => write!(f, "{:?}", self),
        }
    }
}

use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};
use crate::parser::ast::{BinaryOp, Expr, FunctionDef, Program, Stmt, UnaryOp};

/// Recursive descent parser for HostScript token streams
///
/// Consumes the token vector produced by the scanner and builds a
/// [`Program`]. Operator precedence is encoded in the call chain, one
/// method per precedence level, binding tighter the deeper the call.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a parser over a scanned token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    /// Parse the whole token stream into a program
    pub fn parse(&mut self) -> Result<Program> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.declaration()?);
        }
        Ok(Program { body })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn declaration(&mut self) -> Result<Stmt> {
        if self.check(&TokenKind::Function) {
            self.function_definition()
        } else {
            self.statement()
        }
    }

    fn function_definition(&mut self) -> Result<Stmt> {
        self.consume(&TokenKind::Function, "function")?;
        let name = self.consume_identifier("function name")?;
        self.consume(&TokenKind::LeftParen, "(")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                params.push(self.consume_identifier("parameter name")?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RightParen, ")")?;

        self.consume(&TokenKind::LeftBrace, "{")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            stmts.push(self.statement()?);
        }
        self.consume(&TokenKind::RightBrace, "}")?;

        Ok(Stmt::Function(FunctionDef {
            name,
            params,
            body: stmts,
        }))
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.check(&TokenKind::Var) {
            return self.var_statement();
        }
        let expr = self.expression()?;
        self.consume(&TokenKind::Semicolon, ";")?;
        Ok(Stmt::Expr(expr))
    }

    /// `var x;` and `var x = e;` desugar to an assignment so declaration
    /// shares the evaluator's normal place resolution path.
    fn var_statement(&mut self) -> Result<Stmt> {
        self.consume(&TokenKind::Var, "var")?;
        let name = self.consume_identifier("variable name")?;
        let value = if self.match_kind(&TokenKind::Assign) {
            self.expression()?
        } else {
            Expr::Null
        };
        self.consume(&TokenKind::Semicolon, ";")?;
        Ok(Stmt::Expr(Expr::Assign {
            op: None,
            target: Box::new(Expr::Identifier(name)),
            value: Box::new(value),
        }))
    }

    // ------------------------------------------------------------------
    // Expressions, lowest to highest precedence
    // ------------------------------------------------------------------

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let target = self.logic_or()?;

        let op = match self.peek_kind() {
            Some(TokenKind::Assign) => None,
            Some(TokenKind::PlusAssign) => Some(BinaryOp::Add),
            Some(TokenKind::MinusAssign) => Some(BinaryOp::Sub),
            Some(TokenKind::StarAssign) => Some(BinaryOp::Mul),
            Some(TokenKind::SlashAssign) => Some(BinaryOp::Div),
            Some(TokenKind::AmpAssign) => Some(BinaryOp::BitAnd),
            Some(TokenKind::PipeAssign) => Some(BinaryOp::BitOr),
            Some(TokenKind::CaretAssign) => Some(BinaryOp::BitXor),
            _ => return Ok(target),
        };
        self.advance();

        if !target.is_place() {
            return Err(Error::NotAnLValue {
                target: describe_expr(&target),
            });
        }

        // Right associative: `a = b = c` parses as `a = (b = c)`.
        let value = self.assignment()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn logic_or(&mut self) -> Result<Expr> {
        let mut expr = self.logic_and()?;
        while self.match_kind(&TokenKind::PipePipe) {
            let right = self.logic_and()?;
            expr = binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr> {
        let mut expr = self.bit_or()?;
        while self.match_kind(&TokenKind::AmpAmp) {
            let right = self.bit_or()?;
            expr = binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    fn bit_or(&mut self) -> Result<Expr> {
        let mut expr = self.bit_xor()?;
        while self.match_kind(&TokenKind::Pipe) {
            let right = self.bit_xor()?;
            expr = binary(BinaryOp::BitOr, expr, right);
        }
        Ok(expr)
    }

    fn bit_xor(&mut self) -> Result<Expr> {
        let mut expr = self.bit_and()?;
        while self.match_kind(&TokenKind::Caret) {
            let right = self.bit_and()?;
            expr = binary(BinaryOp::BitXor, expr, right);
        }
        Ok(expr)
    }

    fn bit_and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;
        while self.match_kind(&TokenKind::Amp) {
            let right = self.equality()?;
            expr = binary(BinaryOp::BitAnd, expr, right);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;
        loop {
            let op = if self.match_kind(&TokenKind::Eq) {
                BinaryOp::Eq
            } else if self.match_kind(&TokenKind::NotEq) {
                BinaryOp::NotEq
            } else {
                break;
            };
            let right = self.comparison()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.shift()?;
        loop {
            let op = if self.match_kind(&TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.match_kind(&TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.match_kind(&TokenKind::LtEq) {
                BinaryOp::LtEq
            } else if self.match_kind(&TokenKind::GtEq) {
                BinaryOp::GtEq
            } else {
                break;
            };
            let right = self.shift()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn shift(&mut self) -> Result<Expr> {
        let mut expr = self.additive()?;
        loop {
            let op = if self.match_kind(&TokenKind::ShiftLeft) {
                BinaryOp::Shl
            } else if self.match_kind(&TokenKind::ShiftRight) {
                BinaryOp::Shr
            } else {
                break;
            };
            let right = self.additive()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut expr = self.multiplicative()?;
        loop {
            let op = if self.match_kind(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.match_kind(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.multiplicative()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;
        loop {
            let op = if self.match_kind(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.match_kind(&TokenKind::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let right = self.unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = if self.match_kind(&TokenKind::Minus) {
            UnaryOp::Neg
        } else if self.match_kind(&TokenKind::Not) {
            UnaryOp::Not
        } else {
            return self.postfix();
        };
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Calls, member access, and indexing chain off a primary expression
    /// and are left associative: `a.b(c)[0].d` nests outward.
    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.match_kind(&TokenKind::LeftParen) {
                let args = self.argument_list()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.match_kind(&TokenKind::Dot) {
                let name = self.consume_identifier("member name")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    name,
                };
            } else if self.match_kind(&TokenKind::LeftBracket) {
                let index = self.expression()?;
                self.consume(&TokenKind::RightBracket, "]")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.peek().ok_or(Error::UnexpectedEof)?.clone();
        match token.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(Expr::Float(n))
            }
            TokenKind::String(ref s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null)
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::This)
            }
            TokenKind::New => {
                self.advance();
                self.constructor_call()
            }
            TokenKind::Identifier(ref name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::Identifier(name))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(&TokenKind::RightParen, ")")?;
                Ok(expr)
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RightBracket) {
                    loop {
                        elements.push(self.expression()?);
                        if !self.match_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(&TokenKind::RightBracket, "]")?;
                Ok(Expr::ArrayLiteral(elements))
            }
            TokenKind::Eof => Err(Error::UnexpectedEof),
            _ => Err(Error::UnexpectedToken {
                expected: "expression".to_string(),
                got: token.lexeme.clone(),
            }),
        }
    }

    /// `new` takes a bare constructor name; the argument list is optional
    /// and `new f` means the same as `new f()`.
    fn constructor_call(&mut self) -> Result<Expr> {
        let name = self.consume_identifier("constructor name")?;
        let args = if self.match_kind(&TokenKind::LeftParen) {
            self.argument_list()?
        } else {
            Vec::new()
        };
        Ok(Expr::New {
            callee: Box::new(Expr::Identifier(name)),
            args,
        })
    }

    /// Arguments after an already consumed `(`, through the closing `)`
    fn argument_list(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RightParen, ")")?;
        Ok(args)
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens.get(self.current - 1)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Eof) | None)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, expected: &str) -> Result<()> {
        if self.match_kind(kind) {
            Ok(())
        } else {
            match self.peek() {
                Some(token) if token.kind != TokenKind::Eof => Err(Error::UnexpectedToken {
                    expected: expected.to_string(),
                    got: token.lexeme.clone(),
                }),
                _ => Err(Error::UnexpectedEof),
            }
        }
    }

    fn consume_identifier(&mut self, expected: &str) -> Result<String> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            Some(TokenKind::Eof) | None => Err(Error::UnexpectedEof),
            _ => Err(Error::UnexpectedToken {
                expected: expected.to_string(),
                got: self
                    .peek()
                    .map(|t| t.lexeme.clone())
                    .unwrap_or_default(),
            }),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn describe_expr(expr: &Expr) -> String {
    match expr {
        Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Null => {
            "literal".to_string()
        }
        Expr::Call { .. } => "call result".to_string(),
        Expr::New { .. } => "constructor result".to_string(),
        Expr::This => "this".to_string(),
        Expr::Binary { op, .. } => format!("'{}' expression", op),
        Expr::Unary { op, .. } => format!("'{}' expression", op),
        _ => "expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;

    fn parse(source: &str) -> Result<Program> {
        let tokens = Scanner::new(source).scan_tokens()?;
        Parser::new(tokens).parse()
    }

    fn parse_expr(source: &str) -> Expr {
        let program = parse(source).unwrap();
        match program.body.into_iter().next().unwrap() {
            Stmt::Expr(e) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // 1 + 2 * 3 groups the multiplication first
        let expr = parse_expr("1 + 2 * 3;");
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => {
                assert_eq!(*left, Expr::Int(1));
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_shift_binds_looser_than_additive() {
        let expr = parse_expr("1 << 2 + 3;");
        match expr {
            Expr::Binary {
                op: BinaryOp::Shl,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expr::Binary {
                    op: BinaryOp::Add,
                    ..
                }
            )),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_assignment_right_assoc() {
        let expr = parse_expr("a = b = 3;");
        match expr {
            Expr::Assign { op: None, value, .. } => {
                assert!(matches!(*value, Expr::Assign { .. }));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_compound_assignment() {
        let expr = parse_expr("x += 2;");
        match expr {
            Expr::Assign {
                op: Some(BinaryOp::Add),
                target,
                ..
            } => assert_eq!(*target, Expr::Identifier("x".to_string())),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_assignment_to_literal_fails() {
        let err = parse("5 = 3;").unwrap_err();
        assert!(matches!(err, Error::NotAnLValue { .. }));
    }

    #[test]
    fn test_parse_var_desugars_to_assignment() {
        let expr = parse_expr("var x = 7;");
        assert_eq!(
            expr,
            Expr::Assign {
                op: None,
                target: Box::new(Expr::Identifier("x".to_string())),
                value: Box::new(Expr::Int(7)),
            }
        );

        let expr = parse_expr("var y;");
        assert_eq!(
            expr,
            Expr::Assign {
                op: None,
                target: Box::new(Expr::Identifier("y".to_string())),
                value: Box::new(Expr::Null),
            }
        );
    }

    #[test]
    fn test_parse_function_definition() {
        let program = parse("function add(a, b) { a + b; }").unwrap();
        match &program.body[0] {
            Stmt::Function(def) => {
                assert_eq!(def.name, "add");
                assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(def.body.len(), 1);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_constructor_call() {
        let expr = parse_expr("new Point(1, 2);");
        match expr {
            Expr::New { callee, args } => {
                assert_eq!(*callee, Expr::Identifier("Point".to_string()));
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected parse: {:?}", other),
        }

        // Bare `new f` is the zero argument form.
        let expr = parse_expr("var p = new Point;");
        match expr {
            Expr::Assign { value, .. } => match *value {
                Expr::New { args, .. } => assert!(args.is_empty()),
                other => panic!("unexpected parse: {:?}", other),
            },
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_postfix_chain() {
        let expr = parse_expr("a.b(1)[0].c;");
        match expr {
            Expr::Member { object, name } => {
                assert_eq!(name, "c");
                assert!(matches!(*object, Expr::Index { .. }));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_member_assignment() {
        let expr = parse_expr("this.val = 7;");
        match expr {
            Expr::Assign { target, .. } => match *target {
                Expr::Member { object, name } => {
                    assert_eq!(*object, Expr::This);
                    assert_eq!(name, "val");
                }
                other => panic!("unexpected parse: {:?}", other),
            },
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_literal() {
        let expr = parse_expr("[1, 2.5, \"x\"];");
        match expr {
            Expr::ArrayLiteral(elements) => {
                assert_eq!(elements.len(), 3);
                assert_eq!(elements[0], Expr::Int(1));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_logical_and_bitwise_levels() {
        // `a | b && c` groups the bitwise-or first
        let expr = parse_expr("a | b && c;");
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_unary() {
        let expr = parse_expr("-x + !y;");
        match expr {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(
                    *left,
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        ..
                    }
                ));
                assert!(matches!(
                    *right,
                    Expr::Unary {
                        op: UnaryOp::Not,
                        ..
                    }
                ));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_semicolon() {
        let err = parse("1 + 2").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_parse_unexpected_token() {
        let err = parse("1 + ;").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_nested_function_rejected() {
        let err = parse("function f() { function g() { } }").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }
}

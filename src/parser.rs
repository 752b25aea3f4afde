use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{
    BlockStatement, BooleanLiteral, CallExpression, Expression, ExpressionStatement, FunctionLiteral, Identifier,
    IfExpression, InfixExpression, InfixOperator, IntegerLiteral, LetStatement, PrefixExpression, PrefixOperator,
    Program, ReturnStatement, Statement, StringLiteral,
};
use crate::error::ParseError;
use crate::token::{Token, TokenKind, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    /// Binding power of a token in infix position.
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

impl PrefixOperator {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(PrefixOperator::Not),
            TokenKind::Minus => Some(PrefixOperator::Negate),
            _ => None,
        }
    }
}

impl InfixOperator {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(InfixOperator::Add),
            TokenKind::Minus => Some(InfixOperator::Subtract),
            TokenKind::Asterisk => Some(InfixOperator::Multiply),
            TokenKind::Slash => Some(InfixOperator::Divide),
            TokenKind::Eq => Some(InfixOperator::Equal),
            TokenKind::NotEq => Some(InfixOperator::NotEqual),
            TokenKind::Lt => Some(InfixOperator::LessThan),
            TokenKind::Gt => Some(InfixOperator::GreaterThan),
            _ => None,
        }
    }
}

type PrefixParseFn<S> = fn(&mut Parser<S>) -> Option<Expression>;
type InfixParseFn<S> = fn(&mut Parser<S>, Expression) -> Option<Expression>;

/// Pratt parser over a pull-based token source.
///
/// Syntax errors never stop the parse: they are collected in [`Parser::errors`]
/// and the parser skips ahead to the next statement boundary.
pub struct Parser<S> {
    source: S,
    errors: Vec<ParseError>,

    current: Token,
    peek: Token,

    prefix_fns: HashMap<TokenKind, PrefixParseFn<S>>,
    infix_fns: HashMap<TokenKind, InfixParseFn<S>>,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S) -> Self {
        let mut prefix_fns: HashMap<TokenKind, PrefixParseFn<S>> = HashMap::new();
        prefix_fns.insert(TokenKind::Ident, Self::parse_identifier);
        prefix_fns.insert(TokenKind::Int, Self::parse_integer_literal);
        prefix_fns.insert(TokenKind::String, Self::parse_string_literal);
        prefix_fns.insert(TokenKind::True, Self::parse_boolean);
        prefix_fns.insert(TokenKind::False, Self::parse_boolean);
        prefix_fns.insert(TokenKind::Bang, Self::parse_prefix_expression);
        prefix_fns.insert(TokenKind::Minus, Self::parse_prefix_expression);
        prefix_fns.insert(TokenKind::LParen, Self::parse_grouped_expression);
        prefix_fns.insert(TokenKind::If, Self::parse_if_expression);
        prefix_fns.insert(TokenKind::Function, Self::parse_function_literal);

        let mut infix_fns: HashMap<TokenKind, InfixParseFn<S>> = HashMap::new();
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::Lt,
            TokenKind::Gt,
        ] {
            infix_fns.insert(kind, Self::parse_infix_expression);
        }
        infix_fns.insert(TokenKind::LParen, Self::parse_call_expression);

        let mut parser = Parser {
            source,
            errors: Vec::new(),
            current: Token::eof(0),
            peek: Token::eof(0),
            prefix_fns,
            infix_fns,
        };

        parser.next_token();
        parser.next_token();
        parser
    }

    /// Diagnostics collected so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current_token_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => {
                    program.statements.push(statement);
                    self.next_token();
                }
                None => {
                    self.synchronize();
                    // a stray `}` can't close anything at the top level
                    if self.current_token_is(TokenKind::RBrace) {
                        self.next_token();
                    }
                }
            }
        }

        debug!(statements = program.statements.len(), errors = self.errors.len(), "parsed program");
        program
    }

    fn next_token(&mut self) {
        let next = self.source.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
        trace!(kind = %self.current.kind, literal = %self.current.literal, "advance");
    }

    fn current_token_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_token_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.push_error(ParseError::UnexpectedToken {
                expected: kind,
                found: self.peek.kind,
                span: self.peek.span,
            });
            None
        }
    }

    fn push_error(&mut self, error: ParseError) {
        debug!(%error, "syntax error");
        self.errors.push(error);
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.kind)
    }

    /// Skips the rest of a statement that failed to parse.
    ///
    /// Stops just past a `;`, or on a `}` or end of input so the enclosing
    /// block can close.
    fn synchronize(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Semicolon => {
                    self.next_token();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => self.next_token(),
            }
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement().map(Statement::Let),
            TokenKind::Return => self.parse_return_statement().map(Statement::Return),
            TokenKind::LBrace => {
                let block = self.parse_block_statement()?;
                self.skip_semicolon();
                Some(Statement::Block(block))
            }
            _ => self.parse_expression_statement().map(Statement::Expression),
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn parse_let_statement(&mut self) -> Option<LetStatement> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        };

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(LetStatement { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<ReturnStatement> {
        let token = self.current.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(ReturnStatement { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<ExpressionStatement> {
        let token = self.current.clone();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(ExpressionStatement { token, value })
    }

    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.current_token_is(TokenKind::RBrace) && !self.current_token_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => {
                    statements.push(statement);
                    self.next_token();
                }
                None => self.synchronize(),
            }
        }

        if self.current_token_is(TokenKind::Eof) {
            self.push_error(ParseError::UnexpectedToken {
                expected: TokenKind::RBrace,
                found: TokenKind::Eof,
                span: self.current.span,
            });
            return None;
        }

        Some(BlockStatement { token, statements })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match self.prefix_fns.get(&self.current.kind) {
            Some(prefix) => *prefix,
            None => {
                self.push_error(ParseError::NoPrefixParseFn {
                    kind: self.current.kind,
                    span: self.current.span,
                });
                return None;
            }
        };

        let mut left = prefix(self)?;

        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let infix = match self.infix_fns.get(&self.peek.kind) {
                Some(infix) => *infix,
                None => return Some(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        }))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(IntegerLiteral {
                token: self.current.clone(),
                value,
            })),
            Err(_) => {
                self.push_error(ParseError::InvalidInteger {
                    literal: self.current.literal.clone(),
                    span: self.current.span,
                });
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::String(StringLiteral {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        }))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(BooleanLiteral {
            token: self.current.clone(),
            value: self.current_token_is(TokenKind::True),
        }))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let operator = PrefixOperator::from_token(token.kind)?;

        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix(PrefixExpression {
            token,
            operator,
            operand: Box::new(operand),
        }))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let operator = InfixOperator::from_token(token.kind)?;
        let precedence = self.current_precedence();

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix(InfixExpression {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::If(IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        }))
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;

        Some(Expression::Function(FunctionLiteral {
            token,
            parameters: parameters.into(),
            body: Rc::new(body),
        }))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        loop {
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier {
                token: self.current.clone(),
                value: self.current.literal.clone(),
            });

            if !self.peek_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
        }

        self.expect_peek(TokenKind::RParen)?;
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let arguments = self.parse_expression_list(TokenKind::RParen)?;

        Some(Expression::Call(CallExpression {
            token,
            function: Box::new(function),
            arguments,
        }))
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer::Lexer;
    use crate::token::Span;

    fn parse(input: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        let errors = parser.errors().iter().map(ToString::to_string).collect::<Vec<_>>();
        assert!(errors.is_empty(), "parser errors for {:?}: {:#?}", input, errors);
        program
    }

    fn parse_errors(input: &str) -> (Program, Vec<String>) {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        let errors = parser.errors().iter().map(ToString::to_string).collect();
        (program, errors)
    }

    fn single_expression(input: &str) -> Expression {
        let program = parse(input);
        assert_eq!(program.statements.len(), 1, "{}", program);

        match program.statements.into_iter().next() {
            Some(Statement::Expression(statement)) => statement.value,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    #[test]
    fn let_statements() {
        let program = parse("let x = 5; let y = true; let foobar = y;");

        let bindings = program
            .statements
            .iter()
            .map(|statement| match statement {
                Statement::Let(statement) => (statement.name.value.as_str(), statement.value.to_string()),
                other => panic!("expected let, got {:?}", other),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            bindings,
            vec![
                ("x", "5".to_owned()),
                ("y", "true".to_owned()),
                ("foobar", "y".to_owned())
            ]
        );
    }

    #[test]
    fn return_statements() {
        let program = parse("return 5; return 10; return add(15);");

        assert_eq!(program.statements.len(), 3);
        for statement in &program.statements {
            assert!(matches!(statement, Statement::Return(_)));
            assert_eq!(statement.token_literal(), "return");
        }
        assert_eq!(program.to_string(), "return 5; return 10; return add(15);");
    }

    #[test]
    fn literal_expressions() {
        match single_expression("foobar;") {
            Expression::Identifier(identifier) => {
                assert_eq!(identifier.value, "foobar");
                assert_eq!(identifier.token.literal, "foobar");
            }
            other => panic!("expected identifier, got {:?}", other),
        }

        match single_expression("5;") {
            Expression::Integer(literal) => assert_eq!(literal.value, 5),
            other => panic!("expected integer, got {:?}", other),
        }

        match single_expression("false") {
            Expression::Boolean(literal) => assert!(!literal.value),
            other => panic!("expected boolean, got {:?}", other),
        }

        match single_expression(r#""hello world";"#) {
            Expression::String(literal) => assert_eq!(literal.value, "hello world"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn prefix_and_infix_operators() {
        let cases = [
            ("!5;", "(!5)"),
            ("-15;", "(-15)"),
            ("!true;", "(!true)"),
            ("5 + 5;", "(5 + 5)"),
            ("5 - 5;", "(5 - 5)"),
            ("5 * 5;", "(5 * 5)"),
            ("5 / 5;", "(5 / 5)"),
            ("5 > 5;", "(5 > 5)"),
            ("5 < 5;", "(5 < 5)"),
            ("5 == 5;", "(5 == 5)"),
            ("5 != 5;", "(5 != 5)"),
            ("true == false", "(true == false)"),
        ];

        for (input, expected) in cases {
            assert_eq!(single_expression(input).to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn operator_precedence() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c", "(a + (b * c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("3 < 5 == true", "((3 < 5) == true)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        ];

        for (input, expected) in cases {
            assert_eq!(single_expression(input).to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn two_statements_on_one_line() {
        assert_eq!(parse("a + b * c; -a * b").to_string(), "(a + (b * c)); ((-a) * b);");
    }

    #[test]
    fn if_expressions() {
        match single_expression("if (x < y) { x }") {
            Expression::If(node) => {
                assert_eq!(node.condition.to_string(), "(x < y)");
                assert_eq!(node.consequence.to_string(), "{ x; }");
                assert!(node.alternative.is_none());
            }
            other => panic!("expected if, got {:?}", other),
        }

        let expression = single_expression("if (x < y) { x } else { y }");
        assert_eq!(expression.to_string(), "if ((x < y)) { x; } else { y; }");
    }

    #[test]
    fn function_literals() {
        match single_expression("fn(x, y) { x + y; }") {
            Expression::Function(function) => {
                let names = function.parameters.iter().map(|p| p.value.as_str()).collect::<Vec<_>>();
                assert_eq!(names, vec!["x", "y"]);
                assert_eq!(function.body.to_string(), "{ (x + y); }");
            }
            other => panic!("expected function, got {:?}", other),
        }

        let cases = [
            ("fn() {};", 0),
            ("fn(x) {};", 1),
            ("fn(x, y, z) {};", 3),
        ];
        for (input, count) in cases {
            match single_expression(input) {
                Expression::Function(function) => assert_eq!(function.parameters.len(), count),
                other => panic!("expected function, got {:?}", other),
            }
        }
    }

    #[test]
    fn call_expressions() {
        match single_expression("add(1, 2 * 3, 4 + 5);") {
            Expression::Call(call) => {
                assert_eq!(call.function.to_string(), "add");
                assert_eq!(call.arguments.len(), 3);
                assert_eq!(call.to_string(), "add(1, (2 * 3), (4 + 5))");
            }
            other => panic!("expected call, got {:?}", other),
        }

        assert_eq!(single_expression("fn(x) { x }(5)").to_string(), "fn(x) { x; }(5)");
        assert_eq!(single_expression("f()()").to_string(), "f()()");
    }

    #[test]
    fn bare_blocks_are_statements() {
        let program = parse("{ let a = 1; a } 2");

        assert_eq!(program.statements.len(), 2);
        assert!(matches!(program.statements[0], Statement::Block(_)));
        assert_eq!(program.to_string(), "{ let a = 1; a; } 2;");
    }

    #[test]
    fn missing_assign_is_reported_and_parsing_continues() {
        let (program, errors) = parse_errors("let x 5; let y = 10;");

        assert_eq!(errors, vec!["expected next token to be =, got INT instead"]);
        assert_eq!(program.to_string(), "let y = 10;");
    }

    #[test]
    fn several_errors_in_one_pass() {
        let (program, errors) = parse_errors("let x 5; let = 10; let 838383; let ok = 1;");

        assert_eq!(
            errors,
            vec![
                "expected next token to be =, got INT instead",
                "expected next token to be IDENT, got = instead",
                "expected next token to be IDENT, got INT instead",
            ]
        );
        assert_eq!(program.to_string(), "let ok = 1;");
    }

    #[test]
    fn missing_prefix_handler() {
        let (_, errors) = parse_errors("+ 5;");
        assert_eq!(errors, vec!["no prefix parse function for + found"]);

        let (_, errors) = parse_errors("let a = 5 @ 3;");
        assert_eq!(errors, vec!["no prefix parse function for ILLEGAL found"]);

        let (_, errors) = parse_errors("[1, 2]");
        assert_eq!(errors, vec!["no prefix parse function for [ found"]);
    }

    #[test]
    fn errors_keep_positions() {
        let mut parser = Parser::new(Lexer::new("let x 5;"));
        parser.parse_program();

        assert_eq!(parser.errors()[0].span(), Span(6, 7));
    }

    #[test]
    fn integer_overflow() {
        let (_, errors) = parse_errors("92233720368547758070;");
        assert_eq!(errors, vec!["could not parse \"92233720368547758070\" as an integer"]);
    }

    #[test]
    fn errors_inside_blocks_recover_at_the_closing_brace() {
        let (program, errors) = parse_errors("let f = fn(x) { x + }; f(1);");

        assert_eq!(errors, vec!["no prefix parse function for } found"]);
        assert_eq!(program.to_string(), "let f = fn(x) {}; f(1);");
    }

    #[test]
    fn unterminated_block() {
        let (program, errors) = parse_errors("if (x) { 1");

        assert_eq!(errors, vec!["expected next token to be }, got EOF instead"]);
        assert!(program.statements.is_empty());
    }

    #[test]
    fn stray_closing_brace() {
        let (program, errors) = parse_errors("} 1; 2");

        assert_eq!(errors, vec!["no prefix parse function for } found"]);
        assert_eq!(program.to_string(), "1; 2;");
    }

    #[test]
    fn precedence_table() {
        assert!(Precedence::Lowest < Precedence::Equals);
        assert!(Precedence::Product < Precedence::Prefix);
        assert_eq!(Precedence::of(TokenKind::LParen), Precedence::Call);
        assert_eq!(Precedence::of(TokenKind::Comma), Precedence::Lowest);
    }
}

use logos::Logos;

use crate::token::{Span, Token, TokenKind, TokenSource};

#[derive(Logos, Clone, Copy, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[token("=")]
    Assign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("!")]
    Bang,

    #[token("*")]
    Asterisk,

    #[token("/")]
    Slash,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("==")]
    Eq,

    #[token("!=")]
    NotEq,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("fn")]
    Function,

    #[token("let")]
    Let,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("return")]
    Return,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""[^"]*""#)]
    String,

    #[regex(r"[a-zA-Z_]+")]
    Ident,
}

impl From<Lexeme> for TokenKind {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Assign => TokenKind::Assign,
            Lexeme::Plus => TokenKind::Plus,
            Lexeme::Minus => TokenKind::Minus,
            Lexeme::Bang => TokenKind::Bang,
            Lexeme::Asterisk => TokenKind::Asterisk,
            Lexeme::Slash => TokenKind::Slash,
            Lexeme::Lt => TokenKind::Lt,
            Lexeme::Gt => TokenKind::Gt,
            Lexeme::Eq => TokenKind::Eq,
            Lexeme::NotEq => TokenKind::NotEq,
            Lexeme::Comma => TokenKind::Comma,
            Lexeme::Semicolon => TokenKind::Semicolon,
            Lexeme::Colon => TokenKind::Colon,
            Lexeme::LParen => TokenKind::LParen,
            Lexeme::RParen => TokenKind::RParen,
            Lexeme::LBrace => TokenKind::LBrace,
            Lexeme::RBrace => TokenKind::RBrace,
            Lexeme::LBracket => TokenKind::LBracket,
            Lexeme::RBracket => TokenKind::RBracket,
            Lexeme::Function => TokenKind::Function,
            Lexeme::Let => TokenKind::Let,
            Lexeme::True => TokenKind::True,
            Lexeme::False => TokenKind::False,
            Lexeme::If => TokenKind::If,
            Lexeme::Else => TokenKind::Else,
            Lexeme::Return => TokenKind::Return,
            Lexeme::Int => TokenKind::Int,
            Lexeme::String => TokenKind::String,
            Lexeme::Ident => TokenKind::Ident,
        }
    }
}

/// Turns source text into tokens one at a time.
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, Lexeme>,
    /// Where `inner` starts within `source`.
    offset: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            inner: Lexeme::lexer(source),
            offset: 0,
        }
    }

    /// Restarts scanning at byte `at` of the source.
    fn resume_at(&mut self, at: usize) {
        self.inner = Lexeme::lexer(&self.source[at..]);
        self.offset = at;
    }

    /// Drains the source into a vector, including the trailing `Eof`.
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);

            if done {
                return tokens;
            }
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        let lexeme = match self.inner.next() {
            Some(lexeme) => lexeme,
            None => return Token::eof(self.source.len()),
        };

        let range = self.inner.span();
        let span = Span(self.offset + range.start, self.offset + range.end);
        let slice = self.inner.slice();

        match lexeme {
            Ok(Lexeme::String) => Token::new(TokenKind::String, &slice[1..slice.len() - 1], span),
            Ok(lexeme) => Token::new(TokenKind::from(lexeme), slice, span),
            // an unterminated string: only the opening quote is illegal
            Err(()) if slice.len() > 1 && slice.starts_with('"') => {
                self.resume_at(span.0 + 1);
                Token::new(TokenKind::Illegal, "\"", Span(span.0, span.0 + 1))
            }
            Err(()) => Token::new(TokenKind::Illegal, slice, span),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(source)
            .lex()
            .into_iter()
            .map(|token| (token.kind, token.literal))
            .collect()
    }

    #[test]
    fn lexes_a_small_program() {
        let tokens = kinds(
            r#"let five = 5;
let add = fn(x, y) { x + y; };
!-/*5 < 10 > 5;
if (5 == 10) { return true; } else { return false; }
10 != 9; "foo bar" [1, 2] {"a": 1}"#,
        );

        let expected = vec![
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "five"),
            (TokenKind::Assign, "="),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "add"),
            (TokenKind::Assign, "="),
            (TokenKind::Function, "fn"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "x"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "y"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Ident, "x"),
            (TokenKind::Plus, "+"),
            (TokenKind::Ident, "y"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Bang, "!"),
            (TokenKind::Minus, "-"),
            (TokenKind::Slash, "/"),
            (TokenKind::Asterisk, "*"),
            (TokenKind::Int, "5"),
            (TokenKind::Lt, "<"),
            (TokenKind::Int, "10"),
            (TokenKind::Gt, ">"),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::If, "if"),
            (TokenKind::LParen, "("),
            (TokenKind::Int, "5"),
            (TokenKind::Eq, "=="),
            (TokenKind::Int, "10"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::True, "true"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Else, "else"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::False, "false"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Int, "10"),
            (TokenKind::NotEq, "!="),
            (TokenKind::Int, "9"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::String, "foo bar"),
            (TokenKind::LBracket, "["),
            (TokenKind::Int, "1"),
            (TokenKind::Comma, ","),
            (TokenKind::Int, "2"),
            (TokenKind::RBracket, "]"),
            (TokenKind::LBrace, "{"),
            (TokenKind::String, "a"),
            (TokenKind::Colon, ":"),
            (TokenKind::Int, "1"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Eof, ""),
        ]
        .into_iter()
        .map(|(kind, literal)| (kind, literal.to_owned()))
        .collect::<Vec<_>>();

        assert_eq!(tokens, expected);
    }

    #[test]
    fn keywords_need_whole_words() {
        assert_eq!(
            kinds("letter fnord iffy"),
            vec![
                (TokenKind::Ident, "letter".to_owned()),
                (TokenKind::Ident, "fnord".to_owned()),
                (TokenKind::Ident, "iffy".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn unknown_characters_are_illegal() {
        assert_eq!(
            kinds("5 @ 6"),
            vec![
                (TokenKind::Int, "5".to_owned()),
                (TokenKind::Illegal, "@".to_owned()),
                (TokenKind::Int, "6".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn unterminated_string_only_loses_its_quote() {
        assert_eq!(
            kinds(r#"5; "abc def; 6"#),
            vec![
                (TokenKind::Int, "5".to_owned()),
                (TokenKind::Semicolon, ";".to_owned()),
                (TokenKind::Illegal, "\"".to_owned()),
                (TokenKind::Ident, "abc".to_owned()),
                (TokenKind::Ident, "def".to_owned()),
                (TokenKind::Semicolon, ";".to_owned()),
                (TokenKind::Int, "6".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );

        let tokens = Lexer::new(r#"x "y"#).lex();
        assert_eq!(tokens[1].span, Span(2, 3));
        assert_eq!(tokens[2].span, Span(3, 4));
        assert_eq!(tokens[3].span, Span(4, 4));
    }

    #[test]
    fn keeps_returning_eof() {
        let mut lexer = Lexer::new("x");

        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..3 {
            let token = lexer.next_token();
            assert_eq!(token.kind, TokenKind::Eof);
            assert_eq!(token.span, Span(1, 1));
        }
    }

    #[test]
    fn spans_point_into_the_source() {
        let tokens = Lexer::new("let abc = 12;").lex();

        assert_eq!(tokens[1].span, Span(4, 7));
        assert_eq!(tokens[3].span, Span(10, 12));
    }
}

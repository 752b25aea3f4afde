use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Illegal,
  Eof,

  Ident,
  Int,
  String,

  Assign,
  Plus,
  Minus,
  Bang,
  Asterisk,
  Slash,
  Lt,
  Gt,
  Eq,
  NotEq,

  Comma,
  Semicolon,
  Colon,
  LParen,
  RParen,
  LBrace,
  RBrace,
  LBracket,
  RBracket,

  Function,
  Let,
  True,
  False,
  If,
  Else,
  Return,
}

impl TokenKind {
  /// Name used when a token kind shows up in a diagnostic.
  pub fn as_str(self) -> &'static str {
    match self {
      TokenKind::Illegal => "ILLEGAL",
      TokenKind::Eof => "EOF",
      TokenKind::Ident => "IDENT",
      TokenKind::Int => "INT",
      TokenKind::String => "STRING",
      TokenKind::Assign => "=",
      TokenKind::Plus => "+",
      TokenKind::Minus => "-",
      TokenKind::Bang => "!",
      TokenKind::Asterisk => "*",
      TokenKind::Slash => "/",
      TokenKind::Lt => "<",
      TokenKind::Gt => ">",
      TokenKind::Eq => "==",
      TokenKind::NotEq => "!=",
      TokenKind::Comma => ",",
      TokenKind::Semicolon => ";",
      TokenKind::Colon => ":",
      TokenKind::LParen => "(",
      TokenKind::RParen => ")",
      TokenKind::LBrace => "{",
      TokenKind::RBrace => "}",
      TokenKind::LBracket => "[",
      TokenKind::RBracket => "]",
      TokenKind::Function => "FUNCTION",
      TokenKind::Let => "LET",
      TokenKind::True => "TRUE",
      TokenKind::False => "FALSE",
      TokenKind::If => "IF",
      TokenKind::Else => "ELSE",
      TokenKind::Return => "RETURN",
    }
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Byte range of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span(pub usize, pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub kind: TokenKind,
  pub literal: String,
  pub span: Span,
}

impl Token {
  pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Token {
    Token {
      kind,
      literal: literal.into(),
      span,
    }
  }

  pub fn eof(at: usize) -> Token {
    Token::new(TokenKind::Eof, "", Span(at, at))
  }

  pub fn is(&self, kind: TokenKind) -> bool {
    self.kind == kind
  }
}

/// Pull-based stream of tokens consumed by the parser.
///
/// Once the end of input is reached every further call must keep returning
/// an `Eof` token.
pub trait TokenSource {
  fn next_token(&mut self) -> Token;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
  fn next_token(&mut self) -> Token {
    (**self).next_token()
  }
}

use std::io;
use std::path::PathBuf;

use crate::ast::{InfixOperator, PrefixOperator};
use crate::object::ObjectKind;
use crate::token::{Span, TokenKind};

/// A syntax diagnostic collected by the parser.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {found} instead")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        span: Span,
    },
    #[error("no prefix parse function for {kind} found")]
    NoPrefixParseFn { kind: TokenKind, span: Span },
    #[error("could not parse \"{literal}\" as an integer")]
    InvalidInteger { literal: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::NoPrefixParseFn { span, .. }
            | ParseError::InvalidInteger { span, .. } => *span,
        }
    }
}

/// A failure raised while evaluating a tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectKind,
        operator: InfixOperator,
        right: ObjectKind,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: ObjectKind,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectKind,
        operator: InfixOperator,
        right: ObjectKind,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {0}")]
    NotAFunction(ObjectKind),
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize },
    #[error("division by zero")]
    DivisionByZero,
}

/// Top-level error for running source text outside the core.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {}", .path.display(), .source)]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{}", display_parse_errors(.0))]
    Parse(Vec<ParseError>),
    #[error("{0}")]
    Runtime(String),
}

/// First line of every parse failure report.
pub(crate) const PARSE_ERRORS_HEADER: &str = "parse errors:";

fn display_parse_errors(errors: &[ParseError]) -> String {
    let mut lines = vec![PARSE_ERRORS_HEADER.to_owned()];
    lines.extend(errors.iter().map(|e| format!("\t{}", e)));
    lines.join("\n")
}

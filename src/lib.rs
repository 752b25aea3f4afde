pub mod ast;
pub mod token;
pub mod lexer;
pub mod parser;
pub mod object;
pub mod evaluator;
pub mod env;
pub mod error;
pub mod config;
pub mod cli;
pub mod repl;

use std::fs;
use std::path::Path;
use std::sync::Once;

use crate::ast::Program;
use crate::env::Env;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::object::Object;
use crate::parser::Parser;

static TRACING_INIT: Once = Once::new();

/// Installs the stderr log subscriber. Filtered by `RUST_LOG`, e.g.
/// `RUST_LOG=simian=trace`; does nothing when it is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Parses `source`, returning every diagnostic if there was any.
pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}

/// Parses and evaluates `source` in `env`.
pub fn run_source(source: &str, env: &Env) -> Result<Object, Error> {
    let program = parse(source).map_err(Error::Parse)?;

    match evaluator::eval_program(&program, env) {
        Object::Error(message) => Err(Error::Runtime(message)),
        value => Ok(value),
    }
}

pub fn run_file(path: &Path, env: &Env) -> Result<Object, Error> {
    let source = fs::read_to_string(path).map_err(|source| Error::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;

    run_source(&source, env)
}

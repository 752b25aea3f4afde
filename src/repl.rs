use std::io::{BufRead, Write};

use chrono::Local;
use colored::Colorize;
use tracing::debug;

use crate::ast::Statement;
use crate::config::Config;
use crate::env::Env;
use crate::error::{Error, ParseError, PARSE_ERRORS_HEADER};
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::object::Object;
use crate::parser::Parser;

/// Line-at-a-time read-eval-print loop.
pub struct Repl {
  config: Config,
  evaluator: Evaluator,
}

impl Repl {
  pub fn new(config: Config) -> Self {
    Repl {
      config,
      evaluator: Evaluator::default(),
    }
  }

  pub fn env(&self) -> &Env {
    self.evaluator.env()
  }

  pub fn banner(&self) -> String {
    format!(
      "simian {} (session started {})\nType an expression, or press Ctrl-D to exit.",
      env!("CARGO_PKG_VERSION"),
      Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
  }

  pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<(), Error> {
    if self.config.banner {
      let banner = self.banner();
      if self.config.color {
        writeln!(output, "{}", banner.bold())?;
      } else {
        writeln!(output, "{}", banner)?;
      }
    }

    let mut lines = input.lines();

    loop {
      self.prompt(&mut output)?;

      let line = match lines.next() {
        Some(line) => line?,
        None => {
          writeln!(output)?;
          return Ok(());
        }
      };

      if line.trim().is_empty() {
        continue;
      }

      self.eval_line(&line, &mut output)?;
    }
  }

  fn prompt<W: Write>(&self, output: &mut W) -> Result<(), Error> {
    if self.config.color {
      write!(output, "{}", self.config.prompt.green())?;
    } else {
      write!(output, "{}", self.config.prompt)?;
    }
    output.flush()?;
    Ok(())
  }

  /// Parses and evaluates one line, writing either the diagnostics or
  /// the rendered result.
  pub fn eval_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<(), Error> {
    if !self.config.persist_env {
      self.evaluator = Evaluator::default();
    }

    let mut parser = Parser::new(Lexer::new(line));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
      debug!(count = parser.errors().len(), "rejecting line with parse errors");
      return self.print_parse_errors(parser.errors(), output);
    }

    let result = self.evaluator.eval(&program);

    match result {
      Object::Error(_) if self.config.color => writeln!(output, "{}", result.to_string().red())?,
      Object::Error(_) => writeln!(output, "{}", result)?,
      _ if matches!(program.statements.last(), Some(Statement::Let(_))) => {}
      _ => writeln!(output, "{}", result)?,
    }

    Ok(())
  }

  fn print_parse_errors<W: Write>(&self, errors: &[ParseError], output: &mut W) -> Result<(), Error> {
    if self.config.color {
      writeln!(output, "{}", PARSE_ERRORS_HEADER.red().bold())?;
    } else {
      writeln!(output, "{}", PARSE_ERRORS_HEADER)?;
    }

    for error in errors {
      writeln!(output, "\t{}", error)?;
    }

    Ok(())
  }
}

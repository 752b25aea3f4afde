use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[clap(name = "simian", version, about = "Evaluate simian programs, or start an interactive session.")]
pub struct Cli {
  /// Program to run; starts the REPL when omitted
  #[clap(value_parser)]
  pub file: Option<PathBuf>,

  /// Start every REPL line with an empty environment
  #[clap(long, action)]
  pub fresh_env: bool,

  /// Disable colored output
  #[clap(long, action)]
  pub no_color: bool,

  /// REPL prompt
  #[clap(long, value_parser, default_value = ">> ")]
  pub prompt: String,

  /// Skip the REPL greeting
  #[clap(long, action)]
  pub quiet: bool,
}

impl Cli {
  pub fn config(&self) -> Config {
    Config {
      persist_env: !self.fresh_env,
      color: !self.no_color,
      prompt: self.prompt.clone(),
      banner: !self.quiet,
    }
  }
}

/// Settings for an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Keep bindings from one input line to the next.
  pub persist_env: bool,
  pub color: bool,
  pub prompt: String,
  pub banner: bool,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      persist_env: true,
      color: true,
      prompt: String::from(">> "),
      banner: true,
    }
  }
}

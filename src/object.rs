use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;

use crate::ast::{BlockStatement, Identifier};
use crate::env::Env;

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
  Integer,
  Boolean,
  String,
  Null,
  Error,
  Function,
}

impl fmt::Display for ObjectKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ObjectKind::Integer => "INTEGER",
      ObjectKind::Boolean => "BOOLEAN",
      ObjectKind::String => "STRING",
      ObjectKind::Null => "NULL",
      ObjectKind::Error => "ERROR",
      ObjectKind::Function => "FUNCTION",
    })
  }
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Object {
  Integer(i64),
  Boolean(bool),
  String(String),
  Null,
  Error(String),
  Function(Rc<Function>),
}

impl Object {
  pub fn kind(&self) -> ObjectKind {
    match self {
      Object::Integer(_) => ObjectKind::Integer,
      Object::Boolean(_) => ObjectKind::Boolean,
      Object::String(_) => ObjectKind::String,
      Object::Null => ObjectKind::Null,
      Object::Error(_) => ObjectKind::Error,
      Object::Function(_) => ObjectKind::Function,
    }
  }

  /// Maps a host boolean onto the canonical `TRUE`/`FALSE`.
  pub fn from_bool(value: bool) -> Object {
    if value { TRUE } else { FALSE }
  }

  /// Only `false` and `null` are falsy.
  pub fn is_truthy(&self) -> bool {
    !matches!(self, Object::Null | Object::Boolean(false))
  }
}

impl PartialEq for Object {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Object::Integer(left), Object::Integer(right)) => left == right,
      (Object::Boolean(left), Object::Boolean(right)) => left == right,
      (Object::String(left), Object::String(right)) => left == right,
      (Object::Null, Object::Null) => true,
      (Object::Error(left), Object::Error(right)) => left == right,
      (Object::Function(left), Object::Function(right)) => Rc::ptr_eq(left, right),
      _ => false,
    }
  }
}

impl fmt::Display for Object {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Object::Integer(n) => write!(f, "{}", n),
      Object::Boolean(b) => write!(f, "{}", b),
      Object::String(s) => f.write_str(s),
      Object::Null => f.write_str("null"),
      Object::Error(msg) => write!(f, "ERROR: {}", msg),
      Object::Function(function) => write!(f, "{}", function),
    }
  }
}

/// A function value closing over the environment it was defined in.
pub struct Function {
  pub parameters: Rc<[Identifier]>,
  pub body: Rc<BlockStatement>,
  pub env: Env,
}

impl fmt::Debug for Function {
  // the captured environment may hold this very function
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.debug_struct("Function")
      .field("parameters", &self.parameters.iter().map(|p| p.value.as_str()).collect::<Vec<_>>())
      .field("body", &self.body.to_string())
      .finish_non_exhaustive()
  }
}

impl fmt::Display for Function {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let parameters = self.parameters.iter().map(|p| p.value.as_str()).collect::<Vec<_>>();
    write!(f, "fn({}) {}", parameters.join(", "), self.body)
  }
}

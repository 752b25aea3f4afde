use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use crate::object::Object;

type Objects = HashMap<String, Object>;

/// Shared handle to a scope. Function values hold one to keep the scope
/// they were defined in alive.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
  objects: Objects,
  outer: Option<Env>,
}

impl Environment {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn new_enclosed(outer: Env) -> Self {
    Self {
      objects: HashMap::new(),
      outer: Some(outer),
    }
  }

  pub fn into_env(self) -> Env {
    Rc::new(RefCell::new(self))
  }

  /// Resolves `name` here first, then along the enclosing chain.
  pub fn get(&self, name: &str) -> Option<Object> {
    if let Some(object) = self.objects.get(name) {
      return Some(object.clone());
    }

    match self.outer {
      Some(ref outer) => outer.borrow().get(name),
      None => None,
    }
  }

  /// Binds in this scope only, shadowing any outer binding.
  pub fn set(&mut self, name: impl Into<String>, value: Object) -> Object {
    self.objects.insert(name.into(), value.clone());
    value
  }
}

use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{
  BlockStatement, CallExpression, Expression, FunctionLiteral, IfExpression, InfixOperator, PrefixOperator, Program,
  Statement,
};
use crate::env::{Env, Environment};
use crate::error::RuntimeError;
use crate::object::{Function, Object, ObjectKind, NULL};

/// Why evaluation stopped before producing a plain value.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
  /// A `return` travelling up to the nearest call.
  Return(Object),
  Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
  fn from(error: RuntimeError) -> Self {
    Unwind::Error(error)
  }
}

impl From<Unwind> for Object {
  fn from(unwind: Unwind) -> Self {
    match unwind {
      Unwind::Return(value) => value,
      Unwind::Error(error) => Object::Error(error.to_string()),
    }
  }
}

pub type EvalResult = Result<Object, Unwind>;

/// Evaluation session bound to a global environment.
#[derive(Debug)]
pub struct Evaluator {
  env: Env,
}

impl Default for Evaluator {
  fn default() -> Self {
    Evaluator::new(Environment::new().into_env())
  }
}

impl Evaluator {
  pub fn new(env: Env) -> Self {
    Evaluator { env }
  }

  pub fn env(&self) -> &Env {
    &self.env
  }

  /// Runs a whole program; errors come back as `Object::Error`.
  pub fn eval(&self, program: &Program) -> Object {
    eval_program(program, &self.env)
  }
}

pub fn eval_program(program: &Program, env: &Env) -> Object {
  debug!(statements = program.statements.len(), "evaluating program");

  match eval_statements(&program.statements, env) {
    Ok(value) => value,
    Err(unwind) => Object::from(unwind),
  }
}

/// Evaluates a single expression against `env`.
pub fn eval_expression(expression: &Expression, env: &Env) -> Object {
  match eval(expression, env) {
    Ok(value) => value,
    Err(unwind) => Object::from(unwind),
  }
}

fn eval_statements(statements: &[Statement], env: &Env) -> EvalResult {
  let mut result = NULL;

  for statement in statements {
    result = eval_statement(statement, env)?;
  }

  Ok(result)
}

fn eval_block(block: &BlockStatement, env: &Env) -> EvalResult {
  eval_statements(&block.statements, env)
}

fn eval_statement(statement: &Statement, env: &Env) -> EvalResult {
  match statement {
    Statement::Let(statement) => {
      let value = eval(&statement.value, env)?;
      trace!(name = %statement.name.value, "bind");
      env.borrow_mut().set(statement.name.value.as_str(), value);
      Ok(NULL)
    }
    Statement::Return(statement) => {
      let value = eval(&statement.value, env)?;
      Err(Unwind::Return(value))
    }
    Statement::Expression(statement) => eval(&statement.value, env),
    Statement::Block(block) => eval_block(block, env),
  }
}

fn eval(expression: &Expression, env: &Env) -> EvalResult {
  match expression {
    Expression::Identifier(identifier) => eval_identifier(&identifier.value, env),
    Expression::Integer(literal) => Ok(Object::Integer(literal.value)),
    Expression::Boolean(literal) => Ok(Object::from_bool(literal.value)),
    Expression::String(literal) => Ok(Object::String(literal.value.clone())),
    Expression::Prefix(prefix) => {
      let operand = eval(&prefix.operand, env)?;
      eval_prefix_expression(prefix.operator, operand)
    }
    Expression::Infix(infix) => {
      let left = eval(&infix.left, env)?;
      let right = eval(&infix.right, env)?;
      eval_infix_expression(left, infix.operator, right)
    }
    Expression::If(node) => eval_if_expression(node, env),
    Expression::Function(function) => Ok(eval_function_literal(function, env)),
    Expression::Call(call) => eval_call_expression(call, env),
  }
}

fn eval_identifier(name: &str, env: &Env) -> EvalResult {
  match env.borrow().get(name) {
    Some(object) => Ok(object),
    None => Err(RuntimeError::IdentifierNotFound(name.to_owned()).into()),
  }
}

fn eval_prefix_expression(operator: PrefixOperator, operand: Object) -> EvalResult {
  match (operator, operand) {
    (PrefixOperator::Not, operand) => Ok(Object::from_bool(!operand.is_truthy())),
    (PrefixOperator::Negate, Object::Integer(value)) => Ok(Object::Integer(value.wrapping_neg())),
    (PrefixOperator::Negate, operand) => Err(
      RuntimeError::UnknownPrefixOperator {
        operator,
        operand: operand.kind(),
      }
      .into(),
    ),
  }
}

fn eval_infix_expression(left: Object, operator: InfixOperator, right: Object) -> EvalResult {
  match (&left, &right) {
    (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(*l, operator, *r),
    (Object::String(l), Object::String(r)) => eval_string_infix_expression(l, operator, r),
    _ => match operator {
      InfixOperator::Equal => Ok(Object::from_bool(left == right)),
      InfixOperator::NotEqual => Ok(Object::from_bool(left != right)),
      _ if left.kind() != right.kind() => Err(
        RuntimeError::TypeMismatch {
          left: left.kind(),
          operator,
          right: right.kind(),
        }
        .into(),
      ),
      _ => Err(unknown_infix_operator(&left, operator, &right)),
    },
  }
}

fn eval_integer_infix_expression(left: i64, operator: InfixOperator, right: i64) -> EvalResult {
  let value = match operator {
    InfixOperator::Add => Object::Integer(left.wrapping_add(right)),
    InfixOperator::Subtract => Object::Integer(left.wrapping_sub(right)),
    InfixOperator::Multiply => Object::Integer(left.wrapping_mul(right)),
    InfixOperator::Divide => {
      if right == 0 {
        return Err(RuntimeError::DivisionByZero.into());
      }
      Object::Integer(left.wrapping_div(right))
    }
    InfixOperator::LessThan => Object::from_bool(left < right),
    InfixOperator::GreaterThan => Object::from_bool(left > right),
    InfixOperator::Equal => Object::from_bool(left == right),
    InfixOperator::NotEqual => Object::from_bool(left != right),
  };

  Ok(value)
}

fn eval_string_infix_expression(left: &str, operator: InfixOperator, right: &str) -> EvalResult {
  match operator {
    InfixOperator::Add => Ok(Object::String(format!("{}{}", left, right))),
    InfixOperator::Equal => Ok(Object::from_bool(left == right)),
    InfixOperator::NotEqual => Ok(Object::from_bool(left != right)),
    _ => Err(
      RuntimeError::UnknownInfixOperator {
        left: ObjectKind::String,
        operator,
        right: ObjectKind::String,
      }
      .into(),
    ),
  }
}

fn unknown_infix_operator(left: &Object, operator: InfixOperator, right: &Object) -> Unwind {
  RuntimeError::UnknownInfixOperator {
    left: left.kind(),
    operator,
    right: right.kind(),
  }
  .into()
}

fn eval_if_expression(node: &IfExpression, env: &Env) -> EvalResult {
  let condition = eval(&node.condition, env)?;

  if condition.is_truthy() {
    eval_block(&node.consequence, env)
  } else if let Some(alternative) = &node.alternative {
    eval_block(alternative, env)
  } else {
    Ok(NULL)
  }
}

fn eval_function_literal(function: &FunctionLiteral, env: &Env) -> Object {
  Object::Function(Rc::new(Function {
    parameters: Rc::clone(&function.parameters),
    body: Rc::clone(&function.body),
    env: Rc::clone(env),
  }))
}

#[tracing::instrument(level = "trace", skip_all, fields(callee = %call.function))]
fn eval_call_expression(call: &CallExpression, env: &Env) -> EvalResult {
  let callee = eval(&call.function, env)?;

  let arguments = call
    .arguments
    .iter()
    .map(|argument| eval(argument, env))
    .collect::<Result<Vec<_>, _>>()?;

  apply_function(callee, arguments)
}

/// Calls `callee` in a fresh scope enclosed by the scope it captured.
pub fn apply_function(callee: Object, arguments: Vec<Object>) -> EvalResult {
  let function = match callee {
    Object::Function(function) => function,
    other => return Err(RuntimeError::NotAFunction(other.kind()).into()),
  };

  if function.parameters.len() != arguments.len() {
    return Err(
      RuntimeError::WrongArgumentCount {
        want: function.parameters.len(),
        got: arguments.len(),
      }
      .into(),
    );
  }

  let mut scope = Environment::new_enclosed(Rc::clone(&function.env));
  for (parameter, argument) in function.parameters.iter().zip(arguments) {
    scope.set(parameter.value.as_str(), argument);
  }

  match eval_block(&function.body, &scope.into_env()) {
    Err(Unwind::Return(value)) => Ok(value),
    result => result,
  }
}

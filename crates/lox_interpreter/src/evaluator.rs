use std::{cell::RefCell, mem, rc::Rc};

use log::{debug, trace};

use crate::{
    builtin::Builtin,
    environment::Environment,
    error::{RuntimeError, RuntimeErrorKind},
    object::{Function, Object},
    sink::Sink,
};

use lox_parser::ast::{
    BinaryOperator, CallExpression, Expression, LogicalOperator, Program, Statement,
    UnaryOperator,
};

/// How many user function calls may be nested before evaluation fails with `StackOverflow`.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

// Room left on the native stack before evaluation moves to a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// How a statement finished.
#[derive(Debug, PartialEq)]
pub enum Signal {
    Normal,
    /// A `return` ran; every enclosing statement up to the function call stops
    Return(Object),
}

pub struct Evaluator<'a> {
    env: Rc<RefCell<Environment>>,
    sink: &'a mut dyn Sink,
    depth: usize,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(sink: &'a mut dyn Sink) -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())), sink)
    }

    /// Evaluate in an existing global environment, so definitions outlive this evaluator.
    pub fn new_with_env(env: Rc<RefCell<Environment>>, sink: &'a mut dyn Sink) -> Self {
        Evaluator {
            env,
            sink,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Make `builtin` callable by its name from the global scope.
    pub fn define_builtin(&mut self, builtin: Builtin) {
        debug!("registering builtin {}", builtin.name());
        self.env
            .borrow_mut()
            .define(builtin.name().to_owned(), Object::Builtin(Rc::new(builtin)));
    }

    /// Run every declaration of `prog` in order.
    ///
    /// Stops at the first runtime error; whatever was printed before it stays printed. When the
    /// last declaration is an expression statement, its value is returned.
    pub fn eval(&mut self, prog: &Program) -> Result<Option<Object>, RuntimeError> {
        let mut last_value = None;

        for stmt in &prog.statements {
            last_value = match stmt {
                Statement::Expression { expression } => Some(self.eval_expression(expression)?),
                stmt => {
                    // `return` outside of a function is rejected by the parser
                    self.execute(stmt)?;
                    None
                }
            };
        }

        Ok(last_value)
    }

    /// Execute one statement. The native stack grows on demand, so only `max_depth` bounds
    /// recursion.
    fn execute(&mut self, stmt: &Statement) -> Result<Signal, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.execute_statement(stmt)
        })
    }

    fn execute_statement(&mut self, stmt: &Statement) -> Result<Signal, RuntimeError> {
        match stmt {
            Statement::Expression { expression } => {
                self.eval_expression(expression)?;
            }
            Statement::Print { expression } => {
                let value = self.eval_expression(expression)?;
                self.sink.emit(&value.to_string());
            }
            Statement::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.eval_expression(initializer)?,
                    None => Object::Nil,
                };
                self.env.borrow_mut().define(name.value.clone(), value);
            }
            Statement::Function(declaration) => {
                debug!(
                    "defining function {} with {} parameter(s)",
                    declaration.name.value,
                    declaration.parameters.len()
                );

                // Bound in the same scope it captures, so it can call itself
                let function = Function {
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.env),
                };
                self.env.borrow_mut().define(
                    declaration.name.value.clone(),
                    Object::Function(Rc::new(function)),
                );
            }
            Statement::Block(block) => {
                let env = Environment::new_enclosed(Rc::clone(&self.env));
                trace!("entering block scope at depth {}", env.depth());
                return self.execute_block(&block.statements, env);
            }
            Statement::If(if_stmt) => {
                if self.eval_expression(&if_stmt.condition)?.is_truthy() {
                    return self.execute(&if_stmt.consequence);
                } else if let Some(alternative) = &if_stmt.alternative {
                    return self.execute(alternative);
                }
            }
            Statement::While(while_stmt) => {
                while self.eval_expression(&while_stmt.condition)?.is_truthy() {
                    if let Signal::Return(value) = self.execute(&while_stmt.body)? {
                        return Ok(Signal::Return(value));
                    }
                }
            }
            Statement::Return { value } => {
                let value = match value {
                    Some(value) => self.eval_expression(value)?,
                    None => Object::Nil,
                };
                return Ok(Signal::Return(value));
            }
        }

        Ok(Signal::Normal)
    }

    /// Run `statements` with `env` as the current scope, restoring the previous scope afterwards
    /// even if one of them fails.
    fn execute_block(
        &mut self,
        statements: &[Statement],
        env: Environment,
    ) -> Result<Signal, RuntimeError> {
        let previous = mem::replace(&mut self.env, Rc::new(RefCell::new(env)));

        let mut result = Ok(Signal::Normal);
        for stmt in statements {
            result = self.execute(stmt);

            // Stop at the first error or return
            if !matches!(result, Ok(Signal::Normal)) {
                break;
            }
        }

        self.env = previous;
        result
    }

    fn eval_expression(&mut self, expr: &Expression) -> Result<Object, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.eval_expression_node(expr)
        })
    }

    fn eval_expression_node(&mut self, expr: &Expression) -> Result<Object, RuntimeError> {
        match expr {
            Expression::Literal(literal) => Ok(Object::from(literal)),
            Expression::Grouping(inner) => self.eval_expression(inner),
            Expression::Variable(name) => self
                .env
                .borrow()
                .get(&name.value)
                .map_err(|err| err.at(name.span)),
            Expression::Assign(assign) => {
                let value = self.eval_expression(&assign.value)?;
                self.env
                    .borrow_mut()
                    .assign(&assign.name.value, value.clone())
                    .map_err(|err| err.at(assign.name.span))?;

                Ok(value)
            }

            Expression::Logical(logical) => {
                let left = self.eval_expression(&logical.left)?;

                // The deciding operand is the result, not a boolean
                match (logical.operator, left.is_truthy()) {
                    (LogicalOperator::Or, true) | (LogicalOperator::And, false) => Ok(left),
                    _ => self.eval_expression(&logical.right),
                }
            }
            Expression::Binary(binary) => {
                let left = self.eval_expression(&binary.left)?;
                let right = self.eval_expression(&binary.right)?;

                self.eval_infix_expression(binary.operator.value, left, right)
                    .map_err(|err| err.at(binary.operator.span))
            }
            Expression::Unary(unary) => {
                let right = self.eval_expression(&unary.right)?;

                self.eval_prefix_expression(unary.operator.value, right)
                    .map_err(|err| err.at(unary.operator.span))
            }

            Expression::Call(call) => self.eval_call_expression(call),

            Expression::Get(get) => {
                let object = self.eval_expression(&get.object)?;

                match object {
                    Object::Record(record) => {
                        let value = record.borrow().get(&get.field.value);
                        value.ok_or_else(|| {
                            RuntimeError::new(RuntimeErrorKind::NoSuchAttribute {
                                field: get.field.value.clone(),
                            })
                            .at(get.field.span)
                        })
                    }
                    other => Err(RuntimeError::new(RuntimeErrorKind::TypeMismatch {
                        operator: format!(".{}", get.field.value),
                        operands: vec![other],
                    })
                    .at(get.field.span)),
                }
            }
            Expression::Set(set) => {
                let record = match self.eval_expression(&set.object)? {
                    Object::Record(record) => record,
                    other => {
                        return Err(RuntimeError::new(RuntimeErrorKind::TypeMismatch {
                            operator: format!(".{}", set.field.value),
                            operands: vec![other],
                        })
                        .at(set.field.span))
                    }
                };

                let value = self.eval_expression(&set.value)?;
                record
                    .borrow_mut()
                    .set(set.field.value.clone(), value.clone());

                Ok(value)
            }
        }
    }

    fn eval_prefix_expression(
        &self,
        operator: UnaryOperator,
        right: Object,
    ) -> Result<Object, RuntimeError> {
        match (operator, right) {
            (UnaryOperator::Not, right) => Ok(Object::Boolean(!right.is_truthy())),
            (UnaryOperator::Negate, Object::Number(value)) => Ok(Object::Number(-value)),
            (UnaryOperator::Negate, right) => Err(RuntimeErrorKind::TypeMismatch {
                operator: operator.to_string(),
                operands: vec![right],
            }
            .into()),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: BinaryOperator,
        left: Object,
        right: Object,
    ) -> Result<Object, RuntimeError> {
        match (operator, &left, &right) {
            // Equality is defined between any two values
            (BinaryOperator::Equal, _, _) => Ok(Object::Boolean(left == right)),
            (BinaryOperator::NotEqual, _, _) => Ok(Object::Boolean(left != right)),

            (_, Object::Number(left_value), Object::Number(right_value)) => {
                self.eval_number_infix_expression(operator, *left_value, *right_value)
            }
            (BinaryOperator::Add, Object::String(left_value), Object::String(right_value)) => {
                Ok(Object::String(format!("{}{}", left_value, right_value)))
            }

            _ => Err(RuntimeErrorKind::TypeMismatch {
                operator: operator.to_string(),
                operands: vec![left.clone(), right.clone()],
            }
            .into()),
        }
    }

    fn eval_number_infix_expression(
        &self,
        operator: BinaryOperator,
        left_value: f64,
        right_value: f64,
    ) -> Result<Object, RuntimeError> {
        use BinaryOperator::*;

        let result = match operator {
            Add => Object::Number(left_value + right_value),
            Subtract => Object::Number(left_value - right_value),
            Multiply => Object::Number(left_value * right_value),
            Divide if right_value == 0.0 => return Err(RuntimeErrorKind::DivisionByZero.into()),
            Divide => Object::Number(left_value / right_value),

            Less => Object::Boolean(left_value < right_value),
            LessEqual => Object::Boolean(left_value <= right_value),
            Greater => Object::Boolean(left_value > right_value),
            GreaterEqual => Object::Boolean(left_value >= right_value),
            Equal => Object::Boolean(left_value == right_value),
            NotEqual => Object::Boolean(left_value != right_value),
        };

        Ok(result)
    }

    fn eval_call_expression(&mut self, call: &CallExpression) -> Result<Object, RuntimeError> {
        let callee = self.eval_expression(&call.callee)?;

        // Arguments are evaluated left to right, before anything is checked
        let mut args = Vec::with_capacity(call.arguments.value.len());
        for argument in &call.arguments.value {
            args.push(self.eval_expression(argument)?);
        }

        self.apply_function(callee, args)
            .map_err(|err| err.at(call.arguments.span))
    }

    fn apply_function(&mut self, callee: Object, args: Vec<Object>) -> Result<Object, RuntimeError> {
        match callee {
            Object::Function(func) => {
                if args.len() != func.arity() {
                    return Err(RuntimeErrorKind::ArityMismatch {
                        expected: func.arity(),
                        got: args.len(),
                    }
                    .into());
                }
                if self.depth >= self.max_depth {
                    return Err(RuntimeErrorKind::StackOverflow {
                        depth: self.max_depth,
                    }
                    .into());
                }

                debug!("calling {} at depth {}", func, self.depth + 1);

                // Parameters live in a fresh scope enclosed by the one the function was declared in
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.closure));
                for (parameter, arg) in func.declaration.parameters.iter().zip(args) {
                    scoped_env.define(parameter.value.clone(), arg);
                }

                self.depth += 1;
                let result = self.execute_block(&func.declaration.body.statements, scoped_env);
                self.depth -= 1;

                match result? {
                    Signal::Return(value) => Ok(value),
                    Signal::Normal => Ok(Object::Nil),
                }
            }
            // Builtins handle themselves
            Object::Builtin(builtin) => builtin.apply(&args),
            callee => Err(RuntimeErrorKind::NotCallable { callee }.into()),
        }
    }
}

//! Tree-walking evaluator.
//!
//! Statements run against a chain of [`Environment`] frames rooted at one
//! global frame.  Variable, assignment, `this` and `super` nodes use the
//! distances recorded by the [`crate::resolver`]: a node with a distance is
//! read or written exactly that many frames out from the current one, a node
//! without one goes straight to the globals.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::ast::{Expr, ExprId, ExprKind, Stmt};
use crate::builtins;
use crate::class::{Class, Instance, CONSTRUCTOR};
use crate::environment::{self, Environment, SharedEnv};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::function::Function;
use crate::resolver::Locals;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `return` unwinds through this, never through
/// the error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

/// Embedder-tunable limits.
#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    /// Maximum nesting of calls.  `None` leaves recursion bounded only by
    /// the host stack.
    pub max_call_depth: Option<usize>,
}

pub struct Interpreter {
    globals: SharedEnv,
    environment: SharedEnv,
    locals: Locals,
    output: Box<dyn Write>,
    config: InterpreterConfig,
    call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter that prints to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Creates an interpreter whose `print` and `console.log` write to
    /// `output`.
    pub fn with_output<W: Write + 'static>(output: W) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().shared();
        builtins::install(&globals);

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output: Box::new(output),
            config: InterpreterConfig::default(),
            call_depth: 0,
        }
    }

    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn globals(&self) -> &SharedEnv {
        &self.globals
    }

    /// Merges a resolver's table into this interpreter's.
    pub fn install_locals(&mut self, locals: Locals) {
        debug!("Installing {} resolved local(s)", locals.len());
        self.locals.extend(locals);
    }

    /// Writes one line of program output.
    pub fn write_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text) {
            warn!("Failed to write program output: {}", e);
        }
    }

    /// Runs a program.  The first runtime error aborts the remaining
    /// statements and is returned for the caller to report.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        let result = self.run_top_level(statements);

        // Output produced before a failure must still reach the writer.
        if let Err(e) = self.output.flush() {
            warn!("Failed to flush program output: {}", e);
        }

        if result.is_ok() {
            info!("Interpretation completed successfully");
        }
        result
    }

    fn run_top_level(&mut self, statements: &[Stmt]) -> IResult<()> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                debug!("Top-level return of {} ignored", value);
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.write_line(&value.to_string());
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment)).shared();
                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ Flow::Return(_) = self.execute(body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = Function::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let superclass = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            let token = match &expr.kind {
                                ExprKind::Variable(token) => token,
                                _ => name,
                            };
                            return Err(RuntimeError::new(token, RuntimeErrorKind::NotAClass));
                        }
                    },
                    None => None,
                };

                // Methods may refer to the class through their closures.
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Null);

                let enclosing = superclass.as_ref().map(|superclass| {
                    let mut frame = Environment::with_enclosing(Rc::clone(&self.environment));
                    frame.define("super", Value::Class(Rc::clone(superclass)));
                    std::mem::replace(&mut self.environment, frame.shared())
                });

                let table: HashMap<String, Function> = methods
                    .iter()
                    .map(|method| {
                        let function = Function::new(
                            Rc::clone(method),
                            Rc::clone(&self.environment),
                            method.name.lexeme == CONSTRUCTOR,
                        );
                        (method.name.lexeme.clone(), function)
                    })
                    .collect();

                let class = Class::new(name.lexeme.clone(), superclass, table);

                if let Some(enclosing) = enclosing {
                    self.environment = enclosing;
                }

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Runs `statements` with `environment` as the current frame, restoring
    /// the previous frame afterwards whether or not they fail.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: SharedEnv) -> IResult<Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            if let flow @ Flow::Return(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(Value::from(literal)),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Unary { operator, right } => self.evaluate_unary(operator, right),

            ExprKind::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                if operator.token_type == TokenType::OR {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                } else if !left.is_truthy() {
                    return Ok(left);
                }

                self.evaluate(right)
            }

            ExprKind::Variable(name) => self.look_up_variable(name, expr.id),

            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(&expr.id) {
                    Some(&distance) => {
                        environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                debug!("Assigned {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            ExprKind::Call {
                callee,
                paren,
                arguments,
                is_new,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.invoke_callable(&callee, paren, values, *is_new)
            }

            ExprKind::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Instance::get(&instance, name),
                _ => Err(RuntimeError::new(
                    name,
                    RuntimeErrorKind::NotAnInstance("properties"),
                )),
            },

            ExprKind::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::new(
                        name,
                        RuntimeErrorKind::NotAnInstance("fields"),
                    ));
                };

                let value = self.evaluate(value)?;
                instance.set(&name.lexeme, value.clone());
                Ok(value)
            }

            ExprKind::This(keyword) => self.look_up_variable(keyword, expr.id),

            ExprKind::Super { keyword, method } => self.evaluate_super(expr.id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(
                    operator,
                    RuntimeErrorKind::OperandNotNumber,
                )),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("parser only builds '-' and '!' unary nodes"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        );

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RuntimeError::new(
                    operator,
                    RuntimeErrorKind::OperandsNotAddable,
                )),
            },
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),
            _ => {
                let (a, b) = number_operands(operator, &left, &right)?;

                match operator.token_type {
                    TokenType::MINUS => Ok(Value::Number(a - b)),
                    TokenType::STAR => Ok(Value::Number(a * b)),
                    TokenType::SLASH => {
                        if b == 0.0 {
                            Err(RuntimeError::new(
                                operator,
                                RuntimeErrorKind::DivisionByZero,
                            ))
                        } else {
                            Ok(Value::Number(a / b))
                        }
                    }
                    TokenType::GREATER => Ok(Value::Bool(a > b)),
                    TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
                    TokenType::LESS => Ok(Value::Bool(a < b)),
                    TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
                    _ => unreachable!("parser only builds known binary operators"),
                }
            }
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let unresolved = || {
            RuntimeError::new(
                keyword,
                RuntimeErrorKind::UndefinedVariable(keyword.lexeme.clone()),
            )
        };

        let distance = *self.locals.get(&id).ok_or_else(unresolved)?;
        let this_distance = distance.checked_sub(1).ok_or_else(unresolved)?;

        let superclass = environment::get_at(&self.environment, distance, keyword)?;
        let this = Token::new(TokenType::THIS, "this", keyword.line);
        let object = environment::get_at(&self.environment, this_distance, &this)?;

        let (Value::Class(superclass), Value::Instance(object)) = (superclass, object) else {
            return Err(unresolved());
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),
            None => Err(RuntimeError::new(
                method,
                RuntimeErrorKind::UndefinedProperty(method.lexeme.clone()),
            )),
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Checks the callee and argument count, then calls it.
    fn invoke_callable(
        &mut self,
        callee: &Value,
        paren: &Token,
        arguments: Vec<Value>,
        is_new: bool,
    ) -> IResult<Value> {
        let Some(callable) = callee.as_callable() else {
            return Err(RuntimeError::new(paren, RuntimeErrorKind::NotCallable));
        };

        if arguments.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren,
                RuntimeErrorKind::ArityMismatch {
                    expected: callable.arity(),
                    got: arguments.len(),
                },
            ));
        }

        if matches!(callee, Value::Class(_)) && !is_new {
            return Err(RuntimeError::new(
                paren,
                RuntimeErrorKind::ConstructWithoutNew,
            ));
        }

        if let Some(max) = self.config.max_call_depth {
            if self.call_depth >= max {
                return Err(RuntimeError::new(paren, RuntimeErrorKind::StackOverflow));
            }
        }

        debug!("Calling '{}' with {} argument(s)", callable.name(), arguments.len());

        self.call_depth += 1;
        let result = callable.call(self, paren, arguments);
        self.call_depth -= 1;

        result
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> IResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::new(
            operator,
            RuntimeErrorKind::OperandsNotNumbers,
        )),
    }
}

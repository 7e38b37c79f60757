//! User-defined functions and methods.

use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::FunctionDecl;
use crate::callable::Callable;
use crate::class::Instance;
use crate::environment::{Environment, SharedEnv};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// A function value: its declaration plus the frame it closes over.
///
/// `closure` is the defining frame itself, not a snapshot of it, so later
/// writes to captured variables are visible inside the body.
#[derive(Clone)]
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: SharedEnv,
    is_constructor: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: SharedEnv, is_constructor: bool) -> Self {
        Self {
            declaration,
            closure,
            is_constructor,
        }
    }

    /// A copy of this method whose closure is a fresh frame binding `this`
    /// to `instance`.
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        debug!(
            "Binding method '{}' to a {} instance",
            self.name(),
            instance.class().name()
        );

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: environment.shared(),
            is_constructor: self.is_constructor,
        }
    }

    /// The instance a bound constructor initialises.
    fn bound_this(&self) -> Value {
        self.closure
            .borrow()
            .get_here("this")
            .unwrap_or(Value::Null)
    }
}

impl Callable for Function {
    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        _paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling user-defined function '{}'", self.name());

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            debug!("Binding parameter '{}' to {}", param.lexeme, argument);
            environment.define(&param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment.shared())?;

        if self.is_constructor {
            return Ok(self.bound_this());
        }

        let result = match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Null,
        };

        info!("Function '{}' returned: {}", self.name(), result);

        Ok(result)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.declaration.params.len())
            .field("is_constructor", &self.is_constructor)
            .finish()
    }
}

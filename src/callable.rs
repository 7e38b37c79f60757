//! The call capability shared by natives, user functions and classes.

use std::fmt;

use log::debug;

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Anything that can appear before `(...)`.
pub trait Callable {
    fn name(&self) -> &str;

    /// Exact number of arguments the callee accepts.
    fn arity(&self) -> usize;

    /// Invokes the callee.  The argument count has already been checked
    /// against [`Callable::arity`]; `paren` anchors errors raised inside.
    fn call(
        &self,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError>;
}

/// Signature of a builtin implemented in Rust.  The argument count has
/// already been checked, so builtins cannot fail.
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> Value;

/// A builtin function.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &str, arity: usize, func: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            arity,
            func,
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        _paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling native function '{}'", self.name);

        Ok((self.func)(interpreter, &arguments))
    }
}

//! Scope frames.
//!
//! A frame owns its bindings and holds a shared link to the frame that
//! encloses it.  Frames are reference counted: a block's frame stays alive for
//! as long as any closure created inside it does, and every closure created in
//! the same frame sees the same bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::token::Token;
use crate::value::Value;

/// Handle to a frame shared between the interpreter and closures.
pub type SharedEnv = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnv>,
}

impl Environment {
    /// A root frame with no parent.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: SharedEnv) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps a fresh frame in a shared handle.
    pub fn shared(self) -> SharedEnv {
        Rc::new(RefCell::new(self))
    }

    /// Binds `name` in this frame, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Nearest binding of `name`, searching outward.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrites the nearest existing binding of `name`.  Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Whether this frame itself binds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Reads `name` from this frame only.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Number of bindings in this frame only.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Follows exactly `distance` enclosing links from `env`.
pub fn ancestor(env: &SharedEnv, distance: usize) -> Option<SharedEnv> {
    let mut frame = Rc::clone(env);

    for _ in 0..distance {
        let next = frame.borrow().enclosing.clone()?;
        frame = next;
    }

    Some(frame)
}

/// Reads `name` directly from the frame `distance` hops out.  No name search.
pub fn get_at(env: &SharedEnv, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
    debug!("get_at({}, '{}')", distance, name.lexeme);

    let frame = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let value = frame.borrow().get_here(&name.lexeme);

    value.ok_or_else(|| undefined(name))
}

/// Writes `name` directly into the frame `distance` hops out.  No name search.
pub fn assign_at(
    env: &SharedEnv,
    distance: usize,
    name: &Token,
    value: Value,
) -> Result<(), RuntimeError> {
    debug!("assign_at({}, '{}')", distance, name.lexeme);

    let frame = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let mut scope = frame.borrow_mut();

    let Some(slot) = scope.values.get_mut(&name.lexeme) else {
        return Err(undefined(name));
    };
    *slot = value;

    Ok(())
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(
        name,
        RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
    )
}

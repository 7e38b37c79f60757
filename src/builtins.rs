//! Globals that exist before any user code runs.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::callable::{NativeFn, NativeFunction};
use crate::class::{Class, Instance};
use crate::environment::SharedEnv;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Global name of the logging object.
pub const CONSOLE: &str = "console";

/// Populates the global frame with `console` and `clock`.
pub fn install(globals: &SharedEnv) {
    let mut globals = globals.borrow_mut();

    debug!("Defining native function 'clock'");
    globals.define("clock", native("clock", 0, clock));

    debug!("Defining global '{}'", CONSOLE);
    let console_class = Rc::new(Class::new("Console".to_string(), None, HashMap::new()));
    let console = Instance::new(console_class);
    console.set("log", native("log", 1, log));
    globals.define(CONSOLE, Value::Instance(Rc::new(console)));
}

fn native(name: &str, arity: usize, func: NativeFn) -> Value {
    Value::Native(Rc::new(NativeFunction::new(name, arity, func)))
}

/// `console.log(value)`: writes the value as `print` would.
fn log(interpreter: &mut Interpreter, arguments: &[Value]) -> Value {
    for argument in arguments {
        interpreter.write_line(&argument.to_string());
    }

    Value::Null
}

/// `clock()`: seconds since the Unix epoch.
fn clock(_interpreter: &mut Interpreter, _arguments: &[Value]) -> Value {
    let now = chrono::Utc::now();
    let seconds = now.timestamp_micros() as f64 / 1_000_000.0;

    Value::Number(seconds)
}

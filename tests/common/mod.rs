#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use minijs::diagnostic::Diagnostic;
use minijs::interpreter::{Interpreter, InterpreterConfig};
use minijs::session::{Outcome, Session};

/// A `Write` handle whose bytes stay readable after the interpreter owns it.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything a run produced.
pub struct Run {
    pub outcome: Outcome,
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Run {
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }

    pub fn first_message(&self) -> &str {
        &self.diagnostics[0].message
    }
}

pub fn session_with(config: InterpreterConfig) -> (Session<Vec<Diagnostic>>, SharedBuf) {
    let buf = SharedBuf::default();
    let interpreter = Interpreter::with_output(buf.clone()).with_config(config);
    (Session::with_parts(interpreter, Vec::new()), buf)
}

pub fn run_with(source: &str, config: InterpreterConfig) -> Run {
    let (mut session, buf) = session_with(config);
    let outcome = session.run(source);

    Run {
        outcome,
        output: buf.contents(),
        diagnostics: session.into_sink(),
    }
}

pub fn run(source: &str) -> Run {
    run_with(source, InterpreterConfig::default())
}

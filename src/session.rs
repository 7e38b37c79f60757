//! One interpreter plus everything needed to feed it source text repeatedly.
//!
//! A file run is a session with a single [`Session::run`]; the REPL keeps one
//! session alive and runs each line through it, so globals and resolved
//! distances survive from line to line.

use log::{debug, info};

use crate::ast::ExprId;
use crate::diagnostic::{Diagnostic, DiagnosticSink, StderrSink};
use crate::error::ScriptError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver;
use crate::scanner;

/// How a [`Session::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// Lexing, parsing or resolution failed; nothing ran.
    StaticError,
    /// Execution started and was aborted.
    RuntimeError,
}

impl Outcome {
    /// Conventional process exit code (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Ok => 0,
            Outcome::StaticError => 65,
            Outcome::RuntimeError => 70,
        }
    }
}

pub struct Session<S: DiagnosticSink = StderrSink> {
    interpreter: Interpreter,
    next_id: ExprId,
    sink: S,
}

impl Session<StderrSink> {
    /// A session printing to stdout and reporting to stderr.
    pub fn new() -> Self {
        Self::with_parts(Interpreter::new(), StderrSink)
    }
}

impl Default for Session<StderrSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> Session<S> {
    pub fn with_parts(interpreter: Interpreter, sink: S) -> Self {
        Self {
            interpreter,
            next_id: ExprId(0),
            sink,
        }
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Scans, parses, resolves and executes `source`.
    pub fn run(&mut self, source: &str) -> Outcome {
        info!("Running {} byte(s) of source", source.len());

        let tokens = match scanner::scan_all(source) {
            Ok(tokens) => tokens,
            Err(errors) => return self.report_static(&errors),
        };

        let mut parser = Parser::starting_at(&tokens, self.next_id);
        let parsed = parser.parse();
        self.next_id = parser.next_id();

        let statements = match parsed {
            Ok(statements) => statements,
            Err(errors) => return self.report_static(&errors),
        };

        let locals = match resolver::resolve(&statements) {
            Ok(locals) => locals,
            Err(e) => return self.report_static(&[ScriptError::from(e)]),
        };

        self.interpreter.install_locals(locals);

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Ok,
            Err(e) => {
                debug!("Runtime error: {:?}", e);
                self.sink.emit(Diagnostic::from(&ScriptError::from(e)));
                Outcome::RuntimeError
            }
        }
    }

    fn report_static(&mut self, errors: &[ScriptError]) -> Outcome {
        debug!("Reporting {} static error(s)", errors.len());

        for e in errors {
            self.sink.emit(Diagnostic::from(e));
        }

        Outcome::StaticError
    }
}

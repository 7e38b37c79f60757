//! The boundary between the interpreter core and whatever shows errors to a
//! user.  Every failure leaves the crate as a `(line, location, message)`
//! triple pushed into a [`DiagnosticSink`].

use std::fmt;

use log::debug;

use crate::error::{location_of, ScriptError};

/// One reportable problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    /// `" at 'x'"`, `" at end"`, or empty for lexical errors.
    pub location: String,
    pub message: String,
    /// Raised while executing rather than before.
    pub runtime: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.runtime {
            return write!(f, "{}\n[line {}]", self.message, self.line);
        }

        write!(
            f,
            "[line {}] Error{}: {}",
            self.line, self.location, self.message
        )
    }
}

impl From<&ScriptError> for Diagnostic {
    fn from(err: &ScriptError) -> Self {
        match err {
            ScriptError::Lex { message, line } => Diagnostic {
                line: *line,
                location: String::new(),
                message: message.clone(),
                runtime: false,
            },
            ScriptError::Parse {
                message,
                location,
                line,
            } => Diagnostic {
                line: *line,
                location: location.clone(),
                message: message.clone(),
                runtime: false,
            },
            ScriptError::Resolve(e) => Diagnostic {
                line: e.token.line,
                location: location_of(&e.token),
                message: e.kind.to_string(),
                runtime: false,
            },
            ScriptError::Runtime(e) => Diagnostic {
                line: e.token.line,
                location: location_of(&e.token),
                message: e.kind.to_string(),
                runtime: true,
            },
        }
    }
}

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in memory; used by tests and embedders.
impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Writes each diagnostic to standard error as it arrives.
#[derive(Debug, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        debug!("Reporting diagnostic: {:?}", diagnostic);

        eprintln!("{}", diagnostic);
    }
}

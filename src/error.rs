//! Centralised error hierarchy for the interpreter.
//!
//! All subsystems (scanner, parser, resolver, runtime) convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! Static errors (lex, parse, resolve) and runtime errors are distinct types
//! and are never folded into one another: a [`ResolveError`] stops a program
//! before any statement runs, a [`RuntimeError`] aborts it mid-flight.
//!
//! The module **does not** print diagnostics itself; see [`crate::diagnostic`].

use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScriptError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        /// `" at 'lexeme'"` or `" at end"`.
        location: String,
        line: usize,
    },

    /// Static scoping violation found by the resolver.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl ScriptError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        ScriptError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Parse error: line={}, at={}, msg={}",
            token.line, token.lexeme, message
        );

        ScriptError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Lex { line, .. } | ScriptError::Parse { line, .. } => *line,
            ScriptError::Resolve(e) => e.token.line,
            ScriptError::Runtime(e) => e.token.line,
        }
    }

    /// Whether this error was raised before execution started.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            ScriptError::Lex { .. } | ScriptError::Parse { .. } | ScriptError::Resolve(_)
        )
    }
}

/// Renders the `at '…'` part of a static diagnostic.
pub fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Everything the resolver refuses to accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveErrorKind {
    #[error("Variable with this name already declared in this scope.")]
    DuplicateDeclaration,

    #[error("Cannot read local variable in its own initializer.")]
    SelfReferenceInInitializer,

    #[error("Cannot return from top-level code.")]
    TopLevelReturn,

    #[error("Cannot return a value from a constructor.")]
    ReturnFromConstructor,

    #[error("Cannot use 'this' outside of a class.")]
    ThisOutsideClass,

    #[error("Cannot use 'super' outside of a class.")]
    SuperOutsideClass,

    #[error("Cannot use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass,

    #[error("A class cannot inherit from itself.")]
    SelfInheritance,
}

/// A static scoping error, anchored at the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {}] Error{}: {kind}", .token.line, location_of(.token))]
pub struct ResolveError {
    pub token: Token,
    pub kind: ResolveErrorKind,
}

impl ResolveError {
    pub fn new(token: &Token, kind: ResolveErrorKind) -> Self {
        info!(
            "Creating Resolve error: line={}, at={}, kind={:?}",
            token.line, token.lexeme, kind
        );

        Self {
            token: token.clone(),
            kind,
        }
    }
}

/// Everything that can go wrong while a resolved program runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    #[error("Operand must be a number.")]
    OperandNotNumber,

    #[error("Operands must be numbers.")]
    OperandsNotNumbers,

    #[error("Operands must be two numbers or two strings.")]
    OperandsNotAddable,

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Can only call functions and classes.")]
    NotCallable,

    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Cannot call a class like a function. Use 'new' keyword to initialize new instance.")]
    ConstructWithoutNew,

    /// `properties` for reads, `fields` for writes.
    #[error("Only instances have {0}.")]
    NotAnInstance(&'static str),

    #[error("Undefined property '{0}'.")]
    UndefinedProperty(String),

    #[error("Superclass must be a class.")]
    NotAClass,

    #[error("Stack overflow.")]
    StackOverflow,
}

/// A runtime failure plus the token whose evaluation raised it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}\n[line {}]", .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(token: &Token, kind: RuntimeErrorKind) -> Self {
        Self {
            token: token.clone(),
            kind,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, ScriptError>;

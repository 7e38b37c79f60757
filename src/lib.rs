pub mod ast;
pub mod ast_printer;
pub mod builtins;
pub mod callable;
pub mod class;
pub mod diagnostic;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;

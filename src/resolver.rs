//! Static resolver pass.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<&str,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, forward‑read in initializer, invalid
//!    `return`, `this`/`super` outside a class, self-inheritance).
//! 3. Record, for *each* variable, assignment, `this` and `super` node, how many
//!    frames the interpreter must walk to reach the declaring frame.  Nodes with
//!    no entry are globals.
//!
//! The resulting [`Locals`] table is handed to the interpreter before it runs
//! the same statements; the interpreter never falls back to a name search for
//! a node listed here.

use std::collections::HashMap;

use log::{debug, info};

use crate::ast::{Expr, ExprId, ExprKind, FunctionDecl, Stmt};
use crate::class::CONSTRUCTOR;
use crate::error::{ResolveError, ResolveErrorKind};
use crate::token::Token;

/// Side table: expression id → number of enclosing frames to walk.
pub type Locals = HashMap<ExprId, usize>;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Constructor,
}

/// What kind of class body are we in?  Used to validate `this` and `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Resolver: tracks scopes, enforces static rules, and records binding
/// distances into a [`Locals`] table.
pub struct Resolver<'a> {
    scopes: Vec<HashMap<&'a str, bool>>, // false=declared, true=defined
    locals: Locals,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a> Default for Resolver<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Resolver<'a> {
    pub fn new() -> Self {
        info!("Resolver instantiated");
        Resolver {
            scopes: Vec::new(),
            locals: Locals::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top‑level statements, stopping at the first error.
    pub fn resolve(mut self, statements: &'a [Stmt]) -> ResolveResult<Locals> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements)?;

        info!("Resolved {} local reference(s)", self.locals.len());

        Ok(self.locals)
    }

    fn resolve_stmts(&mut self, statements: &'a [Stmt]) -> ResolveResult<()> {
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt) -> ResolveResult<()> {
        match stmt {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods)?,

            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements)?;
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name)?;
                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // name is visible *inside* its own body
                self.declare(&declaration.name)?;
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function)?;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(ResolveError::new(
                        keyword,
                        ResolveErrorKind::TopLevelReturn,
                    ));
                }
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Constructor {
                        return Err(ResolveError::new(
                            keyword,
                            ResolveErrorKind::ReturnFromConstructor,
                        ));
                    }
                    self.resolve_expr(expr)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_class(
        &mut self,
        name: &'a Token,
        superclass: Option<&'a Expr>,
        methods: &'a [std::rc::Rc<FunctionDecl>],
    ) -> ResolveResult<()> {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name)?;
        self.define(name);

        if let Some(superclass) = superclass {
            if let ExprKind::Variable(super_name) = &superclass.kind {
                if super_name.lexeme == name.lexeme {
                    return Err(ResolveError::new(
                        super_name,
                        ResolveErrorKind::SelfInheritance,
                    ));
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass)?;

            self.begin_scope();
            self.bind_implicit("super");
        }

        self.begin_scope();
        self.bind_implicit("this");

        for method in methods {
            let kind = if method.name.lexeme == CONSTRUCTOR {
                FunctionType::Constructor
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind)?;
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr) -> ResolveResult<()> {
        match &expr.kind {
            ExprKind::Literal(_) => {}

            ExprKind::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            ExprKind::Unary { right, .. } => {
                self.resolve_expr(right)?;
            }

            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            ExprKind::Variable(name) => {
                // Cannot read in own initializer
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme.as_str()) == Some(&false) {
                        return Err(ResolveError::new(
                            name,
                            ResolveErrorKind::SelfReferenceInInitializer,
                        ));
                    }
                }
                self.resolve_local(expr.id, name);
            }

            ExprKind::Assign { name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value)?;
                self.resolve_local(expr.id, name);
            }

            ExprKind::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;
                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            ExprKind::Get { object, .. } => self.resolve_expr(object)?,

            ExprKind::Set { object, value, .. } => {
                self.resolve_expr(object)?;
                self.resolve_expr(value)?;
            }

            ExprKind::This(keyword) => {
                if self.current_class == ClassType::None {
                    return Err(ResolveError::new(
                        keyword,
                        ResolveErrorKind::ThisOutsideClass,
                    ));
                }
                self.resolve_local(expr.id, keyword);
            }

            ExprKind::Super { keyword, .. } => match self.current_class {
                ClassType::None => {
                    return Err(ResolveError::new(
                        keyword,
                        ResolveErrorKind::SuperOutsideClass,
                    ));
                }
                ClassType::Class => {
                    return Err(ResolveError::new(
                        keyword,
                        ResolveErrorKind::SuperWithoutSuperclass,
                    ));
                }
                ClassType::Subclass => self.resolve_local(expr.id, keyword),
            },
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(
        &mut self,
        declaration: &'a FunctionDecl,
        kind: FunctionType,
    ) -> ResolveResult<()> {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param)?;
            self.define(param);
        }
        self.resolve_stmts(&declaration.body)?;
        self.end_scope();

        self.current_function = enclosing;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &'a Token) -> ResolveResult<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme.as_str()) {
                return Err(ResolveError::new(
                    name,
                    ResolveErrorKind::DuplicateDeclaration,
                ));
            }
            scope.insert(name.lexeme.as_str(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &'a Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.as_str(), true);
        }
    }

    /// Binds a keyword name (`this`, `super`) in the innermost scope.
    fn bind_implicit(&mut self, name: &'static str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at depth `d`, or leave it out of
    /// the table when no scope declares it (a global).
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("Resolved '{}' {} at depth {}", name.lexeme, id, depth);
                self.locals.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' {} as global", name.lexeme, id);
    }
}

/// Resolves `statements` with a fresh resolver.
pub fn resolve(statements: &[Stmt]) -> ResolveResult<Locals> {
    Resolver::new().resolve(statements)
}

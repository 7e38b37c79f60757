use std::rc::Rc;

use minijs::environment::{ancestor, assign_at, get_at, Environment};
use minijs::error::RuntimeErrorKind;
use minijs::token::{Token, TokenType};
use minijs::value::Value;

fn ident(name: &str) -> Token {
    Token::new(TokenType::IDENTIFIER, name, 1)
}

#[test]
fn test_define_and_get() {
    let mut env = Environment::new();
    env.define("a", Value::Number(1.0));

    assert_eq!(env.get(&ident("a")).unwrap(), Value::Number(1.0));
    assert_eq!(env.len(), 1);
}

#[test]
fn test_redefinition_replaces() {
    let mut env = Environment::new();
    env.define("a", Value::Number(1.0));
    env.define("a", Value::Bool(true));

    assert_eq!(env.get(&ident("a")).unwrap(), Value::Bool(true));
    assert_eq!(env.len(), 1);
}

#[test]
fn test_get_searches_outward() {
    let globals = Environment::new().shared();
    globals.borrow_mut().define("a", Value::Number(1.0));

    let inner = Environment::with_enclosing(Rc::clone(&globals));

    assert_eq!(inner.get(&ident("a")).unwrap(), Value::Number(1.0));
    assert!(!inner.contains("a"));
}

#[test]
fn test_assign_never_creates() {
    let mut env = Environment::new();
    let err = env.assign(&ident("missing"), Value::Null).unwrap_err();

    assert_eq!(
        err.kind,
        RuntimeErrorKind::UndefinedVariable("missing".to_string())
    );
    assert!(env.is_empty());
}

#[test]
fn test_assign_updates_nearest_binding() {
    let globals = Environment::new().shared();
    globals.borrow_mut().define("a", Value::Number(1.0));

    let inner = Environment::with_enclosing(Rc::clone(&globals)).shared();
    inner
        .borrow_mut()
        .assign(&ident("a"), Value::Number(2.0))
        .unwrap();

    assert_eq!(globals.borrow().get_here("a"), Some(Value::Number(2.0)));
    assert!(inner.borrow().is_empty());
}

#[test]
fn test_distance_access_skips_shadowing() {
    let outer = Environment::new().shared();
    outer.borrow_mut().define("x", Value::String("outer".into()));

    let inner = Environment::with_enclosing(Rc::clone(&outer)).shared();
    inner.borrow_mut().define("x", Value::String("inner".into()));

    assert_eq!(
        get_at(&inner, 0, &ident("x")).unwrap(),
        Value::String("inner".into())
    );
    assert_eq!(
        get_at(&inner, 1, &ident("x")).unwrap(),
        Value::String("outer".into())
    );

    assign_at(&inner, 1, &ident("x"), Value::Number(3.0)).unwrap();
    assert_eq!(outer.borrow().get_here("x"), Some(Value::Number(3.0)));
    assert_eq!(
        inner.borrow().get_here("x"),
        Some(Value::String("inner".into()))
    );
}

#[test]
fn test_distance_access_does_not_search() {
    let outer = Environment::new().shared();
    outer.borrow_mut().define("x", Value::Number(1.0));
    let inner = Environment::with_enclosing(Rc::clone(&outer)).shared();

    assert!(get_at(&inner, 0, &ident("x")).is_err());
    assert!(assign_at(&inner, 0, &ident("x"), Value::Null).is_err());
}

#[test]
fn test_ancestor_walks_exact_hops() {
    let root = Environment::new().shared();
    let middle = Environment::with_enclosing(Rc::clone(&root)).shared();
    let leaf = Environment::with_enclosing(Rc::clone(&middle)).shared();

    assert!(Rc::ptr_eq(&ancestor(&leaf, 0).unwrap(), &leaf));
    assert!(Rc::ptr_eq(&ancestor(&leaf, 2).unwrap(), &root));
    assert!(ancestor(&leaf, 3).is_none());
}

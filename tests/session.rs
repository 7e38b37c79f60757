mod common;

use std::rc::Rc;

use common::session_with;
use minijs::diagnostic::Diagnostic;
use minijs::interpreter::InterpreterConfig;
use minijs::session::Outcome;
use minijs::value::Value;

#[test]
fn test_globals_persist_across_runs() {
    let (mut session, buf) = session_with(InterpreterConfig::default());

    assert_eq!(session.run("var a = 1;"), Outcome::Ok);
    assert_eq!(session.run("function inc() { a = a + 1; }"), Outcome::Ok);
    assert_eq!(session.run("inc(); inc();"), Outcome::Ok);
    assert_eq!(session.run("print a;"), Outcome::Ok);

    assert_eq!(buf.contents(), "3\n");
}

#[test]
fn test_redefinition_across_runs() {
    let (mut session, buf) = session_with(InterpreterConfig::default());

    session.run("var a = \"first\";");
    session.run("var a = \"second\";");
    session.run("print a;");

    assert_eq!(buf.contents(), "second\n");
}

#[test]
fn test_locals_survive_later_runs() {
    let (mut session, buf) = session_with(InterpreterConfig::default());

    session.run("function outer() { var x = \"captured\"; function get() { return x; } return get; }");
    session.run("var get = outer();");
    session.run("{ var y = 1; print y; }");
    session.run("print get();");

    assert_eq!(buf.contents(), "1\ncaptured\n");
}

#[test]
fn test_errors_do_not_poison_session() {
    let (mut session, buf) = session_with(InterpreterConfig::default());

    assert_eq!(session.run("print ;"), Outcome::StaticError);
    assert_eq!(session.run("return 1;"), Outcome::StaticError);
    assert_eq!(session.run("missing();"), Outcome::RuntimeError);
    assert_eq!(session.run("print \"still here\";"), Outcome::Ok);

    assert_eq!(buf.contents(), "still here\n");
    assert_eq!(session.sink().len(), 3);
}

#[test]
fn test_lex_errors_are_all_reported() {
    let (mut session, _buf) = session_with(InterpreterConfig::default());

    assert_eq!(session.run("var a = @;\nvar b = #;"), Outcome::StaticError);

    let sink: Vec<Diagnostic> = session.into_sink();
    assert_eq!(sink.len(), 2);
    assert_eq!(sink[0].to_string(), "[line 1] Error: Unexpected character: @");
    assert_eq!(sink[1].line, 2);
}

#[test]
fn test_exit_codes() {
    assert_eq!(Outcome::Ok.exit_code(), 0);
    assert_eq!(Outcome::StaticError.exit_code(), 65);
    assert_eq!(Outcome::RuntimeError.exit_code(), 70);
}

#[test]
fn test_embedder_can_inspect_globals() {
    let (mut session, _buf) = session_with(InterpreterConfig::default());

    session.run("class A {} class B extends A {} var b = new B(); b.tag = 1;");

    let globals = Rc::clone(session.interpreter().globals());
    let globals = globals.borrow();

    assert!(globals.contains("console"));
    assert!(globals.contains("clock"));

    match globals.get_here("b") {
        Some(Value::Instance(b)) => {
            assert_eq!(b.field("tag"), Some(Value::Number(1.0)));
            assert_eq!(b.class().name(), "B");
            assert_eq!(
                b.class().superclass().map(|superclass| superclass.name()),
                Some("A")
            );
        }
        other => panic!("expected an instance, got {:?}", other),
    }
}

mod common;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use common::{run, run_with};
use minijs::diagnostic::Diagnostic;
use minijs::interpreter::{Interpreter, InterpreterConfig};
use minijs::session::{Outcome, Session};
use minijs::value::Value;

#[test]
fn test_print_values() {
    let run = run(r#"
        print 1;
        print 2.5;
        print "hi";
        print true;
        print null;
        print -0.5 + 1;
    "#);

    assert_eq!(run.outcome, Outcome::Ok);
    assert_eq!(run.lines(), ["1", "2.5", "hi", "true", "null", "0.5"]);
}

#[test]
fn test_arithmetic_and_comparison() {
    let run = run(r#"
        print 1 + 2 * 3;
        print (1 + 2) * 3;
        print 10 / 4;
        print 7 - 10;
        print 3 > 2;
        print 3 >= 3;
        print 1 < 1;
        print 1 <= 1;
        print "a" + "b";
    "#);

    assert_eq!(
        run.lines(),
        ["7", "9", "2.5", "-3", "true", "true", "false", "true", "ab"]
    );
}

#[test]
fn test_equality_has_no_coercion() {
    let run = run(r#"
        print 1 == 1;
        print 1 == "1";
        print null == null;
        print null == false;
        print "a" != "a";
        print true == true;
    "#);

    assert_eq!(run.lines(), ["true", "false", "true", "false", "false", "true"]);
}

#[test]
fn test_truthiness() {
    let run = run(r#"
        if (0) print "zero"; else print "no zero";
        if ("") print "empty"; else print "no empty";
        if (null) print "null"; else print "no null";
        if (false) print "false"; else print "no false";
        print !null;
        print !0;
    "#);

    assert_eq!(
        run.lines(),
        ["zero", "empty", "no null", "no false", "true", "false"]
    );
}

#[test]
fn test_logical_operators_short_circuit() {
    let run = run(r#"
        var calls = 0;
        function bump() { calls = calls + 1; return true; }
        print false and bump();
        print true or bump();
        print null or "fallback";
        print 1 and 2;
        print calls;
    "#);

    assert_eq!(run.lines(), ["false", "true", "fallback", "2", "0"]);
}

#[test]
fn test_block_shadowing() {
    let run = run(r#"
        var a = "global";
        {
            var a = "outer";
            {
                var a = "inner";
                print a;
            }
            print a;
        }
        print a;
    "#);

    assert_eq!(run.lines(), ["inner", "outer", "global"]);
}

#[test]
fn test_closure_binding_is_fixed_at_resolution() {
    let run = run(r#"
        var a = "global";
        {
            function show() { print a; }
            show();
            var a = "block";
            show();
        }
    "#);

    assert_eq!(run.lines(), ["global", "global"]);
}

#[test]
fn test_closures_share_captured_frame() {
    let run = run(r#"
        function makePair() {
            var count = 0;
            function inc() { count = count + 1; return count; }
            function get() { return count; }
            var pair = new Pair(inc, get);
            return pair;
        }
        class Pair {
            constructor(inc, get) { this.inc = inc; this.get = get; }
        }
        var p = makePair();
        p.inc();
        p.inc();
        print p.get();
    "#);

    assert_eq!(run.outcome, Outcome::Ok);
    assert_eq!(run.lines(), ["2"]);
}

#[test]
fn test_counter_closure_outlives_call() {
    let run = run(r#"
        function makeCounter() {
            var i = 0;
            function count() { i = i + 1; print i; }
            return count;
        }
        var counter = makeCounter();
        counter();
        counter();
        var other = makeCounter();
        other();
    "#);

    assert_eq!(run.lines(), ["1", "2", "1"]);
}

#[test]
fn test_recursion_and_return() {
    let run = run(r#"
        function fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(15);
    "#);

    assert_eq!(run.lines(), ["610"]);
}

#[test]
fn test_return_unwinds_loops() {
    let run = run(r#"
        function firstOver(limit) {
            for (var i = 0; ; i = i + 1) {
                while (true) {
                    if (i > limit) return i;
                    i = i + 1;
                }
            }
        }
        print firstOver(3);
    "#);

    assert_eq!(run.lines(), ["4"]);
}

#[test]
fn test_function_without_return_yields_null() {
    let run = run("function f() {} print f(); function g() { return; } print g();");

    assert_eq!(run.lines(), ["null", "null"]);
}

#[test]
fn test_callable_display() {
    let run = run(r#"
        function f() {}
        class C {}
        print f;
        print C;
        print new C();
        print clock;
        print console.log;
    "#);

    assert_eq!(
        run.lines(),
        ["<fn f>", "C", "C instance", "<native fn clock>", "<native fn log>"]
    );
}

#[test]
fn test_console_log() {
    let run = run(r#"console.log("hello"); console.log(1 + 1); console.log(null);"#);

    assert_eq!(run.lines(), ["hello", "2", "null"]);
}

#[test]
fn test_console_log_arity() {
    let run = run(r#"console.log("a", "b");"#);

    assert_eq!(run.outcome, Outcome::RuntimeError);
    assert_eq!(run.first_message(), "Expected 1 arguments but got 2.");
}

#[test]
fn test_clock_returns_number() {
    let run = run("var t = clock(); print t > 0; print t - t;");

    assert_eq!(run.lines(), ["true", "0"]);
}

#[test]
fn test_arity_mismatch() {
    let too_few = run("function f(a, b) { return a; }\nf(1);");

    assert_eq!(too_few.outcome, Outcome::RuntimeError);
    assert_eq!(too_few.first_message(), "Expected 2 arguments but got 1.");
    assert_eq!(too_few.diagnostics[0].line, 2);

    let too_many = run("function f(a, b) { return a; }\nf(1, 2, 3);");
    assert_eq!(too_many.outcome, Outcome::RuntimeError);
    assert_eq!(too_many.first_message(), "Expected 2 arguments but got 3.");
}

#[test]
fn test_not_callable() {
    let run = run(r#""text"();"#);

    assert_eq!(run.first_message(), "Can only call functions and classes.");
}

#[test]
fn test_operand_type_errors() {
    assert_eq!(run("-\"a\";").first_message(), "Operand must be a number.");
    assert_eq!(run("1 < \"a\";").first_message(), "Operands must be numbers.");
    assert_eq!(
        run("1 + \"a\";").first_message(),
        "Operands must be two numbers or two strings."
    );
    assert_eq!(run("1 / 0;").first_message(), "Division by zero.");
}

#[test]
fn test_undefined_variable() {
    let run = run("print 1;\nprint missing;\nprint 3;");

    assert_eq!(run.outcome, Outcome::RuntimeError);
    assert_eq!(run.lines(), ["1"]);
    assert_eq!(run.first_message(), "Undefined variable 'missing'.");
    assert_eq!(run.diagnostics[0].to_string(), "Undefined variable 'missing'.\n[line 2]");
}

#[test]
fn test_assign_to_undeclared_global() {
    let run = run("missing = 1;");

    assert_eq!(run.first_message(), "Undefined variable 'missing'.");
}

#[test]
fn test_runtime_error_aborts_remaining_statements() {
    let run = run("print \"before\";\nnull();\nprint \"after\";");

    assert_eq!(run.lines(), ["before"]);
    assert_eq!(run.diagnostics.len(), 1);
}

#[test]
fn test_block_frame_restored_after_error() {
    let (mut session, buf) = common::session_with(InterpreterConfig::default());

    assert_eq!(
        session.run("var a = \"global\"; { var a = \"local\"; null(); }"),
        Outcome::RuntimeError
    );
    assert_eq!(session.run("print a;"), Outcome::Ok);
    assert_eq!(buf.contents(), "global\n");
}

#[test]
fn test_max_call_depth() {
    let config = InterpreterConfig {
        max_call_depth: Some(50),
    };
    let run = run_with("function f(n) { return f(n + 1); } f(0);", config.clone());

    assert_eq!(run.outcome, Outcome::RuntimeError);
    assert_eq!(run.first_message(), "Stack overflow.");

    let run = run_with(
        "function down(n) { if (n == 0) return 0; return down(n - 1); } print down(40);",
        config,
    );
    assert_eq!(run.lines(), ["0"]);
}

#[test]
fn test_static_error_prevents_execution() {
    let run = run("print \"ran\";\n{ var a = 1; var a = 2; }");

    assert_eq!(run.outcome, Outcome::StaticError);
    assert!(run.output.is_empty());
    assert_eq!(
        run.diagnostics[0].to_string(),
        "[line 2] Error at 'a': Variable with this name already declared in this scope."
    );
}

#[test]
fn test_closure_sees_later_global_write() {
    let run = run("var x = 0; function f() { return x; } x = 5; print f();");

    assert_eq!(run.lines(), ["5"]);
}

#[test]
fn test_shadowing_leaves_outer_binding() {
    let run = run("var x = 1; { var x = 2; print x; } print x;");

    assert_eq!(run.lines(), ["2", "1"]);
}

#[test]
fn test_string_minus_number() {
    assert_eq!(run("\"a\" - 1;").first_message(), "Operands must be numbers.");
    assert_eq!(run("print null == 0;").lines(), ["false"]);
}

#[test]
fn test_empty_program() {
    let run = run("");

    assert_eq!(run.outcome, Outcome::Ok);
    assert!(run.output.is_empty());
}

#[test]
fn test_override_shadows_inherited_method() {
    let run = run(r#"
        class A { greet() { return "A"; } }
        class B extends A {}
        class C extends A { greet() { return "C+" + super.greet(); } }
        print new B().greet();
        print new C().greet();
    "#);

    assert_eq!(run.lines(), ["A", "C+A"]);
}

#[test]
fn test_number_display() {
    assert_eq!(Value::Number(3.0).to_string(), "3");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
    assert_eq!(Value::Number(-4.0).to_string(), "-4");
    assert_eq!(Value::Number(1e23).to_string(), "100000000000000000000000");
}

/// Holds writes back until `flush`, like a `BufWriter` would.
struct HeldWriter {
    pending: Vec<u8>,
    committed: Rc<RefCell<Vec<u8>>>,
}

impl Write for HeldWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.committed.borrow_mut().append(&mut self.pending);
        Ok(())
    }
}

#[test]
fn test_output_flushed_after_runtime_error() {
    let committed = Rc::new(RefCell::new(Vec::new()));
    let writer = HeldWriter {
        pending: Vec::new(),
        committed: Rc::clone(&committed),
    };
    let mut session: Session<Vec<Diagnostic>> =
        Session::with_parts(Interpreter::with_output(writer), Vec::new());

    let outcome = session.run("print \"before\";\nnull();");

    assert_eq!(outcome, Outcome::RuntimeError);
    assert_eq!(committed.borrow().as_slice(), b"before\n");
}

mod common;

use common::run;
use minijs::session::Outcome;

#[test]
fn test_fields_and_methods() {
    let run = run(r#"
        class Point {
            constructor(x, y) {
                this.x = x;
                this.y = y;
            }
            sum() { return this.x + this.y; }
        }
        var p = new Point(1, 2);
        print p.x;
        print p.sum();
        p.x = 10;
        print p.sum();
    "#);

    assert_eq!(run.outcome, Outcome::Ok);
    assert_eq!(run.lines(), ["1", "3", "12"]);
}

#[test]
fn test_instances_have_independent_fields() {
    let run = run(r#"
        class Box {}
        var a = new Box();
        var b = new Box();
        a.value = "a";
        b.value = "b";
        print a.value;
        print b.value;
    "#);

    assert_eq!(run.lines(), ["a", "b"]);
}

#[test]
fn test_fields_shadow_methods() {
    let run = run(r#"
        class A { name() { return "method"; } }
        var a = new A();
        print a.name();
        a.name = "field";
        print a.name;
    "#);

    assert_eq!(run.lines(), ["method", "field"]);
}

#[test]
fn test_bound_method_remembers_receiver() {
    let run = run(r#"
        class Greeter {
            constructor(name) { this.name = name; }
            greet() { print "hi " + this.name; }
        }
        var g = new Greeter("ann").greet;
        var other = new Greeter("bob");
        other.greet = g;
        other.greet();
    "#);

    assert_eq!(run.lines(), ["hi ann"]);
}

#[test]
fn test_inheritance_and_super() {
    let run = run(r#"
        class Animal {
            constructor(name) { this.name = name; }
            speak() { return this.name + " makes a sound"; }
            kind() { return "animal"; }
        }
        class Dog extends Animal {
            speak() { return super.speak() + " (woof)"; }
        }
        var d = new Dog("rex");
        print d.speak();
        print d.kind();
    "#);

    assert_eq!(run.outcome, Outcome::Ok);
    assert_eq!(run.lines(), ["rex makes a sound (woof)", "animal"]);
}

#[test]
fn test_super_is_static_across_levels() {
    let run = run(r#"
        class A { method() { print "A"; } }
        class B extends A {
            method() { print "B"; }
            test() { super.method(); }
        }
        class C extends B {}
        new C().test();
    "#);

    assert_eq!(run.lines(), ["A"]);
}

#[test]
fn test_inherited_constructor_sets_arity() {
    let run = run(r#"
        class A { constructor(a, b) { this.total = a + b; } }
        class B extends A {}
        print new B(1, 2).total;
        new B(1);
    "#);

    assert_eq!(run.lines(), ["3"]);
    assert_eq!(run.first_message(), "Expected 2 arguments but got 1.");
}

#[test]
fn test_subclass_constructor_calls_super_constructor() {
    let run = run(r#"
        class Base { constructor(x) { this.x = x; } }
        class Derived extends Base {
            constructor(x, y) {
                super.constructor(x);
                this.y = y;
            }
        }
        var d = new Derived(1, 2);
        print d.x + d.y;
    "#);

    assert_eq!(run.lines(), ["3"]);
}

#[test]
fn test_calling_constructor_directly_returns_instance() {
    let run = run(r#"
        class A {
            constructor() { this.count = 0; return; }
        }
        var a = new A();
        var again = a.constructor();
        print again == a;
        print a.count;
    "#);

    assert_eq!(run.lines(), ["true", "0"]);
}

#[test]
fn test_class_without_new_is_an_error() {
    let run = run("class A {}\nA();");

    assert_eq!(run.outcome, Outcome::RuntimeError);
    assert_eq!(
        run.first_message(),
        "Cannot call a class like a function. Use 'new' keyword to initialize new instance."
    );
    assert_eq!(run.diagnostics[0].line, 2);
}

#[test]
fn test_new_on_function_is_plain_call() {
    let run = run("function f() { return 7; } print new f();");

    assert_eq!(run.lines(), ["7"]);
}

#[test]
fn test_arity_checked_before_new() {
    let run = run("class A {} A(1);");

    assert_eq!(run.first_message(), "Expected 0 arguments but got 1.");
}

#[test]
fn test_superclass_must_be_a_class() {
    let run = run("var NotClass = 1;\nclass A extends NotClass {}");

    assert_eq!(run.outcome, Outcome::RuntimeError);
    assert_eq!(run.first_message(), "Superclass must be a class.");
    assert_eq!(run.diagnostics[0].line, 2);
}

#[test]
fn test_property_errors() {
    assert_eq!(run("var a = 1; a.x;").first_message(), "Only instances have properties.");
    assert_eq!(run("var a = 1; a.x = 2;").first_message(), "Only instances have fields.");
    assert_eq!(
        run("class A {} new A().missing;").first_message(),
        "Undefined property 'missing'."
    );
}

#[test]
fn test_undefined_super_method() {
    let run = run(r#"
        class A {}
        class B extends A { f() { return super.nope(); } }
        new B().f();
    "#);

    assert_eq!(run.first_message(), "Undefined property 'nope'.");
}

#[test]
fn test_methods_close_over_class_name() {
    let run = run(r#"
        class Node {
            constructor(depth) { this.depth = depth; }
            child() { return new Node(this.depth + 1); }
        }
        print new Node(0).child().child().depth;
    "#);

    assert_eq!(run.lines(), ["2"]);
}

#[test]
fn test_local_class_captures_enclosing_scope() {
    let run = run(r##"
        function make(prefix) {
            class Tagger {
                tag(s) { return prefix + s; }
            }
            return new Tagger();
        }
        print make("#").tag("one");
    "##);

    assert_eq!(run.lines(), ["#one"]);
}

//! Constructor objects: instance creation, member storage, method binding,
//! and handle sharing.

use std::rc::Rc;

use hostscript::runtime::{Callable, Instance, Value};
use hostscript::{Error, Evaluator, HostFunction, Result};

fn eval(source: &str) -> Value {
    Evaluator::new().run(source).unwrap()
}

#[test]
fn test_constructor_round_trip() {
    assert_eq!(
        eval("function make(v) { this.val = v; } var a = new make(7); a.val;"),
        Value::Int(7)
    );
}

#[test]
fn test_instances_are_distinct() {
    let source = "
        function make(v) { this.val = v; }
        var a = new make(3);
        var b = new make(4);
        b.val = b.val + 1;
        a.val * 10 + b.val;
    ";
    assert_eq!(eval(source), Value::Int(35));
}

#[test]
fn test_instance_copies_share_members() {
    let source = "
        function make() { this.x = 1; }
        var a = new make();
        var b = a;
        b.x = 5;
        a.x;
    ";
    assert_eq!(eval(source), Value::Int(5));
}

#[test]
fn test_bare_new_is_zero_argument_form() {
    assert_eq!(
        eval("function make() { this.x = 2; } var a = new make; a.x;"),
        Value::Int(2)
    );
}

#[test]
fn test_method_binding_resolves_this_to_receiver() {
    let source = "
        function read() { this.val; }
        function make(v) { this.val = v; this.read = read; }
        var a = new make(5);
        var b = new make(6);
        a.read() * 10 + b.read();
    ";
    assert_eq!(eval(source), Value::Int(56));
}

#[test]
fn test_method_can_mutate_receiver() {
    let source = "
        function bump() { this.n = this.n + 1; }
        function make() { this.n = 0; this.bump = bump; }
        var a = new make();
        a.bump();
        a.bump();
        a.n;
    ";
    assert_eq!(eval(source), Value::Int(2));
}

#[test]
fn test_this_outside_constructor_or_method() {
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.run("this;").unwrap_err(), Error::NoInstance);
    assert_eq!(
        evaluator.run("function f() { this; } f();").unwrap_err(),
        Error::NoInstance
    );
}

#[test]
fn test_missing_member_is_unknown() {
    let err = Evaluator::new()
        .run("function make() { } var a = new make(); a.gone;")
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnknownIdentifier {
            name: "gone".to_string()
        }
    );
}

#[test]
fn test_constructor_returns_instance_not_body_value() {
    let result = eval("function make() { 42; } new make();");
    assert!(matches!(result, Value::Instance(_)));
}

#[test]
fn test_failing_constructor_propagates_error() {
    let err = Evaluator::new()
        .run("function make() { this.x = 1 / 0; } new make();")
        .unwrap_err();
    assert_eq!(err, Error::DivisionByZero);
}

struct Answer;

impl HostFunction for Answer {
    fn name(&self) -> &str {
        "answer"
    }

    fn call(&self, _args: &[Value]) -> Result<Value> {
        Ok(Value::Int(42))
    }
}

fn host_instance() -> (Evaluator, Instance) {
    let instance = Instance::new();
    instance.define_function("answer", Callable::Native(Rc::new(Answer)));
    let mut evaluator = Evaluator::new();
    evaluator.define_const("obj", Value::Instance(instance.clone()));
    (evaluator, instance)
}

#[test]
fn test_fixed_function_member_reads_unbound_and_callable() {
    let (mut evaluator, _instance) = host_instance();
    assert!(matches!(
        evaluator.run("obj.answer;").unwrap(),
        Value::Function(_)
    ));
    assert_eq!(evaluator.run("obj.answer();").unwrap(), Value::Int(42));
}

#[test]
fn test_fixed_function_member_is_not_assignable() {
    let (mut evaluator, instance) = host_instance();
    let err = evaluator.run("obj.answer = 1;").unwrap_err();
    assert!(matches!(err, Error::NotAnLValue { .. }));
    assert_eq!(instance.get_member("answer"), None);
}

#[test]
fn test_variable_member_stays_assignable_despite_function_of_same_name() {
    let (mut evaluator, instance) = host_instance();
    instance.set_member("answer", Value::Int(1)).unwrap();
    // The variable slot shadows the fixed function for reads and writes.
    assert_eq!(evaluator.run("obj.answer = 2;").unwrap(), Value::Int(2));
    assert_eq!(instance.get_member("answer"), Some(Value::Int(2)));
}

#[test]
fn test_reassignment_does_not_leak_handles() {
    let mut evaluator = Evaluator::new();
    let result = evaluator
        .run("function make() { this.x = 1; } var a = new make(); a;")
        .unwrap();
    let instance = match result {
        Value::Instance(instance) => instance,
        other => panic!("expected instance, got {:?}", other),
    };

    let before = instance.handle_count();
    evaluator.run("a = a;").unwrap();
    evaluator.run("a = a;").unwrap();
    assert_eq!(instance.handle_count(), before);
}

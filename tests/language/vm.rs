//! Integration tests for the interpreter
//!
//! Runs whole scripts through the public `Vm` API without an observer.

use std::sync::Arc;

use spewer_foundation::{ErrorKind, ObserverSlot, Value};
use spewer_language::Vm;

fn vm() -> Vm {
    Vm::with_slot(Arc::new(ObserverSlot::new()))
}

fn run(source: &str) -> Vm {
    let mut vm = vm();
    vm.load_source("main", source).unwrap();
    vm.run_module("main").unwrap();
    vm
}

fn exception(vm: &mut Vm, function: &str) -> (String, Value) {
    let err = vm.call("main", function, &[]).unwrap_err();
    let (kind, value) = err.exception().expect("script exception");
    (kind.to_string(), value.clone())
}

// =============================================================================
// Programs
// =============================================================================

#[test]
fn fibonacci_loop() {
    let vm = run(
        "fn fib(n)\n    a = 0\n    b = 1\n    while n > 0\n        t = a + b\n        a = b\n        b = t\n        n = n - 1\n    end\n    return a\nend\nresult = fib(20)\n",
    );
    assert_eq!(vm.global("main", "result"), Some(&Value::Int(6765)));
}

#[test]
fn recursion_with_keywords() {
    let mut vm = run("fn power(base, exp)\n    if exp == 0\n        return 1\n    end\n    return base * power(base, exp=exp - 1)\nend\n");
    let result = vm
        .call_with_kwargs("main", "power", &[Value::Int(2)], &[("exp", Value::Int(10))])
        .unwrap();
    assert_eq!(result, Value::Int(1024));
}

#[test]
fn string_and_list_building() {
    let vm = run(
        "words = [\"a\", \"b\"]\nwords = words + [\"c\"]\nlabel = \"n=\" + str(len(words))\nprint(label, words)\n",
    );
    assert_eq!(vm.global("main", "label"), Some(&Value::from("n=3")));
    assert_eq!(vm.output(), ["n=3 [\"a\", \"b\", \"c\"]"]);
}

#[test]
fn not_binds_looser_than_comparison() {
    let vm = run("a = not 1 > 2\nb = not nil\n");
    assert_eq!(vm.global("main", "a"), Some(&Value::Bool(true)));
    assert_eq!(vm.global("main", "b"), Some(&Value::Bool(true)));
}

#[test]
fn floor_division_and_remainder() {
    let vm = run("q = -7 / 2\nr = -7 % 2\n");
    assert_eq!(vm.global("main", "q"), Some(&Value::Int(-4)));
    assert_eq!(vm.global("main", "r"), Some(&Value::Int(1)));
}

#[test]
fn modules_call_each_other() {
    let mut vm = vm();
    vm.load_source("util", "fn double(x)\n    return x * 2\nend\n")
        .unwrap();
    vm.load_source("app", "fn main()\n    return util.double(21)\nend\n")
        .unwrap();
    assert_eq!(vm.call("app", "main", &[]).unwrap(), Value::Int(42));
    let names: Vec<&str> = vm.module_names().collect();
    assert_eq!(names, vec!["util", "app"]);
}

#[test]
fn take_output_drains() {
    let mut vm = run("print(1)\nprint(2)\n");
    assert_eq!(vm.take_output(), vec!["1", "2"]);
    assert!(vm.output().is_empty());
}

// =============================================================================
// Exceptions
// =============================================================================

#[test]
fn user_raise_carries_kind_and_value() {
    let mut vm = run("fn f()\n    raise ValueError(\"boom\")\nend\n");
    let (kind, value) = exception(&mut vm, "f");
    assert_eq!(kind, "ValueError");
    assert_eq!(value, Value::from("boom"));
}

#[test]
fn exception_location_is_the_failing_line() {
    let mut vm = run("fn inner()\n    x = 1 / 0\nend\nfn outer()\n    inner()\nend\n");
    let err = vm.call("main", "outer", &[]).unwrap_err();
    let location = err.location.expect("location");
    assert_eq!((location.module.as_str(), location.line), ("main", 2));
}

#[test]
fn builtin_failures_are_exceptions() {
    let mut vm = run(
        "fn index()\n    return [1, 2][2]\nend\nfn empty()\n    return max([])\nend\nfn missing()\n    return nowhere\nend\nfn overflow()\n    return 9223372036854775807 + 1\nend\n",
    );
    assert_eq!(exception(&mut vm, "index").0, "IndexError");
    assert_eq!(exception(&mut vm, "empty").0, "ValueError");
    assert_eq!(exception(&mut vm, "missing").0, "NameError");
    assert_eq!(exception(&mut vm, "overflow").0, "OverflowError");
}

#[test]
fn recursion_limit() {
    let mut vm = run("fn forever(n)\n    return forever(n + 1)\nend\n");
    vm.set_max_depth(30);
    let err = vm.call("main", "forever", &[Value::Int(0)]).unwrap_err();
    assert_eq!(err.exception().map(|(kind, _)| kind), Some("RecursionError"));
    // The engine is still usable afterwards.
    vm.load_source("other", "fn ok()\n    return 1\nend\n").unwrap();
    assert_eq!(vm.call("other", "ok", &[]).unwrap(), Value::Int(1));
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn load_file_names_module_after_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greeting.spw");
    std::fs::write(&path, "message = \"hi\"\n").unwrap();

    let mut vm = vm();
    let name = vm.load_file(&path).unwrap();
    assert_eq!(&*name, "greeting");
    vm.run_module("greeting").unwrap();
    assert_eq!(vm.global("greeting", "message"), Some(&Value::from("hi")));
}

#[test]
fn loading_failures() {
    let mut vm = vm();
    assert!(matches!(
        vm.load_file("/no/such/place.spw").unwrap_err().kind,
        ErrorKind::Io { .. }
    ));
    vm.load_source("m", "x = 1\n").unwrap();
    assert!(matches!(
        vm.load_source("m", "x = 2\n").unwrap_err().kind,
        ErrorKind::DuplicateModule(_)
    ));
    assert!(matches!(
        vm.run_module("nope").unwrap_err().kind,
        ErrorKind::UnknownModule(_)
    ));
}

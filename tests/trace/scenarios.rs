//! End-to-end trace output for representative programs.

use spewer_foundation::Value;
use spewer_trace::TracerConfig;

use crate::support::{Harness, functions_only};

const SUM: &str = "fn f()\n    x = 10\n    y = 20\n    return x + y\nend\n";

// =============================================================================
// Line Mode
// =============================================================================

#[test]
fn line_mode_without_values_reports_each_statement() {
    let mut h = Harness::new().file("demo", SUM);
    let config = TracerConfig::builder()
        .with_show_values(false)
        .with_trace_returns(false)
        .build()
        .unwrap();
    {
        let _guard = h.trace(config);
        assert_eq!(h.vm.call("demo", "f", &[]).unwrap(), Value::Int(30));
    }
    assert_eq!(
        h.lines(),
        vec![
            "demo:2:     x = 10",
            "demo:3:     y = 20",
            "demo:4:     return x + y",
        ]
    );
}

#[test]
fn line_mode_with_values_and_return() {
    let mut h = Harness::new().file("demo", SUM);
    {
        let _guard = h.trace(TracerConfig::default());
        h.vm.call("demo", "f", &[]).unwrap();
    }
    assert_eq!(
        h.lines(),
        vec![
            "demo:2:     x = 10",
            "demo:3:     y = 20",
            "demo:4:     return x + y",
            "\tx=10 y=20",
            "demo:4:     return x + y -> 30",
        ]
    );
}

#[test]
fn line_mode_module_code_and_globals() {
    let mut h = Harness::new().file(
        "demo",
        "fn add(a, b)\n    x = a + b\n    return x\nend\n\ntotal = add(5, b=3)\n",
    );
    {
        let _guard = h.trace(TracerConfig::default());
        h.vm.run_module("demo").unwrap();
    }
    assert_eq!(
        h.lines(),
        vec![
            "demo:6: total = add(5, b=3)",
            "\tadd=<fn add>",
            "demo:2:     x = a + b",
            "\ta=5 b=3",
            "demo:3:     return x",
            "\tx=8",
            "demo:3:     return x -> 8",
            "demo:6: total = add(5, b=3) -> nil",
        ]
    );
}

// =============================================================================
// Functions-Only Mode
// =============================================================================

#[test]
fn functions_only_reports_arguments_and_return() {
    let mut h = Harness::new().file("calc", "fn f(a, b)\n    return a + b\nend\n");
    {
        let _guard = h.trace(functions_only());
        let result = h
            .vm
            .call_with_kwargs("calc", "f", &[], &[("a", Value::Int(5)), ("b", Value::Int(3))])
            .unwrap();
        assert_eq!(result, Value::Int(8));
    }
    assert_eq!(
        h.lines(),
        vec!["calc:1: f()", "\targs: a=5, b=3", "calc:2: f() -> 8"]
    );
}

#[test]
fn functions_only_reports_exception_and_propagates_it() {
    let mut h = Harness::new().file("m", "fn f()\n    raise ValueError(\"boom\")\nend\n");
    let err = {
        let _guard = h.trace(functions_only());
        h.vm.call("m", "f", &[]).unwrap_err()
    };
    assert_eq!(err.exception().map(|(kind, _)| kind), Some("ValueError"));

    let headers = h.headers();
    assert_eq!(headers, vec!["m:1: f()", "m:2: f() -> ValueError(\"boom\")"]);
    assert!(headers[1].contains("ValueError") && headers[1].contains("boom"));
}

#[test]
fn exception_is_reported_in_each_unwound_function() {
    let mut h = Harness::new().file(
        "m",
        "fn inner()\n    return 1 / 0\nend\nfn outer()\n    inner()\n    return 1\nend\n",
    );
    {
        let _guard = h.trace(functions_only());
        assert!(h.vm.call("m", "outer", &[]).is_err());
    }
    assert_eq!(
        h.headers(),
        vec![
            "m:4: outer()",
            "m:1: inner()",
            "m:2: inner() -> ZeroDivisionError(\"division by zero\")",
            "m:5: outer() -> ZeroDivisionError(\"division by zero\")",
        ]
    );
}

#[test]
fn hidden_values_use_markers() {
    let mut h = Harness::new().file(
        "m",
        "fn ok(a)\n    return a\nend\nfn bad()\n    raise Stop\nend\n",
    );
    let config = TracerConfig::builder()
        .with_functions_only(true)
        .with_show_values(false)
        .build()
        .unwrap();
    {
        let _guard = h.trace(config);
        h.vm.call("m", "ok", &[Value::Int(1)]).unwrap();
        h.vm.call("m", "bad", &[]).unwrap_err();
    }
    assert_eq!(
        h.lines(),
        vec![
            "m:1: ok()",
            "m:2: ok() -> <return>",
            "m:4: bad()",
            "m:5: bad() -> <exception>",
        ]
    );
}

#[test]
fn native_calls_are_opt_in() {
    let source = "fn f()\n    return len([1, 2])\nend\n";

    let mut h = Harness::new().file("m", source);
    {
        let _guard = h.trace(functions_only());
        h.vm.call("m", "f", &[]).unwrap();
    }
    assert_eq!(h.lines(), vec!["m:1: f()", "m:2: f() -> 2"]);

    let mut h = Harness::new().file("m", source);
    let config = TracerConfig::builder()
        .with_functions_only(true)
        .with_trace_natives(true)
        .build()
        .unwrap();
    {
        let _guard = h.trace(config);
        h.vm.call("m", "f", &[]).unwrap();
    }
    assert_eq!(h.lines(), vec!["m:1: f()", "m:2: len()", "m:2: f() -> 2"]);
}

#[test]
fn disabled_returns_and_exceptions_are_silent() {
    let mut h = Harness::new().file(
        "m",
        "fn ok()\n    return 1\nend\nfn bad()\n    raise Stop\nend\n",
    );
    let config = TracerConfig::builder()
        .with_functions_only(true)
        .with_trace_returns(false)
        .with_trace_exceptions(false)
        .build()
        .unwrap();
    {
        let _guard = h.trace(config);
        h.vm.call("m", "ok", &[]).unwrap();
        h.vm.call("m", "bad", &[]).unwrap_err();
    }
    assert_eq!(h.lines(), vec!["m:1: ok()", "m:4: bad()"]);
}

//! Module filtering across a multi-module call chain.

use proptest::prelude::*;
use spewer_foundation::Value;
use spewer_trace::TracerConfig;

use crate::support::{Harness, module_of};

const ALPHA: &str = "fn run()\n    n = beta.helper(2)\n    return n + 1\nend\n";
const BETA: &str = "fn helper(x)\n    y = x * 10\n    return y\nend\n";

fn chain() -> Harness {
    Harness::new().file("alpha", ALPHA).file("beta", BETA)
}

fn run_with(h: &mut Harness, config: TracerConfig) {
    let _guard = h.trace(config);
    assert_eq!(h.vm.call("alpha", "run", &[]).unwrap(), Value::Int(21));
}

#[test]
fn filter_keeps_only_listed_module() {
    let mut h = chain();
    run_with(
        &mut h,
        TracerConfig::builder().with_modules(["alpha"]).build().unwrap(),
    );
    let headers = h.headers();
    assert!(!headers.is_empty());
    assert!(headers.iter().all(|line| module_of(line) == "alpha"));
    assert_eq!(
        headers,
        vec![
            "alpha:2:     n = beta.helper(2)",
            "alpha:3:     return n + 1",
            "alpha:3:     return n + 1 -> 21",
        ]
    );
}

#[test]
fn no_filter_traces_every_module() {
    let mut h = chain();
    run_with(&mut h, TracerConfig::default());
    let modules: Vec<String> = h
        .headers()
        .iter()
        .map(|line| module_of(line).to_string())
        .collect();
    assert!(modules.contains(&"alpha".to_string()));
    assert!(modules.contains(&"beta".to_string()));
}

#[test]
fn filter_naming_an_unloaded_module_traces_nothing() {
    let mut h = chain();
    run_with(
        &mut h,
        TracerConfig::builder().with_modules(["gamma"]).build().unwrap(),
    );
    assert!(h.lines().is_empty());
}

#[test]
fn text_modules_are_unknown_to_the_filter() {
    let mut h = Harness::new();
    h.vm.load_source("alpha", "fn f()\n    return 1\nend\n").unwrap();
    {
        let _guard = h.trace(TracerConfig::builder().with_modules(["alpha"]).build().unwrap());
        h.vm.call("alpha", "f", &[]).unwrap();
    }
    assert!(h.lines().is_empty());
}

fn any_filter() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(vec!["alpha", "beta", "gamma"], 1..=3)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Records only come from filtered modules, and every filtered module
    /// that ran produced at least one.
    #[test]
    fn records_respect_filter(filter in any_filter(), functions in any::<bool>()) {
        let mut h = chain();
        let config = TracerConfig::builder()
            .with_modules(filter.clone())
            .with_functions_only(functions)
            .build()
            .unwrap();
        run_with(&mut h, config);

        let headers = h.headers();
        for header in &headers {
            prop_assert!(filter.iter().any(|m| *m == module_of(header)));
        }
        for module in ["alpha", "beta"] {
            if filter.contains(&module) {
                prop_assert!(headers.iter().any(|line| module_of(line) == module));
            }
        }
    }
}

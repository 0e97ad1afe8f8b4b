//! Integration tests for event delivery
//!
//! Checks which events the interpreter reports, in what order, and with what
//! frame data.

use std::sync::Arc;

use parking_lot::Mutex;
use spewer_foundation::{EventKind, ExecutionEvent, Frame, Observer, ObserverSlot};
use spewer_language::Vm;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Seen {
    kind: EventKind,
    code: String,
    line: u32,
    module: Option<String>,
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<Seen>>,
}

impl Recorder {
    fn take(&self) -> Vec<Seen> {
        std::mem::take(&mut *self.seen.lock())
    }

    fn summary(&self) -> Vec<(EventKind, String, u32)> {
        self.take()
            .into_iter()
            .map(|seen| (seen.kind, seen.code, seen.line))
            .collect()
    }
}

impl Observer for Recorder {
    fn observe(
        self: Arc<Self>,
        frame: &dyn Frame,
        event: &ExecutionEvent<'_>,
    ) -> Option<Arc<dyn Observer>> {
        self.seen.lock().push(Seen {
            kind: event.kind(),
            code: frame.code_name().to_string(),
            line: frame.line(),
            module: frame.origin().map(|origin| origin.module.to_string()),
        });
        Some(self)
    }
}

fn traced(source: &str) -> (Vm, Arc<Recorder>) {
    let slot = Arc::new(ObserverSlot::new());
    let mut vm = Vm::with_slot(Arc::clone(&slot));
    vm.load_source("m", source).unwrap();
    let recorder = Arc::new(Recorder::default());
    slot.install(recorder.clone());
    (vm, recorder)
}

fn event(kind: EventKind, code: &str, line: u32) -> (EventKind, String, u32) {
    (kind, code.to_string(), line)
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn while_loop_reports_header_each_iteration() {
    let (mut vm, recorder) =
        traced("fn count()\n    i = 0\n    while i < 2\n        i = i + 1\n    end\n    return i\nend\n");
    vm.call("m", "count", &[]).unwrap();
    let steps: Vec<u32> = recorder
        .summary()
        .into_iter()
        .filter(|(kind, ..)| *kind == EventKind::Step)
        .map(|(.., line)| line)
        .collect();
    assert_eq!(steps, vec![2, 3, 4, 3, 4, 3, 6]);
}

#[test]
fn nested_call_events_interleave() {
    let (mut vm, recorder) =
        traced("fn inner(x)\n    return x + 1\nend\nfn outer()\n    return inner(1)\nend\n");
    vm.call("m", "outer", &[]).unwrap();
    assert_eq!(
        recorder.summary(),
        vec![
            event(EventKind::Enter, "outer", 4),
            event(EventKind::Step, "outer", 5),
            event(EventKind::Enter, "inner", 1),
            event(EventKind::Step, "inner", 2),
            event(EventKind::Exit, "inner", 2),
            event(EventKind::Exit, "outer", 5),
        ]
    );
}

#[test]
fn failing_call_reports_raise_without_exit() {
    let (mut vm, recorder) = traced("fn f()\n    raise Oops(1)\nend\n");
    assert!(vm.call("m", "f", &[]).is_err());
    assert_eq!(
        recorder.summary(),
        vec![
            event(EventKind::Enter, "f", 1),
            event(EventKind::Step, "f", 2),
            event(EventKind::Raise, "f", 2),
        ]
    );
}

#[test]
fn recursion_error_fires_before_enter() {
    let (mut vm, recorder) = traced("fn down()\n    return down()\nend\n");
    vm.set_max_depth(2);
    assert!(vm.call("m", "down", &[]).is_err());
    let enters = recorder
        .summary()
        .into_iter()
        .filter(|(kind, ..)| *kind == EventKind::Enter)
        .count();
    assert_eq!(enters, 2);
}

// =============================================================================
// Frames
// =============================================================================

#[test]
fn file_modules_carry_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.spw");
    std::fs::write(&path, "x = 1\n").unwrap();

    let slot = Arc::new(ObserverSlot::new());
    let mut vm = Vm::with_slot(Arc::clone(&slot));
    vm.load_file(&path).unwrap();
    vm.load_source("memory", "y = 2\n").unwrap();
    let recorder = Arc::new(Recorder::default());
    slot.install(recorder.clone());

    vm.run_module("disk").unwrap();
    vm.run_module("memory").unwrap();
    let modules: Vec<Option<String>> = recorder
        .take()
        .into_iter()
        .filter(|seen| seen.kind == EventKind::Step)
        .map(|seen| seen.module)
        .collect();
    assert_eq!(modules, vec![Some("disk".to_string()), None]);
}

#[test]
fn uninstalled_slot_sees_nothing() {
    let (mut vm, recorder) = traced("fn f()\n    return len([1])\nend\n");
    vm.slot().remove();
    vm.call("m", "f", &[]).unwrap();
    assert!(recorder.take().is_empty());
}

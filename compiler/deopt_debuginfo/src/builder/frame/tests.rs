use deopt_ir::{
    Bci, CodeId, Constant, FrameState, Graph, MethodFlags, SlotArea, StateDefect, ValueKind,
};
use pretty_assertions::assert_eq;

use crate::errors::{DebugInfoErrorKind, ErrorContext};
use crate::output::DebugValue;
use crate::policy::BackendPolicy;
use crate::test_helpers::{var, Fixture};
use crate::{DebugInfoConfig, RegisterValue};

/// Keeps the monitor of lock 1 in a dedicated register.
struct MonitorRegisterPolicy;

impl BackendPolicy for MonitorRegisterPolicy {
    fn lock_value(&self, _graph: &Graph, _state: &FrameState, index: usize) -> Option<DebugValue> {
        (index == 1).then_some(DebugValue::Register(RegisterValue {
            number: 9,
            kind: ValueKind::Object,
        }))
    }
}

#[test]
fn slots_are_laid_out_locals_stack_locks() {
    let mut fx = Fixture::new();
    let i = fx.computed(ValueKind::Int);
    let l = fx.computed(ValueKind::Long);
    let c = fx.constant(Constant::Int(7));
    let lock = fx.computed(ValueKind::Object);
    let state = fx
        .state(Bci::At(12))
        .with_locals([Some(i), Some(l), None])
        .with_stack([Some(c)])
        .with_locks([lock]);
    let state = fx.add_state(state);

    let mut builder = fx.builder();
    let frame = builder.compute_frame(state, 0).unwrap();
    assert_eq!(frame.method, fx.method);
    assert_eq!(frame.bci, Bci::At(12));
    assert_eq!((frame.num_locals, frame.num_stack, frame.num_locks), (3, 1, 1));
    assert_eq!(
        frame.locals(),
        &[var(i, ValueKind::Int), var(l, ValueKind::Long), DebugValue::Illegal]
    );
    assert_eq!(frame.stack(), &[DebugValue::Constant(Constant::Int(7))]);
    assert_eq!(frame.locks(), &[var(lock, ValueKind::Object)]);
    assert_eq!(
        frame.local_kinds(),
        &[ValueKind::Int, ValueKind::Long, ValueKind::Illegal]
    );
    assert_eq!(frame.stack_kinds(), &[ValueKind::Int]);
    assert!(frame.caller().is_none());
}

#[test]
fn policy_can_override_a_lock_value() {
    let mut fx = Fixture::new();
    let first = fx.computed(ValueKind::Object);
    let second = fx.computed(ValueKind::Object);
    let state = fx.state(Bci::At(4)).with_locks([first, second]);
    let state = fx.add_state(state);

    let mut builder = fx.builder().with_policy(&MonitorRegisterPolicy);
    let frame = builder.compute_frame(state, 0).unwrap();
    assert_eq!(
        frame.locks(),
        &[
            var(first, ValueKind::Object),
            DebugValue::Register(RegisterValue {
                number: 9,
                kind: ValueKind::Object
            })
        ]
    );
}

#[test]
fn flags_are_copied() {
    let mut fx = Fixture::new();
    let mut state = fx.state(Bci::At(2));
    state.rethrow_exception = true;
    state.during_call = true;
    let state = fx.add_state(state);

    let frame = fx.builder().compute_frame(state, 0).unwrap();
    assert!(frame.rethrow_exception);
    assert!(frame.during_call);
}

#[test]
fn callers_are_linked_outward() {
    let mut fx = Fixture::new();
    let caller_method = fx.methods.add("Outer", "call", MethodFlags::empty());
    let arg = fx.computed(ValueKind::Object);
    let outer = FrameState::new(&fx.methods, caller_method, Bci::At(30)).with_stack([Some(arg)]);
    let outer = fx.add_state(outer);
    let inner = fx.state(Bci::At(4)).with_outer(outer);
    let inner = fx.add_state(inner);

    let frame = fx.builder().compute_frame(inner, 0).unwrap();
    assert_eq!(frame.depth(), 2);
    let caller = frame.caller().unwrap();
    assert_eq!(caller.method, caller_method);
    assert_eq!(caller.bci, Bci::At(30));
    assert_eq!(caller.stack(), &[var(arg, ValueKind::Object)]);
}

#[test]
fn undefined_bci_is_rejected() {
    let mut fx = Fixture::new();
    let state = fx.state(Bci::Unknown);
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::UndefinedBci { bci: Bci::Unknown }
    );
    assert_eq!(err.context(), &[ErrorContext::FrameState(state)]);
}

#[test]
fn locks_at_call_boundary_are_rejected() {
    let mut fx = Fixture::new();
    let lock = fx.computed(ValueKind::Object);
    let state = fx.state(Bci::AfterCall).with_locks([lock]);
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::LocksAtCallBoundary {
            bci: Bci::AfterCall,
            locks: 1
        }
    );
}

#[test]
fn synchronized_method_must_hold_its_monitor() {
    let mut fx = Fixture::new();
    let locked = fx.methods.add("Account", "deposit", MethodFlags::SYNCHRONIZED);
    let state = FrameState::new(&fx.methods, locked, Bci::At(8));
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::MissingMonitor {
            method: "Account.deposit".to_owned(),
            bci: Bci::At(8)
        }
    );
}

#[test]
fn synchronized_method_without_monitor_is_fine_where_exempt() {
    let mut fx = Fixture::new();
    let locked = fx.methods.add("Account", "deposit", MethodFlags::SYNCHRONIZED);
    let entry = FrameState::new(&fx.methods, locked, Bci::BeforeCall);
    let entry = fx.add_state(entry);
    let mut invalid = FrameState::new(&fx.methods, locked, Bci::At(8));
    invalid.valid_for_deoptimization = false;
    let invalid = fx.add_state(invalid);

    let mut builder = fx.builder();
    assert!(builder.compute_frame(entry, 0).is_ok());
    assert!(builder.compute_frame(invalid, 0).is_ok());
}

#[test]
fn malformed_state_is_rejected() {
    let mut fx = Fixture::new();
    let wide = fx.computed(ValueKind::Double);
    let next = fx.computed(ValueKind::Int);
    let state = fx.state(Bci::At(0)).with_locals([Some(wide), Some(next)]);
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::MalformedFrameState {
            defect: StateDefect::MissingSecondSlot {
                area: SlotArea::Local,
                index: 0
            }
        }
    );
}

#[test]
fn foreign_code_cannot_produce_a_frame() {
    let mut fx = Fixture::new();
    let snippet = fx.methods.add("Snippets", "arraycopy", MethodFlags::STATIC);
    let mut state = fx.state(Bci::At(5));
    state.code = Some(fx.methods.code_of(snippet));
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::CannotProduceFrame {
            location: "Snippets.arraycopy(bci 5)".to_owned()
        }
    );
}

#[test]
fn state_without_code_names_its_method() {
    let mut fx = Fixture::new();
    let mut state = fx.state(Bci::At(5));
    state.code = None;
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::CannotProduceFrame {
            location: format!("{state} of Test.run(bci 5)")
        }
    );
}

#[test]
fn unknown_code_names_its_method() {
    let mut fx = Fixture::new();
    let mut state = fx.state(Bci::At(1));
    state.code = Some(CodeId::new(99));
    let state = fx.add_state(state);

    let err = fx.builder().compute_frame(state, 0).unwrap_err();
    assert!(matches!(
        err.kind(),
        DebugInfoErrorKind::CannotProduceFrame { location } if location.ends_with("Test.run(bci 1)")
    ));
}

#[test]
fn caller_errors_carry_both_frame_states() {
    let mut fx = Fixture::new();
    let orphan = fx.graph.add_computed(ValueKind::Int);
    let outer = fx.state(Bci::At(3)).with_locals([Some(orphan)]);
    let outer = fx.add_state(outer);
    let inner = fx.state(Bci::At(0)).with_outer(outer);
    let inner = fx.add_state(inner);

    let err = fx.builder().compute_frame(inner, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::MissingLocation { value: orphan }
    );
    assert_eq!(
        err.context(),
        &[
            ErrorContext::Value(orphan),
            ErrorContext::FrameState(outer),
            ErrorContext::FrameState(inner),
        ]
    );
}

#[test]
fn frame_depth_is_bounded() {
    let mut fx = Fixture::new();
    let first = fx.state(Bci::At(0));
    let mut top = fx.add_state(first);
    for bci in 1..4 {
        let next = fx.state(Bci::At(bci)).with_outer(top);
        top = fx.add_state(next);
    }

    let mut builder = fx
        .builder()
        .with_config(DebugInfoConfig::default().with_max_inlining_depth(3));
    let err = builder.compute_frame(top, 0).unwrap_err();
    assert_eq!(
        err.kind(),
        &DebugInfoErrorKind::InliningTooDeep { limit: 3 }
    );
    assert_eq!(err.context().len(), 4);
}

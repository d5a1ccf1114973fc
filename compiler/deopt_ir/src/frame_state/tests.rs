use pretty_assertions::assert_eq;

use crate::{
    Bci, Constant, EscapeObjectState, FrameState, Graph, MethodFlags, MethodTable, SlotArea,
    StateDefect, TypePool, ValueKind,
};

#[test]
fn bci_raw_encoding() {
    for bci in [
        Bci::At(0),
        Bci::At(17),
        Bci::BeforeCall,
        Bci::AfterCall,
        Bci::AfterException,
        Bci::Unknown,
        Bci::Invalid,
    ] {
        assert_eq!(Bci::from_raw(bci.as_raw()), bci);
    }
    assert_eq!(Bci::AfterException.as_raw(), -4);
    assert_eq!(Bci::from_raw(-3), Bci::Invalid);
    assert!(Bci::AfterCall.is_call_boundary());
    assert!(!Bci::At(3).is_call_boundary());
    assert!(Bci::Unknown.is_undefined());
}

#[test]
fn outer_chain_walks_innermost_first() {
    let mut methods = MethodTable::new();
    let caller = methods.add("A", "caller", MethodFlags::empty());
    let callee = methods.add("A", "callee", MethodFlags::empty());
    let mut graph = Graph::new();
    let outer = graph.add_frame_state(FrameState::new(&methods, caller, Bci::At(4)));
    let inner = graph.add_frame_state(FrameState::new(&methods, callee, Bci::At(0)).with_outer(outer));

    let ids: Vec<_> = graph.outer_chain(inner).map(|(id, _)| id).collect();
    assert_eq!(ids, vec![inner, outer]);
}

#[test]
fn verify_accepts_two_slot_values_followed_by_empty_slot() {
    let mut methods = MethodTable::new();
    let m = methods.add("A", "m", MethodFlags::empty());
    let mut graph = Graph::new();
    let long = graph.add_constant(Constant::Long(3));
    let state = FrameState::new(&methods, m, Bci::At(0)).with_locals([Some(long), None]);
    assert_eq!(state.verify(&graph), Ok(()));
}

#[test]
fn verify_rejects_two_slot_value_without_empty_slot() {
    let mut methods = MethodTable::new();
    let m = methods.add("A", "m", MethodFlags::empty());
    let mut graph = Graph::new();
    let double = graph.add_computed(ValueKind::Double);
    let int = graph.add_constant(Constant::Int(1));

    let state = FrameState::new(&methods, m, Bci::At(0)).with_stack([Some(double), Some(int)]);
    assert_eq!(
        state.verify(&graph),
        Err(StateDefect::MissingSecondSlot {
            area: SlotArea::Stack,
            index: 0
        })
    );

    let state = FrameState::new(&methods, m, Bci::At(0)).with_locals([Some(double)]);
    assert!(state.verify(&graph).is_err());
}

#[test]
fn verify_rejects_primitive_locks() {
    let mut methods = MethodTable::new();
    let m = methods.add("A", "m", MethodFlags::empty());
    let mut graph = Graph::new();
    let int = graph.add_computed(ValueKind::Int);
    let state = FrameState::new(&methods, m, Bci::At(0)).with_locks([int]);
    assert_eq!(
        state.verify(&graph),
        Err(StateDefect::NonObjectLock {
            index: 0,
            kind: ValueKind::Int
        })
    );
}

#[test]
fn synthetic_code_cannot_produce_frame() {
    let mut methods = MethodTable::new();
    let m = methods.add("A", "m", MethodFlags::empty());
    let snippet = methods.add("Snippets", "arraycopy", MethodFlags::STATIC);
    let mut state = FrameState::new(&methods, m, Bci::At(0));
    assert!(state.can_produce_bytecode_frame(&methods));
    state.code = Some(methods.code_of(snippet));
    assert!(!state.can_produce_bytecode_frame(&methods));
    state.code = None;
    assert!(!state.can_produce_bytecode_frame(&methods));
}

#[test]
fn self_materialization_is_detected() {
    let mut pool = TypePool::new();
    let ty = pool.add_instance("Box", [("v", crate::TypeId::INT)]);
    let mut graph = Graph::new();
    let obj = graph.add_virtual_instance(ty);
    let real = graph.add_computed(ValueKind::Object);
    let degenerate = EscapeObjectState::Materialized { object: obj, value: obj };
    let real_state = EscapeObjectState::Materialized { object: obj, value: real };
    assert!(degenerate.is_self_materialization());
    assert!(!real_state.is_self_materialization());
    assert_eq!(real_state.object(), obj);
}

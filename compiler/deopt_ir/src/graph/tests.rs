use pretty_assertions::assert_eq;

use crate::{Constant, Graph, TypeId, TypePool, ValueKind, ValueOp};

#[test]
fn unproxify_strips_nested_proxies() {
    let mut graph = Graph::new();
    let c = graph.add_constant(Constant::Int(5));
    let p1 = graph.add_proxy(c);
    let p2 = graph.add_proxy(p1);
    assert_eq!(graph.unproxify(p2), c);
    assert_eq!(graph.unproxify(c), c);
    // Proxies are not constants themselves.
    assert_eq!(graph.as_constant(p2), None);
    assert_eq!(graph.as_constant(graph.unproxify(p2)), Some(Constant::Int(5)));
}

#[test]
fn stack_kinds() {
    let mut pool = TypePool::new();
    let point = pool.add_instance("Point", [("x", TypeId::INT)]);
    let mut graph = Graph::new();
    let b = graph.add_computed(ValueKind::Byte);
    let l = graph.add_constant(Constant::Long(1));
    let obj = graph.add_virtual_instance(point);
    let illegal = graph.add_constant(Constant::Illegal);
    assert_eq!(graph.stack_kind(b), ValueKind::Int);
    assert_eq!(graph.stack_kind(l), ValueKind::Long);
    assert_eq!(graph.stack_kind(obj), ValueKind::Object);
    assert_eq!(graph.stack_kind(illegal), ValueKind::Illegal);
    assert!(graph.is_illegal_marker(illegal));
    assert!(!graph.is_illegal_marker(l));
}

#[test]
fn virtual_object_shapes() {
    let mut pool = TypePool::new();
    let pair = pool.add_instance("Pair", [("a", TypeId::INT), ("b", TypeId::DOUBLE)]);
    let bytes = pool.array_of(TypeId::BYTE);
    let mut graph = Graph::new();
    let instance = graph.add_virtual_instance(pair);
    let array = graph.add_virtual_array(bytes, 6);

    let intrinsic = |ty| pool.intrinsic_kind(ty);
    let def = *graph.as_virtual_object(instance).unwrap();
    assert_eq!(def.entry_count(&pool), 2);
    assert_eq!(def.entry_kind(&pool, intrinsic, 1), ValueKind::Double);
    assert_eq!(def.entry_kind(&pool, intrinsic, 7), ValueKind::Illegal);
    assert!(!def.is_byte_array(&pool, intrinsic));

    let def = *graph.as_virtual_object(array).unwrap();
    assert_eq!(def.entry_count(&pool), 6);
    assert_eq!(def.entry_kind(&pool, intrinsic, 3), ValueKind::Byte);
    assert!(def.is_byte_array(&pool, intrinsic));
}

#[test]
fn boxes_are_flagged() {
    let mut pool = TypePool::new();
    let integer = pool.add_instance("Integer", [("value", TypeId::INT)]);
    let mut graph = Graph::new();
    let boxed = graph.add_virtual_box(integer);
    assert!(matches!(
        graph.value(boxed).op,
        ValueOp::VirtualObject(def) if def.auto_box
    ));
}

use pretty_assertions::assert_eq;

use super::{MethodFlags, MethodTable};

#[test]
fn methods_get_distinct_code() {
    let mut table = MethodTable::new();
    let a = table.add("Foo", "bar", MethodFlags::empty());
    let b = table.add("Foo", "baz", MethodFlags::STATIC);
    assert_ne!(table.code_of(a), table.code_of(b));
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.method_for_code(table.code_of(b)).map(|m| m.name.as_str()),
        Some("baz")
    );
}

#[test]
fn synchronized_flag() {
    let mut table = MethodTable::new();
    let plain = table.add("Foo", "plain", MethodFlags::empty());
    let locked = table.add("Foo", "locked", MethodFlags::SYNCHRONIZED | MethodFlags::STATIC);
    assert!(!table.get(plain).is_synchronized());
    assert!(table.get(locked).is_synchronized());
}

#[test]
fn stack_trace_element_format() {
    let mut table = MethodTable::new();
    let m = table.add("java.lang.String", "length", MethodFlags::empty());
    assert_eq!(
        table.get(m).stack_trace_element(7),
        "java.lang.String.length(bci 7)"
    );
}

use deopt_ir::{Constant, ValueId, ValueKind};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

use super::{Location, LocationMap, RegisterValue, StackSlot, Variable};

#[test]
fn hash_map_is_a_location_map() {
    let mut map = FxHashMap::default();
    let reg = Location::Register(RegisterValue {
        number: 3,
        kind: ValueKind::Long,
    });
    map.insert(ValueId::new(1), reg);
    assert_eq!(map.operand(ValueId::new(1)), Some(reg));
    assert_eq!(map.operand(ValueId::new(2)), None);
    assert_eq!((&map).operand(ValueId::new(1)), Some(reg));
}

#[test]
fn display() {
    let var = Location::Variable(Variable {
        index: 7,
        kind: ValueKind::Int,
    });
    let slot = Location::StackSlot(StackSlot {
        offset: 16,
        kind: ValueKind::Object,
    });
    assert_eq!(var.to_string(), "v7|I");
    assert_eq!(slot.to_string(), "stack:16|A");
    assert_eq!(Location::Constant(Constant::Int(2)).to_string(), "int[2]");
}

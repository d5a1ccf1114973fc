//! Virtual-object shape check.
//!
//! Confirms that a filled descriptor's slot kinds line up with the declared
//! layout of its type. A failure points at an optimizer bug upstream, never
//! at a runtime condition, so the builder only runs this when
//! [`DebugInfoConfig::verify_shapes`](crate::DebugInfoConfig) is set.

use deopt_ir::{FieldDef, TypeId, TypePool, ValueKind};

use crate::errors::{DebugInfoErrorKind, DebugInfoResult};
use crate::output::DebugValue;
use crate::policy::BackendPolicy;

/// Check `values`/`slot_kinds` against the declared layout of `ty`.
pub fn check_virtual_object_shape(
    types: &TypePool,
    policy: &dyn BackendPolicy,
    ty: TypeId,
    values: &[DebugValue],
    slot_kinds: &[ValueKind],
) -> DebugInfoResult<()> {
    let mismatch = |detail: String| -> DebugInfoResult<()> {
        Err(DebugInfoErrorKind::ShapeMismatch {
            ty: types.name(ty),
            detail,
        }
        .into())
    };

    if values.len() != slot_kinds.len() {
        return mismatch(format!(
            "{} values but {} slot kinds",
            values.len(),
            slot_kinds.len()
        ));
    }

    let storage = |t: TypeId| policy.storage_kind(types, t);
    let result = match types.component(ty) {
        Some(component) => check_array(storage(component), slot_kinds),
        None => check_instance(types.fields(ty), storage, slot_kinds),
    };
    match result {
        Ok(()) => Ok(()),
        Err(detail) => mismatch(detail),
    }
}

/// Walk fields in order, one slot per field. A 64-bit slot may cover two
/// consecutive `int`-stored fields (a long or double written across them).
fn check_instance(
    fields: &[FieldDef],
    storage: impl Fn(TypeId) -> ValueKind,
    slot_kinds: &[ValueKind],
) -> Result<(), String> {
    let mut field_index = 0;
    for (value_index, slot_kind) in slot_kinds.iter().enumerate() {
        let Some(field) = fields.get(field_index) else {
            return Err(format!(
                "not enough fields for value {value_index} ({} fields)",
                fields.len()
            ));
        };
        let value_kind = slot_kind.stack_kind();
        let field_kind = storage(field.ty);
        if matches!(value_kind, ValueKind::Long | ValueKind::Double) && field_kind == ValueKind::Int {
            let Some(next) = fields.get(field_index + 1) else {
                return Err(format!(
                    "{value_kind} value {value_index} at field {} has no second int field",
                    field.name
                ));
            };
            let next_kind = storage(next.ty);
            if next_kind != ValueKind::Int {
                return Err(format!(
                    "{value_kind} value {value_index} spills into field {} of kind {next_kind}",
                    next.name
                ));
            }
            field_index += 1;
        } else if value_kind != field_kind.stack_kind() {
            return Err(format!(
                "{}: {value_kind} != {}",
                field.name,
                field_kind.stack_kind()
            ));
        }
        field_index += 1;
    }
    if field_index != fields.len() {
        return Err(format!(
            "{} fields but values cover {field_index}",
            fields.len()
        ));
    }
    Ok(())
}

/// Every element matches the component's stack kind. Byte arrays may hold
/// illegal placeholders, and a primitive component may absorb a narrower or
/// (for `int`-widened components) wider primitive write.
fn check_array(declared: ValueKind, slot_kinds: &[ValueKind]) -> Result<(), String> {
    let component_kind = declared.stack_kind();
    for (index, &slot_kind) in slot_kinds.iter().enumerate() {
        let ok = if component_kind.is_object() {
            slot_kind.is_object()
        } else {
            slot_kind == component_kind
                || (slot_kind == ValueKind::Illegal && declared == ValueKind::Byte)
                || (slot_kind.is_primitive()
                    && (component_kind.bit_count() >= slot_kind.bit_count()
                        || (component_kind == ValueKind::Int
                            && slot_kind.bit_count() >= ValueKind::Int.bit_count())))
        };
        if !ok {
            return Err(format!("element {index}: {slot_kind} != {component_kind}"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]

//! The value combinator (§4.1): the recursive entry point every other
//! combinator bottoms out through, and the crate's public `merge` function.

use super::array::merge_array;
use super::object::merge_object;
use super::value::Value;
use crate::core::{DdmError, Options, Result};

/// Merge a base document with a single override layer.
///
/// `base`/`overlay` of `None` are normalized to [`Value::Null`] before
/// dispatch, per §4.1 rule 1 — an absent layer and an explicit `null` layer
/// are equivalent inputs to the combinator. To merge a sequence of layers,
/// call this once per override layer, feeding each result in as the next
/// call's `base`.
pub fn merge(base: Option<Value>, overlay: Option<Value>, options: &Options) -> Result<Option<Value>> {
    // §8 invariant 1: an absent override produces an absent result outright,
    // independent of base — distinct from an override that is *present* and
    // happens to be the JSON literal `null`, which still yields `Some(Null)`.
    let Some(overlay) = overlay else {
        return Ok(None);
    };
    let base = base.unwrap_or(Value::Null);
    merge_value(base, overlay, options, 0).map(Some)
}

/// The recursive value combinator. Both arguments are always present here —
/// absence is resolved to `Value::Null` by `merge` before the first call, and
/// every recursive call below passes an owned, already-present `Value`.
pub(crate) fn merge_value(base: Value, overlay: Value, options: &Options, depth: usize) -> Result<Value> {
    if let Some(limit) = options.max_depth {
        if depth > limit {
            return Err(DdmError::DepthExceeded { limit });
        }
    }

    // Rule 1 — absent/null override: result is null.
    if overlay.is_null() {
        return Ok(Value::Null);
    }

    // Rule 2 — a value-key wrapper discards base and siblings outright.
    if let Value::Object(obj) = &overlay {
        if let Some(wrapped) = obj.get(&options.value_key) {
            return Ok(wrapped.clone());
        }
    }

    // Rule 3 — a primitive override always wins, regardless of base's type.
    if overlay.is_scalar() {
        return Ok(overlay);
    }

    match (base, overlay) {
        // Rules 6/7 — matching composite types dispatch to their combinator.
        (Value::Object(b), Value::Object(o)) => merge_object(b, o, options, depth, merge_value),
        (Value::Array(b), Value::Array(o)) => merge_array(b, o, options, depth, merge_value),

        // Rules 4/5/8 — base absent/null/primitive, or a composite-type
        // mismatch: route by the override's own type against an empty
        // counterpart, so control keys still get processed and stripped.
        (_, Value::Object(o)) => merge_object(indexmap::IndexMap::new(), o, options, depth, merge_value),
        (_, Value::Array(o)) => merge_array(Vec::new(), o, options, depth, merge_value),

        // Unreachable: overlay was already proven scalar above and handled.
        (_, overlay) => Ok(overlay),
    }
}

//! The object combinator (§4.2): deep-merges two objects by key, collecting
//! and applying reorder requests and deletions along the way.

use super::control::{strip_position_anchor_patch, unescape_key, Directive, Move};
use super::reorder::apply_moves;
use super::value::Value;
use crate::core::{Options, Result};
use indexmap::IndexMap;

/// Merge base object `b` with override object `o`, per §4.2 phases 1–3.
///
/// `merge_value` is the recursive value combinator (§4.1), passed in to avoid
/// a circular module dependency between `object` and the top-level dispatch.
pub(crate) fn merge_object(
    b: IndexMap<String, Value>,
    o: IndexMap<String, Value>,
    options: &Options,
    depth: usize,
    merge_value: impl Fn(Value, Value, &Options, usize) -> Result<Value> + Copy,
) -> Result<Value> {
    // Phase 1 — initialize: R is a deep copy of B (owned, since we took B by
    // value), preserving key order.
    let mut result: IndexMap<String, Value> = b;
    let mut moves: Vec<Move> = Vec::new();

    // Phase 2 — per-key scan of O in insertion order.
    for (k_raw, v) in o {
        let k = unescape_key(&k_raw, options);
        let directive = Directive::scan(&v, options);

        if let Some(mv) = directive.to_move(k.clone()) {
            moves.push(mv);
        }

        if directive.is_delete {
            result.shift_remove(&k);
            continue;
        }

        if result.contains_key(&k) {
            // Update the slot in place via `mem::replace` rather than
            // shift_remove-then-insert — the latter would re-append the key
            // at the end of the map, losing the original key order that §3
            // requires a plain value update to preserve.
            let slot = result.get_mut(&k).expect("checked contains_key above");
            let base_val = std::mem::replace(slot, Value::Null);
            let resolved = if base_val.is_scalar()
                && v.is_object()
                && !directive.has_value_key
                && directive.has_reorder_or_patch_metadata()
            {
                // Primitive-preservation rule: base primitive survives, the
                // move (already recorded above) carries the reorder.
                base_val
            } else {
                let v_stripped = strip_position_anchor_patch(&v, options);
                merge_value(base_val, v_stripped, options, depth + 1)?
            };
            *result.get_mut(&k).expect("slot still present") = resolved;
        } else if v.is_null() {
            result.insert(k, Value::Null);
        } else {
            let v_stripped = strip_position_anchor_patch(&v, options);
            let merged = merge_value(Value::empty_object(), v_stripped, options, depth + 1)?;
            result.insert(k, merged);
        }
    }

    // Phase 3 — object reorder pass, anchors resolved by key name.
    let ordered: Vec<(String, Value)> = result.into_iter().collect();
    let reordered = apply_moves(ordered, moves, options)?;
    Ok(Value::Object(reordered.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::deep::merge_value;

    fn run(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
        let base: Value = base.into();
        let overlay: Value = overlay.into();
        let options = Options::default();
        let result = merge_value(base, overlay, &options, 0).unwrap();
        result.into()
    }

    #[test]
    fn test_simple_key_merge() {
        let result = run(
            serde_json::json!({"a": 1, "b": 2}),
            serde_json::json!({"b": 3, "c": 4}),
        );
        assert_eq!(result, serde_json::json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_key_order_preserved_on_plain_value_update() {
        // §3 invariant: updating a key's value in place must not shift it to
        // the end of the map in the absence of an explicit reorder directive.
        let result = run(
            serde_json::json!({"a": 1, "b": 2, "c": 3}),
            serde_json::json!({"b": 99}),
        );
        let keys: Vec<&str> = result.as_object().unwrap().keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(result, serde_json::json!({"a": 1, "b": 99, "c": 3}));
    }

    #[test]
    fn test_nested_merge() {
        let result = run(
            serde_json::json!({"outer": {"inner1": "a", "inner2": "b"}}),
            serde_json::json!({"outer": {"inner2": "B", "inner3": "c"}}),
        );
        assert_eq!(
            result,
            serde_json::json!({"outer": {"inner1": "a", "inner2": "B", "inner3": "c"}})
        );
    }

    #[test]
    fn test_delete_erases_key_preserves_order_s3() {
        let result = run(
            serde_json::json!({"a": 1, "b": 2}),
            serde_json::json!({"a": {"$patch": "delete"}}),
        );
        assert_eq!(result, serde_json::json!({"b": 2}));
    }

    #[test]
    fn test_escaped_control_key_becomes_literal_s4() {
        let result = run(
            serde_json::json!({"data": 1}),
            serde_json::json!({"$$patch": "not a patch"}),
        );
        assert_eq!(result, serde_json::json!({"data": 1, "$patch": "not a patch"}));
    }

    #[test]
    fn test_primitive_preserved_by_metadata_only_override_s6() {
        let result = run(
            serde_json::json!({"a": 1, "b": 2}),
            serde_json::json!({"b": {"$position": "start"}}),
        );
        let obj = result.as_object().unwrap();
        let keys: Vec<&str> = obj.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(obj.get("b").unwrap(), &serde_json::json!(2));
    }

    #[test]
    fn test_nested_reorder_with_value_extraction_s1() {
        let result = run(
            serde_json::json!({"theme": {"primary": "#000", "secondary": "#fff"}}),
            serde_json::json!({"theme": {"secondary": {"$value": "#ccc", "$position": "before", "$anchor": "primary"}}}),
        );
        let theme = result.get("theme").unwrap().as_object().unwrap();
        let keys: Vec<&str> = theme.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["secondary", "primary"]);
        assert_eq!(theme.get("secondary").unwrap(), &serde_json::json!("#ccc"));
        assert_eq!(theme.get("primary").unwrap(), &serde_json::json!("#000"));
    }

    #[test]
    fn test_new_key_metadata_only_retained_as_value() {
        // §9 Open Question: this spec retains a bare metadata-only object
        // introduced for a brand-new key (no base counterpart) as the value.
        let result = run(
            serde_json::json!({}),
            serde_json::json!({"x": {"$position": "start"}}),
        );
        assert_eq!(result, serde_json::json!({"x": {"$position": "start"}}));
    }

    #[test]
    fn test_null_override_on_existing_key_sets_null() {
        // §4.1 rule 1: a null override resolves to the null value itself, not
        // a deletion — only an explicit $patch: "delete" marker removes a key.
        let result = run(
            serde_json::json!({"a": 1, "b": 2}),
            serde_json::json!({"a": null}),
        );
        assert_eq!(result, serde_json::json!({"a": null, "b": 2}));
    }

    #[test]
    fn test_null_override_on_new_key_is_null() {
        let result = run(serde_json::json!({}), serde_json::json!({"a": null}));
        assert_eq!(result, serde_json::json!({"a": null}));
    }

    #[test]
    fn test_empty_override_is_identity() {
        let base = serde_json::json!({"a": 1, "b": {"c": 2}});
        let result = run(base.clone(), serde_json::json!({}));
        assert_eq!(result, base);
    }

    #[test]
    fn test_value_wrapper_extracted_sibling_controls_discarded() {
        let result = run(
            serde_json::json!({"a": 1}),
            serde_json::json!({"a": {"$value": {"nested": true}, "$position": "start", "$anchor": "z"}}),
        );
        assert_eq!(result, serde_json::json!({"a": {"nested": true}}));
    }
}

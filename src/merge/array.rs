//! The array combinator (§4.3): aligns override items onto base items by
//! declared identity rather than position, then applies appends, deletes,
//! and reorders.

use super::control::{identity, strip_controls, Directive, Move};
use super::reorder::apply_moves;
use super::value::Value;
use crate::core::{Options, Result};
use std::collections::HashMap;

/// Prefix used for the synthetic subject key assigned to an anonymous array
/// item (one with no well-formed identity). Anonymous items can still be the
/// *subject* of a move — an override can carry `$position`/`$anchor` on a
/// brand-new anonymous item — but can never be referenced as an *anchor*,
/// since other items have no way to name them. The prefix makes collision
/// with a real identity string vanishingly unlikely without requiring a
/// reserved-character ban on identities themselves.
const SYNTHETIC_PREFIX: &str = "\0ddm-anon-";

/// Merge base array `b` with override array `o`, per §4.3 phases 1–5.
pub(crate) fn merge_array(
    b: Vec<Value>,
    o: Vec<Value>,
    options: &Options,
    depth: usize,
    merge_value: impl Fn(Value, Value, &Options, usize) -> Result<Value> + Copy,
) -> Result<Value> {
    let mut synthetic_seq: usize = 0;
    let mut next_synthetic = || {
        synthetic_seq += 1;
        format!("{SYNTHETIC_PREFIX}{synthetic_seq}")
    };

    // Phase 1 — index base items by identity. Each slot carries the stable
    // key the reorder engine will use to find it: its identity, or a
    // synthetic key for anonymous items (never referenceable as an anchor,
    // but still needing a handle of its own).
    let mut base_by_id: HashMap<String, usize> = HashMap::with_capacity(b.len());
    let mut slots: Vec<Option<(String, Value)>> = Vec::with_capacity(b.len());
    for item in b {
        let key = identity(&item, options)
            .map(str::to_string)
            .unwrap_or_else(&mut next_synthetic);
        if let Some(id) = identity(&item, options) {
            // §7: duplicate identities in base → first occurrence wins the
            // index, mirroring the same `.entry().or_insert()` pattern the
            // reorder engine uses to build its identity→index map.
            base_by_id.entry(id.to_string()).or_insert(slots.len());
        }
        slots.push(Some((key, item)));
    }

    let mut appended: Vec<(String, Value)> = Vec::new();
    let mut moves: Vec<Move> = Vec::new();

    // Phase 2 — align override items onto base by identity.
    for item in o {
        let directive = Directive::scan(&item, options);
        let id = identity(&item, options);

        match id.and_then(|id| base_by_id.get(id).copied()) {
            Some(base_idx) => {
                let key = id.expect("matched via identity").to_string();
                if let Some(mv) = directive.to_move(key.clone()) {
                    moves.push(mv);
                }
                if directive.is_delete {
                    slots[base_idx] = None;
                } else {
                    // A prior override item in this same layer may already have
                    // deleted this identity (duplicate `$id`s in one override
                    // array); treat that as no base counterpart rather than
                    // panicking on an already-consumed slot.
                    let base_item = slots[base_idx].take().map(|(_, v)| v).unwrap_or(Value::empty_object());
                    let merged = merge_value(base_item, item, options, depth + 1)?;
                    slots[base_idx] = Some((key, merged));
                }
            }
            None => {
                let key = id.map(str::to_string).unwrap_or_else(&mut next_synthetic);
                if let Some(mv) = directive.to_move(key.clone()) {
                    moves.push(mv);
                }
                if directive.is_delete {
                    // Deleting an item never present in base is a no-op.
                    continue;
                }
                let merged = merge_value(Value::empty_object(), item, options, depth + 1)?;
                appended.push((key, merged));
            }
        }
    }

    // Phase 3 — materialize surviving base items (tombstoned slots dropped)
    // in original order, followed by appended items.
    let mut materialized: Vec<(String, Value)> = Vec::with_capacity(slots.len() + appended.len());
    materialized.extend(slots.into_iter().flatten());
    materialized.extend(appended);

    // Phase 4 — reorder pass over the materialized sequence.
    let reordered = apply_moves(materialized, moves, options)?;

    // Phase 5 — strip position/anchor/patch from every surviving object item.
    let out: Vec<Value> = reordered
        .into_iter()
        .map(|(_, v)| strip_controls(&v, options))
        .collect();

    Ok(Value::Array(out))
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
    fn test_array_identity_merge_preserves_unmatched_items() {
        let result = run(
            serde_json::json!([{"$id": "a", "v": 1}, {"$id": "b", "v": 2}]),
            serde_json::json!([{"$id": "a", "v": 10}]),
        );
        assert_eq!(
            result,
            serde_json::json!([{"$id": "a", "v": 10}, {"$id": "b", "v": 2}])
        );
    }

    #[test]
    fn test_array_identity_merge_appends_new_item_s2() {
        let result = run(
            serde_json::json!([{"$id": "weather"}, {"$id": "clock"}]),
            serde_json::json!([{"$id": "news"}]),
        );
        assert_eq!(
            result,
            serde_json::json!([{"$id": "weather"}, {"$id": "clock"}, {"$id": "news"}])
        );
    }

    #[test]
    fn test_array_reorder_move_to_start_s2() {
        let result = run(
            serde_json::json!([{"$id": "weather"}, {"$id": "clock"}, {"$id": "news"}]),
            serde_json::json!([{"$id": "clock", "$position": "start"}]),
        );
        assert_eq!(
            result,
            serde_json::json!([{"$id": "clock"}, {"$id": "weather"}, {"$id": "news"}])
        );
    }

    #[test]
    fn test_array_delete_by_identity() {
        let result = run(
            serde_json::json!([{"$id": "a"}, {"$id": "b"}]),
            serde_json::json!([{"$id": "a", "$patch": "delete"}]),
        );
        assert_eq!(result, serde_json::json!([{"$id": "b"}]));
    }

    #[test]
    fn test_array_delete_of_absent_item_is_noop() {
        let result = run(
            serde_json::json!([{"$id": "a"}]),
            serde_json::json!([{"$id": "ghost", "$patch": "delete"}]),
        );
        assert_eq!(result, serde_json::json!([{"$id": "a"}]));
    }

    #[test]
    fn test_array_anonymous_items_never_positionally_matched() {
        // Anonymous items (no identity key) always append; they can never
        // align against a base item since identity is the only alignment key.
        let result = run(serde_json::json!([1, 2]), serde_json::json!([3]));
        assert_eq!(result, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_array_anonymous_new_item_with_position_is_placed() {
        let result = run(
            serde_json::json!([{"$id": "a"}, {"$id": "b"}]),
            serde_json::json!([{"v": "anon", "$position": "start"}]),
        );
        assert_eq!(
            result,
            serde_json::json!([{"v": "anon"}, {"$id": "a"}, {"$id": "b"}])
        );
    }

    #[test]
    fn test_array_control_keys_stripped_from_output() {
        let result = run(
            serde_json::json!([{"$id": "a"}]),
            serde_json::json!([{"$id": "a", "$position": "start", "$anchor": "x"}]),
        );
        assert_eq!(result, serde_json::json!([{"$id": "a"}]));
    }

    #[test]
    fn test_array_empty_override_is_identity() {
        let base = serde_json::json!([{"$id": "a"}, {"$id": "b"}]);
        let result = run(base.clone(), serde_json::json!([]));
        assert_eq!(result, base);
    }

    #[test]
    fn test_array_reorder_before_anchor() {
        let result = run(
            serde_json::json!([{"$id": "a"}, {"$id": "b"}, {"$id": "c"}]),
            serde_json::json!([{"$id": "c", "$position": "before", "$anchor": "a"}]),
        );
        assert_eq!(
            result,
            serde_json::json!([{"$id": "c"}, {"$id": "a"}, {"$id": "b"}])
        );
    }

    #[test]
    fn test_array_escaped_identity_key_merged_as_literal() {
        let result = run(
            serde_json::json!([]),
            serde_json::json!([{"$$id": "literal"}]),
        );
        assert_eq!(result, serde_json::json!([{"$id": "literal"}]));
    }

    #[test]
    fn test_array_duplicate_base_identity_first_occurrence_wins_s7() {
        // §7: "duplicate identities in base → first occurrence wins the
        // index." The override must update the first slot, leaving the
        // second (shadowed) slot with the same identity untouched.
        let result = run(
            serde_json::json!([{"$id": "a", "v": 1}, {"$id": "a", "v": 2}]),
            serde_json::json!([{"$id": "a", "v": 99}]),
        );
        assert_eq!(
            result,
            serde_json::json!([{"$id": "a", "v": 99}, {"$id": "a", "v": 2}])
        );
    }

    #[test]
    fn test_array_duplicate_override_identity_delete_then_reuse_does_not_panic() {
        // A malformed but plausible override: the same identity appears twice
        // in one override array, first deleting the base item, then reusing
        // the identity for fresh data. The second occurrence must not panic
        // on the already-consumed base slot.
        let result = run(
            serde_json::json!([{"$id": "a", "v": 1}]),
            serde_json::json!([
                {"$id": "a", "$patch": "delete"},
                {"$id": "a", "v": 2}
            ]),
        );
        assert_eq!(result, serde_json::json!([{"$id": "a", "v": 2}]));
    }
}

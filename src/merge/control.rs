//! Identity, control-directive, and key-escape helpers (§4.5).
//!
//! These are the leaves of the pipeline described in §2: every other
//! combinator calls into this module rather than re-deriving identity or
//! control-key state itself.

use super::value::Value;
use crate::core::Options;

/// The literal string that marks a delete directive in the patch key.
pub const DELETE_MARKER: &str = "delete";

/// Returns the string at `v[id_key]` iff `v` is an object and the entry is a
/// string. Anonymous objects (no well-formed identity) return `None` and
/// never match during array alignment (§3 invariant).
pub fn identity<'a>(v: &'a Value, options: &Options) -> Option<&'a str> {
    v.as_object()?.get(&options.id_key)?.as_str()
}

/// True iff `v` is an object whose patch-key entry is the literal string
/// `"delete"`.
pub fn is_delete_marker(v: &Value, options: &Options) -> bool {
    v.as_object()
        .and_then(|obj| obj.get(&options.patch_key))
        .and_then(Value::as_str)
        .map(|s| s == DELETE_MARKER)
        .unwrap_or(false)
}

/// The parsed reorder directive carried by an override object: a string
/// position and an optional anchor. Position values outside the spec's
/// vocabulary default to `"end"` per §4.4's tolerance rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    Start,
    End,
    Before,
    After,
}

impl Position {
    fn parse(raw: &str) -> Self {
        match raw {
            "start" => Position::Start,
            "before" => Position::Before,
            "after" => Position::After,
            // "end" and any unrecognized value degrade to "end" (§4.4).
            _ => Position::End,
        }
    }
}

/// A single recorded reorder request: the subject (identified by object key
/// name or array item identity, depending on caller), the target position,
/// and an optional anchor reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub subject: String,
    pub position: Position,
    pub anchor: Option<String>,
}

/// The control-directive state of a single override value, scanned once.
///
/// Scanning once and threading the result through the object/array
/// combinators avoids re-reading the same object's keys for move detection,
/// delete detection, and value-wrapper detection separately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directive {
    pub position: Option<Position>,
    pub anchor: Option<String>,
    pub is_delete: bool,
    pub has_value_key: bool,
}

impl Directive {
    /// Scan an override value for control directives. Returns the default
    /// (no directives) for non-object values.
    pub fn scan(v: &Value, options: &Options) -> Self {
        let Some(obj) = v.as_object() else {
            return Self::default();
        };
        let position = obj
            .get(&options.position_key)
            .and_then(Value::as_str)
            .map(Position::parse);
        let anchor = obj
            .get(&options.anchor_key)
            .and_then(Value::as_str)
            .map(str::to_string);
        let is_delete = obj
            .get(&options.patch_key)
            .and_then(Value::as_str)
            .map(|s| s == DELETE_MARKER)
            .unwrap_or(false);
        let has_value_key = obj.contains_key(&options.value_key);
        Self {
            position,
            anchor,
            is_delete,
            has_value_key,
        }
    }

    /// True iff this directive carries at least one of position, anchor, or
    /// patch — the trigger condition for the primitive-preservation rule
    /// (§4.2 phase 2, object combinator). Per the spec's conservative
    /// reading (§9 Open Questions), an anchor alone is sufficient; this
    /// specification does not narrow to "position present only".
    pub fn has_reorder_or_patch_metadata(&self) -> bool {
        self.position.is_some() || self.anchor.is_some() || self.is_delete
    }

    /// Build the `Move` this directive represents for `subject`, if it
    /// carries a position.
    pub fn to_move(&self, subject: impl Into<String>) -> Option<Move> {
        let position = self.position.clone()?;
        Some(Move {
            subject: subject.into(),
            position,
            anchor: self.anchor.clone(),
        })
    }
}

/// Returns a shallow copy of `v` with the position, anchor, and patch entries
/// removed. The value key is intentionally left in place — callers that need
/// it stripped do so separately, since §4.1 step 2 of the value combinator
/// must still observe it. Non-objects pass through unchanged.
pub fn strip_position_anchor_patch(v: &Value, options: &Options) -> Value {
    let Some(obj) = v.as_object() else {
        return v.clone();
    };
    let mut stripped = obj.clone();
    stripped.shift_remove(&options.position_key);
    stripped.shift_remove(&options.anchor_key);
    stripped.shift_remove(&options.patch_key);
    Value::Object(stripped)
}

/// Returns a shallow copy of `v` with the position, anchor, and patch entries
/// removed, matching `strip_position_anchor_patch` but additionally
/// consuming nothing from the value key — used when materializing final
/// output (§4.2 post-condition, §4.3 phase 5). Non-objects pass through
/// unchanged.
pub fn strip_controls(v: &Value, options: &Options) -> Value {
    strip_position_anchor_patch(v, options)
}

/// Collapse a leading doubled prefix on an object key, iff the options
/// configure a prefix character, the raw key has length >= 2, and its first
/// two characters are both the prefix character (§4.2 step 1, §4.5).
///
/// Only one level of doubling is stripped per merge: `"$$$id"` unescapes to
/// `"$$id"`.
pub fn unescape_key(k_raw: &str, options: &Options) -> String {
    let Some(prefix) = options.prefix_char() else {
        return k_raw.to_string();
    };
    let mut chars = k_raw.chars();
    let Some(first) = chars.next() else {
        return k_raw.to_string();
    };
    let Some(second) = chars.next() else {
        return k_raw.to_string();
    };
    if first == prefix && second == prefix {
        k_raw[first.len_utf8()..].to_string()
    } else {
        k_raw.to_string()
    }
}

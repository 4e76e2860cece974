//! Merge configuration: the set of control keys the engine recognizes.
//!
//! The control-key vocabulary is fully configurable so the engine can coexist
//! with arbitrary user data that happens to use the default names. The
//! `Options` struct is constructed once per merge sequence and threaded
//! immutably through every combinator call.

/// Identity-key configuration for a merge sequence.
///
/// Holds the five configurable control-key names plus the strict-anchor
/// policy. The prefix character used for key escaping (§4.2, §4.5) is
/// derived once from `id_key` and cached rather than recomputed per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Object key that carries an array item's identity. Default `$id`.
    pub id_key: String,
    /// Object key that carries a reorder directive's position. Default
    /// `$position`.
    pub position_key: String,
    /// Object key that carries a reorder directive's anchor reference.
    /// Default `$anchor`.
    pub anchor_key: String,
    /// Object key whose value `"delete"` marks a delete directive. Default
    /// `$patch`.
    pub patch_key: String,
    /// Object key that wraps an explicit replacement value. Default
    /// `$value`.
    pub value_key: String,
    /// When `true` (the default), a reorder directive naming an anchor that
    /// cannot be located fails with `DdmError::AnchorMissing`. When `false`,
    /// the subject is appended to the end instead.
    pub strict_anchor: bool,
    /// Maximum recursion depth the value combinator will descend before
    /// raising `DdmError::DepthExceeded`. `None` disables the bound.
    pub max_depth: Option<usize>,
    prefix_char: Option<char>,
}

/// Depth bound applied by `Options::default`.
///
/// Generous enough that no realistic configuration document comes close, but
/// finite so adversarial self-referential-looking input (which cannot
/// actually cycle, since JSON values are trees, but can still be absurdly
/// deep) cannot blow the stack.
pub const DEFAULT_MAX_DEPTH: usize = 512;

impl Options {
    /// Build an `Options` from explicit control-key names.
    ///
    /// The prefix character is derived once here: the first character of
    /// `id_key`, iff that character is not alphanumeric.
    pub fn new(
        id_key: impl Into<String>,
        position_key: impl Into<String>,
        anchor_key: impl Into<String>,
        patch_key: impl Into<String>,
        value_key: impl Into<String>,
        strict_anchor: bool,
    ) -> Self {
        let id_key = id_key.into();
        let prefix_char = derive_prefix_char(&id_key);
        Self {
            id_key,
            position_key: position_key.into(),
            anchor_key: anchor_key.into(),
            patch_key: patch_key.into(),
            value_key: value_key.into(),
            strict_anchor,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            prefix_char,
        }
    }

    /// The prefix character derived from `id_key`, if any.
    ///
    /// `None` when `id_key`'s first character is alphanumeric (or `id_key` is
    /// empty) — in that case the escape/unescape rule never fires.
    pub fn prefix_char(&self) -> Option<char> {
        self.prefix_char
    }

    /// Override `strict_anchor`, returning `self` for chaining.
    pub fn with_strict_anchor(mut self, strict_anchor: bool) -> Self {
        self.strict_anchor = strict_anchor;
        self
    }

    /// Override `max_depth`, returning `self` for chaining.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Override `id_key`, re-deriving the prefix character, returning `self`
    /// for chaining.
    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        let id_key = id_key.into();
        self.prefix_char = derive_prefix_char(&id_key);
        self.id_key = id_key;
        self
    }
}

fn derive_prefix_char(id_key: &str) -> Option<char> {
    let first = id_key.chars().next()?;
    (!first.is_alphanumeric()).then_some(first)
}

impl Default for Options {
    /// Defaults per §3: `$id`, `$position`, `$anchor`, `$patch`, `$value`,
    /// strict-anchor = true.
    fn default() -> Self {
        Self::new("$id", "$position", "$anchor", "$patch", "$value", true)
    }
}

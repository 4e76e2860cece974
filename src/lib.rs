//! Deterministic deep merge engine for layered JSON documents.
//!
//! Given a base document and a sequence of override layers, [`merge`] folds
//! each layer in turn into an accumulated result: objects merge by key,
//! arrays align items by a declared identity rather than position, and
//! override layers may reorder or delete keys/items declaratively. See
//! [`Options`] for the control-key vocabulary this is driven by.

pub mod core;
pub mod merge;

pub use core::{DdmError, Options, Result};
pub use merge::{merge, Value};

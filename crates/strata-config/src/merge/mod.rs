//! Deep merge of JSON values with per-field source tracking.
//!
//! The merge operates on raw [`serde_json::Value`] trees rather than
//! deserialized structs. This correctly handles "absent vs default": a key
//! missing from a layer never overrides a lower layer.

mod deep;
mod protect;
mod required;
mod types;

pub use deep::{deep_merge, deep_merge_tracking};
pub use protect::{ReservedKeyHit, find_reserved_key};
pub use required::missing_required;
pub use types::{ConfigLayer, FieldSources};

#[cfg(test)]
mod tests;

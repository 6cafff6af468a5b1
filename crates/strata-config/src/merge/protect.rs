use serde_json::Value;
use strata_core::path::{join_index, join_key};
use strata_core::reserved_prefix;

/// A reserved key found in an author-supplied layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKeyHit {
    /// Dotted path of the offending key, e.g. `tags.platform:owner`.
    pub path: String,
    /// The offending key.
    pub key: String,
    /// The reserved prefix it starts with.
    pub prefix: &'static str,
}

/// Find the first object key, at any depth, that starts with a reserved
/// prefix. Tag maps and plain configuration keys are treated alike.
#[must_use]
pub fn find_reserved_key(layer: &Value) -> Option<ReservedKeyHit> {
    walk(layer, "")
}

fn walk(val: &Value, prefix: &str) -> Option<ReservedKeyHit> {
    match val {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            let path = join_key(prefix, key);
            match reserved_prefix(key) {
                Some(reserved) => Some(ReservedKeyHit {
                    path,
                    key: key.clone(),
                    prefix: reserved,
                }),
                None => walk(child, &path),
            }
        }),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| walk(item, &join_index(prefix, i))),
        _ => None,
    }
}

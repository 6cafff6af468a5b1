use serde_json::Value;
use strata_core::path::join_key;

use super::{ConfigLayer, FieldSources};

/// Recursively deep-merge `overlay` into `base`.
///
/// - Objects merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Deep-merge `overlay` into `base`, recording which layer set each leaf
/// field. `prefix` is the dotted path of `base`; `""` at the root.
pub fn deep_merge_tracking(
    base: &mut Value,
    overlay: &Value,
    prefix: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let path = join_key(prefix, key);
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                    record_all_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            forget_below(prefix, sources);
            record_all_leaves(overlay, prefix, layer, sources);
        },
    }
}

/// Walk a value tree and record all leaf paths with their source layer.
/// Arrays are leaves.
fn record_all_leaves(val: &Value, prefix: &str, layer: ConfigLayer, sources: &mut FieldSources) {
    if let Value::Object(map) = val {
        for (key, child) in map {
            record_all_leaves(child, &join_key(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer);
    }
}

/// Drop recorded sources at or below `prefix`; the value there was replaced.
fn forget_below(prefix: &str, sources: &mut FieldSources) {
    let nested = format!("{prefix}.");
    sources.retain(|path, _| path != prefix && !path.starts_with(&nested));
}

//! Field path helpers.
//!
//! Paths are rendered the way manifest authors read them:
//! `components[0].binds[1].to`.

/// Append an object key to a dotted path.
#[must_use]
pub fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Append an array index to a path.
#[must_use]
pub fn join_index(prefix: &str, index: usize) -> String {
    format!("{prefix}[{index}]")
}

/// Convert a JSON pointer (`/components/0/name`) into a dotted path
/// (`components[0].name`). The root pointer renders as `<root>`.
#[must_use]
pub fn from_pointer(pointer: &str) -> String {
    let mut out = String::new();
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        if let Ok(index) = segment.parse::<usize>() {
            out = join_index(&out, index);
        } else {
            out = join_key(&out, &segment);
        }
    }
    if out.is_empty() {
        "<root>".to_owned()
    } else {
        out
    }
}

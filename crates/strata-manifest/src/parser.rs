//! Manifest text to tree.
//!
//! Pure syntax: no schema knowledge lives here. The only checks are that the
//! file can be read, is valid YAML, and has a mapping at the root.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;

/// Maximum allowed manifest size (1 MB).
pub const MAX_MANIFEST_SIZE: u64 = 1_048_576;

/// Read and parse the manifest at `path`.
///
/// The size is checked on the open handle before anything is read, and the
/// read itself stops one byte past the limit, so a file that grows between
/// the two is still rejected.
///
/// # Errors
///
/// Returns [`ParseError::Unreadable`] or [`ParseError::TooLarge`] when the
/// file cannot be used, and [`ParseError::Syntax`] or
/// [`ParseError::NotAnObject`] when its contents are not a YAML mapping.
pub fn parse(path: &Path) -> Result<Value, ParseError> {
    let display = path.display().to_string();
    let unreadable = |source| ParseError::Unreadable {
        path: display.clone(),
        source,
    };
    let too_large = |size| ParseError::TooLarge {
        path: display.clone(),
        size,
        limit: MAX_MANIFEST_SIZE,
    };

    let file = File::open(path).map_err(unreadable)?;
    let size = file.metadata().map_err(unreadable)?.len();
    if size > MAX_MANIFEST_SIZE {
        return Err(too_large(size));
    }

    let mut content = String::new();
    file.take(MAX_MANIFEST_SIZE.saturating_add(1))
        .read_to_string(&mut content)
        .map_err(unreadable)?;
    let read = content.len() as u64;
    if read > MAX_MANIFEST_SIZE {
        return Err(too_large(read));
    }

    parse_str(&display, &content)
}

/// Parse manifest text already in memory. `source` names the text in errors.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] for invalid YAML and
/// [`ParseError::NotAnObject`] when the root is not a mapping.
pub fn parse_str(source: &str, content: &str) -> Result<Value, ParseError> {
    let tree: Value = serde_yaml::from_str(content).map_err(|e| ParseError::Syntax {
        path: source.to_owned(),
        source: e,
    })?;

    if !tree.is_object() {
        return Err(ParseError::NotAnObject {
            path: source.to_owned(),
            found: kind_of(&tree),
        });
    }

    debug!(source, "parsed manifest");
    Ok(tree)
}

/// Short name for the kind of a JSON value, for error messages.
#[must_use]
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_mapping() {
        let tree = parse_str("<test>", "service: orders\nowner: team-a\n").unwrap();
        assert_eq!(tree["service"], "orders");
        assert_eq!(tree["owner"], "team-a");
    }

    #[test]
    fn test_parse_str_syntax_error() {
        let err = parse_str("<test>", "service: [unclosed\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_parse_str_non_object_root() {
        let err = parse_str("<test>", "- a\n- b\n").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject { found: "sequence", .. }));

        let err = parse_str("<test>", "just a string").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject { found: "string", .. }));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse(Path::new("/nonexistent/strata.yml")).unwrap_err();
        assert!(matches!(err, ParseError::Unreadable { .. }));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.yml");
        std::fs::write(&path, "service: orders\ncomponents: []\n").unwrap();

        let tree = parse(&path).unwrap();
        assert_eq!(tree["components"], Value::Array(Vec::new()));
    }

    #[test]
    fn test_oversized_manifest_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.yml");
        let data = "service: \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&path, data).unwrap();

        let result = parse(&path);
        assert!(
            matches!(result, Err(ParseError::TooLarge { .. })),
            "Expected TooLarge for oversized manifest, got: {result:?}"
        );
    }

    #[test]
    fn test_size_checked_before_reading() {
        // Not valid UTF-8: reading it first would fail as Unreadable.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.yml");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_MANIFEST_SIZE.saturating_add(4096)).unwrap();
        std::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, &[0xFF, 0xFE]))
            .unwrap();

        match parse(&path).unwrap_err() {
            ParseError::TooLarge { size, .. } => assert_eq!(size, MAX_MANIFEST_SIZE.saturating_add(4096)),
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_unquoted_date_stays_string() {
        let tree = parse_str("<test>", "expiresOn: 2030-01-01\n").unwrap();
        assert_eq!(tree["expiresOn"], "2030-01-01");
    }
}

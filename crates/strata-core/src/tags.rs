//! Reserved tag namespaces.
//!
//! Keys under these prefixes carry platform and governance intent. Only the
//! platform-controlled configuration layers may produce them.

/// Tag key prefixes that manifest authors may not set.
pub const RESERVED_TAG_PREFIXES: &[&str] = &["platform:", "compliance:", "governance:"];

/// Return the reserved prefix `key` starts with, if any.
#[must_use]
pub fn reserved_prefix(key: &str) -> Option<&'static str> {
    RESERVED_TAG_PREFIXES
        .iter()
        .copied()
        .find(|prefix| key.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_prefix() {
        assert_eq!(reserved_prefix("platform:cost-center"), Some("platform:"));
        assert_eq!(reserved_prefix("governance:owner"), Some("governance:"));
        assert_eq!(reserved_prefix("team"), None);
        // Prefix match is exact, including the colon.
        assert_eq!(reserved_prefix("platformish"), None);
    }
}

//! ID prefixes for generated entity identifiers.
//!
//! IDs have the form `{prefix}-{8 hex chars}`, e.g. `itm-a3f8b2c1`.

pub const PREFIX_ITEM: &str = "itm";
pub const PREFIX_EVIDENCE: &str = "evd";
pub const PREFIX_FINDING: &str = "fnd";
pub const PREFIX_AUDIT: &str = "aud";
pub const PREFIX_REANALYSIS: &str = "rea";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_ITEM,
    PREFIX_EVIDENCE,
    PREFIX_FINDING,
    PREFIX_AUDIT,
    PREFIX_REANALYSIS,
];

/// Whether `id` looks like `{prefix}-{8 hex}`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_generated_ids() {
        assert!(has_prefix("itm-a3f8b2c1", PREFIX_ITEM));
        assert!(!has_prefix("itm-a3f8b2c", PREFIX_ITEM));
        assert!(!has_prefix("evd-a3f8b2c1", PREFIX_ITEM));
        assert!(!has_prefix("itm-zzzzzzzz", PREFIX_ITEM));
    }

    #[test]
    fn prefixes_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for prefix in ALL_PREFIXES {
            assert!(seen.insert(*prefix), "duplicate prefix {prefix}");
        }
    }
}

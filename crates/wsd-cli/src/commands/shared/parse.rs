use serde::de::DeserializeOwned;

/// Parse a CLI value into a snake_case serde enum.
///
/// Case and `-`/`_` are not significant: `Nice-To-Have` reads as `nice_to_have`.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

#[cfg(test)]
mod tests {
    use wsd_core::enums::{EvidenceSource, Importance, ItemStatus};

    use super::parse_enum;

    #[test]
    fn parses_snake_case_enum() {
        let status: ItemStatus = parse_enum("obtained", "status").expect("status should parse");
        assert_eq!(status, ItemStatus::Obtained);
    }

    #[test]
    fn ignores_case_and_hyphens() {
        let importance: Importance =
            parse_enum(" Nice-To-Have ", "importance").expect("importance should parse");
        assert_eq!(importance, Importance::NiceToHave);
        let source: EvidenceSource = parse_enum("DOCUMENT", "source").expect("source should parse");
        assert_eq!(source, EvidenceSource::Document);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<EvidenceSource>("email", "source").expect_err("should fail");
        assert!(err.to_string().contains("invalid source 'email'"));
    }
}

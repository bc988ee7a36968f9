//! `system.extended_mode` (`spec.md` §6, §9's resolved Open Question).

use rde_protocol::ConfigError;

/// Recognized `extended_mode` values. Matching is case-sensitive on these
/// documented literals; any other non-null value is a `ConfigError`
/// (Design Note 9's resolved Open Question — the original tool mixed
/// case-sensitive and case-insensitive matching across code paths, this
/// implementation standardizes on case-sensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedMode {
    MultiDataTile,
    RdeFormat,
}

impl ExtendedMode {
    pub fn parse(raw: &str) -> Result<Option<Self>, ConfigError> {
        match raw {
            "MultiDataTile" => Ok(Some(ExtendedMode::MultiDataTile)),
            "rdeformat" => Ok(Some(ExtendedMode::RdeFormat)),
            other => Err(ConfigError::InvalidValue {
                field: "system.extended_mode".to_string(),
                value: other.to_string(),
                allowed: "null, \"MultiDataTile\", \"rdeformat\"".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_case_literals_parse() {
        assert_eq!(
            ExtendedMode::parse("MultiDataTile").unwrap(),
            Some(ExtendedMode::MultiDataTile)
        );
        assert_eq!(ExtendedMode::parse("rdeformat").unwrap(), Some(ExtendedMode::RdeFormat));
    }

    #[test]
    fn wrong_case_is_a_config_error() {
        assert!(ExtendedMode::parse("RDEFormat").is_err());
        assert!(ExtendedMode::parse("multidatatile").is_err());
    }

    #[test]
    fn unknown_value_is_a_config_error() {
        assert!(ExtendedMode::parse("bogus").is_err());
    }
}

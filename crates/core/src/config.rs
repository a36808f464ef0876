//! Environment variable helpers shared by every crate's config loader.

use std::str::FromStr;

/// A configuration value that is present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Read `var` and parse it, falling back to `default` when unset.
pub fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse a raw string for `var`.
pub fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_trimmed_value() {
        let secs: u64 = parse_value("TIMEOUT", " 45 ").unwrap();
        assert_eq!(secs, 45);
    }

    #[test]
    fn reports_variable_and_value_on_error() {
        let err = parse_value::<u64>("TIMEOUT", "soon").unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "TIMEOUT", ref value, .. } if value == "soon");
    }

    #[test]
    fn unset_variable_uses_default() {
        let value: u16 = env_or("RUSTPLAY_TEST_SURELY_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}

//! Environment variable parsing with warn-level logging for invalid values.
//!
//! Every function takes a lookup closure instead of reading `std::env`
//! directly so configuration can be assembled from any key/value source.

/// Read a variable, treating an empty or whitespace-only value as unset.
pub fn env_non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Parse a variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T, F>(lookup: &F, var: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match env_non_empty(lookup, var) {
        Some(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        None => default,
    }
}

/// Split a comma-separated list, dropping blank entries.
pub fn env_list<F>(lookup: &F, var: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    env_non_empty(lookup, var)
        .map(|v| {
            v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_parse_valid_value() {
        let lookup = lookup_from(&[("RETRIES", "42")]);
        let result: u32 = env_parse_with_default(&lookup, "RETRIES", 10);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let lookup = lookup_from(&[("RETRIES", "banana")]);
        let result: u32 = env_parse_with_default(&lookup, "RETRIES", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let lookup = lookup_from(&[]);
        let result: u32 = env_parse_with_default(&lookup, "RETRIES", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_parse_empty_value() {
        let lookup = lookup_from(&[("RETRIES", "  ")]);
        let result: u32 = env_parse_with_default(&lookup, "RETRIES", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_list_splits_and_trims() {
        let lookup = lookup_from(&[("TO", " a@example.com, ,b@example.com ")]);
        assert_eq!(env_list(&lookup, "TO"), vec!["a@example.com", "b@example.com"]);
        assert!(env_list(&lookup, "MISSING").is_empty());
    }
}

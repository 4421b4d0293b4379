//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_CACHE_SECONDS: u64 = 60;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Base URL of the Frankfurter API.
    pub frank_api: String,
    /// Currencies that may not be converted from or to.
    pub exclusion_list: Vec<String>,
    /// Zero disables caching.
    pub cache_ttl: Duration,
    pub cache_empty_results: bool,
    pub cache_single_flight: bool,
    pub upstream_timeout: Duration,
    pub upstream_max_retries: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let frank_api = lookup("FRANK_API")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("FRANK_API environment variable is required"))?;

        let exclusion_list = match lookup("CONVERT_EXCLUSION_LIST") {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .context("CONVERT_EXCLUSION_LIST must be a JSON array of currency codes")?,
            _ => Vec::new(),
        };

        let cache_ttl = cache_ttl(lookup("CACHE_DURATION_IN_SECONDS").as_deref());

        let cache_empty_results = flag(&lookup, "CACHE_EMPTY_RESULTS", true)?;
        let cache_single_flight = flag(&lookup, "CACHE_SINGLE_FLIGHT", false)?;

        let upstream_timeout = Duration::from_secs(
            lookup("UPSTREAM_TIMEOUT_SECONDS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("UPSTREAM_TIMEOUT_SECONDS must be a whole number of seconds")?,
        );
        let upstream_max_retries = lookup("UPSTREAM_MAX_RETRIES")
            .unwrap_or_else(|| "2".to_string())
            .parse()
            .context("UPSTREAM_MAX_RETRIES must be a non-negative integer")?;

        Ok(Self {
            port,
            frank_api,
            exclusion_list,
            cache_ttl,
            cache_empty_results,
            cache_single_flight,
            upstream_timeout,
            upstream_max_retries,
        })
    }
}

/// Absent or unparsable falls back to the default; non-positive turns caching off.
fn cache_ttl(raw: Option<&str>) -> Duration {
    match raw.map(|v| v.trim().parse::<i64>()) {
        Some(Ok(secs)) if secs <= 0 => Duration::ZERO,
        Some(Ok(secs)) => Duration::from_secs(secs.unsigned_abs()),
        Some(Err(_)) => {
            tracing::warn!(
                "CACHE_DURATION_IN_SECONDS is not a number, using {}s",
                DEFAULT_CACHE_SECONDS
            );
            Duration::from_secs(DEFAULT_CACHE_SECONDS)
        }
        None => Duration::from_secs(DEFAULT_CACHE_SECONDS),
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("{} must be true or false, got {:?}", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("FRANK_API", "https://api.frankfurter.app")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.frank_api, "https://api.frankfurter.app");
        assert!(config.exclusion_list.is_empty());
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert!(config.cache_empty_results);
        assert!(!config.cache_single_flight);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.upstream_max_retries, 2);
    }

    #[test]
    fn test_frank_api_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("FRANK_API"));
    }

    #[test]
    fn test_exclusion_list_is_json() {
        let config = load(&[
            ("FRANK_API", "http://localhost"),
            ("CONVERT_EXCLUSION_LIST", r#"["TRY","PLN","THB","MXN"]"#),
        ])
        .unwrap();

        assert_eq!(config.exclusion_list, vec!["TRY", "PLN", "THB", "MXN"]);
    }

    #[test]
    fn test_malformed_exclusion_list_fails() {
        let result = load(&[
            ("FRANK_API", "http://localhost"),
            ("CONVERT_EXCLUSION_LIST", "TRY,PLN"),
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_cache_duration() {
        assert_eq!(cache_ttl(Some("120")), Duration::from_secs(120));
        assert_eq!(cache_ttl(Some("0")), Duration::ZERO);
        assert_eq!(cache_ttl(Some("-5")), Duration::ZERO);
        assert_eq!(cache_ttl(Some("soon")), Duration::from_secs(60));
        assert_eq!(cache_ttl(None), Duration::from_secs(60));
    }

    #[test]
    fn test_flags() {
        let config = load(&[
            ("FRANK_API", "http://localhost"),
            ("CACHE_EMPTY_RESULTS", "false"),
            ("CACHE_SINGLE_FLIGHT", "TRUE"),
        ])
        .unwrap();

        assert!(!config.cache_empty_results);
        assert!(config.cache_single_flight);

        let bad = load(&[
            ("FRANK_API", "http://localhost"),
            ("CACHE_SINGLE_FLIGHT", "maybe"),
        ]);
        assert!(bad.is_err());
    }
}

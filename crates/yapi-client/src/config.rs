//! Connection configuration, loaded once from `--key=value` process arguments.

use crate::error::{ConfigError, ConfigIssue};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub const HOST_KEY: &str = "yapiHost";
pub const TOKEN_KEY: &str = "yapiToken";
pub const TIMEOUT_KEY: &str = "timeoutMs";
pub const RETRIES_KEY: &str = "retries";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_RETRIES: u32 = 2;

/// Validated connection settings. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub yapi_host: String,
    pub yapi_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first failed attempt.
    pub retries: u32,
}

impl Config {
    /// Config with default timeout and retry count.
    #[must_use]
    pub fn new(yapi_host: impl Into<String>, yapi_token: impl Into<String>) -> Self {
        Self {
            yapi_host: yapi_host.into(),
            yapi_token: yapi_token.into(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Validate parsed parameters, collecting every problem before failing.
    ///
    /// Only `yapiHost` and `yapiToken` are fatal. An unusable optional tuning value is logged
    /// and replaced by its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing each missing or empty required key once.
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();
        let yapi_host = required(params, HOST_KEY, &mut issues);
        let yapi_token = required(params, TOKEN_KEY, &mut issues);

        let timeout = optional(params, TIMEOUT_KEY, DEFAULT_TIMEOUT, |raw| {
            raw.trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        });
        let retries = optional(params, RETRIES_KEY, DEFAULT_RETRIES, |raw| {
            raw.trim().parse::<u32>().ok()
        });

        match (yapi_host, yapi_token) {
            (Some(yapi_host), Some(yapi_token)) => Ok(Self {
                yapi_host,
                yapi_token,
                timeout,
                retries,
            }),
            _ => Err(ConfigError::Invalid { issues }),
        }
    }

    /// True when both credentials are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.yapi_host.is_empty() && !self.yapi_token.is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("yapi_host", &self.yapi_host)
            .field("yapi_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish()
    }
}

/// Load and validate the configuration from the process arguments.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if a required key is missing or any key is invalid.
pub fn load_config() -> Result<Config, ConfigError> {
    let params = parse_cli_params(std::env::args().skip(1));
    Config::from_params(&params)
}

/// Collect `--key=value` tokens, splitting on the first `=`.
///
/// Malformed `--` tokens are skipped with a warning; other tokens are ignored.
pub fn parse_cli_params<I, S>(args: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = BTreeMap::new();
    for arg in args {
        let arg = arg.as_ref();
        let Some(rest) = arg.strip_prefix("--") else {
            continue;
        };
        match rest.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                params.insert(key.to_string(), value.to_string());
            }
            _ => tracing::warn!(argument = %arg, "malformed argument, expected --key=value"),
        }
    }
    params
}

fn required(
    params: &BTreeMap<String, String>,
    key: &str,
    issues: &mut Vec<ConfigIssue>,
) -> Option<String> {
    match params.get(key) {
        None => {
            issues.push(issue(key, "is required"));
            None
        }
        Some(v) if v.is_empty() => {
            issues.push(issue(key, "must not be empty"));
            None
        }
        Some(v) => Some(v.clone()),
    }
}

fn optional<T: fmt::Debug>(
    params: &BTreeMap<String, String>,
    key: &str,
    default: T,
    parse: impl FnOnce(&str) -> Option<T>,
) -> T {
    let Some(raw) = params.get(key) else {
        return default;
    };
    parse(raw).unwrap_or_else(|| {
        tracing::warn!(key, value = %raw, ?default, "ignoring invalid argument, using default");
        default
    })
}

fn issue(key: &str, problem: impl Into<String>) -> ConfigIssue {
    ConfigIssue {
        key: key.to_string(),
        problem: problem.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(args: &[&str]) -> BTreeMap<String, String> {
        parse_cli_params(args.iter().copied())
    }

    #[test]
    fn parses_well_formed_arguments() {
        let cfg = Config::from_params(&params(&[
            "--yapiHost=https://yapi.example.com",
            "--yapiToken=abc123",
        ]))
        .expect("valid config");
        assert_eq!(cfg.yapi_host, "https://yapi.example.com");
        assert_eq!(cfg.yapi_token, "abc123");
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
        assert_eq!(cfg.retries, DEFAULT_RETRIES);
    }

    #[test]
    fn splits_on_first_equals_only() {
        let p = params(&["--yapiToken=a=b=c", "positional", "-x=1"]);
        assert_eq!(p.get("yapiToken").map(String::as_str), Some("a=b=c"));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let p = params(&["--verbose", "--=nokey", "--yapiHost=http://h"]);
        assert_eq!(p.len(), 1);
        assert!(p.contains_key("yapiHost"));
    }

    #[test]
    fn missing_keys_are_all_reported_once() {
        let err = Config::from_params(&params(&[])).unwrap_err();
        let keys: Vec<&str> = err.issues().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec![HOST_KEY, TOKEN_KEY]);

        let msg = err.to_string();
        assert_eq!(msg.matches("yapiHost:").count(), 1);
        assert_eq!(msg.matches("yapiToken:").count(), 1);
        assert!(msg.ends_with(crate::error::USAGE_HINT));
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = Config::from_params(&params(&["--yapiHost=http://h", "--yapiToken="]))
            .unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].key, TOKEN_KEY);
        assert!(err.issues()[0].problem.contains("empty"));
    }

    #[test]
    fn any_non_empty_host_and_token_load_verbatim() {
        let cfg = Config::from_params(&params(&["--yapiHost=yapi.internal", "--yapiToken=t"]))
            .expect("valid config");
        assert_eq!(cfg.yapi_host, "yapi.internal");
        assert_eq!(cfg.yapi_token, "t");
    }

    #[test]
    fn invalid_tuning_values_fall_back_to_defaults() {
        let cfg = Config::from_params(&params(&[
            "--yapiHost=ftp://h",
            "--yapiToken=t",
            "--timeoutMs=0",
            "--retries=-1",
        ]))
        .expect("tuning values are not fatal");
        assert_eq!(cfg.yapi_host, "ftp://h");
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
        assert_eq!(cfg.retries, DEFAULT_RETRIES);
    }

    #[test]
    fn optional_tuning_keys_override_defaults() {
        let cfg = Config::from_params(&params(&[
            "--yapiHost=http://h",
            "--yapiToken=t",
            "--timeoutMs=1500",
            "--retries=0",
        ]))
        .expect("valid config");
        assert_eq!(cfg.timeout, Duration::from_millis(1500));
        assert_eq!(cfg.retries, 0);
    }

    #[test]
    fn debug_output_redacts_token() {
        let cfg = Config::new("http://h", "super-secret");
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }
}

//! Error types for the YApi client.

use thiserror::Error;

/// A single configuration problem, tied to the argument key it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub key: String,
    pub problem: String,
}

/// Startup configuration errors. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every invalid or missing key, collected in one pass.
    #[error("{}", render_issues(.issues))]
    Invalid { issues: Vec<ConfigIssue> },
}

impl ConfigError {
    #[must_use]
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            Self::Invalid { issues } => issues,
        }
    }
}

pub const USAGE_HINT: &str = "pass --yapiHost=<url> --yapiToken=<token> on the command line";

fn render_issues(issues: &[ConfigIssue]) -> String {
    let mut out = String::from("command line argument validation failed:");
    for issue in issues {
        out.push_str("\n- ");
        out.push_str(&issue.key);
        out.push_str(": ");
        out.push_str(&issue.problem);
    }
    out.push('\n');
    out.push_str(USAGE_HINT);
    out
}

/// Errors raised while fetching interface descriptors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Host or token missing at fetch time. Never retried.
    #[error("YApi configuration missing: check that yapiHost and yapiToken are passed")]
    ConfigMissing,

    /// Batch fetch called without ids. Never retried.
    #[error("apiIds must contain at least one interface id")]
    EmptyBatch,

    /// The host could not be combined with the interface path.
    #[error("invalid YApi host '{host}': {message}")]
    InvalidHost { host: String, message: String },

    /// Connect/timeout/body-read failure (URL redacted).
    #[error("YApi request failed: {0}")]
    Transport(String),

    /// Non-2xx HTTP status.
    #[error("YApi request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body absent or not a JSON object.
    #[error("YApi returned a malformed response: {body}")]
    MalformedResponse { body: String },

    /// Envelope has no `data` record.
    #[error("YApi response is missing data: {body}")]
    MissingData { body: String },

    /// `data` lacks `_id`, `title` or `path`.
    #[error("YApi interface descriptor is incomplete: {record}")]
    IncompleteDescriptor { record: String },
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

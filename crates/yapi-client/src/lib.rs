//! YApi interface descriptor client.
//!
//! Used by `yapi-mcp-server`; it holds no MCP logic:
//! - `config`: argv parsing and validation of the connection credentials
//! - `retry`: linear-backoff retry policy
//! - `fetch`: `GET /api/interface/get` with envelope validation, single and batch

pub mod config;
pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod retry;

pub use config::{Config, load_config};
pub use descriptor::{ApiDescriptor, ApiId};
pub use error::{ConfigError, ConfigIssue, FetchError, Result};
pub use fetch::YapiClient;
pub use retry::RetryPolicy;

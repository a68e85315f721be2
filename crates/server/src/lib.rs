//! MCP tool surface for YApi interface descriptors.
//!
//! - `format`: reshapes descriptors into the grouped, agent-readable layout
//! - `tools`: the rmcp `ServerHandler` exposing `yapi_get_api_desc` / `yapi_get_apis_detail`

pub mod format;
pub mod tools;

pub use tools::{SERVER_NAME, ToolOutcome, YapiServer};

//! MCP tools backed by the YApi descriptor fetcher.

use crate::format::{format_descriptor, format_descriptors};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, schemars, tool, tool_handler, tool_router};
use serde::Deserialize;
use yapi_mcp_client::{ApiId, FetchError, YapiClient};

pub const SERVER_NAME: &str = "YApi MCP Server";

/// Prefix of every in-band error message returned to the agent.
pub const ERROR_PREFIX: &str = "获取API接口出错: ";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetApiDescParams {
    /// YApi interface id; for the link /project/1/interface/api/66 the id is 66
    pub api_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetApisDetailParams {
    /// YApi interface ids (strings or numbers), at least one
    #[schemars(length(min = 1))]
    pub api_ids: Vec<ApiIdParam>,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum ApiIdParam {
    Text(String),
    Number(#[schemars(with = "f64")] serde_json::Number),
}

impl From<ApiIdParam> for ApiId {
    fn from(value: ApiIdParam) -> Self {
        match value {
            ApiIdParam::Text(s) => ApiId::Text(s),
            ApiIdParam::Number(n) => ApiId::Number(n),
        }
    }
}

/// Result of a tool call as seen by the agent.
///
/// Both variants become a successful `CallToolResult`; failures travel in-band as text so
/// hosts always receive a parseable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Json(String),
    Failed(String),
}

impl ToolOutcome {
    fn from_fetch<T>(
        tool: &str,
        result: Result<T, FetchError>,
        render: impl FnOnce(&T) -> serde_json::Result<String>,
    ) -> Self {
        let message = match result {
            Ok(value) => match render(&value) {
                Ok(text) => return Self::Json(text),
                Err(e) => format!("failed to serialize response: {e}"),
            },
            Err(e) => e.to_string(),
        };
        tracing::error!(tool, error = %message, "tool call failed");
        Self::Failed(message)
    }

    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Json(text) => text.clone(),
            Self::Failed(message) => format!("{ERROR_PREFIX}{message}"),
        }
    }

    #[must_use]
    pub fn into_call_result(self) -> CallToolResult {
        CallToolResult::success(vec![Content::text(self.text())])
    }
}

#[derive(Clone)]
pub struct YapiServer {
    client: YapiClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl YapiServer {
    #[must_use]
    pub fn new(client: YapiClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Fetch one descriptor and reshape it.
    pub async fn get_api_desc(&self, api_id: String) -> ToolOutcome {
        let id = ApiId::from(api_id);
        let result = self.client.fetch_one(&id).await;
        if let Ok(d) = &result {
            tracing::debug!(api_id = %id, descriptor = ?d, "fetched interface descriptor");
        }
        ToolOutcome::from_fetch("yapi_get_api_desc", result, format_descriptor)
    }

    /// Fetch several descriptors concurrently and reshape them, preserving order.
    pub async fn get_apis_detail(&self, api_ids: Vec<ApiIdParam>) -> ToolOutcome {
        let ids: Vec<ApiId> = api_ids.into_iter().map(ApiId::from).collect();
        let result = self.client.fetch_many(&ids).await;
        if let Ok(ds) = &result {
            tracing::debug!(count = ds.len(), "fetched interface descriptors");
        }
        ToolOutcome::from_fetch("yapi_get_apis_detail", result, |ds| format_descriptors(ds))
    }

    #[tool(name = "yapi_get_api_desc", description = "获取YApi接口详情")]
    async fn yapi_get_api_desc(
        &self,
        Parameters(GetApiDescParams { api_id }): Parameters<GetApiDescParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.get_api_desc(api_id).await.into_call_result())
    }

    #[tool(
        name = "yapi_get_apis_detail",
        description = "批量获取YApi接口详情，按传入顺序返回"
    )]
    async fn yapi_get_apis_detail(
        &self,
        Parameters(GetApisDetailParams { api_ids }): Parameters<GetApisDetailParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.get_apis_detail(api_ids).await.into_call_result())
    }
}

#[tool_handler]
impl ServerHandler for YapiServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            server_info,
            instructions: Some(
                "Look up YApi interface documentation. Use yapi_get_api_desc for one interface id \
                 and yapi_get_apis_detail for several."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::time::Duration;
    use yapi_mcp_client::Config;
    use yapi_mcp_test_support::{MockReply, MockYapi};

    fn server_for(mock: &MockYapi) -> YapiServer {
        let config = Config::new(mock.base_url(), "t0k");
        let client =
            YapiClient::new_with_base_delay(config, Duration::from_millis(1)).expect("client");
        YapiServer::new(client)
    }

    fn result_text(result: &CallToolResult) -> String {
        assert_eq!(result.content.len(), 1);
        assert_ne!(result.is_error, Some(true));
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .expect("text content")
    }

    #[tokio::test]
    async fn single_tool_returns_reshaped_json() {
        let mock = MockYapi::with_descriptors(vec![json!({
            "_id": 66, "title": "Get foo", "path": "/foo", "method": "GET"
        })])
        .await
        .expect("mock");
        let server = server_for(&mock);

        let result = server
            .yapi_get_api_desc(Parameters(GetApiDescParams {
                api_id: "66".to_string(),
            }))
            .await
            .expect("never an rpc error");
        let body: Value = serde_json::from_str(&result_text(&result)).expect("json");
        assert_eq!(body["基本信息"]["接口路径"], json!("/foo"));
        assert_eq!(body["基本信息"]["请求方式"], json!("GET"));
    }

    #[tokio::test]
    async fn failures_are_reported_in_band() {
        let mock = MockYapi::start(|_, _| MockReply::json(&json!({})))
            .await
            .expect("mock");
        let server = server_for(&mock);

        let result = server
            .yapi_get_api_desc(Parameters(GetApiDescParams {
                api_id: "1".to_string(),
            }))
            .await
            .expect("never an rpc error");
        let text = result_text(&result);
        assert!(text.starts_with(ERROR_PREFIX), "{text}");
        assert!(text.contains("missing data"), "{text}");
    }

    #[tokio::test]
    async fn empty_batch_is_reported_in_band_without_requests() {
        let mock = MockYapi::start(|_, _| MockReply::descriptor("1", "t", "/p"))
            .await
            .expect("mock");
        let server = server_for(&mock);

        let outcome = server.get_apis_detail(Vec::new()).await;
        assert!(matches!(outcome, ToolOutcome::Failed(_)));
        assert!(outcome.text().contains("at least one"));
        assert_eq!(mock.hit_count(), 0);
    }

    #[tokio::test]
    async fn batch_tool_accepts_mixed_id_types() {
        let mock = MockYapi::with_descriptors(vec![
            json!({"_id": 1, "title": "a", "path": "/a"}),
            json!({"_id": 2, "title": "b", "path": "/b"}),
        ])
        .await
        .expect("mock");
        let server = server_for(&mock);

        let params: GetApisDetailParams =
            serde_json::from_value(json!({"apiIds": [2, "1"]})).expect("params");
        let result = server
            .yapi_get_apis_detail(Parameters(params))
            .await
            .expect("never an rpc error");
        let body: Value = serde_json::from_str(&result_text(&result)).expect("json");
        let titles: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|v| v["基本信息"]["接口名称"].as_str())
            .collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn server_info_advertises_tools() {
        let client = YapiClient::new(Config::new("http://127.0.0.1:1", "t")).expect("client");
        let info = YapiServer::new(client).get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn tool_router_lists_both_tools() {
        let client = YapiClient::new(Config::new("http://127.0.0.1:1", "t")).expect("client");
        let server = YapiServer::new(client);
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["yapi_get_api_desc", "yapi_get_apis_detail"]);
    }
}

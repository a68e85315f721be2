//! Agent-facing layout of an interface descriptor.
//!
//! The group and field names below are part of the tool output contract.

use serde::Serialize;
use serde_json::Value;
use yapi_mcp_client::ApiDescriptor;

#[derive(Debug, Serialize)]
pub struct FormattedDescriptor<'a> {
    #[serde(rename = "基本信息")]
    pub basic: BasicInfo<'a>,
    #[serde(rename = "请求参数")]
    pub request: RequestParams<'a>,
    #[serde(rename = "响应信息")]
    pub response: ResponseInfo<'a>,
    #[serde(rename = "其他信息")]
    pub other: OtherInfo<'a>,
}

#[derive(Debug, Serialize)]
pub struct BasicInfo<'a> {
    #[serde(rename = "接口ID")]
    pub id: &'a Value,
    #[serde(rename = "接口名称")]
    pub title: &'a Value,
    #[serde(rename = "接口路径")]
    pub path: &'a Value,
    #[serde(rename = "请求方式", skip_serializing_if = "Option::is_none")]
    pub method: Option<&'a Value>,
    #[serde(rename = "接口描述", skip_serializing_if = "Option::is_none")]
    pub desc: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct RequestParams<'a> {
    #[serde(rename = "URL参数", skip_serializing_if = "Option::is_none")]
    pub path_params: Option<&'a Value>,
    #[serde(rename = "查询参数", skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a Value>,
    #[serde(rename = "请求头", skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a Value>,
    #[serde(rename = "请求体类型", skip_serializing_if = "Option::is_none")]
    pub body_type: Option<&'a Value>,
    #[serde(rename = "表单参数", skip_serializing_if = "Option::is_none")]
    pub body_form: Option<&'a Value>,
    #[serde(rename = "Json参数", skip_serializing_if = "Option::is_none")]
    pub body_json: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct ResponseInfo<'a> {
    #[serde(rename = "响应类型", skip_serializing_if = "Option::is_none")]
    pub body_type: Option<&'a Value>,
    #[serde(rename = "响应内容", skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct OtherInfo<'a> {
    #[serde(rename = "接口文档", skip_serializing_if = "Option::is_none")]
    pub markdown: Option<&'a Value>,
}

impl<'a> From<&'a ApiDescriptor> for FormattedDescriptor<'a> {
    fn from(d: &'a ApiDescriptor) -> Self {
        Self {
            basic: BasicInfo {
                id: &d.id,
                title: &d.title,
                path: &d.path,
                method: d.method.as_ref(),
                desc: d.desc.as_ref(),
            },
            request: RequestParams {
                path_params: d.req_params.as_ref(),
                query: d.req_query.as_ref(),
                headers: d.req_headers.as_ref(),
                body_type: d.req_body_type.as_ref(),
                body_form: d.req_body_form.as_ref(),
                body_json: d.req_body_other.as_ref(),
            },
            response: ResponseInfo {
                body_type: d.res_body_type.as_ref(),
                body: d.res_body.as_ref(),
            },
            other: OtherInfo {
                markdown: d.markdown.as_ref(),
            },
        }
    }
}

/// Pretty-printed JSON for one descriptor.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_descriptor(d: &ApiDescriptor) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&FormattedDescriptor::from(d))
}

/// Pretty-printed JSON array, one entry per descriptor, in input order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_descriptors(ds: &[ApiDescriptor]) -> serde_json::Result<String> {
    let formatted: Vec<FormattedDescriptor<'_>> =
        ds.iter().map(FormattedDescriptor::from).collect();
    serde_json::to_string_pretty(&formatted)
}

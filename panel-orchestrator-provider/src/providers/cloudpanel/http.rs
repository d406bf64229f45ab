//! CloudPanel REST 请求方法

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PayloadFormat, Result};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};
use crate::transport::HttpMethod;

use super::{API_PREFIX, CloudPanelProvider, CloudResponse};

/// `message` plus any field validation messages.
fn failure_message(response: &CloudResponse) -> String {
    let mut parts = Vec::new();
    if !response.message.trim().is_empty() {
        parts.push(response.message.trim().to_string());
    }
    if let Some(Value::Object(fields)) = &response.errors {
        for (field, messages) in fields {
            match messages {
                Value::Array(list) => parts.extend(
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(|m| format!("{field}: {m}")),
                ),
                Value::String(m) => parts.push(format!("{field}: {m}")),
                _ => {}
            }
        }
    }
    if parts.is_empty() {
        "Request failed".to_string()
    } else {
        parts.join("; ")
    }
}

impl CloudPanelProvider {
    /// Call `/api/v1<path>` and return `data` (if any) of a successful envelope.
    pub(crate) async fn api(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        ctx: ErrorContext,
    ) -> Result<Option<Value>> {
        let path = format!("{API_PREFIX}{path}");
        let body = body.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let text = match method {
            HttpMethod::Get => self.http.get(&path).await?,
            HttpMethod::Delete => self.http.delete(&path).await?,
            HttpMethod::Post => self.http.post_json(&path, &body).await?,
            HttpMethod::Put => self.http.put_json(&path, &body).await?,
        };
        // 204 No Content
        if text.trim().is_empty() {
            return Ok(None);
        }

        let response: CloudResponse = self.http.parse_json(&text)?;
        if !response.success {
            let message = failure_message(&response);
            log::error!("[{}] {method} {path} failed: {message}", self.panel_name());
            let raw = match response.code {
                Some(code) => RawApiError::with_code(code, message),
                None => RawApiError::new(message),
            };
            return Err(self.map_error(raw, ctx));
        }
        Ok(response.data.filter(|d| !d.is_null()))
    }

    /// GET whose `data` must decode as `T`.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let data = self.api(HttpMethod::Get, path, None, ctx).await?;
        self.decode(data, path)
    }

    pub(crate) fn decode<T: DeserializeOwned>(&self, data: Option<Value>, what: &str) -> Result<T> {
        let data = data.ok_or_else(|| {
            self.parse_error(PayloadFormat::Json, format!("{what}: response has no data"))
        })?;
        serde_json::from_value(data).map_err(|e| self.parse_error(PayloadFormat::Json, e))
    }
}

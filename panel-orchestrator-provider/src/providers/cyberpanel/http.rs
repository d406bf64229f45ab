//! CyberPanel `/api/<endpoint>` 请求方法

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{PayloadFormat, Result};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::CyberPanelProvider;

/// JSON request payload.
pub(crate) type Payload = Map<String, Value>;

/// Build a payload from string fields.
pub(crate) fn payload(items: &[(&str, &str)]) -> Payload {
    items
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}

/// Status keys are `1` / `0`, sometimes quoted, sometimes booleans.
fn status_ok(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s.trim() == "1",
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

impl CyberPanelProvider {
    /// POST `payload` (plus admin credentials) to `/api/<endpoint>` and check
    /// `status_key`.
    pub(crate) async fn call(
        &self,
        endpoint: &str,
        status_key: &str,
        mut payload: Payload,
        ctx: ErrorContext,
    ) -> Result<Value> {
        payload.insert("adminUser".to_string(), Value::String(self.admin_user.clone()));
        payload.insert(
            "adminPass".to_string(),
            Value::String(self.admin_pass.expose().to_string()),
        );

        let body = self
            .http
            .post_json(&format!("/api/{endpoint}"), &Value::Object(payload))
            .await?;
        let response: Value = self.http.parse_json(&body)?;

        if status_ok(response.get(status_key)) {
            return Ok(response);
        }
        let message = response
            .get("error_message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty() && *m != "None")
            .map_or_else(|| format!("{endpoint} failed"), str::to_string);
        log::error!("[{}] {endpoint} failed: {message}", self.panel_name());
        Err(self.map_error(RawApiError::new(message), ctx))
    }

    /// Rows of a list response; `data` is a JSON-encoded string or an array.
    pub(crate) fn rows<T: DeserializeOwned>(&self, response: &Value) -> Result<Vec<T>> {
        let parsed = match response.get("data") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
            Some(Value::String(s)) => serde_json::from_str(s),
            Some(other) => serde_json::from_value(other.clone()),
        };
        parsed.map_err(|e| self.parse_error(PayloadFormat::Json, e))
    }
}

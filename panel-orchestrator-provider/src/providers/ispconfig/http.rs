//! ISPConfig remote API 请求方法与会话处理

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::{PanelError, PayloadFormat, Result};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{IspConfigProvider, IspResponse, PANEL};

/// Top-level arguments of one remote method.
pub(crate) type Args = Map<String, Value>;

/// Build arguments from `(key, value)` pairs.
pub(crate) fn args<const N: usize>(items: [(&str, Value); N]) -> Args {
    items
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn with_session(args: &Args, session_id: &str) -> Value {
    let mut body = Map::with_capacity(args.len() + 1);
    body.insert("session_id".to_string(), Value::String(session_id.to_string()));
    body.extend(args.clone());
    Value::Object(body)
}

/// Numeric ids arrive as numbers or strings.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
    .filter(|id| id != "0")
}

impl IspConfigProvider {
    async fn post(&self, method: &str, body: Value, ctx: ErrorContext) -> Result<Value> {
        let url = format!("{}?{method}", self.remote_url);
        let text = self.http.post_json(&url, &body).await?;
        let response: IspResponse = self.http.parse_json(&text)?;

        if response.code == "ok" {
            return Ok(response.response);
        }
        let message = if response.message.trim().is_empty() {
            format!("{method} failed")
        } else {
            response.message.trim().to_string()
        };
        log::error!("[{PANEL}] {method} failed: {message}");
        Err(self.map_error(RawApiError::with_code(response.code, message), ctx))
    }

    async fn login(&self) -> Result<String> {
        log::debug!("[{PANEL}] Logging in as {}", self.username);
        let response = self
            .post(
                "login",
                json!({ "username": self.username, "password": self.password.expose() }),
                ErrorContext::default(),
            )
            .await?;
        match response {
            Value::String(id) if !id.trim().is_empty() => Ok(id),
            other => Err(self.parse_error(
                PayloadFormat::Json,
                format!("login returned no session id: {other}"),
            )),
        }
    }

    /// Run `method` under the cached session, logging in first if needed.
    /// An expired session is replaced and the call retried once.
    pub(crate) async fn call(&self, method: &str, args: Args, ctx: ErrorContext) -> Result<Value> {
        let session_id = self.session.get_or_login(|| self.login()).await?;
        match self
            .post(method, with_session(&args, &session_id), ctx.clone())
            .await
        {
            Err(PanelError::SessionExpired { .. }) => {
                log::info!("[{PANEL}] Session expired during {method}, logging in again");
                self.session.invalidate(&session_id).await;
                let renewed = self.session.get_or_login(|| self.login()).await?;
                self.post(method, with_session(&args, &renewed), ctx).await
            }
            other => other,
        }
    }

    /// Call an `*_add` method and return the new record id.
    pub(crate) async fn add(&self, method: &str, args: Args, ctx: ErrorContext) -> Result<String> {
        let response = self.call(method, args, ctx).await?;
        id_string(&response).ok_or_else(|| {
            self.parse_error(PayloadFormat::Json, format!("{method} returned no id: {response}"))
        })
    }

    /// `*_get` by numeric id: one record, or `None` when the panel answers
    /// with an empty array / `false`.
    pub(crate) async fn get_one<T: DeserializeOwned>(
        &self,
        method: &str,
        primary_id: &str,
        ctx: ErrorContext,
    ) -> Result<Option<T>> {
        let response = self
            .call(method, args([("primary_id", json!(primary_id))]), ctx)
            .await?;
        match response {
            Value::Object(map) if !map.is_empty() => serde_json::from_value(Value::Object(map))
                .map(Some)
                .map_err(|e| self.parse_error(PayloadFormat::Json, e)),
            Value::Array(mut rows) if !rows.is_empty() => serde_json::from_value(rows.swap_remove(0))
                .map(Some)
                .map_err(|e| self.parse_error(PayloadFormat::Json, e)),
            _ => Ok(None),
        }
    }

    /// `*_get` with a filter (`{"email": "%@example.com"}`) or `-1` for all
    /// records.
    pub(crate) async fn get_many<T: DeserializeOwned>(
        &self,
        method: &str,
        filter: Value,
        ctx: ErrorContext,
    ) -> Result<Vec<T>> {
        let response = self.call(method, args([("primary_id", filter)]), ctx).await?;
        match response {
            Value::Array(rows) => serde_json::from_value(Value::Array(rows))
                .map_err(|e| self.parse_error(PayloadFormat::Json, e)),
            Value::Object(map) if !map.is_empty() => serde_json::from_value(Value::Object(map))
                .map(|row| vec![row])
                .map_err(|e| self.parse_error(PayloadFormat::Json, e)),
            _ => Ok(Vec::new()),
        }
    }

    /// End the remote session, if any. The next call logs in again.
    pub async fn logout(&self) -> Result<()> {
        if let Some(session_id) = self.session.take().await {
            self.post(
                "logout",
                json!({ "session_id": session_id }),
                ErrorContext::default(),
            )
            .await?;
            log::debug!("[{PANEL}] Logged out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_added() {
        let body = with_session(&args([("primary_id", json!(7))]), "abc");
        assert_eq!(body, json!({"session_id": "abc", "primary_id": 7}));
    }

    #[test]
    fn ids() {
        assert_eq!(id_string(&json!(12)).as_deref(), Some("12"));
        assert_eq!(id_string(&json!("12")).as_deref(), Some("12"));
        assert_eq!(id_string(&json!(0)), None);
        assert_eq!(id_string(&json!(false)), None);
    }
}

//! DirectAdmin `CMD_API_*` 请求方法

use crate::error::{PanelError, PayloadFormat, Result};
use crate::http_client::basic_auth;
use crate::providers::common::{decode_pairs, encode_pairs, pairs};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};
use crate::transport::{HttpMethod, HttpRequest};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{DirectAdminProvider, PANEL};

pub(crate) type Params = Vec<(String, String)>;

/// First value stored under `key`.
pub(crate) fn value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Values of a `list[]=a&list[]=b` response.
pub(crate) fn list_values(pairs: &[(String, String)]) -> Vec<String> {
    pairs
        .iter()
        .filter(|(k, v)| k == "list[]" && !v.is_empty())
        .map(|(_, v)| v.clone())
        .collect()
}

impl DirectAdminProvider {
    /// POST a command, optionally logged in as `login_as` (`admin|user`).
    ///
    /// Commands change state, so their body must carry `error=0`.
    pub(crate) async fn command(
        &self,
        command: &str,
        params: Params,
        login_as: Option<&str>,
        ctx: ErrorContext,
    ) -> Result<Vec<(String, String)>> {
        let request = HttpRequest::new(HttpMethod::Post, self.http.url(&format!("/{command}")))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(encode_pairs(&params));
        self.exchange(command, request, login_as, true, ctx).await
    }

    /// GET a read-only command with query parameters.
    pub(crate) async fn query(
        &self,
        command: &str,
        params: Params,
        login_as: Option<&str>,
        ctx: ErrorContext,
    ) -> Result<Vec<(String, String)>> {
        let url = if params.is_empty() {
            self.http.url(&format!("/{command}"))
        } else {
            self.http
                .url(&format!("/{command}?{}", encode_pairs(&params)))
        };
        self.exchange(command, HttpRequest::new(HttpMethod::Get, url), login_as, false, ctx)
            .await
    }

    async fn exchange(
        &self,
        command: &str,
        request: HttpRequest,
        login_as: Option<&str>,
        expect_status: bool,
        ctx: ErrorContext,
    ) -> Result<Vec<(String, String)>> {
        let login = match login_as {
            Some(user) if user != self.username => format!("{}|{user}", self.username),
            _ => self.username.clone(),
        };
        let request = request.header("Authorization", basic_auth(&login, self.password.expose()));
        let body = self.http.send(request).await?;
        self.check(command, &body, expect_status, ctx)
    }

    /// Interpret a `CMD_API_*` body.
    ///
    /// With `expect_status` a body lacking the `error` key is a parse error;
    /// otherwise it is a listing and decoded as is.
    pub(crate) fn check(
        &self,
        command: &str,
        body: &str,
        expect_status: bool,
        ctx: ErrorContext,
    ) -> Result<Vec<(String, String)>> {
        let trimmed = body.trim();
        // 未认证时 DirectAdmin 返回 HTML 登录页（HTTP 200）
        if trimmed.starts_with('<') {
            return Err(PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some("DirectAdmin answered with its login page".to_string()),
            });
        }
        let decoded = decode_pairs(trimmed);
        match value(&decoded, "error") {
            Some("0") => Ok(decoded),
            Some(_) => {
                let text = value(&decoded, "text").unwrap_or_default();
                let details = value(&decoded, "details").unwrap_or_default();
                let message = match (text.is_empty(), details.is_empty()) {
                    (true, true) => format!("{command} failed"),
                    (false, true) => text.to_string(),
                    (true, false) => details.to_string(),
                    (false, false) => format!("{text}: {details}"),
                };
                log::error!("[{PANEL}] {command} failed: {message}");
                Err(self.map_error(RawApiError::new(message), ctx))
            }
            // 列表类命令不带 error 字段；无法解码时退回子串判断
            None if trimmed.contains("error=1") => Err(self.map_error(
                RawApiError::new(truncate_for_log(trimmed)),
                ctx,
            )),
            None if expect_status => Err(self.parse_error(
                PayloadFormat::Text,
                format!("{command}: no status in {:?}", truncate_for_log(trimmed)),
            )),
            None if !trimmed.is_empty() && !trimmed.contains('=') => Err(self.parse_error(
                PayloadFormat::Text,
                format!("{command}: {}", truncate_for_log(trimmed)),
            )),
            None => Ok(decoded),
        }
    }

    /// Owner of `domain` according to `CMD_API_DOMAIN_OWNERS`.
    pub(crate) async fn domain_owner(&self, domain: &str) -> Result<String> {
        let domain = domain.trim();
        let owners = self
            .query(
                "CMD_API_DOMAIN_OWNERS",
                pairs(&[("domain", domain)]),
                None,
                ErrorContext::new("Domain", domain),
            )
            .await?;
        value(&owners, domain)
            .filter(|owner| !owner.is_empty())
            .map(str::to_string)
            .ok_or_else(|| PanelError::not_found(PANEL, "Domain", domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectAdminCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> DirectAdminProvider {
        DirectAdminProvider::builder(
            settings(),
            DirectAdminCredentials {
                username: "admin".to_string(),
                password: "secret".into(),
            },
        )
        .transport(Box::new(Unreachable))
        .build()
        .unwrap()
    }

    #[test]
    fn success_body_is_decoded() {
        let pairs = provider()
            .check("CMD_API_POP", "error=0&text=Success&details=", true, ErrorContext::default())
            .unwrap();
        assert_eq!(value(&pairs, "text"), Some("Success"));
    }

    #[test]
    fn error_body_keeps_text_and_details() {
        let err = provider()
            .check(
                "CMD_API_ACCOUNT_USER",
                "error=1&text=Unable+to+Create&details=Quota+must+be+a+number",
                true,
                ErrorContext::default(),
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "API_ERROR");
        assert!(err.to_string().contains("Unable to Create: Quota must be a number"));
    }

    #[test]
    fn login_page_is_invalid_credentials() {
        let err = provider()
            .check(
                "CMD_API_SHOW_ALL_USERS",
                "<html><body>Login</body></html>",
                false,
                ErrorContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, PanelError::InvalidCredentials { .. }));
    }

    #[test]
    fn list_body_without_error_key() {
        let pairs = provider()
            .check(
                "CMD_API_SHOW_ALL_USERS",
                "list[]=exuser&list[]=other",
                false,
                ErrorContext::default(),
            )
            .unwrap();
        assert_eq!(list_values(&pairs), vec!["exuser", "other"]);
    }

    #[test]
    fn unstructured_text_is_parse_error() {
        let err = provider()
            .check("CMD_API_POP", "Something went wrong", false, ErrorContext::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "RESPONSE_PARSE_ERROR");
    }

    #[test]
    fn command_needs_status() {
        let da = provider();
        for body in ["", "  \n", "list[]=exuser", "text=Done"] {
            let err = da
                .check("CMD_API_ACCOUNT_USER", body, true, ErrorContext::default())
                .unwrap_err();
            assert_eq!(err.error_code(), "RESPONSE_PARSE_ERROR", "{body:?}");
        }
        let pairs = da
            .check("CMD_API_SHOW_ALL_USERS", "", false, ErrorContext::default())
            .unwrap();
        assert!(pairs.is_empty());
    }
}

//! Virtualmin `remote.cgi` 请求方法

use crate::error::{PanelError, PayloadFormat, Result};
use crate::providers::common::{encode_pairs, pairs};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{PANEL, VirtualminProvider, VirtualminRecord, VirtualminResponse};

const REMOTE_PATH: &str = "/virtual-server/remote.cgi";

/// Program arguments; an empty value is a bare `--flag`.
pub(crate) type Args = Vec<(String, String)>;

impl VirtualminProvider {
    /// Run `program` and return its envelope once `status == "success"`.
    pub(crate) async fn remote(
        &self,
        program: &str,
        args: Args,
        ctx: ErrorContext,
    ) -> Result<VirtualminResponse> {
        let mut form = pairs(&[("program", program), ("json", "1")]);
        form.extend(args);
        let body = self.http.post_form(REMOTE_PATH, encode_pairs(&form)).await?;
        self.check(program, &body, ctx)
    }

    /// Run a list program with `multiline` and decode its records.
    pub(crate) async fn records(
        &self,
        program: &str,
        mut args: Args,
        ctx: ErrorContext,
    ) -> Result<Vec<VirtualminRecord>> {
        args.push(("multiline".to_string(), String::new()));
        let response = self.remote(program, args, ctx).await?;
        if response.data.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(response.data)
            .map_err(|e| self.parse_error(PayloadFormat::Json, format!("{program}: {e}")))
    }

    pub(crate) fn check(
        &self,
        program: &str,
        body: &str,
        ctx: ErrorContext,
    ) -> Result<VirtualminResponse> {
        let trimmed = body.trim();
        // Webmin 未认证时返回登录页
        if trimmed.starts_with('<') {
            return Err(PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some("Webmin answered with its login page".to_string()),
            });
        }
        let response: VirtualminResponse = self.http.parse_json(trimmed)?;
        if response.succeeded() {
            return Ok(response);
        }
        let message = [response.error.trim(), response.output.trim()]
            .into_iter()
            .find(|m| !m.is_empty())
            .map_or_else(|| format!("{program} failed"), truncate_for_log);
        let command = if response.command.is_empty() {
            program
        } else {
            response.command.as_str()
        };
        log::error!("[{PANEL}] {command} failed: {message}");
        Err(self.map_error(RawApiError::new(message), ctx))
    }
}

//! WHM API 1 / UAPI 请求方法

use serde::de::DeserializeOwned;

use crate::error::{PayloadFormat, Result};
use crate::providers::common::{encode_pairs, pairs};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{CpanelProvider, UapiWrapper, WHM_API_VERSION, WhmDomainOwner, WhmResponse};

/// Query parameters of one call.
pub(crate) type Params = Vec<(String, String)>;

impl CpanelProvider {
    /// 执行 WHM API 1 调用，返回 `data`（可能为空）
    pub(crate) async fn whm<T: DeserializeOwned>(
        &self,
        function: &str,
        params: Params,
        ctx: ErrorContext,
    ) -> Result<Option<T>> {
        let mut query = pairs(&[("api.version", WHM_API_VERSION)]);
        query.extend(params);
        let path = format!("/json-api/{function}?{}", encode_pairs(&query));

        let body = self.http.get(&path).await?;
        let response: WhmResponse<serde_json::Value> = self.http.parse_json(&body)?;

        if response.metadata.result != 1 {
            let reason = if response.metadata.reason.trim().is_empty() {
                format!("{function} failed")
            } else {
                response.metadata.reason
            };
            log::error!("[{}] WHM {function} failed: {reason}", self.panel_name());
            return Err(self.map_error(RawApiError::new(reason), ctx));
        }

        self.decode_data(response.data)
    }

    /// Like [`whm`](Self::whm), but the caller needs `data` to be present.
    pub(crate) async fn whm_data<T: DeserializeOwned>(
        &self,
        function: &str,
        params: Params,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.whm(function, params, ctx).await?.ok_or_else(|| {
            self.parse_error(
                PayloadFormat::Json,
                format!("{function} response has no data"),
            )
        })
    }

    /// 通过 WHM `uapi_cpanel` 以 `user` 身份执行 UAPI 调用
    pub(crate) async fn uapi<T: DeserializeOwned>(
        &self,
        user: &str,
        module: &str,
        function: &str,
        params: Params,
        ctx: ErrorContext,
    ) -> Result<Option<T>> {
        let mut query = pairs(&[
            ("cpanel.user", user),
            ("cpanel.module", module),
            ("cpanel.function", function),
        ]);
        query.extend(params);

        let wrapper: UapiWrapper<serde_json::Value> =
            self.whm_data("uapi_cpanel", query, ctx.clone()).await?;

        if wrapper.uapi.status != 1 {
            let message = wrapper
                .uapi
                .errors
                .filter(|errors| !errors.is_empty())
                .map_or_else(|| format!("{module}::{function} failed"), |e| e.join("; "));
            log::error!("[{}] UAPI {module}::{function} failed: {message}", self.panel_name());
            return Err(self.map_error(RawApiError::new(message), ctx));
        }

        self.decode_data(wrapper.uapi.data)
    }

    /// UAPI call whose result list is required (absent data is an empty list).
    pub(crate) async fn uapi_list<T: DeserializeOwned>(
        &self,
        user: &str,
        module: &str,
        function: &str,
        params: Params,
    ) -> Result<Vec<T>> {
        Ok(self
            .uapi(user, module, function, params, ErrorContext::default())
            .await?
            .unwrap_or_default())
    }

    fn decode_data<T: DeserializeOwned>(&self, data: Option<serde_json::Value>) -> Result<Option<T>> {
        match data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| self.parse_error(PayloadFormat::Json, e)),
        }
    }

    /// The cPanel account a UAPI call runs as.
    pub(crate) fn uapi_user<'a>(&'a self, account_id: &'a str) -> &'a str {
        let account_id = account_id.trim();
        if account_id.is_empty() {
            &self.cpanel_user
        } else {
            account_id
        }
    }

    /// 数据库与数据库用户名带有 `<owner>_` 前缀，据此找到所属账户
    pub(crate) fn name_owner<'a>(&'a self, name: &'a str) -> &'a str {
        match name.trim().split_once('_') {
            Some((owner, rest)) if !owner.is_empty() && !rest.is_empty() => owner,
            _ => &self.cpanel_user,
        }
    }

    /// 通过 WHM `getdomainowner` 找到域名所属账户
    pub(crate) async fn domain_owner(&self, domain: &str) -> Result<String> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Ok(self.cpanel_user.clone());
        }
        let owner: Option<WhmDomainOwner> = self
            .whm(
                "getdomainowner",
                pairs(&[("domain", domain)]),
                ErrorContext::new("Domain", domain),
            )
            .await?;
        let owner = owner
            .and_then(|o| o.user)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        if owner.is_none() {
            log::debug!("[{}] no owner for {domain}, using {}", self.panel_name(), self.cpanel_user);
        }
        Ok(owner.unwrap_or_else(|| self.cpanel_user.clone()))
    }
}

/// `name` carrying the `<owner>_` prefix cPanel gives databases and their users.
pub(crate) fn qualify(owner: &str, name: &str) -> String {
    let name = name.trim();
    if name
        .strip_prefix(owner)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('_'))
    {
        name.to_string()
    } else {
        format!("{owner}_{name}")
    }
}

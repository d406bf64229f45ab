//! cPanel / WHM adapter
//!
//! Hosting accounts are managed through WHM API 1; mailboxes and databases
//! live in a cPanel account and go through UAPI, proxied by WHM's
//! `uapi_cpanel` function so one API token covers both.

mod error;
mod http;
mod provider;
mod types;

use std::sync::Arc;

use crate::config::{ConnectionSettings, CpanelCredentials, require_setting};
use crate::error::Result;
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy};
use crate::transport::HttpTransport;

pub(crate) use types::{
    UapiDatabase, UapiDatabaseUser, UapiMailbox, UapiWrapper, WhmAccount, WhmAccountList,
    WhmDomainOwner, WhmResponse,
};

pub(crate) const PANEL: &str = "cpanel";
/// WHM API version pinned on every call.
pub(crate) const WHM_API_VERSION: &str = "1";

/// cPanel / WHM adapter
///
/// `account_id` is the cPanel (Unix) username; mailboxes are addressed by
/// full email address and databases / database users by their prefixed names.
pub struct CpanelProvider {
    pub(crate) http: PanelHttp,
    /// cPanel account UAPI calls run as when no account is given.
    pub(crate) cpanel_user: String,
}

/// cPanel Provider Builder
pub struct CpanelProviderBuilder {
    settings: ConnectionSettings,
    credentials: CpanelCredentials,
    options: HttpOptions,
}

impl CpanelProviderBuilder {
    /// Replace the HTTP transport (tests, proxies).
    #[must_use]
    pub fn transport(mut self, transport: Box<dyn HttpTransport>) -> Self {
        self.options.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.options.retry = Some(policy);
        self
    }

    pub fn build(self) -> Result<CpanelProvider> {
        let creds = self.credentials;
        require_setting(PANEL, "WHM username", &creds.username)?;
        require_setting(PANEL, "API token", creds.api_token.expose())?;

        let http = self.options.into_http(PANEL, &self.settings)?.with_header(
            "Authorization",
            format!("whm {}:{}", creds.username.trim(), creds.api_token.expose()),
        );
        let cpanel_user = creds
            .cpanel_user
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(creds.username);

        Ok(CpanelProvider { http, cpanel_user })
    }
}

impl CpanelProvider {
    pub fn new(settings: ConnectionSettings, credentials: CpanelCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(
        settings: ConnectionSettings,
        credentials: CpanelCredentials,
    ) -> CpanelProviderBuilder {
        CpanelProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

//! CyberPanel adapter
//!
//! Every call is a JSON POST to `/api/<endpoint>` carrying `adminUser` /
//! `adminPass` in the payload. Success is signalled by an endpoint-specific
//! status key (`createWebSiteStatus`, `websiteDeleteStatus`, ...) equal to
//! `1`; list endpoints return their rows as a JSON-encoded string in `data`.

mod error;
mod http;
mod provider;
mod types;

use std::sync::Arc;

use crate::config::{ConnectionSettings, CyberPanelCredentials, SecretString, require_setting};
use crate::error::Result;
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy};
use crate::transport::HttpTransport;

pub(crate) use types::{CyberDatabase, CyberMailbox, CyberWebsite};

pub(crate) const PANEL: &str = "cyberpanel";

/// CyberPanel adapter
///
/// `account_id` is the website's domain; database ids are database names.
pub struct CyberPanelProvider {
    pub(crate) http: PanelHttp,
    pub(crate) admin_user: String,
    pub(crate) admin_pass: SecretString,
}

/// CyberPanel Provider Builder
pub struct CyberPanelProviderBuilder {
    settings: ConnectionSettings,
    credentials: CyberPanelCredentials,
    options: HttpOptions,
}

impl CyberPanelProviderBuilder {
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

    pub fn build(self) -> Result<CyberPanelProvider> {
        let creds = self.credentials;
        require_setting(PANEL, "API key", creds.api_key.expose())?;
        require_setting(PANEL, "Admin username", &creds.admin_username)?;
        require_setting(PANEL, "Admin password", creds.admin_password.expose())?;

        let http = self
            .options
            .into_http(PANEL, &self.settings)?
            .with_header("Authorization", format!("Bearer {}", creds.api_key.expose()));

        Ok(CyberPanelProvider {
            http,
            admin_user: creds.admin_username.trim().to_string(),
            admin_pass: creds.admin_password,
        })
    }
}

impl CyberPanelProvider {
    pub fn new(settings: ConnectionSettings, credentials: CyberPanelCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(
        settings: ConnectionSettings,
        credentials: CyberPanelCredentials,
    ) -> CyberPanelProviderBuilder {
        CyberPanelProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

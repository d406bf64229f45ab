//! DirectAdmin adapter
//!
//! Uses the legacy `CMD_API_*` endpoints, which answer in
//! `application/x-www-form-urlencoded` form. Hosting accounts are addressed by
//! their primary domain; the owning DirectAdmin user is looked up with
//! `CMD_API_DOMAIN_OWNERS`. Mail and database commands are user-level and run
//! as the owner through `admin|user` login-as.

mod error;
mod http;
mod provider;
mod types;

use std::sync::Arc;

use crate::config::{ConnectionSettings, DirectAdminCredentials, SecretString, require_setting};
use crate::error::Result;
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy};
use crate::transport::HttpTransport;

pub(crate) use types::{PopQuota, UserConfig};

pub(crate) const PANEL: &str = "directadmin";

/// DirectAdmin adapter
pub struct DirectAdminProvider {
    pub(crate) http: PanelHttp,
    pub(crate) username: String,
    pub(crate) password: SecretString,
}

/// DirectAdmin Provider Builder
pub struct DirectAdminProviderBuilder {
    settings: ConnectionSettings,
    credentials: DirectAdminCredentials,
    options: HttpOptions,
}

impl DirectAdminProviderBuilder {
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

    pub fn build(self) -> Result<DirectAdminProvider> {
        let creds = self.credentials;
        require_setting(PANEL, "Username", &creds.username)?;
        require_setting(PANEL, "Password", creds.password.expose())?;

        let http = self.options.into_http(PANEL, &self.settings)?;
        Ok(DirectAdminProvider {
            http,
            username: creds.username.trim().to_string(),
            password: creds.password,
        })
    }
}

impl DirectAdminProvider {
    pub fn new(settings: ConnectionSettings, credentials: DirectAdminCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(
        settings: ConnectionSettings,
        credentials: DirectAdminCredentials,
    ) -> DirectAdminProviderBuilder {
        DirectAdminProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

//! Virtualmin adapter
//!
//! Every operation is a Virtualmin CLI program run through
//! `/virtual-server/remote.cgi` (form-encoded `program=...&json=1`), over the
//! Webmin port with basic auth. Hosting accounts are addressed by domain
//! name; databases by `domain/name`.

mod error;
mod http;
mod provider;
mod types;

use std::sync::Arc;

use crate::config::{ConnectionSettings, VirtualminCredentials, require_setting};
use crate::error::Result;
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy, basic_auth};
use crate::transport::HttpTransport;

pub(crate) use types::{VirtualminRecord, VirtualminResponse};

pub(crate) const PANEL: &str = "virtualmin";

/// Virtualmin adapter
pub struct VirtualminProvider {
    pub(crate) http: PanelHttp,
}

/// Virtualmin Provider Builder
pub struct VirtualminProviderBuilder {
    settings: ConnectionSettings,
    credentials: VirtualminCredentials,
    options: HttpOptions,
}

impl VirtualminProviderBuilder {
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

    pub fn build(self) -> Result<VirtualminProvider> {
        let creds = self.credentials;
        require_setting(PANEL, "Username", &creds.username)?;
        require_setting(PANEL, "Password", creds.password.expose())?;

        let http = self.options.into_http(PANEL, &self.settings)?.with_header(
            "Authorization",
            basic_auth(creds.username.trim(), creds.password.expose()),
        );
        Ok(VirtualminProvider { http })
    }
}

impl VirtualminProvider {
    pub fn new(settings: ConnectionSettings, credentials: VirtualminCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(
        settings: ConnectionSettings,
        credentials: VirtualminCredentials,
    ) -> VirtualminProviderBuilder {
        VirtualminProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

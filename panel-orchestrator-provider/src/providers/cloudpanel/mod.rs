//! CloudPanel adapter
//!
//! JSON REST under `/api/v1`, authenticated with a static `X-Api-Key`
//! header. Responses are wrapped as `{"success": bool, "message": ..., "data": ...}`.

mod error;
mod http;
mod provider;
mod types;

use std::sync::Arc;

use crate::config::{CloudPanelCredentials, ConnectionSettings, require_setting};
use crate::error::Result;
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy};
use crate::transport::HttpTransport;

pub(crate) use types::{CloudDatabase, CloudDatabaseUser, CloudResponse, CloudSite};

pub(crate) const PANEL: &str = "cloudpanel";
pub(crate) const API_PREFIX: &str = "/api/v1";

/// CloudPanel adapter
///
/// `account_id` is the numeric site id; databases and database users are
/// addressed by their numeric ids as well.
pub struct CloudPanelProvider {
    pub(crate) http: PanelHttp,
}

/// CloudPanel Provider Builder
pub struct CloudPanelProviderBuilder {
    settings: ConnectionSettings,
    credentials: CloudPanelCredentials,
    options: HttpOptions,
}

impl CloudPanelProviderBuilder {
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

    pub fn build(self) -> Result<CloudPanelProvider> {
        require_setting(PANEL, "API key", self.credentials.api_key.expose())?;
        let http = self
            .options
            .into_http(PANEL, &self.settings)?
            .with_header("X-Api-Key", self.credentials.api_key.expose())
            .with_header("Accept", "application/json");
        Ok(CloudPanelProvider { http })
    }
}

impl CloudPanelProvider {
    pub fn new(settings: ConnectionSettings, credentials: CloudPanelCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(
        settings: ConnectionSettings,
        credentials: CloudPanelCredentials,
    ) -> CloudPanelProviderBuilder {
        CloudPanelProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

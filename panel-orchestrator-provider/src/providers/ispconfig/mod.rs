//! ISPConfig 3 adapter
//!
//! Talks to the JSON remote API (`remote/json.php?<method>`). Unlike the other
//! panels it authenticates with a login session: the first business call logs
//! in, the session id is cached and sent as `session_id` in every payload. A
//! call rejected because the session expired logs in again and is retried
//! once.

mod error;
mod http;
mod provider;
mod session;
mod types;

use std::sync::Arc;

use crate::config::{ConnectionSettings, IspConfigCredentials, SecretString, require_setting};
use crate::error::Result;
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy};
use crate::transport::HttpTransport;
use crate::types::non_blank;

pub(crate) use session::Session;
pub(crate) use types::{IspDatabase, IspDatabaseUser, IspFtpUser, IspMailUser, IspResponse, IspWebDomain};

pub(crate) const PANEL: &str = "ispconfig";
/// Remote API path relative to the panel endpoint.
const REMOTE_PATH: &str = "/remote/json.php";

/// ISPConfig adapter
///
/// `account_id` is the numeric web domain id; mailboxes are addressed by
/// email and databases / database users by their numeric ids.
pub struct IspConfigProvider {
    pub(crate) http: PanelHttp,
    pub(crate) username: String,
    pub(crate) password: SecretString,
    /// Absolute URL of `json.php`.
    pub(crate) remote_url: String,
    pub(crate) server_id: u32,
    pub(crate) client_id: u32,
    pub(crate) session: Session,
}

/// ISPConfig Provider Builder
pub struct IspConfigProviderBuilder {
    settings: ConnectionSettings,
    credentials: IspConfigCredentials,
    options: HttpOptions,
}

impl IspConfigProviderBuilder {
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

    pub fn build(self) -> Result<IspConfigProvider> {
        let creds = self.credentials;
        require_setting(PANEL, "Remote user", &creds.username)?;
        require_setting(PANEL, "Remote password", creds.password.expose())?;

        let http = self.options.into_http(PANEL, &self.settings)?;
        let remote_url = non_blank(creds.remote_api_url.as_deref())
            .map_or_else(|| http.url(REMOTE_PATH), |url| url.trim_end_matches('?').to_string());

        Ok(IspConfigProvider {
            http,
            username: creds.username.trim().to_string(),
            password: creds.password,
            remote_url,
            server_id: creds.server_id,
            client_id: creds.client_id,
            session: Session::default(),
        })
    }
}

impl IspConfigProvider {
    pub fn new(settings: ConnectionSettings, credentials: IspConfigCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(
        settings: ConnectionSettings,
        credentials: IspConfigCredentials,
    ) -> IspConfigProviderBuilder {
        IspConfigProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

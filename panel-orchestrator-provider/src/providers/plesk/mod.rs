//! Plesk adapter
//!
//! Talks the Plesk XML API: one `<packet>` per request, POSTed to
//! `/enterprise/control/agent.php`. Hosting accounts are webspaces
//! (subscriptions) and `account_id` is the numeric webspace id.

mod error;
mod http;
mod provider;
mod xml;

use std::sync::Arc;

use crate::config::{ConnectionSettings, PleskCredentials};
use crate::error::{PanelError, Result, codes};
use crate::http_client::{HttpOptions, PanelHttp, RetryPolicy};
use crate::transport::HttpTransport;
use crate::types::non_blank;

pub(crate) use xml::XmlNode;

pub(crate) const PANEL: &str = "plesk";
pub(crate) const AGENT_PATH: &str = "/enterprise/control/agent.php";

/// Plesk adapter
pub struct PleskProvider {
    pub(crate) http: PanelHttp,
}

/// Plesk Provider Builder
pub struct PleskProviderBuilder {
    settings: ConnectionSettings,
    credentials: PleskCredentials,
    options: HttpOptions,
}

impl PleskProviderBuilder {
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

    /// Login/password wins over the secret key when both are configured.
    pub fn build(self) -> Result<PleskProvider> {
        let creds = self.credentials;
        let login = non_blank(creds.username.as_deref());
        let password = creds.password.as_ref().filter(|p| !p.is_blank());
        let api_key = creds.api_key.as_ref().filter(|k| !k.is_blank());

        let headers = match (login, password, api_key) {
            (Some(login), Some(password), _) => vec![
                ("HTTP_AUTH_LOGIN", login),
                ("HTTP_AUTH_PASSWD", password.expose()),
            ],
            (_, _, Some(key)) => vec![("KEY", key.expose())],
            _ => {
                return Err(PanelError::validation(
                    PANEL,
                    codes::INVALID_CONFIGURATION,
                    "API key or login and password are required",
                ));
            }
        };

        let http = self.options.into_http(PANEL, &self.settings)?;
        let http = headers
            .into_iter()
            .fold(http, |http, (name, value)| http.with_header(name, value));
        Ok(PleskProvider { http })
    }
}

impl PleskProvider {
    pub fn new(settings: ConnectionSettings, credentials: PleskCredentials) -> Result<Self> {
        Self::builder(settings, credentials).build()
    }

    pub fn builder(settings: ConnectionSettings, credentials: PleskCredentials) -> PleskProviderBuilder {
        PleskProviderBuilder {
            settings,
            credentials,
            options: HttpOptions::default(),
        }
    }
}

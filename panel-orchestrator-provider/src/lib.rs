//! # panel-orchestrator-provider
//!
//! A unified hosting control panel abstraction for provisioning web hosting
//! accounts, mailboxes and databases across seven panel APIs.
//!
//! ## Supported Panels
//!
//! | Panel | Feature Flag | Wire Format | Auth Method |
//! |-------|-------------|-------------|-------------|
//! | [cPanel / WHM](https://cpanel.net/) | `cpanel` | WHM API 1 query string + UAPI | `whm` API token |
//! | [Plesk](https://www.plesk.com/) | `plesk` | XML-RPC packets | `KEY` header or login/password headers |
//! | [DirectAdmin](https://www.directadmin.com/) | `directadmin` | `CMD_API_*` url-encoded | Basic auth (login-as) |
//! | [CyberPanel](https://cyberpanel.net/) | `cyberpanel` | JSON | Bearer key + admin credentials |
//! | [CloudPanel](https://www.cloudpanel.io/) | `cloudpanel` | JSON REST | `X-Api-Key` |
//! | [ISPConfig 3](https://www.ispconfig.org/) | `ispconfig` | JSON remote API | Session login |
//! | [Virtualmin](https://www.virtualmin.com/) | `virtualmin` | `remote.cgi` form POST | Basic auth |
//!
//! ## Feature Flags
//!
//! ### Panel Selection
//!
//! - **`all-panels`** *(default)*: Enable every adapter listed above.
//! - **`cpanel`**, **`plesk`**, **`directadmin`**, **`cyberpanel`**,
//!   **`cloudpanel`**, **`ispconfig`**, **`virtualmin`**: Enable a single adapter.
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use panel_orchestrator_provider::{
//!     ConnectionSettings, CpanelCredentials, HostingAccountRequest, HostingPanel,
//!     PanelCredentials, create_panel,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Create an adapter from connection settings and credentials
//!     let panel = create_panel(
//!         ConnectionSettings::new("whm.example.com", 2087, true),
//!         PanelCredentials::Cpanel(CpanelCredentials {
//!             username: "root".to_string(),
//!             api_token: "your-token".into(),
//!             cpanel_user: None,
//!         }),
//!     )?;
//!
//!     // 2. Check the credentials against the panel
//!     if !panel.test_connection().await {
//!         return Err("panel unreachable".into());
//!     }
//!
//!     // 3. Provision a hosting account
//!     let result = panel
//!         .create_web_hosting_account(&HostingAccountRequest {
//!             domain: "example.com".to_string(),
//!             username: "exuser".to_string(),
//!             password: "S3cure!pass".to_string(),
//!             disk_quota_mb: Some(1024),
//!             ..Default::default()
//!         })
//!         .await;
//!     if result.success {
//!         println!("created {}", result.account_id);
//!     } else {
//!         println!("failed: {:?} {}", result.error_code, result.message);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Results and Errors
//!
//! Panel operations never return `Err`: every outcome is a result record with
//! `success`, `message`, `error_code` and `errors`. Failures are classified
//! internally as [`PanelError`] and flattened at the operation boundary, so
//! callers can branch on the stable codes in [`codes`]:
//!
//! - validation codes such as `INVALID_DOMAIN`: rejected before any request
//! - `NETWORK_ERROR` / `TIMEOUT`: the panel was not reached
//! - HTTP status codes (`"500"`): the panel answered with a non-2xx status
//! - `JSON_PARSE_ERROR` / `XML_PARSE_ERROR` / `RESPONSE_PARSE_ERROR`
//! - the vendor's own error code, or `API_ERROR`
//! - `NOT_SUPPORTED`: the panel has no equivalent of the operation
//!
//! List operations return an empty `Vec` on failure and log the cause.
//!
//! Account identifiers are panel-specific (username, domain, numeric id) and
//! must not be reused across adapters.

mod config;
mod error;
mod factory;
mod http_client;
mod normalize;
mod providers;
mod traits;
mod transport;
mod types;
mod utils;

// Re-export error types
pub use error::{ErrorKind, PanelError, PayloadFormat, Result, codes};

// Re-export factory functions
pub use factory::{create_panel, get_all_panel_metadata};

// Re-export core trait only (internal traits are not exported)
pub use traits::HostingPanel;

// Re-export configuration
pub use config::{
    CloudPanelCredentials, ConnectionSettings, CpanelCredentials, CredentialValidationError,
    CyberPanelCredentials, DirectAdminCredentials, IspConfigCredentials, PanelCredentials,
    PleskCredentials, SecretString, VirtualminCredentials,
};

// Re-export types
pub use types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DEFAULT_DATABASE_TYPE,
    DEFAULT_PRIVILEGE, DatabaseRequest, DatabaseResult, DatabaseUserRequest, FieldType,
    HostingAccountRequest, HostingAccountResult, MailAccountRequest, MailAccountResult,
    PanelCredentialField, PanelFeatures, PanelMetadata, PanelType,
};

// Re-export transport seam and retry policies
pub use http_client::{ExponentialBackoff, NoRetry, RetryPolicy};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};

// Re-export utils module
pub use utils::datetime;

// Re-export concrete adapters (behind feature flags)
#[cfg(feature = "cpanel")]
pub use providers::{CpanelProvider, CpanelProviderBuilder};

#[cfg(feature = "plesk")]
pub use providers::{PleskProvider, PleskProviderBuilder};

#[cfg(feature = "directadmin")]
pub use providers::{DirectAdminProvider, DirectAdminProviderBuilder};

#[cfg(feature = "cyberpanel")]
pub use providers::{CyberPanelProvider, CyberPanelProviderBuilder};

#[cfg(feature = "cloudpanel")]
pub use providers::{CloudPanelProvider, CloudPanelProviderBuilder};

#[cfg(feature = "ispconfig")]
pub use providers::{IspConfigProvider, IspConfigProviderBuilder};

#[cfg(feature = "virtualmin")]
pub use providers::{VirtualminProvider, VirtualminProviderBuilder};

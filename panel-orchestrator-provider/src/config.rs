//! Construction-time configuration: where a panel lives and how to
//! authenticate against it.
//!
//! Everything here is an immutable value handed to an adapter constructor;
//! adapters never mutate it after construction.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result, codes};
use crate::types::PanelType;

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============ Secrets ============

/// A credential value that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for building request headers and payloads.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("\"***\"")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============ Connection ============

/// Where a panel's API is reachable.
///
/// `host` may be a bare hostname (`panel.example.com`) or a URL
/// (`https://panel.example.com/`); the scheme is always derived from
/// `use_ssl` and the port from `port`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Skip TLS certificate verification (self-signed panel certificates).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

const fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ConnectionSettings {
    pub fn new(host: impl Into<String>, port: u16, use_ssl: bool) -> Self {
        Self {
            host: host.into(),
            port,
            use_ssl,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }

    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `scheme://host:port[/path]` without a trailing slash.
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        let trimmed = self.host.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed)
            .trim_end_matches('/');
        let (authority, path) = without_scheme
            .split_once('/')
            .map_or((without_scheme, ""), |(a, p)| (a, p));
        // 已带端口时以 port 字段为准
        let host = authority
            .rsplit_once(':')
            .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
            .map_or(authority, |(h, _)| h);

        if path.is_empty() {
            format!("{scheme}://{host}:{}", self.port)
        } else {
            format!("{scheme}://{host}:{}/{path}", self.port)
        }
    }

    pub(crate) fn validate(&self, panel: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(PanelError::validation(
                panel,
                codes::INVALID_CONFIGURATION,
                "Panel host / base URL is required",
            ));
        }
        if self.port == 0 {
            return Err(PanelError::validation(
                panel,
                codes::INVALID_CONFIGURATION,
                "Panel port must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Fail-fast check used by adapter constructors.
pub(crate) fn require_setting(panel: &str, label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(PanelError::validation(
            panel,
            codes::INVALID_CONFIGURATION,
            format!("{label} is required"),
        ))
    } else {
        Ok(())
    }
}

// ============ Per-panel credentials ============

/// WHM API token authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpanelCredentials {
    /// WHM (reseller/root) username owning the token.
    pub username: String,
    pub api_token: SecretString,
    /// cPanel account that UAPI calls (mail, databases) run as.
    /// Defaults to `username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpanel_user: Option<String>,
}

/// Plesk XML API authentication: a secret key, or login/password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PleskCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,
    /// When set together with `password`, overrides key authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
}

/// DirectAdmin basic-auth login (admin, reseller, or login key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectAdminCredentials {
    pub username: String,
    pub password: SecretString,
}

/// CyberPanel API access: bearer token plus admin credentials sent in
/// every JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyberPanelCredentials {
    pub api_key: SecretString,
    pub admin_username: String,
    pub admin_password: SecretString,
}

/// CloudPanel API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudPanelCredentials {
    pub api_key: SecretString,
}

/// ISPConfig remote user; authenticates through a login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspConfigCredentials {
    pub username: String,
    pub password: SecretString,
    /// Full remote API URL, overriding `<endpoint>/remote/json.php`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_api_url: Option<String>,
    /// Server that new sites, mailboxes and databases are placed on.
    #[serde(default = "default_server_id")]
    pub server_id: u32,
    /// Client (or reseller) that new records are owned by; `0` is admin.
    #[serde(default)]
    pub client_id: u32,
}

const fn default_server_id() -> u32 {
    1
}

/// Virtualmin remote API login (Webmin user with remote access).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualminCredentials {
    pub username: String,
    pub password: SecretString,
}

// ============ Credential Types ============

/// Validation error for flat-map credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required credential field is missing entirely.
    MissingField {
        panel: PanelType,
        field: String,
        label: String,
    },
    /// A credential field is present but empty/whitespace-only.
    EmptyField {
        panel: PanelType,
        field: String,
        label: String,
    },
    /// A credential field has an invalid format.
    InvalidFormat {
        panel: PanelType,
        field: String,
        label: String,
        reason: String,
    },
}

impl std::fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { label, .. } => write!(f, "Missing required field: {label}"),
            Self::EmptyField { label, .. } => write!(f, "Field must not be empty: {label}"),
            Self::InvalidFormat { label, reason, .. } => write!(f, "{label}: {reason}"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Type-safe credential container for every supported panel.
///
/// Serialized as `{ "panel": "cpanel", "credentials": { ... } }`.
/// Pass to [`create_panel()`](crate::create_panel) together with
/// [`ConnectionSettings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "panel", content = "credentials", rename_all = "lowercase")]
pub enum PanelCredentials {
    Cpanel(CpanelCredentials),
    Plesk(PleskCredentials),
    Directadmin(DirectAdminCredentials),
    Cyberpanel(CyberPanelCredentials),
    Cloudpanel(CloudPanelCredentials),
    Ispconfig(IspConfigCredentials),
    Virtualmin(VirtualminCredentials),
}

type FieldMap = HashMap<String, String>;

impl PanelCredentials {
    /// Construct credentials from a flat key-value map (e.g. a stored server
    /// record), validating required fields.
    pub fn from_map(
        panel: &PanelType,
        map: &FieldMap,
    ) -> std::result::Result<Self, CredentialValidationError> {
        let required = |key: &str, label: &str| required_field(*panel, map, key, label);
        let optional = |key: &str| optional_field(map, key);

        Ok(match panel {
            PanelType::Cpanel => Self::Cpanel(CpanelCredentials {
                username: required("username", "WHM Username")?,
                api_token: required("apiToken", "API Token")?.into(),
                cpanel_user: optional("cpanelUser"),
            }),
            PanelType::Plesk => {
                let creds = PleskCredentials {
                    api_key: optional("apiKey").map(SecretString::from),
                    username: optional("username"),
                    password: optional("password").map(SecretString::from),
                };
                if creds.api_key.is_none()
                    && (creds.username.is_none() || creds.password.is_none())
                {
                    return Err(CredentialValidationError::InvalidFormat {
                        panel: *panel,
                        field: "apiKey".to_string(),
                        label: "API Key".to_string(),
                        reason: "either an API key or a username and password is required"
                            .to_string(),
                    });
                }
                Self::Plesk(creds)
            }
            PanelType::Directadmin => Self::Directadmin(DirectAdminCredentials {
                username: required("username", "Username")?,
                password: required("password", "Password")?.into(),
            }),
            PanelType::Cyberpanel => Self::Cyberpanel(CyberPanelCredentials {
                api_key: required("apiKey", "API Key")?.into(),
                admin_username: required("adminUsername", "Admin Username")?,
                admin_password: required("adminPassword", "Admin Password")?.into(),
            }),
            PanelType::Cloudpanel => Self::Cloudpanel(CloudPanelCredentials {
                api_key: required("apiKey", "API Key")?.into(),
            }),
            PanelType::Ispconfig => Self::Ispconfig(IspConfigCredentials {
                username: required("username", "Remote User")?,
                password: required("password", "Remote Password")?.into(),
                remote_api_url: optional("remoteApiUrl"),
                server_id: numeric_field(*panel, map, "serverId", "Server ID")?
                    .unwrap_or(default_server_id()),
                client_id: numeric_field(*panel, map, "clientId", "Client ID")?.unwrap_or(0),
            }),
            PanelType::Virtualmin => Self::Virtualmin(VirtualminCredentials {
                username: required("username", "Username")?,
                password: required("password", "Password")?.into(),
            }),
        })
    }

    /// Convert credentials to a flat map for key-value storage.
    pub fn to_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        let mut put = |key: &str, value: &str| {
            map.insert(key.to_string(), value.to_string());
        };
        match self {
            Self::Cpanel(c) => {
                put("username", &c.username);
                put("apiToken", c.api_token.expose());
                if let Some(user) = &c.cpanel_user {
                    put("cpanelUser", user);
                }
            }
            Self::Plesk(c) => {
                if let Some(key) = &c.api_key {
                    put("apiKey", key.expose());
                }
                if let Some(user) = &c.username {
                    put("username", user);
                }
                if let Some(password) = &c.password {
                    put("password", password.expose());
                }
            }
            Self::Directadmin(c) => {
                put("username", &c.username);
                put("password", c.password.expose());
            }
            Self::Cyberpanel(c) => {
                put("apiKey", c.api_key.expose());
                put("adminUsername", &c.admin_username);
                put("adminPassword", c.admin_password.expose());
            }
            Self::Cloudpanel(c) => put("apiKey", c.api_key.expose()),
            Self::Ispconfig(c) => {
                put("username", &c.username);
                put("password", c.password.expose());
                if let Some(url) = &c.remote_api_url {
                    put("remoteApiUrl", url);
                }
                put("serverId", &c.server_id.to_string());
                put("clientId", &c.client_id.to_string());
            }
            Self::Virtualmin(c) => {
                put("username", &c.username);
                put("password", c.password.expose());
            }
        }
        map
    }

    /// Returns the [`PanelType`] corresponding to this credential variant.
    pub fn panel_type(&self) -> PanelType {
        match self {
            Self::Cpanel(_) => PanelType::Cpanel,
            Self::Plesk(_) => PanelType::Plesk,
            Self::Directadmin(_) => PanelType::Directadmin,
            Self::Cyberpanel(_) => PanelType::Cyberpanel,
            Self::Cloudpanel(_) => PanelType::Cloudpanel,
            Self::Ispconfig(_) => PanelType::Ispconfig,
            Self::Virtualmin(_) => PanelType::Virtualmin,
        }
    }
}

fn required_field(
    panel: PanelType,
    map: &FieldMap,
    key: &str,
    label: &str,
) -> std::result::Result<String, CredentialValidationError> {
    match map.get(key) {
        None => Err(CredentialValidationError::MissingField {
            panel,
            field: key.to_string(),
            label: label.to_string(),
        }),
        Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
            panel,
            field: key.to_string(),
            label: label.to_string(),
        }),
        Some(v) => Ok(v.clone()),
    }
}

fn optional_field(map: &FieldMap, key: &str) -> Option<String> {
    map.get(key)
        .filter(|v| !v.trim().is_empty())
        .cloned()
}

fn numeric_field(
    panel: PanelType,
    map: &FieldMap,
    key: &str,
    label: &str,
) -> std::result::Result<Option<u32>, CredentialValidationError> {
    optional_field(map, key)
        .map(|v| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| CredentialValidationError::InvalidFormat {
                    panel,
                    field: key.to_string(),
                    label: label.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn endpoint_from_bare_host() {
        let c = ConnectionSettings::new("panel.example.com", 2087, true);
        assert_eq!(c.endpoint(), "https://panel.example.com:2087");
    }

    #[test]
    fn endpoint_strips_scheme_port_and_slash() {
        let c = ConnectionSettings::new("http://panel.example.com:1234/", 2222, false);
        assert_eq!(c.endpoint(), "http://panel.example.com:2222");
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let c = ConnectionSettings::new("https://host.example/cp", 8443, true);
        assert_eq!(c.endpoint(), "https://host.example:8443/cp");
    }

    #[test]
    fn connection_validation() {
        assert!(ConnectionSettings::new(" ", 2087, true).validate("t").is_err());
        assert!(ConnectionSettings::new("h", 0, true).validate("t").is_err());
        assert!(ConnectionSettings::new("h", 1, true).validate("t").is_ok());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let creds = CpanelCredentials {
            username: "root".to_string(),
            api_token: "SUPERSECRET".into(),
            cpanel_user: None,
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("SUPERSECRET"));
        assert!(debug.contains("root"));
    }

    #[test]
    fn cpanel_roundtrip() {
        let res = PanelCredentials::from_map(
            &PanelType::Cpanel,
            &map(&[("username", "root"), ("apiToken", "tok")]),
        );
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(creds) = res else {
            return;
        };
        assert_eq!(creds.panel_type(), PanelType::Cpanel);
        let back = creds.to_map();
        assert_eq!(back.get("apiToken").map(String::as_str), Some("tok"));
        assert!(!back.contains_key("cpanelUser"));
    }

    #[test]
    fn plesk_requires_key_or_login() {
        let res = PanelCredentials::from_map(&PanelType::Plesk, &map(&[("username", "admin")]));
        assert!(
            matches!(&res, Err(CredentialValidationError::InvalidFormat { .. })),
            "unexpected result: {res:?}"
        );

        let ok = PanelCredentials::from_map(&PanelType::Plesk, &map(&[("apiKey", "k")]));
        assert!(ok.is_ok());
    }

    #[test]
    fn ispconfig_defaults_and_numeric_validation() {
        let res = PanelCredentials::from_map(
            &PanelType::Ispconfig,
            &map(&[("username", "remote"), ("password", "pw")]),
        );
        let Ok(PanelCredentials::Ispconfig(creds)) = res else {
            panic!("unexpected result: {res:?}");
        };
        assert_eq!(creds.server_id, 1);
        assert_eq!(creds.client_id, 0);

        let bad = PanelCredentials::from_map(
            &PanelType::Ispconfig,
            &map(&[("username", "remote"), ("password", "pw"), ("serverId", "abc")]),
        );
        assert!(matches!(
            bad,
            Err(CredentialValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn missing_and_empty_fields() {
        let missing = PanelCredentials::from_map(&PanelType::Cloudpanel, &FieldMap::new());
        assert!(matches!(
            missing,
            Err(CredentialValidationError::MissingField { .. })
        ));

        let empty = PanelCredentials::from_map(
            &PanelType::Virtualmin,
            &map(&[("username", "root"), ("password", "  ")]),
        );
        assert!(matches!(
            empty,
            Err(CredentialValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn credentials_serialize_tagged() {
        let creds = PanelCredentials::Cloudpanel(CloudPanelCredentials {
            api_key: "k".into(),
        });
        let json = serde_json::to_string(&creds).unwrap();
        assert_eq!(json, r#"{"panel":"cloudpanel","credentials":{"apiKey":"k"}}"#);
    }
}

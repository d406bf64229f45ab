use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege granted when a request does not list any.
pub const DEFAULT_PRIVILEGE: &str = "ALL PRIVILEGES";
/// Database engine used when a request does not name one.
pub const DEFAULT_DATABASE_TYPE: &str = "mysql";

// ============ Panel Types ============

/// Identifies which hosting control panel implementation to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    /// cPanel / WHM.
    Cpanel,
    /// Plesk Obsidian.
    Plesk,
    /// DirectAdmin.
    Directadmin,
    /// CyberPanel.
    Cyberpanel,
    /// CloudPanel.
    Cloudpanel,
    /// ISPConfig 3.
    Ispconfig,
    /// Virtualmin (Webmin module).
    Virtualmin,
}

impl PanelType {
    /// All known panel types, regardless of enabled features.
    pub const ALL: [Self; 7] = [
        Self::Cpanel,
        Self::Plesk,
        Self::Directadmin,
        Self::Cyberpanel,
        Self::Cloudpanel,
        Self::Ispconfig,
        Self::Virtualmin,
    ];

    /// Stable lowercase identifier, also used in log lines and errors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpanel => "cpanel",
            Self::Plesk => "plesk",
            Self::Directadmin => "directadmin",
            Self::Cyberpanel => "cyberpanel",
            Self::Cloudpanel => "cloudpanel",
            Self::Ispconfig => "ispconfig",
            Self::Virtualmin => "virtualmin",
        }
    }
}

impl std::fmt::Display for PanelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PanelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' ', '/'], "");
        match normalized.as_str() {
            "cpanel" | "whm" | "cpanelwhm" | "whmcpanel" => Ok(Self::Cpanel),
            "plesk" => Ok(Self::Plesk),
            "directadmin" => Ok(Self::Directadmin),
            "cyberpanel" => Ok(Self::Cyberpanel),
            "cloudpanel" => Ok(Self::Cloudpanel),
            "ispconfig" => Ok(Self::Ispconfig),
            "virtualmin" => Ok(Self::Virtualmin),
            _ => Err(format!("Unknown control panel type: {s}")),
        }
    }
}

/// Lifecycle state of a hosting account as reported by the panel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account is serving traffic.
    Active,
    /// Account was suspended/disabled by an administrator.
    Suspended,
    /// Status could not be determined.
    #[default]
    Unknown,
}

// ============ Requests ============

/// Request to create or update a web hosting account.
///
/// Optional limits are only forwarded to the panel when present, so an absent
/// field keeps the panel's own default (usually the plan's value).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingAccountRequest {
    pub domain: String,
    pub username: String,
    pub password: String,
    pub email: String,
    /// Package / plan / service-plan name.
    pub plan: String,
    /// Disk quota in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_quota_mb: Option<u64>,
    /// Monthly bandwidth limit in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_email_accounts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_databases: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ftp_accounts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_subdomains: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgi_access: Option<bool>,
    /// Vendor-specific parameters passed through verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_settings: BTreeMap<String, String>,
}

/// Request to create a mailbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailAccountRequest {
    /// Full address, e.g. `info@example.com`.
    pub email: String,
    pub password: String,
    /// Mail domain. When blank, the part after `@` is used.
    #[serde(default)]
    pub domain: String,
    /// Mailbox quota in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_mb: Option<u64>,
}

impl MailAccountRequest {
    /// The mail domain, falling back to the address's domain part.
    pub fn mail_domain(&self) -> &str {
        let domain = self.domain.trim();
        if domain.is_empty() {
            self.email.split_once('@').map_or("", |(_, d)| d)
        } else {
            domain
        }
    }

    /// The mailbox name (the part before `@`).
    pub fn local_part(&self) -> &str {
        self.email.split_once('@').map_or("", |(l, _)| l)
    }
}

/// Request to create a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRequest {
    pub database_name: String,
    /// Engine name; defaults to [`DEFAULT_DATABASE_TYPE`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
    /// Owning hosting account (domain or panel account id) for panels that
    /// scope databases to a site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
}

impl DatabaseRequest {
    pub fn database_type(&self) -> &str {
        non_blank(self.database_type.as_deref()).unwrap_or(DEFAULT_DATABASE_TYPE)
    }

    pub fn privileges(&self) -> Vec<String> {
        privileges_or_default(&self.privileges)
    }
}

/// Request to create a database user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUserRequest {
    pub username: String,
    pub password: String,
    /// Database (as returned in [`DatabaseResult::account_id`]) to grant on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    /// Owning hosting account for panels that scope users to a site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
}

impl DatabaseUserRequest {
    pub fn privileges(&self) -> Vec<String> {
        privileges_or_default(&self.privileges)
    }
}

pub(crate) fn privileges_or_default(privileges: &[String]) -> Vec<String> {
    let cleaned: Vec<String> = privileges
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if cleaned.is_empty() {
        vec![DEFAULT_PRIVILEGE.to_string()]
    } else {
        cleaned
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============ Results ============

/// Outcome of creating a hosting account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingAccountResult {
    pub success: bool,
    pub message: String,
    /// Provider-defined account identifier, stable for later calls on the
    /// same adapter.
    pub account_id: String,
    pub domain: String,
    pub username: String,
    pub email: String,
    pub plan: String,
    #[serde(default, with = "crate::utils::datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Outcome of creating a mailbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailAccountResult {
    pub success: bool,
    pub message: String,
    pub account_id: String,
    pub email: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_mb: Option<u64>,
    #[serde(default, with = "crate::utils::datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Outcome of creating a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseResult {
    pub success: bool,
    pub message: String,
    pub account_id: String,
    pub database_name: String,
    pub database_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, with = "crate::utils::datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Generic acknowledgement of a mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateResult {
    pub success: bool,
    pub message: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(default, with = "crate::utils::datetime")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AccountUpdateResult {
    /// A successful acknowledgement stamped with the current time.
    pub fn succeeded(account_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            account_id: account_id.into(),
            updated_date: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Record which field changed and to what.
    #[must_use]
    pub fn field(mut self, name: &str, new_value: Option<String>) -> Self {
        self.updated_field = Some(name.to_string());
        self.new_value = new_value;
        self
    }
}

/// Read model shared by single-get and list operations of every resource
/// type (hosting accounts, mailboxes, databases, database users).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoResult {
    pub success: bool,
    pub message: String,
    pub account_id: String,
    pub domain: String,
    pub username: String,
    pub email: String,
    pub plan: String,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_usage_mb: Option<u64>,
    /// `None` means unlimited or not reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_quota_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_usage_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_limit_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, with = "crate::utils::datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub additional_info: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AccountInfoResult {
    /// A successful read-model entry for `account_id`.
    pub fn found(account_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    /// Insert an `additional_info` entry when the value is non-empty.
    #[must_use]
    pub fn with_info(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.additional_info.insert(key.to_string(), value);
        }
        self
    }
}

// ============ Panel Metadata Types ============

/// The input type of a credential field (affects UI rendering).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text input.
    Text,
    /// Masked/password input.
    Password,
}

/// Definition of a single credential field required by a panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelCredentialField {
    /// Machine-readable field key (e.g., `"apiToken"`).
    pub key: String,
    /// Human-readable label (e.g., `"API Token"`).
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field may be left out.
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl PanelCredentialField {
    pub(crate) fn text(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type: FieldType::Text,
            optional: false,
            help_text: None,
        }
    }

    pub(crate) fn password(key: &str, label: &str) -> Self {
        Self {
            field_type: FieldType::Password,
            ..Self::text(key, label)
        }
    }

    #[must_use]
    pub(crate) fn optional(mut self, help_text: &str) -> Self {
        self.optional = true;
        self.help_text = Some(help_text.to_string());
        self
    }
}

/// Which canonical capabilities a panel backs with a real vendor primitive.
///
/// Operations outside these flags answer with `NOT_SUPPORTED`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PanelFeatures {
    pub mail_accounts: bool,
    pub mail_quotas: bool,
    pub databases: bool,
    pub database_users: bool,
    pub privilege_grants: bool,
    pub disk_quotas: bool,
    pub bandwidth_limits: bool,
}

/// Static metadata describing a control panel adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelMetadata {
    pub id: PanelType,
    /// Human-readable panel name.
    pub name: String,
    pub description: String,
    /// Port the panel's API listens on out of the box.
    pub default_port: u16,
    pub required_fields: Vec<PanelCredentialField>,
    pub features: PanelFeatures,
}

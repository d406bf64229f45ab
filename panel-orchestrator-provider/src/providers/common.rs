//! Panel 公共工具函数

use crate::error::{PanelError, Result, codes};
use crate::types::HostingAccountRequest;

/// Largest quota (in MB) accepted by any setter; 1 PiB.
pub(crate) const MAX_QUOTA_MB: u64 = 1 << 30;

// ============ 字段映射 ============

/// A canonical hosting-account field that adapters map onto vendor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CanonicalField {
    Domain,
    Username,
    Password,
    Email,
    Plan,
    DiskQuota,
    Bandwidth,
    MaxEmail,
    MaxDatabases,
    MaxFtp,
    MaxSubdomains,
    Shell,
    Cgi,
}

/// How a panel spells booleans on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoolStyle {
    /// `1` / `0`
    OneZero,
    /// `y` / `n`
    YN,
    /// `ON` / `OFF`
    OnOff,
    /// `true` / `false`
    TrueFalse,
}

impl BoolStyle {
    pub const fn render(self, value: bool) -> &'static str {
        match (self, value) {
            (Self::OneZero, true) => "1",
            (Self::OneZero, false) => "0",
            (Self::YN, true) => "y",
            (Self::YN, false) => "n",
            (Self::OnOff, true) => "ON",
            (Self::OnOff, false) => "OFF",
            (Self::TrueFalse, true) => "true",
            (Self::TrueFalse, false) => "false",
        }
    }
}

/// One row of a panel's field mapping table.
pub(crate) type FieldMapping = (CanonicalField, &'static str);

impl CanonicalField {
    /// The request's value for this field, or `None` when absent or blank.
    pub fn value(self, req: &HostingAccountRequest, bools: BoolStyle) -> Option<String> {
        let text = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        match self {
            Self::Domain => text(&req.domain),
            Self::Username => text(&req.username),
            Self::Password => (!req.password.is_empty()).then(|| req.password.clone()),
            Self::Email => text(&req.email),
            Self::Plan => text(&req.plan),
            Self::DiskQuota => req.disk_quota_mb.map(|v| v.to_string()),
            Self::Bandwidth => req.bandwidth_mb.map(|v| v.to_string()),
            Self::MaxEmail => req.max_email_accounts.map(|v| v.to_string()),
            Self::MaxDatabases => req.max_databases.map(|v| v.to_string()),
            Self::MaxFtp => req.max_ftp_accounts.map(|v| v.to_string()),
            Self::MaxSubdomains => req.max_subdomains.map(|v| v.to_string()),
            Self::Shell => req.shell_access.map(|v| bools.render(v).to_string()),
            Self::Cgi => req.cgi_access.map(|v| bools.render(v).to_string()),
        }
    }
}

impl CanonicalField {
    const ALL: [Self; 13] = [
        Self::Domain,
        Self::Username,
        Self::Password,
        Self::Email,
        Self::Plan,
        Self::DiskQuota,
        Self::Bandwidth,
        Self::MaxEmail,
        Self::MaxDatabases,
        Self::MaxFtp,
        Self::MaxSubdomains,
        Self::Shell,
        Self::Cgi,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Username => "username",
            Self::Password => "password",
            Self::Email => "email",
            Self::Plan => "plan",
            Self::DiskQuota => "disk_quota_mb",
            Self::Bandwidth => "bandwidth_mb",
            Self::MaxEmail => "max_email_accounts",
            Self::MaxDatabases => "max_databases",
            Self::MaxFtp => "max_ftp_accounts",
            Self::MaxSubdomains => "max_subdomains",
            Self::Shell => "shell_access",
            Self::Cgi => "cgi_access",
        }
    }
}

/// Comma-separated names of the canonical fields `req` carries, for
/// `AccountUpdateResult::updated_field`.
pub(crate) fn present_fields(req: &HostingAccountRequest) -> String {
    CanonicalField::ALL
        .iter()
        .filter(|f| f.value(req, BoolStyle::OneZero).is_some())
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(",")
}

/// Owned key/value pairs from string slices.
pub(crate) fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Translate `req` through `table` only, without `additional_settings`.
pub(crate) fn table_values(
    req: &HostingAccountRequest,
    table: &[FieldMapping],
    bools: BoolStyle,
) -> Vec<(String, String)> {
    table
        .iter()
        .filter_map(|(field, key)| field.value(req, bools).map(|v| ((*key).to_string(), v)))
        .collect()
}

/// Translate `req` through `table` into vendor key/value pairs.
///
/// Fields absent from the request are left out so the panel applies its own
/// defaults. `additional_settings` entries are appended last, in key order.
pub(crate) fn map_fields(
    req: &HostingAccountRequest,
    table: &[FieldMapping],
    bools: BoolStyle,
) -> Vec<(String, String)> {
    let mut pairs = table_values(req, table, bools);
    pairs.extend(
        req.additional_settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    pairs
}

/// Same as [`map_fields`], as a JSON object.
pub(crate) fn map_fields_json(
    req: &HostingAccountRequest,
    table: &[FieldMapping],
    bools: BoolStyle,
) -> serde_json::Map<String, serde_json::Value> {
    map_fields(req, table, bools)
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect()
}

/// `application/x-www-form-urlencoded` serialization (also used for query strings).
pub(crate) fn encode_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a `a=1&b=2` body into decoded pairs, keeping order.
pub(crate) fn decode_pairs(body: &str) -> Vec<(String, String)> {
    body.trim()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), std::borrow::Cow::into_owned)
}

/// Deserialize a field panels send as a string, a number, a bool or null.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => if b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    })
}

/// `"1"`, `"y"`, `"yes"`, `"true"`, `"on"` (any case).
pub(crate) fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "on"
    )
}

// ============ 容量换算 ============

/// Parse a panel size string into megabytes.
///
/// Accepts `"1000"` (MB), `"1000M"`, `"1000 MB"`, `"2G"`, `"1.5GB"`, `"1T"`,
/// `"512K"` and `"1048576B"`. Returns `None` for `"unlimited"`, blanks and
/// anything unparsable.
pub(crate) fn parse_size_mb(raw: &str) -> Option<u64> {
    let s = raw.trim().to_ascii_uppercase();
    if s.is_empty() || s == "UNLIMITED" || s == "UNLIMITED MB" || s == "-1" {
        return None;
    }
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let number: f64 = number.parse().ok()?;
    let factor = match unit.trim() {
        "" | "M" | "MB" | "MIB" => 1.0,
        "G" | "GB" | "GIB" => 1024.0,
        "T" | "TB" | "TIB" => 1024.0 * 1024.0,
        "K" | "KB" | "KIB" => 1.0 / 1024.0,
        "B" | "BYTES" => 1.0 / (1024.0 * 1024.0),
        _ => return None,
    };
    let mb = (number * factor).round();
    // 数值均为非负且已取整
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(mb as u64)
}

/// Bytes reported by a panel, in whole megabytes.
pub(crate) const fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

pub(crate) const fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

/// A quota in MB as the panel reports it: `0` or negative means unlimited.
pub(crate) fn limit_mb(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}

// ============ 参数校验 ============

fn invalid(panel: &str, code: &str, message: impl Into<String>) -> PanelError {
    PanelError::validation(panel, code, message)
}

pub(crate) fn validate_domain(panel: &str, domain: &str) -> Result<()> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(invalid(panel, codes::INVALID_DOMAIN, "Domain is required"));
    }
    let well_formed = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if well_formed {
        Ok(())
    } else {
        Err(invalid(
            panel,
            codes::INVALID_DOMAIN,
            format!("Invalid domain name: {domain}"),
        ))
    }
}

pub(crate) fn validate_username(panel: &str, username: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err(invalid(panel, codes::INVALID_USERNAME, "Username is required"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(invalid(
            panel,
            codes::INVALID_USERNAME,
            format!("Invalid username: {username}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_password(panel: &str, password: &str) -> Result<()> {
    if password.trim().is_empty() {
        Err(invalid(panel, codes::INVALID_PASSWORD, "Password is required"))
    } else {
        Ok(())
    }
}

/// An address with exactly one `@` and non-empty local and domain parts.
pub(crate) fn validate_email(panel: &str, email: &str) -> Result<()> {
    let email = email.trim();
    let valid = email.matches('@').count() == 1
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
        && !email.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(invalid(
            panel,
            codes::INVALID_EMAIL_FORMAT,
            format!("Invalid email address: '{email}'"),
        ))
    }
}

/// Validate `email` and split it into local part and domain.
pub(crate) fn split_email<'a>(panel: &str, email: &'a str) -> Result<(&'a str, &'a str)> {
    validate_email(panel, email)?;
    email
        .trim()
        .split_once('@')
        .ok_or_else(|| invalid(panel, codes::INVALID_EMAIL_FORMAT, "Invalid email address"))
}

pub(crate) fn validate_account_id(panel: &str, account_id: &str) -> Result<()> {
    if account_id.trim().is_empty() {
        Err(invalid(panel, codes::INVALID_ACCOUNT_ID, "Account id is required"))
    } else {
        Ok(())
    }
}

pub(crate) fn validate_database_name(panel: &str, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid(
            panel,
            codes::INVALID_DATABASE_NAME,
            "Database name is required",
        ));
    }
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(invalid(
            panel,
            codes::INVALID_DATABASE_NAME,
            format!("Invalid database name: {name}"),
        ))
    }
}

pub(crate) fn validate_quota(panel: &str, quota_mb: u64) -> Result<()> {
    if quota_mb > MAX_QUOTA_MB {
        Err(invalid(
            panel,
            codes::INVALID_QUOTA,
            format!("Quota {quota_mb} MB exceeds the maximum of {MAX_QUOTA_MB} MB"),
        ))
    } else {
        Ok(())
    }
}

/// Pre-flight checks shared by every hosting-account create.
pub(crate) fn validate_hosting_request(panel: &str, req: &HostingAccountRequest) -> Result<()> {
    validate_domain(panel, &req.domain)?;
    validate_username(panel, &req.username)?;
    validate_password(panel, &req.password)?;
    if !req.email.trim().is_empty() {
        validate_email(panel, &req.email)?;
    }
    for quota in [req.disk_quota_mb, req.bandwidth_mb].into_iter().flatten() {
        validate_quota(panel, quota)?;
    }
    Ok(())
}

/// Pre-flight checks for an update: only the fields present are checked.
pub(crate) fn validate_hosting_update(
    panel: &str,
    account_id: &str,
    req: &HostingAccountRequest,
) -> Result<()> {
    validate_account_id(panel, account_id)?;
    if !req.domain.trim().is_empty() {
        validate_domain(panel, &req.domain)?;
    }
    if !req.email.trim().is_empty() {
        validate_email(panel, &req.email)?;
    }
    for quota in [req.disk_quota_mb, req.bandwidth_mb].into_iter().flatten() {
        validate_quota(panel, quota)?;
    }
    Ok(())
}

//! ISPConfig remote API records

use serde::Deserialize;

use crate::providers::common::lenient_string;

/// `{"code": "ok" | "remote_fault", "message": "...", "response": ...}`
#[derive(Debug, Deserialize)]
pub struct IspResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response: serde_json::Value,
}

/// `web_domain` row.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IspWebDomain {
    #[serde(default, deserialize_with = "lenient_string")]
    pub domain_id: String,
    #[serde(default)]
    pub domain: String,
    /// `vhost`, `alias`, `subdomain`, `vhostsubdomain`
    #[serde(default, rename = "type")]
    pub domain_type: String,
    /// `y` / `n`
    #[serde(default)]
    pub active: String,
    /// MB, `-1` unlimited.
    #[serde(default, deserialize_with = "lenient_string")]
    pub hd_quota: String,
    /// MB per month, `-1` unlimited.
    #[serde(default, deserialize_with = "lenient_string")]
    pub traffic_quota: String,
    #[serde(default)]
    pub cgi: String,
    #[serde(default)]
    pub php: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub document_root: String,
    #[serde(default)]
    pub system_user: String,
    #[serde(default)]
    pub system_group: String,
    #[serde(default)]
    pub added_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub server_id: String,
}

/// `ftp_user` row.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IspFtpUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ftp_user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub parent_domain_id: String,
}

/// `mail_user` row.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IspMailUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mailuser_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: String,
    /// Bytes, `0` / `-1` unlimited.
    #[serde(default, deserialize_with = "lenient_string")]
    pub quota: String,
    /// `y` while the mailbox is enabled.
    #[serde(default)]
    pub postfix: String,
}

/// `web_database` row.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IspDatabase {
    #[serde(default, deserialize_with = "lenient_string")]
    pub database_id: String,
    #[serde(default)]
    pub database_name: String,
    #[serde(default, rename = "type")]
    pub database_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub parent_domain_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub database_user_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub database_ro_user_id: String,
    #[serde(default)]
    pub active: String,
}

/// `web_database_user` row.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IspDatabaseUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub database_user_id: String,
    #[serde(default)]
    pub database_user: String,
}

//! DirectAdmin url-encoded response records

use super::http::value;

/// `CMD_API_SHOW_USER_CONFIG` (plus usage from `CMD_API_SHOW_USER_USAGE`).
#[derive(Debug, Default, Clone)]
pub struct UserConfig {
    pub username: String,
    pub domain: String,
    pub email: String,
    pub package: String,
    pub suspended: String,
    /// MB or `"unlimited"`.
    pub quota: String,
    /// MB or `"unlimited"`.
    pub bandwidth: String,
    pub ip: String,
    pub date_created: String,
    pub creator: String,
    pub nemails: String,
    pub mysql: String,
    pub ftp: String,
    pub nsubdomains: String,
    pub ssh: String,
    pub cgi: String,
    /// Used disk space in MB.
    pub quota_used: String,
    /// Used bandwidth in MB.
    pub bandwidth_used: String,
}

impl UserConfig {
    pub fn from_pairs(username: &str, pairs: &[(String, String)]) -> Self {
        let get = |key: &str| value(pairs, key).unwrap_or_default().to_string();
        Self {
            username: username.to_string(),
            domain: get("domain"),
            email: get("email"),
            package: get("package"),
            suspended: get("suspended"),
            quota: get("quota"),
            bandwidth: get("bandwidth"),
            ip: get("ip"),
            date_created: get("date_created"),
            creator: get("creator"),
            nemails: get("nemails"),
            mysql: get("mysql"),
            ftp: get("ftp"),
            nsubdomains: get("nsubdomains"),
            ssh: get("ssh"),
            cgi: get("cgi"),
            ..Self::default()
        }
    }

    /// Merge `CMD_API_SHOW_USER_USAGE` values.
    #[must_use]
    pub fn with_usage(mut self, pairs: &[(String, String)]) -> Self {
        self.quota_used = value(pairs, "quota").unwrap_or_default().to_string();
        self.bandwidth_used = value(pairs, "bandwidth").unwrap_or_default().to_string();
        self
    }
}

/// One entry of `CMD_API_POP?action=list&type=quota`: `usage` / `quota` in bytes.
#[derive(Debug, Default, Clone)]
pub struct PopQuota {
    pub user: String,
    pub usage: String,
    pub quota: String,
}

impl PopQuota {
    /// The value is itself url-encoded: `user=usage%3D1024%26quota%3D0`.
    pub fn from_entry(user: &str, encoded: &str) -> Self {
        let inner = crate::providers::common::decode_pairs(encoded);
        Self {
            user: user.to_string(),
            usage: value(&inner, "usage").unwrap_or_default().to_string(),
            quota: value(&inner, "quota").unwrap_or_default().to_string(),
        }
    }
}

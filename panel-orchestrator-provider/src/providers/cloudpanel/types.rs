//! CloudPanel API types

use serde::Deserialize;

use crate::providers::common::lenient_string;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct CloudResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Machine-readable error code (`not_found`, `validation_failed`).
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Field validation messages (`{"domainName": ["already taken"]}`).
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSite {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub site_user: String,
    /// `php`, `nodejs`, `python`, `static`, `reverse-proxy`
    #[serde(default, rename = "type")]
    pub site_type: String,
    #[serde(default)]
    pub php_version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ip_address: String,
    /// MB
    #[serde(default, deserialize_with = "lenient_string")]
    pub disk_usage: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudDatabase {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub site_id: String,
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudDatabaseUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub database_id: String,
    #[serde(default)]
    pub database_name: String,
    /// `read-write` or `read-only`
    #[serde(default)]
    pub permissions: String,
    #[serde(default)]
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_from_json() {
        let site: CloudSite = serde_json::from_str(
            r#"{"id":12,"domainName":"example.com","siteUser":"exuser","type":"php",
                "phpVersion":"8.3","status":"active","diskUsage":140,"createdAt":"2024-03-01 10:20:30"}"#,
        )
        .unwrap();
        assert_eq!(site.id, "12");
        assert_eq!(site.site_type, "php");
        assert_eq!(site.disk_usage, "140");
    }

    #[test]
    fn envelope_defaults() {
        let response: CloudResponse = serde_json::from_str(r#"{"message":"x"}"#).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
    }
}

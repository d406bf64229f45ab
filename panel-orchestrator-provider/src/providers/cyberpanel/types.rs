//! CyberPanel response rows

use serde::Deserialize;

use crate::providers::common::lenient_string;

/// Row of `fetchWebsites`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CyberWebsite {
    #[serde(default)]
    pub domain: String,
    #[serde(default, rename = "adminEmail")]
    pub admin_email: String,
    #[serde(default, rename = "ipAddress")]
    pub ip_address: String,
    /// Owning CyberPanel user.
    #[serde(default)]
    pub admin: String,
    #[serde(default)]
    pub package: String,
    /// `"Active"` or `"Suspended"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    /// e.g. `"125 MB"`
    #[serde(default, rename = "diskUsed", deserialize_with = "lenient_string")]
    pub disk_used: String,
}

/// Row of `getEmailsForDomain`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CyberMailbox {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "DiskUsage", deserialize_with = "lenient_string")]
    pub disk_usage: String,
}

/// Row of `fetchDatabases`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CyberDatabase {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, rename = "dbName")]
    pub db_name: String,
    #[serde(default, rename = "dbUser")]
    pub db_user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_row() {
        let site: CyberWebsite = serde_json::from_str(
            r#"{"domain":"example.com","adminEmail":"a@example.com","ipAddress":"203.0.113.5",
                "admin":"exuser","package":"Default","state":"Active","diskUsed":"12 MB"}"#,
        )
        .unwrap();
        assert_eq!(site.admin, "exuser");
        assert_eq!(site.disk_used, "12 MB");
    }

    #[test]
    fn database_row_with_numeric_id() {
        let db: CyberDatabase =
            serde_json::from_str(r#"{"id":4,"dbName":"shop","dbUser":"shopuser"}"#).unwrap();
        assert_eq!(db.id, "4");
        assert_eq!(db.db_user, "shopuser");
    }
}

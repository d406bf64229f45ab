//! WHM API 1 / UAPI response types

use serde::Deserialize;

use crate::providers::common::lenient_string;

/// WHM API 1 envelope: `{"metadata": {...}, "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct WhmResponse<T> {
    pub metadata: WhmMetadata,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct WhmMetadata {
    /// `1` on success, `0` on failure.
    pub result: i64,
    #[serde(default)]
    pub reason: String,
}

/// `data` of `accountsummary` and `listaccts`.
#[derive(Debug, Default, Deserialize)]
pub struct WhmAccountList {
    #[serde(default)]
    pub acct: Vec<WhmAccount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WhmAccount {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub suspended: String,
    #[serde(default)]
    pub suspendreason: String,
    /// e.g. `"25M"`
    #[serde(default, deserialize_with = "lenient_string")]
    pub diskused: String,
    /// e.g. `"1000M"` or `"unlimited"`
    #[serde(default, deserialize_with = "lenient_string")]
    pub disklimit: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unix_startdate: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maxpop: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maxsql: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maxftp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maxsub: String,
    #[serde(default)]
    pub shell: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub partition: String,
}

/// `data` of `getdomainowner`.
#[derive(Debug, Default, Deserialize)]
pub struct WhmDomainOwner {
    #[serde(default)]
    pub user: Option<String>,
}

/// `data` of `uapi_cpanel`: the proxied UAPI result.
#[derive(Debug, Deserialize)]
pub struct UapiWrapper<T> {
    pub uapi: UapiResult<T>,
}

#[derive(Debug, Deserialize)]
pub struct UapiResult<T> {
    /// `1` on success.
    pub status: i64,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    pub data: Option<T>,
}

/// Element of `Email::list_pops_with_disk`.
#[derive(Debug, Default, Deserialize)]
pub struct UapiMailbox {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub domain: String,
    /// MB, as a string or number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub diskused: String,
    /// MB or `"unlimited"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub diskquota: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub suspended_login: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mtime: String,
}

/// Element of `Mysql::list_databases`.
#[derive(Debug, Default, Deserialize)]
pub struct UapiDatabase {
    #[serde(default)]
    pub database: String,
    /// Bytes.
    #[serde(default, deserialize_with = "lenient_string")]
    pub disk_usage: String,
    #[serde(default)]
    pub users: Vec<String>,
}

/// Element of `Mysql::list_users`.
#[derive(Debug, Default, Deserialize)]
pub struct UapiDatabaseUser {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub databases: Vec<String>,
}

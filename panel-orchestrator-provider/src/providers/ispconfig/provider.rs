//! ISPConfig HostingPanel trait 实现

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::error::{PanelError, Result, codes};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, bytes_to_mb, limit_mb, mb_to_bytes, present_fields,
    split_email, table_values, validate_account_id, validate_database_name,
    validate_hosting_request, validate_hosting_update, validate_password, validate_quota,
    validate_username,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType,
    non_blank, privileges_or_default,
};
use crate::utils::datetime::parse_panel_timestamp;

use super::http::{Args, args};
use super::{
    IspConfigProvider, IspDatabase, IspDatabaseUser, IspFtpUser, IspMailUser, IspWebDomain, PANEL,
};

/// `web_domain` columns settable from a hosting request.
const SITE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Domain, "domain"),
    (CanonicalField::DiskQuota, "hd_quota"),
    (CanonicalField::Bandwidth, "traffic_quota"),
    (CanonicalField::Cgi, "cgi"),
];

/// Mailboxes live under the virtual mail user's home.
const VMAIL_UID: u32 = 5000;
const VMAIL_HOME: &str = "/var/vmail";

const HOSTING: &str = "Web domain";
const FTP_USER: &str = "FTP user";
const MAILBOX: &str = "Mail account";
const DATABASE: &str = "Database";
const DATABASE_USER: &str = "Database user";

fn numeric_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let id = id.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Ok(id)
    } else {
        Err(PanelError::validation(
            PANEL,
            codes::INVALID_ACCOUNT_ID,
            format!("{what} id must be numeric: {id:?}"),
        ))
    }
}

/// Site columns as JSON; a quota of `0` is ISPConfig's `-1` (unlimited).
fn site_params(req: &HostingAccountRequest) -> Map<String, Value> {
    table_values(req, SITE_FIELDS, BoolStyle::YN)
        .into_iter()
        .map(|(key, value)| {
            let value = match (key.as_str(), value.as_str()) {
                ("hd_quota" | "traffic_quota", "0") => "-1".to_string(),
                _ => value,
            };
            (key, Value::String(value))
        })
        .collect()
}

/// Defaults for a new name-based vhost.
fn site_defaults(server_id: u32) -> Map<String, Value> {
    let defaults = json!({
        "server_id": server_id,
        "ip_address": "*",
        "ipv6_address": "",
        "type": "vhost",
        "parent_domain_id": 0,
        "vhost_type": "name",
        "hd_quota": -1,
        "traffic_quota": -1,
        "cgi": "n",
        "ssi": "n",
        "suexec": "y",
        "errordocs": 1,
        "is_subdomainwww": 1,
        "subdomain": "www",
        "php": "php-fpm",
        "ruby": "n",
        "python": "n",
        "perl": "n",
        "redirect_type": "",
        "redirect_path": "",
        "ssl": "n",
        "stats_type": "awstats",
        "allow_override": "All",
        "http_port": 80,
        "https_port": 443,
        "pm": "ondemand",
        "pm_max_children": 10,
        "pm_start_servers": 2,
        "pm_min_spare_servers": 1,
        "pm_max_spare_servers": 5,
        "pm_process_idle_timeout": 10,
        "pm_max_requests": 0,
        "active": "y",
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn quota_mb(raw: &str) -> Option<u64> {
    raw.trim().parse::<i64>().ok().and_then(limit_mb)
}

impl IspConfigProvider {
    pub(crate) fn site_to_info(site: IspWebDomain) -> AccountInfoResult {
        let status = match site.active.as_str() {
            "y" => AccountStatus::Active,
            "n" => AccountStatus::Suspended,
            _ => AccountStatus::Unknown,
        };
        AccountInfoResult {
            domain: site.domain,
            username: site.system_user,
            status,
            disk_quota_mb: quota_mb(&site.hd_quota),
            bandwidth_limit_mb: quota_mb(&site.traffic_quota),
            ip_address: Some(site.ip_address).filter(|ip| !ip.is_empty() && ip != "*"),
            created_date: parse_panel_timestamp(&site.added_date),
            ..AccountInfoResult::found(site.domain_id)
        }
        .with_info("php", site.php)
        .with_info("cgi", site.cgi)
        .with_info("document_root", site.document_root)
        .with_info("server_id", site.server_id)
    }

    fn mailbox_to_info(mailbox: IspMailUser) -> AccountInfoResult {
        let domain = mailbox
            .email
            .split_once('@')
            .map_or("", |(_, d)| d)
            .to_string();
        let status = match mailbox.postfix.as_str() {
            "n" => AccountStatus::Suspended,
            _ => AccountStatus::Active,
        };
        AccountInfoResult {
            domain,
            username: mailbox.login,
            email: mailbox.email.clone(),
            status,
            disk_quota_mb: mailbox
                .quota
                .trim()
                .parse::<u64>()
                .ok()
                .map(bytes_to_mb)
                .filter(|mb| *mb > 0),
            ..AccountInfoResult::found(mailbox.email)
        }
        .with_info("mailuser_id", mailbox.mailuser_id)
        .with_info("name", mailbox.name)
    }

    fn database_to_info(db: IspDatabase) -> AccountInfoResult {
        let status = if db.active == "n" {
            AccountStatus::Suspended
        } else {
            AccountStatus::Active
        };
        AccountInfoResult {
            username: db.database_name.clone(),
            status,
            ..AccountInfoResult::found(db.database_id)
        }
        .with_info("name", db.database_name)
        .with_info("database_type", db.database_type)
        .with_info("parent_domain_id", db.parent_domain_id)
        .with_info("database_user_id", db.database_user_id)
        .with_info("database_ro_user_id", db.database_ro_user_id)
    }

    fn database_user_to_info(user: IspDatabaseUser) -> AccountInfoResult {
        AccountInfoResult {
            username: user.database_user,
            status: AccountStatus::Active,
            ..AccountInfoResult::found(user.database_user_id)
        }
    }

    fn client_args(&self, extra: Args) -> Args {
        let mut out = args([("client_id", json!(self.client_id))]);
        out.extend(extra);
        out
    }

    // ---- web domains ----

    async fn site(&self, id: &str) -> Result<IspWebDomain> {
        self.get_one("sites_web_domain_get", id, ErrorContext::new(HOSTING, id))
            .await?
            .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, id))
    }

    /// Web domain id for a numeric id or a domain name.
    async fn resolve_site(&self, site: &str) -> Result<String> {
        let site = site.trim();
        if numeric_id(site, "Site").is_ok() {
            return Ok(site.to_string());
        }
        let sites: Vec<IspWebDomain> = self
            .get_many(
                "sites_web_domain_get",
                json!({ "domain": site }),
                ErrorContext::new(HOSTING, site),
            )
            .await?;
        sites
            .into_iter()
            .find(|s| s.domain_type == "vhost" || s.domain_type.is_empty())
            .map(|s| s.domain_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, site))
    }

    async fn update_site(&self, id: &str, params: Map<String, Value>) -> Result<()> {
        self.call(
            "sites_web_domain_update",
            self.client_args(args([("primary_id", json!(id)), ("params", Value::Object(params))])),
            ErrorContext::new(HOSTING, id),
        )
        .await?;
        Ok(())
    }

    async fn create_account(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let domain = req.domain.trim();

        let mut params = site_defaults(self.server_id);
        params.extend(site_params(req));
        params.extend(
            req.additional_settings
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone()))),
        );

        let id = self
            .add(
                "sites_web_domain_add",
                self.client_args(args([("params", Value::Object(params))])),
                ErrorContext::new(HOSTING, domain),
            )
            .await?;

        // 站点已建好但 FTP 用户失败时删除站点，返回原始错误
        if let Err(e) = self.add_ftp_user(&id, req).await {
            log::warn!("[{PANEL}] FTP user for web domain {id} failed, removing the site");
            if let Err(cleanup) = self.delete_account(&id).await {
                log::warn!("[{PANEL}] web domain {id} left behind: {cleanup}");
            }
            return Err(e);
        }

        Ok(HostingAccountResult {
            success: true,
            message: format!("Web domain {domain} created"),
            account_id: id,
            domain: domain.to_string(),
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            plan: req.plan.trim().to_string(),
            created_date: Some(Utc::now()),
            ..HostingAccountResult::default()
        })
    }

    /// FTP login carrying the account's username and password.
    async fn add_ftp_user(&self, id: &str, req: &HostingAccountRequest) -> Result<()> {
        let site = self.site(id).await?;
        self.add(
            "sites_ftp_user_add",
            self.client_args(args([(
                "params",
                json!({
                    "server_id": self.server_id,
                    "parent_domain_id": id,
                    "username": req.username.trim(),
                    "password": req.password,
                    "quota_size": -1,
                    "active": "y",
                    "uid": site.system_user,
                    "gid": site.system_group,
                    "dir": site.document_root,
                    "quota_files": -1,
                    "ul_ratio": -1,
                    "dl_ratio": -1,
                    "ul_bandwidth": -1,
                    "dl_bandwidth": -1,
                }),
            )])),
            ErrorContext::new(FTP_USER, req.username.trim()),
        )
        .await?;
        Ok(())
    }

    async fn update_account(
        &self,
        account_id: &str,
        req: &HostingAccountRequest,
    ) -> Result<AccountUpdateResult> {
        validate_hosting_update(PANEL, account_id, req)?;
        let id = numeric_id(account_id, "Site")?;
        let fields = present_fields(req);
        if fields.is_empty() {
            return Ok(AccountUpdateResult::succeeded(id, "Nothing to update"));
        }
        let params = site_params(req);
        let password = CanonicalField::Password.value(req, BoolStyle::YN);
        if params.is_empty() && password.is_none() {
            return Err(PanelError::not_supported(
                PANEL,
                &format!("update_web_hosting_account ({fields})"),
            ));
        }

        if !params.is_empty() {
            self.update_site(id, params).await?;
        }
        if let Some(password) = password {
            self.ftp_password(id, &password).await?;
        }
        Ok(
            AccountUpdateResult::succeeded(id, format!("Web domain {id} updated"))
                .field(&fields, None),
        )
    }

    async fn ftp_password(&self, site_id: &str, password: &str) -> Result<()> {
        let users: Vec<IspFtpUser> = self
            .get_many(
                "sites_ftp_user_get",
                json!({ "parent_domain_id": site_id }),
                ErrorContext::new(FTP_USER, site_id),
            )
            .await?;
        let user = users
            .into_iter()
            .find(|u| !u.ftp_user_id.is_empty() && u.parent_domain_id == site_id)
            .ok_or_else(|| PanelError::not_found(PANEL, FTP_USER, site_id))?;
        self.call(
            "sites_ftp_user_update",
            self.client_args(args([
                ("primary_id", json!(user.ftp_user_id)),
                ("params", json!({ "password": password })),
            ])),
            ErrorContext::new(FTP_USER, user.username.as_str()),
        )
        .await?;
        Ok(())
    }

    async fn set_active(&self, account_id: &str, active: bool) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        let mut params = Map::new();
        params.insert("active".to_string(), json!(BoolStyle::YN.render(active)));
        self.update_site(id, params).await?;
        let state = if active { "active" } else { "suspended" };
        Ok(
            AccountUpdateResult::succeeded(id, format!("Web domain {id} {state}"))
                .field("status", Some(state.to_string())),
        )
    }

    async fn delete_account(&self, account_id: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        self.call(
            "sites_web_domain_delete",
            args([("primary_id", json!(id))]),
            ErrorContext::new(HOSTING, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, format!("Web domain {id} deleted")))
    }

    async fn account_info(&self, account_id: &str) -> Result<AccountInfoResult> {
        let id = numeric_id(account_id, "Site")?;
        Ok(Self::site_to_info(self.site(id).await?))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfoResult>> {
        let sites: Vec<IspWebDomain> = self
            .get_many("sites_web_domain_get", json!(-1), ErrorContext::resource(HOSTING))
            .await?;
        Ok(sites
            .into_iter()
            .filter(|s| !s.domain_id.is_empty() && (s.domain_type == "vhost" || s.domain_type.is_empty()))
            .map(Self::site_to_info)
            .collect())
    }

    async fn change_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        validate_password(PANEL, password)?;
        self.ftp_password(id, password).await?;
        Ok(AccountUpdateResult::succeeded(id, "Password changed").field("password", None))
    }

    async fn set_site_limit(
        &self,
        account_id: &str,
        column: &str,
        limit_mb: u64,
        field: &str,
    ) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        validate_quota(PANEL, limit_mb)?;
        let value = if limit_mb == 0 { -1 } else { i64::try_from(limit_mb).unwrap_or(-1) };
        let mut params = Map::new();
        params.insert(column.to_string(), json!(value));
        self.update_site(id, params).await?;
        Ok(
            AccountUpdateResult::succeeded(id, format!("{field} set to {limit_mb} MB"))
                .field(field, Some(limit_mb.to_string())),
        )
    }

    // ---- mail ----

    async fn mail_user(&self, email: &str) -> Result<IspMailUser> {
        split_email(PANEL, email)?;
        let email = email.trim();
        let users: Vec<IspMailUser> = self
            .get_many(
                "mail_user_get",
                json!({ "email": email }),
                ErrorContext::new(MAILBOX, email),
            )
            .await?;
        users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| PanelError::not_found(PANEL, MAILBOX, email))
    }

    async fn update_mail_user(&self, email: &str, params: Value) -> Result<()> {
        let user = self.mail_user(email).await?;
        self.call(
            "mail_user_update",
            self.client_args(args([
                ("primary_id", json!(user.mailuser_id)),
                ("params", params),
            ])),
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(())
    }

    async fn create_mailbox(&self, req: &MailAccountRequest) -> Result<MailAccountResult> {
        let (local, _) = split_email(PANEL, &req.email)?;
        validate_password(PANEL, &req.password)?;
        let quota = req.quota_mb.unwrap_or(0);
        validate_quota(PANEL, quota)?;
        let domain = req.mail_domain().to_string();
        let email = format!("{local}@{domain}");

        self.add(
            "mail_user_add",
            self.client_args(args([(
                "params",
                json!({
                    "server_id": self.server_id,
                    "email": email,
                    "login": email,
                    "password": req.password,
                    "name": local,
                    "uid": VMAIL_UID,
                    "gid": VMAIL_UID,
                    "maildir": format!("{VMAIL_HOME}/{domain}/{local}"),
                    "homedir": VMAIL_HOME,
                    "quota": mb_to_bytes(quota),
                    "cc": "",
                    "forward_in_lda": "n",
                    "move_junk": "n",
                    "postfix": "y",
                    "disableimap": "n",
                    "disablepop3": "n",
                    "disabledeliver": "n",
                    "disablesmtp": "n",
                    "autoresponder": "n",
                }),
            )])),
            ErrorContext::new(MAILBOX, email.as_str()),
        )
        .await?;

        Ok(MailAccountResult {
            success: true,
            message: format!("Mail account {email} created"),
            account_id: email.clone(),
            email,
            domain,
            quota_mb: req.quota_mb,
            created_date: Some(Utc::now()),
            ..MailAccountResult::default()
        })
    }

    async fn delete_mailbox(&self, email: &str) -> Result<AccountUpdateResult> {
        let user = self.mail_user(email).await?;
        self.call(
            "mail_user_delete",
            args([("primary_id", json!(user.mailuser_id))]),
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            email,
            format!("Mail account {email} deleted"),
        ))
    }

    async fn mailboxes(&self, domain: &str) -> Result<Vec<AccountInfoResult>> {
        let domain = domain.trim();
        let users: Vec<IspMailUser> = self
            .get_many(
                "mail_user_get",
                json!({ "email": format!("%@{domain}") }),
                ErrorContext::new("Mail domain", domain),
            )
            .await?;
        Ok(users
            .into_iter()
            .filter(|u| !u.email.is_empty())
            .map(Self::mailbox_to_info)
            .collect())
    }

    // ---- databases ----

    async fn create_db(&self, req: &DatabaseRequest) -> Result<DatabaseResult> {
        validate_database_name(PANEL, &req.database_name)?;
        let Some(site) = non_blank(req.domain.as_deref()) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_DOMAIN,
                "ISPConfig databases belong to a web domain; domain or web domain id is required",
            ));
        };
        let site_id = self.resolve_site(site).await?;
        let name = req.database_name.trim();

        let user = non_blank(req.username.as_deref());
        let user_id = match (user, non_blank(req.password.as_deref())) {
            (Some(user), Some(password)) => Some(self.add_db_user(user, password).await?),
            (Some(user), None) => Some(self.db_user_id_by_name(user).await?),
            (None, _) => None,
        };
        // ISPConfig keeps one read-write and one read-only user per database
        let read_only = req
            .privileges()
            .iter()
            .all(|p| p.eq_ignore_ascii_case("SELECT"));
        let (rw_user, ro_user) = match (&user_id, read_only) {
            (Some(id), false) => (id.as_str(), "0"),
            (Some(id), true) => ("0", id.as_str()),
            (None, _) => ("0", "0"),
        };

        let id = self
            .add(
                "sites_database_add",
                self.client_args(args([(
                    "params",
                    json!({
                        "server_id": self.server_id,
                        "parent_domain_id": site_id,
                        "type": req.database_type().to_ascii_lowercase(),
                        "database_name": name,
                        "database_user_id": rw_user,
                        "database_ro_user_id": ro_user,
                        "database_charset": "utf8mb4",
                        "remote_access": "n",
                        "remote_ips": "",
                        "backup_interval": "none",
                        "backup_copies": 1,
                        "active": "y",
                    }),
                )])),
                ErrorContext::new(DATABASE, name),
            )
            .await?;

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: id,
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            username: user.map(str::to_string),
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    async fn delete_db(&self, database_id: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(database_id, DATABASE)?;
        self.call(
            "sites_database_delete",
            args([("primary_id", json!(id))]),
            ErrorContext::new(DATABASE, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, format!("Database {id} deleted")))
    }

    async fn database(&self, database_id: &str) -> Result<IspDatabase> {
        let id = numeric_id(database_id, DATABASE)?;
        self.get_one("sites_database_get", id, ErrorContext::new(DATABASE, id))
            .await?
            .ok_or_else(|| PanelError::not_found(PANEL, DATABASE, id))
    }

    async fn databases(&self, account_id: &str) -> Result<Vec<IspDatabase>> {
        let filter = if account_id.trim().is_empty() {
            json!(-1)
        } else {
            json!({ "parent_domain_id": self.resolve_site(account_id).await? })
        };
        let dbs: Vec<IspDatabase> = self
            .get_many("sites_database_get", filter, ErrorContext::resource(DATABASE))
            .await?;
        Ok(dbs.into_iter().filter(|db| !db.database_id.is_empty()).collect())
    }

    async fn list_dbs(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        Ok(self
            .databases(account_id)
            .await?
            .into_iter()
            .map(Self::database_to_info)
            .collect())
    }

    // ---- database users ----

    async fn add_db_user(&self, user: &str, password: &str) -> Result<String> {
        self.add(
            "sites_database_user_add",
            self.client_args(args([(
                "params",
                json!({
                    "server_id": self.server_id,
                    "database_user": user,
                    "database_password": password,
                }),
            )])),
            ErrorContext::new(DATABASE_USER, user),
        )
        .await
    }

    async fn db_user_id_by_name(&self, user: &str) -> Result<String> {
        let users: Vec<IspDatabaseUser> = self
            .get_many(
                "sites_database_user_get",
                json!({ "database_user": user }),
                ErrorContext::new(DATABASE_USER, user),
            )
            .await?;
        users
            .into_iter()
            .find(|u| u.database_user == user)
            .map(|u| u.database_user_id)
            .ok_or_else(|| PanelError::not_found(PANEL, DATABASE_USER, user))
    }

    async fn create_db_user(&self, req: &DatabaseUserRequest) -> Result<AccountUpdateResult> {
        validate_username(PANEL, &req.username)?;
        validate_password(PANEL, &req.password)?;
        let database = non_blank(req.database_name.as_deref())
            .map(|db| numeric_id(db, DATABASE))
            .transpose()?;
        let user = req.username.trim();

        let id = self.add_db_user(user, &req.password).await?;
        if let Some(database) = database {
            self.grant(&id, database, &req.privileges()).await?;
        }
        Ok(
            AccountUpdateResult::succeeded(id, format!("Database user {user} created"))
                .field("user", Some(user.to_string())),
        )
    }

    async fn delete_db_user(&self, user_id: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(user_id, DATABASE_USER)?;
        self.call(
            "sites_database_user_delete",
            args([("primary_id", json!(id))]),
            ErrorContext::new(DATABASE_USER, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, format!("Database user {id} deleted")))
    }

    async fn db_user_password(&self, user_id: &str, password: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(user_id, DATABASE_USER)?;
        validate_password(PANEL, password)?;
        self.call(
            "sites_database_user_update",
            self.client_args(args([
                ("primary_id", json!(id)),
                ("params", json!({ "database_password": password })),
            ])),
            ErrorContext::new(DATABASE_USER, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, "Password changed").field("password", None))
    }

    /// Attach `user_id` to `database_id` as its read-write user, or as the
    /// read-only user when only `SELECT` is requested.
    async fn grant(&self, user_id: &str, database_id: &str, privileges: &[String]) -> Result<AccountUpdateResult> {
        let user_id = numeric_id(user_id, DATABASE_USER)?;
        let database_id = numeric_id(database_id, DATABASE)?;
        let privileges = privileges_or_default(privileges);
        let column = if privileges.iter().all(|p| p.eq_ignore_ascii_case("SELECT")) {
            "database_ro_user_id"
        } else {
            "database_user_id"
        };
        self.call(
            "sites_database_update",
            self.client_args(args([
                ("primary_id", json!(database_id)),
                ("params", json!({ column: user_id })),
            ])),
            ErrorContext::new(DATABASE, database_id),
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(
                user_id,
                format!("Database user {user_id} granted on database {database_id}"),
            )
            .field(column, Some(privileges.join(","))),
        )
    }

    async fn db_user_info(&self, user_id: &str) -> Result<AccountInfoResult> {
        let id = numeric_id(user_id, DATABASE_USER)?;
        let user: IspDatabaseUser = self
            .get_one("sites_database_user_get", id, ErrorContext::new(DATABASE_USER, id))
            .await?
            .ok_or_else(|| PanelError::not_found(PANEL, DATABASE_USER, id))?;
        Ok(Self::database_user_to_info(user))
    }

    /// All database users, or those attached to databases of `account_id`.
    async fn list_db_users(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let users: Vec<IspDatabaseUser> = self
            .get_many("sites_database_user_get", json!(-1), ErrorContext::resource(DATABASE_USER))
            .await?;
        let attached: Option<Vec<String>> = if account_id.trim().is_empty() {
            None
        } else {
            Some(
                self.databases(account_id)
                    .await?
                    .into_iter()
                    .flat_map(|db| [db.database_user_id, db.database_ro_user_id])
                    .collect(),
            )
        };
        Ok(users
            .into_iter()
            .filter(|u| !u.database_user_id.is_empty())
            .filter(|u| attached.as_ref().is_none_or(|ids| ids.contains(&u.database_user_id)))
            .map(Self::database_user_to_info)
            .collect())
    }
}

#[async_trait]
impl HostingPanel for IspConfigProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Ispconfig,
            name: "ISPConfig 3".to_string(),
            description: "ISPConfig remote JSON API with session login".to_string(),
            default_port: 8080,
            required_fields: vec![
                PanelCredentialField::text("username", "Remote User"),
                PanelCredentialField::password("password", "Remote Password"),
                PanelCredentialField::text("remoteApiUrl", "Remote API URL")
                    .optional("Defaults to <panel>/remote/json.php"),
                PanelCredentialField::text("serverId", "Server ID").optional("Defaults to 1"),
                PanelCredentialField::text("clientId", "Client ID").optional("Defaults to 0 (admin)"),
            ],
            features: PanelFeatures {
                mail_accounts: true,
                mail_quotas: true,
                databases: true,
                database_users: true,
                privilege_grants: true,
                disk_quotas: true,
                bandwidth_limits: true,
            },
        }
    }

    async fn test_connection(&self) -> bool {
        match self
            .call(
                "server_get_app_version",
                args([("server_id", json!(self.server_id))]),
                ErrorContext::default(),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                log::warn!("test_connection failed: {e}");
                false
            }
        }
    }

    async fn create_web_hosting_account(
        &self,
        request: &HostingAccountRequest,
    ) -> HostingAccountResult {
        guard(PANEL, "create_web_hosting_account", self.create_account(request)).await
    }

    async fn update_web_hosting_account(
        &self,
        account_id: &str,
        request: &HostingAccountRequest,
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "update_web_hosting_account",
            self.update_account(account_id, request),
        )
        .await
    }

    async fn suspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "suspend_web_hosting_account", async {
            validate_account_id(PANEL, account_id)?;
            self.set_active(account_id, false).await
        })
        .await
    }

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "unsuspend_web_hosting_account", async {
            validate_account_id(PANEL, account_id)?;
            self.set_active(account_id, true).await
        })
        .await
    }

    async fn delete_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_web_hosting_account", self.delete_account(account_id)).await
    }

    async fn get_web_hosting_account_info(&self, account_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_web_hosting_account_info", self.account_info(account_id)).await
    }

    async fn list_web_hosting_accounts(&self) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_web_hosting_accounts", self.list_accounts()).await
    }

    async fn change_web_hosting_password(
        &self,
        account_id: &str,
        new_password: &str,
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "change_web_hosting_password",
            self.change_password(account_id, new_password),
        )
        .await
    }

    async fn set_web_hosting_disk_quota(&self, account_id: &str, quota_mb: u64) -> AccountUpdateResult {
        guard(
            PANEL,
            "set_web_hosting_disk_quota",
            self.set_site_limit(account_id, "hd_quota", quota_mb, "disk_quota_mb"),
        )
        .await
    }

    async fn set_web_hosting_bandwidth_limit(
        &self,
        account_id: &str,
        limit_mb: u64,
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "set_web_hosting_bandwidth_limit",
            self.set_site_limit(account_id, "traffic_quota", limit_mb, "bandwidth_mb"),
        )
        .await
    }

    async fn create_mail_account(&self, request: &MailAccountRequest) -> MailAccountResult {
        guard(PANEL, "create_mail_account", self.create_mailbox(request)).await
    }

    async fn delete_mail_account(&self, email: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_mail_account", self.delete_mailbox(email)).await
    }

    async fn change_mail_password(&self, email: &str, new_password: &str) -> AccountUpdateResult {
        guard(PANEL, "change_mail_password", async {
            validate_password(PANEL, new_password)?;
            self.update_mail_user(email, json!({ "password": new_password }))
                .await?;
            Ok(AccountUpdateResult::succeeded(email, "Password changed").field("password", None))
        })
        .await
    }

    async fn set_mail_quota(&self, email: &str, quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_mail_quota", async {
            validate_quota(PANEL, quota_mb)?;
            self.update_mail_user(email, json!({ "quota": mb_to_bytes(quota_mb) }))
                .await?;
            Ok(
                AccountUpdateResult::succeeded(email, format!("Quota set to {quota_mb} MB"))
                    .field("quota_mb", Some(quota_mb.to_string())),
            )
        })
        .await
    }

    async fn get_mail_account_info(&self, email: &str) -> AccountInfoResult {
        guard(PANEL, "get_mail_account_info", async {
            Ok(Self::mailbox_to_info(self.mail_user(email).await?))
        })
        .await
    }

    async fn list_mail_accounts(&self, domain: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_mail_accounts", self.mailboxes(domain)).await
    }

    async fn create_database(&self, request: &DatabaseRequest) -> DatabaseResult {
        guard(PANEL, "create_database", self.create_db(request)).await
    }

    async fn delete_database(&self, database_id: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_database", self.delete_db(database_id)).await
    }

    async fn get_database_info(&self, database_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_info", async {
            Ok(Self::database_to_info(self.database(database_id).await?))
        })
        .await
    }

    async fn list_databases(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_databases", self.list_dbs(account_id)).await
    }

    async fn create_database_user(&self, request: &DatabaseUserRequest) -> AccountUpdateResult {
        guard(PANEL, "create_database_user", self.create_db_user(request)).await
    }

    async fn delete_database_user(&self, user_id: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_database_user", self.delete_db_user(user_id)).await
    }

    async fn change_database_user_password(
        &self,
        user_id: &str,
        new_password: &str,
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "change_database_user_password",
            self.db_user_password(user_id, new_password),
        )
        .await
    }

    async fn grant_database_privileges(
        &self,
        user_id: &str,
        database_id: &str,
        privileges: &[String],
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "grant_database_privileges",
            self.grant(user_id, database_id, privileges),
        )
        .await
    }

    async fn get_database_user_info(&self, user_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_user_info", self.db_user_info(user_id)).await
    }

    async fn list_database_users(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_database_users", self.list_db_users(account_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quota_is_unlimited() {
        let req = HostingAccountRequest {
            disk_quota_mb: Some(0),
            bandwidth_mb: Some(2048),
            cgi_access: Some(true),
            ..HostingAccountRequest::default()
        };
        let params = site_params(&req);
        assert_eq!(params["hd_quota"], json!("-1"));
        assert_eq!(params["traffic_quota"], json!("2048"));
        assert_eq!(params["cgi"], json!("y"));
        assert!(!params.contains_key("domain"));
    }

    #[test]
    fn defaults_describe_a_vhost() {
        let defaults = site_defaults(3);
        assert_eq!(defaults["server_id"], json!(3));
        assert_eq!(defaults["type"], json!("vhost"));
        assert_eq!(defaults["active"], json!("y"));
    }

    #[test]
    fn site_maps_to_info() {
        let info = IspConfigProvider::site_to_info(IspWebDomain {
            domain_id: "7".to_string(),
            domain: "example.com".to_string(),
            domain_type: "vhost".to_string(),
            active: "n".to_string(),
            hd_quota: "-1".to_string(),
            traffic_quota: "2048".to_string(),
            ip_address: "*".to_string(),
            system_user: "web7".to_string(),
            added_date: "2024-03-01".to_string(),
            ..IspWebDomain::default()
        });
        assert_eq!(info.account_id, "7");
        assert_eq!(info.status, AccountStatus::Suspended);
        assert_eq!(info.disk_quota_mb, None);
        assert_eq!(info.bandwidth_limit_mb, Some(2048));
        assert_eq!(info.ip_address, None);
        assert_eq!(info.username, "web7");
        assert!(info.created_date.is_some());
    }

    #[test]
    fn mailbox_quota_in_bytes() {
        let info = IspConfigProvider::mailbox_to_info(IspMailUser {
            mailuser_id: "3".to_string(),
            email: "info@example.com".to_string(),
            login: "info@example.com".to_string(),
            quota: "52428800".to_string(),
            postfix: "y".to_string(),
            ..IspMailUser::default()
        });
        assert_eq!(info.domain, "example.com");
        assert_eq!(info.disk_quota_mb, Some(50));
        assert_eq!(info.additional_info["mailuser_id"], "3");
    }
}

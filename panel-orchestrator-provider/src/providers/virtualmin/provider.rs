//! Virtualmin HostingPanel trait 实现

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{PanelError, Result, codes};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, mb_to_bytes, pairs, parse_size_mb, present_fields,
    split_email, table_values, validate_account_id, validate_database_name, validate_domain,
    validate_hosting_request, validate_hosting_update, validate_password, validate_quota,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType, non_blank,
};
use crate::utils::datetime::parse_panel_timestamp;

use super::http::Args;
use super::{PANEL, VirtualminProvider, VirtualminRecord};

/// `create-domain` arguments.
const CREATE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Domain, "domain"),
    (CanonicalField::Password, "pass"),
    (CanonicalField::Username, "user"),
    (CanonicalField::Email, "email"),
    (CanonicalField::Plan, "plan"),
    (CanonicalField::DiskQuota, "quota"),
    (CanonicalField::Bandwidth, "bandwidth"),
];

/// `modify-domain` arguments.
const MODIFY_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Domain, "newdomain"),
    (CanonicalField::Password, "pass"),
    (CanonicalField::Username, "user"),
    (CanonicalField::Email, "email"),
    (CanonicalField::Plan, "apply-plan"),
    (CanonicalField::DiskQuota, "quota"),
    (CanonicalField::Bandwidth, "bw"),
];

/// `modify-limits` arguments.
const LIMIT_FIELDS: &[FieldMapping] = &[
    (CanonicalField::MaxEmail, "max-mailboxes"),
    (CanonicalField::MaxDatabases, "max-dbs"),
    (CanonicalField::MaxSubdomains, "max-doms"),
];

const HOSTING: &str = "Virtual server";
const MAILBOX: &str = "Mail account";
const DATABASE: &str = "Database";

fn arg(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// Quotas are 1 KiB blocks; `0` is unlimited.
fn quota_blocks(mb: u64) -> String {
    if mb == 0 {
        "UNLIMITED".to_string()
    } else {
        mb.saturating_mul(1024).to_string()
    }
}

/// Bandwidth limits are bytes; `0` is no limit.
fn bandwidth_bytes(mb: u64) -> String {
    if mb == 0 {
        "NONE".to_string()
    } else {
        mb_to_bytes(mb).to_string()
    }
}

/// Request fields in Virtualmin units. A zero bandwidth on create is left to
/// the plan.
fn program_args(req: &HostingAccountRequest, table: &[FieldMapping]) -> Args {
    table_values(req, table, BoolStyle::OneZero)
        .into_iter()
        .filter_map(|(key, value)| {
            let mb = value.parse::<u64>().ok();
            let value = match (key.as_str(), mb) {
                ("quota", Some(mb)) => quota_blocks(mb),
                ("bandwidth", Some(0)) => return None,
                ("bandwidth" | "bw", Some(mb)) => bandwidth_bytes(mb),
                _ => value,
            };
            Some((key, value))
        })
        .collect()
}

/// `created_on` is `2024-03-01 10:20` on current releases.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    parse_panel_timestamp(raw).or_else(|| {
        ["%Y-%m-%d %H:%M", "%d/%b/%Y %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
            .map(|dt| dt.and_utc())
    })
}

/// `domain/name` database id.
fn split_database_id(id: &str) -> Result<(&str, &str)> {
    id.trim()
        .split_once('/')
        .filter(|(domain, name)| !domain.is_empty() && !name.is_empty())
        .ok_or_else(|| {
            PanelError::validation(
                PANEL,
                codes::INVALID_ACCOUNT_ID,
                format!("Database id must be <domain>/<name>: {id:?}"),
            )
        })
}

impl VirtualminProvider {
    pub(crate) fn domain_to_info(record: &VirtualminRecord) -> AccountInfoResult {
        let status = if record.value("disabled").is_some() {
            AccountStatus::Suspended
        } else {
            AccountStatus::Active
        };
        let size = |key: &str| record.value(key).and_then(parse_size_mb);
        AccountInfoResult {
            domain: record.name.clone(),
            username: record.value_or_default("username"),
            email: record.value_or_default("contact_email"),
            plan: record.value_or_default("plan"),
            status,
            disk_usage_mb: size("server_quota_used"),
            disk_quota_mb: size("server_quota"),
            bandwidth_usage_mb: size("bandwidth_usage"),
            bandwidth_limit_mb: size("bandwidth_limit"),
            ip_address: record.value("ip_address").map(str::to_string),
            created_date: record
                .value("created_on")
                .or_else(|| record.value("created"))
                .and_then(parse_created),
            ..AccountInfoResult::found(record.name.clone())
        }
        .with_info("home_directory", record.value_or_default("home_directory"))
        .with_info("features", record.value_or_default("features"))
    }

    fn mailbox_to_info(domain: &str, record: &VirtualminRecord) -> AccountInfoResult {
        let email = record
            .value("email_address")
            .map_or_else(|| format!("{}@{domain}", record.name), str::to_string);
        let size = |key: &str| record.value(key).and_then(parse_size_mb);
        AccountInfoResult {
            domain: domain.to_string(),
            username: record.name.clone(),
            email: email.clone(),
            status: if record.value("disabled").is_some() {
                AccountStatus::Suspended
            } else {
                AccountStatus::Active
            },
            disk_usage_mb: size("home_quota_used").or_else(|| size("mail_quota_used")),
            disk_quota_mb: size("home_quota").or_else(|| size("mail_quota")),
            ..AccountInfoResult::found(email)
        }
    }

    fn database_to_info(domain: &str, record: &VirtualminRecord) -> AccountInfoResult {
        AccountInfoResult {
            domain: domain.to_string(),
            username: record.name.clone(),
            status: AccountStatus::Active,
            ..AccountInfoResult::found(format!("{domain}/{}", record.name))
        }
        .with_info("name", record.name.clone())
        .with_info("database_type", record.value_or_default("type"))
    }

    // ---- virtual servers ----

    async fn domain_record(&self, domain: &str) -> Result<VirtualminRecord> {
        let domain = domain.trim();
        self.records(
            "list-domains",
            pairs(&[("domain", domain)]),
            ErrorContext::new(HOSTING, domain),
        )
        .await?
        .into_iter()
        .find(|r| r.name.eq_ignore_ascii_case(domain))
        .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, domain))
    }

    async fn domain_names(&self) -> Result<Vec<String>> {
        let response = self
            .remote(
                "list-domains",
                pairs(&[("name-only", "")]),
                ErrorContext::resource(HOSTING),
            )
            .await?;
        Ok(response
            .output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn modify_domain(&self, domain: &str, args: Args) -> Result<()> {
        let mut all = pairs(&[("domain", domain)]);
        all.extend(args);
        self.remote("modify-domain", all, ErrorContext::new(HOSTING, domain))
            .await?;
        Ok(())
    }

    async fn modify_limits(&self, domain: &str, limits: Args) -> Result<()> {
        let mut all = pairs(&[("domain", domain)]);
        all.extend(limits);
        self.remote("modify-limits", all, ErrorContext::new(HOSTING, domain))
            .await?;
        Ok(())
    }

    async fn create_account(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let domain = req.domain.trim();

        let mut args = program_args(req, CREATE_FIELDS);
        args.extend([arg("features-from-plan", ""), arg("unix", ""), arg("dir", "")]);
        args.extend(
            req.additional_settings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.remote("create-domain", args, ErrorContext::new(HOSTING, domain))
            .await?;

        let limits = table_values(req, LIMIT_FIELDS, BoolStyle::OneZero);
        if !limits.is_empty() {
            self.modify_limits(domain, limits).await?;
        }
        if req.shell_access.is_some() || req.cgi_access.is_some() || req.max_ftp_accounts.is_some() {
            log::debug!("[{PANEL}] shell/cgi/ftp limits come from the plan, ignored for {domain}");
        }

        Ok(HostingAccountResult {
            success: true,
            message: format!("Virtual server {domain} created"),
            account_id: domain.to_string(),
            domain: domain.to_string(),
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            plan: req.plan.trim().to_string(),
            created_date: Some(Utc::now()),
            ..HostingAccountResult::default()
        })
    }

    async fn update_account(
        &self,
        account_id: &str,
        req: &HostingAccountRequest,
    ) -> Result<AccountUpdateResult> {
        validate_hosting_update(PANEL, account_id, req)?;
        let domain = account_id.trim();
        let fields = present_fields(req);
        if fields.is_empty() {
            return Ok(AccountUpdateResult::succeeded(domain, "Nothing to update"));
        }
        let args = program_args(req, MODIFY_FIELDS);
        let limits = table_values(req, LIMIT_FIELDS, BoolStyle::OneZero);
        if args.is_empty() && limits.is_empty() {
            return Err(PanelError::not_supported(
                PANEL,
                &format!("update_web_hosting_account ({fields})"),
            ));
        }

        if !args.is_empty() {
            self.modify_domain(domain, args).await?;
        }
        if !limits.is_empty() {
            self.modify_limits(domain, limits).await?;
        }
        Ok(
            AccountUpdateResult::succeeded(domain, format!("Virtual server {domain} updated"))
                .field(&fields, None),
        )
    }

    async fn set_enabled(&self, account_id: &str, enabled: bool) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let domain = account_id.trim();
        let program = if enabled { "enable-domain" } else { "disable-domain" };
        self.remote(
            program,
            pairs(&[("domain", domain)]),
            ErrorContext::new(HOSTING, domain),
        )
        .await?;
        let state = if enabled { "active" } else { "suspended" };
        Ok(
            AccountUpdateResult::succeeded(domain, format!("Virtual server {domain} {state}"))
                .field("status", Some(state.to_string())),
        )
    }

    async fn delete_account(&self, account_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let domain = account_id.trim();
        self.remote(
            "delete-domain",
            pairs(&[("domain", domain)]),
            ErrorContext::new(HOSTING, domain),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            domain,
            format!("Virtual server {domain} deleted"),
        ))
    }

    async fn account_info(&self, account_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, account_id)?;
        Ok(Self::domain_to_info(&self.domain_record(account_id).await?))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfoResult>> {
        Ok(self
            .records("list-domains", Args::new(), ErrorContext::resource(HOSTING))
            .await?
            .iter()
            .filter(|r| !r.name.is_empty())
            .map(Self::domain_to_info)
            .collect())
    }

    async fn change_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_password(PANEL, password)?;
        let domain = account_id.trim();
        self.modify_domain(domain, pairs(&[("pass", password)])).await?;
        Ok(AccountUpdateResult::succeeded(domain, "Password changed").field("password", None))
    }

    async fn set_limit(
        &self,
        account_id: &str,
        (key, value): (&str, String),
        limit_mb: u64,
        field: &str,
    ) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_quota(PANEL, limit_mb)?;
        let domain = account_id.trim();
        self.modify_domain(domain, vec![arg(key, value)]).await?;
        Ok(
            AccountUpdateResult::succeeded(domain, format!("{field} set to {limit_mb} MB"))
                .field(field, Some(limit_mb.to_string())),
        )
    }

    // ---- mail ----

    async fn create_mailbox(&self, req: &MailAccountRequest) -> Result<MailAccountResult> {
        let (local, _) = split_email(PANEL, &req.email)?;
        validate_password(PANEL, &req.password)?;
        let domain = req.mail_domain().to_string();
        let email = format!("{local}@{domain}");

        let mut args = pairs(&[
            ("domain", domain.as_str()),
            ("user", local),
            ("pass", req.password.as_str()),
        ]);
        if let Some(quota) = req.quota_mb {
            validate_quota(PANEL, quota)?;
            args.push(arg("quota", quota_blocks(quota)));
        }
        self.remote("create-user", args, ErrorContext::new(MAILBOX, email.as_str()))
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

    async fn user_command(
        &self,
        program: &str,
        email: &str,
        extra: Args,
    ) -> Result<AccountUpdateResult> {
        let (local, domain) = split_email(PANEL, email)?;
        let mut args = pairs(&[("domain", domain), ("user", local)]);
        args.extend(extra);
        self.remote(program, args, ErrorContext::new(MAILBOX, email.trim()))
            .await?;
        Ok(AccountUpdateResult::succeeded(email.trim(), format!("{program} succeeded")))
    }

    async fn mailbox_info(&self, email: &str) -> Result<AccountInfoResult> {
        let (local, domain) = split_email(PANEL, email)?;
        let records = self
            .records(
                "list-users",
                pairs(&[("domain", domain), ("user", local)]),
                ErrorContext::new(MAILBOX, email.trim()),
            )
            .await?;
        records
            .iter()
            .map(|r| Self::mailbox_to_info(domain, r))
            .find(|info| info.email.eq_ignore_ascii_case(email.trim()) || info.username == local)
            .ok_or_else(|| PanelError::not_found(PANEL, MAILBOX, email.trim()))
    }

    async fn mailboxes(&self, domain: &str) -> Result<Vec<AccountInfoResult>> {
        validate_domain(PANEL, domain)?;
        let domain = domain.trim();
        Ok(self
            .records(
                "list-users",
                pairs(&[("domain", domain)]),
                ErrorContext::new("Mail domain", domain),
            )
            .await?
            .iter()
            // 域所有者本身也在 list-users 中，但没有邮箱地址
            .filter(|r| !r.name.is_empty() && r.value("email_address").is_some())
            .map(|r| Self::mailbox_to_info(domain, r))
            .collect())
    }

    // ---- databases ----

    async fn create_db(&self, req: &DatabaseRequest) -> Result<DatabaseResult> {
        validate_database_name(PANEL, &req.database_name)?;
        let Some(domain) = non_blank(req.domain.as_deref()) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_DOMAIN,
                "Virtualmin databases belong to a virtual server; domain is required",
            ));
        };
        let name = req.database_name.trim();
        let db_type = match req.database_type().to_ascii_lowercase().as_str() {
            "postgresql" | "pgsql" => "postgres".to_string(),
            other => other.to_string(),
        };
        if non_blank(req.username.as_deref()).is_some() {
            log::debug!("[{PANEL}] databases use the virtual server login, username ignored");
        }

        self.remote(
            "create-database",
            pairs(&[("domain", domain), ("name", name), ("type", db_type.as_str())]),
            ErrorContext::new(DATABASE, name),
        )
        .await?;

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: format!("{domain}/{name}"),
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    async fn delete_db(&self, database_id: &str) -> Result<AccountUpdateResult> {
        let (domain, name) = split_database_id(database_id)?;
        let db_type = self
            .database_record(domain, name)
            .await?
            .value("type")
            .unwrap_or("mysql")
            .to_string();
        self.remote(
            "delete-database",
            pairs(&[("domain", domain), ("name", name), ("type", db_type.as_str())]),
            ErrorContext::new(DATABASE, database_id.trim()),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            database_id.trim(),
            format!("Database {name} deleted"),
        ))
    }

    async fn database_record(&self, domain: &str, name: &str) -> Result<VirtualminRecord> {
        self.records(
            "list-databases",
            pairs(&[("domain", domain)]),
            ErrorContext::new(DATABASE, format!("{domain}/{name}")),
        )
        .await?
        .into_iter()
        .find(|r| r.name == name)
        .ok_or_else(|| PanelError::not_found(PANEL, DATABASE, format!("{domain}/{name}")))
    }

    async fn db_info(&self, database_id: &str) -> Result<AccountInfoResult> {
        let (domain, name) = split_database_id(database_id)?;
        let record = self.database_record(domain, name).await?;
        Ok(Self::database_to_info(domain, &record))
    }

    async fn databases_of(&self, domain: &str) -> Result<Vec<AccountInfoResult>> {
        Ok(self
            .records(
                "list-databases",
                pairs(&[("domain", domain)]),
                ErrorContext::new(HOSTING, domain),
            )
            .await?
            .iter()
            .filter(|r| !r.name.is_empty())
            .map(|r| Self::database_to_info(domain, r))
            .collect())
    }

    /// Databases of one virtual server, or of all of them for a blank id.
    async fn list_dbs(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let account_id = account_id.trim();
        if !account_id.is_empty() {
            return self.databases_of(account_id).await;
        }
        let mut all = Vec::new();
        for domain in self.domain_names().await? {
            match self.databases_of(&domain).await {
                Ok(dbs) => all.extend(dbs),
                Err(e) => log::warn!("[{PANEL}] skipping databases of {domain}: {e}"),
            }
        }
        Ok(all)
    }
}

macro_rules! not_supported {
    ($op:literal) => {
        guard(PANEL, $op, async { Err(PanelError::not_supported(PANEL, $op)) }).await
    };
}

#[async_trait]
impl HostingPanel for VirtualminProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Virtualmin,
            name: "Virtualmin".to_string(),
            description: "Virtualmin remote.cgi with JSON output".to_string(),
            default_port: 10000,
            required_fields: vec![
                PanelCredentialField::text("username", "Webmin Username"),
                PanelCredentialField::password("password", "Webmin Password"),
            ],
            features: PanelFeatures {
                mail_accounts: true,
                mail_quotas: true,
                databases: true,
                database_users: false,
                privilege_grants: false,
                disk_quotas: true,
                bandwidth_limits: true,
            },
        }
    }

    async fn test_connection(&self) -> bool {
        match self.domain_names().await {
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
        guard(PANEL, "suspend_web_hosting_account", self.set_enabled(account_id, false)).await
    }

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "unsuspend_web_hosting_account", self.set_enabled(account_id, true)).await
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
            self.set_limit(account_id, ("quota", quota_blocks(quota_mb)), quota_mb, "disk_quota_mb"),
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
            self.set_limit(account_id, ("bw", bandwidth_bytes(limit_mb)), limit_mb, "bandwidth_mb"),
        )
        .await
    }

    async fn create_mail_account(&self, request: &MailAccountRequest) -> MailAccountResult {
        guard(PANEL, "create_mail_account", self.create_mailbox(request)).await
    }

    async fn delete_mail_account(&self, email: &str) -> AccountUpdateResult {
        guard(
            PANEL,
            "delete_mail_account",
            self.user_command("delete-user", email, Args::new()),
        )
        .await
    }

    async fn change_mail_password(&self, email: &str, new_password: &str) -> AccountUpdateResult {
        guard(PANEL, "change_mail_password", async {
            validate_password(PANEL, new_password)?;
            let result = self
                .user_command("modify-user", email, pairs(&[("pass", new_password)]))
                .await?;
            Ok(result.field("password", None))
        })
        .await
    }

    async fn set_mail_quota(&self, email: &str, quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_mail_quota", async {
            validate_quota(PANEL, quota_mb)?;
            let result = self
                .user_command("modify-user", email, vec![arg("quota", quota_blocks(quota_mb))])
                .await?;
            Ok(result.field("quota_mb", Some(quota_mb.to_string())))
        })
        .await
    }

    async fn get_mail_account_info(&self, email: &str) -> AccountInfoResult {
        guard(PANEL, "get_mail_account_info", self.mailbox_info(email)).await
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
        guard(PANEL, "get_database_info", self.db_info(database_id)).await
    }

    async fn list_databases(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_databases", self.list_dbs(account_id)).await
    }

    async fn create_database_user(&self, _request: &DatabaseUserRequest) -> AccountUpdateResult {
        not_supported!("create_database_user")
    }

    async fn delete_database_user(&self, _user_id: &str) -> AccountUpdateResult {
        not_supported!("delete_database_user")
    }

    async fn change_database_user_password(
        &self,
        _user_id: &str,
        _new_password: &str,
    ) -> AccountUpdateResult {
        not_supported!("change_database_user_password")
    }

    async fn grant_database_privileges(
        &self,
        _user_id: &str,
        _database_id: &str,
        _privileges: &[String],
    ) -> AccountUpdateResult {
        not_supported!("grant_database_privileges")
    }

    async fn get_database_user_info(&self, _user_id: &str) -> AccountInfoResult {
        not_supported!("get_database_user_info")
    }

    async fn list_database_users(&self, _account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_database_users", async {
            Err(PanelError::not_supported(PANEL, "list_database_users"))
        })
        .await
    }
}

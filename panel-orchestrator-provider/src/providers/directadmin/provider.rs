//! DirectAdmin HostingPanel trait 实现

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{PanelError, Result, codes};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, bytes_to_mb, map_fields, pairs, parse_size_mb,
    present_fields, split_email, table_values, truthy, validate_account_id,
    validate_database_name, validate_hosting_request, validate_hosting_update, validate_password,
    validate_quota, validate_username,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType, non_blank,
};

use super::http::{Params, list_values};
use super::{DirectAdminProvider, PANEL, PopQuota, UserConfig};

/// `CMD_API_ACCOUNT_USER` parameters.
const CREATE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Username, "username"),
    (CanonicalField::Email, "email"),
    (CanonicalField::Password, "passwd"),
    (CanonicalField::Domain, "domain"),
    (CanonicalField::Plan, "package"),
    (CanonicalField::DiskQuota, "quota"),
    (CanonicalField::Bandwidth, "bandwidth"),
    (CanonicalField::MaxEmail, "nemails"),
    (CanonicalField::MaxDatabases, "mysql"),
    (CanonicalField::MaxFtp, "ftp"),
    (CanonicalField::MaxSubdomains, "nsubdomains"),
    (CanonicalField::Shell, "ssh"),
    (CanonicalField::Cgi, "cgi"),
];

/// `CMD_API_MODIFY_USER action=customize` parameters. The primary domain is
/// the account id and is not renamed here.
const CUSTOMIZE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::DiskQuota, "quota"),
    (CanonicalField::Bandwidth, "bandwidth"),
    (CanonicalField::MaxEmail, "nemails"),
    (CanonicalField::MaxDatabases, "mysql"),
    (CanonicalField::MaxFtp, "ftp"),
    (CanonicalField::MaxSubdomains, "nsubdomains"),
    (CanonicalField::Shell, "ssh"),
    (CanonicalField::Cgi, "cgi"),
];

const HOSTING: &str = "Hosting account";
const MAILBOX: &str = "Mail account";
const DATABASE: &str = "Database";
const DATABASE_USER: &str = "Database user";

/// `quota=0` / `bandwidth=0` become DirectAdmin's explicit unlimited flags.
fn unlimited_flags(params: Params) -> Params {
    params
        .into_iter()
        .map(|(key, value)| match (key.as_str(), value.as_str()) {
            ("quota", "0") => ("uquota".to_string(), "ON".to_string()),
            ("bandwidth", "0") => ("ubandwidth".to_string(), "ON".to_string()),
            _ => (key, value),
        })
        .collect()
}

/// `date_created` is ctime-style: `Fri Mar  1 10:20:30 2024`.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `<owner>_<name>` database names carry their owner as prefix.
fn database_owner(database_id: &str) -> Result<&str> {
    database_id
        .trim()
        .split_once('_')
        .map(|(owner, _)| owner)
        .filter(|owner| !owner.is_empty())
        .ok_or_else(|| {
            PanelError::validation(
                PANEL,
                codes::INVALID_ACCOUNT_ID,
                format!("Database id must look like <owner>_<name>: {database_id}"),
            )
        })
}

/// Database user ids are `<database>/<user>`; DirectAdmin scopes users to a
/// database.
fn split_user_id(user_id: &str) -> Result<(&str, &str)> {
    user_id
        .trim()
        .split_once('/')
        .filter(|(db, user)| !db.is_empty() && !user.is_empty())
        .ok_or_else(|| {
            PanelError::validation(
                PANEL,
                codes::INVALID_ACCOUNT_ID,
                format!("Database user id must look like <database>/<user>: {user_id}"),
            )
        })
}

fn prefixed(owner: &str, name: &str) -> String {
    let prefix = format!("{owner}_");
    if name.starts_with(&prefix) {
        name.to_string()
    } else {
        format!("{prefix}{name}")
    }
}

impl DirectAdminProvider {
    pub(crate) fn user_to_info(config: UserConfig) -> AccountInfoResult {
        let status = match config.suspended.as_str() {
            "" => AccountStatus::Unknown,
            s if truthy(s) => AccountStatus::Suspended,
            _ => AccountStatus::Active,
        };
        AccountInfoResult {
            domain: config.domain.clone(),
            username: config.username.clone(),
            email: config.email,
            plan: config.package,
            status,
            disk_usage_mb: parse_size_mb(&config.quota_used),
            disk_quota_mb: parse_size_mb(&config.quota),
            bandwidth_usage_mb: parse_size_mb(&config.bandwidth_used),
            bandwidth_limit_mb: parse_size_mb(&config.bandwidth),
            ip_address: Some(config.ip).filter(|ip| !ip.is_empty()),
            created_date: parse_created(&config.date_created),
            ..AccountInfoResult::found(config.domain)
        }
        .with_info("creator", config.creator)
        .with_info("nemails", config.nemails)
        .with_info("mysql", config.mysql)
        .with_info("ftp", config.ftp)
        .with_info("nsubdomains", config.nsubdomains)
        .with_info("ssh", config.ssh)
        .with_info("cgi", config.cgi)
    }

    fn pop_to_info(domain: &str, pop: PopQuota) -> AccountInfoResult {
        let email = format!("{}@{domain}", pop.user);
        let bytes = |raw: &str| raw.trim().parse::<u64>().ok().map(bytes_to_mb);
        AccountInfoResult {
            domain: domain.to_string(),
            username: pop.user,
            email: email.clone(),
            status: AccountStatus::Active,
            disk_usage_mb: bytes(&pop.usage),
            disk_quota_mb: bytes(&pop.quota).filter(|q| *q > 0),
            ..AccountInfoResult::found(email)
        }
    }

    // ---- lookups ----

    async fn user_config(&self, user: &str) -> Result<UserConfig> {
        let ctx = || ErrorContext::new(HOSTING, user);
        let config = self
            .query("CMD_API_SHOW_USER_CONFIG", pairs(&[("user", user)]), None, ctx())
            .await?;
        let usage = self
            .query("CMD_API_SHOW_USER_USAGE", pairs(&[("user", user)]), None, ctx())
            .await?;
        Ok(UserConfig::from_pairs(user, &config).with_usage(&usage))
    }

    async fn all_users(&self) -> Result<Vec<String>> {
        let body = self
            .query("CMD_API_SHOW_ALL_USERS", Vec::new(), None, ErrorContext::resource(HOSTING))
            .await?;
        Ok(list_values(&body))
    }

    // ---- hosting accounts ----

    async fn create_account(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let domain = req.domain.trim();

        let mut params = pairs(&[("action", "create"), ("add", "Submit"), ("notify", "no")]);
        params.extend(unlimited_flags(map_fields(req, CREATE_FIELDS, BoolStyle::OnOff)));
        params.push(("passwd2".to_string(), req.password.clone()));

        self.command(
            "CMD_API_ACCOUNT_USER",
            params,
            None,
            ErrorContext::new(HOSTING, domain),
        )
        .await?;

        Ok(HostingAccountResult {
            success: true,
            message: format!("Hosting account {domain} created"),
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
        let limits = unlimited_flags(table_values(req, CUSTOMIZE_FIELDS, BoolStyle::OnOff));
        let plan = non_blank(Some(req.plan.as_str()));
        let password = CanonicalField::Password.value(req, BoolStyle::OnOff);

        if limits.is_empty() && plan.is_none() && password.is_none() {
            return Ok(AccountUpdateResult::succeeded(account_id, "Nothing to update"));
        }
        let owner = self.domain_owner(account_id).await?;
        let ctx = || ErrorContext::new(HOSTING, account_id);

        if !limits.is_empty() {
            let mut params = pairs(&[("action", "customize"), ("user", &owner)]);
            params.extend(limits);
            self.command("CMD_API_MODIFY_USER", params, None, ctx()).await?;
        }
        if let Some(plan) = plan {
            self.command(
                "CMD_API_MODIFY_USER",
                pairs(&[("action", "package"), ("user", &owner), ("package", plan)]),
                None,
                ctx(),
            )
            .await?;
        }
        if let Some(password) = password {
            self.set_user_password(&owner, &password, ctx()).await?;
        }

        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Hosting account {account_id} updated"))
                .field(&present_fields(req), None),
        )
    }

    async fn set_user_password(&self, user: &str, password: &str, ctx: ErrorContext) -> Result<()> {
        self.command(
            "CMD_API_USER_PASSWD",
            pairs(&[("username", user), ("passwd", password), ("passwd2", password)]),
            None,
            ctx,
        )
        .await?;
        Ok(())
    }

    async fn set_suspended(&self, account_id: &str, suspended: bool) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let owner = self.domain_owner(account_id).await?;
        let (action, state) = if suspended {
            (("dosuspend", "Suspend"), "suspended")
        } else {
            (("dounsuspend", "Unsuspend"), "active")
        };
        self.command(
            "CMD_API_SELECT_USERS",
            pairs(&[("location", "CMD_SELECT_USERS"), ("suspend", "Suspend"), action, ("select0", &owner)]),
            None,
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Hosting account {account_id} {state}"))
                .field("status", Some(state.to_string())),
        )
    }

    async fn delete_account(&self, account_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let owner = self.domain_owner(account_id).await?;
        self.command(
            "CMD_API_SELECT_USERS",
            pairs(&[("confirmed", "Confirm"), ("delete", "yes"), ("select0", &owner)]),
            None,
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            account_id,
            format!("Hosting account {account_id} deleted"),
        ))
    }

    async fn account_info(&self, account_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, account_id)?;
        let owner = self.domain_owner(account_id).await?;
        let mut config = self.user_config(&owner).await?;
        if config.domain.is_empty() {
            config.domain = account_id.trim().to_string();
        }
        Ok(Self::user_to_info(config))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfoResult>> {
        let mut accounts = Vec::new();
        for user in self.all_users().await? {
            match self.user_config(&user).await {
                Ok(config) if !config.domain.is_empty() => {
                    accounts.push(Self::user_to_info(config));
                }
                Ok(_) => {}
                Err(e) => log::warn!("[{PANEL}] Skipping user {user}: {e}"),
            }
        }
        Ok(accounts)
    }

    async fn change_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_password(PANEL, password)?;
        let owner = self.domain_owner(account_id).await?;
        self.set_user_password(&owner, password, ErrorContext::new(HOSTING, account_id))
            .await?;
        Ok(AccountUpdateResult::succeeded(account_id, "Password changed").field("password", None))
    }

    async fn customize(
        &self,
        account_id: &str,
        key: &str,
        limit_mb: u64,
        field: &str,
    ) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_quota(PANEL, limit_mb)?;
        let owner = self.domain_owner(account_id).await?;
        let value = limit_mb.to_string();
        let mut params = pairs(&[("action", "customize"), ("user", &owner)]);
        params.extend(unlimited_flags(pairs(&[(key, &value)])));
        self.command(
            "CMD_API_MODIFY_USER",
            params,
            None,
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(account_id, format!("{field} set to {limit_mb} MB"))
                .field(field, Some(value)),
        )
    }

    // ---- mail ----

    async fn pop_command(&self, email: &str, action: &str, extra: &[(&str, &str)]) -> Result<()> {
        let (local, domain) = split_email(PANEL, email)?;
        let owner = self.domain_owner(domain).await?;
        let mut params = pairs(&[("action", action), ("domain", domain), ("user", local)]);
        params.extend(pairs(extra));
        self.command("CMD_API_POP", params, Some(&owner), ErrorContext::new(MAILBOX, email))
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

        let quota_value = quota.to_string();
        self.pop_command(
            &email,
            "create",
            &[
                ("passwd", &req.password),
                ("passwd2", &req.password),
                ("quota", &quota_value),
            ],
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

    async fn mailboxes(&self, domain: &str) -> Result<Vec<AccountInfoResult>> {
        let domain = domain.trim();
        let owner = self.domain_owner(domain).await?;
        let entries = self
            .query(
                "CMD_API_POP",
                pairs(&[("action", "list"), ("domain", domain), ("type", "quota")]),
                Some(&owner),
                ErrorContext::new("Domain", domain),
            )
            .await?;
        Ok(entries
            .iter()
            .filter(|(user, _)| !user.is_empty() && user.as_str() != "error")
            .map(|(user, encoded)| Self::pop_to_info(domain, PopQuota::from_entry(user, encoded)))
            .collect())
    }

    async fn mailbox_info(&self, email: &str) -> Result<AccountInfoResult> {
        let (_, domain) = split_email(PANEL, email)?;
        let email = email.trim();
        self.mailboxes(domain)
            .await?
            .into_iter()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| PanelError::not_found(PANEL, MAILBOX, email))
    }

    // ---- databases ----

    async fn create_db(&self, req: &DatabaseRequest) -> Result<DatabaseResult> {
        validate_database_name(PANEL, &req.database_name)?;
        if !req.database_type().eq_ignore_ascii_case("mysql") {
            return Err(PanelError::not_supported(
                PANEL,
                &format!("create_database ({})", req.database_type()),
            ));
        }
        let owner = match non_blank(req.domain.as_deref()) {
            Some(domain) => self.domain_owner(domain).await?,
            None => self.username.clone(),
        };
        let name = req.database_name.trim();
        let mut params = pairs(&[("action", "create"), ("name", name)]);

        let db_user = non_blank(req.username.as_deref());
        match (db_user, non_blank(req.password.as_deref())) {
            (Some(user), Some(password)) => {
                params.extend(pairs(&[("user", user), ("passwd", password), ("passwd2", password)]));
            }
            (Some(user), None) => params.extend(pairs(&[("userlist", &prefixed(&owner, user))])),
            (None, _) => {
                return Err(PanelError::validation(
                    PANEL,
                    codes::INVALID_USERNAME,
                    "DirectAdmin databases are created together with a database user",
                ));
            }
        }

        self.command("CMD_API_DATABASES", params, Some(&owner), ErrorContext::new(DATABASE, name))
            .await?;

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: prefixed(&owner, name),
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            username: db_user.map(|u| prefixed(&owner, u)),
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    async fn delete_db(&self, database_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, database_id)?;
        let owner = database_owner(database_id)?;
        self.command(
            "CMD_API_DATABASES",
            pairs(&[("action", "delete"), ("select0", database_id.trim())]),
            Some(owner),
            ErrorContext::new(DATABASE, database_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            database_id,
            format!("Database {database_id} deleted"),
        ))
    }

    async fn databases_of(&self, owner: &str) -> Result<Vec<String>> {
        let body = self
            .query("CMD_API_DATABASES", Vec::new(), Some(owner), ErrorContext::resource(DATABASE))
            .await?;
        Ok(list_values(&body))
    }

    async fn database_users(&self, database_id: &str) -> Result<Vec<String>> {
        let owner = database_owner(database_id)?;
        let body = self
            .query(
                "CMD_API_DB_USER",
                pairs(&[("name", database_id.trim())]),
                Some(owner),
                ErrorContext::new(DATABASE, database_id),
            )
            .await?;
        Ok(list_values(&body))
    }

    async fn db_info(&self, database_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, database_id)?;
        let database_id = database_id.trim();
        let owner = database_owner(database_id)?;
        if !self.databases_of(owner).await?.iter().any(|d| d == database_id) {
            return Err(PanelError::not_found(PANEL, DATABASE, database_id));
        }
        let users = self.database_users(database_id).await?;
        Ok(Self::database_to_info(owner, database_id, &users))
    }

    fn database_to_info(owner: &str, database: &str, users: &[String]) -> AccountInfoResult {
        AccountInfoResult {
            username: users.first().cloned().unwrap_or_default(),
            status: AccountStatus::Active,
            ..AccountInfoResult::found(database)
        }
        .with_info("owner", owner)
        .with_info("database_type", "mysql")
        .with_info("users", users.join(","))
    }

    /// Database ids visible for `account_id` (a domain), or for every user.
    async fn database_ids(&self, account_id: &str) -> Result<Vec<(String, String)>> {
        let owners = if account_id.trim().is_empty() {
            self.all_users().await?
        } else {
            vec![self.domain_owner(account_id).await?]
        };
        let mut ids = Vec::new();
        for owner in owners {
            for db in self.databases_of(&owner).await? {
                ids.push((owner.clone(), db));
            }
        }
        Ok(ids)
    }

    async fn list_dbs(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        Ok(self
            .database_ids(account_id)
            .await?
            .iter()
            .map(|(owner, db)| Self::database_to_info(owner, db, &[]))
            .collect())
    }

    // ---- database users ----

    async fn create_db_user(&self, req: &DatabaseUserRequest) -> Result<AccountUpdateResult> {
        validate_username(PANEL, &req.username)?;
        validate_password(PANEL, &req.password)?;
        let Some(database) = non_blank(req.database_name.as_deref()) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_DATABASE_NAME,
                "DirectAdmin database users belong to a database; database name is required",
            ));
        };
        let owner = database_owner(database)?;
        let user = req.username.trim();
        self.command(
            "CMD_API_DB_USER",
            pairs(&[
                ("action", "create"),
                ("name", database),
                ("user", user),
                ("passwd", &req.password),
                ("passwd2", &req.password),
            ]),
            Some(owner),
            ErrorContext::new(DATABASE_USER, user),
        )
        .await?;
        let full = prefixed(owner, user);
        Ok(
            AccountUpdateResult::succeeded(format!("{database}/{full}"), format!("Database user {full} created"))
                .field("user", Some(full.clone())),
        )
    }

    async fn db_user_command(&self, user_id: &str, params: &[(&str, &str)]) -> Result<()> {
        let (database, _) = split_user_id(user_id)?;
        let owner = database_owner(database)?;
        self.command(
            "CMD_API_DB_USER",
            pairs(params),
            Some(owner),
            ErrorContext::new(DATABASE_USER, user_id),
        )
        .await?;
        Ok(())
    }

    async fn delete_db_user(&self, user_id: &str) -> Result<AccountUpdateResult> {
        let (database, user) = split_user_id(user_id)?;
        self.db_user_command(user_id, &[("action", "delete"), ("name", database), ("select0", user)])
            .await?;
        Ok(AccountUpdateResult::succeeded(
            user_id,
            format!("Database user {user} deleted"),
        ))
    }

    async fn change_db_user_password(&self, user_id: &str, password: &str) -> Result<AccountUpdateResult> {
        let (database, user) = split_user_id(user_id)?;
        validate_password(PANEL, password)?;
        self.db_user_command(
            user_id,
            &[
                ("action", "modify"),
                ("name", database),
                ("user", user),
                ("passwd", password),
                ("passwd2", password),
            ],
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(user_id, "Password changed").field("password", None))
    }

    fn db_user_to_info(database: &str, user: &str) -> AccountInfoResult {
        AccountInfoResult {
            username: user.to_string(),
            status: AccountStatus::Active,
            ..AccountInfoResult::found(format!("{database}/{user}"))
        }
        .with_info("database", database)
    }

    async fn db_user_info(&self, user_id: &str) -> Result<AccountInfoResult> {
        let (database, user) = split_user_id(user_id)?;
        if self.database_users(database).await?.iter().any(|u| u == user) {
            Ok(Self::db_user_to_info(database, user))
        } else {
            Err(PanelError::not_found(PANEL, DATABASE_USER, user_id))
        }
    }

    async fn list_db_users(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let mut users = Vec::new();
        for (_, database) in self.database_ids(account_id).await? {
            for user in self.database_users(&database).await? {
                users.push(Self::db_user_to_info(&database, &user));
            }
        }
        Ok(users)
    }
}

#[async_trait]
impl HostingPanel for DirectAdminProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Directadmin,
            name: "DirectAdmin".to_string(),
            description: "DirectAdmin CMD_API; hosting accounts are addressed by primary domain"
                .to_string(),
            default_port: 2222,
            required_fields: vec![
                PanelCredentialField::text("username", "Username"),
                PanelCredentialField::password("password", "Password or Login Key"),
            ],
            features: PanelFeatures {
                mail_accounts: true,
                mail_quotas: true,
                databases: true,
                database_users: true,
                privilege_grants: false,
                disk_quotas: true,
                bandwidth_limits: true,
            },
        }
    }

    async fn test_connection(&self) -> bool {
        match self
            .query("CMD_API_LOGIN_TEST", Vec::new(), None, ErrorContext::default())
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
        guard(PANEL, "suspend_web_hosting_account", self.set_suspended(account_id, true)).await
    }

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "unsuspend_web_hosting_account", self.set_suspended(account_id, false)).await
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
            self.customize(account_id, "quota", quota_mb, "disk_quota_mb"),
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
            self.customize(account_id, "bandwidth", limit_mb, "bandwidth_mb"),
        )
        .await
    }

    async fn create_mail_account(&self, request: &MailAccountRequest) -> MailAccountResult {
        guard(PANEL, "create_mail_account", self.create_mailbox(request)).await
    }

    async fn delete_mail_account(&self, email: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_mail_account", async {
            self.pop_command(email, "delete", &[]).await?;
            Ok(AccountUpdateResult::succeeded(
                email,
                format!("Mail account {email} deleted"),
            ))
        })
        .await
    }

    async fn change_mail_password(&self, email: &str, new_password: &str) -> AccountUpdateResult {
        guard(PANEL, "change_mail_password", async {
            validate_password(PANEL, new_password)?;
            let (local, _) = split_email(PANEL, email)?;
            self.pop_command(
                email,
                "modify",
                &[
                    ("newuser", local),
                    ("passwd", new_password),
                    ("passwd2", new_password),
                ],
            )
            .await?;
            Ok(AccountUpdateResult::succeeded(email, "Password changed").field("password", None))
        })
        .await
    }

    async fn set_mail_quota(&self, email: &str, quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_mail_quota", async {
            validate_quota(PANEL, quota_mb)?;
            let (local, _) = split_email(PANEL, email)?;
            let quota = quota_mb.to_string();
            self.pop_command(email, "modify", &[("newuser", local), ("quota", &quota)])
                .await?;
            Ok(
                AccountUpdateResult::succeeded(email, format!("Quota set to {quota_mb} MB"))
                    .field("quota_mb", Some(quota)),
            )
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
            self.change_db_user_password(user_id, new_password),
        )
        .await
    }

    async fn grant_database_privileges(
        &self,
        _user_id: &str,
        _database_id: &str,
        _privileges: &[String],
    ) -> AccountUpdateResult {
        guard(PANEL, "grant_database_privileges", async {
            Err(PanelError::not_supported(PANEL, "grant_database_privileges"))
        })
        .await
    }

    async fn get_database_user_info(&self, user_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_user_info", self.db_user_info(user_id)).await
    }

    async fn list_database_users(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_database_users", self.list_db_users(account_id)).await
    }
}

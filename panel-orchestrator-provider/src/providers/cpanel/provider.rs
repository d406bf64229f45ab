//! cPanel HostingPanel trait 实现

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{PanelError, Result};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, bytes_to_mb, map_fields, pairs, parse_size_mb,
    present_fields, split_email, truthy, validate_account_id, validate_database_name,
    validate_hosting_request, validate_hosting_update, validate_password, validate_quota,
    validate_username,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType,
    privileges_or_default,
};
use crate::utils::datetime::parse_panel_timestamp;

use super::http::qualify;
use super::{
    CpanelProvider, PANEL, UapiDatabase, UapiDatabaseUser, UapiMailbox, WhmAccount,
    WhmAccountList,
};

/// `createacct` parameters.
const CREATE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Username, "username"),
    (CanonicalField::Domain, "domain"),
    (CanonicalField::Password, "password"),
    (CanonicalField::Email, "contactemail"),
    (CanonicalField::Plan, "plan"),
    (CanonicalField::DiskQuota, "quota"),
    (CanonicalField::Bandwidth, "bwlimit"),
    (CanonicalField::MaxEmail, "maxpop"),
    (CanonicalField::MaxDatabases, "maxsql"),
    (CanonicalField::MaxFtp, "maxftp"),
    (CanonicalField::MaxSubdomains, "maxsub"),
    (CanonicalField::Shell, "hasshell"),
    (CanonicalField::Cgi, "cgi"),
];

/// `modifyacct` parameters; plan and password have dedicated functions.
const MODIFY_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Domain, "DNS"),
    (CanonicalField::Email, "contactemail"),
    (CanonicalField::DiskQuota, "QUOTA"),
    (CanonicalField::Bandwidth, "BWLIMIT"),
    (CanonicalField::MaxEmail, "MAXPOP"),
    (CanonicalField::MaxDatabases, "MAXSQL"),
    (CanonicalField::MaxFtp, "MAXFTP"),
    (CanonicalField::MaxSubdomains, "MAXSUB"),
    (CanonicalField::Shell, "HASSHELL"),
    (CanonicalField::Cgi, "HASCGI"),
];

const HOSTING: &str = "Hosting account";
const MAILBOX: &str = "Mail account";
const DATABASE: &str = "Database";
const DATABASE_USER: &str = "Database user";

impl CpanelProvider {
    /// WHM `acct` 条目转换为 `AccountInfoResult`
    pub(crate) fn account_to_info(acct: WhmAccount) -> AccountInfoResult {
        let status = if truthy(&acct.suspended) {
            AccountStatus::Suspended
        } else {
            AccountStatus::Active
        };
        AccountInfoResult {
            domain: acct.domain,
            username: acct.user.clone(),
            email: acct.email,
            plan: acct.plan,
            status,
            disk_usage_mb: parse_size_mb(&acct.diskused),
            disk_quota_mb: parse_size_mb(&acct.disklimit),
            ip_address: Some(acct.ip).filter(|ip| !ip.is_empty()),
            created_date: parse_panel_timestamp(&acct.unix_startdate),
            ..AccountInfoResult::found(acct.user)
        }
        .with_info("maxpop", acct.maxpop)
        .with_info("maxsql", acct.maxsql)
        .with_info("maxftp", acct.maxftp)
        .with_info("maxsub", acct.maxsub)
        .with_info("shell", acct.shell)
        .with_info("theme", acct.theme)
        .with_info("partition", acct.partition)
        .with_info("suspendreason", acct.suspendreason)
    }

    fn mailbox_to_info(mailbox: UapiMailbox) -> AccountInfoResult {
        let status = if truthy(&mailbox.suspended_login) {
            AccountStatus::Suspended
        } else {
            AccountStatus::Active
        };
        let username = mailbox
            .email
            .split_once('@')
            .map_or_else(String::new, |(local, _)| local.to_string());
        AccountInfoResult {
            domain: mailbox.domain,
            username,
            email: mailbox.email.clone(),
            status,
            disk_usage_mb: parse_size_mb(&mailbox.diskused),
            disk_quota_mb: parse_size_mb(&mailbox.diskquota).filter(|q| *q > 0),
            ..AccountInfoResult::found(mailbox.email)
        }
        .with_info("mtime", mailbox.mtime)
    }

    fn database_to_info(db: UapiDatabase) -> AccountInfoResult {
        AccountInfoResult {
            username: db.users.first().cloned().unwrap_or_default(),
            status: AccountStatus::Active,
            disk_usage_mb: db.disk_usage.trim().parse::<u64>().ok().map(bytes_to_mb),
            ..AccountInfoResult::found(db.database.clone())
        }
        .with_info("database_name", db.database)
        .with_info("database_type", "mysql")
        .with_info("users", db.users.join(","))
    }

    fn database_user_to_info(user: UapiDatabaseUser) -> AccountInfoResult {
        AccountInfoResult {
            username: user.user.clone(),
            status: AccountStatus::Active,
            ..AccountInfoResult::found(user.user)
        }
        .with_info("databases", user.databases.join(","))
    }

    // ---- hosting accounts ----

    async fn create_account(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let username = req.username.trim().to_string();

        let params = map_fields(req, CREATE_FIELDS, BoolStyle::OneZero);
        self.whm::<serde_json::Value>(
            "createacct",
            params,
            ErrorContext::new(HOSTING, &username),
        )
        .await?;

        Ok(HostingAccountResult {
            success: true,
            message: format!("Hosting account {username} created"),
            account_id: username.clone(),
            domain: req.domain.trim().to_string(),
            username,
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
        let ctx = || ErrorContext::new(HOSTING, account_id);

        let mut params = pairs(&[("user", account_id)]);
        let changes = map_fields(req, MODIFY_FIELDS, BoolStyle::OneZero);
        let modified = !changes.is_empty();
        params.extend(changes);
        if modified {
            self.whm::<serde_json::Value>("modifyacct", params, ctx())
                .await?;
        }
        if let Some(plan) = CanonicalField::Plan.value(req, BoolStyle::OneZero) {
            self.whm::<serde_json::Value>(
                "changepackage",
                pairs(&[("user", account_id), ("pkg", &plan)]),
                ctx(),
            )
            .await?;
        }
        if let Some(password) = CanonicalField::Password.value(req, BoolStyle::OneZero) {
            self.whm::<serde_json::Value>(
                "passwd",
                pairs(&[("user", account_id), ("password", &password)]),
                ctx(),
            )
            .await?;
        }

        let fields = present_fields(req);
        if fields.is_empty() {
            return Ok(AccountUpdateResult::succeeded(account_id, "Nothing to update"));
        }
        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Hosting account {account_id} updated"))
                .field(&fields, None),
        )
    }

    async fn set_suspended(&self, account_id: &str, suspended: bool) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let (function, state) = if suspended {
            ("suspendacct", "suspended")
        } else {
            ("unsuspendacct", "active")
        };
        self.whm::<serde_json::Value>(
            function,
            pairs(&[("user", account_id)]),
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
        self.whm::<serde_json::Value>(
            "removeacct",
            pairs(&[("username", account_id)]),
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
        let list: WhmAccountList = self
            .whm_data(
                "accountsummary",
                pairs(&[("user", account_id)]),
                ErrorContext::new(HOSTING, account_id),
            )
            .await?;
        list.acct
            .into_iter()
            .find(|a| a.user == account_id)
            .map(Self::account_to_info)
            .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, account_id))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfoResult>> {
        let list: WhmAccountList = self
            .whm("listaccts", Vec::new(), ErrorContext::resource(HOSTING))
            .await?
            .unwrap_or_default();
        Ok(list
            .acct
            .into_iter()
            .filter(|a| !a.user.is_empty())
            .map(Self::account_to_info)
            .collect())
    }

    async fn change_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_password(PANEL, password)?;
        self.whm::<serde_json::Value>(
            "passwd",
            pairs(&[("user", account_id), ("password", password)]),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(account_id, "Password changed").field("password", None))
    }

    async fn set_limit(
        &self,
        account_id: &str,
        limit_mb: u64,
        function: &str,
        key: &str,
        field: &str,
    ) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_quota(PANEL, limit_mb)?;
        let value = limit_mb.to_string();
        self.whm::<serde_json::Value>(
            function,
            pairs(&[("user", account_id), (key, &value)]),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(account_id, format!("{field} set to {limit_mb} MB"))
            .field(field, Some(value)))
    }

    // ---- mail (UAPI Email) ----

    async fn create_mailbox(&self, req: &MailAccountRequest) -> Result<MailAccountResult> {
        let (local, address_domain) = split_email(PANEL, &req.email)?;
        validate_password(PANEL, &req.password)?;
        let domain = if req.domain.trim().is_empty() {
            address_domain
        } else {
            req.domain.trim()
        };
        let email = format!("{local}@{domain}");

        let mut params = pairs(&[
            ("email", local),
            ("domain", domain),
            ("password", &req.password),
        ]);
        if let Some(quota) = req.quota_mb {
            validate_quota(PANEL, quota)?;
            params.push(("quota".to_string(), quota.to_string()));
        }
        let owner = self.domain_owner(domain).await?;
        self.uapi::<serde_json::Value>(
            &owner,
            "Email",
            "add_pop",
            params,
            ErrorContext::new(MAILBOX, &email),
        )
        .await?;

        Ok(MailAccountResult {
            success: true,
            message: format!("Mail account {email} created"),
            account_id: email.clone(),
            email,
            domain: domain.to_string(),
            quota_mb: req.quota_mb,
            created_date: Some(Utc::now()),
            ..MailAccountResult::default()
        })
    }

    async fn mail_call(
        &self,
        email: &str,
        function: &str,
        extra: &[(&str, &str)],
    ) -> Result<()> {
        let (local, domain) = split_email(PANEL, email)?;
        let owner = self.domain_owner(domain).await?;
        let mut params = pairs(&[("email", local), ("domain", domain)]);
        params.extend(pairs(extra));
        self.uapi::<serde_json::Value>(
            &owner,
            "Email",
            function,
            params,
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(())
    }

    async fn mailboxes(&self, domain: &str) -> Result<Vec<UapiMailbox>> {
        let mut params = Vec::new();
        if !domain.trim().is_empty() {
            params.push(("domain".to_string(), domain.trim().to_string()));
        }
        let owner = self.domain_owner(domain).await?;
        self.uapi_list(&owner, "Email", "list_pops_with_disk", params)
            .await
    }

    async fn mailbox_info(&self, email: &str) -> Result<AccountInfoResult> {
        let (_, domain) = split_email(PANEL, email)?;
        let email = email.trim();
        self.mailboxes(domain)
            .await?
            .into_iter()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .map(Self::mailbox_to_info)
            .ok_or_else(|| PanelError::not_found(PANEL, MAILBOX, email))
    }

    // ---- databases (UAPI Mysql) ----

    async fn create_db(&self, req: &DatabaseRequest) -> Result<DatabaseResult> {
        validate_database_name(PANEL, &req.database_name)?;
        if !req.database_type().eq_ignore_ascii_case("mysql") {
            return Err(PanelError::not_supported(
                PANEL,
                &format!("create_database ({})", req.database_type()),
            ));
        }
        let user = self.uapi_user(req.domain.as_deref().unwrap_or_default());
        let qualified = qualify(user, &req.database_name);
        let name = qualified.as_str();
        let ctx = || ErrorContext::new(DATABASE, name);

        self.uapi::<serde_json::Value>(user, "Mysql", "create_database", pairs(&[("name", name)]), ctx())
            .await?;

        let db_user = req
            .username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(|u| qualify(user, u));
        if let Some(db_user) = db_user.as_deref() {
            if let Some(password) = req.password.as_deref().filter(|p| !p.trim().is_empty()) {
                self.uapi::<serde_json::Value>(
                    user,
                    "Mysql",
                    "create_user",
                    pairs(&[("name", db_user), ("password", password)]),
                    ErrorContext::new(DATABASE_USER, db_user),
                )
                .await?;
            }
            let privileges = req.privileges().join(",");
            self.uapi::<serde_json::Value>(
                user,
                "Mysql",
                "set_privileges_on_database",
                pairs(&[("user", db_user), ("database", name), ("privileges", &privileges)]),
                ctx(),
            )
            .await?;
        }

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: name.to_string(),
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            username: db_user,
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    /// Runs a `Mysql` function as the account owning `name`.
    async fn mysql_call(
        &self,
        name: &str,
        function: &str,
        params: &[(&str, &str)],
        ctx: ErrorContext,
    ) -> Result<()> {
        self.uapi::<serde_json::Value>(self.name_owner(name), "Mysql", function, pairs(params), ctx)
            .await?;
        Ok(())
    }

    async fn db_info(&self, database_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, database_id)?;
        let databases: Vec<UapiDatabase> = self
            .uapi_list(self.name_owner(database_id), "Mysql", "list_databases", Vec::new())
            .await?;
        databases
            .into_iter()
            .find(|d| d.database == database_id)
            .map(Self::database_to_info)
            .ok_or_else(|| PanelError::not_found(PANEL, DATABASE, database_id))
    }

    async fn create_db_user(&self, req: &DatabaseUserRequest) -> Result<AccountUpdateResult> {
        validate_username(PANEL, &req.username)?;
        validate_password(PANEL, &req.password)?;
        let user = self.uapi_user(req.domain.as_deref().unwrap_or_default());
        let qualified = qualify(user, &req.username);
        let name = qualified.as_str();

        self.uapi::<serde_json::Value>(
            user,
            "Mysql",
            "create_user",
            pairs(&[("name", name), ("password", &req.password)]),
            ErrorContext::new(DATABASE_USER, name),
        )
        .await?;

        if let Some(database) = req.database_name.as_deref().filter(|d| !d.trim().is_empty()) {
            let database = qualify(user, database);
            let privileges = req.privileges().join(",");
            self.uapi::<serde_json::Value>(
                user,
                "Mysql",
                "set_privileges_on_database",
                pairs(&[("user", name), ("database", &database), ("privileges", &privileges)]),
                ErrorContext::new(DATABASE, &database),
            )
            .await?;
        }

        Ok(AccountUpdateResult::succeeded(name, format!("Database user {name} created"))
            .field("user", Some(name.to_string())))
    }

    async fn db_user_info(&self, user_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, user_id)?;
        let users: Vec<UapiDatabaseUser> = self
            .uapi_list(self.name_owner(user_id), "Mysql", "list_users", Vec::new())
            .await?;
        users
            .into_iter()
            .find(|u| u.user == user_id)
            .map(Self::database_user_to_info)
            .ok_or_else(|| PanelError::not_found(PANEL, DATABASE_USER, user_id))
    }
}

#[async_trait]
impl HostingPanel for CpanelProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Cpanel,
            name: "cPanel / WHM".to_string(),
            description: "WHM API 1 for accounts, UAPI for mail and databases".to_string(),
            default_port: 2087,
            required_fields: vec![
                PanelCredentialField::text("username", "WHM Username"),
                PanelCredentialField::password("apiToken", "API Token"),
                PanelCredentialField::text("cpanelUser", "cPanel User")
                    .optional("Fallback account for mail and database calls when no owner is found; defaults to the WHM username"),
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
            .whm::<serde_json::Value>("version", Vec::new(), ErrorContext::default())
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
        guard(
            PANEL,
            "suspend_web_hosting_account",
            self.set_suspended(account_id, true),
        )
        .await
    }

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(
            PANEL,
            "unsuspend_web_hosting_account",
            self.set_suspended(account_id, false),
        )
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
            self.set_limit(account_id, quota_mb, "editquota", "quota", "disk_quota_mb"),
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
            self.set_limit(account_id, limit_mb, "limitbw", "bwlimit", "bandwidth_mb"),
        )
        .await
    }

    async fn create_mail_account(&self, request: &MailAccountRequest) -> MailAccountResult {
        guard(PANEL, "create_mail_account", self.create_mailbox(request)).await
    }

    async fn delete_mail_account(&self, email: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_mail_account", async {
            self.mail_call(email, "delete_pop", &[]).await?;
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
            self.mail_call(email, "passwd_pop", &[("password", new_password)])
                .await?;
            Ok(AccountUpdateResult::succeeded(email, "Password changed").field("password", None))
        })
        .await
    }

    async fn set_mail_quota(&self, email: &str, quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_mail_quota", async {
            validate_quota(PANEL, quota_mb)?;
            let quota = quota_mb.to_string();
            self.mail_call(email, "edit_pop_quota", &[("quota", &quota)])
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
        guard_list(PANEL, "list_mail_accounts", async {
            Ok(self
                .mailboxes(domain)
                .await?
                .into_iter()
                .filter(|m| !m.email.is_empty())
                .map(Self::mailbox_to_info)
                .collect())
        })
        .await
    }

    async fn create_database(&self, request: &DatabaseRequest) -> DatabaseResult {
        guard(PANEL, "create_database", self.create_db(request)).await
    }

    async fn delete_database(&self, database_id: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_database", async {
            validate_account_id(PANEL, database_id)?;
            self.mysql_call(
                database_id,
                "delete_database",
                &[("name", database_id)],
                ErrorContext::new(DATABASE, database_id),
            )
            .await?;
            Ok(AccountUpdateResult::succeeded(
                database_id,
                format!("Database {database_id} deleted"),
            ))
        })
        .await
    }

    async fn get_database_info(&self, database_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_info", self.db_info(database_id)).await
    }

    async fn list_databases(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_databases", async {
            let databases: Vec<UapiDatabase> = self
                .uapi_list(self.uapi_user(account_id), "Mysql", "list_databases", Vec::new())
                .await?;
            Ok(databases
                .into_iter()
                .filter(|d| !d.database.is_empty())
                .map(Self::database_to_info)
                .collect())
        })
        .await
    }

    async fn create_database_user(&self, request: &DatabaseUserRequest) -> AccountUpdateResult {
        guard(PANEL, "create_database_user", self.create_db_user(request)).await
    }

    async fn delete_database_user(&self, user_id: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_database_user", async {
            validate_account_id(PANEL, user_id)?;
            self.mysql_call(
                user_id,
                "delete_user",
                &[("name", user_id)],
                ErrorContext::new(DATABASE_USER, user_id),
            )
            .await?;
            Ok(AccountUpdateResult::succeeded(
                user_id,
                format!("Database user {user_id} deleted"),
            ))
        })
        .await
    }

    async fn change_database_user_password(
        &self,
        user_id: &str,
        new_password: &str,
    ) -> AccountUpdateResult {
        guard(PANEL, "change_database_user_password", async {
            validate_account_id(PANEL, user_id)?;
            validate_password(PANEL, new_password)?;
            self.mysql_call(
                user_id,
                "set_password",
                &[("user", user_id), ("password", new_password)],
                ErrorContext::new(DATABASE_USER, user_id),
            )
            .await?;
            Ok(AccountUpdateResult::succeeded(user_id, "Password changed").field("password", None))
        })
        .await
    }

    async fn grant_database_privileges(
        &self,
        user_id: &str,
        database_id: &str,
        privileges: &[String],
    ) -> AccountUpdateResult {
        guard(PANEL, "grant_database_privileges", async {
            validate_account_id(PANEL, user_id)?;
            validate_account_id(PANEL, database_id)?;
            let privileges = privileges_or_default(privileges).join(",");
            self.mysql_call(
                user_id,
                "set_privileges_on_database",
                &[
                    ("user", user_id),
                    ("database", database_id),
                    ("privileges", &privileges),
                ],
                ErrorContext::new(DATABASE, database_id),
            )
            .await?;
            Ok(AccountUpdateResult::succeeded(
                user_id,
                format!("Privileges on {database_id} granted"),
            )
            .field("privileges", Some(privileges)))
        })
        .await
    }

    async fn get_database_user_info(&self, user_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_user_info", self.db_user_info(user_id)).await
    }

    async fn list_database_users(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_database_users", async {
            let users: Vec<UapiDatabaseUser> = self
                .uapi_list(self.uapi_user(account_id), "Mysql", "list_users", Vec::new())
                .await?;
            Ok(users
                .into_iter()
                .filter(|u| !u.user.is_empty())
                .map(Self::database_user_to_info)
                .collect())
        })
        .await
    }
}

//! CyberPanel HostingPanel trait 实现

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::error::{PanelError, Result, codes};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, map_fields_json, parse_size_mb, present_fields,
    split_email, validate_account_id, validate_database_name, validate_domain,
    validate_hosting_request, validate_hosting_update, validate_password,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType, non_blank,
};

use super::http::payload;
use super::{CyberDatabase, CyberMailbox, CyberPanelProvider, CyberWebsite, PANEL};

/// `createWebsite` payload keys.
const CREATE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Domain, "domainName"),
    (CanonicalField::Email, "ownerEmail"),
    (CanonicalField::Plan, "packageName"),
    (CanonicalField::Username, "websiteOwner"),
    (CanonicalField::Password, "ownerPassword"),
];

/// Package used when the request names none.
const DEFAULT_PACKAGE: &str = "Default";

const HOSTING: &str = "Hosting account";
const MAILBOX: &str = "Mail account";
const DATABASE: &str = "Database";
const DATABASE_USER: &str = "Database user";

impl CyberPanelProvider {
    pub(crate) fn website_to_info(site: CyberWebsite) -> AccountInfoResult {
        let status = match site.state.to_ascii_lowercase().as_str() {
            "active" | "1" => AccountStatus::Active,
            "suspended" | "0" => AccountStatus::Suspended,
            _ => AccountStatus::Unknown,
        };
        AccountInfoResult {
            domain: site.domain.clone(),
            username: site.admin,
            email: site.admin_email,
            plan: site.package,
            status,
            disk_usage_mb: parse_size_mb(&site.disk_used),
            ip_address: Some(site.ip_address).filter(|ip| !ip.is_empty()),
            ..AccountInfoResult::found(site.domain)
        }
    }

    fn mailbox_to_info(domain: &str, mailbox: CyberMailbox) -> AccountInfoResult {
        AccountInfoResult {
            domain: domain.to_string(),
            username: mailbox
                .email
                .split_once('@')
                .map_or_else(|| mailbox.email.clone(), |(local, _)| local.to_string()),
            email: mailbox.email.clone(),
            status: AccountStatus::Active,
            disk_usage_mb: parse_size_mb(&mailbox.disk_usage),
            ..AccountInfoResult::found(mailbox.email)
        }
    }

    fn database_to_info(domain: &str, db: CyberDatabase) -> AccountInfoResult {
        AccountInfoResult {
            domain: domain.to_string(),
            username: db.db_user,
            status: AccountStatus::Active,
            ..AccountInfoResult::found(db.db_name)
        }
        .with_info("id", db.id)
        .with_info("database_type", "mysql")
    }

    // ---- websites ----

    async fn websites(&self) -> Result<Vec<CyberWebsite>> {
        let response = self
            .call("fetchWebsites", "status", payload(&[]), ErrorContext::resource(HOSTING))
            .await?;
        let sites: Vec<CyberWebsite> = self.rows(&response)?;
        Ok(sites.into_iter().filter(|s| !s.domain.is_empty()).collect())
    }

    async fn website(&self, domain: &str) -> Result<CyberWebsite> {
        let domain = domain.trim();
        self.websites()
            .await?
            .into_iter()
            .find(|s| s.domain.eq_ignore_ascii_case(domain))
            .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, domain))
    }

    async fn create_account(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let domain = req.domain.trim();

        let mut body = map_fields_json(req, CREATE_FIELDS, BoolStyle::OneZero);
        body.entry("packageName")
            .or_insert_with(|| Value::String(DEFAULT_PACKAGE.to_string()));

        self.call(
            "createWebsite",
            "createWebSiteStatus",
            body,
            ErrorContext::new(HOSTING, domain),
        )
        .await?;

        Ok(HostingAccountResult {
            success: true,
            message: format!("Website {domain} created"),
            account_id: domain.to_string(),
            domain: domain.to_string(),
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            plan: non_blank(Some(req.plan.as_str()))
                .unwrap_or(DEFAULT_PACKAGE)
                .to_string(),
            created_date: Some(Utc::now()),
            ..HostingAccountResult::default()
        })
    }

    /// Only the package and the owner's password can change; limits come
    /// from the package.
    async fn update_account(
        &self,
        account_id: &str,
        req: &HostingAccountRequest,
    ) -> Result<AccountUpdateResult> {
        validate_hosting_update(PANEL, account_id, req)?;
        let fields = present_fields(req);
        if fields.is_empty() {
            return Ok(AccountUpdateResult::succeeded(account_id, "Nothing to update"));
        }
        let plan = non_blank(Some(req.plan.as_str()));
        let password = CanonicalField::Password.value(req, BoolStyle::OneZero);
        if plan.is_none() && password.is_none() {
            return Err(PanelError::not_supported(
                PANEL,
                &format!("update_web_hosting_account ({fields})"),
            ));
        }

        if let Some(plan) = plan {
            self.call(
                "changePackageAPI",
                "changePackage",
                payload(&[("websiteName", account_id.trim()), ("packageName", plan)]),
                ErrorContext::new(HOSTING, account_id),
            )
            .await?;
        }
        if let Some(password) = password {
            self.owner_password(account_id, &password).await?;
        }

        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Website {account_id} updated"))
                .field(&fields, None),
        )
    }

    async fn owner_password(&self, account_id: &str, password: &str) -> Result<()> {
        let owner = self.website(account_id).await?.admin;
        self.call(
            "changeUserPassAPI",
            "changeStatus",
            payload(&[("websiteOwner", &owner), ("ownerPassword", password)]),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(())
    }

    async fn set_state(&self, account_id: &str, suspended: bool) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let (state, label) = if suspended {
            ("Suspend", "suspended")
        } else {
            ("Unsuspend", "active")
        };
        self.call(
            "submitWebsiteStatus",
            "websiteStatus",
            payload(&[("websiteName", account_id.trim()), ("state", state)]),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Website {account_id} {label}"))
                .field("status", Some(label.to_string())),
        )
    }

    async fn delete_account(&self, account_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        self.call(
            "deleteWebsite",
            "websiteDeleteStatus",
            payload(&[("domainName", account_id.trim())]),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            account_id,
            format!("Website {account_id} deleted"),
        ))
    }

    async fn account_info(&self, account_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, account_id)?;
        Ok(Self::website_to_info(self.website(account_id).await?))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfoResult>> {
        Ok(self
            .websites()
            .await?
            .into_iter()
            .map(Self::website_to_info)
            .collect())
    }

    async fn change_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_password(PANEL, password)?;
        self.owner_password(account_id, password).await?;
        Ok(AccountUpdateResult::succeeded(account_id, "Password changed").field("password", None))
    }

    // ---- mail ----

    async fn create_mailbox(&self, req: &MailAccountRequest) -> Result<MailAccountResult> {
        let (local, _) = split_email(PANEL, &req.email)?;
        validate_password(PANEL, &req.password)?;
        let domain = req.mail_domain().to_string();
        let email = format!("{local}@{domain}");
        if req.quota_mb.is_some() {
            log::debug!("[{PANEL}] Mailbox quota is package-defined, ignoring quota for {email}");
        }

        self.call(
            "submitEmailCreation",
            "createEmailStatus",
            payload(&[
                ("domain", &domain),
                ("username", local),
                ("passwordByPass", &req.password),
            ]),
            ErrorContext::new(MAILBOX, email.as_str()),
        )
        .await?;

        Ok(MailAccountResult {
            success: true,
            message: format!("Mail account {email} created"),
            account_id: email.clone(),
            email,
            domain,
            created_date: Some(Utc::now()),
            ..MailAccountResult::default()
        })
    }

    async fn delete_mailbox(&self, email: &str) -> Result<AccountUpdateResult> {
        split_email(PANEL, email)?;
        self.call(
            "submitEmailDeletion",
            "deleteEmailStatus",
            payload(&[("email", email.trim())]),
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            email,
            format!("Mail account {email} deleted"),
        ))
    }

    async fn mail_password(&self, email: &str, password: &str) -> Result<AccountUpdateResult> {
        let (_, domain) = split_email(PANEL, email)?;
        validate_password(PANEL, password)?;
        self.call(
            "submitPasswordChange",
            "passChangeStatus",
            payload(&[
                ("domain", domain),
                ("email", email.trim()),
                ("passwordByPass", password),
            ]),
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(email, "Password changed").field("password", None))
    }

    async fn mailboxes(&self, domain: &str) -> Result<Vec<AccountInfoResult>> {
        validate_domain(PANEL, domain)?;
        let domain = domain.trim();
        let response = self
            .call(
                "getEmailsForDomain",
                "fetchStatus",
                payload(&[("domain", domain)]),
                ErrorContext::new("Domain", domain),
            )
            .await?;
        let rows: Vec<CyberMailbox> = self.rows(&response)?;
        Ok(rows
            .into_iter()
            .filter(|m| !m.email.is_empty())
            .map(|m| Self::mailbox_to_info(domain, m))
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
        let Some(domain) = non_blank(req.domain.as_deref()) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_DOMAIN,
                "CyberPanel databases belong to a website; domain is required",
            ));
        };
        let (Some(user), Some(password)) = (
            non_blank(req.username.as_deref()),
            non_blank(req.password.as_deref()),
        ) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_USERNAME,
                "CyberPanel creates every database with a user; username and password are required",
            ));
        };
        let name = req.database_name.trim();

        self.call(
            "submitDBCreation",
            "createDBStatus",
            payload(&[
                ("databaseWebsite", domain),
                ("dbName", name),
                ("dbUsername", user),
                ("dbPassword", password),
            ]),
            ErrorContext::new(DATABASE, name),
        )
        .await?;

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: name.to_string(),
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            username: Some(user.to_string()),
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    async fn delete_db(&self, database_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, database_id)?;
        self.call(
            "submitDatabaseDeletion",
            "deleteStatus",
            payload(&[("dbName", database_id.trim())]),
            ErrorContext::new(DATABASE, database_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            database_id,
            format!("Database {database_id} deleted"),
        ))
    }

    async fn databases_of(&self, domain: &str) -> Result<Vec<AccountInfoResult>> {
        let response = self
            .call(
                "fetchDatabases",
                "fetchStatus",
                payload(&[("databaseWebsite", domain)]),
                ErrorContext::new(HOSTING, domain),
            )
            .await?;
        let rows: Vec<CyberDatabase> = self.rows(&response)?;
        Ok(rows
            .into_iter()
            .filter(|db| !db.db_name.is_empty())
            .map(|db| Self::database_to_info(domain, db))
            .collect())
    }

    /// Databases of `account_id`, or of every website when blank.
    async fn list_dbs(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let account_id = account_id.trim();
        if !account_id.is_empty() {
            return self.databases_of(account_id).await;
        }
        let mut all = Vec::new();
        for site in self.websites().await? {
            all.extend(self.databases_of(&site.domain).await?);
        }
        Ok(all)
    }

    async fn db_info(&self, database_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, database_id)?;
        let database_id = database_id.trim();
        self.list_dbs("")
            .await?
            .into_iter()
            .find(|db| db.account_id == database_id)
            .ok_or_else(|| PanelError::not_found(PANEL, DATABASE, database_id))
    }

    async fn db_user_password(&self, user_id: &str, password: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, user_id)?;
        validate_password(PANEL, password)?;
        self.call(
            "changePassword",
            "changePasswordStatus",
            payload(&[("dbUserName", user_id.trim()), ("dbPassword", password)]),
            ErrorContext::new(DATABASE_USER, user_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(user_id, "Password changed").field("password", None))
    }
}

#[async_trait]
impl HostingPanel for CyberPanelProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Cyberpanel,
            name: "CyberPanel".to_string(),
            description: "CyberPanel JSON API; limits are taken from packages".to_string(),
            default_port: 8090,
            required_fields: vec![
                PanelCredentialField::password("apiKey", "API Key"),
                PanelCredentialField::text("adminUsername", "Admin Username"),
                PanelCredentialField::password("adminPassword", "Admin Password"),
            ],
            features: PanelFeatures {
                mail_accounts: true,
                mail_quotas: false,
                databases: true,
                database_users: false,
                privilege_grants: false,
                disk_quotas: false,
                bandwidth_limits: false,
            },
        }
    }

    async fn test_connection(&self) -> bool {
        match self
            .call("verifyConn", "verifyConn", payload(&[]), ErrorContext::default())
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
        guard(PANEL, "suspend_web_hosting_account", self.set_state(account_id, true)).await
    }

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "unsuspend_web_hosting_account", self.set_state(account_id, false)).await
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

    async fn set_web_hosting_disk_quota(&self, _account_id: &str, _quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_web_hosting_disk_quota", async {
            Err(PanelError::not_supported(PANEL, "set_web_hosting_disk_quota"))
        })
        .await
    }

    async fn set_web_hosting_bandwidth_limit(
        &self,
        _account_id: &str,
        _limit_mb: u64,
    ) -> AccountUpdateResult {
        guard(PANEL, "set_web_hosting_bandwidth_limit", async {
            Err(PanelError::not_supported(PANEL, "set_web_hosting_bandwidth_limit"))
        })
        .await
    }

    async fn create_mail_account(&self, request: &MailAccountRequest) -> MailAccountResult {
        guard(PANEL, "create_mail_account", self.create_mailbox(request)).await
    }

    async fn delete_mail_account(&self, email: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_mail_account", self.delete_mailbox(email)).await
    }

    async fn change_mail_password(&self, email: &str, new_password: &str) -> AccountUpdateResult {
        guard(PANEL, "change_mail_password", self.mail_password(email, new_password)).await
    }

    async fn set_mail_quota(&self, _email: &str, _quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_mail_quota", async {
            Err(PanelError::not_supported(PANEL, "set_mail_quota"))
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
        guard(PANEL, "create_database_user", async {
            Err(PanelError::not_supported(PANEL, "create_database_user"))
        })
        .await
    }

    async fn delete_database_user(&self, _user_id: &str) -> AccountUpdateResult {
        guard(PANEL, "delete_database_user", async {
            Err(PanelError::not_supported(PANEL, "delete_database_user"))
        })
        .await
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
        _user_id: &str,
        _database_id: &str,
        _privileges: &[String],
    ) -> AccountUpdateResult {
        guard(PANEL, "grant_database_privileges", async {
            Err(PanelError::not_supported(PANEL, "grant_database_privileges"))
        })
        .await
    }

    async fn get_database_user_info(&self, _user_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_user_info", async {
            Err(PanelError::not_supported(PANEL, "get_database_user_info"))
        })
        .await
    }

    async fn list_database_users(&self, _account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_database_users", async {
            Err(PanelError::not_supported(PANEL, "list_database_users"))
        })
        .await
    }
}

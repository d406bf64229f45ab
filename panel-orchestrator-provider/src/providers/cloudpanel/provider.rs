//! CloudPanel HostingPanel trait 实现

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use crate::error::{PanelError, Result, codes};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, map_fields_json, parse_size_mb, present_fields,
    table_values, validate_database_name, validate_hosting_request, validate_hosting_update,
    validate_password, validate_username,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::transport::HttpMethod;
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType, non_blank,
};
use crate::utils::datetime::parse_panel_timestamp;

use super::{CloudDatabase, CloudDatabaseUser, CloudPanelProvider, CloudSite, PANEL};

/// `POST /sites` keys. The vhost template stands in for a plan.
const CREATE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Domain, "domainName"),
    (CanonicalField::Username, "siteUser"),
    (CanonicalField::Password, "siteUserPassword"),
    (CanonicalField::Plan, "vhostTemplate"),
];

/// `PUT /sites/{id}` keys.
const UPDATE_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Password, "siteUserPassword"),
    (CanonicalField::Plan, "vhostTemplate"),
];

const DEFAULT_SITE_TYPE: &str = "php";

const HOSTING: &str = "Site";
const DATABASE: &str = "Database";
const DATABASE_USER: &str = "Database user";

/// CloudPanel ids are positive integers.
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

/// CloudPanel knows two permission sets; anything beyond reads is read-write.
fn permissions(privileges: &[String]) -> &'static str {
    if privileges.iter().all(|p| p.eq_ignore_ascii_case("SELECT")) {
        "read-only"
    } else {
        "read-write"
    }
}

impl CloudPanelProvider {
    pub(crate) fn site_to_info(site: CloudSite) -> AccountInfoResult {
        let status = match site.status.to_ascii_lowercase().as_str() {
            "active" | "enabled" => AccountStatus::Active,
            "suspended" | "disabled" => AccountStatus::Suspended,
            _ => AccountStatus::Unknown,
        };
        AccountInfoResult {
            domain: site.domain_name,
            username: site.site_user,
            status,
            disk_usage_mb: parse_size_mb(&site.disk_usage),
            ip_address: Some(site.ip_address).filter(|ip| !ip.is_empty()),
            created_date: parse_panel_timestamp(&site.created_at),
            ..AccountInfoResult::found(site.id)
        }
        .with_info("type", site.site_type)
        .with_info("php_version", site.php_version)
    }

    fn database_to_info(db: CloudDatabase) -> AccountInfoResult {
        AccountInfoResult {
            domain: db.domain_name,
            username: db.name.clone(),
            status: AccountStatus::Active,
            created_date: parse_panel_timestamp(&db.created_at),
            ..AccountInfoResult::found(db.id)
        }
        .with_info("name", db.name)
        .with_info("site_id", db.site_id)
        .with_info("engine", db.engine)
    }

    fn database_user_to_info(user: CloudDatabaseUser) -> AccountInfoResult {
        AccountInfoResult {
            username: user.username,
            status: AccountStatus::Active,
            created_date: parse_panel_timestamp(&user.created_at),
            ..AccountInfoResult::found(user.id)
        }
        .with_info("database_id", user.database_id)
        .with_info("database", user.database_name)
        .with_info("permissions", user.permissions)
    }

    /// Site id for a numeric id or a domain name.
    async fn resolve_site(&self, site: &str) -> Result<String> {
        let site = site.trim();
        if numeric_id(site, "Site").is_ok() {
            return Ok(site.to_string());
        }
        self.sites()
            .await?
            .into_iter()
            .find(|s| s.domain_name.eq_ignore_ascii_case(site))
            .map(|s| s.id)
            .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, site))
    }

    // ---- sites ----

    async fn sites(&self) -> Result<Vec<CloudSite>> {
        let sites: Vec<CloudSite> = self.fetch("/sites", ErrorContext::resource(HOSTING)).await?;
        Ok(sites.into_iter().filter(|s| !s.id.is_empty()).collect())
    }

    async fn create_site(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let domain = req.domain.trim();

        let mut body = map_fields_json(req, CREATE_FIELDS, BoolStyle::TrueFalse);
        body.entry("type")
            .or_insert_with(|| Value::String(DEFAULT_SITE_TYPE.to_string()));

        let data = self
            .api(
                HttpMethod::Post,
                "/sites",
                Some(Value::Object(body)),
                ErrorContext::new(HOSTING, domain),
            )
            .await?;
        let site: CloudSite = self.decode(data, "POST /sites")?;

        Ok(HostingAccountResult {
            success: true,
            message: format!("Site {domain} created"),
            account_id: site.id,
            domain: domain.to_string(),
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            plan: req.plan.trim().to_string(),
            created_date: parse_panel_timestamp(&site.created_at).or_else(|| Some(Utc::now())),
            ..HostingAccountResult::default()
        })
    }

    async fn update_site(
        &self,
        account_id: &str,
        req: &HostingAccountRequest,
    ) -> Result<AccountUpdateResult> {
        validate_hosting_update(PANEL, account_id, req)?;
        let id = numeric_id(account_id, "Site")?;
        let fields = present_fields(req);
        if fields.is_empty() {
            return Ok(AccountUpdateResult::succeeded(account_id, "Nothing to update"));
        }
        let values = table_values(req, UPDATE_FIELDS, BoolStyle::TrueFalse);
        if values.is_empty() {
            return Err(PanelError::not_supported(
                PANEL,
                &format!("update_web_hosting_account ({fields})"),
            ));
        }
        let body: serde_json::Map<String, Value> = values
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        self.api(
            HttpMethod::Put,
            &format!("/sites/{id}"),
            Some(Value::Object(body)),
            ErrorContext::new(HOSTING, id),
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(id, format!("Site {id} updated"))
                .field(&fields, None),
        )
    }

    async fn set_suspended(&self, account_id: &str, suspended: bool) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        let (action, state) = if suspended {
            ("suspend", "suspended")
        } else {
            ("unsuspend", "active")
        };
        self.api(
            HttpMethod::Post,
            &format!("/sites/{id}/{action}"),
            None,
            ErrorContext::new(HOSTING, id),
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(id, format!("Site {id} {state}"))
                .field("status", Some(state.to_string())),
        )
    }

    async fn delete_site(&self, account_id: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        self.api(
            HttpMethod::Delete,
            &format!("/sites/{id}"),
            None,
            ErrorContext::new(HOSTING, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, format!("Site {id} deleted")))
    }

    async fn site_info(&self, account_id: &str) -> Result<AccountInfoResult> {
        let id = numeric_id(account_id, "Site")?;
        let site: CloudSite = self
            .fetch(&format!("/sites/{id}"), ErrorContext::new(HOSTING, id))
            .await?;
        Ok(Self::site_to_info(site))
    }

    async fn list_sites(&self) -> Result<Vec<AccountInfoResult>> {
        Ok(self.sites().await?.into_iter().map(Self::site_to_info).collect())
    }

    async fn site_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(account_id, "Site")?;
        validate_password(PANEL, password)?;
        self.api(
            HttpMethod::Put,
            &format!("/sites/{id}/password"),
            Some(json!({ "password": password })),
            ErrorContext::new(HOSTING, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, "Password changed").field("password", None))
    }

    // ---- databases ----

    async fn create_db(&self, req: &DatabaseRequest) -> Result<DatabaseResult> {
        validate_database_name(PANEL, &req.database_name)?;
        let Some(site) = non_blank(req.domain.as_deref()) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_DOMAIN,
                "CloudPanel databases belong to a site; domain or site id is required",
            ));
        };
        let site_id = self.resolve_site(site).await?;
        let name = req.database_name.trim();

        let mut body = json!({
            "siteId": site_id,
            "name": name,
            "engine": req.database_type().to_ascii_lowercase(),
        });
        let user = non_blank(req.username.as_deref());
        if let (Some(user), Some(password), Some(obj)) =
            (user, non_blank(req.password.as_deref()), body.as_object_mut())
        {
            obj.insert("username".to_string(), json!(user));
            obj.insert("password".to_string(), json!(password));
            obj.insert("permissions".to_string(), json!(permissions(&req.privileges())));
        }

        let data = self
            .api(HttpMethod::Post, "/databases", Some(body), ErrorContext::new(DATABASE, name))
            .await?;
        let db: CloudDatabase = self.decode(data, "POST /databases")?;

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: db.id,
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            username: user.map(str::to_string),
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    async fn delete_db(&self, database_id: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(database_id, DATABASE)?;
        self.api(
            HttpMethod::Delete,
            &format!("/databases/{id}"),
            None,
            ErrorContext::new(DATABASE, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, format!("Database {id} deleted")))
    }

    async fn db_info(&self, database_id: &str) -> Result<AccountInfoResult> {
        let id = numeric_id(database_id, DATABASE)?;
        let db: CloudDatabase = self
            .fetch(&format!("/databases/{id}"), ErrorContext::new(DATABASE, id))
            .await?;
        Ok(Self::database_to_info(db))
    }

    /// `?siteId=` filter for list endpoints; blank means everything.
    async fn site_filter(&self, account_id: &str) -> Result<String> {
        if account_id.trim().is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("?siteId={}", self.resolve_site(account_id).await?))
        }
    }

    async fn list_dbs(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let filter = self.site_filter(account_id).await?;
        let dbs: Vec<CloudDatabase> = self
            .fetch(&format!("/databases{filter}"), ErrorContext::resource(DATABASE))
            .await?;
        Ok(dbs
            .into_iter()
            .filter(|db| !db.id.is_empty())
            .map(Self::database_to_info)
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
                "CloudPanel database users belong to a database; database id is required",
            ));
        };
        let database_id = numeric_id(database, DATABASE)?;
        let user = req.username.trim();
        let data = self
            .api(
                HttpMethod::Post,
                "/database-users",
                Some(json!({
                    "databaseId": database_id,
                    "username": user,
                    "password": req.password,
                    "permissions": permissions(&req.privileges()),
                })),
                ErrorContext::new(DATABASE_USER, user),
            )
            .await?;
        let created: CloudDatabaseUser = self.decode(data, "POST /database-users")?;
        Ok(
            AccountUpdateResult::succeeded(created.id, format!("Database user {user} created"))
                .field("user", Some(user.to_string())),
        )
    }

    async fn delete_db_user(&self, user_id: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(user_id, DATABASE_USER)?;
        self.api(
            HttpMethod::Delete,
            &format!("/database-users/{id}"),
            None,
            ErrorContext::new(DATABASE_USER, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, format!("Database user {id} deleted")))
    }

    async fn db_user_password(&self, user_id: &str, password: &str) -> Result<AccountUpdateResult> {
        let id = numeric_id(user_id, DATABASE_USER)?;
        validate_password(PANEL, password)?;
        self.api(
            HttpMethod::Put,
            &format!("/database-users/{id}"),
            Some(json!({ "password": password })),
            ErrorContext::new(DATABASE_USER, id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(id, "Password changed").field("password", None))
    }

    async fn db_user_info(&self, user_id: &str) -> Result<AccountInfoResult> {
        let id = numeric_id(user_id, DATABASE_USER)?;
        let user: CloudDatabaseUser = self
            .fetch(&format!("/database-users/{id}"), ErrorContext::new(DATABASE_USER, id))
            .await?;
        Ok(Self::database_user_to_info(user))
    }

    async fn list_db_users(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let filter = self.site_filter(account_id).await?;
        let users: Vec<CloudDatabaseUser> = self
            .fetch(&format!("/database-users{filter}"), ErrorContext::resource(DATABASE_USER))
            .await?;
        Ok(users
            .into_iter()
            .filter(|u| !u.id.is_empty())
            .map(Self::database_user_to_info)
            .collect())
    }
}

macro_rules! not_supported {
    ($op:literal) => {
        guard(PANEL, $op, async { Err(PanelError::not_supported(PANEL, $op)) }).await
    };
}

#[async_trait]
impl HostingPanel for CloudPanelProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Cloudpanel,
            name: "CloudPanel".to_string(),
            description: "CloudPanel REST API; sites are addressed by numeric id, no mail service"
                .to_string(),
            default_port: 8443,
            required_fields: vec![PanelCredentialField::password("apiKey", "API Key")],
            features: PanelFeatures {
                mail_accounts: false,
                mail_quotas: false,
                databases: true,
                database_users: true,
                privilege_grants: false,
                disk_quotas: false,
                bandwidth_limits: false,
            },
        }
    }

    async fn test_connection(&self) -> bool {
        match self.sites().await {
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
        guard(PANEL, "create_web_hosting_account", self.create_site(request)).await
    }

    async fn update_web_hosting_account(
        &self,
        account_id: &str,
        request: &HostingAccountRequest,
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "update_web_hosting_account",
            self.update_site(account_id, request),
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
        guard(PANEL, "delete_web_hosting_account", self.delete_site(account_id)).await
    }

    async fn get_web_hosting_account_info(&self, account_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_web_hosting_account_info", self.site_info(account_id)).await
    }

    async fn list_web_hosting_accounts(&self) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_web_hosting_accounts", self.list_sites()).await
    }

    async fn change_web_hosting_password(
        &self,
        account_id: &str,
        new_password: &str,
    ) -> AccountUpdateResult {
        guard(
            PANEL,
            "change_web_hosting_password",
            self.site_password(account_id, new_password),
        )
        .await
    }

    async fn set_web_hosting_disk_quota(&self, _account_id: &str, _quota_mb: u64) -> AccountUpdateResult {
        not_supported!("set_web_hosting_disk_quota")
    }

    async fn set_web_hosting_bandwidth_limit(
        &self,
        _account_id: &str,
        _limit_mb: u64,
    ) -> AccountUpdateResult {
        not_supported!("set_web_hosting_bandwidth_limit")
    }

    async fn create_mail_account(&self, _request: &MailAccountRequest) -> MailAccountResult {
        not_supported!("create_mail_account")
    }

    async fn delete_mail_account(&self, _email: &str) -> AccountUpdateResult {
        not_supported!("delete_mail_account")
    }

    async fn change_mail_password(&self, _email: &str, _new_password: &str) -> AccountUpdateResult {
        not_supported!("change_mail_password")
    }

    async fn set_mail_quota(&self, _email: &str, _quota_mb: u64) -> AccountUpdateResult {
        not_supported!("set_mail_quota")
    }

    async fn get_mail_account_info(&self, _email: &str) -> AccountInfoResult {
        not_supported!("get_mail_account_info")
    }

    async fn list_mail_accounts(&self, _domain: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_mail_accounts", async {
            Err(PanelError::not_supported(PANEL, "list_mail_accounts"))
        })
        .await
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
        not_supported!("grant_database_privileges")
    }

    async fn get_database_user_info(&self, user_id: &str) -> AccountInfoResult {
        guard(PANEL, "get_database_user_info", self.db_user_info(user_id)).await
    }

    async fn list_database_users(&self, account_id: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_database_users", self.list_db_users(account_id)).await
    }
}

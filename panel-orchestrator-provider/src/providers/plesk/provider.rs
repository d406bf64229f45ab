//! Plesk HostingPanel trait 实现

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{PanelError, Result, codes};
use crate::normalize::{guard, guard_list};
use crate::providers::common::{
    BoolStyle, CanonicalField, FieldMapping, bytes_to_mb, mb_to_bytes, present_fields,
    split_email, table_values, validate_account_id, validate_database_name,
    validate_hosting_request, validate_hosting_update, validate_password, validate_quota,
    validate_username,
};
use crate::traits::{ErrorContext, HostingPanel};
use crate::types::{
    AccountInfoResult, AccountStatus, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelCredentialField, PanelFeatures, PanelMetadata, PanelType, non_blank,
};
use crate::utils::datetime::parse_panel_timestamp;

use super::http::{filter, request};
use super::{PANEL, PleskProvider, XmlNode};

/// `<limits>` entries; sizes are converted to bytes.
const LIMIT_FIELDS: &[FieldMapping] = &[
    (CanonicalField::DiskQuota, "disk_space"),
    (CanonicalField::Bandwidth, "max_traffic"),
    (CanonicalField::MaxEmail, "max_box"),
    (CanonicalField::MaxDatabases, "max_db"),
    (CanonicalField::MaxSubdomains, "max_subdom"),
];

/// `<hosting><vrt_hst>` properties.
const PROPERTY_FIELDS: &[FieldMapping] = &[
    (CanonicalField::Username, "ftp_login"),
    (CanonicalField::Password, "ftp_password"),
    (CanonicalField::Cgi, "cgi"),
];

const BYTE_LIMITS: [&str; 2] = ["disk_space", "max_traffic"];

/// `gen_setup/status` values.
const STATUS_ACTIVE: &str = "0";
const STATUS_SUSPENDED: &str = "16";

/// `additional_settings` key carrying the webspace IP address.
const IP_ADDRESS_KEY: &str = "ip_address";

const HOSTING: &str = "Webspace";
const SITE: &str = "Site";
const MAILBOX: &str = "Mail account";
const DATABASE: &str = "Database";
const DATABASE_USER: &str = "Database user";

// ============ packet builders ============

fn dataset(items: &[&str]) -> XmlNode {
    XmlNode::new("dataset").with_all(items.iter().map(|i| XmlNode::new(i)))
}

fn named_value(element: &str, name: &str, value: &str) -> XmlNode {
    XmlNode::new(element)
        .with_text("name", name)
        .with_text("value", value)
}

/// A size limit in MB as Plesk expects it: bytes, `-1` for unlimited.
fn byte_limit(mb: u64) -> String {
    if mb == 0 {
        "-1".to_string()
    } else {
        mb_to_bytes(mb).to_string()
    }
}

/// Plesk reports sizes in bytes with `-1` for unlimited.
fn bytes_field(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|v| u64::try_from(v).ok())
        .map(bytes_to_mb)
}

fn limits_node(req: &HostingAccountRequest) -> Option<XmlNode> {
    let limits: Vec<XmlNode> = table_values(req, LIMIT_FIELDS, BoolStyle::TrueFalse)
        .into_iter()
        .map(|(name, value)| {
            let value = if BYTE_LIMITS.contains(&name.as_str()) {
                value.parse::<u64>().map_or(value, byte_limit)
            } else {
                value
            };
            named_value("limit", &name, &value)
        })
        .collect();
    (!limits.is_empty()).then(|| XmlNode::new("limits").with_all(limits))
}

fn hosting_node(req: &HostingAccountRequest) -> Option<XmlNode> {
    let mut properties = table_values(req, PROPERTY_FIELDS, BoolStyle::TrueFalse);
    if let Some(shell) = req.shell_access {
        let value = if shell { "/bin/bash" } else { "forbidden" };
        properties.push(("shell".to_string(), value.to_string()));
    }
    properties.extend(
        req.additional_settings
            .iter()
            .filter(|(k, _)| k.as_str() != IP_ADDRESS_KEY)
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    if properties.is_empty() {
        return None;
    }
    let mut vrt_hst = XmlNode::new("vrt_hst").with_all(
        properties
            .iter()
            .map(|(name, value)| named_value("property", name, value)),
    );
    if let Some(ip) = req.additional_settings.get(IP_ADDRESS_KEY) {
        vrt_hst = vrt_hst.with_text("ip_address", ip.as_str());
    }
    Some(XmlNode::new("hosting").with(vrt_hst))
}

fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

impl PleskProvider {
    /// `<webspace><get>` result to `AccountInfoResult`.
    pub(crate) fn webspace_to_info(result: &XmlNode) -> AccountInfoResult {
        let id = result.text_at(&["id"]);
        let gen_info = result.find(&["data", "gen_info"]);
        let general = |name: &str| gen_info.map_or("", |g| g.text_at(&[name]));

        let status = match general("status") {
            "" => AccountStatus::Unknown,
            STATUS_ACTIVE => AccountStatus::Active,
            _ => AccountStatus::Suspended,
        };
        let property = |name: &str| {
            result
                .find(&["data", "hosting", "vrt_hst"])
                .and_then(|h| {
                    h.children_named("property")
                        .find(|p| p.text_at(&["name"]) == name)
                })
                .map_or("", |p| p.text_at(&["value"]))
        };
        let limit = |name: &str| {
            result
                .find(&["data", "limits"])
                .and_then(|l| l.children_named("limit").find(|p| p.text_at(&["name"]) == name))
                .and_then(|l| bytes_field(l.text_at(&["value"])))
        };

        AccountInfoResult {
            domain: general("name").to_string(),
            username: property("ftp_login").to_string(),
            status,
            disk_usage_mb: bytes_field(general("real_size")),
            disk_quota_mb: limit("disk_space"),
            bandwidth_usage_mb: result
                .find(&["data", "stat"])
                .and_then(|s| bytes_field(s.text_at(&["traffic"]))),
            bandwidth_limit_mb: limit("max_traffic"),
            ip_address: Some(general("dns_ip_address").to_string()).filter(|ip| !ip.is_empty()),
            created_date: parse_panel_timestamp(general("cr_date")),
            ..AccountInfoResult::found(id)
        }
        .with_info("guid", general("guid"))
        .with_info("htype", general("htype"))
        .with_info("status_code", general("status"))
    }

    fn mailname_to_info(domain: &str, mailname: &XmlNode) -> AccountInfoResult {
        let name = mailname.text_at(&["name"]);
        let email = format!("{name}@{domain}");
        let enabled = mailname.text_at(&["mailbox", "enabled"]);
        AccountInfoResult {
            domain: domain.to_string(),
            username: name.to_string(),
            email: email.clone(),
            status: if enabled == "false" {
                AccountStatus::Suspended
            } else {
                AccountStatus::Active
            },
            disk_quota_mb: bytes_field(mailname.text_at(&["mailbox", "quota"]))
                .filter(|q| *q > 0),
            ..AccountInfoResult::found(email)
        }
        .with_info("mailname_id", mailname.text_at(&["id"]))
    }

    fn database_to_info(result: &XmlNode) -> AccountInfoResult {
        AccountInfoResult {
            status: AccountStatus::Active,
            ..AccountInfoResult::found(result.text_at(&["id"]))
        }
        .with_info("database_name", result.text_at(&["name"]))
        .with_info("database_type", result.text_at(&["type"]))
        .with_info("webspace_id", result.text_at(&["webspace-id"]))
        .with_info("db_server_id", result.text_at(&["db-server-id"]))
    }

    fn database_user_to_info(result: &XmlNode) -> AccountInfoResult {
        AccountInfoResult {
            username: result.text_at(&["login"]).to_string(),
            status: AccountStatus::Active,
            ..AccountInfoResult::found(result.text_at(&["id"]))
        }
        .with_info("db_id", result.text_at(&["db-id"]))
    }

    // ---- lookups ----

    /// Site id of `domain`, as mail operations address it.
    async fn site_id(&self, domain: &str) -> Result<String> {
        let lookup = |operator: &str| {
            request(
                operator,
                "get",
                vec![filter("name", domain), dataset(&["gen_info"])],
            )
        };
        let ctx = ErrorContext::new(SITE, domain);
        // 主域名在部分版本中只能通过 webspace 查询
        let result = match self.call_one(lookup("site"), ctx.clone()).await {
            Err(PanelError::NotFound { .. }) => self.call_one(lookup("webspace"), ctx).await?,
            other => other?,
        };
        Some(result.text_at(&["id"]).to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PanelError::not_found(PANEL, SITE, domain))
    }

    /// Webspace id for a numeric id or a domain name.
    async fn webspace_id(&self, domain_or_id: &str) -> Result<String> {
        let value = domain_or_id.trim();
        if is_numeric_id(value) {
            return Ok(value.to_string());
        }
        let result = self
            .call_one(
                request("webspace", "get", vec![filter("name", value), dataset(&["gen_info"])]),
                ErrorContext::new(HOSTING, value),
            )
            .await?;
        Some(result.text_at(&["id"]).to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PanelError::not_found(PANEL, HOSTING, value))
    }

    async fn webspace_ids(&self) -> Result<Vec<String>> {
        let results = self
            .call(
                request("webspace", "get", vec![XmlNode::new("filter"), dataset(&["gen_info"])]),
                ErrorContext::resource(HOSTING),
            )
            .await?;
        Ok(results
            .iter()
            .map(|r| r.text_at(&["id"]).to_string())
            .filter(|id| !id.is_empty())
            .collect())
    }

    async fn service_plan_guid(&self, plan: &str) -> Result<String> {
        let result = self
            .call_one(
                request("service-plan", "get", vec![filter("name", plan)]),
                ErrorContext::new("Service plan", plan),
            )
            .await?;
        Some(result.text_at(&["guid"]).to_string())
            .filter(|g| !g.is_empty())
            .ok_or_else(|| PanelError::not_found(PANEL, "Service plan", plan))
    }

    // ---- hosting accounts ----

    async fn set_webspace(&self, account_id: &str, values: Vec<XmlNode>) -> Result<()> {
        self.call(
            request(
                "webspace",
                "set",
                vec![
                    filter("id", account_id),
                    XmlNode::new("values").with_all(values),
                ],
            ),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(())
    }

    async fn create_account(&self, req: &HostingAccountRequest) -> Result<HostingAccountResult> {
        validate_hosting_request(PANEL, req)?;
        let domain = req.domain.trim();

        let mut gen_setup = XmlNode::new("gen_setup").with_text("name", domain);
        if let Some(ip) = req.additional_settings.get(IP_ADDRESS_KEY) {
            gen_setup = gen_setup.with_text("ip_address", ip.as_str());
        }
        gen_setup = gen_setup
            .with_text("htype", "vrt_hst")
            .with_text("status", STATUS_ACTIVE);

        let mut children = vec![gen_setup];
        children.extend(hosting_node(req));
        children.extend(limits_node(req));
        if let Some(plan) = non_blank(Some(req.plan.as_str())) {
            children.push(XmlNode::leaf("plan-name", plan));
        }

        let result = self
            .call_one(
                request("webspace", "add", children),
                ErrorContext::new(HOSTING, domain),
            )
            .await?;
        let id = result.text_at(&["id"]).to_string();

        Ok(HostingAccountResult {
            success: true,
            message: format!("Webspace {domain} created"),
            account_id: id,
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

        let mut values = Vec::new();
        if let Some(domain) = CanonicalField::Domain.value(req, BoolStyle::TrueFalse) {
            values.push(XmlNode::new("gen_setup").with_text("name", domain));
        }
        values.extend(hosting_node(req));
        values.extend(limits_node(req));
        let plan = non_blank(Some(req.plan.as_str()));

        if values.is_empty() && plan.is_none() {
            return Ok(AccountUpdateResult::succeeded(account_id, "Nothing to update"));
        }
        if !values.is_empty() {
            self.set_webspace(account_id, values).await?;
        }
        if let Some(plan) = plan {
            let guid = self.service_plan_guid(plan).await?;
            self.call(
                request(
                    "webspace",
                    "switch-subscription",
                    vec![filter("id", account_id), XmlNode::leaf("plan-guid", guid)],
                ),
                ErrorContext::new(HOSTING, account_id),
            )
            .await?;
        }

        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Webspace {account_id} updated"))
                .field(&present_fields(req), None),
        )
    }

    async fn set_status(&self, account_id: &str, suspended: bool) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        let (code, state) = if suspended {
            (STATUS_SUSPENDED, "suspended")
        } else {
            (STATUS_ACTIVE, "active")
        };
        self.set_webspace(
            account_id,
            vec![XmlNode::new("gen_setup").with_text("status", code)],
        )
        .await?;
        Ok(
            AccountUpdateResult::succeeded(account_id, format!("Webspace {account_id} {state}"))
                .field("status", Some(state.to_string())),
        )
    }

    async fn delete_account(&self, account_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        self.call(
            request("webspace", "del", vec![filter("id", account_id)]),
            ErrorContext::new(HOSTING, account_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            account_id,
            format!("Webspace {account_id} deleted"),
        ))
    }

    fn webspace_query(filter_node: XmlNode) -> XmlNode {
        request(
            "webspace",
            "get",
            vec![filter_node, dataset(&["gen_info", "hosting", "limits", "stat"])],
        )
    }

    async fn account_info(&self, account_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, account_id)?;
        let result = self
            .call_one(
                Self::webspace_query(filter("id", account_id)),
                ErrorContext::new(HOSTING, account_id),
            )
            .await?;
        Ok(Self::webspace_to_info(&result))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfoResult>> {
        let results = self
            .call(
                Self::webspace_query(XmlNode::new("filter")),
                ErrorContext::resource(HOSTING),
            )
            .await?;
        Ok(results
            .iter()
            .filter(|r| !r.text_at(&["id"]).is_empty())
            .map(Self::webspace_to_info)
            .collect())
    }

    async fn change_password(&self, account_id: &str, password: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_password(PANEL, password)?;
        let hosting = XmlNode::new("hosting").with(
            XmlNode::new("vrt_hst").with(named_value("property", "ftp_password", password)),
        );
        self.set_webspace(account_id, vec![hosting]).await?;
        Ok(AccountUpdateResult::succeeded(account_id, "Password changed").field("password", None))
    }

    async fn set_byte_limit(
        &self,
        account_id: &str,
        limit: &str,
        mb: u64,
        field: &str,
    ) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, account_id)?;
        validate_quota(PANEL, mb)?;
        let limits =
            XmlNode::new("limits").with(named_value("limit", limit, &byte_limit(mb)));
        self.set_webspace(account_id, vec![limits]).await?;
        Ok(
            AccountUpdateResult::succeeded(account_id, format!("{field} set to {mb} MB"))
                .field(field, Some(mb.to_string())),
        )
    }

    // ---- mail ----

    fn mail_filter(site_id: &str) -> XmlNode {
        XmlNode::new("filter").with_text("site-id", site_id)
    }

    async fn create_mailbox(&self, req: &MailAccountRequest) -> Result<MailAccountResult> {
        let (local, _) = split_email(PANEL, &req.email)?;
        validate_password(PANEL, &req.password)?;
        if let Some(quota) = req.quota_mb {
            validate_quota(PANEL, quota)?;
        }
        let domain = req.mail_domain().to_string();
        let email = format!("{local}@{domain}");
        let site_id = self.site_id(&domain).await?;

        let mut mailbox = XmlNode::new("mailbox").with_text("enabled", "true");
        if let Some(quota) = req.quota_mb {
            mailbox = mailbox.with_text("quota", byte_limit(quota));
        }
        let mailname = XmlNode::new("mailname")
            .with_text("name", local)
            .with(mailbox)
            .with(
                XmlNode::new("password")
                    .with_text("value", req.password.as_str())
                    .with_text("type", "plain"),
            );
        self.call_one(
            request("mail", "create", vec![Self::mail_filter(&site_id).with(mailname)]),
            ErrorContext::new(MAILBOX, &email),
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

    /// `<mail><update><set>` for one mailname.
    async fn update_mailname(&self, email: &str, changes: Vec<XmlNode>) -> Result<()> {
        let (local, domain) = split_email(PANEL, email)?;
        let site_id = self.site_id(domain).await?;
        let mailname = XmlNode::new("mailname")
            .with_text("name", local)
            .with_all(changes);
        self.call(
            XmlNode::new("mail").with(
                XmlNode::new("update")
                    .with(XmlNode::new("set").with(Self::mail_filter(&site_id).with(mailname))),
            ),
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(())
    }

    async fn delete_mailbox(&self, email: &str) -> Result<AccountUpdateResult> {
        let (local, domain) = split_email(PANEL, email)?;
        let site_id = self.site_id(domain).await?;
        self.call(
            request(
                "mail",
                "remove",
                vec![Self::mail_filter(&site_id).with_text("name", local)],
            ),
            ErrorContext::new(MAILBOX, email),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            email,
            format!("Mail account {email} deleted"),
        ))
    }

    async fn mailnames(&self, domain: &str, name: Option<&str>) -> Result<Vec<AccountInfoResult>> {
        let site_id = self.site_id(domain).await?;
        let mut filter_node = Self::mail_filter(&site_id);
        if let Some(name) = name {
            filter_node = filter_node.with_text("name", name);
        }
        let ctx = name.map_or_else(
            || ErrorContext::resource(MAILBOX),
            |n| ErrorContext::new(MAILBOX, format!("{n}@{domain}")),
        );
        let results = self
            .call(
                request("mail", "get_info", vec![filter_node, XmlNode::new("mailbox")]),
                ctx,
            )
            .await?;
        Ok(results
            .iter()
            .flat_map(|r| r.children_named("mailname"))
            .filter(|m| !m.text_at(&["name"]).is_empty())
            .map(|m| Self::mailname_to_info(domain, m))
            .collect())
    }

    async fn mailbox_info(&self, email: &str) -> Result<AccountInfoResult> {
        let (local, domain) = split_email(PANEL, email)?;
        self.mailnames(domain, Some(local))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PanelError::not_found(PANEL, MAILBOX, email))
    }

    // ---- databases ----

    async fn create_db(&self, req: &DatabaseRequest) -> Result<DatabaseResult> {
        validate_database_name(PANEL, &req.database_name)?;
        let Some(owner) = non_blank(req.domain.as_deref()) else {
            return Err(PanelError::validation(
                PANEL,
                codes::INVALID_DOMAIN,
                "Databases belong to a webspace; domain is required",
            ));
        };
        let name = req.database_name.trim();
        let webspace_id = self.webspace_id(owner).await?;

        let result = self
            .call_one(
                request(
                    "database",
                    "add-db",
                    vec![
                        XmlNode::leaf("webspace-id", webspace_id.as_str()),
                        XmlNode::leaf("name", name),
                        XmlNode::leaf("type", req.database_type()),
                    ],
                ),
                ErrorContext::new(DATABASE, name),
            )
            .await?;
        let db_id = result.text_at(&["id"]).to_string();

        let db_user = non_blank(req.username.as_deref());
        if let (Some(login), Some(password)) = (db_user, non_blank(req.password.as_deref())) {
            self.call_one(
                request(
                    "database",
                    "add-db-user",
                    vec![
                        XmlNode::leaf("db-id", db_id.as_str()),
                        XmlNode::leaf("login", login),
                        XmlNode::leaf("password", password),
                    ],
                ),
                ErrorContext::new(DATABASE_USER, login),
            )
            .await?;
        }

        Ok(DatabaseResult {
            success: true,
            message: format!("Database {name} created"),
            account_id: db_id,
            database_name: name.to_string(),
            database_type: req.database_type().to_string(),
            username: db_user.map(str::to_string),
            created_date: Some(Utc::now()),
            ..DatabaseResult::default()
        })
    }

    async fn delete_db(&self, database_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, database_id)?;
        self.call(
            request("database", "del-db", vec![filter("id", database_id)]),
            ErrorContext::new(DATABASE, database_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            database_id,
            format!("Database {database_id} deleted"),
        ))
    }

    async fn db_info(&self, database_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, database_id)?;
        let result = self
            .call_one(
                request("database", "get-db", vec![filter("id", database_id)]),
                ErrorContext::new(DATABASE, database_id),
            )
            .await?;
        Ok(Self::database_to_info(&result))
    }

    /// Raw `get-db` results for one webspace, or for every webspace.
    async fn database_results(&self, account_id: &str) -> Result<Vec<XmlNode>> {
        let webspace_ids = if account_id.trim().is_empty() {
            self.webspace_ids().await?
        } else {
            vec![self.webspace_id(account_id).await?]
        };
        if webspace_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter_node = XmlNode::new("filter").with_all(
            webspace_ids
                .iter()
                .map(|id| XmlNode::leaf("webspace-id", id.as_str())),
        );
        let results = self
            .call(
                request("database", "get-db", vec![filter_node]),
                ErrorContext::resource(DATABASE),
            )
            .await?;
        Ok(results
            .into_iter()
            .filter(|r| !r.text_at(&["id"]).is_empty())
            .collect())
    }

    // ---- database users ----

    async fn create_db_user(&self, req: &DatabaseUserRequest) -> Result<AccountUpdateResult> {
        validate_username(PANEL, &req.username)?;
        validate_password(PANEL, &req.password)?;
        let login = req.username.trim();

        let scope = match (non_blank(req.database_name.as_deref()), non_blank(req.domain.as_deref())) {
            (Some(db_id), _) => XmlNode::leaf("db-id", db_id),
            (None, Some(owner)) => XmlNode::leaf("webspace-id", self.webspace_id(owner).await?),
            (None, None) => {
                return Err(PanelError::validation(
                    PANEL,
                    codes::INVALID_DATABASE_NAME,
                    "A database id or owning domain is required",
                ));
            }
        };

        let result = self
            .call_one(
                request(
                    "database",
                    "add-db-user",
                    vec![
                        scope,
                        XmlNode::leaf("login", login),
                        XmlNode::leaf("password", req.password.as_str()),
                    ],
                ),
                ErrorContext::new(DATABASE_USER, login),
            )
            .await?;
        let user_id = result.text_at(&["id"]).to_string();

        Ok(
            AccountUpdateResult::succeeded(user_id, format!("Database user {login} created"))
                .field("login", Some(login.to_string())),
        )
    }

    async fn delete_db_user(&self, user_id: &str) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, user_id)?;
        self.call(
            request("database", "del-db-user", vec![filter("id", user_id)]),
            ErrorContext::new(DATABASE_USER, user_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(
            user_id,
            format!("Database user {user_id} deleted"),
        ))
    }

    async fn change_db_user_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<AccountUpdateResult> {
        validate_account_id(PANEL, user_id)?;
        validate_password(PANEL, password)?;
        self.call(
            request(
                "database",
                "set-db-user",
                vec![XmlNode::leaf("id", user_id), XmlNode::leaf("password", password)],
            ),
            ErrorContext::new(DATABASE_USER, user_id),
        )
        .await?;
        Ok(AccountUpdateResult::succeeded(user_id, "Password changed").field("password", None))
    }

    async fn db_user_info(&self, user_id: &str) -> Result<AccountInfoResult> {
        validate_account_id(PANEL, user_id)?;
        let result = self
            .call_one(
                request("database", "get-db-users", vec![filter("id", user_id)]),
                ErrorContext::new(DATABASE_USER, user_id),
            )
            .await?;
        Ok(Self::database_user_to_info(&result))
    }

    async fn list_db_users(&self, account_id: &str) -> Result<Vec<AccountInfoResult>> {
        let db_ids: Vec<String> = self
            .database_results(account_id)
            .await?
            .iter()
            .map(|r| r.text_at(&["id"]).to_string())
            .collect();
        if db_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter_node = XmlNode::new("filter")
            .with_all(db_ids.iter().map(|id| XmlNode::leaf("db-id", id.as_str())));
        let results = self
            .call(
                request("database", "get-db-users", vec![filter_node]),
                ErrorContext::resource(DATABASE_USER),
            )
            .await?;
        Ok(results
            .iter()
            .filter(|r| !r.text_at(&["id"]).is_empty())
            .map(Self::database_user_to_info)
            .collect())
    }
}

#[async_trait]
impl HostingPanel for PleskProvider {
    fn id(&self) -> &'static str {
        PANEL
    }

    fn metadata() -> PanelMetadata {
        PanelMetadata {
            id: PanelType::Plesk,
            name: "Plesk".to_string(),
            description: "Plesk XML API; hosting accounts are webspaces (subscriptions)"
                .to_string(),
            default_port: 8443,
            required_fields: vec![
                PanelCredentialField::password("apiKey", "Secret Key")
                    .optional("Required unless login and password are set"),
                PanelCredentialField::text("username", "Login")
                    .optional("Used together with password instead of the secret key"),
                PanelCredentialField::password("password", "Password")
                    .optional("Used together with login instead of the secret key"),
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
            .call(request("server", "get_protos", Vec::new()), ErrorContext::default())
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
        guard(PANEL, "suspend_web_hosting_account", self.set_status(account_id, true)).await
    }

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult {
        guard(PANEL, "unsuspend_web_hosting_account", self.set_status(account_id, false)).await
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
            self.set_byte_limit(account_id, "disk_space", quota_mb, "disk_quota_mb"),
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
            self.set_byte_limit(account_id, "max_traffic", limit_mb, "bandwidth_mb"),
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
            let password = XmlNode::new("password")
                .with_text("value", new_password)
                .with_text("type", "plain");
            self.update_mailname(email, vec![password]).await?;
            Ok(AccountUpdateResult::succeeded(email, "Password changed").field("password", None))
        })
        .await
    }

    async fn set_mail_quota(&self, email: &str, quota_mb: u64) -> AccountUpdateResult {
        guard(PANEL, "set_mail_quota", async {
            validate_quota(PANEL, quota_mb)?;
            let mailbox = XmlNode::new("mailbox")
                .with_text("enabled", "true")
                .with_text("quota", byte_limit(quota_mb));
            self.update_mailname(email, vec![mailbox]).await?;
            Ok(
                AccountUpdateResult::succeeded(email, format!("Quota set to {quota_mb} MB"))
                    .field("quota_mb", Some(quota_mb.to_string())),
            )
        })
        .await
    }

    async fn get_mail_account_info(&self, email: &str) -> AccountInfoResult {
        guard(PANEL, "get_mail_account_info", self.mailbox_info(email)).await
    }

    async fn list_mail_accounts(&self, domain: &str) -> Vec<AccountInfoResult> {
        guard_list(PANEL, "list_mail_accounts", self.mailnames(domain.trim(), None)).await
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
        guard_list(PANEL, "list_databases", async {
            Ok(self
                .database_results(account_id)
                .await?
                .iter()
                .map(Self::database_to_info)
                .collect())
        })
        .await
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_sent_in_bytes() {
        let req = HostingAccountRequest {
            disk_quota_mb: Some(1024),
            bandwidth_mb: Some(0),
            max_databases: Some(5),
            ..Default::default()
        };
        let limits = limits_node(&req).unwrap().render();
        assert_eq!(
            limits,
            "<limits>\
             <limit><name>disk_space</name><value>1073741824</value></limit>\
             <limit><name>max_traffic</name><value>-1</value></limit>\
             <limit><name>max_db</name><value>5</value></limit>\
             </limits>"
        );
        assert!(limits_node(&HostingAccountRequest::default()).is_none());
    }

    #[test]
    fn hosting_properties_include_ftp_and_shell() {
        let mut req = HostingAccountRequest {
            username: "exuser".to_string(),
            password: "Str0ngP@ss".to_string(),
            shell_access: Some(false),
            ..Default::default()
        };
        req.additional_settings
            .insert(IP_ADDRESS_KEY.to_string(), "203.0.113.10".to_string());
        let hosting = hosting_node(&req).unwrap();
        let vrt = hosting.child("vrt_hst").unwrap();
        let names: Vec<&str> = vrt
            .children_named("property")
            .map(|p| p.text_at(&["name"]))
            .collect();
        assert_eq!(names, vec!["ftp_login", "ftp_password", "shell"]);
        assert_eq!(vrt.text_at(&["ip_address"]), "203.0.113.10");
    }

    #[test]
    fn webspace_result_maps_to_info() {
        let result = XmlNode::parse(
            "<result><status>ok</status><id>57</id><data>\
             <gen_info><cr_date>2024-03-01</cr_date><name>example.com</name>\
             <status>16</status><real_size>10485760</real_size>\
             <dns_ip_address>203.0.113.10</dns_ip_address></gen_info>\
             <hosting><vrt_hst><property><name>ftp_login</name><value>exuser</value></property>\
             </vrt_hst></hosting>\
             <limits><limit><name>disk_space</name><value>-1</value></limit>\
             <limit><name>max_traffic</name><value>2147483648</value></limit></limits>\
             </data></result>",
        )
        .unwrap();
        let info = PleskProvider::webspace_to_info(&result);
        assert_eq!(info.account_id, "57");
        assert_eq!(info.domain, "example.com");
        assert_eq!(info.username, "exuser");
        assert_eq!(info.status, AccountStatus::Suspended);
        assert_eq!(info.disk_usage_mb, Some(10));
        assert_eq!(info.disk_quota_mb, None);
        assert_eq!(info.bandwidth_limit_mb, Some(2048));
        assert!(info.created_date.is_some());
    }

    #[test]
    fn mailname_maps_to_info() {
        let mailname = XmlNode::parse(
            "<mailname><id>3</id><name>info</name>\
             <mailbox><enabled>true</enabled><quota>104857600</quota></mailbox></mailname>",
        )
        .unwrap();
        let info = PleskProvider::mailname_to_info("example.com", &mailname);
        assert_eq!(info.account_id, "info@example.com");
        assert_eq!(info.disk_quota_mb, Some(100));
        assert_eq!(info.status, AccountStatus::Active);
    }

    #[test]
    fn numeric_ids() {
        assert!(is_numeric_id("57"));
        assert!(!is_numeric_id("example.com"));
        assert!(!is_numeric_id(""));
    }
}

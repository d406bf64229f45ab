use async_trait::async_trait;

use crate::error::{PanelError, PayloadFormat};
use crate::types::{
    AccountInfoResult, AccountUpdateResult, DatabaseRequest, DatabaseResult,
    DatabaseUserRequest, HostingAccountRequest, HostingAccountResult, MailAccountRequest,
    MailAccountResult, PanelMetadata,
};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各面板格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Case-insensitive substring test on the message.
    pub fn mentions(&self, needle: &str) -> bool {
        self.message
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Human-readable resource kind, e.g. `"Hosting account"`.
    pub resource: Option<&'static str>,
    /// Identifier the call addressed (account id, email, database id).
    pub id: Option<String>,
}

impl ErrorContext {
    pub fn new(resource: &'static str, id: impl Into<String>) -> Self {
        Self {
            resource: Some(resource),
            id: Some(id.into()),
        }
    }

    pub fn resource(resource: &'static str) -> Self {
        Self {
            resource: Some(resource),
            id: None,
        }
    }
}

/// 面板错误映射 Trait（内部使用）
/// 各面板实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait PanelErrorMapper {
    /// 返回面板标识符
    fn panel_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError;

    /// 快捷方法：解析错误
    fn parse_error(&self, format: PayloadFormat, detail: impl ToString) -> PanelError {
        PanelError::ParseError {
            panel: self.panel_name().to_string(),
            format,
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> PanelError {
        PanelError::ApiError {
            panel: self.panel_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }

    /// Shared classification of the messages most panels use for
    /// authentication failures, duplicates and missing resources.
    fn map_common(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        let panel = self.panel_name().to_string();
        let resource = context.resource.unwrap_or("Resource");
        if raw.mentions("access denied")
            || raw.mentions("authentication")
            || raw.mentions("unauthorized")
            || raw.mentions("invalid api")
            || raw.mentions("login failed")
        {
            PanelError::InvalidCredentials {
                panel,
                raw_message: Some(raw.message),
            }
        } else if raw.mentions("already exists") || raw.mentions("already taken") {
            PanelError::AlreadyExists {
                panel,
                resource: resource.to_string(),
                raw_message: Some(raw.message),
            }
        } else if raw.mentions("does not exist") || raw.mentions("not found") {
            PanelError::NotFound {
                panel,
                resource: resource.to_string(),
                id: context.id.unwrap_or_default(),
            }
        } else {
            self.unknown_error(raw)
        }
    }
}

/// Hosting control panel contract.
///
/// Every operation returns a canonical result record and never panics or
/// returns `Err`: validation failures, transport failures, unparsable
/// responses and vendor-reported failures all surface as `success == false`
/// with a stable `error_code`. Operations a panel has no primitive for answer
/// `NOT_SUPPORTED`.
///
/// List operations return an empty `Vec` when the panel cannot be reached or
/// answers with something unparsable; an empty list is not proof that no
/// resources exist.
///
/// The meaning of `account_id` is panel-defined (Unix username, domain,
/// numeric site id, webspace id) and only valid on the adapter that issued
/// it.
#[async_trait]
pub trait HostingPanel: Send + Sync {
    /// 面板标识符
    fn id(&self) -> &'static str;

    /// 获取面板元数据（类型级别）
    fn metadata() -> PanelMetadata
    where
        Self: Sized;

    /// Cheap authenticated call; `true` when the panel accepts the
    /// configured credentials.
    async fn test_connection(&self) -> bool;

    // ---- hosting accounts ----

    async fn create_web_hosting_account(
        &self,
        request: &HostingAccountRequest,
    ) -> HostingAccountResult;

    /// Apply the non-empty fields of `request` to an existing account.
    async fn update_web_hosting_account(
        &self,
        account_id: &str,
        request: &HostingAccountRequest,
    ) -> AccountUpdateResult;

    async fn suspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult;

    async fn unsuspend_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult;

    async fn delete_web_hosting_account(&self, account_id: &str) -> AccountUpdateResult;

    async fn get_web_hosting_account_info(&self, account_id: &str) -> AccountInfoResult;

    async fn list_web_hosting_accounts(&self) -> Vec<AccountInfoResult>;

    async fn change_web_hosting_password(
        &self,
        account_id: &str,
        new_password: &str,
    ) -> AccountUpdateResult;

    /// `quota_mb == 0` means unlimited.
    async fn set_web_hosting_disk_quota(&self, account_id: &str, quota_mb: u64)
    -> AccountUpdateResult;

    /// `limit_mb == 0` means unlimited.
    async fn set_web_hosting_bandwidth_limit(
        &self,
        account_id: &str,
        limit_mb: u64,
    ) -> AccountUpdateResult;

    // ---- mail accounts ----

    async fn create_mail_account(&self, request: &MailAccountRequest) -> MailAccountResult;

    async fn delete_mail_account(&self, email: &str) -> AccountUpdateResult;

    async fn change_mail_password(&self, email: &str, new_password: &str) -> AccountUpdateResult;

    /// `quota_mb == 0` means unlimited.
    async fn set_mail_quota(&self, email: &str, quota_mb: u64) -> AccountUpdateResult;

    async fn get_mail_account_info(&self, email: &str) -> AccountInfoResult;

    async fn list_mail_accounts(&self, domain: &str) -> Vec<AccountInfoResult>;

    // ---- databases ----

    async fn create_database(&self, request: &DatabaseRequest) -> DatabaseResult;

    async fn delete_database(&self, database_id: &str) -> AccountUpdateResult;

    async fn get_database_info(&self, database_id: &str) -> AccountInfoResult;

    /// Databases visible to the adapter, narrowed to one hosting account when
    /// `account_id` is non-empty.
    async fn list_databases(&self, account_id: &str) -> Vec<AccountInfoResult>;

    // ---- database users ----

    async fn create_database_user(&self, request: &DatabaseUserRequest) -> AccountUpdateResult;

    async fn delete_database_user(&self, user_id: &str) -> AccountUpdateResult;

    async fn change_database_user_password(
        &self,
        user_id: &str,
        new_password: &str,
    ) -> AccountUpdateResult;

    /// An empty `privileges` slice grants `ALL PRIVILEGES`.
    async fn grant_database_privileges(
        &self,
        user_id: &str,
        database_id: &str,
        privileges: &[String],
    ) -> AccountUpdateResult;

    async fn get_database_user_info(&self, user_id: &str) -> AccountInfoResult;

    async fn list_database_users(&self, account_id: &str) -> Vec<AccountInfoResult>;
}

//! DirectAdmin 集成测试
//!
//! `CMD_API_*` 响应为 url-encoded 文本。

mod common;

use common::{MockTransport, assert_method, form, path, query};
use panel_orchestrator_provider::{
    AccountStatus, DatabaseRequest, DatabaseUserRequest, HostingAccountRequest, HostingPanel,
    HttpMethod, MailAccountRequest,
};

const ADMIN_AUTH: &str = "Basic YWRtaW46c2VjcmV0";
/// `admin|exuser:secret`
const LOGIN_AS_AUTH: &str = "Basic YWRtaW58ZXh1c2VyOnNlY3JldA==";

const OK: &str = "error=0&text=Success&details=";
const OWNER: &str = "example.com=exuser";

#[tokio::test]
async fn test_create_account() {
    let mock = MockTransport::new();
    mock.respond(200, "error=0&text=User+created&details=");
    let panel = common::directadmin(&mock);

    let result = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            email: "owner@example.com".to_string(),
            plan: "gold".to_string(),
            disk_quota_mb: Some(0),
            bandwidth_mb: Some(2048),
            shell_access: Some(false),
            ..HostingAccountRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.account_id, "example.com");
    assert_eq!(result.username, "exuser");

    let request = mock.last_request();
    assert_method(&request, HttpMethod::Post);
    assert_eq!(path(&request), "/CMD_API_ACCOUNT_USER");
    assert_eq!(request.header_value("Authorization"), Some(ADMIN_AUTH));
    let params = form(&request);
    assert_eq!(params["action"], "create");
    assert_eq!(params["username"], "exuser");
    assert_eq!(params["passwd"], "S3cure!pass");
    assert_eq!(params["passwd2"], "S3cure!pass");
    assert_eq!(params["package"], "gold");
    assert_eq!(params["uquota"], "ON");
    assert!(!params.contains_key("quota"));
    assert_eq!(params["bandwidth"], "2048");
    assert_eq!(params["ssh"], "OFF");

    println!("✓ CMD_API_ACCOUNT_USER 测试通过");
}

#[tokio::test]
async fn test_create_account_duplicate() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        "error=1&text=Unable+to+Create&details=That+username+already+exists+on+the+system",
    );
    let panel = common::directadmin(&mock);

    let result = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            ..HostingAccountRequest::default()
        })
        .await;

    assert_failed_with!(result, "ALREADY_EXISTS");
    assert!(result.message.contains("already exists"), "{}", result.message);
}

#[tokio::test]
async fn test_account_info_resolves_owner() {
    let mock = MockTransport::new();
    mock.respond(200, OWNER)
        .respond(
            200,
            "domain=example.com&email=owner%40example.com&package=gold&suspended=yes\
             &quota=1000&bandwidth=unlimited&ip=203.0.113.10\
             &date_created=Fri+Mar++1+10%3A20%3A30+2024&nemails=10",
        )
        .respond(200, "quota=12.5&bandwidth=3");
    let panel = common::directadmin(&mock);

    let info = panel.get_web_hosting_account_info("example.com").await;
    assert!(info.success, "{info:?}");
    assert_eq!(info.account_id, "example.com");
    assert_eq!(info.username, "exuser");
    assert_eq!(info.plan, "gold");
    assert_eq!(info.status, AccountStatus::Suspended);
    assert_eq!(info.disk_quota_mb, Some(1000));
    assert_eq!(info.disk_usage_mb, Some(13));
    assert_eq!(info.bandwidth_limit_mb, None);
    assert_eq!(info.bandwidth_usage_mb, Some(3));
    assert!(info.created_date.is_some());
    assert_eq!(info.additional_info["nemails"], "10");

    assert_eq!(path(&mock.request(0)), "/CMD_API_DOMAIN_OWNERS");
    assert_method(&mock.request(1), HttpMethod::Get);
    assert_eq!(query(&mock.request(1))["user"], "exuser");
    assert_eq!(path(&mock.request(2)), "/CMD_API_SHOW_USER_USAGE");
}

#[tokio::test]
async fn test_command_without_status_is_parse_error() {
    let mock = MockTransport::new();
    mock.respond(200, "").respond(200, OWNER).respond(200, "text=Deleted");
    let panel = common::directadmin(&mock);

    let created = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            ..HostingAccountRequest::default()
        })
        .await;
    assert_failed_with!(created, "RESPONSE_PARSE_ERROR");

    let deleted = panel.delete_web_hosting_account("example.com").await;
    assert_failed_with!(deleted, "RESPONSE_PARSE_ERROR");
    assert_eq!(mock.request_count(), 3);
}

#[tokio::test]
async fn test_unknown_domain_is_not_found() {
    let mock = MockTransport::new();
    mock.respond(200, "");
    let panel = common::directadmin(&mock);

    let info = panel.get_web_hosting_account_info("ghost.test").await;
    assert_eq!(info.error_code.as_deref(), Some("NOT_FOUND"));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_login_page_is_authentication_failure() {
    let mock = MockTransport::new();
    mock.respond(200, "<html><head><title>DirectAdmin Login</title></head></html>");
    let panel = common::directadmin(&mock);

    assert!(!panel.test_connection().await);
}

#[tokio::test]
async fn test_suspend_and_delete_select_the_owner() {
    let mock = MockTransport::new();
    mock.respond(200, OWNER)
        .respond(200, OK)
        .respond(200, OWNER)
        .respond(200, OK);
    let panel = common::directadmin(&mock);

    let suspended = panel.suspend_web_hosting_account("example.com").await;
    assert!(suspended.success, "{suspended:?}");
    let params = form(&mock.request(1));
    assert_eq!(path(&mock.request(1)), "/CMD_API_SELECT_USERS");
    assert_eq!(params["dosuspend"], "Suspend");
    assert_eq!(params["select0"], "exuser");

    let deleted = panel.delete_web_hosting_account("example.com").await;
    assert!(deleted.success, "{deleted:?}");
    let params = form(&mock.request(3));
    assert_eq!(params["confirmed"], "Confirm");
    assert_eq!(params["delete"], "yes");
    assert_eq!(params["select0"], "exuser");
}

#[tokio::test]
async fn test_list_accounts_skips_failed_users() {
    let mock = MockTransport::new();
    mock.respond(200, "list[]=exuser&list[]=broken")
        .respond(200, "domain=example.com&suspended=no")
        .respond(200, "quota=1&bandwidth=0")
        .respond(200, "error=1&text=Cannot+find+user");
    let panel = common::directadmin(&mock);

    let accounts = panel.list_web_hosting_accounts().await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_id, "example.com");
    assert_eq!(accounts[0].status, AccountStatus::Active);
}

#[tokio::test]
async fn test_mailbox_runs_as_owner() {
    let mock = MockTransport::new();
    mock.respond(200, OWNER)
        .respond(200, OK)
        .respond(200, OWNER)
        .respond(200, "info=usage%3D2097152%26quota%3D52428800&sales=usage%3D0%26quota%3D0");
    let panel = common::directadmin(&mock);

    let created = panel
        .create_mail_account(&MailAccountRequest {
            email: "info@example.com".to_string(),
            password: "S3cure!pass".to_string(),
            quota_mb: Some(50),
            ..MailAccountRequest::default()
        })
        .await;
    assert!(created.success, "{created:?}");

    let request = mock.request(1);
    assert_eq!(path(&request), "/CMD_API_POP");
    assert_eq!(request.header_value("Authorization"), Some(LOGIN_AS_AUTH));
    let params = form(&request);
    assert_eq!(params["action"], "create");
    assert_eq!(params["user"], "info");
    assert_eq!(params["quota"], "50");

    let mailboxes = panel.list_mail_accounts("example.com").await;
    assert_eq!(mailboxes.len(), 2);
    let info = mailboxes
        .iter()
        .find(|m| m.email == "info@example.com")
        .expect("info mailbox");
    assert_eq!(info.disk_usage_mb, Some(2));
    assert_eq!(info.disk_quota_mb, Some(50));
    let sales = mailboxes
        .iter()
        .find(|m| m.username == "sales")
        .expect("sales mailbox");
    assert_eq!(sales.disk_quota_mb, None);
}

#[tokio::test]
async fn test_create_database_with_user() {
    let mock = MockTransport::new();
    mock.respond(200, OWNER).respond(200, OK);
    let panel = common::directadmin(&mock);

    let result = panel
        .create_database(&DatabaseRequest {
            database_name: "shop".to_string(),
            domain: Some("example.com".to_string()),
            username: Some("shop".to_string()),
            password: Some("S3cure!pass".to_string()),
            ..DatabaseRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.account_id, "exuser_shop");
    assert_eq!(result.username.as_deref(), Some("exuser_shop"));
    let request = mock.request(1);
    assert_eq!(path(&request), "/CMD_API_DATABASES");
    assert_eq!(request.header_value("Authorization"), Some(LOGIN_AS_AUTH));
    assert_eq!(form(&request)["name"], "shop");
}

#[tokio::test]
async fn test_database_needs_a_user() {
    let mock = MockTransport::new();
    let panel = common::directadmin(&mock);

    let result = panel
        .create_database(&DatabaseRequest {
            database_name: "shop".to_string(),
            ..DatabaseRequest::default()
        })
        .await;

    assert_failed_with!(result, "INVALID_USERNAME");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_database_user_ids() {
    let mock = MockTransport::new();
    mock.respond(200, "list[]=exuser_shop&list[]=exuser_ro");
    let panel = common::directadmin(&mock);

    let created = panel
        .create_database_user(&DatabaseUserRequest {
            username: "ro".to_string(),
            password: "S3cure!pass".to_string(),
            ..DatabaseUserRequest::default()
        })
        .await;
    assert_failed_with!(created, "INVALID_DATABASE_NAME");

    let malformed = panel.get_database_user_info("exuser_ro").await;
    assert_eq!(malformed.error_code.as_deref(), Some("INVALID_ACCOUNT_ID"));
    assert_eq!(mock.request_count(), 0);

    let info = panel.get_database_user_info("exuser_shop/exuser_ro").await;
    assert!(info.success, "{info:?}");
    assert_eq!(info.username, "exuser_ro");
    assert_eq!(info.additional_info["database"], "exuser_shop");
    assert_eq!(query(&mock.request(0))["name"], "exuser_shop");
}

#[tokio::test]
async fn test_privilege_grants_are_not_supported() {
    let mock = MockTransport::new();
    let panel = common::directadmin(&mock);

    let result = panel
        .grant_database_privileges("exuser_shop/exuser_ro", "exuser_shop", &["SELECT".to_string()])
        .await;
    assert_failed_with!(result, "NOT_SUPPORTED");
}

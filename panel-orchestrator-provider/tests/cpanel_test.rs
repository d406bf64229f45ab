//! cPanel / WHM 集成测试
//!
//! 使用 MockTransport 模拟 WHM API 1 与 `uapi_cpanel` 响应。

mod common;

use common::{MockTransport, assert_method, path, query};
use panel_orchestrator_provider::{
    AccountStatus, DatabaseRequest, DatabaseUserRequest, HostingAccountRequest, HostingPanel, HttpMethod,
    MailAccountRequest,
};
use serde_json::json;

fn whm_ok(data: serde_json::Value) -> serde_json::Value {
    json!({ "metadata": { "result": 1, "reason": "OK" }, "data": data })
}

fn whm_failed(reason: &str) -> serde_json::Value {
    json!({ "metadata": { "result": 0, "reason": reason } })
}

fn owner(user: &str) -> serde_json::Value {
    whm_ok(json!({ "user": user }))
}

fn uapi_ok(data: serde_json::Value) -> serde_json::Value {
    whm_ok(json!({ "uapi": { "status": 1, "errors": null, "data": data } }))
}

#[tokio::test]
async fn test_create_account_uses_createacct() {
    let mock = MockTransport::new();
    mock.respond_json(whm_ok(json!({ "ip": "203.0.113.10" })));
    let panel = common::cpanel(&mock);

    let result = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            email: "owner@example.com".to_string(),
            plan: "gold".to_string(),
            disk_quota_mb: Some(1000),
            cgi_access: Some(true),
            ..HostingAccountRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.account_id, "exuser");
    assert_eq!(result.domain, "example.com");
    assert!(result.created_date.is_some());

    let request = mock.last_request();
    assert_method(&request, HttpMethod::Get);
    assert_eq!(path(&request), "/json-api/createacct");
    assert_eq!(request.header_value("Authorization"), Some("whm root:TOKEN"));
    let params = query(&request);
    assert_eq!(params["api.version"], "1");
    assert_eq!(params["username"], "exuser");
    assert_eq!(params["domain"], "example.com");
    assert_eq!(params["contactemail"], "owner@example.com");
    assert_eq!(params["plan"], "gold");
    assert_eq!(params["quota"], "1000");
    assert_eq!(params["cgi"], "1");
    assert!(!params.contains_key("bwlimit"));

    println!("✓ createacct 测试通过");
}

#[tokio::test]
async fn test_create_account_duplicate_is_already_exists() {
    let mock = MockTransport::new();
    mock.respond_json(whm_failed(
        "Sorry, a group for that username already exists.",
    ));
    let panel = common::cpanel(&mock);

    let result = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            ..HostingAccountRequest::default()
        })
        .await;

    assert_failed_with!(result, "ALREADY_EXISTS");
    assert!(result.message.contains("already exists"));
}

#[tokio::test]
async fn test_account_info_and_list() {
    let mock = MockTransport::new();
    let account = json!({
        "user": "exuser",
        "domain": "example.com",
        "email": "owner@example.com",
        "plan": "gold",
        "suspended": 1,
        "diskused": "25M",
        "disklimit": "unlimited",
        "ip": "203.0.113.10",
        "unix_startdate": 1_709_288_430,
        "maxpop": "unlimited",
    });
    mock.respond_json(whm_ok(json!({ "acct": [account.clone()] })));
    mock.respond_json(whm_ok(json!({ "acct": [account, { "user": "other", "domain": "other.test" }] })));
    let panel = common::cpanel(&mock);

    let info = panel.get_web_hosting_account_info("exuser").await;
    assert!(info.success, "{info:?}");
    assert_eq!(info.account_id, "exuser");
    assert_eq!(info.status, AccountStatus::Suspended);
    assert_eq!(info.disk_usage_mb, Some(25));
    assert_eq!(info.disk_quota_mb, None);
    assert_eq!(info.ip_address.as_deref(), Some("203.0.113.10"));
    assert!(info.created_date.is_some());
    assert_eq!(info.additional_info["maxpop"], "unlimited");
    assert_eq!(path(&mock.request(0)), "/json-api/accountsummary");
    assert_eq!(query(&mock.request(0))["user"], "exuser");

    let accounts = panel.list_web_hosting_accounts().await;
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].domain, "other.test");
    assert_eq!(accounts[1].status, AccountStatus::Active);
}

#[tokio::test]
async fn test_missing_account_is_not_found() {
    let mock = MockTransport::new();
    mock.respond_json(whm_ok(json!({ "acct": [] })));
    let panel = common::cpanel(&mock);

    let info = panel.get_web_hosting_account_info("ghost").await;
    assert!(!info.success);
    assert_eq!(info.error_code.as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_update_account_calls_each_function() {
    let mock = MockTransport::new();
    mock.respond_json(whm_ok(json!(null)))
        .respond_json(whm_ok(json!(null)))
        .respond_json(whm_ok(json!(null)));
    let panel = common::cpanel(&mock);

    let result = panel
        .update_web_hosting_account(
            "exuser",
            &HostingAccountRequest {
                disk_quota_mb: Some(2048),
                plan: "platinum".to_string(),
                password: "N3w!password".to_string(),
                ..HostingAccountRequest::default()
            },
        )
        .await;

    assert!(result.success, "{result:?}");
    let paths: Vec<String> = mock.requests().iter().map(path).collect();
    assert_eq!(
        paths,
        ["/json-api/modifyacct", "/json-api/changepackage", "/json-api/passwd"]
    );
    assert_eq!(query(&mock.request(0))["QUOTA"], "2048");
    assert_eq!(query(&mock.request(1))["pkg"], "platinum");
}

#[tokio::test]
async fn test_suspend_and_delete() {
    let mock = MockTransport::new();
    mock.respond_json(whm_ok(json!(null)))
        .respond_json(whm_ok(json!(null)));
    let panel = common::cpanel(&mock);

    let suspended = panel.suspend_web_hosting_account("exuser").await;
    assert!(suspended.success);
    assert_eq!(suspended.new_value.as_deref(), Some("suspended"));

    let deleted = panel.delete_web_hosting_account("exuser").await;
    assert!(deleted.success);
    assert_eq!(path(&mock.request(1)), "/json-api/removeacct");
    assert_eq!(query(&mock.request(1))["username"], "exuser");
}

#[tokio::test]
async fn test_disk_quota_and_bandwidth() {
    let mock = MockTransport::new();
    mock.respond_json(whm_ok(json!(null)))
        .respond_json(whm_ok(json!(null)));
    let panel = common::cpanel(&mock);

    assert!(panel.set_web_hosting_disk_quota("exuser", 500).await.success);
    assert!(panel.set_web_hosting_bandwidth_limit("exuser", 0).await.success);

    assert_eq!(path(&mock.request(0)), "/json-api/editquota");
    assert_eq!(query(&mock.request(0))["quota"], "500");
    assert_eq!(path(&mock.request(1)), "/json-api/limitbw");
    assert_eq!(query(&mock.request(1))["bwlimit"], "0");
}

#[tokio::test]
async fn test_mailbox_through_uapi() {
    let mock = MockTransport::new();
    mock.respond_json(owner("exuser"))
        .respond_json(uapi_ok(json!("info+example.com")))
        .respond_json(owner("exuser"));
    mock.respond_json(uapi_ok(json!([
        { "email": "info@example.com", "domain": "example.com", "diskused": "1.5", "diskquota": "250", "suspended_login": 0 }
    ])));
    let panel = common::cpanel(&mock);

    let created = panel
        .create_mail_account(&MailAccountRequest {
            email: "info@example.com".to_string(),
            password: "S3cure!pass".to_string(),
            quota_mb: Some(250),
            ..MailAccountRequest::default()
        })
        .await;
    assert!(created.success, "{created:?}");
    assert_eq!(created.account_id, "info@example.com");

    assert_eq!(path(&mock.request(0)), "/json-api/getdomainowner");
    assert_eq!(query(&mock.request(0))["domain"], "example.com");
    let params = query(&mock.request(1));
    assert_eq!(path(&mock.request(1)), "/json-api/uapi_cpanel");
    assert_eq!(params["cpanel.user"], "exuser");
    assert_eq!(params["cpanel.module"], "Email");
    assert_eq!(params["cpanel.function"], "add_pop");
    assert_eq!(params["email"], "info");
    assert_eq!(params["quota"], "250");

    let info = panel.get_mail_account_info("info@example.com").await;
    assert!(info.success, "{info:?}");
    assert_eq!(info.username, "info");
    assert_eq!(info.disk_quota_mb, Some(250));
    assert_eq!(info.disk_usage_mb, Some(2));
    assert_eq!(query(&mock.request(3))["cpanel.user"], "exuser");
}

#[tokio::test]
async fn test_mail_without_domain_owner_uses_configured_user() {
    let mock = MockTransport::new();
    mock.respond_json(whm_ok(json!({ "user": null })))
        .respond_json(uapi_ok(json!(null)));
    let panel = common::cpanel(&mock);

    let result = panel.set_mail_quota("info@example.com", 100).await;
    assert!(result.success, "{result:?}");
    let params = query(&mock.request(1));
    assert_eq!(params["cpanel.function"], "edit_pop_quota");
    assert_eq!(params["cpanel.user"], "root");
}

#[tokio::test]
async fn test_uapi_errors_are_reported() {
    let mock = MockTransport::new();
    mock.respond_json(owner("exuser"));
    mock.respond_json(whm_ok(json!({
        "uapi": { "status": 0, "errors": ["You do not have an email account named “ghost@example.com”."], "data": null }
    })));
    let panel = common::cpanel(&mock);

    let result = panel.delete_mail_account("ghost@example.com").await;
    assert_failed_with!(result, "NOT_FOUND");
}

#[tokio::test]
async fn test_create_database_with_user() {
    let mock = MockTransport::new();
    mock.respond_json(uapi_ok(json!(null)))
        .respond_json(uapi_ok(json!(null)))
        .respond_json(uapi_ok(json!(null)));
    let panel = common::cpanel(&mock);

    let result = panel
        .create_database(&DatabaseRequest {
            database_name: "root_shop".to_string(),
            username: Some("root_shop".to_string()),
            password: Some("S3cure!pass".to_string()),
            ..DatabaseRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.database_type, "mysql");
    assert_eq!(result.username.as_deref(), Some("root_shop"));
    let functions: Vec<String> = mock
        .requests()
        .iter()
        .map(|r| query(r)["cpanel.function"].clone())
        .collect();
    assert_eq!(
        functions,
        ["create_database", "create_user", "set_privileges_on_database"]
    );
    assert_eq!(query(&mock.request(2))["privileges"], "ALL PRIVILEGES");
    assert!(mock.requests().iter().all(|r| query(r)["cpanel.user"] == "root"));
}

#[tokio::test]
async fn test_database_follow_ups_run_as_owner() {
    let mock = MockTransport::new();
    mock.respond_json(uapi_ok(json!(null)))
        .respond_json(uapi_ok(json!([
            { "database": "exuser_shop", "disk_usage": 1_048_576, "users": ["exuser_app"] }
        ])))
        .respond_json(uapi_ok(json!(null)));
    let panel = common::cpanel(&mock);

    let created = panel
        .create_database(&DatabaseRequest {
            database_name: "shop".to_string(),
            domain: Some("exuser".to_string()),
            ..DatabaseRequest::default()
        })
        .await;
    assert!(created.success, "{created:?}");
    assert_eq!(created.account_id, "exuser_shop");
    assert_eq!(query(&mock.request(0))["name"], "exuser_shop");

    let info = panel.get_database_info(&created.account_id).await;
    assert!(info.success, "{info:?}");
    assert_eq!(info.username, "exuser_app");

    let deleted = panel.delete_database(&created.account_id).await;
    assert!(deleted.success, "{deleted:?}");
    let delete = query(&mock.request(2));
    assert_eq!(delete["cpanel.function"], "delete_database");
    assert_eq!(delete["name"], "exuser_shop");

    let users: Vec<String> = mock
        .requests()
        .iter()
        .map(|r| query(r)["cpanel.user"].clone())
        .collect();
    assert_eq!(users, ["exuser", "exuser", "exuser"]);

    println!("✓ 数据库归属账户测试通过");
}

#[tokio::test]
async fn test_database_user_owner_from_prefix() {
    let mock = MockTransport::new();
    mock.respond_json(uapi_ok(json!(null)))
        .respond_json(uapi_ok(json!(null)));
    let panel = common::cpanel(&mock);

    let created = panel
        .create_database_user(&DatabaseUserRequest {
            username: "app".to_string(),
            password: "S3cure!pass".to_string(),
            domain: Some("exuser".to_string()),
            ..DatabaseUserRequest::default()
        })
        .await;
    assert!(created.success, "{created:?}");
    assert_eq!(created.account_id, "exuser_app");

    let granted = panel
        .grant_database_privileges("exuser_app", "exuser_shop", &["SELECT".to_string()])
        .await;
    assert!(granted.success, "{granted:?}");
    let grant = query(&mock.request(1));
    assert_eq!(grant["cpanel.user"], "exuser");
    assert_eq!(grant["user"], "exuser_app");
    assert_eq!(grant["privileges"], "SELECT");
}

#[tokio::test]
async fn test_postgres_is_not_supported() {
    let mock = MockTransport::new();
    let panel = common::cpanel(&mock);

    let result = panel
        .create_database(&DatabaseRequest {
            database_name: "root_shop".to_string(),
            database_type: Some("postgresql".to_string()),
            ..DatabaseRequest::default()
        })
        .await;

    assert_failed_with!(result, "NOT_SUPPORTED");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_metadata() {
    let metadata = panel_orchestrator_provider::CpanelProvider::metadata();
    assert_eq!(metadata.default_port, 2087);
    assert!(metadata.features.privilege_grants);
    assert!(common::cpanel(&MockTransport::new()).id() == "cpanel");
}

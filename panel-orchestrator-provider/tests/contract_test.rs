//! Cross-panel contract tests
//!
//! Behavior every adapter shares: validation before I/O, transport and HTTP
//! failures flattened into result records, list failures as empty lists,
//! and deterministic `NOT_SUPPORTED` answers.

mod common;

use common::{MockTransport, all_panels};
use panel_orchestrator_provider::{
    ConnectionSettings, CpanelCredentials, DatabaseRequest, HostingAccountRequest, HostingPanel,
    HttpRequest, MailAccountRequest, PanelCredentials, PanelType, TransportError, create_panel,
    get_all_panel_metadata,
};
use serde_json::json;

/// An account id each adapter accepts syntactically.
fn sample_account_id(panel: PanelType) -> &'static str {
    match panel {
        PanelType::Cpanel => "exuser",
        PanelType::Plesk | PanelType::Cloudpanel | PanelType::Ispconfig => "7",
        PanelType::Directadmin | PanelType::Cyberpanel | PanelType::Virtualmin => "example.com",
    }
}

fn valid_request() -> HostingAccountRequest {
    HostingAccountRequest {
        domain: "example.com".to_string(),
        username: "exuser".to_string(),
        password: "S3cure!pass".to_string(),
        ..HostingAccountRequest::default()
    }
}

fn plesk_packet(body: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><packet version="1.6.9.1">{body}</packet>"#)
}

/// Queue the vendor answers for create, get-info and delete of one account.
/// Returns how many of them belong to create and to get-info.
fn queue_lifecycle(panel: PanelType, mock: &MockTransport) -> (usize, usize) {
    match panel {
        PanelType::Cpanel => {
            let ok = json!({ "metadata": { "result": 1, "reason": "OK" }, "data": null });
            mock.respond_json(ok.clone())
                .respond_json(json!({
                    "metadata": { "result": 1, "reason": "OK" },
                    "data": { "acct": [{ "user": "exuser", "domain": "example.com" }] }
                }))
                .respond_json(ok);
            (1, 1)
        }
        PanelType::Plesk => {
            mock.respond(
                200,
                plesk_packet(
                    "<webspace><add><result><status>ok</status><id>7</id></result></add></webspace>",
                ),
            )
            .respond(
                200,
                plesk_packet(
                    "<webspace><get><result><status>ok</status><id>7</id>\
                     <data><gen_info><name>example.com</name><status>0</status></gen_info>\
                     </data></result></get></webspace>",
                ),
            )
            .respond(
                200,
                plesk_packet(
                    "<webspace><del><result><status>ok</status><id>7</id></result></del></webspace>",
                ),
            );
            (1, 1)
        }
        PanelType::Directadmin => {
            mock.respond(200, "error=0&text=User+created&details=")
                .respond(200, "example.com=exuser")
                .respond(200, "domain=example.com&suspended=no")
                .respond(200, "quota=1&bandwidth=0")
                .respond(200, "example.com=exuser")
                .respond(200, "error=0&text=Deleted&details=");
            (1, 3)
        }
        PanelType::Cyberpanel => {
            mock.respond_json(json!({ "createWebSiteStatus": 1, "error_message": "None" }))
                .respond_json(json!({
                    "status": 1,
                    "fetchStatus": 1,
                    "data": json!([{ "domain": "example.com", "admin": "exuser", "state": "Active" }])
                        .to_string()
                }))
                .respond_json(json!({ "websiteDeleteStatus": 1 }));
            (1, 1)
        }
        PanelType::Cloudpanel => {
            let site = json!({ "id": 12, "domainName": "example.com", "siteUser": "exuser" });
            mock.respond_json(json!({ "success": true, "data": site.clone() }))
                .respond_json(json!({ "success": true, "data": site }))
                .respond(204, "");
            (1, 1)
        }
        PanelType::Ispconfig => {
            let site = json!({
                "domain_id": "55",
                "domain": "example.com",
                "active": "y",
                "system_user": "web55",
                "system_group": "client0"
            });
            let ok = |response: serde_json::Value| {
                json!({ "code": "ok", "message": "", "response": response })
            };
            mock.respond_json(ok(json!("sess-1")))
                .respond_json(ok(json!(55)))
                .respond_json(ok(site.clone()))
                .respond_json(ok(json!(9)))
                .respond_json(ok(site))
                .respond_json(ok(json!(1)));
            (4, 1)
        }
        PanelType::Virtualmin => {
            mock.respond_json(json!({ "command": "create-domain", "status": "success" }))
                .respond_json(json!({
                    "command": "list-domains",
                    "status": "success",
                    "data": [{ "name": "example.com", "values": { "username": ["exuser"] } }]
                }))
                .respond_json(json!({ "command": "delete-domain", "status": "success" }));
            (1, 1)
        }
    }
}

fn mentions(request: &HttpRequest, id: &str) -> bool {
    request.url.contains(id) || request.body.as_deref().is_some_and(|b| b.contains(id))
}

// ============ 参数校验 ============

#[tokio::test]
async fn test_blank_domain_is_rejected_without_requests() {
    let mock = MockTransport::new();
    for (panel, adapter) in all_panels(&mock) {
        let result = adapter
            .create_web_hosting_account(&HostingAccountRequest {
                domain: "   ".to_string(),
                ..valid_request()
            })
            .await;
        assert!(!result.success, "{panel}");
        assert_eq!(result.error_code.as_deref(), Some("INVALID_DOMAIN"), "{panel}");
        assert!(!result.message.is_empty(), "{panel}");
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_missing_username_and_password_are_rejected() {
    let mock = MockTransport::new();
    for (panel, adapter) in all_panels(&mock) {
        let result = adapter
            .create_web_hosting_account(&HostingAccountRequest {
                username: String::new(),
                ..valid_request()
            })
            .await;
        assert_eq!(result.error_code.as_deref(), Some("INVALID_USERNAME"), "{panel}");

        let result = adapter
            .create_web_hosting_account(&HostingAccountRequest {
                password: String::new(),
                ..valid_request()
            })
            .await;
        assert_eq!(result.error_code.as_deref(), Some("INVALID_PASSWORD"), "{panel}");
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_blank_account_id_is_rejected() {
    let mock = MockTransport::new();
    for (panel, adapter) in all_panels(&mock) {
        let result = adapter.suspend_web_hosting_account("").await;
        assert_eq!(result.error_code.as_deref(), Some("INVALID_ACCOUNT_ID"), "{panel}");
        let info = adapter.get_web_hosting_account_info(" ").await;
        assert!(!info.success, "{panel}");
        assert_eq!(info.error_code.as_deref(), Some("INVALID_ACCOUNT_ID"), "{panel}");
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_malformed_email_is_rejected_or_unsupported() {
    let mock = MockTransport::new();
    for (panel, adapter) in all_panels(&mock) {
        let result = adapter
            .create_mail_account(&MailAccountRequest {
                email: "not-an-email".to_string(),
                password: "S3cure!pass".to_string(),
                ..MailAccountRequest::default()
            })
            .await;
        assert!(!result.success, "{panel}");
        let expected = if panel == PanelType::Cloudpanel {
            "NOT_SUPPORTED"
        } else {
            "INVALID_EMAIL_FORMAT"
        };
        assert_eq!(result.error_code.as_deref(), Some(expected), "{panel}");
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_invalid_database_name_is_rejected() {
    let mock = MockTransport::new();
    for (panel, adapter) in all_panels(&mock) {
        let result = adapter
            .create_database(&DatabaseRequest {
                database_name: "bad name;".to_string(),
                domain: Some("example.com".to_string()),
                ..DatabaseRequest::default()
            })
            .await;
        assert_eq!(
            result.error_code.as_deref(),
            Some("INVALID_DATABASE_NAME"),
            "{panel}"
        );
    }
    assert_eq!(mock.request_count(), 0);
}

// ============ 传输与 HTTP 失败 ============

#[tokio::test]
async fn test_network_failure_becomes_network_error() {
    for (panel, adapter) in all_panels(&MockTransport::new()) {
        // 未排队任何响应：每个请求都以网络错误结束
        let info = adapter
            .get_web_hosting_account_info(sample_account_id(panel))
            .await;
        assert!(!info.success, "{panel}");
        assert_eq!(info.error_code.as_deref(), Some("NETWORK_ERROR"), "{panel}");
    }
}

#[tokio::test]
async fn test_timeout_is_reported_as_timeout() {
    let mock = MockTransport::new();
    mock.fail(TransportError::Timeout("30s elapsed".to_string()));
    let adapter = common::cpanel(&mock);
    let result = adapter.suspend_web_hosting_account("exuser").await;
    assert_failed_with!(result, "TIMEOUT");
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_http_500_surfaces_status_code() {
    for panel in PanelType::ALL {
        let mock = MockTransport::new();
        let adapter = common::adapter(panel, &mock);
        mock.respond(500, "Internal Server Error");

        let result = adapter
            .delete_web_hosting_account(sample_account_id(panel))
            .await;
        assert!(!result.success, "{panel}");
        assert_eq!(result.error_code.as_deref(), Some("500"), "{panel}");
        assert_eq!(mock.request_count(), 1, "{panel}: the failed call is not retried");
    }
}

#[tokio::test]
async fn test_empty_success_body_is_parse_error() {
    for panel in PanelType::ALL {
        let mock = MockTransport::new();
        for _ in 0..4 {
            mock.respond(200, "");
        }
        let adapter = common::adapter(panel, &mock);

        let result = adapter.create_web_hosting_account(&valid_request()).await;
        assert!(!result.success, "{panel}: {result:?}");
        let code = result.error_code.as_deref().unwrap_or_default();
        assert!(
            matches!(code, "JSON_PARSE_ERROR" | "XML_PARSE_ERROR" | "RESPONSE_PARSE_ERROR"),
            "{panel}: {code}"
        );
    }
}

#[tokio::test]
async fn test_list_failure_is_an_empty_list() {
    for (panel, adapter) in all_panels(&MockTransport::new()) {
        let accounts = adapter.list_web_hosting_accounts().await;
        assert!(accounts.is_empty(), "{panel}");
    }
}

#[tokio::test]
async fn test_test_connection_is_false_when_unreachable() {
    for (panel, adapter) in all_panels(&MockTransport::new()) {
        assert!(!adapter.test_connection().await, "{panel}");
    }
}

// ============ 账户生命周期 ============

#[tokio::test]
async fn test_created_account_id_drives_info_and_delete() {
    for panel in PanelType::ALL {
        let mock = MockTransport::new();
        let (create_calls, info_calls) = queue_lifecycle(panel, &mock);
        let adapter = common::adapter(panel, &mock);

        let created = adapter.create_web_hosting_account(&valid_request()).await;
        assert!(created.success, "{panel}: {created:?}");
        assert!(!created.account_id.is_empty(), "{panel}");
        assert_eq!(mock.request_count(), create_calls, "{panel}");

        let info = adapter
            .get_web_hosting_account_info(&created.account_id)
            .await;
        assert!(info.success, "{panel}: {info:?}");
        assert_eq!(info.account_id, created.account_id, "{panel}");
        assert_eq!(info.domain, "example.com", "{panel}");
        assert_eq!(mock.request_count(), create_calls + info_calls, "{panel}");

        let deleted = adapter
            .delete_web_hosting_account(&created.account_id)
            .await;
        assert!(deleted.success, "{panel}: {deleted:?}");
        assert_eq!(deleted.account_id, created.account_id, "{panel}");
        let requests = mock.requests();
        let delete_requests = &requests[create_calls + info_calls..];
        assert!(!delete_requests.is_empty(), "{panel}");
        assert!(
            delete_requests.iter().any(|r| mentions(r, &created.account_id)),
            "{panel}: delete never addressed {}",
            created.account_id
        );
        assert_eq!(mock.pending(), 0, "{panel}");
    }
    println!("✓ 创建/查询/删除 测试通过");
}

// ============ 不支持的操作 ============

#[tokio::test]
async fn test_not_supported_operations_make_no_requests() {
    let mock = MockTransport::new();

    let cloudpanel = common::cloudpanel(&mock);
    assert_failed_with!(
        cloudpanel.set_mail_quota("info@example.com", 10).await,
        "NOT_SUPPORTED"
    );
    assert_failed_with!(
        cloudpanel.set_web_hosting_disk_quota("7", 100).await,
        "NOT_SUPPORTED"
    );
    assert!(cloudpanel.list_mail_accounts("example.com").await.is_empty());

    let virtualmin = common::virtualmin(&mock);
    assert_failed_with!(
        virtualmin
            .grant_database_privileges("u", "example.com/shop", &[])
            .await,
        "NOT_SUPPORTED"
    );
    assert_failed_with!(
        virtualmin.get_database_user_info("u").await,
        "NOT_SUPPORTED"
    );

    let cyberpanel = common::cyberpanel(&mock);
    assert_failed_with!(
        cyberpanel.set_web_hosting_bandwidth_limit("example.com", 10).await,
        "NOT_SUPPORTED"
    );

    let plesk = common::plesk(&mock);
    assert_failed_with!(
        plesk.grant_database_privileges("3", "4", &[]).await,
        "NOT_SUPPORTED"
    );

    assert_eq!(mock.request_count(), 0);
}

// ============ 工厂与元数据 ============

#[test]
fn test_metadata_matches_features() {
    let metadata = get_all_panel_metadata();
    assert_eq!(metadata.len(), 7);
    for m in &metadata {
        assert!(!m.name.is_empty());
        assert!(!m.required_fields.is_empty(), "{}", m.id);
    }
    let cloudpanel = metadata.iter().find(|m| m.id == PanelType::Cloudpanel);
    assert!(cloudpanel.is_some_and(|m| !m.features.mail_accounts));
    let ispconfig = metadata.iter().find(|m| m.id == PanelType::Ispconfig);
    assert!(ispconfig.is_some_and(|m| m.features.privilege_grants));
}

#[test]
fn test_factory_rejects_blank_host() {
    let result = create_panel(
        ConnectionSettings::new("", 2087, true),
        PanelCredentials::Cpanel(CpanelCredentials {
            username: "root".to_string(),
            api_token: "TOKEN".into(),
            cpanel_user: None,
        }),
    );
    let err = result.err().expect("blank host must fail");
    assert_eq!(err.error_code(), "INVALID_CONFIGURATION");
}

// ============ 真实面板 ============

#[tokio::test]
#[ignore]
async fn test_live_connection() {
    skip_if_no_credentials!("PANEL_TYPE", "PANEL_HOST", "PANEL_PORT");

    let panel = common::live_panel().expect("创建面板连接失败");
    assert!(panel.test_connection().await, "凭证应该有效");

    let accounts = panel.list_web_hosting_accounts().await;
    println!("✓ test_connection 测试通过，共 {} 个账户", accounts.len());
}

//! Plesk XML API 集成测试

mod common;

use common::{MockTransport, assert_method, path};
use panel_orchestrator_provider::{
    AccountStatus, DatabaseRequest, HostingAccountRequest, HostingPanel, HttpMethod,
    MailAccountRequest,
};

fn packet(body: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><packet version="1.6.9.1">{body}</packet>"#)
}

fn body(mock: &MockTransport, index: usize) -> String {
    mock.request(index).body.unwrap_or_default()
}

#[tokio::test]
async fn test_create_webspace() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet(
            "<webspace><add><result><status>ok</status><id>7</id>\
             <guid>5c0e1f47-9f8e-4a4b-8f8f-111111111111</guid></result></add></webspace>",
        ),
    );
    let panel = common::plesk(&mock);

    let result = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            plan: "Default Domain".to_string(),
            disk_quota_mb: Some(1024),
            ..HostingAccountRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.account_id, "7");
    assert_eq!(result.domain, "example.com");

    let request = mock.last_request();
    assert_method(&request, HttpMethod::Post);
    assert_eq!(path(&request), "/enterprise/control/agent.php");
    assert_eq!(request.header_value("KEY"), Some("KEY"));
    let xml = body(&mock, 0);
    assert!(xml.contains("<webspace><add><gen_setup><name>example.com</name>"), "{xml}");
    assert!(xml.contains("<name>ftp_login</name><value>exuser</value>"), "{xml}");
    assert!(xml.contains("<name>disk_space</name><value>1073741824</value>"), "{xml}");
    assert!(xml.contains("<plan-name>Default Domain</plan-name>"), "{xml}");

    println!("✓ webspace add 测试通过");
}

#[tokio::test]
async fn test_duplicate_webspace_is_already_exists() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet(
            "<webspace><add><result><status>error</status><errcode>1007</errcode>\
             <errtext>Domain example.com already exists.</errtext></result></add></webspace>",
        ),
    );
    let panel = common::plesk(&mock);

    let result = panel
        .create_web_hosting_account(&HostingAccountRequest {
            domain: "example.com".to_string(),
            username: "exuser".to_string(),
            password: "S3cure!pass".to_string(),
            ..HostingAccountRequest::default()
        })
        .await;

    assert_failed_with!(result, "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_system_error_is_authentication_failure() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet(
            "<system><status>error</status><errcode>1001</errcode>\
             <errtext>Authentication failed - wrong password.</errtext></system>",
        ),
    );
    let panel = common::plesk(&mock);

    let info = panel.get_web_hosting_account_info("7").await;
    assert!(!info.success);
    assert_eq!(info.error_code.as_deref(), Some("AUTHENTICATION_FAILED"));
}

#[tokio::test]
async fn test_webspace_info() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet(
            "<webspace><get><result><status>ok</status><filter-id>7</filter-id><id>7</id>\
             <data><gen_info><cr_date>2024-03-01</cr_date><name>example.com</name>\
             <status>16</status><real_size>52428800</real_size>\
             <dns_ip_address>203.0.113.10</dns_ip_address><htype>vrt_hst</htype></gen_info>\
             <hosting><vrt_hst><property><name>ftp_login</name><value>exuser</value></property>\
             </vrt_hst></hosting>\
             <limits><limit><name>disk_space</name><value>-1</value></limit>\
             <limit><name>max_traffic</name><value>10737418240</value></limit></limits>\
             </data></result></get></webspace>",
        ),
    );
    let panel = common::plesk(&mock);

    let info = panel.get_web_hosting_account_info("7").await;
    assert!(info.success, "{info:?}");
    assert_eq!(info.account_id, "7");
    assert_eq!(info.domain, "example.com");
    assert_eq!(info.username, "exuser");
    assert_eq!(info.status, AccountStatus::Suspended);
    assert_eq!(info.disk_usage_mb, Some(50));
    assert_eq!(info.disk_quota_mb, None);
    assert_eq!(info.bandwidth_limit_mb, Some(10240));
    assert_eq!(info.ip_address.as_deref(), Some("203.0.113.10"));
    assert!(info.created_date.is_some());
    assert!(body(&mock, 0).contains("<filter><id>7</id></filter>"));
}

#[tokio::test]
async fn test_missing_webspace_is_not_found() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet(
            "<webspace><get><result><status>error</status><errcode>1013</errcode>\
             <errtext>Webspace does not exist</errtext><id>99</id></result></get></webspace>",
        ),
    );
    let panel = common::plesk(&mock);

    let info = panel.get_web_hosting_account_info("99").await;
    assert_eq!(info.error_code.as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_suspend_and_delete_webspace() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet("<webspace><set><result><status>ok</status><id>7</id></result></set></webspace>"),
    )
    .respond(
        200,
        packet("<webspace><del><result><status>ok</status><id>7</id></result></del></webspace>"),
    );
    let panel = common::plesk(&mock);

    let suspended = panel.suspend_web_hosting_account("7").await;
    assert!(suspended.success, "{suspended:?}");
    assert!(body(&mock, 0).contains("<gen_setup><status>16</status></gen_setup>"));

    let deleted = panel.delete_web_hosting_account("7").await;
    assert!(deleted.success, "{deleted:?}");
    assert!(body(&mock, 1).contains("<webspace><del><filter><id>7</id></filter></del></webspace>"));
}

#[tokio::test]
async fn test_unparsable_response_is_xml_parse_error() {
    let mock = MockTransport::new();
    mock.respond(200, "<packet><webspace><del>");
    let panel = common::plesk(&mock);

    let result = panel.delete_web_hosting_account("7").await;
    assert_failed_with!(result, "XML_PARSE_ERROR");
}

#[tokio::test]
async fn test_create_mailbox_looks_up_site() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet(
            "<site><get><result><status>ok</status><id>12</id>\
             <data><gen_info><name>example.com</name></gen_info></data></result></get></site>",
        ),
    )
    .respond(
        200,
        packet(
            "<mail><create><result><status>ok</status>\
             <mailname><id>3</id><name>info</name></mailname></result></create></mail>",
        ),
    );
    let panel = common::plesk(&mock);

    let result = panel
        .create_mail_account(&MailAccountRequest {
            email: "info@example.com".to_string(),
            password: "S3cure!pass".to_string(),
            quota_mb: Some(100),
            ..MailAccountRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.account_id, "info@example.com");
    assert_eq!(mock.request_count(), 2);
    let xml = body(&mock, 1);
    assert!(xml.contains("<filter><site-id>12</site-id><mailname><name>info</name>"), "{xml}");
    assert!(xml.contains("<quota>104857600</quota>"), "{xml}");
}

#[tokio::test]
async fn test_create_database_with_user() {
    let mock = MockTransport::new();
    mock.respond(
        200,
        packet("<database><add-db><result><status>ok</status><id>4</id></result></add-db></database>"),
    )
    .respond(
        200,
        packet(
            "<database><add-db-user><result><status>ok</status><id>9</id></result></add-db-user></database>",
        ),
    );
    let panel = common::plesk(&mock);

    let result = panel
        .create_database(&DatabaseRequest {
            database_name: "shop".to_string(),
            domain: Some("7".to_string()),
            username: Some("shop_user".to_string()),
            password: Some("S3cure!pass".to_string()),
            ..DatabaseRequest::default()
        })
        .await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.account_id, "4");
    assert_eq!(result.database_type, "mysql");
    assert!(body(&mock, 0).contains("<webspace-id>7</webspace-id><name>shop</name><type>mysql</type>"));
    assert!(body(&mock, 1).contains("<db-id>4</db-id><login>shop_user</login>"));
}

#[tokio::test]
async fn test_database_requires_webspace() {
    let mock = MockTransport::new();
    let panel = common::plesk(&mock);

    let result = panel
        .create_database(&DatabaseRequest {
            database_name: "shop".to_string(),
            ..DatabaseRequest::default()
        })
        .await;

    assert_failed_with!(result, "INVALID_DOMAIN");
    assert_eq!(mock.request_count(), 0);
}

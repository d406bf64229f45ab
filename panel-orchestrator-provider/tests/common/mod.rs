//! 共享测试工具和辅助函数
//!
//! Adapters take their transport through the public `HttpTransport` trait;
//! [`MockTransport`] records every request and answers from a queue.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use panel_orchestrator_provider::{
    CloudPanelCredentials, CloudPanelProvider, ConnectionSettings, CpanelCredentials,
    CpanelProvider, CyberPanelCredentials, CyberPanelProvider, DirectAdminCredentials,
    DirectAdminProvider, HostingPanel, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    IspConfigCredentials, IspConfigProvider, PanelCredentials, PanelType, PleskCredentials,
    PleskProvider, TransportError, VirtualminCredentials, VirtualminProvider, create_panel,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言结果记录失败，且 `error_code` 符合预期
#[macro_export]
macro_rules! assert_failed_with {
    ($result:expr, $code:expr $(,)?) => {{
        let result = &$result;
        assert!(!result.success, "expected failure, got {result:?}");
        assert_eq!(result.error_code.as_deref(), Some($code), "{result:?}");
    }};
}

// ============ MockTransport ============

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    latency: Mutex<Option<Duration>>,
}

/// Recording transport; clones share the request log and response queue.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        self.state
            .responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a `200` JSON response.
    pub fn respond_json(&self, body: serde_json::Value) -> &Self {
        self.respond(200, body.to_string())
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: TransportError) -> &Self {
        self.state.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Delay every answer, to let concurrent callers overlap.
    pub fn set_latency(&self, latency: Duration) {
        *self.state.latency.lock().unwrap() = Some(latency);
    }

    pub fn boxed(&self) -> Box<dyn HttpTransport> {
        Box::new(self.clone())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no request #{index} recorded"))
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().last().cloned().expect("no request recorded")
    }

    /// Responses queued but never consumed.
    pub fn pending(&self) -> usize {
        self.state.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.state.requests.lock().unwrap().push(request);
        let latency = *self.state.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no response queued".to_string())))
    }
}

// ============ Request helpers ============

/// Decoded `k=v` pairs of a query string or form body.
pub fn decode_form(encoded: &str) -> HashMap<String, String> {
    encoded
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(&s.replace('+', " "))
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            };
            (decode(k), decode(v))
        })
        .collect()
}

/// Query parameters of a recorded request.
pub fn query(request: &HttpRequest) -> HashMap<String, String> {
    request
        .url
        .split_once('?')
        .map(|(_, q)| decode_form(q))
        .unwrap_or_default()
}

/// Form body of a recorded request.
pub fn form(request: &HttpRequest) -> HashMap<String, String> {
    decode_form(request.body.as_deref().unwrap_or_default())
}

/// JSON body of a recorded request.
pub fn json_body(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().unwrap_or("null")).expect("request body is JSON")
}

pub fn path(request: &HttpRequest) -> String {
    let without_query = request.url.split('?').next().unwrap_or_default();
    without_query
        .splitn(4, '/')
        .nth(3)
        .map(|p| format!("/{p}"))
        .unwrap_or_default()
}

pub fn assert_method(request: &HttpRequest, method: HttpMethod) {
    assert_eq!(request.method, method, "{} {}", request.method, request.url);
}

// ============ Adapter builders ============

pub fn settings(port: u16) -> ConnectionSettings {
    ConnectionSettings::new("panel.example.com", port, true)
}

pub fn cpanel(mock: &MockTransport) -> CpanelProvider {
    CpanelProvider::builder(
        settings(2087),
        CpanelCredentials {
            username: "root".to_string(),
            api_token: "TOKEN".into(),
            cpanel_user: None,
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("cpanel adapter")
}

pub fn plesk(mock: &MockTransport) -> PleskProvider {
    PleskProvider::builder(
        settings(8443),
        PleskCredentials {
            api_key: Some("KEY".into()),
            ..PleskCredentials::default()
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("plesk adapter")
}

pub fn directadmin(mock: &MockTransport) -> DirectAdminProvider {
    DirectAdminProvider::builder(
        settings(2222),
        DirectAdminCredentials {
            username: "admin".to_string(),
            password: "secret".into(),
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("directadmin adapter")
}

pub fn cyberpanel(mock: &MockTransport) -> CyberPanelProvider {
    CyberPanelProvider::builder(
        settings(8090),
        CyberPanelCredentials {
            api_key: "KEY".into(),
            admin_username: "admin".to_string(),
            admin_password: "secret".into(),
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("cyberpanel adapter")
}

pub fn cloudpanel(mock: &MockTransport) -> CloudPanelProvider {
    CloudPanelProvider::builder(
        settings(8443),
        CloudPanelCredentials {
            api_key: "KEY".into(),
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("cloudpanel adapter")
}

pub fn ispconfig(mock: &MockTransport) -> IspConfigProvider {
    IspConfigProvider::builder(
        settings(8080),
        IspConfigCredentials {
            username: "remote".to_string(),
            password: "secret".into(),
            remote_api_url: None,
            server_id: 1,
            client_id: 0,
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("ispconfig adapter")
}

pub fn virtualmin(mock: &MockTransport) -> VirtualminProvider {
    VirtualminProvider::builder(
        settings(10000),
        VirtualminCredentials {
            username: "root".to_string(),
            password: "secret".into(),
        },
    )
    .transport(mock.boxed())
    .build()
    .expect("virtualmin adapter")
}

/// One adapter of the given type over `mock`.
pub fn adapter(panel: PanelType, mock: &MockTransport) -> Box<dyn HostingPanel> {
    match panel {
        PanelType::Cpanel => Box::new(cpanel(mock)),
        PanelType::Plesk => Box::new(plesk(mock)),
        PanelType::Directadmin => Box::new(directadmin(mock)),
        PanelType::Cyberpanel => Box::new(cyberpanel(mock)),
        PanelType::Cloudpanel => Box::new(cloudpanel(mock)),
        PanelType::Ispconfig => Box::new(ispconfig(mock)),
        PanelType::Virtualmin => Box::new(virtualmin(mock)),
    }
}

/// Every adapter over the same mock, tagged with its panel type.
pub fn all_panels(mock: &MockTransport) -> Vec<(PanelType, Box<dyn HostingPanel>)> {
    PanelType::ALL
        .iter()
        .map(|&panel| (panel, adapter(panel, mock)))
        .collect()
}

// ============ Live panels ============

/// 从环境变量创建真实面板连接
///
/// `PANEL_TYPE`, `PANEL_HOST`, `PANEL_PORT`, optional `PANEL_USE_SSL`
/// (default `true`), plus one `PANEL_CRED_<KEY>` variable per credential
/// field (`PANEL_CRED_APITOKEN`, `PANEL_CRED_USERNAME`, ...).
pub fn live_panel() -> Option<Arc<dyn HostingPanel>> {
    let panel: PanelType = env::var("PANEL_TYPE").ok()?.parse().ok()?;
    let host = env::var("PANEL_HOST").ok()?;
    let port = env::var("PANEL_PORT").ok()?.parse().ok()?;
    let use_ssl = env::var("PANEL_USE_SSL").map_or(true, |v| v != "false");

    let metadata = panel_orchestrator_provider::get_all_panel_metadata()
        .into_iter()
        .find(|m| m.id == panel)?;
    let fields: HashMap<String, String> = metadata
        .required_fields
        .iter()
        .filter_map(|f| {
            let var = format!("PANEL_CRED_{}", f.key.to_ascii_uppercase());
            env::var(var).ok().map(|v| (f.key.clone(), v))
        })
        .collect();
    let credentials = PanelCredentials::from_map(&panel, &fields).ok()?;

    let settings = ConnectionSettings::new(host, port, use_ssl).accept_invalid_certs(true);
    create_panel(settings, credentials).ok()
}

use serde::{Deserialize, Serialize};

/// Stable `error_code` strings surfaced in canonical results.
///
/// HTTP failures use the numeric status code instead (e.g. `"500"`), and
/// vendor failures carry the vendor's own code when one is available.
pub mod codes {
    pub const INVALID_DOMAIN: &str = "INVALID_DOMAIN";
    pub const INVALID_USERNAME: &str = "INVALID_USERNAME";
    pub const INVALID_PASSWORD: &str = "INVALID_PASSWORD";
    pub const INVALID_EMAIL_FORMAT: &str = "INVALID_EMAIL_FORMAT";
    pub const INVALID_ACCOUNT_ID: &str = "INVALID_ACCOUNT_ID";
    pub const INVALID_DATABASE_NAME: &str = "INVALID_DATABASE_NAME";
    pub const INVALID_QUOTA: &str = "INVALID_QUOTA";
    pub const INVALID_CONFIGURATION: &str = "INVALID_CONFIGURATION";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const JSON_PARSE_ERROR: &str = "JSON_PARSE_ERROR";
    pub const XML_PARSE_ERROR: &str = "XML_PARSE_ERROR";
    pub const RESPONSE_PARSE_ERROR: &str = "RESPONSE_PARSE_ERROR";
    pub const API_ERROR: &str = "API_ERROR";
    pub const AUTHENTICATION_FAILED: &str = "AUTHENTICATION_FAILED";
    pub const SESSION_EXPIRED: &str = "SESSION_EXPIRED";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const NOT_SUPPORTED: &str = "NOT_SUPPORTED";
    pub const UNEXPECTED_ERROR: &str = "UNEXPECTED_ERROR";
}

/// Normalized failure category.
///
/// Every [`PanelError`] belongs to exactly one kind, which tells the caller
/// whether a retry can help ([`Network`](Self::Network)), can never help
/// ([`Validation`](Self::Validation), [`NotSupported`](Self::NotSupported)),
/// or needs a human to read the vendor message ([`Vendor`](Self::Vendor)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Caller input failed pre-call checks.
    Validation,
    /// Transport-level failure (connection refused, timeout, DNS).
    Network,
    /// A 2xx body did not match the expected shape.
    Parse,
    /// The vendor explicitly reported a failure.
    Vendor,
    /// The operation has no vendor equivalent.
    NotSupported,
    /// The entity does not exist.
    NotFound,
    /// Anything else.
    Unexpected,
}

/// Wire format of a response that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    Json,
    Xml,
    Text,
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Xml => write!(f, "XML"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Unified error type for every panel operation.
///
/// Each variant records the `panel` that produced it. Adapters propagate this
/// type internally with `?`; it is converted into a canonical failure result
/// exactly once, at the public operation boundary.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PanelError {
    /// Caller input or adapter configuration failed validation.
    #[error("[{panel}] {message}")]
    Validation {
        panel: String,
        code: String,
        message: String,
    },

    /// Connection refused, DNS failure, TLS failure, broken body stream.
    #[error("[{panel}] Network error: {detail}")]
    NetworkError { panel: String, detail: String },

    /// The request did not complete within the configured timeout.
    #[error("[{panel}] Request timeout: {detail}")]
    Timeout { panel: String, detail: String },

    /// The panel answered with a non-2xx HTTP status.
    #[error("[{panel}] HTTP {status}: {body}")]
    HttpStatus {
        panel: String,
        status: u16,
        body: String,
    },

    /// A 2xx response could not be parsed into the expected shape.
    #[error("[{panel}] Failed to parse {format} response: {detail}")]
    ParseError {
        panel: String,
        format: PayloadFormat,
        detail: String,
    },

    /// The vendor reported a failure not covered by a more specific variant.
    #[error("[{panel}] {raw_message}")]
    ApiError {
        panel: String,
        raw_code: Option<String>,
        raw_message: String,
    },

    /// The panel rejected the configured credentials.
    #[error("[{panel}] Authentication failed{}", suffix(.raw_message))]
    InvalidCredentials {
        panel: String,
        raw_message: Option<String>,
    },

    /// A cached session id is no longer accepted by the panel.
    #[error("[{panel}] Session expired: {raw_message}")]
    SessionExpired { panel: String, raw_message: String },

    /// The resource being created already exists on the panel.
    #[error("[{panel}] {resource} already exists{}", suffix(.raw_message))]
    AlreadyExists {
        panel: String,
        resource: String,
        raw_message: Option<String>,
    },

    /// The addressed resource does not exist.
    #[error("[{panel}] {resource} '{id}' not found")]
    NotFound {
        panel: String,
        resource: String,
        id: String,
    },

    /// The panel has no primitive for the requested operation.
    #[error("[{panel}] Operation '{operation}' is not supported by this panel")]
    NotSupported { panel: String, operation: String },

    /// Catch-all, including panics caught at the operation boundary.
    #[error("[{panel}] Unexpected error: {detail}")]
    Unexpected { panel: String, detail: String },
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl PanelError {
    pub fn validation(panel: &str, code: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            panel: panel.to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn not_supported(panel: &str, operation: &str) -> Self {
        Self::NotSupported {
            panel: panel.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn not_found(panel: &str, resource: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            panel: panel.to_string(),
            resource: resource.to_string(),
            id: id.into(),
        }
    }

    pub fn unexpected(panel: &str, detail: impl Into<String>) -> Self {
        Self::Unexpected {
            panel: panel.to_string(),
            detail: detail.into(),
        }
    }

    /// The normalized category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NetworkError { .. } | Self::Timeout { .. } => ErrorKind::Network,
            Self::HttpStatus { status, .. } => {
                if matches!(status, 408 | 429 | 502..=504) {
                    ErrorKind::Network
                } else {
                    ErrorKind::Vendor
                }
            }
            Self::ParseError { .. } => ErrorKind::Parse,
            Self::ApiError { .. }
            | Self::InvalidCredentials { .. }
            | Self::SessionExpired { .. }
            | Self::AlreadyExists { .. } => ErrorKind::Vendor,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotSupported { .. } => ErrorKind::NotSupported,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// The stable `error_code` string placed into canonical failure results.
    #[must_use]
    pub fn error_code(&self) -> String {
        match self {
            Self::Validation { code, .. } => code.clone(),
            Self::NetworkError { .. } => codes::NETWORK_ERROR.to_string(),
            Self::Timeout { .. } => codes::TIMEOUT.to_string(),
            Self::HttpStatus { status, .. } => status.to_string(),
            Self::ParseError { format, .. } => match format {
                PayloadFormat::Json => codes::JSON_PARSE_ERROR,
                PayloadFormat::Xml => codes::XML_PARSE_ERROR,
                PayloadFormat::Text => codes::RESPONSE_PARSE_ERROR,
            }
            .to_string(),
            Self::ApiError { raw_code, .. } => raw_code
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| codes::API_ERROR.to_string()),
            Self::InvalidCredentials { .. } => codes::AUTHENTICATION_FAILED.to_string(),
            Self::SessionExpired { .. } => codes::SESSION_EXPIRED.to_string(),
            Self::AlreadyExists { .. } => codes::ALREADY_EXISTS.to_string(),
            Self::NotFound { .. } => codes::NOT_FOUND.to_string(),
            Self::NotSupported { .. } => codes::NOT_SUPPORTED.to_string(),
            Self::Unexpected { .. } => codes::UNEXPECTED_ERROR.to_string(),
        }
    }

    /// Whether a retry policy may re-issue the request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::ApiError { .. }
                | Self::InvalidCredentials { .. }
                | Self::AlreadyExists { .. }
                | Self::NotFound { .. }
                | Self::NotSupported { .. }
        )
    }
}

/// Convenience type alias for `Result<T, PanelError>`.
pub type Result<T> = std::result::Result<T, PanelError>;

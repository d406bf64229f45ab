//! ISPConfig error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{IspConfigProvider, PANEL};

/// Every failure is `code: "remote_fault"`; the message decides.
impl PanelErrorMapper for IspConfigProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        // "The Session is expired or does not exist."
        if raw.mentions("session") && (raw.mentions("expired") || raw.mentions("does not exist")) {
            return PanelError::SessionExpired {
                panel: PANEL.to_string(),
                raw_message: raw.message,
            };
        }
        // "The login failed. Username or password wrong."
        if raw.mentions("username or password wrong") {
            return PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "domain_error_unique", "error_domain_unique", "Email address already in use"
        if raw.mentions("unique") || raw.mentions("already in use") {
            return PanelError::AlreadyExists {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Record").to_string(),
                raw_message: Some(raw.message),
            };
        }
        self.map_common(raw, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IspConfigCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> IspConfigProvider {
        IspConfigProvider::builder(
            settings(),
            IspConfigCredentials {
                username: "remote".to_string(),
                password: "secret".into(),
                remote_api_url: None,
                server_id: 1,
                client_id: 0,
            },
        )
        .transport(Box::new(Unreachable))
        .build()
        .unwrap()
    }

    fn map(message: &str) -> PanelError {
        provider().map_error(
            RawApiError::with_code("remote_fault", message),
            ErrorContext::new("Web domain", "7"),
        )
    }

    #[test]
    fn session_expiry_is_its_own_kind() {
        let err = map("The Session is expired or does not exist.");
        assert!(matches!(err, PanelError::SessionExpired { .. }));
        assert_eq!(err.error_code(), "SESSION_EXPIRED");
    }

    #[test]
    fn classification() {
        assert!(matches!(
            map("The login failed. Username or password wrong."),
            PanelError::InvalidCredentials { .. }
        ));
        assert!(matches!(map("error_domain_unique<br />"), PanelError::AlreadyExists { .. }));
        assert!(matches!(map("Record does not exist"), PanelError::NotFound { .. }));
        assert!(matches!(map("quota_error_value"), PanelError::ApiError { .. }));
    }
}

//! cPanel error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{CpanelProvider, PANEL};

/// WHM and UAPI report failures as free text (`metadata.reason`,
/// `uapi.errors`), so classification is message based.
impl PanelErrorMapper for CpanelProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        // "Access denied", "The API token is invalid", "Permission denied"
        if raw.mentions("permission denied") || (raw.mentions("token") && raw.mentions("invalid")) {
            return PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "The account “x” does not exist.", "User “x” does not exist",
        // "No such user", "You do not have an email account named “x”."
        if raw.mentions("no such user") || raw.mentions("do not have an email account") {
            return PanelError::NotFound {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Account").to_string(),
                id: context.id.unwrap_or_default(),
            };
        }
        // "Sorry, a group for that username already exists.",
        // "The domain “x” already exists in the userdata."
        if raw.mentions("is already in use") || raw.mentions("already configured") {
            return PanelError::AlreadyExists {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Account").to_string(),
                raw_message: Some(raw.message),
            };
        }
        self.map_common(raw, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CpanelCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> CpanelProvider {
        CpanelProvider::builder(
            settings(),
            CpanelCredentials {
                username: "root".to_string(),
                api_token: "token".into(),
                cpanel_user: None,
            },
        )
        .transport(Box::new(Unreachable))
        .build()
        .unwrap()
    }

    fn ctx() -> ErrorContext {
        ErrorContext::new("Hosting account", "exuser")
    }

    #[test]
    fn access_denied_is_invalid_credentials() {
        let err = provider().map_error(RawApiError::new("Access denied"), ctx());
        assert!(matches!(err, PanelError::InvalidCredentials { .. }));
        let err = provider().map_error(RawApiError::new("The API token is invalid."), ctx());
        assert!(matches!(err, PanelError::InvalidCredentials { .. }));
    }

    #[test]
    fn missing_account_is_not_found() {
        let err = provider().map_error(
            RawApiError::new("The account “exuser” does not exist."),
            ctx(),
        );
        assert!(matches!(
            err,
            PanelError::NotFound { id, resource, .. } if id == "exuser" && resource == "Hosting account"
        ));
    }

    #[test]
    fn duplicate_is_already_exists() {
        let err = provider().map_error(
            RawApiError::new("Sorry, a group for that username already exists."),
            ctx(),
        );
        assert!(matches!(err, PanelError::AlreadyExists { .. }));
        let err = provider().map_error(
            RawApiError::new("The domain example.com is already in use."),
            ctx(),
        );
        assert!(matches!(err, PanelError::AlreadyExists { .. }));
    }

    #[test]
    fn fallback_keeps_message() {
        let err = provider().map_error(RawApiError::new("Disk quota exceeded on /home"), ctx());
        assert!(matches!(
            err,
            PanelError::ApiError { raw_code: None, raw_message, .. }
                if raw_message == "Disk quota exceeded on /home"
        ));
        assert_eq!(
            provider()
                .map_error(RawApiError::new("odd"), ctx())
                .error_code(),
            "API_ERROR"
        );
    }

    #[test]
    fn panel_name_is_cpanel() {
        assert_eq!(provider().panel_name(), "cpanel");
    }
}

//! Plesk error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{PANEL, PleskProvider};

impl PanelErrorMapper for PleskProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        let resource = context.resource.unwrap_or("Object").to_string();
        match raw.code.as_deref() {
            // 1001: authentication failed, 1006: permission denied
            Some("1001" | "1006") => PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some(raw.message),
            },
            // 1007: object already exists
            Some("1007") => PanelError::AlreadyExists {
                panel: PANEL.to_string(),
                resource,
                raw_message: Some(raw.message),
            },
            // 1013: object does not exist
            Some("1013") => PanelError::NotFound {
                panel: PANEL.to_string(),
                resource,
                id: context.id.unwrap_or_default(),
            },
            _ => self.map_common(raw, context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PleskCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> PleskProvider {
        PleskProvider::builder(
            settings(),
            PleskCredentials {
                api_key: Some("key".into()),
                ..Default::default()
            },
        )
        .transport(Box::new(Unreachable))
        .build()
        .unwrap()
    }

    fn map(code: &str, message: &str) -> PanelError {
        provider().map_error(
            RawApiError::with_code(code, message),
            ErrorContext::new("Webspace", "57"),
        )
    }

    #[test]
    fn numeric_codes_are_classified() {
        assert!(matches!(map("1001", "Authentication failed"), PanelError::InvalidCredentials { .. }));
        assert!(matches!(map("1006", "Permission denied"), PanelError::InvalidCredentials { .. }));
        assert!(matches!(map("1007", "Domain already exists"), PanelError::AlreadyExists { .. }));
        assert!(matches!(
            map("1013", "Webspace does not exist"),
            PanelError::NotFound { id, .. } if id == "57"
        ));
    }

    #[test]
    fn unknown_code_is_preserved() {
        let err = map("1023", "Operation failed: quota exceeded");
        assert_eq!(err.error_code(), "1023");
        assert!(err.to_string().contains("quota exceeded"));
    }
}

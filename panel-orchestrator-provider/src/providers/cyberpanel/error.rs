//! CyberPanel error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{CyberPanelProvider, PANEL};

/// CyberPanel returns `error_message` text next to a `0` status key.
impl PanelErrorMapper for CyberPanelProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        // "Invalid username or password.", "Only administrators can use API"
        if raw.mentions("invalid username or password") || raw.mentions("only administrators") {
            return PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "This website already exists.", "Domain already exists as child domain"
        if raw.mentions("already exist") {
            return PanelError::AlreadyExists {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Website").to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "Websites matching query does not exist."
        if raw.mentions("matching query does not exist") {
            return PanelError::NotFound {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Website").to_string(),
                id: context.id.unwrap_or_default(),
            };
        }
        self.map_common(raw, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CyberPanelCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> CyberPanelProvider {
        CyberPanelProvider::builder(
            settings(),
            CyberPanelCredentials {
                api_key: "key".into(),
                admin_username: "admin".to_string(),
                admin_password: "secret".into(),
            },
        )
        .transport(Box::new(Unreachable))
        .build()
        .unwrap()
    }

    fn map(message: &str) -> PanelError {
        provider().map_error(
            RawApiError::new(message),
            ErrorContext::new("Hosting account", "example.com"),
        )
    }

    #[test]
    fn classification() {
        assert!(matches!(
            map("Invalid username or password."),
            PanelError::InvalidCredentials { .. }
        ));
        assert!(matches!(map("This website already exists."), PanelError::AlreadyExists { .. }));
        assert!(matches!(
            map("Websites matching query does not exist."),
            PanelError::NotFound { id, .. } if id == "example.com"
        ));
        assert!(matches!(map("Package not found"), PanelError::NotFound { .. }));
        assert!(matches!(map("Out of inodes"), PanelError::ApiError { .. }));
    }
}

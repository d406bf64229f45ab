//! Virtualmin error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{PANEL, VirtualminProvider};

/// Virtualmin programs fail with free text only.
impl PanelErrorMapper for VirtualminProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        // "A virtual server with the same name already exists", "... clashes with ..."
        if raw.mentions("same name") || raw.mentions("clashes with") || raw.mentions("is already in use") {
            return PanelError::AlreadyExists {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Virtual server").to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "No virtual server with domain ...", "No such user", "Database foo does not exist"
        if raw.mentions("no virtual server") || raw.mentions("no such") {
            return PanelError::NotFound {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Virtual server").to_string(),
                id: context.id.unwrap_or_default(),
            };
        }
        // remote.cgi refuses users without the remote API permission
        if raw.mentions("not allowed to use the remote api") || raw.mentions("remote api is not enabled") {
            return PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some(raw.message),
            };
        }
        self.map_common(raw, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VirtualminCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn map(message: &str) -> PanelError {
        VirtualminProvider::builder(
            settings(),
            VirtualminCredentials {
                username: "root".to_string(),
                password: "secret".into(),
            },
        )
        .transport(Box::new(Unreachable))
        .build()
        .unwrap()
        .map_error(
            RawApiError::new(message),
            ErrorContext::new("Virtual server", "example.com"),
        )
    }

    #[test]
    fn duplicates_and_missing() {
        assert!(matches!(
            map("A virtual server with the same name already exists"),
            PanelError::AlreadyExists { .. }
        ));
        assert!(matches!(
            map("No virtual server with domain example.com exists"),
            PanelError::NotFound { id, .. } if id == "example.com"
        ));
        assert!(matches!(
            map("Virtual server example.com does not exist"),
            PanelError::NotFound { .. }
        ));
    }

    #[test]
    fn remote_api_permission() {
        assert!(matches!(
            map("You are not allowed to use the remote API"),
            PanelError::InvalidCredentials { .. }
        ));
        assert!(matches!(map("Out of disk"), PanelError::ApiError { .. }));
    }
}

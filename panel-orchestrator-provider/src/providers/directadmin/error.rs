//! DirectAdmin error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{DirectAdminProvider, PANEL};

/// DirectAdmin has no error codes; `text` and `details` are free text.
impl PanelErrorMapper for DirectAdminProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        // "That username already exists on the system", "Domain is already in use"
        if raw.mentions("is already in use") || raw.mentions("already exists on") {
            return PanelError::AlreadyExists {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Account").to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "You do not own that domain", "Cannot find user", "Unable to find database"
        if raw.mentions("do not own")
            || raw.mentions("cannot find")
            || raw.mentions("unable to find")
            || raw.mentions("doesn't exist")
        {
            return PanelError::NotFound {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Account").to_string(),
                id: context.id.unwrap_or_default(),
            };
        }
        self.map_common(raw, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectAdminCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> DirectAdminProvider {
        DirectAdminProvider::builder(
            settings(),
            DirectAdminCredentials {
                username: "admin".to_string(),
                password: "secret".into(),
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
    fn duplicates() {
        assert!(matches!(
            map("Unable to Create: That username already exists on the system"),
            PanelError::AlreadyExists { .. }
        ));
        assert!(matches!(map("Domain example.com is already in use"), PanelError::AlreadyExists { .. }));
    }

    #[test]
    fn missing_resources() {
        assert!(matches!(
            map("You do not own that domain"),
            PanelError::NotFound { id, .. } if id == "example.com"
        ));
        assert!(matches!(map("Cannot find user exuser"), PanelError::NotFound { .. }));
    }

    #[test]
    fn credentials_and_fallback() {
        assert!(matches!(map("Access Denied"), PanelError::InvalidCredentials { .. }));
        assert!(matches!(map("Disk is full"), PanelError::ApiError { .. }));
    }
}

//! CloudPanel error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{CloudPanelProvider, PANEL};

impl PanelErrorMapper for CloudPanelProvider {
    fn panel_name(&self) -> &'static str {
        PANEL
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        // "Invalid API key", "API key has expired"
        if raw.mentions("api key") {
            return PanelError::InvalidCredentials {
                panel: PANEL.to_string(),
                raw_message: Some(raw.message),
            };
        }
        // "Site with id 12 not found", "Database user not found"
        if raw.code.as_deref() == Some("not_found") {
            return PanelError::NotFound {
                panel: PANEL.to_string(),
                resource: context.resource.unwrap_or("Site").to_string(),
                id: context.id.unwrap_or_default(),
            };
        }
        self.map_common(raw, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudPanelCredentials;
    use crate::transport::testing::{Unreachable, settings};

    fn provider() -> CloudPanelProvider {
        CloudPanelProvider::builder(settings(), CloudPanelCredentials { api_key: "k".into() })
            .transport(Box::new(Unreachable))
            .build()
            .unwrap()
    }

    #[test]
    fn classification() {
        let p = provider();
        let ctx = || ErrorContext::new("Site", "12");
        assert!(matches!(
            p.map_error(RawApiError::new("Invalid API key"), ctx()),
            PanelError::InvalidCredentials { .. }
        ));
        assert!(matches!(
            p.map_error(RawApiError::with_code("not_found", "Gone"), ctx()),
            PanelError::NotFound { id, .. } if id == "12"
        ));
        assert!(matches!(
            p.map_error(RawApiError::new("domainName: This value is already taken."), ctx()),
            PanelError::AlreadyExists { .. }
        ));
        assert!(matches!(
            p.map_error(RawApiError::new("Disk full"), ctx()),
            PanelError::ApiError { .. }
        ));
    }
}

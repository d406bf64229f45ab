//! Panel factory functions and metadata.

use std::sync::Arc;

use crate::config::{ConnectionSettings, PanelCredentials};
use crate::error::Result;
use crate::traits::HostingPanel;
use crate::types::PanelMetadata;

#[cfg(feature = "cloudpanel")]
use crate::providers::CloudPanelProvider;
#[cfg(feature = "cpanel")]
use crate::providers::CpanelProvider;
#[cfg(feature = "cyberpanel")]
use crate::providers::CyberPanelProvider;
#[cfg(feature = "directadmin")]
use crate::providers::DirectAdminProvider;
#[cfg(feature = "ispconfig")]
use crate::providers::IspConfigProvider;
#[cfg(feature = "plesk")]
use crate::providers::PleskProvider;
#[cfg(feature = "virtualmin")]
use crate::providers::VirtualminProvider;

/// Creates a [`HostingPanel`] for the given connection and credentials.
///
/// The concrete adapter is chosen by the [`PanelCredentials`] variant. The
/// returned adapter is wrapped in `Arc<dyn HostingPanel>` so it can be shared
/// across async tasks.
///
/// # Errors
///
/// A `Validation` error when the connection settings or a mandatory
/// credential are blank, and `NotSupported` when the panel's Cargo feature is
/// disabled.
///
/// # Examples
///
/// ```rust,no_run
/// use panel_orchestrator_provider::{
///     ConnectionSettings, CpanelCredentials, PanelCredentials, create_panel,
/// };
///
/// let panel = create_panel(
///     ConnectionSettings::new("whm.example.com", 2087, true),
///     PanelCredentials::Cpanel(CpanelCredentials {
///         username: "root".to_string(),
///         api_token: "your-token".into(),
///         cpanel_user: None,
///     }),
/// )
/// .unwrap();
/// ```
pub fn create_panel(
    settings: ConnectionSettings,
    credentials: PanelCredentials,
) -> Result<Arc<dyn HostingPanel>> {
    match credentials {
        #[cfg(feature = "cpanel")]
        PanelCredentials::Cpanel(creds) => Ok(Arc::new(CpanelProvider::new(settings, creds)?)),
        #[cfg(feature = "plesk")]
        PanelCredentials::Plesk(creds) => Ok(Arc::new(PleskProvider::new(settings, creds)?)),
        #[cfg(feature = "directadmin")]
        PanelCredentials::Directadmin(creds) => {
            Ok(Arc::new(DirectAdminProvider::new(settings, creds)?))
        }
        #[cfg(feature = "cyberpanel")]
        PanelCredentials::Cyberpanel(creds) => {
            Ok(Arc::new(CyberPanelProvider::new(settings, creds)?))
        }
        #[cfg(feature = "cloudpanel")]
        PanelCredentials::Cloudpanel(creds) => {
            Ok(Arc::new(CloudPanelProvider::new(settings, creds)?))
        }
        #[cfg(feature = "ispconfig")]
        PanelCredentials::Ispconfig(creds) => {
            Ok(Arc::new(IspConfigProvider::new(settings, creds)?))
        }
        #[cfg(feature = "virtualmin")]
        PanelCredentials::Virtualmin(creds) => {
            Ok(Arc::new(VirtualminProvider::new(settings, creds)?))
        }
        // 对应 feature 未启用
        #[allow(unreachable_patterns)]
        other => {
            let _ = settings;
            Err(crate::error::PanelError::not_supported(
                other.panel_type().as_str(),
                "create_panel (feature disabled)",
            ))
        }
    }
}

/// Returns metadata for all panels enabled via feature flags.
///
/// Useful for building dynamic UIs that enumerate the supported panels,
/// their credential fields and capabilities.
pub fn get_all_panel_metadata() -> Vec<PanelMetadata> {
    vec![
        #[cfg(feature = "cpanel")]
        CpanelProvider::metadata(),
        #[cfg(feature = "plesk")]
        PleskProvider::metadata(),
        #[cfg(feature = "directadmin")]
        DirectAdminProvider::metadata(),
        #[cfg(feature = "cyberpanel")]
        CyberPanelProvider::metadata(),
        #[cfg(feature = "cloudpanel")]
        CloudPanelProvider::metadata(),
        #[cfg(feature = "ispconfig")]
        IspConfigProvider::metadata(),
        #[cfg(feature = "virtualmin")]
        VirtualminProvider::metadata(),
    ]
}

//! Hosting panel adapters

/// Field mapping, size conversion and validation shared by the adapters.
pub(crate) mod common;

#[cfg(feature = "cloudpanel")]
mod cloudpanel;
#[cfg(feature = "cpanel")]
mod cpanel;
#[cfg(feature = "cyberpanel")]
mod cyberpanel;
#[cfg(feature = "directadmin")]
mod directadmin;
#[cfg(feature = "ispconfig")]
mod ispconfig;
#[cfg(feature = "plesk")]
mod plesk;
#[cfg(feature = "virtualmin")]
mod virtualmin;

#[cfg(feature = "cloudpanel")]
pub use cloudpanel::{CloudPanelProvider, CloudPanelProviderBuilder};
#[cfg(feature = "cpanel")]
pub use cpanel::{CpanelProvider, CpanelProviderBuilder};
#[cfg(feature = "cyberpanel")]
pub use cyberpanel::{CyberPanelProvider, CyberPanelProviderBuilder};
#[cfg(feature = "directadmin")]
pub use directadmin::{DirectAdminProvider, DirectAdminProviderBuilder};
#[cfg(feature = "ispconfig")]
pub use ispconfig::{IspConfigProvider, IspConfigProviderBuilder};
#[cfg(feature = "plesk")]
pub use plesk::{PleskProvider, PleskProviderBuilder};
#[cfg(feature = "virtualmin")]
pub use virtualmin::{VirtualminProvider, VirtualminProviderBuilder};

//! AppShip Core - release artifact selection
//!
//! Turns the flat artifact listing of a mobile CI build into:
//! - the minimal set of files forming one installable release per module
//!   ([`ArtifactSelector::select`])
//! - one app version descriptor per Android product flavour
//!   ([`ArtifactSelector::prepare_android_app_versions`])
//! - publish and share eligibility of a stored version
//!   ([`ArtifactSelector::publish_and_share_info`])
//!
//! Everything here is a pure function of its inputs: no I/O, no shared
//! mutable state.

pub mod app_version;
pub mod artifact;
pub mod error;
pub mod grouping;
pub mod obs;
pub mod outcome;
pub mod selector;
pub mod telemetry;

pub use app_version::{AppVersion, ArtifactInfo, Platform};
pub use artifact::{
    AppInfo, ArtifactKind, ArtifactMeta, ArtifactRecord, ProvisioningInfo, ANDROID_APK,
    DEBUG_BUILD_TYPE, IOS_IPA, RELEASE_BUILD_TYPE,
};
pub use error::{Result, SettingsError, ShipError};
pub use grouping::{
    group_by_flavour_and_module, group_into_bundles, module_values, require_module_if_ambiguous,
    Bundle, MemberRole, VariantGroup,
};
pub use obs::BuildSpan;
pub use outcome::EngineOutcome;
pub use selector::{ArtifactSelector, ShareInfo};

/// AppShip core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

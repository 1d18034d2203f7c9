//! Build artifact records as reported by the build provider's artifact listing.
//!
//! Every metadata field is optional on the wire. Missing keys and explicit
//! `null`s both collapse to the field's default so the grouping logic never
//! has to distinguish "absent" from "empty".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Artifact type hint for Android APKs.
pub const ANDROID_APK: &str = "android-apk";

/// Artifact type hint for iOS IPAs.
pub const IOS_IPA: &str = "ios-ipa";

/// Build type value that marks a release variant.
pub const RELEASE_BUILD_TYPE: &str = "release";

/// Build type value that marks a debug variant.
pub const DEBUG_BUILD_TYPE: &str = "debug";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Classification of an artifact derived from its type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    AndroidApk,
    IosIpa,
    Other,
}

/// One build output file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtifactRecord {
    /// Identifier, unique within a build.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,

    /// File name, e.g. `app-hdpi.apk`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Whether this particular file has a public install page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_public_page_enabled: bool,

    /// Provider classifier such as `android-apk` or `ios-ipa`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,

    /// Variant metadata. `None` behaves exactly like an all-default meta.
    #[serde(default, rename = "artifact_meta")]
    pub meta: Option<ArtifactMeta>,
}

impl ArtifactRecord {
    /// Metadata with absence folded into defaults.
    pub fn meta(&self) -> &ArtifactMeta {
        self.meta.as_ref().unwrap_or_else(|| ArtifactMeta::empty())
    }

    pub fn product_flavour(&self) -> &str {
        &self.meta().product_flavour
    }

    pub fn module(&self) -> &str {
        &self.meta().module
    }

    pub fn build_type(&self) -> &str {
        &self.meta().build_type
    }

    pub fn kind(&self) -> ArtifactKind {
        match self.artifact_type.as_deref() {
            Some(ANDROID_APK) => ArtifactKind::AndroidApk,
            Some(IOS_IPA) => ArtifactKind::IosIpa,
            _ => ArtifactKind::Other,
        }
    }

    /// Whether the provider can install this artifact on a device.
    pub fn is_installable(&self) -> bool {
        matches!(self.kind(), ArtifactKind::AndroidApk | ArtifactKind::IosIpa)
    }
}

/// Variant-identifying metadata stamped on every artifact by the CI step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactMeta {
    /// Empty when the build has no flavor dimension.
    #[serde(deserialize_with = "null_as_default")]
    pub product_flavour: String,

    /// Empty when the build has no module dimension.
    #[serde(deserialize_with = "null_as_default")]
    pub module: String,

    /// `release`, `debug`, or empty when unknown.
    #[serde(deserialize_with = "null_as_default")]
    pub build_type: String,

    /// Path of a standalone, non-split APK.
    #[serde(rename = "apk", deserialize_with = "null_as_default")]
    pub apk_path: String,

    /// Path of the App Bundle that supersedes the split set.
    #[serde(rename = "aab", deserialize_with = "null_as_default")]
    pub aab_path: String,

    /// File names that together form the split APK set.
    #[serde(rename = "split", deserialize_with = "null_as_default")]
    pub split_titles: Vec<String>,

    /// Path of the universal APK accompanying a split set.
    #[serde(rename = "universal", deserialize_with = "null_as_default")]
    pub universal_path: String,

    #[serde(deserialize_with = "null_as_default")]
    pub app_info: AppInfo,

    #[serde(deserialize_with = "null_as_default")]
    pub provisioning_info: ProvisioningInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
}

impl ArtifactMeta {
    fn empty() -> &'static ArtifactMeta {
        static EMPTY: std::sync::OnceLock<ArtifactMeta> = std::sync::OnceLock::new();
        EMPTY.get_or_init(ArtifactMeta::default)
    }
}

/// Application identity extracted from the binary by the CI step.
///
/// Android and iOS builds fill disjoint subsets of these fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub app_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub package_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version_code: String,
    #[serde(rename = "min_sdk_version", deserialize_with = "null_as_default")]
    pub minimum_sdk_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_sdk_version: String,

    #[serde(deserialize_with = "null_as_default")]
    pub app_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bundle_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub build_number: String,
    #[serde(rename = "min_OS_version", deserialize_with = "null_as_default")]
    pub minimum_os: String,
    #[serde(deserialize_with = "null_as_default")]
    pub device_family_list: Vec<i64>,
}

impl AppInfo {
    /// Human readable device types for the iOS device family codes.
    pub fn supported_device_types(&self) -> Vec<String> {
        self.device_family_list
            .iter()
            .flat_map(|family| device_family_names(*family))
            .map(|name| name.to_string())
            .collect()
    }
}

fn device_family_names(family: i64) -> &'static [&'static str] {
    match family {
        1 => &["iPhone", "iPod Touch"],
        2 => &["iPad"],
        _ => &["Unknown"],
    }
}

/// iOS signing details. Opaque to the Android selection logic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProvisioningInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub distribution_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub team_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub profile_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provisions_all_devices: bool,
}

/// Last path segment of a CI-reported file path.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

//! App version descriptors derived from a build's artifacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRecord;
use crate::error::Result;

/// Target platform of an app version.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    #[default]
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installable-binary facts stored alongside an app version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactInfo {
    pub version: String,
    pub version_code: String,
    pub minimum_os: String,
    pub minimum_sdk: String,
    pub size: u64,
    pub bundle_id: String,
    pub supported_device_types: Vec<String>,
    pub package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    pub ipa_export_method: String,
    /// Module the version was selected for; empty for single-module builds.
    pub module: String,
    /// Aggregated build types of the flavour, e.g. `debug, release`.
    pub build_type: String,
}

impl ArtifactInfo {
    /// Facts carried by a single artifact's metadata.
    pub fn from_artifact(record: &ArtifactRecord) -> Self {
        let meta = record.meta();
        let app = &meta.app_info;
        let provisioning = &meta.provisioning_info;
        Self {
            version: first_non_empty(&app.version_name, &app.version).to_string(),
            version_code: first_non_empty(&app.version_code, &app.build_number).to_string(),
            minimum_os: app.minimum_os.clone(),
            minimum_sdk: app.minimum_sdk_version.clone(),
            size: record.file_size_bytes.or(meta.file_size_bytes).unwrap_or(0),
            bundle_id: app.bundle_id.clone(),
            supported_device_types: app.supported_device_types(),
            package_name: app.package_name.clone(),
            expire_date: provisioning.expire_date,
            ipa_export_method: provisioning.distribution_type.clone(),
            module: meta.module.clone(),
            build_type: meta.build_type.clone(),
        }
    }
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// One logical app version of a build.
///
/// Artifact info is kept as raw JSON, the way it is persisted; use
/// [`AppVersion::artifact_info`] to read it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppVersion {
    pub platform: Platform,
    pub build_slug: String,
    pub build_number: String,
    pub commit_message: String,
    #[serde(default)]
    pub product_flavour: String,
    #[serde(rename = "artifact_info", default)]
    pub artifact_info_data: serde_json::Value,
}

impl AppVersion {
    /// Build a descriptor with `info` serialized into it.
    pub fn new(
        platform: Platform,
        build_slug: &str,
        build_number: &str,
        commit_message: &str,
        product_flavour: &str,
        info: &ArtifactInfo,
    ) -> Result<Self> {
        Ok(Self {
            platform,
            build_slug: build_slug.to_string(),
            build_number: build_number.to_string(),
            commit_message: commit_message.to_string(),
            product_flavour: product_flavour.to_string(),
            artifact_info_data: serde_json::to_value(info)?,
        })
    }

    /// Decode the stored artifact info.
    pub fn artifact_info(&self) -> Result<ArtifactInfo> {
        Ok(ArtifactInfo::deserialize(&self.artifact_info_data)?)
    }

    /// Replace the stored artifact info.
    pub fn set_artifact_info(&mut self, info: &ArtifactInfo) -> Result<()> {
        self.artifact_info_data = serde_json::to_value(info)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{AppInfo, ArtifactMeta, ProvisioningInfo};
    use serde_json::json;

    #[test]
    fn test_artifact_info_parses_partial_json() {
        let version = AppVersion {
            artifact_info_data: json!({ "minimum_os": "11.0" }),
            ..Default::default()
        };
        let info = version.artifact_info().expect("parse");
        assert_eq!(
            info,
            ArtifactInfo {
                minimum_os: "11.0".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_artifact_info_missing_is_error() {
        let version = AppVersion::default();
        assert!(version.artifact_info().is_err());
    }

    #[test]
    fn test_artifact_info_wrong_shape_is_error() {
        let version = AppVersion {
            artifact_info_data: json!({ "size": "large" }),
            ..Default::default()
        };
        assert!(version.artifact_info().is_err());
    }

    #[test]
    fn test_android_info_from_artifact() {
        let record = ArtifactRecord {
            title: "my-android-artifact.aab".to_string(),
            meta: Some(ArtifactMeta {
                app_info: AppInfo {
                    version_name: "1.0".to_string(),
                    minimum_sdk_version: "1.23".to_string(),
                    package_name: "myPackage".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            ArtifactInfo::from_artifact(&record),
            ArtifactInfo {
                version: "1.0".to_string(),
                minimum_sdk: "1.23".to_string(),
                package_name: "myPackage".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_ios_info_from_artifact() {
        let record = ArtifactRecord {
            title: "my-ios-artifact.ipa".to_string(),
            file_size_bytes: Some(2048),
            meta: Some(ArtifactMeta {
                app_info: AppInfo {
                    version: "1.0".to_string(),
                    device_family_list: vec![1, 2, 12],
                    ..Default::default()
                },
                provisioning_info: ProvisioningInfo {
                    distribution_type: "app-store".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        let info = ArtifactInfo::from_artifact(&record);
        assert_eq!(info.version, "1.0");
        assert_eq!(info.size, 2048);
        assert_eq!(info.ipa_export_method, "app-store");
        assert_eq!(
            info.supported_device_types,
            vec!["iPhone", "iPod Touch", "iPad", "Unknown"]
        );
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Platform::Android).unwrap(), json!("android"));
        assert_eq!(Platform::Ios.to_string(), "ios");
    }
}

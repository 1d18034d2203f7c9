//! Per-app ingest settings.

use serde::{Deserialize, Serialize};

/// Whitelist value that admits every workflow.
pub const ALL_WORKFLOWS: &str = "all";

/// Settings an app owner configures for ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// `all`, or comma-separated workflow names.
    pub ios_workflow: String,
    /// `all`, or comma-separated workflow names.
    pub android_workflow: String,
    /// Module to ship when a build produces several.
    pub module: String,
}

impl AppSettings {
    pub fn android_admits(&self, triggered_workflow: Option<&str>) -> bool {
        workflow_whitelisted(&self.android_workflow, triggered_workflow)
    }
}

/// Whether `whitelist` admits `triggered_workflow`.
///
/// An unknown triggering workflow is only admitted by `all`.
pub fn workflow_whitelisted(whitelist: &str, triggered_workflow: Option<&str>) -> bool {
    let whitelist = whitelist.trim();
    if whitelist == ALL_WORKFLOWS {
        return true;
    }
    let Some(triggered) = triggered_workflow.map(str::trim).filter(|w| !w.is_empty()) else {
        return false;
    };
    whitelist
        .split(',')
        .map(str::trim)
        .any(|name| !name.is_empty() && name == triggered)
}

//! Structured tracing events for selection decisions.
//!
//! Every public engine operation emits exactly one `info!` event on success
//! and one `warn!` event when it stops on a settings error. Fields are flat
//! key/values so the JSON layer of [`crate::telemetry`] can index them.

use tracing::{info, warn};

use crate::selector::ShareInfo;

/// RAII guard that scopes all engine events to one build.
///
/// ```ignore
/// let _span = BuildSpan::enter("build-slug");
/// ```
pub struct BuildSpan {
    _span: tracing::span::EnteredSpan,
}

impl BuildSpan {
    pub fn enter(build_slug: &str) -> Self {
        let span = tracing::info_span!("appship.build", build_slug = %build_slug);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: release selection finished.
pub fn emit_selection_completed(module: &str, bundles: usize, selected: usize) {
    info!(
        event = "select.completed",
        module = %module,
        bundles = bundles,
        selected = selected,
    );
}

/// Emit event: app version descriptors derived for a build.
pub fn emit_versions_prepared(build_slug: &str, versions: usize) {
    info!(event = "versions.prepared", build_slug = %build_slug, versions = versions);
}

/// Emit event: publish/share state recomputed for a stored version.
pub fn emit_share_evaluated(product_flavour: &str, share: &ShareInfo) {
    info!(
        event = "share.evaluated",
        product_flavour = %product_flavour,
        publish_enabled = share.publish_enabled,
        public_install_page_enabled = share.public_install_page_enabled,
        split = share.split,
        universal_available = share.universal_available,
    );
}

/// Emit event: operation stopped because no module is configured.
pub fn emit_module_ambiguous(operation: &str, records: usize) {
    warn!(event = "settings.module_ambiguous", operation = %operation, records = records);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_selection_event_fields() {
        emit_selection_completed("app", 2, 5);
        assert!(logs_contain("select.completed"));
        assert!(logs_contain("selected=5"));
    }

    #[traced_test]
    #[test]
    fn test_module_ambiguous_is_warning() {
        emit_module_ambiguous("select", 4);
        assert!(logs_contain("WARN"));
        assert!(logs_contain("settings.module_ambiguous"));
    }

    #[traced_test]
    #[test]
    fn test_build_span_enter() {
        let _span = BuildSpan::enter("build-1");
        emit_versions_prepared("build-1", 2);
        assert!(logs_contain("versions.prepared"));
    }
}

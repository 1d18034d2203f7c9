//! Error taxonomy for the selection engine.
//!
//! Two classes are kept apart on purpose: [`SettingsError`] is a
//! user-fixable configuration problem, [`ShipError`] is everything else.

use thiserror::Error;

/// Configuration problems the caller must surface to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// More than one module was built and no module was configured.
    #[error("No module setting found")]
    ModuleAmbiguous,
}

/// Engine failures.
#[derive(Error, Debug)]
pub enum ShipError {
    /// Stored or generated artifact info could not be (de)serialized.
    #[error("artifact info serialization failed: {0}")]
    ArtifactInfo(#[from] serde_json::Error),

    /// A settings error converted through [`crate::EngineOutcome::into_result`].
    #[error(transparent)]
    Configuration(#[from] SettingsError),
}

impl ShipError {
    /// The settings error, when this failure is user-fixable.
    pub fn as_settings(&self) -> Option<&SettingsError> {
        match self {
            ShipError::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ShipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_ambiguous_message() {
        assert_eq!(
            SettingsError::ModuleAmbiguous.to_string(),
            "No module setting found"
        );
        let err = ShipError::from(SettingsError::ModuleAmbiguous);
        assert_eq!(err.to_string(), "No module setting found");
        assert_eq!(err.as_settings(), Some(&SettingsError::ModuleAmbiguous));
    }

    #[test]
    fn test_serialization_is_not_a_settings_error() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ShipError::from(parse);
        assert!(err.as_settings().is_none());
        assert!(err.to_string().starts_with("artifact info serialization failed"));
    }
}

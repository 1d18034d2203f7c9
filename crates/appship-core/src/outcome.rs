//! Three-way result of an engine operation.

use crate::error::{SettingsError, ShipError};

/// Exactly one of: a value, a user-fixable configuration error, or a
/// system failure.
#[derive(Debug)]
#[must_use]
pub enum EngineOutcome<T> {
    Ok(T),
    ConfigurationError(SettingsError),
    SystemError(ShipError),
}

impl<T> EngineOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, EngineOutcome::Ok(_))
    }

    /// The value, if the operation succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            EngineOutcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// The configuration error, if that is how the operation ended.
    pub fn settings_error(&self) -> Option<&SettingsError> {
        match self {
            EngineOutcome::ConfigurationError(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EngineOutcome<U> {
        match self {
            EngineOutcome::Ok(value) => EngineOutcome::Ok(f(value)),
            EngineOutcome::ConfigurationError(e) => EngineOutcome::ConfigurationError(e),
            EngineOutcome::SystemError(e) => EngineOutcome::SystemError(e),
        }
    }

    /// Collapse into a `Result`; configuration errors become
    /// [`ShipError::Configuration`].
    pub fn into_result(self) -> Result<T, ShipError> {
        match self {
            EngineOutcome::Ok(value) => Ok(value),
            EngineOutcome::ConfigurationError(e) => Err(ShipError::Configuration(e)),
            EngineOutcome::SystemError(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, SettingsError>> for EngineOutcome<T> {
    fn from(result: Result<T, SettingsError>) -> Self {
        match result {
            Ok(value) => EngineOutcome::Ok(value),
            Err(e) => EngineOutcome::ConfigurationError(e),
        }
    }
}

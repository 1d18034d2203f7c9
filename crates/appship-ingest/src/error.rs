//! Error types for appship-ingest

use appship_core::{SettingsError, ShipError};
use appship_provider::ProviderError;
use appship_state::StateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("store: {0}")]
    State(#[from] StateError),

    #[error(transparent)]
    Engine(#[from] ShipError),

    #[error("No artifact found for build {build_slug}")]
    NoArtifacts { build_slug: String },
}

impl IngestError {
    /// The settings error, when this failure is user-fixable.
    pub fn as_settings(&self) -> Option<&SettingsError> {
        match self {
            IngestError::Engine(e) => e.as_settings(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

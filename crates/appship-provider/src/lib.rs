//! Build provider boundary for AppShip
//!
//! - [`ArtifactProvider`]: async listing of a build's artifacts, one page at a time
//! - [`fetch_all_artifacts`]: follows pagination cursors into one snapshot
//! - [`HttpArtifactProvider`]: reqwest client for the provider's REST API
//! - [`MemoryArtifactProvider`]: in-memory fake for tests and offline runs

pub mod config;
pub mod error;
pub mod fakes;
pub mod http;
pub mod provider;

pub use config::ProviderConfig;
pub use error::{ProviderError, Result};
pub use fakes::MemoryArtifactProvider;
pub use http::HttpArtifactProvider;
pub use provider::{fetch_all_artifacts, first_installable, ArtifactPage, ArtifactProvider, Paging};

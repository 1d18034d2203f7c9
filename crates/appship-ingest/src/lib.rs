//! Build ingestion for AppShip
//!
//! Glues the provider, the selection engine and the app version store:
//! a finished build becomes stored app versions, and a stored version's
//! share state can be refreshed against the build's current artifacts.

pub mod error;
pub mod ingest;
pub mod settings;

pub use error::{IngestError, Result};
pub use ingest::{BuildEvent, BuildIngest, IngestReport, SharedVersion};
pub use settings::{workflow_whitelisted, AppSettings, ALL_WORKFLOWS};

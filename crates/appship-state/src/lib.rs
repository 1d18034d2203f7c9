//! App version persistence for AppShip
//!
//! [`AppVersionStore`] is the async seam; [`MemoryAppVersionStore`] backs
//! tests and [`FsAppVersionStore`] keeps one JSON file per record on disk.

pub mod error;
pub mod fakes;
pub mod fs;
pub mod store;

pub use error::{Result, StateError};
pub use fakes::MemoryAppVersionStore;
pub use fs::FsAppVersionStore;
pub use store::{AppVersionRecord, AppVersionStore};

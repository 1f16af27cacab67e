//! # PhysDesign I/O
//!
//! Readers for the JSON form of the library and design description records
//! and for session manifests that bundle them with configuration.

pub mod loader;
pub mod manifest;

pub use loader::{open_session, read_config, read_design, read_library, read_manifest, IoError};
pub use manifest::SessionManifest;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use physdesign_core::descriptor::{DesignDescriptor, LibraryDescriptor};
use physdesign_core::{Netlist, PhysicalConfig, PhysicalError, Session};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::manifest::SessionManifest;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Physical(#[from] PhysicalError),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let text = fs::read_to_string(path).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// ── Readers ───────────────────────────────────────────────────────────

pub fn read_library(path: &Path) -> Result<LibraryDescriptor, IoError> {
    log::info!("Reading library: {}", path.display());
    read_json(path)
}

pub fn read_design(path: &Path) -> Result<DesignDescriptor, IoError> {
    log::info!("Reading design: {}", path.display());
    read_json(path)
}

/// Read configuration flags; unknown keys are reported and ignored.
pub fn read_config(path: &Path) -> Result<PhysicalConfig, IoError> {
    let value: serde_json::Value = read_json(path)?;
    Ok(PhysicalConfig::from_value(&value))
}

pub fn read_manifest(path: &Path) -> Result<SessionManifest, IoError> {
    read_json(path)
}

/// Build a session from a manifest: initialize the physical design over
/// `netlist`, load every library in order, then the design.
pub fn open_session(manifest_path: &Path, netlist: Netlist) -> Result<Session, IoError> {
    let manifest = read_manifest(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    log::info!("Opening session '{}'", manifest.name);

    let mut session = Session::new();
    session.init_physical_design(netlist, PhysicalConfig::from_value(&manifest.settings));
    for path in manifest.library_paths(base) {
        let library = read_library(&path)?;
        session.load_library(&library)?;
    }
    match manifest.design_path(base) {
        Some(path) => {
            let design = read_design(&path)?;
            session.load_design(&design)?;
        }
        None => log::warn!("Session '{}' names no design.", manifest.name),
    }
    Ok(session)
}

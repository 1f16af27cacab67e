use thiserror::Error;

use crate::geometry::Dbu;
use crate::ids::{InstanceId, PinId};

pub type PhysicalResult<T> = Result<T, PhysicalError>;

/// Fatal errors. Recoverable conditions (duplicate names, repeated
/// initialization) are reported through `log` instead.
#[derive(Error, Debug)]
pub enum PhysicalError {
    #[error("Physical design was not initialized")]
    NotInitialized,

    #[error("No design was loaded")]
    DesignNotLoaded,

    #[error("Invalid design database units {design} (library database units: {library}); design units must evenly divide library units")]
    IncompatibleResolution { library: Dbu, design: Dbu },

    #[error("Library cell '{0}' not found")]
    UndefinedLibraryCell(String),

    #[error("Pin '{pin}' not found in library cell '{cell}'")]
    UndefinedLibraryPin { cell: String, pin: String },

    #[error("Cell '{0}' not found")]
    UndefinedCell(String),

    #[error("Port '{0}' not found")]
    UndefinedPort(String),

    #[error("Net '{0}' not found")]
    UndefinedNet(String),

    #[error("Site '{site}' was not found for row '{row}'")]
    UndefinedSite { site: String, row: String },

    #[error("Layer '{layer}' referenced by net '{net}' not found")]
    UndefinedLayer { layer: String, net: String },

    #[error("Via '{via}' referenced by net '{net}' not found")]
    UndefinedVia { via: String, net: String },

    #[error("Instance {0} has no physical geometry")]
    NoPhysicalInstance(InstanceId),

    #[error("Instance {0} is not a cell")]
    NotACell(InstanceId),

    #[error("Pin {0} is already connected")]
    PinAlreadyConnected(PinId),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

//! # PhysDesign Core
//!
//! Physical design database for VLSI placement and routing tools. Annotates
//! a logical netlist with library geometry (sites, layers, vias, cell
//! masters), design geometry (placed instances, rows, regions, routed nets)
//! and keeps wirelength and area aggregates current as cells move.
//!
//! All coordinates are fixed-point database units of the library
//! resolution.

pub mod geometry;
pub mod ids;
pub mod registry;
pub mod units;
pub mod error;
pub mod config;
pub mod layer;
pub mod library;
pub mod netlist;
pub mod instance;
pub mod net;
pub mod floorplan;
pub mod merge;
pub mod observer;
pub mod spatial;
pub mod descriptor;
pub mod design;
mod ingest;
pub mod session;

pub use config::PhysicalConfig;
pub use design::{DesignSummary, PhysicalDesign, PhysicalType};
pub use error::{PhysicalError, PhysicalResult};
pub use geometry::{Boundary, Bounds, Dbu, DbuXy, Dimension, Polygon};
pub use ids::{InstanceId, LibraryCellId, NetId, PinId};
pub use ingest::DEFAULT_LIBRARY_DBU;
pub use netlist::Netlist;
pub use observer::ObserverHandle;
pub use session::Session;

#[cfg(test)]
mod tests;

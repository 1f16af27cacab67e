//! Process-level owner of the physical design.

use crate::config::PhysicalConfig;
use crate::descriptor::{DesignDescriptor, LibraryDescriptor};
use crate::design::PhysicalDesign;
use crate::error::{PhysicalError, PhysicalResult};
use crate::netlist::Netlist;

/// Holds at most one physical design, created on demand.
#[derive(Debug, Default)]
pub struct Session {
    physical: Option<PhysicalDesign>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the physical design over `netlist`.
    ///
    /// A second call keeps the existing design and drops the arguments.
    pub fn init_physical_design(
        &mut self,
        netlist: Netlist,
        config: PhysicalConfig,
    ) -> &mut PhysicalDesign {
        if self.physical.is_some() {
            log::warn!("Physical design was already initialized. Skipping ...");
        }
        self.physical
            .get_or_insert_with(|| PhysicalDesign::new(netlist, config))
    }

    pub fn is_initialized(&self) -> bool {
        self.physical.is_some()
    }

    pub fn physical(&self) -> PhysicalResult<&PhysicalDesign> {
        self.physical.as_ref().ok_or(PhysicalError::NotInitialized)
    }

    pub fn physical_mut(&mut self) -> PhysicalResult<&mut PhysicalDesign> {
        self.physical.as_mut().ok_or(PhysicalError::NotInitialized)
    }

    pub fn load_library(&mut self, library: &LibraryDescriptor) -> PhysicalResult<()> {
        self.physical_mut()?.load_library(library)
    }

    pub fn load_design(&mut self, design: &DesignDescriptor) -> PhysicalResult<()> {
        self.physical_mut()?.load_design(design)
    }
}

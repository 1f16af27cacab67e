use serde::{Deserialize, Serialize};

use crate::error::{PhysicalError, PhysicalResult};
use crate::geometry::{Bounds, Dbu, DbuXy};

/// Convert a micron value to database units, rounding to nearest.
pub fn to_dbu(microns: f64, resolution: Dbu) -> Dbu {
    (microns * resolution as f64).round() as Dbu
}

pub fn xy_to_dbu(microns: [f64; 2], resolution: Dbu) -> DbuXy {
    DbuXy::new(to_dbu(microns[0], resolution), to_dbu(microns[1], resolution))
}

pub fn rect_to_dbu(lower: [f64; 2], upper: [f64; 2], resolution: Dbu) -> Bounds {
    Bounds::from_corners(xy_to_dbu(lower, resolution), xy_to_dbu(upper, resolution))
}

/// The library and design resolutions and their integer quotient.
///
/// A zero resolution means "not yet recorded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbuRegistry {
    library: Dbu,
    design: Dbu,
    multiplier: Dbu,
}

impl DbuRegistry {
    pub fn library(&self) -> Dbu {
        self.library
    }

    pub fn design(&self) -> Dbu {
        self.design
    }

    /// Library units per design unit. Zero until a design was accepted.
    pub fn multiplier(&self) -> Dbu {
        self.multiplier
    }

    /// Record the library resolution.
    ///
    /// The first recorded value wins; returns `false` when `resolution`
    /// disagrees with it.
    pub fn set_library(&mut self, resolution: Dbu) -> bool {
        if !self.accepts_library(resolution) {
            return false;
        }
        self.library = resolution;
        true
    }

    /// Whether `resolution` could be recorded as the library resolution.
    pub fn accepts_library(&self, resolution: Dbu) -> bool {
        self.library == 0 || self.library == resolution
    }

    /// Check that `design` evenly divides the library resolution.
    pub fn check_design(&self, design: Dbu) -> PhysicalResult<Dbu> {
        if design <= 0 || self.library < design || self.library % design != 0 {
            return Err(PhysicalError::IncompatibleResolution {
                library: self.library,
                design,
            });
        }
        Ok(self.library / design)
    }

    /// Validate and record the design resolution. Nothing is recorded on failure.
    pub fn set_design(&mut self, design: Dbu) -> PhysicalResult<Dbu> {
        let multiplier = self.check_design(design)?;
        self.design = design;
        self.multiplier = multiplier;
        Ok(multiplier)
    }
}

//! Opaque handles into the owning registries and attribute tables.
//!
//! Every handle is a dense, zero-based `u32` index assigned at insertion
//! time and never reused.

use serde::{Deserialize, Serialize};

/// Conversion between a handle and its dense index.
pub trait EntityId: Copy + Eq + std::hash::Hash + std::fmt::Debug {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl EntityId for $name {
            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Handle to a placement site.
    SiteId
);
define_id!(
    /// Handle to a technology layer.
    LayerId
);
define_id!(
    /// Handle to a library via.
    ViaId
);
define_id!(SpacingId);
define_id!(RowId);
define_id!(RegionId);
define_id!(GroupId);
define_id!(
    /// Handle to a logical library cell (cell master).
    LibraryCellId
);
define_id!(LibraryPinId);
define_id!(
    /// Handle to a cell, port or module instance.
    InstanceId
);
define_id!(PinId);
define_id!(NetId);

//!
//! # Physical-Design Database Boundary
//!
//! Everything this crate knows about the external database lives here:
//! opaque handle types for the four entity kinds, the placement-status and
//! signal-type vocabularies, and the [PlaceDb] trait through which all
//! reads and writes flow. The database is always an injected collaborator,
//! never ambient state reached from inside the data model.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{bbox::BoundBox, geom::Point, Int};

/// Define an opaque, copyable handle newtype for one external entity kind.
/// Handles are issued by a [PlaceDb] implementation and are only meaningful
/// against the database that issued them.
macro_rules! db_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Create a handle from a raw `u32` index
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }
            /// Get the raw `u32` index
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

db_handle!(
    /// Handle to a cell instance
    DbInst
);
db_handle!(
    /// Handle to an instance-terminal, i.e. a terminal owned by a cell
    DbITerm
);
db_handle!(
    /// Handle to a block-terminal, fixed on the chip boundary
    DbBTerm
);
db_handle!(
    /// Handle to a net
    DbNet
);

/// # Terminal Handle Union
///
/// A net connects terminals of both kinds; this union is also the key type
/// of the pin lookup map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DbTerm {
    /// Instance-terminal
    ITerm(DbITerm),
    /// Block-terminal
    BTerm(DbBTerm),
}
impl From<DbITerm> for DbTerm {
    fn from(t: DbITerm) -> Self {
        Self::ITerm(t)
    }
}
impl From<DbBTerm> for DbTerm {
    fn from(t: DbBTerm) -> Self {
        Self::BTerm(t)
    }
}

/// # Placement Status Enumeration
///
/// The database's classification of whether and how a cell's position may
/// change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementStatus {
    /// No status recorded
    #[default]
    None,
    /// Not yet placed
    Unplaced,
    /// Tentatively placed, free to move
    Suggested,
    /// Placed, free to move
    Placed,
    /// Placed and locked in position
    Locked,
    /// Placed and firm; movement requires explicit override
    Firm,
    /// Cover cell; never movable
    Cover,
}
impl PlacementStatus {
    /// Boolean indication of an immovable status
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Locked | Self::Firm | Self::Cover)
    }
}

/// # Signal Type Enumeration
///
/// The database's categorization of a net's electrical role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigType {
    /// Ordinary signal net
    #[default]
    Signal,
    /// Clock distribution
    Clock,
    /// Ground rail
    Ground,
    /// Power rail
    Power,
    /// Analog signal
    Analog,
    /// Reset distribution
    Reset,
}
impl SigType {
    /// Boolean indication of a supply (power or ground) net
    pub fn is_supply(&self) -> bool {
        matches!(self, Self::Power | Self::Ground)
    }
}

///
/// # Physical-Design Database Trait
///
/// The read and write operations this crate consumes, in four groups:
/// entity enumeration (used once, during [PlacerBase::init]), per-cell
/// reads, per-terminal reads, per-net reads, and cell writes.
///
/// Handles passed in must have been issued by `self`; implementations may
/// panic when handed a foreign handle, the same way a slice panics on an
/// out-of-range index. That is a caller error, not a recoverable failure.
///
/// [PlacerBase::init]: crate::data::PlacerBase::init
///
pub trait PlaceDb {
    /// Enumerate every cell instance
    fn insts(&self) -> Vec<DbInst>;
    /// Enumerate every instance-terminal
    fn iterms(&self) -> Vec<DbITerm>;
    /// Enumerate every block-terminal
    fn bterms(&self) -> Vec<DbBTerm>;
    /// Enumerate every net
    fn nets(&self) -> Vec<DbNet>;

    /// Get a cell's lower-left corner
    fn inst_origin(&self, inst: DbInst) -> Point;
    /// Get a cell's (width, height), from its master
    fn inst_dims(&self, inst: DbInst) -> (Int, Int);
    /// Get a cell's placement status
    fn inst_status(&self, inst: DbInst) -> PlacementStatus;

    /// Get the cell owning an instance-terminal
    fn iterm_inst(&self, term: DbITerm) -> DbInst;
    /// Get an instance-terminal's bounding box, in absolute coordinates
    /// at the cell's current database position
    fn iterm_bbox(&self, term: DbITerm) -> BoundBox;
    /// Get a block-terminal's fixed bounding box, in absolute coordinates
    fn bterm_bbox(&self, term: DbBTerm) -> BoundBox;

    /// Get the terminals connected to `net`, both kinds, in a stable order
    fn net_terms(&self, net: DbNet) -> Vec<DbTerm>;
    /// Get a net's signal classification
    fn net_sigtype(&self, net: DbNet) -> SigType;

    /// Set a cell's lower-left corner
    fn set_inst_origin(&mut self, inst: DbInst, origin: Point);
    /// Set a cell's placement status
    fn set_inst_status(&mut self, inst: DbInst, status: PlacementStatus);
}

//!
//! # Place21 Placement-Database Caching Layer
//!
//! Sits between a physical-design database and a placement optimizer,
//! presenting movable and fixed cells ([Instance]s), their terminals
//! ([Pin]s), and the wires connecting them ([Net]s) as lightweight objects
//! with cached coordinates. Ground truth - connectivity, cell dimensions,
//! signal classification - stays in the database, reached solely through
//! the [PlaceDb] boundary trait.
//!
//! [PlacerBase::init] performs one full scan of the database, materializing
//! every wrapper and its indices. Thereafter the optimizer mutates
//! [Instance] positions in-memory; [Pin] and [Net] refreshes are explicit,
//! invoked by the caller after a batch of moves, never propagated
//! automatically. This two-phase contract is what lets an optimizer explore
//! many tentative moves cheaply and commit only the final ones.
//!

pub mod bbox;
pub mod data;
pub mod db;
pub mod error;
pub mod geom;

// Re-exports at the crate root
pub use bbox::{BoundBox, BoundBoxTrait};
pub use data::{InstKey, Instance, Net, NetKey, Pin, PinKey, PlacerBase};
pub use db::{DbBTerm, DbITerm, DbInst, DbNet, DbTerm, PlaceDb, PlacementStatus, SigType};
pub use error::{PlaceError, PlaceResult};
pub use geom::Point;

/// # Location Integer Type-Alias
///
/// Used for all layout spatial coordinates.
/// Designed for quickly swapping to other integer types, if we so desire.
///
pub type Int = isize;

//!
//! # Placement Data Model
//!
//! Defines the cached wrapper types [Instance], [Pin], and [Net], and the
//! [PlacerBase] that owns them. Wrappers live in append-only slot-map
//! arenas and are referred to by stable keys ([InstKey], [PinKey],
//! [NetKey]); handle-to-key maps and the movable/fixed partitions never
//! hold raw references, so arena growth never invalidates an outstanding
//! identity.
//!
//! Position updates are two-phase: `set_*` methods touch only the
//! in-memory cache, `db_set_*` methods commit to the database. Dependent
//! [Pin] locations and [Net] boxes go stale the instant an [Instance]
//! moves, and stay stale until the caller invokes
//! [PlacerBase::update_pin_location] / [PlacerBase::update_net_box].
//!

// Std-Lib
use std::collections::HashMap;

// Crates.io
use log::debug;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// Local imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    db::{DbBTerm, DbITerm, DbInst, DbNet, DbTerm, PlaceDb, PlacementStatus, SigType},
    error::{PlaceError, PlaceResult},
    geom::Point,
    Int,
};

// Create key-types for each wrapper kind stored in [SlotMap]s
new_key_type! {
    /// Keys for [Instance] entries
    pub struct InstKey;
    /// Keys for [Pin] entries
    pub struct PinKey;
    /// Keys for [Net] entries
    pub struct NetKey;
}

/// # Placeable Instance
///
/// Wraps one database cell and caches its lower-left corner. The cached
/// corner is the optimizer's working copy; it only reaches the database on
/// an explicit `db_set_*` call. Upper-right and center coordinates are
/// derived on each call from the cached corner plus the master dimensions
/// read from the database, never stored.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    inst: DbInst,
    lx: Int,
    ly: Int,
}
impl Instance {
    /// Create a new [Instance], caching the cell's current database corner
    pub fn new(db: &impl PlaceDb, inst: DbInst) -> Self {
        let origin = db.inst_origin(inst);
        Self {
            inst,
            lx: origin.x,
            ly: origin.y,
        }
    }
    /// Get the wrapped cell handle
    pub fn inst(&self) -> DbInst {
        self.inst
    }
    /// Boolean indication of an immovable placement status.
    /// Pure query of the database; no side effects.
    pub fn is_fixed(&self, db: &impl PlaceDb) -> bool {
        db.inst_status(self.inst).is_fixed()
    }
    /// Set the cached lower-left corner. In-memory only.
    pub fn set_location(&mut self, x: Int, y: Int) {
        self.lx = x;
        self.ly = y;
    }
    /// Set the cached corner from a requested center. In-memory only.
    pub fn set_center_location(&mut self, db: &impl PlaceDb, x: Int, y: Int) {
        let (w, h) = db.inst_dims(self.inst);
        self.lx = x - w / 2;
        self.ly = y - h / 2;
    }
    /// Write the currently cached corner back to the database,
    /// and mark the cell placed
    pub fn db_set_location(&self, db: &mut impl PlaceDb) {
        db.set_inst_origin(self.inst, Point::new(self.lx, self.ly));
        self.db_set_placed(db);
    }
    /// Set the cached corner and commit it to the database in one call
    pub fn db_set_location_at(&mut self, db: &mut impl PlaceDb, x: Int, y: Int) {
        self.set_location(x, y);
        self.db_set_location(db);
    }
    /// Set the cached corner from a requested center and commit it
    pub fn db_set_center_location(&mut self, db: &mut impl PlaceDb, x: Int, y: Int) {
        self.set_center_location(db, x, y);
        self.db_set_location(db);
    }
    /// Mark the cell placed in the database
    pub fn db_set_placed(&self, db: &mut impl PlaceDb) {
        db.set_inst_status(self.inst, PlacementStatus::Placed);
    }
    /// Write an arbitrary placement status, independent of position
    pub fn db_set_placement_status(&self, db: &mut impl PlaceDb, status: PlacementStatus) {
        db.set_inst_status(self.inst, status);
    }
    /// Cached lower-left x
    pub fn lx(&self) -> Int {
        self.lx
    }
    /// Cached lower-left y
    pub fn ly(&self) -> Int {
        self.ly
    }
    /// Upper-right x, from the cached corner plus the master width
    pub fn ux(&self, db: &impl PlaceDb) -> Int {
        self.lx + db.inst_dims(self.inst).0
    }
    /// Upper-right y, from the cached corner plus the master height
    pub fn uy(&self, db: &impl PlaceDb) -> Int {
        self.ly + db.inst_dims(self.inst).1
    }
    /// Center x
    pub fn cx(&self, db: &impl PlaceDb) -> Int {
        self.lx + db.inst_dims(self.inst).0 / 2
    }
    /// Center y
    pub fn cy(&self, db: &impl PlaceDb) -> Int {
        self.ly + db.inst_dims(self.inst).1 / 2
    }
    /// Bounding box at the cached position
    pub fn bbox(&self, db: &impl PlaceDb) -> BoundBox {
        BoundBox::from_points(
            Point::new(self.lx, self.ly),
            Point::new(self.ux(db), self.uy(db)),
        )
    }
}

/// # Terminal Pin
///
/// Wraps one database terminal of either kind. The kind is fixed for the
/// pin's lifetime: an instance-terminal belongs to an [Instance] and
/// stores its box as an offset from the owner's lower-left corner; a
/// block-terminal has no owner and its "offset" is its fixed absolute box.
/// Offsets are computed once, at construction.
///
/// The cached absolute box is valid only immediately after
/// [Pin::update_location]; it goes stale the instant the owning [Instance]
/// moves. No observer relationship exists between the two.
///
/// The four extremal flags mark whether this pin currently defines an edge
/// of its net's bounding box. They are read-only here and written only by
/// net-box recomputation, so that an incremental optimizer can decide in
/// O(1) whether moving one instance can shrink a given net's box.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    term: DbTerm,
    owner: Option<InstKey>,
    offset: BoundBox,
    bbox: BoundBox,
    min_pin_x: bool,
    max_pin_x: bool,
    min_pin_y: bool,
    max_pin_y: bool,
}
impl Pin {
    /// Create an instance-terminal [Pin], owned by `owner`.
    /// The offset from the owner's lower-left corner is fixed here, once.
    pub fn new_iterm(
        db: &impl PlaceDb,
        term: DbITerm,
        owner: InstKey,
        owner_inst: &Instance,
    ) -> Self {
        let bbox = db.iterm_bbox(term);
        let offset = bbox.shift(&Point::new(-owner_inst.lx(), -owner_inst.ly()));
        Self {
            term: DbTerm::ITerm(term),
            owner: Some(owner),
            offset,
            bbox,
            min_pin_x: false,
            max_pin_x: false,
            min_pin_y: false,
            max_pin_y: false,
        }
    }
    /// Create a block-terminal [Pin] at its fixed boundary position
    pub fn new_bterm(db: &impl PlaceDb, term: DbBTerm) -> Self {
        let bbox = db.bterm_bbox(term);
        Self {
            term: DbTerm::BTerm(term),
            owner: None,
            offset: bbox.clone(),
            bbox,
            min_pin_x: false,
            max_pin_x: false,
            min_pin_y: false,
            max_pin_y: false,
        }
    }
    /// Get the wrapped terminal handle
    pub fn term(&self) -> DbTerm {
        self.term
    }
    /// Get the instance-terminal handle, if this is that kind
    pub fn iterm(&self) -> Option<DbITerm> {
        match self.term {
            DbTerm::ITerm(t) => Some(t),
            DbTerm::BTerm(_) => None,
        }
    }
    /// Get the block-terminal handle, if this is that kind
    pub fn bterm(&self) -> Option<DbBTerm> {
        match self.term {
            DbTerm::ITerm(_) => None,
            DbTerm::BTerm(t) => Some(t),
        }
    }
    /// Boolean indication of the instance-terminal kind
    pub fn is_iterm(&self) -> bool {
        matches!(self.term, DbTerm::ITerm(_))
    }
    /// Boolean indication of the block-terminal kind
    pub fn is_bterm(&self) -> bool {
        matches!(self.term, DbTerm::BTerm(_))
    }
    /// Key of the owning [Instance]; `None` for block-terminals
    pub fn owner(&self) -> Option<InstKey> {
        self.owner
    }
    /// Offset lower-left x
    pub fn offset_lx(&self) -> Int {
        self.offset.p0.x
    }
    /// Offset lower-left y
    pub fn offset_ly(&self) -> Int {
        self.offset.p0.y
    }
    /// Offset upper-right x
    pub fn offset_ux(&self) -> Int {
        self.offset.p1.x
    }
    /// Offset upper-right y
    pub fn offset_uy(&self) -> Int {
        self.offset.p1.y
    }
    /// Cached absolute lower-left x
    pub fn lx(&self) -> Int {
        self.bbox.p0.x
    }
    /// Cached absolute lower-left y
    pub fn ly(&self) -> Int {
        self.bbox.p0.y
    }
    /// Cached absolute upper-right x
    pub fn ux(&self) -> Int {
        self.bbox.p1.x
    }
    /// Cached absolute upper-right y
    pub fn uy(&self) -> Int {
        self.bbox.p1.y
    }
    /// Cached absolute center x
    pub fn cx(&self) -> Int {
        (self.bbox.p0.x + self.bbox.p1.x) / 2
    }
    /// Cached absolute center y
    pub fn cy(&self) -> Int {
        (self.bbox.p0.y + self.bbox.p1.y) / 2
    }
    /// Whether this pin currently sets its net's minimum-x edge
    pub fn is_min_pin_x(&self) -> bool {
        self.min_pin_x
    }
    /// Whether this pin currently sets its net's maximum-x edge
    pub fn is_max_pin_x(&self) -> bool {
        self.max_pin_x
    }
    /// Whether this pin currently sets its net's minimum-y edge
    pub fn is_min_pin_y(&self) -> bool {
        self.min_pin_y
    }
    /// Whether this pin currently sets its net's maximum-y edge
    pub fn is_max_pin_y(&self) -> bool {
        self.max_pin_y
    }
    /// Recompute the cached absolute box.
    /// Instance-terminal: owner corner plus offset, `owner` required.
    /// Block-terminal: the fixed offset box, `owner` ignored.
    pub fn update_location(&mut self, owner: Option<&Instance>) -> PlaceResult<()> {
        match (self.term, owner) {
            (DbTerm::ITerm(_), Some(inst)) => {
                self.bbox = self.offset.shift(&Point::new(inst.lx(), inst.ly()));
                Ok(())
            }
            (DbTerm::ITerm(term), None) => Err(PlaceError::db(format!(
                "instance-terminal {} refreshed without its owning instance",
                term
            ))),
            (DbTerm::BTerm(_), _) => {
                self.bbox = self.offset.clone();
                Ok(())
            }
        }
    }
    /// Drop all four extremal markings
    fn clear_extremes(&mut self) {
        self.min_pin_x = false;
        self.max_pin_x = false;
        self.min_pin_y = false;
        self.max_pin_y = false;
    }
}

/// # Wire Net
///
/// Wraps one database net and caches the bounding box over all of its
/// connected pins' corners. The box is exact as of the last
/// [PlacerBase::update_net_box] call; pin movement does not invalidate it.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    net: DbNet,
    bbox: BoundBox,
}
impl Net {
    /// Create a new [Net]; its box starts empty
    pub fn new(net: DbNet) -> Self {
        Self {
            net,
            bbox: BoundBox::empty(),
        }
    }
    /// Get the wrapped net handle
    pub fn net(&self) -> DbNet {
        self.net
    }
    /// Box lower-left x
    pub fn lx(&self) -> Int {
        self.bbox.p0.x
    }
    /// Box lower-left y
    pub fn ly(&self) -> Int {
        self.bbox.p0.y
    }
    /// Box upper-right x
    pub fn ux(&self) -> Int {
        self.bbox.p1.x
    }
    /// Box upper-right y
    pub fn uy(&self) -> Int {
        self.bbox.p1.y
    }
    /// Box center x
    pub fn cx(&self) -> Int {
        (self.bbox.p0.x + self.bbox.p1.x) / 2
    }
    /// Box center y
    pub fn cy(&self) -> Int {
        (self.bbox.p0.y + self.bbox.p1.y) / 2
    }
    /// Half-perimeter wirelength of the cached box
    pub fn hpwl(&self) -> Int {
        self.bbox.hpwl()
    }
    /// Signal classification, passed through from the database
    pub fn sig_type(&self, db: &impl PlaceDb) -> SigType {
        db.net_sigtype(self.net)
    }
}

/// # Placer Base
///
/// Owns the [Instance], [Pin], and [Net] arenas, the handle-to-key lookup
/// maps, and the movable/fixed partitions, plus the database they were
/// scanned from. Built in one pass by [PlacerBase::init]; the entity set
/// is fixed until [PlacerBase::clear]. Growing it mid-optimization is
/// unsupported; run a full clear + init cycle instead.
///
/// Single-threaded by contract: concurrent position writes, refreshes, or
/// arena growth must be serialized by the caller.
///
#[derive(Debug)]
pub struct PlacerBase<D: PlaceDb> {
    db: D,
    insts: SlotMap<InstKey, Instance>,
    pins: SlotMap<PinKey, Pin>,
    nets: SlotMap<NetKey, Net>,
    inst_map: HashMap<DbInst, InstKey>,
    pin_map: HashMap<DbTerm, PinKey>,
    net_map: HashMap<DbNet, NetKey>,
    place_insts: Vec<InstKey>,
    fixed_insts: Vec<InstKey>,
    init_done: bool,
}
impl<D: PlaceDb> PlacerBase<D> {
    /// Create a new [PlacerBase] bound to `db`, not yet scanned
    pub fn new(db: D) -> Self {
        Self {
            db,
            insts: SlotMap::with_key(),
            pins: SlotMap::with_key(),
            nets: SlotMap::with_key(),
            inst_map: HashMap::new(),
            pin_map: HashMap::new(),
            net_map: HashMap::new(),
            place_insts: Vec::new(),
            fixed_insts: Vec::new(),
            init_done: false,
        }
    }
    /// Get a shared reference to the database
    pub fn db(&self) -> &D {
        &self.db
    }
    /// Get a mutable reference to the database
    pub fn db_mut(&mut self) -> &mut D {
        &mut self.db
    }
    /// Scan the database once, materializing every wrapper and index:
    /// an [Instance] per cell (partitioned movable/fixed), a [Pin] per
    /// terminal of either kind, a [Net] per net. Finishes by computing
    /// every net box, so [PlacerBase::hpwl] is meaningful immediately.
    ///
    /// Calling `init` twice without an intervening [PlacerBase::clear] is
    /// a contract violation and fails loudly.
    pub fn init(&mut self) -> PlaceResult<()> {
        if self.init_done {
            return Err(PlaceError::init(
                "init called twice without an intervening clear",
            ));
        }
        let dbinsts = self.db.insts();
        let dbiterms = self.db.iterms();
        let dbbterms = self.db.bterms();
        let dbnets = self.db.nets();

        // Reserve up front; the arenas are append-only hereafter
        self.insts.reserve(dbinsts.len());
        self.pins.reserve(dbiterms.len() + dbbterms.len());
        self.nets.reserve(dbnets.len());
        self.inst_map.reserve(dbinsts.len());
        self.pin_map.reserve(dbiterms.len() + dbbterms.len());
        self.net_map.reserve(dbnets.len());

        for di in dbinsts {
            let inst = Instance::new(&self.db, di);
            let fixed = inst.is_fixed(&self.db);
            let key = self.insts.insert(inst);
            self.inst_map.insert(di, key);
            if fixed {
                self.fixed_insts.push(key);
            } else {
                self.place_insts.push(key);
            }
        }
        for ti in dbiterms {
            let owner_inst = self.db.iterm_inst(ti);
            let owner = self.inst_map.get(&owner_inst).copied().ok_or_else(|| {
                PlaceError::db(format!(
                    "instance-terminal {} owned by unknown cell {}",
                    ti, owner_inst
                ))
            })?;
            let pin = Pin::new_iterm(&self.db, ti, owner, &self.insts[owner]);
            let key = self.pins.insert(pin);
            self.pin_map.insert(DbTerm::ITerm(ti), key);
        }
        for tb in dbbterms {
            let pin = Pin::new_bterm(&self.db, tb);
            let key = self.pins.insert(pin);
            self.pin_map.insert(DbTerm::BTerm(tb), key);
        }
        for dn in dbnets {
            let key = self.nets.insert(Net::new(dn));
            self.net_map.insert(dn, key);
        }

        // Seed every net box, and with it every extremal flag
        let netkeys: Vec<NetKey> = self.nets.keys().collect();
        for key in netkeys {
            self.update_net_box(key)?;
        }

        self.init_done = true;
        debug!(
            "placer base initialized: {} instances ({} movable, {} fixed), {} pins, {} nets",
            self.insts.len(),
            self.place_insts.len(),
            self.fixed_insts.len(),
            self.pins.len(),
            self.nets.len()
        );
        Ok(())
    }
    /// Drop all owned wrappers, maps, and partitions.
    /// Every key obtained before this call is invalid afterward.
    pub fn clear(&mut self) {
        self.insts.clear();
        self.pins.clear();
        self.nets.clear();
        self.inst_map.clear();
        self.pin_map.clear();
        self.net_map.clear();
        self.place_insts.clear();
        self.fixed_insts.clear();
        self.init_done = false;
        debug!("placer base cleared");
    }
    /// Get a shared reference to the [Instance] arena
    pub fn insts(&self) -> &SlotMap<InstKey, Instance> {
        &self.insts
    }
    /// Get a shared reference to the [Pin] arena
    pub fn pins(&self) -> &SlotMap<PinKey, Pin> {
        &self.pins
    }
    /// Get a shared reference to the [Net] arena
    pub fn nets(&self) -> &SlotMap<NetKey, Net> {
        &self.nets
    }
    /// Keys of the movable [Instance]s, as partitioned at init time
    pub fn place_insts(&self) -> &[InstKey] {
        &self.place_insts
    }
    /// Keys of the fixed [Instance]s, as partitioned at init time
    pub fn fixed_insts(&self) -> &[InstKey] {
        &self.fixed_insts
    }
    /// Look up the [InstKey] for a cell handle.
    /// `None` means the handle was unknown at the last init.
    pub fn db_to_inst(&self, inst: DbInst) -> Option<InstKey> {
        self.inst_map.get(&inst).copied()
    }
    /// Look up the [PinKey] for a terminal handle of either kind.
    /// `None` means the handle was unknown at the last init.
    pub fn db_to_pin(&self, term: impl Into<DbTerm>) -> Option<PinKey> {
        self.pin_map.get(&term.into()).copied()
    }
    /// Look up the [NetKey] for a net handle.
    /// `None` means the handle was unknown at the last init.
    pub fn db_to_net(&self, net: DbNet) -> Option<NetKey> {
        self.net_map.get(&net).copied()
    }
    /// Get a reference to the [Instance] at `key`
    pub fn inst(&self, key: InstKey) -> Option<&Instance> {
        self.insts.get(key)
    }
    /// Get a mutable reference to the [Instance] at `key`
    pub fn inst_mut(&mut self, key: InstKey) -> Option<&mut Instance> {
        self.insts.get_mut(key)
    }
    /// Get mutable access to the [Instance] at `key` together with the
    /// database. Borrowing both through one call is what permits
    /// cache-and-commit sequences like
    /// `inst.db_set_center_location(db, x, y)` on an owned database.
    pub fn inst_db_mut(&mut self, key: InstKey) -> Option<(&mut Instance, &mut D)> {
        let inst = self.insts.get_mut(key)?;
        Some((inst, &mut self.db))
    }
    /// Get a reference to the [Pin] at `key`
    pub fn pin(&self, key: PinKey) -> Option<&Pin> {
        self.pins.get(key)
    }
    /// Get a reference to the [Net] at `key`
    pub fn net(&self, key: NetKey) -> Option<&Net> {
        self.nets.get(key)
    }
    /// Refresh one [Pin]'s cached absolute box from its owner's cached
    /// corner. Explicit; call after moving the owning [Instance].
    pub fn update_pin_location(&mut self, pin: PinKey) -> PlaceResult<()> {
        let p = match self.pins.get_mut(pin) {
            Some(p) => p,
            None => return PlaceError::fail("update_pin_location: unknown pin key"),
        };
        let owner = match p.owner() {
            Some(key) => self.insts.get(key),
            None => None,
        };
        p.update_location(owner)
    }
    /// Recompute one [Net]'s bounding box by full rescan of its database
    /// terminal list, and re-derive the extremal flags: cleared on every
    /// connected pin, then set on the new edge-defining pins. Ties go to
    /// the first terminal in database order, so repeated calls with
    /// unchanged input are stable.
    ///
    /// A terminal with no mapped [Pin] means the database diverged from
    /// the last init, and is an error.
    pub fn update_net_box(&mut self, net: NetKey) -> PlaceResult<()> {
        let handle = match self.nets.get(net) {
            Some(n) => n.net(),
            None => return PlaceError::fail("update_net_box: unknown net key"),
        };
        let terms = self.db.net_terms(handle);
        let mut keys = Vec::with_capacity(terms.len());
        for term in terms {
            let key = self.pin_map.get(&term).copied().ok_or_else(|| {
                PlaceError::db(format!(
                    "net {} connects a terminal unknown to the last init",
                    handle
                ))
            })?;
            keys.push(key);
        }

        for &key in &keys {
            self.pins[key].clear_extremes();
        }

        let mut bbox = BoundBox::empty();
        let mut min_x: Option<(PinKey, Int)> = None;
        let mut max_x: Option<(PinKey, Int)> = None;
        let mut min_y: Option<(PinKey, Int)> = None;
        let mut max_y: Option<(PinKey, Int)> = None;
        for &key in &keys {
            let p = &self.pins[key];
            bbox = p.bbox.union(&bbox);
            // Strict comparisons: the first pin in term order wins ties
            if min_x.map_or(true, |(_, best)| p.lx() < best) {
                min_x = Some((key, p.lx()));
            }
            if max_x.map_or(true, |(_, best)| p.ux() > best) {
                max_x = Some((key, p.ux()));
            }
            if min_y.map_or(true, |(_, best)| p.ly() < best) {
                min_y = Some((key, p.ly()));
            }
            if max_y.map_or(true, |(_, best)| p.uy() > best) {
                max_y = Some((key, p.uy()));
            }
        }

        // A dangling net collapses to the zero box at the origin
        self.nets[net].bbox = if bbox.is_empty() {
            BoundBox::from_point(Point::new(0, 0))
        } else {
            bbox
        };
        if let Some((key, _)) = min_x {
            self.pins[key].min_pin_x = true;
        }
        if let Some((key, _)) = max_x {
            self.pins[key].max_pin_x = true;
        }
        if let Some((key, _)) = min_y {
            self.pins[key].min_pin_y = true;
        }
        if let Some((key, _)) = max_y {
            self.pins[key].max_pin_y = true;
        }
        Ok(())
    }
    /// The placement quality metric: total half-perimeter wirelength over
    /// ordinary signal nets. Supply and clock nets are excluded.
    pub fn hpwl(&self) -> Int {
        let mut total = 0;
        for net in self.nets.values() {
            let sig = self.db.net_sigtype(net.net());
            if sig.is_supply() || sig == SigType::Clock {
                continue;
            }
            total += net.hpwl();
        }
        total
    }
}

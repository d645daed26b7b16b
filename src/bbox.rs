//!
//! # Rectangular Bounding Boxes and Associated Trait
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{geom::Point, Int};

/// # Rectangular Bounding Box
///
/// Points `p0` and `p1` represent opposite corners of a bounding rectangle.
/// `p0` is always closest to negative-infinity, in both x and y,
/// and `p1` is always closest to positive-infinity.
///
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BoundBox {
    pub p0: Point,
    pub p1: Point,
}
impl BoundBox {
    /// Create a new [BoundBox] from two [Point]s.
    /// Callers are responsible for ensuring that p0.x <= p1.x, and p0.y <= p1.y.
    fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Create a new [BoundBox] from a single [Point].
    /// The resultant [BoundBox] comprises solely the point, having zero area.
    pub fn from_point(pt: Point) -> Self {
        Self { p0: pt, p1: pt }
    }
    /// Create a new [BoundBox] from two points
    pub fn from_points(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Create an empty, otherwise invalid [BoundBox]
    pub fn empty() -> Self {
        Self {
            p0: Point::new(Int::MAX, Int::MAX),
            p1: Point::new(Int::MIN, Int::MIN),
        }
    }
    /// Boolean indication of whether a box is empty
    pub fn is_empty(&self) -> bool {
        self.p0.x > self.p1.x || self.p0.y > self.p1.y
    }
    /// Create a new [BoundBox], shifted by the (x,y) values in `pt`
    pub fn shift(&self, pt: &Point) -> Self {
        Self {
            p0: self.p0.shift(pt),
            p1: self.p1.shift(pt),
        }
    }
    /// Get the box's size as an (x,y) tuple
    pub fn size(&self) -> (Int, Int) {
        (self.p1.x - self.p0.x, self.p1.y - self.p0.y)
    }
    /// Half-perimeter of the box: width plus height.
    /// The standard proxy for wire length in placement.
    /// Zero for an empty box.
    pub fn hpwl(&self) -> Int {
        if self.is_empty() {
            return 0;
        }
        let (w, h) = self.size();
        w + h
    }
}

///
/// # Bounding Box Trait
///
/// Methods for interacting with [BoundBox]s.
/// Implementations for [Point]s and [BoundBox]s
/// enable geometric transformations such as union.
///
pub trait BoundBoxTrait {
    /// Compute the union with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn union(&self, bbox: &BoundBox) -> BoundBox;
    /// Compute a rectangular bounding box around the implementing type.
    fn bbox(&self) -> BoundBox;
}

impl BoundBoxTrait for BoundBox {
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        BoundBox::new(
            Point::new(self.p0.x.min(bbox.p0.x), self.p0.y.min(bbox.p0.y)),
            Point::new(self.p1.x.max(bbox.p1.x), self.p1.y.max(bbox.p1.y)),
        )
    }
    fn bbox(&self) -> BoundBox {
        self.clone()
    }
}

impl BoundBoxTrait for Point {
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        BoundBox::new(
            Point::new(self.x.min(bbox.p0.x), self.y.min(bbox.p0.y)),
            Point::new(self.x.max(bbox.p1.x), self.y.max(bbox.p1.y)),
        )
    }
    fn bbox(&self) -> BoundBox {
        BoundBox::from_point(*self)
    }
}

use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Fixed-point layout coordinate, in database units.
pub type Dbu = i64;

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    X,
    Y,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::X, Dimension::Y];

    /// The perpendicular axis.
    pub const fn reverse(self) -> Self {
        match self {
            Dimension::X => Dimension::Y,
            Dimension::Y => Dimension::X,
        }
    }
}

/// Lower or upper corner of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Boundary {
    Lower,
    Upper,
}

impl Boundary {
    pub const ALL: [Boundary; 2] = [Boundary::Lower, Boundary::Upper];
}

/// A 2D point (or displacement) in database units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbuXy {
    pub x: Dbu,
    pub y: Dbu,
}

impl DbuXy {
    pub const fn new(x: Dbu, y: Dbu) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: Dbu, dy: Dbu) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn scale(&self, factor: Dbu) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn min(&self, other: &DbuXy) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(&self, other: &DbuXy) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Sum of both components.
    pub fn aggregated(&self) -> Dbu {
        self.x + self.y
    }
}

impl Index<Dimension> for DbuXy {
    type Output = Dbu;

    fn index(&self, dim: Dimension) -> &Dbu {
        match dim {
            Dimension::X => &self.x,
            Dimension::Y => &self.y,
        }
    }
}

impl IndexMut<Dimension> for DbuXy {
    fn index_mut(&mut self, dim: Dimension) -> &mut Dbu {
        match dim {
            Dimension::X => &mut self.x,
            Dimension::Y => &mut self.y,
        }
    }
}

impl Add for DbuXy {
    type Output = DbuXy;

    fn add(self, rhs: DbuXy) -> DbuXy {
        DbuXy::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for DbuXy {
    fn add_assign(&mut self, rhs: DbuXy) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for DbuXy {
    type Output = DbuXy;

    fn sub(self, rhs: DbuXy) -> DbuXy {
        DbuXy::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for DbuXy {
    fn sub_assign(&mut self, rhs: DbuXy) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// An axis-aligned rectangle given by its lower and upper corners.
///
/// The default rectangle is the degenerate one at the origin. An *empty*
/// rectangle (see [`Bounds::empty`]) is inverted so that extending it by any
/// point yields exactly that point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: DbuXy,
    pub upper: DbuXy,
}

impl Bounds {
    /// Build a rectangle from two opposite corners in any order.
    pub fn new(x1: Dbu, y1: Dbu, x2: Dbu, y2: Dbu) -> Self {
        Self {
            lower: DbuXy::new(x1.min(x2), y1.min(y2)),
            upper: DbuXy::new(x1.max(x2), y1.max(y2)),
        }
    }

    /// Build a rectangle from corners the caller already ordered.
    pub const fn from_corners(lower: DbuXy, upper: DbuXy) -> Self {
        Self { lower, upper }
    }

    pub const fn from_point(p: DbuXy) -> Self {
        Self { lower: p, upper: p }
    }

    pub const fn empty() -> Self {
        Self {
            lower: DbuXy::new(Dbu::MAX, Dbu::MAX),
            upper: DbuXy::new(-Dbu::MAX, -Dbu::MAX),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lower.x > self.upper.x || self.lower.y > self.upper.y
    }

    pub fn coordinate(&self, boundary: Boundary, dim: Dimension) -> Dbu {
        self[boundary][dim]
    }

    pub fn width(&self) -> Dbu {
        self.upper.x - self.lower.x
    }

    pub fn height(&self) -> Dbu {
        self.upper.y - self.lower.y
    }

    /// Extent along one axis.
    pub fn length_along(&self, dim: Dimension) -> Dbu {
        self.upper[dim] - self.lower[dim]
    }

    /// Extent along both axes; its aggregate is the half-perimeter.
    pub fn length(&self) -> DbuXy {
        self.upper - self.lower
    }

    pub fn half_perimeter(&self) -> Dbu {
        self.width() + self.height()
    }

    pub fn area(&self) -> Dbu {
        self.width() * self.height()
    }

    pub fn center(&self) -> DbuXy {
        DbuXy::new(
            (self.lower.x + self.upper.x) / 2,
            (self.lower.y + self.upper.y) / 2,
        )
    }

    pub fn contains_point(&self, p: &DbuXy) -> bool {
        p.x >= self.lower.x && p.x <= self.upper.x && p.y >= self.lower.y && p.y <= self.upper.y
    }

    /// Interiors intersect. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.lower.x < other.upper.x
            && self.upper.x > other.lower.x
            && self.lower.y < other.upper.y
            && self.upper.y > other.lower.y
    }

    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let lower = self.lower.max(&other.lower);
        let upper = self.upper.min(&other.upper);
        if lower.x > upper.x || lower.y > upper.y {
            return None;
        }
        Some(Bounds::from_corners(lower, upper))
    }

    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            lower: self.lower.min(&other.lower),
            upper: self.upper.max(&other.upper),
        }
    }

    pub fn extend_to_point(&mut self, p: DbuXy) {
        self.lower = self.lower.min(&p);
        self.upper = self.upper.max(&p);
    }

    /// Move the lower corner to `(x, y)` keeping the size.
    pub fn move_to(&mut self, x: Dbu, y: Dbu) {
        let size = self.length();
        self.lower = DbuXy::new(x, y);
        self.upper = self.lower + size;
    }

    pub fn translate(&self, dx: Dbu, dy: Dbu) -> Self {
        Self {
            lower: self.lower.translate(dx, dy),
            upper: self.upper.translate(dx, dy),
        }
    }

    pub fn scale(&self, factor: Dbu) -> Self {
        Self {
            lower: self.lower.scale(factor),
            upper: self.upper.scale(factor),
        }
    }
}

impl Index<Boundary> for Bounds {
    type Output = DbuXy;

    fn index(&self, boundary: Boundary) -> &DbuXy {
        match boundary {
            Boundary::Lower => &self.lower,
            Boundary::Upper => &self.upper,
        }
    }
}

impl IndexMut<Boundary> for Bounds {
    fn index_mut(&mut self, boundary: Boundary) -> &mut DbuXy {
        match boundary {
            Boundary::Lower => &mut self.lower,
            Boundary::Upper => &mut self.upper,
        }
    }
}

/// A simple polygon given by its vertices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<DbuXy>,
}

impl Polygon {
    pub fn new(points: Vec<DbuXy>) -> Self {
        Self { points }
    }

    pub fn bbox(&self) -> Option<Bounds> {
        if self.points.is_empty() {
            return None;
        }
        let mut bounds = Bounds::empty();
        for p in &self.points {
            bounds.extend_to_point(*p);
        }
        Some(bounds)
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }
}

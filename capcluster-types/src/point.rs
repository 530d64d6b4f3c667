use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate axis of the plane.
///
/// Branch nodes of the kd-tree record the axis they cut along; `X` is
/// dimension 0 and `Y` is dimension 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Numeric dimension of this axis (0 for x, 1 for y).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    /// The perpendicular axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Per-axis access and squared Euclidean distance for `geo::Point`.
///
/// # Examples
///
/// ```
/// use capcluster_types::point::{Axis, PointExt};
/// use geo::Point;
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(3.0, 4.0);
///
/// assert_eq!(b.coord(Axis::Y), 4.0);
/// assert_eq!(a.distance_sq(&b), 25.0);
/// ```
pub trait PointExt {
    /// Coordinate of this point along `axis`.
    fn coord(&self, axis: Axis) -> f64;

    /// Squared Euclidean distance to `other`.
    fn distance_sq(&self, other: &Point<f64>) -> f64;
}

impl PointExt for Point<f64> {
    #[inline]
    fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x(),
            Axis::Y => self.y(),
        }
    }

    #[inline]
    fn distance_sq(&self, other: &Point<f64>) -> f64 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx * dx + dy * dy
    }
}

/// Anything that sits at a planar location and carries a display label.
///
/// The label never influences geometry; it is only used to order bucket
/// contents when an index is listed.
pub trait LabeledPoint2D {
    /// Location of this site.
    fn point(&self) -> Point<f64>;

    /// Label used for listings.
    fn label(&self) -> &str;

    /// Shorthand for the x coordinate.
    fn x(&self) -> f64 {
        self.point().x()
    }

    /// Shorthand for the y coordinate.
    fn y(&self) -> f64 {
        self.point().y()
    }
}

/// A point with a string label.
///
/// # Examples
///
/// ```
/// use capcluster_types::point::{LabeledPoint, LabeledPoint2D};
///
/// let depot = LabeledPoint::new("depot", 1.0, 2.5);
/// assert_eq!(depot.label(), "depot");
/// assert_eq!(depot.to_string(), "depot: (1.0, 2.5)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub label: String,
    pub point: Point<f64>,
}

impl LabeledPoint {
    /// Create a labeled point from coordinates.
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            point: Point::new(x, y),
        }
    }

    /// Attach a label to an existing point.
    pub fn from_point(label: impl Into<String>, point: Point<f64>) -> Self {
        Self {
            label: label.into(),
            point,
        }
    }
}

impl LabeledPoint2D for LabeledPoint {
    fn point(&self) -> Point<f64> {
        self.point
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for LabeledPoint {
    // Debug formatting keeps the trailing ".0" on whole coordinates.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ({:?}, {:?})",
            self.label,
            self.point.x(),
            self.point.y()
        )
    }
}

use crate::point::{Axis, PointExt};
use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box.
///
/// Used both as the fixed domain of an index and as the cell of a kd-tree
/// node during nearest-neighbor search. Boxes are closed: points on the
/// boundary are inside. A box may be degenerate (zero width on an axis).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    /// The underlying geometric rectangle
    pub rect: Rect,
}

impl BoundingBox2D {
    /// Create a new bounding box from minimum and maximum coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use capcluster_types::bbox::BoundingBox2D;
    ///
    /// let bbox = BoundingBox2D::new(0.0, 0.0, 10.0, 5.0);
    /// assert_eq!(bbox.max_y(), 5.0);
    /// ```
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: min_x, y: min_y },
                geo::coord! { x: max_x, y: max_y },
            ),
        }
    }

    /// Create a bounding box from a `geo::Rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self { rect }
    }

    /// Degenerate box covering a single point.
    pub fn from_point(point: &Point<f64>) -> Self {
        Self::new(point.x(), point.y(), point.x(), point.y())
    }

    /// Smallest box containing every point, or `None` for an empty input.
    ///
    /// # Examples
    ///
    /// ```
    /// use capcluster_types::bbox::BoundingBox2D;
    /// use geo::Point;
    ///
    /// let pts = [Point::new(1.0, 4.0), Point::new(3.0, -1.0)];
    /// let bbox = BoundingBox2D::from_points(pts.iter()).unwrap();
    /// assert_eq!(bbox, BoundingBox2D::new(1.0, -1.0, 3.0, 4.0));
    /// ```
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point<f64>>,
    {
        let mut iter = points.into_iter();
        let mut bbox = Self::from_point(iter.next()?);
        for point in iter {
            bbox.expand_to(point);
        }
        Some(bbox)
    }

    /// Get the minimum x coordinate.
    pub fn min_x(&self) -> f64 {
        self.rect.min().x
    }

    /// Get the minimum y coordinate.
    pub fn min_y(&self) -> f64 {
        self.rect.min().y
    }

    /// Get the maximum x coordinate.
    pub fn max_x(&self) -> f64 {
        self.rect.max().x
    }

    /// Get the maximum y coordinate.
    pub fn max_y(&self) -> f64 {
        self.rect.max().y
    }

    /// Lower bound along `axis`.
    pub fn low(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.min_x(),
            Axis::Y => self.min_y(),
        }
    }

    /// Upper bound along `axis`.
    pub fn high(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.max_x(),
            Axis::Y => self.max_y(),
        }
    }

    /// Extent of the box along `axis`.
    pub fn width(&self, axis: Axis) -> f64 {
        self.high(axis) - self.low(axis)
    }

    /// Grow the box so that it includes `point`.
    pub fn expand_to(&mut self, point: &Point<f64>) {
        *self = Self::new(
            self.min_x().min(point.x()),
            self.min_y().min(point.y()),
            self.max_x().max(point.x()),
            self.max_y().max(point.y()),
        );
    }

    /// Check if a point lies within this box, boundary included.
    ///
    /// Non-finite coordinates are never contained.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        point.x() >= self.min_x()
            && point.x() <= self.max_x()
            && point.y() >= self.min_y()
            && point.y() <= self.max_y()
    }

    /// Squared distance from `point` to the nearest point of the box.
    ///
    /// Zero when the point is inside.
    ///
    /// # Examples
    ///
    /// ```
    /// use capcluster_types::bbox::BoundingBox2D;
    /// use geo::Point;
    ///
    /// let bbox = BoundingBox2D::new(0.0, 0.0, 2.0, 2.0);
    /// assert_eq!(bbox.distance_sq(&Point::new(1.0, 1.0)), 0.0);
    /// assert_eq!(bbox.distance_sq(&Point::new(5.0, 6.0)), 25.0);
    /// ```
    pub fn distance_sq(&self, point: &Point<f64>) -> f64 {
        let gap = |axis: Axis| {
            let v = point.coord(axis);
            (self.low(axis) - v).max(v - self.high(axis)).max(0.0)
        };
        let dx = gap(Axis::X);
        let dy = gap(Axis::Y);
        dx * dx + dy * dy
    }

    /// The half of this box at or below `value` along `axis`.
    ///
    /// `value` is clamped to the box so the result never extends past it.
    pub fn left_part(&self, axis: Axis, value: f64) -> Self {
        let cut = value.clamp(self.low(axis), self.high(axis));
        match axis {
            Axis::X => Self::new(self.min_x(), self.min_y(), cut, self.max_y()),
            Axis::Y => Self::new(self.min_x(), self.min_y(), self.max_x(), cut),
        }
    }

    /// The half of this box at or above `value` along `axis`.
    pub fn right_part(&self, axis: Axis, value: f64) -> Self {
        let cut = value.clamp(self.low(axis), self.high(axis));
        match axis {
            Axis::X => Self::new(cut, self.min_y(), self.max_x(), self.max_y()),
            Axis::Y => Self::new(self.min_x(), cut, self.max_x(), self.max_y()),
        }
    }
}

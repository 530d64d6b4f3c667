//! # capcluster-types
//!
//! Geometry primitives used by the `capcluster` index and clusterer.
//!
//! - **Axes**: `Axis` names the cutting dimension of a kd-tree branch
//! - **Points**: `PointExt` adds per-axis access and squared distances to
//!   `geo::Point`, `LabeledPoint2D` attaches a label used for listings
//! - **Boxes**: `BoundingBox2D` is the cell/domain rectangle
//!
//! All types are built on the `geo` crate and serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use capcluster_types::bbox::BoundingBox2D;
//! use capcluster_types::point::{Axis, LabeledPoint};
//!
//! let domain = BoundingBox2D::new(0.0, 0.0, 10.0, 10.0);
//! let site = LabeledPoint::new("A", 3.0, 4.0);
//!
//! assert!(domain.contains_point(&site.point));
//! assert_eq!(domain.width(Axis::X), 10.0);
//! ```

pub mod bbox;
pub mod point;

pub use geo::Point;

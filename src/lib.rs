//! Greedy k-capacitated clustering of planar points.
//!
//! Points are partitioned into disjoint clusters of exactly `capacity`
//! members. At every step the clusterer takes the candidate with the
//! smallest radius, where a candidate is a point together with its
//! `capacity - 1` nearest unclustered neighbors.
//!
//! ```rust
//! use capcluster::{BoundingBox2D, GreedyClusterer, LabeledPoint};
//!
//! let mut clusterer = GreedyClusterer::new(2, 4, BoundingBox2D::new(0.0, 0.0, 10.0, 10.0))?;
//! clusterer.build(vec![
//!     LabeledPoint::new("depot", 1.0, 1.0),
//!     LabeledPoint::new("shop", 1.5, 1.0),
//!     LabeledPoint::new("farm", 8.0, 9.0),
//!     LabeledPoint::new("mill", 9.0, 9.0),
//! ])?;
//!
//! while let Some(cluster) = clusterer.extract_cluster()? {
//!     assert_eq!(cluster.points.len(), 2);
//! }
//! # Ok::<(), capcluster::ClusterError>(())
//! ```

pub mod builder;
pub mod clusterer;
pub mod config;
pub mod error;
pub mod kd_tree;
pub mod leftist_heap;
pub mod min_k;

pub use builder::ClustererBuilder;
pub use clusterer::{Cluster, ClustererState, GreedyClusterer};
pub use config::{Axis, BoundingBox2D, Config, LabeledPoint, LabeledPoint2D, PointExt};
pub use error::{ClusterError, Result};
pub use kd_tree::KdTree;
pub use leftist_heap::LeftistHeap;
pub use min_k::MinK;

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        BoundingBox2D, Cluster, ClusterError, ClustererBuilder, Config, GreedyClusterer,
        LabeledPoint, LabeledPoint2D, Result,
    };

    pub use geo::Point;
}

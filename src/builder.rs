//! Builder for clusterers.
//!
//! Collects the cluster capacity, bucket size and domain either one by one
//! or from a [`Config`], and validates them when the clusterer is built.

use crate::clusterer::GreedyClusterer;
use crate::config::{BoundingBox2D, Config, LabeledPoint2D};
use crate::error::{ClusterError, Result};

/// Builder for [`GreedyClusterer`].
///
/// ```rust
/// use capcluster::{BoundingBox2D, ClustererBuilder, LabeledPoint};
///
/// let mut clusterer = ClustererBuilder::new()
///     .capacity(3)
///     .bucket_size(4)
///     .domain(BoundingBox2D::new(0.0, 0.0, 50.0, 50.0))
///     .build::<LabeledPoint>()?;
///
/// assert_eq!(clusterer.capacity(), 3);
/// # Ok::<(), capcluster::ClusterError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClustererBuilder {
    capacity: Option<usize>,
    bucket_size: Option<usize>,
    domain: Option<BoundingBox2D>,
}

impl ClustererBuilder {
    /// Create a builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every setting from `config`.
    pub fn config(mut self, config: Config) -> Self {
        self.capacity = Some(config.capacity);
        self.bucket_size = Some(config.bucket_size);
        self.domain = Some(config.domain);
        self
    }

    /// Number of points per cluster.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Maximum kd-tree bucket size.
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = Some(bucket_size);
        self
    }

    /// Region containing every point to be clustered.
    pub fn domain(mut self, domain: BoundingBox2D) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Assemble the configuration without building a clusterer.
    pub fn to_config(&self) -> Result<Config> {
        let capacity = self
            .capacity
            .ok_or_else(|| ClusterError::InvalidConfig("Cluster capacity is not set".to_string()))?;
        let domain = self
            .domain
            .ok_or_else(|| ClusterError::InvalidConfig("Domain is not set".to_string()))?;

        let mut config = Config::new(capacity, domain);
        if let Some(bucket_size) = self.bucket_size {
            config = config.with_bucket_size(bucket_size);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build an empty clusterer.
    pub fn build<P: LabeledPoint2D + Clone>(self) -> Result<GreedyClusterer<P>> {
        GreedyClusterer::from_config(&self.to_config()?)
    }
}

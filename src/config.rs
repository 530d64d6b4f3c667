//! Clusterer configuration.
//!
//! Re-exports the geometry types from the `capcluster-types` crate for
//! convenience.

use crate::error::{ClusterError, Result};

pub use capcluster_types::bbox::BoundingBox2D;
pub use capcluster_types::point::{Axis, LabeledPoint, LabeledPoint2D, PointExt};

/// Settings for a [`GreedyClusterer`](crate::clusterer::GreedyClusterer).
///
/// ```rust
/// use capcluster::{BoundingBox2D, Config};
///
/// let json = r#"{
///     "capacity": 3,
///     "domain": { "rect": { "min": { "x": 0.0, "y": 0.0 }, "max": { "x": 100.0, "y": 100.0 } } }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.capacity, 3);
/// assert_eq!(config.bucket_size, 8);
/// assert_eq!(config.domain, BoundingBox2D::new(0.0, 0.0, 100.0, 100.0));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of points in every cluster
    pub capacity: usize,

    /// Maximum number of points held by a kd-tree bucket before it splits
    #[serde(default = "Config::default_bucket_size")]
    pub bucket_size: usize,

    /// Region that must contain every clustered point
    pub domain: BoundingBox2D,
}

impl Config {
    const fn default_bucket_size() -> usize {
        8
    }

    /// Create a configuration with the default bucket size.
    pub fn new(capacity: usize, domain: BoundingBox2D) -> Self {
        Self {
            capacity,
            bucket_size: Self::default_bucket_size(),
            domain,
        }
    }

    /// Set the cluster capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the kd-tree bucket size.
    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Set the clustering domain.
    pub fn with_domain(mut self, domain: BoundingBox2D) -> Self {
        self.domain = domain;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ClusterError::InvalidConfig(
                "Cluster capacity must be greater than zero".to_string(),
            ));
        }

        if self.bucket_size == 0 {
            return Err(ClusterError::InvalidConfig(
                "Bucket size must be greater than zero".to_string(),
            ));
        }

        let d = &self.domain;
        if ![d.min_x(), d.min_y(), d.max_x(), d.max_y()]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ClusterError::InvalidConfig(
                "Domain bounds must be finite".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

//! Greedy k-capacitated clustering.
//!
//! Every point proposes the cluster made of itself and its `capacity - 1`
//! nearest neighbors, keyed by the squared radius of that set. Candidates
//! sit in a leftist heap and are validated lazily: when the smallest one is
//! popped, it is accepted if all of its members are still unclustered,
//! recomputed against the shrinking index if only its seed survives, and
//! dropped otherwise.

use crate::config::{BoundingBox2D, Config, LabeledPoint2D, PointExt};
use crate::error::{ClusterError, Result};
use crate::kd_tree::KdTree;
use crate::leftist_heap::LeftistHeap;
use geo::Point;
use std::collections::HashMap;
use std::fmt;

/// One extracted cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<P> {
    /// Heap key the cluster was accepted with (a squared distance)
    pub radius: f64,
    /// Members, seed first, then by increasing distance from the seed
    pub points: Vec<P>,
}

impl<P> Cluster<P> {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the cluster and return its members.
    pub fn into_points(self) -> Vec<P> {
        self.points
    }
}

/// Lifecycle of a [`GreedyClusterer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClustererState {
    /// No points loaded yet
    Unbuilt,
    /// Points remain to be clustered
    Built,
    /// Every point has been assigned to a cluster
    Exhausted,
}

/// What to do with a candidate popped off the heap.
#[derive(Debug)]
enum CandidateOutcome<P> {
    /// Every member is still unclustered.
    Accept,
    /// The seed survives; push a recomputed candidate.
    Refresh { radius: f64, points: Vec<P> },
    /// The seed has already been clustered.
    Discard,
}

/// Greedy clusterer over a bucketed kd-tree.
///
/// # Examples
///
/// ```rust
/// use capcluster::{BoundingBox2D, GreedyClusterer, LabeledPoint};
///
/// let mut clusterer = GreedyClusterer::new(2, 2, BoundingBox2D::new(0.0, 0.0, 10.0, 10.0))?;
/// clusterer.build(vec![
///     LabeledPoint::new("A", 0.0, 0.0),
///     LabeledPoint::new("B", 1.0, 0.0),
///     LabeledPoint::new("C", 9.0, 9.0),
///     LabeledPoint::new("D", 10.0, 9.0),
/// ])?;
///
/// let first = clusterer.extract_cluster()?.unwrap();
/// assert_eq!(first.radius, 1.0);
/// assert_eq!(first.points.len(), 2);
///
/// assert!(clusterer.extract_cluster()?.is_some());
/// assert!(clusterer.extract_cluster()?.is_none());
/// # Ok::<(), capcluster::ClusterError>(())
/// ```
#[derive(Debug)]
pub struct GreedyClusterer<P> {
    capacity: usize,
    kd_tree: KdTree<P>,
    heap: LeftistHeap<f64, Vec<P>>,
    state: ClustererState,
}

impl<P: LabeledPoint2D + Clone> GreedyClusterer<P> {
    /// Create a clusterer producing clusters of exactly `capacity` points.
    pub fn new(capacity: usize, bucket_size: usize, domain: BoundingBox2D) -> Result<Self> {
        Self::from_config(&Config::new(capacity, domain).with_bucket_size(bucket_size))
    }

    /// Create a clusterer from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            capacity: config.capacity,
            kd_tree: KdTree::new(config.bucket_size, config.domain)?,
            heap: LeftistHeap::new(),
            state: ClustererState::Unbuilt,
        })
    }

    /// Number of points in every cluster.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClustererState {
        self.state
    }

    /// Points not yet assigned to a cluster.
    pub fn remaining(&self) -> usize {
        self.kd_tree.len()
    }

    /// Candidates waiting in the heap, stale ones included.
    pub fn pending_candidates(&self) -> usize {
        self.heap.len()
    }

    /// Drop all points and candidates.
    pub fn clear(&mut self) {
        self.kd_tree.clear();
        self.heap.clear();
        self.state = ClustererState::Unbuilt;
    }

    /// Load the points and seed one candidate per point.
    ///
    /// Fails with [`ClusterError::InvalidInputSize`] unless the input is a
    /// non-empty multiple of the capacity, and with
    /// [`ClusterError::OutOfDomain`] if a point lies outside the domain.
    /// A previously built clusterer is reset once the input has been
    /// validated; a rejected input leaves it untouched.
    pub fn build(&mut self, points: Vec<P>) -> Result<()> {
        if points.is_empty() || points.len() % self.capacity != 0 {
            log::warn!(
                "Rejecting {} points for clusters of {}",
                points.len(),
                self.capacity
            );
            return Err(ClusterError::InvalidInputSize {
                size: points.len(),
                capacity: self.capacity,
            });
        }

        if let Some(outside) = points
            .iter()
            .map(|p| p.point())
            .find(|p| !self.kd_tree.domain().contains_point(p))
        {
            log::warn!(
                "Rejecting point ({}, {}) outside of clustering domain",
                outside.x(),
                outside.y()
            );
            return Err(ClusterError::OutOfDomain {
                x: outside.x(),
                y: outside.y(),
            });
        }

        if self.state != ClustererState::Unbuilt {
            self.clear();
        }

        self.kd_tree.bulk_insert(points.clone())?;

        for p in &points {
            let seed = p.point();
            let candidate = self.nearest_set(&seed);
            let radius = candidate
                .last()
                .map_or(0.0, |far| seed.distance_sq(&far.point()));
            self.heap.insert(radius, candidate);
        }

        self.state = ClustererState::Built;
        log::debug!(
            "built clusterer over {} points ({} clusters of {})",
            points.len(),
            points.len() / self.capacity,
            self.capacity
        );
        Ok(())
    }

    /// Run one greedy step.
    ///
    /// Returns the next cluster, or `None` once every point is clustered.
    pub fn extract_cluster(&mut self) -> Result<Option<Cluster<P>>> {
        loop {
            if self.kd_tree.is_empty() {
                if self.state == ClustererState::Built {
                    self.state = ClustererState::Exhausted;
                }
                return Ok(None);
            }

            let (radius, candidate) = self.heap.extract_min_entry()?;
            match self.examine(&candidate) {
                CandidateOutcome::Accept => {
                    let mut points = Vec::with_capacity(candidate.len());
                    for member in &candidate {
                        points.push(self.kd_tree.delete(&member.point())?);
                    }
                    log::trace!(
                        "accepted cluster of {} with radius {}, {} points left",
                        points.len(),
                        radius,
                        self.kd_tree.len()
                    );
                    if self.kd_tree.is_empty() {
                        self.state = ClustererState::Exhausted;
                    }
                    return Ok(Some(Cluster { radius, points }));
                }
                CandidateOutcome::Refresh { radius, points } => {
                    log::trace!("refreshed stale candidate, new radius {}", radius);
                    self.heap.insert(radius, points);
                }
                CandidateOutcome::Discard => {
                    log::trace!("discarded candidate with clustered seed");
                }
            }
        }
    }

    /// Drain every remaining cluster in extraction order.
    pub fn extract_all(&mut self) -> Result<Vec<Cluster<P>>> {
        let mut clusters = Vec::with_capacity(self.kd_tree.len() / self.capacity);
        while let Some(cluster) = self.extract_cluster()? {
            clusters.push(cluster);
        }
        Ok(clusters)
    }

    /// Listing of the kd-tree, see [`KdTree::list`].
    pub fn list_kd_tree(&self) -> Vec<String>
    where
        P: fmt::Display,
    {
        self.kd_tree.list()
    }

    /// Listing of the candidate heap, see [`LeftistHeap::list`].
    pub fn list_heap(&self) -> Vec<String>
    where
        P: fmt::Display,
    {
        self.heap.list_with(|points| {
            let members: Vec<String> = points.iter().map(|p| p.to_string()).collect();
            format!("[{}]", members.join(", "))
        })
    }

    fn nearest_set(&self, seed: &Point<f64>) -> Vec<P> {
        self.kd_tree
            .k_nearest_neighbor(seed, self.capacity)
            .into_iter()
            .cloned()
            .collect()
    }

    fn examine(&self, candidate: &[P]) -> CandidateOutcome<P> {
        if self.all_present(candidate) {
            return CandidateOutcome::Accept;
        }

        let Some(seed) = candidate.first().map(|p| p.point()) else {
            return CandidateOutcome::Discard;
        };
        if self.kd_tree.find(&seed).is_none() {
            return CandidateOutcome::Discard;
        }

        let points = self.nearest_set(&seed);
        let radius = match (points.first(), points.last()) {
            (Some(near), Some(far)) => near.point().distance_sq(&far.point()),
            _ => 0.0,
        };
        CandidateOutcome::Refresh { radius, points }
    }

    /// Every member still has an unclustered entry at its location.
    ///
    /// Members sharing a location need that many entries in the index.
    fn all_present(&self, candidate: &[P]) -> bool {
        if candidate.is_empty() {
            return false;
        }

        let mut needed: HashMap<(u64, u64), (Point<f64>, usize)> =
            HashMap::with_capacity(candidate.len());
        for member in candidate {
            let at = member.point();
            // +0.0 folds -0.0 onto 0.0 so equal coordinates share a key
            let key = ((at.x() + 0.0).to_bits(), (at.y() + 0.0).to_bits());
            needed.entry(key).or_insert((at, 0)).1 += 1;
        }

        needed.values().all(|(at, count)| {
            if *count == 1 {
                self.kd_tree.find(at).is_some()
            } else {
                self.kd_tree.count_at(at) >= *count
            }
        })
    }
}

//! Bucketed kd-tree over a fixed rectangular domain.
//!
//! Branches cut the plane along one axis; points equal to the cut value may
//! live on either side, so exact lookups probe both children on a tie.
//! Buckets hold up to `bucket_size` points and split at the median of their
//! wider axis when they overflow. Deleting the last point of a bucket
//! collapses its parent branch onto the sibling subtree; nothing is ever
//! rebalanced.

use crate::config::{Axis, BoundingBox2D, LabeledPoint2D, PointExt};
use crate::error::{ClusterError, Result};
use crate::min_k::MinK;
use geo::Point;
use std::fmt;
use std::mem;

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[derive(Debug)]
enum Node<P> {
    Internal {
        cut_dim: Axis,
        cut_val: f64,
        left: Box<Node<P>>,
        right: Box<Node<P>>,
    },
    External {
        points: Vec<P>,
    },
}

/// Sort by the coordinate along `axis`, then by the other coordinate.
fn sort_along<P: LabeledPoint2D>(points: &mut [P], axis: Axis) {
    points.sort_by(|a, b| {
        let (pa, pb) = (a.point(), b.point());
        pa.coord(axis)
            .total_cmp(&pb.coord(axis))
            .then_with(|| pa.coord(axis.other()).total_cmp(&pb.coord(axis.other())))
    });
}

impl<P: LabeledPoint2D> Node<P> {
    fn empty() -> Self {
        Node::External { points: Vec::new() }
    }

    fn is_empty_bucket(&self) -> bool {
        matches!(self, Node::External { points } if points.is_empty())
    }

    fn find(&self, q: &Point<f64>) -> Option<&P> {
        match self {
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                let v = q.coord(*cut_dim);
                if v < *cut_val {
                    left.find(q)
                } else if v > *cut_val {
                    right.find(q)
                } else {
                    left.find(q).or_else(|| right.find(q))
                }
            }
            Node::External { points } => points.iter().find(|p| p.point() == *q),
        }
    }

    fn count_at(&self, q: &Point<f64>) -> usize {
        match self {
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                let v = q.coord(*cut_dim);
                if v < *cut_val {
                    left.count_at(q)
                } else if v > *cut_val {
                    right.count_at(q)
                } else {
                    left.count_at(q) + right.count_at(q)
                }
            }
            Node::External { points } => points.iter().filter(|p| p.point() == *q).count(),
        }
    }

    fn bulk_insert(&mut self, mut pts: Vec<P>, bucket_size: usize) {
        match self {
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                let axis = *cut_dim;
                sort_along(&mut pts, axis);
                let split = pts
                    .iter()
                    .position(|p| p.point().coord(axis) >= *cut_val)
                    .unwrap_or(pts.len());
                let upper = pts.split_off(split);

                if !pts.is_empty() {
                    left.bulk_insert(pts, bucket_size);
                }
                if !upper.is_empty() {
                    right.bulk_insert(upper, bucket_size);
                }
            }
            Node::External { points } => {
                points.extend(pts);
                if points.len() <= bucket_size {
                    return;
                }
                let full = mem::take(points);
                *self = Self::split_bucket(full, bucket_size);
            }
        }
    }

    /// Turn an overflowing bucket into a branch with two bulk-loaded buckets.
    fn split_bucket(mut points: Vec<P>, bucket_size: usize) -> Self {
        let mut bbox = BoundingBox2D::from_point(&points[0].point());
        for p in &points[1..] {
            bbox.expand_to(&p.point());
        }

        let cut_dim = if bbox.width(Axis::X) >= bbox.width(Axis::Y) {
            Axis::X
        } else {
            Axis::Y
        };
        sort_along(&mut points, cut_dim);

        let median = points.len() / 2;
        let cut_val = if points.len() % 2 == 0 {
            (points[median - 1].point().coord(cut_dim) + points[median].point().coord(cut_dim))
                / 2.0
        } else {
            points[median].point().coord(cut_dim)
        };

        log::trace!(
            "splitting bucket of {} points at {}={}",
            points.len(),
            cut_dim,
            cut_val
        );

        let upper = points.split_off(median);
        let mut left = Self::empty();
        let mut right = Self::empty();
        left.bulk_insert(points, bucket_size);
        right.bulk_insert(upper, bucket_size);

        Node::Internal {
            cut_dim,
            cut_val,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Remove one entry located at `q`, collapsing emptied buckets into
    /// their parent.
    fn delete(&mut self, q: &Point<f64>) -> Option<P> {
        let (removed, emptied) = match self {
            Node::External { points } => {
                let idx = points.iter().position(|p| p.point() == *q)?;
                return Some(points.remove(idx));
            }
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                let v = q.coord(*cut_dim);
                let (removed, side) = if v < *cut_val {
                    (left.delete(q), Side::Left)
                } else if v > *cut_val {
                    (right.delete(q), Side::Right)
                } else {
                    match left.delete(q) {
                        Some(p) => (Some(p), Side::Left),
                        None => (right.delete(q), Side::Right),
                    }
                };
                let emptied = match side {
                    Side::Left => left.is_empty_bucket(),
                    Side::Right => right.is_empty_bucket(),
                };
                let collapse = (removed.is_some() && emptied).then_some(side);
                (removed, collapse)
            }
        };

        if let Some(side) = emptied {
            self.collapse(side);
        }
        removed
    }

    /// Replace this branch by the child opposite to `emptied`.
    fn collapse(&mut self, emptied: Side) {
        if let Node::Internal { left, right, .. } = mem::replace(self, Self::empty()) {
            *self = match emptied {
                Side::Left => *right,
                Side::Right => *left,
            };
        }
    }

    fn nearest_neighbor<'a>(
        &'a self,
        center: &Point<f64>,
        mut best: Option<(&'a P, f64)>,
        cell: &BoundingBox2D,
    ) -> Option<(&'a P, f64)> {
        match self {
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                let left_cell = cell.left_part(*cut_dim, *cut_val);
                let right_cell = cell.right_part(*cut_dim, *cut_val);

                let ((near, near_cell), (far, far_cell)) = if center.coord(*cut_dim) < *cut_val {
                    ((left, left_cell), (right, right_cell))
                } else {
                    ((right, right_cell), (left, left_cell))
                };

                best = near.nearest_neighbor(center, best, &near_cell);
                let best_dist = best.map_or(f64::INFINITY, |(_, d)| d);
                if far_cell.distance_sq(center) < best_dist {
                    best = far.nearest_neighbor(center, best, &far_cell);
                }
                best
            }
            Node::External { points } => {
                let mut best_dist = best.map_or(f64::INFINITY, |(_, d)| d);
                for p in points {
                    let d = center.distance_sq(&p.point());
                    if d < best_dist {
                        best = Some((p, d));
                        best_dist = d;
                    }
                }
                best
            }
        }
    }

    fn k_nearest_neighbor<'a>(
        &'a self,
        center: &Point<f64>,
        cell: &BoundingBox2D,
        min_k: &mut MinK<f64, &'a P>,
    ) {
        match self {
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                if cell.distance_sq(center) > min_k.kth_key() {
                    return;
                }

                let left_cell = cell.left_part(*cut_dim, *cut_val);
                let right_cell = cell.right_part(*cut_dim, *cut_val);

                if center.coord(*cut_dim) < *cut_val {
                    left.k_nearest_neighbor(center, &left_cell, min_k);
                    right.k_nearest_neighbor(center, &right_cell, min_k);
                } else {
                    right.k_nearest_neighbor(center, &right_cell, min_k);
                    left.k_nearest_neighbor(center, &left_cell, min_k);
                }
            }
            Node::External { points } => {
                for p in points {
                    min_k.add(center.distance_sq(&p.point()), p);
                }
            }
        }
    }

    fn list(&self, out: &mut Vec<String>)
    where
        P: fmt::Display,
    {
        match self {
            Node::Internal {
                cut_dim,
                cut_val,
                left,
                right,
            } => {
                out.push(format!("({}={:?})", cut_dim, cut_val));
                right.list(out);
                left.list(out);
            }
            Node::External { points } => {
                let mut sorted: Vec<&P> = points.iter().collect();
                sorted.sort_by(|a, b| a.label().cmp(b.label()));

                let mut line = String::from("[ ");
                for p in sorted {
                    line.push_str(&format!("{{{}}} ", p));
                }
                line.push(']');
                out.push(line);
            }
        }
    }

    fn height(&self) -> usize {
        match self {
            Node::Internal { left, right, .. } => 1 + left.height().max(right.height()),
            Node::External { .. } => 0,
        }
    }
}

/// A kd-tree with point buckets, bounded by a fixed domain rectangle.
///
/// # Examples
///
/// ```rust
/// use capcluster::{BoundingBox2D, KdTree, LabeledPoint};
/// use geo::Point;
///
/// let mut tree = KdTree::new(2, BoundingBox2D::new(0.0, 0.0, 10.0, 10.0))?;
/// tree.bulk_insert(vec![
///     LabeledPoint::new("A", 0.0, 0.0),
///     LabeledPoint::new("B", 1.0, 0.0),
///     LabeledPoint::new("C", 9.0, 9.0),
/// ])?;
///
/// let nearest = tree.nearest_neighbor(&Point::new(8.0, 8.0)).unwrap();
/// assert_eq!(nearest.label, "C");
///
/// let two = tree.k_nearest_neighbor(&Point::new(0.0, 1.0), 2);
/// assert_eq!(two[0].label, "A");
/// assert_eq!(two[1].label, "B");
/// # Ok::<(), capcluster::ClusterError>(())
/// ```
#[derive(Debug)]
pub struct KdTree<P> {
    root: Node<P>,
    bucket_size: usize,
    domain: BoundingBox2D,
    num_points: usize,
}

impl<P: LabeledPoint2D> KdTree<P> {
    /// Create an empty tree whose buckets hold at most `bucket_size` points.
    pub fn new(bucket_size: usize, domain: BoundingBox2D) -> Result<Self> {
        if bucket_size == 0 {
            return Err(ClusterError::InvalidConfig(
                "Bucket size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            root: Node::empty(),
            bucket_size,
            domain,
            num_points: 0,
        })
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.num_points
    }

    /// Check if the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// Maximum number of points a bucket holds before it splits.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Region every stored point must lie in.
    pub fn domain(&self) -> &BoundingBox2D {
        &self.domain
    }

    /// Number of branch levels above the deepest bucket.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.root = Node::empty();
        self.num_points = 0;
    }

    /// Entry stored exactly at `q`, if any.
    pub fn find(&self, q: &Point<f64>) -> Option<&P> {
        self.root.find(q)
    }

    /// Number of entries stored exactly at `q`.
    pub fn count_at(&self, q: &Point<f64>) -> usize {
        self.root.count_at(q)
    }

    /// Insert a single point.
    pub fn insert(&mut self, point: P) -> Result<()> {
        self.bulk_insert(vec![point])
    }

    /// Insert a batch of points, pushing them down the existing branches.
    ///
    /// Fails without modifying the tree if any point lies outside the domain.
    pub fn bulk_insert(&mut self, points: Vec<P>) -> Result<()> {
        if let Some(outside) = points
            .iter()
            .map(|p| p.point())
            .find(|p| !self.domain.contains_point(p))
        {
            log::warn!(
                "Rejecting point ({}, {}) outside of index domain",
                outside.x(),
                outside.y()
            );
            return Err(ClusterError::OutOfDomain {
                x: outside.x(),
                y: outside.y(),
            });
        }

        if points.is_empty() {
            return Ok(());
        }

        let count = points.len();
        self.root.bulk_insert(points, self.bucket_size);
        self.num_points += count;
        log::debug!("inserted {} points, index now holds {}", count, self.num_points);
        Ok(())
    }

    /// Remove one entry located at `q` and return it.
    pub fn delete(&mut self, q: &Point<f64>) -> Result<P> {
        let removed = self.root.delete(q).ok_or(ClusterError::NotFound {
            x: q.x(),
            y: q.y(),
        })?;
        self.num_points -= 1;
        Ok(removed)
    }

    /// Closest stored point to `center`, or `None` on an empty tree.
    pub fn nearest_neighbor(&self, center: &Point<f64>) -> Option<&P> {
        if self.is_empty() {
            return None;
        }
        self.root
            .nearest_neighbor(center, None, &self.domain)
            .map(|(p, _)| p)
    }

    /// The `k` closest points to `center` in ascending distance order.
    ///
    /// Returns every point when the tree holds fewer than `k`.
    pub fn k_nearest_neighbor(&self, center: &Point<f64>, k: usize) -> Vec<&P> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }
        let mut min_k = MinK::new(k.min(self.num_points), f64::MAX);
        self.root.k_nearest_neighbor(center, &self.domain, &mut min_k);
        min_k.into_sorted_values()
    }

    /// Preorder dump, right subtree before left.
    ///
    /// Branches render as `(x=<v>)` / `(y=<v>)`; buckets as
    /// `[ {p1} {p2} ... ]` sorted by label.
    pub fn list(&self) -> Vec<String>
    where
        P: fmt::Display,
    {
        let mut out = Vec::new();
        self.root.list(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabeledPoint;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn domain() -> BoundingBox2D {
        BoundingBox2D::new(0.0, 0.0, 10.0, 10.0)
    }

    fn lp(label: &str, x: f64, y: f64) -> LabeledPoint {
        LabeledPoint::new(label, x, y)
    }

    fn four_corners() -> Vec<LabeledPoint> {
        vec![
            lp("A", 0.0, 0.0),
            lp("B", 1.0, 0.0),
            lp("C", 9.0, 9.0),
            lp("D", 10.0, 9.0),
        ]
    }

    fn brute_force_sorted(points: &[LabeledPoint], q: &Point<f64>) -> Vec<f64> {
        let mut d: Vec<f64> = points.iter().map(|p| q.distance_sq(&p.point)).collect();
        d.sort_by(|a, b| a.total_cmp(b));
        d
    }

    #[test]
    fn test_zero_bucket_size_rejected() {
        assert!(matches!(
            KdTree::<LabeledPoint>::new(0, domain()),
            Err(ClusterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_tree() {
        let mut tree: KdTree<LabeledPoint> = KdTree::new(2, domain()).unwrap();
        let q = Point::new(1.0, 1.0);
        assert!(tree.is_empty());
        assert!(tree.find(&q).is_none());
        assert!(tree.nearest_neighbor(&q).is_none());
        assert!(tree.k_nearest_neighbor(&q, 3).is_empty());
        assert_eq!(tree.delete(&q), Err(ClusterError::NotFound { x: 1.0, y: 1.0 }));
        assert_eq!(tree.list(), vec!["[ ]"]);
    }

    #[test]
    fn test_out_of_domain_leaves_tree_untouched() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        let result = tree.bulk_insert(vec![lp("ok", 1.0, 1.0), lp("bad", 11.0, 5.0)]);
        assert_eq!(result, Err(ClusterError::OutOfDomain { x: 11.0, y: 5.0 }));
        assert!(tree.is_empty());
        assert!(tree.find(&Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        assert!(matches!(
            tree.insert(lp("nan", f64::NAN, 1.0)),
            Err(ClusterError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn test_bucket_split_listing() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(four_corners()).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.height(), 1);
        assert_eq!(
            tree.list(),
            vec![
                "(x=5.0)",
                "[ {C: (9.0, 9.0)} {D: (10.0, 9.0)} ]",
                "[ {A: (0.0, 0.0)} {B: (1.0, 0.0)} ]",
            ]
        );
    }

    #[test]
    fn test_odd_bucket_uses_median_value() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(vec![lp("a", 1.0, 1.0), lp("b", 1.5, 4.0), lp("c", 2.0, 9.0)])
            .unwrap();
        assert_eq!(tree.list()[0], "(y=4.0)");
    }

    #[test]
    fn test_find_and_delete() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(four_corners()).unwrap();

        let c = Point::new(9.0, 9.0);
        assert_eq!(tree.find(&c).unwrap().label, "C");

        let removed = tree.delete(&c).unwrap();
        assert_eq!(removed.label, "C");
        assert!(tree.find(&c).is_none());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.delete(&c), Err(ClusterError::NotFound { x: 9.0, y: 9.0 }));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_empty_bucket_collapses_parent() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(four_corners()).unwrap();

        tree.delete(&Point::new(9.0, 9.0)).unwrap();
        tree.delete(&Point::new(10.0, 9.0)).unwrap();
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.list(), vec!["[ {A: (0.0, 0.0)} {B: (1.0, 0.0)} ]"]);

        tree.delete(&Point::new(0.0, 0.0)).unwrap();
        tree.delete(&Point::new(1.0, 0.0)).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.list(), vec!["[ ]"]);

        // The emptied root bucket accepts new points again.
        tree.insert(lp("E", 3.0, 3.0)).unwrap();
        assert_eq!(tree.nearest_neighbor(&Point::new(0.0, 0.0)).unwrap().label, "E");
    }

    #[test]
    fn test_tie_on_cut_value_probes_both_sides() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(vec![
            lp("p", 2.0, 0.0),
            lp("q", 5.0, 0.0),
            lp("r", 5.0, 5.0),
            lp("s", 8.0, 0.0),
        ])
        .unwrap();
        assert_eq!(tree.list()[0], "(x=5.0)");

        assert_eq!(tree.find(&Point::new(5.0, 0.0)).unwrap().label, "q");
        assert_eq!(tree.find(&Point::new(5.0, 5.0)).unwrap().label, "r");

        assert_eq!(tree.delete(&Point::new(5.0, 5.0)).unwrap().label, "r");
        assert_eq!(tree.len(), 3);
        assert!(tree.find(&Point::new(5.0, 0.0)).is_some());
    }

    #[test]
    fn test_duplicate_points() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        let dups: Vec<_> = (0..5).map(|i| lp(&format!("d{}", i), 1.0, 1.0)).collect();
        tree.bulk_insert(dups).unwrap();
        assert_eq!(tree.len(), 5);

        let q = Point::new(1.0, 1.0);
        assert_eq!(tree.count_at(&q), 5);
        assert_eq!(tree.k_nearest_neighbor(&q, 10).len(), 5);
        for _ in 0..5 {
            assert!(tree.delete(&q).is_ok());
        }
        assert!(tree.delete(&q).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_keeps_existing_cuts() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(four_corners()).unwrap();
        tree.insert(lp("E", 2.0, 1.0)).unwrap();

        let listing = tree.list();
        assert_eq!(listing[0], "(x=5.0)");
        assert_eq!(listing[1], "[ {C: (9.0, 9.0)} {D: (10.0, 9.0)} ]");
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.find(&Point::new(2.0, 1.0)).unwrap().label, "E");
    }

    #[test]
    fn test_knn_returns_all_when_k_exceeds_size() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(four_corners()).unwrap();

        let all = tree.k_nearest_neighbor(&Point::new(0.0, 0.0), 10);
        let labels: Vec<&str> = all.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
        assert!(tree.k_nearest_neighbor(&Point::new(0.0, 0.0), 0).is_empty());
    }

    #[test]
    fn test_queries_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(2024);
        let points: Vec<LabeledPoint> = (0..400)
            .map(|i| {
                lp(
                    &format!("p{}", i),
                    rng.random_range(0.0..=10.0),
                    rng.random_range(0.0..=10.0),
                )
            })
            .collect();

        let mut tree = KdTree::new(3, domain()).unwrap();
        tree.bulk_insert(points.clone()).unwrap();

        for _ in 0..50 {
            let q = Point::new(rng.random_range(-2.0..12.0), rng.random_range(-2.0..12.0));
            let expected = brute_force_sorted(&points, &q);

            let nn = tree.nearest_neighbor(&q).unwrap();
            assert_eq!(q.distance_sq(&nn.point), expected[0]);
            assert_eq!(tree.k_nearest_neighbor(&q, 1)[0].point, nn.point);

            let knn = tree.k_nearest_neighbor(&q, 7);
            let got: Vec<f64> = knn.iter().map(|p| q.distance_sq(&p.point)).collect();
            assert_eq!(got, expected[..7].to_vec());
        }
    }

    #[test]
    fn test_queries_after_deletions() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut points: Vec<LabeledPoint> = (0..200)
            .map(|i| {
                lp(
                    &format!("p{}", i),
                    rng.random_range(0.0..=10.0),
                    rng.random_range(0.0..=10.0),
                )
            })
            .collect();

        let mut tree = KdTree::new(4, domain()).unwrap();
        tree.bulk_insert(points.clone()).unwrap();

        let removed: Vec<LabeledPoint> = points.drain(..150).collect();
        for p in &removed {
            tree.delete(&p.point).unwrap();
            assert!(tree.find(&p.point).is_none());
        }
        assert_eq!(tree.len(), 50);

        for p in &points {
            assert!(tree.find(&p.point).is_some());
        }

        let q = Point::new(5.0, 5.0);
        let expected = brute_force_sorted(&points, &q);
        let got: Vec<f64> = tree
            .k_nearest_neighbor(&q, 60)
            .iter()
            .map(|p| q.distance_sq(&p.point))
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_clear() {
        let mut tree = KdTree::new(2, domain()).unwrap();
        tree.bulk_insert(four_corners()).unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.list(), vec!["[ ]"]);
    }
}

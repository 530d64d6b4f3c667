use capcluster::{BoundingBox2D, Cluster, GreedyClusterer, KdTree, LabeledPoint, Point, PointExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;
use std::collections::BTreeSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_points(seed: u64, n: usize, extent: f64) -> Vec<LabeledPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            LabeledPoint::new(
                format!("p{:04}", i),
                rng.random_range(0.0..=extent),
                rng.random_range(0.0..=extent),
            )
        })
        .collect()
}

/// Checks that the members are the `len` nearest points to the seed among
/// the points that were still unclustered when the cluster was taken.
fn assert_nearest_set(cluster: &Cluster<LabeledPoint>, remaining: &[LabeledPoint]) {
    let seed = cluster.points[0].point;
    let members: BTreeSet<&str> = cluster.points.iter().map(|p| p.label.as_str()).collect();

    let farthest_member = cluster
        .points
        .iter()
        .map(|p| seed.distance_sq(&p.point))
        .fold(0.0, f64::max);
    let closest_outsider = remaining
        .iter()
        .filter(|p| !members.contains(p.label.as_str()))
        .map(|p| seed.distance_sq(&p.point))
        .fold(f64::INFINITY, f64::min);

    assert!(
        farthest_member <= closest_outsider,
        "cluster seeded at {:?} skips a closer point",
        seed
    );
}

#[test]
fn test_clusters_partition_input() {
    init_logging();
    for (seed, capacity, bucket_size) in [(1u64, 2usize, 2usize), (2, 3, 4), (3, 5, 8), (4, 4, 1)] {
        let points = random_points(seed, capacity * 40, 100.0);
        let mut clusterer =
            GreedyClusterer::new(capacity, bucket_size, BoundingBox2D::new(0.0, 0.0, 100.0, 100.0))
                .unwrap();
        clusterer.build(points.clone()).unwrap();

        let mut remaining = points.clone();
        let mut seen = BTreeSet::new();
        let mut count = 0;

        while let Some(cluster) = clusterer.extract_cluster().unwrap() {
            assert_eq!(cluster.len(), capacity);
            assert_nearest_set(&cluster, &remaining);

            for p in &cluster.points {
                assert!(seen.insert(p.label.clone()), "{} clustered twice", p.label);
            }
            remaining.retain(|p| !cluster.points.iter().any(|c| c.label == p.label));
            assert_eq!(clusterer.remaining(), remaining.len());
            count += 1;
        }

        assert_eq!(count, points.len() / capacity);
        let expected: BTreeSet<String> = points.iter().map(|p| p.label.clone()).collect();
        assert_eq!(seen, expected);
    }
}

#[test]
fn test_radius_matches_members() {
    init_logging();
    let points = random_points(11, 60, 50.0);
    let mut clusterer = GreedyClusterer::new(3, 4, BoundingBox2D::new(0.0, 0.0, 50.0, 50.0)).unwrap();
    clusterer.build(points).unwrap();

    for cluster in clusterer.extract_all().unwrap() {
        let first = cluster.points[0].point;
        let last = cluster.points[cluster.len() - 1].point;
        assert_eq!(cluster.radius, first.distance_sq(&last));
    }
}

#[test]
fn test_clustered_grid() {
    init_logging();
    // Four tight groups of three, far apart from each other.
    let centers = [(10.0, 10.0), (10.0, 90.0), (90.0, 10.0), (90.0, 90.0)];
    let mut points = Vec::new();
    for (g, (cx, cy)) in centers.iter().enumerate() {
        for (j, (dx, dy)) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)].iter().enumerate() {
            points.push(LabeledPoint::new(format!("g{}m{}", g, j), cx + dx, cy + dy));
        }
    }

    let mut clusterer = GreedyClusterer::new(3, 2, BoundingBox2D::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    clusterer.build(points).unwrap();

    let clusters = clusterer.extract_all().unwrap();
    assert_eq!(clusters.len(), 4);
    for cluster in clusters {
        let groups: BTreeSet<&str> = cluster.points.iter().map(|p| &p.label[..2]).collect();
        assert_eq!(groups.len(), 1, "cluster mixes groups: {:?}", cluster.points);
    }
}

#[test]
fn test_kd_tree_agrees_with_rstar() {
    init_logging();
    let points = random_points(5, 1000, 1000.0);
    let mut tree = KdTree::new(6, BoundingBox2D::new(0.0, 0.0, 1000.0, 1000.0)).unwrap();
    tree.bulk_insert(points.clone()).unwrap();

    let reference = RTree::bulk_load(points.iter().map(|p| [p.point.x(), p.point.y()]).collect());

    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..100 {
        let q = Point::new(rng.random_range(-50.0..1050.0), rng.random_range(-50.0..1050.0));
        let dist = |c: &[f64; 2]| q.distance_sq(&Point::new(c[0], c[1]));

        let expected_nn = reference.nearest_neighbor(&[q.x(), q.y()]).unwrap();
        let nn = tree.nearest_neighbor(&q).unwrap();
        assert_eq!(q.distance_sq(&nn.point), dist(expected_nn));

        let expected: Vec<f64> = reference
            .nearest_neighbor_iter(&[q.x(), q.y()])
            .take(10)
            .map(dist)
            .collect();
        let got: Vec<f64> = tree
            .k_nearest_neighbor(&q, 10)
            .iter()
            .map(|p| q.distance_sq(&p.point))
            .collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn test_nearest_agrees_with_k1_while_deleting() {
    init_logging();
    let points = random_points(8, 300, 10.0);
    let mut tree = KdTree::new(3, BoundingBox2D::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    tree.bulk_insert(points.clone()).unwrap();

    let probe = Point::new(5.0, 5.0);
    for p in &points {
        let nn = tree.nearest_neighbor(&probe).unwrap().point;
        let k1 = tree.k_nearest_neighbor(&probe, 1)[0].point;
        assert_eq!(probe.distance_sq(&nn), probe.distance_sq(&k1));

        tree.delete(&p.point).unwrap();
        assert!(tree.find(&p.point).is_none());
        assert!(tree.delete(&p.point).is_err());
    }
    assert!(tree.is_empty());
    assert!(tree.nearest_neighbor(&probe).is_none());
}

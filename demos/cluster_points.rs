//! Cluster Points Example
//!
//! Groups a handful of labeled sites into pairs, printing the candidate heap
//! and the kd-tree along the way.
//!
//! Run with `RUST_LOG=trace` to see every accepted, refreshed and discarded
//! candidate.

use capcluster::{BoundingBox2D, ClustererBuilder, GreedyClusterer, LabeledPoint};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== capcluster - Greedy Clustering ===\n");

    let mut clusterer: GreedyClusterer<LabeledPoint> = ClustererBuilder::new()
        .capacity(2)
        .bucket_size(2)
        .domain(BoundingBox2D::new(0.0, 0.0, 10.0, 10.0))
        .build()?;

    clusterer.build(vec![
        LabeledPoint::new("A", 0.0, 0.0),
        LabeledPoint::new("B", 0.0, 3.0),
        LabeledPoint::new("C", 0.0, 1.0),
        LabeledPoint::new("D", 0.0, 7.0),
        LabeledPoint::new("E", 8.0, 8.0),
        LabeledPoint::new("F", 9.0, 8.5),
    ])?;
    println!("✓ Loaded {} points\n", clusterer.remaining());

    println!("kd-tree:");
    for line in clusterer.list_kd_tree() {
        println!("   {}", line);
    }

    println!("\ncandidate heap:");
    for line in clusterer.list_heap() {
        println!("   {}", line);
    }

    println!();
    let mut n = 1;
    while let Some(cluster) = clusterer.extract_cluster()? {
        let members: Vec<String> = cluster.points.iter().map(|p| p.to_string()).collect();
        println!(
            "cluster {} (squared radius {}): {}",
            n,
            cluster.radius,
            members.join(", ")
        );
        n += 1;
    }

    println!("\n✓ {} candidates left unused", clusterer.pending_candidates());
    Ok(())
}

//! Adaptive binning and cluster-factory clustering on a simple 2D dataset.

use equipart::binning::{AdaptiveBinning1d, AdaptiveBinning2d};
use equipart::cluster::{ClusterFactory, Policy, Seeding};

fn main() {
    // Three well-separated groups in 2D.
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    for i in 0..8 {
        let t = f64::from(i) * 0.05;
        // Group A (near origin)
        xs.push(t);
        ys.push(0.3 - t);
        // Group B (near (5, 5))
        xs.push(5.0 + t);
        ys.push(5.3 - t);
        // Group C (near (10, 0))
        xs.push(10.0 + t);
        ys.push(0.3 - t);
    }

    // --- 1D adaptive binning on x ---
    let binning = AdaptiveBinning1d::new(6.0, 0.0, 11.0).fit(&xs, &[]).unwrap();
    println!("=== 1D binning (occupancy 6) ===");
    println!("  edges: {:?}", binning.edges());
    for (i, bin) in binning.bins().iter().enumerate() {
        println!(
            "  bin {i}: [{:6.2}, {:6.2})  entries {:2}  weight {:5.2}",
            bin.min(),
            bin.max(),
            bin.entries(),
            bin.sum_of_weights()
        );
    }

    // --- 2D adaptive binning ---
    let binning = AdaptiveBinning2d::new(6.0, (0.0, 11.0), (-0.1, 5.4))
        .fit(&xs, &ys, &[])
        .unwrap();
    println!("\n=== 2D binning (min occupancy 6) ===");
    for (rect, adj) in binning.rectangles().iter().zip(binning.adjusted_rectangles()) {
        println!("  raw {rect:?}  adjusted {adj:?}");
    }

    // --- Cluster factory (k=3) ---
    let data: Vec<Vec<f64>> = xs.iter().zip(&ys).map(|(&x, &y)| vec![x, y]).collect();
    let fit = ClusterFactory::new(3)
        .with_seeding(Seeding::Distance)
        .with_policy(Policy::Convergence)
        .with_seed(42)
        .fit(&data)
        .unwrap();

    println!("\n=== ClusterFactory (k=3) ===");
    println!("  converged: {} after {} passes", fit.converged, fit.iterations);
    for (i, cluster) in fit.clusters.iter().enumerate() {
        let c = cluster.center().values();
        println!(
            "  cluster {i}: {:2} points, center ({:5.2}, {:5.2}), dispersion {:.4}",
            cluster.n_points(),
            c[0],
            c[1],
            cluster.dispersion()
        );
    }
    for (i, label) in fit.labels.iter().enumerate() {
        println!(
            "  point {i:2} ({:5.2}, {:5.2}) => cluster {label}",
            data[i][0], data[i][1]
        );
    }
}

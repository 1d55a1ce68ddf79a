use equipart::binning::AdaptiveBinning1d;
use equipart::cluster::{CenterOfMass, Cluster, ClusterPoint};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_distance_symmetric(
        a in prop::collection::vec(-100.0f64..100.0, 3),
        b in prop::collection::vec(-100.0f64..100.0, 3),
        w in prop::collection::vec(0.1f64..10.0, 3)
    ) {
        let cluster = Cluster::with_weights(w);
        let pa = ClusterPoint::new(a);
        let pb = ClusterPoint::new(b);
        prop_assert_eq!(cluster.distance(&pa, &pb), cluster.distance(&pb, &pa));
    }

    #[test]
    fn prop_1d_conserves_weight_and_orders_edges(
        values in prop::collection::vec(0.0f64..100.0, 4..60),
        occupancy in 0.5f64..4.0
    ) {
        let binner = AdaptiveBinning1d::new(occupancy, 0.0, 100.0);
        if let Ok(binning) = binner.fit(&values, &[]) {
            // All points are in range, so the bins hold the full sample.
            let total: f64 = binning.bins().iter().map(|b| b.sum_of_weights()).sum();
            prop_assert!((total - values.len() as f64).abs() < 1e-9);

            let edges = binning.edges();
            prop_assert_eq!(edges.len(), binning.n_bins() + 1);
            prop_assert_eq!(edges[0], 0.0);
            prop_assert_eq!(edges[edges.len() - 1], 100.0);
            for pair in edges.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }

    #[test]
    fn prop_streaming_mean_matches_batch(
        rows in prop::collection::vec(
            (prop::collection::vec(-50.0f64..50.0, 2), 0.1f64..5.0),
            1..30
        )
    ) {
        let points: Vec<ClusterPoint> = rows
            .iter()
            .map(|(v, w)| ClusterPoint::with_weight(v.clone(), *w))
            .collect();

        let mut com = CenterOfMass::new(2);
        for p in &points {
            com.attach(p);
        }

        let total: f64 = points.iter().map(ClusterPoint::weight).sum();
        for i in 0..2 {
            let batch: f64 = points
                .iter()
                .map(|p| p.weight() * p.values()[i])
                .sum::<f64>() / total;
            prop_assert!((com.values()[i] - batch).abs() < 1e-9);
        }
    }
}

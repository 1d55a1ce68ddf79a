//! K-means-style clustering with pluggable seeding, convergence policies,
//! and optional automatic cluster-count management.
//!
//! # The Algorithm
//!
//! [`ClusterFactory`] orchestrates the classic reassignment loop over
//! weighted points:
//!
//! 1. Shuffle the input (removes ordering bias from seeding).
//! 2. Z-score every dimension by its population standard deviation, so the
//!    distance metric is scale-free.
//! 3. Seed one center per cluster ([`Seeding`]), then grow each seed with
//!    its nearest unclaimed points until every dimension has nonzero
//!    variance (a zero-variance dimension would break the distance
//!    normalization downstream).
//! 4. Reassign every point to the nearest center and rebuild the centers,
//!    repeating per the configured [`Policy`].
//! 5. Optionally step the cluster count up or down one at a time, re-running
//!    the fit, until the separation/occupancy verdict flips.
//! 6. Undo the normalization on the way out.
//!
//! Failing to converge is not an error: the fit completes with the best
//! clusters found and `converged = false`, and the caller decides.
//!
//! # Configuration
//!
//! All knobs have builder setters, and the same knobs can be driven from a
//! `key=value:key=value` options string:
//!
//! ```rust
//! use equipart::cluster::{ClusterFactory, Policy, Seeding};
//!
//! let factory = ClusterFactory::new(2)
//!     .with_seed(42)
//!     .configure("ComDefMethod=Distance:ClusteringMethod=Convergence:MaxComVar=1e-5")
//!     .unwrap();
//! assert_eq!(factory.seeding(), Seeding::Distance);
//! assert_eq!(factory.policy(), Policy::Convergence);
//! ```

use log::{debug, info};
use rand::prelude::*;

use super::cluster::Cluster;
use super::point::{CenterOfMass, ClusterPoint};
use super::traits::Clustering;
use crate::error::{Error, Result};

/// How initial cluster centers are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Seeding {
    /// Distinct random points.
    #[default]
    Random,
    /// Max-separation heuristic: the farthest point from the sample center
    /// seeds the first cluster; each later seed must be at least as far
    /// from every placed seed as the farthest point is from the center,
    /// with the threshold halved whenever no candidate qualifies.
    Distance,
}

impl std::str::FromStr for Seeding {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "Random" => Ok(Seeding::Random),
            "Distance" => Ok(Seeding::Distance),
            _ => Err(()),
        }
    }
}

/// How the reassignment loop decides to stop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Run exactly the configured number of passes; convergence is judged
    /// from the final pass's center movement after the fact.
    Iterative,
    /// Stop as soon as the maximum center movement drops below tolerance,
    /// or the iteration limit is hit (reported as not converged).
    #[default]
    Convergence,
}

impl std::str::FromStr for Policy {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "Iterative" => Ok(Policy::Iterative),
            "Convergence" => Ok(Policy::Convergence),
            _ => Err(()),
        }
    }
}

/// The result of a [`ClusterFactory`] fit.
#[derive(Clone, Debug)]
pub struct ClusterFit {
    /// Final clusters, with centers and points in the input coordinate scale.
    pub clusters: Vec<Cluster>,
    /// One cluster index per input point, parallel to the caller's input.
    pub labels: Vec<usize>,
    /// Whole-sample center of mass, in the input coordinate scale.
    pub center: CenterOfMass,
    /// True if the movement tolerance (not the iteration limit) ended the
    /// reassignment loop.
    pub converged: bool,
    /// Reassignment passes performed in the final accepted run.
    pub iterations: usize,
}

/// K-means-style clusterer over weighted points.
#[derive(Clone, Debug)]
pub struct ClusterFactory {
    n_clusters: usize,
    max_iter: usize,
    max_com_var: f64,
    min_points: usize,
    n_com_std_dev: f64,
    manage_clusters: bool,
    seeding: Seeding,
    policy: Policy,
    verbose: bool,
    seed: Option<u64>,
    distance_weights: Option<Vec<f64>>,
    cluster_weights: Vec<Vec<f64>>,
}

impl ClusterFactory {
    /// Create a factory targeting `n_clusters` clusters.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 100,
            max_com_var: 1e-4,
            min_points: 1,
            n_com_std_dev: 1.0,
            manage_clusters: false,
            seeding: Seeding::default(),
            policy: Policy::default(),
            verbose: false,
            seed: None,
            distance_weights: None,
            cluster_weights: Vec::new(),
        }
    }

    /// Set the iteration limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the per-dimension center-movement tolerance.
    ///
    /// The loop tolerance is `max_com_var * n_dims`.
    pub fn with_max_com_var(mut self, max_com_var: f64) -> Self {
        self.max_com_var = max_com_var;
        self
    }

    /// Set the minimum acceptable cluster population (cluster-count
    /// management only).
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Set the minimum inter-cluster separation, in units of combined
    /// cluster dispersion (cluster-count management only).
    pub fn with_n_com_std_dev(mut self, n_com_std_dev: f64) -> Self {
        self.n_com_std_dev = n_com_std_dev;
        self
    }

    /// Enable or disable automatic cluster-count management.
    pub fn with_manage_clusters(mut self, manage: bool) -> Self {
        self.manage_clusters = manage;
        self
    }

    /// Set the center seeding method.
    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }

    /// Set the stopping policy.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Log fit progress at `info` level instead of `debug`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Seed the PRNG used for shuffling and random seeding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-dimension distance weights shared by every cluster.
    pub fn with_distance_weights(mut self, weights: Vec<f64>) -> Self {
        self.distance_weights = Some(weights);
        self
    }

    /// Per-cluster distance-weight overrides; clusters beyond the given
    /// list fall back to the shared weights (or unit weights).
    pub fn with_cluster_weights(mut self, weights: Vec<Vec<f64>>) -> Self {
        self.cluster_weights = weights;
        self
    }

    /// The configured seeding method.
    pub fn seeding(&self) -> Seeding {
        self.seeding
    }

    /// The configured stopping policy.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Apply a `key=value:key=value` options string.
    ///
    /// Recognized keys: `nClusters`, `nIter`, `MaxComVar`, `MinNpoints`,
    /// `nComStdDev`, `ManageClusters`, `ComDefMethod`, `ClusteringMethod`,
    /// `Verbose`.
    pub fn configure(mut self, options: &str) -> Result<Self> {
        for segment in options.split(':').filter(|s| !s.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                return Err(Error::InvalidOption {
                    key: "options",
                    value: segment.to_string(),
                });
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "nClusters" => self.n_clusters = parse_num(value, "nClusters")?,
                "nIter" => self.max_iter = parse_num(value, "nIter")?,
                "MaxComVar" => self.max_com_var = parse_num(value, "MaxComVar")?,
                "MinNpoints" => self.min_points = parse_num(value, "MinNpoints")?,
                "nComStdDev" => self.n_com_std_dev = parse_num(value, "nComStdDev")?,
                "ManageClusters" => self.manage_clusters = parse_bool(value, "ManageClusters")?,
                "Verbose" => self.verbose = parse_bool(value, "Verbose")?,
                "ComDefMethod" => {
                    self.seeding = value.parse().map_err(|()| Error::InvalidOption {
                        key: "ComDefMethod",
                        value: value.to_string(),
                    })?;
                }
                "ClusteringMethod" => {
                    self.policy = value.parse().map_err(|()| Error::InvalidOption {
                        key: "ClusteringMethod",
                        value: value.to_string(),
                    })?;
                }
                _ => {
                    return Err(Error::UnknownOption {
                        key: key.to_string(),
                    })
                }
            }
        }
        Ok(self)
    }

    /// Cluster unit-weight points.
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<ClusterFit> {
        self.fit_weighted(data, &[])
    }

    /// Cluster weighted points.
    ///
    /// An empty `weights` slice means unit weights; otherwise it must be
    /// parallel to `data`.
    pub fn fit_weighted(&self, data: &[Vec<f64>], weights: &[f64]) -> Result<ClusterFit> {
        let n = data.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        let dim = data[0].len();
        if dim == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "must be at least 1",
            });
        }
        for row in data.iter().skip(1) {
            if row.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: row.len(),
                });
            }
        }
        if !weights.is_empty() && weights.len() != n {
            return Err(Error::LengthMismatch {
                values: n,
                weights: weights.len(),
            });
        }
        if weights.iter().any(|&w| w <= 0.0) {
            return Err(Error::InvalidParameter {
                name: "weights",
                message: "point weights must be positive",
            });
        }
        if self.n_clusters == 0 {
            return Err(Error::InvalidParameter {
                name: "n_clusters",
                message: "must be at least 1",
            });
        }
        if self.n_clusters > n {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "n_iter",
                message: "must be at least 1",
            });
        }
        if self.max_com_var <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "max_com_var",
                message: "must be positive",
            });
        }
        for w in self
            .cluster_weights
            .iter()
            .chain(self.distance_weights.as_ref())
        {
            if w.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: w.len(),
                });
            }
            if w.iter().any(|&x| x <= 0.0) {
                return Err(Error::InvalidParameter {
                    name: "distance_weights",
                    message: "must be positive",
                });
            }
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        // Shuffle to decouple seeding from input order, remembering where
        // each point came from so labels can be reported in input order.
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng.as_mut());
        let mut points: Vec<ClusterPoint> = order
            .iter()
            .map(|&i| {
                let w = if weights.is_empty() { 1.0 } else { weights[i] };
                ClusterPoint::with_weight(data[i].clone(), w)
            })
            .collect();

        // Z-score each dimension by its population standard deviation.
        let mut main = CenterOfMass::new(dim);
        for p in &points {
            main.attach(p);
        }
        let sigmas: Vec<f64> = main.variances().iter().map(|&v| v.sqrt()).collect();
        if sigmas.iter().any(|&s| !(s > 0.0)) {
            return Err(Error::DegenerateSample {
                message: "zero-variance dimension",
            });
        }
        for p in &mut points {
            p.scale_down(&sigmas);
        }
        main.scale_down(&sigmas);

        let mut outcome = self.run(self.n_clusters, &points, &main, rng.as_mut())?;

        if self.manage_clusters {
            let shrink = self.cramped(&outcome.clusters);
            loop {
                let k = outcome.clusters.len();
                let next_k = if shrink { k - 1 } else { k + 1 };
                if next_k < 1 || next_k > n {
                    break;
                }
                let trial = self.run(next_k, &points, &main, rng.as_mut())?;
                let trial_cramped = self.cramped(&trial.clusters);
                self.log(format_args!(
                    "cluster-count step to {next_k}: cramped = {trial_cramped}"
                ));
                if shrink {
                    // Keep removing while still cramped; the first relaxed
                    // configuration is the answer.
                    outcome = trial;
                    if !trial_cramped {
                        break;
                    }
                } else {
                    // Keep adding while there is room; back off before the
                    // configuration that became cramped.
                    if trial_cramped {
                        break;
                    }
                    outcome = trial;
                }
            }
        }

        // Back to the caller's coordinate scale.
        for cluster in &mut outcome.clusters {
            cluster.scale_up(&sigmas);
        }
        main.scale_up(&sigmas);

        let mut labels = vec![0usize; n];
        for (shuffled_idx, &original_idx) in order.iter().enumerate() {
            labels[original_idx] = outcome.labels[shuffled_idx];
        }

        self.log(format_args!(
            "fit finished: {} clusters, {} iterations, converged = {}",
            outcome.clusters.len(),
            outcome.iterations,
            outcome.converged
        ));

        Ok(ClusterFit {
            clusters: outcome.clusters,
            labels,
            center: main,
            converged: outcome.converged,
            iterations: outcome.iterations,
        })
    }

    /// One complete clustering run at a fixed cluster count, over
    /// already-normalized points.
    fn run(
        &self,
        k: usize,
        points: &[ClusterPoint],
        main: &CenterOfMass,
        rng: &mut dyn RngCore,
    ) -> Result<RunOutcome> {
        let dim = main.dim();
        let metric = self
            .distance_weights
            .clone()
            .unwrap_or_else(|| vec![1.0; dim]);

        let mut clusters: Vec<Cluster> = (0..k)
            .map(|i| {
                let w = self
                    .cluster_weights
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| metric.clone());
                Cluster::with_weights(w)
            })
            .collect();

        let seeds = match self.seeding {
            Seeding::Random => rand::seq::index::sample(rng, points.len(), k).into_vec(),
            Seeding::Distance => distance_seeds(points, main.values(), k, &metric),
        };

        // Every seed claims its point; then each cluster absorbs its nearest
        // unclaimed points until no dimension has zero variance, so the
        // distance normalization never divides by zero.
        let mut claimed = vec![false; points.len()];
        for (cluster, &s) in clusters.iter_mut().zip(&seeds) {
            cluster.attach(points[s].clone());
            claimed[s] = true;
        }
        for cluster in &mut clusters {
            while cluster.center().any_null_sigma() {
                let mut nearest: Option<(usize, f64)> = None;
                for (i, p) in points.iter().enumerate() {
                    if claimed[i] {
                        continue;
                    }
                    let d = cluster.distance_to_center(p);
                    if nearest.is_none_or(|(_, nd)| d < nd) {
                        nearest = Some((i, d));
                    }
                }
                let Some((i, _)) = nearest else {
                    return Err(Error::DegenerateSample {
                        message: "not enough distinct points to seed every cluster",
                    });
                };
                cluster.attach(points[i].clone());
                claimed[i] = true;
            }
        }

        let tol = self.max_com_var * dim as f64;
        let mut labels = vec![0usize; points.len()];
        let mut iterations = 0;
        let mut converged = false;

        match self.policy {
            Policy::Iterative => {
                let mut movement = f64::INFINITY;
                for _ in 0..self.max_iter {
                    movement = reassign(&mut clusters, points, &mut labels);
                    iterations += 1;
                    debug!("pass {iterations}: max center movement {movement:e}");
                }
                converged = movement <= tol;
            }
            Policy::Convergence => {
                while iterations < self.max_iter {
                    let movement = reassign(&mut clusters, points, &mut labels);
                    iterations += 1;
                    debug!("pass {iterations}: max center movement {movement:e}");
                    if movement <= tol {
                        converged = true;
                        break;
                    }
                }
            }
        }

        Ok(RunOutcome {
            clusters,
            labels,
            converged,
            iterations,
        })
    }

    /// True if any cluster is underpopulated, or any pair of centers sits
    /// closer than `n_com_std_dev² · (dispersion_a + dispersion_b)`.
    fn cramped(&self, clusters: &[Cluster]) -> bool {
        for (i, a) in clusters.iter().enumerate() {
            if a.n_points() < self.min_points {
                return true;
            }
            for b in &clusters[i + 1..] {
                let d = a.weighted_distance(a.center().values(), b.center().values());
                if d < self.n_com_std_dev.powi(2) * (a.dispersion() + b.dispersion()) {
                    return true;
                }
            }
        }
        false
    }

    fn log(&self, args: std::fmt::Arguments<'_>) {
        if self.verbose {
            info!("{args}");
        } else {
            debug!("{args}");
        }
    }
}

impl Clustering for ClusterFactory {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        self.fit(data).map(|fit| fit.labels)
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}

struct RunOutcome {
    clusters: Vec<Cluster>,
    labels: Vec<usize>,
    converged: bool,
    iterations: usize,
}

/// One reassignment pass: every point goes to the nearest center (ties to
/// the lowest cluster index), centers are rebuilt from the new memberships,
/// and a cluster left empty keeps its previous center.
///
/// Returns the maximum squared center movement across clusters.
fn reassign(clusters: &mut [Cluster], points: &[ClusterPoint], labels: &mut [usize]) -> f64 {
    let snapshots: Vec<CenterOfMass> = clusters.iter().map(|c| c.center().clone()).collect();
    for cluster in clusters.iter_mut() {
        cluster.clear();
    }

    for (p, label) in points.iter().zip(labels.iter_mut()) {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (j, cluster) in clusters.iter().enumerate() {
            let d = cluster.weighted_distance(p.values(), snapshots[j].values());
            if d < best_d {
                best_d = d;
                best = j;
            }
        }
        clusters[best].attach(p.clone());
        *label = best;
    }

    let mut max_movement: f64 = 0.0;
    for (cluster, snapshot) in clusters.iter_mut().zip(snapshots) {
        if cluster.n_points() == 0 {
            cluster.set_center(snapshot);
            continue;
        }
        let movement = cluster.weighted_distance(cluster.center().values(), snapshot.values());
        max_movement = max_movement.max(movement);
    }
    max_movement
}

/// Max-separation seeding.
///
/// Points are sorted by distance to the whole-sample center, descending.
/// The farthest point seeds the first cluster; each later seed is the first
/// candidate at least `mindist` (the farthest distance, halved every time
/// the candidate list is exhausted) away from every placed seed.
fn distance_seeds(points: &[ClusterPoint], center: &[f64], k: usize, metric: &[f64]) -> Vec<usize> {
    let dists: Vec<f64> = points
        .iter()
        .map(|p| weighted_sq(p.values(), center, metric))
        .collect();
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| dists[b].total_cmp(&dists[a]));

    let mut seeds = vec![order[0]];
    let mut mindist = dists[order[0]];
    while seeds.len() < k {
        let mut placed = false;
        for &cand in &order[1..] {
            if seeds.contains(&cand) {
                continue;
            }
            let far_enough = seeds
                .iter()
                .all(|&s| weighted_sq(points[cand].values(), points[s].values(), metric) >= mindist);
            if far_enough {
                seeds.push(cand);
                placed = true;
                break;
            }
        }
        if !placed {
            // Pathological geometries can starve the threshold; halving it
            // guarantees termination.
            mindist *= 0.5;
        }
    }
    seeds
}

#[inline]
fn weighted_sq(a: &[f64], b: &[f64], weights: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .zip(weights)
        .map(|((&ai, &bi), &wi)| {
            let d = (bi - ai) / wi;
            d * d
        })
        .sum()
}

fn parse_num<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidOption {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(value: &str, key: &'static str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidOption {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two tight, well-separated diagonal blobs of ten points each.
    fn two_blobs() -> Vec<Vec<f64>> {
        let mut data = Vec::with_capacity(20);
        for i in 0..10 {
            let t = f64::from(i) * 0.01;
            data.push(vec![t, -t]);
        }
        for i in 0..10 {
            let t = f64::from(i) * 0.01;
            data.push(vec![10.0 + t, 10.0 - t]);
        }
        data
    }

    fn purity(labels: &[usize]) -> bool {
        let a = labels[0];
        let b = labels[10];
        a != b
            && labels[..10].iter().all(|&l| l == a)
            && labels[10..].iter().all(|&l| l == b)
    }

    #[test]
    fn test_two_blobs_distance_seeding() {
        let data = two_blobs();
        let fit = ClusterFactory::new(2)
            .with_seeding(Seeding::Distance)
            .with_policy(Policy::Convergence)
            .with_seed(7)
            .fit(&data)
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.clusters.len(), 2);
        assert!(purity(&fit.labels), "labels split across blobs");

        // Centers come back in the input scale, one per blob.
        let mut xs: Vec<f64> = fit
            .clusters
            .iter()
            .map(|c| c.center().values()[0])
            .collect();
        xs.sort_by(f64::total_cmp);
        assert!(xs[0] < 1.0 && xs[1] > 9.0);

        // The aggregate center sits between the blobs.
        assert!(fit.center.values()[0] > 4.0 && fit.center.values()[0] < 6.0);
    }

    #[test]
    fn test_huge_tolerance_converges_in_one_pass() {
        let data = two_blobs();
        let fit = ClusterFactory::new(2)
            .with_policy(Policy::Convergence)
            .with_max_com_var(1e9)
            .with_seed(3)
            .fit(&data)
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.iterations, 1);
    }

    #[test]
    fn test_iterative_runs_exact_pass_count() {
        let data = two_blobs();
        let fit = ClusterFactory::new(2)
            .with_policy(Policy::Iterative)
            .with_max_iter(5)
            .with_seed(11)
            .fit(&data)
            .unwrap();

        assert_eq!(fit.iterations, 5);
    }

    #[test]
    fn test_manage_grows_to_blob_count() {
        // Start from one cluster; management should add a second (both blobs
        // well separated) and then refuse a third.
        let data = two_blobs();
        let fit = ClusterFactory::new(1)
            .with_seeding(Seeding::Distance)
            .with_manage_clusters(true)
            .with_n_com_std_dev(3.0)
            .with_min_points(2)
            .with_seed(19)
            .fit(&data)
            .unwrap();

        assert_eq!(fit.clusters.len(), 2);
        assert!(purity(&fit.labels));
    }

    #[test]
    fn test_manage_shrinks_crowded_clusters() {
        // Four requested clusters over two blobs forces at least one pair of
        // centers into the same blob; management should settle on two.
        let data = two_blobs();
        let fit = ClusterFactory::new(4)
            .with_seeding(Seeding::Distance)
            .with_manage_clusters(true)
            .with_n_com_std_dev(3.0)
            .with_min_points(2)
            .with_seed(23)
            .fit(&data)
            .unwrap();

        assert_eq!(fit.clusters.len(), 2);
    }

    #[test]
    fn test_weighted_fit_conserves_weight() {
        let data = two_blobs();
        let weights: Vec<f64> = (0..20).map(|i| 1.0 + f64::from(i % 3)).collect();
        let total: f64 = weights.iter().sum();

        let fit = ClusterFactory::new(2)
            .with_seeding(Seeding::Distance)
            .with_seed(5)
            .fit_weighted(&data, &weights)
            .unwrap();

        let clustered: f64 = fit.clusters.iter().map(|c| c.center().weight()).sum();
        assert!((clustered - total).abs() < 1e-9);
        assert!((fit.center.weight() - total).abs() < 1e-9);
    }

    #[test]
    fn test_fit_predict_trait() {
        let data = two_blobs();
        let factory = ClusterFactory::new(2).with_seed(1);
        let labels = factory.fit_predict(&data).unwrap();

        assert_eq!(labels.len(), data.len());
        assert!(labels.iter().all(|&l| l < 2));
        assert_eq!(factory.n_clusters(), 2);
    }

    #[test]
    fn test_configure_round_trip() {
        let factory = ClusterFactory::new(2)
            .configure(
                "nClusters=4:nIter=7:MaxComVar=0.5:MinNpoints=3:nComStdDev=2.5:\
                 ManageClusters=true:ComDefMethod=Distance:ClusteringMethod=Iterative:Verbose=true",
            )
            .unwrap();

        assert_eq!(factory.n_clusters, 4);
        assert_eq!(factory.max_iter, 7);
        assert_eq!(factory.max_com_var, 0.5);
        assert_eq!(factory.min_points, 3);
        assert_eq!(factory.n_com_std_dev, 2.5);
        assert!(factory.manage_clusters);
        assert_eq!(factory.seeding, Seeding::Distance);
        assert_eq!(factory.policy, Policy::Iterative);
        assert!(factory.verbose);
    }

    #[test]
    fn test_configure_rejects_unknown_key() {
        let err = ClusterFactory::new(2).configure("noSuchKey=1").unwrap_err();
        assert!(matches!(err, Error::UnknownOption { .. }));
    }

    #[test]
    fn test_configure_rejects_bad_value() {
        let err = ClusterFactory::new(2)
            .configure("nClusters=many")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOption {
                key: "nClusters",
                ..
            }
        ));

        let err = ClusterFactory::new(2)
            .configure("ComDefMethod=Fancy")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOption {
                key: "ComDefMethod",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            ClusterFactory::new(2).fit(&[]).unwrap_err(),
            Error::EmptyInput
        ));

        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            ClusterFactory::new(1).fit(&ragged).unwrap_err(),
            Error::DimensionMismatch { .. }
        ));

        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        assert!(matches!(
            ClusterFactory::new(5).fit(&data).unwrap_err(),
            Error::InvalidClusterCount {
                requested: 5,
                n_items: 2
            }
        ));
    }

    #[test]
    fn test_zero_variance_dimension_is_degenerate() {
        // Second dimension is constant across the sample.
        let data = vec![vec![0.0, 1.0], vec![1.0, 1.0], vec![2.0, 1.0]];
        let err = ClusterFactory::new(2).with_seed(1).fit(&data).unwrap_err();
        assert!(matches!(err, Error::DegenerateSample { .. }));
    }

    #[test]
    fn test_distance_seeds_pick_opposite_blobs() {
        let points: Vec<ClusterPoint> = two_blobs().into_iter().map(ClusterPoint::new).collect();
        let mut main = CenterOfMass::new(2);
        for p in &points {
            main.attach(p);
        }
        let metric = vec![1.0, 1.0];
        let seeds = distance_seeds(&points, main.values(), 2, &metric);

        assert_eq!(seeds.len(), 2);
        // One seed per blob (indices 0..10 vs 10..20).
        assert_ne!(seeds[0] < 10, seeds[1] < 10);
    }
}

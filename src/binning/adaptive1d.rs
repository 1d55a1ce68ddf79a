//! Occupancy-balancing 1D binning.
//!
//! Given a value/weight sample and a target per-bin occupancy, partition the
//! range `[vmin, vmax)` into contiguous bins of roughly equal weighted
//! occupancy:
//!
//! 1. Keep only points with `value ∈ [vmin, vmax)`.
//! 2. `nbins = floor(total_weight / occupancy)`.
//! 3. Sort ascending, then sweep left to right. Each bin's target is
//!    `remaining_weight / bins_left`, recomputed after every bin, so a bin
//!    that overshoots (it always closes on a whole point) borrows from the
//!    bins still to come rather than from all of them.
//! 4. A bin's lower edge is the value of the first point it received; the
//!    first bin's lower edge is then pinned to `vmin`.
//!
//! The result is an edge list of `nbins + 1` values, ready to become the
//! variable-width axis of whatever histogram type the caller uses.

use crate::error::{Error, Result};

/// A 1D accumulator bin.
///
/// Tracks its bounds, the number of fills, and the accumulated weight.
/// Range filtering happens in the binner; the bin itself accepts every fill.
#[derive(Clone, Debug)]
pub struct Bin1d {
    min: f64,
    max: f64,
    entries: usize,
    sum_of_weights: f64,
}

impl Bin1d {
    fn new(max: f64) -> Self {
        // `min` starts at `max` and is set by the first fill.
        Self {
            min: max,
            max,
            entries: 0,
            sum_of_weights: 0.0,
        }
    }

    fn fill(&mut self, value: f64, weight: f64) {
        if self.entries == 0 {
            self.min = value;
        }
        self.entries += 1;
        self.sum_of_weights += weight;
    }

    /// Lower edge of the bin.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the bin (shared upper bound of the binning range).
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of points filled into the bin.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Accumulated weight.
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }
}

/// Occupancy-balancing 1D binner.
#[derive(Clone, Debug)]
pub struct AdaptiveBinning1d {
    occupancy: f64,
    vmin: f64,
    vmax: f64,
}

impl AdaptiveBinning1d {
    /// Create a binner targeting `occupancy` weight per bin over `[vmin, vmax)`.
    pub fn new(occupancy: f64, vmin: f64, vmax: f64) -> Self {
        Self {
            occupancy,
            vmin,
            vmax,
        }
    }

    /// Partition the sample into bins of roughly equal weighted occupancy.
    ///
    /// An empty `weights` slice means unit weights; otherwise it must be
    /// parallel to `values`. Points outside `[vmin, vmax)` are ignored.
    pub fn fit(&self, values: &[f64], weights: &[f64]) -> Result<Binning1d> {
        if self.occupancy <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "occupancy",
                message: "must be positive",
            });
        }
        if !(self.vmin < self.vmax) {
            return Err(Error::InvalidParameter {
                name: "range",
                message: "vmin must be less than vmax",
            });
        }
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        if !weights.is_empty() && weights.len() != values.len() {
            return Err(Error::LengthMismatch {
                values: values.len(),
                weights: weights.len(),
            });
        }

        let mut sample: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v >= self.vmin && v < self.vmax)
            .map(|(i, &v)| (v, if weights.is_empty() { 1.0 } else { weights[i] }))
            .collect();

        let total_weight: f64 = sample.iter().map(|&(_, w)| w).sum();
        let nbins = (total_weight / self.occupancy).floor() as usize;
        if nbins == 0 {
            return Err(Error::OccupancyTooLarge {
                occupancy: self.occupancy,
                total_weight,
            });
        }

        sample.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut bins: Vec<Bin1d> = (0..nbins).map(|_| Bin1d::new(self.vmax)).collect();

        // Greedy sweep. The target is recomputed from the weight still
        // undistributed, so overshoot in one bin only narrows the bins after it.
        let mut remaining = total_weight;
        let mut idx = 0;
        for b in 0..nbins {
            let target = remaining / (nbins - b) as f64;
            while idx < sample.len() && bins[b].sum_of_weights() < target {
                let (v, w) = sample[idx];
                bins[b].fill(v, w);
                idx += 1;
            }
            remaining -= bins[b].sum_of_weights();
        }
        // Anything left over lands in the last bin.
        while idx < sample.len() {
            let (v, w) = sample[idx];
            bins[nbins - 1].fill(v, w);
            idx += 1;
        }

        // The first edge is the range start, not the first point.
        bins[0].min = self.vmin;

        Ok(Binning1d {
            bins,
            vmin: self.vmin,
            vmax: self.vmax,
        })
    }
}

/// An ordered 1D partition produced by [`AdaptiveBinning1d`].
///
/// Bins are contiguous and ordered by lower edge; the first bin starts at
/// the range minimum and every bin shares the range maximum as upper bound.
#[derive(Clone, Debug)]
pub struct Binning1d {
    bins: Vec<Bin1d>,
    vmin: f64,
    vmax: f64,
}

impl Binning1d {
    /// The bins, ordered by lower edge.
    pub fn bins(&self) -> &[Bin1d] {
        &self.bins
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    /// Binning range `(vmin, vmax)`.
    pub fn range(&self) -> (f64, f64) {
        (self.vmin, self.vmax)
    }

    /// The `n_bins + 1` edges: each bin's lower edge followed by the range
    /// maximum.
    pub fn edges(&self) -> Vec<f64> {
        let mut edges: Vec<f64> = self.bins.iter().map(Bin1d::min).collect();
        edges.push(self.vmax);
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_weights_ten_points() {
        // 10 unit-weight points, occupancy 3 -> floor(10/3) = 3 bins.
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let binning = AdaptiveBinning1d::new(3.0, 0.0, 10.0)
            .fit(&values, &[])
            .unwrap();

        assert_eq!(binning.n_bins(), 3);

        let edges = binning.edges();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0], 0.0);
        assert_eq!(edges[3], 10.0);
        for pair in edges.windows(2) {
            assert!(pair[0] < pair[1]);
        }

        // Each bin holds roughly 3 weight; the total is conserved.
        let total: f64 = binning.bins().iter().map(Bin1d::sum_of_weights).sum();
        assert_eq!(total, 10.0);
        for bin in binning.bins() {
            assert!(bin.sum_of_weights() >= 3.0);
        }
    }

    #[test]
    fn test_interior_edges_follow_first_fill() {
        // With sorted integer values 0..9 and occupancy 3 the greedy sweep
        // closes bins after points {3} and {6}; the interior lower edges are
        // the first values filled into bins 1 and 2.
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let binning = AdaptiveBinning1d::new(3.0, 0.0, 10.0)
            .fit(&values, &[])
            .unwrap();

        let edges = binning.edges();
        assert_eq!(edges, vec![0.0, 4.0, 7.0, 10.0]);
        assert_eq!(binning.bins()[1].min(), 4.0);
        assert_eq!(binning.bins()[2].min(), 7.0);
    }

    #[test]
    fn test_weight_conservation_with_weights() {
        let values = vec![0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5];
        let weights = vec![1.0, 2.0, 1.0, 3.0, 1.0, 2.0, 1.0, 1.0];
        let binning = AdaptiveBinning1d::new(4.0, 0.0, 8.0)
            .fit(&values, &weights)
            .unwrap();

        assert_eq!(binning.n_bins(), 3);
        let total: f64 = binning.bins().iter().map(Bin1d::sum_of_weights).sum();
        assert!((total - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_points_ignored() {
        let values = vec![-5.0, 0.0, 1.0, 2.0, 3.0, 10.0, 42.0];
        let binning = AdaptiveBinning1d::new(2.0, 0.0, 10.0)
            .fit(&values, &[])
            .unwrap();

        // Only {0, 1, 2, 3} are in range: 4 weight, 2 bins.
        assert_eq!(binning.n_bins(), 2);
        let total: f64 = binning.bins().iter().map(Bin1d::sum_of_weights).sum();
        assert_eq!(total, 4.0);
        let entries: usize = binning.bins().iter().map(Bin1d::entries).sum();
        assert_eq!(entries, 4);
    }

    #[test]
    fn test_leftovers_go_to_last_bin() {
        // Occupancy equal to total weight over 2: the second bin must absorb
        // everything the first one did not take.
        let values = vec![1.0, 2.0, 3.0, 4.0];
        let binning = AdaptiveBinning1d::new(2.0, 0.0, 10.0)
            .fit(&values, &[])
            .unwrap();

        assert_eq!(binning.n_bins(), 2);
        let entries: usize = binning.bins().iter().map(Bin1d::entries).sum();
        assert_eq!(entries, 4);
    }

    #[test]
    fn test_occupancy_too_large() {
        let values = vec![1.0, 2.0, 3.0];
        let err = AdaptiveBinning1d::new(10.0, 0.0, 10.0)
            .fit(&values, &[])
            .unwrap_err();
        assert!(matches!(err, Error::OccupancyTooLarge { .. }));
    }

    #[test]
    fn test_length_mismatch() {
        let err = AdaptiveBinning1d::new(1.0, 0.0, 10.0)
            .fit(&[1.0, 2.0, 3.0], &[1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                values: 3,
                weights: 1
            }
        ));
    }

    #[test]
    fn test_invalid_params() {
        assert!(AdaptiveBinning1d::new(0.0, 0.0, 1.0)
            .fit(&[1.0], &[])
            .is_err());
        assert!(AdaptiveBinning1d::new(1.0, 1.0, 1.0)
            .fit(&[1.0], &[])
            .is_err());
        assert!(AdaptiveBinning1d::new(1.0, 0.0, 1.0).fit(&[], &[]).is_err());
    }
}

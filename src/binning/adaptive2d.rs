//! Recursive median-split 2D binning.
//!
//! Given an `(x, y, weight)` sample and a minimum per-bin occupancy, build a
//! partition of the bounding rectangle into `2^r` cells of roughly equal
//! weight, where `r = floor(log2(total_weight / min_occupancy))`:
//!
//! 1. Pad the bounds outward by `delta`, half of half the smallest nonzero
//!    gap between adjacent sample values. Containment tests are strict, so
//!    the padding keeps every point off every boundary.
//! 2. Seed one bin over the padded bounds.
//! 3. For each round, re-fill every bin from the full sample and bisect it
//!    at its weighted median. The split axis is whichever axis has its
//!    median better centered relative to the full data range, which keeps
//!    cell aspect ratios from degenerating as rounds accumulate.
//! 4. After the last round, one more full re-fill gives every leaf its
//!    final occupancy, point extrema, and medians.
//!
//! An "adjusted" copy of the partition is also produced: any cell face still
//! lying on the padded outer boundary is pulled in to that cell's own point
//! extreme (± `delta`), so the outermost cells hug the data instead of the
//! padding.

use crate::error::{Error, Result};

/// A 2D accumulator bin over a half-open rectangle.
///
/// Containment is strict on all four faces: a point exactly on a boundary
/// belongs to no bin. The construction pads the outer bounds so that cannot
/// happen for sample points.
#[derive(Clone, Debug)]
pub struct Bin2d {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    // Counts every fill attempt, in-bin or not; only in-bin points reach
    // `sum_of_weights` and the point lists.
    entries: usize,
    sum_of_weights: f64,
    xs: Vec<f64>,
    ys: Vec<f64>,
    ws: Vec<f64>,
    xmin_pt: f64,
    xmax_pt: f64,
    ymin_pt: f64,
    ymax_pt: f64,
}

impl Bin2d {
    fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            entries: 0,
            sum_of_weights: 0.0,
            xs: Vec::new(),
            ys: Vec::new(),
            ws: Vec::new(),
            xmin_pt: f64::NAN,
            xmax_pt: f64::NAN,
            ymin_pt: f64::NAN,
            ymax_pt: f64::NAN,
        }
    }

    /// Strict containment: `x ∈ (xmin, xmax)` and `y ∈ (ymin, ymax)`.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.xmin && x < self.xmax && y > self.ymin && y < self.ymax
    }

    fn fill(&mut self, x: f64, y: f64, w: f64) {
        self.entries += 1;
        if !self.contains(x, y) {
            return;
        }
        if self.xs.is_empty() {
            self.xmin_pt = x;
            self.xmax_pt = x;
            self.ymin_pt = y;
            self.ymax_pt = y;
        } else {
            self.xmin_pt = self.xmin_pt.min(x);
            self.xmax_pt = self.xmax_pt.max(x);
            self.ymin_pt = self.ymin_pt.min(y);
            self.ymax_pt = self.ymax_pt.max(y);
        }
        self.xs.push(x);
        self.ys.push(y);
        self.ws.push(w);
        self.sum_of_weights += w;
    }

    fn clear_points(&mut self) {
        self.entries = 0;
        self.sum_of_weights = 0.0;
        self.xs.clear();
        self.ys.clear();
        self.ws.clear();
        self.xmin_pt = f64::NAN;
        self.xmax_pt = f64::NAN;
        self.ymin_pt = f64::NAN;
        self.ymax_pt = f64::NAN;
    }

    /// Bisect the filled bin at its weighted median, returning both halves
    /// as fresh empty bins.
    ///
    /// `xrange` and `yrange` are the full (padded) extents of the partition;
    /// the split goes to the axis whose median is better centered relative
    /// to its extent.
    fn split(self, xrange: f64, yrange: f64) -> (Bin2d, Bin2d) {
        let (xmed, ymed) = if self.xs.is_empty() {
            // No points, no medians: bisect geometrically.
            (
                0.5 * (self.xmin + self.xmax),
                0.5 * (self.ymin + self.ymax),
            )
        } else {
            (
                weighted_median(&self.xs, &self.ws),
                weighted_median(&self.ys, &self.ws),
            )
        };

        let xbalance = (xmed - self.xmin).min(self.xmax - xmed) / xrange;
        let ybalance = (ymed - self.ymin).min(self.ymax - ymed) / yrange;

        if xbalance > ybalance {
            (
                Bin2d::new(self.xmin, xmed, self.ymin, self.ymax),
                Bin2d::new(xmed, self.xmax, self.ymin, self.ymax),
            )
        } else {
            (
                Bin2d::new(self.xmin, self.xmax, self.ymin, ymed),
                Bin2d::new(self.xmin, self.xmax, ymed, self.ymax),
            )
        }
    }

    /// Lower x bound.
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    /// Upper x bound.
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    /// Lower y bound.
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    /// Upper y bound.
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// The rectangle as `(xmin, ymin, xmax, ymax)`.
    pub fn rect(&self) -> (f64, f64, f64, f64) {
        (self.xmin, self.ymin, self.xmax, self.ymax)
    }

    /// Number of fill attempts (including points outside the bin).
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Accumulated weight of the points inside the bin.
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }

    /// Number of points inside the bin.
    pub fn n_points(&self) -> usize {
        self.xs.len()
    }

    /// Weighted median of the contained x values.
    pub fn median_x(&self) -> Option<f64> {
        (!self.xs.is_empty()).then(|| weighted_median(&self.xs, &self.ws))
    }

    /// Weighted median of the contained y values.
    pub fn median_y(&self) -> Option<f64> {
        (!self.ys.is_empty()).then(|| weighted_median(&self.ys, &self.ws))
    }
}

/// Weighted median: the midpoint of the two values straddling the spot where
/// cumulative weight first reaches half the total.
///
/// Integer-weight convention: an even total splits at exactly half, an odd
/// total at `(total - 1) / 2`.
pub(crate) fn weighted_median(values: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(values.len(), weights.len());
    debug_assert!(!values.is_empty());

    let mut pairs: Vec<(f64, f64)> = values
        .iter()
        .copied()
        .zip(weights.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total: f64 = pairs.iter().map(|&(_, w)| w).sum();
    let half = if total % 2.0 == 0.0 {
        total / 2.0
    } else {
        (total - 1.0) / 2.0
    };

    let mut cum = 0.0;
    let mut i = 0;
    while i + 1 < pairs.len() {
        cum += pairs[i].1;
        if cum >= half {
            break;
        }
        i += 1;
    }
    let right = (i + 1).min(pairs.len() - 1);
    0.5 * (pairs[i].0 + pairs[right].0)
}

/// Recursive median-split 2D binner.
#[derive(Clone, Debug)]
pub struct AdaptiveBinning2d {
    min_occupancy: f64,
    xrange: (f64, f64),
    yrange: (f64, f64),
}

impl AdaptiveBinning2d {
    /// Create a binner with a minimum per-bin occupancy over the given
    /// x and y ranges.
    pub fn new(min_occupancy: f64, xrange: (f64, f64), yrange: (f64, f64)) -> Self {
        Self {
            min_occupancy,
            xrange,
            yrange,
        }
    }

    /// Build the partition for an `(x, y, weight)` sample.
    ///
    /// An empty `weights` slice means unit weights; otherwise it must be
    /// parallel to `xs`/`ys`.
    pub fn fit(&self, xs: &[f64], ys: &[f64], weights: &[f64]) -> Result<Binning2d> {
        if self.min_occupancy <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "min_occupancy",
                message: "must be positive",
            });
        }
        if !(self.xrange.0 < self.xrange.1) || !(self.yrange.0 < self.yrange.1) {
            return Err(Error::InvalidParameter {
                name: "range",
                message: "range minimum must be less than maximum",
            });
        }
        if xs.is_empty() {
            return Err(Error::EmptyInput);
        }
        if xs.len() != ys.len() {
            return Err(Error::LengthMismatch {
                values: xs.len(),
                weights: ys.len(),
            });
        }
        if !weights.is_empty() && weights.len() != xs.len() {
            return Err(Error::LengthMismatch {
                values: xs.len(),
                weights: weights.len(),
            });
        }

        let n = xs.len();
        let ws: Vec<f64> = if weights.is_empty() {
            vec![1.0; n]
        } else {
            weights.to_vec()
        };

        // Padding margin: half the smallest per-axis half-gap. Guards the
        // strict containment test against points on a boundary.
        let hx = half_min_gap(xs).ok_or(Error::DegenerateSample {
            message: "all x values are identical",
        })?;
        let hy = half_min_gap(ys).ok_or(Error::DegenerateSample {
            message: "all y values are identical",
        })?;
        let delta = 0.5 * hx.min(hy);

        let pxlo = self.xrange.0 - delta;
        let pxhi = self.xrange.1 + delta;
        let pylo = self.yrange.0 - delta;
        let pyhi = self.yrange.1 + delta;
        let xextent = pxhi - pxlo;
        let yextent = pyhi - pylo;

        let total_weight: f64 = ws.iter().sum();
        let rounds = (total_weight / self.min_occupancy).log2().floor();
        if !(rounds >= 1.0) {
            return Err(Error::OccupancyTooLarge {
                occupancy: self.min_occupancy,
                total_weight,
            });
        }
        let rounds = rounds as usize;

        let mut bins = vec![Bin2d::new(pxlo, pxhi, pylo, pyhi)];
        for _ in 0..rounds {
            let mut next = Vec::with_capacity(bins.len() * 2);
            for mut bin in bins {
                bin.clear_points();
                for i in 0..n {
                    bin.fill(xs[i], ys[i], ws[i]);
                }
                let (a, b) = bin.split(xextent, yextent);
                next.push(a);
                next.push(b);
            }
            bins = next;
        }

        // Every split so far was filled against intermediate bounds; one last
        // pass gives each leaf its final occupancy and extrema.
        for bin in &mut bins {
            bin.clear_points();
            for i in 0..n {
                bin.fill(xs[i], ys[i], ws[i]);
            }
        }

        // Adjusted copies: outer faces move in to the cell's own data extent,
        // keeping the same safety margin.
        let adjusted: Vec<Bin2d> = bins
            .iter()
            .map(|bin| {
                let mut adj = bin.clone();
                if !bin.xs.is_empty() {
                    if adj.xmin == pxlo {
                        adj.xmin = bin.xmin_pt - delta;
                    }
                    if adj.xmax == pxhi {
                        adj.xmax = bin.xmax_pt + delta;
                    }
                    if adj.ymin == pylo {
                        adj.ymin = bin.ymin_pt - delta;
                    }
                    if adj.ymax == pyhi {
                        adj.ymax = bin.ymax_pt + delta;
                    }
                }
                adj
            })
            .collect();

        Ok(Binning2d {
            bins,
            adjusted,
            delta,
            rounds,
        })
    }
}

/// Half the smallest nonzero gap between adjacent sorted values, or `None`
/// when every value is identical.
fn half_min_gap(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut best: Option<f64> = None;
    for pair in sorted.windows(2) {
        let gap = pair[1] - pair[0];
        if gap > 0.0 && best.is_none_or(|b| gap < b) {
            best = Some(gap);
        }
    }
    best.map(|g| 0.5 * g)
}

/// A 2D partition produced by [`AdaptiveBinning2d`].
#[derive(Clone, Debug)]
pub struct Binning2d {
    bins: Vec<Bin2d>,
    adjusted: Vec<Bin2d>,
    delta: f64,
    rounds: usize,
}

impl Binning2d {
    /// The raw partition cells.
    pub fn bins(&self) -> &[Bin2d] {
        &self.bins
    }

    /// The adjusted cells (outer faces pulled in to the data extent).
    pub fn adjusted_bins(&self) -> &[Bin2d] {
        &self.adjusted
    }

    /// Number of cells (`2^rounds`).
    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    /// Number of split rounds performed.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The padding margin applied to the outer bounds.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// The raw cells as `(xmin, ymin, xmax, ymax)` rectangles.
    pub fn rectangles(&self) -> Vec<(f64, f64, f64, f64)> {
        self.bins.iter().map(Bin2d::rect).collect()
    }

    /// The adjusted cells as `(xmin, ymin, xmax, ymax)` rectangles.
    pub fn adjusted_rectangles(&self) -> Vec<(f64, f64, f64, f64)> {
        self.adjusted.iter().map(Bin2d::rect).collect()
    }
}

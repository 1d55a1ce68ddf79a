//! Adaptive histogram binning for weighted samples.
//!
//! Fixed-width bins waste resolution where data is dense and starve bins
//! where it is sparse. The binners in this module instead size bins from the
//! data itself, so every bin ends up with roughly the same weighted
//! occupancy.
//!
//! ## Algorithms
//!
//! ### Occupancy balancing (1D)
//!
//! [`AdaptiveBinning1d`] sorts the sample and distributes it greedily into
//! `floor(total_weight / occupancy)` bins, re-targeting the per-bin weight
//! after each bin so rounding error shifts forward instead of compounding.
//!
//! ### Recursive median split (2D)
//!
//! [`AdaptiveBinning2d`] starts from one bounding rectangle and repeatedly
//! bisects every bin at its weighted median, choosing per split whichever
//! axis keeps bin shapes balanced. After `r` rounds the partition has `2^r`
//! rectangles of roughly equal weight, plus an "adjusted" variant whose
//! outer faces are pulled in to the true data extent.
//!
//! ## Usage
//!
//! ```rust
//! use equipart::binning::AdaptiveBinning1d;
//!
//! let values: Vec<f64> = (0..10).map(f64::from).collect();
//!
//! // Unit weights, ~3 weight per bin over [0, 10).
//! let binning = AdaptiveBinning1d::new(3.0, 0.0, 10.0)
//!     .fit(&values, &[])
//!     .unwrap();
//!
//! assert_eq!(binning.n_bins(), 3);
//! let edges = binning.edges();
//! assert_eq!(edges.len(), 4);
//! assert_eq!(edges[0], 0.0);
//! assert_eq!(edges[3], 10.0);
//! ```
//!
//! The outputs are plain data: a `Vec<f64>` of edges in 1D, a list of
//! `(xmin, ymin, xmax, ymax)` rectangles in 2D. Neither binner knows about
//! any histogram type.

mod adaptive1d;
mod adaptive2d;

pub use adaptive1d::{AdaptiveBinning1d, Bin1d, Binning1d};
pub use adaptive2d::{AdaptiveBinning2d, Bin2d, Binning2d};

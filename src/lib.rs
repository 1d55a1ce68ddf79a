//! Adaptive binning and clustering primitives for weighted samples.
//!
//! `equipart` partitions weighted numeric samples two ways:
//!
//! - [`binning`] builds histogram partitions whose bins hold roughly equal
//!   weight: an occupancy-balancing 1D binner and a recursive median-split
//!   2D binner. Outputs are plain edge lists and rectangle lists; turning
//!   them into histogram objects is the caller's business.
//! - [`cluster`] groups points: a k-means-style [`cluster::ClusterFactory`]
//!   with pluggable seeding, convergence policies, and optional automatic
//!   cluster-count management.

#![forbid(unsafe_code)]

pub mod binning;
pub mod cluster;
pub mod error;

pub use binning::{AdaptiveBinning1d, AdaptiveBinning2d, Bin1d, Bin2d, Binning1d, Binning2d};
pub use cluster::{
    CenterOfMass, Cluster, ClusterFactory, ClusterFit, ClusterPoint, Clustering, Policy, Seeding,
};
pub use error::{Error, Result};

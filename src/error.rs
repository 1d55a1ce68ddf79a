use thiserror::Error;

/// Errors returned by binning and clustering algorithms in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Parallel value/weight arrays have different lengths.
    ///
    /// An empty weights array is allowed (it means unit weights); a non-empty
    /// one must match the values array exactly.
    #[error("length mismatch: {values} values vs {weights} weights")]
    LengthMismatch {
        /// Number of values.
        values: usize,
        /// Number of weights.
        weights: usize,
    },

    /// Requested per-bin occupancy exceeds the total available weight.
    #[error("occupancy too large: {occupancy} per bin, but only {total_weight} total weight")]
    OccupancyTooLarge {
        /// Requested occupancy.
        occupancy: f64,
        /// Sum of weights actually available.
        total_weight: f64,
    },

    /// The sample cannot support the requested computation without dividing
    /// by zero (all values identical, a zero-variance dimension, too few
    /// distinct points to seed every cluster).
    #[error("degenerate sample: {message}")]
    DegenerateSample {
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// An options string contained a key this crate does not recognize.
    #[error("unknown option key: {key}")]
    UnknownOption {
        /// The unrecognized key.
        key: String,
    },

    /// An options string contained a value that does not parse for its key.
    #[error("invalid value for option {key}: {value}")]
    InvalidOption {
        /// Option key.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

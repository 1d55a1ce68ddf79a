//! Weighted points and streaming centers of mass.

/// A weighted point in an n-dimensional sample.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPoint {
    values: Vec<f64>,
    weight: f64,
}

impl ClusterPoint {
    /// A unit-weight point.
    pub fn new(values: Vec<f64>) -> Self {
        Self::with_weight(values, 1.0)
    }

    /// A point with an explicit weight.
    pub fn with_weight(values: Vec<f64>, weight: f64) -> Self {
        Self { values, weight }
    }

    /// Coordinate values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Point weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Dimensionality.
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Divide each coordinate by the matching factor.
    pub(crate) fn scale_down(&mut self, factors: &[f64]) {
        for (v, f) in self.values.iter_mut().zip(factors) {
            *v /= f;
        }
    }

    /// Multiply each coordinate by the matching factor.
    pub(crate) fn scale_up(&mut self, factors: &[f64]) {
        for (v, f) in self.values.iter_mut().zip(factors) {
            *v *= f;
        }
    }
}

/// A running weighted mean over an evolving set of points.
///
/// Alongside the mean it maintains the weighted mean of squares per
/// dimension, so per-dimension variances are available without retaining
/// the points themselves.
#[derive(Clone, Debug)]
pub struct CenterOfMass {
    point: ClusterPoint,
    mean_of_squares: Vec<f64>,
}

impl CenterOfMass {
    /// An empty (zero-weight) center of the given dimensionality.
    pub fn new(dim: usize) -> Self {
        Self {
            point: ClusterPoint::with_weight(vec![0.0; dim], 0.0),
            mean_of_squares: vec![0.0; dim],
        }
    }

    /// Fold a point into the running mean.
    ///
    /// Standard streaming recurrence: with accumulated weight `W` and
    /// incoming weight `w`, `mean' = (W·mean + w·v) / (W + w)` per dimension,
    /// and likewise for the mean of squares.
    pub fn attach(&mut self, point: &ClusterPoint) {
        let w0 = self.point.weight;
        let w = point.weight();
        let total = w0 + w;
        for i in 0..self.mean_of_squares.len() {
            let v = point.values()[i];
            self.point.values[i] = (w0 * self.point.values[i] + w * v) / total;
            self.mean_of_squares[i] = (w0 * self.mean_of_squares[i] + w * v * v) / total;
        }
        self.point.weight = total;
    }

    /// True if any dimension has exactly zero variance.
    ///
    /// A freshly seeded center (one point, or several identical ones) always
    /// reports true; attaching a point that differs in every dimension
    /// clears it.
    pub fn any_null_sigma(&self) -> bool {
        self.point
            .values
            .iter()
            .zip(&self.mean_of_squares)
            .any(|(&m, &s)| s - m * m == 0.0)
    }

    /// Per-dimension variances, `E[v²] - E[v]²`.
    pub fn variances(&self) -> Vec<f64> {
        self.point
            .values
            .iter()
            .zip(&self.mean_of_squares)
            .map(|(&m, &s)| s - m * m)
            .collect()
    }

    /// Mean position.
    pub fn values(&self) -> &[f64] {
        self.point.values()
    }

    /// Accumulated weight.
    pub fn weight(&self) -> f64 {
        self.point.weight()
    }

    /// Dimensionality.
    pub fn dim(&self) -> usize {
        self.point.dim()
    }

    /// Drop all accumulated state, keeping the dimensionality.
    pub fn reset(&mut self) {
        for v in &mut self.point.values {
            *v = 0.0;
        }
        for s in &mut self.mean_of_squares {
            *s = 0.0;
        }
        self.point.weight = 0.0;
    }

    pub(crate) fn scale_down(&mut self, factors: &[f64]) {
        self.point.scale_down(factors);
        for (s, f) in self.mean_of_squares.iter_mut().zip(factors) {
            *s /= f * f;
        }
    }

    pub(crate) fn scale_up(&mut self, factors: &[f64]) {
        self.point.scale_up(factors);
        for (s, f) in self.mean_of_squares.iter_mut().zip(factors) {
            *s *= f * f;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_incremental_matches_batch() {
        let points = [
            ClusterPoint::with_weight(vec![1.0, -2.0], 0.5),
            ClusterPoint::with_weight(vec![3.0, 0.5], 2.0),
            ClusterPoint::with_weight(vec![-1.5, 4.0], 1.0),
            ClusterPoint::with_weight(vec![0.25, 1.0], 3.0),
        ];

        let mut com = CenterOfMass::new(2);
        for p in &points {
            com.attach(p);
        }

        let total: f64 = points.iter().map(ClusterPoint::weight).sum();
        for i in 0..2 {
            let mean: f64 = points.iter().map(|p| p.weight() * p.values()[i]).sum::<f64>() / total;
            let msq: f64 = points
                .iter()
                .map(|p| p.weight() * p.values()[i] * p.values()[i])
                .sum::<f64>()
                / total;
            assert_relative_eq!(com.values()[i], mean, max_relative = 1e-12);
            assert_relative_eq!(com.variances()[i], msq - mean * mean, max_relative = 1e-9);
        }
        assert_relative_eq!(com.weight(), total, max_relative = 1e-12);
    }

    #[test]
    fn test_null_sigma_on_single_point() {
        let mut com = CenterOfMass::new(2);
        com.attach(&ClusterPoint::new(vec![2.0, 3.0]));
        assert!(com.any_null_sigma());

        // A point differing in both dimensions clears the flag.
        com.attach(&ClusterPoint::new(vec![2.5, 3.5]));
        assert!(!com.any_null_sigma());
    }

    #[test]
    fn test_null_sigma_per_dimension() {
        let mut com = CenterOfMass::new(2);
        com.attach(&ClusterPoint::new(vec![1.0, 0.0]));
        // Differs in dim 0 only; dim 1 still has zero variance.
        com.attach(&ClusterPoint::new(vec![2.0, 0.0]));
        assert!(com.any_null_sigma());
    }

    #[test]
    fn test_reset() {
        let mut com = CenterOfMass::new(3);
        com.attach(&ClusterPoint::new(vec![1.0, 2.0, 3.0]));
        com.reset();
        assert_eq!(com.weight(), 0.0);
        assert_eq!(com.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(com.dim(), 3);
    }
}

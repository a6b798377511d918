/// Bucket midpoints in percent: 5%, 15%, ..., 95%.
pub const DEFAULT_POINTS: [f64; 10] = [5.0, 15.0, 25.0, 35.0, 45.0, 55.0, 65.0, 75.0, 85.0, 95.0];

/// Distances closer than this count as equal when picking a bucket.
const TIE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BucketError {
    #[error("Calibration bucket set is empty")]
    Empty,

    #[error("Calibration bucket point {0} is outside 0-100%")]
    OutOfRange(f64),
}

/// Fixed, externally configured probability buckets, stored as fractions in
/// ascending order without duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    midpoints: Vec<f64>,
}

impl Buckets {
    pub fn from_percentages(points: &[f64]) -> Result<Self, BucketError> {
        if points.is_empty() {
            return Err(BucketError::Empty);
        }

        let mut midpoints = Vec::with_capacity(points.len());
        for &point in points {
            if !point.is_finite() || !(0.0..=100.0).contains(&point) {
                return Err(BucketError::OutOfRange(point));
            }
            midpoints.push(point / 100.0);
        }
        midpoints.sort_by(f64::total_cmp);
        midpoints.dedup();

        Ok(Self { midpoints })
    }

    pub fn midpoints(&self) -> &[f64] {
        &self.midpoints
    }

    pub fn len(&self) -> usize {
        self.midpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.midpoints.is_empty()
    }

    /// Index of the midpoint closest to `prob`; ties go to the lower midpoint.
    pub fn nearest(&self, prob: f64) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, midpoint) in self.midpoints.iter().enumerate() {
            let distance = (prob - midpoint).abs();
            // Only a clearly closer midpoint replaces a lower one
            if distance < best_distance - TIE_TOLERANCE {
                best = i;
                best_distance = distance;
            }
        }
        best
    }
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            midpoints: DEFAULT_POINTS.iter().map(|p| p / 100.0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buckets() {
        let buckets = Buckets::default();
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets, Buckets::from_percentages(&DEFAULT_POINTS).unwrap());
    }

    #[test]
    fn test_points_are_sorted_and_deduplicated() {
        let buckets = Buckets::from_percentages(&[50.0, 10.0, 50.0, 90.0]).unwrap();
        assert_eq!(buckets.midpoints(), &[0.1, 0.5, 0.9]);
    }

    #[test]
    fn test_invalid_points_are_rejected() {
        assert_eq!(Buckets::from_percentages(&[]), Err(BucketError::Empty));
        assert_eq!(
            Buckets::from_percentages(&[10.0, 120.0]),
            Err(BucketError::OutOfRange(120.0))
        );
        assert!(Buckets::from_percentages(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_nearest_bucket() {
        let buckets = Buckets::default();
        assert_eq!(buckets.midpoints()[buckets.nearest(0.52)], 0.55);
        assert_eq!(buckets.midpoints()[buckets.nearest(0.0)], 0.05);
        assert_eq!(buckets.midpoints()[buckets.nearest(1.0)], 0.95);
    }

    #[test]
    fn test_nearest_breaks_ties_low() {
        let buckets = Buckets::from_percentages(&[25.0, 75.0]).unwrap();
        assert_eq!(buckets.nearest(0.5), 0);
    }

    #[test]
    fn test_every_default_boundary_goes_to_lower_bucket() {
        let buckets = Buckets::default();
        for (i, boundary) in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9].into_iter().enumerate() {
            assert_eq!(buckets.nearest(boundary), i, "boundary {}", boundary);
        }
    }
}

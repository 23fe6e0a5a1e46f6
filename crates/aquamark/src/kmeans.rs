//! One-dimensional 2-centroid k-means, used to binarise the averaged
//! extraction vector without a fixed threshold.

const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-6;

/// Partition `values` into low/high classes and return the class membership.
///
/// Centroids start at the minimum and maximum; the threshold is the centroid
/// midpoint, re-estimated until it moves less than the tolerance or a class
/// empties. A constant input yields all-false.
pub fn binarise(values: &[f64]) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![false; values.len()];
    }

    let mut threshold = (min + max) / 2.0;
    for _ in 0..MAX_ITERATIONS {
        let (mut low_sum, mut low_count) = (0.0f64, 0usize);
        let (mut high_sum, mut high_count) = (0.0f64, 0usize);
        for &v in values {
            if v > threshold {
                high_sum += v;
                high_count += 1;
            } else {
                low_sum += v;
                low_count += 1;
            }
        }
        if low_count == 0 || high_count == 0 {
            break;
        }
        let next =
            (low_sum / low_count as f64 + high_sum / high_count as f64) / 2.0;
        let moved = (next - threshold).abs();
        threshold = next;
        if moved < TOLERANCE {
            break;
        }
    }

    values.iter().map(|&v| v > threshold).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bimodal_input_splits_cleanly() {
        let values = [0.1, 0.05, 0.92, 0.13, 0.88, 0.97, 0.02, 0.81];
        assert_eq!(
            binarise(&values),
            [false, false, true, false, true, true, false, true]
        );
    }

    #[test]
    fn constant_input_is_all_false() {
        assert_eq!(binarise(&[0.5; 6]), [false; 6]);
        assert_eq!(binarise(&[0.75]), [false]);
    }

    #[test]
    fn skewed_clusters_follow_the_gap() {
        // low cluster around 0.3, high cluster around 0.6; a fixed 0.5
        // threshold would misclassify nothing here but the learned
        // threshold must sit between the clusters
        let mut values = vec![0.28, 0.31, 0.30, 0.29, 0.33];
        values.extend([0.61, 0.58, 0.64, 0.60]);
        let classes = binarise(&values);
        assert_eq!(&classes[..5], [false; 5]);
        assert_eq!(&classes[5..], [true; 4]);
    }

    #[test]
    fn majority_class_matches_median_split() {
        let values: Vec<f64> = (0..100)
            .map(|i| if i % 3 == 0 { 0.9 } else { 0.1 })
            .collect();
        let classes = binarise(&values);
        let ones = classes.iter().filter(|&&b| b).count();
        assert_eq!(ones, values.iter().filter(|&&v| v > 0.5).count());
    }
}

//! Pure vector helpers shared by indexing and querying.

/// Return a unit-L2-norm copy of `vec`.
///
/// A vector whose norm is zero or not finite maps to the all-zero vector, so
/// it scores `0.0` against everything instead of producing NaN.
#[must_use]
pub fn normalized(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return vec![0.0; vec.len()];
    }
    vec.iter().map(|v| v / norm).collect()
}

/// Inner product of two equal-length vectors (0.0 on length mismatch).
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of two arbitrary vectors
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    dot(&normalized(a), &normalized(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_has_unit_norm() {
        let v = normalized(&[3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!((dot(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_leaves_input_untouched() {
        let original = vec![2.0, 0.0, 0.0];
        let unit = normalized(&original);
        assert_eq!(original, vec![2.0, 0.0, 0.0]);
        assert_eq!(unit, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_and_non_finite_vectors_map_to_zero() {
        assert_eq!(normalized(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(normalized(&[f32::NAN, 1.0]), vec![0.0, 0.0]);
        assert_eq!(normalized(&[f32::INFINITY, 1.0]), vec![0.0, 0.0]);
        assert!(normalized(&[]).is_empty());
    }

    #[test]
    fn cosine_similarity_ignores_magnitude() {
        let sim = cosine_similarity(&[1.0, 1.0], &[10.0, 10.0]);
        assert!((sim - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}

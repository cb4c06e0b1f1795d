use discovery_index::SparseVector;

/// Cosine similarity of two sparse, non-negative vectors.
///
/// Terms missing from one side contribute zero. If either vector has zero
/// magnitude the similarity is 0, never NaN. The result is clamped into
/// `[0, 1]` so float rounding cannot push self-similarity past 1.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum();

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn magnitude(v: &SparseVector) -> f64 {
    v.values().map(|w| w * w).sum::<f64>().sqrt()
}

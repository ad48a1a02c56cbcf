//! Embedding math and BLOB encoding

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Cosine distance in `[0, 2]`, 0 meaning identical direction
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_roundtrip_bytes() {
        let embedding = vec![0.25, -1.5, 3.0];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_embedding(&bytes), embedding);
    }

    #[test]
    fn test_cosine_distance_bounds() {
        let a = vec![1.0, 0.0, 0.0];
        assert!(cosine_distance(&a, &a).abs() < 0.0001);
        assert!((cosine_distance(&a, &[0.0, 1.0, 0.0]) - 1.0).abs() < 0.0001);
        assert!((cosine_distance(&a, &[-1.0, 0.0, 0.0]) - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_mismatched_dimensions_are_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}

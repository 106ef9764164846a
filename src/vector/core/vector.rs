//! Core vector data structure.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelseekError, Result};

/// A dense vector representation for similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// The vector dimensions as floating point values.
    pub data: Vec<f32>,
}

impl Vector {
    /// Create a new vector with the given dimensions.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Calculate the L2 norm (magnitude) of this vector.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize this vector to unit length. Zero vectors stay zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.data {
                *value /= norm;
            }
        }
    }

    /// Get a normalized copy of this vector.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.normalize();
        normalized
    }

    /// Inner product. Equals cosine similarity for unit vectors.
    pub fn dot(&self, other: &Vector) -> f32 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Validate that this vector has the expected dimension.
    pub fn validate_dimension(&self, expected_dim: usize) -> Result<()> {
        if self.data.len() != expected_dim {
            return Err(ModelseekError::embedding(format!(
                "Vector dimension mismatch: expected {}, got {}",
                expected_dim,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Check if this vector contains any NaN or infinite values.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Normalize multiple vectors in parallel.
    pub fn normalize_batch_parallel(vectors: &mut [Vector]) {
        if vectors.len() > 10 {
            vectors.par_iter_mut().for_each(Vector::normalize);
        } else {
            for vector in vectors {
                vector.normalize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let mut v = Vector::new(vec![3.0, 4.0]);
        assert_eq!(v.norm(), 5.0);
        v.normalize();
        assert!((v.norm() - 1.0).abs() < 1e-6);
        assert!((v.data[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let v = Vector::new(vec![0.0, 0.0]).normalized();
        assert_eq!(v.data, vec![0.0, 0.0]);
    }

    #[test]
    fn test_dot() {
        let a = Vector::new(vec![1.0, 0.0]);
        let b = Vector::new(vec![0.6, 0.8]);
        assert!((a.dot(&b) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_validate_dimension() {
        let v = Vector::new(vec![1.0, 2.0, 3.0]);
        assert!(v.validate_dimension(3).is_ok());
        assert!(v.validate_dimension(4).is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(Vector::new(vec![1.0]).is_valid());
        assert!(!Vector::new(vec![f32::NAN]).is_valid());
    }

    #[test]
    fn test_normalize_batch_parallel() {
        let mut vectors: Vec<Vector> = (1..=20)
            .map(|i| Vector::new(vec![i as f32, 1.0]))
            .collect();
        Vector::normalize_batch_parallel(&mut vectors);
        assert!(vectors.iter().all(|v| (v.norm() - 1.0).abs() < 1e-5));
    }
}

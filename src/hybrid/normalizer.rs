//! Score normalization for fusion.

/// Min-max scaler fitted on one source's result scores.
///
/// A degenerate range (all scores equal) is treated as 1, so every score
/// maps to 0 instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    min: f64,
    range: f64,
}

impl MinMaxScaler {
    /// Fit on `scores`; `None` when there are none.
    pub fn fit(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = if max > min { max - min } else { 1.0 };
        Some(Self { min, range })
    }

    /// Scale a score into `[0, 1]`.
    pub fn scale(&self, score: f64) -> f64 {
        ((score - self.min) / self.range).clamp(0.0, 1.0)
    }
}

/// Min-max normalize a list of scores.
pub fn min_max(scores: &[f64]) -> Vec<f64> {
    match MinMaxScaler::fit(scores) {
        Some(scaler) => scores.iter().map(|s| scaler.scale(*s)).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_degenerate_ranges() {
        assert!(min_max(&[]).is_empty());
        assert_eq!(min_max(&[7.0]), vec![0.0]);
        assert_eq!(min_max(&[1.5, 1.5]), vec![0.0, 0.0]);
        assert!(MinMaxScaler::fit(&[]).is_none());
    }
}

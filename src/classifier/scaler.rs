//! Per-dimension standardization
//!
//! Statistics are computed once from the training matrix and reused for
//! every later transform.

use super::AnalysisError;

/// Below this a dimension is treated as constant
const MIN_STD: f64 = 1e-12;

/// Fitted mean / standard deviation per column
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a row-major matrix. All rows must share the first row's width.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, AnalysisError> {
        let dim = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut mean = vec![0.0; dim];
        for row in rows {
            check_dimension(dim, row.len())?;
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; dim];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m) * (x - m);
            }
        }
        let std = var
            .into_iter()
            .map(|v| {
                let s = (v / n).sqrt();
                if s < MIN_STD {
                    1.0
                } else {
                    s
                }
            })
            .collect();

        Ok(Self { mean, std })
    }

    /// Standardize one row with the training-time statistics
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        check_dimension(self.mean.len(), row.len())?;
        let scaled: Vec<f64> = row
            .iter()
            .zip(&self.mean)
            .zip(&self.std)
            .map(|((x, m), s)| (x - m) / s)
            .collect();
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFinite { stage: "scaling" });
        }
        Ok(scaled)
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }
}

fn check_dimension(expected: usize, found: usize) -> Result<(), AnalysisError> {
    if expected == found {
        Ok(())
    } else {
        Err(AnalysisError::DimensionMismatch { expected, found })
    }
}

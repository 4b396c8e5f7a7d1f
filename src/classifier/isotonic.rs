//! Isotonic regression
//!
//! Non-decreasing step fit via pool-adjacent-violators. Prediction
//! interpolates linearly between fitted knots and clips outside them.

/// Fitted monotone map from raw score to probability
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsotonicRegression {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

struct Block {
    sum: f64,
    weight: f64,
    /// Number of distinct knots pooled into this block
    len: usize,
}

impl Block {
    fn mean(&self) -> f64 {
        self.sum / self.weight
    }
}

impl IsotonicRegression {
    /// Fit on `(score, target)` pairs. Targets are usually 0/1 labels.
    pub fn fit(scores: &[f64], targets: &[f64]) -> Self {
        let mut pairs: Vec<(f64, f64)> = scores
            .iter()
            .copied()
            .zip(targets.iter().copied())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if pairs.is_empty() {
            return Self::default();
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Tied scores collapse into one knot carrying their mean
        let mut xs: Vec<f64> = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();
        for (x, y) in pairs {
            match (xs.last(), blocks.last_mut()) {
                (Some(&last), Some(block)) if last == x => {
                    block.sum += y;
                    block.weight += 1.0;
                }
                _ => {
                    xs.push(x);
                    blocks.push(Block {
                        sum: y,
                        weight: 1.0,
                        len: 1,
                    });
                }
            }
        }

        // Pool adjacent violators
        let mut pooled: Vec<Block> = Vec::with_capacity(blocks.len());
        for block in blocks {
            pooled.push(block);
            while pooled.len() > 1 {
                let n = pooled.len();
                if pooled[n - 2].mean() <= pooled[n - 1].mean() {
                    break;
                }
                if let Some(last) = pooled.pop() {
                    let prev = &mut pooled[n - 2];
                    prev.sum += last.sum;
                    prev.weight += last.weight;
                    prev.len += last.len;
                }
            }
        }

        let ys = pooled
            .iter()
            .flat_map(|b| std::iter::repeat(b.mean()).take(b.len))
            .collect();

        Self { xs, ys }
    }

    /// Calibrated value for a raw score
    pub fn predict(&self, x: f64) -> f64 {
        let (Some(&first), Some(&last)) = (self.xs.first(), self.xs.last()) else {
            return x.clamp(0.0, 1.0);
        };
        if x.is_nan() {
            return self.ys[0];
        }
        if x <= first {
            return self.ys[0];
        }
        if x >= last {
            return self.ys[self.ys.len() - 1];
        }

        // xs[i - 1] < x < xs[i]
        let i = self.xs.partition_point(|&k| k <= x);
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Number of distinct fitted knots
    pub fn knots(&self) -> usize {
        self.xs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_monotone_is_kept() {
        let iso = IsotonicRegression::fit(&[0.1, 0.2, 0.3], &[0.0, 0.5, 1.0]);
        assert_eq!(iso.predict(0.1), 0.0);
        assert_eq!(iso.predict(0.2), 0.5);
        assert_eq!(iso.predict(0.3), 1.0);
        assert!((iso.predict(0.25) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_violators_are_pooled() {
        // 0.2 -> 1 and 0.3 -> 0 violate order and merge to 0.5
        let iso = IsotonicRegression::fit(&[0.1, 0.2, 0.3, 0.4], &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(iso.predict(0.1), 0.0);
        assert_eq!(iso.predict(0.2), 0.5);
        assert_eq!(iso.predict(0.3), 0.5);
        assert_eq!(iso.predict(0.4), 1.0);
    }

    #[test]
    fn test_ties_are_averaged() {
        let iso = IsotonicRegression::fit(&[0.5, 0.5, 0.5, 0.9], &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(iso.knots(), 2);
        assert!((iso.predict(0.5) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_is_monotone_and_clipped() {
        let scores = [0.9, 0.1, 0.4, 0.35, 0.8, 0.6, 0.2, 0.7];
        let targets = [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let iso = IsotonicRegression::fit(&scores, &targets);

        let mut prev = f64::NEG_INFINITY;
        for i in 0..=20 {
            let p = iso.predict(i as f64 / 20.0);
            assert!(p >= prev - 1e-12, "not monotone at {i}");
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
        assert_eq!(iso.predict(-5.0), iso.predict(0.1));
        assert_eq!(iso.predict(5.0), iso.predict(0.9));
    }

    #[test]
    fn test_empty_fit_is_identity_clamp() {
        let iso = IsotonicRegression::fit(&[], &[]);
        assert_eq!(iso.knots(), 0);
        assert_eq!(iso.predict(0.3), 0.3);
        assert_eq!(iso.predict(1.7), 1.0);
    }
}

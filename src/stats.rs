//! Descriptive statistics over a numeric sample
//!
//! Backs the histogram tool and the summary blocks several other tools
//! print. Moments are computed once at construction; the histogram is the
//! only on-demand computation because it depends on a caller-chosen bin
//! width.

use crate::errors::{EnveomicsError, Result};

/// A numeric sample with precomputed descriptive statistics.
#[derive(Debug, Clone)]
pub struct Sample {
    values: Vec<f64>,
    mean: f64,
    variance: f64,
    skewness: f64,
    kurtosis: f64,
}

impl Sample {
    /// Build a sample; non-finite values are an option error.
    pub fn new(mut values: Vec<f64>) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EnveomicsError::Option(
                "sample contains non-finite values".into(),
            ));
        }
        values.sort_by(|a, b| a.partial_cmp(b).expect("finite values"));
        let n = values.len() as f64;
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / n
        };
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for v in &values {
            let d = v - mean;
            m2 += d * d;
            m3 += d * d * d;
            m4 += d * d * d * d;
        }
        let variance = if values.len() > 1 { m2 / (n - 1.0) } else { 0.0 };
        // Adjusted Fisher-Pearson sample skewness and sample excess kurtosis
        let skewness = if values.len() > 2 && m2 > 0.0 {
            let g1 = (m3 / n) / (m2 / n).powf(1.5);
            g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
        } else {
            0.0
        };
        let kurtosis = if values.len() > 3 && m2 > 0.0 {
            let g2 = (m4 / n) / (m2 / n).powi(2) - 3.0;
            ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
        } else {
            0.0
        };
        Ok(Self {
            values,
            mean,
            variance,
            skewness,
            kurtosis,
        })
    }

    pub fn n(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample (n-1) variance.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn sd(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn min(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Adjusted Fisher-Pearson sample skewness (0 for n < 3).
    pub fn skewness(&self) -> f64 {
        self.skewness
    }

    /// Sample excess kurtosis (0 for n < 4).
    pub fn kurtosis(&self) -> f64 {
        self.kurtosis
    }

    /// Quantile by linear interpolation between order statistics.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.values.is_empty() || !(0.0..=1.0).contains(&q) {
            return None;
        }
        let pos = q * (self.values.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let frac = pos - lo as f64;
        Some(self.values[lo] * (1.0 - frac) + self.values[hi] * frac)
    }

    pub fn median(&self) -> Option<f64> {
        self.quantile(0.5)
    }

    /// Histogram over `[min, max]` with the given bin width. The final bin
    /// absorbs the maximum, so counts always sum to n.
    pub fn histo_counts(&self, bin_width: f64) -> Result<Vec<(f64, usize)>> {
        if bin_width <= 0.0 || !bin_width.is_finite() {
            return Err(EnveomicsError::Option(format!(
                "bin width must be positive, got {bin_width}"
            )));
        }
        let (min, max) = match (self.min(), self.max()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Ok(Vec::new()),
        };
        let bins = (((max - min) / bin_width).ceil() as usize).max(1);
        let mut counts = vec![0usize; bins];
        for v in &self.values {
            let idx = (((v - min) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Ok(counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| (min + i as f64 * bin_width, c))
            .collect())
    }

    /// Sarle's bimodality coefficient; `None` for n <= 3 or zero variance.
    /// Values approaching 1 indicate strong bimodality; a uniform
    /// distribution scores ~5/9.
    pub fn bimodality(&self) -> Option<f64> {
        let n = self.values.len() as f64;
        if self.values.len() <= 3 || self.variance <= 0.0 {
            return None;
        }
        let denom =
            self.kurtosis + 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
        Some((self.skewness.powi(2) + 1.0) / denom)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_moments() {
        let s = Sample::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.mean() - 5.0).abs() < 1e-9);
        assert!((s.variance() - 32.0 / 7.0).abs() < 1e-9);
        assert_eq!(s.min(), Some(2.0));
        assert_eq!(s.max(), Some(9.0));
        assert!((s.median().unwrap() - 4.5).abs() < 1e-9);
    }

    #[test]
    fn empty_sample_is_harmless() {
        let s = Sample::new(Vec::new()).unwrap();
        assert_eq!(s.n(), 0);
        assert_eq!(s.median(), None);
        assert!(s.histo_counts(1.0).unwrap().is_empty());
        assert_eq!(s.bimodality(), None);
    }

    #[test]
    fn non_finite_values_rejected() {
        assert!(Sample::new(vec![1.0, f64::NAN]).is_err());
        assert!(Sample::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn histogram_counts_sum_to_n() {
        let s = Sample::new(vec![0.0, 0.1, 0.5, 0.9, 1.0, 2.5, 3.0]).unwrap();
        for width in [0.1, 0.3, 1.0, 10.0] {
            let total: usize = s.histo_counts(width).unwrap().iter().map(|(_, c)| c).sum();
            assert_eq!(total, s.n(), "width {width}");
        }
    }

    #[test]
    fn histogram_rejects_bad_width() {
        let s = Sample::new(vec![1.0, 2.0]).unwrap();
        assert!(s.histo_counts(0.0).is_err());
        assert!(s.histo_counts(-1.0).is_err());
    }

    #[test]
    fn bimodality_separates_shapes() {
        // Two tight modes far apart vs one tight mode
        let bimodal: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 0.0 + (i as f64) * 1e-3 } else { 100.0 + (i as f64) * 1e-3 })
            .collect();
        let unimodal: Vec<f64> = (0..50).map(|i| 50.0 + (i as f64) * 1e-3).collect();
        let b = Sample::new(bimodal).unwrap().bimodality().unwrap();
        let u = Sample::new(unimodal).unwrap().bimodality().unwrap();
        assert!(b > 5.0 / 9.0, "bimodal sample scored {b}");
        assert!(b > u);
    }
}

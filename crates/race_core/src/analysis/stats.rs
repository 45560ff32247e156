//! Small numeric helpers shared by the reports.

use serde::Serialize;

/// `num / max(den, 1) × 100`. A zero denominator yields 0, never NaN.
pub fn percent(num: usize, den: usize) -> f64 {
    num as f64 / den.max(1) as f64 * 100.0
}

/// Median of an ascending slice; mean of the middle pair for even lengths.
pub fn median(sorted: &[f32]) -> Option<f32> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Samples and successes for one rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RateCounter {
    pub samples: usize,
    pub successes: usize,
}

impl RateCounter {
    pub fn record(&mut self, success: bool) {
        self.samples += 1;
        if success {
            self.successes += 1;
        }
    }

    pub fn rate(&self) -> f64 {
        percent(self.successes, self.samples)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FinishTimeStats {
    pub count: usize,
    pub mean: f32,
    pub median: f32,
    pub best: f32,
}

impl FinishTimeStats {
    /// Non-positive times (did not finish / not recorded) are ignored.
    pub fn from_times(times: impl IntoIterator<Item = f32>) -> Self {
        let mut sorted: Vec<f32> = times.into_iter().filter(|t| *t > 0.0).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        let count = sorted.len();
        Self {
            count,
            mean: sorted.iter().sum::<f32>() / count as f32,
            median: median(&sorted).unwrap_or(0.0),
            best: sorted[0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_zero_denominator() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[1.0, 2.0, 9.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 4.0, 9.0]), Some(3.0));
    }

    #[test]
    fn test_finish_time_stats() {
        let stats = FinishTimeStats::from_times([150.0, 148.0, 0.0, 152.0, 149.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.best, 148.0);
        assert_eq!(stats.median, 149.5);
        assert!((stats.mean - 149.75).abs() < 1e-4);
        assert_eq!(FinishTimeStats::from_times(Vec::new()), FinishTimeStats::default());
    }

    #[test]
    fn test_rate_counter() {
        let mut c = RateCounter::default();
        assert_eq!(c.rate(), 0.0);
        c.record(true);
        c.record(false);
        assert_eq!(c.rate(), 50.0);
    }
}

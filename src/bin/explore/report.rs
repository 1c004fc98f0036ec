// Explore Report Types
// Structured output for offline comparison of scenario runs

use serde::Serialize;

use scenario_explorer::ScreenView;

// ─── Lever Sampling ─────────────────────────────────────────────────────────

/// Running tally of one metric across lever samples. Readings are folded in
/// as they arrive (Welford), so no sample is kept.
#[derive(Debug, Clone)]
pub struct MetricTally {
    count: usize,
    mean: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
    clamped: usize,
}

impl Default for MetricTally {
    fn default() -> Self {
        Self { count: 0, mean: 0.0, sum_sq: 0.0, min: f64::INFINITY, max: f64::NEG_INFINITY, clamped: 0 }
    }
}

impl MetricTally {
    pub fn push(&mut self, value: f64, clamped: bool) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_sq += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        if clamped {
            self.clamped += 1;
        }
    }

    /// Half-width of the 95% interval around the mean.
    fn ci95(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let variance = self.sum_sq / (self.count - 1) as f64;
        1.96 * (variance / self.count as f64).sqrt()
    }

    pub fn summarize(&self, name: &str, label: &str) -> MetricSummary {
        let seen = self.count > 0;
        MetricSummary {
            name: name.to_string(),
            label: label.to_string(),
            mean: self.mean,
            ci95: self.ci95(),
            min: if seen { self.min } else { 0.0 },
            max: if seen { self.max } else { 0.0 },
            clamp_rate: self.clamped as f64 / self.count.max(1) as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub label: String,
    pub mean: f64,
    pub ci95: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of samples where the formula output had to be clamped.
    pub clamp_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplingReport {
    pub seed: u64,
    pub samples: usize,
    pub pass_rate: f64,
    pub metrics: Vec<MetricSummary>,
}

// ─── Per-Scenario and Top-Level Report ──────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub id: String,
    pub title: String,
    pub issues: Vec<String>,
    pub view: ScreenView,
    pub sampling: Option<SamplingReport>,
}

#[derive(Debug, Serialize)]
pub struct ExploreReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub scenarios: Vec<ScenarioReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(values: &[f64]) -> MetricTally {
        let mut t = MetricTally::default();
        for &v in values {
            t.push(v, v > 8.0);
        }
        t
    }

    #[test]
    fn tally_of_known_samples() {
        let s = tally(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).summarize("m", "M");
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.clamp_rate, 0.125);
        // Sample variance is 32 / 7.
        let expected = 1.96 * (32.0_f64 / 7.0 / 8.0).sqrt();
        assert!((s.ci95 - expected).abs() < 1e-12);
    }

    #[test]
    fn tally_of_nothing() {
        let s = MetricTally::default().summarize("m", "M");
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.ci95, 0.0);
        assert_eq!((s.min, s.max), (0.0, 0.0));
        assert_eq!(s.clamp_rate, 0.0);
    }

    #[test]
    fn single_sample_has_no_interval() {
        let s = tally(&[3.5]).summarize("m", "M");
        assert_eq!((s.mean, s.ci95, s.min, s.max), (3.5, 0.0, 3.5, 3.5));
    }
}

// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Threshold Evaluation

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DefinitionError;
use crate::simulator::MetricReading;
use crate::types::{Direction, MetricSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
    /// At least the target when higher is better, at most when lower is.
    EqualOrBetter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub metric: String,
    pub comparison: Comparison,
    pub target: f64,
}

impl Threshold {
    pub fn at_least(metric: &str, target: f64) -> Self {
        Self { metric: metric.to_string(), comparison: Comparison::AtLeast, target }
    }

    pub fn at_most(metric: &str, target: f64) -> Self {
        Self { metric: metric.to_string(), comparison: Comparison::AtMost, target }
    }

    pub fn equal_or_better(metric: &str, target: f64) -> Self {
        Self { metric: metric.to_string(), comparison: Comparison::EqualOrBetter, target }
    }

    pub fn holds(&self, value: f64, direction: Direction) -> bool {
        match (self.comparison, direction) {
            (Comparison::AtLeast, _) | (Comparison::EqualOrBetter, Direction::HigherIsBetter) => {
                value >= self.target
            }
            (Comparison::AtMost, _) | (Comparison::EqualOrBetter, Direction::LowerIsBetter) => {
                value <= self.target
            }
        }
    }
}

/// All-or-nothing outcome of the threshold set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ThresholdEvaluator {
    // Each threshold paired with its metric's direction, resolved once.
    thresholds: Vec<(Threshold, Direction)>,
    success_message: String,
    guidance_message: String,
}

impl ThresholdEvaluator {
    /// Thresholds on metrics absent from `metrics`, or with a non-finite
    /// target, are dropped and reported.
    pub fn new(
        thresholds: Vec<Threshold>,
        metrics: &[MetricSpec],
        success_message: impl Into<String>,
        guidance_message: impl Into<String>,
    ) -> (Self, Vec<DefinitionError>) {
        let mut issues = Vec::new();
        let mut resolved = Vec::with_capacity(thresholds.len());
        for threshold in thresholds {
            if !threshold.target.is_finite() {
                warn!(metric = %threshold.metric, "threshold with non-finite target dropped");
                issues.push(DefinitionError::InvalidThreshold { metric: threshold.metric });
                continue;
            }
            match metrics.iter().find(|m| m.name == threshold.metric) {
                Some(spec) => resolved.push((threshold, spec.direction)),
                None => {
                    warn!(metric = %threshold.metric, "threshold on unknown metric dropped");
                    issues.push(DefinitionError::UnknownThresholdMetric(threshold.metric));
                }
            }
        }
        let evaluator = Self {
            thresholds: resolved,
            success_message: success_message.into(),
            guidance_message: guidance_message.into(),
        };
        (evaluator, issues)
    }

    pub fn thresholds(&self) -> impl Iterator<Item = &Threshold> {
        self.thresholds.iter().map(|(t, _)| t)
    }

    /// True only if every comparison holds. A threshold whose metric has no
    /// reading cannot hold. An empty set passes.
    pub fn passes(&self, readings: &[MetricReading]) -> bool {
        self.thresholds.iter().all(|(threshold, direction)| {
            readings
                .iter()
                .find(|r| r.name == threshold.metric)
                .map_or(false, |r| threshold.holds(r.value, *direction))
        })
    }

    pub fn evaluate(&self, readings: &[MetricReading]) -> Verdict {
        let passed = self.passes(readings);
        let message = if passed { &self.success_message } else { &self.guidance_message };
        Verdict { passed, message: message.clone() }
    }
}

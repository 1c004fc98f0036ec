// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::MetricFormat;

// ─── StageId ─────────────────────────────────────────────────────────────────

/// Identifier of a stage, unique within one graph.
#[derive(Debug, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub String);

impl StageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StageId {
    fn from(s: String) -> Self { StageId(s) }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self { StageId(s.to_string()) }
}

// ─── Stage Category ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StageCategory {
    Research = 0,
    Discovery = 1,
    Strategy = 2,
    Design = 3,
    Implementation = 4,
    Launch = 5,
    Outcome = 6,
}

impl StageCategory {
    pub const ALL: [Self; 7] = [
        Self::Research,
        Self::Discovery,
        Self::Strategy,
        Self::Design,
        Self::Implementation,
        Self::Launch,
        Self::Outcome,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Discovery => "Discovery",
            Self::Strategy => "Strategy",
            Self::Design => "Design",
            Self::Implementation => "Implementation",
            Self::Launch => "Launch",
            Self::Outcome => "Outcome",
        }
    }
}

// ─── StageNode / StageEdge ───────────────────────────────────────────────────

/// Declarative canvas position. Nodes are never laid out automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageNode {
    pub id: StageId,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub category: StageCategory,
    #[serde(default)]
    pub position: Position,
}

impl StageNode {
    pub fn new(
        id: impl Into<StageId>,
        label: impl Into<String>,
        category: StageCategory,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            category,
            position,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEdge {
    pub from: StageId,
    pub to: StageId,
    #[serde(default)]
    pub label: Option<String>,
}

impl StageEdge {
    pub fn new(from: impl Into<StageId>, to: impl Into<StageId>) -> Self {
        Self { from: from.into(), to: to.into(), label: None }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_self_edge(&self) -> bool {
        self.from == self.to
    }
}

// ─── DetailRecord ────────────────────────────────────────────────────────────

/// Static narrative content shown in the side panel for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub stage: StageId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub obstacles: String,
    #[serde(default)]
    pub resolution: Vec<String>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub outgoing_data: String,
}

// ─── Controls ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ControlKind {
    Continuous { min: f64, max: f64, step: f64, default: f64 },
    Boolean { default: bool },
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Continuous { .. } => "continuous",
            Self::Boolean { .. } => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Boolean(bool),
    Continuous(f64),
}

impl ControlValue {
    /// Numeric view: toggles read as 1.0 / 0.0.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Continuous(v) => v,
            Self::Boolean(true) => 1.0,
            Self::Boolean(false) => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Boolean(b) => b,
            Self::Continuous(v) => v != 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ControlKind,
}

impl ControlSpec {
    pub fn continuous(
        name: impl Into<String>,
        label: impl Into<String>,
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ControlKind::Continuous { min, max, step, default },
        }
    }

    pub fn boolean(name: impl Into<String>, label: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ControlKind::Boolean { default },
        }
    }

    pub fn default_value(&self) -> ControlValue {
        match self.kind {
            ControlKind::Continuous { default, .. } => ControlValue::Continuous(default),
            ControlKind::Boolean { default } => ControlValue::Boolean(default),
        }
    }

    /// Bring a slider value inside `[min, max]` and onto the step grid.
    ///
    /// Toggles pass through unchanged. Non-finite input is the caller's
    /// responsibility to reject.
    pub fn admit(&self, value: f64) -> f64 {
        match self.kind {
            ControlKind::Continuous { min, max, step, .. } => {
                let clamped = value.clamp(min, max);
                if step > 0.0 {
                    let snapped = min + ((clamped - min) / step).round() * step;
                    snapped.clamp(min, max)
                } else {
                    clamped
                }
            }
            ControlKind::Boolean { .. } => value,
        }
    }

    /// Returns a reason when the declared range cannot be used.
    pub fn range_problem(&self) -> Option<String> {
        match self.kind {
            ControlKind::Continuous { min, max, step, default } => {
                if !(min.is_finite() && max.is_finite() && step.is_finite() && default.is_finite()) {
                    Some("bounds, step and default must be finite".to_string())
                } else if min > max {
                    Some(format!("min {} exceeds max {}", min, max))
                } else if step < 0.0 {
                    Some(format!("negative step {}", step))
                } else if default < min || default > max {
                    Some(format!("default {} outside [{}, {}]", default, min, max))
                } else {
                    None
                }
            }
            ControlKind::Boolean { .. } => None,
        }
    }
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

/// Valid range of a metric. Either side may be open; each scenario's
/// declared bounds are authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBounds {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

impl MetricBounds {
    pub fn between(lower: f64, upper: f64) -> Self {
        Self { lower: Some(lower), upper: Some(upper) }
    }

    pub fn at_least(lower: f64) -> Self {
        Self { lower: Some(lower), upper: None }
    }

    pub fn at_most(upper: f64) -> Self {
        Self { lower: None, upper: Some(upper) }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `max(min, min(max, raw))`, skipping whichever side is open.
    pub fn clamp(&self, raw: f64) -> f64 {
        let capped = self.upper.map_or(raw, |upper| raw.min(upper));
        self.lower.map_or(capped, |lower| capped.max(lower))
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |l| value >= l) && self.upper.map_or(true, |u| value <= u)
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.lower, self.upper), (Some(l), Some(u)) if l > u)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    pub label: String,
    /// Value with every control at its neutral, zero-contribution state.
    pub baseline: f64,
    #[serde(default)]
    pub bounds: MetricBounds,
    #[serde(default)]
    pub direction: Direction,
    pub format: MetricFormat,
}

impl MetricSpec {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        baseline: f64,
        bounds: MetricBounds,
        format: MetricFormat,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            baseline,
            bounds,
            direction: Direction::HigherIsBetter,
            format,
        }
    }

    pub fn lower_is_better(mut self) -> Self {
        self.direction = Direction::LowerIsBetter;
        self
    }
}

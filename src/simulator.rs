// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Parametric Outcome Simulator

//! Controls in, clamped metrics out.
//!
//! Every accepted control change triggers a full, synchronous recomputation:
//! the formula receives the complete control vector, unset or non-finite
//! outputs fall back to the metric baseline, and only then is each metric
//! clamped to its declared bounds.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{DefinitionError, SimulatorError};
use crate::formula::{ControlValues, Formula, FormulaSpec, RawMetrics};
use crate::types::{ControlKind, ControlSpec, ControlValue, MetricSpec};

// ─── SimulatorState ──────────────────────────────────────────────────────────

/// Current value of each control, in control declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorState {
    values: Vec<ControlValue>,
}

impl SimulatorState {
    pub fn defaults(controls: &[ControlSpec]) -> Self {
        Self { values: controls.iter().map(ControlSpec::default_value).collect() }
    }

    pub fn values(&self) -> &[ControlValue] {
        &self.values
    }
}

// ─── MetricReading ───────────────────────────────────────────────────────────

/// One published metric after a recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReading {
    pub name: String,
    /// Clamped value; always within the metric's bounds.
    pub value: f64,
    /// Formula output before clamping (baseline when the formula gave none).
    pub raw: f64,
    pub clamped: bool,
    pub fell_back: bool,
}

impl MetricReading {
    fn derive(spec: &MetricSpec, raw: Option<f64>) -> Self {
        let (raw, fell_back) = match raw {
            Some(v) if v.is_finite() => (v, false),
            _ => (spec.baseline, true),
        };
        let value = spec.bounds.clamp(raw);
        Self {
            name: spec.name.clone(),
            value,
            raw,
            clamped: value != raw,
            fell_back,
        }
    }
}

// ─── ParametricSimulator ─────────────────────────────────────────────────────

pub struct ParametricSimulator {
    controls: Vec<ControlSpec>,
    metrics: Vec<MetricSpec>,
    formula: FormulaSpec,
    state: SimulatorState,
    readings: Vec<MetricReading>,
    recomputations: u64,
}

impl ParametricSimulator {
    /// Build a simulator, dropping duplicate or unusable controls and metrics.
    /// Formula references to dropped or unknown names are reported; the
    /// formula itself treats them as inert.
    pub fn new(
        controls: Vec<ControlSpec>,
        metrics: Vec<MetricSpec>,
        formula: impl Into<FormulaSpec>,
    ) -> (Self, Vec<DefinitionError>) {
        let mut issues = Vec::new();
        let controls = filter_controls(controls, &mut issues);
        let metrics = filter_metrics(metrics, &mut issues);
        let formula = formula.into();

        {
            let mut seen_controls = HashSet::new();
            let mut seen_metrics = HashSet::new();
            for r in formula.references() {
                if !controls.iter().any(|c| c.name == r.control) && seen_controls.insert(r.control) {
                    warn!(control = r.control, "formula references unknown control");
                    issues.push(DefinitionError::UnknownFormulaControl(r.control.to_string()));
                }
                if !metrics.iter().any(|m| m.name == r.metric) && seen_metrics.insert(r.metric) {
                    warn!(metric = r.metric, "formula references unknown metric");
                    issues.push(DefinitionError::UnknownFormulaMetric(r.metric.to_string()));
                }
            }
        }

        let state = SimulatorState::defaults(&controls);
        let mut sim = Self {
            controls,
            metrics,
            formula,
            state,
            readings: Vec::new(),
            recomputations: 0,
        };
        sim.recompute();
        (sim, issues)
    }

    pub fn controls(&self) -> &[ControlSpec] {
        &self.controls
    }

    pub fn metric_specs(&self) -> &[MetricSpec] {
        &self.metrics
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    pub fn metrics(&self) -> &[MetricReading] {
        &self.readings
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.readings.iter().find(|r| r.name == name).map(|r| r.value)
    }

    pub fn control_value(&self, name: &str) -> Option<ControlValue> {
        self.index_of(name).ok().map(|i| self.state.values[i])
    }

    /// Number of recomputations since construction, the initial one included.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    // -----------------------------------------------------------------------
    // Input boundary
    // -----------------------------------------------------------------------

    /// Move a slider. Out-of-range values are clamped and snapped to the
    /// step grid before the formula ever sees them.
    pub fn set_control(&mut self, name: &str, value: f64) -> Result<&[MetricReading], SimulatorError> {
        let i = self.index_of(name)?;
        let spec = &self.controls[i];
        if !matches!(spec.kind, ControlKind::Continuous { .. }) {
            return Err(SimulatorError::KindMismatch {
                name: name.to_string(),
                found: spec.kind.name(),
            });
        }
        if !value.is_finite() {
            return Err(SimulatorError::NonFiniteInput { name: name.to_string() });
        }
        let admitted = spec.admit(value);
        if admitted != value {
            trace!(control = name, requested = value, admitted, "control value adjusted");
        }
        self.state.values[i] = ControlValue::Continuous(admitted);
        self.recompute();
        Ok(&self.readings)
    }

    pub fn set_flag(&mut self, name: &str, on: bool) -> Result<&[MetricReading], SimulatorError> {
        let i = self.boolean_index(name)?;
        self.state.values[i] = ControlValue::Boolean(on);
        self.recompute();
        Ok(&self.readings)
    }

    /// Flip a toggle and return its new state.
    pub fn toggle(&mut self, name: &str) -> Result<bool, SimulatorError> {
        let i = self.boolean_index(name)?;
        let on = !self.state.values[i].as_bool();
        self.state.values[i] = ControlValue::Boolean(on);
        self.recompute();
        Ok(on)
    }

    /// Dispatch on the value's shape.
    pub fn set(&mut self, name: &str, value: ControlValue) -> Result<&[MetricReading], SimulatorError> {
        match value {
            ControlValue::Continuous(v) => self.set_control(name, v),
            ControlValue::Boolean(b) => self.set_flag(name, b),
        }
    }

    /// Return every control to its declared default.
    pub fn reset(&mut self) -> &[MetricReading] {
        self.state = SimulatorState::defaults(&self.controls);
        self.recompute();
        &self.readings
    }

    /// Replace the whole control vector, re-admitting every value.
    pub fn restore(&mut self, state: &SimulatorState) -> Result<&[MetricReading], SimulatorError> {
        if state.values.len() != self.controls.len() {
            return Err(SimulatorError::StateShape {
                expected: self.controls.len(),
                actual: state.values.len(),
            });
        }
        let mut values = Vec::with_capacity(self.controls.len());
        for (spec, value) in self.controls.iter().zip(&state.values) {
            let admitted = match (spec.kind, *value) {
                (ControlKind::Boolean { .. }, v) => ControlValue::Boolean(v.as_bool()),
                (ControlKind::Continuous { .. }, v) => {
                    let raw = v.as_f64();
                    if !raw.is_finite() {
                        return Err(SimulatorError::NonFiniteInput { name: spec.name.clone() });
                    }
                    ControlValue::Continuous(spec.admit(raw))
                }
            };
            values.push(admitted);
        }
        self.state = SimulatorState { values };
        self.recompute();
        Ok(&self.readings)
    }

    // -----------------------------------------------------------------------
    // Recomputation
    // -----------------------------------------------------------------------

    fn recompute(&mut self) {
        let view = ControlValues::new(&self.controls, &self.state.values);
        let mut raw = RawMetrics::new(&self.metrics);
        self.formula.evaluate(&view, &mut raw);

        self.readings = self
            .metrics
            .iter()
            .zip(raw.into_values())
            .map(|(spec, raw)| {
                let reading = MetricReading::derive(spec, raw);
                if reading.fell_back {
                    warn!(metric = %spec.name, "formula produced no usable value, using baseline");
                }
                reading
            })
            .collect();
        self.recomputations += 1;
        debug!(
            formula = self.formula.name(),
            recomputations = self.recomputations,
            "metrics recomputed"
        );
    }

    fn index_of(&self, name: &str) -> Result<usize, SimulatorError> {
        self.controls
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SimulatorError::UnknownControl(name.to_string()))
    }

    fn boolean_index(&self, name: &str) -> Result<usize, SimulatorError> {
        let i = self.index_of(name)?;
        match self.controls[i].kind {
            ControlKind::Boolean { .. } => Ok(i),
            kind @ ControlKind::Continuous { .. } => Err(SimulatorError::KindMismatch {
                name: name.to_string(),
                found: kind.name(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Definition filtering
// ---------------------------------------------------------------------------

fn filter_controls(controls: Vec<ControlSpec>, issues: &mut Vec<DefinitionError>) -> Vec<ControlSpec> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(controls.len());
    for control in controls {
        if !seen.insert(control.name.clone()) {
            warn!(control = %control.name, "duplicate control dropped");
            issues.push(DefinitionError::DuplicateControl(control.name));
        } else if let Some(reason) = control.range_problem() {
            warn!(control = %control.name, %reason, "control dropped");
            issues.push(DefinitionError::InvalidControl { name: control.name, reason });
        } else {
            kept.push(control);
        }
    }
    kept
}

fn filter_metrics(metrics: Vec<MetricSpec>, issues: &mut Vec<DefinitionError>) -> Vec<MetricSpec> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let reason = if !metric.baseline.is_finite() {
            Some("baseline must be finite".to_string())
        } else if metric.bounds.is_inverted() {
            Some("lower bound exceeds upper bound".to_string())
        } else {
            None
        };
        if !seen.insert(metric.name.clone()) {
            warn!(metric = %metric.name, "duplicate metric dropped");
            issues.push(DefinitionError::DuplicateMetric(metric.name));
        } else if let Some(reason) = reason {
            warn!(metric = %metric.name, %reason, "metric dropped");
            issues.push(DefinitionError::InvalidMetric { name: metric.name, reason });
        } else {
            kept.push(metric);
        }
    }
    kept
}

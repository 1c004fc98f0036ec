//! Transformation functions: current control values in, raw metric values out.
//!
//! The simulator is agnostic to the formula. A scenario either declares a
//! [`LinearFormula`] (loadable from JSON) or attaches an [`FnFormula`] closure
//! for shapes a sum of terms cannot express. Either way the formula sees the
//! whole control vector on every call and never its own previous output.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::types::{ControlSpec, ControlValue, MetricSpec};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Read-only view of every control's current value, addressed by name.
pub struct ControlValues<'a> {
    specs: &'a [ControlSpec],
    values: &'a [ControlValue],
}

impl<'a> ControlValues<'a> {
    pub fn new(specs: &'a [ControlSpec], values: &'a [ControlValue]) -> Self {
        Self { specs, values }
    }

    pub fn get(&self, name: &str) -> Option<ControlValue> {
        self.specs
            .iter()
            .position(|s| s.name == name)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Numeric value of a control; unknown names read as 0.0.
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).map_or(0.0, |v| v.as_f64())
    }

    /// Toggle state of a control; unknown names read as off.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map_or(false, |v| v.as_bool())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, ControlValue)> + '_ {
        self.specs.iter().map(|s| s.name.as_str()).zip(self.values.iter().copied())
    }
}

/// Raw metric values produced by one formula evaluation, aligned with the
/// simulator's metric specs. A slot left unset falls back to its baseline.
pub struct RawMetrics<'a> {
    specs: &'a [MetricSpec],
    values: Vec<Option<f64>>,
}

impl<'a> RawMetrics<'a> {
    pub fn new(specs: &'a [MetricSpec]) -> Self {
        Self { specs, values: vec![None; specs.len()] }
    }

    fn slot(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Declared baseline of `name`, or 0.0 for an unknown metric.
    pub fn baseline(&self, name: &str) -> f64 {
        self.slot(name).map_or(0.0, |i| self.specs[i].baseline)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.slot(name).and_then(|i| self.values[i])
    }

    /// Returns false when `name` is not a metric of this simulator.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match self.slot(name) {
            Some(i) => {
                self.values[i] = Some(value);
                true
            }
            None => false,
        }
    }

    /// Add `delta` to the metric, starting from its baseline if unset.
    pub fn add(&mut self, name: &str, delta: f64) -> bool {
        match self.slot(name) {
            Some(i) => {
                let current = self.values[i].unwrap_or(self.specs[i].baseline);
                self.values[i] = Some(current + delta);
                true
            }
            None => false,
        }
    }

    pub fn into_values(self) -> Vec<Option<f64>> {
        self.values
    }
}

/// A (control, metric) pair a formula depends on, used for definition checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaRef<'a> {
    pub control: &'a str,
    pub metric: &'a str,
}

// ---------------------------------------------------------------------------
// Formula trait
// ---------------------------------------------------------------------------

pub trait Formula {
    fn evaluate(&self, controls: &ControlValues<'_>, raw: &mut RawMetrics<'_>);

    /// Names the formula refers to. Opaque formulas report nothing.
    fn references(&self) -> Vec<FormulaRef<'_>> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// LinearFormula
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepWhen {
    #[default]
    AtOrAbove,
    AtOrBelow,
}

/// One additive contribution of a control to a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "term", rename_all = "snake_case")]
pub enum Term {
    /// `delta` while the toggle is on, nothing while off.
    Flag { control: String, metric: String, delta: f64 },
    /// `per_unit * (value - pivot)`; the pivot is the zero-contribution value.
    Scaled {
        control: String,
        metric: String,
        per_unit: f64,
        #[serde(default)]
        pivot: f64,
    },
    /// `delta` once the value crosses `cutoff` (inclusive).
    Step {
        control: String,
        metric: String,
        cutoff: f64,
        delta: f64,
        #[serde(default)]
        when: StepWhen,
    },
}

impl Term {
    pub fn flag(control: &str, metric: &str, delta: f64) -> Self {
        Self::Flag { control: control.to_string(), metric: metric.to_string(), delta }
    }

    pub fn scaled(control: &str, metric: &str, per_unit: f64, pivot: f64) -> Self {
        Self::Scaled {
            control: control.to_string(),
            metric: metric.to_string(),
            per_unit,
            pivot,
        }
    }

    pub fn step_above(control: &str, metric: &str, cutoff: f64, delta: f64) -> Self {
        Self::Step {
            control: control.to_string(),
            metric: metric.to_string(),
            cutoff,
            delta,
            when: StepWhen::AtOrAbove,
        }
    }

    pub fn step_below(control: &str, metric: &str, cutoff: f64, delta: f64) -> Self {
        Self::Step {
            control: control.to_string(),
            metric: metric.to_string(),
            cutoff,
            delta,
            when: StepWhen::AtOrBelow,
        }
    }

    fn target(&self) -> FormulaRef<'_> {
        match self {
            Self::Flag { control, metric, .. }
            | Self::Scaled { control, metric, .. }
            | Self::Step { control, metric, .. } => FormulaRef { control, metric },
        }
    }

    fn contribution(&self, controls: &ControlValues<'_>) -> f64 {
        match self {
            Self::Flag { control, delta, .. } => {
                if controls.flag(control) { *delta } else { 0.0 }
            }
            Self::Scaled { control, per_unit, pivot, .. } => {
                per_unit * (controls.value(control) - pivot)
            }
            Self::Step { control, cutoff, delta, when, .. } => {
                let v = controls.value(control);
                let crossed = match when {
                    StepWhen::AtOrAbove => v >= *cutoff,
                    StepWhen::AtOrBelow => v <= *cutoff,
                };
                if crossed { *delta } else { 0.0 }
            }
        }
    }
}

/// `metric = baseline + sum(terms targeting metric)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearFormula {
    pub terms: Vec<Term>,
}

impl LinearFormula {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }
}

impl Formula for LinearFormula {
    fn evaluate(&self, controls: &ControlValues<'_>, raw: &mut RawMetrics<'_>) {
        for (slot, spec) in raw.values.iter_mut().zip(raw.specs) {
            *slot = Some(spec.baseline);
        }
        for term in &self.terms {
            // Terms aimed at unknown metrics were reported at construction.
            raw.add(term.target().metric, term.contribution(controls));
        }
    }

    fn references(&self) -> Vec<FormulaRef<'_>> {
        self.terms.iter().map(Term::target).collect()
    }
}

// ---------------------------------------------------------------------------
// FnFormula
// ---------------------------------------------------------------------------

type FormulaFn = dyn Fn(&ControlValues<'_>, &mut RawMetrics<'_>);

/// Closure-backed formula for products, ratios and other non-additive shapes.
#[derive(Clone)]
pub struct FnFormula {
    name: &'static str,
    f: Rc<FormulaFn>,
}

impl FnFormula {
    pub fn new(
        name: &'static str,
        f: impl Fn(&ControlValues<'_>, &mut RawMetrics<'_>) + 'static,
    ) -> Self {
        Self { name, f: Rc::new(f) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for FnFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFormula").field("name", &self.name).finish()
    }
}

impl Formula for FnFormula {
    fn evaluate(&self, controls: &ControlValues<'_>, raw: &mut RawMetrics<'_>) {
        (self.f)(controls, raw)
    }
}

// ---------------------------------------------------------------------------
// FormulaSpec
// ---------------------------------------------------------------------------

/// The formula slot of a scenario definition. Only the linear form
/// round-trips through JSON; closures are attached in Rust.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaSpec {
    Linear(LinearFormula),
    #[serde(skip)]
    Custom(FnFormula),
}

impl FormulaSpec {
    /// Short name for logs: `linear`, or the closure's own name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Custom(f) => f.name(),
        }
    }
}

impl From<LinearFormula> for FormulaSpec {
    fn from(f: LinearFormula) -> Self {
        Self::Linear(f)
    }
}

impl From<FnFormula> for FormulaSpec {
    fn from(f: FnFormula) -> Self {
        Self::Custom(f)
    }
}

impl Formula for FormulaSpec {
    fn evaluate(&self, controls: &ControlValues<'_>, raw: &mut RawMetrics<'_>) {
        match self {
            Self::Linear(f) => f.evaluate(controls, raw),
            Self::Custom(f) => f.evaluate(controls, raw),
        }
    }

    fn references(&self) -> Vec<FormulaRef<'_>> {
        match self {
            Self::Linear(f) => f.references(),
            Self::Custom(f) => f.references(),
        }
    }
}

// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Scenario Definition and Screen Glue

//! A scenario screen mounts one stage graph, one detail lookup, one
//! simulator and one threshold evaluator from a single definition bundle.
//! The two halves share no state; the screen only routes events and
//! assembles the render tree.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detail::{DetailLookup, DetailPanel};
use crate::error::{DefinitionError, SimulatorError};
use crate::formula::FormulaSpec;
use crate::graph::{GraphView, SelectionChange, StageGraph};
use crate::simulator::ParametricSimulator;
use crate::threshold::{Threshold, ThresholdEvaluator, Verdict};
use crate::types::{
    ControlKind, ControlSpec, ControlValue, DetailRecord, Direction, MetricSpec, StageEdge,
    StageId, StageNode,
};

// ─── ScenarioDefinition ──────────────────────────────────────────────────────

/// Immutable per-screen bundle, consumed once at mount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub stages: Vec<StageNode>,
    #[serde(default)]
    pub edges: Vec<StageEdge>,
    #[serde(default)]
    pub details: Vec<DetailRecord>,
    pub controls: Vec<ControlSpec>,
    pub metrics: Vec<MetricSpec>,
    pub formula: FormulaSpec,
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
    pub success_message: String,
    pub guidance_message: String,
}

impl ScenarioDefinition {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every problem a mount would filter or report, without mounting.
    pub fn validate(&self) -> Vec<DefinitionError> {
        ScenarioScreen::new(self.clone()).issues
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenEvent {
    SelectStage { stage: StageId },
    ClearSelection,
    SelectNext,
    SelectPrevious,
    SetControl { name: String, value: f64 },
    SetFlag { name: String, value: bool },
    Toggle { name: String },
    Reset,
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ControlView {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    pub value: ControlValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricView {
    pub name: String,
    pub label: String,
    pub value: f64,
    /// Rounded to the metric's display precision.
    pub display: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub direction: Direction,
}

/// Full render tree for one screen, re-emitted after every event.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub graph: GraphView,
    pub detail: DetailPanel,
    pub controls: Vec<ControlView>,
    pub metrics: Vec<MetricView>,
    pub verdict: Verdict,
}

// ─── ScenarioScreen ──────────────────────────────────────────────────────────

pub struct ScenarioScreen {
    id: String,
    title: String,
    summary: String,
    graph: StageGraph,
    details: DetailLookup,
    simulator: ParametricSimulator,
    evaluator: ThresholdEvaluator,
    issues: Vec<DefinitionError>,
}

impl ScenarioScreen {
    /// Mount a screen. Broken parts of the definition are filtered out and
    /// kept in [`issues`](Self::issues); mounting itself never fails.
    pub fn new(def: ScenarioDefinition) -> Self {
        let mut issues = Vec::new();

        let (graph, graph_issues) = StageGraph::new(def.stages, def.edges);
        issues.extend(graph_issues);

        let (details, detail_issues) = DetailLookup::new(def.details, &graph);
        issues.extend(detail_issues);

        let (simulator, sim_issues) = ParametricSimulator::new(def.controls, def.metrics, def.formula);
        issues.extend(sim_issues);

        let (evaluator, threshold_issues) = ThresholdEvaluator::new(
            def.thresholds,
            simulator.metric_specs(),
            def.success_message,
            def.guidance_message,
        );
        issues.extend(threshold_issues);

        if !issues.is_empty() {
            warn!(scenario = %def.id, issues = issues.len(), "scenario mounted with definition issues");
        }
        debug!(scenario = %def.id, "scenario mounted");

        Self {
            id: def.id,
            title: def.title,
            summary: def.summary,
            graph,
            details,
            simulator,
            evaluator,
            issues,
        }
    }

    /// Strict mount: fail on the first issue that would remove something.
    /// Advisory issues (missing detail, cycle) are tolerated.
    pub fn try_new(def: ScenarioDefinition) -> Result<Self, DefinitionError> {
        let screen = Self::new(def);
        match screen.issues.iter().find(|i| !i.is_advisory()) {
            Some(issue) => Err(issue.clone()),
            None => Ok(screen),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn issues(&self) -> &[DefinitionError] {
        &self.issues
    }

    pub fn graph(&self) -> &StageGraph {
        &self.graph
    }

    pub fn details(&self) -> &DetailLookup {
        &self.details
    }

    pub fn simulator(&self) -> &ParametricSimulator {
        &self.simulator
    }

    pub fn evaluator(&self) -> &ThresholdEvaluator {
        &self.evaluator
    }

    // -----------------------------------------------------------------------
    // Interaction
    // -----------------------------------------------------------------------

    pub fn select_stage(&mut self, stage: &StageId) -> SelectionChange {
        self.graph.select(stage)
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        self.graph.clear_selection()
    }

    pub fn set_control(&mut self, name: &str, value: f64) -> Result<(), SimulatorError> {
        self.simulator.set_control(name, value).map(|_| ())
    }

    pub fn set_flag(&mut self, name: &str, on: bool) -> Result<(), SimulatorError> {
        self.simulator.set_flag(name, on).map(|_| ())
    }

    pub fn toggle(&mut self, name: &str) -> Result<bool, SimulatorError> {
        self.simulator.toggle(name)
    }

    /// Controls back to defaults. The stage selection is left alone.
    pub fn reset(&mut self) {
        self.simulator.reset();
    }

    /// Apply one event. Graph events never fail; a rejected control event
    /// is returned and changes nothing.
    pub fn apply(&mut self, event: ScreenEvent) -> Result<(), SimulatorError> {
        match event {
            ScreenEvent::SelectStage { stage } => {
                self.select_stage(&stage);
            }
            ScreenEvent::ClearSelection => {
                self.clear_selection();
            }
            ScreenEvent::SelectNext => {
                self.graph.select_next();
            }
            ScreenEvent::SelectPrevious => {
                self.graph.select_previous();
            }
            ScreenEvent::SetControl { name, value } => self.set_control(&name, value)?,
            ScreenEvent::SetFlag { name, value } => self.set_flag(&name, value)?,
            ScreenEvent::Toggle { name } => {
                self.toggle(&name)?;
            }
            ScreenEvent::Reset => self.reset(),
        }
        Ok(())
    }

    /// Apply one event and re-render. Rejected control events are logged and
    /// the unchanged screen is rendered.
    pub fn dispatch(&mut self, event: ScreenEvent) -> ScreenView {
        if let Err(e) = self.apply(event) {
            warn!(scenario = %self.id, error = %e, "event rejected");
        }
        self.render()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn detail_panel(&self) -> DetailPanel {
        self.details.panel_for(self.graph.selection())
    }

    pub fn verdict(&self) -> Verdict {
        self.evaluator.evaluate(self.simulator.metrics())
    }

    pub fn render(&self) -> ScreenView {
        let controls = self
            .simulator
            .controls()
            .iter()
            .zip(self.simulator.state().values())
            .map(|(spec, value)| ControlView {
                name: spec.name.clone(),
                label: spec.label.clone(),
                kind: spec.kind,
                value: *value,
            })
            .collect();

        let metrics = self
            .simulator
            .metric_specs()
            .iter()
            .zip(self.simulator.metrics())
            .map(|(spec, reading)| MetricView {
                name: spec.name.clone(),
                label: spec.label.clone(),
                value: reading.value,
                display: spec.format.render(reading.value),
                lower: spec.bounds.lower,
                upper: spec.bounds.upper,
                direction: spec.direction,
            })
            .collect();

        ScreenView {
            id: self.id.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            graph: self.graph.render(),
            detail: self.detail_panel(),
            controls,
            metrics,
            verdict: self.verdict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MetricFormat;
    use crate::formula::{LinearFormula, Term};
    use crate::types::{MetricBounds, Position, StageCategory};

    fn definition() -> ScenarioDefinition {
        ScenarioDefinition {
            id: "abc".into(),
            title: "ABC".into(),
            summary: String::new(),
            stages: vec![
                StageNode::new("a", "A", StageCategory::Research, Position::new(0.0, 0.0)),
                StageNode::new("b", "B", StageCategory::Design, Position::new(1.0, 0.0)),
                StageNode::new("c", "C", StageCategory::Outcome, Position::new(2.0, 0.0)),
            ],
            edges: vec![StageEdge::new("a", "b"), StageEdge::new("b", "c")],
            details: vec![
                DetailRecord { stage: "a".into(), title: "Stage A".into(), ..Default::default() },
                DetailRecord { stage: "b".into(), title: "Stage B".into(), ..Default::default() },
            ],
            controls: vec![ControlSpec::boolean("x", "X", false)],
            metrics: vec![MetricSpec::new(
                "m",
                "M",
                20.0,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(1),
            )],
            formula: LinearFormula::new(vec![Term::flag("x", "m", 10.0)]).into(),
            thresholds: vec![Threshold::at_least("m", 25.0)],
            success_message: "Nice.".into(),
            guidance_message: "Turn on X.".into(),
        }
    }

    #[test]
    fn mount_reports_missing_detail_only() {
        let screen = ScenarioScreen::new(definition());
        assert_eq!(screen.issues(), &[DefinitionError::MissingDetail("c".into())]);
        assert!(ScenarioScreen::try_new(definition()).is_ok());
    }

    #[test]
    fn selection_drives_detail_panel() {
        let mut screen = ScenarioScreen::new(definition());
        assert_eq!(screen.render().detail, DetailPanel::Empty);

        let view = screen.dispatch(ScreenEvent::SelectStage { stage: "a".into() });
        assert_eq!(view.detail.record().map(|r| r.title.as_str()), Some("Stage A"));

        let view = screen.dispatch(ScreenEvent::SelectStage { stage: "c".into() });
        assert!(view.detail.is_placeholder());
        assert_eq!(view.graph.selected, Some("c".into()));
    }

    #[test]
    fn control_events_drive_verdict() {
        let mut screen = ScenarioScreen::new(definition());
        let view = screen.render();
        assert!(!view.verdict.passed);
        assert_eq!(view.verdict.message, "Turn on X.");
        assert_eq!(view.metrics[0].display, "20.0%");

        let view = screen.dispatch(ScreenEvent::Toggle { name: "x".into() });
        assert!(view.verdict.passed);
        assert_eq!(view.metrics[0].display, "30.0%");

        let view = screen.dispatch(ScreenEvent::Reset);
        assert!(!view.verdict.passed);
        assert_eq!(view.metrics[0].value, 20.0);
    }

    #[test]
    fn rejected_event_renders_unchanged_screen() {
        let mut screen = ScenarioScreen::new(definition());
        assert!(screen.apply(ScreenEvent::SetControl { name: "x".into(), value: 1.0 }).is_err());
        let view = screen.dispatch(ScreenEvent::Toggle { name: "missing".into() });
        assert_eq!(view.metrics[0].value, 20.0);
    }

    #[test]
    fn reset_keeps_selection() {
        let mut screen = ScenarioScreen::new(definition());
        screen.select_stage(&"b".into());
        screen.toggle("x").expect("test: x is a toggle");
        screen.reset();
        assert_eq!(screen.graph().selection(), Some(&StageId::from("b")));
    }

    #[test]
    fn strict_mount_rejects_dangling_edge() {
        let mut def = definition();
        def.edges.push(StageEdge::new("c", "nowhere"));
        let err = ScenarioScreen::try_new(def.clone()).err();
        assert!(matches!(err, Some(DefinitionError::DanglingEdge { .. })));

        // The lenient mount still works and simply drops the edge.
        let screen = ScenarioScreen::new(def);
        assert_eq!(screen.graph().edges().len(), 2);
    }

    #[test]
    fn event_json_shape() {
        let e: ScreenEvent =
            serde_json::from_str(r#"{"type":"set_control","name":"price","value":42}"#)
                .expect("test: valid event json");
        assert_eq!(e, ScreenEvent::SetControl { name: "price".into(), value: 42.0 });
        let e: ScreenEvent = serde_json::from_str(r#"{"type":"reset"}"#).expect("test: valid event json");
        assert_eq!(e, ScreenEvent::Reset);
    }
}

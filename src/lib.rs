// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer ("Case Study Screens")

pub mod types;
pub mod error;
pub mod format;
pub mod style;
pub mod graph;
pub mod detail;
pub mod formula;
pub mod simulator;
pub mod threshold;
pub mod scenario;
pub mod catalog;

pub use types::*;
pub use error::{DefinitionError, SimulatorError};
pub use graph::{SelectionChange, StageGraph};
pub use detail::{DetailLookup, DetailPanel};
pub use formula::{FnFormula, Formula, FormulaSpec, LinearFormula, Term};
pub use simulator::{MetricReading, ParametricSimulator, SimulatorState};
pub use threshold::{Threshold, ThresholdEvaluator, Verdict};
pub use scenario::{ScenarioDefinition, ScenarioScreen, ScreenEvent, ScreenView};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct ScenarioExplorer {
    screen: ScenarioScreen,
}

fn mount(def: ScenarioDefinition) -> ScenarioExplorer {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    ScenarioExplorer { screen: ScenarioScreen::new(def) }
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
impl ScenarioExplorer {
    /// Mount a built-in case study by id.
    #[wasm_bindgen(constructor)]
    pub fn new(scenario_id: &str) -> Result<ScenarioExplorer, JsError> {
        let def = catalog::definition(scenario_id).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(mount(def))
    }

    /// Mount a scenario from a JSON definition (linear formulas only).
    pub fn from_json(json: &str) -> Result<ScenarioExplorer, JsError> {
        let def = ScenarioDefinition::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(mount(def))
    }

    pub fn id(&self) -> String {
        self.screen.id().to_string()
    }

    pub fn title(&self) -> String {
        self.screen.title().to_string()
    }

    pub fn select_stage(&mut self, stage_id: &str) -> JsValue {
        let change = self.screen.select_stage(&StageId::from(stage_id));
        to_js(&change)
    }

    pub fn clear_selection(&mut self) -> JsValue {
        to_js(&self.screen.clear_selection())
    }

    pub fn selection(&self) -> Option<String> {
        self.screen.graph().selection().map(|id| id.to_string())
    }

    pub fn set_control(&mut self, name: &str, value: f64) -> Result<(), JsError> {
        self.screen.set_control(name, value).map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn set_flag(&mut self, name: &str, on: bool) -> Result<(), JsError> {
        self.screen.set_flag(name, on).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Flip a toggle and return its new state.
    pub fn toggle_control(&mut self, name: &str) -> Result<bool, JsError> {
        self.screen.toggle(name).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Controls back to defaults; selection is kept.
    pub fn reset(&mut self) {
        self.screen.reset();
    }

    /// Apply a `ScreenEvent` object and return the new view.
    pub fn dispatch(&mut self, event: JsValue) -> Result<JsValue, JsError> {
        let event: ScreenEvent =
            serde_wasm_bindgen::from_value(event).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(to_js(&self.screen.dispatch(event)))
    }

    pub fn render(&self) -> JsValue {
        to_js(&self.screen.render())
    }

    pub fn verdict(&self) -> JsValue {
        to_js(&self.screen.verdict())
    }

    pub fn definition_issues(&self) -> JsValue {
        let issues: Vec<String> = self.screen.issues().iter().map(|e| e.to_string()).collect();
        to_js(&issues)
    }
}

/// Ids of the built-in case studies, in menu order.
#[wasm_bindgen]
pub fn scenario_ids() -> JsValue {
    to_js(&catalog::scenario_ids())
}

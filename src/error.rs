//! Error types for scenario definitions and simulator input.

use crate::types::StageId;

// ---------------------------------------------------------------------------
// Definition errors
// ---------------------------------------------------------------------------

/// Problems found in a scenario bundle at construction time.
///
/// None of these are fatal for the non-strict constructors: the offending
/// item is filtered out (or, for advisory variants, merely reported) and the
/// screen still mounts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("duplicate stage id `{0}`")]
    DuplicateStage(StageId),

    #[error("edge {from} -> {to} references unknown stage `{missing}`")]
    DanglingEdge { from: StageId, to: StageId, missing: StageId },

    #[error("detail record for unknown stage `{0}`")]
    OrphanDetail(StageId),

    #[error("duplicate detail record for stage `{0}`")]
    DuplicateDetail(StageId),

    #[error("stage `{0}` has no detail record")]
    MissingDetail(StageId),

    #[error("stage graph contains a cycle")]
    Cycle,

    #[error("duplicate control `{0}`")]
    DuplicateControl(String),

    #[error("control `{name}` rejected: {reason}")]
    InvalidControl { name: String, reason: String },

    #[error("duplicate metric `{0}`")]
    DuplicateMetric(String),

    #[error("metric `{name}` rejected: {reason}")]
    InvalidMetric { name: String, reason: String },

    #[error("threshold references unknown metric `{0}`")]
    UnknownThresholdMetric(String),

    #[error("threshold on `{metric}` has a non-finite target")]
    InvalidThreshold { metric: String },

    #[error("formula references unknown control `{0}`")]
    UnknownFormulaControl(String),

    #[error("formula references unknown metric `{0}`")]
    UnknownFormulaMetric(String),

    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("malformed scenario definition: {0}")]
    Parse(String),
}

impl DefinitionError {
    /// Advisory issues are reported but remove nothing from the scenario.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Self::MissingDetail(_) | Self::Cycle)
    }
}

impl From<serde_json::Error> for DefinitionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Simulator errors
// ---------------------------------------------------------------------------

/// Rejected control interactions. State is left untouched when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulatorError {
    #[error("unknown control `{0}`")]
    UnknownControl(String),

    #[error("control `{name}` is a {found} control")]
    KindMismatch { name: String, found: &'static str },

    #[error("non-finite value for control `{name}`")]
    NonFiniteInput { name: String },

    #[error("state carries {actual} control values, simulator has {expected}")]
    StateShape { expected: usize, actual: usize },
}

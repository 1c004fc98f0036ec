// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Detail Lookup

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::error::DefinitionError;
use crate::graph::StageGraph;
use crate::types::{DetailRecord, StageId};

pub const NO_DETAIL_MESSAGE: &str = "No detail available for this stage.";

/// What the side panel shows for the current selection. Each lookup
/// produces a whole new panel; nothing carries over from the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum DetailPanel {
    Empty,
    Record(DetailRecord),
    Placeholder { stage: StageId, message: &'static str },
}

impl DetailPanel {
    pub fn record(&self) -> Option<&DetailRecord> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Read-only map from stage id to its detail record.
#[derive(Debug, Clone, Default)]
pub struct DetailLookup {
    records: HashMap<StageId, DetailRecord>,
}

impl DetailLookup {
    /// Keep records whose stage exists in `graph`; the first record per stage
    /// wins. Stages without a record are reported as advisory issues.
    pub fn new(records: Vec<DetailRecord>, graph: &StageGraph) -> (Self, Vec<DefinitionError>) {
        let mut issues = Vec::new();
        let mut map = HashMap::with_capacity(records.len());

        for record in records {
            if !graph.contains(&record.stage) {
                warn!(stage = %record.stage, "detail record for unknown stage dropped");
                issues.push(DefinitionError::OrphanDetail(record.stage));
            } else if map.contains_key(&record.stage) {
                warn!(stage = %record.stage, "duplicate detail record dropped");
                issues.push(DefinitionError::DuplicateDetail(record.stage));
            } else {
                map.insert(record.stage.clone(), record);
            }
        }

        for node in graph.nodes() {
            if !map.contains_key(&node.id) {
                issues.push(DefinitionError::MissingDetail(node.id.clone()));
            }
        }

        (Self { records: map }, issues)
    }

    pub fn lookup(&self, id: &StageId) -> Option<&DetailRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn panel_for(&self, selection: Option<&StageId>) -> DetailPanel {
        match selection {
            None => DetailPanel::Empty,
            Some(id) => match self.lookup(id) {
                Some(record) => DetailPanel::Record(record.clone()),
                None => DetailPanel::Placeholder {
                    stage: id.clone(),
                    message: NO_DETAIL_MESSAGE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, StageCategory, StageEdge, StageNode};

    fn graph() -> StageGraph {
        let nodes = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, id)| StageNode::new(*id, *id, StageCategory::Discovery, Position::new(i as f64, 0.0)))
            .collect();
        StageGraph::new(nodes, vec![StageEdge::new("a", "b"), StageEdge::new("b", "c")]).0
    }

    fn record(stage: &str, title: &str) -> DetailRecord {
        DetailRecord {
            stage: stage.into(),
            title: title.to_string(),
            ..DetailRecord::default()
        }
    }

    #[test]
    fn missing_record_yields_placeholder() {
        let g = graph();
        let (lookup, issues) = DetailLookup::new(vec![record("a", "A"), record("b", "B")], &g);
        assert_eq!(issues, vec![DefinitionError::MissingDetail("c".into())]);
        assert_eq!(lookup.len(), 2);
        assert!(!lookup.is_empty());

        let a = StageId::from("a");
        let c = StageId::from("c");
        assert_eq!(lookup.panel_for(Some(&a)).record().map(|r| r.title.as_str()), Some("A"));
        assert_eq!(
            lookup.panel_for(Some(&c)),
            DetailPanel::Placeholder { stage: c.clone(), message: NO_DETAIL_MESSAGE }
        );
        assert_eq!(lookup.panel_for(None), DetailPanel::Empty);
    }

    #[test]
    fn orphans_and_duplicates_filtered() {
        let g = graph();
        let (lookup, issues) = DetailLookup::new(
            vec![record("a", "first"), record("a", "second"), record("ghost", "G")],
            &g,
        );
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.lookup(&"a".into()).map(|r| r.title.as_str()), Some("first"));
        assert!(lookup.lookup(&"ghost".into()).is_none());
        assert!(issues.contains(&DefinitionError::DuplicateDetail("a".into())));
        assert!(issues.contains(&DefinitionError::OrphanDetail("ghost".into())));
    }

    #[test]
    fn no_records_means_every_stage_is_a_placeholder() {
        let g = graph();
        let (lookup, issues) = DetailLookup::new(Vec::new(), &g);
        assert!(lookup.is_empty());
        assert_eq!(issues.len(), 3);
        assert!(matches!(lookup.panel_for(Some(&"b".into())), DetailPanel::Placeholder { .. }));
    }

    #[test]
    fn panel_is_replaced_not_merged() {
        let g = graph();
        let mut a = record("a", "A");
        a.tools = vec!["Interviews".to_string()];
        let (lookup, _) = DetailLookup::new(vec![a, record("b", "B")], &g);

        let first = lookup.panel_for(Some(&"a".into()));
        let second = lookup.panel_for(Some(&"b".into()));
        assert_eq!(first.record().map(|r| r.tools.len()), Some(1));
        assert_eq!(second.record().map(|r| r.tools.len()), Some(0));
    }
}

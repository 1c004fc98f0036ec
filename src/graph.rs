// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Stage Graph

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DefinitionError;
use crate::style::CategoryStyle;
use crate::types::{Position, StageCategory, StageEdge, StageId, StageNode};

// ─── Selection State ─────────────────────────────────────────────────────────

/// The only mutable part of a stage graph: nothing, or one known stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSelectionState {
    selected: Option<StageId>,
}

impl GraphSelectionState {
    pub fn selected(&self) -> Option<&StageId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &StageId) -> bool {
        self.selected.as_ref() == Some(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", content = "stage", rename_all = "snake_case")]
pub enum SelectionChange {
    Selected(StageId),
    Cleared,
    /// Re-selecting the current stage, or clearing an empty selection.
    Unchanged,
    /// The id is not part of this graph; selection kept as it was.
    Ignored(StageId),
}

impl SelectionChange {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Selected(_) | Self::Cleared)
    }
}

// ─── Render View ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: StageId,
    pub label: String,
    pub description: String,
    pub category: StageCategory,
    pub category_label: &'static str,
    pub position: Position,
    pub style: CategoryStyle,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub from: StageId,
    pub to: StageId,
    pub label: Option<String>,
    pub start: Position,
    pub end: Position,
    pub self_edge: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub selected: Option<StageId>,
}

// ─── StageGraph ──────────────────────────────────────────────────────────────

/// Read-only stage nodes and edges decorated with a single selection.
#[derive(Debug, Clone)]
pub struct StageGraph {
    nodes: Vec<StageNode>,
    edges: Vec<StageEdge>,
    index: HashMap<StageId, usize>,
    selection: GraphSelectionState,
}

impl StageGraph {
    /// Build a graph, dropping duplicate node ids (first declaration wins) and
    /// edges whose endpoints are not in the node set. Duplicate edges and
    /// self-edges are kept. A cycle is reported but nothing is removed.
    pub fn new(nodes: Vec<StageNode>, edges: Vec<StageEdge>) -> (Self, Vec<DefinitionError>) {
        let mut issues = Vec::new();
        let mut index = HashMap::with_capacity(nodes.len());
        let mut kept_nodes = Vec::with_capacity(nodes.len());

        for node in nodes {
            if index.contains_key(&node.id) {
                warn!(stage = %node.id, "duplicate stage dropped");
                issues.push(DefinitionError::DuplicateStage(node.id));
                continue;
            }
            index.insert(node.id.clone(), kept_nodes.len());
            kept_nodes.push(node);
        }

        let mut kept_edges = Vec::with_capacity(edges.len());
        for edge in edges {
            let missing = if !index.contains_key(&edge.from) {
                Some(edge.from.clone())
            } else if !index.contains_key(&edge.to) {
                Some(edge.to.clone())
            } else {
                None
            };
            match missing {
                Some(missing) => {
                    warn!(from = %edge.from, to = %edge.to, %missing, "dangling edge dropped");
                    issues.push(DefinitionError::DanglingEdge {
                        from: edge.from,
                        to: edge.to,
                        missing,
                    });
                }
                None => kept_edges.push(edge),
            }
        }

        let graph = Self {
            nodes: kept_nodes,
            edges: kept_edges,
            index,
            selection: GraphSelectionState::default(),
        };

        if graph.has_cycle() {
            warn!("stage graph contains a cycle");
            issues.push(DefinitionError::Cycle);
        }

        debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "stage graph built");
        (graph, issues)
    }

    pub fn nodes(&self) -> &[StageNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[StageEdge] {
        &self.edges
    }

    pub fn node(&self, id: &StageId) -> Option<&StageNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &StageId) -> bool {
        self.index.contains_key(id)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select `id`, replacing any prior selection. Idempotent on re-select.
    pub fn select(&mut self, id: &StageId) -> SelectionChange {
        if !self.contains(id) {
            warn!(stage = %id, "selection of unknown stage ignored");
            return SelectionChange::Ignored(id.clone());
        }
        if self.selection.is_selected(id) {
            return SelectionChange::Unchanged;
        }
        debug!(stage = %id, "stage selected");
        self.selection.selected = Some(id.clone());
        SelectionChange::Selected(id.clone())
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        match self.selection.selected.take() {
            Some(_) => SelectionChange::Cleared,
            None => SelectionChange::Unchanged,
        }
    }

    pub fn selection(&self) -> Option<&StageId> {
        self.selection.selected()
    }

    pub fn selection_state(&self) -> &GraphSelectionState {
        &self.selection
    }

    /// Follow the first outgoing edge of the selection; from an empty
    /// selection, pick the first root.
    pub fn select_next(&mut self) -> SelectionChange {
        let target = match self.selection() {
            Some(current) => self.successors(current).first().map(|n| n.id.clone()),
            None => self.roots().first().map(|n| n.id.clone()),
        };
        match target {
            Some(id) => self.select(&id),
            None => SelectionChange::Unchanged,
        }
    }

    /// Follow the first incoming edge of the selection.
    pub fn select_previous(&mut self) -> SelectionChange {
        let target = self
            .selection()
            .and_then(|current| self.predecessors(current).first().map(|n| n.id.clone()));
        match target {
            Some(id) => self.select(&id),
            None => SelectionChange::Unchanged,
        }
    }

    // -----------------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------------

    /// Targets of edges leaving `id`, in edge order, self-edges excluded.
    pub fn successors(&self, id: &StageId) -> Vec<&StageNode> {
        self.edges
            .iter()
            .filter(|e| &e.from == id && !e.is_self_edge())
            .filter_map(|e| self.node(&e.to))
            .collect()
    }

    /// Sources of edges entering `id`, in edge order, self-edges excluded.
    pub fn predecessors(&self, id: &StageId) -> Vec<&StageNode> {
        self.edges
            .iter()
            .filter(|e| &e.to == id && !e.is_self_edge())
            .filter_map(|e| self.node(&e.from))
            .collect()
    }

    /// Nodes with no incoming edge from another node, in declaration order.
    pub fn roots(&self) -> Vec<&StageNode> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.to == n.id && !e.is_self_edge()))
            .collect()
    }

    /// Kahn's algorithm over the node index. Self-edges count as cycles.
    pub fn has_cycle(&self) -> bool {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            in_degree[self.index[&edge.to]] += 1;
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut visited = 0;
        while let Some(current) = queue.pop_front() {
            visited += 1;
            let id = &self.nodes[current].id;
            for edge in self.edges.iter().filter(|e| &e.from == id) {
                let target = self.index[&edge.to];
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    queue.push_back(target);
                }
            }
        }
        visited < self.nodes.len()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self) -> GraphView {
        let nodes = self
            .nodes
            .iter()
            .map(|n| NodeView {
                id: n.id.clone(),
                label: n.label.clone(),
                description: n.description.clone(),
                category: n.category,
                category_label: n.category.label(),
                position: n.position,
                style: *n.category.style(),
                selected: self.selection.is_selected(&n.id),
            })
            .collect();

        // Every edge is drawn, duplicates included.
        let edges = self
            .edges
            .iter()
            .map(|e| EdgeView {
                from: e.from.clone(),
                to: e.to.clone(),
                label: e.label.clone(),
                start: self.nodes[self.index[&e.from]].position,
                end: self.nodes[self.index[&e.to]].position,
                self_edge: e.is_self_edge(),
            })
            .collect();

        GraphView {
            nodes,
            edges,
            selected: self.selection.selected.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f64) -> StageNode {
        StageNode::new(id, id.to_uppercase(), StageCategory::Research, Position::new(x, 0.0))
    }

    fn chain() -> StageGraph {
        let (graph, issues) = StageGraph::new(
            vec![node("a", 0.0), node("b", 1.0), node("c", 2.0)],
            vec![StageEdge::new("a", "b"), StageEdge::new("b", "c")],
        );
        assert!(issues.is_empty());
        graph
    }

    #[test]
    fn starts_unselected() {
        let g = chain();
        assert_eq!(g.selection(), None);
        assert!(g.render().nodes.iter().all(|n| !n.selected));
    }

    #[test]
    fn select_replaces_prior_selection() {
        let mut g = chain();
        assert_eq!(g.select(&"a".into()), SelectionChange::Selected("a".into()));
        assert_eq!(g.select(&"c".into()), SelectionChange::Selected("c".into()));
        assert_eq!(g.selection(), Some(&StageId::from("c")));
        assert!(g.selection_state().is_selected(&"c".into()));
        assert!(!g.selection_state().is_selected(&"a".into()));

        let view = g.render();
        let selected: Vec<_> = view.nodes.iter().filter(|n| n.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, StageId::from("c"));
    }

    #[test]
    fn reselect_is_idempotent() {
        let mut g = chain();
        g.select(&"b".into());
        assert_eq!(g.select(&"b".into()), SelectionChange::Unchanged);
        assert_eq!(g.selection(), Some(&StageId::from("b")));
    }

    #[test]
    fn unknown_id_keeps_selection() {
        let mut g = chain();
        g.select(&"a".into());
        let change = g.select(&"zzz".into());
        assert_eq!(change, SelectionChange::Ignored("zzz".into()));
        assert!(!change.changed());
        assert_eq!(g.selection(), Some(&StageId::from("a")));
    }

    #[test]
    fn clear_selection() {
        let mut g = chain();
        assert_eq!(g.clear_selection(), SelectionChange::Unchanged);
        g.select(&"a".into());
        assert_eq!(g.clear_selection(), SelectionChange::Cleared);
        assert_eq!(g.selection(), None);
    }

    #[test]
    fn dangling_edges_and_duplicate_nodes_filtered() {
        let (g, issues) = StageGraph::new(
            vec![node("a", 0.0), node("b", 1.0), node("a", 9.0)],
            vec![StageEdge::new("a", "b"), StageEdge::new("b", "ghost")],
        );
        assert_eq!(g.nodes().len(), 2);
        assert_eq!(g.node(&"a".into()).map(|n| n.position.x), Some(0.0));
        assert_eq!(g.edges().len(), 1);
        assert!(issues.contains(&DefinitionError::DuplicateStage("a".into())));
        assert!(issues.iter().any(|i| matches!(i,
            DefinitionError::DanglingEdge { missing, .. } if missing.as_str() == "ghost")));
    }

    #[test]
    fn duplicate_edges_rendered_twice() {
        let (g, issues) = StageGraph::new(
            vec![node("a", 0.0), node("b", 1.0)],
            vec![StageEdge::new("a", "b"), StageEdge::new("a", "b")],
        );
        assert!(issues.is_empty());
        assert_eq!(g.render().edges.len(), 2);
    }

    #[test]
    fn isolated_and_self_edges_tolerated() {
        let (mut g, issues) = StageGraph::new(
            vec![node("a", 0.0), node("lonely", 5.0)],
            vec![StageEdge::new("a", "a")],
        );
        assert_eq!(issues, vec![DefinitionError::Cycle]);
        let view = g.render();
        assert!(view.edges[0].self_edge);
        assert_eq!(g.select(&"lonely".into()), SelectionChange::Selected("lonely".into()));
        assert!(g.successors(&"a".into()).is_empty());
    }

    #[test]
    fn cycle_detection() {
        assert!(!chain().has_cycle());
        let (g, issues) = StageGraph::new(
            vec![node("a", 0.0), node("b", 1.0)],
            vec![StageEdge::new("a", "b"), StageEdge::new("b", "a")],
        );
        assert!(g.has_cycle());
        assert!(issues.iter().all(|i| i.is_advisory()));
        assert_eq!(g.edges().len(), 2);
    }

    #[test]
    fn next_and_previous_follow_edges() {
        let mut g = chain();
        assert_eq!(g.select_previous(), SelectionChange::Unchanged);
        assert_eq!(g.select_next(), SelectionChange::Selected("a".into()));
        assert_eq!(g.select_next(), SelectionChange::Selected("b".into()));
        assert_eq!(g.select_next(), SelectionChange::Selected("c".into()));
        assert_eq!(g.select_next(), SelectionChange::Unchanged);
        assert_eq!(g.select_previous(), SelectionChange::Selected("b".into()));
    }

    #[test]
    fn roots_in_declaration_order() {
        let (g, _) = StageGraph::new(
            vec![node("x", 0.0), node("y", 1.0), node("z", 2.0)],
            vec![StageEdge::new("y", "z")],
        );
        let roots: Vec<&str> = g.roots().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["x", "y"]);
        assert_eq!(g.predecessors(&"z".into())[0].id.as_str(), "y");
    }

    #[test]
    fn edge_view_resolves_positions() {
        let view = chain().render();
        assert_eq!(view.edges[1].start, Position::new(1.0, 0.0));
        assert_eq!(view.edges[1].end, Position::new(2.0, 0.0));
    }

    #[test]
    fn node_view_carries_category_label() {
        let view = chain().render();
        let node = &view.nodes[0];
        assert_eq!(node.category_label, node.category.label());
        assert!(!node.category_label.is_empty());
    }
}

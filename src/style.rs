// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Stage Category Styling

use serde::Serialize;

use crate::types::StageCategory;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Rounded,
    Pill,
    Diamond,
    Hexagon,
}

/// Visual treatment of a stage node on the canvas.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CategoryStyle {
    pub fill: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub shape: NodeShape,
}

// Indexed by `StageCategory as usize`.
static CATEGORY_STYLES: [CategoryStyle; 7] = [
    // Research
    CategoryStyle { fill: "#e8f1ff", border: "#2563eb", accent: "#1d4ed8", shape: NodeShape::Rounded },
    // Discovery
    CategoryStyle { fill: "#eefbf4", border: "#0ea66c", accent: "#047857", shape: NodeShape::Rounded },
    // Strategy
    CategoryStyle { fill: "#f5f0ff", border: "#7c3aed", accent: "#6d28d9", shape: NodeShape::Diamond },
    // Design
    CategoryStyle { fill: "#fff4e8", border: "#d97706", accent: "#b45309", shape: NodeShape::Pill },
    // Implementation
    CategoryStyle { fill: "#f1f5f9", border: "#475569", accent: "#334155", shape: NodeShape::Rounded },
    // Launch
    CategoryStyle { fill: "#fff1f2", border: "#e11d48", accent: "#be123c", shape: NodeShape::Pill },
    // Outcome
    CategoryStyle { fill: "#ecfeff", border: "#0891b2", accent: "#0e7490", shape: NodeShape::Hexagon },
];

impl StageCategory {
    pub fn style(&self) -> &'static CategoryStyle {
        &CATEGORY_STYLES[*self as usize]
    }
}

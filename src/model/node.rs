//! Node and edge types of the internal workflow graph.
//!
//! These types are also the wire shape exchanged with the canvas, so field
//! names serialize in camelCase.

use serde::{Deserialize, Serialize};

// =============================================================================
// NODE KIND
// =============================================================================

/// Closed set of node roles. Every component dispatches on this enum with
/// exhaustive matches.
///
/// Input also accepts the older canvas vocabulary (`input`, `process`,
/// `approval`, `compliance`, `security`, `output`); anything else becomes
/// `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[serde(alias = "input")]
    Trigger,
    #[serde(alias = "process")]
    Action,
    #[serde(alias = "approval")]
    Condition,
    #[serde(alias = "compliance", alias = "security")]
    Validation,
    Notification,
    Audit,
    #[serde(alias = "output")]
    Terminal,
    #[serde(other)]
    Generic,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Action => "action",
            NodeKind::Condition => "condition",
            NodeKind::Validation => "validation",
            NodeKind::Notification => "notification",
            NodeKind::Audit => "audit",
            NodeKind::Terminal => "terminal",
            NodeKind::Generic => "generic",
        }
    }

    /// Kind used for a synthesized compliance step, by marker convention.
    pub fn for_compliance_type(compliance_type: &str) -> NodeKind {
        let t = compliance_type.to_ascii_lowercase();
        if t.contains("audit") || t.contains("log") {
            NodeKind::Audit
        } else if t.contains("notif") || t.contains("alert") || t.contains("report") {
            NodeKind::Notification
        } else {
            NodeKind::Validation
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NODE
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_tag: Option<String>,
    /// Marker carried by every node the enforcer injected or adopted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_type: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            kind,
            label: label.into(),
            description: String::new(),
            position: Position::default(),
            locked: false,
            compliance_reason: None,
            domain_tag: None,
            compliance_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Mark the node as a mandatory compliance step.
    pub fn locked_by(
        mut self,
        compliance_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.locked = true;
        self.compliance_type = Some(compliance_type.into());
        self.compliance_reason = Some(reason.into());
        self
    }

    /// True if the node carries `compliance_type` (case-insensitive).
    pub fn has_marker(&self, compliance_type: &str) -> bool {
        self.compliance_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(compliance_type))
    }

    pub fn label_contains(&self, keyword: &str) -> bool {
        self.label
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }

    /// The reason shown when an edit targeting this node is refused.
    pub fn lock_reason(&self) -> String {
        self.compliance_reason
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| format!("'{}' is a mandatory compliance step", self.label))
    }
}

// =============================================================================
// EDGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    #[serde(alias = "source")]
    pub source_node_id: String,
    #[serde(alias = "target")]
    pub target_node_id: String,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Edge {
            id: id.into(),
            source_node_id: source.into(),
            target_node_id: target.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source_node_id == node_id || self.target_node_id == node_id
    }
}

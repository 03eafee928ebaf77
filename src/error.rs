//! Engine error taxonomy and non-fatal diagnostics shared by all phases.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Parse,
    Validate,
    Enforce,
    Layout,
    Translate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Enforce => write!(f, "Enforce"),
            Phase::Layout => write!(f, "Layout"),
            Phase::Translate => write!(f, "Translate"),
        }
    }
}

/// A single structural problem found by `Graph::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: &'static str,
    pub message: String,
    pub node_id: Option<String>,
    pub edge_id: Option<String>,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.node_id, &self.edge_id) {
            (Some(id), _) => write!(f, "[{}] {} (node '{}')", self.code, self.message, id),
            (None, Some(id)) => write!(f, "[{}] {} (edge '{}')", self.code, self.message, id),
            (None, None) => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl ValidationIssue {
    pub fn node(code: &'static str, message: impl Into<String>, node_id: &str) -> Self {
        ValidationIssue {
            code,
            message: message.into(),
            node_id: Some(node_id.to_string()),
            edge_id: None,
        }
    }

    pub fn edge(code: &'static str, message: impl Into<String>, edge_id: &str) -> Self {
        ValidationIssue {
            code,
            message: message.into(),
            node_id: None,
            edge_id: Some(edge_id.to_string()),
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that reject a single request. None of them is process-fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("graph rejected: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// Deleting or renaming a compliance step through the edit API.
    #[error("node '{node_id}' is locked: {reason}")]
    LockedNode { node_id: String, reason: String },

    #[error("edge '{edge_id}' references unknown node '{node_id}'")]
    DanglingReference { edge_id: String, node_id: String },

    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("edge '{0}' not found")]
    EdgeNotFound(String),

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("rule set error: {0}")]
    Rules(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn parse(what: &'static str, message: impl std::fmt::Display) -> Self {
        EngineError::Parse {
            what,
            message: message.to_string(),
        }
    }

    /// Issues carried by a `Validation` error, empty for every other variant.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            EngineError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    AnchorNotFound,
    UnknownNodeKind,
    AdoptedNode,
    NoEntryNode,
    NoTerminalNode,
}

impl WarningKind {
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::AnchorNotFound => "W001",
            WarningKind::UnknownNodeKind => "W002",
            WarningKind::AdoptedNode => "W003",
            WarningKind::NoEntryNode => "W004",
            WarningKind::NoTerminalNode => "W005",
        }
    }
}

/// Non-fatal diagnostic surfaced to the caller as metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub kind: WarningKind,
    pub code: &'static str,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl Warning {
    pub fn new(
        kind: WarningKind,
        phase: Phase,
        message: impl Into<String>,
        node_id: Option<String>,
    ) -> Self {
        Warning {
            kind,
            code: kind.code(),
            phase,
            message: message.into(),
            node_id,
        }
    }

    pub fn anchor_not_found(step_label: &str, keyword: &str, fallback: &str) -> Self {
        Warning::new(
            WarningKind::AnchorNotFound,
            Phase::Enforce,
            format!(
                "No node label contains '{}' for required step '{}'; inserted {}",
                keyword, step_label, fallback
            ),
            None,
        )
    }

    pub fn unknown_kind(node_id: &str, message: impl Into<String>) -> Self {
        Warning::new(
            WarningKind::UnknownNodeKind,
            Phase::Translate,
            message,
            Some(node_id.to_string()),
        )
    }
}

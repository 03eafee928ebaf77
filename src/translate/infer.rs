//! NodeKind + label → external node template.

use crate::error::Warning;
use crate::model::{Node, NodeKind};
use crate::text::label_words;

/// Closed set of external node templates the translator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalTemplate {
    Webhook,
    Schedule,
    ManualTrigger,
    Email,
    Database,
    Http,
    Ai,
    Script,
    Condition,
    FieldCheck,
    AuditLog,
    Dispatch,
    NoOp,
}

impl ExternalTemplate {
    pub fn external_type(self) -> &'static str {
        match self {
            ExternalTemplate::Webhook => "n8n-nodes-base.webhook",
            ExternalTemplate::Schedule => "n8n-nodes-base.scheduleTrigger",
            ExternalTemplate::ManualTrigger => "n8n-nodes-base.manualTrigger",
            ExternalTemplate::Email => "n8n-nodes-base.emailSend",
            ExternalTemplate::Database => "n8n-nodes-base.postgres",
            ExternalTemplate::Http => "n8n-nodes-base.httpRequest",
            ExternalTemplate::Ai => "@n8n/n8n-nodes-langchain.openAi",
            ExternalTemplate::Script => "n8n-nodes-base.code",
            ExternalTemplate::Condition => "n8n-nodes-base.if",
            ExternalTemplate::FieldCheck => "n8n-nodes-base.filter",
            ExternalTemplate::AuditLog => "n8n-nodes-base.code",
            ExternalTemplate::Dispatch => "n8n-nodes-base.code",
            ExternalTemplate::NoOp => "n8n-nodes-base.noOp",
        }
    }

    pub fn type_version(self) -> u32 {
        match self {
            ExternalTemplate::Webhook
            | ExternalTemplate::Email
            | ExternalTemplate::Database
            | ExternalTemplate::Script
            | ExternalTemplate::Condition
            | ExternalTemplate::FieldCheck
            | ExternalTemplate::AuditLog
            | ExternalTemplate::Dispatch => 2,
            ExternalTemplate::Http => 4,
            ExternalTemplate::Schedule
            | ExternalTemplate::ManualTrigger
            | ExternalTemplate::Ai
            | ExternalTemplate::NoOp => 1,
        }
    }

    pub fn is_trigger(self) -> bool {
        matches!(
            self,
            ExternalTemplate::Webhook | ExternalTemplate::Schedule | ExternalTemplate::ManualTrigger
        )
    }
}

/// Label keyword. Short ones must be a whole word ("db" must not fire on
/// "feedback").
#[derive(Debug, Clone, Copy)]
pub enum Keyword {
    Word(&'static str),
    Substring(&'static str),
}

impl Keyword {
    pub fn matches(self, label: &str, words: &[String]) -> bool {
        match self {
            Keyword::Word(w) => words.iter().any(|x| x == w),
            Keyword::Substring(s) => label.contains(s),
        }
    }
}

/// Lowercased label plus its words, computed once per node.
pub struct LabelText {
    pub lower: String,
    pub words: Vec<String>,
}

impl LabelText {
    pub fn new(label: &str) -> Self {
        LabelText {
            lower: label.to_lowercase(),
            words: label_words(label),
        }
    }

    pub fn any(&self, keywords: &[Keyword]) -> bool {
        keywords.iter().any(|k| k.matches(&self.lower, &self.words))
    }
}

const ACTION_KEYWORDS: &[(&[Keyword], ExternalTemplate)] = &[
    (&[Keyword::Substring("email")], ExternalTemplate::Email),
    (
        &[Keyword::Substring("database"), Keyword::Word("db")],
        ExternalTemplate::Database,
    ),
    (
        &[Keyword::Word("http"), Keyword::Word("api")],
        ExternalTemplate::Http,
    ),
    (&[Keyword::Word("ai"), Keyword::Word("llm")], ExternalTemplate::Ai),
];

pub fn infer(node: &Node) -> (ExternalTemplate, Option<Warning>) {
    let text = LabelText::new(&node.label);
    match node.kind {
        NodeKind::Trigger => {
            let template = if text.any(&[Keyword::Substring("webhook")]) {
                ExternalTemplate::Webhook
            } else if text.any(&[Keyword::Substring("schedule"), Keyword::Substring("cron")]) {
                ExternalTemplate::Schedule
            } else {
                ExternalTemplate::ManualTrigger
            };
            (template, None)
        }
        NodeKind::Action => ACTION_KEYWORDS
            .iter()
            .find(|(keywords, _)| text.any(keywords))
            .map(|(_, template)| (*template, None))
            .unwrap_or_else(|| {
                (
                    ExternalTemplate::Script,
                    Some(Warning::unknown_kind(
                        &node.id,
                        format!(
                            "No template keyword in action label '{}'; using a script node",
                            node.label
                        ),
                    )),
                )
            }),
        NodeKind::Condition => (ExternalTemplate::Condition, None),
        NodeKind::Validation => (ExternalTemplate::FieldCheck, None),
        NodeKind::Audit => (ExternalTemplate::AuditLog, None),
        NodeKind::Notification => (ExternalTemplate::Dispatch, None),
        NodeKind::Terminal => (ExternalTemplate::NoOp, None),
        NodeKind::Generic => (
            ExternalTemplate::Script,
            Some(Warning::unknown_kind(
                &node.id,
                format!("Unknown node kind for '{}'; using a script node", node.label),
            )),
        ),
    }
}

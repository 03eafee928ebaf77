//! Deployment metadata derived from the graph: credentials to configure and
//! example calls for every trigger.

use serde_json::json;

use crate::model::Node;
use crate::text::slugify;

use super::infer::{ExternalTemplate, Keyword, LabelText};
use super::params::{webhook_path, DEFAULT_CRON};
use super::types::{EndpointKind, ExampleEndpoint};

const REQUIREMENTS: &[(&[Keyword], &str)] = &[
    (&[Keyword::Substring("email")], "Email (SMTP) credentials"),
    (
        &[Keyword::Substring("database"), Keyword::Word("db")],
        "Database connection credentials",
    ),
    (
        &[Keyword::Word("http"), Keyword::Word("api")],
        "HTTP API credentials",
    ),
    (&[Keyword::Word("ai"), Keyword::Word("llm")], "LLM provider API key"),
    (&[Keyword::Substring("webhook")], "Publicly reachable webhook URL"),
    (&[Keyword::Substring("slack")], "Slack workspace token"),
    (
        &[Keyword::Word("sms"), Keyword::Substring("twilio")],
        "SMS gateway credentials",
    ),
];

/// One pass over all labels; each requirement appears once, in the order it
/// was first seen.
pub fn deployment_requirements(nodes: &[Node]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for node in nodes {
        let text = LabelText::new(&node.label);
        for (keywords, requirement) in REQUIREMENTS {
            if text.any(keywords) && !found.iter().any(|r| r == requirement) {
                found.push(requirement.to_string());
            }
        }
    }
    found
}

/// `None` unless `template` is a trigger.
pub fn example_endpoint(
    template: ExternalTemplate,
    node: &Node,
    name: &str,
    base_url: &str,
    workflow_name: &str,
) -> Option<ExampleEndpoint> {
    let base = base_url.trim_end_matches('/');
    let endpoint = |kind| ExampleEndpoint {
        node_id: node.id.clone(),
        node_name: name.to_string(),
        kind,
        method: None,
        url: None,
        schedule: None,
        sample_payload: None,
    };

    match template {
        ExternalTemplate::Webhook => Some(ExampleEndpoint {
            method: Some("POST".into()),
            url: Some(format!("{}/webhook/{}", base, webhook_path(node))),
            sample_payload: Some(json!({
                "event": slugify(&node.label),
                "data": {}
            })),
            ..endpoint(EndpointKind::Webhook)
        }),
        ExternalTemplate::Schedule => Some(ExampleEndpoint {
            schedule: Some(DEFAULT_CRON.into()),
            ..endpoint(EndpointKind::Schedule)
        }),
        ExternalTemplate::ManualTrigger => Some(ExampleEndpoint {
            method: Some("POST".into()),
            url: Some(format!(
                "{}/rest/workflows/{}/run",
                base,
                slugify(workflow_name).replace('_', "-")
            )),
            ..endpoint(EndpointKind::Manual)
        }),
        ExternalTemplate::Email
        | ExternalTemplate::Database
        | ExternalTemplate::Http
        | ExternalTemplate::Ai
        | ExternalTemplate::Script
        | ExternalTemplate::Condition
        | ExternalTemplate::FieldCheck
        | ExternalTemplate::AuditLog
        | ExternalTemplate::Dispatch
        | ExternalTemplate::NoOp => None,
    }
}

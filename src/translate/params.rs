//! Parameter blocks for each external template.

use serde_json::{json, Map, Value};

use crate::model::Node;
use crate::text::slugify;

use super::infer::ExternalTemplate;

pub const DEFAULT_CRON: &str = "0 9 * * *";

/// Webhook path derived from the node id.
pub fn webhook_path(node: &Node) -> String {
    let slug = slugify(&node.id).replace('_', "-");
    if slug.is_empty() {
        "webhook".to_string()
    } else {
        slug
    }
}

fn body_text(node: &Node) -> &str {
    if node.description.trim().is_empty() {
        &node.label
    } else {
        &node.description
    }
}

pub fn parameters(template: ExternalTemplate, node: &Node) -> Value {
    let mut params = match template {
        ExternalTemplate::Webhook => json!({
            "httpMethod": "POST",
            "path": webhook_path(node),
            "responseMode": "onReceived",
            "options": {
                "responseData": { "status": "accepted", "step": node.label }
            }
        }),
        ExternalTemplate::Schedule => json!({
            "rule": {
                "interval": [{ "field": "cronExpression", "expression": DEFAULT_CRON }]
            }
        }),
        ExternalTemplate::ManualTrigger => json!({}),
        ExternalTemplate::Email => json!({
            "fromEmail": "={{ $env.SMTP_FROM }}",
            "toEmail": "",
            "subject": node.label,
            "text": body_text(node)
        }),
        ExternalTemplate::Database => json!({
            "operation": "insert",
            "table": slugify(&node.label),
            "query": ""
        }),
        ExternalTemplate::Http => json!({
            "method": "POST",
            "url": "",
            "sendBody": true,
            "options": {}
        }),
        ExternalTemplate::Ai => json!({
            "model": "gpt-4o-mini",
            "prompt": body_text(node)
        }),
        ExternalTemplate::Script => json!({
            "jsCode": format!("// {}\nreturn $input.all();", node.label)
        }),
        ExternalTemplate::Condition => json!({
            "conditions": {
                "boolean": [{
                    "value1": "={{ $json.approved }}",
                    "operation": "equal",
                    "value2": true
                }]
            }
        }),
        ExternalTemplate::FieldCheck => json!({
            "checkName": node.label,
            "conditions": {
                "string": [{ "value1": "={{ $json.id }}", "operation": "isNotEmpty" }]
            }
        }),
        ExternalTemplate::AuditLog => json!({
            "appendOnly": true,
            "logTarget": "audit_log",
            "jsCode": format!(
                "// {}\nreturn $input.all().map(item => ({{ json: {{ ...item.json, auditedAt: new Date().toISOString() }} }}));",
                node.label
            )
        }),
        ExternalTemplate::Dispatch => json!({
            "channels": ["email", "slack", "sms"],
            "message": body_text(node)
        }),
        ExternalTemplate::NoOp => json!({})
    };

    if node.locked {
        if let Value::Object(map) = &mut params {
            mark_locked(map, node);
        }
    }
    params
}

fn mark_locked(map: &mut Map<String, Value>, node: &Node) {
    map.insert("complianceLocked".into(), Value::Bool(true));
    map.insert("complianceReason".into(), Value::String(node.lock_reason()));
    if let Some(t) = &node.compliance_type {
        map.insert("complianceType".into(), Value::String(t.clone()));
    }
}

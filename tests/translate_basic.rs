mod helpers;

use std::collections::BTreeSet;

use flowguard::enforce::enforce;
use flowguard::model::{Graph, Node, NodeKind};
use flowguard::translate::{
    translate, EndpointKind, ExternalWorkflow, Translator, TranslatorConfig,
};
use flowguard::WarningKind;
use helpers::*;

fn enforced_finance() -> Graph {
    enforce(&invoice_payment(), &finance_rules()).unwrap().graph
}

/// One line per node: name, template, lock flag, downstream names.
fn outline(doc: &ExternalWorkflow) -> String {
    doc.nodes
        .iter()
        .map(|n| {
            let locked = if n.parameters["complianceLocked"] == true {
                " locked"
            } else {
                ""
            };
            let targets: Vec<&str> = doc.connections[&n.name].main[0]
                .iter()
                .map(|t| t.node.as_str())
                .collect();
            let targets = if targets.is_empty() {
                "(end)".to_string()
            } else {
                targets.join(", ")
            };
            format!(
                "{} [{}@{}]{} -> {}",
                n.name, n.node_type, n.type_version, locked, targets
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn finance_workflow_outline() {
    let doc = translate(&enforced_finance()).document;
    insta::assert_snapshot!("finance_workflow_outline", outline(&doc));
}

#[test]
fn finance_parameter_blocks() {
    let doc = translate(&enforced_finance()).document;
    let blocks: serde_json::Map<String, serde_json::Value> = doc
        .nodes
        .iter()
        .map(|n| (n.id.clone(), n.parameters.clone()))
        .collect();
    insta::assert_snapshot!(
        "finance_parameter_blocks",
        serde_json::to_string_pretty(&blocks).unwrap()
    );
}

#[test]
fn nodes_and_adjacency_are_conserved() {
    let g = enforced_finance();
    let doc = translate(&g).document;

    assert_eq!(doc.nodes.len(), g.nodes().len());
    let ids: BTreeSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    let expected: BTreeSet<&str> = g.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, expected);

    let name_to_id = |name: &str| {
        doc.nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.id.clone())
            .unwrap()
    };
    let mut pairs = Vec::new();
    for (source, conns) in &doc.connections {
        for target in &conns.main[0] {
            assert_eq!(target.connection_type, "main");
            assert_eq!(target.index, 0);
            pairs.push((name_to_id(source.as_str()), name_to_id(target.node.as_str())));
        }
    }
    pairs.sort();
    assert_eq!(pairs, edge_pairs(&g));
}

#[test]
fn metadata_lists_locked_nodes() {
    let doc = translate(&enforced_finance()).document;
    assert_eq!(doc.name, "Generated Compliant Workflow");
    assert_eq!(
        doc.meta.locked_nodes,
        vec!["compliance_fraud_detection", "compliance_financial_audit"]
    );
    assert!(doc.meta.compliance_validated);
    assert_eq!(doc.meta.domain.as_deref(), Some("finance"));

    let audit = doc
        .nodes
        .iter()
        .find(|n| n.id == "compliance_financial_audit")
        .unwrap();
    assert_eq!(
        audit.parameters["complianceReason"],
        "All financial transactions must be audited"
    );
    assert_eq!(audit.parameters["complianceType"], "FINANCIAL_AUDIT");
}

#[test]
fn keywordless_action_warns_and_becomes_script() {
    let out = translate(&enforced_finance());
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::UnknownNodeKind);
    assert_eq!(out.warnings[0].node_id.as_deref(), Some("payment"));
}

#[test]
fn templates_follow_kind_and_label() {
    let g = chain(&[
        ("hook", NodeKind::Trigger, "Order webhook"),
        ("mail", NodeKind::Action, "Send confirmation email"),
        ("db", NodeKind::Action, "Store in DB"),
        ("api", NodeKind::Action, "Call shipping API"),
        ("llm", NodeKind::Action, "Summarize with AI"),
        ("ok", NodeKind::Condition, "Approved?"),
        ("slack", NodeKind::Notification, "Ping Slack"),
        ("end", NodeKind::Terminal, "Done"),
    ]);
    let out = translate(&g);
    let types: Vec<&str> = out
        .document
        .nodes
        .iter()
        .map(|n| n.node_type.as_str())
        .collect();
    assert_eq!(
        types,
        vec![
            "n8n-nodes-base.webhook",
            "n8n-nodes-base.emailSend",
            "n8n-nodes-base.postgres",
            "n8n-nodes-base.httpRequest",
            "@n8n/n8n-nodes-langchain.openAi",
            "n8n-nodes-base.if",
            "n8n-nodes-base.code",
            "n8n-nodes-base.noOp",
        ]
    );
    assert!(out.warnings.is_empty());
    assert_eq!(
        out.document.deployment_requirements,
        vec![
            "Publicly reachable webhook URL",
            "Email (SMTP) credentials",
            "Database connection credentials",
            "HTTP API credentials",
            "LLM provider API key",
            "Slack workspace token",
        ]
    );
}

#[test]
fn generic_kind_falls_back_with_warning() {
    let mut g = Graph::new("s");
    g.add_node(Node::new("x", NodeKind::Generic, "Mystery box")).unwrap();
    let out = translate(&g);
    assert_eq!(out.document.nodes[0].node_type, "n8n-nodes-base.code");
    assert_eq!(out.warnings[0].code, "W002");
}

#[test]
fn example_endpoints_use_configured_base_url() {
    let mut g = Graph::new("s");
    g.add_node(Node::new("order_hook", NodeKind::Trigger, "Order Webhook")).unwrap();
    g.add_node(Node::new("nightly", NodeKind::Trigger, "Nightly schedule")).unwrap();
    g.add_node(Node::new("start", NodeKind::Trigger, "Start")).unwrap();

    let translator = Translator::new(TranslatorConfig {
        base_url: "https://flows.example.com/".into(),
        workflow_name: "Order Intake".into(),
    });
    let doc = translator.translate(&g).document;
    assert_eq!(doc.name, "Order Intake");

    let eps = &doc.example_endpoints;
    assert_eq!(eps.len(), 3);
    assert_eq!(eps[0].kind, EndpointKind::Webhook);
    assert_eq!(
        eps[0].url.as_deref(),
        Some("https://flows.example.com/webhook/order-hook")
    );
    assert_eq!(eps[0].sample_payload.as_ref().unwrap()["event"], "order_webhook");
    assert_eq!(eps[1].kind, EndpointKind::Schedule);
    assert_eq!(eps[1].schedule.as_deref(), Some("0 9 * * *"));
    assert_eq!(eps[2].kind, EndpointKind::Manual);
    assert_eq!(
        eps[2].url.as_deref(),
        Some("https://flows.example.com/rest/workflows/order-intake/run")
    );
}

#[test]
fn duplicate_labels_stay_connectable() {
    let g = chain(&[
        ("a", NodeKind::Trigger, "Review"),
        ("b", NodeKind::Action, "Review"),
    ]);
    let doc = translate(&g).document;
    assert_eq!(doc.nodes[1].name, "Review 1");
    assert_eq!(doc.connections["Review"].main[0][0].node, "Review 1");
}

#[test]
fn serialized_document_uses_engine_field_names() {
    let doc = translate(&enforced_finance()).document;
    let value = serde_json::to_value(&doc).unwrap();
    let first = &value["nodes"][0];
    assert_eq!(first["type"], "n8n-nodes-base.manualTrigger");
    assert_eq!(first["typeVersion"], 1);
    assert!(first["position"].is_array());
    assert_eq!(value["meta"]["complianceValidated"], true);
    assert_eq!(
        value["connections"]["Invoice Received"]["main"][0][0]["node"],
        "Fraud Risk Assessment"
    );
}

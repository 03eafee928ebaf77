//! Translation phase: Graph → external execution-engine document.
//!
//! Public API: `Translator::translate(graph) -> Translation`

mod infer;
mod params;
mod requirements;
mod types;

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::{Graph, Node};

pub use infer::{infer, ExternalTemplate};
pub use params::parameters;
pub use requirements::deployment_requirements;
pub use types::*;

#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Translator { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Never fails: unknown kinds and keywordless actions become script
    /// nodes and are reported in `warnings`.
    pub fn translate(&self, graph: &Graph) -> Translation {
        let mut warnings = Vec::new();
        let names = unique_names(graph.nodes());

        // 1. Nodes
        let mut nodes = Vec::with_capacity(graph.nodes().len());
        let mut example_endpoints = Vec::new();
        for (node, name) in graph.nodes().iter().zip(&names) {
            let (template, warning) = infer(node);
            if let Some(w) = warning {
                warnings.push(w);
            }
            if let Some(ep) = requirements::example_endpoint(
                template,
                node,
                name,
                &self.config.base_url,
                &self.config.workflow_name,
            ) {
                example_endpoints.push(ep);
            }
            nodes.push(ExternalNode {
                id: node.id.clone(),
                name: name.clone(),
                node_type: template.external_type().to_string(),
                type_version: template.type_version(),
                position: [node.position.x, node.position.y],
                parameters: parameters(template, node),
            });
        }

        // 2. Connections, keyed by name; every node gets an entry
        let name_of: HashMap<&str, &str> = graph
            .nodes()
            .iter()
            .zip(&names)
            .map(|(n, name)| (n.id.as_str(), name.as_str()))
            .collect();
        let mut connections: BTreeMap<String, NodeConnections> = names
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    NodeConnections {
                        main: vec![Vec::new()],
                    },
                )
            })
            .collect();
        for edge in graph.edges() {
            let (Some(source), Some(target)) = (
                name_of.get(edge.source_node_id.as_str()),
                name_of.get(edge.target_node_id.as_str()),
            ) else {
                warn!(edge = %edge.id, "skipping edge with unknown endpoint");
                continue;
            };
            if let Some(slot) = connections
                .get_mut(*source)
                .and_then(|c| c.main.first_mut())
            {
                slot.push(ConnectionTarget::main(*target));
            }
        }

        // 3. Metadata
        let locked_nodes: Vec<String> = graph.locked_nodes().map(|n| n.id.clone()).collect();
        let domain = graph.locked_nodes().find_map(|n| n.domain_tag.clone());
        let meta = ExportMeta {
            locked_nodes,
            compliance_validated: graph.validate().is_ok(),
            domain,
        };

        debug!(
            nodes = nodes.len(),
            warnings = warnings.len(),
            "graph translated"
        );

        Translation {
            document: ExternalWorkflow {
                name: self.config.workflow_name.clone(),
                nodes,
                connections,
                meta,
                deployment_requirements: deployment_requirements(graph.nodes()),
                example_endpoints,
            },
            warnings,
        }
    }
}

/// Translate with the default configuration.
pub fn translate(graph: &Graph) -> Translation {
    Translator::default().translate(graph)
}

/// External names are labels; repeats get `" 1"`, `" 2"`, ... suffixes and a
/// blank label falls back to the node id.
pub fn unique_names(nodes: &[Node]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(nodes.len());
    for node in nodes {
        let base = match node.label.trim() {
            "" => node.id.clone(),
            label => label.to_string(),
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate) {
            candidate = format!("{} {}", base, n);
            n += 1;
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

//! Rewire edges so a freshly inserted node sits at its anchor.

use crate::error::EngineResult;
use crate::model::{Edge, Graph};

use super::anchor::ResolvedAnchor;

/// `new_id` must already be in the graph, with no edges.
pub fn splice(graph: &mut Graph, new_id: &str, anchor: &ResolvedAnchor) -> EngineResult<()> {
    match anchor {
        ResolvedAnchor::Before(a) => {
            // {P→A} becomes {P→new, new→A}
            let incoming: Vec<Edge> = graph.incoming_edges(a).into_iter().cloned().collect();
            for edge in &incoming {
                graph.remove_edge(&edge.id)?;
                graph.add_edge(&edge.source_node_id, new_id)?;
            }
            graph.add_edge(new_id, a)?;
        }
        ResolvedAnchor::After(a) => {
            // {A→S} becomes {A→new, new→S}
            let outgoing: Vec<Edge> = graph.outgoing_edges(a).into_iter().cloned().collect();
            graph.add_edge(a, new_id)?;
            for edge in &outgoing {
                graph.remove_edge(&edge.id)?;
                graph.add_edge(new_id, &edge.target_node_id)?;
            }
        }
        ResolvedAnchor::Start(entries) => {
            for entry in entries.iter().filter(|e| e.as_str() != new_id) {
                graph.add_edge(new_id, entry)?;
            }
        }
        ResolvedAnchor::End(terminals) => {
            for terminal in terminals.iter().filter(|t| t.as_str() != new_id) {
                graph.add_edge(terminal, new_id)?;
            }
        }
    }
    Ok(())
}

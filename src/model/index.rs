//! petgraph-backed read-only index over a `Graph`, used for ordering and
//! reachability queries.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{has_path_connecting, is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use super::graph::Graph;

pub struct GraphIndex {
    pub graph: DiGraph<String, String>,
    pub node_indices: HashMap<String, NodeIndex>,
    insertion_order: Vec<String>,
}

impl GraphIndex {
    /// Edges whose endpoints are missing are skipped; `Graph::validate`
    /// reports them separately.
    pub fn build(source: &Graph) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut insertion_order = Vec::new();

        for node in source.nodes() {
            let idx = graph.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), idx);
            insertion_order.push(node.id.clone());
        }

        for edge in source.edges() {
            let s = node_indices.get(&edge.source_node_id);
            let t = node_indices.get(&edge.target_node_id);
            if let (Some(&s), Some(&t)) = (s, t) {
                graph.add_edge(s, t, edge.id.clone());
            }
        }

        GraphIndex {
            graph,
            node_indices,
            insertion_order,
        }
    }

    /// Node ids in topological order. A cyclic graph has no such order, so
    /// insertion order is returned instead.
    pub fn topo_order(&self) -> Vec<String> {
        match toposort(&self.graph, None) {
            Ok(indices) => indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect(),
            Err(_) => self.insertion_order.clone(),
        }
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// True if a directed path leads from `from` to `to`.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    pub fn reachable_from(&self, start: &str) -> HashSet<String> {
        let mut reachable = HashSet::new();
        let Some(&start_idx) = self.node_indices.get(start) else {
            return reachable;
        };
        let mut bfs = Bfs::new(&self.graph, start_idx);
        while let Some(nx) = bfs.next(&self.graph) {
            reachable.insert(self.graph[nx].clone());
        }
        reachable
    }
}

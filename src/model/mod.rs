//! Graph model: typed nodes/edges, mutation primitives and validation.

pub mod graph;
pub mod index;
pub mod node;
pub mod validate;

pub use graph::{Actor, Graph};
pub use index::GraphIndex;
pub use node::{Edge, Node, NodeKind, Position};
pub use validate::{progression_warnings, validate_structure};

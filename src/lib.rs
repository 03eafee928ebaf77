pub mod config;
pub mod enforce;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod parse;
pub mod rules;
pub mod session;
pub mod text;
pub mod translate;
pub mod wasm;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult, Warning, WarningKind};
pub use model::{Actor, Edge, Graph, Node, NodeKind, Position};
pub use rules::RuleSet;
pub use session::SessionStore;

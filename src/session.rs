//! In-memory session store: one canonical graph per session key.
//!
//! Each session sits behind its own mutex, so sessions proceed in parallel
//! while writers to one session are serialized. Every operation works on a
//! copy and commits it wholesale; a failed operation leaves the canonical
//! graph as it was.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::Engine;
use crate::enforce::ComplianceReport;
use crate::error::{EngineError, EngineResult};
use crate::model::{Actor, Graph, Node, NodeKind, Position};
use crate::parse::{CanvasView, EditDocument, GraphDocument, SeedDocument};
use crate::translate::Translation;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub key: String,
    pub domain: String,
    pub graph: Graph,
    /// Bumped on every committed change.
    pub version: u64,
}

/// Field-level edit of one node. Locked nodes accept only `position`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl NodeUpdate {
    /// True if applying the update would change more than the position.
    fn touches_content(&self, node: &Node) -> bool {
        self.label.as_ref().is_some_and(|l| *l != node.label)
            || self.description.as_ref().is_some_and(|d| *d != node.description)
            || self.kind.is_some_and(|k| k != node.kind)
    }

    fn apply(self, node: &mut Node) {
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(description) = self.description {
            node.description = description;
        }
        if let Some(kind) = self.kind {
            node.kind = kind;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
    }
}

pub struct SessionStore {
    engine: Arc<Engine>,
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new(engine: Arc<Engine>) -> Self {
        SessionStore {
            engine,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Seed a session. An existing session under `key` is replaced.
    pub fn open(&self, key: &str, seed: &SeedDocument) -> EngineResult<CanvasView> {
        let view = self.engine.seed(key, seed)?;
        let session = Session {
            key: key.to_string(),
            domain: seed.domain_tag.clone(),
            graph: view.graph.clone(),
            version: 1,
        };
        self.sessions
            .write()
            .insert(key.to_string(), Arc::new(Mutex::new(session)));
        info!(session = %key, domain = %seed.domain_tag, "session opened");
        Ok(view)
    }

    pub fn snapshot(&self, key: &str) -> EngineResult<Session> {
        let session = self.session(key)?;
        let guard = session.lock();
        Ok(guard.clone())
    }

    /// Last write wins: the edit replaces the canonical graph if accepted.
    pub fn replace_graph(&self, key: &str, edit: EditDocument) -> EngineResult<CanvasView> {
        self.commit(key, |_| Ok(edit.graph))
    }

    pub fn add_node(&self, key: &str, node: Node) -> EngineResult<CanvasView> {
        self.edit(key, |graph| graph.add_node(node))
    }

    pub fn update_node(&self, key: &str, node_id: &str, update: NodeUpdate) -> EngineResult<CanvasView> {
        self.edit(key, |graph| {
            let node = graph
                .node_mut(node_id)
                .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
            if node.locked && update.touches_content(node) {
                return Err(EngineError::LockedNode {
                    node_id: node.id.clone(),
                    reason: node.lock_reason(),
                });
            }
            update.apply(node);
            Ok(())
        })
    }

    pub fn remove_node(&self, key: &str, node_id: &str) -> EngineResult<CanvasView> {
        self.edit(key, |graph| graph.remove_node(node_id, Actor::Editor).map(|_| ()))
    }

    pub fn connect(&self, key: &str, source: &str, target: &str) -> EngineResult<CanvasView> {
        self.edit(key, |graph| graph.add_edge(source, target).map(|_| ()))
    }

    pub fn disconnect(&self, key: &str, source: &str, target: &str) -> EngineResult<CanvasView> {
        self.edit(key, |graph| graph.disconnect(source, target).map(|_| ()))
    }

    pub fn export(&self, key: &str) -> EngineResult<Translation> {
        let session = self.session(key)?;
        let guard = session.lock();
        Ok(self.engine.export(&guard.graph, &guard.domain))
    }

    pub fn report(&self, key: &str) -> EngineResult<ComplianceReport> {
        let session = self.session(key)?;
        let guard = session.lock();
        Ok(self.engine.report(&guard.graph, &guard.domain))
    }

    pub fn close(&self, key: &str) -> EngineResult<()> {
        match self.sessions.write().remove(key) {
            Some(_) => {
                info!(session = %key, "session closed");
                Ok(())
            }
            None => Err(EngineError::SessionNotFound(key.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn session(&self, key: &str) -> EngineResult<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::SessionNotFound(key.to_string()))
    }

    /// Apply a primitive mutation to a copy of the canonical graph, then
    /// commit it through the engine.
    fn edit<F>(&self, key: &str, mutate: F) -> EngineResult<CanvasView>
    where
        F: FnOnce(&mut Graph) -> EngineResult<()>,
    {
        self.commit(key, |current| {
            let mut copy = current.clone();
            mutate(&mut copy)?;
            Ok(GraphDocument::from(&copy))
        })
    }

    fn commit<F>(&self, key: &str, propose: F) -> EngineResult<CanvasView>
    where
        F: FnOnce(&Graph) -> EngineResult<GraphDocument>,
    {
        let session = self.session(key)?;
        let mut guard = session.lock();

        let outcome = propose(&guard.graph)
            .and_then(|doc| self.engine.accept_edit(&guard.graph, &guard.domain, doc));
        let view = match outcome {
            Ok(view) => view,
            Err(e) => {
                warn!(session = %key, error = %e, "change rejected");
                return Err(e);
            }
        };

        guard.graph = view.graph.clone();
        guard.version += 1;
        info!(session = %key, version = guard.version, "session graph committed");
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(Engine::builtin().unwrap()))
    }

    fn seed() -> SeedDocument {
        serde_json::from_str(
            r#"{"domainTag": "general", "steps": [
                {"label": "Form submitted", "kind": "trigger"},
                {"label": "Store record"},
                {"label": "Done", "kind": "terminal"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn unknown_session_is_reported() {
        let store = store();
        assert!(matches!(
            store.snapshot("nope"),
            Err(EngineError::SessionNotFound(_))
        ));
        assert!(store.close("nope").is_err());
    }

    #[test]
    fn version_bumps_only_on_commit() {
        let store = store();
        store.open("s", &seed()).unwrap();
        assert_eq!(store.snapshot("s").unwrap().version, 1);

        store.connect("s", "step_1", "step_3").unwrap();
        assert_eq!(store.snapshot("s").unwrap().version, 2);

        assert!(store.connect("s", "step_1", "ghost").is_err());
        assert_eq!(store.snapshot("s").unwrap().version, 2);
    }

    #[test]
    fn locked_node_accepts_only_moves() {
        let store = store();
        store.open("s", &seed()).unwrap();
        let locked = store
            .snapshot("s")
            .unwrap()
            .graph
            .locked_nodes()
            .next()
            .map(|n| n.id.clone())
            .unwrap();

        let rename = NodeUpdate {
            label: Some("Skip security".into()),
            ..NodeUpdate::default()
        };
        assert!(matches!(
            store.update_node("s", &locked, rename),
            Err(EngineError::LockedNode { .. })
        ));

        let mv = NodeUpdate {
            position: Some(Position::new(3000.0, 3000.0)),
            ..NodeUpdate::default()
        };
        let view = store.update_node("s", &locked, mv).unwrap();
        assert_eq!(view.graph.node(&locked).unwrap().position, Position::new(3000.0, 3000.0));
    }
}

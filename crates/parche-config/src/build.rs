//! Building a runnable engine from a patch document.

use std::collections::HashMap;

use parche_core::{Engine, NodeId, Patch, Token};
use parche_registry::{ObjectArgs, ObjectRegistry};

use crate::doc::{ArgDoc, PatchDoc};
use crate::error::PatchError;

/// A built patch: the engine plus the document-id to node-id mapping.
pub struct BuiltPatch {
    /// The sealed, declared engine (not yet configured).
    pub engine: Engine,
    /// Document node ids resolved to arena ids, for host message injection.
    pub nodes: HashMap<String, NodeId>,
}

fn translate_args(args: &[ArgDoc]) -> ObjectArgs {
    ObjectArgs::new(
        args.iter()
            .map(|arg| match arg {
                ArgDoc::Float(v) => Token::Float(*v),
                ArgDoc::Str(s) => Token::Symbol(s.clone()),
            })
            .collect(),
    )
}

fn build_patch(
    doc: &PatchDoc,
    registry: &ObjectRegistry,
) -> Result<(Patch, HashMap<String, NodeId>), PatchError> {
    let mut patch = Patch::new();
    let mut ids = HashMap::new();

    for node in &doc.nodes {
        let built = registry.create(&node.object, &translate_args(&node.args))?;
        let id = patch.add_node(built);
        if ids.insert(node.id.clone(), id).is_some() {
            return Err(PatchError::DuplicateNodeId(node.id.clone()));
        }
    }

    for edge in &doc.edges {
        let from = *ids
            .get(&edge.from)
            .ok_or_else(|| PatchError::UnknownNodeId(edge.from.clone()))?;
        let to = *ids
            .get(&edge.to)
            .ok_or_else(|| PatchError::UnknownNodeId(edge.to.clone()))?;
        patch
            .connect(from, edge.outlet, to, edge.inlet)
            .map_err(|source| PatchError::Connect {
                from: edge.from.clone(),
                to: edge.to.clone(),
                source,
            })?;
    }

    Ok((patch, ids))
}

/// Checks a document without building an engine.
///
/// Catches everything [`build_engine`] would reject: duplicate or dangling
/// ids, unknown object tags, malformed arguments, and invalid connections.
pub fn validate(doc: &PatchDoc, registry: &ObjectRegistry) -> Result<(), PatchError> {
    build_patch(doc, registry).map(|_| ())
}

/// Builds a document into a declared [`Engine`].
///
/// All build errors surface here, before any audio runs. The caller still
/// has to [`configure`](Engine::configure) the engine with the driver's
/// audio parameters.
pub fn build_engine(doc: &PatchDoc, registry: &ObjectRegistry) -> Result<BuiltPatch, PatchError> {
    let (patch, nodes) = build_patch(doc, registry)?;
    tracing::debug!(
        "patch_build: {} nodes, {} edges",
        patch.node_count(),
        patch.edge_count()
    );
    Ok(BuiltPatch {
        engine: Engine::new(patch),
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{EdgeDoc, NodeDoc};

    fn node(id: &str, object: &str, args: Vec<ArgDoc>) -> NodeDoc {
        NodeDoc {
            id: id.into(),
            object: object.into(),
            args,
        }
    }

    fn edge(from: &str, outlet: usize, to: &str, inlet: usize) -> EdgeDoc {
        EdgeDoc {
            from: from.into(),
            outlet,
            to: to.into(),
            inlet,
        }
    }

    #[test]
    fn builds_a_simple_patch() {
        let doc = PatchDoc {
            nodes: vec![
                node("osc1", "osc~", vec![ArgDoc::Float(440.0)]),
                node("out", "dac~", vec![]),
            ],
            edges: vec![edge("osc1", 0, "out", 0), edge("osc1", 0, "out", 1)],
        };
        let built = build_engine(&doc, &ObjectRegistry::new()).unwrap();
        assert_eq!(built.engine.node_count(), 2);
        assert_eq!(built.engine.edge_count(), 2);
        assert!(built.nodes.contains_key("osc1"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = PatchDoc {
            nodes: vec![
                node("a", "sig~", vec![]),
                node("a", "sig~", vec![]),
            ],
            edges: vec![],
        };
        assert!(matches!(
            validate(&doc, &ObjectRegistry::new()),
            Err(PatchError::DuplicateNodeId(id)) if id == "a"
        ));
    }

    #[test]
    fn dangling_edge_ids_are_rejected() {
        let doc = PatchDoc {
            nodes: vec![node("a", "sig~", vec![])],
            edges: vec![edge("a", 0, "ghost", 0)],
        };
        assert!(matches!(
            validate(&doc, &ObjectRegistry::new()),
            Err(PatchError::UnknownNodeId(id)) if id == "ghost"
        ));
    }

    #[test]
    fn unknown_object_tag_is_rejected() {
        let doc = PatchDoc {
            nodes: vec![node("w", "widget~", vec![])],
            edges: vec![],
        };
        assert!(matches!(
            validate(&doc, &ObjectRegistry::new()),
            Err(PatchError::Build(_))
        ));
    }

    #[test]
    fn invalid_connection_names_both_ends() {
        let doc = PatchDoc {
            nodes: vec![
                node("osc1", "osc~", vec![]),
                node("p", "print", vec![]),
            ],
            // Signal outlet into a message inlet.
            edges: vec![edge("osc1", 0, "p", 0)],
        };
        let err = validate(&doc, &ObjectRegistry::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("osc1") && msg.contains('p'), "got: {msg}");
    }
}

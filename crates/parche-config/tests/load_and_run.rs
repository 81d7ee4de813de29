//! Loads a patch document from disk and runs it end to end.

use parche_config::{PatchDoc, build_engine};
use parche_core::{AudioConfig, Message};
use parche_registry::ObjectRegistry;

const PATCH: &str = r#"
    [[nodes]]
    id = "freq"
    type = "sig~"
    args = [2.0]

    [[nodes]]
    id = "gain"
    type = "*~"
    args = [0.5]

    [[nodes]]
    id = "out"
    type = "dac~"

    [[edges]]
    from = "freq"
    to = "gain"

    [[edges]]
    from = "gain"
    to = "out"

    [[edges]]
    from = "gain"
    to = "out"
    inlet = 1
"#;

#[test]
fn file_to_audio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patch.toml");
    std::fs::write(&path, PATCH).unwrap();

    let doc = PatchDoc::load(&path).unwrap();
    let mut built = build_engine(&doc, &ObjectRegistry::new()).unwrap();
    built.engine.configure(AudioConfig::new(48000.0, 16));

    let out = built.engine.produce_next_block(&[]);
    assert!(out[0].iter().all(|&v| (v - 1.0).abs() < 1e-6));
    assert!(out[1].iter().all(|&v| (v - 1.0).abs() < 1e-6));
}

#[test]
fn host_messages_reach_document_nodes() {
    let doc = PatchDoc::from_toml(PATCH).unwrap();
    let mut built = build_engine(&doc, &ObjectRegistry::new()).unwrap();
    built.engine.configure(AudioConfig::new(48000.0, 16));

    // Retarget the gain's cold inlet by document id.
    let gain = built.nodes["gain"];
    built.engine.send(gain, 1, &Message::float(2.0));

    let out = built.engine.produce_next_block(&[]);
    assert!(out[0].iter().all(|&v| (v - 4.0).abs() < 1e-6));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn engine_at(root: &Path) -> Engine {
    Engine::new(
        "default",
        root,
        "en".parse().unwrap(),
        "it".parse().unwrap(),
    )
}

#[test]
fn layout_is_rooted_at_engine_path() {
    let engine = engine_at(Path::new("/opt/engines/default"));
    assert_eq!(
        engine.decoder_template(),
        PathBuf::from("/opt/engines/default/models/decoder/decoder.ini")
    );
    assert_eq!(
        engine.weights_path(),
        PathBuf::from("/opt/engines/default/models/decoder/weights.json")
    );
    assert_eq!(
        engine.runtime_dir("worker"),
        PathBuf::from("/opt/engines/default/runtime/worker")
    );
}

#[test]
fn missing_weights_are_not_an_error() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path());
    assert!(engine.decoder_weights().unwrap().is_none());
}

#[test]
fn stored_weights_are_loaded() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path());
    std::fs::create_dir_all(engine.decoder_dir()).unwrap();
    std::fs::write(
        engine.weights_path(),
        r#"{"LM0": [0.5], "Distortion0": [0.1, 0.2]}"#,
    )
    .unwrap();

    let weights = engine.decoder_weights().unwrap().unwrap();
    assert_eq!(weights["LM0"], vec![0.5]);
    assert_eq!(weights["Distortion0"], vec![0.1, 0.2]);
}

#[test]
fn malformed_weights_report_the_file() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path());
    std::fs::create_dir_all(engine.decoder_dir()).unwrap();
    std::fs::write(engine.weights_path(), "not json").unwrap();

    let err = engine.decoder_weights().unwrap_err();
    assert!(matches!(err, EngineError::Weights(ref p, _) if p == &engine.weights_path()));
}

#[test]
fn template_presence_is_detected() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path());
    assert!(!engine.has_decoder_template());
    assert!(engine.read_decoder_template().is_err());

    std::fs::create_dir_all(engine.decoder_dir()).unwrap();
    std::fs::write(engine.decoder_template(), "[threads]\n1\n").unwrap();
    assert!(engine.has_decoder_template());
    assert_eq!(engine.read_decoder_template().unwrap(), "[threads]\n1\n");
}

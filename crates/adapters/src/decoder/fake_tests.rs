// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn captures_config_at_launch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("decoder.ini");
    std::fs::write(&path, "[threads]\n6\n").unwrap();

    let adapter = FakeDecoderAdapter::new();
    let decoder = adapter.launch(&path).await.unwrap();

    assert_eq!(decoder.id, 1);
    assert_eq!(decoder.config, "[threads]\n6\n");
    assert_eq!(adapter.launches(), 1);
    assert_eq!(adapter.configs(), vec![path]);
}

#[tokio::test]
async fn fail_next_affects_one_launch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("decoder.ini");
    std::fs::write(&path, "").unwrap();

    let adapter = FakeDecoderAdapter::new();
    adapter.fail_next();
    assert!(matches!(
        adapter.launch(&path).await,
        Err(DecoderError::Launch(_))
    ));
    assert_eq!(adapter.launch(&path).await.unwrap().id, 2);
}

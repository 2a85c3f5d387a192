// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::ffi::OsStr;
use tempfile::tempdir;

fn engine_at(root: &Path) -> Engine {
    Engine::new("default", root, "en".parse().unwrap(), "it".parse().unwrap())
}

fn write_models(root: &Path) {
    let decoder = root.join("models/decoder");
    std::fs::create_dir_all(decoder.join("phrases")).unwrap();
    std::fs::write(decoder.join("decoder.ini"), "[threads]\n1\n").unwrap();
    std::fs::write(decoder.join("phrases/table.bin"), [1u8, 2, 3]).unwrap();
}

fn args(cmd: &Command) -> Vec<String> {
    cmd.as_std()
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn remote_command_uses_user_and_key() {
    let master = MasterDescriptor::new("10.0.0.1")
        .with_user("mmt")
        .with_key_file("/etc/mtn/master.pem");

    let cmd =
        RsyncSynchronizer::remote_command(&master, "/data/models/v3", Path::new("/opt/engine"));

    assert_eq!(cmd.as_std().get_program(), OsStr::new("rsync"));
    assert_eq!(
        args(&cmd),
        vec![
            "-a",
            "--delete",
            "-e",
            "ssh -o StrictHostKeyChecking=no -o BatchMode=yes -i /etc/mtn/master.pem",
            "mmt@10.0.0.1:/data/models/v3/",
            "/opt/engine/",
        ]
    );
}

#[test]
fn remote_command_passes_password_through_environment() {
    let master = MasterDescriptor::new("master").with_password("hunter2");

    let cmd = RsyncSynchronizer::remote_command(&master, "/models/", Path::new("/opt/engine"));

    assert_eq!(cmd.as_std().get_program(), OsStr::new("sshpass"));
    let args = args(&cmd);
    assert_eq!(&args[..3], &["-e", "rsync", "-a"]);
    assert!(args.contains(&"master:/models/".to_string()));
    assert!(args.iter().all(|a| !a.contains("hunter2")));

    let env: Vec<_> = cmd.as_std().get_envs().collect();
    assert_eq!(
        env,
        vec![(OsStr::new("SSHPASS"), Some(OsStr::new("hunter2")))]
    );
}

#[tokio::test]
async fn local_sync_from_engine_dir_is_a_noop() {
    let dir = tempdir().unwrap();
    write_models(dir.path());
    let engine = engine_at(dir.path());

    let sync = RsyncSynchronizer::new(SyncTarget::Local);
    sync.sync(&dir.path().display().to_string(), &engine)
        .await
        .unwrap();

    assert!(engine.has_decoder_template());
}

#[tokio::test]
async fn local_sync_copies_tree_and_is_idempotent() {
    let source = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_models(source.path());
    let engine = engine_at(dest.path());
    let remote = source.path().display().to_string();

    let sync = RsyncSynchronizer::new(SyncTarget::Local);
    sync.sync(&remote, &engine).await.unwrap();
    sync.sync(&remote, &engine).await.unwrap();

    assert!(engine.has_decoder_template());
    assert_eq!(
        std::fs::read(dest.path().join("models/decoder/phrases/table.bin")).unwrap(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn local_sync_from_parent_of_engine_skips_engine_dir() {
    let source = tempdir().unwrap();
    write_models(source.path());
    let engine = engine_at(&source.path().join("engine"));

    let sync = RsyncSynchronizer::new(SyncTarget::Local);
    sync.sync(&source.path().display().to_string(), &engine)
        .await
        .unwrap();

    assert!(engine.has_decoder_template());
    assert!(source.path().join("engine/models/decoder/phrases/table.bin").is_file());
    assert!(!source.path().join("engine/engine").exists());
}

#[tokio::test]
async fn local_sync_rejects_missing_source() {
    let dest = tempdir().unwrap();
    let engine = engine_at(dest.path());

    let sync = RsyncSynchronizer::new(SyncTarget::Local);
    let err = sync
        .sync("/nonexistent/models/for/sure", &engine)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Validation(_)));
}

#[tokio::test]
async fn sync_without_decoder_template_fails_validation() {
    let source = tempdir().unwrap();
    let dest = tempdir().unwrap();
    std::fs::write(source.path().join("README"), "no models here").unwrap();
    let engine = engine_at(dest.path());

    let sync = RsyncSynchronizer::new(SyncTarget::Local);
    let err = sync
        .sync(&source.path().display().to_string(), &engine)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Validation(ref m) if m.contains("decoder template")));
}

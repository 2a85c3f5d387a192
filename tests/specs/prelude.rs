//! Shared fixtures for the behavioral specs

#![allow(dead_code)]

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::str::contains;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;
use tempfile::TempDir;

pub const SYNC_PATH: u8 = 0x01;
pub const SIGNAL_RESET: u8 = 0x01;

pub const DECODER_TEMPLATE: &str = "\
[feature]
LM0 path=${ENGINE_PATH}/models/lm

[threads]
1
";

/// Temporary directory holding a node's engine and configuration
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// A project with an engine directory containing a decoder template
    pub fn with_engine() -> Self {
        let project = Self::empty();
        project.file("engine/models/decoder/decoder.ini", DECODER_TEMPLATE);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn engine_path(&self) -> PathBuf {
        self.path().join("engine")
    }

    pub fn file(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative)).unwrap_or_default()
    }

    /// Write `node.toml` for a standalone node on `ports`
    pub fn standalone_config(&self, ports: [u16; 2]) -> PathBuf {
        self.file(
            "node.toml",
            &format!(
                r#"
[engine]
path = "engine"
source = "en"
target = "it"

[cluster]
ports = [{}, {}]
request_timeout = "5s"
shutdown_grace = "1s"

[logging]
file = "logs/mtnd.log"
"#,
                ports[0], ports[1]
            ),
        );
        self.path().join("node.toml")
    }

    pub fn mtnd(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("mtnd").unwrap_or_else(|e| {
            panic!("mtnd binary not found ({e}); run `cargo build -p mtn-daemon` first")
        });
        cmd.current_dir(self.path())
            .env("RUST_LOG", "info")
            .timeout(Duration::from_secs(30));
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        RunAssert(self.cmd.assert().success())
    }

    pub fn fails(mut self) -> RunAssert {
        RunAssert(self.cmd.assert().failure())
    }

    pub fn exits_with(mut self, code: i32) -> RunAssert {
        RunAssert(self.cmd.assert().code(code))
    }
}

pub struct RunAssert(Assert);

impl RunAssert {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self(self.0.stdout(contains(expected)))
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self(self.0.stderr(contains(expected)))
    }
}

// =============================================================================
// Fake master
// =============================================================================

pub fn write_frame(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(&(bytes.len() as u32).to_be_bytes()).unwrap();
    stream.write_all(bytes).unwrap();
    stream.flush().unwrap();
}

pub fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).unwrap();
    let mut body = vec![0u8; u32::from_be_bytes(header) as usize];
    stream.read_exact(&mut body).unwrap();
    body
}

/// A master that answers one sync-path request, then broadcasts a reset
pub struct FakeMaster {
    pub ports: [u16; 2],
    handle: JoinHandle<Vec<u8>>,
}

impl FakeMaster {
    pub fn spawn(sync_path: &Path) -> Self {
        let requests = TcpListener::bind("127.0.0.1:0").unwrap();
        let broadcasts = TcpListener::bind("127.0.0.1:0").unwrap();
        let ports = [
            requests.local_addr().unwrap().port(),
            broadcasts.local_addr().unwrap().port(),
        ];

        let mut reply = vec![SYNC_PATH];
        reply.extend_from_slice(sync_path.display().to_string().as_bytes());

        let handle = std::thread::spawn(move || {
            let (mut subscriber, _) = broadcasts.accept().unwrap();
            let (mut request_conn, _) = requests.accept().unwrap();

            let request = read_frame(&mut request_conn);
            write_frame(&mut request_conn, &reply);

            // Give the node time to synchronize before the reset
            std::thread::sleep(Duration::from_millis(500));
            write_frame(&mut subscriber, &[SIGNAL_RESET]);
            request
        });

        Self { ports, handle }
    }

    /// The request the node sent
    pub fn received_request(self) -> Vec<u8> {
        self.handle.join().unwrap()
    }
}

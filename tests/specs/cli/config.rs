//! Configuration specs
//!
//! Verify the daemon refuses to start on unreadable or invalid configuration.

use crate::prelude::*;

#[test]
fn missing_config_file_fails() {
    let temp = Project::empty();

    temp.mtnd()
        .args(&["--config", "absent.toml"])
        .fails()
        .stderr_has("failed to read config");
}

#[test]
fn identical_ports_are_rejected() {
    let temp = Project::with_engine();
    temp.file(
        "node.toml",
        r#"
[engine]
path = "engine"
source = "en"
target = "it"

[cluster]
ports = [5016, 5016]
"#,
    );

    temp.mtnd()
        .args(&["--config", "node.toml"])
        .fails()
        .stderr_has("must differ");
}

#[test]
fn invalid_language_is_rejected() {
    let temp = Project::with_engine();
    temp.file(
        "node.toml",
        r#"
[engine]
path = "engine"
source = "english!"
target = "it"
"#,
    );

    temp.mtnd()
        .args(&["--config", "node.toml"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn unknown_section_is_rejected() {
    let temp = Project::with_engine();
    temp.file(
        "node.toml",
        r#"
[engine]
path = "engine"
source = "en"
target = "it"

[server]
port = 8045
"#,
    );

    temp.mtnd()
        .args(&["--config", "node.toml"])
        .fails()
        .stderr_has("invalid config");
}

//! Help and version specs
//!
//! Verify the daemon's command-line surface.

use crate::prelude::*;

#[test]
fn help_lists_config_flag() {
    let temp = Project::empty();

    temp.mtnd()
        .args(&["--help"])
        .passes()
        .stdout_has("--config")
        .stdout_has("Translation cluster worker node");
}

#[test]
fn version_reports_binary_name() {
    let temp = Project::empty();

    temp.mtnd().args(&["--version"]).passes().stdout_has("mtnd");
}

#[test]
fn missing_config_flag_is_rejected() {
    let temp = Project::empty();

    temp.mtnd().fails().stderr_has("--config");
}

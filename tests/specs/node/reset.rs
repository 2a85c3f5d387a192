//! Reset specs
//!
//! A standalone node synchronizes from its own engine directory, then exits
//! with the restart status when the master broadcasts a reset.

use crate::prelude::*;

#[test]
fn reset_broadcast_exits_with_restart_status() {
    let temp = Project::with_engine();
    let master = FakeMaster::spawn(&temp.engine_path());
    let config = temp.standalone_config(master.ports);

    temp.mtnd()
        .args(&["--config", config.to_str().unwrap()])
        .exits_with(101);

    assert_eq!(master.received_request(), vec![SYNC_PATH]);
}

#[test]
fn reset_run_logs_synchronization_and_restart() {
    let temp = Project::with_engine();
    let master = FakeMaster::spawn(&temp.engine_path());
    let config = temp.standalone_config(master.ports);

    temp.mtnd()
        .args(&["--config", config.to_str().unwrap()])
        .exits_with(101);

    let log = temp.read("logs/mtnd.log");
    assert!(log.contains("synchronization complete"), "log: {log}");
    assert!(log.contains("reset signal received"), "log: {log}");
    assert!(log.contains("shutting down for restart"), "log: {log}");
}

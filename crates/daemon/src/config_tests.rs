// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    missing_file = { false },
    present_file = { true },
)]
fn load_falls_back_to_defaults_when_absent(write_file: bool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dao.toml");
    if write_file {
        std::fs::write(&path, "self_addr = \"10.0.0.1:9000\"\n").expect("write config");
    }

    let config = Config::load(&path).expect("load");
    if write_file {
        assert_eq!(config.self_addr, "10.0.0.1:9000");
        // Fields the file didn't mention still come from Default.
        assert_eq!(config.tpc_rel_timeout_ms, Config::default().tpc_rel_timeout_ms);
    } else {
        assert_eq!(config.self_addr, Config::default().self_addr);
    }
}

#[test]
fn load_rejects_unparsable_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dao.toml");
    std::fs::write(&path, "this is not valid toml [[[").expect("write config");

    let err = Config::load(&path).expect_err("should fail to parse");
    assert!(matches!(err, DaemonError::Config(_)));
}

#[test]
fn engine_config_round_trips_the_timeout_fields() {
    let mut config = Config::default();
    config.tpc_rel_timeout_ms = 1234;
    config.overall_timeout_ms = 9999;

    let engine = config.engine_config();
    assert_eq!(engine.tpc_rel_timeout_ms, 1234);
    assert_eq!(engine.overall_timeout_ms, 9999);
}

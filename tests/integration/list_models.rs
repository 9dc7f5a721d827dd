// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::*;

#[test]
fn test_list_models() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args(["list-models", "--config", &setup.config.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (stdout, _) = get_cmd_output(cmd);

    let lines: Vec<&str> = stdout.lines().collect();
    for expected in [
        "CHAOS-Core",
        "MCO_SHA_2C",
        "IGRF13",
        "IGRF -> IGRF13",
        "MCO_SHA_2X -> CHAOS-Core",
        "OLD-2C -> MCO_SHA_2C",
    ] {
        assert!(
            lines.iter().any(|l| l.ends_with(expected)),
            "'{expected}' not in:\n{stdout}"
        );
    }
    // Not configured.
    assert!(!stdout.contains("MLI_SHA_2D"), "{stdout}");
    assert!(!stdout.contains("CHAOS-6-Static"), "{stdout}");
}

#[test]
fn test_list_models_without_config() {
    let cmd = vires_magmodels().arg("list-models").ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(!stdout.contains("CHAOS-Core"), "{stdout}");
    assert!(stderr.is_empty(), "{stderr}");
}

#[test]
fn test_bad_config() {
    let setup = setup();
    let config = write_file(setup.dir.path(), "config.yaml", "");
    let cmd = vires_magmodels()
        .args(["list-models", "--config", &config.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("recognised file extension"), "{stderr}");

    let config = write_file(
        setup.dir.path(),
        "chain.toml",
        "[aliases]\nA = \"B\"\nB = \"C\"\n",
    );
    let cmd = vires_magmodels()
        .args(["list-models", "--config", &config.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("itself an alias"), "{stderr}");
}

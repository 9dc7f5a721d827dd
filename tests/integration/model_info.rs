// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::*;

#[test]
fn test_static_model_info() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "model-info",
            "--config",
            &setup.config.display().to_string(),
            "IGRF",
            "--time",
            "1826.0",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("IGRF (IGRF13)"), "{stdout}");
    assert!(stdout.contains("degree:   2"), "{stdout}");
    assert!(stdout.contains("IGRF13-SOURCE: 0.000000 (2000.0000)"), "{stdout}");
    assert!(stdout.contains("coefficients at"), "{stdout}");
    assert!(stdout.contains("h(1, 1) = "), "{stdout}");
}

#[test]
fn test_cached_model_info() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "update-cached-product",
            "--config",
            &setup.config.display().to_string(),
            "MCO_SHA_2X",
            &setup.product(PRODUCT_2000_2010).display().to_string(),
            &setup.product(PRODUCT_2010_2020).display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let cmd = vires_magmodels()
        .args([
            "model-info",
            "--config",
            &setup.config.display().to_string(),
            "MCO_SHA_2X",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("MCO_SHA_2X (CHAOS-Core)"), "{stdout}");
    assert!(stdout.contains(&format!("{PRODUCT_2000_2010}: ")), "{stdout}");
    assert!(stdout.contains(&format!("{PRODUCT_2010_2020}: ")), "{stdout}");
    assert!(stdout.contains("(2020.0000)"), "{stdout}");
}

#[test]
fn test_unknown_model() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "model-info",
            "--config",
            &setup.config.display().to_string(),
            "NOT-A-MODEL",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Unknown model 'NOT-A-MODEL'"), "{stderr}");
}

#[test]
fn test_missing_model_file() {
    let setup = setup();
    // The cached product has never been made.
    let cmd = vires_magmodels()
        .args([
            "model-info",
            "--config",
            &setup.config.display().to_string(),
            "OLD-2C",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Failed to load model OLD-2C"), "{stderr}");
}

#[test]
fn test_time_beyond_calendar() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "model-info",
            "--config",
            &setup.config.display().to_string(),
            "IGRF",
            "--time",
            "1e19",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("is outside the model validity"), "{stdout}");
}

#[test]
fn test_validity_beyond_calendar() {
    let setup = setup();
    write_file(
        setup.dir.path(),
        "big.shc",
        "1 1 1 1 0 1e30 2e30\n2015.0\n1 0 1.0\n",
    );
    let config = write_file(
        setup.dir.path(),
        "big.toml",
        "[models.BIG]\nfilename = \"big.shc\"\n",
    );
    let cmd = vires_magmodels()
        .args(["model-info", "--config", &config.display().to_string(), "BIG"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("Failed to load model BIG"), "{stderr}");
    assert!(
        stderr.contains("outside the supported calendar range"),
        "{stderr}"
    );
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::*;

#[test]
fn test_copy_product() {
    let setup = setup();
    let source = setup.product(PRODUCT_2010_2020);
    let cmd = vires_magmodels()
        .args([
            "update-cached-product",
            "--config",
            &setup.config.display().to_string(),
            "MCO_SHA_2C",
            &source.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let cached = setup.dir.path().join("cache/MCO_SHA_2C.shc");
    assert_eq!(fs::read_to_string(&cached).unwrap(), SHC_2010_2020);
    assert_eq!(
        fs::read_to_string(setup.dir.path().join("cache/MCO_SHA_2C.shc.source"))
            .unwrap()
            .trim(),
        PRODUCT_2010_2020
    );
    assert!(!setup.dir.path().join("cache/MCO_SHA_2C.shc.tmp").exists());
}

#[test]
fn test_merge_products() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "update-cached-product",
            "--config",
            &setup.config.display().to_string(),
            "MCO_SHA_2X",
            &setup.product(PRODUCT_2010_2020).display().to_string(),
            &setup.product(PRODUCT_2000_2010).display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let cached = fs::read_to_string(setup.dir.path().join("cache/MCO_SHA_2X.json")).unwrap();
    assert!(cached.contains(PRODUCT_2000_2010));
    assert!(cached.contains(PRODUCT_2010_2020));
    assert!(!setup
        .dir
        .path()
        .join("cache/MCO_SHA_2X.json.tmp.json")
        .exists());
}

#[test]
fn test_unconfigured_product() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "update-cached-product",
            "--config",
            &setup.config.display().to_string(),
            "MLI_SHA_2D",
            &setup.product(PRODUCT_2010_2020).display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("'MLI_SHA_2D' is not configured"), "{stderr}");
}

#[test]
fn test_copy_needs_one_source() {
    let setup = setup();
    let cmd = vires_magmodels()
        .args([
            "update-cached-product",
            "--config",
            &setup.config.display().to_string(),
            "MCO_SHA_2C",
            &setup.product(PRODUCT_2010_2020).display().to_string(),
            &setup.product(PRODUCT_2000_2010).display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("exactly one source file"), "{stderr}");
    assert!(!setup.dir.path().join("cache/MCO_SHA_2C.shc").exists());
}

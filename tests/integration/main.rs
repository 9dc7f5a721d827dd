// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod list_models;
mod model_info;
mod update_cached_product;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::str::from_utf8;

use assert_cmd::{output::OutputError, Command};
use tempfile::TempDir;

const SHC_2000_2010: &str = "\
# Test model.
1 2 2 2 1
2000.0 2010.0
1  0 -29600.0 -29400.0
1  1  -1700.0  -1500.0
1 -1   5200.0   5000.0
2  0  -2200.0  -2400.0
";

const SHC_2010_2020: &str = "\
1 2 2 2 1
2010.0 2020.0
1  0 -29400.0 -29200.0
1  1  -1500.0  -1300.0
1 -1   5000.0   4800.0
2  0  -2400.0  -2600.0
";

const PRODUCT_2000_2010: &str = "SW_OPER_MCO_SHA_2X_20000101T000000_20100101T000000_0101";
const PRODUCT_2010_2020: &str = "SW_OPER_MCO_SHA_2X_20100101T000000_20200101T000000_0101";

fn vires_magmodels() -> Command {
    Command::cargo_bin("vires-magmodels").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn write_file(dir: &Path, filename: &str, contents: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, contents).expect("couldn't write file");
    path
}

/// A directory with a config file, a static model file and two source
/// products. The cached products don't exist yet.
struct Setup {
    dir: TempDir,
    config: PathBuf,
}

fn setup() -> Setup {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("cache")).unwrap();
    write_file(dir.path(), "IGRF13.shc", SHC_2000_2010);
    write_file(dir.path(), &format!("{PRODUCT_2000_2010}.shc"), SHC_2000_2010);
    write_file(dir.path(), &format!("{PRODUCT_2010_2020}.shc"), SHC_2010_2020);
    let config = write_file(
        dir.path(),
        "config.toml",
        r#"
[cached_products.MCO_SHA_2C]
filename = "cache/MCO_SHA_2C.shc"

[cached_products.MCO_SHA_2X]
filename = "cache/MCO_SHA_2X.json"
updater = "merge_shc"

[models.IGRF13]
filename = "IGRF13.shc"
source = "IGRF13-SOURCE"
interpolate_in_decimal_years = true

[aliases]
OLD-2C = "MCO_SHA_2C"
"#,
    );
    Setup { dir, config }
}

impl Setup {
    fn product(&self, id: &str) -> PathBuf {
        self.dir.path().join(format!("{id}.shc"))
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Product identifiers, e.g.
//! `SW_OPER_MCO_SHA_2C_20131125T000000_20180101T000000_0401`.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use regex::Regex;

use crate::time::datetime_to_mjd2000;

lazy_static::lazy_static! {
    static ref RE_SWARM_PRODUCT: Regex = Regex::new(
        r"^SW_OPER_(?P<type>[A-Z0-9_]{10})_(?P<start>\d{8}T\d{6})_(?P<end>\d{8}T\d{6})_(?P<baseline>\d{2})(?P<version>\d{2})$"
    ).unwrap();
}

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductId {
    pub identifier: String,
    pub product_type: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub baseline: u8,
    pub version: u8,
}

impl ProductId {
    /// Parse a product identifier. `None` is returned if it doesn't follow the
    /// naming convention.
    pub fn parse(identifier: &str) -> Option<ProductId> {
        let captures = RE_SWARM_PRODUCT.captures(identifier)?;
        let timestamp = |name: &str| NaiveDateTime::parse_from_str(&captures[name], TIMESTAMP_FORMAT).ok();
        Some(ProductId {
            identifier: identifier.to_string(),
            product_type: captures["type"].to_string(),
            start: timestamp("start")?,
            end: timestamp("end")?,
            baseline: captures["baseline"].parse().ok()?,
            version: captures["version"].parse().ok()?,
        })
    }

    /// Parse the product identifier of a product file.
    pub fn from_path(path: &Path) -> Option<ProductId> {
        ProductId::parse(&filename_to_id(path))
    }

    /// The time range covered by the product [MJD2000].
    pub fn time_range_mjd2000(&self) -> (f64, f64) {
        (datetime_to_mjd2000(self.start), datetime_to_mjd2000(self.end))
    }
}

/// Turn a product filename into an identifier, i.e. strip the directory and
/// the extension.
pub fn filename_to_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Select the source products to build a cached product from.
///
/// Only products of `product_type` are considered, and only those of the
/// latest baseline and version. Starting from the product with the latest
/// end time, earlier products are picked as long as each one ends no more than
/// `max_gap` before the start of the previously picked one; products
/// overlapping the picked one are skipped. The picked files are returned in
/// chronological order.
pub fn filter_and_sort_sources(
    sources: &[PathBuf],
    product_type: &str,
    max_gap: Duration,
) -> Vec<PathBuf> {
    let mut products: Vec<(ProductId, &PathBuf)> = sources
        .iter()
        .filter_map(|path| {
            ProductId::from_path(path)
                .filter(|id| id.product_type == product_type)
                .map(|id| (id, path))
        })
        .collect();
    products.sort_by(|(a, _), (b, _)| {
        (b.baseline, b.version, b.end, b.start).cmp(&(a.baseline, a.version, a.end, a.start))
    });

    let mut products = products.into_iter();
    let mut picked = vec![];
    if let Some((latest, path)) = products.next() {
        let latest_version = (latest.baseline, latest.version);
        let mut previous_start = latest.start;
        picked.push(path.clone());

        for (product, path) in products {
            if (product.baseline, product.version) != latest_version {
                break;
            }
            if product.end > previous_start {
                continue;
            }
            if previous_start - product.end <= max_gap {
                picked.push(path.clone());
                previous_start = product.start;
            } else {
                break;
            }
        }
    }

    picked.reverse();
    picked
}

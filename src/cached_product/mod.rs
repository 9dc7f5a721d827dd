// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cached products.
//!
//! A cached product is a model file kept at a configured location and derived
//! from one or more source products. Updating a cached product writes a
//! temporary file next to the destination and then renames it over the
//! destination, so readers (and the file change monitor) never see a half
//! written file.

mod error;
mod product_id;

pub use error::CachedProductError;
pub use product_id::{filename_to_id, filter_and_sort_sources, ProductId};

use std::{
    ffi::OsString,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    composed::{ComposedModelFile, ComposedSource},
    model_file::source_file_path,
    shc::read_shc_file,
};

/// The largest time gap allowed between consecutive merged products [seconds].
pub const MAX_ALLOWED_TIME_GAP_SECONDS: i64 = 1;

lazy_static::lazy_static! {
    pub static ref UPDATER_TYPES_COMMA_SEPARATED: String = UpdaterType::iter().join(", ");
}

/// How a cached product is made from its sources.
#[derive(
    Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UpdaterType {
    /// Copy a single source file verbatim.
    #[default]
    #[strum(serialize = "copy")]
    Copy,

    /// Merge consecutive SHC products into a composed model file.
    #[strum(serialize = "merge_shc")]
    MergeShc,
}

impl UpdaterType {
    fn tmp_extension(self) -> &'static str {
        match self {
            UpdaterType::Copy => ".tmp",
            UpdaterType::MergeShc => ".tmp.json",
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

fn remove_if_exists(path: &Path) -> Result<(), CachedProductError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(CachedProductError::IO {
            path: path.to_path_buf(),
            err,
        }),
    }
}

fn rename(from: &Path, to: &Path) -> Result<(), CachedProductError> {
    fs::rename(from, to).map_err(|err| CachedProductError::IO {
        path: to.to_path_buf(),
        err,
    })
}

fn write_source_tmp(tmp: &Path, source: &str) -> Result<(), CachedProductError> {
    fs::write(tmp, format!("{source}\n")).map_err(|err| CachedProductError::IO {
        path: tmp.to_path_buf(),
        err,
    })
}

/// Update a cached product from source product files.
///
/// The new product is written to `<destination><tmp_extension>` and renamed
/// over `destination` once complete. A stale temporary file left by an earlier
/// failure is removed first, and the temporary file is removed again if the
/// update fails; `destination` is left untouched in that case. The `.source`
/// sidecar of the `copy` updater goes through its own temporary file and is
/// renamed into place after `destination`.
pub fn update_cached_product(
    product_type: &str,
    sources: &[PathBuf],
    destination: &Path,
    updater: UpdaterType,
) -> Result<(), CachedProductError> {
    info!(
        "Updating {product_type} cached product {} from {}",
        destination.display(),
        sources.iter().map(|s| s.display()).join(", ")
    );

    let tmp = with_suffix(destination, updater.tmp_extension());
    let source_tmp = with_suffix(&source_file_path(destination), ".tmp");
    remove_if_exists(&tmp)?;
    remove_if_exists(&source_tmp)?;

    // The sidecar is only put in place once the product itself is.
    let result = run_updater(product_type, sources, &tmp, updater).and_then(|source| {
        if let Some(source) = &source {
            write_source_tmp(&source_tmp, source)?;
        }
        rename(&tmp, destination)?;
        if source.is_some() {
            rename(&source_tmp, &source_file_path(destination))?;
        }
        Ok(())
    });

    if result.is_err() {
        for path in [&tmp, &source_tmp] {
            if let Err(e) = remove_if_exists(path) {
                warn!("{e}");
            }
        }
    } else {
        info!("{product_type} cached product {} updated", destination.display());
    }
    result
}

/// Write the new product to `tmp`. Returns the source name to be put in the
/// sidecar file, if the product has one.
fn run_updater(
    product_type: &str,
    sources: &[PathBuf],
    tmp: &Path,
    updater: UpdaterType,
) -> Result<Option<String>, CachedProductError> {
    match updater {
        UpdaterType::Copy => {
            let source = match sources {
                [] => return Err(CachedProductError::NoSources),
                [source] => source,
                _ => {
                    return Err(CachedProductError::SourceCount {
                        updater: updater.to_string(),
                        got: sources.len(),
                    })
                }
            };
            debug!("Copying {} to {}", source.display(), tmp.display());
            fs::copy(source, tmp).map_err(|err| CachedProductError::IO {
                path: source.clone(),
                err,
            })?;
            Ok(Some(filename_to_id(source)))
        }

        UpdaterType::MergeShc => {
            if sources.is_empty() {
                return Err(CachedProductError::NoSources);
            }
            let selected = filter_and_sort_sources(
                sources,
                product_type,
                chrono::Duration::seconds(MAX_ALLOWED_TIME_GAP_SECONDS),
            );
            if selected.is_empty() {
                return Err(CachedProductError::NoMatchingSources {
                    product_type: product_type.to_string(),
                });
            }

            let mut composed_sources = Vec::with_capacity(selected.len());
            let mut segments = Vec::with_capacity(selected.len());
            for source in &selected {
                debug!("Merging {}", source.display());
                let segment = read_shc_file(source)?;
                composed_sources.push(ComposedSource {
                    name: filename_to_id(source),
                    start: segment.validity.0,
                    end: segment.validity.1,
                });
                segments.push(segment);
            }
            let composed = ComposedModelFile {
                sources: composed_sources,
                segments,
            };
            // A merged product that can't be loaded must not replace a good one.
            composed.clone().into_model()?;
            composed.write(tmp)?;
            Ok(None)
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Model loaders. A loader turns the files backing a model into an in-memory
//! model; [`crate::factory::ModelFactory`] treats it as opaque.

use std::path::PathBuf;

use log::debug;
use thiserror::Error;
use vec1::Vec1;

use crate::{
    composed::{ComposedError, ComposedModelFile},
    model_file::ModelFileError,
    shc::{read_shc_file, ShcError, ShcModel},
};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Expected {expected} model file(s), got {got}")]
    FileCount { expected: usize, got: usize },

    #[error(transparent)]
    Shc(#[from] ShcError),

    #[error(transparent)]
    Composed(#[from] ComposedError),

    #[error(transparent)]
    ModelFile(#[from] ModelFileError),

    /// A failure of a loader that isn't one of the above.
    #[error("{0}")]
    Other(String),
}

/// Load an SHC model from one or more SHC files. Each file becomes one segment
/// of the model.
pub fn load_shc_model(
    files: &[PathBuf],
    interpolate_in_decimal_years: bool,
) -> Result<ShcModel, LoadError> {
    let segments = files
        .iter()
        .map(|f| {
            debug!("Loading SHC model file {}", f.display());
            read_shc_file(f)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let segments = Vec1::try_from_vec(segments).map_err(|_| LoadError::FileCount {
        expected: 1,
        got: 0,
    })?;
    Ok(ShcModel::new(segments)?.with_decimal_year_interpolation(interpolate_in_decimal_years))
}

/// Load an SHC model from a single composed model file.
pub fn load_composed_model(files: &[PathBuf]) -> Result<ShcModel, LoadError> {
    match files {
        [file] => Ok(ComposedModelFile::read(file)?.into_model()?),
        _ => Err(LoadError::FileCount {
            expected: 1,
            got: files.len(),
        }),
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{composed::ComposedError, shc::ShcError};

/// Errors associated with model files and their sources.
#[derive(Error, Debug)]
pub enum ModelFileError {
    #[error("There is no cached product called '{0}'")]
    UnknownCachedProduct(String),

    #[error("Could not read model source file {}: {err}", path.display())]
    SourceFile { path: PathBuf, err: std::io::Error },

    #[error("Model source file {} is empty", path.display())]
    EmptySourceFile { path: PathBuf },

    #[error(transparent)]
    Shc(#[from] ShcError),

    #[error(transparent)]
    Composed(#[from] ComposedError),
}

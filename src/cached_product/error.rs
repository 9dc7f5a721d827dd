// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{composed::ComposedError, shc::ShcError};

#[derive(Error, Debug)]
pub enum CachedProductError {
    #[error("No source files were given")]
    NoSources,

    #[error("The '{updater}' updater takes exactly one source file, but {got} were given")]
    SourceCount { updater: String, got: usize },

    #[error("None of the source files is a usable {product_type} product")]
    NoMatchingSources { product_type: String },

    #[error("IO error with {}: {err}", path.display())]
    IO { path: PathBuf, err: std::io::Error },

    #[error(transparent)]
    Shc(#[from] ShcError),

    #[error(transparent)]
    Composed(#[from] ComposedError),
}

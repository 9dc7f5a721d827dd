// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all errors of the `vires-magmodels` binary. This should be
//! the *only* error enum that the binary shows.

use thiserror::Error;

use crate::{
    cache::ModelLoadError,
    cached_product::{CachedProductError, UPDATER_TYPES_COMMA_SEPARATED},
    config::{ConfigError, CONFIG_FILE_TYPES_COMMA_SEPARATED},
    model_file::ModelFileError,
};

#[derive(Error, Debug)]
pub enum ViresError {
    /// An error related to the configuration file.
    #[error("{0}\n\nSupported config file formats: {}", *CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    Config(String),

    /// An error related to loading a model or reading its sources.
    #[error("{0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv).")]
    Model(String),

    /// An error related to updating a cached product.
    #[error("{0}\n\nSupported updaters: {}", *UPDATER_TYPES_COMMA_SEPARATED)]
    CachedProduct(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<ConfigError> for ViresError {
    fn from(e: ConfigError) -> Self {
        let s = e.to_string();
        match e {
            ConfigError::UnrecognisedExtension { .. }
            | ConfigError::Toml { .. }
            | ConfigError::Json { .. }
            | ConfigError::AliasChain { .. } => Self::Config(s),
            ConfigError::IO { .. } => Self::Generic(s),
        }
    }
}

impl From<ModelLoadError> for ViresError {
    fn from(e: ModelLoadError) -> Self {
        Self::Model(e.to_string())
    }
}

impl From<ModelFileError> for ViresError {
    fn from(e: ModelFileError) -> Self {
        let s = e.to_string();
        match e {
            ModelFileError::UnknownCachedProduct(_) => Self::Config(s),
            ModelFileError::SourceFile { .. }
            | ModelFileError::EmptySourceFile { .. }
            | ModelFileError::Shc(_)
            | ModelFileError::Composed(_) => Self::Model(s),
        }
    }
}

impl From<CachedProductError> for ViresError {
    fn from(e: CachedProductError) -> Self {
        let s = e.to_string();
        match e {
            CachedProductError::NoSources
            | CachedProductError::SourceCount { .. }
            | CachedProductError::NoMatchingSources { .. } => Self::CachedProduct(s),
            CachedProductError::Shc(_) | CachedProductError::Composed(_) => Self::Model(s),
            CachedProductError::IO { .. } => Self::Generic(s),
        }
    }
}

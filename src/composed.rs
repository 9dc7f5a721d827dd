// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Composed model files.
//!
//! A composed model file is a derived product merging several SHC products
//! into one JSON document. It records the products it was built from (and
//! their validity), so the provenance of a model loaded from it can be
//! reported.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

use crate::{
    model_file::ModelSources,
    shc::{ShcError, ShcModel, ShcSegment},
};

/// A source product of a composed model file. Times are MJD2000.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedSource {
    pub name: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedModelFile {
    pub sources: Vec<ComposedSource>,
    pub segments: Vec<ShcSegment>,
}

impl ComposedModelFile {
    pub fn read(path: &Path) -> Result<ComposedModelFile, ComposedError> {
        debug!("Reading composed model file {}", path.display());
        let file = File::open(path).map_err(|err| ComposedError::IO {
            path: path.to_path_buf(),
            err,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|err| ComposedError::Json {
            path: path.to_path_buf(),
            err,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), ComposedError> {
        let to_io_error = |err| ComposedError::IO {
            path: path.to_path_buf(),
            err,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(to_io_error)?);
        serde_json::to_writer(&mut writer, self).map_err(|err| ComposedError::Json {
            path: path.to_path_buf(),
            err,
        })?;
        writer.flush().map_err(to_io_error)?;
        Ok(())
    }

    /// The source products and their validity ranges.
    pub fn model_sources(&self) -> ModelSources {
        ModelSources {
            names: self.sources.iter().map(|s| s.name.clone()).collect(),
            ranges: self.sources.iter().map(|s| (s.start, s.end)).collect(),
        }
    }

    pub fn into_model(self) -> Result<ShcModel, ComposedError> {
        let segments = Vec1::try_from_vec(self.segments).map_err(|_| ComposedError::NoSegments)?;
        Ok(ShcModel::new(segments)?)
    }
}

#[derive(Error, Debug)]
pub enum ComposedError {
    #[error("The composed model file contains no model segments")]
    NoSegments,

    #[error("Could not decode composed model file {}: {err}", path.display())]
    Json {
        path: PathBuf,
        err: serde_json::Error,
    },

    #[error("IO error with composed model file {}: {err}", path.display())]
    IO { path: PathBuf, err: std::io::Error },

    #[error(transparent)]
    Shc(#[from] ShcError),
}

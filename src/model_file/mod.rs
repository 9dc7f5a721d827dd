// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Files backing magnetic models, and the provenance of those files.
//!
//! A [`ModelFile`] knows where a model file lives and which source products it
//! was made from:
//!
//! - a literal model file has a fixed location and a literal source name;
//! - a cached model file lives at the location of a cached product, and its
//!   source name is kept in a sidecar file next to it (see
//!   [`source_file_path`]);
//! - a cached composed model file lives at the location of a cached product
//!   and records its sources itself.

mod error;

pub use error::ModelFileError;

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;

use crate::{composed::ComposedModelFile, shc::read_shc_header};

/// How the validity period of a model file is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityReader {
    /// Read the validity from the SHC file header.
    Shc,

    /// The model is valid at all times.
    Unbounded,
}

impl ValidityReader {
    /// Get the validity period of the model file at `path` [MJD2000].
    pub fn read(self, path: &Path) -> Result<(f64, f64), ModelFileError> {
        match self {
            ValidityReader::Shc => Ok(read_shc_header(path)?.validity_mjd2000()),
            ValidityReader::Unbounded => Ok((f64::NEG_INFINITY, f64::INFINITY)),
        }
    }
}

/// The source products of a model file and their validity ranges [MJD2000].
/// Both vectors have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelSources {
    pub names: Vec<String>,
    pub ranges: Vec<(f64, f64)>,
}

impl ModelSources {
    pub fn single(name: String, range: (f64, f64)) -> ModelSources {
        ModelSources {
            names: vec![name],
            ranges: vec![range],
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, (f64, f64))> {
        self.names
            .iter()
            .map(|s| s.as_str())
            .zip(self.ranges.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelFile {
    Literal {
        filename: PathBuf,
        source: String,
        validity: ValidityReader,
    },

    CachedWithSourceFile {
        product: String,
        filename: PathBuf,
        validity: ValidityReader,
    },

    CachedComposed {
        product: String,
        filename: PathBuf,
    },
}

/// The path of the sidecar file holding the source name of a cached model
/// file, i.e. `<filename>.source`.
pub fn source_file_path(filename: &Path) -> PathBuf {
    let mut s = OsString::from(filename.as_os_str());
    s.push(".source");
    PathBuf::from(s)
}

fn lookup_cached_product<'a>(
    product: &str,
    cached_products: &'a IndexMap<String, PathBuf>,
) -> Result<&'a PathBuf, ModelFileError> {
    cached_products
        .get(product)
        .ok_or_else(|| ModelFileError::UnknownCachedProduct(product.to_string()))
}

impl ModelFile {
    pub fn literal<P: Into<PathBuf>, S: Into<String>>(
        filename: P,
        source: S,
        validity: ValidityReader,
    ) -> ModelFile {
        ModelFile::Literal {
            filename: filename.into(),
            source: source.into(),
            validity,
        }
    }

    /// A cached model file. The location is looked up in `cached_products`
    /// once, here.
    pub fn cached_with_source_file(
        product: &str,
        cached_products: &IndexMap<String, PathBuf>,
        validity: ValidityReader,
    ) -> Result<ModelFile, ModelFileError> {
        Ok(ModelFile::CachedWithSourceFile {
            product: product.to_string(),
            filename: lookup_cached_product(product, cached_products)?.clone(),
            validity,
        })
    }

    /// A cached composed model file. The location is looked up in
    /// `cached_products` once, here.
    pub fn cached_composed(
        product: &str,
        cached_products: &IndexMap<String, PathBuf>,
    ) -> Result<ModelFile, ModelFileError> {
        Ok(ModelFile::CachedComposed {
            product: product.to_string(),
            filename: lookup_cached_product(product, cached_products)?.clone(),
        })
    }

    pub fn filename(&self) -> &Path {
        match self {
            ModelFile::Literal { filename, .. }
            | ModelFile::CachedWithSourceFile { filename, .. }
            | ModelFile::CachedComposed { filename, .. } => filename,
        }
    }

    /// Read the sources of this model file. This touches the filesystem on
    /// every call.
    pub fn sources(&self) -> Result<ModelSources, ModelFileError> {
        match self {
            ModelFile::Literal {
                filename,
                source,
                validity,
            } => Ok(ModelSources::single(
                source.clone(),
                validity.read(filename)?,
            )),

            ModelFile::CachedWithSourceFile {
                filename, validity, ..
            } => Ok(ModelSources::single(
                read_source_file(filename)?,
                validity.read(filename)?,
            )),

            ModelFile::CachedComposed { filename, .. } => {
                Ok(ComposedModelFile::read(filename)?.model_sources())
            }
        }
    }
}

/// Read the source name stored next to a cached model file.
pub fn read_source_file(filename: &Path) -> Result<String, ModelFileError> {
    let path = source_file_path(filename);
    let contents =
        fs::read_to_string(&path).map_err(|err| ModelFileError::SourceFile {
            path: path.clone(),
            err,
        })?;
    let source = contents.trim();
    if source.is_empty() {
        return Err(ModelFileError::EmptySourceFile { path });
    }
    Ok(source.to_string())
}

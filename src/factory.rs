// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Model factories.
//!
//! A [`ModelFactory`] hides how a model is loaded from its files, and keeps
//! track of the modification of those files so that the caller knows when a
//! model needs to be reloaded.

use std::path::PathBuf;

use log::warn;
use vec1::Vec1;

use crate::{
    loaders::LoadError,
    model_file::{ModelFile, ModelFileError, ModelSources},
    monitor::FileChangeMonitor,
};

/// A function turning model files into a model.
pub type Loader<M> = Box<dyn Fn(&[PathBuf]) -> Result<M, LoadError> + Send + Sync>;

pub struct ModelFactory<M> {
    loader: Loader<M>,
    model_files: Vec1<ModelFile>,
    /// Resolved paths of `model_files`. Files are not expected to be renamed
    /// at runtime, so these are only worked out once.
    files: Option<Vec<PathBuf>>,
    monitor: FileChangeMonitor,
}

fn resolve_files<'a>(files: &'a mut Option<Vec<PathBuf>>, model_files: &[ModelFile]) -> &'a [PathBuf] {
    files.get_or_insert_with(|| {
        model_files
            .iter()
            .map(|f| f.filename().to_path_buf())
            .collect()
    })
}

impl<M> ModelFactory<M> {
    pub fn new<F>(loader: F, model_files: Vec1<ModelFile>) -> ModelFactory<M>
    where
        F: Fn(&[PathBuf]) -> Result<M, LoadError> + Send + Sync + 'static,
    {
        ModelFactory {
            loader: Box::new(loader),
            model_files,
            files: None,
            monitor: FileChangeMonitor::new(),
        }
    }

    pub fn model_files(&self) -> &[ModelFile] {
        &self.model_files
    }

    /// The paths of the files required by this model.
    pub fn files(&mut self) -> &[PathBuf] {
        resolve_files(&mut self.files, &self.model_files)
    }

    /// Forget the resolved file paths; they are worked out again on next use.
    pub fn reset_files(&mut self) {
        self.files = None;
    }

    /// Have the model files changed since the last check? A file that can't
    /// be inspected (e.g. it disappeared) counts as a change, so that the
    /// subsequent (re)load reports the actual problem.
    pub fn model_changed(&mut self) -> bool {
        let files = resolve_files(&mut self.files, &self.model_files);
        match self.monitor.changed(files) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("{e}");
                true
            }
        }
    }

    /// Forget the file fingerprints, so that the next check reports a change.
    pub fn reset_monitor(&mut self) {
        self.monitor.clear();
    }

    /// Create a new model instance.
    pub fn build(&mut self) -> Result<M, LoadError> {
        let files = resolve_files(&mut self.files, &self.model_files);
        (self.loader)(files)
    }

    /// The sources of each model file. These are read afresh on every call.
    pub fn sources(&self) -> Result<Vec<ModelSources>, ModelFileError> {
        self.model_files.iter().map(|f| f.sources()).collect()
    }
}

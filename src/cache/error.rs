// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::loaders::LoadError;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    /// The model (or its sources) could not be loaded. `model_id` is the
    /// identifier as requested by the caller.
    #[error("Failed to load model {model_id}! {source}")]
    Load {
        model_id: String,
        #[source]
        source: LoadError,
    },
}

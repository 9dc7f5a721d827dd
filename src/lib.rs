// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Magnetic model files and model caching for VirES.

Models are loaded from their files on first use, kept by a [`ModelCache`] and
reloaded only when the files change.
 */

pub mod cache;
pub mod cached_product;
mod cli;
pub mod composed;
pub mod config;
pub mod factory;
pub mod loaders;
pub mod model_file;
pub mod monitor;
pub mod registry;
pub mod shc;
pub mod time;

// Re-exports.
pub use cache::{ModelCache, ModelLoadError, ModelWithSources};
pub use cli::{ViresError, ViresMagmodels};
pub use config::Config;
pub use factory::ModelFactory;
pub use model_file::{ModelFile, ModelSources, ValidityReader};
pub use monitor::FileChangeMonitor;
pub use registry::build_model_cache;
pub use shc::ShcModel;

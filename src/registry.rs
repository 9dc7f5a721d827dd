// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The table of known models.
//!
//! Models backed by cached products are built in; they are available when
//! their cached product is configured. Models backed by static SHC files come
//! from the configuration.

use std::path::PathBuf;

use indexmap::IndexMap;
use log::{debug, warn};
use vec1::vec1;

use crate::{
    cache::ModelCache,
    config::Config,
    factory::ModelFactory,
    loaders::{load_composed_model, load_shc_model},
    model_file::{ModelFile, ModelFileError, ValidityReader},
    shc::ShcModel,
};

/// Built-in models backed by a single cached SHC product (model id, product
/// type).
pub const CACHED_SHC_MODELS: [(&str, &str); 4] = [
    ("MCO_SHA_2C", "MCO_SHA_2C"),
    ("MCO_SHA_2D", "MCO_SHA_2D"),
    ("MLI_SHA_2C", "MLI_SHA_2C"),
    ("MLI_SHA_2D", "MLI_SHA_2D"),
];

/// Built-in models backed by a cached composed product (model id, product
/// type).
pub const CACHED_COMPOSED_MODELS: [(&str, &str); 1] = [("CHAOS-Core", "MCO_SHA_2X")];

/// Deprecated and alternative model identifiers.
pub const DEFAULT_ALIASES: [(&str, &str); 4] = [
    ("IGRF", "IGRF13"),
    ("MCO_SHA_2X", "CHAOS-Core"),
    ("CHAOS-6-Core", "CHAOS-Core"),
    ("CHAOS-6-Static", "CHAOS-Static"),
];

/// Create the model factories described by `config`.
pub fn model_factories(
    config: &Config,
) -> Result<IndexMap<String, ModelFactory<ShcModel>>, ModelFileError> {
    let cached_products = config.cached_product_paths();
    let mut factories = IndexMap::new();

    for (model_id, product) in CACHED_COMPOSED_MODELS {
        if !cached_products.contains_key(product) {
            debug!("{model_id} is not available; cached product {product} is not configured");
            continue;
        }
        let factory = ModelFactory::new(
            load_composed_model,
            vec1![ModelFile::cached_composed(product, &cached_products)?],
        );
        factories.insert(model_id.to_string(), factory);
    }

    for (model_id, product) in CACHED_SHC_MODELS {
        if !cached_products.contains_key(product) {
            debug!("{model_id} is not available; cached product {product} is not configured");
            continue;
        }
        let factory = ModelFactory::new(
            |files: &[PathBuf]| load_shc_model(files, false),
            vec1![ModelFile::cached_with_source_file(
                product,
                &cached_products,
                ValidityReader::Shc
            )?],
        );
        factories.insert(model_id.to_string(), factory);
    }

    for (model_id, model) in &config.models {
        let interpolate_in_decimal_years = model.interpolate_in_decimal_years;
        let factory = ModelFactory::new(
            move |files: &[PathBuf]| load_shc_model(files, interpolate_in_decimal_years),
            vec1![ModelFile::literal(
                model.filename.clone(),
                model.source_name(),
                ValidityReader::Shc
            )],
        );
        if factories.insert(model_id.clone(), factory).is_some() {
            warn!("Configured model {model_id} replaces the built-in model");
        }
    }

    Ok(factories)
}

/// The model aliases; the default ones merged with the configured ones. A
/// configured alias replaces a default one, and a default alias is dropped if
/// a model of the same name exists.
pub fn model_aliases(
    config: &Config,
    factories: &IndexMap<String, ModelFactory<ShcModel>>,
) -> IndexMap<String, String> {
    let mut aliases: IndexMap<String, String> = DEFAULT_ALIASES
        .iter()
        .filter(|(alias, _)| !factories.contains_key(*alias))
        .map(|(alias, model_id)| (alias.to_string(), model_id.to_string()))
        .collect();
    aliases.extend(config.aliases.clone());

    for (alias, model_id) in &aliases {
        if aliases.contains_key(model_id) {
            warn!("Alias {alias} points at another alias ({model_id}) and can't be resolved");
        }
    }
    aliases
}

/// Create the model cache described by `config`.
pub fn build_model_cache(config: &Config) -> Result<ModelCache<ShcModel>, ModelFileError> {
    let factories = model_factories(config)?;
    let aliases = model_aliases(config, &factories);
    Ok(ModelCache::new(factories, aliases))
}

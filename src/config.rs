// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration: where cached products live, which static model files are
//! available and which model aliases exist.
//!
//! A configuration file is either TOML or JSON, decided by its extension, e.g.
//!
//! ```toml
//! [cached_products.MCO_SHA_2C]
//! filename = "cache/SW_OPER_MCO_SHA_2C.shc"
//!
//! [cached_products.MCO_SHA_2X]
//! filename = "cache/SW_OPER_MCO_SHA_2X.json"
//! updater = "merge_shc"
//!
//! [models.IGRF13]
//! filename = "models/IGRF13.shc"
//! source = "SW_OPER_AUX_IGR_2__19000101T000000_20241231T235959_0102"
//! interpolate_in_decimal_years = true
//!
//! [aliases]
//! IGRF = "IGRF13"
//! ```
//!
//! Relative paths are relative to the directory of the configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::cached_product::{filename_to_id, UpdaterType};

lazy_static::lazy_static! {
    pub static ref CONFIG_FILE_TYPES_COMMA_SEPARATED: String = ConfigFileType::iter().join(", ");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cached products, keyed by product type.
    #[serde(default)]
    pub cached_products: IndexMap<String, CachedProductConfig>,

    /// Models backed by static SHC files, keyed by model identifier.
    #[serde(default)]
    pub models: IndexMap<String, StaticModelConfig>,

    /// Alias -> canonical model identifier.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedProductConfig {
    pub filename: PathBuf,
    #[serde(default)]
    pub updater: UpdaterType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticModelConfig {
    pub filename: PathBuf,

    /// The source name reported for this model. Defaults to the file name
    /// without its extension.
    pub source: Option<String>,

    #[serde(default)]
    pub interpolate_in_decimal_years: bool,
}

impl StaticModelConfig {
    pub fn source_name(&self) -> String {
        self.source
            .clone()
            .unwrap_or_else(|| filename_to_id(&self.filename))
    }
}

impl Config {
    /// Read a configuration file. The file type is determined by the
    /// extension.
    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        debug!("Attempting to parse config file {}", path.display());

        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ConfigFileType::from_str(&e).ok())
            .ok_or_else(|| ConfigError::UnrecognisedExtension {
                path: path.to_path_buf(),
            })?;

        let contents = fs::read_to_string(path).map_err(|err| ConfigError::IO {
            path: path.to_path_buf(),
            err,
        })?;
        let mut config: Config = match file_type {
            ConfigFileType::Toml => {
                debug!("Parsing toml file...");
                toml::from_str(&contents).map_err(|err| ConfigError::Toml {
                    path: path.to_path_buf(),
                    err,
                })?
            }
            ConfigFileType::Json => {
                debug!("Parsing json file...");
                serde_json::from_str(&contents).map_err(|err| ConfigError::Json {
                    path: path.to_path_buf(),
                    err,
                })?
            }
        };

        if let Some(dir) = path.parent() {
            config.resolve_relative_paths(dir);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration. Paths are taken as they are.
    pub fn from_toml_str(s: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(s).map_err(|err| ConfigError::Toml {
            path: PathBuf::new(),
            err,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_relative_paths(&mut self, dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        };
        self.cached_products
            .values_mut()
            .for_each(|p| resolve(&mut p.filename));
        self.models.values_mut().for_each(|m| resolve(&mut m.filename));
    }

    /// Aliases are resolved with a single lookup, so an alias pointing at
    /// another alias would never reach a model.
    fn validate(&self) -> Result<(), ConfigError> {
        for (alias, target) in &self.aliases {
            if self.aliases.contains_key(target) {
                return Err(ConfigError::AliasChain {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }

    /// Cached product type -> file location.
    pub fn cached_product_paths(&self) -> IndexMap<String, PathBuf> {
        self.cached_products
            .iter()
            .map(|(product, c)| (product.clone(), c.filename.clone()))
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {} doesn't have a recognised file extension! Valid extensions are: {}", path.display(), *CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedExtension { path: PathBuf },

    #[error("Couldn't read config file {}: {err}", path.display())]
    IO { path: PathBuf, err: std::io::Error },

    #[error("Couldn't decode toml structure from {}:\n{err}", path.display())]
    Toml {
        path: PathBuf,
        err: toml::de::Error,
    },

    #[error("Couldn't decode json structure from {}:\n{err}", path.display())]
    Json {
        path: PathBuf,
        err: serde_json::Error,
    },

    #[error("Alias '{alias}' points at '{target}', which is itself an alias")]
    AliasChain { alias: String, target: String },
}

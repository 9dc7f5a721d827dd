// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code.
//!
//! Only 3 things should be public in this module: `ViresMagmodels`,
//! `ViresMagmodels::run`, and `ViresError`.

mod error;

pub use error::ViresError;

use std::path::PathBuf;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::{debug, info};

use crate::{
    cache::ModelCache,
    cached_product::update_cached_product,
    config::{Config, CONFIG_FILE_TYPES_COMMA_SEPARATED},
    registry::build_model_cache,
    shc::ShcModel,
    time::mjd2000_to_decimal_year,
};

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

lazy_static::lazy_static! {
    static ref CONFIG_HELP: String =
        format!("The configuration file with the cached product locations, static model files and model aliases. Supported formats: {}", *CONFIG_FILE_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Magnetic model files and model caching for VirES"
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct ViresMagmodels {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    #[clap(short, long, help = CONFIG_HELP.as_str())]
    #[clap(global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    /// List the available models and model aliases.
    ListModels,

    /// Load models and print their validity and sources.
    #[clap(arg_required_else_help = true)]
    ModelInfo {
        /// The model identifiers (or aliases).
        #[clap(required = true)]
        model_ids: Vec<String>,

        /// Also print the model coefficients at this time [MJD2000].
        #[clap(short, long)]
        time: Option<f64>,
    },

    /// Update a configured cached product from source product files.
    #[clap(arg_required_else_help = true)]
    UpdateCachedProduct {
        /// The type of the cached product, e.g. MCO_SHA_2C.
        product_type: String,

        /// The source product files.
        #[clap(required = true)]
        sources: Vec<PathBuf>,
    },
}

impl ViresMagmodels {
    pub fn run(self) -> Result<(), ViresError> {
        let GlobalArgs { verbosity, config } = self.global_opts;
        setup_logging(verbosity).expect("Failed to initialise logging.");

        let sub_command = match &self.command {
            Command::ListModels => "list-models",
            Command::ModelInfo { .. } => "model-info",
            Command::UpdateCachedProduct { .. } => "update-cached-product",
        };
        debug!("vires-magmodels {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        let config = match config {
            Some(path) => Config::read(&path)?,
            None => {
                debug!("No config file given; only built-in defaults are used");
                Config::default()
            }
        };

        match self.command {
            Command::ListModels => {
                let cache = build_model_cache(&config)?;
                list_models(&cache);
            }

            Command::ModelInfo { model_ids, time } => {
                let cache = build_model_cache(&config)?;
                for model_id in &model_ids {
                    model_info(&cache, model_id, time)?;
                }
            }

            Command::UpdateCachedProduct {
                product_type,
                sources,
            } => {
                let product = config.cached_products.get(&product_type).ok_or_else(|| {
                    ViresError::Config(format!(
                        "Cached product '{product_type}' is not configured"
                    ))
                })?;
                update_cached_product(&product_type, &sources, &product.filename, product.updater)?;
            }
        }

        debug!("vires-magmodels {} complete.", sub_command);
        Ok(())
    }
}

fn list_models(cache: &ModelCache<ShcModel>) {
    for model_id in cache.model_ids() {
        let canonical_id = cache.resolve_alias(model_id);
        if canonical_id == model_id {
            info!("{model_id}");
        } else if cache.contains(model_id) {
            info!("{model_id} -> {canonical_id}");
        } else {
            debug!("{model_id} -> {canonical_id} (not available)");
        }
    }
}

fn format_time(mjd2000: f64) -> String {
    if mjd2000.is_finite() {
        format!("{mjd2000:.6} ({:.4})", mjd2000_to_decimal_year(mjd2000))
    } else {
        format!("{mjd2000}")
    }
}

fn model_info(
    cache: &ModelCache<ShcModel>,
    model_id: &str,
    time: Option<f64>,
) -> Result<(), ViresError> {
    let (model, sources) = cache
        .get_model_with_sources(model_id)?
        .ok_or_else(|| ViresError::Model(format!("Unknown model '{model_id}'")))?;

    let canonical_id = cache.resolve_alias(model_id);
    if canonical_id == model_id {
        info!("{model_id}");
    } else {
        info!("{model_id} ({canonical_id})");
    }
    let (start, end) = model.validity();
    info!("  validity: {} - {}", format_time(start), format_time(end));
    info!("  degree:   {}", model.degree_max());
    info!("  sources:");
    for (name, (start, end)) in sources.iter().flat_map(|s| s.iter()) {
        info!("    {name}: {} - {}", format_time(start), format_time(end));
    }

    if let Some(time) = time {
        match model.coefficients_at(time) {
            Some(coefficients) => {
                info!("  coefficients at {}:", format_time(time));
                for c in coefficients {
                    let kind = if c.order < 0 { 'h' } else { 'g' };
                    info!(
                        "    {kind}({}, {}) = {}",
                        c.degree,
                        c.order.unsigned_abs(),
                        c.value
                    );
                }
            }
            None => info!("  {} is outside the model validity", format_time(time)),
        }
    }

    Ok(())
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write debug-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => debug!("Compiled on git commit hash: {hash}{dirty}"),
        None => debug!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        debug!("            git head ref: {}", hr);
    }
    debug!("            {}", BUILT_TIME_UTC);
    debug!("         with compiler {}", RUSTC_VERSION);
}

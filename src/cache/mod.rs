// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The model cache.
//!
//! Loading magnetic models is slow, so [`ModelCache`] keeps the last loaded
//! instance of every model and only reloads a model when its files have been
//! updated. The loading itself and the change detection are delegated to the
//! model's [`ModelFactory`].
//!
//! Every model identifier has its own lock. Concurrent requests for the same
//! model are serialised (a change is acted upon by exactly one reload), while
//! requests for different models don't wait on each other. Nothing is shared
//! between processes; each process detects file changes on its own.

mod error;
#[cfg(test)]
mod tests;

pub use error::ModelLoadError;

use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use log::{error, info};

use crate::{factory::ModelFactory, model_file::ModelSources};

/// A model and the sources of each of its model files.
pub type ModelWithSources<M> = (Arc<M>, Arc<Vec<ModelSources>>);

struct CacheEntry<M> {
    model: Arc<M>,
    sources: Arc<Vec<ModelSources>>,
}

struct Slot<M> {
    factory: ModelFactory<M>,
    entry: Option<CacheEntry<M>>,
}

pub struct ModelCache<M> {
    slots: IndexMap<String, Mutex<Slot<M>>>,
    aliases: IndexMap<String, String>,
}

/// Lock a slot. A poisoned lock (a loader panicked) is still usable, because
/// slot entries are only ever replaced whole.
fn lock<M>(slot: &Mutex<Slot<M>>) -> MutexGuard<'_, Slot<M>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<M> ModelCache<M> {
    /// Create a new cache from the model factories and the model aliases
    /// (alias -> canonical identifier).
    pub fn new<I>(factories: I, aliases: IndexMap<String, String>) -> ModelCache<M>
    where
        I: IntoIterator<Item = (String, ModelFactory<M>)>,
    {
        ModelCache {
            slots: factories
                .into_iter()
                .map(|(id, factory)| {
                    (
                        id,
                        Mutex::new(Slot {
                            factory,
                            entry: None,
                        }),
                    )
                })
                .collect(),
            aliases,
        }
    }

    /// Translate an alias into its canonical identifier. This is a single
    /// lookup; aliases of aliases are not followed.
    pub fn resolve_alias<'a>(&'a self, model_id: &'a str) -> &'a str {
        self.aliases
            .get(model_id)
            .map(|s| s.as_str())
            .unwrap_or(model_id)
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    /// All known model identifiers; canonical identifiers first, then aliases.
    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.slots
            .keys()
            .chain(self.aliases.keys())
            .map(|s| s.as_str())
    }

    /// Is the (possibly aliased) identifier backed by a model factory?
    pub fn contains(&self, model_id: &str) -> bool {
        self.slots.contains_key(self.resolve_alias(model_id))
    }

    /// Get a model and its sources. `Ok(None)` is returned for an unknown
    /// identifier.
    ///
    /// The model is (re)loaded if it has not been loaded yet or if its files
    /// changed. If loading fails, the error is returned and the previously
    /// cached model (if any) is kept, but not served; every following request
    /// tries to load the model again until it succeeds.
    pub fn get_model_with_sources(
        &self,
        model_id: &str,
    ) -> Result<Option<ModelWithSources<M>>, ModelLoadError> {
        let canonical_id = self.resolve_alias(model_id);
        let slot = match self.slots.get(canonical_id) {
            Some(s) => s,
            None => return Ok(None),
        };

        let mut slot = lock(slot);
        // The change check always runs, so that the file fingerprints are kept
        // up to date.
        let changed = slot.factory.model_changed();
        if let (false, Some(entry)) = (changed, slot.entry.as_ref()) {
            return Ok(Some((Arc::clone(&entry.model), Arc::clone(&entry.sources))));
        }

        let loaded = slot.factory.build().and_then(|model| {
            let sources = slot.factory.sources()?;
            Ok((model, sources))
        });
        let (model, sources) = match loaded {
            Ok(l) => l,
            Err(e) => {
                // The fingerprints already describe the new files.
                slot.factory.reset_monitor();
                if canonical_id == model_id {
                    error!("Error occurred while loading model {model_id}: {e}");
                } else {
                    error!("Error occurred while loading model {model_id}({canonical_id}): {e}");
                }
                return Err(ModelLoadError::Load {
                    model_id: model_id.to_string(),
                    source: e,
                });
            }
        };

        let entry = CacheEntry {
            model: Arc::new(model),
            sources: Arc::new(sources),
        };
        let result = (Arc::clone(&entry.model), Arc::clone(&entry.sources));
        slot.entry = Some(entry);
        info!("{canonical_id} model loaded");
        Ok(Some(result))
    }

    /// Get a model. `Ok(None)` is returned for an unknown identifier.
    pub fn get_model(&self, model_id: &str) -> Result<Option<Arc<M>>, ModelLoadError> {
        Ok(self.get_model_with_sources(model_id)?.map(|(model, _)| model))
    }

    /// Drop all cached models. They are loaded again on the next request.
    pub fn flush(&self) {
        for slot in self.slots.values() {
            lock(slot).entry = None;
        }
    }
}

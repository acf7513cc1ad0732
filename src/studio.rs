//! Application context: one engine per category
//!
//! A [`Studio`] owns every [`MixerEngine`], the shared storage backend and
//! the generator. It is the only place that knows categories depend on each
//! other: after any save or delete, the creation catalog is rebuilt from
//! all galleries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::{builtin, ItemCatalog};
use crate::composite::project_catalog;
use crate::config::{GeneratorConfig, MixConfig};
use crate::engine::{MixerEngine, MixerError};
use crate::gallery::GalleryStore;
use crate::generator::{ArtifactGenerator, CommandGenerator, GenerationError, UnavailableGenerator};
use crate::models::{Artifact, Category, DisplayAsset, EntryId, SavedEntry};
use crate::selection::Toggle;
use crate::storage::{FileStorage, Storage};

/// Build the generator described by `[generator]`.
pub fn generator_from_config(config: &GeneratorConfig) -> Arc<dyn ArtifactGenerator> {
    match &config.command {
        Some(program) => Arc::new(CommandGenerator::new(program.clone(), config.args.clone())),
        None => Arc::new(UnavailableGenerator),
    }
}

pub struct Studio {
    /// Indexed by `Category as usize`, in `Category::ALL` order.
    engines: Vec<MixerEngine>,
    generator: Arc<dyn ArtifactGenerator>,
    timeout: Duration,
    revision: u64,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("engines", &self.engines)
            .field("timeout", &self.timeout)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Studio {
    /// Open every category's gallery from `storage` and build its engine.
    pub fn new(
        config: &MixConfig,
        storage: Arc<dyn Storage>,
        generator: Arc<dyn ArtifactGenerator>,
    ) -> Result<Self, MixerError> {
        let mut engines = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let gallery = GalleryStore::open(storage.clone(), category.storage_key())?;
            let catalog = builtin(category, &config.palette.extra_colors);
            engines.push(MixerEngine::new(config.mixer_config(category), Box::new(catalog), gallery));
        }

        let mut studio =
            Self { engines, generator, timeout: config.generator.timeout(), revision: 0 };
        studio.refresh_composite();
        info!(
            saved = studio.engines.iter().map(|e| e.gallery().len()).sum::<usize>(),
            "studio ready"
        );
        Ok(studio)
    }

    /// Studio backed by files in `[storage] dir` and the configured generator.
    pub fn open(config: &MixConfig) -> Result<Self, MixerError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage.dir));
        Self::new(config, storage, generator_from_config(&config.generator))
    }

    pub fn engine(&self, category: Category) -> &MixerEngine {
        &self.engines[category as usize]
    }

    pub fn engine_mut(&mut self, category: Category) -> &mut MixerEngine {
        &mut self.engines[category as usize]
    }

    pub fn engines(&self) -> impl Iterator<Item = &MixerEngine> {
        self.engines.iter()
    }

    /// Increments every time the creation catalog is rebuilt.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn toggle(&mut self, category: Category, id: &str) -> Result<Toggle, MixerError> {
        self.engine_mut(category).toggle(id)
    }

    pub async fn combine(&mut self, category: Category) -> Result<Artifact, MixerError> {
        let generator = Arc::clone(&self.generator);
        let timeout = self.timeout;
        self.engine_mut(category).combine(generator.as_ref(), timeout).await.cloned()
    }

    pub fn save(&mut self, category: Category, name: &str) -> Result<SavedEntry, MixerError> {
        let entry = self.engine_mut(category).save(name)?;
        self.refresh_composite();
        Ok(entry)
    }

    pub fn delete(&mut self, category: Category, id: EntryId) -> Result<Option<SavedEntry>, MixerError> {
        let removed = self.engine_mut(category).delete(id)?;
        if removed.is_some() {
            self.refresh_composite();
        }
        Ok(removed)
    }

    pub fn delete_at(
        &mut self,
        category: Category,
        index: usize,
    ) -> Result<Option<SavedEntry>, MixerError> {
        let removed = self.engine_mut(category).delete_at(index)?;
        if removed.is_some() {
            self.refresh_composite();
        }
        Ok(removed)
    }

    /// Display asset for one catalog item, fetched on demand.
    ///
    /// Blended categories answer from the catalog; generated categories ask
    /// the generator for a single-item picture.
    pub async fn preview(&self, category: Category, id: &str) -> Result<DisplayAsset, MixerError> {
        let engine = self.engine(category);
        let Some(request) = engine.preview_request(id)? else {
            return engine
                .catalog()
                .get(id)
                .map(|item| item.asset.clone())
                .ok_or_else(|| MixerError::UnknownItem { category, id: id.to_string() });
        };

        let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(&request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GenerationError::TimedOut(self.timeout.as_secs())),
        };
        outcome
            .map(|artifact| artifact.display_asset())
            .map_err(|source| MixerError::Generation { category, source })
    }

    /// Rebuild the creation catalog from every gallery.
    fn refresh_composite(&mut self) {
        let catalog = project_catalog(self.engines.iter().map(|e| (e.category(), e.gallery())));
        let items = catalog.len();
        let dropped = self.engine_mut(Category::Creation).replace_catalog(Box::new(catalog));
        self.revision += 1;
        debug!(items, dropped, revision = self.revision, "creation catalog rebuilt");
    }

    /// Cancel outstanding combines and release the studio.
    pub fn shutdown(mut self) {
        let cancelled = self.engines.iter_mut().map(|e| e.cancel_combine()).filter(|c| *c).count();
        info!(cancelled, "studio closed");
    }
}

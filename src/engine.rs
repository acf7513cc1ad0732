//! The mixer engine: selection → combination → naming → gallery
//!
//! One [`MixerEngine`] serves any category. What differs between
//! categories is captured by [`MixerConfig`]: the selection bounds and the
//! [`CombineStrategy`] (blend colors locally, or ask an external generator).
//!
//! # States
//!
//! ```text
//! Idle ──toggle──▶ Ready ──begin_combine──▶ Combining ──ok──▶ Combined ──save──▶ Idle
//!                    ▲                          │ fail                │
//!                    └──────────────────────────┘                     │
//!                    ◀───────────── toggle (result discarded) ────────┘
//! ```
//!
//! The state is never stored; it is read off the selection, the artifact
//! and whether a combine ticket is outstanding.
//!
//! # Combining
//!
//! Combination is split in two so the engine is not borrowed while a slow
//! generator runs: [`MixerEngine::begin_combine`] hands out a
//! [`CombineTicket`], [`CombineTicket::run`] produces the outcome, and
//! [`MixerEngine::finish_combine`] applies it. A ticket is only honoured if
//! nothing changed in between: a toggle, a catalog refresh or
//! [`MixerEngine::cancel_combine`] makes it stale and its result is dropped.
//! [`MixerEngine::combine`] runs the three steps back to back.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::ItemCatalog;
use crate::color::blend_colors;
use crate::gallery::GalleryStore;
use crate::generator::{ArtifactGenerator, GenerationError, GenerationRequest, PromptTemplate};
use crate::models::{Artifact, CatalogItem, Category, DisplayAsset, EntryId, SavedEntry};
use crate::selection::{SelectionError, SelectionSet, Toggle};
use crate::storage::StorageError;

/// Error type for engine operations. The messages are user-facing notices.
#[derive(Debug, Error)]
pub enum MixerError {
    #[error("'{id}' is not in the {category} palette")]
    UnknownItem { category: Category, id: String },
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("nothing to mix yet: the mixer is {state}, select at least {min} items")]
    NotReady { state: EngineState, min: usize },
    #[error("a mix is already in progress")]
    Busy,
    #[error("mix something before saving")]
    NotCombined,
    #[error("please name your creation before saving")]
    EmptyName,
    #[error("failed to mix {category}: {source}. Please try again.")]
    Generation {
        category: Category,
        #[source]
        source: GenerationError,
    },
    #[error("the selection changed while mixing; the result was discarded")]
    Stale,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How a selection becomes an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineStrategy {
    /// Average the selected colors in-process.
    Blend,
    /// Build a prompt and call the external generator.
    Generate(PromptTemplate),
}

/// Per-category engine parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerConfig {
    pub category: Category,
    pub min_select: usize,
    /// `None` means unbounded.
    pub max_select: Option<usize>,
    pub strategy: CombineStrategy,
}

impl MixerConfig {
    /// Defaults: color mixes 2 to 3 swatches, animals need at least 2,
    /// everything else at least 1.
    pub fn for_category(category: Category) -> Self {
        let (min_select, max_select) = match category {
            Category::Color => (2, Some(3)),
            Category::Animal => (2, None),
            _ => (1, None),
        };
        let strategy = match PromptTemplate::for_category(category) {
            Some(template) => CombineStrategy::Generate(template),
            None => CombineStrategy::Blend,
        };
        Self { category, min_select, max_select, strategy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Selection below the minimum.
    Idle,
    /// Selection can be combined.
    Ready,
    /// A combine ticket is outstanding.
    Combining,
    /// An artifact is present and may be saved.
    Combined,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineState::Idle => "idle",
            EngineState::Ready => "ready",
            EngineState::Combining => "combining",
            EngineState::Combined => "combined",
        })
    }
}

/// The work a ticket stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineJob {
    /// Color strings to average.
    Blend(Vec<String>),
    Generate(GenerationRequest),
}

/// Permission to produce one artifact for the selection as it was when the
/// ticket was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineTicket {
    epoch: u64,
    job: CombineJob,
}

impl CombineTicket {
    pub fn job(&self) -> &CombineJob {
        &self.job
    }

    /// Produce the artifact. Blending is immediate; generation is bounded by
    /// `timeout` and a timeout counts as a failure.
    pub async fn run(
        &self,
        generator: &dyn ArtifactGenerator,
        timeout: Duration,
    ) -> Result<Artifact, GenerationError> {
        match &self.job {
            CombineJob::Blend(colors) => Ok(Artifact::color(blend_colors(colors))),
            CombineJob::Generate(request) => {
                match tokio::time::timeout(timeout, generator.generate(request)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(GenerationError::TimedOut(timeout.as_secs())),
                }
            }
        }
    }
}

/// Selection, combination and gallery for one category.
pub struct MixerEngine {
    config: MixerConfig,
    catalog: Box<dyn ItemCatalog>,
    selection: SelectionSet,
    artifact: Option<Artifact>,
    /// Epoch of the outstanding ticket, if any.
    pending: Option<u64>,
    epoch: u64,
    gallery: GalleryStore,
}

impl fmt::Debug for MixerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixerEngine")
            .field("category", &self.config.category)
            .field("state", &self.state())
            .field("selection", &self.selection.ids())
            .field("artifact", &self.artifact)
            .field("gallery", &self.gallery.len())
            .finish()
    }
}

impl MixerEngine {
    pub fn new(config: MixerConfig, catalog: Box<dyn ItemCatalog>, gallery: GalleryStore) -> Self {
        let selection = SelectionSet::new(config.min_select, config.max_select);
        Self { config, catalog, selection, artifact: None, pending: None, epoch: 0, gallery }
    }

    pub fn category(&self) -> Category {
        self.config.category
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn ItemCatalog {
        self.catalog.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Catalog items for the current selection, in pick order.
    pub fn selected_items(&self) -> Vec<&CatalogItem> {
        self.selection.ids().iter().filter_map(|id| self.catalog.get(id)).collect()
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn gallery(&self) -> &GalleryStore {
        &self.gallery
    }

    pub fn state(&self) -> EngineState {
        if self.pending.is_some() {
            EngineState::Combining
        } else if self.artifact.is_some() {
            EngineState::Combined
        } else if self.selection.can_combine() {
            EngineState::Ready
        } else {
            EngineState::Idle
        }
    }

    pub fn can_combine(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// Select or deselect a catalog item.
    ///
    /// Any change discards the current artifact and makes an outstanding
    /// combine ticket stale.
    pub fn toggle(&mut self, id: &str) -> Result<Toggle, MixerError> {
        if !self.catalog.contains(id) {
            return Err(MixerError::UnknownItem { category: self.config.category, id: id.to_string() });
        }

        let change = match self.selection.toggle(id) {
            Ok(change) => change,
            Err(e) => {
                debug!(category = %self.config.category, id, error = %e, "toggle rejected");
                return Err(e.into());
            }
        };

        self.invalidate_result();
        debug!(category = %self.config.category, id, ?change, selected = self.selection.len(), "toggled");
        Ok(change)
    }

    /// Empty the selection and drop any result.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.invalidate_result();
    }

    fn invalidate_result(&mut self) {
        self.artifact = None;
        if let Some(epoch) = self.pending.take() {
            debug!(category = %self.config.category, epoch, "outstanding combine is now stale");
        }
    }

    /// Start combining the current selection.
    ///
    /// # Errors
    ///
    /// - `Busy` while another ticket is outstanding
    /// - `NotReady` unless the engine is `Ready`
    pub fn begin_combine(&mut self) -> Result<CombineTicket, MixerError> {
        match self.state() {
            EngineState::Ready => {}
            EngineState::Combining => return Err(MixerError::Busy),
            state => return Err(MixerError::NotReady { state, min: self.config.min_select }),
        }

        let job = match &self.config.strategy {
            CombineStrategy::Blend => CombineJob::Blend(
                self.selection.ids().iter().map(|id| self.color_value(id)).collect(),
            ),
            CombineStrategy::Generate(template) => {
                CombineJob::Generate(self.request_for(template, self.selection.ids()))
            }
        };

        self.epoch += 1;
        self.pending = Some(self.epoch);
        debug!(category = %self.config.category, epoch = self.epoch, "combine started");
        Ok(CombineTicket { epoch: self.epoch, job })
    }

    /// Apply the outcome of a ticket.
    ///
    /// Success moves to `Combined`. Failure returns to `Ready` so the user
    /// can retry. A stale ticket changes nothing.
    pub fn finish_combine(
        &mut self,
        ticket: CombineTicket,
        outcome: Result<Artifact, GenerationError>,
    ) -> Result<&Artifact, MixerError> {
        if self.pending != Some(ticket.epoch) {
            debug!(category = %self.config.category, epoch = ticket.epoch, "dropping stale combine result");
            return Err(MixerError::Stale);
        }
        self.pending = None;

        match outcome {
            Ok(artifact) => {
                info!(category = %self.config.category, artifact = %artifact.reference(), "mixed");
                Ok(self.artifact.insert(artifact))
            }
            Err(source) => {
                warn!(category = %self.config.category, error = %source, "mix failed");
                Err(MixerError::Generation { category: self.config.category, source })
            }
        }
    }

    /// Abandon an outstanding combine. Returns whether there was one.
    pub fn cancel_combine(&mut self) -> bool {
        let cancelled = self.pending.take().is_some();
        if cancelled {
            info!(category = %self.config.category, "combine cancelled");
        }
        cancelled
    }

    /// Begin, run and finish a combine in one call.
    ///
    /// If the returned future is dropped before completion the engine stays
    /// `Combining` until [`cancel_combine`](Self::cancel_combine).
    pub async fn combine(
        &mut self,
        generator: &dyn ArtifactGenerator,
        timeout: Duration,
    ) -> Result<&Artifact, MixerError> {
        let ticket = self.begin_combine()?;
        let outcome = ticket.run(generator, timeout).await;
        self.finish_combine(ticket, outcome)
    }

    /// Save the current artifact under `name` (trimmed).
    ///
    /// On success the selection is cleared and the engine returns to `Idle`.
    pub fn save(&mut self, name: &str) -> Result<SavedEntry, MixerError> {
        let artifact = match (&self.artifact, self.pending) {
            (Some(artifact), None) => artifact.clone(),
            _ => return Err(MixerError::NotCombined),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(MixerError::EmptyName);
        }

        let entry = SavedEntry {
            id: EntryId::default(),
            name: name.to_string(),
            artifact: Some(artifact),
            source_ids: self.selection.ids().to_vec(),
        };
        let id = self.gallery.append(entry.clone())?;

        self.selection.clear();
        self.artifact = None;
        info!(category = %self.config.category, %id, name, "saved");
        Ok(SavedEntry { id, ..entry })
    }

    /// Delete a saved entry by id. Selection and artifact are untouched.
    pub fn delete(&mut self, id: EntryId) -> Result<Option<SavedEntry>, MixerError> {
        Ok(self.gallery.delete(id)?)
    }

    /// Delete a saved entry by position. Selection and artifact are untouched.
    pub fn delete_at(&mut self, index: usize) -> Result<Option<SavedEntry>, MixerError> {
        Ok(self.gallery.delete_at(index)?)
    }

    /// Swap in a new catalog, dropping selected ids it no longer has.
    ///
    /// Returns how many ids were dropped; if any were, the current result
    /// is discarded as for a toggle.
    pub fn replace_catalog(&mut self, catalog: Box<dyn ItemCatalog>) -> usize {
        self.catalog = catalog;
        let catalog = &self.catalog;
        let dropped = self.selection.retain(|id| catalog.contains(id));
        if dropped > 0 {
            self.invalidate_result();
            debug!(category = %self.config.category, dropped, "selection pruned after catalog change");
        }
        dropped
    }

    /// A single-item request for fetching a display asset on demand.
    ///
    /// `None` for blended categories, whose items already carry their color.
    pub fn preview_request(&self, id: &str) -> Result<Option<GenerationRequest>, MixerError> {
        if !self.catalog.contains(id) {
            return Err(MixerError::UnknownItem { category: self.config.category, id: id.to_string() });
        }
        Ok(match &self.config.strategy {
            CombineStrategy::Blend => None,
            CombineStrategy::Generate(template) => Some(self.request_for(template, &[id.to_string()])),
        })
    }

    fn color_value(&self, id: &str) -> String {
        match self.catalog.get(id).map(|item| &item.asset) {
            Some(DisplayAsset::Color(spec)) => spec.clone(),
            _ => id.to_string(),
        }
    }

    fn request_for(&self, template: &PromptTemplate, ids: &[String]) -> GenerationRequest {
        let phrases: Vec<&str> = ids
            .iter()
            .map(|id| self.catalog.get(id).map_or(id.as_str(), |item| item.phrase.as_str()))
            .collect();
        GenerationRequest {
            category: self.config.category,
            prompt: template.render(&phrases),
            aspect: template.aspect,
            source_ids: ids.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, StaticCatalog};
    use crate::color::Rgb;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::Arc;

    const RED: &str = "hsl(0, 100%, 50%)";
    const BLUE: &str = "hsl(240, 100%, 50%)";
    const GREEN: &str = "hsl(120, 100%, 50%)";
    const YELLOW: &str = "hsl(60, 100%, 50%)";
    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl ArtifactGenerator for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Artifact, GenerationError> {
            self.0.map(Artifact::image).ok_or(GenerationError::NoResult)
        }
    }

    struct Never;

    #[async_trait]
    impl ArtifactGenerator for Never {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Artifact, GenerationError> {
            std::future::pending().await
        }
    }

    fn engine(category: Category) -> MixerEngine {
        let gallery =
            GalleryStore::open(Arc::new(MemoryStorage::new()), category.storage_key()).unwrap();
        MixerEngine::new(
            MixerConfig::for_category(category),
            Box::new(builtin(category, &[])),
            gallery,
        )
    }

    #[test]
    fn test_state_follows_selection() {
        let mut e = engine(Category::Color);
        assert_eq!(e.state(), EngineState::Idle);
        e.toggle(RED).unwrap();
        assert_eq!(e.state(), EngineState::Idle);
        e.toggle(BLUE).unwrap();
        assert_eq!(e.state(), EngineState::Ready);
        e.toggle(BLUE).unwrap();
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_unknown_item_rejected() {
        let mut e = engine(Category::Animal);
        assert!(matches!(e.toggle("Dragon"), Err(MixerError::UnknownItem { .. })));
        assert!(e.selection().is_empty());
    }

    #[test]
    fn test_color_capacity() {
        let mut e = engine(Category::Color);
        for c in [RED, BLUE, GREEN] {
            e.toggle(c).unwrap();
        }
        let err = e.toggle(YELLOW).unwrap_err();
        assert!(matches!(err, MixerError::Selection(SelectionError::Full { max: 3 })));
        assert_eq!(err.to_string(), "you can only select up to 3 items to mix");
        assert_eq!(e.selection().len(), 3);
    }

    #[test]
    fn test_begin_combine_requires_ready() {
        let mut e = engine(Category::Color);
        e.toggle(RED).unwrap();
        assert!(matches!(
            e.begin_combine(),
            Err(MixerError::NotReady { state: EngineState::Idle, min: 2 })
        ));
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_blend_save_cycle() {
        let mut e = engine(Category::Color);
        e.toggle(RED).unwrap();
        e.toggle(BLUE).unwrap();

        let artifact = e.combine(&Fixed(None), TIMEOUT).await.unwrap().clone();
        assert_eq!(artifact, Artifact::color(Rgb::new(128, 0, 128)));
        assert_eq!(e.state(), EngineState::Combined);

        let saved = e.save("  Violet ").unwrap();
        assert_eq!(saved.name, "Violet");
        assert_eq!(saved.source_ids, vec![RED, BLUE]);
        assert_eq!(e.state(), EngineState::Idle);
        assert!(e.selection().is_empty());
        assert_eq!(e.gallery().list(), &[saved]);
    }

    #[tokio::test]
    async fn test_combine_rejected_when_combined() {
        let mut e = engine(Category::Color);
        e.toggle(RED).unwrap();
        e.toggle(BLUE).unwrap();
        e.combine(&Fixed(None), TIMEOUT).await.unwrap();
        assert!(matches!(
            e.begin_combine(),
            Err(MixerError::NotReady { state: EngineState::Combined, .. })
        ));
    }

    #[tokio::test]
    async fn test_toggle_discards_artifact() {
        let mut e = engine(Category::Color);
        e.toggle(RED).unwrap();
        e.toggle(BLUE).unwrap();
        e.combine(&Fixed(None), TIMEOUT).await.unwrap();

        e.toggle(GREEN).unwrap();
        assert!(e.artifact().is_none());
        assert_eq!(e.state(), EngineState::Ready);
        assert!(matches!(e.save("x"), Err(MixerError::NotCombined)));
    }

    #[tokio::test]
    async fn test_empty_name_keeps_state() {
        let mut e = engine(Category::Color);
        e.toggle(RED).unwrap();
        e.toggle(BLUE).unwrap();
        e.combine(&Fixed(None), TIMEOUT).await.unwrap();

        assert!(matches!(e.save("   "), Err(MixerError::EmptyName)));
        assert_eq!(e.state(), EngineState::Combined);
        assert_eq!(e.selection().len(), 2);
        assert!(e.gallery().is_empty());
    }

    #[tokio::test]
    async fn test_generator_success_and_prompt() {
        let mut e = engine(Category::Animal);
        e.toggle("Dog").unwrap();
        e.toggle("Fish").unwrap();

        let ticket = e.begin_combine().unwrap();
        match ticket.job() {
            CombineJob::Generate(request) => {
                assert!(request.prompt.contains("Dog mixed with Fish hybrid animal"));
                assert_eq!(request.source_ids, vec!["Dog", "Fish"]);
            }
            other => panic!("expected generation, got {:?}", other),
        }
        let outcome = ticket.run(&Fixed(Some("https://img/dogfish.png")), TIMEOUT).await;
        let artifact = e.finish_combine(ticket, outcome).unwrap();
        assert_eq!(artifact, &Artifact::image("https://img/dogfish.png"));
    }

    #[tokio::test]
    async fn test_generator_failure_is_recoverable() {
        let mut e = engine(Category::Animal);
        e.toggle("Dog").unwrap();
        e.toggle("Fish").unwrap();

        let err = e.combine(&Fixed(None), TIMEOUT).await.unwrap_err();
        assert!(matches!(err, MixerError::Generation { source: GenerationError::NoResult, .. }));
        assert_eq!(e.state(), EngineState::Ready);

        e.combine(&Fixed(Some("u")), TIMEOUT).await.unwrap();
        assert_eq!(e.state(), EngineState::Combined);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let mut e = engine(Category::Food);
        e.toggle("Pizza").unwrap();

        let err = e.combine(&Never, Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, MixerError::Generation { source: GenerationError::TimedOut(_), .. }));
        assert_eq!(e.state(), EngineState::Ready);
    }

    #[test]
    fn test_no_second_ticket_while_combining() {
        let mut e = engine(Category::Food);
        e.toggle("Pizza").unwrap();
        let _ticket = e.begin_combine().unwrap();
        assert_eq!(e.state(), EngineState::Combining);
        assert!(matches!(e.begin_combine(), Err(MixerError::Busy)));
    }

    #[tokio::test]
    async fn test_stale_ticket_is_dropped() {
        let mut e = engine(Category::Food);
        e.toggle("Pizza").unwrap();
        let ticket = e.begin_combine().unwrap();

        e.toggle("Taco").unwrap();
        assert_eq!(e.state(), EngineState::Ready);

        let outcome = ticket.run(&Fixed(Some("late")), TIMEOUT).await;
        assert!(matches!(e.finish_combine(ticket, outcome), Err(MixerError::Stale)));
        assert!(e.artifact().is_none());
        assert_eq!(e.state(), EngineState::Ready);
    }

    #[test]
    fn test_cancel_combine() {
        let mut e = engine(Category::Food);
        e.toggle("Pizza").unwrap();
        let ticket = e.begin_combine().unwrap();
        assert!(e.cancel_combine());
        assert!(!e.cancel_combine());
        assert_eq!(e.state(), EngineState::Ready);
        assert!(matches!(e.finish_combine(ticket, Ok(Artifact::image("x"))), Err(MixerError::Stale)));
    }

    #[tokio::test]
    async fn test_delete_leaves_working_state() {
        let mut e = engine(Category::Color);
        e.toggle(RED).unwrap();
        e.toggle(BLUE).unwrap();
        e.combine(&Fixed(None), TIMEOUT).await.unwrap();
        let saved = e.save("Violet").unwrap();

        e.toggle(RED).unwrap();
        e.toggle(GREEN).unwrap();
        e.combine(&Fixed(None), TIMEOUT).await.unwrap();

        assert_eq!(e.delete(saved.id).unwrap(), Some(saved));
        assert_eq!(e.state(), EngineState::Combined);
        assert_eq!(e.selection().len(), 2);
        assert!(e.delete_at(10).unwrap().is_none());
    }

    #[test]
    fn test_replace_catalog_prunes_selection() {
        let mut e = engine(Category::Food);
        e.toggle("Pizza").unwrap();
        e.toggle("Taco").unwrap();

        let smaller = StaticCatalog::new(vec![CatalogItem::new("Taco", DisplayAsset::Emoji("🌮".into()))]);
        assert_eq!(e.replace_catalog(Box::new(smaller)), 1);
        assert_eq!(e.selection().ids(), &["Taco".to_string()]);
    }

    #[test]
    fn test_preview_request() {
        let e = engine(Category::Movie);
        let request = e.preview_request("Western").unwrap().unwrap();
        assert_eq!(request.source_ids, vec!["Western"]);
        assert!(request.prompt.contains("Western"));

        let colors = engine(Category::Color);
        assert!(colors.preview_request(RED).unwrap().is_none());
        assert!(colors.preview_request("#123456").is_err());
    }
}

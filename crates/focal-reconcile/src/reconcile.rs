//! Reconciliation passes: apply one batch of signals to a record.
//!
//! Each pass merges its signal through the focal-core engine, re-derives
//! keywords and title, recomputes the quality score, persists the record,
//! and returns the side-effect intents for the caller to apply. Passes on
//! the same record id are serialized by a keyed lock; collaborator
//! failures are aggregated per pass and never abort the remaining
//! independent sub-steps.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use focal_core::models::{
    ExtractedMetadata, FormEdit, Label, LabelSource, Labels, Record, QUALITY_APPROVED,
};
use focal_core::source::Provenance;
use focal_core::text;
use focal_core::traits::{
    KeywordRepository, LabelRepository, LocationResolver, QualityScorer, RecordRepository,
};
use focal_core::{Error, Result};

use crate::intents::{
    CounterDelta, Intents, KeywordAttach, KeywordDetach, LabelAttach, LabelDetach,
};
use crate::locks::RecordLocks;

/// Uncertainty recorded on keyword-derived label associations.
const KEYWORD_LABEL_UNCERTAINTY: i32 = 25;

/// Priority of labels derived from a location category.
const LOCATION_LABEL_PRIORITY: i32 = -1;

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Whether any record field changed.
    pub changed: bool,
    /// Side effects for the caller to apply transactionally.
    pub intents: Intents,
    /// Aggregated non-fatal collaborator and conflict errors.
    pub errors: Vec<Error>,
}

impl Outcome {
    /// True when every sub-step succeeded.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One batch of new signals for [`Reconciler::reconcile`].
///
/// Signals are applied in a fixed order: extracted metadata, geocode
/// result, classification labels, then the manual edit.
#[derive(Debug, Default)]
pub struct SignalBatch {
    pub metadata: Option<ExtractedMetadata>,
    pub cell_id: Option<String>,
    pub labels: Option<Labels>,
    pub form: Option<FormEdit>,
}

/// The reconciliation orchestrator.
///
/// Holds the collaborator handles and the per-record lock set. All merge
/// logic stays synchronous; only collaborator calls await.
pub struct Reconciler {
    records: Arc<dyn RecordRepository>,
    labels: Arc<dyn LabelRepository>,
    keywords: Arc<dyn KeywordRepository>,
    locations: Arc<dyn LocationResolver>,
    scorer: Arc<dyn QualityScorer>,
    locks: RecordLocks,
}

impl Reconciler {
    pub fn new(
        records: Arc<dyn RecordRepository>,
        labels: Arc<dyn LabelRepository>,
        keywords: Arc<dyn KeywordRepository>,
        locations: Arc<dyn LocationResolver>,
        scorer: Arc<dyn QualityScorer>,
    ) -> Self {
        Self {
            records,
            labels,
            keywords,
            locations,
            scorer,
            locks: RecordLocks::new(),
        }
    }

    // ─── Passes ────────────────────────────────────────────────────────────

    /// Apply a batch of signals in a fixed order and finish with keyword
    /// indexing, quality recomputation, and a save.
    pub async fn reconcile(&self, record: &mut Record, batch: SignalBatch) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("reconcile"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        if let Some(meta) = &batch.metadata {
            self.merge_metadata(record, meta, &mut outcome);
        }

        if let Some(cell_id) = &batch.cell_id {
            self.merge_geocode(record, cell_id, &mut outcome).await;
        }

        if let Some(labels) = &batch.labels {
            self.merge_labels(record, labels, &mut outcome).await;
        }

        if let Some(form) = batch.form {
            self.merge_form(record, form, &mut outcome).await;
        }

        self.finalize(record, &mut outcome).await;

        Ok(outcome)
    }

    /// Apply a manual user edit.
    pub async fn apply_form(&self, record: &mut Record, form: FormEdit) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("apply form"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        self.merge_form(record, form, &mut outcome).await;
        self.finalize(record, &mut outcome).await;

        Ok(outcome)
    }

    /// Apply metadata extracted from the media file.
    pub async fn apply_metadata(
        &self,
        record: &mut Record,
        meta: ExtractedMetadata,
    ) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("apply metadata"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        self.merge_metadata(record, &meta, &mut outcome);
        self.finalize(record, &mut outcome).await;

        Ok(outcome)
    }

    /// Apply a classification result.
    pub async fn apply_labels(&self, record: &mut Record, labels: Labels) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("apply labels"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        self.merge_labels(record, &labels, &mut outcome).await;
        self.finalize(record, &mut outcome).await;

        Ok(outcome)
    }

    /// Apply a reverse-geocoding result by cell id.
    pub async fn apply_geocode(&self, record: &mut Record, cell_id: &str) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("apply geocode"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        self.merge_geocode(record, cell_id, &mut outcome).await;
        self.finalize(record, &mut outcome).await;

        Ok(outcome)
    }

    // ─── Lifecycle operations ──────────────────────────────────────────────

    /// Update the favorite flag, emitting a counter intent on change.
    pub async fn set_favorite(&self, record: &mut Record, favorite: bool) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("set favorite"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        let changed = self.toggle_favorite(record, favorite, &mut outcome.intents);
        outcome.changed = changed;
        record.quality = self.scorer.score(record);
        self.persist(record, &mut outcome).await;

        Ok(outcome)
    }

    /// Approve a record in review. A no-op for already-approved records.
    pub async fn approve(&self, record: &mut Record) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("approve"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        if record.quality >= QUALITY_APPROVED {
            return Ok(outcome);
        }

        record.edited_at = Some(Utc::now());
        record.quality = self.scorer.score(record);
        outcome.changed = true;
        self.persist(record, &mut outcome).await;
        outcome.intents.counters.push(CounterDelta::Review(-1));

        info!(record_id = %id, quality = record.quality, "record approved");

        Ok(outcome)
    }

    /// Archive a record (soft delete). Album memberships are marked
    /// hidden, not removed.
    pub async fn archive(&self, record: &mut Record) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("archive"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        if record.deleted_at.is_some() {
            return Ok(outcome);
        }

        record.deleted_at = Some(Utc::now());
        outcome.intents.hide_albums = true;
        outcome.changed = true;
        self.persist(record, &mut outcome).await;

        info!(record_id = %id, "record archived");

        Ok(outcome)
    }

    /// Undo a soft delete.
    pub async fn restore(&self, record: &mut Record) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("restore"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        if record.deleted_at.is_none() {
            return Ok(outcome);
        }

        record.deleted_at = None;
        outcome.changed = true;
        self.persist(record, &mut outcome).await;

        Ok(outcome)
    }

    /// Soft-delete the record, or purge it permanently along with every
    /// derived association. Purging is terminal.
    pub async fn delete(&self, record: &mut Record, permanently: bool) -> Result<Outcome> {
        let id = record.id.ok_or(Error::MissingId("delete"))?;
        let _guard = self.locks.acquire(id).await;
        let mut outcome = Outcome::default();

        record.deleted_at = Some(Utc::now());
        outcome.changed = true;

        if permanently {
            outcome.intents.purge_associations = true;

            if let Err(e) = self.records.delete(id).await {
                error!(record_id = %id, error = %e, "record delete failed");
                outcome.errors.push(e);
            } else {
                info!(record_id = %id, "record purged");
            }
        } else {
            record.quality = -1;
            self.persist(record, &mut outcome).await;
        }

        Ok(outcome)
    }

    // ─── Merge steps ───────────────────────────────────────────────────────

    fn merge_metadata(
        &self,
        record: &mut Record,
        meta: &ExtractedMetadata,
        outcome: &mut Outcome,
    ) {
        if let Some(taken) = meta.taken_at {
            outcome.changed |= record.set_taken_at(
                taken,
                meta.taken_at_local,
                meta.time_zone.as_deref(),
                Provenance::Meta,
            );
        } else if let Some(zone) = &meta.time_zone {
            outcome.changed |= record.update_time_zone(zone);
        }

        if let Some(gps) = &meta.gps {
            outcome.changed |= record.set_coordinates(
                gps.latitude,
                gps.longitude,
                gps.altitude,
                Provenance::Meta,
            );
        }

        if let Some(camera) = meta.camera.clone() {
            outcome.changed |= record.set_camera(camera, Provenance::Meta);
        }

        if let Some(lens) = meta.lens.clone() {
            outcome.changed |= record.set_lens(lens, Provenance::Meta);
        }

        outcome.changed |= record.set_exposure(
            meta.focal_length,
            meta.f_number,
            meta.iso,
            &meta.exposure,
            Provenance::Meta,
        );
        outcome.changed |= record.set_camera_serial(&meta.camera_serial);

        if !meta.title.is_empty() {
            outcome.changed |= record.set_title(&meta.title, Provenance::Meta);
        }

        if !meta.description.is_empty() {
            outcome.changed |= record.set_description(&meta.description, Provenance::Meta);
        }
    }

    async fn merge_form(&self, record: &mut Record, form: FormEdit, outcome: &mut Outcome) {
        if let Some(title) = &form.title {
            outcome.changed |= record.set_title(title, Provenance::Manual);
        }

        if let Some(description) = &form.description {
            outcome.changed |= record.set_description(description, Provenance::Manual);
        }

        if let Some(gps) = &form.gps {
            outcome.changed |= record.set_coordinates(
                gps.latitude,
                gps.longitude,
                gps.altitude,
                Provenance::Manual,
            );
        }

        if let Some(taken) = form.taken_at {
            outcome.changed |= record.set_taken_at(
                taken,
                form.taken_at_local,
                form.time_zone.as_deref(),
                Provenance::Manual,
            );
        } else if let Some(zone) = &form.time_zone {
            outcome.changed |= record.update_time_zone(zone);
        }

        if let Some(words) = &form.keywords {
            let tokens =
                text::unique_words(words.iter().flat_map(|w| text::keywords(w)).collect());
            if record.keywords != tokens {
                record.keywords = tokens;
                outcome.changed = true;
            }
        }

        if let Some(private) = form.private {
            outcome.changed |= record.private != private;
            record.private = private;
        }

        if let Some(favorite) = form.favorite {
            let changed = self.toggle_favorite(record, favorite, &mut outcome.intents);
            outcome.changed |= changed;
        }

        record.update_date_fields();
        self.sync_keyword_labels(record, outcome).await;

        if let Err(e) = record.update_title(&Labels::default()) {
            debug!(error = %e, "title not updated");
            outcome.errors.push(e);
        }

        record.edited_at = Some(Utc::now());
    }

    async fn merge_labels(&self, record: &mut Record, labels: &Labels, outcome: &mut Outcome) {
        record.update_date_fields();

        if let Err(e) = record.update_title(labels) {
            debug!(error = %e, "title not updated");
            outcome.errors.push(e);
        }

        for label in labels.iter() {
            if label.name.is_empty() {
                continue;
            }

            let name = text::title_case(&label.name);

            match self.labels.find_or_create(&name, label.priority).await {
                Ok(entity) if entity.deleted => {
                    debug!(label = %entity.name, "skipping deleted label");
                }
                Ok(entity) => outcome.intents.attach_labels.push(LabelAttach {
                    label_id: entity.id,
                    name: entity.name,
                    uncertainty: label.uncertainty,
                    source: label.source,
                }),
                Err(e) => {
                    error!(label = %name, error = %e, "label lookup failed");
                    outcome.errors.push(e);
                }
            }
        }

        let mut words: Vec<String> = record
            .keywords
            .iter()
            .flat_map(|k| text::keywords(k))
            .collect();
        words.extend(labels.keywords());

        let merged = text::unique_words(words);
        if record.keywords != merged {
            record.keywords = merged;
            outcome.changed = true;
        }
    }

    async fn merge_geocode(&self, record: &mut Record, cell_id: &str, outcome: &mut Outcome) {
        let cell = match self.locations.resolve_cell(cell_id).await {
            Ok(Some(cell)) => cell,
            Ok(None) => {
                outcome
                    .errors
                    .push(Error::NotFound(format!("cell {}", cell_id)));
                return;
            }
            Err(e) => {
                error!(cell_id, error = %e, "location resolution failed");
                outcome.errors.push(e);
                return;
            }
        };

        if record.cell.as_ref() != Some(&cell) {
            record.place = cell.place.clone().or_else(|| record.place.take());
            record.cell = Some(cell.clone());
            outcome.changed = true;
        }

        // Location words enrich the record's keyword set.
        let mut words = record.keywords.clone();
        words.extend(text::keywords(&cell.name));
        if let Some(place) = &cell.place {
            words.extend(text::keywords(&place.city));
            words.extend(text::keywords(&place.state));
            words.extend(text::keywords(&place.country));
        }

        let merged = text::unique_words(words);
        if record.keywords != merged {
            record.keywords = merged;
            outcome.changed = true;
        }

        let mut labels = Labels::default();

        if !cell.category.is_empty() {
            let name = text::title_case(&cell.category);

            match self
                .labels
                .find_or_create(&name, LOCATION_LABEL_PRIORITY)
                .await
            {
                Ok(entity) if entity.deleted => {}
                Ok(entity) => {
                    labels.0.push(Label::new(
                        entity.name.clone(),
                        LOCATION_LABEL_PRIORITY,
                        0,
                        LabelSource::Location,
                    ));
                    outcome.intents.attach_labels.push(LabelAttach {
                        label_id: entity.id,
                        name: entity.name,
                        uncertainty: 0,
                        source: LabelSource::Location,
                    });
                }
                Err(e) => {
                    error!(label = %name, error = %e, "label lookup failed");
                    outcome.errors.push(e);
                }
            }
        }

        if let Err(e) = record.update_title(&labels) {
            debug!(error = %e, "title not updated");
            outcome.errors.push(e);
        }
    }

    // ─── Shared sub-steps ──────────────────────────────────────────────────

    fn toggle_favorite(
        &self,
        record: &mut Record,
        favorite: bool,
        intents: &mut Intents,
    ) -> bool {
        let changed = record.favorite != favorite;
        record.favorite = favorite;

        // Counters track visible records only.
        if changed && !record.private && record.deleted_at.is_none() {
            intents
                .counters
                .push(CounterDelta::Favorites(if favorite { 1 } else { -1 }));
        }

        changed
    }

    /// Maintain keyword-sourced label associations for the record's
    /// current keyword set. Only existing labels are matched; keywords
    /// never create labels.
    async fn sync_keyword_labels(&self, record: &Record, outcome: &mut Outcome) {
        let mut keep = Vec::new();

        for word in &record.keywords {
            match self.labels.find(word).await {
                Ok(Some(entity)) if entity.deleted => continue,
                Ok(Some(entity)) => {
                    keep.push(entity.id);
                    outcome.intents.attach_labels.push(LabelAttach {
                        label_id: entity.id,
                        name: entity.name,
                        uncertainty: KEYWORD_LABEL_UNCERTAINTY,
                        source: LabelSource::Keyword,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    error!(keyword = %word, error = %e, "label lookup failed");
                    outcome.errors.push(e);
                }
            }
        }

        outcome.intents.detach_labels = Some(LabelDetach {
            source: LabelSource::Keyword,
            keep,
        });
    }

    /// Re-index keywords from title, description, and the record's own
    /// keyword list, producing attach and detach-not-in intents.
    async fn index_keywords(&self, record: &Record, outcome: &mut Outcome) {
        let mut words = text::keywords(&record.title);
        words.extend(text::keywords(&record.description));
        for k in &record.keywords {
            words.extend(text::keywords(k));
        }

        let words = text::unique_words(words);
        let mut keep = Vec::new();

        for word in &words {
            match self.keywords.find_or_create(word).await {
                Ok(kw) if kw.skip => continue,
                Ok(kw) => {
                    keep.push(kw.id);
                    outcome.intents.attach_keywords.push(KeywordAttach {
                        keyword_id: kw.id,
                        word: kw.word,
                    });
                }
                Err(e) => {
                    error!(keyword = %word, error = %e, "keyword lookup failed");
                    outcome.errors.push(e);
                }
            }
        }

        debug!(keyword_count = keep.len(), "keywords indexed");

        outcome.intents.detach_keywords = Some(KeywordDetach { keep });
    }

    /// Keyword indexing, quality recomputation, and save: the common
    /// tail of every signal pass.
    async fn finalize(&self, record: &mut Record, outcome: &mut Outcome) {
        self.index_keywords(record, outcome).await;

        let quality = self.scorer.score(record);
        if record.quality != quality {
            record.quality = quality;
            outcome.changed = true;
        }

        self.persist(record, outcome).await;
    }

    async fn persist(&self, record: &Record, outcome: &mut Outcome) {
        if let Err(e) = self.records.save(record).await {
            error!(record = %record, error = %e, "record save failed");
            outcome.errors.push(e);
        }
    }
}

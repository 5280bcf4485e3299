//! # Document Store
//!
//! Authoritative in-memory mirror of one open page.
//!
//! A `DocumentStore` is constructed by whoever owns the editor screen and
//! lives exactly as long as it. All edits go through it:
//!
//! ```text
//! UI ──► structural op ──► backend confirms ──► apply locally ──► snapshot + dirty
//! UI ──► local edit ───────────────────────────► apply locally ──► dirty
//! Sync ──► prepare_save ──► backend ──► finish_save ──► clean (if no edits meanwhile)
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! load / begin_draft → edit → save → publish → close
//! ```
//!
//! Each `load`, `begin_draft` and `close` starts a new session generation.
//! A save that completes after its session ended is discarded.

use crate::backend::{
    NewPage, NewSection, PageBackend, PageUpdate, PreviewLink, PublishAck, UpdateAck,
};
use crate::config::EditorConfig;
use crate::errors::{BackendError, EditorError, EditorResult};
use crate::history::HistoryManager;
use crate::mutations::{
    LocalEdit, LocalOutcome, MoveDirection, NoopReason, StructuralOp, StructuralOutcome,
};
use chrono::{DateTime, Utc};
use pagebuilder_model::{
    resequence, PageDocument, PageId, PageSettings, PageStatus, Section, SectionContent,
    SectionId, SectionPatch, SectionStyles, SectionType, Seo,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a save needs, captured without holding the store
#[derive(Debug, Clone)]
pub struct SavePlan {
    session: u64,
    revision: u64,
    page_id: Option<PageId>,
    slug: String,
    name: String,
    update: PageUpdate,
}

impl SavePlan {
    pub fn creates_version(&self) -> bool {
        self.update.create_version
    }

    /// Send the plan to the backend. Creates the page if it was never persisted.
    pub async fn execute(&self, backend: &dyn PageBackend) -> EditorResult<SaveResponse> {
        match &self.page_id {
            Some(id) => {
                let ack = backend.update_page(id, self.update.clone()).await?;
                Ok(SaveResponse::Updated(ack))
            }
            None => {
                let page = backend
                    .create_page(NewPage {
                        slug: self.slug.clone(),
                        name: self.name.clone(),
                        sections: self.update.sections.clone(),
                        settings: self.update.settings.clone(),
                        seo: self.update.seo.clone(),
                        create_version: self.update.create_version,
                        version_note: self.update.version_note.clone(),
                        saved_by: self.update.saved_by.clone(),
                    })
                    .await?;
                if page.id.is_none() {
                    return Err(EditorError::Conflict(
                        "backend created a page without an id".to_string(),
                    ));
                }
                Ok(SaveResponse::Created(page))
            }
        }
    }
}

/// What the backend answered to a save
#[derive(Debug, Clone)]
pub enum SaveResponse {
    Created(PageDocument),
    Updated(UpdateAck),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Nothing to persist; no backend call was made
    Unchanged,
    Saved {
        saved_at: DateTime<Utc>,
        current_version: u32,
        version_created: bool,
        /// Edits landed while the save was in flight
        still_dirty: bool,
    },
    /// The session ended before the backend answered
    Discarded,
}

/// In-memory state of one open page
pub struct DocumentStore {
    backend: Arc<dyn PageBackend>,
    config: EditorConfig,
    page: Option<PageDocument>,
    history: HistoryManager,
    selected: Option<SectionId>,
    dirty: bool,
    /// Bumped by every applied mutation
    revision: u64,
    /// Bumped by load, begin_draft and close
    session: u64,
    last_saved: Option<DateTime<Utc>>,
    /// Every section id seen this session; a backend may never hand one out twice
    known_ids: HashSet<SectionId>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn PageBackend>, config: EditorConfig) -> Self {
        let history = HistoryManager::new(config.history_capacity);
        Self {
            backend,
            config,
            page: None,
            history,
            selected: None,
            dirty: false,
            revision: 0,
            session: 0,
            last_saved: None,
            known_ids: HashSet::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Fetch a page and make it the open document
    pub async fn load(&mut self, slug: &str) -> EditorResult<()> {
        let backend = Arc::clone(&self.backend);
        let page = backend.fetch_page(slug).await.map_err(|e| match e {
            BackendError::NotFound(_) => EditorError::NotFound {
                slug: slug.to_string(),
            },
            other => other.into(),
        })?;

        info!(slug, sections = page.sections.len(), "loaded page");
        self.open(page);
        Ok(())
    }

    /// Open a new page that the backend has not seen yet
    pub fn begin_draft(&mut self, slug: impl Into<String>, name: impl Into<String>) {
        let page = PageDocument::draft(slug, name);
        info!(slug = %page.slug, "started draft page");
        self.open(page);
    }

    /// Discard the open page. In-flight saves complete but are ignored.
    pub fn close(&mut self) {
        if let Some(page) = &self.page {
            debug!(slug = %page.slug, dirty = self.dirty, "closing page");
        }
        self.session += 1;
        self.page = None;
        self.history.clear();
        self.selected = None;
        self.dirty = false;
        self.last_saved = None;
        self.known_ids.clear();
    }

    fn open(&mut self, mut page: PageDocument) {
        page.sections.sort_by_key(|s| s.order);
        if resequence(&mut page.sections) {
            debug!(slug = %page.slug, "normalized section order");
        }

        self.session += 1;
        self.history.seed(page.sections.clone());
        self.known_ids = page.sections.iter().map(|s| s.id.clone()).collect();
        self.selected = None;
        self.dirty = false;
        self.last_saved = page.updated_at;
        self.page = Some(page);
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn page(&self) -> Option<&PageDocument> {
        self.page.as_ref()
    }

    pub fn sections(&self) -> &[Section] {
        self.page.as_ref().map(|p| p.sections.as_slice()).unwrap_or(&[])
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections().iter().find(|s| &s.id == id)
    }

    pub fn section_index(&self, id: &SectionId) -> Option<usize> {
        self.sections().iter().position(|s| &s.id == id)
    }

    /// Read a content value by dot path
    pub fn section_content(&self, id: &SectionId, path: &str) -> EditorResult<Option<Value>> {
        match self.section(id) {
            Some(section) => Ok(section.content.get_path(path)?),
            None => Ok(None),
        }
    }

    pub fn selected_section_id(&self) -> Option<&SectionId> {
        self.selected.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> Option<PageStatus> {
        self.page.as_ref().map(|p| p.status)
    }

    pub fn current_version(&self) -> Option<u32> {
        self.page.as_ref().map(|p| p.current_version)
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn backend(&self) -> Arc<dyn PageBackend> {
        Arc::clone(&self.backend)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Select a section; returns false if it does not exist
    pub fn select_section(&mut self, id: &SectionId) -> bool {
        if self.section(id).is_some() {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ---------------------------------------------------------------------
    // Structural operations
    // ---------------------------------------------------------------------

    /// Apply any structural operation
    pub async fn apply_structural(&mut self, op: StructuralOp) -> EditorResult<StructuralOutcome> {
        match op {
            StructuralOp::AddSection {
                section_type,
                content,
                position,
            } => self.add_section(section_type, content, position).await,
            StructuralOp::DeleteSection { section_id } => self.delete_section(&section_id).await,
            StructuralOp::DuplicateSection { section_id } => {
                self.duplicate_section(&section_id).await
            }
            StructuralOp::MoveSection {
                section_id,
                direction,
            } => self.move_section(&section_id, direction),
            StructuralOp::ReorderSections {
                from_index,
                to_index,
            } => self.reorder_sections(from_index, to_index),
            StructuralOp::RestoreVersion { version_number } => {
                self.restore_version(version_number)
            }
        }
    }

    /// Create a section through the backend, then insert it at `position`
    /// (clamped; `None` appends) and select it
    pub async fn add_section(
        &mut self,
        section_type: SectionType,
        content: Option<SectionContent>,
        position: Option<usize>,
    ) -> EditorResult<StructuralOutcome> {
        let page_id = self.persisted_id("add a section")?;
        let position = position
            .unwrap_or(usize::MAX)
            .min(self.sections().len());

        let backend = Arc::clone(&self.backend);
        let section = backend
            .create_section(&page_id, NewSection::new(section_type, content, position))
            .await?;

        self.insert_confirmed(section, position, "add section")
    }

    /// Delete a section through the backend. Unknown ids are a no-op.
    ///
    /// A section the backend no longer has (deleted, then brought back by
    /// undo) is removed locally; the next save reconciles the backend.
    pub async fn delete_section(&mut self, id: &SectionId) -> EditorResult<StructuralOutcome> {
        if !self.open_page()?.sections.iter().any(|s| &s.id == id) {
            return Ok(noop(NoopReason::SectionNotFound(id.clone())));
        }
        let page_id = self.persisted_id("delete a section")?;

        let backend = Arc::clone(&self.backend);
        match backend.delete_section(&page_id, id).await {
            Ok(()) => {}
            Err(BackendError::NotFound(what)) => {
                debug!(section = %id, %what, "section already gone on the backend");
            }
            Err(e) => return Err(e.into()),
        }

        let sections = self.sections_mut()?;
        let Some(index) = sections.iter().position(|s| &s.id == id) else {
            return Ok(noop(NoopReason::SectionNotFound(id.clone())));
        };
        sections.remove(index);
        resequence(sections);

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }

        debug!(section = %id, "deleted section");
        Ok(self.record("delete section", Some(id.clone())))
    }

    /// Copy a section (content deep-copied) into a new section right after it
    pub async fn duplicate_section(&mut self, id: &SectionId) -> EditorResult<StructuralOutcome> {
        let Some(index) = self.open_page()?.sections.iter().position(|s| &s.id == id) else {
            return Ok(noop(NoopReason::SectionNotFound(id.clone())));
        };
        let page_id = self.persisted_id("duplicate a section")?;

        let source = self.sections()[index].clone();
        let position = index + 1;

        let backend = Arc::clone(&self.backend);
        let section = backend
            .create_section(&page_id, NewSection::copy_of(&source, position))
            .await?;

        self.insert_confirmed(section, position, "duplicate section")
    }

    /// Swap a section with its neighbour. No-op at either end.
    pub fn move_section(
        &mut self,
        id: &SectionId,
        direction: MoveDirection,
    ) -> EditorResult<StructuralOutcome> {
        let sections = self.sections_mut()?;
        let Some(index) = sections.iter().position(|s| &s.id == id) else {
            return Ok(noop(NoopReason::SectionNotFound(id.clone())));
        };

        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < sections.len() => index + 1,
            _ => return Ok(noop(NoopReason::AtBoundary)),
        };

        sections.swap(index, target);
        resequence(sections);

        debug!(section = %id, from = index, to = target, "moved section");
        Ok(self.record("move section", Some(id.clone())))
    }

    /// Remove the section at `from_index` and reinsert it at `to_index`
    /// (clamped to the last position)
    pub fn reorder_sections(
        &mut self,
        from_index: usize,
        to_index: usize,
    ) -> EditorResult<StructuralOutcome> {
        let sections = self.sections_mut()?;
        if from_index >= sections.len() {
            return Ok(noop(NoopReason::IndexOutOfRange));
        }

        let to_index = to_index.min(sections.len() - 1);
        if from_index == to_index {
            return Ok(noop(NoopReason::SamePosition));
        }

        let section = sections.remove(from_index);
        let id = section.id.clone();
        sections.insert(to_index, section);
        resequence(sections);

        debug!(section = %id, from = from_index, to = to_index, "reordered section");
        Ok(self.record("reorder sections", Some(id)))
    }

    /// Replace the section list with a stored version's sections
    pub fn restore_version(&mut self, version_number: u32) -> EditorResult<StructuralOutcome> {
        let page = self.page.as_mut().ok_or(EditorError::NoDocument)?;
        let mut sections = page
            .version(version_number)
            .ok_or(EditorError::UnknownVersion(version_number))?
            .sections
            .clone();
        resequence(&mut sections);

        self.known_ids.extend(sections.iter().map(|s| s.id.clone()));
        page.sections = sections;
        self.fix_selection();

        info!(version = version_number, "restored version");
        Ok(self.record("restore version", None))
    }

    fn insert_confirmed(
        &mut self,
        section: Section,
        position: usize,
        label: &'static str,
    ) -> EditorResult<StructuralOutcome> {
        if self.known_ids.contains(&section.id) {
            return Err(EditorError::Conflict(format!(
                "backend reused section id {}",
                section.id
            )));
        }

        let id = section.id.clone();
        let sections = self.sections_mut()?;
        let position = position.min(sections.len());
        sections.insert(position, section);
        resequence(sections);

        self.known_ids.insert(id.clone());
        self.selected = Some(id.clone());

        debug!(section = %id, position, "inserted section");
        Ok(self.record(label, Some(id)))
    }

    /// Snapshot the current sections after a structural change
    fn record(&mut self, label: &'static str, section_id: Option<SectionId>) -> StructuralOutcome {
        let sections = self.sections().to_vec();
        self.history.push(sections, label);
        self.touch();

        StructuralOutcome::Applied {
            section_id,
            history_cursor: self.history.cursor(),
        }
    }

    // ---------------------------------------------------------------------
    // Undo / redo
    // ---------------------------------------------------------------------

    /// Restore the previous snapshot. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(<[Section]>::to_vec) else {
            return false;
        };
        self.restore_snapshot(snapshot, "undo")
    }

    /// Restore the next snapshot. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(<[Section]>::to_vec) else {
            return false;
        };
        self.restore_snapshot(snapshot, "redo")
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore_snapshot(&mut self, snapshot: Vec<Section>, action: &str) -> bool {
        let Some(page) = self.page.as_mut() else {
            return false;
        };
        page.sections = snapshot;
        self.fix_selection();
        self.touch();

        debug!(action, cursor = self.history.cursor(), "restored snapshot");
        true
    }

    fn fix_selection(&mut self) {
        if let Some(id) = &self.selected {
            if self.section(id).is_none() {
                self.selected = None;
            }
        }
    }

    // ---------------------------------------------------------------------
    // Local edits
    // ---------------------------------------------------------------------

    /// Apply a field-level edit. Never fails; no history snapshot.
    pub fn apply_local(&mut self, edit: LocalEdit) -> LocalOutcome {
        let Some(page) = self.page.as_mut() else {
            return LocalOutcome::Noop {
                reason: NoopReason::NoDocument,
            };
        };

        let outcome = apply_edit(page, edit);
        if let LocalOutcome::Applied { schema_valid } = &outcome {
            if !schema_valid {
                warn!("section content no longer matches its schema; save will be rejected");
            }
            self.touch();
        }
        outcome
    }

    pub fn update_section_content(
        &mut self,
        id: &SectionId,
        path: &str,
        value: Value,
    ) -> LocalOutcome {
        self.apply_local(LocalEdit::UpdateContent {
            section_id: id.clone(),
            path: path.to_string(),
            value,
        })
    }

    pub fn update_section_styles(&mut self, id: &SectionId, styles: SectionStyles) -> LocalOutcome {
        self.apply_local(LocalEdit::UpdateStyles {
            section_id: id.clone(),
            styles,
        })
    }

    pub fn update_section(&mut self, id: &SectionId, patch: SectionPatch) -> LocalOutcome {
        self.apply_local(LocalEdit::UpdateSection {
            section_id: id.clone(),
            patch,
        })
    }

    pub fn toggle_section_visibility(&mut self, id: &SectionId) -> LocalOutcome {
        self.apply_local(LocalEdit::ToggleVisibility {
            section_id: id.clone(),
        })
    }

    pub fn update_settings(&mut self, settings: PageSettings) -> LocalOutcome {
        self.apply_local(LocalEdit::UpdateSettings { settings })
    }

    pub fn update_seo(&mut self, seo: Seo) -> LocalOutcome {
        self.apply_local(LocalEdit::UpdateSeo { seo })
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Capture a save. `None` when there is nothing to persist.
    pub fn prepare_save(
        &self,
        create_version: bool,
        note: Option<&str>,
    ) -> EditorResult<Option<SavePlan>> {
        let page = self.page.as_ref().ok_or(EditorError::NoDocument)?;

        if page.is_persisted() && !self.dirty && !create_version {
            return Ok(None);
        }

        Ok(Some(SavePlan {
            session: self.session,
            revision: self.revision,
            page_id: page.id.clone(),
            slug: page.slug.clone(),
            name: page.name.clone(),
            update: PageUpdate {
                sections: page.sections.clone(),
                settings: page.settings.clone(),
                seo: page.seo.clone(),
                create_version,
                version_note: note.map(str::to_string),
                saved_by: self.config.saved_by.clone(),
            },
        }))
    }

    /// Apply a backend's answer to a save captured by [`prepare_save`](Self::prepare_save)
    pub fn finish_save(&mut self, plan: &SavePlan, response: SaveResponse) -> SaveOutcome {
        if plan.session != self.session {
            warn!(
                plan_session = plan.session,
                session = self.session,
                "discarding save result from a closed session"
            );
            return SaveOutcome::Discarded;
        }
        let Some(page) = self.page.as_mut() else {
            return SaveOutcome::Discarded;
        };

        let (saved_at, version_created) = match response {
            SaveResponse::Created(created) => {
                page.id = created.id;
                page.current_version = created.current_version;
                page.versions = created.versions;
                let saved_at = created.updated_at.unwrap_or_else(Utc::now);
                page.updated_at = Some(saved_at);
                (saved_at, plan.creates_version())
            }
            SaveResponse::Updated(ack) => {
                let version_created = ack.version.is_some();
                if let Some(current_version) = ack.current_version {
                    page.current_version = current_version;
                }
                if let Some(version) = ack.version {
                    page.versions.push(version);
                }
                page.updated_at = Some(ack.saved_at);
                (ack.saved_at, version_created)
            }
        };

        let current_version = page.current_version;
        self.last_saved = Some(saved_at);

        let still_dirty = plan.revision != self.revision;
        if !still_dirty {
            self.dirty = false;
        }

        info!(
            slug = %plan.slug,
            current_version,
            version_created,
            still_dirty,
            "saved page"
        );

        SaveOutcome::Saved {
            saved_at,
            current_version,
            version_created,
            still_dirty,
        }
    }

    /// Persist sections, settings and SEO; optionally append a version
    pub async fn save(&mut self, create_version: bool, note: Option<&str>) -> EditorResult<SaveOutcome> {
        let Some(plan) = self.prepare_save(create_version, note)? else {
            return Ok(SaveOutcome::Unchanged);
        };

        let backend = Arc::clone(&self.backend);
        let response = plan.execute(backend.as_ref()).await?;
        Ok(self.finish_save(&plan, response))
    }

    /// Flip a persisted page to published
    pub async fn publish(&mut self) -> EditorResult<PublishAck> {
        let page_id = self.persisted_id("publish")?;

        let backend = Arc::clone(&self.backend);
        let ack = backend.publish_page(&page_id).await?;

        if let Some(page) = self.page.as_mut() {
            page.status = PageStatus::Published;
            page.published_at = Some(ack.published_at);
            info!(slug = %page.slug, "published page");
        }
        Ok(ack)
    }

    /// Ask the backend for a tokenized draft preview URL. State is untouched.
    pub async fn generate_preview_link(&self) -> EditorResult<PreviewLink> {
        let page_id = self.persisted_id("preview")?;
        let link = self.backend.generate_preview_link(&page_id).await?;
        info!(url = %link.url, "issued preview link");
        Ok(link)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn open_page(&self) -> EditorResult<&PageDocument> {
        self.page.as_ref().ok_or(EditorError::NoDocument)
    }

    fn persisted_id(&self, action: &str) -> EditorResult<PageId> {
        let page = self.open_page()?;
        page.id.clone().ok_or_else(|| {
            EditorError::Conflict(format!("page must be saved before you can {}", action))
        })
    }

    fn sections_mut(&mut self) -> EditorResult<&mut Vec<Section>> {
        self.page
            .as_mut()
            .map(|p| &mut p.sections)
            .ok_or(EditorError::NoDocument)
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

fn noop(reason: NoopReason) -> StructuralOutcome {
    StructuralOutcome::Noop { reason }
}

fn find_section<'a>(page: &'a mut PageDocument, id: &SectionId) -> Option<&'a mut Section> {
    page.sections.iter_mut().find(|s| &s.id == id)
}

fn apply_edit(page: &mut PageDocument, edit: LocalEdit) -> LocalOutcome {
    let applied = |schema_valid: bool| LocalOutcome::Applied { schema_valid };
    let missing = |id: SectionId| LocalOutcome::Noop {
        reason: NoopReason::SectionNotFound(id),
    };

    match edit {
        LocalEdit::UpdateContent {
            section_id,
            path,
            value,
        } => {
            let Some(section) = find_section(page, &section_id) else {
                return missing(section_id);
            };
            match section.content.set_path(&section.section_type, &path, value) {
                Ok(schema_valid) => {
                    debug!(section = %section_id, path = %path, "updated content");
                    applied(schema_valid)
                }
                Err(e) => LocalOutcome::Noop {
                    reason: NoopReason::InvalidPath(e.to_string()),
                },
            }
        }
        LocalEdit::UpdateStyles { section_id, styles } => {
            let Some(section) = find_section(page, &section_id) else {
                return missing(section_id);
            };
            section.styles.merge(styles);
            applied(true)
        }
        LocalEdit::UpdateSection { section_id, patch } => {
            let Some(section) = find_section(page, &section_id) else {
                return missing(section_id);
            };
            section.apply_patch(patch);
            applied(section.content.validate(&section.section_type).is_ok())
        }
        LocalEdit::ToggleVisibility { section_id } => {
            let Some(section) = find_section(page, &section_id) else {
                return missing(section_id);
            };
            section.visible = !section.visible;
            applied(true)
        }
        LocalEdit::UpdateSettings { settings } => {
            page.settings.merge(settings);
            applied(true)
        }
        LocalEdit::UpdateSeo { seo } => {
            page.seo.merge(seo);
            applied(true)
        }
    }
}

//! # Sync Controller
//!
//! Moves the open page between the [`DocumentStore`] and the backend.
//!
//! ## Saves
//!
//! One save runs at a time. The store lock is only held while a save is
//! captured and while its answer is applied, never across the backend call,
//! so editing continues while a save is in flight.
//!
//! ```text
//! manual save ──► wait for gate ──► prepare ──► backend ──► finish
//! autosave    ──► gate busy? ──yes──► set pending, return
//!                        └─no──► prepare ──► backend ──► finish
//! after any save: pending && dirty ──► one follow-up save
//! ```
//!
//! ## Publish
//!
//! Always preceded by a versioned save noted with
//! [`EditorConfig::pre_publish_note`]. A failed save aborts the publish.

use crate::backend::{PageBackend, PreviewLink, PublishAck};
use crate::config::EditorConfig;
use crate::document::{DocumentStore, SaveOutcome};
use crate::errors::{EditorError, EditorResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// What an autosave tick did
#[derive(Debug)]
pub enum AutosaveTick {
    /// No open page, or nothing to save
    Idle,
    /// A save or another operation was running; a follow-up save was requested
    Busy,
    Saved(SaveOutcome),
    /// Logged and swallowed; the next tick retries
    Failed(EditorError),
}

pub struct SyncController {
    store: Arc<Mutex<DocumentStore>>,
    backend: Arc<dyn PageBackend>,
    config: EditorConfig,

    /// Held for the whole duration of a save
    gate: Mutex<()>,
    /// An autosave was skipped while a save was in flight
    pending: AtomicBool,
    autosave: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SyncController {
    pub fn new(store: Arc<Mutex<DocumentStore>>, backend: Arc<dyn PageBackend>, config: EditorConfig) -> Self {
        Self {
            store,
            backend,
            config,
            gate: Mutex::new(()),
            pending: AtomicBool::new(false),
            autosave: std::sync::Mutex::new(None),
        }
    }

    /// Wrap a store, reusing its backend and config
    pub fn for_store(store: DocumentStore) -> Self {
        let backend = store.backend();
        let config = store.config().clone();
        Self::new(Arc::new(Mutex::new(store)), backend, config)
    }

    pub fn store(&self) -> &Arc<Mutex<DocumentStore>> {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_pending_retry(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // Saving
    // ---------------------------------------------------------------------

    /// User-invoked save. Waits for any in-flight save, then reports the outcome.
    pub async fn save_now(&self, create_version: bool, note: Option<&str>) -> EditorResult<SaveOutcome> {
        let _gate = self.gate.lock().await;

        let result = self.save_locked(create_version, note).await;
        match &result {
            Ok(outcome) => info!(?outcome, create_version, "manual save finished"),
            Err(e) => error!(error = %e, "manual save failed"),
        }

        self.run_pending().await;
        result
    }

    /// One autosave attempt. Never surfaces an error to the caller's UI.
    pub async fn autosave_tick(&self) -> AutosaveTick {
        let Ok(_gate) = self.gate.try_lock() else {
            self.pending.store(true, Ordering::Release);
            debug!("save in flight, autosave deferred");
            return AutosaveTick::Busy;
        };

        {
            let Ok(store) = self.store.try_lock() else {
                self.pending.store(true, Ordering::Release);
                debug!("store busy, autosave deferred");
                return AutosaveTick::Busy;
            };
            if store.page().is_none() || !store.is_dirty() {
                return AutosaveTick::Idle;
            }
        }

        let tick = match self.save_locked(false, None).await {
            Ok(outcome) => {
                debug!(?outcome, "autosaved");
                AutosaveTick::Saved(outcome)
            }
            Err(e) => {
                warn!(error = %e, "autosave failed, retrying on next tick");
                AutosaveTick::Failed(e)
            }
        };

        self.run_pending().await;
        tick
    }

    /// Caller holds the gate
    async fn save_locked(&self, create_version: bool, note: Option<&str>) -> EditorResult<SaveOutcome> {
        let plan = self.store.lock().await.prepare_save(create_version, note)?;
        let Some(plan) = plan else {
            return Ok(SaveOutcome::Unchanged);
        };

        let response = plan.execute(self.backend.as_ref()).await?;
        Ok(self.store.lock().await.finish_save(&plan, response))
    }

    /// Caller holds the gate
    async fn run_pending(&self) {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return;
        }

        let dirty = {
            let store = self.store.lock().await;
            store.page().is_some() && store.is_dirty()
        };
        if !dirty {
            return;
        }

        match self.save_locked(false, None).await {
            Ok(outcome) => debug!(?outcome, "follow-up save finished"),
            Err(e) => warn!(error = %e, "follow-up save failed"),
        }
    }

    // ---------------------------------------------------------------------
    // Publish / preview
    // ---------------------------------------------------------------------

    /// Save a version, then flip the page to published
    pub async fn publish(&self) -> EditorResult<PublishAck> {
        let _gate = self.gate.lock().await;

        let note = self.config.pre_publish_note.clone();
        let outcome = match self.save_locked(true, Some(&note)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "pre-publish save failed, not publishing");
                return Err(e);
            }
        };
        if outcome == SaveOutcome::Discarded {
            return Err(EditorError::Conflict(
                "page was closed before it could be published".to_string(),
            ));
        }

        let result = self.store.lock().await.publish().await;
        if let Err(e) = &result {
            error!(error = %e, "publish failed");
        }
        result
    }

    pub async fn generate_preview_link(&self) -> EditorResult<PreviewLink> {
        self.store.lock().await.generate_preview_link().await
    }

    // ---------------------------------------------------------------------
    // Autosave timer
    // ---------------------------------------------------------------------

    /// Start ticking every `autosaveIntervalSecs`. Returns false when
    /// autosave is disabled or already running.
    pub fn start_autosave(self: &Arc<Self>) -> bool {
        if !self.config.autosave_enabled {
            return false;
        }

        let mut slot = self
            .autosave
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if slot.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            return false;
        }

        let period = self.config.autosave_interval();
        let controller: Weak<Self> = Arc::downgrade(self);

        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.autosave_tick().await;
            }
        }));

        debug!(period_secs = period.as_secs(), "autosave started");
        true
    }

    pub fn stop_autosave(&self) {
        let handle = self
            .autosave
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("autosave stopped");
        }
    }

    pub fn is_autosaving(&self) -> bool {
        self.autosave
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the timer and discard the open page. In-flight saves still
    /// complete; their results are dropped.
    pub async fn close(&self) {
        self.stop_autosave();
        self.pending.store(false, Ordering::Release);
        self.store.lock().await.close();
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.stop_autosave();
    }
}

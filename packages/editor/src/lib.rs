//! # Pagebuilder Editor
//!
//! Document editing engine for the visual page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ shell / CLI: shortcuts, navigation guard    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ DocumentStore: one open page                │
//! │  - Structural ops (backend-confirmed)       │
//! │  - Local edits (immediate, dirty flag)      │
//! │  - Snapshot undo/redo                       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ SyncController: save, autosave, publish     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ PageBackend: storage, versions, publish     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Backend owns ids**: sections are created and deleted by the backend
//!    before they change locally
//! 2. **Edits never fail locally**: field edits apply immediately; problems
//!    surface at save time
//! 3. **Order is the index**: every structural change resequences `order`
//! 4. **One save at a time**: overlapping saves are serialized per page
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagebuilder_editor::{DocumentStore, EditorConfig, MemoryBackend, SyncController};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let mut store = DocumentStore::new(backend, EditorConfig::default());
//! store.load("home").await?;
//!
//! store.add_section(SectionType::Hero, None, Some(0)).await?;
//! store.update_section_content(&id, "headline.text", json!("Welcome"));
//!
//! let sync = Arc::new(SyncController::for_store(store));
//! sync.start_autosave();
//! sync.publish().await?;
//! ```

pub mod backend;
mod config;
mod document;
mod errors;
mod history;
mod mutations;
pub mod render;
pub mod shell;
mod sync;

pub use backend::{
    validate_sections, BackendOp, FileBackend, MemoryBackend, NewPage, NewSection, PageBackend,
    PageUpdate, PreviewLink, PublishAck, UpdateAck,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::{DocumentStore, SaveOutcome, SavePlan, SaveResponse};
pub use errors::{BackendError, EditorError, EditorResult};
pub use history::{HistoryEntry, HistoryManager};
pub use mutations::{
    LocalEdit, LocalOutcome, MoveDirection, NoopReason, StructuralOp, StructuralOutcome,
};
pub use sync::{AutosaveTick, SyncController};

pub use pagebuilder_model as model;

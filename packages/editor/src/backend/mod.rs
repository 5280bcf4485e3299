//! # Backend Collaborator
//!
//! The backend owns durable storage, versioning and publish state. The
//! editor only talks to it through [`PageBackend`].
//!
//! Two implementations ship with the crate:
//! - [`MemoryBackend`]: in-process, with failure injection and call
//!   counters for tests
//! - [`FileBackend`]: one JSON file per page, used by the CLI

mod file;
mod memory;
mod pages;

pub use file::FileBackend;
pub use memory::{BackendOp, MemoryBackend};

use crate::errors::BackendError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagebuilder_model::{
    Animation, PageDocument, PageId, PageSettings, ResponsiveVisibility, Section, SectionContent,
    SectionId, SectionStyles, SectionType, Seo, VersionSnapshot,
};
use serde::{Deserialize, Serialize};

pub type BackendResult<T> = Result<T, BackendError>;

/// Page that has never been persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub slug: String,
    pub name: String,
    pub sections: Vec<Section>,
    pub settings: PageSettings,
    pub seo: Seo,
    /// Record the initial content as version 1
    pub create_version: bool,
    pub version_note: Option<String>,
    pub saved_by: Option<String>,
}

/// Full-document save payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    pub sections: Vec<Section>,
    pub settings: PageSettings,
    pub seo: Seo,
    pub create_version: bool,
    pub version_note: Option<String>,
    pub saved_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub saved_at: DateTime<Utc>,
    /// Set when the save appended a version
    pub current_version: Option<u32>,
    pub version: Option<VersionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishAck {
    pub published_at: DateTime<Utc>,
}

/// Tokenized URL exposing draft content without authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLink {
    pub url: String,
    pub token: String,
}

/// Request to create a section; the backend assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub section_type: SectionType,
    pub content: Option<SectionContent>,
    pub position: usize,
    pub styles: SectionStyles,
    pub animation: Option<Animation>,
    pub responsive: ResponsiveVisibility,
    pub visible: bool,
}

impl NewSection {
    /// Visible section with default styles; `None` content means the kind's default
    pub fn new(section_type: SectionType, content: Option<SectionContent>, position: usize) -> Self {
        Self {
            section_type,
            content,
            position,
            styles: SectionStyles::default(),
            animation: None,
            responsive: ResponsiveVisibility::default(),
            visible: true,
        }
    }

    /// Everything but id and order copied from `source`
    pub fn copy_of(source: &Section, position: usize) -> Self {
        Self {
            section_type: source.section_type.clone(),
            content: Some(source.content.clone()),
            position,
            styles: source.styles.clone(),
            animation: source.animation.clone(),
            responsive: source.responsive,
            visible: source.visible,
        }
    }
}

/// Operations the editor needs from a backend
#[async_trait]
pub trait PageBackend: Send + Sync {
    async fn fetch_page(&self, slug: &str) -> BackendResult<PageDocument>;

    async fn create_page(&self, page: NewPage) -> BackendResult<PageDocument>;

    async fn update_page(&self, id: &PageId, update: PageUpdate) -> BackendResult<UpdateAck>;

    async fn publish_page(&self, id: &PageId) -> BackendResult<PublishAck>;

    async fn generate_preview_link(&self, id: &PageId) -> BackendResult<PreviewLink>;

    async fn create_section(&self, page_id: &PageId, request: NewSection) -> BackendResult<Section>;

    async fn delete_section(&self, page_id: &PageId, section_id: &SectionId) -> BackendResult<()>;
}

/// Reject section lists a backend must not persist
pub fn validate_sections(sections: &[Section]) -> BackendResult<()> {
    let mut seen = std::collections::HashSet::new();

    for section in sections {
        if section.id.as_str().is_empty() {
            return Err(BackendError::Validation("section id is empty".to_string()));
        }
        if !seen.insert(&section.id) {
            return Err(BackendError::Validation(format!(
                "duplicate section id {}",
                section.id
            )));
        }
        section
            .content
            .validate(&section.section_type)
            .map_err(|e| BackendError::Validation(format!("section {}: {}", section.id, e)))?;
    }

    Ok(())
}

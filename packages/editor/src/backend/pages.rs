//! Server-side page semantics shared by the bundled backends.

use super::{validate_sections, BackendResult, NewPage, NewSection, PageUpdate, PublishAck, UpdateAck};
use crate::errors::BackendError;
use chrono::Utc;
use pagebuilder_model::{
    resequence, PageDocument, PageId, PageStatus, Section, SectionContent, SectionId, VersionSnapshot,
};

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn validate_slug(slug: &str) -> BackendResult<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(BackendError::Validation(format!("invalid slug `{}`", slug)))
    }
}

pub(crate) fn create_page(page: NewPage) -> BackendResult<PageDocument> {
    validate_slug(&page.slug)?;

    let mut document = PageDocument::draft(page.slug, page.name);
    document.id = Some(PageId::new(new_id()));

    apply_update(
        &mut document,
        PageUpdate {
            sections: page.sections,
            settings: page.settings,
            seo: page.seo,
            create_version: page.create_version,
            version_note: page.version_note,
            saved_by: page.saved_by,
        },
    )?;
    Ok(document)
}

pub(crate) fn apply_update(page: &mut PageDocument, update: PageUpdate) -> BackendResult<UpdateAck> {
    validate_sections(&update.sections)?;

    let saved_at = Utc::now();
    let mut sections = update.sections;
    resequence(&mut sections);

    page.sections = sections;
    page.settings = update.settings;
    page.seo = update.seo;
    page.updated_at = Some(saved_at);

    if !update.create_version {
        return Ok(UpdateAck {
            saved_at,
            current_version: None,
            version: None,
        });
    }

    page.current_version += 1;
    let version = VersionSnapshot {
        version_number: page.current_version,
        saved_at,
        saved_by: update.saved_by,
        note: update.version_note,
        sections: page.sections.clone(),
    };
    page.versions.push(version.clone());

    Ok(UpdateAck {
        saved_at,
        current_version: Some(page.current_version),
        version: Some(version),
    })
}

pub(crate) fn publish(page: &mut PageDocument) -> PublishAck {
    let published_at = Utc::now();
    page.status = PageStatus::Published;
    page.published_at = Some(published_at);
    PublishAck { published_at }
}

pub(crate) fn insert_section(page: &mut PageDocument, request: NewSection) -> BackendResult<Section> {
    let content = request
        .content
        .unwrap_or_else(|| SectionContent::default_for(&request.section_type));
    content
        .validate(&request.section_type)
        .map_err(|e| BackendError::Validation(e.to_string()))?;

    let position = request.position.min(page.sections.len());
    let mut section = Section::new(new_id(), request.section_type, content);
    section.order = position;
    section.styles = request.styles;
    section.animation = request.animation;
    section.responsive = request.responsive;
    section.visible = request.visible;

    page.sections.insert(position, section.clone());
    resequence(&mut page.sections);
    page.updated_at = Some(Utc::now());

    Ok(section)
}

pub(crate) fn remove_section(page: &mut PageDocument, section_id: &SectionId) -> BackendResult<()> {
    let index = page
        .sections
        .iter()
        .position(|s| &s.id == section_id)
        .ok_or_else(|| BackendError::NotFound(format!("section {}", section_id)))?;

    page.sections.remove(index);
    resequence(&mut page.sections);
    page.updated_at = Some(Utc::now());
    Ok(())
}

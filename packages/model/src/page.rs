use crate::section::{overwrite, Section};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Backend-assigned page identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication state
///
/// `Scheduled` is accepted from the backend but never produced by the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageStatus::Draft => "draft",
            PageStatus::Scheduled => "scheduled",
            PageStatus::Published => "published",
        };
        f.write_str(name)
    }
}

/// Page-wide presentation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// `full-width` or `boxed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_footer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageSettings {
    /// Shallow merge: fields set in `patch` win
    pub fn merge(&mut self, patch: PageSettings) {
        overwrite(&mut self.theme, patch.theme);
        overwrite(&mut self.layout, patch.layout);
        overwrite(&mut self.show_header, patch.show_header);
        overwrite(&mut self.show_footer, patch.show_footer);
        overwrite(&mut self.custom_css, patch.custom_css);
        self.extra.extend(patch.extra);
    }
}

/// Search-engine metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_index: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Seo {
    pub fn merge(&mut self, patch: Seo) {
        overwrite(&mut self.title, patch.title);
        overwrite(&mut self.description, patch.description);
        overwrite(&mut self.keywords, patch.keywords);
        overwrite(&mut self.og_image, patch.og_image);
        overwrite(&mut self.canonical_url, patch.canonical_url);
        overwrite(&mut self.no_index, patch.no_index);
        self.extra.extend(patch.extra);
    }
}

/// Durable historical copy of a page's sections. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub version_number: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub sections: Vec<Section>,
}

/// One page as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    /// `None` until the backend has persisted the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PageId>,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub settings: PageSettings,
    #[serde(default)]
    pub seo: Seo,
    #[serde(default)]
    pub current_version: u32,
    #[serde(default)]
    pub versions: Vec<VersionSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageDocument {
    /// New, unpersisted draft
    pub fn draft(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            slug: slug.into(),
            name: name.into(),
            status: PageStatus::Draft,
            sections: Vec::new(),
            settings: PageSettings::default(),
            seo: Seo::default(),
            current_version: 0,
            versions: Vec::new(),
            published_at: None,
            updated_at: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn version(&self, version_number: u32) -> Option<&VersionSnapshot> {
        self.versions
            .iter()
            .find(|v| v.version_number == version_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_wire_format() {
        let json = json!({
            "id": "p1",
            "slug": "home",
            "name": "Home",
            "status": "published",
            "sections": [
                { "id": "a1", "type": "text", "order": 0, "content": {} }
            ],
            "seo": { "title": "Welcome", "noIndex": false },
            "currentVersion": 2
        });

        let page: PageDocument = serde_json::from_value(json).unwrap();
        assert_eq!(page.id, Some(PageId::new("p1")));
        assert_eq!(page.status, PageStatus::Published);
        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.seo.no_index, Some(false));
        assert_eq!(page.current_version, 2);
        assert!(page.versions.is_empty());
    }

    #[test]
    fn test_draft_is_unpersisted() {
        let page = PageDocument::draft("about", "About us");
        assert!(!page.is_persisted());
        assert_eq!(page.status, PageStatus::Draft);
        assert_eq!(page.current_version, 0);
    }

    #[test]
    fn test_settings_merge() {
        let mut settings = PageSettings {
            theme: Some("light".into()),
            show_header: Some(true),
            ..Default::default()
        };
        settings.merge(PageSettings {
            show_header: Some(false),
            ..Default::default()
        });
        assert_eq!(settings.theme.as_deref(), Some("light"));
        assert_eq!(settings.show_header, Some(false));
    }
}

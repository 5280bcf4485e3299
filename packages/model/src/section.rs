use crate::content::SectionContent;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Backend-assigned section identifier, stable for the document's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of content block
///
/// Unknown kinds are kept as `Other` so documents written by newer editors
/// survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionType {
    Hero,
    Text,
    Image,
    Gallery,
    Testimonial,
    Cta,
    Statistics,
    Form,
    CardGrid,
    Other(String),
}

impl SectionType {
    /// All kinds with a defined content schema
    pub fn known() -> [SectionType; 9] {
        [
            SectionType::Hero,
            SectionType::Text,
            SectionType::Image,
            SectionType::Gallery,
            SectionType::Testimonial,
            SectionType::Cta,
            SectionType::Statistics,
            SectionType::Form,
            SectionType::CardGrid,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            SectionType::Hero => "hero",
            SectionType::Text => "text",
            SectionType::Image => "image",
            SectionType::Gallery => "gallery",
            SectionType::Testimonial => "testimonial",
            SectionType::Cta => "cta",
            SectionType::Statistics => "statistics",
            SectionType::Form => "form",
            SectionType::CardGrid => "cardGrid",
            SectionType::Other(name) => name,
        }
    }

    pub fn parse(name: &str) -> Self {
        match name {
            "hero" => SectionType::Hero,
            "text" => SectionType::Text,
            "image" => SectionType::Image,
            "gallery" => SectionType::Gallery,
            "testimonial" => SectionType::Testimonial,
            "cta" => SectionType::Cta,
            "statistics" => SectionType::Statistics,
            "form" => SectionType::Form,
            "cardGrid" => SectionType::CardGrid,
            other => SectionType::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SectionType::Other(_))
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for SectionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SectionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Spacing, color and layout for one section
///
/// Every field is optional so the same type doubles as a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_width: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SectionStyles {
    /// Shallow merge: every field set in `patch` replaces the current value
    pub fn merge(&mut self, patch: SectionStyles) {
        overwrite(&mut self.padding_top, patch.padding_top);
        overwrite(&mut self.padding_bottom, patch.padding_bottom);
        overwrite(&mut self.margin_top, patch.margin_top);
        overwrite(&mut self.margin_bottom, patch.margin_bottom);
        overwrite(&mut self.background_color, patch.background_color);
        overwrite(&mut self.text_color, patch.text_color);
        overwrite(&mut self.background_image, patch.background_image);
        overwrite(&mut self.max_width, patch.max_width);
        overwrite(&mut self.alignment, patch.alignment);
        overwrite(&mut self.full_width, patch.full_width);
        self.extra.extend(patch.extra);
    }
}

pub(crate) fn overwrite<T>(current: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *current = patch;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    #[default]
    None,
    Fade,
    SlideUp,
    SlideLeft,
    Zoom,
}

/// Entrance animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(rename = "type", default)]
    pub kind: AnimationKind,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
    #[serde(default)]
    pub delay_ms: u32,
}

fn default_duration_ms() -> u32 {
    600
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            kind: AnimationKind::None,
            duration_ms: default_duration_ms(),
            delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Desktop,
    Tablet,
    Mobile,
}

/// Per-device visibility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiveVisibility {
    #[serde(default = "default_true")]
    pub desktop: bool,
    #[serde(default = "default_true")]
    pub tablet: bool,
    #[serde(default = "default_true")]
    pub mobile: bool,
}

impl ResponsiveVisibility {
    pub fn is_visible_on(&self, device: Device) -> bool {
        match device {
            Device::Desktop => self.desktop,
            Device::Tablet => self.tablet,
            Device::Mobile => self.mobile,
        }
    }
}

impl Default for ResponsiveVisibility {
    fn default() -> Self {
        Self {
            desktop: true,
            tablet: true,
            mobile: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One content block in a page's ordered section list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SectionRecord", into = "SectionRecord")]
pub struct Section {
    pub id: SectionId,
    pub section_type: SectionType,
    /// Position in the page; always equal to the array index after a mutation
    pub order: usize,
    pub content: SectionContent,
    pub styles: SectionStyles,
    pub animation: Option<Animation>,
    pub responsive: ResponsiveVisibility,
    pub visible: bool,
}

impl Section {
    /// New visible section with default styles
    pub fn new(id: impl Into<SectionId>, section_type: SectionType, content: SectionContent) -> Self {
        Self {
            id: id.into(),
            section_type,
            order: 0,
            content,
            styles: SectionStyles::default(),
            animation: None,
            responsive: ResponsiveVisibility::default(),
            visible: true,
        }
    }

    /// Shallow merge of top-level fields. Id and order are never patched.
    pub fn apply_patch(&mut self, patch: SectionPatch) {
        let reparse = patch.section_type.is_some() || patch.content.is_some();

        overwrite_value(&mut self.section_type, patch.section_type);
        overwrite_value(&mut self.content, patch.content);
        overwrite_value(&mut self.styles, patch.styles);
        overwrite_value(&mut self.animation, patch.animation);
        overwrite_value(&mut self.responsive, patch.responsive);
        overwrite_value(&mut self.visible, patch.visible);

        if reparse {
            self.content = SectionContent::from_value(&self.section_type, self.content.to_value());
        }
    }
}

fn overwrite_value<T>(current: &mut T, patch: Option<T>) {
    if let Some(value) = patch {
        *current = value;
    }
}

/// Partial update of a section's top-level fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionPatch {
    pub section_type: Option<SectionType>,
    pub content: Option<SectionContent>,
    pub styles: Option<SectionStyles>,
    /// `Some(None)` clears the animation
    pub animation: Option<Option<Animation>>,
    pub responsive: Option<ResponsiveVisibility>,
    pub visible: Option<bool>,
}

/// Wire shape of a section; content is parsed against `type` after the fact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionRecord {
    id: SectionId,
    #[serde(rename = "type")]
    section_type: SectionType,
    #[serde(default)]
    order: usize,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    styles: SectionStyles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    animation: Option<Animation>,
    #[serde(default)]
    responsive: ResponsiveVisibility,
    #[serde(default = "default_true")]
    visible: bool,
}

impl From<SectionRecord> for Section {
    fn from(record: SectionRecord) -> Self {
        let content = SectionContent::from_value(&record.section_type, record.content);
        Self {
            id: record.id,
            section_type: record.section_type,
            order: record.order,
            content,
            styles: record.styles,
            animation: record.animation,
            responsive: record.responsive,
            visible: record.visible,
        }
    }
}

impl From<Section> for SectionRecord {
    fn from(section: Section) -> Self {
        Self {
            content: section.content.to_value(),
            id: section.id,
            section_type: section.section_type,
            order: section.order,
            styles: section.styles,
            animation: section.animation,
            responsive: section.responsive,
            visible: section.visible,
        }
    }
}

/// Rewrite `order` to match array positions. Returns true if anything changed.
pub fn resequence(sections: &mut [Section]) -> bool {
    let mut changed = false;
    for (index, section) in sections.iter_mut().enumerate() {
        if section.order != index {
            section.order = index;
            changed = true;
        }
    }
    changed
}

/// Check that `order` values are exactly `0..n`
pub fn is_contiguous(sections: &[Section]) -> bool {
    sections
        .iter()
        .enumerate()
        .all(|(index, section)| section.order == index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{HeroContent, TextBlock};
    use serde_json::json;

    #[test]
    fn test_section_type_names() {
        for kind in SectionType::known() {
            assert_eq!(SectionType::parse(kind.as_str()), kind);
        }
        assert_eq!(
            SectionType::parse("pricingTable"),
            SectionType::Other("pricingTable".to_string())
        );
        assert!(!SectionType::parse("pricingTable").is_known());
    }

    #[test]
    fn test_section_wire_format() {
        let json = json!({
            "id": "s1",
            "type": "hero",
            "order": 0,
            "content": { "headline": { "text": "Hi" } },
            "styles": { "backgroundColor": "#fff" },
            "visible": true
        });

        let section: Section = serde_json::from_value(json).unwrap();
        assert_eq!(section.id, SectionId::from("s1"));
        assert_eq!(section.section_type, SectionType::Hero);
        assert_eq!(section.styles.background_color.as_deref(), Some("#fff"));
        assert!(section.responsive.mobile);

        match &section.content {
            SectionContent::Hero(hero) => {
                assert_eq!(hero.headline.as_ref().unwrap().text.as_deref(), Some("Hi"));
            }
            other => panic!("expected hero content, got {:?}", other),
        }

        let back = serde_json::to_value(&section).unwrap();
        assert_eq!(back["type"], json!("hero"));
        assert_eq!(back["content"]["headline"]["text"], json!("Hi"));
    }

    #[test]
    fn test_style_merge_is_shallow() {
        let mut styles = SectionStyles {
            padding_top: Some("16px".into()),
            text_color: Some("#000".into()),
            ..Default::default()
        };

        styles.merge(SectionStyles {
            text_color: Some("#333".into()),
            alignment: Some(Alignment::Center),
            ..Default::default()
        });

        assert_eq!(styles.padding_top.as_deref(), Some("16px"));
        assert_eq!(styles.text_color.as_deref(), Some("#333"));
        assert_eq!(styles.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_patch_keeps_id_and_reparses_content() {
        let mut section = Section::new(
            "s1",
            SectionType::Hero,
            SectionContent::Hero(HeroContent {
                headline: Some(TextBlock::new("Hello")),
                ..Default::default()
            }),
        );
        section.order = 3;

        section.apply_patch(SectionPatch {
            section_type: Some(SectionType::Cta),
            visible: Some(false),
            ..Default::default()
        });

        assert_eq!(section.id.as_str(), "s1");
        assert_eq!(section.order, 3);
        assert!(!section.visible);
        assert!(matches!(section.content, SectionContent::Cta(_)));
    }

    #[test]
    fn test_resequence() {
        let mut sections = vec![
            Section::new("a", SectionType::Text, SectionContent::default()),
            Section::new("b", SectionType::Text, SectionContent::default()),
        ];
        sections[0].order = 4;
        sections[1].order = 4;

        assert!(!is_contiguous(&sections));
        assert!(resequence(&mut sections));
        assert!(is_contiguous(&sections));
        assert!(!resequence(&mut sections));
    }
}

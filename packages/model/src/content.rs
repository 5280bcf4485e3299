//! # Section Content
//!
//! One typed schema per section kind, plus a `Raw` variant.
//!
//! `Raw` holds content for kinds without a schema, and content of a known
//! kind that no longer fits its schema (for example after a path edit wrote
//! a number where a string belongs). Such content is kept as-is so editing
//! never fails; [`SectionContent::validate`] reports the problem and the
//! backend rejects it at save time.
//!
//! Keys a schema does not know about are kept in each struct's `extra` map,
//! so a load/edit/save cycle never drops data.

use crate::error::{ContentError, PathError};
use crate::path::ContentPath;
use crate::section::SectionType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Styled line of text (headline, heading, subheadline)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Heading level, e.g. `h1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Button or link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Visual variant, e.g. `primary`, `outline`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CallToAction {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            href: Some(href.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImageAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_button: Option<CallToAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_button: Option<CallToAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageAsset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightbox: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<ImageAsset>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Testimonial>>,
    /// `carousel` or `grid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<CallToAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    /// Display value, e.g. `"10k+"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<Statistic>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Input kind, e.g. `text`, `email`, `select`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FormField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<CallToAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardGridContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content of one section, typed by section kind
#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Hero(HeroContent),
    Text(TextContent),
    Image(ImageContent),
    Gallery(GalleryContent),
    Testimonial(TestimonialContent),
    Cta(CtaContent),
    Statistics(StatisticsContent),
    Form(FormContent),
    CardGrid(CardGridContent),
    /// Unknown kind, or content that does not fit its kind's schema
    Raw(Map<String, Value>),
}

impl Default for SectionContent {
    fn default() -> Self {
        SectionContent::Raw(Map::new())
    }
}

impl SectionContent {
    /// Parse content for `kind`, falling back to `Raw` when it does not fit
    pub fn from_value(kind: &SectionType, value: Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        match Self::parse_typed(kind, map.clone()) {
            Ok(Some(content)) => content,
            Ok(None) | Err(_) => SectionContent::Raw(map),
        }
    }

    fn parse_typed(kind: &SectionType, map: Map<String, Value>) -> Result<Option<Self>, serde_json::Error> {
        let value = Value::Object(map);
        let content = match kind {
            SectionType::Hero => SectionContent::Hero(parse(value)?),
            SectionType::Text => SectionContent::Text(parse(value)?),
            SectionType::Image => SectionContent::Image(parse(value)?),
            SectionType::Gallery => SectionContent::Gallery(parse(value)?),
            SectionType::Testimonial => SectionContent::Testimonial(parse(value)?),
            SectionType::Cta => SectionContent::Cta(parse(value)?),
            SectionType::Statistics => SectionContent::Statistics(parse(value)?),
            SectionType::Form => SectionContent::Form(parse(value)?),
            SectionType::CardGrid => SectionContent::CardGrid(parse(value)?),
            SectionType::Other(_) => return Ok(None),
        };
        Ok(Some(content))
    }

    /// Starter content for a freshly added section
    pub fn default_for(kind: &SectionType) -> Self {
        match kind {
            SectionType::Hero => SectionContent::Hero(HeroContent {
                headline: Some(TextBlock {
                    text: Some("Your headline here".to_string()),
                    tag: Some("h1".to_string()),
                    ..Default::default()
                }),
                subheadline: Some(TextBlock::new("A short supporting sentence")),
                primary_button: Some(CallToAction::new("Get started", "#")),
                ..Default::default()
            }),
            SectionType::Text => SectionContent::Text(TextContent {
                heading: Some(TextBlock::new("Section heading")),
                body: Some("Start writing here.".to_string()),
                ..Default::default()
            }),
            SectionType::Image => SectionContent::Image(ImageContent::default()),
            SectionType::Gallery => SectionContent::Gallery(GalleryContent {
                images: Some(Vec::new()),
                columns: Some(3),
                ..Default::default()
            }),
            SectionType::Testimonial => SectionContent::Testimonial(TestimonialContent {
                items: Some(vec![Testimonial {
                    quote: Some("This changed how we work.".to_string()),
                    author: Some("Happy customer".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            SectionType::Cta => SectionContent::Cta(CtaContent {
                headline: Some(TextBlock::new("Ready to begin?")),
                button: Some(CallToAction::new("Contact us", "#contact")),
                ..Default::default()
            }),
            SectionType::Statistics => SectionContent::Statistics(StatisticsContent {
                stats: Some(Vec::new()),
                ..Default::default()
            }),
            SectionType::Form => SectionContent::Form(FormContent {
                fields: Some(vec![FormField {
                    name: Some("email".to_string()),
                    label: Some("Email".to_string()),
                    field_type: Some("email".to_string()),
                    required: Some(true),
                    ..Default::default()
                }]),
                submit_label: Some("Submit".to_string()),
                ..Default::default()
            }),
            SectionType::CardGrid => SectionContent::CardGrid(CardGridContent {
                columns: Some(3),
                cards: Some(Vec::new()),
                ..Default::default()
            }),
            SectionType::Other(_) => SectionContent::Raw(Map::new()),
        }
    }

    /// Content as a JSON object
    pub fn to_map(&self) -> Map<String, Value> {
        let value = match self {
            SectionContent::Hero(c) => serde_json::to_value(c),
            SectionContent::Text(c) => serde_json::to_value(c),
            SectionContent::Image(c) => serde_json::to_value(c),
            SectionContent::Gallery(c) => serde_json::to_value(c),
            SectionContent::Testimonial(c) => serde_json::to_value(c),
            SectionContent::Cta(c) => serde_json::to_value(c),
            SectionContent::Statistics(c) => serde_json::to_value(c),
            SectionContent::Form(c) => serde_json::to_value(c),
            SectionContent::CardGrid(c) => serde_json::to_value(c),
            SectionContent::Raw(map) => return map.clone(),
        };

        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, SectionContent::Raw(_))
    }

    /// Check the content against the schema of `kind`
    pub fn validate(&self, kind: &SectionType) -> Result<(), ContentError> {
        match self {
            SectionContent::Raw(map) if kind.is_known() => match Self::parse_typed(kind, map.clone()) {
                Ok(_) => Ok(()),
                Err(e) => Err(ContentError {
                    kind: kind.to_string(),
                    message: e.to_string(),
                }),
            },
            _ => Ok(()),
        }
    }

    /// Read a value by dot path
    pub fn get_path(&self, path: &str) -> Result<Option<Value>, PathError> {
        let path = ContentPath::parse(path)?;
        Ok(path.get(&self.to_value()).cloned())
    }

    /// Replace the value at a dot path and re-derive typed content.
    ///
    /// Writing `null` to an optional typed field clears it: the key is gone
    /// from the serialized content. Unknown keys and `Raw` content keep the
    /// explicit `null`.
    ///
    /// Returns whether the content still fits the schema of `kind`.
    pub fn set_path(&mut self, kind: &SectionType, path: &str, value: Value) -> Result<bool, PathError> {
        let path = ContentPath::parse(path)?;
        let mut root = self.to_value();
        path.set(&mut root, value)?;

        *self = Self::from_value(kind, root);
        Ok(self.validate(kind).is_ok())
    }
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value)
}

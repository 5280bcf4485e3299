//! # Render Collaborator
//!
//! Turning a section into visual output is not the editor's job; a
//! presentation layer registers one [`SectionRenderer`] per section kind.
//! Kinds without a renderer get the registry's placeholder, so an unknown
//! kind shows up as "unsupported" instead of breaking the page.
//!
//! The plain-text outline renderers at the bottom are what the CLI prints.

use pagebuilder_model::{Device, Section, SectionContent, SectionId, SectionStyles, SectionType};
use serde_json::Value;
use std::collections::HashMap;

/// Everything a renderer gets for one section
pub struct RenderContext<'a> {
    pub section: &'a Section,
    pub content: &'a SectionContent,
    pub styles: &'a SectionStyles,
    pub is_editing: bool,
    /// Report an edit at a content dot path
    pub on_content_change: &'a dyn Fn(&str, Value),
    /// Report a partial style change
    pub on_style_change: &'a dyn Fn(SectionStyles),
}

pub trait SectionRenderer<O>: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> O;
}

impl<O, F> SectionRenderer<O> for F
where
    F: Fn(&RenderContext<'_>) -> O + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> O {
        self(ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub is_editing: bool,
    pub device: Device,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            is_editing: true,
            device: Device::Desktop,
        }
    }
}

/// Renderers keyed by section kind
pub struct RendererRegistry<O> {
    renderers: HashMap<SectionType, Box<dyn SectionRenderer<O>>>,
    placeholder: Box<dyn SectionRenderer<O>>,
}

impl<O> RendererRegistry<O> {
    pub fn new(placeholder: impl SectionRenderer<O> + 'static) -> Self {
        Self {
            renderers: HashMap::new(),
            placeholder: Box::new(placeholder),
        }
    }

    /// Register a renderer, replacing any previous one for `kind`
    pub fn register(&mut self, kind: SectionType, renderer: impl SectionRenderer<O> + 'static) {
        self.renderers.insert(kind, Box::new(renderer));
    }

    pub fn supports(&self, kind: &SectionType) -> bool {
        self.renderers.contains_key(kind)
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> O {
        match self.renderers.get(&ctx.section.section_type) {
            Some(renderer) => renderer.render(ctx),
            None => self.placeholder.render(ctx),
        }
    }

    /// Render sections in order. Outside edit mode, hidden sections and
    /// sections hidden on `options.device` are skipped.
    pub fn render_sections(
        &self,
        sections: &[Section],
        options: RenderOptions,
        on_content_change: &dyn Fn(&SectionId, &str, Value),
        on_style_change: &dyn Fn(&SectionId, SectionStyles),
    ) -> Vec<O> {
        sections
            .iter()
            .filter(|s| {
                options.is_editing || (s.visible && s.responsive.is_visible_on(options.device))
            })
            .map(|section| {
                let content_change = |path: &str, value: Value| {
                    on_content_change(&section.id, path, value)
                };
                let style_change = |styles: SectionStyles| on_style_change(&section.id, styles);

                self.render(&RenderContext {
                    section,
                    content: &section.content,
                    styles: &section.styles,
                    is_editing: options.is_editing,
                    on_content_change: &content_change,
                    on_style_change: &style_change,
                })
            })
            .collect()
    }
}

// -------------------------------------------------------------------------
// Plain-text outline
// -------------------------------------------------------------------------

/// Placeholder line for kinds nobody registered
pub fn unsupported_placeholder(ctx: &RenderContext<'_>) -> String {
    format!(
        "[unsupported section: {}] {}",
        ctx.section.section_type, ctx.section.id
    )
}

/// One-line summary of a section
pub fn outline(ctx: &RenderContext<'_>) -> String {
    let section = ctx.section;
    let mut line = format!("{:>2}. {:<12} {}", section.order, section.section_type, section.id);

    if let Some(summary) = summarize(ctx.content) {
        line.push_str("  ");
        line.push_str(&summary);
    }
    if !section.visible {
        line.push_str("  (hidden)");
    }
    if ctx.content.is_raw() && section.section_type.is_known() {
        line.push_str("  (invalid content)");
    }
    line
}

/// Registry rendering every known kind with [`outline`]
pub fn outline_registry() -> RendererRegistry<String> {
    let mut registry = RendererRegistry::new(unsupported_placeholder);
    for kind in SectionType::known() {
        registry.register(kind, outline);
    }
    registry
}

fn quoted(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX - 1).collect();
        format!("\"{}…\"", cut)
    } else {
        format!("\"{}\"", text)
    }
}

fn count(n: Option<usize>, noun: &str) -> String {
    let n = n.unwrap_or(0);
    format!("{} {}{}", n, noun, if n == 1 { "" } else { "s" })
}

fn summarize(content: &SectionContent) -> Option<String> {
    match content {
        SectionContent::Hero(hero) => hero
            .headline
            .as_ref()
            .and_then(|h| h.text.as_deref())
            .map(quoted),
        SectionContent::Text(text) => text
            .heading
            .as_ref()
            .and_then(|h| h.text.as_deref())
            .or(text.body.as_deref())
            .map(quoted),
        SectionContent::Image(image) => image
            .image
            .as_ref()
            .and_then(|i| i.alt.as_deref().or(i.src.as_deref()))
            .map(quoted),
        SectionContent::Gallery(gallery) => {
            Some(count(gallery.images.as_ref().map(Vec::len), "image"))
        }
        SectionContent::Testimonial(testimonials) => {
            Some(count(testimonials.items.as_ref().map(Vec::len), "testimonial"))
        }
        SectionContent::Cta(cta) => cta
            .headline
            .as_ref()
            .and_then(|h| h.text.as_deref())
            .map(quoted),
        SectionContent::Statistics(stats) => Some(count(stats.stats.as_ref().map(Vec::len), "stat")),
        SectionContent::Form(form) => Some(count(form.fields.as_ref().map(Vec::len), "field")),
        SectionContent::CardGrid(grid) => Some(count(grid.cards.as_ref().map(Vec::len), "card")),
        SectionContent::Raw(map) if map.is_empty() => None,
        SectionContent::Raw(map) => Some(format!("{} keys", map.len())),
    }
}

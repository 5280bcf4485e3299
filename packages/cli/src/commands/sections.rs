use super::{report_local, report_save, report_structural, resolve_section, Session};
use anyhow::{Context, Result};
use clap::Args;
use pagebuilder_model::{SectionContent, SectionType};
use pagebuilder_editor::MoveDirection;

#[derive(Debug, Args)]
pub struct AddArgs {
    pub slug: String,

    /// Section type (hero, text, image, gallery, testimonial, cta,
    /// statistics, form, cardGrid)
    #[arg(value_name = "TYPE")]
    pub section_type: String,

    /// Zero-based position; appends when omitted
    #[arg(long)]
    pub at: Option<usize>,

    /// Initial content as JSON; the type's starter content when omitted
    #[arg(long)]
    pub content: Option<String>,
}

pub async fn add(args: AddArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let section_type = SectionType::parse(&args.section_type);

    let content = match &args.content {
        Some(json) => {
            let value = serde_json::from_str(json).context("--content is not valid JSON")?;
            Some(SectionContent::from_value(&section_type, value))
        }
        None => None,
    };

    let outcome = session
        .store()
        .await
        .add_section(section_type, content, args.at)
        .await?;

    if report_structural(&outcome, "Added section") {
        report_save(&session.commit().await?);
    }
    Ok(())
}

/// Commands that only need a page and a section
#[derive(Debug, Args)]
pub struct SectionArgs {
    pub slug: String,

    /// Section id, or zero-based position
    pub section: String,
}

pub async fn delete(args: SectionArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let mut store = session.store().await;
    let id = resolve_section(&store, &args.section);

    let outcome = store.delete_section(&id).await?;
    drop(store);

    if report_structural(&outcome, "Deleted section") {
        report_save(&session.commit().await?);
    }
    Ok(())
}

pub async fn duplicate(args: SectionArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let mut store = session.store().await;
    let id = resolve_section(&store, &args.section);

    let outcome = store.duplicate_section(&id).await?;
    drop(store);

    if report_structural(&outcome, "Duplicated into") {
        report_save(&session.commit().await?);
    }
    Ok(())
}

pub async fn toggle(args: SectionArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let mut store = session.store().await;
    let id = resolve_section(&store, &args.section);

    let outcome = store.toggle_section_visibility(&id);
    let visible = store.section(&id).map(|s| s.visible);
    drop(store);

    let done = match visible {
        Some(true) => "Section is now visible",
        _ => "Section is now hidden",
    };
    if report_local(&outcome, done) {
        report_save(&session.commit().await?);
    }
    Ok(())
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub slug: String,

    /// Section id, or zero-based position
    pub section: String,

    /// up or down
    pub direction: MoveDirection,
}

pub async fn move_section(args: MoveArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let mut store = session.store().await;
    let id = resolve_section(&store, &args.section);

    let outcome = store.move_section(&id, args.direction)?;
    drop(store);

    if report_structural(&outcome, "Moved section") {
        report_save(&session.commit().await?);
    }
    Ok(())
}

#[derive(Debug, Args)]
pub struct ReorderArgs {
    pub slug: String,

    /// Current zero-based position
    pub from: usize,

    /// New zero-based position (clamped to the last one)
    pub to: usize,
}

pub async fn reorder(args: ReorderArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let outcome = session.store().await.reorder_sections(args.from, args.to)?;

    if report_structural(&outcome, "Reordered section") {
        report_save(&session.commit().await?);
    }
    Ok(())
}

use super::{report_save, Session};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use pagebuilder_editor::render::{outline_registry, RenderOptions};
use pagebuilder_model::{Device, PageDocument};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Page slug (letters, digits, `-` and `_`)
    pub slug: String,

    /// Display name; defaults to the slug
    #[arg(short, long)]
    pub name: Option<String>,
}

pub async fn new(args: NewArgs, cwd: &str) -> Result<()> {
    let session = Session::start(cwd)?;
    let name = args.name.unwrap_or_else(|| args.slug.clone());

    println!("{}", format!("📝 Creating page {}...", args.slug).bright_blue().bold());

    session.store().await.begin_draft(&args.slug, name);
    let outcome = session.commit().await?;
    report_save(&outcome);

    if let Some(id) = session.store().await.page().and_then(|p| p.id.clone()) {
        println!("  {} id {}", "✓".green(), id.as_str().bright_white());
    }
    Ok(())
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub slug: String,

    /// Print the stored page as JSON
    #[arg(long)]
    pub json: bool,

    /// Show what visitors see: hidden sections are left out
    #[arg(long)]
    pub preview: bool,

    /// Device for --preview (desktop, tablet, mobile)
    #[arg(short, long, default_value = "desktop")]
    pub device: String,
}

pub async fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let store = session.store().await;
    let Some(page) = store.page() else {
        bail!("page {} is not open", args.slug);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    let options = RenderOptions {
        is_editing: !args.preview,
        device: parse_device(&args.device)?,
    };

    print_header(page);
    let lines = outline_registry().render_sections(
        &page.sections,
        options,
        &|_, _, _| {},
        &|_, _| {},
    );
    if lines.is_empty() {
        println!("  {}", "(no sections)".dimmed());
    }
    for line in lines {
        println!("  {}", line);
    }
    Ok(())
}

fn parse_device(name: &str) -> Result<Device> {
    match name {
        "desktop" => Ok(Device::Desktop),
        "tablet" => Ok(Device::Tablet),
        "mobile" => Ok(Device::Mobile),
        other => bail!("Invalid device: {}. Use: desktop, tablet, or mobile", other),
    }
}

fn print_header(page: &PageDocument) {
    println!(
        "{} {} [{}] version {}",
        page.name.bright_white().bold(),
        format!("/{}", page.slug).dimmed(),
        page.status,
        page.current_version
    );
    if let Some(title) = &page.seo.title {
        println!("  {} {}", "title:".dimmed(), title);
    }
    if let Some(published_at) = page.published_at {
        println!("  {} {}", "published:".dimmed(), published_at.to_rfc3339());
    }
    println!();
}

#[derive(Debug, Args)]
pub struct VersionsArgs {
    pub slug: String,
}

pub async fn versions(args: VersionsArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let store = session.store().await;
    let Some(page) = store.page() else {
        bail!("page {} is not open", args.slug);
    };

    if page.versions.is_empty() {
        println!("{}", "No saved versions".dimmed());
        return Ok(());
    }

    for version in page.versions.iter().rev() {
        let marker = if version.version_number == page.current_version {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} v{:<3} {}  {:>2} sections  {}{}",
            marker,
            version.version_number,
            version.saved_at.format("%Y-%m-%d %H:%M"),
            version.sections.len(),
            version.note.as_deref().unwrap_or(""),
            version
                .saved_by
                .as_deref()
                .map(|by| format!(" ({})", by))
                .unwrap_or_default()
                .dimmed()
        );
    }
    Ok(())
}

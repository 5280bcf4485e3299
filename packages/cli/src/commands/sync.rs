use super::{report_save, report_structural, Session};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Commands that only need a page
#[derive(Debug, Args)]
pub struct PageArgs {
    pub slug: String,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    pub slug: String,

    /// Record a version of the current sections
    #[arg(short = 'c', long)]
    pub create_version: bool,

    /// Version note (implies --create-version)
    #[arg(short, long)]
    pub note: Option<String>,
}

pub async fn save(args: SaveArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let create_version = args.create_version || args.note.is_some();

    let outcome = session
        .sync()
        .save_now(create_version, args.note.as_deref())
        .await?;
    report_save(&outcome);
    Ok(())
}

pub async fn publish(args: PageArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;

    println!("{}", format!("🚀 Publishing {}...", args.slug).bright_blue().bold());
    let ack = session.sync().publish().await?;

    let version = session.store().await.current_version().unwrap_or(0);
    println!("  {} Saved version {}", "✓".green(), version);
    println!(
        "  {} Published at {}",
        "✓".green(),
        ack.published_at.to_rfc3339().bright_white()
    );
    Ok(())
}

pub async fn preview(args: PageArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let link = session.sync().generate_preview_link().await?;

    println!("{}", link.url.bright_white());
    Ok(())
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    pub slug: String,

    /// Version number to bring back
    #[arg(value_name = "VERSION")]
    pub number: u32,
}

pub async fn restore(args: RestoreArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let outcome = session.store().await.restore_version(args.number)?;

    if report_structural(&outcome, &format!("Restored version {}", args.number)) {
        report_save(&session.commit().await?);
    }
    Ok(())
}

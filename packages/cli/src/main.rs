mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    AddArgs, MoveArgs, NewArgs, PageArgs, ReorderArgs, RestoreArgs, SaveArgs, SectionArgs,
    SetArgs, ShowArgs, StyleArgs, VersionsArgs,
};

/// Pagebuilder CLI - edit pages section by section
#[derive(Parser, Debug)]
#[command(name = "pagebuilder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new page
    New(NewArgs),

    /// Print a page outline
    Show(ShowArgs),

    /// Add a section
    Add(AddArgs),

    /// Delete a section
    Delete(SectionArgs),

    /// Copy a section right below itself
    Duplicate(SectionArgs),

    /// Move a section one step up or down
    Move(MoveArgs),

    /// Move a section to another position
    Reorder(ReorderArgs),

    /// Show or hide a section
    Toggle(SectionArgs),

    /// Set a content value by dot path
    Set(SetArgs),

    /// Merge styles into a section
    Style(StyleArgs),

    /// Save the page, optionally as a new version
    Save(SaveArgs),

    /// Save a version and publish the page
    Publish(PageArgs),

    /// Issue a preview link for the current draft
    Preview(PageArgs),

    /// List saved versions
    Versions(VersionsArgs),

    /// Bring back the sections of a saved version
    Restore(RestoreArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, cwd: &str) -> anyhow::Result<()> {
    match command {
        Command::New(args) => commands::new(args, cwd).await,
        Command::Show(args) => commands::show(args, cwd).await,
        Command::Add(args) => commands::add(args, cwd).await,
        Command::Delete(args) => commands::delete(args, cwd).await,
        Command::Duplicate(args) => commands::duplicate(args, cwd).await,
        Command::Move(args) => commands::move_section(args, cwd).await,
        Command::Reorder(args) => commands::reorder(args, cwd).await,
        Command::Toggle(args) => commands::toggle(args, cwd).await,
        Command::Set(args) => commands::set(args, cwd).await,
        Command::Style(args) => commands::style(args, cwd).await,
        Command::Save(args) => commands::save(args, cwd).await,
        Command::Publish(args) => commands::publish(args, cwd).await,
        Command::Preview(args) => commands::preview(args, cwd).await,
        Command::Versions(args) => commands::versions(args, cwd).await,
        Command::Restore(args) => commands::restore(args, cwd).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(cwd) => run(cli.command, &cwd.display().to_string()).await,
        Err(e) => Err(anyhow::anyhow!("Cannot get current directory: {}", e)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

pub mod edit;
pub mod page;
pub mod sections;
pub mod sync;

pub use edit::{set, style, SetArgs, StyleArgs};
pub use page::{new, show, versions, NewArgs, ShowArgs, VersionsArgs};
pub use sections::{
    add, delete, duplicate, move_section, reorder, toggle, AddArgs, MoveArgs, ReorderArgs,
    SectionArgs,
};
pub use sync::{preview, publish, restore, save, PageArgs, RestoreArgs, SaveArgs};

use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use pagebuilder_editor::{
    DocumentStore, FileBackend, LocalOutcome, SaveOutcome, StructuralOutcome, SyncController,
};
use pagebuilder_model::SectionId;
use std::sync::Arc;
use tokio::sync::MutexGuard;
use tracing::debug;

/// One editing session over the file backend
pub struct Session {
    sync: SyncController,
}

impl Session {
    /// Session with no page open
    pub fn start(cwd: &str) -> Result<Self> {
        let config = Config::load(cwd)?;
        let pages_dir = config.get_pages_dir(cwd);
        debug!(pages_dir = %pages_dir.display(), "starting session");
        let backend = Arc::new(FileBackend::new(pages_dir));
        let store = DocumentStore::new(backend, config.editor);

        Ok(Self {
            sync: SyncController::for_store(store),
        })
    }

    /// Session with `slug` loaded
    pub async fn open(cwd: &str, slug: &str) -> Result<Self> {
        let session = Self::start(cwd)?;
        session.store().await.load(slug).await?;
        Ok(session)
    }

    pub async fn store(&self) -> MutexGuard<'_, DocumentStore> {
        self.sync.store().lock().await
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    /// Persist whatever the command changed
    pub async fn commit(&self) -> Result<SaveOutcome> {
        let outcome = self.sync.save_now(false, None).await?;
        debug!(?outcome, "committed command");
        Ok(outcome)
    }
}

/// Accept a section id, or a zero-based position when no id matches
pub fn resolve_section(store: &DocumentStore, arg: &str) -> SectionId {
    let id = SectionId::from(arg);
    if store.section(&id).is_some() {
        return id;
    }

    arg.parse::<usize>()
        .ok()
        .and_then(|index| store.sections().get(index))
        .map(|section| section.id.clone())
        .unwrap_or(id)
}

pub fn report_structural(outcome: &StructuralOutcome, done: &str) -> bool {
    match outcome {
        StructuralOutcome::Applied { section_id, .. } => {
            match section_id {
                Some(id) => println!("  {} {} {}", "✓".green(), done, id.as_str().bright_white()),
                None => println!("  {} {}", "✓".green(), done),
            }
            true
        }
        StructuralOutcome::Noop { reason } => {
            println!("  {} Nothing to do: {}", "⚠️".yellow(), reason);
            false
        }
    }
}

pub fn report_local(outcome: &LocalOutcome, done: &str) -> bool {
    match outcome {
        LocalOutcome::Applied { schema_valid: true } => {
            println!("  {} {}", "✓".green(), done);
            true
        }
        LocalOutcome::Applied { schema_valid: false } => {
            println!(
                "  {} {} (content no longer matches its section type; fix it before saving)",
                "⚠️".yellow(),
                done
            );
            true
        }
        LocalOutcome::Noop { reason } => {
            println!("  {} Nothing to do: {}", "⚠️".yellow(), reason);
            false
        }
    }
}

pub fn report_save(outcome: &SaveOutcome) {
    match outcome {
        SaveOutcome::Unchanged => println!("  {} No changes to save", "·".dimmed()),
        SaveOutcome::Saved {
            current_version,
            version_created: true,
            ..
        } => println!("  {} Saved version {}", "✓".green(), current_version),
        SaveOutcome::Saved { .. } => println!("  {} Saved", "✓".green()),
        SaveOutcome::Discarded => println!("  {} Save result discarded", "⚠️".yellow()),
    }
}

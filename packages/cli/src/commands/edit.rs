use super::{report_local, report_save, resolve_section, Session};
use anyhow::{Context, Result};
use clap::Args;
use pagebuilder_model::SectionStyles;
use serde_json::Value;

#[derive(Debug, Args)]
pub struct SetArgs {
    pub slug: String,

    /// Section id, or zero-based position
    pub section: String,

    /// Dot path inside the section content, e.g. `headline.text`
    pub path: String,

    /// JSON value; anything that is not valid JSON is stored as a string
    pub value: String,
}

pub async fn set(args: SetArgs, cwd: &str) -> Result<()> {
    let session = Session::open(cwd, &args.slug).await?;
    let mut store = session.store().await;
    let id = resolve_section(&store, &args.section);

    let outcome = store.update_section_content(&id, &args.path, parse_value(&args.value));
    drop(store);

    if report_local(&outcome, &format!("Set {}", args.path)) {
        report_save(&session.commit().await?);
    }
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[derive(Debug, Args)]
pub struct StyleArgs {
    pub slug: String,

    /// Section id, or zero-based position
    pub section: String,

    /// Partial styles as JSON, e.g. `{"backgroundColor": "#111"}`
    pub styles: String,
}

pub async fn style(args: StyleArgs, cwd: &str) -> Result<()> {
    let styles: SectionStyles =
        serde_json::from_str(&args.styles).context("styles must be a JSON object")?;

    let session = Session::open(cwd, &args.slug).await?;
    let mut store = session.store().await;
    let id = resolve_section(&store, &args.section);

    let outcome = store.update_section_styles(&id, styles);
    drop(store);

    if report_local(&outcome, "Updated styles") {
        report_save(&session.commit().await?);
    }
    Ok(())
}

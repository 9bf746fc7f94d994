use std::path::Path;

use anyhow::Result;
use log::info;

use crate::collectors::BatchReport;
use crate::commands::{collect_into, remove_sources, CommandContext};
use crate::config::load_config;
use crate::error::CollectError;

/// `cres collect <source> <key> [--move]`: collect into `REPOSITORY.path/<key>`
pub async fn run(
    ctx: &CommandContext,
    source: &Path,
    key: &str,
    move_sources: bool,
) -> Result<BatchReport> {
    if key.trim().is_empty() {
        return Err(CollectError::Argument("key must be specified".to_string()).into());
    }

    let config = load_config(ctx.config.as_deref())?;
    let destination = config.repository_path()?.join(key);

    let report = collect_into(ctx, source, &destination).await?;
    if move_sources {
        let removed = remove_sources(&report.succeeded).await;
        info!("Removed {} collected source(s)", removed);
    }
    Ok(report)
}

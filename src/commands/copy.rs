use std::path::Path;

use anyhow::Result;

use crate::collectors::BatchReport;
use crate::commands::{collect_into, CommandContext};

/// `cres copy <source> <destination>`
pub async fn run(ctx: &CommandContext, source: &Path, destination: &Path) -> Result<BatchReport> {
    collect_into(ctx, source, destination).await
}

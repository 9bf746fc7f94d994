use std::path::Path;

use anyhow::Result;
use log::info;

use crate::collectors::BatchReport;
use crate::commands::{collect_into, remove_sources, CommandContext};

/// `cres move <source> <destination>`: copy, then delete the documents that made it.
///
/// Referenced assets stay where they are since other documents may share them.
pub async fn run(ctx: &CommandContext, source: &Path, destination: &Path) -> Result<BatchReport> {
    let report = collect_into(ctx, source, destination).await?;
    let removed = remove_sources(&report.succeeded).await;
    info!("Moved {} of {} file(s)", removed, report.summary.total);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileType;
    use crate::test_utils::write_document;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_removes_only_collected_document() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(&dir.path().join("src"), "doc.md", 1).unwrap();
        let dest = dir.path().join("out/doc.md");
        let ctx = CommandContext {
            types: [FileType::Markdown].into_iter().collect(),
            ..Default::default()
        };

        let report = run(&ctx, &doc, &dest).await.unwrap();
        assert_eq!(report.succeeded, vec![doc.clone()]);
        assert!(!doc.exists());
        assert!(dest.exists());
        assert!(dir.path().join("src/images/image_0.png").exists());
    }

    #[tokio::test]
    async fn test_move_keeps_failed_document() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(dir.path(), "doc.md", 1).unwrap();
        std::fs::remove_file(dir.path().join("images/image_0.png")).unwrap();
        let ctx = CommandContext {
            types: [FileType::Markdown].into_iter().collect(),
            ..Default::default()
        };

        let report = run(&ctx, &doc, &dir.path().join("out/doc.md")).await.unwrap();
        assert_eq!(report.summary.failed, 1);
        assert!(doc.exists());
    }
}

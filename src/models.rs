use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use serde::{Serialize, Deserialize};

use crate::constants::MARKDOWN_EXTENSIONS;

/// Kind of a collectable file.
///
/// `Standalone` files are leaves: they never reference anything. `Markdown`
/// documents are composites whose image references become dependencies.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// A file with no dependencies (images, archives, ...)
    #[value(alias = "leaf")]
    Standalone,
    /// A Markdown document
    #[value(alias = "md")]
    Markdown,
}

impl FileType {
    /// Guess the file type from a path or URL extension
    pub fn from_path(path: &Path) -> Self {
        let is_markdown = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                MARKDOWN_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);

        if is_markdown {
            FileType::Markdown
        } else {
            FileType::Standalone
        }
    }

    /// Whether files of this type may embed references to other files
    pub fn is_composite(&self) -> bool {
        matches!(self, FileType::Markdown)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Standalone => write!(f, "standalone"),
            FileType::Markdown => write!(f, "markdown"),
        }
    }
}

/// What a finished collection did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// Destination was already up to date, nothing written
    Skipped,
    /// The file was committed after its dependencies
    Collected { dependencies: usize },
}

/// Aggregated counts for a batch run
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, ok: bool) {
        self.total += 1;
        if ok {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished! Total: {}, success: {}, failed: {}",
            self.total, self.success, self.failed
        )
    }
}

//! Test utilities for cres
//!
//! Fixture builders shared by the unit tests.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Creates a temporary file with the given content
pub fn create_temp_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    use std::io::Write;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Writes `dir/name`, a Markdown document referencing `images` pictures.
///
/// The pictures are created as `images/image_<i>.png` next to the document
/// and referenced relatively, one per paragraph.
pub fn write_document(dir: &Path, name: &str, images: usize) -> Result<PathBuf> {
    let doc = dir.join(name);
    let doc_dir = doc.parent().unwrap_or(dir).to_path_buf();
    fs::create_dir_all(doc_dir.join("images"))?;

    let mut content = String::from("# Fixture\n\n");
    for i in 0..images {
        let image = format!("images/image_{}.png", i);
        fs::write(doc_dir.join(&image), format!("png-{}", i))?;
        content.push_str(&format!("Paragraph {}.\n\n![figure {}]({})\n\n", i, i, image));
    }

    fs::write(&doc, content)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_temp_file() {
        let file = create_temp_file(b"test content").unwrap();
        assert_eq!(fs::read(file.path()).unwrap(), b"test content");
    }

    #[test]
    fn test_write_document() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(dir.path(), "notes/doc.md", 2).unwrap();

        let content = fs::read_to_string(&doc).unwrap();
        assert!(content.contains("![figure 0](images/image_0.png)"));
        assert!(content.contains("![figure 1](images/image_1.png)"));
        assert!(dir.path().join("notes/images/image_1.png").exists());
    }
}

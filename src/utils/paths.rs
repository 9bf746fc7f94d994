use std::env;
use std::path::{Component, Path, PathBuf};

use crate::constants::{COMPANION_SUFFIX, REMOTE_SCHEMES};

/// Check whether a URI points at a network source
pub fn is_remote_uri(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Make a path absolute and drop `.` and `..` components without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve a reference found inside a document to an absolute location.
///
/// Network references are kept verbatim. Relative references are resolved
/// against the document's own directory (or URL directory).
pub fn resolve_reference(document_uri: &str, reference: &str) -> String {
    if is_remote_uri(reference) {
        return reference.to_string();
    }

    if is_remote_uri(document_uri) {
        let scheme_end = document_uri.find("://").map(|i| i + 3).unwrap_or(0);
        if reference.starts_with('/') {
            // Host-relative reference
            let host_end = document_uri[scheme_end..]
                .find('/')
                .map(|i| scheme_end + i)
                .unwrap_or(document_uri.len());
            return format!("{}{}", &document_uri[..host_end], reference);
        }
        // Only slashes after the host separate directories
        let dir_end = document_uri[scheme_end..]
            .rfind('/')
            .map(|i| scheme_end + i)
            .unwrap_or(document_uri.len());
        return format!("{}/{}", &document_uri[..dir_end], reference);
    }

    let reference_path = Path::new(reference);
    if reference_path.is_absolute() {
        return normalize_path(reference_path).to_string_lossy().to_string();
    }

    let document_dir = Path::new(document_uri)
        .parent()
        .unwrap_or_else(|| Path::new(""));
    normalize_path(&document_dir.join(reference_path))
        .to_string_lossy()
        .to_string()
}

/// Final name segment of a reference, path or URL (query and fragment dropped for URLs)
pub fn reference_basename(reference: &str) -> String {
    let trimmed = if is_remote_uri(reference) {
        reference
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or(reference)
    } else {
        reference
    };

    trimmed
        .trim_end_matches(|c: char| c == '/' || c == '\\')
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed)
        .to_string()
}

/// Normalize a relative path into an object key (forward slashes, no leading slash)
pub fn to_object_key(key: &str) -> String {
    key.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Companion-assets key for a document key: `dir/name.md` becomes `dir/name_medias`
pub fn companion_key(object_key: &str) -> String {
    let key = to_object_key(object_key);
    let (dir, file) = match key.rfind('/') {
        Some(idx) => (&key[..idx], &key[idx + 1..]),
        None => ("", key.as_str()),
    };

    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if dir.is_empty() {
        format!("{}{}", stem, COMPANION_SUFFIX)
    } else {
        format!("{}/{}{}", dir, stem, COMPANION_SUFFIX)
    }
}

/// Name of the companion-assets directory as seen from the document itself
pub fn companion_dir_name(object_key: &str) -> String {
    reference_basename(&companion_key(object_key))
}

/// Object key a dependency lands on, next to its parent document
pub fn dependency_key(parent_key: &str, dependency_uri: &str) -> String {
    format!(
        "{}/{}",
        companion_key(parent_key),
        reference_basename(dependency_uri)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_remote_uri() {
        assert!(is_remote_uri("http://example.com/a.png"));
        assert!(is_remote_uri("HTTPS://example.com/a.png"));
        assert!(!is_remote_uri("/tmp/a.png"));
        assert!(!is_remote_uri("ftp.png"));
    }

    #[test]
    fn test_normalize_path_removes_dots() {
        let path = normalize_path(Path::new("/docs/notes/../imgs/./a.png"));
        assert_eq!(path, PathBuf::from("/docs/imgs/a.png"));
    }

    #[test]
    fn test_normalize_relative_path_is_absolute() {
        let path = normalize_path(Path::new("some/file.md"));
        assert!(path.is_absolute());
        assert!(path.ends_with("some/file.md"));
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(
            resolve_reference("/docs/guide/readme.md", "../imgs/a.png"),
            "/docs/imgs/a.png"
        );
        assert_eq!(
            resolve_reference("/docs/readme.md", "/abs/b.png"),
            "/abs/b.png"
        );
        assert_eq!(
            resolve_reference("/docs/readme.md", "https://cdn.example.com/c.png"),
            "https://cdn.example.com/c.png"
        );
        assert_eq!(
            resolve_reference("https://example.com/posts/p.md", "img/d.png"),
            "https://example.com/posts/img/d.png"
        );
        assert_eq!(
            resolve_reference("https://example.com/posts/p.md", "/static/e.png"),
            "https://example.com/static/e.png"
        );
    }

    #[test]
    fn test_resolve_reference_against_bare_host() {
        assert_eq!(
            resolve_reference("https://example.com", "img.png"),
            "https://example.com/img.png"
        );
        assert_eq!(
            resolve_reference("https://example.com/", "img.png"),
            "https://example.com/img.png"
        );
        assert_eq!(
            resolve_reference("http://example.com", "/img.png"),
            "http://example.com/img.png"
        );
    }

    #[test]
    fn test_reference_basename() {
        assert_eq!(reference_basename("../imgs/a.png"), "a.png");
        assert_eq!(reference_basename("imgs\\b.png"), "b.png");
        assert_eq!(reference_basename("c.png"), "c.png");
        assert_eq!(reference_basename("https://cdn.example.com/x/d.png?v=2#top"), "d.png");
    }

    #[test]
    fn test_companion_key() {
        assert_eq!(companion_key("target.md"), "target_medias");
        assert_eq!(companion_key("notes/2024/target.md"), "notes/2024/target_medias");
        assert_eq!(companion_key("notes\\target.md"), "notes/target_medias");
        assert_eq!(companion_key("README"), "README_medias");
        assert_eq!(companion_dir_name("notes/target.md"), "target_medias");
    }

    #[test]
    fn test_dependency_key() {
        assert_eq!(
            dependency_key("notes/target.md", "/home/me/imgs/img1.png"),
            "notes/target_medias/img1.png"
        );
    }

    proptest! {
        #[test]
        fn prop_dependency_key_sits_under_companion(
            dir in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            stem in "[a-z0-9]{1,12}",
            asset in "[a-z0-9]{1,12}\\.png",
        ) {
            let key = format!("{}/{}.md", dir, stem);
            let companion = companion_key(&key);
            prop_assert_eq!(&companion, &format!("{}/{}{}", dir, stem, COMPANION_SUFFIX));

            let dep = dependency_key(&key, &format!("/src/{}", asset));
            let companion_prefix = format!("{}/", companion);
            prop_assert!(dep.starts_with(&companion_prefix));
            prop_assert!(dep.ends_with(&asset));
        }
    }
}

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use retitle_extract::Format;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists the eligible documents directly inside `folder`, sorted by path.
///
/// Subfolders are not descended into. Hidden files (including macOS `._`
/// resource forks) are ignored, as is anything whose extension isn't one of
/// the supported [`Format`]s.
pub fn discover(folder: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let folder = folder.as_ref();
    let entries = fs::read_dir(folder).or_raise(|| ErrorKind::Discovery(folder.to_path_buf()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.or_raise(|| ErrorKind::Discovery(folder.to_path_buf()))?.path();
        let hidden = path.file_name().and_then(|name| name.to_str()).is_none_or(|name| name.starts_with('.'));
        if hidden || Format::from_path(&path).is_none() {
            continue;
        }
        // Follows symlinks; broken links are skipped.
        if fs::metadata(&path).is_ok_and(|metadata| metadata.is_file()) {
            files.push(path);
        }
    }
    files.sort();
    tracing::debug!(folder = %folder.display(), count = files.len(), "Discovered documents");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Deref;

    #[test]
    fn test_discovers_eligible_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PDF", "a.epub", "c.mobi", "d.azw3", "notes.txt", ".hidden.pdf", "noext"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();
        fs::write(dir.path().join("nested.pdf").join("inner.pdf"), b"x").unwrap();

        let names: Vec<_> = discover(dir.path())
            .unwrap()
            .into_iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.epub", "b.PDF", "c.mobi", "d.azw3"]);
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let error = discover(&missing).unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::Discovery(path) if *path == missing));
    }
}

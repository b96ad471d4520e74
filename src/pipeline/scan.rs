//! Directory scanning: enumerate the PDF files of one directory.
//!
//! The scan is deliberately non-recursive — the tool's contract is "stitch
//! this folder", and descending into subdirectories would silently pull in
//! documents the user never pointed at. Matching is case-insensitive on the
//! extension (`.pdf` and `.PDF` both count; case-sensitive filesystems make
//! both spellings common in the wild).
//!
//! The returned list is deduplicated and sorted lexicographically by path.
//! That ordering is load-bearing: it fixes each document's tile slot in the
//! composite, independent of directory-entry order and extraction timing.

use crate::error::StitchError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// List the PDF files of `dir`, deduplicated and sorted by path.
///
/// # Errors
/// * [`StitchError::DirectoryNotFound`] — `dir` does not exist or is a file.
/// * [`StitchError::NoMatchingFiles`] — no entry matches `*.pdf` / `*.PDF`.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, StitchError> {
    if !dir.is_dir() {
        return Err(StitchError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|_| StitchError::DirectoryNotFound {
        path: dir.to_path_buf(),
    })?;

    // BTreeSet gives dedup + lexicographic order in one structure.
    let mut files = BTreeSet::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && is_pdf(&path) {
            files.insert(path);
        }
    }

    if files.is_empty() {
        return Err(StitchError::NoMatchingFiles {
            path: dir.to_path_buf(),
        });
    }

    debug!("Scan found {} PDF files in {}", files.len(), dir.display());
    Ok(files.into_iter().collect())
}

/// Case-insensitive extension check.
fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"%PDF-1.4 stub").unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = scan_directory(Path::new("/definitely/not/a/real/dir"));
        assert!(matches!(
            result,
            Err(StitchError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.pdf");
        let result = scan_directory(&tmp.path().join("a.pdf"));
        assert!(matches!(
            result,
            Err(StitchError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn directory_without_pdfs_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "image.png");
        let result = scan_directory(tmp.path());
        assert!(matches!(result, Err(StitchError::NoMatchingFiles { .. })));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "lower.pdf");
        touch(tmp.path(), "UPPER.PDF");
        touch(tmp.path(), "Mixed.Pdf");
        touch(tmp.path(), "skipped.txt");

        let files = scan_directory(tmp.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn results_are_sorted_by_path() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "c.pdf");
        touch(tmp.path(), "a.pdf");
        touch(tmp.path(), "b.pdf");

        let files = scan_directory(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn subdirectories_are_not_recursed() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "top.pdf");
        let nested = tmp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        touch(&nested, "deep.pdf");

        let files = scan_directory(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.pdf"));
    }

    #[test]
    fn directory_named_like_a_pdf_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("folder.pdf")).unwrap();
        touch(tmp.path(), "real.pdf");

        let files = scan_directory(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.pdf"));
    }
}

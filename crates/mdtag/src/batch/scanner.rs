//! Document discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

use super::BatchError;

/// Finds documents under a working directory.
///
/// Entries are visited in name order within each directory, recursing into
/// subdirectories where they sort, so the same tree always yields the same
/// file order. Symlinked directories are not followed.
pub(crate) struct Scanner<'a> {
    root: &'a Path,
    extensions: &'a [String],
}

impl<'a> Scanner<'a> {
    /// Create a new Scanner.
    ///
    /// # Arguments
    ///
    /// * `root` - Root directory to scan
    /// * `extensions` - Document extensions without the leading dot
    pub fn new(root: &'a Path, extensions: &'a [String]) -> Self {
        Self { root, extensions }
    }

    /// Scan the tree and return the paths of all documents.
    ///
    /// Returns an empty Vec if the root directory doesn't exist.
    pub fn scan(&self) -> Result<Vec<PathBuf>, BatchError> {
        let mut files = Vec::new();
        if self.root.is_dir() {
            self.scan_directory(self.root, &mut files)?;
        } else {
            tracing::debug!(root = %self.root.display(), "Working directory not found");
        }
        Ok(files)
    }

    fn scan_directory(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), BatchError> {
        let mut entries = fs::read_dir(dir)
            .and_then(|read_dir| read_dir.collect::<Result<Vec<_>, _>>())
            .map_err(|e| BatchError::io(dir, e))?;
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| BatchError::io(&path, e))?;

            if file_type.is_dir() {
                self.scan_directory(&path, files)?;
            } else if (file_type.is_file() || path.is_file()) && self.is_document(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|known| known == e))
    }
}

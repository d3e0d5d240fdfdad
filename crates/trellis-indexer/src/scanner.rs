//! Corpus scanning
//!
//! Walks the corpus root, honoring ignore files and skipping hidden
//! entries (which also keeps the `.trellis` snapshot directory out of the
//! index), and derives the stable note id for every matching file.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use trellis_core::NoteId;

/// A note source located during a scan.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Corpus-relative path, `/`-separated.
    pub rel: String,
    pub id: NoteId,
}

pub struct Scanner {
    root: PathBuf,
    include: GlobSet,
}

impl Scanner {
    pub fn new(root: &Path, include_patterns: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in include_patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Scanner {
            root: root.to_path_buf(),
            include: builder.build()?,
        })
    }

    /// Locate every note source under the root. Unreadable directory
    /// entries are logged and skipped; they never abort the scan.
    pub fn scan(&self) -> Vec<ScannedFile> {
        let mut files = Vec::new();
        for entry in WalkBuilder::new(&self.root).follow_links(false).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(rel_path) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let rel = rel_path.to_string_lossy().replace('\\', "/");
            if !self.include.is_match(&rel) {
                continue;
            }
            files.push(ScannedFile {
                path: entry.path().to_path_buf(),
                id: NoteId::from_relative_path(&rel),
                rel,
            });
        }
        files.sort_by(|a, b| a.rel.cmp(&b.rel));
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_finds_matching_files_with_ids() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Top Level.md", "x");
        write(dir.path(), "sub/Nested Note.md", "x");
        write(dir.path(), "ignored.rs", "x");
        write(dir.path(), ".hidden/secret.md", "x");

        let scanner = Scanner::new(dir.path(), &["*.md".to_string()]).unwrap();
        let files = scanner.scan();
        let ids: Vec<_> = files.iter().map(|f| f.id.as_str().to_string()).collect();
        // Sorted by relative path ("Top Level.md" < "sub/...").
        assert_eq!(ids, ["top_level", "sub/nested_note"]);
    }

    #[test]
    fn multiple_patterns() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "x");
        write(dir.path(), "b.txt", "x");
        write(dir.path(), "c.png", "x");

        let scanner =
            Scanner::new(dir.path(), &["*.md".to_string(), "*.txt".to_string()]).unwrap();
        assert_eq!(scanner.scan().len(), 2);
    }
}

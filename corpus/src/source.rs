use crate::error::{Error, Result};
use crate::RawDocument;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Streams the plain-text files of a corpus directory, one document per file.
///
/// Only the top level is read and files come out sorted by name, so a corpus is
/// always ingested in the same order. Each file is read when the iterator reaches
/// it; a failed read surfaces as an `Err` item for that file alone.
pub struct DirectorySource {
    root: PathBuf,
    paths: std::vec::IntoIter<PathBuf>,
}

impl DirectorySource {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = list_documents(&root)?;
        tracing::info!(root = %root.display(), files = paths.len(), "opened corpus directory");
        Ok(Self { root, paths: paths.into_iter() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remaining paths, without reading them.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths.collect()
    }
}

impl Iterator for DirectorySource {
    type Item = Result<RawDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        self.paths.next().map(|p| read_document(&p))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

/// Sorted list of regular files directly under `root`.
pub fn list_documents(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::Configuration(format!("corpus directory {} does not exist", root.display())));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        match entry {
            Ok(e) if e.file_type().is_file() => files.push(e.into_path()),
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "skipping unreadable directory entry"),
        }
    }
    Ok(files)
}

/// Read one document; the file name becomes its id.
pub fn read_document(path: &Path) -> Result<RawDocument> {
    let text = fs::read_to_string(path).map_err(|source| Error::DocumentRead { path: path.to_path_buf(), source })?;
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(RawDocument { id, text })
}

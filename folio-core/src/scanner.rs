use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::document::{Document, Identity};
use crate::error::PipelineError;

const EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Finds and loads every content unit under a root directory.
pub struct ContentScanner {
    source_dir: PathBuf,
}

impl ContentScanner {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Load every document. Stops at the first file that fails.
    pub fn scan(&self) -> Result<Vec<Document>, PipelineError> {
        tracing::info!("Scanning: {}", self.source_dir.display());

        let mut documents = Vec::new();
        for path in self.content_files()? {
            let identity = Identity::from_path(&self.source_dir, &path)
                .ok_or_else(|| PipelineError::io(&path, invalid_path()))?;
            documents.push(self.read(identity, &path)?);
        }

        tracing::info!(documents = documents.len(), "scan complete");
        Ok(documents)
    }

    /// Paths of all content files, in a stable order.
    pub fn content_files(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry?;
            if entry.file_type().is_file() && is_content(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        Ok(paths)
    }

    /// Load one document by identity, whatever its draft status.
    pub fn load(&self, identity: &Identity) -> Result<Document, PipelineError> {
        let relative = Path::new(identity.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || !is_content(relative) {
            return Err(PipelineError::InvalidIdentity {
                identity: identity.clone(),
            });
        }

        self.read(identity.clone(), &self.source_dir.join(relative))
    }

    fn read(&self, identity: Identity, path: &Path) -> Result<Document, PipelineError> {
        tracing::debug!(%identity, "loading");
        let source = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(Document::parse(identity, &source)?)
    }
}

/// Load a single document from `root` without scanning the rest.
pub fn load_document<P: AsRef<Path>>(root: P, identity: &Identity) -> Result<Document, PipelineError> {
    ContentScanner::new(root).load(identity)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_content(path: &Path) -> bool {
    path.extension()
        .map(|ext| EXTENSIONS.contains(&ext.to_string_lossy().to_lowercase().as_str()))
        .unwrap_or(false)
}

fn invalid_path() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, "path is outside the source directory")
}

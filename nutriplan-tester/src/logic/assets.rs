use anyhow::{Context, Result};
use nutriplan_core::{
    CatalogManifest, CatalogSource, IngestionReport, MenuCatalog, PlannerConfig, PlannerError,
    PlannerSnapshot, PlannerStorage,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FileSourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Menu documents on disk, listed by a manifest in the same directory.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    root: PathBuf,
    manifest_name: String,
}

impl FileCatalogSource {
    pub fn new(root: impl Into<PathBuf>, manifest_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            manifest_name: manifest_name.into(),
        }
    }

    fn read(&self, relative: &str) -> Result<String, FileSourceError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|source| FileSourceError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl CatalogSource for FileCatalogSource {
    type Error = FileSourceError;

    fn manifest(&self) -> Result<CatalogManifest, Self::Error> {
        Ok(CatalogManifest::from_json(&self.read(&self.manifest_name)?)?)
    }

    fn read_document(&self, name: &str) -> Result<String, Self::Error> {
        self.read(name)
    }
}

/// Catalog shared by every scenario run.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    catalog: MenuCatalog,
    report: IngestionReport,
    root: PathBuf,
}

impl TesterAssets {
    /// The catalog bundled with the web build.
    pub fn default_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("nutriplan-web")
            .join("static")
            .join("assets")
            .join("data")
    }

    /// Ingest the catalog under `root` through the manifest named in `config`.
    pub fn load(root: &Path, config: &PlannerConfig) -> Result<Self> {
        let source = FileCatalogSource::new(root, config.manifest_name.as_str());
        let (catalog, report) = MenuCatalog::ingest(&source)
            .with_context(|| format!("loading menu catalog from {}", root.display()))?;
        for error in &report.errors {
            log::warn!("{error}");
        }
        log::info!(
            "catalog {}: {} menus from {} documents",
            root.display(),
            catalog.total_len(),
            report.documents_loaded
        );
        Ok(Self {
            catalog,
            report,
            root: root.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_root(), &PlannerConfig::default())
    }

    pub fn from_catalog(catalog: MenuCatalog) -> Self {
        Self {
            catalog,
            report: IngestionReport::default(),
            root: PathBuf::new(),
        }
    }

    pub const fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    pub const fn report(&self) -> &IngestionReport {
        &self.report
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("storage file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Snapshot(#[from] PlannerError),
}

/// Snapshot slot backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> FileStorageError {
        FileStorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl PlannerStorage for FileStorage {
    type Error = FileStorageError;

    fn save_snapshot(&self, snapshot: &PlannerSnapshot) -> Result<(), Self::Error> {
        let json = snapshot.to_json()?;
        fs::write(&self.path, json).map_err(|err| self.io_error(err))
    }

    fn load_snapshot(&self) -> Result<Option<PlannerSnapshot>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(PlannerSnapshot::from_json(&json)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn clear_snapshot(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

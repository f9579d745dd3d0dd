//! Menu catalog bundled into the wasm module.
//!
//! The manifest and every document it lists are embedded at build time, so
//! the planner starts without a network round trip.

use anyhow::Context;
use nutriplan_core::{CatalogManifest, CatalogSource, IngestionReport, MenuCatalog};

const MANIFEST_JSON: &str = include_str!("../static/assets/data/json_directory.json");

const DOCUMENTS: [(&str, &str); 3] = [
    (
        "menus/semana1.json",
        include_str!("../static/assets/data/menus/semana1.json"),
    ),
    (
        "menus/semana2.json",
        include_str!("../static/assets/data/menus/semana2.json"),
    ),
    (
        "menus/colaciones.json",
        include_str!("../static/assets/data/menus/colaciones.json"),
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum EmbeddedCatalogError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Document not embedded: {0}")]
    Missing(String),
}

/// Catalog source reading the embedded manifest and documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl CatalogSource for EmbeddedCatalog {
    type Error = EmbeddedCatalogError;

    fn manifest(&self) -> Result<CatalogManifest, Self::Error> {
        Ok(CatalogManifest::from_json(MANIFEST_JSON)?)
    }

    fn read_document(&self, name: &str) -> Result<String, Self::Error> {
        DOCUMENTS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, json)| (*json).to_string())
            .ok_or_else(|| EmbeddedCatalogError::Missing(name.to_string()))
    }
}

/// Ingest the embedded catalog.
///
/// # Errors
/// Returns an error if the embedded manifest is malformed. Broken documents
/// are reported in the [`IngestionReport`] instead.
pub fn load_embedded_catalog() -> anyhow::Result<(MenuCatalog, IngestionReport)> {
    let (catalog, report) =
        MenuCatalog::ingest(&EmbeddedCatalog).context("No se pudo cargar el directorio de menús")?;
    log::info!(
        "loaded {} menus from {} documents",
        catalog.total_len(),
        report.documents_loaded
    );
    Ok((catalog, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriplan_core::SourceBucket;

    #[test]
    fn every_manifest_entry_is_embedded() {
        let manifest = EmbeddedCatalog.manifest().unwrap();
        for name in &manifest.json_files {
            assert!(EmbeddedCatalog.read_document(name).is_ok(), "{name} missing");
        }
        assert!(EmbeddedCatalog.read_document("menus/otra.json").is_err());
    }

    #[test]
    fn embedded_catalog_covers_every_bucket() {
        let (catalog, report) = load_embedded_catalog().unwrap();
        assert!(report.is_clean());
        for bucket in SourceBucket::ALL {
            assert!(!catalog.entries(bucket).is_empty(), "{bucket} is empty");
        }
    }
}

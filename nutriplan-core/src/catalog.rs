//! Canonical menu source and ingestion.
//!
//! Menu documents are JSON objects whose keys name a meal bucket
//! (`"Breakfast"`, `"snack2"`, ...) and whose values are arrays of menu
//! entries. A manifest lists every document. Ingestion is forgiving: a broken
//! document or entry is counted and reported, and planning continues with
//! whatever loaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::category::SourceBucket;
use crate::constants::{CATALOG_ID_KEY, LOG_TARGET_CATALOG};
use crate::error::IngestionError;
use crate::menu::MenuEntry;

/// Directory manifest naming the menu documents to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogManifest {
    #[serde(default)]
    pub json_files: Vec<String>,
}

impl CatalogManifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a manifest.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Collaborator that knows where menu documents live.
/// Platform-specific implementations should provide this.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the manifest listing every document.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is unavailable. Without it nothing
    /// can be ingested, so callers treat this as fatal.
    fn manifest(&self) -> Result<CatalogManifest, Self::Error>;

    /// Read the raw JSON of one document named by the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn read_document(&self, name: &str) -> Result<String, Self::Error>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StaticSourceError {
    #[error("document not embedded: {0}")]
    MissingDocument(String),
}

/// In-memory source backed by embedded documents, in manifest order.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    documents: Vec<(String, String)>,
}

impl StaticCatalogSource {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_document(mut self, name: impl Into<String>, json: impl Into<String>) -> Self {
        self.documents.push((name.into(), json.into()));
        self
    }
}

impl CatalogSource for StaticCatalogSource {
    type Error = StaticSourceError;

    fn manifest(&self) -> Result<CatalogManifest, Self::Error> {
        Ok(CatalogManifest {
            json_files: self.documents.iter().map(|(name, _)| name.clone()).collect(),
        })
    }

    fn read_document(&self, name: &str) -> Result<String, Self::Error> {
        self.documents
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, json)| json.clone())
            .ok_or_else(|| StaticSourceError::MissingDocument(name.to_string()))
    }
}

/// Aggregate outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IngestionReport {
    pub documents_loaded: usize,
    pub errors: Vec<IngestionError>,
    pub discarded_entries: usize,
    pub ignored_keys: Vec<String>,
    pub accepted: BTreeMap<SourceBucket, usize>,
}

impl IngestionReport {
    /// No document failed. Discarded entries alone do not make a run unclean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// User-facing notice listing every failed document and the number of
    /// discarded entries, if either is present.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.errors.is_empty() {
            let list = self
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("Algunos menús no se pudieron cargar: {list}"));
        }
        match self.discarded_entries {
            0 => {}
            1 => parts.push("Se descartó 1 menú sin nombre o sin platillos.".to_string()),
            n => parts.push(format!(
                "Se descartaron {n} menús sin nombre o sin platillos."
            )),
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn merge(&mut self, other: Self) {
        self.documents_loaded += other.documents_loaded;
        self.errors.extend(other.errors);
        self.discarded_entries += other.discarded_entries;
        self.ignored_keys.extend(other.ignored_keys);
        for (bucket, count) in other.accepted {
            *self.accepted.entry(bucket).or_default() += count;
        }
    }
}

/// The canonical source pool: validated menu entries per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCatalog {
    buckets: BTreeMap<SourceBucket, Vec<MenuEntry>>,
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl MenuCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            buckets: SourceBucket::ALL
                .into_iter()
                .map(|bucket| (bucket, Vec::new()))
                .collect(),
        }
    }

    /// Build a catalog from pre-validated entries. Invalid entries are dropped.
    #[must_use]
    pub fn with_bucket(mut self, bucket: SourceBucket, entries: Vec<MenuEntry>) -> Self {
        self.buckets
            .entry(bucket)
            .or_default()
            .extend(entries.into_iter().filter(MenuEntry::is_valid));
        self
    }

    /// Drop every candidate of `bucket`, leaving it empty.
    #[must_use]
    pub fn without_bucket(mut self, bucket: SourceBucket) -> Self {
        self.buckets.insert(bucket, Vec::new());
        self
    }

    #[must_use]
    pub fn entries(&self, bucket: SourceBucket) -> &[MenuEntry] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Buckets with no candidates; their categories can never reach the quota.
    #[must_use]
    pub fn empty_buckets(&self) -> Vec<SourceBucket> {
        SourceBucket::ALL
            .into_iter()
            .filter(|bucket| self.entries(*bucket).is_empty())
            .collect()
    }

    /// Ingest every document listed by the source's manifest.
    ///
    /// # Errors
    ///
    /// Returns an error only if the manifest itself cannot be loaded.
    /// Per-document failures are collected in the report.
    pub fn ingest<S: CatalogSource>(source: &S) -> Result<(Self, IngestionReport), S::Error> {
        let manifest = source.manifest()?;
        log::debug!(
            target: LOG_TARGET_CATALOG,
            "ingesting {} menu documents",
            manifest.json_files.len()
        );

        let mut catalog = Self::empty();
        let mut report = IngestionReport::default();
        for name in &manifest.json_files {
            match source.read_document(name) {
                Ok(json) => report.merge(catalog.ingest_document(name, &json)),
                Err(err) => {
                    log::warn!(target: LOG_TARGET_CATALOG, "failed to read {name}: {err}");
                    report
                        .errors
                        .push(IngestionError::new(name.clone(), err.to_string()));
                }
            }
        }

        for bucket in catalog.empty_buckets() {
            log::warn!(target: LOG_TARGET_CATALOG, "no menus available for {bucket}");
        }
        Ok((catalog, report))
    }

    /// Merge one raw document into the catalog.
    pub fn ingest_document(&mut self, name: &str, json: &str) -> IngestionReport {
        let mut report = IngestionReport::default();
        let document = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                report
                    .errors
                    .push(IngestionError::new(name, "expected a JSON object"));
                return report;
            }
            Err(err) => {
                report.errors.push(IngestionError::new(name, err.to_string()));
                return report;
            }
        };

        for (key, value) in document {
            if key == CATALOG_ID_KEY {
                continue;
            }
            let Some(bucket) = SourceBucket::from_raw_key(&key) else {
                log::debug!(target: LOG_TARGET_CATALOG, "{name}: ignoring key {key}");
                report.ignored_keys.push(key);
                continue;
            };
            let Value::Array(items) = value else {
                report.ignored_keys.push(key);
                continue;
            };

            let mut accepted = 0;
            for item in items {
                match serde_json::from_value::<MenuEntry>(item) {
                    Ok(entry) if entry.is_valid() => {
                        self.buckets.entry(bucket).or_default().push(entry);
                        accepted += 1;
                    }
                    _ => report.discarded_entries += 1,
                }
            }
            log::debug!(
                target: LOG_TARGET_CATALOG,
                "{name}: added {accepted} menus to {bucket}"
            );
            *report.accepted.entry(bucket).or_default() += accepted;
        }

        report.documents_loaded = 1;
        report
    }
}

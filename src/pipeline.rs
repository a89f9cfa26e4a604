//! Caller side of the classifier: the per-app record store, package
//! install/update/remove events and concurrent batch classification.
//!
//! CPU-bound classification runs on the blocking pool; the async side only
//! moves `AppEntry` values around and applies results to the store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use indicatif::ProgressBar;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{self, JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::classifiers::HybridClassifier;
use crate::config::BatchConfig;
use crate::generic_types::{AppEntry, Category, ClassificationResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRecord {
    pub package_id: String,
    pub app_name: String,
    pub category: Category,
    pub confidence: f32,
    /// Set when the user pinned the category; classification never overwrites it.
    pub manual_override: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub category: Category,
    pub packages: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<String, AppRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the category was written. The display name is always refreshed.
    pub fn apply_classification(&mut self, app: &AppEntry, result: ClassificationResult) -> bool {
        match self.records.get_mut(&app.package_id) {
            Some(record) => {
                record.app_name = app.app_name.clone();
                if record.manual_override {
                    return false;
                }
                record.category = result.category;
                record.confidence = result.confidence;
            }
            None => {
                self.records.insert(
                    app.package_id.clone(),
                    AppRecord {
                        package_id: app.package_id.clone(),
                        app_name: app.app_name.clone(),
                        category: result.category,
                        confidence: result.confidence,
                        manual_override: false,
                    },
                );
            }
        }
        true
    }

    /// Pin `category` for the package. Returns false for unknown packages.
    pub fn set_manual_override(&mut self, package_id: &str, category: Category) -> bool {
        match self.records.get_mut(package_id) {
            Some(record) => {
                record.category = category;
                record.confidence = 1.0;
                record.manual_override = true;
                true
            }
            None => false,
        }
    }

    pub fn clear_manual_override(&mut self, package_id: &str) -> bool {
        match self.records.get_mut(package_id) {
            Some(record) => {
                record.manual_override = false;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, package_id: &str) -> Option<AppRecord> {
        self.records.remove(package_id)
    }

    pub fn get(&self, package_id: &str) -> Option<&AppRecord> {
        self.records.get(package_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Non-empty categories in `Category::ALL` order, package ids sorted.
    pub fn folders(&self) -> Vec<Folder> {
        let mut grouped: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for record in self.records.values() {
            grouped
                .entry(record.category)
                .or_default()
                .push(record.package_id.clone());
        }

        Category::ALL
            .iter()
            .filter_map(|category| {
                grouped.remove(category).map(|mut packages| {
                    packages.sort();
                    Folder { category: *category, packages }
                })
            })
            .collect()
    }
}

/// Classify `apps` on up to `workers` blocking tasks. Output keeps input order.
pub async fn classify_batch(
    classifier: Arc<HybridClassifier>,
    apps: Vec<AppEntry>,
    workers: usize,
    progress: Option<ProgressBar>,
) -> Result<Vec<(AppEntry, ClassificationResult)>, JoinError> {
    if apps.is_empty() {
        return Ok(Vec::new());
    }
    let total = apps.len();
    let workers = workers.max(1);
    let chunk_size = (total + workers - 1) / workers;

    let handles = apps.chunks(chunk_size).map(|chunk| {
        let chunk = chunk.to_vec();
        let classifier = classifier.clone();
        let progress = progress.clone();
        task::spawn_blocking(move || {
            chunk
                .into_iter()
                .map(|app| {
                    let result = classifier.classify(&app.app_name, &app.package_id);
                    if let Some(pb) = progress.as_ref() {
                        pb.inc(1);
                    }
                    (app, result)
                })
                .collect::<Vec<_>>()
        })
    });

    let mut out = Vec::with_capacity(total);
    for chunk in join_all(handles).await {
        out.extend(chunk?);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
pub enum PackageEvent {
    Added(AppEntry),
    Replaced(AppEntry),
    Removed(String),
}

/// Consumes package events and keeps a `RecordStore` current.
///
/// Added/Replaced apps are buffered up to `max_size` and classified as one
/// batch; a `Removed` event flushes the buffer first so events apply in order.
pub struct EventProcessor {
    classifier: Arc<HybridClassifier>,
    store: Arc<Mutex<RecordStore>>,
    max_size: usize,
    workers: usize,
}

impl EventProcessor {
    pub fn new(classifier: Arc<HybridClassifier>, store: Arc<Mutex<RecordStore>>, batch: &BatchConfig) -> Self {
        Self {
            classifier,
            store,
            max_size: batch.max_size.max(1),
            workers: batch.workers.max(1),
        }
    }

    pub fn spawn(self, rx: mpsc::Receiver<PackageEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    /// Runs until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<PackageEvent>) {
        let mut buffer: Vec<AppEntry> = Vec::with_capacity(self.max_size);
        while let Some(event) = rx.recv().await {
            self.feed(event, &mut buffer).await;
            // fold already-queued events into the same batch
            while buffer.len() < self.max_size {
                match rx.try_recv() {
                    Ok(event) => self.feed(event, &mut buffer).await,
                    Err(_) => break,
                }
            }
            self.flush(&mut buffer).await;
        }
        self.flush(&mut buffer).await;
        info!("Package event channel closed");
    }

    async fn feed(&self, event: PackageEvent, buffer: &mut Vec<AppEntry>) {
        match event {
            PackageEvent::Added(app) | PackageEvent::Replaced(app) => {
                buffer.push(app);
                if buffer.len() >= self.max_size {
                    self.flush(buffer).await;
                }
            }
            PackageEvent::Removed(package_id) => {
                self.flush(buffer).await;
                if self.store.lock().await.remove(&package_id).is_some() {
                    debug!(package_id = %package_id, "removed");
                }
            }
        }
    }

    async fn flush(&self, buffer: &mut Vec<AppEntry>) {
        if buffer.is_empty() {
            return;
        }
        let apps = std::mem::take(buffer);
        match classify_batch(self.classifier.clone(), apps, self.workers, None).await {
            Ok(results) => {
                let mut store = self.store.lock().await;
                for (app, result) in results {
                    if !store.apply_classification(&app, result) {
                        debug!(package_id = %app.package_id, "manual override kept");
                    }
                }
            }
            Err(e) => error!("Batch classification failed: {}", e),
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::event::{EventDescriptor, RawEventFields};
use crate::frontmatter::read_frontmatter;
use crate::thumbnail::{GenerationOutcome, ThumbnailComposer};

/// A markdown event file found under `<events_dir>/<language>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFile {
    pub language: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Done(GenerationOutcome),
    NoFrontmatter,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub language: String,
    pub file: PathBuf,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub written: usize,
    pub skipped: usize,
    pub no_frontmatter: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn counts(&self) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for item in &self.items {
            match &item.status {
                ItemStatus::Done(GenerationOutcome::Written { .. }) => counts.written += 1,
                ItemStatus::Done(GenerationOutcome::Skipped { .. }) => counts.skipped += 1,
                ItemStatus::NoFrontmatter => counts.no_frontmatter += 1,
                ItemStatus::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.counts().failed > 0
    }
}

/// Lists `*.md` files per language, sorted by name within each language.
/// Languages without a directory are skipped.
pub fn collect_event_files(events_dir: &Path, languages: &[String]) -> Result<Vec<EventFile>> {
    let mut files = Vec::new();
    for language in languages {
        let dir = events_dir.join(language);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "no content directory for language, skipping");
            continue;
        }

        let mut paths = Vec::new();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("failed to list event directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed reading entries from {}", dir.display()))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        files.extend(paths.into_iter().map(|path| EventFile {
            language: language.clone(),
            path,
        }));
    }
    Ok(files)
}

/// Generates thumbnails for every event file, one at a time. A bad file is
/// recorded in the report and never stops the run.
pub async fn run_batch(
    composer: &ThumbnailComposer,
    events_dir: &Path,
    languages: &[String],
    today: NaiveDate,
) -> Result<BatchReport> {
    let files = collect_event_files(events_dir, languages)?;
    info!(count = files.len(), dir = %events_dir.display(), "processing event files");

    let mut report = BatchReport::default();
    for file in files {
        let status = process_file(composer, &file, today).await;
        report.items.push(BatchItem {
            language: file.language,
            file: file.path,
            status,
        });
    }
    Ok(report)
}

async fn process_file(
    composer: &ThumbnailComposer,
    file: &EventFile,
    today: NaiveDate,
) -> ItemStatus {
    let frontmatter = match read_frontmatter(&file.path) {
        Ok(Some(frontmatter)) => frontmatter,
        Ok(None) => {
            warn!(file = %file.path.display(), "no frontmatter block, skipping");
            return ItemStatus::NoFrontmatter;
        }
        Err(err) => {
            error!(file = %file.path.display(), "{err:#}");
            return ItemStatus::Failed(format!("{err:#}"));
        }
    };

    let stem = file
        .path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let descriptor = EventDescriptor::from_raw(
        RawEventFields::from_frontmatter(&frontmatter, &stem),
        today,
    );
    info!(lang = %file.language, title = %descriptor.title, "generating thumbnail");

    match composer.compose(&descriptor).await {
        Ok(outcome) => ItemStatus::Done(outcome),
        Err(err) => {
            error!(file = %file.path.display(), "{err:#}");
            ItemStatus::Failed(format!("{err:#}"))
        }
    }
}

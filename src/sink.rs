use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::thumbnail::ThumbnailDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Output directory for thumbnails, addressed by slug.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, slug: &str, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{slug}.{}", format.extension()))
    }

    /// A PNG at the target path pins the thumbnail: it was either generated
    /// remotely or dropped in by hand, and is never regenerated.
    pub fn is_pinned(&self, slug: &str) -> bool {
        self.path_for(slug, OutputFormat::Png).is_file()
    }

    pub fn write(&self, slug: &str, document: &ThumbnailDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory {}", self.dir.display())
        })?;
        let path = self.path_for(slug, document.format());
        fs::write(&path, document.as_bytes())
            .with_context(|| format!("failed to write thumbnail {}", path.display()))?;
        Ok(path)
    }
}

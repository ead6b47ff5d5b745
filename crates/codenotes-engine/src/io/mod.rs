use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{Anchor, AnchorId, Range};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid annotations file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize annotations: {0}")]
    Serialize(serde_json::Error),
}

/// One annotation as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub id: AnchorId,
    pub filename: String,
    pub anchor_text: String,
    pub annotation: String,
    pub anchor: AnchorBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorBounds {
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl From<&Anchor> for AnnotationRecord {
    fn from(anchor: &Anchor) -> Self {
        Self {
            id: anchor.id,
            filename: anchor.document.clone(),
            anchor_text: anchor.anchor_text.clone(),
            annotation: anchor.annotation.clone(),
            anchor: AnchorBounds {
                start_line: anchor.start_line,
                end_line: anchor.end_line,
                start_offset: anchor.start_offset,
                end_offset: anchor.end_offset,
            },
        }
    }
}

impl From<AnnotationRecord> for Anchor {
    fn from(record: AnnotationRecord) -> Self {
        let bounds = record.anchor;
        Anchor {
            id: record.id,
            ..Anchor::new(
                record.filename,
                record.anchor_text,
                record.annotation,
                Range::from_coords(
                    bounds.start_line,
                    bounds.start_offset,
                    bounds.end_line,
                    bounds.end_offset,
                ),
            )
        }
    }
}

/// Read persisted annotations; a missing file holds no annotations
pub fn load_annotations(path: &Path) -> Result<Vec<Anchor>, IoError> {
    if !path.exists() {
        debug!("no annotations file at {}", path.display());
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let records: Vec<AnnotationRecord> =
        serde_json::from_str(&content).map_err(|source| IoError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(records.into_iter().map(Anchor::from).collect())
}

/// Write annotations, skipping anchors marked for deletion
pub fn save_annotations<'a>(
    path: &Path,
    anchors: impl IntoIterator<Item = &'a Anchor>,
) -> Result<(), IoError> {
    let records: Vec<AnnotationRecord> = anchors
        .into_iter()
        .filter(|anchor| anchor.is_live())
        .map(AnnotationRecord::from)
        .collect();

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&records).map_err(IoError::Serialize)?;
    fs::write(path, content)?;
    debug!("saved {} annotations to {}", records.len(), path.display());
    Ok(())
}

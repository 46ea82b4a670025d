use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::local::write_video_ids;

pub const ASSIGNMENTS_FILENAME: &str = "batch_assignments.csv";

/// Where each batch is meant to run, in batch order.
pub const PLATFORMS: [&str; 6] = [
  "Kaggle (Notebook 1)",
  "Google Colab (Account 1)",
  "GitHub Codespaces",
  "Google Colab (Account 2)",
  "Kaggle (Notebook 2)",
  "Any other platform",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
  pub index: usize,
  /// Offset of the first id in the master list.
  pub start: usize,
  /// Exclusive end offset in the master list.
  pub end: usize,
  pub ids: Vec<String>,
}

impl Batch {
  pub fn filename(&self) -> String {
    format!("batch_{}.csv", self.index)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
  #[serde(rename = "Batch")]
  pub batch: usize,
  #[serde(rename = "File")]
  pub file: String,
  #[serde(rename = "Videos")]
  pub videos: String,
  #[serde(rename = "Count")]
  pub count: usize,
  #[serde(rename = "Platform")]
  pub platform: String,
}

pub fn split_into_batches(ids: &[String], per_batch: usize) -> Result<Vec<Batch>> {
  if per_batch == 0 {
    return Err(Error::config("batch size must be at least 1"));
  }
  Ok(
    ids
      .chunks(per_batch)
      .enumerate()
      .map(|(index, chunk)| {
        let start = index * per_batch;
        Batch {
          index,
          start,
          end: start + chunk.len(),
          ids: chunk.to_vec(),
        }
      })
      .collect(),
  )
}

pub fn platform_assignments(batches: &[Batch]) -> Vec<Assignment> {
  batches
    .iter()
    .map(|batch| Assignment {
      batch: batch.index,
      file: batch.filename(),
      videos: format!("{}-{}", batch.start, batch.end.saturating_sub(1)),
      count: batch.ids.len(),
      platform: PLATFORMS
        .get(batch.index)
        .map(|p| p.to_string())
        .unwrap_or_else(|| format!("Platform {}", batch.index + 1)),
    })
    .collect()
}

/// Writes one id file per batch plus the assignment table into `dir`.
/// Returns the paths of the batch files.
pub fn write_batches(dir: &Path, column: &str, batches: &[Batch]) -> Result<Vec<PathBuf>> {
  let mut written = Vec::with_capacity(batches.len());
  for batch in batches {
    let path = dir.join(batch.filename());
    write_video_ids(&path, column, &batch.ids)?;
    info!(
      file = %path.display(),
      first = batch.start,
      last = batch.end.saturating_sub(1),
      count = batch.ids.len(),
      "created batch"
    );
    written.push(path);
  }

  let mut writer = csv::Writer::from_path(dir.join(ASSIGNMENTS_FILENAME))?;
  for assignment in platform_assignments(batches) {
    writer.serialize(assignment)?;
  }
  writer.flush()?;
  Ok(written)
}

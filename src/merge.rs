use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::error::Result;
use crate::local::{dedup_first, read_results, write_results_file};
use crate::record::CheckResult;

pub const MERGED_FILENAME: &str = "final_transcript_availability.csv";
pub const WITH_BANGLA_FILENAME: &str = "videos_with_bangla.csv";
pub const WITH_TRANSCRIPTS_FILENAME: &str = "videos_with_transcripts.csv";
pub const WITHOUT_TRANSCRIPTS_FILENAME: &str = "videos_without_transcripts.csv";

lazy_static! {
  static ref RESULT_FILE_REGEX: Regex =
    Regex::new(r"^(results_.*\.csv|transcript_availability\.csv|batch_.*_result\.csv)$").unwrap();
}

/// Result tables sitting directly in `dir`, sorted by path.
pub fn find_result_files(dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(dir)
    .sort(true)
    .min_depth(1)
    .max_depth(1)
    .into_iter()
    .flatten()
    .filter(|entry| entry.file_type().is_file())
    .filter(|entry| {
      entry
        .file_name()
        .to_str()
        .map(|name| RESULT_FILE_REGEX.is_match(name))
        .unwrap_or(false)
    })
    .map(|entry| entry.path())
    .collect();
  files.sort();
  files.dedup();
  files
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
  /// Each input file with its row count, in merge order.
  pub inputs: Vec<(PathBuf, usize)>,
  pub duplicates_removed: usize,
  pub merged: Vec<CheckResult>,
}

/// Concatenates tables in order and keeps the first row seen for each id.
pub fn merge_tables(tables: Vec<Vec<CheckResult>>) -> (Vec<CheckResult>, usize) {
  let combined: Vec<CheckResult> = tables.into_iter().flatten().collect();
  let before = combined.len();
  let merged = dedup_first(combined);
  let removed = before - merged.len();
  (merged, removed)
}

pub fn merge_files(files: &[PathBuf]) -> Result<MergeReport> {
  let mut inputs = Vec::with_capacity(files.len());
  let mut tables = Vec::with_capacity(files.len());
  for path in files {
    let table = read_results(path)?;
    info!(file = %path.display(), rows = table.len(), "loaded result file");
    inputs.push((path.clone(), table.len()));
    tables.push(table);
  }
  let (merged, duplicates_removed) = merge_tables(tables);
  if duplicates_removed > 0 {
    warn!(duplicates_removed, "removed duplicate entries");
  }
  Ok(MergeReport {
    inputs,
    duplicates_removed,
    merged,
  })
}

pub fn with_bangla(results: &[CheckResult]) -> Vec<CheckResult> {
  results.iter().filter(|r| r.has_bangla).cloned().collect()
}

pub fn with_transcripts(results: &[CheckResult]) -> Vec<CheckResult> {
  results.iter().filter(|r| r.has_transcript).cloned().collect()
}

pub fn without_transcripts(results: &[CheckResult]) -> Vec<CheckResult> {
  results.iter().filter(|r| !r.has_transcript).cloned().collect()
}

/// Writes the merged table and its filtered subsets into `dir`.
pub fn write_outputs(dir: &Path, merged: &[CheckResult]) -> Result<Vec<(PathBuf, usize)>> {
  let outputs = [
    (MERGED_FILENAME, merged.to_vec()),
    (WITH_BANGLA_FILENAME, with_bangla(merged)),
    (WITH_TRANSCRIPTS_FILENAME, with_transcripts(merged)),
    (WITHOUT_TRANSCRIPTS_FILENAME, without_transcripts(merged)),
  ];
  let mut written = Vec::with_capacity(outputs.len());
  for (name, rows) in outputs {
    let path = dir.join(name);
    write_results_file(&path, &rows)?;
    info!(file = %path.display(), rows = rows.len(), "wrote");
    written.push((path, rows.len()));
  }
  Ok(written)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::Status;
  use crate::remote::TranscriptDescriptor;
  use std::fs;

  fn available(id: &str, code: &str) -> CheckResult {
    CheckResult::available(
      id,
      &[TranscriptDescriptor {
        language_code: code.into(),
        is_generated: false,
      }],
    )
  }

  #[test]
  fn merging_with_itself_is_one_copy() {
    let table = vec![available("a", "bn"), CheckResult::missing("b", Status::Disabled)];
    let (merged, removed) = merge_tables(vec![table.clone(), table.clone()]);
    assert_eq!(merged, table);
    assert_eq!(removed, 2);
  }

  #[test]
  fn first_occurrence_wins() {
    let first = vec![CheckResult::missing("a", Status::RateLimited)];
    let second = vec![available("a", "en"), available("b", "en")];
    let (merged, removed) = merge_tables(vec![first, second]);
    assert_eq!(removed, 1);
    assert_eq!(merged[0].status, Status::RateLimited);
    assert_eq!(merged[1].video_id, "b");
  }

  #[test]
  fn subsets() {
    let table = vec![
      available("a", "bn"),
      available("b", "en"),
      CheckResult::missing("c", Status::Unavailable),
    ];
    assert_eq!(with_bangla(&table).len(), 1);
    assert_eq!(with_transcripts(&table).len(), 2);
    assert_eq!(without_transcripts(&table)[0].video_id, "c");
  }

  #[test]
  fn discovers_result_files_only() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
      "results_0.csv",
      "results_1.csv",
      "transcript_availability.csv",
      "batch_3_result.csv",
      "batch_3.csv",
      "video_ids.csv",
      "results_0.txt",
    ] {
      fs::write(dir.path().join(name), "").unwrap();
    }
    fs::create_dir(dir.path().join("results_dir.csv")).unwrap();
    let names: Vec<String> = find_result_files(dir.path())
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert_eq!(
      names,
      vec![
        "batch_3_result.csv",
        "results_0.csv",
        "results_1.csv",
        "transcript_availability.csv"
      ]
    );
  }

  #[test]
  fn writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let merged = vec![available("a", "bn"), CheckResult::missing("b", Status::Disabled)];
    let written = write_outputs(dir.path(), &merged).unwrap();
    let counts: Vec<usize> = written.iter().map(|(_, n)| *n).collect();
    assert_eq!(counts, vec![2, 1, 1, 1]);
    let reread = read_results(&dir.path().join(MERGED_FILENAME)).unwrap();
    assert_eq!(reread, merged);
  }
}

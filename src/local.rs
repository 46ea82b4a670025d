use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{CheckResult, COLUMNS};

/// Reads the ids in `column` of a CSV file, dropping blanks and repeated ids
/// while keeping the order of first occurrence.
pub fn load_video_ids(path: &Path, column: &str) -> Result<Vec<String>> {
  let mut reader = csv::Reader::from_path(path)?;
  let index = reader
    .headers()?
    .iter()
    .position(|h| h.trim() == column)
    .ok_or_else(|| Error::MissingColumn {
      path: path.to_path_buf(),
      column: column.to_owned(),
    })?;

  let mut seen = HashSet::new();
  let mut ids = Vec::new();
  for record in reader.records() {
    let record = record?;
    let id = record.get(index).unwrap_or_default().trim();
    if !id.is_empty() && seen.insert(id.to_owned()) {
      ids.push(id.to_owned());
    }
  }
  Ok(ids)
}

/// Writes a single-column id list, the format `load_video_ids` reads.
pub fn write_video_ids(path: &Path, column: &str, ids: &[String]) -> Result<()> {
  let mut writer = csv::Writer::from_path(path)?;
  writer.write_record([column])?;
  for id in ids {
    writer.write_record([id])?;
  }
  writer.flush()?;
  Ok(())
}

/// Keeps the ids that are not in `checked`, in their original order.
pub fn filter_list_to_check(all_ids: &[String], checked: &HashSet<String>) -> Vec<String> {
  all_ids
    .iter()
    .filter(|id| !checked.contains(*id))
    .cloned()
    .collect()
}

/// Receives the accumulated results whenever a run persists its progress.
pub trait Checkpoint {
  fn save(&mut self, results: &[CheckResult]) -> Result<()>;
}

/// A result table on disk.
#[derive(Debug, Clone)]
pub struct ResultTable {
  path: PathBuf,
}

impl ResultTable {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    ResultTable { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Loads every row, collapsing repeated ids onto their first occurrence.
  /// A table that does not exist yet is empty; one missing a column is an error.
  pub fn load(&self) -> Result<Vec<CheckResult>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }
    let results = read_results(&self.path)?;
    let before = results.len();
    let results = dedup_first(results);
    if results.len() < before {
      warn!(
        path = %self.path.display(),
        dropped = before - results.len(),
        "collapsed repeated ids in result table"
      );
    }
    Ok(results)
  }

  /// Replaces the table with `results`. The new content lands in a sibling
  /// temp file first, so a crash mid-write leaves the previous table intact.
  pub fn save(&self, results: &[CheckResult]) -> Result<()> {
    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write_results(tmp.as_file_mut(), results)?;
    tmp.as_file_mut().flush()?;
    tmp.persist(&self.path)?;
    debug!(path = %self.path.display(), rows = results.len(), "saved result table");
    Ok(())
  }
}

impl Checkpoint for ResultTable {
  fn save(&mut self, results: &[CheckResult]) -> Result<()> {
    ResultTable::save(self, results)
  }
}

/// Reads a result table, requiring every column of the schema.
pub fn read_results(path: &Path) -> Result<Vec<CheckResult>> {
  let mut reader = csv::Reader::from_path(path)?;
  let headers = reader.headers()?.clone();
  for column in COLUMNS {
    if !headers.iter().any(|h| h == column) {
      return Err(Error::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_owned(),
      });
    }
  }
  let mut results = Vec::new();
  for row in reader.deserialize() {
    results.push(row?);
  }
  Ok(results)
}

/// Writes a result table with its header, even when `results` is empty.
pub fn write_results<W: Write>(out: W, results: &[CheckResult]) -> Result<()> {
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(out);
  writer.write_record(COLUMNS)?;
  for result in results {
    writer.serialize(result)?;
  }
  writer.flush()?;
  Ok(())
}

pub fn write_results_file(path: &Path, results: &[CheckResult]) -> Result<()> {
  write_results(File::create(path)?, results)
}

/// Drops every row whose id was already seen earlier in the list.
pub fn dedup_first(results: Vec<CheckResult>) -> Vec<CheckResult> {
  let mut seen = HashSet::new();
  results
    .into_iter()
    .filter(|r| seen.insert(r.video_id.clone()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::Status;
  use std::fs;

  #[test]
  fn loads_unique_ids_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ids.csv");
    fs::write(&path, "title,video_id\na,x1\nb,x2\nc,\nd,x1\ne, x3 \n").unwrap();
    let ids = load_video_ids(&path, "video_id").unwrap();
    assert_eq!(ids, vec!["x1", "x2", "x3"]);
  }

  #[test]
  fn missing_id_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ids.csv");
    fs::write(&path, "id\nx1\n").unwrap();
    let err = load_video_ids(&path, "video_id").unwrap_err();
    assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "video_id"));
  }

  #[test]
  fn filters_checked_ids() {
    let all: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    let checked: HashSet<String> = ["b", "d"].iter().map(|s| s.to_string()).collect();
    assert_eq!(filter_list_to_check(&all, &checked), vec!["a", "c"]);
  }

  #[test]
  fn table_roundtrip_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let table = ResultTable::new(dir.path().join("out.csv"));
    assert!(table.load().unwrap().is_empty());

    table.save(&[]).unwrap();
    let header = fs::read_to_string(table.path()).unwrap();
    assert_eq!(header.trim_end(), COLUMNS.join(","));

    let rows = vec![
      CheckResult::missing("a", Status::Disabled),
      CheckResult::missing("b", Status::Blocked),
    ];
    table.save(&rows).unwrap();
    assert_eq!(table.load().unwrap(), rows);
  }

  #[test]
  fn table_without_status_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(
      &path,
      "video_id,has_transcript,has_bangla,has_english,total_languages,manual_count,auto_count,languages\n\
       a,False,False,False,0,0,0,\n",
    )
    .unwrap();
    let err = ResultTable::new(&path).load().unwrap_err();
    assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "status"));
  }

  #[test]
  fn repeated_rows_keep_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let rows = vec![
      CheckResult::missing("a", Status::Disabled),
      CheckResult::missing("a", Status::Error),
    ];
    write_results_file(&path, &rows).unwrap();
    let loaded = ResultTable::new(&path).load().unwrap();
    assert_eq!(loaded, vec![CheckResult::missing("a", Status::Disabled)]);
  }
}

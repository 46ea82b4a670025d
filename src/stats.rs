use std::collections::HashMap;
use std::fmt;

use crate::record::{CheckResult, Status};

/// Availability counts over a result table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stats {
  pub total: usize,
  /// Most frequent status first, ties broken by status order.
  pub by_status: Vec<(Status, usize)>,
  pub with_transcript: usize,
  pub with_bangla: usize,
  pub with_english: usize,
}

impl Stats {
  pub fn from_results(results: &[CheckResult]) -> Self {
    let mut counts: HashMap<Status, usize> = HashMap::new();
    for result in results {
      *counts.entry(result.status).or_insert(0) += 1;
    }
    let mut by_status: Vec<(Status, usize)> = counts.into_iter().collect();
    by_status.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    Stats {
      total: results.len(),
      by_status,
      with_transcript: results.iter().filter(|r| r.has_transcript).count(),
      with_bangla: results.iter().filter(|r| r.has_bangla).count(),
      with_english: results.iter().filter(|r| r.has_english).count(),
    }
  }

  pub fn percent(&self, count: usize) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      100.0 * count as f64 / self.total as f64
    }
  }
}

impl fmt::Display for Stats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Status breakdown:")?;
    for (status, count) in &self.by_status {
      writeln!(f, "  {}: {} ({:.1}%)", status, count, self.percent(*count))?;
    }
    let lines = [
      ("Has transcripts", self.with_transcript),
      ("Has Bangla", self.with_bangla),
      ("Has English", self.with_english),
    ];
    for (label, count) in lines {
      writeln!(
        f,
        "{}: {}/{} ({:.1}%)",
        label,
        count,
        self.total,
        self.percent(count)
      )?;
    }
    Ok(())
  }
}

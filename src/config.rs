use std::time::Duration;

use rand::Rng;

use crate::error::{Error, Result};

pub const DEFAULT_INPUT_FILEPATH: &str = "video_ids.csv";
pub const DEFAULT_OUTPUT_FILEPATH: &str = "transcript_availability.csv";
pub const DEFAULT_ID_COLUMN: &str = "video_id";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MIN_WAIT_SECS: f64 = 2.0;
pub const DEFAULT_MAX_WAIT_SECS: f64 = 4.0;
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;
pub const DEFAULT_FAILURE_THRESHOLD: usize = 5;

/// Bounds of the random pause between two lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitRange {
  pub min: Duration,
  pub max: Duration,
}

impl WaitRange {
  pub const ZERO: WaitRange = WaitRange {
    min: Duration::ZERO,
    max: Duration::ZERO,
  };

  pub fn from_secs_f64(min: f64, max: f64) -> Result<Self> {
    if !(min.is_finite() && max.is_finite()) || min < 0.0 || max < 0.0 {
      return Err(Error::config(format!(
        "wait bounds must be non-negative seconds, got {}..{}",
        min, max
      )));
    }
    Ok(WaitRange {
      min: Duration::from_secs_f64(min),
      max: Duration::from_secs_f64(max),
    })
  }

  pub fn is_zero(&self) -> bool {
    self.max.is_zero()
  }

  /// Uniform draw from `[min, max]`.
  pub fn sample(&self) -> Duration {
    if self.min >= self.max {
      return self.min;
    }
    let secs = rand::rng().random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
    Duration::from_secs_f64(secs)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerConfig {
  pub wait: WaitRange,
  /// Records processed between two saves of the result table.
  pub checkpoint_interval: usize,
  /// Consecutive transient failures that end the run early.
  pub failure_threshold: usize,
}

impl Default for CheckerConfig {
  fn default() -> Self {
    CheckerConfig {
      wait: WaitRange {
        min: Duration::from_secs_f64(DEFAULT_MIN_WAIT_SECS),
        max: Duration::from_secs_f64(DEFAULT_MAX_WAIT_SECS),
      },
      checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
      failure_threshold: DEFAULT_FAILURE_THRESHOLD,
    }
  }
}

impl CheckerConfig {
  pub fn validate(&self) -> Result<()> {
    if self.wait.min > self.wait.max {
      return Err(Error::config(format!(
        "minimum wait {:?} exceeds maximum wait {:?}",
        self.wait.min, self.wait.max
      )));
    }
    if self.checkpoint_interval == 0 {
      return Err(Error::config("checkpoint interval must be at least 1"));
    }
    if self.failure_threshold == 0 {
      return Err(Error::config("failure threshold must be at least 1"));
    }
    Ok(())
  }
}

/// The share of pending ids one execution works on.
///
/// `end` is an exclusive offset and takes precedence over `batch_size`;
/// an `end` of 0 counts as unset. With neither set, everything from `start`
/// onwards is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunWindow {
  pub start: usize,
  pub end: Option<usize>,
  pub batch_size: Option<usize>,
}

impl RunWindow {
  pub fn apply<'a>(&self, pending: &'a [String]) -> &'a [String] {
    let len = pending.len();
    let start = self.start.min(len);
    let end = match (self.end.filter(|&end| end > 0), self.batch_size) {
      (Some(end), _) => end.min(len),
      (None, Some(size)) => start.saturating_add(size).min(len),
      (None, None) => len,
    };
    if end <= start {
      &[]
    } else {
      &pending[start..end]
    }
  }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::CheckerConfig;
use crate::error::Result;
use crate::local::Checkpoint;
use crate::record::{classify_failure, CheckResult, Status};
use crate::remote::{LookupError, TranscriptLister};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
  Completed,
  /// Too many consecutive transient failures.
  CircuitBroken,
  Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
  pub processed: usize,
  pub stop_reason: StopReason,
}

/// Checks one video. Every failure is folded into the returned record.
pub fn check_video<L: TranscriptLister + ?Sized>(lister: &L, video_id: &str) -> CheckResult {
  match lister.list(video_id) {
    Ok(descriptors) => CheckResult::available(video_id, &descriptors),
    Err(LookupError::TranscriptsDisabled(_)) => CheckResult::missing(video_id, Status::Disabled),
    Err(LookupError::VideoUnavailable(_)) => CheckResult::missing(video_id, Status::Unavailable),
    Err(LookupError::Failed(message)) => {
      let status = classify_failure(&message);
      warn!(video_id, %status, error = %message, "lookup failed");
      CheckResult::missing(video_id, status)
    }
  }
}

/// Sequential availability checker: one lookup in flight, a random pause
/// between lookups, progress saved every `checkpoint_interval` records.
pub struct Checker<'a, L: TranscriptLister + ?Sized> {
  lister: &'a L,
  config: CheckerConfig,
  cancel: Option<Arc<AtomicBool>>,
  sleep: fn(Duration),
}

impl<'a, L: TranscriptLister + ?Sized> Checker<'a, L> {
  pub fn new(lister: &'a L, config: CheckerConfig) -> Self {
    Checker {
      lister,
      config,
      cancel: None,
      sleep: thread::sleep,
    }
  }

  /// Replaces the pause between lookups, `thread::sleep` by default.
  pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
    self.sleep = sleep;
    self
  }

  /// Stops the run between two videos once `flag` is raised.
  pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
    self.cancel = Some(flag);
    self
  }

  fn cancelled(&self) -> bool {
    self
      .cancel
      .as_ref()
      .map(|flag| flag.load(Ordering::SeqCst))
      .unwrap_or(false)
  }

  /// Checks `pending` in order, appending to `results` (which holds the rows
  /// of earlier runs). `results` is handed to `checkpoint` on every save and
  /// once more when the loop exits, however it exits.
  pub fn run<C: Checkpoint + ?Sized>(
    &self,
    pending: &[String],
    results: &mut Vec<CheckResult>,
    checkpoint: &mut C,
  ) -> Result<RunSummary> {
    self.config.validate()?;
    let summary = self.check_all(pending, results, checkpoint);
    checkpoint.save(results)?;
    let summary = summary?;
    info!(
      processed = summary.processed,
      total = results.len(),
      stop_reason = ?summary.stop_reason,
      "run finished"
    );
    Ok(summary)
  }

  fn check_all<C: Checkpoint + ?Sized>(
    &self,
    pending: &[String],
    results: &mut Vec<CheckResult>,
    checkpoint: &mut C,
  ) -> Result<RunSummary> {
    let prior = results.len();
    let mut processed = 0;
    let mut consecutive_failures = 0;

    for (i, video_id) in pending.iter().enumerate() {
      if self.cancelled() {
        info!(processed, "cancelled");
        return Ok(RunSummary {
          processed,
          stop_reason: StopReason::Cancelled,
        });
      }

      let result = check_video(self.lister, video_id);
      let status = result.status;
      info!(
        position = prior + processed + 1,
        video_id = video_id.as_str(),
        %status,
        languages = result.total_languages,
        "checked"
      );
      results.push(result);
      processed += 1;

      if status.is_transient() {
        consecutive_failures += 1;
        if consecutive_failures >= self.config.failure_threshold {
          warn!(consecutive_failures, "too many consecutive failures, stopping");
          return Ok(RunSummary {
            processed,
            stop_reason: StopReason::CircuitBroken,
          });
        }
      } else {
        consecutive_failures = 0;
      }

      if processed % self.config.checkpoint_interval == 0 {
        checkpoint.save(results)?;
        info!(total = results.len(), "saved progress");
      }

      if i + 1 < pending.len() && !self.config.wait.is_zero() {
        if self.cancelled() {
          info!(processed, "cancelled");
          return Ok(RunSummary {
            processed,
            stop_reason: StopReason::Cancelled,
          });
        }
        (self.sleep)(self.config.wait.sample());
      }
    }

    Ok(RunSummary {
      processed,
      stop_reason: StopReason::Completed,
    })
  }
}

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use transcript_check::checker::{Checker, StopReason};
use transcript_check::config::{
  CheckerConfig, RunWindow, WaitRange, DEFAULT_BATCH_SIZE, DEFAULT_CHECKPOINT_INTERVAL,
  DEFAULT_FAILURE_THRESHOLD, DEFAULT_ID_COLUMN, DEFAULT_INPUT_FILEPATH, DEFAULT_MAX_WAIT_SECS,
  DEFAULT_MIN_WAIT_SECS, DEFAULT_OUTPUT_FILEPATH,
};
use transcript_check::local::{filter_list_to_check, load_video_ids, ResultTable};
use transcript_check::logging;
use transcript_check::remote::YoutubeClient;
use transcript_check::stats::Stats;

/// Checks which videos have transcripts, without downloading them.
/// Safe to interrupt: a rerun resumes after the last saved video.
#[derive(Parser, Debug)]
#[command(name = "check_transcripts")]
struct Params {
  /// CSV file listing the videos to check
  #[arg(short, long, default_value = DEFAULT_INPUT_FILEPATH)]
  input: PathBuf,

  /// Column of the input file holding video ids
  #[arg(short, long, default_value = DEFAULT_ID_COLUMN)]
  column: String,

  /// Result table, extended in place across runs
  #[arg(short, long, default_value = DEFAULT_OUTPUT_FILEPATH)]
  output: PathBuf,

  /// First unchecked video to process
  #[arg(long, default_value_t = 0)]
  start: usize,

  /// Stop before this unchecked video (overrides --batch-size)
  #[arg(long)]
  end: Option<usize>,

  /// Videos to process in this run
  #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
  batch_size: usize,

  /// Process every remaining video
  #[arg(long, default_value_t = false)]
  no_batch_limit: bool,

  #[arg(long, default_value_t = DEFAULT_MIN_WAIT_SECS)]
  min_wait: f64,

  #[arg(long, default_value_t = DEFAULT_MAX_WAIT_SECS)]
  max_wait: f64,

  /// Save progress every N videos
  #[arg(long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
  save_every: usize,

  /// Stop after this many consecutive rate-limit or error results
  #[arg(long, default_value_t = DEFAULT_FAILURE_THRESHOLD)]
  max_failures: usize,
}

fn main() -> Result<()> {
  logging::init();
  let params = Params::parse();

  let config = CheckerConfig {
    wait: WaitRange::from_secs_f64(params.min_wait, params.max_wait)?,
    checkpoint_interval: params.save_every,
    failure_threshold: params.max_failures,
  };
  config.validate()?;
  let window = RunWindow {
    start: params.start,
    end: params.end,
    batch_size: if params.no_batch_limit {
      None
    } else {
      Some(params.batch_size)
    },
  };

  let all_ids = load_video_ids(&params.input, &params.column)
    .with_context(|| format!("reading {}", params.input.display()))?;
  info!(total = all_ids.len(), "videos in input");

  let mut table = ResultTable::new(&params.output);
  let mut results = table
    .load()
    .with_context(|| format!("reading {}", params.output.display()))?;
  let checked: HashSet<String> = results.iter().map(|r| r.video_id.clone()).collect();
  if !checked.is_empty() {
    info!(already_checked = checked.len(), file = %params.output.display(), "resuming");
  }

  let unchecked = filter_list_to_check(&all_ids, &checked);
  let pending = window.apply(&unchecked);
  if unchecked.is_empty() {
    info!("all videos already checked");
    return Ok(());
  }
  if pending.is_empty() {
    warn!(
      unchecked = unchecked.len(),
      start = window.start,
      "window selects no unchecked videos"
    );
    return Ok(());
  }
  info!(count = pending.len(), start = window.start, "checking batch");

  let cancel = Arc::new(AtomicBool::new(false));
  let handler_flag = Arc::clone(&cancel);
  ctrlc::set_handler(move || {
    handler_flag.store(true, Ordering::SeqCst);
  })?;

  let client = YoutubeClient::new()?;
  let summary = Checker::new(&client, config)
    .with_cancel_flag(cancel)
    .run(pending, &mut results, &mut table)?;

  match summary.stop_reason {
    StopReason::Completed => info!("batch complete"),
    StopReason::CircuitBroken => warn!(
      "stopped early after {} consecutive failures, rerun later to continue",
      params.max_failures
    ),
    StopReason::Cancelled => warn!("interrupted, progress saved"),
  }

  info!(
    this_session = summary.processed,
    total_checked = results.len(),
    total_videos = all_ids.len(),
    "summary"
  );
  eprint!("{}", Stats::from_results(&results));
  info!(file = %params.output.display(), "results saved");
  Ok(())
}

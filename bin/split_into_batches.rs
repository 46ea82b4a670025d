use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use transcript_check::batches::{split_into_batches, write_batches, ASSIGNMENTS_FILENAME};
use transcript_check::config::{DEFAULT_BATCH_SIZE, DEFAULT_ID_COLUMN, DEFAULT_INPUT_FILEPATH};
use transcript_check::local::load_video_ids;
use transcript_check::logging;

/// Splits a video list into batch files, one per execution environment.
#[derive(Parser, Debug)]
#[command(name = "split_into_batches")]
struct Params {
  #[arg(short, long, default_value = DEFAULT_INPUT_FILEPATH)]
  input: PathBuf,

  #[arg(short, long, default_value = DEFAULT_ID_COLUMN)]
  column: String,

  #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
  per_batch: usize,

  #[arg(long, default_value = ".")]
  out_dir: PathBuf,
}

fn main() -> Result<()> {
  logging::init();
  let params = Params::parse();

  let ids = load_video_ids(&params.input, &params.column)
    .with_context(|| format!("reading {}", params.input.display()))?;
  let batches = split_into_batches(&ids, params.per_batch)?;
  info!(
    total = ids.len(),
    per_batch = params.per_batch,
    batches = batches.len(),
    "splitting"
  );
  write_batches(&params.out_dir, &params.column, &batches)?;
  info!(
    file = %params.out_dir.join(ASSIGNMENTS_FILENAME).display(),
    "saved platform assignments"
  );
  eprintln!("-- run check_transcripts on each batch, name the outputs results_<n>.csv, then run merge_results");
  Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use transcript_check::logging;
use transcript_check::merge::{find_result_files, merge_files, write_outputs};
use transcript_check::stats::Stats;

/// Merges per-batch result tables into one, first occurrence of each video wins.
#[derive(Parser, Debug)]
#[command(name = "merge_results")]
struct Params {
  /// Directory holding results_*.csv, batch_*_result.csv or transcript_availability.csv
  #[arg(long, default_value = ".")]
  dir: PathBuf,

  #[arg(long, default_value = ".")]
  out_dir: PathBuf,
}

fn main() -> Result<()> {
  logging::init();
  let params = Params::parse();

  let files = find_result_files(&params.dir);
  if files.is_empty() {
    bail!(
      "no result files in {}: expected results_<n>.csv, batch_<n>_result.csv or transcript_availability.csv",
      params.dir.display()
    );
  }
  info!(count = files.len(), "found result files");

  let report = merge_files(&files)?;
  info!(unique = report.merged.len(), "merged");
  write_outputs(&params.out_dir, &report.merged)?;
  eprint!("{}", Stats::from_results(&report.merged));
  Ok(())
}

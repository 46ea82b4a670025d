use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize plain-text console logging on stderr, leaving stdout free.
///
/// Defaults to `info` so per-video progress shows up; `TRANSCRIPT_CHECK_LOG`
/// takes any `EnvFilter` directive, e.g. `transcript_check=debug`.
pub fn init() {
  let filter = EnvFilter::builder()
    .with_env_var("TRANSCRIPT_CHECK_LOG")
    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
    .from_env_lossy();

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false),
    )
    .try_init();
}

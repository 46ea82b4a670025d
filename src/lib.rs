pub mod batches;
pub mod checker;
pub mod config;
pub mod error;
pub mod local;
pub mod logging;
pub mod merge;
pub mod record;
pub mod remote;
pub mod stats;

pub use error::{Error, Result};

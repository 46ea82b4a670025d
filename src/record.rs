use std::fmt;

use serde::{Deserialize, Serialize};

use crate::remote::TranscriptDescriptor;

/// Language code behind the `has_bangla` column.
pub const PRIMARY_LANGUAGE: &str = "bn";
/// Language code behind the `has_english` column.
pub const SECONDARY_LANGUAGE: &str = "en";

/// Column names of a result table, in the order they are written.
pub const COLUMNS: [&str; 9] = [
  "video_id",
  "has_transcript",
  "has_bangla",
  "has_english",
  "total_languages",
  "manual_count",
  "auto_count",
  "languages",
  "status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
  Available,
  Disabled,
  Unavailable,
  RateLimited,
  Blocked,
  Error,
}

impl Status {
  pub const ALL: [Status; 6] = [
    Status::Available,
    Status::Disabled,
    Status::Unavailable,
    Status::RateLimited,
    Status::Blocked,
    Status::Error,
  ];

  /// Transient outcomes count towards the consecutive failure limit,
  /// definitive ones reset it.
  pub fn is_transient(self) -> bool {
    matches!(self, Status::RateLimited | Status::Blocked | Status::Error)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Status::Available => "Available",
      Status::Disabled => "Disabled",
      Status::Unavailable => "Unavailable",
      Status::RateLimited => "RateLimited",
      Status::Blocked => "Blocked",
      Status::Error => "Error",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Maps the text of an unstructured lookup failure to a status.
///
/// The signatures follow the service's current error phrasing and need to be
/// revalidated against real failures whenever the service changes.
pub fn classify_failure(message: &str) -> Status {
  if message.contains("429") || message.contains("Too Many Requests") {
    Status::RateLimited
  } else if message.contains("Could not retrieve") {
    Status::Blocked
  } else {
    Status::Error
  }
}

/// One row of the result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
  pub video_id: String,
  #[serde(with = "pandas_bool")]
  pub has_transcript: bool,
  #[serde(with = "pandas_bool")]
  pub has_bangla: bool,
  #[serde(with = "pandas_bool")]
  pub has_english: bool,
  pub total_languages: usize,
  pub manual_count: usize,
  pub auto_count: usize,
  pub languages: String,
  pub status: Status,
}

impl CheckResult {
  pub fn available(video_id: &str, descriptors: &[TranscriptDescriptor]) -> Self {
    let auto_count = descriptors.iter().filter(|d| d.is_generated).count();
    let languages: Vec<&str> = descriptors
      .iter()
      .map(|d| d.language_code.as_str())
      .collect();
    CheckResult {
      video_id: video_id.to_owned(),
      has_transcript: !descriptors.is_empty(),
      has_bangla: languages.contains(&PRIMARY_LANGUAGE),
      has_english: languages.contains(&SECONDARY_LANGUAGE),
      total_languages: descriptors.len(),
      manual_count: descriptors.len() - auto_count,
      auto_count,
      languages: languages.join(","),
      status: Status::Available,
    }
  }

  /// A record with every availability field zeroed.
  pub fn missing(video_id: &str, status: Status) -> Self {
    CheckResult {
      video_id: video_id.to_owned(),
      has_transcript: false,
      has_bangla: false,
      has_english: false,
      total_languages: 0,
      manual_count: 0,
      auto_count: 0,
      languages: String::new(),
      status,
    }
  }
}

// Tables written by earlier runs spell booleans the pandas way.
mod pandas_bool {
  use serde::de::Error;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
      "True" | "true" | "TRUE" | "1" | "1.0" => Ok(true),
      "False" | "false" | "FALSE" | "0" | "0.0" => Ok(false),
      other => Err(D::Error::custom(format!("not a boolean: {:?}", other))),
    }
  }
}

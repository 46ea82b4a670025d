use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::error::Result;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

lazy_static! {
  static ref API_KEY_REGEX: Regex =
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap();
}

/// One transcript variant offered for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptDescriptor {
  pub language_code: String,
  pub is_generated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
  #[error("Could not retrieve a transcript for the video {0}! Subtitles are disabled for this video")]
  TranscriptsDisabled(String),

  #[error("Could not retrieve a transcript for the video {0}! The video is no longer available")]
  VideoUnavailable(String),

  #[error("{0}")]
  Failed(String),
}

/// Lists the transcripts available for a video without fetching them.
pub trait TranscriptLister {
  fn list(&self, video_id: &str) -> std::result::Result<Vec<TranscriptDescriptor>, LookupError>;
}

/// Talks to the same innertube endpoints the YouTube web player uses.
pub struct YoutubeClient {
  client: Client,
}

#[derive(Deserialize)]
struct PlayerResponse {
  #[serde(rename = "playabilityStatus")]
  playability_status: Option<PlayabilityStatus>,
  captions: Option<Captions>,
}

#[derive(Deserialize)]
struct PlayabilityStatus {
  status: Option<String>,
  reason: Option<String>,
}

#[derive(Deserialize)]
struct Captions {
  #[serde(rename = "playerCaptionsTracklistRenderer")]
  tracklist: Option<Tracklist>,
}

#[derive(Deserialize)]
struct Tracklist {
  #[serde(rename = "captionTracks")]
  caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Deserialize)]
struct CaptionTrack {
  #[serde(rename = "languageCode")]
  language_code: String,
  kind: Option<String>,
}

impl YoutubeClient {
  pub fn new() -> Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(YoutubeClient { client })
  }

  fn fetch_api_key(&self, video_id: &str) -> std::result::Result<String, LookupError> {
    let url = format!("{}{}", WATCH_URL, video_id);
    let resp = self
      .client
      .get(&url)
      .header(header::ACCEPT_LANGUAGE, "en-US")
      .header(header::COOKIE, "CONSENT=YES+cb")
      .send()
      .map_err(|e| LookupError::Failed(e.to_string()))?;
    check_status(resp.status(), WATCH_URL, video_id)?;
    let html = resp
      .text()
      .map_err(|e| LookupError::Failed(e.to_string()))?;
    extract_api_key(&html, video_id)
  }

  fn fetch_player(
    &self,
    video_id: &str,
    api_key: &str,
  ) -> std::result::Result<PlayerResponse, LookupError> {
    let url = format!("{}?key={}", PLAYER_URL, api_key);
    let body = json!({
      "context": { "client": { "clientName": "ANDROID", "clientVersion": "20.10.38" } },
      "videoId": video_id,
    });
    let resp = self
      .client
      .post(&url)
      .header(header::ACCEPT_LANGUAGE, "en-US")
      .json(&body)
      .send()
      .map_err(|e| LookupError::Failed(e.to_string()))?;
    check_status(resp.status(), PLAYER_URL, video_id)?;
    resp
      .json::<PlayerResponse>()
      .map_err(|e| LookupError::Failed(format!("malformed player response: {}", e)))
  }
}

impl TranscriptLister for YoutubeClient {
  fn list(&self, video_id: &str) -> std::result::Result<Vec<TranscriptDescriptor>, LookupError> {
    let api_key = self.fetch_api_key(video_id)?;
    let player = self.fetch_player(video_id, &api_key)?;
    descriptors_from_player(video_id, player)
  }
}

fn could_not_retrieve(video_id: &str, cause: &str) -> LookupError {
  LookupError::Failed(format!(
    "Could not retrieve a transcript for the video {}{}! {}",
    WATCH_URL, video_id, cause
  ))
}

fn check_status(
  status: StatusCode,
  url: &str,
  video_id: &str,
) -> std::result::Result<(), LookupError> {
  if status == StatusCode::TOO_MANY_REQUESTS {
    Err(LookupError::Failed(format!(
      "429 Too Many Requests for url {}",
      url
    )))
  } else if !status.is_success() {
    Err(could_not_retrieve(
      video_id,
      &format!("Request to YouTube failed: HTTP {} for url {}", status, url),
    ))
  } else {
    Ok(())
  }
}

fn extract_api_key(html: &str, video_id: &str) -> std::result::Result<String, LookupError> {
  if let Some(cap) = API_KEY_REGEX.captures(html) {
    return Ok(cap[1].to_owned());
  }
  if html.contains("class=\"g-recaptcha\"") {
    Err(could_not_retrieve(
      video_id,
      "YouTube is blocking requests from your IP",
    ))
  } else {
    Err(could_not_retrieve(video_id, "The watch page could not be parsed"))
  }
}

fn descriptors_from_player(
  video_id: &str,
  player: PlayerResponse,
) -> std::result::Result<Vec<TranscriptDescriptor>, LookupError> {
  if let Some(playability) = player.playability_status {
    let status = playability.status.unwrap_or_default();
    let reason = playability.reason.unwrap_or_default();
    if status != "OK" && !status.is_empty() {
      if status == "ERROR" && reason == "This video is unavailable" {
        return Err(LookupError::VideoUnavailable(video_id.to_owned()));
      }
      if status == "LOGIN_REQUIRED" && reason.starts_with("Sign in to confirm you") {
        return Err(could_not_retrieve(
          video_id,
          "YouTube is blocking requests from your IP",
        ));
      }
      return Err(could_not_retrieve(
        video_id,
        &format!("The video is unplayable ({}: {})", status, reason),
      ));
    }
  }

  let tracks = player
    .captions
    .and_then(|c| c.tracklist)
    .and_then(|t| t.caption_tracks)
    .ok_or_else(|| LookupError::TranscriptsDisabled(video_id.to_owned()))?;

  Ok(
    tracks
      .into_iter()
      .map(|track| TranscriptDescriptor {
        is_generated: track.kind.as_deref() == Some("asr"),
        language_code: track.language_code,
      })
      .collect(),
  )
}

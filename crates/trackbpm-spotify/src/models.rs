// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{LookupError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An artist/title pair to look up.
///
/// Both fields are trimmed and guaranteed non-empty. Deserialization goes through
/// [`TrackQuery::new`], so a decoded query is validated too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTrackQuery")]
pub struct TrackQuery {
    artist: String,
    title: String,
}

#[derive(Deserialize)]
struct RawTrackQuery {
    artist: String,
    title: String,
}

impl TryFrom<RawTrackQuery> for TrackQuery {
    type Error = LookupError;

    fn try_from(raw: RawTrackQuery) -> Result<Self> {
        Self::new(raw.artist, raw.title)
    }
}

impl TrackQuery {
    /// Build a query, rejecting blank artist or title.
    pub fn new(artist: impl AsRef<str>, title: impl AsRef<str>) -> Result<Self> {
        let artist = artist.as_ref().trim();
        let title = title.as_ref().trim();

        if artist.is_empty() {
            return Err(LookupError::Validation("artist is required".to_string()));
        }
        if title.is_empty() {
            return Err(LookupError::Validation("title is required".to_string()));
        }

        Ok(Self {
            artist: artist.to_string(),
            title: title.to_string(),
        })
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parse free-text search input of the form `"artist - title"`.
    ///
    /// The first `-` separated segment is the artist; the remaining segments are
    /// joined with a single space to form the title.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.split('-').map(str::trim);
        let artist = parts.next().unwrap_or_default();
        let title = parts.filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");
        Self::new(artist, title)
    }

    /// Lowercased `(artist, title)` used for case-insensitive matching.
    pub fn matching_key(&self) -> (String, String) {
        (self.artist.to_lowercase(), self.title.to_lowercase())
    }

    /// Field-qualified search expression understood by the search endpoint.
    pub fn search_expression(&self) -> String {
        format!("track:{} artist:{}", self.title, self.artist)
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Tempo, key and duration for a single track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Tempo rounded to whole beats per minute.
    pub bpm: u32,
    /// Human-readable key, e.g. "C# major", or "N/A" when unknown.
    pub key: String,
    /// Duration as `m:ss`.
    pub duration: String,
}

/// How the client behaves when the provider cannot answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Missing credentials and unmatched tracks are errors.
    #[default]
    Strict,
    /// Missing credentials and unmatched tracks yield demo data.
    Demo,
}

/// Client-credentials grant response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Search endpoint response; only the track page is requested.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackSearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackPage {
    #[serde(default)]
    pub items: Vec<TrackItem>,
}

/// Track object as returned by search.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArtistRef {
    pub name: String,
}

/// Audio features for a track.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AudioFeatures {
    pub tempo: f64,
    /// Pitch class 0..11, or -1 when no key was detected.
    pub key: i32,
    /// 1 = major, 0 = minor.
    pub mode: i32,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

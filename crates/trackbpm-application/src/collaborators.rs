// SPDX-License-Identifier: GPL-3.0-or-later

//! Album art and description providers consumed by song analysis.

use anyhow::Result;
use async_trait::async_trait;
use trackbpm_spotify::notation::UNKNOWN_KEY;
use trackbpm_spotify::TrackMetadata;
use url::form_urlencoded;

const PLACEHOLDER_ART_BASE: &str = "https://placehold.co/400x400.png";

/// Produces an album art image URL for a song.
#[async_trait]
pub trait AlbumArtGenerator: Send + Sync {
    async fn generate_album_art(&self, artist: &str, title: &str) -> Result<String>;
}

/// Produces a short prose description of a song.
#[async_trait]
pub trait SongDescriptionGenerator: Send + Sync {
    async fn describe(&self, artist: &str, title: &str, metadata: &TrackMetadata)
        -> Result<String>;
}

/// Placeholder image URL labelled with the song title.
pub fn placeholder_art_url(artist: &str, title: &str) -> String {
    let text = format!("{}\n{}", title, artist);
    let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
    format!("{}?text={}", PLACEHOLDER_ART_BASE, encoded)
}

/// Album art backed by a static placeholder image service.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAlbumArt;

#[async_trait]
impl AlbumArtGenerator for PlaceholderAlbumArt {
    async fn generate_album_art(&self, artist: &str, title: &str) -> Result<String> {
        Ok(placeholder_art_url(artist, title))
    }
}

/// Descriptions assembled from the looked-up metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateDescriber;

#[async_trait]
impl SongDescriptionGenerator for TemplateDescriber {
    async fn describe(
        &self,
        artist: &str,
        title: &str,
        metadata: &TrackMetadata,
    ) -> Result<String> {
        let feel = match metadata.bpm {
            0..=89 => "laid-back",
            90..=119 => "mid-tempo",
            _ => "up-tempo",
        };

        let mut description = format!(
            "\"{}\" by {} is a {} track at {} BPM",
            title, artist, feel, metadata.bpm
        );
        if metadata.key != UNKNOWN_KEY {
            description.push_str(&format!(" in {}", metadata.key));
        }
        description.push_str(&format!(", running {}.", metadata.duration));
        Ok(description)
    }
}

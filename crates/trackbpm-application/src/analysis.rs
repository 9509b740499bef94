// SPDX-License-Identifier: GPL-3.0-or-later

//! Song analysis: metadata lookup combined with album art and an optional description.
//!
//! Only the metadata lookup can fail an analysis. Album art falls back to a
//! placeholder image and a failed description is simply left out.

use crate::batch::{backend_ready, keep_successes, settle};
use crate::collaborators::{placeholder_art_url, AlbumArtGenerator, SongDescriptionGenerator};
use crate::lookup::TrackLookup;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};
use trackbpm_config::TrendingSong;
use trackbpm_spotify::{LookupError, TrackQuery};

/// Everything shown for one song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAnalysis {
    pub bpm: u32,
    pub key: String,
    pub duration: String,
    pub title: String,
    pub artist: String,
    pub album_art: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct SongAnalysisService {
    lookup: Arc<dyn TrackLookup>,
    album_art: Arc<dyn AlbumArtGenerator>,
    describer: Arc<dyn SongDescriptionGenerator>,
}

impl SongAnalysisService {
    pub fn new(
        lookup: Arc<dyn TrackLookup>,
        album_art: Arc<dyn AlbumArtGenerator>,
        describer: Arc<dyn SongDescriptionGenerator>,
    ) -> Self {
        Self {
            lookup,
            album_art,
            describer,
        }
    }

    /// Analyse a single song. Lookup errors are returned unchanged.
    #[instrument(skip(self, query), fields(artist = %query.artist(), title = %query.title()))]
    pub async fn analyze(
        &self,
        query: &TrackQuery,
        include_description: bool,
    ) -> Result<SongAnalysis, LookupError> {
        let metadata = self.lookup.lookup(query).await?;

        let album_art = match self
            .album_art
            .generate_album_art(query.artist(), query.title())
            .await
        {
            Ok(url) => url,
            Err(error) => {
                warn!(target: "analysis", %error, "album art generation failed, using placeholder");
                placeholder_art_url(query.artist(), query.title())
            }
        };

        let description = if include_description {
            match self
                .describer
                .describe(query.artist(), query.title(), &metadata)
                .await
            {
                Ok(text) => Some(text),
                Err(error) => {
                    warn!(target: "analysis", %error, "description generation failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(SongAnalysis {
            bpm: metadata.bpm,
            key: metadata.key,
            duration: metadata.duration,
            title: query.title().to_string(),
            artist: query.artist().to_string(),
            album_art,
            description,
        })
    }

    /// Analyse several songs concurrently, keeping only the ones that succeed.
    ///
    /// Follows the same settle-then-filter path as [`crate::BatchOrchestrator::lookup_many`].
    pub async fn analyze_many(&self, queries: &[TrackQuery]) -> Vec<SongAnalysis> {
        if !backend_ready(self.lookup.as_ref(), "analyze") {
            return Vec::new();
        }

        let outcomes = settle(queries, |query| self.analyze(query, false)).await;
        keep_successes("analyze", outcomes)
    }

    /// Analyse the configured trending list. Entries with a blank artist or title are skipped.
    pub async fn trending(&self, songs: &[TrendingSong]) -> Vec<SongAnalysis> {
        let queries: Vec<TrackQuery> = songs
            .iter()
            .filter_map(|song| match TrackQuery::new(&song.artist, &song.title) {
                Ok(query) => Some(query),
                Err(error) => {
                    warn!(target: "analysis", artist = %song.artist, title = %song.title, %error, "invalid trending entry");
                    None
                }
            })
            .collect();

        self.analyze_many(&queries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::{queries, FakeLookup};
    use crate::collaborators::{PlaceholderAlbumArt, TemplateDescriber};
    use async_trait::async_trait;
    use trackbpm_spotify::TrackMetadata;

    struct BrokenArt;

    #[async_trait]
    impl AlbumArtGenerator for BrokenArt {
        async fn generate_album_art(&self, _artist: &str, _title: &str) -> anyhow::Result<String> {
            anyhow::bail!("image model unavailable")
        }
    }

    struct BrokenDescriber;

    #[async_trait]
    impl SongDescriptionGenerator for BrokenDescriber {
        async fn describe(
            &self,
            _artist: &str,
            _title: &str,
            _metadata: &TrackMetadata,
        ) -> anyhow::Result<String> {
            anyhow::bail!("text model unavailable")
        }
    }

    fn service(lookup: FakeLookup) -> SongAnalysisService {
        SongAnalysisService::new(
            Arc::new(lookup),
            Arc::new(PlaceholderAlbumArt),
            Arc::new(TemplateDescriber),
        )
    }

    fn not_found() -> LookupError {
        LookupError::NotFound {
            artist: "Artist".to_string(),
            title: "missing".to_string(),
        }
    }

    #[tokio::test]
    async fn test_analyze_composes_metadata_and_art() {
        let query = TrackQuery::new("Hozier", "Too Sweet").unwrap();
        let analysis = service(FakeLookup::default())
            .analyze(&query, false)
            .await
            .unwrap();

        assert_eq!(analysis.artist, "Hozier");
        assert_eq!(analysis.title, "Too Sweet");
        assert_eq!(analysis.bpm, 109);
        assert!(analysis.album_art.starts_with("https://placehold.co/"));
        assert!(analysis.description.is_none());
    }

    #[tokio::test]
    async fn test_analyze_with_description() {
        let query = TrackQuery::new("Hozier", "Too Sweet").unwrap();
        let analysis = service(FakeLookup::default())
            .analyze(&query, true)
            .await
            .unwrap();

        let description = analysis.description.unwrap();
        assert!(description.contains("Too Sweet"));
        assert!(description.contains("A minor"));
    }

    #[tokio::test]
    async fn test_collaborator_failures_degrade_gracefully() {
        let service = SongAnalysisService::new(
            Arc::new(FakeLookup::default()),
            Arc::new(BrokenArt),
            Arc::new(BrokenDescriber),
        );
        let query = TrackQuery::new("Hozier", "Too Sweet").unwrap();

        let analysis = service.analyze(&query, true).await.unwrap();

        assert_eq!(analysis.album_art, placeholder_art_url("Hozier", "Too Sweet"));
        assert!(analysis.description.is_none());
    }

    #[tokio::test]
    async fn test_analyze_propagates_lookup_errors() {
        let query = TrackQuery::new("Artist", "missing").unwrap();
        let err = service(FakeLookup::default().failing("missing", not_found))
            .analyze(&query, false)
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_analyze_many_skips_failures_in_order() {
        let results = service(FakeLookup::default().failing("missing", not_found))
            .analyze_many(&queries(&["first", "missing", "third"]))
            .await;

        let titles: Vec<&str> = results.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn test_trending_skips_blank_entries() {
        let songs = vec![
            TrendingSong {
                artist: "Hozier".to_string(),
                title: "Too Sweet".to_string(),
            },
            TrendingSong {
                artist: " ".to_string(),
                title: "Nameless".to_string(),
            },
        ];

        let results = service(FakeLookup::default()).trending(&songs).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].artist, "Hozier");
    }

    #[tokio::test]
    async fn test_trending_unconfigured_is_empty() {
        let lookup = FakeLookup {
            unconfigured: true,
            ..FakeLookup::default()
        };
        let songs = vec![TrendingSong {
            artist: "Hozier".to_string(),
            title: "Too Sweet".to_string(),
        }];

        assert!(service(lookup).trending(&songs).await.is_empty());
    }

    #[test]
    fn test_analysis_serializes_camel_case() {
        let analysis = SongAnalysis {
            bpm: 120,
            key: "G# minor".to_string(),
            duration: "2:55".to_string(),
            title: "Espresso".to_string(),
            artist: "Sabrina Carpenter".to_string(),
            album_art: "https://placehold.co/400x400.png".to_string(),
            description: None,
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["albumArt"], "https://placehold.co/400x400.png");
        assert!(json.get("description").is_none());
    }
}

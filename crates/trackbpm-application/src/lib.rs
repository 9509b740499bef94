// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;
use std::time::Duration;

use trackbpm_config::{AppConfig, SpotifyConfig};
use trackbpm_spotify::{Credentials, LookupError, LookupMode, SpotifyClient};

pub mod analysis;
pub mod batch;
pub mod collaborators;
pub mod lookup;

pub use analysis::{SongAnalysis, SongAnalysisService};
pub use batch::{BatchOrchestrator, LookupOutcome};
pub use collaborators::{
    AlbumArtGenerator, PlaceholderAlbumArt, SongDescriptionGenerator, TemplateDescriber,
};
pub use lookup::TrackLookup;

use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub spotify: Arc<SpotifyClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, LookupError> {
        let spotify = Arc::new(spotify_client(&config.spotify)?);
        Ok(Self { config, spotify })
    }

    pub fn on_start(&self) {
        info!(
            target: "application",
            spotify_configured = self.spotify.is_configured(),
            mode = ?self.spotify.mode(),
            "application state initialized"
        );
    }

    pub fn orchestrator(&self) -> BatchOrchestrator {
        BatchOrchestrator::new(self.spotify.clone())
    }

    /// Analysis service wired with the placeholder art and template description providers.
    pub fn analysis(&self) -> SongAnalysisService {
        SongAnalysisService::new(
            self.spotify.clone(),
            Arc::new(PlaceholderAlbumArt),
            Arc::new(TemplateDescriber),
        )
    }
}

/// Build the Spotify client described by `config`.
pub fn spotify_client(config: &SpotifyConfig) -> Result<SpotifyClient, LookupError> {
    let credentials = config.client_id().map(|id| {
        let credentials = Credentials::new(id);
        match config.client_secret() {
            Some(secret) => credentials.with_secret(secret),
            None => credentials,
        }
    });

    let mode = if config.demo_mode {
        LookupMode::Demo
    } else {
        LookupMode::Strict
    };

    SpotifyClient::builder()
        .credentials(credentials)
        .mode(mode)
        .api_base_url(&config.api_base_url)
        .accounts_base_url(&config.accounts_base_url)
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .build()
}

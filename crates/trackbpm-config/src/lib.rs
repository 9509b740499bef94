// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub timeout_secs: u64,
    /// Serve demo data instead of failing when unconfigured or unmatched.
    pub demo_mode: bool,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: "https://api.spotify.com/v1".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            timeout_secs: 5,
            demo_mode: false,
        }
    }
}

impl SpotifyConfig {
    /// Client id, treating blank values as absent.
    pub fn client_id(&self) -> Option<&str> {
        non_blank(self.client_id.as_deref())
    }

    /// Client secret, treating blank values as absent.
    pub fn client_secret(&self) -> Option<&str> {
        non_blank(self.client_secret.as_deref())
    }

    /// Only the client id is required; the secret is optional.
    pub fn is_configured(&self) -> bool {
        self.client_id().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingSong {
    pub artist: String,
    pub title: String,
}

impl TrendingSong {
    fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    pub songs: Vec<TrendingSong>,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            songs: vec![
                TrendingSong::new("Sabrina Carpenter", "Espresso"),
                TrendingSong::new("Post Malone", "I Had Some Help"),
                TrendingSong::new("Kendrick Lamar", "Not Like Us"),
                TrendingSong::new("Tommy Richman", "Million Dollar Baby"),
                TrendingSong::new("Shaboozey", "A Bar Song (Tipsy)"),
                TrendingSong::new("Billie Eilish", "Birds of a Feather"),
                TrendingSong::new("Hozier", "Too Sweet"),
                TrendingSong::new("Taylor Swift", "Fortnight"),
                TrendingSong::new("Benson Boone", "Beautiful Things"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub telemetry: TelemetryConfig,
    pub trending: TrendingConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides.
///
/// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` are honoured, but `TRACKBPM_`
/// prefixed variables (nested with `__`) take precedence.
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment
        .merge(
            Env::raw()
                .only(&["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET"])
                .map(|key| {
                    key.as_str()
                        .to_ascii_lowercase()
                        .replacen("spotify_", "spotify.", 1)
                        .into()
                }),
        )
        .merge(Env::prefixed("TRACKBPM_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(
        target: "config",
        spotify_configured = config.spotify.is_configured(),
        demo_mode = config.spotify.demo_mode,
        trending = config.trending.songs.len(),
        "configuration loaded"
    );
    Ok(config)
}

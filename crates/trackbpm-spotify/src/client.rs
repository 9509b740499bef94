// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{LookupError, Result};
use crate::fallback::DemoCatalog;
use crate::models::{
    AudioFeatures, LookupMode, TokenResponse, TrackItem, TrackMetadata, TrackQuery,
    TrackSearchResponse,
};
use crate::notation::{format_duration, format_key};
use crate::token::{AccessToken, TokenStore};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace, warn};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("TrackBPM/", env!("CARGO_PKG_VERSION"));

/// Client-credentials pair for the provider. The secret is optional; without it the
/// client id is sent in the token request body.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
        }
    }

    pub fn with_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Blank ids count as unconfigured; blank secrets are dropped.
    fn normalized(self) -> Option<Self> {
        let client_id = self.client_id.trim().to_string();
        if client_id.is_empty() {
            return None;
        }
        let client_secret = self
            .client_secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Spotify metadata client: resolves an artist/title to tempo, key and duration.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    api_base_url: Url,
    accounts_base_url: String,
    credentials: Option<Credentials>,
    mode: LookupMode,
    tokens: TokenStore,
    catalog: Arc<DemoCatalog>,
}

impl SpotifyClient {
    /// Create a strict-mode client with default endpoints.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder().credentials(credentials).build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> SpotifyClientBuilder {
        SpotifyClientBuilder::default()
    }

    /// Whether a client id is available.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    /// Handle to the token cache used by this client.
    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Look up tempo, key and duration for `artist` / `title`.
    ///
    /// # Example
    /// ```no_run
    /// # use trackbpm_spotify::{Credentials, SpotifyClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = SpotifyClient::new(Credentials::new("client-id").with_secret("secret"))?;
    /// let metadata = client.lookup("Hozier", "Too Sweet").await?;
    /// println!("{} BPM in {}", metadata.bpm, metadata.key);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn lookup(&self, artist: &str, title: &str) -> Result<TrackMetadata> {
        let query = TrackQuery::new(artist, title)?;
        self.lookup_query(&query).await
    }

    /// Look up an already validated query.
    #[instrument(skip(self, query), fields(artist = %query.artist(), title = %query.title()))]
    pub async fn lookup_query(&self, query: &TrackQuery) -> Result<TrackMetadata> {
        let Some(credentials) = self.credentials.as_ref() else {
            return match self.mode {
                LookupMode::Strict => Err(LookupError::NotConfigured),
                LookupMode::Demo => {
                    debug!(target: "spotify", "no credentials configured, serving demo data");
                    Ok(self.catalog.resolve(query))
                }
            };
        };

        let token = self.access_token(credentials).await?;

        let Some(track) = self.search_track(&token, query).await? else {
            return match self.mode {
                LookupMode::Strict => Err(LookupError::NotFound {
                    artist: query.artist().to_string(),
                    title: query.title().to_string(),
                }),
                LookupMode::Demo => {
                    warn!(target: "spotify", "no match upstream, falling back to demo data");
                    Ok(self.catalog.resolve(query))
                }
            };
        };

        debug!(
            target: "spotify",
            track_id = %track.id,
            name = %track.name,
            artists = ?track.artists.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            "resolved track"
        );

        let features = self.audio_features(&token, &track.id).await?;
        translate(&track, &features)
    }

    /// Return a usable access token, exchanging credentials when the cache is stale.
    ///
    /// The store stays locked during the exchange so concurrent lookups share it.
    async fn access_token(&self, credentials: &Credentials) -> Result<String> {
        let mut guard = self.tokens.lock().await;
        if let Some(token) = guard.fresh(Instant::now()) {
            trace!(target: "spotify", "reusing cached access token");
            return Ok(token);
        }

        let token = self.request_token(credentials).await?;
        let value = token.value().to_string();
        guard.store(token);
        Ok(value)
    }

    async fn request_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        let url = format!("{}/api/token", self.accounts_base_url.trim_end_matches('/'));
        debug!(target: "spotify", "requesting access token");

        let mut form = vec![("grant_type", "client_credentials")];
        let mut request = self.client.post(&url);
        match credentials.client_secret.as_deref() {
            Some(secret) => request = request.basic_auth(&credentials.client_id, Some(secret)),
            None => form.push(("client_id", credentials.client_id.as_str())),
        }

        let response = request
            .form(&form)
            .send()
            .await
            .map_err(|e| LookupError::Authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LookupError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, message
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            LookupError::Authentication(format!("malformed token response: {}", e))
        })?;

        debug!(target: "spotify", expires_in = body.expires_in, "access token issued");
        Ok(AccessToken::issued(
            body.access_token,
            Duration::from_secs(body.expires_in),
            Instant::now(),
        ))
    }

    async fn search_track(&self, token: &str, query: &TrackQuery) -> Result<Option<TrackItem>> {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut()
            .append_pair("q", &query.search_expression())
            .append_pair("type", "track")
            .append_pair("limit", "1");

        let response: TrackSearchResponse = self.get(token, url).await?;
        Ok(response.tracks.items.into_iter().next())
    }

    async fn audio_features(&self, token: &str, track_id: &str) -> Result<AudioFeatures> {
        let url = self.endpoint(&["audio-features", track_id]);
        self.get(token, url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();
        // build() rejects base URLs that cannot carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Authenticated GET returning a decoded JSON body.
    async fn get<T: DeserializeOwned>(&self, token: &str, url: Url) -> Result<T> {
        trace!(target: "spotify", "GET {}", url);

        let response = self.client.get(url.as_str()).bearer_auth(token).send().await?;

        let status = response.status();
        debug!(target: "spotify", "response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            if self.tokens.invalidate(token).await {
                debug!(target: "spotify", "dropped rejected access token");
            }
            return Err(LookupError::Authentication(
                "access token was rejected".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "spotify", "response body: {}", body);

        serde_json::from_str(&body).map_err(|e| {
            LookupError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }
}

fn translate(track: &TrackItem, features: &AudioFeatures) -> Result<TrackMetadata> {
    let bpm = if features.tempo.is_finite() {
        features.tempo.round()
    } else {
        0.0
    };
    if bpm < 1.0 {
        return Err(LookupError::InvalidResponse(format!(
            "track {} has no usable tempo ({})",
            track.id, features.tempo
        )));
    }

    let duration_ms = features
        .duration_ms
        .or(track.duration_ms)
        .ok_or_else(|| {
            LookupError::InvalidResponse(format!("track {} has no duration", track.id))
        })?;

    Ok(TrackMetadata {
        bpm: bpm as u32,
        key: format_key(features.key, features.mode),
        duration: format_duration(duration_ms),
    })
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    api_base_url: String,
    accounts_base_url: String,
    timeout: Duration,
    credentials: Option<Credentials>,
    mode: LookupMode,
    token_store: Option<TokenStore>,
    catalog: Option<DemoCatalog>,
}

impl Default for SpotifyClientBuilder {
    fn default() -> Self {
        Self {
            api_base_url: SPOTIFY_API_BASE.to_string(),
            accounts_base_url: SPOTIFY_ACCOUNTS_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials: None,
            mode: LookupMode::Strict,
            token_store: None,
            catalog: None,
        }
    }
}

impl SpotifyClientBuilder {
    /// Set provider credentials. `None` leaves the client unconfigured.
    pub fn credentials(mut self, credentials: impl Into<Option<Credentials>>) -> Self {
        self.credentials = credentials.into();
        self
    }

    pub fn mode(mut self, mode: LookupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set a custom Web API base URL (useful for testing with mock servers).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set a custom accounts (token endpoint) base URL.
    pub fn accounts_base_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share an existing token cache instead of creating a fresh one.
    pub fn token_store(mut self, store: TokenStore) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Replace the built-in demo catalog.
    pub fn catalog(mut self, catalog: DemoCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<SpotifyClient> {
        let api_base_url = parse_base_url(&self.api_base_url)?;
        parse_base_url(&self.accounts_base_url)?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SpotifyClient {
            client,
            api_base_url,
            accounts_base_url: self.accounts_base_url,
            credentials: self.credentials.and_then(Credentials::normalized),
            mode: self.mode,
            tokens: self.token_store.unwrap_or_default(),
            catalog: Arc::new(self.catalog.unwrap_or_else(DemoCatalog::builtin)),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| LookupError::Configuration(format!("invalid base URL {:?}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(LookupError::Configuration(format!(
            "base URL {:?} cannot carry a path",
            raw
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(tempo: f64, key: i32, mode: i32, duration_ms: Option<u64>) -> AudioFeatures {
        AudioFeatures {
            tempo,
            key,
            mode,
            duration_ms,
        }
    }

    fn track(duration_ms: Option<u64>) -> TrackItem {
        TrackItem {
            id: "track-1".to_string(),
            name: "Espresso".to_string(),
            artists: Vec::new(),
            duration_ms,
        }
    }

    #[test]
    fn test_translate_rounds_tempo() {
        let metadata = translate(&track(None), &features(119.6, 8, 0, Some(175_000))).unwrap();
        assert_eq!(metadata.bpm, 120);
        assert_eq!(metadata.key, "G# minor");
        assert_eq!(metadata.duration, "2:55");
    }

    #[test]
    fn test_translate_falls_back_to_track_duration() {
        let metadata = translate(&track(Some(75_000)), &features(90.0, -1, 1, None)).unwrap();
        assert_eq!(metadata.key, "N/A");
        assert_eq!(metadata.duration, "1:15");
    }

    #[test]
    fn test_translate_rejects_zero_tempo() {
        let err = translate(&track(None), &features(0.0, 0, 1, Some(1_000))).unwrap_err();
        assert!(err.is_provider());
    }

    #[test]
    fn test_translate_requires_a_duration() {
        let err = translate(&track(None), &features(100.0, 0, 1, None)).unwrap_err();
        assert!(matches!(err, LookupError::InvalidResponse(_)));
    }

    #[test]
    fn test_blank_credentials_leave_client_unconfigured() {
        let client = SpotifyClient::builder()
            .credentials(Credentials::new("   ").with_secret("secret"))
            .build()
            .unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_malformed_base_url_fails_at_build_time() {
        let err = SpotifyClient::builder()
            .api_base_url("not a url")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);

        let err = SpotifyClient::builder()
            .accounts_base_url("mailto:someone@example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, LookupError::Configuration(_)));
    }

    #[test]
    fn test_endpoint_appends_segments_to_base_path() {
        let client = SpotifyClient::builder()
            .api_base_url("http://localhost:9000/v1/")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint(&["audio-features", "abc"]).as_str(),
            "http://localhost:9000/v1/audio-features/abc"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let rendered = format!("{:?}", Credentials::new("id").with_secret("hunter2"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }
}

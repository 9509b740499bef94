// SPDX-License-Identifier: GPL-3.0-or-later

use async_trait::async_trait;
use trackbpm_spotify::{LookupError, SpotifyClient, TrackMetadata, TrackQuery};

/// Source of track metadata used by the batch and analysis services.
#[async_trait]
pub trait TrackLookup: Send + Sync {
    async fn lookup(&self, query: &TrackQuery) -> Result<TrackMetadata, LookupError>;

    /// False when the backend has no credentials; batch callers skip work entirely.
    fn is_configured(&self) -> bool;
}

#[async_trait]
impl TrackLookup for SpotifyClient {
    async fn lookup(&self, query: &TrackQuery) -> Result<TrackMetadata, LookupError> {
        self.lookup_query(query).await
    }

    fn is_configured(&self) -> bool {
        SpotifyClient::is_configured(self)
    }
}

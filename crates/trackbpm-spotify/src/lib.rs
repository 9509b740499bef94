// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify metadata client for tempo, key and duration lookups.
//!
//! The client authenticates with the client-credentials grant, caches the access
//! token in an injectable [`TokenStore`], resolves an artist/title pair through the
//! search endpoint and reads the track's audio features. In [`LookupMode::Demo`] it
//! answers from a small built-in catalog or synthetic data instead of failing when
//! credentials are missing or nothing matches.

pub mod client;
pub mod error;
pub mod fallback;
pub mod models;
pub mod notation;
pub mod token;

pub use client::{Credentials, SpotifyClient, SpotifyClientBuilder};
pub use error::{ErrorKind, LookupError, Result};
pub use fallback::DemoCatalog;
pub use models::{LookupMode, TrackMetadata, TrackQuery};
pub use notation::{format_duration, format_key};
pub use token::{AccessToken, TokenStore};

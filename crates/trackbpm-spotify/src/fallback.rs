// SPDX-License-Identifier: GPL-3.0-or-later

//! Demo data used when the provider is not configured or has no match.

use crate::models::{TrackMetadata, TrackQuery};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Keys the synthetic generator chooses from.
pub const FALLBACK_KEYS: [&str; 4] = ["C major", "G major", "A minor", "F major"];

/// Inclusive BPM range of synthetic results.
pub const FALLBACK_BPM_RANGE: std::ops::RangeInclusive<u32> = 80..=160;

// (artist, title, bpm, key, duration)
const BUILTIN_TRACKS: &[(&str, &str, u32, &str, &str)] = &[
    ("Sabrina Carpenter", "Espresso", 120, "G# minor", "2:55"),
    ("Post Malone", "I Had Some Help", 128, "C major", "2:58"),
    ("Kendrick Lamar", "Not Like Us", 101, "B major", "4:34"),
    ("Tommy Richman", "Million Dollar Baby", 138, "F# minor", "2:35"),
    ("Shaboozey", "A Bar Song (Tipsy)", 81, "D major", "2:51"),
    ("Billie Eilish", "Birds of a Feather", 105, "C# major", "3:30"),
    ("Hozier", "Too Sweet", 117, "E minor", "4:11"),
    ("Taylor Swift", "Fortnight", 96, "C major", "3:48"),
    ("Benson Boone", "Beautiful Things", 105, "C# major", "3:00"),
    ("David Bowie", "Space Oddity", 81, "C major", "5:15"),
];

/// Known tracks answered from memory in demo mode. Matching ignores case.
#[derive(Debug, Clone, Default)]
pub struct DemoCatalog {
    tracks: HashMap<(String, String), TrackMetadata>,
}

impl DemoCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog preloaded with a handful of popular tracks.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for &(artist, title, bpm, key, duration) in BUILTIN_TRACKS {
            catalog.insert(
                artist,
                title,
                TrackMetadata {
                    bpm,
                    key: key.to_string(),
                    duration: duration.to_string(),
                },
            );
        }
        catalog
    }

    pub fn insert(&mut self, artist: &str, title: &str, metadata: TrackMetadata) {
        self.tracks
            .insert((artist.to_lowercase(), title.to_lowercase()), metadata);
    }

    pub fn get(&self, query: &TrackQuery) -> Option<&TrackMetadata> {
        self.tracks.get(&query.matching_key())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Catalog entry for `query`, or synthetic data drawn from the thread RNG.
    pub fn resolve(&self, query: &TrackQuery) -> TrackMetadata {
        match self.get(query) {
            Some(metadata) => metadata.clone(),
            None => synthesize(&mut rand::thread_rng()),
        }
    }
}

/// Random but plausible metadata: BPM in 80..=160, a common key, a `3:ss` duration.
pub fn synthesize<R: Rng>(rng: &mut R) -> TrackMetadata {
    let bpm = rng.gen_range(FALLBACK_BPM_RANGE);
    let key = FALLBACK_KEYS
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_KEYS[0])
        .to_string();
    let seconds: u32 = rng.gen_range(0..=59);

    TrackMetadata {
        bpm,
        key,
        duration: format!("3:{:02}", seconds),
    }
}

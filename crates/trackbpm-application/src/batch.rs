// SPDX-License-Identifier: GPL-3.0-or-later

//! Best-effort concurrent lookups over a list of tracks.
//!
//! Every query is looked up at once and the batch waits for all of them to settle.
//! [`BatchOrchestrator::settle_all`] keeps each outcome tagged with its input position;
//! [`BatchOrchestrator::lookup_many`] logs failures and returns only the successes.

use crate::lookup::TrackLookup;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trackbpm_spotify::{LookupError, TrackMetadata, TrackQuery};

/// Result of one item within a batch.
#[derive(Debug)]
pub struct LookupOutcome<T = TrackMetadata> {
    /// Position of the query in the submitted batch.
    pub index: usize,
    pub query: TrackQuery,
    pub result: Result<T, LookupError>,
}

impl<T> LookupOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `op` for every query concurrently and wait for all of them, keeping input order.
pub(crate) async fn settle<'a, T, F, Fut>(
    queries: &'a [TrackQuery],
    op: F,
) -> Vec<LookupOutcome<T>>
where
    F: Fn(&'a TrackQuery) -> Fut,
    Fut: Future<Output = Result<T, LookupError>>,
{
    let runs = queries.iter().enumerate().map(|(index, query)| {
        let pending = op(query);
        async move {
            LookupOutcome {
                index,
                query: query.clone(),
                result: pending.await,
            }
        }
    });

    join_all(runs).await
}

/// Log every failed outcome and return the successful values in input order.
pub(crate) fn keep_successes<T>(
    operation: &'static str,
    outcomes: Vec<LookupOutcome<T>>,
) -> Vec<T> {
    let requested = outcomes.len();

    let values: Vec<T> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome.result {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(
                    target: "batch",
                    operation,
                    index = outcome.index,
                    query = %outcome.query,
                    kind = ?error.kind(),
                    %error,
                    "item failed, dropping from batch"
                );
                None
            }
        })
        .collect();

    info!(
        target: "batch",
        operation,
        requested,
        succeeded = values.len(),
        "batch settled"
    );
    values
}

/// Whether a batch should run at all. An unconfigured backend short-circuits to no results.
pub(crate) fn backend_ready(lookup: &dyn TrackLookup, operation: &'static str) -> bool {
    let ready = lookup.is_configured();
    if !ready {
        warn!(target: "batch", operation, "lookup backend not configured, returning no results");
    }
    ready
}

pub struct BatchOrchestrator {
    lookup: Arc<dyn TrackLookup>,
}

impl BatchOrchestrator {
    pub fn new(lookup: Arc<dyn TrackLookup>) -> Self {
        Self { lookup }
    }

    /// Run every lookup concurrently and return all outcomes in input order.
    pub async fn settle_all(&self, queries: &[TrackQuery]) -> Vec<LookupOutcome> {
        debug!(target: "batch", queries = queries.len(), "starting batch lookup");
        settle(queries, |query| self.lookup.lookup(query)).await
    }

    /// Metadata for the queries that succeeded, in input order.
    ///
    /// Never fails: an unconfigured backend yields an empty list without any
    /// lookups, and individual failures are logged and dropped.
    pub async fn lookup_many(&self, queries: &[TrackQuery]) -> Vec<TrackMetadata> {
        if !backend_ready(self.lookup.as_ref(), "lookup") {
            return Vec::new();
        }

        keep_successes("lookup", self.settle_all(queries).await)
    }
}

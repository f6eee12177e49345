//! Concurrent collection across the strategy chain.

use futures::future::join_all;
use shopslot_core::Candidate;
use shopslot_engine::{allocate_slots, AllocationConfig, AllocationResult, SlotCapacities};

use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::strategy::{plan_strategies, FetchStrategy};
use crate::types::{SlotQuery, SourceBatch, SourceReport, SourceStatus};

/// Fetch every strategy concurrently and join the results.
///
/// Batches come back in strategy order regardless of completion order, so a
/// later merge gives earlier strategies precedence. A source that fails or
/// overruns the client's fetch timeout contributes an empty batch; it never
/// aborts the round.
pub async fn collect_candidates(
    client: &CatalogClient,
    strategies: &[FetchStrategy],
) -> Vec<SourceBatch> {
    let fetches = strategies.iter().map(|strategy| fetch_one(client, strategy));
    join_all(fetches).await
}

async fn fetch_one(client: &CatalogClient, strategy: &FetchStrategy) -> SourceBatch {
    let timeout = client.fetch_timeout();
    let outcome = match tokio::time::timeout(timeout, client.fetch(strategy)).await {
        Ok(result) => result,
        Err(_) => Err(CatalogError::Timeout {
            source_label: strategy.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    };

    match outcome {
        Ok(candidates) => {
            tracing::debug!(
                source = %strategy,
                count = candidates.len(),
                "collected catalog candidates"
            );
            SourceBatch {
                source: strategy.to_string(),
                status: SourceStatus::Ok,
                candidates,
            }
        }
        Err(e) => {
            let status = if is_timeout(&e) {
                SourceStatus::TimedOut
            } else {
                SourceStatus::Failed
            };
            tracing::warn!(
                source = %strategy,
                error = %e,
                "catalog fetch failed; continuing without this source"
            );
            SourceBatch {
                source: strategy.to_string(),
                status,
                candidates: Vec::new(),
            }
        }
    }
}

fn is_timeout(error: &CatalogError) -> bool {
    match error {
        CatalogError::Timeout { .. } => true,
        CatalogError::Http(e) => e.is_timeout(),
        _ => false,
    }
}

/// Split batches into per-source reports and the candidate lists to merge.
#[must_use]
pub fn split_batches(batches: Vec<SourceBatch>) -> (Vec<SourceReport>, Vec<Vec<Candidate>>) {
    let reports = batches.iter().map(SourceReport::from).collect();
    let lists = batches.into_iter().map(|b| b.candidates).collect();
    (reports, lists)
}

/// One full cycle: plan strategies, collect concurrently, allocate.
pub async fn fetch_and_allocate(
    client: &CatalogClient,
    query: &SlotQuery,
    radius_km: f64,
    capacities: SlotCapacities,
) -> (AllocationResult, Vec<SourceReport>) {
    let strategies = plan_strategies(query, radius_km);
    let batches = collect_candidates(client, &strategies).await;
    let (reports, lists) = split_batches(batches);

    let config = AllocationConfig {
        reference: query.reference,
        capacities,
    };
    (allocate_slots(lists, &config), reports)
}

//! Catalog access for slot allocation.
//!
//! Plans the fetch strategies for a query, runs them concurrently against the
//! catalog service, degrades failed or slow sources to empty lists, and hands
//! the merged result to the allocation engine. [`SlotBoard`] keeps only the
//! newest cycle's output when refreshes overlap.

pub mod client;
pub mod collect;
pub mod error;
pub mod refresh;
pub mod strategy;
pub mod types;

pub use client::CatalogClient;
pub use collect::{collect_candidates, fetch_and_allocate, split_batches};
pub use error::CatalogError;
pub use refresh::{PublishedSlots, RefreshOutcome, RefreshTicket, SlotBoard};
pub use strategy::{plan_strategies, FetchStrategy};
pub use types::{SlotQuery, SourceBatch, SourceReport, SourceStatus};

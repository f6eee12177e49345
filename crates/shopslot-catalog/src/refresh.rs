//! Last-write-wins publication of allocation results.
//!
//! Every refresh runs under a generation ticket issued by
//! [`SlotBoard::begin`] when the request is made. Issuing a newer ticket
//! supersedes all older ones: their in-flight fetches are dropped, and a
//! result that still arrives for an old ticket is discarded rather than
//! published. Subscribers only ever see the newest generation.

use std::sync::Arc;

use shopslot_engine::{AllocationResult, SlotCapacities};
use tokio::sync::watch;

use crate::client::CatalogClient;
use crate::collect::fetch_and_allocate;
use crate::types::{SlotQuery, SourceReport};

/// Identifies one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// A published allocation and the query that produced it.
#[derive(Debug)]
pub struct PublishedSlots {
    pub generation: u64,
    pub query: SlotQuery,
    pub result: AllocationResult,
    pub sources: Vec<SourceReport>,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Published(Arc<PublishedSlots>),
    /// A newer refresh started before this one finished.
    Superseded { generation: u64 },
}

/// Holds the newest allocation for one viewer.
#[derive(Debug)]
pub struct SlotBoard {
    generation: watch::Sender<u64>,
    published: watch::Sender<Option<Arc<PublishedSlots>>>,
}

impl Default for SlotBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotBoard {
    #[must_use]
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        let (published, _) = watch::channel(None);
        Self {
            generation,
            published,
        }
    }

    /// Receiver that yields each newly published allocation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<PublishedSlots>>> {
        self.published.subscribe()
    }

    #[must_use]
    pub fn latest(&self) -> Option<Arc<PublishedSlots>> {
        self.published.borrow().clone()
    }

    /// Start a new cycle, superseding every earlier ticket.
    pub fn begin(&self) -> RefreshTicket {
        let mut generation = 0;
        self.generation.send_modify(|current| {
            *current += 1;
            generation = *current;
        });
        RefreshTicket { generation }
    }

    #[must_use]
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        *self.generation.borrow() == ticket.generation
    }

    /// Publish a result for `ticket` unless a newer cycle has started.
    pub fn publish(
        &self,
        ticket: RefreshTicket,
        query: SlotQuery,
        result: AllocationResult,
        sources: Vec<SourceReport>,
    ) -> RefreshOutcome {
        let slots = Arc::new(PublishedSlots {
            generation: ticket.generation,
            query,
            result,
            sources,
        });

        let applied = self.published.send_if_modified(|current| {
            let newer_published = current
                .as_ref()
                .is_some_and(|p| p.generation >= ticket.generation);
            if newer_published || !self.is_current(ticket) {
                return false;
            }
            *current = Some(Arc::clone(&slots));
            true
        });

        if applied {
            RefreshOutcome::Published(slots)
        } else {
            tracing::debug!(
                generation = ticket.generation,
                "discarding superseded allocation"
            );
            RefreshOutcome::Superseded {
                generation: ticket.generation,
            }
        }
    }

    /// Run a full fetch-and-allocate cycle for `query` under `ticket` and
    /// publish it.
    ///
    /// Take the ticket with [`SlotBoard::begin`] when the request is made, not
    /// inside a spawned task, so generation order follows request order. If a
    /// newer ticket is issued before or while this one is fetching, the fetches
    /// are abandoned and [`RefreshOutcome::Superseded`] is returned.
    pub async fn refresh(
        &self,
        ticket: RefreshTicket,
        client: &CatalogClient,
        query: SlotQuery,
        radius_km: f64,
        capacities: SlotCapacities,
    ) -> RefreshOutcome {
        let mut generation_rx = self.generation.subscribe();

        let cycle = fetch_and_allocate(client, &query, radius_km, capacities);
        let (result, sources) = tokio::select! {
            biased;
            () = superseded(&mut generation_rx, ticket.generation) => {
                tracing::debug!(
                    generation = ticket.generation,
                    "refresh superseded before it finished; abandoning"
                );
                return RefreshOutcome::Superseded { generation: ticket.generation };
            }
            output = cycle => output,
        };

        self.publish(ticket, query, result, sources)
    }
}

/// Resolves once the board's generation moves past `generation`.
async fn superseded(rx: &mut watch::Receiver<u64>, generation: u64) {
    if rx.wait_for(|current| *current != generation).await.is_err() {
        // Sender gone means the board is gone; nothing can supersede us.
        std::future::pending::<()>().await;
    }
}

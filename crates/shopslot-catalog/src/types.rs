//! Wire and query types for the catalog service.

use serde::{Deserialize, Serialize};
use shopslot_core::{Candidate, GeoPoint};

/// A catalog response body: either `{"data": [...]}` or a bare array.
///
/// Records stay as raw JSON here so a single malformed record can be skipped
/// without discarding the rest of the response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CandidatePayload {
    Envelope { data: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

impl CandidatePayload {
    pub(crate) fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            CandidatePayload::Envelope { data } | CandidatePayload::Bare(data) => data,
        }
    }
}

/// What the caller is looking at: where they are and which city they picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotQuery {
    pub reference: Option<GeoPoint>,
    pub city: Option<String>,
}

/// How one source fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Failed,
    TimedOut,
}

/// One source's contribution to a collection round.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch {
    pub source: String,
    pub status: SourceStatus,
    pub candidates: Vec<Candidate>,
}

/// Per-source summary without the candidates, for logs and API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub status: SourceStatus,
    pub count: usize,
}

impl From<&SourceBatch> for SourceReport {
    fn from(batch: &SourceBatch) -> Self {
        Self {
            source: batch.source.clone(),
            status: batch.status,
            count: batch.candidates.len(),
        }
    }
}

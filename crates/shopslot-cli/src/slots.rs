//! Slot allocation command handlers.
//!
//! `allocate` is offline and reads candidates from a file. `fetch` and `follow`
//! go through the catalog client and publish via a [`SlotBoard`], so when
//! `follow` receives locations faster than the catalog answers, only the
//! newest location's layout is printed.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopslot_catalog::{
    CatalogClient, PublishedSlots, RefreshOutcome, SlotBoard, SlotQuery, SourceReport,
};
use shopslot_core::{AppConfig, Candidate, GeoPoint};
use shopslot_engine::{
    allocate_slots, AllocationConfig, AllocationResult, SlotAssignment, SlotCapacities,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::{CapacityArgs, LocationArgs};

/// Accepted layouts for an `allocate --input` file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AllocationInput {
    Wrapped { sources: Vec<Vec<Candidate>> },
    Lists(Vec<Vec<Candidate>>),
    Single(Vec<Candidate>),
}

impl AllocationInput {
    fn into_sources(self) -> Vec<Vec<Candidate>> {
        match self {
            AllocationInput::Wrapped { sources } | AllocationInput::Lists(sources) => sources,
            AllocationInput::Single(list) => vec![list],
        }
    }
}

#[derive(Debug, Serialize)]
struct SlotsOutput<'a> {
    #[serde(flatten)]
    result: &'a AllocationResult,
    assignments: Vec<SlotAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<&'a [SourceReport]>,
}

impl<'a> SlotsOutput<'a> {
    fn new(result: &'a AllocationResult, sources: Option<&'a [SourceReport]>) -> Self {
        Self {
            result,
            assignments: result.assignments(),
            sources,
        }
    }
}

impl LocationArgs {
    /// The reference point, if one was given, checked for range.
    pub(crate) fn reference(self) -> anyhow::Result<Option<GeoPoint>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => checked_point(lat, lng).map(Some),
            (None, None) => Ok(None),
            _ => anyhow::bail!("--lat and --lng must be given together"),
        }
    }
}

impl CapacityArgs {
    pub(crate) fn resolve(self, defaults: SlotCapacities) -> SlotCapacities {
        SlotCapacities {
            left: self.left.unwrap_or(defaults.left),
            right: self.right.unwrap_or(defaults.right),
            bottom: self.bottom.unwrap_or(defaults.bottom),
        }
    }
}

fn config_capacities(config: &AppConfig) -> SlotCapacities {
    SlotCapacities {
        left: config.left_capacity,
        right: config.right_capacity,
        bottom: config.bottom_capacity,
    }
}

fn checked_point(lat: f64, lng: f64) -> anyhow::Result<GeoPoint> {
    let point = GeoPoint::new(lat, lng);
    if !point.is_valid() {
        anyhow::bail!("coordinate ({lat}, {lng}) is outside [-90, 90] x [-180, 180]");
    }
    Ok(point)
}

fn build_client(config: &AppConfig) -> anyhow::Result<CatalogClient> {
    CatalogClient::new(
        &config.catalog_url,
        config.catalog_timeout_ms,
        &config.catalog_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))
}

fn parse_allocation_input(raw: &str) -> anyhow::Result<Vec<Vec<Candidate>>> {
    let input: AllocationInput = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("input is not a candidate list or list of lists: {e}"))?;
    Ok(input.into_sources())
}

/// Allocate the candidate lists in `input` without touching the network.
///
/// Capacities default to the built-in layout (3 left, 3 right, 30 bottom) so
/// the command works without any environment configured.
pub(crate) fn run_allocate(
    input: &Path,
    location: LocationArgs,
    capacities: CapacityArgs,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", input.display()))?;
    let sources = parse_allocation_input(&raw)?;

    let config = AllocationConfig {
        reference: location.reference()?,
        capacities: capacities.resolve(SlotCapacities::default()),
    };
    tracing::debug!(
        sources = sources.len(),
        candidates = sources.iter().map(Vec::len).sum::<usize>(),
        "allocating from file"
    );
    let result = allocate_slots(sources, &config);

    println!(
        "{}",
        serde_json::to_string_pretty(&SlotsOutput::new(&result, None))?
    );
    Ok(())
}

/// One fetch-and-allocate cycle against the configured catalog.
pub(crate) async fn run_fetch(
    config: &AppConfig,
    location: LocationArgs,
    city: Option<String>,
    capacities: CapacityArgs,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let board = SlotBoard::new();
    let query = SlotQuery {
        reference: location.reference()?,
        city,
    };

    let outcome = board
        .refresh(
            board.begin(),
            &client,
            query,
            config.nearby_radius_km,
            capacities.resolve(config_capacities(config)),
        )
        .await;

    match outcome {
        RefreshOutcome::Published(slots) => {
            for source in &slots.sources {
                tracing::info!(
                    source = %source.source,
                    status = ?source.status,
                    count = source.count,
                    "catalog source"
                );
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&SlotsOutput::new(
                    &slots.result,
                    Some(slots.sources.as_slice())
                ))?
            );
            Ok(())
        }
        RefreshOutcome::Superseded { generation } => {
            anyhow::bail!("refresh {generation} was superseded before it finished")
        }
    }
}

/// Parse a `lat,lng[,city]` line. Blank coordinates mean no reference point.
///
/// Returns `Ok(None)` for blank lines.
pub(crate) fn parse_follow_line(line: &str) -> anyhow::Result<Option<SlotQuery>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut parts = line.splitn(3, ',').map(str::trim);
    let lat = parts.next().unwrap_or_default();
    let lng = parts.next().unwrap_or_default();
    let city = parts
        .next()
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned);

    let reference = match (lat.is_empty(), lng.is_empty()) {
        (true, true) => None,
        (false, false) => {
            let lat: f64 = lat
                .parse()
                .map_err(|_| anyhow::anyhow!("lat {lat:?} is not a number"))?;
            let lng: f64 = lng
                .parse()
                .map_err(|_| anyhow::anyhow!("lng {lng:?} is not a number"))?;
            Some(checked_point(lat, lng)?)
        }
        _ => anyhow::bail!("lat and lng must be given together"),
    };

    Ok(Some(SlotQuery { reference, city }))
}

/// Re-allocate for every location read from stdin.
///
/// Each line starts a refresh immediately; a refresh still waiting on the
/// catalog when the next line arrives is abandoned, and only current results
/// are printed, one JSON document per line.
pub(crate) async fn run_follow(config: &AppConfig, capacities: CapacityArgs) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let capacities = capacities.resolve(config_capacities(config));
    let board = Arc::new(SlotBoard::new());

    let printer = tokio::spawn(print_published(board.subscribe(), std::io::stdout()));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    follow_lines(stdin, &board, &client, config.nearby_radius_km, capacities).await?;

    // Dropping the last board handle closes the channel and ends the printer.
    drop(board);
    printer
        .await
        .map_err(|e| anyhow::anyhow!("printer task failed: {e}"))?;
    Ok(())
}

/// Start one refresh per location line, in read order, and wait for them all.
///
/// Each ticket is issued here, before the refresh task is spawned, so a later
/// line always holds a newer generation than an earlier one no matter how the
/// tasks are scheduled.
pub(crate) async fn follow_lines<R>(
    input: R,
    board: &Arc<SlotBoard>,
    client: &CatalogClient,
    radius_km: f64,
    capacities: SlotCapacities,
) -> anyhow::Result<Vec<RefreshOutcome>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut refreshes = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let query = match parse_follow_line(&line) {
            Ok(Some(query)) => query,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "skipping unreadable location");
                continue;
            }
        };

        let ticket = board.begin();
        let board = Arc::clone(board);
        let client = client.clone();
        refreshes.push(tokio::spawn(async move {
            board
                .refresh(ticket, &client, query, radius_km, capacities)
                .await
        }));
    }

    let mut outcomes = Vec::with_capacity(refreshes.len());
    for handle in refreshes {
        let outcome = handle
            .await
            .map_err(|e| anyhow::anyhow!("refresh task failed: {e}"))?;
        match &outcome {
            RefreshOutcome::Published(slots) => {
                tracing::debug!(generation = slots.generation, "allocation published");
            }
            RefreshOutcome::Superseded { generation } => {
                tracing::info!(generation, "allocation superseded by a newer location");
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Write each published allocation to `out` as one JSON line until the board
/// is dropped, then hand the writer back.
pub(crate) async fn print_published<W: Write>(
    mut published: watch::Receiver<Option<Arc<PublishedSlots>>>,
    mut out: W,
) -> W {
    while published.changed().await.is_ok() {
        let Some(slots) = published.borrow_and_update().clone() else {
            continue;
        };
        let output = SlotsOutput::new(&slots.result, Some(slots.sources.as_slice()));
        let written = serde_json::to_string(&output)
            .map_err(anyhow::Error::from)
            .and_then(|json| writeln!(out, "{json}").map_err(anyhow::Error::from));
        if let Err(e) = written {
            tracing::error!(
                generation = slots.generation,
                error = %e,
                "failed to print allocation"
            );
        }
    }
    out
}

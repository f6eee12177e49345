use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shopslot_catalog::{fetch_and_allocate, SlotQuery, SourceReport};
use shopslot_core::{AppConfig, Candidate, GeoPoint};
use shopslot_engine::{
    allocate_slots, AllocationConfig, AllocationResult, SlotAssignment, SlotCapacities,
};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Query string for `GET /api/v1/slots`.
///
/// Everything arrives as text so malformed numbers surface as our own
/// `validation_error` body instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SlotsParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub city: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AllocateRequest {
    pub sources: Vec<Vec<Candidate>>,
    #[serde(default)]
    pub reference: Option<GeoPoint>,
    #[serde(default)]
    pub left: Option<i64>,
    #[serde(default)]
    pub right: Option<i64>,
    #[serde(default)]
    pub bottom: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SlotsData {
    #[serde(flatten)]
    pub result: AllocationResult,
    pub assignments: Vec<SlotAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceReport>>,
}

impl SlotsData {
    fn new(result: AllocationResult, sources: Option<Vec<SourceReport>>) -> Self {
        Self {
            assignments: result.assignments(),
            result,
            sources,
        }
    }
}

pub(super) async fn get_slots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<SlotsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<SlotsData>>, ApiError> {
    let Query(params) =
        params.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let reference = parse_reference(params.lat.as_deref(), params.lng.as_deref())
        .map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;
    let capacities = text_capacities(&params, &state.config)
        .map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;

    let query = SlotQuery {
        reference,
        city: params.city,
    };
    let (result, sources) = fetch_and_allocate(
        &state.catalog,
        &query,
        state.config.nearby_radius_km,
        capacities,
    )
    .await;

    tracing::info!(
        request_id = %req_id.0,
        filled = result.filled(),
        sources = sources.len(),
        "allocated slots from catalog"
    );

    Ok(Json(ApiResponse {
        data: SlotsData::new(result, Some(sources)),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn allocate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SlotsData>>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    if let Some(point) = request.reference {
        if !point.is_valid() {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "reference must have lat in [-90, 90] and lng in [-180, 180]",
            ));
        }
    }

    let capacities = body_capacities(&request, &state.config)
        .map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;

    let config = AllocationConfig {
        reference: request.reference,
        capacities,
    };
    let result = allocate_slots(request.sources, &config);

    Ok(Json(ApiResponse {
        data: SlotsData::new(result, None),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) fn default_capacities(config: &AppConfig) -> SlotCapacities {
    SlotCapacities {
        left: config.left_capacity,
        right: config.right_capacity,
        bottom: config.bottom_capacity,
    }
}

/// `lat` and `lng` must come together and describe a valid coordinate.
fn parse_reference(lat: Option<&str>, lng: Option<&str>) -> Result<Option<GeoPoint>, String> {
    match (non_blank(lat), non_blank(lng)) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let lat: f64 = lat
                .parse()
                .map_err(|_| format!("lat must be a number, got {lat:?}"))?;
            let lng: f64 = lng
                .parse()
                .map_err(|_| format!("lng must be a number, got {lng:?}"))?;
            let point = GeoPoint::new(lat, lng);
            if point.is_valid() {
                Ok(Some(point))
            } else {
                Err("lat must be in [-90, 90] and lng in [-180, 180]".to_string())
            }
        }
        _ => Err("lat and lng must be supplied together".to_string()),
    }
}

fn text_capacities(params: &SlotsParams, config: &AppConfig) -> Result<SlotCapacities, String> {
    let defaults = default_capacities(config);
    Ok(SlotCapacities {
        left: text_capacity("left", params.left.as_deref(), defaults.left)?,
        right: text_capacity("right", params.right.as_deref(), defaults.right)?,
        bottom: text_capacity("bottom", params.bottom.as_deref(), defaults.bottom)?,
    })
}

fn body_capacities(
    request: &AllocateRequest,
    config: &AppConfig,
) -> Result<SlotCapacities, String> {
    let defaults = default_capacities(config);
    Ok(SlotCapacities {
        left: int_capacity("left", request.left, defaults.left)?,
        right: int_capacity("right", request.right, defaults.right)?,
        bottom: int_capacity("bottom", request.bottom, defaults.bottom)?,
    })
}

fn text_capacity(name: &str, raw: Option<&str>, default: usize) -> Result<usize, String> {
    match non_blank(raw) {
        None => Ok(default),
        Some(value) => {
            let parsed: i64 = value
                .parse()
                .map_err(|_| format!("{name} must be an integer, got {value:?}"))?;
            int_capacity(name, Some(parsed), default)
        }
    }
}

fn int_capacity(name: &str, raw: Option<i64>, default: usize) -> Result<usize, String> {
    match raw {
        None => Ok(default),
        Some(value) => {
            usize::try_from(value).map_err(|_| format!("{name} must be non-negative, got {value}"))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reference_requires_both_coordinates() {
        assert_eq!(parse_reference(None, None), Ok(None));
        assert_eq!(
            parse_reference(Some("12.5"), Some("77.25")),
            Ok(Some(GeoPoint::new(12.5, 77.25)))
        );
        assert!(parse_reference(Some("12.5"), None).is_err());
        assert!(parse_reference(Some(" "), Some("77.25")).is_err());
    }

    #[test]
    fn parse_reference_rejects_out_of_range_and_garbage() {
        assert!(parse_reference(Some("91"), Some("0")).is_err());
        assert!(parse_reference(Some("0"), Some("-180.5")).is_err());
        assert!(parse_reference(Some("north"), Some("0")).is_err());
        assert!(parse_reference(Some("NaN"), Some("0")).is_err());
    }

    #[test]
    fn text_capacity_defaults_when_absent_and_rejects_negative() {
        assert_eq!(text_capacity("left", None, 3), Ok(3));
        assert_eq!(text_capacity("left", Some(""), 3), Ok(3));
        assert_eq!(text_capacity("left", Some("0"), 3), Ok(0));
        assert_eq!(text_capacity("left", Some("7"), 3), Ok(7));
        assert!(text_capacity("left", Some("-1"), 3).is_err());
        assert!(text_capacity("left", Some("two"), 3).is_err());
    }

    #[test]
    fn int_capacity_rejects_negative() {
        assert_eq!(int_capacity("bottom", Some(12), 30), Ok(12));
        assert_eq!(int_capacity("bottom", None, 30), Ok(30));
        let err = int_capacity("bottom", Some(-4), 30).unwrap_err();
        assert!(err.contains("bottom"), "message should name the field: {err}");
    }
}

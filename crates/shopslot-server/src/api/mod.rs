mod slots;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shopslot_catalog::CatalogClient;
use shopslot_core::AppConfig;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogClient,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/slots", get(slots::get_slots))
        .route("/api/v1/slots/allocate", post(slots::allocate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData { status: "ok" },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use shopslot_core::Environment;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(catalog_url: &str) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("bind addr"),
            log_level: "debug".to_string(),
            catalog_url: catalog_url.to_string(),
            catalog_timeout_ms: 2_000,
            catalog_user_agent: "shopslot-test/0.1".to_string(),
            nearby_radius_km: 25.0,
            left_capacity: 3,
            right_capacity: 3,
            bottom_capacity: 30,
        }
    }

    fn test_app(catalog_url: &str) -> Router {
        let config = test_config(catalog_url);
        let catalog = CatalogClient::new(
            &config.catalog_url,
            config.catalog_timeout_ms,
            &config.catalog_user_agent,
        )
        .expect("catalog client");
        build_app(AppState {
            catalog,
            config: Arc::new(config),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.expect("response")
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn ids(section: &serde_json::Value) -> Vec<&str> {
        section
            .as_array()
            .expect("section array")
            .iter()
            .map(|c| c["id"].as_str().expect("id"))
            .collect()
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_returns_ok_and_generates_request_id() {
        let response = send(test_app("http://catalog.invalid"), get("/api/v1/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
            .expect("x-request-id header");
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"].as_str(), Some(header.as_str()));
    }

    #[tokio::test]
    async fn request_id_header_is_propagated() {
        let request = Request::builder()
            .uri("/api/v1/health")
            .header(REQUEST_ID_HEADER, "caller-supplied-id")
            .body(Body::empty())
            .expect("request");
        let response = send(test_app("http://catalog.invalid"), request).await;

        assert_eq!(
            response
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("caller-supplied-id")
        );
    }

    #[tokio::test]
    async fn allocate_places_reference_layout() {
        let body = serde_json::json!({
            "sources": [[
                { "id": "A", "planType": "HERO", "visitorCount": 100 },
                { "id": "B", "planType": "LEFT", "priorityRank": 3 },
                { "id": "C", "planType": "LEFT", "priorityRank": 1 },
                { "id": "D", "planType": "LEFT", "priorityRank": 2 },
                { "id": "E", "latitude": 0.018, "longitude": 0.0 }
            ]],
            "reference": { "lat": 0.0, "lng": 0.0 }
        });
        let response = send(
            test_app("http://catalog.invalid"),
            post_json("/api/v1/slots/allocate", &body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let data = &json["data"];
        assert_eq!(data["hero"]["id"], "A");
        assert_eq!(ids(&data["left"]), ["B", "D", "C"]);
        assert!(data["right"].as_array().expect("right").is_empty());

        let bottom = ids(&data["bottom"]);
        assert!(bottom.contains(&"A"));
        assert!(bottom.contains(&"E"));
        assert!(!bottom.iter().any(|id| ["B", "C", "D"].contains(id)));

        let e = data["bottom"]
            .as_array()
            .expect("bottom")
            .iter()
            .find(|c| c["id"] == "E")
            .expect("E placed");
        assert_eq!(e["distanceKm"].as_f64(), Some(2.0));

        let assignments = data["assignments"].as_array().expect("assignments");
        assert_eq!(assignments[0]["section"], "hero");
        assert_eq!(assignments[0]["candidate_id"], "A");
        assert!(data.get("sources").is_none());
    }

    #[tokio::test]
    async fn allocate_honours_capacity_overrides() {
        let body = serde_json::json!({
            "sources": [[
                { "id": "l1", "planType": "LEFT" },
                { "id": "l2", "planType": "LEFT" },
                { "id": "b1" }
            ]],
            "left": 1,
            "bottom": 0
        });
        let response = send(
            test_app("http://catalog.invalid"),
            post_json("/api/v1/slots/allocate", &body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(ids(&json["data"]["left"]), ["l1"]);
        assert!(json["data"]["bottom"].as_array().expect("bottom").is_empty());
    }

    #[tokio::test]
    async fn allocate_rejects_negative_capacity() {
        let body = serde_json::json!({ "sources": [], "right": -1 });
        let response = send(
            test_app("http://catalog.invalid"),
            post_json("/api/v1/slots/allocate", &body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn allocate_rejects_malformed_body_and_bad_reference() {
        let missing_sources = serde_json::json!({ "left": 2 });
        let response = send(
            test_app("http://catalog.invalid"),
            post_json("/api/v1/slots/allocate", &missing_sources),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "validation_error");

        let bad_reference = serde_json::json!({
            "sources": [],
            "reference": { "lat": 123.0, "lng": 0.0 }
        });
        let response = send(
            test_app("http://catalog.invalid"),
            post_json("/api/v1/slots/allocate", &bad_reference),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_slots_validates_query_before_fetching() {
        for uri in [
            "/api/v1/slots?lat=12.9",
            "/api/v1/slots?lat=95&lng=10",
            "/api/v1/slots?lat=abc&lng=10",
            "/api/v1/slots?left=-2",
            "/api/v1/slots?bottom=lots",
        ] {
            let response = send(test_app("http://catalog.invalid"), get(uri)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let json = json_body(response).await;
            assert_eq!(json["error"]["code"], "validation_error", "{uri}");
        }
    }

    #[tokio::test]
    async fn get_slots_fetches_catalog_and_allocates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shops/nearby"))
            .and(query_param("radiusKm", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "id": "near", "latitude": 12.975, "longitude": 77.59 },
                    { "id": "r1", "planType": "RIGHT", "priorityRank": 5 }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shops/by-city"))
            .and(query_param("city", "Bengaluru"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shops/by-plan"))
            .and(query_param("plan", "HERO"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "id": "h1", "planType": "HERO" }])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shops/by-plan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let response = send(
            test_app(&server.uri()),
            get("/api/v1/slots?lat=12.9716&lng=77.5946&city=Bengaluru&right=1"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let data = &json["data"];
        assert_eq!(data["hero"]["id"], "h1");
        assert_eq!(ids(&data["right"]), ["r1"]);
        assert_eq!(ids(&data["bottom"]), ["h1", "near"]);

        let sources = data["sources"].as_array().expect("sources");
        let statuses: Vec<(&str, &str)> = sources
            .iter()
            .map(|s| {
                (
                    s["source"].as_str().expect("source"),
                    s["status"].as_str().expect("status"),
                )
            })
            .collect();
        assert_eq!(
            statuses,
            [
                ("nearby", "ok"),
                ("by_city", "failed"),
                ("by_plan:HERO", "ok"),
                ("by_plan:LEFT", "ok"),
                ("by_plan:RIGHT", "ok"),
            ]
        );
    }
}

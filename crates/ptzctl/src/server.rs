//! HTTP control surface.
//!
//! Every route decodes its request into a `Command`, hands it to the
//! dispatcher and answers with JSON. Error classes map onto distinct status
//! codes so panels can tell a bad request from an offline camera.

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use ptzctl_api::DeviceDriver;
use ptzctl_core::{
    CameraId, Command, ControlDispatcher, CoreError, TranslationError, parse_legacy,
    parse_structured,
};

use crate::output::result_json;

const CAMERA_PARAM: &str = "camera";

pub fn router<D: DeviceDriver>(dispatcher: ControlDispatcher<D>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/cameras", get(cameras::<D>))
        .route("/control/{operation}", get(structured::<D>))
        .route("/cgi-bin/ptzctrl.cgi", get(legacy::<D>))
        .route("/cgi-bin/param.cgi", get(param_probe))
        .route("/cgi-bin/{operation}", get(structured::<D>))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn cameras<D: DeviceDriver>(State(dispatcher): State<ControlDispatcher<D>>) -> Response {
    Json(dispatcher.registry().snapshots()).into_response()
}

/// `/control/<operation>?camera=N&key=value...`
async fn structured<D: DeviceDriver>(
    State(dispatcher): State<ControlDispatcher<D>>,
    Path(operation): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let decoded = split_camera(params).and_then(|(camera, params)| {
        Ok((camera, parse_structured(&operation, params)?))
    });
    run(&dispatcher, decoded).await
}

/// `/cgi-bin/ptzctrl.cgi?ptzcmd&action&arg[&camera=N]`
async fn legacy<D: DeviceDriver>(
    State(dispatcher): State<ControlDispatcher<D>>,
    RawQuery(query): RawQuery,
) -> Response {
    let decoded = decode_legacy(query.as_deref().unwrap_or_default());
    run(&dispatcher, decoded).await
}

/// Panels probe this before sending commands; nothing reaches a camera.
async fn param_probe(RawQuery(query): RawQuery) -> Json<serde_json::Value> {
    info!(query = query.as_deref().unwrap_or_default(), "param.cgi probe");
    Json(json!({ "ok": true }))
}

async fn run<D: DeviceDriver>(
    dispatcher: &ControlDispatcher<D>,
    decoded: Result<(CameraId, Command), TranslationError>,
) -> Response {
    let (camera, command) = match decoded {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!(error = %err, "rejected request");
            return ApiError(err.into()).into_response();
        }
    };

    match dispatcher.dispatch(camera, command).await {
        Ok(result) => match result_json(&result) {
            Ok(body) => Json(body).into_response(),
            Err(err) => {
                warn!(error = %err, "failed to encode response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        Err(err) => ApiError(err).into_response(),
    }
}

// ── Request decoding ─────────────────────────────────────────────────

/// Pull the routing `camera` parameter out of a query; the last one wins.
fn split_camera(
    params: Vec<(String, String)>,
) -> Result<(CameraId, Vec<(String, String)>), TranslationError> {
    let mut camera = CameraId::DEFAULT;
    let mut rest = Vec::with_capacity(params.len());
    for (key, value) in params {
        if key == CAMERA_PARAM {
            camera = value.parse()?;
        } else {
            rest.push((key, value));
        }
    }
    Ok((camera, rest))
}

fn decode_legacy(query: &str) -> Result<(CameraId, Command), TranslationError> {
    let mut camera = CameraId::DEFAULT;
    let mut tokens = Vec::new();
    for token in query.split('&') {
        match token.strip_prefix("camera=") {
            Some(value) => camera = value.parse()?,
            None => tokens.push(token),
        }
    }
    Ok((camera, parse_legacy(&tokens.join("&"))?))
}

// ── Error responses ──────────────────────────────────────────────────

struct ApiError(CoreError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::Translation(_) => StatusCode::BAD_REQUEST,
            CoreError::CameraNotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::CameraNotConnected { .. } => StatusCode::SERVICE_UNAVAILABLE,
            err if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            CoreError::Driver(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self.0, "command failed");
        }
        let body = Json(json!({ "ok": false, "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

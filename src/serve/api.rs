//! Response bodies and error mapping for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use medreach::models::{Evaluation, GeoPoint, SegmentKind};
use medreach::AccessError;

/// GeoJSON point geometry
#[derive(Debug, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub coordinates: [f64; 2],
}

impl From<&GeoPoint> for Geometry {
    fn from(point: &GeoPoint) -> Self {
        let point = point.to_geographic();
        Self {
            geo_type: "Point".to_string(),
            coordinates: [point.x, point.y],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Distances {
    pub direct: f64,
    pub via_stop: f64,
    pub to_stop: f64,
}

#[derive(Debug, Serialize)]
pub struct Path {
    pub from: Geometry,
    pub to: Geometry,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub distance_m: f64,
}

/// Body of `/predict` and `/v1/access`
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_id: Option<i64>,
    pub status: &'static str,
    pub distances: Distances,
    pub paths: Vec<Path>,
}

impl From<Evaluation> for AccessResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            sport_id: evaluation.sport_id,
            status: evaluation.label.as_str(),
            distances: Distances {
                direct: evaluation.distances.direct,
                via_stop: evaluation.distances.via_stop,
                to_stop: evaluation.distances.to_stop,
            },
            paths: evaluation
                .path_segments
                .iter()
                .map(|segment| Path {
                    from: Geometry::from(&segment.from),
                    to: Geometry::from(&segment.to),
                    kind: match segment.kind {
                        SegmentKind::Direct => "direct",
                        SegmentKind::ToStop => "to_stop",
                        SegmentKind::StopToMedical => "stop_to_med",
                    },
                    distance_m: segment.distance_m,
                })
                .collect(),
        }
    }
}

/// Error reported to API clients
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        let status = match &err {
            AccessError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!("Evaluation failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

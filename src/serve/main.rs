//! Accessibility query server.
//!
//! Loads the reference datasets and classifier once, then answers
//! accessibility queries for sport facilities and ad-hoc points.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use medreach::config::Config;
use medreach::{AccessContext, GeoPoint};

mod api;
use api::{AccessResponse, ApiError};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Medical accessibility query server")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "medreach.toml")]
    config: PathBuf,

    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5000")]
    listen: String,

    /// Override access.green_radius_m
    #[arg(long)]
    green_radius: Option<f64>,

    /// Override access.stop_radius_m
    #[arg(long)]
    stop_radius: Option<f64>,

    /// Override access.via_stop_radius_m
    #[arg(long)]
    via_stop_radius: Option<f64>,

    /// Log per-query detail
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Medreach Query Server");
    info!("Loading configuration from {}", args.config.display());

    let mut config = Config::load_from_file(&args.config)?;
    let thresholds = &mut config.access.thresholds;
    if let Some(v) = args.green_radius {
        thresholds.green_radius_m = v;
    }
    if let Some(v) = args.stop_radius {
        thresholds.stop_radius_m = v;
    }
    if let Some(v) = args.via_stop_radius {
        thresholds.via_stop_radius_m = v;
    }
    config.validate()?;

    let context = Arc::new(config.build_context()?);

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/predict", get(predict_handler))
        .route("/v1/access", get(point_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(context);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(ctx): State<Arc<AccessContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sport: ctx.sport().len(),
        medical: ctx.medical().len(),
        stops: ctx.stops().len(),
        classifier: ctx.classifier().name(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    sport: usize,
    medical: usize,
    stops: usize,
    classifier: &'static str,
}

/// Accessibility of a sport facility
async fn predict_handler(
    State(ctx): State<Arc<AccessContext>>,
    Query(params): Query<PredictQueryParams>,
) -> Result<Json<AccessResponse>, ApiError> {
    let sport_id = parse_sport_id(params.sport_id.as_deref())?;
    let evaluation = ctx.evaluate(sport_id)?;
    Ok(Json(AccessResponse::from(evaluation)))
}

/// Accessibility of an arbitrary WGS84 point
async fn point_handler(
    State(ctx): State<Arc<AccessContext>>,
    Query(params): Query<PointQueryParams>,
) -> Result<Json<AccessResponse>, ApiError> {
    let lat = parse_coordinate("lat", params.lat.as_deref())?;
    let lon = parse_coordinate("lon", params.lon.as_deref())?;
    let evaluation = ctx.evaluate_point(&GeoPoint::wgs84(lon, lat))?;
    Ok(Json(AccessResponse::from(evaluation)))
}

#[derive(Deserialize)]
struct PredictQueryParams {
    /// Sport facility id, validated by the handler
    sport_id: Option<String>,
}

#[derive(Deserialize)]
struct PointQueryParams {
    /// WGS84 coordinates, validated by the handler
    lat: Option<String>,
    lon: Option<String>,
}

fn parse_sport_id(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("sport_id is required"))?;
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid sport_id '{}'", raw)))
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))?;
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_sport_id() {
        assert_eq!(parse_sport_id(Some("42")).unwrap(), 42);
        assert_eq!(parse_sport_id(Some(" 7 ")).unwrap(), 7);
        assert_eq!(
            parse_sport_id(None).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            parse_sport_id(Some("")).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            parse_sport_id(Some("abc")).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("lat", Some("55.7558")).unwrap(), 55.7558);
        assert_eq!(parse_coordinate("lon", Some(" -37.5 ")).unwrap(), -37.5);

        let missing = parse_coordinate("lat", None).unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.message, "lat is required");

        let invalid = parse_coordinate("lon", Some("east")).unwrap_err();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.message, "Invalid lon 'east'");
    }
}

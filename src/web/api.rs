use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{Aggregator, CatalogStatus, Category, Group, Satellite};
use crate::propagation::{
    ecef_to_geodetic, format_display, gmst, orbital_stats, propagate, teme_to_ecef_velocity,
    to_earth_fixed, DisplayCoords, OrbitalStats,
};
use crate::web::error::{ApiError, ApiResult, ErrorResponse};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SatellitesResponse {
    pub satellites: Vec<Satellite>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnavailableResponse {
    pub error: String,
    pub satellites: Vec<Satellite>,
    pub cached: bool,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "catalog",
    responses(
        (status = 200, description = "Current catalog snapshot", body = SatellitesResponse),
        (status = 503, description = "No satellite data available", body = UnavailableResponse),
        (status = 500, description = "Catalog state unreadable", body = ErrorResponse)
    )
)]
pub async fn list_satellites(State(state): State<AppState>) -> ApiResult<Response> {
    let snapshot = state
        .aggregator
        .snapshot()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if snapshot.status == CatalogStatus::Error && snapshot.satellites.is_empty() {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnavailableResponse {
                error: "satellite data unavailable".to_string(),
                satellites: Vec::new(),
                cached: false,
            }),
        )
            .into_response());
    }

    let count = snapshot.satellites.len();
    Ok((
        StatusCode::OK,
        Json(SatellitesResponse {
            satellites: snapshot.satellites,
            cached: snapshot.cached,
            timestamp: snapshot.timestamp,
            count,
        }),
    )
        .into_response())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: CatalogStatus,
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "catalog",
    responses(
        (status = 200, description = "Aggregator status", body = StatusResponse),
        (status = 500, description = "Catalog state unreadable", body = ErrorResponse)
    )
)]
pub async fn catalog_status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let status = state
        .aggregator
        .status()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(StatusResponse { status }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupInfo {
    pub key: String,
    pub label: String,
    pub category: Category,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupsResponse {
    pub groups: Vec<GroupInfo>,
}

#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "catalog",
    responses((status = 200, description = "Catalog groups fetched each cycle", body = GroupsResponse))
)]
pub async fn list_groups() -> Json<GroupsResponse> {
    let groups = Group::ALL
        .iter()
        .map(|g| GroupInfo {
            key: g.key().to_string(),
            label: g.label().to_string(),
            category: g.category(),
        })
        .collect();
    Json(GroupsResponse { groups })
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatsQuery {
    /// Query time, RFC3339; defaults to now.
    pub at: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteStatsResponse {
    pub id: String,
    pub name: String,
    pub at: DateTime<Utc>,
    /// Null when the element set is malformed beyond use.
    pub stats: Option<OrbitalStats>,
    /// Zero strings when propagation fails for this time.
    pub position: DisplayCoords,
    /// Speed relative to the rotating Earth, km/s. Null when propagation
    /// fails for this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_speed_km_s: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/satellites/{id}/stats",
    tag = "catalog",
    params(
        ("id" = String, Path, description = "Catalog number"),
        ("at" = Option<String>, Query, description = "Query time (RFC3339), defaults to now")
    ),
    responses(
        (status = 200, description = "Telemetry and geodetic fix", body = SatelliteStatsResponse),
        (status = 400, description = "Invalid query time"),
        (status = 404, description = "Unknown catalog number"),
        (status = 500, description = "Catalog state unreadable", body = ErrorResponse)
    )
)]
pub async fn satellite_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<SatelliteStatsResponse>> {
    let at = match query.at {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ApiError::BadRequest(format!("invalid time: {e}")))?,
        None => Utc::now(),
    };

    let snapshot = state
        .aggregator
        .snapshot()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let satellite = snapshot
        .satellites
        .iter()
        .find(|s| s.id == id)
        .ok_or(ApiError::NotFound("satellite_not_found"))?;

    let stats = orbital_stats(&satellite.tle1, &satellite.tle2, at);
    let state_vector = propagate(&satellite.tle1, &satellite.tle2, at);
    let geodetic = state_vector
        .as_ref()
        .map(|sv| ecef_to_geodetic(to_earth_fixed(sv.position, at)));
    let ground_speed_km_s = state_vector.as_ref().map(|sv| {
        let v = teme_to_ecef_velocity(sv, gmst(at));
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    });

    Ok(Json(SatelliteStatsResponse {
        id: satellite.id.clone(),
        name: satellite.name.clone(),
        at,
        stats,
        position: format_display(geodetic.as_ref()),
        ground_speed_km_s,
    }))
}

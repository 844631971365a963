use utoipa::OpenApi;

use super::api::{
    GroupInfo, GroupsResponse, SatelliteStatsResponse, SatellitesResponse, StatusResponse,
    UnavailableResponse,
};
use super::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::list_satellites,
        super::api::catalog_status,
        super::api::satellite_stats,
        super::api::list_groups,
    ),
    components(
        schemas(
            SatellitesResponse,
            UnavailableResponse,
            StatusResponse,
            SatelliteStatsResponse,
            GroupInfo,
            GroupsResponse,
            ErrorResponse,
            crate::catalog::Satellite,
            crate::catalog::Category,
            crate::catalog::CatalogStatus,
            crate::propagation::OrbitalStats,
            crate::propagation::DisplayCoords,
        )
    ),
    info(
        title = "Satwatch Catalog API",
        description = "Satellite catalog and orbital telemetry",
        version = "0.1.0"
    ),
    tags(
        (name = "catalog", description = "Catalog access and telemetry")
    )
)]
pub struct ApiDoc;

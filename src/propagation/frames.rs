//! Frame conversions: TEME (inertial) -> ECEF -> geodetic.
//!
//! Every rotation here is parameterized by the same Greenwich sidereal time
//! function, `gmst`. Earth-rotation consumers must use it too, otherwise
//! satellite tracks drift visibly against the rendered surface.
//!
//! Geodetic altitude uses a spherical mean-radius Earth while the propagation
//! model is ellipsoidal internally. The displayed numbers are calibrated
//! against this mixed convention; do not "fix" it.

use chrono::{DateTime, Utc};

use super::propagator::StateVector;

/// Mean Earth radius, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Earth rotation rate, rad/s.
pub const EARTH_ROTATION_RAD_S: f64 = 7.292115e-5;

/// Latitude and longitude in radians, height above the mean sphere in km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

/// Greenwich mean sidereal time in radians.
pub fn gmst(at: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()))
}

pub fn to_earth_fixed(position: [f64; 3], at: DateTime<Utc>) -> [f64; 3] {
    teme_to_ecef_position(position, gmst(at))
}

pub fn teme_to_ecef_position(pos: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        pos[0] * cos_g + pos[1] * sin_g,
        -pos[0] * sin_g + pos[1] * cos_g,
        pos[2],
    ]
}

pub fn teme_to_ecef_velocity(state: &StateVector, gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    let pos = teme_to_ecef_position(state.position, gmst);
    let rotated = [
        state.velocity[0] * cos_g + state.velocity[1] * sin_g,
        -state.velocity[0] * sin_g + state.velocity[1] * cos_g,
        state.velocity[2],
    ];
    [
        rotated[0] + EARTH_ROTATION_RAD_S * pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * pos[0],
        rotated[2],
    ]
}

/// Spherical conversion: latitude from the z component, longitude in the
/// equatorial plane, height above the mean radius.
pub fn ecef_to_geodetic(pos: [f64; 3]) -> Geodetic {
    let r = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt();
    if r == 0.0 {
        return Geodetic {
            latitude: 0.0,
            longitude: 0.0,
            height: -EARTH_RADIUS_KM,
        };
    }
    Geodetic {
        latitude: (pos[2] / r).asin(),
        longitude: pos[1].atan2(pos[0]),
        height: r - EARTH_RADIUS_KM,
    }
}

/// Fixed-precision strings for UI text: degrees at 4 decimal places,
/// altitude at 2. A missing position formats as zeros rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct DisplayCoords {
    pub lat: String,
    pub lon: String,
    pub alt: String,
}

pub fn format_display(geodetic: Option<&Geodetic>) -> DisplayCoords {
    match geodetic {
        Some(g) => DisplayCoords {
            lat: format!("{:.4}", g.latitude.to_degrees()),
            lon: format!("{:.4}", g.longitude.to_degrees()),
            alt: format!("{:.2}", g.height),
        },
        None => DisplayCoords {
            lat: "0.0000".to_string(),
            lon: "0.0000".to_string(),
            alt: "0.00".to_string(),
        },
    }
}

mod frames;
mod propagator;
mod stats;

pub use frames::{
    ecef_to_geodetic, format_display, gmst, teme_to_ecef_position, teme_to_ecef_velocity,
    to_earth_fixed, DisplayCoords, Geodetic, EARTH_RADIUS_KM, EARTH_ROTATION_RAD_S,
};
pub use propagator::{propagate, Propagator, StateVector};
pub use stats::{orbital_stats, OrbitalStats, MU_KM3_S2};

//! Scalar telemetry derived from raw TLE fields and the propagated state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::frames::EARTH_RADIUS_KM;
use super::propagator::propagate;
use crate::catalog::tle;

/// Earth gravitational parameter, km^3/s^2.
pub const MU_KM3_S2: f64 = 398600.4418;

const SECONDS_PER_DAY: f64 = 86400.0;
const MINUTES_PER_DAY: f64 = 1440.0;
/// Fallback orbital period when mean motion is absent or zero.
const DEFAULT_PERIOD_MIN: f64 = 100.0;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrbitalStats {
    pub velocity_km_s: f64,
    pub apogee_km: f64,
    pub perigee_km: f64,
    pub norad_id: String,
    /// International designator in compact YYNNNPPP form; expansion to the
    /// YYYY-NNNPPP display form is a presentation concern.
    pub intl_designator: String,
    pub period_min: f64,
}

/// All-or-nothing extraction: any malformed numeric field yields `None`
/// rather than a partially filled record. A failed propagation only zeroes
/// the velocity, since the element-derived fields are still meaningful.
pub fn orbital_stats(tle1: &str, tle2: &str, at: DateTime<Utc>) -> Option<OrbitalStats> {
    let norad_id = tle::norad_id(tle2)?;
    let intl_designator = tle::intl_designator(tle1)?;
    let eccentricity = tle::eccentricity(tle2)?;
    let mean_motion = tle::mean_motion_rev_day(tle2)?;

    let velocity_km_s = propagate(tle1, tle2, at)
        .map(|state| {
            (state.velocity[0].powi(2) + state.velocity[1].powi(2) + state.velocity[2].powi(2))
                .sqrt()
        })
        .unwrap_or(0.0);

    let (apogee_km, perigee_km, period_min) = if mean_motion > 0.0 {
        let n_rad_s = mean_motion * std::f64::consts::TAU / SECONDS_PER_DAY;
        let semi_major_km = (MU_KM3_S2 / (n_rad_s * n_rad_s)).powf(1.0 / 3.0);
        (
            semi_major_km * (1.0 + eccentricity) - EARTH_RADIUS_KM,
            semi_major_km * (1.0 - eccentricity) - EARTH_RADIUS_KM,
            MINUTES_PER_DAY / mean_motion,
        )
    } else {
        (0.0, 0.0, DEFAULT_PERIOD_MIN)
    };

    Some(OrbitalStats {
        velocity_km_s,
        apogee_km,
        perigee_km,
        norad_id,
        intl_designator,
        period_min,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_L1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_L2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn iss_stats_match_element_fields() {
        let stats = orbital_stats(ISS_L1, ISS_L2, Utc::now()).unwrap();
        assert_eq!(stats.norad_id, "25544");
        assert_eq!(stats.intl_designator, "98067A");
        assert!((stats.period_min - 91.59).abs() < 0.05, "{}", stats.period_min);
    }

    #[test]
    fn near_circular_orbit_has_close_apsides() {
        let stats = orbital_stats(ISS_L1, ISS_L2, Utc::now()).unwrap();
        // e ~ 0.00067, so apogee and perigee straddle a - R tightly.
        assert!((stats.apogee_km - stats.perigee_km).abs() < 20.0);
        let n_rad_s = 15.72125391 * std::f64::consts::TAU / SECONDS_PER_DAY;
        let a = (MU_KM3_S2 / (n_rad_s * n_rad_s)).powf(1.0 / 3.0);
        let mid = a - EARTH_RADIUS_KM;
        assert!((stats.apogee_km - mid).abs() < 10.0);
        assert!((stats.perigee_km - mid).abs() < 10.0);
    }

    #[test]
    fn velocity_is_the_speed_norm() {
        let epoch = crate::propagation::Propagator::new(ISS_L1, ISS_L2)
            .unwrap()
            .epoch()
            .and_utc();
        let stats = orbital_stats(ISS_L1, ISS_L2, epoch).unwrap();
        assert!((7.0..8.0).contains(&stats.velocity_km_s));
    }

    #[test]
    fn zero_mean_motion_defaults_the_period() {
        // Mean motion field zeroed out, checksum not relevant here.
        let line2 = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288  0.00000000563537";
        let stats = orbital_stats(ISS_L1, line2, Utc::now()).unwrap();
        assert_eq!(stats.period_min, 100.0);
        assert_eq!(stats.apogee_km, 0.0);
    }

    #[test]
    fn malformed_numeric_field_is_all_or_nothing() {
        let line2 = "2 25544  51.6416 247.4627 00067x3 130.5360 325.0288 15.72125391563537";
        assert!(orbital_stats(ISS_L1, line2, Utc::now()).is_none());
    }

    #[test]
    fn absent_lines_yield_none() {
        assert!(orbital_stats("", "", Utc::now()).is_none());
    }
}

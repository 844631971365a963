use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

/// Inertial (TEME) state at a query time: position in km, velocity in km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

/// Element set prepared for repeated per-frame queries. Construction does the
/// expensive parsing once; `state_at` is then a pure function of time.
pub struct Propagator {
    elements: Elements,
    constants: Constants,
}

impl Propagator {
    /// `None` on malformed fields or degenerate elements the model rejects.
    pub fn new(tle1: &str, tle2: &str) -> Option<Self> {
        let elements = Elements::from_tle(None, tle1.as_bytes(), tle2.as_bytes()).ok()?;
        let constants = Constants::from_elements(&elements).ok()?;
        Some(Propagator {
            elements,
            constants,
        })
    }

    /// Propagate to an arbitrary calendar time, before or after the element
    /// epoch. Accuracy degrades with distance from epoch; that is accepted.
    /// A model failure (e.g. orbital decay past end-of-life) yields `None`,
    /// never an error, so one bad object cannot stall a render pass.
    pub fn state_at(&self, at: DateTime<Utc>) -> Option<StateVector> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .ok()?;
        let prediction = self.constants.propagate(minutes).ok()?;

        let state = StateVector {
            position: prediction.position,
            velocity: prediction.velocity,
        };
        let finite = state
            .position
            .iter()
            .chain(state.velocity.iter())
            .all(|v| v.is_finite());
        finite.then_some(state)
    }

    pub fn epoch(&self) -> chrono::NaiveDateTime {
        self.elements.datetime
    }
}

/// One-shot convenience for callers that hold only the raw lines.
pub fn propagate(tle1: &str, tle2: &str, at: DateTime<Utc>) -> Option<StateVector> {
    Propagator::new(tle1, tle2)?.state_at(at)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_L1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_L2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn iss_epoch() -> DateTime<Utc> {
        Propagator::new(ISS_L1, ISS_L2).unwrap().epoch().and_utc()
    }

    #[test]
    fn iss_at_epoch_sits_at_low_earth_orbit_radius() {
        let state = propagate(ISS_L1, ISS_L2, iss_epoch()).unwrap();
        let r = (state.position[0].powi(2)
            + state.position[1].powi(2)
            + state.position[2].powi(2))
        .sqrt();
        // Mean Earth radius plus roughly the ISS altitude.
        assert!((6650.0..6850.0).contains(&r), "|r| = {r}");

        let v = (state.velocity[0].powi(2)
            + state.velocity[1].powi(2)
            + state.velocity[2].powi(2))
        .sqrt();
        assert!((7.0..8.0).contains(&v), "|v| = {v}");
    }

    #[test]
    fn propagation_is_deterministic() {
        let at = iss_epoch() + chrono::Duration::hours(3);
        let a = propagate(ISS_L1, ISS_L2, at).unwrap();
        let b = propagate(ISS_L1, ISS_L2, at).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_lines_yield_none() {
        assert!(Propagator::new("1 garbage", "2 garbage").is_none());
        assert!(propagate("", "", Utc::now()).is_none());
    }

    #[test]
    fn query_before_epoch_is_allowed() {
        let at = iss_epoch() - chrono::Duration::days(2);
        assert!(propagate(ISS_L1, ISS_L2, at).is_some());
    }
}

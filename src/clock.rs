//! Simulated clock shared by all propagation consumers.
//!
//! A single driver ticks the clock once per frame; every propagation query
//! issued during that frame reads the same `sim_time`, keeping satellite
//! positions and Earth rotation mutually consistent.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    pub sim_time: DateTime<Utc>,
    pub real_time: DateTime<Utc>,
    pub speed: f64,
    pub paused: bool,
}

impl SimClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        SimClock {
            sim_time: now,
            real_time: now,
            speed: 1.0,
            paused: false,
        }
    }

    /// Advance by the real elapsed time scaled by the playback speed.
    /// Called exactly once per frame.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let elapsed_ms = (now - self.real_time).num_milliseconds();
        self.real_time = now;
        if !self.paused {
            let scaled = (elapsed_ms as f64 * self.speed) as i64;
            self.sim_time += Duration::milliseconds(scaled);
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Snap simulated time back to real time.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.sim_time = now;
        self.real_time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn realtime_tick_advances_one_to_one() {
        let mut clock = SimClock::new(t0());
        clock.tick(t0() + Duration::seconds(5));
        assert_eq!(clock.sim_time, t0() + Duration::seconds(5));
    }

    #[test]
    fn speed_scales_simulated_time() {
        let mut clock = SimClock::new(t0());
        clock.set_speed(60.0);
        clock.tick(t0() + Duration::seconds(1));
        assert_eq!(clock.sim_time, t0() + Duration::seconds(60));
        assert_eq!(clock.real_time, t0() + Duration::seconds(1));
    }

    #[test]
    fn paused_clock_holds_sim_time_but_tracks_real_time() {
        let mut clock = SimClock::new(t0());
        clock.set_paused(true);
        clock.tick(t0() + Duration::seconds(30));
        assert_eq!(clock.sim_time, t0());
        assert_eq!(clock.real_time, t0() + Duration::seconds(30));

        // Unpausing must not replay the paused interval.
        clock.set_paused(false);
        clock.tick(t0() + Duration::seconds(31));
        assert_eq!(clock.sim_time, t0() + Duration::seconds(1));
    }

    #[test]
    fn reset_snaps_back_to_real_time() {
        let mut clock = SimClock::new(t0());
        clock.set_speed(1000.0);
        clock.tick(t0() + Duration::seconds(10));
        clock.reset(t0() + Duration::seconds(10));
        assert_eq!(clock.sim_time, clock.real_time);
    }
}

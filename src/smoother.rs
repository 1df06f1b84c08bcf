//! Per-track hysteresis turning noisy single-frame labels into a stable status.
//!
//! Any attentive or writing observation resets the track immediately. An
//! inattentive streak keeps its original start time; once it has lasted longer
//! than `sleep_after` seconds the track is reported as sleeping until the next
//! engaged observation. The stored status itself never becomes `Sleeping`.

use std::collections::HashMap;

use log::debug;

use crate::config::SmootherConfig;
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    pub status: Status,
    pub last_change_time: f64,
    pub last_seen: f64,
}

#[derive(Debug, Clone)]
pub struct StatusSmoother {
    states: HashMap<u32, TrackState>,
    sleep_after: f64,
    ttl: Option<f64>,
}

impl StatusSmoother {
    pub fn new(config: &SmootherConfig) -> Self {
        Self {
            states: HashMap::new(),
            sleep_after: config.sleep_after_secs,
            ttl: config.track_ttl_secs,
        }
    }

    pub fn update(&mut self, track_id: u32, raw: Status, now: f64) -> Status {
        match raw {
            Status::Inattentive => {
                if let Some(st) = self
                    .states
                    .get_mut(&track_id)
                    .filter(|st| st.status == Status::Inattentive)
                {
                    st.last_seen = now;

                    return if now - st.last_change_time > self.sleep_after {
                        Status::Sleeping
                    } else {
                        Status::Inattentive
                    };
                }

                self.reset(track_id, Status::Inattentive, now);
                Status::Inattentive
            }
            // never produced by the classifier; keep the streak going like inattentive
            Status::Sleeping => self.update(track_id, Status::Inattentive, now),
            engaged => {
                self.reset(track_id, engaged, now);
                engaged
            }
        }
    }

    fn reset(&mut self, track_id: u32, status: Status, now: f64) {
        if let Some(prev) = self.states.get(&track_id) {
            if prev.status != status {
                debug!("track {}: {} -> {}", track_id, prev.status, status);
            }
        }

        self.states.insert(
            track_id,
            TrackState {
                status,
                last_change_time: now,
                last_seen: now,
            },
        );
    }

    /// Drops tracks not observed within the configured TTL. No-op without a TTL.
    pub fn evict_stale(&mut self, now: f64) -> usize {
        let ttl = match self.ttl {
            Some(ttl) => ttl,
            None => return 0,
        };

        let before = self.states.len();
        self.states.retain(|id, st| {
            let keep = now - st.last_seen <= ttl;
            if !keep {
                debug!("track {} evicted after {:.1}s unseen", id, now - st.last_seen);
            }
            keep
        });

        before - self.states.len()
    }

    #[inline]
    pub fn state(&self, track_id: u32) -> Option<&TrackState> {
        self.states.get(&track_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for StatusSmoother {
    fn default() -> Self {
        Self::new(&SmootherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inattentive_turns_into_sleeping_after_threshold() {
        let mut sm = StatusSmoother::default();

        for t in 0..=120 {
            assert_eq!(
                sm.update(1, Status::Inattentive, t as f64),
                Status::Inattentive,
                "t={}",
                t
            );
        }

        assert_eq!(sm.update(1, Status::Inattentive, 120.001), Status::Sleeping);
        for t in 121..200 {
            assert_eq!(sm.update(1, Status::Inattentive, t as f64), Status::Sleeping);
        }

        let st = sm.state(1).unwrap();
        assert_eq!(st.status, Status::Inattentive);
        assert_eq!(st.last_change_time, 0.0);
    }

    #[test]
    fn engaged_frame_before_threshold_resets_the_clock() {
        let mut sm = StatusSmoother::default();
        let mut out = Vec::new();

        for t in 0..119 {
            out.push(sm.update(1, Status::Inattentive, t as f64));
        }
        out.push(sm.update(1, Status::Attentive, 119.0));
        for t in 120..230 {
            out.push(sm.update(1, Status::Inattentive, t as f64));
        }

        assert!(out.iter().all(|s| *s != Status::Sleeping));
        assert_eq!(sm.state(1).unwrap().last_change_time, 120.0);
    }

    #[test]
    fn sleeping_persists_until_engaged() {
        let mut sm = StatusSmoother::default();
        sm.update(4, Status::Inattentive, 0.0);
        assert_eq!(sm.update(4, Status::Inattentive, 500.0), Status::Sleeping);
        assert_eq!(sm.update(4, Status::Writing, 501.0), Status::Writing);
        assert_eq!(sm.update(4, Status::Inattentive, 502.0), Status::Inattentive);
    }

    #[test]
    fn tracks_are_independent() {
        let mut sm = StatusSmoother::default();
        sm.update(1, Status::Inattentive, 0.0);
        sm.update(2, Status::Attentive, 0.0);

        assert_eq!(sm.update(2, Status::Inattentive, 130.0), Status::Inattentive);
        assert_eq!(sm.update(1, Status::Inattentive, 130.0), Status::Sleeping);
        assert_eq!(sm.len(), 2);
    }

    #[test]
    fn unseen_tracks_stay_without_ttl() {
        let mut sm = StatusSmoother::default();
        sm.update(1, Status::Attentive, 0.0);
        assert_eq!(sm.evict_stale(10_000.0), 0);
        assert_eq!(sm.len(), 1);
    }

    #[test]
    fn ttl_evicts_unseen_tracks_only() {
        let mut sm = StatusSmoother::new(&SmootherConfig {
            track_ttl_secs: Some(5.0),
            ..SmootherConfig::default()
        });

        sm.update(1, Status::Inattentive, 0.0);
        sm.update(2, Status::Inattentive, 0.0);
        sm.update(2, Status::Inattentive, 8.0);

        assert_eq!(sm.evict_stale(9.0), 1);
        assert!(sm.state(1).is_none());
        // streak start is preserved for the surviving track
        assert_eq!(sm.state(2).unwrap().last_change_time, 0.0);
    }
}

//! # Frame Index
//!
//! Time-indexed access into a race's frame sequence.
//!
//! ## Lookup rules
//! - `frame_at(t)` clamps to the first/last frame outside the recorded range
//! - interval `i` is half-open `[frames[i].time, frames[i+1].time)`, the last frame is closed
//! - continuous fields blend linearly, discrete fields snap at `a >= 0.5`

use serde::Serialize;

use super::types::{Frame, TemptationMode};

/// Blended sample of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InterpolatedParticipant {
    pub distance: f32,
    pub lane_position: f32,
    pub speed: f32,
    pub hp: f32,
    pub temptation_mode: TemptationMode,
    pub blocked_by: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InterpolatedFrame {
    pub time: f32,
    /// Index of the earlier of the two blended frames
    pub frame_index: usize,
    pub participants: Vec<InterpolatedParticipant>,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameIndex<'a> {
    frames: &'a [Frame],
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl<'a> FrameIndex<'a> {
    pub fn new(frames: &'a [Frame]) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &'a [Frame] {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time of the last frame, 0 when empty.
    pub fn duration(&self) -> f32 {
        self.frames.last().map(|f| f.time).unwrap_or(0.0)
    }

    /// Index of the frame whose interval contains `t`. Returns 0 for an empty index.
    pub fn frame_at(&self, t: f32) -> usize {
        let Some(last) = self.frames.len().checked_sub(1) else {
            return 0;
        };
        if t <= self.frames[0].time {
            return 0;
        }
        if t >= self.frames[last].time {
            return last;
        }
        // First frame strictly after t, minus one. Equal times resolve to the
        // last frame sharing that time, so the interval stays half-open.
        let upper = self.frames.partition_point(|f| f.time <= t);
        upper.saturating_sub(1)
    }

    /// Blend frame `frame_at(t)` with its successor.
    pub fn interpolate(&self, t: f32) -> InterpolatedFrame {
        if self.frames.is_empty() {
            return InterpolatedFrame::default();
        }
        let i = self.frame_at(t);
        let f0 = &self.frames[i];
        let f1 = self.frames.get(i + 1).unwrap_or(f0);
        let (t0, t1) = (f0.time, f1.time);
        let a = if i + 1 < self.frames.len() {
            ((t - t0) / (t1 - t0).max(1e-9)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let take_later = a >= 0.5;

        let count = f0.participants.len().min(f1.participants.len());
        let participants = (0..count)
            .map(|idx| {
                let p0 = &f0.participants[idx];
                let p1 = &f1.participants[idx];
                let discrete = if take_later { p1 } else { p0 };
                InterpolatedParticipant {
                    distance: lerp(p0.distance, p1.distance, a),
                    lane_position: lerp(p0.lane_position as f32, p1.lane_position as f32, a),
                    speed: lerp(p0.speed as f32, p1.speed as f32, a),
                    hp: lerp(p0.hp, p1.hp, a),
                    temptation_mode: discrete.temptation_mode,
                    blocked_by: discrete.blocked_by,
                }
            })
            .collect();

        InterpolatedFrame { time: lerp(t0, t1, a), frame_index: i, participants }
    }

    /// Forward difference of speed (centi-units per second) from `frame_index`
    /// to the next frame, one value per participant slot.
    ///
    /// Zero at the final frame and for slots missing from either frame.
    pub fn current_acceleration(&self, frame_index: usize) -> Vec<f32> {
        let Some(f0) = self.frames.get(frame_index) else {
            return Vec::new();
        };
        let Some(f1) = self.frames.get(frame_index + 1) else {
            return vec![0.0; f0.participants.len()];
        };
        let dt = (f1.time - f0.time).max(1e-9);
        (0..f0.participants.len())
            .map(|idx| match f1.participants.get(idx) {
                Some(p1) => (p1.speed as f32 - f0.participants[idx].speed as f32) / dt,
                None => 0.0,
            })
            .collect()
    }

    /// Interpolated distance of one slot at time `t`.
    pub fn distance_at(&self, slot: usize, t: f32) -> Option<f32> {
        self.interpolate(t).participants.get(slot).map(|p| p.distance)
    }

    /// Largest recorded distance of one slot across all frames.
    pub fn max_distance(&self, slot: usize) -> Option<f32> {
        self.frames
            .iter()
            .filter_map(|f| f.participants.get(slot).map(|p| p.distance))
            .fold(None, |acc: Option<f32>, d| Some(acc.map_or(d, |m| m.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::LogBuilder;
    use crate::telemetry::ParticipantFrame;
    use proptest::prelude::*;

    fn frames() -> Vec<Frame> {
        LogBuilder::new(2).linear_frames(5, 1.0, &[10.0, 12.0]).build().frames
    }

    #[test]
    fn test_frame_at_clamps() {
        let frames = frames();
        let index = FrameIndex::new(&frames);
        assert_eq!(index.frame_at(-3.0), 0);
        assert_eq!(index.frame_at(0.0), 0);
        assert_eq!(index.frame_at(4.0), 4);
        assert_eq!(index.frame_at(99.0), 4);
    }

    #[test]
    fn test_frame_at_half_open_intervals() {
        let frames = frames();
        let index = FrameIndex::new(&frames);
        assert_eq!(index.frame_at(1.0), 1);
        assert_eq!(index.frame_at(1.999), 1);
        assert_eq!(index.frame_at(2.0), 2);
    }

    #[test]
    fn test_empty_index() {
        let index = FrameIndex::new(&[]);
        assert_eq!(index.frame_at(3.0), 0);
        assert!(index.interpolate(3.0).participants.is_empty());
        assert!(index.current_acceleration(0).is_empty());
        assert_eq!(index.duration(), 0.0);
        assert_eq!(index.max_distance(0), None);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let frames = frames();
        let index = FrameIndex::new(&frames);
        let mid = index.interpolate(2.5);
        assert_eq!(mid.frame_index, 2);
        assert!((mid.time - 2.5).abs() < 1e-6);
        assert!((mid.participants[0].distance - 25.0).abs() < 1e-4);
        assert!((mid.participants[1].distance - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_discrete_fields_snap_to_later_frame() {
        let mut frames = frames();
        frames[3].participants[0].temptation_mode = TemptationMode::Pace;
        frames[3].participants[0].blocked_by = Some(1);
        let index = FrameIndex::new(&frames);

        let early = index.interpolate(2.4);
        assert_eq!(early.participants[0].temptation_mode, TemptationMode::None);
        assert_eq!(early.participants[0].blocked_by, None);

        let late = index.interpolate(2.5);
        assert_eq!(late.participants[0].temptation_mode, TemptationMode::Pace);
        assert_eq!(late.participants[0].blocked_by, Some(1));
    }

    #[test]
    fn test_current_acceleration() {
        let mut frames = frames();
        frames[2].participants[1].speed = 1500;
        let index = FrameIndex::new(&frames);

        let acc = index.current_acceleration(1);
        assert_eq!(acc, vec![0.0, 300.0]);
        assert_eq!(index.current_acceleration(4), vec![0.0, 0.0]);
    }

    #[test]
    fn test_acceleration_missing_slot_is_zero() {
        let mut frames = frames();
        frames[2].participants.truncate(1);
        frames[2].participants[0].speed = 1100;
        let index = FrameIndex::new(&frames);
        assert_eq!(index.current_acceleration(1), vec![100.0, 0.0]);
    }

    #[test]
    fn test_max_distance() {
        let frames = frames();
        let index = FrameIndex::new(&frames);
        assert_eq!(index.max_distance(1), Some(48.0));
        assert_eq!(index.max_distance(7), None);
    }

    fn frames_strategy() -> impl Strategy<Value = Vec<Frame>> {
        prop::collection::vec((0.0f32..2.0, 0.0f32..3000.0, 0u16..3000, 0.0f32..2000.0), 1..40)
            .prop_map(|steps| {
                let mut time = 0.0;
                steps
                    .into_iter()
                    .map(|(dt, distance, speed, hp)| {
                        time += dt;
                        Frame {
                            time,
                            participants: vec![ParticipantFrame {
                                distance,
                                speed,
                                hp,
                                ..Default::default()
                            }],
                        }
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn prop_frame_at_is_monotonic(
            frames in frames_strategy(),
            mut ts in prop::collection::vec(-5.0f32..100.0, 2..20),
        ) {
            let index = FrameIndex::new(&frames);
            ts.sort_by(|a, b| a.total_cmp(b));
            let indices: Vec<usize> = ts.iter().map(|&t| index.frame_at(t)).collect();
            prop_assert!(indices.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(indices.iter().all(|&i| i < frames.len()));
        }

        #[test]
        fn prop_frame_at_clamps_outside_range(
            frames in frames_strategy(),
            below in 0.0f32..10.0,
            above in 0.0f32..10.0,
        ) {
            let index = FrameIndex::new(&frames);
            let first = frames[0].time;
            let last = frames[frames.len() - 1].time;
            prop_assert_eq!(index.frame_at(first - below), 0);
            prop_assert_eq!(index.frame_at(last + above), frames.len() - 1);
        }

        #[test]
        fn prop_interpolate_at_sample_is_exact(
            frames in frames_strategy(),
            pick in any::<prop::sample::Index>(),
        ) {
            let index = FrameIndex::new(&frames);
            let i = index.frame_at(frames[pick.index(frames.len())].time);
            let sample = &frames[i].participants[0];
            let blended = index.interpolate(frames[i].time);
            prop_assert_eq!(blended.participants[0].distance, sample.distance);
            prop_assert_eq!(blended.participants[0].speed, sample.speed as f32);
            prop_assert_eq!(blended.participants[0].hp, sample.hp);
        }
    }
}

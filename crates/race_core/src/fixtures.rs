//! Synthetic race logs and a wire encoder for tests and benches.
//!
//! The encoder writes the layout [`decode`](crate::telemetry::decode) reads.
//! [`encode_raw`] uses minimum-size strides and empty padding blocks;
//! [`encode_raw_with`] widens records and fills padding per [`WireLayout`].

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::telemetry::decoder::{PARTICIPANT_FRAME_MIN_SIZE, PARTICIPANT_RESULT_MIN_SIZE};
use crate::telemetry::*;

/// Builder for hand-shaped race logs.
#[derive(Debug, Clone)]
pub struct LogBuilder {
    log: RaceLog,
}

impl LogBuilder {
    /// `count` participants; finish order defaults to slot order (slot 0 wins).
    pub fn new(count: usize) -> Self {
        let results = (0..count)
            .map(|i| ParticipantResult {
                finish_order: i as i32,
                running_style: RunningStyle::from_id((i % 4 + 1) as u8),
                ..Default::default()
            })
            .collect();
        Self { log: RaceLog { version: 1, results, ..Default::default() } }
    }

    /// `count` frames spaced `dt` seconds apart; participant `i` runs at a
    /// constant `speeds[i]` m/s with full hp.
    pub fn linear_frames(mut self, count: usize, dt: f32, speeds: &[f32]) -> Self {
        for k in 0..count {
            let time = k as f32 * dt;
            let samples: Vec<(f32, f32, f32)> =
                speeds.iter().map(|&v| (v * time, v, 1000.0)).collect();
            self = self.frame(time, &samples);
        }
        self
    }

    /// Append one frame of `(distance, speed m/s, hp)` samples.
    pub fn frame(mut self, time: f32, samples: &[(f32, f32, f32)]) -> Self {
        let participants = samples
            .iter()
            .map(|&(distance, speed, hp)| ParticipantFrame {
                distance,
                speed: (speed * 100.0).round() as u16,
                hp,
                ..Default::default()
            })
            .collect();
        self.log.frames.push(Frame { time, participants });
        self
    }

    pub fn finish(mut self, orders: &[i32], times_raw: &[f32]) -> Self {
        for (i, result) in self.log.results.iter_mut().enumerate() {
            if let Some(&order) = orders.get(i) {
                result.finish_order = order;
            }
            if let Some(&time) = times_raw.get(i) {
                result.finish_time_raw = time;
                result.finish_time = time;
            }
        }
        self
    }

    pub fn spurt_start(mut self, distances: &[f32]) -> Self {
        for (result, &d) in self.log.results.iter_mut().zip(distances) {
            result.last_spurt_start_distance = d;
        }
        self
    }

    pub fn styles(mut self, styles: &[RunningStyle]) -> Self {
        for (result, &s) in self.log.results.iter_mut().zip(styles) {
            result.running_style = s;
        }
        self
    }

    pub fn event(mut self, time: f32, event_type: EventType, params: &[i32]) -> Self {
        self.log.events.push(EventRecord::new(time, event_type, params));
        self
    }

    pub fn build(self) -> RaceLog {
        self.log
    }
}

/// Extra bytes a newer payload may carry. Every extra byte is written as
/// [`WireLayout::FILL`] so a decoder that reads into it produces garbage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireLayout {
    /// Trailing header bytes after the version
    pub header_extra: usize,
    /// Trailing bytes in each participant frame record
    pub participant_frame_extra: usize,
    /// Trailing bytes in each frame after the last participant
    pub frame_extra: usize,
    /// Trailing bytes in each participant result record
    pub result_extra: usize,
    /// Sizes of padding blocks 1, 2 and 3
    pub padding: [usize; 3],
}

impl WireLayout {
    pub const FILL: u8 = 0xEE;
}

/// Binary body without compression, minimum strides.
pub fn encode_raw(log: &RaceLog) -> Vec<u8> {
    encode_raw_with(log, &WireLayout::default())
}

/// Binary body with widened strides and filled padding blocks.
pub fn encode_raw_with(log: &RaceLog, layout: &WireLayout) -> Vec<u8> {
    let count = log.results.len();
    let participant_stride = PARTICIPANT_FRAME_MIN_SIZE + layout.participant_frame_extra;
    let result_stride = PARTICIPANT_RESULT_MIN_SIZE + layout.result_extra;
    let fill = |out: &mut Vec<u8>, n: usize| out.resize(out.len() + n, WireLayout::FILL);
    let padding = |out: &mut Vec<u8>, n: usize| {
        out.extend_from_slice(&(n as i32).to_le_bytes());
        fill(out, n);
    };
    let mut out = Vec::new();

    out.extend_from_slice(&((4 + layout.header_extra) as i32).to_le_bytes());
    out.extend_from_slice(&log.version.to_le_bytes());
    fill(&mut out, layout.header_extra);
    out.extend_from_slice(&log.distance_diff_max.to_le_bytes());
    out.extend_from_slice(&(count as i32).to_le_bytes());
    out.extend_from_slice(&(participant_stride as i32).to_le_bytes());
    out.extend_from_slice(&(result_stride as i32).to_le_bytes());
    padding(&mut out, layout.padding[0]);

    let frame_size = 4 + count * participant_stride + layout.frame_extra;
    out.extend_from_slice(&(log.frames.len() as i32).to_le_bytes());
    out.extend_from_slice(&(frame_size as i32).to_le_bytes());
    for frame in &log.frames {
        out.extend_from_slice(&frame.time.to_le_bytes());
        for p in &frame.participants {
            out.extend_from_slice(&p.distance.to_le_bytes());
            out.extend_from_slice(&p.lane_position.to_le_bytes());
            out.extend_from_slice(&p.speed.to_le_bytes());
            out.extend_from_slice(&p.hp.to_le_bytes());
            out.push(p.temptation_mode.id() as u8);
            out.push(p.blocked_by.map(|b| b as i8).unwrap_or(-1) as u8);
            fill(&mut out, layout.participant_frame_extra);
        }
        fill(&mut out, layout.frame_extra);
    }
    padding(&mut out, layout.padding[1]);

    for r in &log.results {
        out.extend_from_slice(&r.finish_order.to_le_bytes());
        out.extend_from_slice(&r.finish_time.to_le_bytes());
        out.extend_from_slice(&r.finish_diff_time.to_le_bytes());
        out.extend_from_slice(&r.start_delay_time.to_le_bytes());
        out.push(r.guts_order);
        out.push(r.wit_order);
        out.extend_from_slice(&r.last_spurt_start_distance.to_le_bytes());
        out.push(r.running_style.id());
        out.extend_from_slice(&r.defeat.to_le_bytes());
        out.extend_from_slice(&r.finish_time_raw.to_le_bytes());
        fill(&mut out, layout.result_extra);
    }
    padding(&mut out, layout.padding[2]);

    out.extend_from_slice(&(log.events.len() as i32).to_le_bytes());
    for e in &log.events {
        let params = e.params();
        let size = 6 + params.len() * 4;
        out.extend_from_slice(&(size as i16).to_le_bytes());
        out.extend_from_slice(&e.frame_time.to_le_bytes());
        out.push(e.event_type.id() as u8);
        out.push(params.len() as u8);
        for p in params {
            out.extend_from_slice(&p.to_le_bytes());
        }
    }
    out
}

/// Gzip + base64, the shape found on line 2 of a race file.
pub fn encode_text(log: &RaceLog) -> String {
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&encode_raw(log)).expect("gzip into a Vec");
    let bytes = gz.finish().expect("gzip into a Vec");
    STANDARD.encode(bytes)
}

/// Metadata line for `count` participants split across `trainers` round-robin.
pub fn metadata_json(count: usize, trainers: &[&str], speed: u32) -> String {
    let records: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "frame_order": i + 1,
                "trainer_name": trainers[i % trainers.len().max(1)],
                "viewer_id": 1000 + (i % trainers.len().max(1)),
                "chara_id": 1001 + i,
                "card_id": 100101 + i,
                "trained_chara_id": 5000 + i,
                "running_style": i % 4 + 1,
                "speed": speed,
                "stamina": 800,
                "pow": 900,
                "guts": 400,
                "wiz": 600,
                "proper_distance_short": 5,
                "proper_distance_mile": 6,
                "proper_distance_middle": 7,
                "proper_distance_long": 6,
                "skill_array": [{"skill_id": 200011, "level": 1}],
            })
        })
        .collect();
    serde_json::Value::Array(records).to_string()
}

/// A complete two-line race file.
pub fn race_file_text(log: &RaceLog, metadata: &str) -> String {
    format!("{}\n{}\n", metadata, encode_text(log))
}

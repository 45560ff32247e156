//! Race scenario decoder.
//!
//! Text layer is standard base64. The decoded bytes are gzip-compressed when
//! they start with the gzip magic, raw otherwise. The binary body is a
//! little-endian header, a frame block, a result block and an event block;
//! every size field is a stride so newer payloads with wider records still
//! decode.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;

use super::types::*;
use crate::error::DecodeError;

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// distance f32 + lane u16 + speed u16 + hp f32 + temptation i8 + blocker i8
pub const PARTICIPANT_FRAME_MIN_SIZE: usize = 14;

/// Sum of the fixed fields in a participant result record
pub const PARTICIPANT_RESULT_MIN_SIZE: usize = 31;

/// frame_time f32 + type i8 + param_count i8
const EVENT_HEADER_SIZE: usize = 6;

/// Hard cap on participants; one bit per participant in the event target mask.
pub const MAX_PARTICIPANTS: usize = 32;

/// Decode a base64 race scenario.
pub fn decode(text: &str) -> Result<RaceLog, DecodeError> {
    decode_with_limit(text, MAX_PARTICIPANTS)
}

pub fn decode_with_limit(text: &str, max_participants: usize) -> Result<RaceLog, DecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }
    let bytes = STANDARD.decode(text).map_err(|e| DecodeError::Base64(e.to_string()))?;
    decode_bytes_with_limit(&bytes, max_participants)
}

/// Decode already base64-decoded bytes (gzip or raw).
pub fn decode_bytes(bytes: &[u8]) -> Result<RaceLog, DecodeError> {
    decode_bytes_with_limit(bytes, MAX_PARTICIPANTS)
}

/// `max_participants` above [`MAX_PARTICIPANTS`] is clamped to it; the event
/// target mask cannot address more slots.
pub fn decode_bytes_with_limit(
    bytes: &[u8],
    max_participants: usize,
) -> Result<RaceLog, DecodeError> {
    let max_participants = max_participants.min(MAX_PARTICIPANTS);
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut raw = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut raw)
            .map_err(|e| DecodeError::Decompress(e.to_string()))?;
        return parse_body(&raw, max_participants);
    }
    parse_body(bytes, max_participants)
}

fn parse_body(data: &[u8], max_participants: usize) -> Result<RaceLog, DecodeError> {
    let mut r = ByteReader::new(data);

    // Header block: length-prefixed, version is its first field
    let header_len = r.read_len("header length")?;
    let header = r.slice(header_len)?;
    let version = if header.len() >= 4 {
        i32::from_le_bytes([header[0], header[1], header[2], header[3]])
    } else {
        0
    };

    let distance_diff_max = r.f32()?;
    let participant_count = r.read_len("participant count")?;
    if participant_count > max_participants {
        return Err(DecodeError::TooManyParticipants {
            count: participant_count,
            max: max_participants,
        });
    }
    let frame_stride = r.read_len("participant frame size")?;
    if participant_count > 0 && frame_stride < PARTICIPANT_FRAME_MIN_SIZE {
        return Err(DecodeError::InvalidLength {
            field: "participant frame size",
            value: frame_stride as i64,
        });
    }
    let result_stride = r.read_len("participant result size")?;
    if participant_count > 0 && result_stride < PARTICIPANT_RESULT_MIN_SIZE {
        return Err(DecodeError::InvalidLength {
            field: "participant result size",
            value: result_stride as i64,
        });
    }
    r.skip_padding("padding 1")?;

    let frames = parse_frames(&mut r, participant_count, frame_stride)?;
    r.skip_padding("padding 2")?;

    let mut results = Vec::with_capacity(participant_count);
    for _ in 0..participant_count {
        let record = r.slice(result_stride)?;
        results.push(parse_result(record)?);
    }
    if results.iter().filter(|res| res.finish_order == 0).count() > 1 {
        return Err(DecodeError::DuplicateWinner);
    }
    r.skip_padding("padding 3")?;

    let events = parse_events(&mut r)?;

    Ok(RaceLog { version, distance_diff_max, frames, results, events })
}

fn parse_frames(
    r: &mut ByteReader<'_>,
    participant_count: usize,
    participant_stride: usize,
) -> Result<Vec<Frame>, DecodeError> {
    let frame_count = r.read_len("frame count")?;
    let frame_size = r.read_len("frame size")?;
    let needed = 4 + participant_count * participant_stride;
    if frame_count > 0 && frame_size < needed {
        return Err(DecodeError::InvalidLength { field: "frame size", value: frame_size as i64 });
    }
    // Reject before allocating for a count the payload cannot hold
    r.ensure(frame_count.saturating_mul(frame_size))?;

    let mut frames = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        let mut fr = ByteReader::new(r.slice(frame_size)?);
        let time = fr.f32()?;
        if let Some(prev) = frames.last().map(|f: &Frame| f.time) {
            if time < prev {
                return Err(DecodeError::UnorderedFrames { index });
            }
        }
        let mut participants = Vec::with_capacity(participant_count);
        for _ in 0..participant_count {
            let mut pr = ByteReader::new(fr.slice(participant_stride)?);
            let distance = pr.f32()?;
            let lane_position = pr.u16()?;
            let speed = pr.u16()?;
            let hp = pr.f32()?;
            let temptation_mode = TemptationMode::from_id(pr.i8()?);
            let blocker = pr.i8()?;
            participants.push(ParticipantFrame {
                distance,
                lane_position,
                speed,
                hp,
                temptation_mode,
                blocked_by: u8::try_from(blocker).ok(),
            });
        }
        frames.push(Frame { time, participants });
    }
    Ok(frames)
}

fn parse_result(record: &[u8]) -> Result<ParticipantResult, DecodeError> {
    let mut r = ByteReader::new(record);
    Ok(ParticipantResult {
        finish_order: r.i32()?,
        finish_time: r.f32()?,
        finish_diff_time: r.f32()?,
        start_delay_time: r.f32()?,
        guts_order: r.u8()?,
        wit_order: r.u8()?,
        last_spurt_start_distance: r.f32()?,
        running_style: RunningStyle::from_id(r.u8()?),
        defeat: r.i32()?,
        finish_time_raw: r.f32()?,
    })
}

fn parse_events(r: &mut ByteReader<'_>) -> Result<Vec<EventRecord>, DecodeError> {
    let event_count = r.read_len("event count")?;
    // Each event needs at least its i16 size prefix
    r.ensure(event_count.saturating_mul(2))?;

    let mut events = Vec::with_capacity(event_count);
    for _ in 0..event_count {
        let size = r.i16()?;
        if (size as i64) < EVENT_HEADER_SIZE as i64 {
            return Err(DecodeError::InvalidLength { field: "event size", value: size as i64 });
        }
        let mut er = ByteReader::new(r.slice(size as usize)?);
        let frame_time = er.f32()?;
        let event_type = EventType::from_id(er.i8()?);
        let param_count = er.i8()?;
        if param_count < 0 {
            return Err(DecodeError::InvalidLength {
                field: "event param count",
                value: param_count as i64,
            });
        }
        let mut params = [0i32; MAX_EVENT_PARAMS];
        for i in 0..param_count as usize {
            let value = er.i32()?;
            if i < MAX_EVENT_PARAMS {
                params[i] = value;
            }
        }
        events.push(EventRecord {
            frame_time,
            event_type,
            param_count: (param_count as usize).min(MAX_EVENT_PARAMS) as u8,
            params,
        });
    }
    Ok(events)
}

/// Bounds-checked little-endian cursor.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.data.len().saturating_sub(self.offset) < needed {
            return Err(DecodeError::TooShort {
                needed,
                offset: self.offset,
                len: self.data.len(),
            });
        }
        Ok(())
    }

    fn slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(len)?;
        let out = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.slice(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.u8()? as i8)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    /// i32 that must be non-negative.
    fn read_len(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let value = self.i32()?;
        usize::try_from(value)
            .map_err(|_| DecodeError::InvalidLength { field, value: value as i64 })
    }

    fn skip_padding(&mut self, field: &'static str) -> Result<(), DecodeError> {
        let len = self.read_len(field)?;
        self.slice(len).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encode_raw, encode_raw_with, encode_text, LogBuilder, WireLayout};

    fn sample_log() -> RaceLog {
        LogBuilder::new(3)
            .linear_frames(6, 1.0, &[400.0, 380.0, 360.0])
            .finish(&[0, 1, 2], &[5.0, 5.3, 5.6])
            .spurt_start(&[1340.0, 0.0, 1200.0])
            .event(2.5, EventType::Skill, &[2, 999, 1, 0, 0b0110])
            .build()
    }

    #[test]
    fn test_decode_text_matches_source() {
        let log = sample_log();
        let text = encode_text(&log);
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, log);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let text = encode_text(&sample_log());
        assert_eq!(decode(&text).unwrap(), decode(&text).unwrap());
    }

    #[test]
    fn test_raw_payload_without_gzip() {
        let log = sample_log();
        let raw = encode_raw(&log);
        assert_ne!(&raw[..2], &GZIP_MAGIC);
        assert_eq!(decode_bytes(&raw).unwrap(), log);
    }

    #[test]
    fn test_zero_frames_is_valid() {
        let log = LogBuilder::new(2).finish(&[1, 0], &[0.0, 0.0]).build();
        let decoded = decode(&encode_text(&log)).unwrap();
        assert!(decoded.frames.is_empty());
        assert_eq!(decoded.results.len(), 2);
    }

    #[test]
    fn test_empty_and_bad_base64() {
        assert_eq!(decode("   "), Err(DecodeError::Empty));
        assert!(matches!(decode("@@not-base64@@"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_truncated_payload_fails() {
        let raw = encode_raw(&sample_log());
        for cut in [3, 20, raw.len() / 2, raw.len() - 1] {
            let err = decode_bytes(&raw[..cut]).unwrap_err();
            assert!(
                matches!(err, DecodeError::TooShort { .. }),
                "cut at {} gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn test_corrupt_gzip_fails() {
        let mut bytes = GZIP_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(decode_bytes(&bytes), Err(DecodeError::Decompress(_))));
    }

    #[test]
    fn test_negative_length_prefix() {
        let raw = (-5i32).to_le_bytes();
        assert_eq!(
            decode_bytes(&raw),
            Err(DecodeError::InvalidLength { field: "header length", value: -5 })
        );
    }

    #[test]
    fn test_participant_limit_enforced() {
        let log = LogBuilder::new(5).build();
        let raw = encode_raw(&log);
        assert_eq!(
            decode_bytes_with_limit(&raw, 4),
            Err(DecodeError::TooManyParticipants { count: 5, max: 4 })
        );
    }

    #[test]
    fn test_limit_above_mask_width_is_clamped() {
        let log = LogBuilder::new(40).event(1.0, EventType::Skill, &[0, 7, 0, 0, -1]).build();
        let raw = encode_raw(&log);
        assert_eq!(
            decode_bytes_with_limit(&raw, 64),
            Err(DecodeError::TooManyParticipants { count: 40, max: MAX_PARTICIPANTS })
        );
        assert!(decode_bytes_with_limit(&encode_raw(&LogBuilder::new(32).build()), 64).is_ok());
    }

    #[test]
    fn test_wider_records_and_padding_are_skipped() {
        let mut log = sample_log();
        log.frames[4].participants[2].hp = 0.0;
        log.frames[4].participants[1].temptation_mode = TemptationMode::from_id(2);
        log.frames[1].participants[0].blocked_by = Some(2);
        let layout = WireLayout {
            header_extra: 12,
            participant_frame_extra: 6,
            frame_extra: 3,
            result_extra: 9,
            padding: [5, 7, 11],
        };
        let raw = encode_raw_with(&log, &layout);
        assert!(raw.len() > encode_raw(&log).len());
        assert_eq!(decode_bytes(&raw).unwrap(), log);
    }

    #[test]
    fn test_participant_frame_record_layout() {
        let log = LogBuilder::new(1)
            .frame(0.0, &[(12.5, 3.0, 850.25)])
            .frame(1.0, &[(15.5, 3.0, 0.0)])
            .build();
        let raw = encode_raw(&log);
        // header(4+4) + diff_max + count + 2 strides + padding_1 + frame_count + frame_size
        let first_frame = 8 + 4 * 7;
        let record = &raw[first_frame + 4..first_frame + 4 + PARTICIPANT_FRAME_MIN_SIZE];
        assert_eq!(f32::from_le_bytes(record[8..12].try_into().unwrap()), 850.25);
        assert_eq!(record[13] as i8, -1);

        let decoded = decode_bytes(&raw).unwrap();
        assert_eq!(decoded.frames[0].participants[0].hp, 850.25);
        assert_eq!(decoded.frames[1].time, 1.0);
    }

    #[test]
    fn test_unordered_frames_rejected() {
        let mut log = sample_log();
        log.frames[3].time = 0.5;
        let err = decode_bytes(&encode_raw(&log)).unwrap_err();
        assert_eq!(err, DecodeError::UnorderedFrames { index: 3 });
    }

    #[test]
    fn test_duplicate_winner_rejected() {
        let log = LogBuilder::new(2).finish(&[0, 0], &[1.0, 1.0]).build();
        assert_eq!(decode_bytes(&encode_raw(&log)), Err(DecodeError::DuplicateWinner));
    }

    #[test]
    fn test_blocker_sentinel_maps_to_none() {
        let mut log = sample_log();
        log.frames[2].participants[1].blocked_by = Some(0);
        let decoded = decode_bytes(&encode_raw(&log)).unwrap();
        assert_eq!(decoded.frames[2].participants[1].blocked_by, Some(0));
        assert_eq!(decoded.frames[2].participants[0].blocked_by, None);
    }
}

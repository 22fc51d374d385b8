//! The primitive codec contract and its two backends.
//!
//! [`Encode`]/[`Decode`] cover exactly the atomic vocabulary the traversal
//! engine emits: the fixed-width primitives, strings, byte buffers, lengths,
//! decimals, instants, and UUIDs. Everything structural (members, items,
//! back-references, type tags) is spelled by the engine *in terms of* these
//! operations, which is what keeps the two backends interchangeable.

mod binary;
mod text;

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use text::{TextDecoder, TextEncoder};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Decimal;
use crate::wire::{Settings, WireResult};

/// The write half of a codec backend.
pub trait Encode {
    fn write_bool(&mut self, v: bool) -> WireResult<()>;
    fn write_i16(&mut self, v: i16) -> WireResult<()>;
    fn write_u16(&mut self, v: u16) -> WireResult<()>;
    fn write_i32(&mut self, v: i32) -> WireResult<()>;
    fn write_u32(&mut self, v: u32) -> WireResult<()>;
    fn write_i64(&mut self, v: i64) -> WireResult<()>;
    fn write_u64(&mut self, v: u64) -> WireResult<()>;
    fn write_f32(&mut self, v: f32) -> WireResult<()>;
    fn write_f64(&mut self, v: f64) -> WireResult<()>;

    /// Writes a string, length-prefixed per
    /// [`Settings::use_size_prefix`](crate::wire::Settings).
    fn write_str(&mut self, v: &str, settings: &Settings) -> WireResult<()>;

    /// Writes a byte buffer, length-prefixed per
    /// [`Settings::use_size_prefix`](crate::wire::Settings).
    fn write_bytes(&mut self, v: &[u8], settings: &Settings) -> WireResult<()>;

    /// Writes a length or index at [`Settings::size_width`](crate::wire::Settings).
    fn write_len(&mut self, len: usize, settings: &Settings) -> WireResult<()>;

    fn write_decimal(&mut self, v: Decimal) -> WireResult<()>;
    fn write_datetime(&mut self, v: DateTime<Utc>, settings: &Settings) -> WireResult<()>;
    fn write_uuid(&mut self, v: Uuid) -> WireResult<()>;

    /// Flushes the underlying transport.
    fn flush(&mut self) -> WireResult<()>;
}

/// The read half of a codec backend, mirroring [`Encode`] operation for
/// operation.
pub trait Decode {
    fn read_bool(&mut self) -> WireResult<bool>;
    fn read_i16(&mut self) -> WireResult<i16>;
    fn read_u16(&mut self) -> WireResult<u16>;
    fn read_i32(&mut self) -> WireResult<i32>;
    fn read_u32(&mut self) -> WireResult<u32>;
    fn read_i64(&mut self) -> WireResult<i64>;
    fn read_u64(&mut self) -> WireResult<u64>;
    fn read_f32(&mut self) -> WireResult<f32>;
    fn read_f64(&mut self) -> WireResult<f64>;

    fn read_str(&mut self, settings: &Settings) -> WireResult<String>;
    fn read_bytes(&mut self, settings: &Settings) -> WireResult<Vec<u8>>;
    fn read_len(&mut self, settings: &Settings) -> WireResult<usize>;

    fn read_decimal(&mut self) -> WireResult<Decimal>;
    fn read_datetime(&mut self, settings: &Settings) -> WireResult<DateTime<Utc>>;
    fn read_uuid(&mut self) -> WireResult<Uuid>;
}

// Offset between 0001-01-01T00:00:00Z and the Unix epoch, in ticks
// (100-nanosecond intervals).
const EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

pub(crate) fn datetime_to_wire(v: DateTime<Utc>, settings: &Settings) -> i64 {
    match settings.date_encoding {
        crate::wire::DateEncoding::Ticks => {
            EPOCH_TICKS
                + v.timestamp() * TICKS_PER_SECOND
                + i64::from(v.timestamp_subsec_nanos() / 100)
        }
        crate::wire::DateEncoding::MillisecondsSinceEpoch => v.timestamp_millis(),
        crate::wire::DateEncoding::SecondsSinceEpoch => v.timestamp(),
    }
}

pub(crate) fn datetime_from_wire(raw: i64, settings: &Settings) -> WireResult<DateTime<Utc>> {
    let parsed = match settings.date_encoding {
        crate::wire::DateEncoding::Ticks => {
            let unix_ticks = raw - EPOCH_TICKS;
            let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
            let nanos = (unix_ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
            DateTime::from_timestamp(secs, nanos)
        }
        crate::wire::DateEncoding::MillisecondsSinceEpoch => DateTime::from_timestamp_millis(raw),
        crate::wire::DateEncoding::SecondsSinceEpoch => DateTime::from_timestamp(raw, 0),
    };
    parsed.ok_or_else(|| crate::wire::WireError::Format(format!("instant {raw} out of range")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::wire::DateEncoding;

    #[test]
    fn tick_conversion_is_anchored_at_year_one() {
        let settings = Settings::default().with_date_encoding(DateEncoding::Ticks);
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(datetime_to_wire(epoch, &settings), EPOCH_TICKS);
        assert_eq!(datetime_from_wire(EPOCH_TICKS, &settings).unwrap(), epoch);
    }

    #[test]
    fn sub_second_precision_survives_ticks() {
        let settings = Settings::default().with_date_encoding(DateEncoding::Ticks);
        let instant = DateTime::from_timestamp(1_700_000_000, 123_456_700).unwrap();
        let raw = datetime_to_wire(instant, &settings);
        assert_eq!(datetime_from_wire(raw, &settings).unwrap(), instant);
    }

    #[test]
    fn second_encoding_truncates_fractions() {
        let settings = Settings::default().with_date_encoding(DateEncoding::SecondsSinceEpoch);
        let instant = DateTime::from_timestamp(1_700_000_000, 900_000_000).unwrap();
        let raw = datetime_to_wire(instant, &settings);
        let back = datetime_from_wire(raw, &settings).unwrap();
        assert_eq!(back.timestamp(), 1_700_000_000);
        assert_eq!(back.timestamp_subsec_nanos(), 0);
    }
}

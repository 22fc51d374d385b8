//! The little-endian binary backend.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Decimal;
use crate::wire::codec::{Decode, Encode, datetime_from_wire, datetime_to_wire};
use crate::wire::{Settings, SizeWidth, WireError, WireResult};

// -----------------------------------------------------------------------------
// BinaryEncoder

/// [`Encode`] implementation writing little-endian fixed-width fields.
pub struct BinaryEncoder<W: Write> {
    out: W,
}

impl<W: Write> BinaryEncoder<W> {
    /// Wraps a transport.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwraps the transport.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Encode for BinaryEncoder<W> {
    fn write_bool(&mut self, v: bool) -> WireResult<()> {
        Ok(self.out.write_u8(u8::from(v))?)
    }

    fn write_i16(&mut self, v: i16) -> WireResult<()> {
        Ok(self.out.write_i16::<LittleEndian>(v)?)
    }

    fn write_u16(&mut self, v: u16) -> WireResult<()> {
        Ok(self.out.write_u16::<LittleEndian>(v)?)
    }

    fn write_i32(&mut self, v: i32) -> WireResult<()> {
        Ok(self.out.write_i32::<LittleEndian>(v)?)
    }

    fn write_u32(&mut self, v: u32) -> WireResult<()> {
        Ok(self.out.write_u32::<LittleEndian>(v)?)
    }

    fn write_i64(&mut self, v: i64) -> WireResult<()> {
        Ok(self.out.write_i64::<LittleEndian>(v)?)
    }

    fn write_u64(&mut self, v: u64) -> WireResult<()> {
        Ok(self.out.write_u64::<LittleEndian>(v)?)
    }

    fn write_f32(&mut self, v: f32) -> WireResult<()> {
        Ok(self.out.write_f32::<LittleEndian>(v)?)
    }

    fn write_f64(&mut self, v: f64) -> WireResult<()> {
        Ok(self.out.write_f64::<LittleEndian>(v)?)
    }

    fn write_str(&mut self, v: &str, settings: &Settings) -> WireResult<()> {
        self.write_bytes(v.as_bytes(), settings)
    }

    fn write_bytes(&mut self, v: &[u8], settings: &Settings) -> WireResult<()> {
        if settings.use_size_prefix {
            self.write_len(v.len(), settings)?;
        }
        Ok(self.out.write_all(v)?)
    }

    fn write_len(&mut self, len: usize, settings: &Settings) -> WireResult<()> {
        let len = len as u64;
        if len > settings.size_width.max_len() {
            return Err(WireError::Format(format!(
                "length {len} exceeds the configured {:?} width",
                settings.size_width
            )));
        }
        match settings.size_width {
            SizeWidth::U16 => Ok(self.out.write_u16::<LittleEndian>(len as u16)?),
            SizeWidth::U32 => Ok(self.out.write_u32::<LittleEndian>(len as u32)?),
            SizeWidth::U64 => Ok(self.out.write_u64::<LittleEndian>(len)?),
        }
    }

    fn write_decimal(&mut self, v: Decimal) -> WireResult<()> {
        self.out.write_u32::<LittleEndian>(v.lo())?;
        self.out.write_u32::<LittleEndian>(v.mid())?;
        self.out.write_u32::<LittleEndian>(v.hi())?;
        Ok(self.out.write_u32::<LittleEndian>(v.flags())?)
    }

    fn write_datetime(&mut self, v: DateTime<Utc>, settings: &Settings) -> WireResult<()> {
        self.write_i64(datetime_to_wire(v, settings))
    }

    fn write_uuid(&mut self, v: Uuid) -> WireResult<()> {
        Ok(self.out.write_all(v.as_bytes())?)
    }

    fn flush(&mut self) -> WireResult<()> {
        Ok(self.out.flush()?)
    }
}

// -----------------------------------------------------------------------------
// BinaryDecoder

/// [`Decode`] implementation mirroring [`BinaryEncoder`].
pub struct BinaryDecoder<R: Read> {
    input: R,
}

impl<R: Read> BinaryDecoder<R> {
    /// Wraps a transport.
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Unwraps the transport.
    pub fn into_inner(self) -> R {
        self.input
    }
}

impl<R: Read> Decode for BinaryDecoder<R> {
    fn read_bool(&mut self) -> WireResult<bool> {
        match self.input.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::Format(format!("invalid boolean byte {other:#04x}"))),
        }
    }

    fn read_i16(&mut self) -> WireResult<i16> {
        Ok(self.input.read_i16::<LittleEndian>()?)
    }

    fn read_u16(&mut self) -> WireResult<u16> {
        Ok(self.input.read_u16::<LittleEndian>()?)
    }

    fn read_i32(&mut self) -> WireResult<i32> {
        Ok(self.input.read_i32::<LittleEndian>()?)
    }

    fn read_u32(&mut self) -> WireResult<u32> {
        Ok(self.input.read_u32::<LittleEndian>()?)
    }

    fn read_i64(&mut self) -> WireResult<i64> {
        Ok(self.input.read_i64::<LittleEndian>()?)
    }

    fn read_u64(&mut self) -> WireResult<u64> {
        Ok(self.input.read_u64::<LittleEndian>()?)
    }

    fn read_f32(&mut self) -> WireResult<f32> {
        Ok(self.input.read_f32::<LittleEndian>()?)
    }

    fn read_f64(&mut self) -> WireResult<f64> {
        Ok(self.input.read_f64::<LittleEndian>()?)
    }

    fn read_str(&mut self, settings: &Settings) -> WireResult<String> {
        let bytes = self.read_bytes(settings)?;
        String::from_utf8(bytes)
            .map_err(|err| WireError::Format(format!("invalid UTF-8 in string: {err}")))
    }

    fn read_bytes(&mut self, settings: &Settings) -> WireResult<Vec<u8>> {
        let len = self.read_len(settings)?;
        let mut bytes = vec![0_u8; len];
        self.input.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_len(&mut self, settings: &Settings) -> WireResult<usize> {
        if !settings.use_size_prefix {
            return Err(WireError::Format(
                "data written without size prefixes cannot be read back".to_owned(),
            ));
        }
        let len = match settings.size_width {
            SizeWidth::U16 => u64::from(self.input.read_u16::<LittleEndian>()?),
            SizeWidth::U32 => u64::from(self.input.read_u32::<LittleEndian>()?),
            SizeWidth::U64 => self.input.read_u64::<LittleEndian>()?,
        };
        usize::try_from(len)
            .map_err(|_| WireError::Format(format!("length {len} exceeds the address space")))
    }

    fn read_decimal(&mut self) -> WireResult<Decimal> {
        let lo = self.input.read_u32::<LittleEndian>()?;
        let mid = self.input.read_u32::<LittleEndian>()?;
        let hi = self.input.read_u32::<LittleEndian>()?;
        let flags = self.input.read_u32::<LittleEndian>()?;
        Decimal::from_words(lo, mid, hi, flags)
            .ok_or_else(|| WireError::Format(format!("invalid decimal flags {flags:#010x}")))
    }

    fn read_datetime(&mut self, settings: &Settings) -> WireResult<DateTime<Utc>> {
        datetime_from_wire(self.read_i64()?, settings)
    }

    fn read_uuid(&mut self) -> WireResult<Uuid> {
        let mut bytes = [0_u8; 16];
        self.input.read_exact(&mut bytes)?;
        Ok(Uuid::from_bytes(bytes))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(
        write: impl FnOnce(&mut BinaryEncoder<&mut Vec<u8>>),
    ) -> BinaryDecoder<std::io::Cursor<Vec<u8>>> {
        let mut buf = Vec::new();
        let mut encoder = BinaryEncoder::new(&mut buf);
        write(&mut encoder);
        BinaryDecoder::new(std::io::Cursor::new(buf))
    }

    #[test]
    fn fixed_width_fields_are_little_endian() {
        let mut buf = Vec::new();
        let mut encoder = BinaryEncoder::new(&mut buf);
        encoder.write_u32(0x0102_0304).unwrap();
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn strings_carry_a_length_prefix() {
        let settings = Settings::default().with_size_width(SizeWidth::U16);
        let mut decoder = round_trip(|enc| {
            enc.write_str("héllo", &settings).unwrap();
        });
        assert_eq!(decoder.read_str(&settings).unwrap(), "héllo");
    }

    #[test]
    fn u16_width_rejects_oversized_buffers() {
        let settings = Settings::default().with_size_width(SizeWidth::U16);
        let mut encoder = BinaryEncoder::new(Vec::new());
        let big = vec![0_u8; usize::from(u16::MAX) + 1];
        assert!(matches!(
            encoder.write_bytes(&big, &settings),
            Err(WireError::Format(_))
        ));
    }

    #[test]
    fn reading_unprefixed_data_is_refused() {
        let settings = Settings::default().with_size_prefix(false);
        let mut encoder = BinaryEncoder::new(Vec::new());
        encoder.write_str("write-only", &settings).unwrap();
        let mut decoder = BinaryDecoder::new(std::io::Cursor::new(encoder.into_inner()));
        assert!(matches!(
            decoder.read_str(&settings),
            Err(WireError::Format(_))
        ));
    }

    #[test]
    fn decimal_travels_as_four_words() {
        let value = Decimal::from_parts(98_765_432_109_876, true, 6).unwrap();
        let mut decoder = round_trip(|enc| {
            enc.write_decimal(value).unwrap();
        });
        assert_eq!(decoder.read_decimal().unwrap(), value);
    }

    #[test]
    fn corrupt_decimal_flags_are_rejected() {
        let mut decoder = BinaryDecoder::new(std::io::Cursor::new(vec![
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0x7F,
        ]));
        assert!(matches!(decoder.read_decimal(), Err(WireError::Format(_))));
    }
}

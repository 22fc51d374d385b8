//! The newline-framed text backend.
//!
//! Every atomic value is one token terminated by `\n`. Strings are the one
//! token kind that may itself contain newlines, so they travel with a byte
//! length prefix when [`Settings::use_size_prefix`] is on; with it off a
//! string is framed by its terminator alone and must not contain `\n`.
//!
//! [`Settings::use_size_prefix`]: crate::wire::Settings

use core::fmt::Display;
use core::str::FromStr;
use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::Decimal;
use crate::wire::codec::{Decode, Encode};
use crate::wire::{BytesEncoding, Settings, WireError, WireResult};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// -----------------------------------------------------------------------------
// TextEncoder

/// [`Encode`] implementation writing newline-terminated tokens.
pub struct TextEncoder<W: Write> {
    out: W,
}

impl<W: Write> TextEncoder<W> {
    /// Wraps a transport.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwraps the transport.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn token(&mut self, v: impl Display) -> WireResult<()> {
        Ok(writeln!(self.out, "{v}")?)
    }
}

impl<W: Write> Encode for TextEncoder<W> {
    fn write_bool(&mut self, v: bool) -> WireResult<()> {
        self.token(v)
    }

    fn write_i16(&mut self, v: i16) -> WireResult<()> {
        self.token(v)
    }

    fn write_u16(&mut self, v: u16) -> WireResult<()> {
        self.token(v)
    }

    fn write_i32(&mut self, v: i32) -> WireResult<()> {
        self.token(v)
    }

    fn write_u32(&mut self, v: u32) -> WireResult<()> {
        self.token(v)
    }

    fn write_i64(&mut self, v: i64) -> WireResult<()> {
        self.token(v)
    }

    fn write_u64(&mut self, v: u64) -> WireResult<()> {
        self.token(v)
    }

    // Rust's float Display is shortest-round-trip, so the token parses back
    // to the identical bits.
    fn write_f32(&mut self, v: f32) -> WireResult<()> {
        self.token(v)
    }

    fn write_f64(&mut self, v: f64) -> WireResult<()> {
        self.token(v)
    }

    fn write_str(&mut self, v: &str, settings: &Settings) -> WireResult<()> {
        if settings.use_size_prefix {
            self.write_len(v.len(), settings)?;
        }
        self.out.write_all(v.as_bytes())?;
        Ok(self.out.write_all(b"\n")?)
    }

    fn write_bytes(&mut self, v: &[u8], settings: &Settings) -> WireResult<()> {
        match settings.bytes_encoding {
            BytesEncoding::Hex => self.token(hex::encode(v)),
            BytesEncoding::Base64 => self.token(BASE64.encode(v)),
        }
    }

    fn write_len(&mut self, len: usize, settings: &Settings) -> WireResult<()> {
        if len as u64 > settings.size_width.max_len() {
            return Err(WireError::Format(format!(
                "length {len} exceeds the configured {:?} width",
                settings.size_width
            )));
        }
        self.token(len)
    }

    fn write_decimal(&mut self, v: Decimal) -> WireResult<()> {
        self.token(v)
    }

    fn write_datetime(&mut self, v: DateTime<Utc>, _settings: &Settings) -> WireResult<()> {
        self.token(v.format(DATETIME_FORMAT))
    }

    fn write_uuid(&mut self, v: Uuid) -> WireResult<()> {
        self.token(v.hyphenated())
    }

    fn flush(&mut self) -> WireResult<()> {
        Ok(self.out.flush()?)
    }
}

// -----------------------------------------------------------------------------
// TextDecoder

/// [`Decode`] implementation mirroring [`TextEncoder`].
pub struct TextDecoder<R: Read> {
    input: R,
}

impl<R: Read> TextDecoder<R> {
    /// Wraps a transport.
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Unwraps the transport.
    pub fn into_inner(self) -> R {
        self.input
    }

    fn next_byte(&mut self) -> WireResult<u8> {
        let mut byte = [0_u8; 1];
        self.input.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Reads bytes up to (and consuming) the next `\n`.
    fn line(&mut self) -> WireResult<Vec<u8>> {
        let mut bytes = Vec::new();
        loop {
            match self.next_byte()? {
                b'\n' => return Ok(bytes),
                byte => bytes.push(byte),
            }
        }
    }

    fn token(&mut self) -> WireResult<String> {
        String::from_utf8(self.line()?)
            .map_err(|err| WireError::Format(format!("invalid UTF-8 in token: {err}")))
    }

    fn parse<T>(&mut self) -> WireResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let token = self.token()?;
        token
            .parse()
            .map_err(|err| WireError::Format(format!("invalid token `{token}`: {err}")))
    }
}

impl<R: Read> Decode for TextDecoder<R> {
    fn read_bool(&mut self) -> WireResult<bool> {
        self.parse()
    }

    fn read_i16(&mut self) -> WireResult<i16> {
        self.parse()
    }

    fn read_u16(&mut self) -> WireResult<u16> {
        self.parse()
    }

    fn read_i32(&mut self) -> WireResult<i32> {
        self.parse()
    }

    fn read_u32(&mut self) -> WireResult<u32> {
        self.parse()
    }

    fn read_i64(&mut self) -> WireResult<i64> {
        self.parse()
    }

    fn read_u64(&mut self) -> WireResult<u64> {
        self.parse()
    }

    fn read_f32(&mut self) -> WireResult<f32> {
        self.parse()
    }

    fn read_f64(&mut self) -> WireResult<f64> {
        self.parse()
    }

    fn read_str(&mut self, settings: &Settings) -> WireResult<String> {
        if !settings.use_size_prefix {
            return self.token();
        }
        let len = self.read_len(settings)?;
        let mut bytes = vec![0_u8; len];
        self.input.read_exact(&mut bytes)?;
        if self.next_byte()? != b'\n' {
            return Err(WireError::Format(
                "string token is longer than its length prefix".to_owned(),
            ));
        }
        String::from_utf8(bytes)
            .map_err(|err| WireError::Format(format!("invalid UTF-8 in string: {err}")))
    }

    fn read_bytes(&mut self, settings: &Settings) -> WireResult<Vec<u8>> {
        let token = self.token()?;
        match settings.bytes_encoding {
            BytesEncoding::Hex => hex::decode(&token)
                .map_err(|err| WireError::Format(format!("invalid hex token: {err}"))),
            BytesEncoding::Base64 => BASE64
                .decode(&token)
                .map_err(|err| WireError::Format(format!("invalid base64 token: {err}"))),
        }
    }

    fn read_len(&mut self, _settings: &Settings) -> WireResult<usize> {
        self.parse()
    }

    fn read_decimal(&mut self) -> WireResult<Decimal> {
        self.parse()
    }

    fn read_datetime(&mut self, _settings: &Settings) -> WireResult<DateTime<Utc>> {
        let token = self.token()?;
        NaiveDateTime::parse_from_str(&token, DATETIME_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|err| WireError::Format(format!("invalid instant `{token}`: {err}")))
    }

    fn read_uuid(&mut self) -> WireResult<Uuid> {
        self.parse()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::wire::BytesEncoding;

    #[test]
    fn tokens_are_newline_framed() {
        let mut encoder = TextEncoder::new(Vec::new());
        encoder.write_i32(-7).unwrap();
        encoder.write_bool(true).unwrap();
        assert_eq!(encoder.into_inner(), b"-7\ntrue\n");
    }

    #[test]
    fn prefixed_strings_survive_embedded_newlines() {
        let settings = Settings::default();
        let mut encoder = TextEncoder::new(Vec::new());
        encoder.write_str("two\nlines", &settings).unwrap();
        encoder.write_i32(5).unwrap();
        let mut decoder = TextDecoder::new(Cursor::new(encoder.into_inner()));
        assert_eq!(decoder.read_str(&settings).unwrap(), "two\nlines");
        assert_eq!(decoder.read_i32().unwrap(), 5);
    }

    #[test]
    fn float_tokens_round_trip_exactly() {
        let mut encoder = TextEncoder::new(Vec::new());
        encoder.write_f64(0.1 + 0.2).unwrap();
        encoder.write_f32(f32::MIN_POSITIVE).unwrap();
        let mut decoder = TextDecoder::new(Cursor::new(encoder.into_inner()));
        assert_eq!(decoder.read_f64().unwrap(), 0.1 + 0.2);
        assert_eq!(decoder.read_f32().unwrap(), f32::MIN_POSITIVE);
    }

    #[test]
    fn bytes_respect_the_configured_encoding() {
        let hex = Settings::default().with_bytes_encoding(BytesEncoding::Hex);
        let mut encoder = TextEncoder::new(Vec::new());
        encoder.write_bytes(&[0xDE, 0xAD], &hex).unwrap();
        assert_eq!(encoder.into_inner(), b"dead\n");

        let base64 = Settings::default().with_bytes_encoding(BytesEncoding::Base64);
        let mut encoder = TextEncoder::new(Vec::new());
        encoder.write_bytes(&[0xDE, 0xAD], &base64).unwrap();
        let mut decoder = TextDecoder::new(Cursor::new(encoder.into_inner()));
        assert_eq!(decoder.read_bytes(&base64).unwrap(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn instants_keep_subsecond_digits() {
        let settings = Settings::default();
        let instant = DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();
        let mut encoder = TextEncoder::new(Vec::new());
        encoder.write_datetime(instant, &settings).unwrap();
        let mut decoder = TextDecoder::new(Cursor::new(encoder.into_inner()));
        assert_eq!(decoder.read_datetime(&settings).unwrap(), instant);
    }

    #[test]
    fn garbage_tokens_surface_as_format_errors() {
        let mut decoder = TextDecoder::new(Cursor::new(b"not-a-number\n".to_vec()));
        assert!(matches!(decoder.read_i64(), Err(WireError::Format(_))));
    }
}

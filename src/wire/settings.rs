//! Traversal and codec configuration.

// -----------------------------------------------------------------------------
// Enums

/// How the text backend renders byte buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BytesEncoding {
    /// Lowercase hex digits.
    Hex,
    /// Standard base64 with padding.
    #[default]
    Base64,
}

/// How both backends represent an instant in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateEncoding {
    /// 100-nanosecond intervals since 0001-01-01T00:00:00Z.
    #[default]
    Ticks,
    /// Milliseconds since the Unix epoch.
    MillisecondsSinceEpoch,
    /// Whole seconds since the Unix epoch.
    SecondsSinceEpoch,
}

/// The integer width of length prefixes and back-reference indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeWidth {
    /// 16-bit lengths; values above `u16::MAX` fail to write.
    U16,
    /// 32-bit lengths.
    #[default]
    U32,
    /// 64-bit lengths.
    U64,
}

impl SizeWidth {
    /// Returns the largest length the width can carry.
    pub const fn max_len(self) -> u64 {
        match self {
            SizeWidth::U16 => u16::MAX as u64,
            SizeWidth::U32 => u32::MAX as u64,
            SizeWidth::U64 => u64::MAX,
        }
    }
}

// -----------------------------------------------------------------------------
// Settings

/// The knobs shared by [`GraphWriter`] and [`GraphReader`].
///
/// Both peers must traverse with the same settings; nothing on the wire
/// records them. Settings freeze on the first traversal call: a writer or
/// reader that has produced or consumed data rejects
/// [`set_settings`](crate::wire::GraphWriter::set_settings) with
/// [`WireError::SettingsFrozen`](crate::wire::WireError).
///
/// [`GraphWriter`]: crate::wire::GraphWriter
/// [`GraphReader`]: crate::wire::GraphReader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Text rendering of byte buffers. See [`BytesEncoding`].
    pub bytes_encoding: BytesEncoding,
    /// Whether type tags carry the full path instead of the short name.
    pub use_type_full_name: bool,
    /// Whether repeated shared nodes collapse into back-references.
    pub use_object_reference: bool,
    /// Whether the encoder is flushed after each successful top-level write.
    pub auto_flush: bool,
    /// Wire representation of instants. See [`DateEncoding`].
    pub date_encoding: DateEncoding,
    /// Width of length prefixes. See [`SizeWidth`].
    pub size_width: SizeWidth,
    /// Whether variable-length data carries a length prefix.
    ///
    /// Disabling this produces write-only output: the binary backend cannot
    /// recover unprefixed lengths and fails to read with
    /// [`WireError::Format`](crate::wire::WireError).
    pub use_size_prefix: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bytes_encoding: BytesEncoding::default(),
            use_type_full_name: false,
            use_object_reference: true,
            auto_flush: true,
            date_encoding: DateEncoding::default(),
            size_width: SizeWidth::default(),
            use_size_prefix: true,
        }
    }
}

impl Settings {
    /// Sets [`bytes_encoding`](Self::bytes_encoding).
    pub fn with_bytes_encoding(mut self, bytes_encoding: BytesEncoding) -> Self {
        self.bytes_encoding = bytes_encoding;
        self
    }

    /// Sets [`use_type_full_name`](Self::use_type_full_name).
    pub fn with_type_full_name(mut self, use_type_full_name: bool) -> Self {
        self.use_type_full_name = use_type_full_name;
        self
    }

    /// Sets [`use_object_reference`](Self::use_object_reference).
    pub fn with_object_reference(mut self, use_object_reference: bool) -> Self {
        self.use_object_reference = use_object_reference;
        self
    }

    /// Sets [`auto_flush`](Self::auto_flush).
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    /// Sets [`date_encoding`](Self::date_encoding).
    pub fn with_date_encoding(mut self, date_encoding: DateEncoding) -> Self {
        self.date_encoding = date_encoding;
        self
    }

    /// Sets [`size_width`](Self::size_width).
    pub fn with_size_width(mut self, size_width: SizeWidth) -> Self {
        self.size_width = size_width;
        self
    }

    /// Sets [`use_size_prefix`](Self::use_size_prefix).
    pub fn with_size_prefix(mut self, use_size_prefix: bool) -> Self {
        self.use_size_prefix = use_size_prefix;
        self
    }
}

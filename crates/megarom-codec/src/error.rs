//! Error types shared by every codec
//!
//! Failures fall into three kinds. [`FormatError`] covers container and layout
//! problems, [`BoundsError`] covers ranges that would leave the buffer, and
//! [`ValidationError`] covers structural invariants of the typed values.
//! [`RomError`] wraps all three so callers can use a single `?` chain.

use thiserror::Error;

/// Container or layout could not be determined, or the buffer is too small
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Buffer is smaller than the minimum viable ROM
    #[error("ROM too small: {len} bytes (minimum {min})")]
    TooSmall {
        /// Actual buffer length
        len: usize,
        /// Required minimum length
        min: usize,
    },

    /// Interleaved layouts need an even number of bytes
    #[error("interleaved container has odd length {0}")]
    OddLength(usize),

    /// SMD payload is not a whole number of blocks
    #[error("SMD payload of {len} bytes is not a multiple of {block_size}")]
    MisalignedBlocks {
        /// Payload length after the copier header
        len: usize,
        /// Required block size
        block_size: usize,
    },

    /// Unknown file extension passed as a hint
    #[error("unrecognized format hint: {0}")]
    UnknownHint(String),

    /// Header region could not be decoded
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Binary patch container could not be decoded
    #[error("malformed patch container: {0}")]
    MalformedPatch(String),

    /// Configuration document could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// An offset/length pair would reach outside the buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    /// `offset + length` does not fit in `usize`
    #[error("range overflow: offset {offset:#X} + length {length}")]
    Overflow {
        /// Requested offset
        offset: usize,
        /// Requested length
        length: usize,
    },

    /// Range ends past the buffer
    #[error("range {offset:#X}..+{length} exceeds buffer of {size} bytes")]
    OutOfRange {
        /// Requested offset
        offset: usize,
        /// Requested length
        length: usize,
        /// Buffer size
        size: usize,
    },
}

/// A structural invariant of a typed value was violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Encoded data has the wrong byte length
    #[error("{what} must be exactly {expected} bytes, got {actual}")]
    WrongSize {
        /// Kind of data being decoded
        what: &'static str,
        /// Required length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A color word has bits set outside the 3-bit channel fields
    #[error("malformed color word {word:#06X} at index {index}")]
    MalformedColor {
        /// Index of the color within the palette
        index: usize,
        /// Raw color word
        word: u16,
    },

    /// Palettes hold exactly 16 colors
    #[error("palette must have 16 colors, got {0}")]
    WrongColorCount(usize),

    /// RGB channel outside 0-255
    #[error("color {index} channel value {value} outside 0-255")]
    ChannelOutOfRange {
        /// Index of the color within the palette
        index: usize,
        /// Offending channel value
        value: i64,
    },

    /// Tile pixel index above 15
    #[error("pixel index {value} at ({x}, {y}) exceeds 15")]
    PixelOutOfRange {
        /// Column
        x: usize,
        /// Row
        y: usize,
        /// Offending index
        value: u8,
    },

    /// Sheet layout needs at least one column
    #[error("columns per row must be at least 1")]
    ZeroColumns,

    /// Sheet or raster dimensions beyond the pixel limit
    #[error("{width}x{height} image exceeds {max} pixels")]
    ImageTooLarge {
        /// Requested width (saturated on overflow)
        width: usize,
        /// Requested height (saturated on overflow)
        height: usize,
        /// Largest accepted pixel count
        max: usize,
    },

    /// Render upscale factor outside 1-16
    #[error("scale {0} outside 1-16")]
    InvalidScale(u32),

    /// Replacement text longer than the record it replaces
    #[error("replacement is {new_len} bytes but the record holds {max_len}")]
    TextTooLong {
        /// Replacement length
        new_len: usize,
        /// Original record length
        max_len: usize,
    },

    /// Replacement text contains non-ASCII characters
    #[error("replacement text is not ASCII")]
    NonAsciiText,

    /// Buffer no longer holds the text the record was scanned from
    #[error("stale text record at {offset:#X}: buffer content changed")]
    StaleRecord {
        /// Record offset
        offset: usize,
    },

    /// Diff inputs differ in length
    #[error("length mismatch: {left} vs {right} bytes")]
    LengthMismatch {
        /// Length of the first image
        left: usize,
        /// Length of the second image
        right: usize,
    },

    /// Patch expects a different byte than the target holds
    #[error("patch mismatch at {offset:#X}: expected {expected:#04X}, found {found:#04X}")]
    PatchMismatch {
        /// Entry offset
        offset: usize,
        /// Byte the patch expects
        expected: u8,
        /// Byte currently in the target
        found: u8,
    },

    /// Patch entries must be strictly ascending
    #[error("patch entries out of order at index {index}")]
    UnorderedPatch {
        /// Index of the out-of-order entry
        index: usize,
    },

    /// Configuration value rejected by `validate()`
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Any codec failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    /// Container or layout error
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Out-of-bounds access prevented
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// Structural invariant violated
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for codec operations
pub type RomResult<T> = Result<T, RomError>;

/// One-line description of a binrw failure
///
/// binrw's `Display` renders the whole field backtrace with terminal colors;
/// only the root cause is kept here.
pub(crate) fn binrw_message(err: &binrw::Error) -> String {
    match err {
        binrw::Error::Backtrace(backtrace) => binrw_message(&backtrace.error),
        binrw::Error::AssertFail { pos, message } => format!("{message} at {pos:#X}"),
        binrw::Error::BadMagic { pos, .. } => format!("bad magic at {pos:#X}"),
        binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            "unexpected end of data".to_string()
        }
        binrw::Error::Io(io) => io.to_string(),
        binrw::Error::Custom { pos, .. } => format!("invalid data at {pos:#X}"),
        binrw::Error::NoVariantMatch { pos } | binrw::Error::EnumErrors { pos, .. } => {
            format!("no matching variant at {pos:#X}")
        }
        _ => "invalid data".to_string(),
    }
}


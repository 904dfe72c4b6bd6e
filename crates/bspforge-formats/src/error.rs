//! Error types for BSP loading, writing, and conversion

use thiserror::Error;

/// Errors that can occur while reading, writing, or converting BSP documents
#[derive(Error, Debug)]
pub enum BspError {
    /// Magic/version pair not present in the format registry
    #[error("Unrecognized BSP format: ident {ident:#010x}{}", .version.map(|v| format!(", version {v}")).unwrap_or_default())]
    FormatUnrecognized {
        /// First int32 of the file
        ident: i32,
        /// Version int32 following the ident, when one was read
        version: Option<i32>,
    },

    /// Lump length is not a whole number of records
    #[error("Lump '{lump}' has length {length}, not a multiple of its record size {record_size}")]
    LumpOverflow {
        /// Lump name
        lump: &'static str,
        /// Byte length from the directory
        length: usize,
        /// Declared record size
        record_size: usize,
    },

    /// Lump does not fit the 32-bit lump directory
    #[error("Lump '{lump}' is too large for the lump directory ({length} bytes)")]
    LumpTooLarge {
        /// Lump name
        lump: &'static str,
        /// Byte length that was about to be written
        length: usize,
    },

    /// File ends before the header and lump directory are complete
    #[error("Truncated BSP header: need {needed} bytes, file has {file_size}")]
    TruncatedHeader {
        /// Bytes required for the header and directory
        needed: usize,
        /// Actual file size
        file_size: usize,
    },

    /// Lump directory points past the end of the file
    #[error("Lump '{lump}' at offset {offset} with length {length} exceeds file size {file_size}")]
    TruncatedLump {
        /// Lump name
        lump: &'static str,
        /// Offset from the directory
        offset: i64,
        /// Length from the directory
        length: i64,
        /// Actual file size
        file_size: usize,
    },

    /// No registered path between the document's layout and the target
    #[error("Cannot convert from {from} to {to}: {reason}")]
    ConversionUnsupported {
        /// Source format name
        from: String,
        /// Target format name
        to: String,
        /// Why no conversion exists
        reason: String,
    },

    /// A value does not fit the destination field
    #[error("Numeric overflow in {field}: {value} does not fit in {target}")]
    NumericOverflow {
        /// Offending field
        field: String,
        /// Source value, formatted
        value: String,
        /// Destination type name
        target: &'static str,
    },

    /// Contents are still invalid after repair
    #[error("Invalid contents: {description}")]
    ContentInvalid {
        /// Human-readable contents description
        description: String,
    },

    /// Layout has no on-disk representation
    #[error("{format} cannot be written to disk")]
    NotWritable {
        /// Format name
        format: String,
    },

    /// Process-wide game was already chosen
    #[error("Game already selected as {current}, cannot switch to {requested}")]
    GameAlreadySelected {
        /// Game selected earlier
        current: String,
        /// Game requested now
        requested: String,
    },

    /// Game id has no definition
    #[error("No game definition for {game}")]
    GameUnsupported {
        /// Requested game
        game: String,
    },

    /// BSPX lump name is empty, not UTF-8, or does not fit the 24-byte
    /// directory field
    #[error("Invalid BSPX lump name '{name}': expected 1 to 23 bytes of UTF-8")]
    InvalidLumpName {
        /// Offending name
        name: String,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// Extended texinfo sidecar could not be (de)serialized
    #[error("Extended texinfo JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BspError {
    /// Whether retrying against a larger-capacity format could succeed
    pub const fn is_limit_error(&self) -> bool {
        matches!(self, Self::NumericOverflow { .. } | Self::LumpTooLarge { .. })
    }
}

/// Type alias for BSP operation results
pub type Result<T> = std::result::Result<T, BspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_errors() {
        let overflow = BspError::NumericOverflow {
            field: "dnodes[3].children[0]".to_string(),
            value: "40000".to_string(),
            target: "i16",
        };
        assert!(overflow.is_limit_error());
        assert!(overflow.to_string().contains("dnodes[3].children[0]"));

        let unsupported = BspError::ConversionUnsupported {
            from: "bsp29".to_string(),
            to: "q2bsp".to_string(),
            reason: "test".to_string(),
        };
        assert!(!unsupported.is_limit_error());
    }

    #[test]
    fn test_unrecognized_display() {
        let err = BspError::FormatUnrecognized {
            ident: 0x5053_4249,
            version: Some(46),
        };
        assert_eq!(
            err.to_string(),
            "Unrecognized BSP format: ident 0x50534249, version 46"
        );

        let err = BspError::FormatUnrecognized {
            ident: 31,
            version: None,
        };
        assert_eq!(err.to_string(), "Unrecognized BSP format: ident 0x0000001f");
    }
}

use thiserror::Error;

/// Package capabilities this reader recognizes but deliberately does not
/// decode. Hitting one is not a corrupt-input condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
    CompressedChunks,
    PackagesToCook,
    ChunkIds,
    Utf16Strings,
}

impl std::fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CompressedChunks => "compressed chunks",
            Self::PackagesToCook => "packages-to-cook list",
            Self::ChunkIds => "chunk id array",
            Self::Utf16Strings => "utf-16 string content",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid package: {reason} at {offset:#x}")]
    Format { offset: usize, reason: String },

    #[error("unsupported package feature: {feature} at {offset:#x}")]
    Unsupported {
        offset: usize,
        feature: UnsupportedFeature,
    },

    #[error("unexpected end of input at {offset:#x}, wanted {wanted} more bytes")]
    Truncated { offset: usize, wanted: usize },
}

impl DecodeError {
    pub(crate) fn format(offset: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            offset,
            reason: reason.into(),
        }
    }

    /// The stream is not a valid instance of the format. Truncation
    /// counts: a stream that ends mid-field is malformed, not merely
    /// unsupported.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Truncated { .. })
    }

    /// The stream is structurally valid but exercises a capability this
    /// reader does not implement. Batch callers typically log these and
    /// move on rather than flagging the file as corrupt.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

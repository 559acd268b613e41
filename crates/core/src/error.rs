//! Error types for wedo-core.

use thiserror::Error;

/// Direction of a frame transfer on an open channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOp {
    Read,
    Write,
}

impl std::fmt::Display for FrameOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A candidate HID path could not be opened.
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// The host could not report vendor/product identity for an opened path.
    #[error("failed to query identity of {path}: {reason}")]
    Identity { path: String, reason: String },

    /// Frame transfer failed on an established channel.
    #[error("frame {op} failed: {reason}")]
    Io { op: FrameOp, reason: String },

    /// The device returned fewer bytes than a full input report.
    ///
    /// Counts are payload bytes, report id excluded.
    #[error("short input report: expected {expected} payload bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },

    /// The host HID subsystem could not be initialised or listed.
    #[error("HID enumeration failed: {0}")]
    Enumeration(String),

    /// Slot index outside the two hub ports.
    #[error("invalid slot {0} (allowed 0..=1)")]
    InvalidSlot(u8),
}

impl Error {
    /// Whether discovery should skip the path that produced this error
    /// rather than abort the scan.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::Identity { .. })
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;

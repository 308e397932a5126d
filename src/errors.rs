// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera acquisition and stream errors
    Camera(CameraError),
    /// Decode failures
    Decode(DecodeError),
    /// Clipboard access errors
    Clipboard(ClipboardError),
    /// Snapshot rendering errors
    Snapshot(SnapshotError),
    /// Offline asset cache errors
    Asset(AssetError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Device acquisition failed
    AcquisitionFailed(String),
    /// The requested constraints cannot be satisfied
    ConstraintsUnsupported(String),
    /// Camera disconnected during operation
    Disconnected,
}

/// Decode failures from the decoder capability
///
/// `NoSymbol` is the expected, frequent case: the sampled frame simply
/// contained no QR code. It never surfaces past the decode worker.
#[derive(Debug, Clone)]
pub enum DecodeError {
    /// No QR symbol was found in the frame
    NoSymbol,
    /// A symbol was found but could not be decoded
    MalformedSymbol(String),
    /// The pixel buffer did not match the declared dimensions
    BadFrame(String),
}

/// Clipboard access errors
#[derive(Debug, Clone)]
pub enum ClipboardError {
    /// No clipboard is available in this environment
    Unavailable(String),
    /// The write itself failed
    WriteFailed(String),
}

/// Snapshot rendering errors
#[derive(Debug, Clone)]
pub enum SnapshotError {
    /// The frame had zero dimensions or an empty pixel buffer
    EmptyFrame,
    /// PNG encoding failed
    EncodingFailed(String),
}

/// Offline asset cache errors
#[derive(Debug, Clone)]
pub enum AssetError {
    /// Fetching a manifest entry failed
    FetchFailed { entry: String, reason: String },
    /// Filesystem error while reading or writing the cache
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Decode(e) => write!(f, "Decode error: {}", e),
            AppError::Clipboard(e) => write!(f, "Clipboard error: {}", e),
            AppError::Snapshot(e) => write!(f, "Snapshot error: {}", e),
            AppError::Asset(e) => write!(f, "Asset cache error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::AcquisitionFailed(msg) => write!(f, "Acquisition failed: {}", msg),
            CameraError::ConstraintsUnsupported(msg) => {
                write!(f, "Constraints unsupported: {}", msg)
            }
            CameraError::Disconnected => write!(f, "Camera disconnected"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NoSymbol => write!(f, "No QR symbol found"),
            DecodeError::MalformedSymbol(msg) => write!(f, "Malformed symbol: {}", msg),
            DecodeError::BadFrame(msg) => write!(f, "Bad frame: {}", msg),
        }
    }
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "Clipboard unavailable: {}", msg),
            ClipboardError::WriteFailed(msg) => write!(f, "Clipboard write failed: {}", msg),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::EmptyFrame => write!(f, "Frame has no usable dimensions"),
            SnapshotError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::FetchFailed { entry, reason } => {
                write!(f, "Failed to fetch {}: {}", entry, reason)
            }
            AssetError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for ClipboardError {}
impl std::error::Error for SnapshotError {}
impl std::error::Error for AssetError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Decode(err)
    }
}

impl From<ClipboardError> for AppError {
    fn from(err: ClipboardError) -> Self {
        AppError::Clipboard(err)
    }
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        AppError::Snapshot(err)
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        AppError::Asset(err)
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

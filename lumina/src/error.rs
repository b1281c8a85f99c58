//! Error types for the Lumina presentation pipeline
//!
//! Setup failures (instance, device, buffers, pipeline, swapchain creation)
//! are fatal and abort startup. Transient presentation states (stale or
//! suboptimal swapchain) are not errors at all; they are status values
//! handled inside the frame loop and never reach this type.

use std::fmt;

/// Result type for Lumina operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumina errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Initialization failed (instance, device, shaders, pipeline)
    InitializationFailed(String),

    /// No entry in the device memory catalog satisfies the requested
    /// visibility flags and type mask
    NoCompatibleMemoryType,

    /// GPU memory allocation failed (e.g. device out of memory)
    AllocationFailed(String),

    /// Swapchain creation or recreation failed; partial state is unusable
    SwapchainCreationFailed(String),

    /// Non-recoverable device failure during acquire, submit or present
    /// (e.g. device lost)
    DeviceError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NoCompatibleMemoryType => write!(f, "No compatible GPU memory type"),
            Error::AllocationFailed(msg) => write!(f, "GPU allocation failed: {}", msg),
            Error::SwapchainCreationFailed(msg) => write!(f, "Swapchain creation failed: {}", msg),
            Error::DeviceError(msg) => write!(f, "Device error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

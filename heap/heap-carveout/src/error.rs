//! Error taxonomy of the carveout heap.

/// Refusal from the device-mapping collaborator.
///
/// The collaborator owns the reason text; the heap only transports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DeviceMapError(pub &'static str);

/// Everything the heap's public operations can fail with.
///
/// Contract violations (double-free, handing back a foreign extent) are not
/// represented here: ownership tracking cannot be trusted once violated, so
/// the pool fails fast instead of returning an error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    /// Malformed creation parameters (or a zero-size allocation request).
    /// The heap is not constructed; nothing was reserved.
    #[error("invalid heap configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },

    /// Bookkeeping storage for the free-space index could not be reserved.
    #[error("heap bookkeeping allocation failed")]
    OutOfMemory,

    /// No free sub-range can hold the rounded request. The free-space index
    /// is left untouched; no compaction is attempted.
    #[error("no free extent large enough for {requested} bytes")]
    OutOfSpace { requested: u64 },

    /// The device collaborator refused to map a buffer. Propagated on the
    /// caller-mapping path; absorbed (logged) on the free path.
    #[error("device mapping refused: {0}")]
    DeviceMapFailure(DeviceMapError),
}

impl From<DeviceMapError> for HeapError {
    fn from(value: DeviceMapError) -> Self {
        Self::DeviceMapFailure(value)
    }
}

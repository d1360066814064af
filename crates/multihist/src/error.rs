//! Shared error type for histogram construction, filling, and access.

/// Errors produced by histogram construction, filling, access, and
/// arithmetic.
///
/// All conditions are detected eagerly at the failing call; a failed
/// operation leaves the histogram's prior state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistogramError {
    /// A histogram needs at least one axis.
    #[error("histogram requires at least one axis")]
    NoAxes,

    /// An axis definition is malformed (zero bins, non-increasing edges,
    /// duplicate categories, ...).
    #[error("invalid axis definition: {0}")]
    InvalidAxis(String),

    /// Wrong number of coordinates or indices for the histogram's rank.
    #[error("argument count mismatch: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// A fill argument list contains more than one weight marker.
    #[error("fill arguments contain more than one weight marker")]
    DuplicateWeight,

    /// A fill argument list contains more than one sample marker.
    #[error("fill arguments contain more than one sample marker")]
    DuplicateSample,

    /// A sample payload has the wrong number of values for the cell type.
    #[error("sample payload length mismatch: expected {expected}, got {got}")]
    SampleLenMismatch { expected: usize, got: usize },

    /// The cell type does not accumulate weighted observations.
    #[error("cell type does not support weighted fills")]
    WeightUnsupported,

    /// The cell type does not accumulate sample payloads.
    #[error("cell type does not support sample fills")]
    SampleUnsupported,

    /// The cell type requires a sample payload on every fill.
    #[error("cell type requires a sample marker on every fill")]
    SampleRequired,

    /// A bin index lies outside an axis's valid extended range.
    #[error("index {index} out of range for axis {axis}")]
    IndexOutOfRange { axis: usize, index: i32 },

    /// Arithmetic between histograms whose axes differ structurally.
    #[error("axes of histograms differ")]
    AxesMismatch,
}

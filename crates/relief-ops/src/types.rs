use std::fmt;

use relief_kernel::{KernelError, KernelSolidHandle};
use relief_types::{EcLevel, FaceId, LayerKind, ReliefRecord};

/// Which boolean primitive a composition step called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanKind {
    Union,
    Subtract,
}

impl fmt::Display for BooleanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanKind::Union => f.write_str("union"),
            BooleanKind::Subtract => f.write_str("subtract"),
        }
    }
}

/// One failed parameter check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("QR data is empty")]
    EmptyPayload,

    #[error("QR data is {len} bytes, level {level} holds at most {capacity}")]
    DataTooLong {
        len: usize,
        capacity: usize,
        level: EcLevel,
        fits_at: Option<EcLevel>,
    },
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn fits_hint(fits_at: &Option<EcLevel>) -> String {
    match fits_at {
        Some(level) => format!(" (fits at level {level})"),
        None => String::new(),
    }
}

/// Errors from relief operations. All are terminal for the invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReliefError {
    #[error("face {face:?} is not planar")]
    NonPlanarFace { face: FaceId },

    #[error("invalid geometry: {}", summarize(.violations))]
    InvalidGeometry { violations: Vec<Violation> },

    #[error("degenerate outline in layer {layer}: {reason}")]
    DegenerateOutline { layer: LayerKind, reason: String },

    #[error(
        "data is {len} bytes, level {level} holds at most {capacity}{}",
        fits_hint(.fits_at)
    )]
    DataTooLong {
        len: usize,
        capacity: usize,
        level: EcLevel,
        fits_at: Option<EcLevel>,
    },

    #[error("QR payload produced no dark modules")]
    EmptyPayload,

    #[error("{op} failed for layer {layer}: {source}")]
    BooleanOperationFailed {
        layer: String,
        op: BooleanKind,
        #[source]
        source: KernelError,
    },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

impl ReliefError {
    /// A single-violation `InvalidGeometry`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ReliefError::InvalidGeometry {
            violations: vec![Violation::Invalid {
                field,
                reason: reason.into(),
            }],
        }
    }

    /// Collapse validator output into one error. An empty payload wins over an
    /// oversized one, which wins over any range violations.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.iter().any(|v| matches!(v, Violation::EmptyPayload)) {
            return ReliefError::EmptyPayload;
        }
        let too_long = violations.iter().find_map(|v| match v {
            Violation::DataTooLong {
                len,
                capacity,
                level,
                fits_at,
            } => Some(ReliefError::DataTooLong {
                len: *len,
                capacity: *capacity,
                level: *level,
                fits_at: *fits_at,
            }),
            _ => None,
        });
        too_long.unwrap_or(ReliefError::InvalidGeometry { violations })
    }
}

/// What the QR path actually built.
#[derive(Debug, Clone, PartialEq)]
pub struct QrSummary {
    pub version: i16,
    /// Modules per side including the quiet zone.
    pub side: usize,
    pub module_size_mm: f64,
    pub rectangles: usize,
}

/// Non-fatal diagnostics from a relief operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Time spent extruding tools and applying booleans, in milliseconds.
    /// Validation, encoding and footprint isolation are not counted.
    pub kernel_time_ms: f64,
    pub qr: Option<QrSummary>,
}

/// Result handed back to the host: the new solid plus the record needed to rebuild it.
#[derive(Debug, Clone)]
pub struct ReliefOutput {
    /// Handle to the solid in the kernel. Runtime-only, not persisted.
    pub solid: KernelSolidHandle,
    pub record: ReliefRecord,
    pub diagnostics: Diagnostics,
}

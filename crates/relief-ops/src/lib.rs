pub mod compose;
pub mod config;
pub mod extrude;
pub mod kernel_ext;
pub mod layering;
pub mod merge;
pub mod pipeline;
pub mod placement;
pub mod qr;
pub mod silhouette;
pub mod types;
pub mod validate;

pub use compose::{compose, Composition, CompositionStrategy};
pub use config::{ConfigError, Limits, Range, ReliefConfig, ToleranceConfig};
pub use extrude::{extrude_layers, extrude_region, LayerTool};
pub use kernel_ext::KernelBundle;
pub use layering::{isolate_layers, IsolatedLayer};
pub use merge::merge_rectangles;
pub use pipeline::{apply_logo, apply_qr, reapply, ApplyOptions};
pub use placement::{derive_frame, frame_for_face, BasisHint, PlacementFrame};
pub use qr::{encode, QrSymbol};
pub use silhouette::{logo_outlines, LogoLayer};
pub use types::*;
pub use validate::{validate_logo, validate_qr, Validated};

use std::time::Instant;

use relief_kernel::KernelSolidHandle;
use relief_types::{ring_self_intersects, signed_area, LayerKind, LayerMode, PlanarRegion};
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::layering::IsolatedLayer;
use crate::placement::PlacementFrame;
use crate::types::ReliefError;

/// One extruded layer solid, tagged for composition.
#[derive(Debug, Clone)]
pub struct LayerTool {
    pub label: String,
    pub kind: LayerKind,
    pub mode: LayerMode,
    pub depth: f64,
    pub solid: KernelSolidHandle,
    /// Time spent building this tool, in milliseconds.
    pub build_time_ms: f64,
}

/// Reject loops the kernel cannot turn into a face.
pub fn check_region(
    region: &PlanarRegion,
    layer: LayerKind,
    min_area: f64,
) -> Result<(), ReliefError> {
    for (i, ring) in region.rings().enumerate() {
        let which = if i == 0 {
            "outer loop".to_string()
        } else {
            format!("hole {i}")
        };
        let degenerate = |reason: String| ReliefError::DegenerateOutline { layer, reason };
        if ring.len() < 3 {
            return Err(degenerate(format!("{which} has {} points", ring.len())));
        }
        if ring.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(degenerate(format!("{which} has a non-finite point")));
        }
        if signed_area(ring).abs() < min_area {
            return Err(degenerate(format!("{which} encloses no area")));
        }
        if ring_self_intersects(ring) {
            return Err(degenerate(format!("{which} self-intersects")));
        }
    }
    Ok(())
}

/// Extrude one region into a layer solid.
///
/// Cut tools start `overlap` above the face and reach `depth` below it; fuse
/// solids start `overlap` inside the body and stand `depth` proud of the face.
#[allow(clippy::too_many_arguments)]
pub fn extrude_region(
    kb: &mut dyn KernelBundle,
    region: &PlanarRegion,
    frame: &PlacementFrame,
    kind: LayerKind,
    mode: LayerMode,
    depth: f64,
    overlap: f64,
    min_area: f64,
) -> Result<KernelSolidHandle, ReliefError> {
    if !(depth > 0.0 && depth.is_finite()) {
        return Err(ReliefError::invalid(
            "depth",
            format!("{kind} depth must be positive and finite, got {depth}"),
        ));
    }
    if !(overlap >= 0.0 && overlap.is_finite()) {
        return Err(ReliefError::invalid(
            "overlap",
            format!("must be non-negative, got {overlap}"),
        ));
    }
    check_region(region, kind, min_area)?;

    let n = frame.normal;
    let (plane, direction) = match mode {
        LayerMode::Cut => (frame.sketch_plane().lifted(overlap), [-n[0], -n[1], -n[2]]),
        LayerMode::Fuse => (frame.sketch_plane().lifted(-overlap), n),
    };
    let face = kb.make_region_face(region, &plane)?;
    let solid = kb.extrude_face(face, direction, depth + overlap)?;
    Ok(solid)
}

/// Extrude every non-empty isolated layer. On failure the tools already built are released.
pub fn extrude_layers(
    kb: &mut dyn KernelBundle,
    layers: &[IsolatedLayer],
    frame: &PlacementFrame,
    overlap: f64,
    min_area: f64,
) -> Result<Vec<LayerTool>, ReliefError> {
    let mut tools: Vec<LayerTool> = Vec::new();
    for isolated in layers {
        let kind = isolated.layer.kind;
        let pieces = isolated.regions.len();
        for (i, region) in isolated.regions.iter().enumerate() {
            let start = Instant::now();
            let built = extrude_region(
                kb,
                region,
                frame,
                kind,
                isolated.layer.mode,
                isolated.depth,
                overlap,
                min_area,
            );
            let build_time_ms = start.elapsed().as_secs_f64() * 1000.0;
            let solid = match built {
                Ok(solid) => solid,
                Err(e) => {
                    let built: Vec<KernelSolidHandle> =
                        tools.iter().map(|t| t.solid.clone()).collect();
                    kb.release_all(&built);
                    return Err(e);
                }
            };
            let label = if pieces > 1 {
                format!("{kind}[{i}]")
            } else {
                kind.to_string()
            };
            tools.push(LayerTool {
                label,
                kind,
                mode: isolated.layer.mode,
                depth: isolated.depth,
                solid,
                build_time_ms,
            });
        }
        debug!(layer = %kind, pieces, depth = isolated.depth, "layer extruded");
    }
    Ok(tools)
}

/// Soft check: cut layers as deep as the wall they are cut into.
pub fn wall_warnings(layers: &[IsolatedLayer], wall_thickness: Option<f64>) -> Vec<String> {
    let Some(wall) = wall_thickness else {
        return Vec::new();
    };
    layers
        .iter()
        .filter(|l| l.layer.mode == LayerMode::Cut && l.depth >= wall)
        .map(|l| {
            format!(
                "{} cut depth {:.3} mm reaches the {:.3} mm wall",
                l.layer.kind, l.depth, wall
            )
        })
        .collect()
}

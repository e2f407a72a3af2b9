//! Entry points the host calls: apply a logo or QR relief to a face, or rebuild one from its record.

use relief_kernel::{KernelIntrospect, KernelSolidHandle};
use relief_types::{
    DepthPlan, FaceId, Layer, LayerKind, LayerMode, LogoParams, PlanarRegion, QrParams,
    ReliefMode, ReliefParams, ReliefRecord,
};
use tracing::{info, instrument, warn};

use crate::compose::{compose, CompositionStrategy};
use crate::config::ReliefConfig;
use crate::extrude::{extrude_layers, wall_warnings, LayerTool};
use crate::kernel_ext::KernelBundle;
use crate::layering::{isolate_layers, IsolatedLayer};
use crate::merge::{merge_rectangles, rect_region};
use crate::placement::{frame_for_face, BasisHint};
use crate::qr;
use crate::silhouette::logo_outlines;
use crate::types::{Diagnostics, QrSummary, ReliefError, ReliefOutput};
use crate::validate::{validate_logo, validate_qr};

/// Per-call knobs that are not part of the persisted parameters.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub config: ReliefConfig,
    /// Logo composition order. The QR path always unions its modules first.
    pub strategy: Option<CompositionStrategy>,
    /// Thickness of the wall behind the face, for the depth soft check.
    pub wall_thickness: Option<f64>,
    pub basis_hint: BasisHint,
}

fn ensure_planar(kernel: &dyn KernelIntrospect, face: FaceId) -> Result<(), ReliefError> {
    if kernel.is_planar(face)? {
        Ok(())
    } else {
        Err(ReliefError::NonPlanarFace { face })
    }
}

fn build_time_ms(tools: &[LayerTool]) -> f64 {
    tools.iter().map(|t| t.build_time_ms).sum()
}

fn emit(warnings: &[String]) {
    for w in warnings {
        warn!("{w}");
    }
}

/// Deboss the four-layer logo into `face` of `base`.
#[instrument(skip(kb, base, params, options))]
pub fn apply_logo(
    kb: &mut dyn KernelBundle,
    base: &KernelSolidHandle,
    face: FaceId,
    params: &LogoParams,
    options: &ApplyOptions,
) -> Result<ReliefOutput, ReliefError> {
    ensure_planar(kb.as_introspect(), face)?;
    let validated =
        validate_logo(params, &options.config.limits).map_err(ReliefError::from_violations)?;
    let p = &validated.params;
    let tol = &options.config.tolerance;

    let frame = frame_for_face(
        kb.as_introspect(),
        face,
        options.basis_hint,
        p.offset_u,
        p.offset_v,
        p.rotation_deg,
    )?;

    let footprints: Vec<(LayerKind, PlanarRegion)> = logo_outlines(p.diameter, &tol.flattening)?
        .into_iter()
        .map(|layer| (layer.kind, layer.outline.flatten(&tol.flattening)))
        .collect();
    let plan = DepthPlan::logo(
        p.total_depth,
        p.mountain_fraction,
        p.trail_fraction,
        p.bolt_fraction,
    );
    let layers = isolate_layers(&plan, &footprints, tol.min_loop_area);

    let mut warnings = validated.warnings.clone();
    warnings.extend(wall_warnings(&layers, options.wall_thickness));
    emit(&warnings);

    let tools = extrude_layers(kb, &layers, &frame, tol.overlap, tol.min_loop_area)?;
    let tool_count = tools.len();
    let build_ms = build_time_ms(&tools);
    let composition = compose(kb, base, tools, options.strategy.unwrap_or_default())?;
    let kernel_time_ms = build_ms + composition.kernel_time_ms;

    info!(
        depths = ?plan.depths(),
        tools = tool_count,
        booleans = composition.booleans,
        kernel_time_ms,
        "logo applied"
    );

    Ok(ReliefOutput {
        solid: composition.solid,
        record: ReliefRecord {
            face,
            params: ReliefParams::Logo(validated.params),
        },
        diagnostics: Diagnostics {
            warnings,
            kernel_time_ms,
            qr: None,
        },
    })
}

/// Emboss or deboss a QR code onto `face` of `base`.
#[instrument(skip(kb, base, params, options), fields(len = params.data.len()))]
pub fn apply_qr(
    kb: &mut dyn KernelBundle,
    base: &KernelSolidHandle,
    face: FaceId,
    params: &QrParams,
    options: &ApplyOptions,
) -> Result<ReliefOutput, ReliefError> {
    ensure_planar(kb.as_introspect(), face)?;
    let validated =
        validate_qr(params, &options.config.limits).map_err(ReliefError::from_violations)?;
    let p = &validated.params;
    let tol = &options.config.tolerance;

    let frame = frame_for_face(
        kb.as_introspect(),
        face,
        options.basis_hint,
        p.offset_u,
        p.offset_v,
        0.0,
    )?;

    let symbol = qr::encode(&p.data, p.ec_level, p.border)?;
    let rects = merge_rectangles(&symbol.matrix);
    if rects.is_empty() {
        return Err(ReliefError::EmptyPayload);
    }
    let side = symbol.matrix.side();
    let module_size_mm = p.size / side as f64;

    let mut warnings = validated.warnings.clone();
    if module_size_mm < tol.min_module_size {
        warnings.push(format!(
            "module size {module_size_mm:.3} mm is below {:.3} mm and may not print cleanly",
            tol.min_module_size
        ));
    }

    let mode = match p.mode {
        ReliefMode::Emboss => LayerMode::Fuse,
        ReliefMode::Deboss => LayerMode::Cut,
    };
    let layer = IsolatedLayer {
        layer: Layer {
            kind: LayerKind::QrModules,
            fraction: 1.0,
            mode,
        },
        depth: p.height,
        regions: rects.iter().map(|r| rect_region(r, p.size, side)).collect(),
    };
    let layers = [layer];
    warnings.extend(wall_warnings(&layers, options.wall_thickness));
    emit(&warnings);

    let tools = extrude_layers(kb, &layers, &frame, tol.overlap, tol.min_loop_area)?;
    let build_ms = build_time_ms(&tools);
    let composition = compose(kb, base, tools, CompositionStrategy::UnionThenApply)?;
    let kernel_time_ms = build_ms + composition.kernel_time_ms;

    info!(
        version = symbol.version,
        side,
        rectangles = rects.len(),
        module_size_mm,
        kernel_time_ms,
        "qr applied"
    );

    Ok(ReliefOutput {
        solid: composition.solid,
        record: ReliefRecord {
            face,
            params: ReliefParams::Qr(validated.params),
        },
        diagnostics: Diagnostics {
            warnings,
            kernel_time_ms,
            qr: Some(QrSummary {
                version: symbol.version,
                side,
                module_size_mm,
                rectangles: rects.len(),
            }),
        },
    })
}

/// Rebuild a relief from a stored record, e.g. after the user edits its parameters.
pub fn reapply(
    kb: &mut dyn KernelBundle,
    base: &KernelSolidHandle,
    record: &ReliefRecord,
    options: &ApplyOptions,
) -> Result<ReliefOutput, ReliefError> {
    match &record.params {
        ReliefParams::Logo(params) => apply_logo(kb, base, record.face, params, options),
        ReliefParams::Qr(params) => apply_qr(kb, base, record.face, params, options),
    }
}

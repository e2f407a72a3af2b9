//! End-to-end relief scenarios against the mock kernel.

use std::thread;
use std::time::Duration;

use approx::assert_abs_diff_eq;

use relief_kernel::{
    BoundingBox, FaceFrame, Kernel, KernelError, KernelId, KernelIntrospect, KernelSolidHandle,
    MockKernel,
};
use relief_ops::pipeline::{apply_logo, apply_qr, reapply, ApplyOptions};
use relief_ops::silhouette::{svg_to_local, CANONICAL_DIAMETER};
use relief_ops::{CompositionStrategy, ReliefError, ReliefOutput};
use relief_types::{
    EcLevel, FaceId, LogoParams, PlanarRegion, Point2, QrParams, ReliefMode, ReliefParams,
    ReliefRecord, SketchPlane,
};

const TOP_Z: f64 = 10.0;

fn setup() -> (MockKernel, KernelSolidHandle, FaceId) {
    let mut kernel = MockKernel::new();
    let base = kernel.add_block([-20.0, -20.0, 0.0], [20.0, 20.0, TOP_Z]);
    let top = kernel.list_faces(&base)[1];
    (kernel, base, top)
}

/// Recess depth of `solid` below the top face at plane-local `(x, y)`.
fn depth_at(kernel: &MockKernel, solid: &KernelSolidHandle, x: f64, y: f64) -> f64 {
    kernel
        .surface_depth(solid, [x, y, TOP_Z], [0.0, 0.0, 1.0], 2.0)
        .unwrap()
}

/// Artwork point scaled to an 18 mm logo on the top face.
fn logo_point(x: f64, y: f64) -> Point2 {
    svg_to_local(Point2::new(x, y)).scaled(18.0 / CANONICAL_DIAMETER)
}

fn qr_params(mode: ReliefMode) -> QrParams {
    QrParams {
        data: "https://trailcurrent.com".to_string(),
        ec_level: EcLevel::M,
        mode,
        ..QrParams::default()
    }
}

fn depth_grid(kernel: &MockKernel, solid: &KernelSolidHandle) -> Vec<f64> {
    let mut out = Vec::new();
    for i in 0..21 {
        for j in 0..21 {
            let x = -9.7 + 0.913 * i as f64;
            let y = -9.7 + 0.913 * j as f64;
            out.push(depth_at(kernel, solid, x, y));
        }
    }
    out
}

// ── Logo ───────────────────────────────────────────────────────────────────

#[test]
fn logo_default_depths_follow_shallowest_layer() {
    let (mut kernel, base, top) = setup();
    let out = apply_logo(
        &mut kernel,
        &base,
        top,
        &LogoParams::default(),
        &ApplyOptions::default(),
    )
    .unwrap();

    let probe = |x: f64, y: f64| {
        let p = logo_point(x, y);
        depth_at(&kernel, &out.solid, p.x, p.y)
    };
    // Bolt over mountain.
    assert_abs_diff_eq!(probe(35.0, 22.0), 0.12, epsilon = 1e-9);
    // Trail over mountain.
    assert_abs_diff_eq!(probe(10.0, 32.0), 0.24, epsilon = 1e-9);
    // Mountain alone.
    assert_abs_diff_eq!(probe(30.0, 20.0), 0.44, epsilon = 1e-9);
    // Circle floor.
    assert_abs_diff_eq!(probe(24.0, 4.0), 0.80, epsilon = 1e-9);
    // Outside the circle the face is untouched.
    assert_abs_diff_eq!(probe(1.0, 24.0), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, 15.0, 15.0), 0.0, epsilon = 1e-9);

    assert!(out.diagnostics.warnings.is_empty());
    assert!(out.diagnostics.qr.is_none());
    assert_eq!(
        out.record,
        ReliefRecord {
            face: top,
            params: ReliefParams::Logo(LogoParams::default()),
        }
    );
}

#[test]
fn logo_cut_leaves_no_skin_at_face_level() {
    let (mut kernel, base, top) = setup();
    let out = apply_logo(
        &mut kernel,
        &base,
        top,
        &LogoParams::default(),
        &ApplyOptions::default(),
    )
    .unwrap();
    let p = logo_point(24.0, 4.0);
    assert_eq!(
        kernel.contains_point(&out.solid, [p.x, p.y, TOP_Z - 1e-6]),
        Some(false)
    );
    assert_eq!(
        kernel.contains_point(&out.solid, [p.x, p.y, TOP_Z - 0.8 - 1e-6]),
        Some(true)
    );
}

#[test]
fn logo_offsets_and_rotation_move_the_artwork() {
    let (mut kernel, base, top) = setup();
    let params = LogoParams {
        offset_u: 3.0,
        offset_v: -2.0,
        rotation_deg: 90.0,
        ..LogoParams::default()
    };
    let out = apply_logo(&mut kernel, &base, top, &params, &ApplyOptions::default()).unwrap();

    // A quarter turn maps local (x, y) to (-y, x) about the shifted anchor.
    let place = |p: Point2| (3.0 - p.y, -2.0 + p.x);
    let (x, y) = place(logo_point(35.0, 22.0));
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, x, y), 0.12, epsilon = 1e-9);
    let (x, y) = place(logo_point(24.0, 4.0));
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, x, y), 0.80, epsilon = 1e-9);
}

#[test]
fn logo_rotation_is_normalized_in_record() {
    let (mut kernel, base, top) = setup();
    let params = LogoParams {
        rotation_deg: 540.0,
        ..LogoParams::default()
    };
    let out = apply_logo(&mut kernel, &base, top, &params, &ApplyOptions::default()).unwrap();
    match out.record.params {
        ReliefParams::Logo(p) => assert_abs_diff_eq!(p.rotation_deg, -180.0, epsilon = 1e-12),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn logo_strategies_produce_same_relief() {
    let (mut seq_kernel, seq_base, seq_top) = setup();
    let (mut uta_kernel, uta_base, uta_top) = setup();
    let params = LogoParams::default();
    let seq = apply_logo(
        &mut seq_kernel,
        &seq_base,
        seq_top,
        &params,
        &ApplyOptions {
            strategy: Some(CompositionStrategy::Sequential),
            ..ApplyOptions::default()
        },
    )
    .unwrap();
    let uta = apply_logo(
        &mut uta_kernel,
        &uta_base,
        uta_top,
        &params,
        &ApplyOptions {
            strategy: Some(CompositionStrategy::UnionThenApply),
            ..ApplyOptions::default()
        },
    )
    .unwrap();

    let a = depth_grid(&seq_kernel, &seq.solid);
    let b = depth_grid(&uta_kernel, &uta.solid);
    for (da, db) in a.iter().zip(&b) {
        assert_abs_diff_eq!(*da, *db, epsilon = 1e-9);
    }
}

#[test]
fn logo_unordered_fractions_and_thin_wall_warn() {
    let (mut kernel, base, top) = setup();
    let params = LogoParams {
        mountain_fraction: 0.2,
        trail_fraction: 0.4,
        ..LogoParams::default()
    };
    let options = ApplyOptions {
        wall_thickness: Some(0.5),
        ..ApplyOptions::default()
    };
    let out = apply_logo(&mut kernel, &base, top, &params, &options).unwrap();
    let warnings = &out.diagnostics.warnings;
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    assert!(warnings[0].contains("not ordered"));
    assert!(warnings[1].starts_with("circle"));

    // The trail is now deeper than the mountain it crosses, but the
    // shallower mountain still owns the overlap.
    let p = logo_point(10.0, 32.0);
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, p.x, p.y), 0.16, epsilon = 1e-9);
}

// ── Rejections ─────────────────────────────────────────────────────────────

#[test]
fn non_planar_face_rejected_before_any_build() {
    let (mut kernel, base, _) = setup();
    let curved = kernel.add_curved_face(&base, [0.0, 20.0, 5.0], [0.0, 1.0, 0.0]);
    let before = kernel.build_calls();

    let err = apply_logo(
        &mut kernel,
        &base,
        curved,
        &LogoParams::default(),
        &ApplyOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReliefError::NonPlanarFace { face } if face == curved));

    let err = apply_qr(
        &mut kernel,
        &base,
        curved,
        &qr_params(ReliefMode::Emboss),
        &ApplyOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReliefError::NonPlanarFace { .. }));

    assert_eq!(kernel.build_calls(), before);
    assert_eq!(kernel.live_solids(), 1);
}

#[test]
fn invalid_params_rejected_before_any_build() {
    let (mut kernel, base, top) = setup();
    let params = LogoParams {
        diameter: 500.0,
        trail_fraction: f64::NAN,
        ..LogoParams::default()
    };
    let err = apply_logo(&mut kernel, &base, top, &params, &ApplyOptions::default()).unwrap_err();
    match err {
        ReliefError::InvalidGeometry { violations } => assert_eq!(violations.len(), 2),
        other => panic!("unexpected: {other}"),
    }
    assert_eq!(kernel.build_calls(), 0);
}

#[test]
fn boolean_failure_aborts_and_releases() {
    let (mut kernel, base, top) = setup();
    kernel.fail_nth_boolean(2);
    let err = apply_logo(
        &mut kernel,
        &base,
        top,
        &LogoParams::default(),
        &ApplyOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReliefError::BooleanOperationFailed { .. }));
    assert_eq!(kernel.live_solids(), 1);
    assert!(kernel.is_live(&base));
}

#[test]
fn qr_empty_and_oversized_payloads() {
    let (mut kernel, base, top) = setup();
    let empty = QrParams {
        data: String::new(),
        ..qr_params(ReliefMode::Emboss)
    };
    assert!(matches!(
        apply_qr(&mut kernel, &base, top, &empty, &ApplyOptions::default()),
        Err(ReliefError::EmptyPayload)
    ));

    let huge = QrParams {
        data: "z".repeat(3000),
        ec_level: EcLevel::L,
        ..qr_params(ReliefMode::Emboss)
    };
    match apply_qr(&mut kernel, &base, top, &huge, &ApplyOptions::default()) {
        Err(ReliefError::DataTooLong {
            capacity, fits_at, ..
        }) => {
            assert_eq!(capacity, 2953);
            assert_eq!(fits_at, None);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(kernel.build_calls(), 0);
}

#[test]
fn qr_whitespace_only_payload_is_empty() {
    let (mut kernel, base, top) = setup();
    let blank = QrParams {
        data: "   \n\t".to_string(),
        ..qr_params(ReliefMode::Emboss)
    };
    assert!(matches!(
        apply_qr(&mut kernel, &base, top, &blank, &ApplyOptions::default()),
        Err(ReliefError::EmptyPayload)
    ));
    assert_eq!(kernel.build_calls(), 0);
}

#[test]
fn qr_numeric_payload_past_byte_capacity_builds() {
    let (mut kernel, base, top) = setup();
    let params = QrParams {
        data: "7".repeat(3000),
        ec_level: EcLevel::L,
        size: 36.0,
        ..qr_params(ReliefMode::Emboss)
    };
    let out = apply_qr(&mut kernel, &base, top, &params, &ApplyOptions::default()).unwrap();
    let summary = out.diagnostics.qr.unwrap();
    assert!(summary.version > 2 && summary.version < 40);
    assert_eq!(summary.side, 17 + 4 * summary.version as usize + 4);
    assert_eq!(kernel.live_solids(), 2);
}

// ── QR ─────────────────────────────────────────────────────────────────────

fn module_centre(row: usize, col: usize, size: f64, side: usize) -> (f64, f64) {
    let m = size / side as f64;
    (
        -size / 2.0 + (col as f64 + 0.5) * m,
        size / 2.0 - (row as f64 + 0.5) * m,
    )
}

#[test]
fn qr_emboss_short_url() {
    let (mut kernel, base, top) = setup();
    let out = apply_qr(
        &mut kernel,
        &base,
        top,
        &qr_params(ReliefMode::Emboss),
        &ApplyOptions::default(),
    )
    .unwrap();

    let summary = out.diagnostics.qr.clone().unwrap();
    assert_eq!(summary.version, 2);
    assert_eq!(summary.side, 29);
    assert_abs_diff_eq!(summary.module_size_mm, 20.0 / 29.0, epsilon = 1e-12);
    assert!(summary.rectangles > 0);

    // Finder corner stands proud; its inner ring and the quiet zone do not.
    let (x, y) = module_centre(2, 2, 20.0, 29);
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, x, y), -0.5, epsilon = 1e-9);
    let (x, y) = module_centre(3, 3, 20.0, 29);
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, x, y), 0.0, epsilon = 1e-9);
    let (x, y) = module_centre(0, 0, 20.0, 29);
    assert_abs_diff_eq!(depth_at(&kernel, &out.solid, x, y), 0.0, epsilon = 1e-9);

    // Every module tool and intermediate union is gone.
    assert_eq!(kernel.live_solids(), 2);
}

#[test]
fn qr_deboss_recesses_dark_modules() {
    let (mut kernel, base, top) = setup();
    let params = QrParams {
        height: 0.3,
        offset_u: 4.0,
        ..qr_params(ReliefMode::Deboss)
    };
    let out = apply_qr(&mut kernel, &base, top, &params, &ApplyOptions::default()).unwrap();
    let (x, y) = module_centre(2, 2, 20.0, 29);
    assert_abs_diff_eq!(
        depth_at(&kernel, &out.solid, x + 4.0, y),
        0.3,
        epsilon = 1e-9
    );
}

#[test]
fn qr_tiny_modules_warn() {
    let (mut kernel, base, top) = setup();
    let params = QrParams {
        size: 5.0,
        ..qr_params(ReliefMode::Emboss)
    };
    let out = apply_qr(&mut kernel, &base, top, &params, &ApplyOptions::default()).unwrap();
    assert_eq!(out.diagnostics.warnings.len(), 1);
    assert!(out.diagnostics.warnings[0].contains("module size"));
}

// ── Re-application ─────────────────────────────────────────────────────────

#[test]
fn reapply_from_persisted_record_is_deterministic() {
    let (mut first_kernel, first_base, top) = setup();
    let first = apply_logo(
        &mut first_kernel,
        &first_base,
        top,
        &LogoParams {
            rotation_deg: 30.0,
            ..LogoParams::default()
        },
        &ApplyOptions::default(),
    )
    .unwrap();

    let json = serde_json::to_string(&first.record).unwrap();
    let record: ReliefRecord = serde_json::from_str(&json).unwrap();

    let (mut second_kernel, second_base, _) = setup();
    let second = reapply(
        &mut second_kernel,
        &second_base,
        &record,
        &ApplyOptions::default(),
    )
    .unwrap();

    assert_eq!(first.record, second.record);
    assert_eq!(
        depth_grid(&first_kernel, &first.solid),
        depth_grid(&second_kernel, &second.solid)
    );
}

#[test]
fn reapply_with_edited_params() {
    let (mut kernel, base, top) = setup();
    let first = apply_qr(
        &mut kernel,
        &base,
        top,
        &qr_params(ReliefMode::Emboss),
        &ApplyOptions::default(),
    )
    .unwrap();

    let mut record = first.record.clone();
    if let ReliefParams::Qr(p) = &mut record.params {
        p.mode = ReliefMode::Deboss;
        p.height = 0.2;
    }
    let second: ReliefOutput =
        reapply(&mut kernel, &base, &record, &ApplyOptions::default()).unwrap();

    let (x, y) = module_centre(2, 2, 20.0, 29);
    assert_abs_diff_eq!(depth_at(&kernel, &first.solid, x, y), -0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(depth_at(&kernel, &second.solid, x, y), 0.2, epsilon = 1e-9);
    assert!(kernel.is_live(&base));
}

// ── Diagnostics ────────────────────────────────────────────────────────────

const BOOLEAN_DELAY_MS: u64 = 2;

/// Mock kernel whose booleans take a fixed amount of wall time.
struct SlowBooleans(MockKernel);

impl Kernel for SlowBooleans {
    fn make_region_face(
        &mut self,
        region: &PlanarRegion,
        plane: &SketchPlane,
    ) -> Result<KernelId, KernelError> {
        self.0.make_region_face(region, plane)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.0.extrude_face(face, direction, depth)
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        thread::sleep(Duration::from_millis(BOOLEAN_DELAY_MS));
        self.0.boolean_union(a, b)
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        thread::sleep(Duration::from_millis(BOOLEAN_DELAY_MS));
        self.0.boolean_subtract(a, b)
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.0.release(solid)
    }
}

impl KernelIntrospect for SlowBooleans {
    fn is_planar(&self, face: FaceId) -> Result<bool, KernelError> {
        self.0.is_planar(face)
    }

    fn face_frame(&self, face: FaceId) -> Result<FaceFrame, KernelError> {
        self.0.face_frame(face)
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceId> {
        self.0.list_faces(solid)
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox> {
        self.0.bounding_box(solid)
    }
}

#[test]
fn kernel_time_counts_boolean_calls() {
    let (kernel, base, top) = setup();
    let mut slow = SlowBooleans(kernel);
    let out = apply_qr(
        &mut slow,
        &base,
        top,
        &qr_params(ReliefMode::Emboss),
        &ApplyOptions::default(),
    )
    .unwrap();
    // The modules are unioned pairwise, then fused onto the base once.
    let booleans = out.diagnostics.qr.unwrap().rectangles;
    assert!(
        out.diagnostics.kernel_time_ms >= (BOOLEAN_DELAY_MS as usize * booleans) as f64,
        "{} ms for {booleans} booleans",
        out.diagnostics.kernel_time_ms
    );
}

//! Property-based tests for relief invariants using the `proptest` crate.

use proptest::prelude::*;

use relief_ops::merge::merge_rectangles;
use relief_ops::placement::derive_frame;
use relief_ops::silhouette::logo_outlines;
use relief_ops::validate::wrap_rotation;
use relief_types::{cross, dot, Flattening, ModuleMatrix};

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Square boolean grid with a quiet zone.
fn arb_matrix() -> impl Strategy<Value = ModuleMatrix> {
    (1usize..24, 0usize..4).prop_flat_map(|(width, border)| {
        prop::collection::vec(any::<bool>(), width * width).prop_map(move |cells| {
            ModuleMatrix::from_cells(width, border, cells).expect("square by construction")
        })
    })
}

/// Non-degenerate direction.
fn arb_direction() -> impl Strategy<Value = [f64; 3]> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("non-zero", |(x, y, z)| x * x + y * y + z * z > 1e-3)
        .prop_map(|(x, y, z)| [x, y, z])
}

fn assert_exact_cover(matrix: &ModuleMatrix) -> Result<(), TestCaseError> {
    let rects = merge_rectangles(matrix);
    let side = matrix.side();
    for (i, rect) in rects.iter().enumerate() {
        prop_assert!(rect.row + rect.row_span <= side && rect.col + rect.col_span <= side);
        for other in &rects[i + 1..] {
            prop_assert!(!rect.overlaps(other));
        }
    }
    for r in 0..side {
        for c in 0..side {
            let hits = rects.iter().filter(|rect| rect.contains(r, c)).count();
            prop_assert_eq!(hits, usize::from(matrix.is_dark(r, c)));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 1. Every dark module is covered exactly once, no light module at all
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merger_exact_cover(matrix in arb_matrix()) {
        assert_exact_cover(&matrix)?;
    }

    #[test]
    fn merger_all_dark_is_one_rect(width in 1usize..30, border in 0usize..4) {
        let matrix = ModuleMatrix::from_cells(width, border, vec![true; width * width]).unwrap();
        let rects = merge_rectangles(&matrix);
        prop_assert_eq!(rects.len(), 1);
        prop_assert_eq!(rects[0].cell_count(), width * width);
        prop_assert_eq!((rects[0].row, rects[0].col), (border, border));
    }

    #[test]
    fn merger_checkerboard_has_no_merges(width in 1usize..20) {
        let cells = (0..width * width).map(|i| (i / width + i % width) % 2 == 0).collect();
        let matrix = ModuleMatrix::from_cells(width, 1, cells).unwrap();
        assert_exact_cover(&matrix)?;
        prop_assert_eq!(merge_rectangles(&matrix).len(), matrix.dark_count());
    }
}

// ---------------------------------------------------------------------------
// 2. Scaling the logo scales every vertex by the same factor
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn logo_scales_proportionally(diameter in 5.0f64..100.0) {
        let res = Flattening::default();
        let reference = logo_outlines(44.0, &res).unwrap();
        let scaled = logo_outlines(diameter, &res).unwrap();
        let k = diameter / 44.0;
        for (a, b) in reference.iter().zip(&scaled) {
            let ra = a.outline.flatten(&res);
            let rb = b.outline.flatten(&res);
            prop_assert_eq!(ra.outer.len(), rb.outer.len());
            for (p, q) in ra.outer.iter().zip(&rb.outer) {
                prop_assert!((p.x * k - q.x).abs() < 1e-9 * diameter);
                prop_assert!((p.y * k - q.y).abs() < 1e-9 * diameter);
            }
            prop_assert!((ra.area() * k * k - rb.area()).abs() < 1e-6 * diameter * diameter);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Placement frames are right-handed orthonormal for any normal and hint
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn placement_frame_is_orthonormal(
        normal in arb_direction(),
        hint in prop::option::of(arb_direction()),
        rotation in -720.0f64..720.0,
    ) {
        let f = derive_frame([0.0; 3], normal, hint, 0.0, 0.0, rotation).unwrap();
        let plane = f.sketch_plane();
        for axis in [plane.x_axis, plane.y_axis, f.normal, f.u, f.v] {
            prop_assert!((dot(axis, axis) - 1.0).abs() < TOL);
        }
        prop_assert!(dot(plane.x_axis, plane.y_axis).abs() < TOL);
        prop_assert!(dot(plane.x_axis, f.normal).abs() < TOL);
        prop_assert!(dot(plane.y_axis, f.normal).abs() < TOL);
        prop_assert!(dot(cross(plane.x_axis, plane.y_axis), f.normal) > 1.0 - TOL);
    }

    #[test]
    fn rotation_wraps_into_half_open_range(deg in -1.0e4f64..1.0e4) {
        let w = wrap_rotation(deg);
        prop_assert!((-180.0..180.0).contains(&w));
        let turns = (deg - w) / 360.0;
        prop_assert!((turns - turns.round()).abs() < 1e-9);
    }
}

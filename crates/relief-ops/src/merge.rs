//! Greedy rectangle cover of a module matrix's dark cells.

use relief_types::{MergedRect, ModuleMatrix, PlanarRegion, Point2};

/// Cover every dark module with non-overlapping rectangles.
///
/// Rows are scanned top to bottom, left to right. Each uncovered dark cell
/// starts a rectangle as wide as its uncovered dark run; the rectangle grows
/// down while the next row has an uncovered dark run of exactly that width
/// starting at the same column. Coordinates include the quiet zone.
pub fn merge_rectangles(matrix: &ModuleMatrix) -> Vec<MergedRect> {
    let side = matrix.side();
    let mut covered = vec![false; side * side];
    let free = |covered: &[bool], r: usize, c: usize| matrix.is_dark(r, c) && !covered[r * side + c];
    let run_from = |covered: &[bool], r: usize, c: usize| {
        (c..side).take_while(|&cc| free(covered, r, cc)).count()
    };

    let mut rects = Vec::new();
    for row in 0..side {
        for col in 0..side {
            if !free(&covered[..], row, col) {
                continue;
            }
            let col_span = run_from(&covered[..], row, col);
            let mut row_span = 1;
            while row + row_span < side && run_from(&covered[..], row + row_span, col) == col_span {
                row_span += 1;
            }
            let rect = MergedRect {
                row,
                col,
                row_span,
                col_span,
            };
            for (r, c) in rect.cells() {
                covered[r * side + c] = true;
            }
            rects.push(rect);
        }
    }
    rects
}

/// Plane-local footprint of a rectangle on a symbol `size` mm wide with `side`
/// modules per side, centred on the origin. Row 0 is the top row.
pub fn rect_region(rect: &MergedRect, size: f64, side: usize) -> PlanarRegion {
    let module = size / side as f64;
    let half = size / 2.0;
    let x0 = -half + rect.col as f64 * module;
    let y_top = half - rect.row as f64 * module;
    PlanarRegion::rectangle(
        Point2::new(x0, y_top - rect.row_span as f64 * module),
        Point2::new(x0 + rect.col_span as f64 * module, y_top),
    )
}

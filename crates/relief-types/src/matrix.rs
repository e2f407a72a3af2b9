use serde::{Deserialize, Serialize};

/// Square grid of dark/light modules with a logical light quiet zone around it.
///
/// Coordinates passed to [`ModuleMatrix::is_dark`] are padded coordinates:
/// row/col 0 is the outer edge of the quiet zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMatrix {
    width: usize,
    border: usize,
    cells: Vec<bool>,
}

impl ModuleMatrix {
    /// Build from row-major cells. Returns `None` unless `cells.len() == width * width`.
    pub fn from_cells(width: usize, border: usize, cells: Vec<bool>) -> Option<Self> {
        (cells.len() == width * width).then_some(Self {
            width,
            border,
            cells,
        })
    }

    /// Build from rows. Returns `None` for a non-square grid.
    pub fn from_rows(rows: &[Vec<bool>], border: usize) -> Option<Self> {
        let width = rows.len();
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Self::from_cells(width, border, rows.concat())
    }

    /// Module count of the symbol itself, without quiet zone.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn border(&self) -> usize {
        self.border
    }

    /// Module count per side including the quiet zone on both sides.
    pub fn side(&self) -> usize {
        self.width + 2 * self.border
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        let (Some(r), Some(c)) = (row.checked_sub(self.border), col.checked_sub(self.border)) else {
            return false;
        };
        r < self.width && c < self.width && self.cells[r * self.width + c]
    }

    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|&&d| d).count()
    }
}

/// Axis-aligned block of modules in padded matrix coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRect {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl MergedRect {
    pub fn cell_count(&self) -> usize {
        self.row_span * self.col_span
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.row
            && row < self.row + self.row_span
            && col >= self.col
            && col < self.col + self.col_span
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row..self.row + self.row_span)
            .flat_map(move |r| (self.col..self.col + self.col_span).map(move |c| (r, c)))
    }

    pub fn overlaps(&self, other: &MergedRect) -> bool {
        self.row < other.row + other.row_span
            && other.row < self.row + self.row_span
            && self.col < other.col + other.col_span
            && other.col < self.col + self.col_span
    }
}

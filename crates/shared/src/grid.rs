//! Indoor floor grid.
//!
//! The floor is an N×N grid of square cells, 1-indexed on both axes.
//! Rows run along the view's x axis and columns along y, the same layout
//! the labeling backend stores.
//! Cells are 100 units wide in unscaled grid space; zoom is a single
//! uniform scale anchored at the view origin (no pan, no rotation).
use serde::{Deserialize, Serialize};

// Reference deployment
pub const DEFAULT_GRID_SIZE: u32 = 16;
pub const DEFAULT_CELL_SIZE: f64 = 100.0;

// Zoom limits
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 5.0;

/// Cell coordinate labels are only drawn above this zoom; below it they overlap.
pub const LABEL_SCALE_THRESHOLD: f64 = 1.5;

/// A grid cell, `(row, col)`, both 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Cell { row, col }
    }

    /// Build a cell from signed wire values. Only rejects values that cannot
    /// be a cell at all (negative or too large); grid bounds are checked by
    /// [`GridSpec::contains`].
    pub fn from_signed(row: i64, col: i64) -> Option<Self> {
        let row = u32::try_from(row).ok()?;
        let col = u32::try_from(col).ok()?;
        Some(Cell { row, col })
    }

    /// Text drawn inside the cell at high zoom, e.g. `"3,4"`.
    pub fn label(&self) -> String {
        format!("{},{}", self.row, self.col)
    }

    /// Wire form used by the path endpoint.
    pub fn pair(&self) -> [u32; 2] {
        [self.row, self.col]
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Axis-aligned square in view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.size
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.size
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.size / 2.0, self.top + self.size / 2.0)
    }

    /// Half-open containment, matching the floor() in the forward transform.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Grid dimension and unscaled cell edge length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub size: u32,
    pub cell_size: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            size: DEFAULT_GRID_SIZE,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl GridSpec {
    pub fn new(size: u32, cell_size: f64) -> Self {
        GridSpec { size, cell_size }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (1..=self.size).contains(&cell.row) && (1..=self.size).contains(&cell.col)
    }

    /// Signed wire coordinates to an in-range cell.
    pub fn cell_at(&self, row: i64, col: i64) -> Option<Cell> {
        Cell::from_signed(row, col).filter(|c| self.contains(*c))
    }

    /// Forward transform: view pixel to the cell under it at `scale`.
    ///
    /// `row = floor((px / scale) / cell_size) + 1`, same for `col` on y.
    /// Returns `None` when the point falls outside the grid.
    pub fn view_to_cell(&self, px: f64, py: f64, scale: f64) -> Option<Cell> {
        if !px.is_finite() || !py.is_finite() || scale <= 0.0 || self.cell_size <= 0.0 {
            return None;
        }
        let index = |p: f64| {
            let i = (p / scale / self.cell_size).floor();
            (0.0..self.size as f64).contains(&i).then_some(i as i64 + 1)
        };
        self.cell_at(index(px)?, index(py)?)
    }

    /// Inverse transform: the on-screen square of `cell` at `scale`.
    pub fn cell_rect(&self, cell: Cell, scale: f64) -> Rect {
        let side = self.cell_size * scale;
        Rect {
            left: (cell.row as f64 - 1.0) * side,
            top: (cell.col as f64 - 1.0) * side,
            size: side,
        }
    }

    /// Width (and height) of the whole grid in view pixels.
    pub fn extent(&self, scale: f64) -> f64 {
        self.size as f64 * self.cell_size * scale
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let size = self.size;
        (1..=size).flat_map(move |row| (1..=size).map(move |col| Cell { row, col }))
    }
}

/// Clamp a zoom factor into `[MIN_SCALE, MAX_SCALE]`.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_to_cell_origin() {
        let spec = GridSpec::default();
        assert_eq!(spec.view_to_cell(0.0, 0.0, 1.0), Some(Cell::new(1, 1)));
    }

    #[test]
    fn test_view_to_cell_zoomed_tap() {
        // 250/2/100 = 1.25 -> row 2, 150/2/100 = 0.75 -> col 1
        let spec = GridSpec::default();
        assert_eq!(spec.view_to_cell(250.0, 150.0, 2.0), Some(Cell::new(2, 1)));
    }

    #[test]
    fn test_view_to_cell_last_cell() {
        let spec = GridSpec::default();
        assert_eq!(
            spec.view_to_cell(1599.9, 1599.9, 1.0),
            Some(Cell::new(16, 16))
        );
    }

    #[test]
    fn test_view_to_cell_past_edge_is_none() {
        let spec = GridSpec::default();
        assert_eq!(spec.view_to_cell(1600.0, 10.0, 1.0), None);
        assert_eq!(spec.view_to_cell(10.0, 3200.0, 2.0), None);
    }

    #[test]
    fn test_view_to_cell_negative_is_none() {
        let spec = GridSpec::default();
        assert_eq!(spec.view_to_cell(-0.5, 10.0, 1.0), None);
        assert_eq!(spec.view_to_cell(10.0, -120.0, 1.0), None);
    }

    #[test]
    fn test_view_to_cell_rejects_non_finite() {
        let spec = GridSpec::default();
        assert_eq!(spec.view_to_cell(f64::NAN, 10.0, 1.0), None);
        assert_eq!(spec.view_to_cell(10.0, f64::INFINITY, 1.0), None);
        assert_eq!(spec.view_to_cell(10.0, 10.0, 0.0), None);
    }

    #[test]
    fn test_view_to_cell_rejects_huge_coordinates() {
        let spec = GridSpec::default();
        assert_eq!(spec.view_to_cell(1e300, 10.0, 1.0), None);
        assert_eq!(spec.view_to_cell(10.0, -1e300, 1.0), None);
        assert_eq!(spec.view_to_cell(f64::MAX, f64::MAX, 0.5), None);
        assert_eq!(spec.view_to_cell(1599.9, 1599.9, 1.0), Some(Cell::new(16, 16)));
    }

    #[test]
    fn test_cell_rect_scaled() {
        let spec = GridSpec::default();
        let rect = spec.cell_rect(Cell::new(3, 2), 2.0);
        assert!((rect.left - 400.0).abs() < 1e-9);
        assert!((rect.top - 200.0).abs() < 1e-9);
        assert!((rect.size - 200.0).abs() < 1e-9);
        assert!((rect.right() - 600.0).abs() < 1e-9);
        assert!((rect.bottom() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_cell_rect_center() {
        let spec = GridSpec::default();
        let (cx, cy) = spec.cell_rect(Cell::new(1, 7), 1.0).center();
        assert!((cx - 50.0).abs() < 1e-9);
        assert!((cy - 650.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect { left: 100.0, top: 0.0, size: 100.0 };
        assert!(rect.contains(100.0, 0.0));
        assert!(rect.contains(199.9, 99.9));
        assert!(!rect.contains(200.0, 50.0));
    }

    #[test]
    fn test_rect_center_maps_back_to_cell() {
        // Integer-pixel centre of every cell maps back to that cell at any zoom.
        let spec = GridSpec::default();
        for &scale in &[1.0, 1.37, 1.5, 2.0, 2.71, 3.3, 4.99, 5.0] {
            for cell in spec.cells() {
                let (cx, cy) = spec.cell_rect(cell, scale).center();
                let back = spec.view_to_cell(cx.round(), cy.round(), scale);
                assert_eq!(back, Some(cell), "scale {scale} cell {cell}");
            }
        }
    }

    #[test]
    fn test_rect_origin_maps_back_to_cell() {
        let spec = GridSpec::default();
        for &scale in &[1.0, 2.0, 4.0, 5.0] {
            for cell in spec.cells() {
                let rect = spec.cell_rect(cell, scale);
                assert!(rect.contains(rect.left, rect.top));
                assert_eq!(spec.view_to_cell(rect.left, rect.top, scale), Some(cell));
            }
        }
    }

    #[test]
    fn test_contains_bounds() {
        let spec = GridSpec::default();
        assert!(spec.contains(Cell::new(1, 1)));
        assert!(spec.contains(Cell::new(16, 16)));
        assert!(!spec.contains(Cell::new(0, 5)));
        assert!(!spec.contains(Cell::new(5, 17)));
    }

    #[test]
    fn test_cell_at_signed() {
        let spec = GridSpec::default();
        assert_eq!(spec.cell_at(3, 4), Some(Cell::new(3, 4)));
        assert_eq!(spec.cell_at(-1, 4), None);
        assert_eq!(spec.cell_at(17, 4), None);
        assert_eq!(spec.cell_at(i64::MAX, 1), None);
    }

    #[test]
    fn test_cells_row_major() {
        let spec = GridSpec::new(3, 100.0);
        let cells: Vec<Cell> = spec.cells().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Cell::new(1, 1));
        assert_eq!(cells[1], Cell::new(1, 2));
        assert_eq!(cells[3], Cell::new(2, 1));
        assert_eq!(cells[8], Cell::new(3, 3));
    }

    #[test]
    fn test_extent() {
        let spec = GridSpec::default();
        assert!((spec.extent(1.0) - 1600.0).abs() < 1e-9);
        assert!((spec.extent(2.5) - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_scale() {
        assert_eq!(clamp_scale(0.2), MIN_SCALE);
        assert_eq!(clamp_scale(7.0), MAX_SCALE);
        assert_eq!(clamp_scale(2.5), 2.5);
        assert_eq!(clamp_scale(f64::NAN), MIN_SCALE);
    }

    #[test]
    fn test_cell_label_and_display() {
        let cell = Cell::new(3, 4);
        assert_eq!(cell.label(), "3,4");
        assert_eq!(cell.to_string(), "(3, 4)");
        assert_eq!(cell.pair(), [3, 4]);
    }
}

//! Cell grid construction and connected component labeling
//!
//! The grid is a flat `row * cols + col` buffer of [`CellState`] values,
//! created fresh for every detection call.

use image::Rgb;

use super::types::PixelBuffer;

/// Pixel stride of the diagonal fallback scan
const DIAGONAL_STRIDE: usize = 2;

/// State of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    /// No foreground pixel sampled
    #[default]
    Empty,
    /// Foreground detected, not yet assigned to a component
    Active,
    /// Assigned to a component during labeling
    Visited,
}

/// Check whether a pixel differs from the background by more than
/// `threshold` in any of R, G or B
#[inline]
pub fn is_foreground(pixel: Rgb<u8>, background: Rgb<u8>, threshold: u8) -> bool {
    pixel
        .0
        .iter()
        .zip(background.0.iter())
        .any(|(p, b)| p.abs_diff(*b) > threshold)
}

/// A maximal 4-connected group of foreground cells, in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellComponent {
    pub min_col: u32,
    pub max_col: u32,
    pub min_row: u32,
    pub max_row: u32,
    pub cell_count: usize,
}

impl CellComponent {
    fn new(row: u32, col: u32) -> Self {
        Self {
            min_col: col,
            max_col: col,
            min_row: row,
            max_row: row,
            cell_count: 0,
        }
    }

    fn expand(&mut self, row: u32, col: u32) {
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.cell_count += 1;
    }

    /// `max_col - min_col`
    pub fn col_span(&self) -> u32 {
        self.max_col - self.min_col
    }

    /// `max_row - min_row`
    pub fn row_span(&self) -> u32 {
        self.max_row - self.min_row
    }

    /// Whether the cell lies inside the bounding box
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }
}

/// Scratch grid of cell states
#[derive(Debug, Clone)]
pub struct Grid {
    cols: u32,
    rows: u32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![CellState::Empty; cols as usize * rows as usize],
        }
    }

    /// Build the foreground grid for an image (detection stage 2).
    ///
    /// `buffer` must be readable and `grid_size` non-zero.
    pub fn classify(
        buffer: &PixelBuffer<'_>,
        background: Rgb<u8>,
        grid_size: u32,
        threshold: u8,
    ) -> Self {
        let width = buffer.width();
        let height = buffer.height();
        let mut grid = Self::new(width.div_ceil(grid_size), height.div_ceil(grid_size));

        let max_x = width - 1;
        let max_y = height - 1;
        let half = grid_size / 2;

        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let start_x = col.saturating_mul(grid_size);
                let start_y = row.saturating_mul(grid_size);

                let cx = start_x.saturating_add(half).min(max_x);
                let cy = start_y.saturating_add(half).min(max_y);

                let active = is_foreground(buffer.pixel_rgb(cx, cy), background, threshold)
                    || (0..grid_size).step_by(DIAGONAL_STRIDE).any(|i| {
                        let dx = start_x.saturating_add(i).min(max_x);
                        let dy = start_y.saturating_add(i).min(max_y);
                        is_foreground(buffer.pixel_rgb(dx, dy), background, threshold)
                    });

                if active {
                    grid.set(row, col, CellState::Active);
                }
            }
        }

        grid
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    pub fn get(&self, row: u32, col: u32) -> CellState {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: u32, col: u32, state: CellState) {
        let idx = self.index(row, col);
        self.cells[idx] = state;
    }

    /// Number of cells still waiting to be labeled
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == CellState::Active).count()
    }

    /// Number of foreground cells, labeled or not
    pub fn foreground_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| **c != CellState::Empty)
            .count()
    }

    /// Group active cells into 4-connected components (detection stage 3).
    ///
    /// Components are returned in row-major discovery order. Every reached
    /// cell is marked [`CellState::Visited`], so each cell is pushed at most once.
    pub fn label(&mut self) -> Vec<CellComponent> {
        let mut components = Vec::new();
        let mut stack: Vec<(u32, u32)> = Vec::new();

        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.get(row, col) != CellState::Active {
                    continue;
                }

                let mut component = CellComponent::new(row, col);
                self.set(row, col, CellState::Visited);
                stack.push((row, col));

                while let Some((r, c)) = stack.pop() {
                    component.expand(r, c);

                    let neighbors = [
                        r.checked_sub(1).map(|nr| (nr, c)),
                        (r + 1 < self.rows).then_some((r + 1, c)),
                        c.checked_sub(1).map(|nc| (r, nc)),
                        (c + 1 < self.cols).then_some((r, c + 1)),
                    ];

                    for (nr, nc) in neighbors.into_iter().flatten() {
                        if self.get(nr, nc) == CellState::Active {
                            self.set(nr, nc, CellState::Visited);
                            stack.push((nr, nc));
                        }
                    }
                }

                components.push(component);
            }
        }

        components
    }
}

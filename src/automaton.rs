// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use anyhow::bail;

/// A grid of boolean cells in raster order that can step itself forward.
///
/// The viewer reads and writes [`Automaton::cells_mut`] directly for painting,
/// reseeding and clearing; only [`Automaton::advance`] applies the rule.
pub trait Automaton {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn count(&self) -> usize {
        self.width() * self.height()
    }

    fn cells(&self) -> &[bool];
    fn cells_mut(&mut self) -> &mut [bool];

    /// One generation step, in place.
    fn advance(&mut self);
}

/// Conway's Game of Life (B3/S23) on a torus.
#[derive(Debug, Clone)]
pub struct Life {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    next: Vec<bool>, // scratch buffer, swapped in after each step
}

impl Life {
    pub fn new(width: usize, height: usize) -> anyhow::Result<Self> {
        if width == 0 || height == 0 {
            bail!("grid must be at least 1x1, got {width}x{height}");
        }
        let Some(count) = width.checked_mul(height) else {
            bail!("grid {width}x{height} is too large");
        };
        Ok(Self {
            width,
            height,
            cells: vec![false; count],
            next: vec![false; count],
        })
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Live cells among the 8 neighbours, with edges wrapping around.
    fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        let left = (x + self.width - 1) % self.width;
        let right = (x + 1) % self.width;
        let up = (y + self.height - 1) % self.height;
        let down = (y + 1) % self.height;

        let mut count = 0;
        for ny in [up, y, down] {
            for nx in [left, x, right] {
                if nx == x && ny == y {
                    continue;
                }
                count += self.cells[self.index(nx, ny)] as u8;
            }
        }
        count
    }
}

impl Automaton for Life {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cells(&self) -> &[bool] {
        &self.cells
    }

    fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    fn advance(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.index(x, y);
                let neighbors = self.live_neighbors(x, y);
                self.next[idx] = matches!((self.cells[idx], neighbors), (true, 2) | (_, 3));
            }
        }
        std::mem::swap(&mut self.cells, &mut self.next);
    }
}

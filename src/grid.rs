//! Cell lattice and Conway generation stepping with ancestry tracking.
//!
//! The grid keeps two buffers. `advance_generation` reads only `current`,
//! writes every cell of `next`, then swaps them, so no cell ever sees a
//! neighbour's already-updated state. Everything outside
//! `[0, width) x [0, height)` is permanently dead; there is no wraparound.

use crate::patterns::Pattern;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Moore neighbourhood offsets
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One lattice site
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub alive: bool,
    /// Consecutive generations alive, 0 when dead
    pub age: u32,
    /// Inherited colour tag in [0, 360)
    pub lineage_hue: f32,
    pub born_at_generation: u64,
}

impl Cell {
    /// A dead cell carrying `hue`
    pub fn dead(hue: f32) -> Self {
        Self {
            alive: false,
            age: 0,
            lineage_hue: hue,
            born_at_generation: 0,
        }
    }
}

/// Counts produced by one generation step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation number after the step
    pub generation: u64,
    pub born: usize,
    pub died: usize,
    pub survived: usize,
}

/// Double-buffered Game of Life lattice
#[derive(Clone, Debug)]
pub struct AutomatonGrid {
    width: usize,
    height: usize,
    current: Vec<Cell>,
    next: Vec<Cell>,
    generation: u64,
}

#[inline]
fn random_hue<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..360.0)
}

#[inline]
fn normalize_hue(hue: f32) -> f32 {
    let h = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Live neighbour count of (x, y) plus the buffer indices of those neighbours.
#[inline]
fn live_neighbors(
    cells: &[Cell],
    width: usize,
    height: usize,
    x: i32,
    y: i32,
) -> (usize, [usize; 8]) {
    let mut count = 0;
    let mut parents = [0usize; 8];

    for &(dx, dy) in &NEIGHBOR_OFFSETS {
        let nx = x + dx;
        let ny = y + dy;
        if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
            continue;
        }
        let idx = ny as usize * width + nx as usize;
        if cells[idx].alive {
            parents[count] = idx;
            count += 1;
        }
    }

    (count, parents)
}

impl AutomatonGrid {
    /// Allocate a `width x height` grid of dead cells with random hues
    pub fn new<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let current: Vec<Cell> = (0..width * height)
            .map(|_| Cell::dead(random_hue(rng)))
            .collect();
        let next = current.clone();

        Self {
            width,
            height,
            current,
            next,
            generation: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of generations computed since creation or the last `clear`
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    /// Cell at (x, y), `None` outside the grid
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.current[i])
    }

    /// Current buffer in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.current
    }

    /// Liveness query; false outside the grid
    #[inline]
    pub fn is_alive(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(false, |i| self.current[i].alive)
    }

    /// Flip a cell between alive and dead
    pub fn toggle(&mut self, x: i32, y: i32) {
        if self.is_alive(x, y) {
            self.kill(x, y);
        } else {
            self.set_alive(x, y, None);
        }
    }

    /// Kill a cell, keeping its hue. Returns true if a live cell was killed.
    pub fn kill(&mut self, x: i32, y: i32) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let cell = &mut self.current[i];
        let was_alive = cell.alive;
        cell.alive = false;
        cell.age = 0;
        was_alive
    }

    /// Bring a cell to life, optionally re-tagging its hue.
    ///
    /// An already-live cell keeps its age and birth generation.
    pub fn set_alive(&mut self, x: i32, y: i32, hue: Option<f32>) {
        let generation = self.generation;
        let Some(i) = self.index(x, y) else {
            return;
        };
        let cell = &mut self.current[i];
        if !cell.alive {
            cell.alive = true;
            cell.age = 1;
            cell.born_at_generation = generation;
        }
        if let Some(h) = hue {
            cell.lineage_hue = normalize_hue(h);
        }
    }

    /// Live cells in the Moore neighbourhood of (x, y), 0-8
    pub fn count_live_neighbors(&self, x: i32, y: i32) -> usize {
        live_neighbors(&self.current, self.width, self.height, x, y).0
    }

    /// Compute the next generation under B3/S23.
    ///
    /// Newborns copy the hue of one live parent picked uniformly with `rng`.
    /// Rows are computed in parallel; each row draws from its own stream of a
    /// generator seeded once from `rng`, so the result depends only on the
    /// grid and the state of `rng`.
    pub fn advance_generation<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GenerationReport {
        let seed: u64 = rng.gen();
        let width = self.width;
        let height = self.height;
        let generation = self.generation;
        let current = &self.current;

        let (born, died, survived) = self
            .next
            .par_chunks_mut(width.max(1))
            .enumerate()
            .map(|(y, row)| {
                let mut row_rng = ChaCha8Rng::seed_from_u64(seed);
                row_rng.set_stream(y as u64);

                let mut tally = (0usize, 0usize, 0usize);
                for (x, slot) in row.iter_mut().enumerate() {
                    let cell = current[y * width + x];
                    let (count, parents) =
                        live_neighbors(current, width, height, x as i32, y as i32);

                    *slot = match (cell.alive, count) {
                        (true, 2) | (true, 3) => {
                            tally.2 += 1;
                            Cell {
                                age: cell.age + 1,
                                ..cell
                            }
                        }
                        (true, _) => {
                            tally.1 += 1;
                            Cell {
                                alive: false,
                                age: 0,
                                ..cell
                            }
                        }
                        (false, 3) => {
                            tally.0 += 1;
                            let parent = parents[row_rng.gen_range(0..3)];
                            Cell {
                                alive: true,
                                age: 1,
                                lineage_hue: current[parent].lineage_hue,
                                born_at_generation: generation + 1,
                            }
                        }
                        (false, _) => Cell { age: 0, ..cell },
                    };
                }
                tally
            })
            .reduce(|| (0, 0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;

        GenerationReport {
            generation: self.generation,
            born,
            died,
            survived,
        }
    }

    /// Total live cells
    pub fn live_cell_count(&self) -> usize {
        self.current.iter().filter(|c| c.alive).count()
    }

    /// True when no cell is alive
    pub fn is_empty(&self) -> bool {
        !self.current.iter().any(|c| c.alive)
    }

    /// Coordinates of live cells in row-major order
    pub fn live_cells(&self) -> Vec<(usize, usize)> {
        self.current
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .map(|(i, _)| (i % self.width, i / self.width))
            .collect()
    }

    /// Kill every cell and restart the generation counter. Hues are kept.
    pub fn clear(&mut self) {
        for cell in &mut self.current {
            cell.alive = false;
            cell.age = 0;
        }
        self.generation = 0;
    }

    /// Seed each cell alive with probability `density`, with a fresh random hue
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f32, rng: &mut R) {
        let generation = self.generation;
        for cell in &mut self.current {
            let alive = rng.gen::<f32>() < density;
            *cell = Cell {
                alive,
                age: u32::from(alive),
                lineage_hue: random_hue(rng),
                born_at_generation: generation,
            };
        }
    }

    /// Stamp a pattern with its origin at (x, y); cells off the grid are dropped
    pub fn apply_pattern(&mut self, pattern: &Pattern, x: i32, y: i32, hue: Option<f32>) {
        for &(px, py) in pattern.cells {
            self.set_alive(x + px, y + py, hue);
        }
    }
}

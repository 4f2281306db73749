//! Classic Game of Life patterns in local (x, y) coordinates.

/// A named set of live cells relative to a top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

impl Pattern {
    /// Case-insensitive lookup in [`PATTERNS`]
    pub fn find(name: &str) -> Option<&'static Pattern> {
        PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Bounding box size (width, height)
    pub fn size(&self) -> (i32, i32) {
        let w = self.cells.iter().map(|&(x, _)| x + 1).max().unwrap_or(0);
        let h = self.cells.iter().map(|&(_, y)| y + 1).max().unwrap_or(0);
        (w, h)
    }
}

pub const BLOCK: Pattern = Pattern {
    name: "Block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

/// Horizontal phase
pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

pub const TOAD: Pattern = Pattern {
    name: "Toad",
    cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
};

pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
};

/// Travels (+1, +1) every 4 generations
pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "R-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

#[rustfmt::skip]
pub const GOSPER_GLIDER_GUN: Pattern = Pattern {
    name: "Gosper Glider Gun",
    cells: &[
        (0, 4), (1, 4), (0, 5), (1, 5),
        (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
        (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
        (16, 6), (17, 5), (20, 2), (20, 3), (20, 4), (21, 2), (21, 3),
        (21, 4), (22, 1), (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
        (34, 2), (34, 3), (35, 2), (35, 3),
    ],
};

pub const PATTERNS: &[Pattern] = &[
    BLOCK,
    BLINKER,
    TOAD,
    BEACON,
    GLIDER,
    R_PENTOMINO,
    GOSPER_GLIDER_GUN,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AutomatonGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_find() {
        assert_eq!(Pattern::find("glider"), Some(&GLIDER));
        assert_eq!(Pattern::find("GOSPER GLIDER GUN").unwrap().cells.len(), 36);
        assert!(Pattern::find("spaceship").is_none());
    }

    #[test]
    fn test_size() {
        assert_eq!(BLOCK.size(), (2, 2));
        assert_eq!(GOSPER_GLIDER_GUN.size(), (36, 9));
    }

    #[test]
    fn test_period_two_oscillators() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for pattern in [BLINKER, TOAD, BEACON] {
            let mut grid = AutomatonGrid::new(12, 12, &mut rng);
            grid.apply_pattern(&pattern, 4, 4, None);
            let start = grid.live_cells();

            grid.advance_generation(&mut rng);
            assert_ne!(grid.live_cells(), start, "{} did not change", pattern.name);
            grid.advance_generation(&mut rng);
            assert_eq!(grid.live_cells(), start, "{} is not period 2", pattern.name);
        }
    }

    #[test]
    fn test_gun_emits_gliders() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut grid = AutomatonGrid::new(60, 40, &mut rng);
        grid.apply_pattern(&GOSPER_GLIDER_GUN, 1, 1, None);
        let initial = grid.live_cell_count();

        for _ in 0..60 {
            grid.advance_generation(&mut rng);
        }

        // Period-30 gun: two gliders released after 60 generations
        assert!(grid.live_cell_count() > initial);
    }
}

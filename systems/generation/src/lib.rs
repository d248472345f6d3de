#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drunkard's walk dungeon generation.
//!
//! A cursor starts near the centre of an all-wall grid and wanders one
//! cardinal step at a time, turning every wall it lands on into floor until
//! the carve budget of distinct floor tiles is reached. The cursor is clamped
//! into the interior before each carve, so the outer border always stays
//! solid. Every carved tile lies on the same walk and is therefore reachable
//! from the start cell.

use dungeon_crawl_core::{CellCoord, Direction, Tile, TileGrid};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Share of the grid carved into floor when no other fraction is configured.
pub const DEFAULT_CARVE_FRACTION: f64 = 0.5;

const MIN_DIMENSION: u32 = 3;

/// Reasons a generation configuration may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GenerationError {
    /// The grid has no interior cells that could be carved.
    #[error("a {columns}x{rows} grid has no interior; both dimensions must be at least 3")]
    TooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The carve fraction lies outside `(0, 1]`.
    #[error("carve fraction {fraction} must lie in (0, 1]")]
    InvalidCarveFraction {
        /// Requested fraction.
        fraction: f64,
    },
    /// The carve budget rounds down to zero tiles.
    #[error("carve fraction {fraction} of {cells} cells yields no floor tiles")]
    EmptyBudget {
        /// Requested fraction.
        fraction: f64,
        /// Total number of cells in the grid.
        cells: u64,
    },
    /// The walk could never finish because the interior is smaller than the budget.
    #[error("carve budget of {budget} tiles exceeds the {interior} interior cells")]
    BudgetExceedsInterior {
        /// Number of floor tiles requested.
        budget: u64,
        /// Number of cells off the outer border.
        interior: u64,
    },
}

/// Configuration parameters required to construct the generation system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    columns: u32,
    rows: u32,
    carve_fraction: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a validated configuration.
    ///
    /// The budget must be positive and must fit inside the interior, otherwise
    /// the walk would run forever looking for walls to carve.
    pub fn new(
        columns: u32,
        rows: u32,
        carve_fraction: f64,
        rng_seed: u64,
    ) -> Result<Self, GenerationError> {
        if columns < MIN_DIMENSION || rows < MIN_DIMENSION {
            return Err(GenerationError::TooSmall { columns, rows });
        }

        if !(carve_fraction > 0.0 && carve_fraction <= 1.0) {
            return Err(GenerationError::InvalidCarveFraction {
                fraction: carve_fraction,
            });
        }

        let cells = u64::from(columns) * u64::from(rows);
        let budget = carve_budget(columns, rows, carve_fraction);
        if budget == 0 {
            return Err(GenerationError::EmptyBudget {
                fraction: carve_fraction,
                cells,
            });
        }

        let interior = u64::from(columns - 2) * u64::from(rows - 2);
        if budget > interior {
            return Err(GenerationError::BudgetExceedsInterior { budget, interior });
        }

        Ok(Self {
            columns,
            rows,
            carve_fraction,
            rng_seed,
        })
    }

    /// Number of tile columns in generated grids.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in generated grids.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Share of the grid converted into floor.
    #[must_use]
    pub const fn carve_fraction(&self) -> f64 {
        self.carve_fraction
    }

    /// Exact number of distinct floor tiles every generated grid contains.
    #[must_use]
    pub fn carve_budget(&self) -> u64 {
        carve_budget(self.columns, self.rows, self.carve_fraction)
    }
}

/// Products are snapped to a millionth before flooring, so decimal fractions
/// such as 0.7 that have no exact binary form do not lose a tile.
const BUDGET_PRECISION: f64 = 1_000_000.0;

fn carve_budget(columns: u32, rows: u32, carve_fraction: f64) -> u64 {
    let cells = f64::from(columns) * f64::from(rows);
    let product = (cells * carve_fraction * BUDGET_PRECISION).round() / BUDGET_PRECISION;
    product.floor() as u64
}

/// Result of a single walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Carving {
    /// Grid containing only wall and floor tiles.
    pub grid: TileGrid,
    /// Cell the walk started from.
    pub start: CellCoord,
    /// Number of floor tiles carved.
    pub carved: u64,
    /// Number of cursor moves taken before the budget was met.
    pub steps: u64,
}

/// Pure system that generates dungeon grids from a seeded random stream.
#[derive(Debug)]
pub struct Generation {
    config: Config,
    rng: ChaCha8Rng,
}

impl Generation {
    /// Creates a new generation system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Carves a fresh grid, advancing the random stream.
    pub fn generate(&mut self) -> Carving {
        let carving = carve(
            self.config.columns,
            self.config.rows,
            self.config.carve_budget(),
            &mut self.rng,
        );
        debug!(
            "carved {} floor tiles in {} steps starting at {}",
            carving.carved, carving.steps, carving.start
        );
        carving
    }
}

/// Inclusive range covering the central half of an axis.
fn central_range(dimension: u32) -> (u32, u32) {
    let low = dimension.div_ceil(4);
    let high = dimension.saturating_mul(3) / 4;
    (low, high.max(low))
}

fn carve<R: Rng>(columns: u32, rows: u32, budget: u64, rng: &mut R) -> Carving {
    let mut grid = TileGrid::filled(columns, rows, Tile::Wall);

    let (column_low, column_high) = central_range(columns);
    let (row_low, row_high) = central_range(rows);
    let start = CellCoord::new(
        rng.gen_range(column_low..=column_high),
        rng.gen_range(row_low..=row_high),
    );

    let max_column = i64::from(columns) - 2;
    let max_row = i64::from(rows) - 2;
    let mut column = i64::from(start.column());
    let mut row = i64::from(start.row());
    let mut carved = 0;
    let mut steps = 0;

    while carved < budget {
        column = column.clamp(1, max_column);
        row = row.clamp(1, max_row);

        let cell = CellCoord::new(column as u32, row as u32);
        if grid.tile(cell) == Some(Tile::Wall) {
            grid.set_tile(cell, Tile::Floor);
            carved += 1;
        }

        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let (dx, dy) = direction.delta();
        column += i64::from(dx);
        row += i64::from(dy);
        steps += 1;
    }

    Carving {
        grid,
        start,
        carved,
        steps,
    }
}

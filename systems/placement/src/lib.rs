#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rejection-sampling placement of the player, the exit and the enemies.
//!
//! Every entity is placed by drawing uniform cells from the interior of the
//! grid until one satisfies its constraints. Placement runs in a fixed order
//! (player, exit, enemies) because each step avoids the cells claimed by the
//! earlier ones. Sampling is capped per entity so that a grid without enough
//! room fails with an error instead of spinning forever.

use dungeon_crawl_core::{
    CellCoord, DungeonLayout, EnemyId, EnemySnapshot, EntityKind, Tile, TileGrid,
};
use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Number of draws made for a single entity before placement gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100_000;

/// Reasons placement may fail.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// The grid does not hold one distinct floor tile per entity.
    #[error("grid holds {available} interior floor tiles but {required} entities need placing")]
    InsufficientFloor {
        /// Number of distinct cells the entities need.
        required: u64,
        /// Number of interior floor tiles in the grid.
        available: u64,
    },
    /// Sampling hit the attempt cap without finding an acceptable cell.
    #[error("no free floor tile found for {entity:?} after {attempts} attempts")]
    Exhausted {
        /// Entity that could not be placed.
        entity: EntityKind,
        /// Number of draws made.
        attempts: u32,
    },
}

/// Configuration parameters required to construct the placement system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    enemy_count: u32,
    max_attempts: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided enemy count, attempt cap and seed.
    #[must_use]
    pub const fn new(enemy_count: u32, max_attempts: u32, rng_seed: u64) -> Self {
        Self {
            enemy_count,
            max_attempts,
            rng_seed,
        }
    }

    /// Number of enemies placed per round.
    #[must_use]
    pub const fn enemy_count(&self) -> u32 {
        self.enemy_count
    }

    /// Number of draws made per entity before giving up.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Pure system that turns a generated grid into a ready-to-play layout.
#[derive(Debug)]
pub struct Placement {
    config: Config,
    rng: ChaCha8Rng,
}

impl Placement {
    /// Creates a new placement system using the supplied configuration.
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

    /// Places the player, the exit and the configured number of enemies.
    ///
    /// The grid is consumed and returned inside the layout with the exit
    /// tile marked.
    pub fn place(&mut self, mut grid: TileGrid) -> Result<DungeonLayout, PlacementError> {
        let required = u64::from(self.config.enemy_count) + 2;
        let available = grid
            .cells()
            .filter(|(cell, tile)| *tile == Tile::Floor && grid.is_interior(*cell))
            .count() as u64;
        if available < required {
            warn!("refusing to place {required} entities on {available} floor tiles");
            return Err(PlacementError::InsufficientFloor {
                required,
                available,
            });
        }

        let player = self.place_player(&grid)?;
        let exit = self.place_exit(&mut grid, player)?;
        let enemies = self.place_enemies(&grid, player, exit, self.config.enemy_count)?;

        Ok(DungeonLayout {
            grid,
            player,
            exit,
            enemies,
        })
    }

    /// Draws interior cells until one lands on floor.
    pub fn place_player(&mut self, grid: &TileGrid) -> Result<CellCoord, PlacementError> {
        self.sample(grid, EntityKind::Player, |_| true)
    }

    /// Draws a floor cell distinct from the player and marks it as the exit.
    pub fn place_exit(
        &mut self,
        grid: &mut TileGrid,
        player: CellCoord,
    ) -> Result<CellCoord, PlacementError> {
        let exit = self.sample(grid, EntityKind::Exit, |cell| cell != player)?;
        grid.set_tile(exit, Tile::Exit);
        Ok(exit)
    }

    /// Places `count` enemies with identifiers `0..count`, each on its own floor cell.
    pub fn place_enemies(
        &mut self,
        grid: &TileGrid,
        player: CellCoord,
        exit: CellCoord,
        count: u32,
    ) -> Result<Vec<EnemySnapshot>, PlacementError> {
        let mut enemies: Vec<EnemySnapshot> = Vec::new();
        for index in 0..count {
            let id = EnemyId::new(index);
            let cell = self.sample(grid, EntityKind::Enemy(id), |cell| {
                cell != player && cell != exit && enemies.iter().all(|enemy| enemy.cell != cell)
            })?;
            enemies.push(EnemySnapshot { id, cell });
        }
        Ok(enemies)
    }

    fn sample<F>(
        &mut self,
        grid: &TileGrid,
        entity: EntityKind,
        accept: F,
    ) -> Result<CellCoord, PlacementError>
    where
        F: Fn(CellCoord) -> bool,
    {
        let max_column = grid.columns().saturating_sub(2);
        let max_row = grid.rows().saturating_sub(2);
        let attempts = self.config.max_attempts();

        if max_column >= 1 && max_row >= 1 {
            for _ in 0..attempts {
                let cell = CellCoord::new(
                    self.rng.gen_range(1..=max_column),
                    self.rng.gen_range(1..=max_row),
                );
                if grid.tile(cell) == Some(Tile::Floor) && accept(cell) {
                    return Ok(cell);
                }
            }
        }

        warn!("placement of {entity:?} exhausted after {attempts} attempts");
        Err(PlacementError::Exhausted { entity, attempts })
    }
}

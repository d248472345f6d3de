#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that drives rounds of Dungeon Crawl.
//!
//! A round is prepared by carving a grid, placing the entities on it, and
//! installing the resulting layout into the authoritative world. Movement
//! intents are relayed to the world unchanged. Adapters own a [`Session`] and
//! read state back through [`Session::world`] and the world's query module.

use dungeon_crawl_core::{Command, Direction, Event, LayoutError, Tile};
use dungeon_crawl_system_generation::{self as generation, Generation, GenerationError};
use dungeon_crawl_system_placement::{self as placement, Placement, PlacementError};
use dungeon_crawl_world::{self as world, World};
use log::{info, warn};
use thiserror::Error;

/// Default number of tile columns.
pub const DEFAULT_COLUMNS: u32 = 40;
/// Default number of tile rows.
pub const DEFAULT_ROWS: u32 = 30;
/// Default number of enemies placed per round.
pub const DEFAULT_ENEMY_COUNT: u32 = 5;

const PLACEMENT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Reasons a round could not be prepared.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SessionError {
    /// The generator configuration was rejected.
    #[error("invalid generation configuration: {0}")]
    Generation(#[from] GenerationError),
    /// The entities could not be placed on the generated grid.
    #[error("could not place entities: {0}")]
    Placement(#[from] PlacementError),
    /// The world refused the generated layout.
    #[error("world rejected the generated layout: {0:?}")]
    LayoutRejected(LayoutError),
}

/// Tunable parameters for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Number of enemies placed per round.
    pub enemy_count: u32,
    /// Share of the grid carved into floor.
    pub carve_fraction: f64,
    /// Draws made per entity before placement gives up.
    pub max_placement_attempts: u32,
    /// Seed for all random streams. `None` draws one from the operating system.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            enemy_count: DEFAULT_ENEMY_COUNT,
            carve_fraction: generation::DEFAULT_CARVE_FRACTION,
            max_placement_attempts: placement::DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

/// Owns the world and the systems needed to start rounds and relay moves.
#[derive(Debug)]
pub struct Session {
    world: World,
    generation: Generation,
    placement: Placement,
    seed: u64,
}

impl Session {
    /// Validates the configuration and builds a session with no active round.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let generation_config =
            generation::Config::new(config.columns, config.rows, config.carve_fraction, seed)?;
        let placement_config = placement::Config::new(
            config.enemy_count,
            config.max_placement_attempts,
            seed ^ PLACEMENT_SEED_SALT,
        );

        Ok(Self {
            world: World::new(),
            generation: Generation::new(generation_config),
            placement: Placement::new(placement_config),
            seed,
        })
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Seed the session's random streams were derived from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Carves a new grid, places player, exit and enemies, and installs the round.
    ///
    /// All state of the previous round is discarded. On failure the previous
    /// round stays in place.
    pub fn start_new_round(&mut self) -> Result<Vec<Event>, SessionError> {
        let carving = self.generation.generate();
        let layout = self.placement.place(carving.grid).inspect_err(|error| {
            warn!("round preparation failed: {error}");
        })?;
        let floor = layout.grid.count(Tile::Floor) + layout.grid.count(Tile::Exit);

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::StartRound { layout },
            &mut events,
        );

        if let Some(Event::RoundRejected { reason }) = events.first() {
            return Err(SessionError::LayoutRejected(*reason));
        }

        info!(
            "round {} started: {}x{} grid, {} floor tiles, {} enemies",
            world::query::round(&self.world),
            self.generation.config().columns(),
            self.generation.config().rows(),
            floor,
            self.placement.config().enemy_count(),
        );
        Ok(events)
    }

    /// Relays a movement intent to the world and returns the resulting events.
    pub fn handle_move_intent(&mut self, direction: Direction) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::MovePlayer { direction },
            &mut events,
        );
        events
    }
}

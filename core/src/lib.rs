#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeon Crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Systems never mutate the world directly: the generator and the
//! placement resolver produce a [`DungeonLayout`], and the interaction engine
//! resolves moves against a read-only [`DungeonView`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Dungeon Crawl.";

/// Human readable name of the dungeon generation algorithm.
pub const ALGORITHM_NAME: &str = "Drunkard's Walk";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards the current round and installs a freshly generated layout.
    StartRound {
        /// Grid and entity positions produced by generation and placement.
        layout: DungeonLayout,
    },
    /// Requests that the player advance a single tile in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new round replaced all prior state.
    RoundStarted {
        /// Number of tile columns in the new grid.
        columns: u32,
        /// Number of tile rows in the new grid.
        rows: u32,
        /// Number of enemies placed for the round.
        enemies: u32,
    },
    /// Reports that a layout was refused because it violates placement invariants.
    RoundRejected {
        /// Specific reason the layout was refused.
        reason: LayoutError,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after the move.
        to: CellCoord,
    },
    /// Reports that a move was absorbed without changing any state.
    MoveBlocked {
        /// Direction of the refused move.
        direction: Direction,
        /// Why the move could not be performed.
        reason: BlockReason,
    },
    /// Confirms that the player defeated an enemy by entering its tile.
    EnemyDefeated {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Cell the enemy occupied.
        cell: CellCoord,
        /// Number of enemies left after the removal.
        remaining: u32,
    },
    /// Reports that the player stands on the exit while enemies remain.
    ExitBlocked {
        /// Number of enemies that still have to be defeated.
        remaining: u32,
    },
    /// Announces that the player reached the exit with every enemy defeated.
    ExitReached,
}

/// Reasons a movement request may be absorbed as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is a wall tile.
    Wall,
}

/// Entities that occupy a tile of the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The single player-controlled character.
    Player,
    /// The exit leading out of the dungeon.
    Exit,
    /// A static enemy identified within the current enemy set.
    Enemy(EnemyId),
}

/// Reasons the world may refuse to install a dungeon layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutError {
    /// An entity lies outside the grid.
    OutOfBounds {
        /// Entity that was misplaced.
        entity: EntityKind,
    },
    /// An entity sits on a wall tile.
    OnWall {
        /// Entity that was misplaced.
        entity: EntityKind,
    },
    /// Two entities share the same cell.
    Overlapping {
        /// Cell claimed by more than one entity.
        cell: CellCoord,
    },
    /// The tile at the exit position is not marked as an exit, or another tile is.
    ExitTileMismatch,
    /// Two enemies carry the same identifier.
    DuplicateEnemyId {
        /// Identifier that appeared more than once.
        enemy: EnemyId,
    },
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the order up, right, down, left.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit vector `(dx, dy)` travelled by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to an enemy within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in the given direction.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are a property of the grid and are not checked here.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Classification of a single dungeon cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Solid rock that blocks movement.
    Wall,
    /// Carved floor that entities may occupy.
    Floor,
    /// Floor tile marked as the dungeon exit.
    Exit,
}

impl Tile {
    /// Reports whether the player may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Character used when printing the tile as text.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Floor => '.',
            Self::Exit => '>',
        }
    }
}

/// Dense, row-major grid of tiles.
///
/// The shape is fixed at construction; only individual tile values change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid of the given shape with every cell set to `tile`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, tile: Tile) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![tile; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell lies inside the grid and off its outer border.
    #[must_use]
    pub fn is_interior(&self, cell: CellCoord) -> bool {
        cell.column() >= 1
            && cell.row() >= 1
            && cell.column() + 1 < self.columns
            && cell.row() + 1 < self.rows
    }

    /// Returns the tile stored at the cell, if the cell is inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Overwrites the tile at the cell. Cells outside the grid are ignored.
    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    /// Counts the cells holding the given tile.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }

    /// Iterates over every cell together with its tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let glyph = self
                    .tile(CellCoord::new(column, row))
                    .map_or(' ', Tile::glyph);
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Immutable representation of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Identifier unique within the current enemy set.
    pub id: EnemyId,
    /// Cell occupied by the enemy.
    pub cell: CellCoord,
}

/// Complete starting state for a round: the grid and every entity position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonLayout {
    /// Generated grid with the exit tile already marked.
    pub grid: TileGrid,
    /// Starting cell of the player.
    pub player: CellCoord,
    /// Cell holding the exit.
    pub exit: CellCoord,
    /// Enemies placed for the round.
    pub enemies: Vec<EnemySnapshot>,
}

/// Status line presented to the player after an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusMessage {
    /// The player defeated an enemy.
    EnemyDefeated {
        /// Enemies left after the defeat.
        remaining: u32,
    },
    /// The player reached the exit before defeating every enemy.
    ExitBlocked {
        /// Enemies that still have to be defeated.
        remaining: u32,
    },
    /// The player reached the exit with no enemies left.
    Victory,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnemyDefeated { remaining } => {
                write!(f, "You defeated an enemy! {remaining} left.")
            }
            Self::ExitBlocked { remaining } => write!(
                f,
                "The exit is sealed. Defeat all enemies first ({remaining} left)."
            ),
            Self::Victory => write!(f, "You escaped the dungeon! Victory!"),
        }
    }
}

/// Read-only view over the state the interaction engine needs to resolve a move.
#[derive(Clone, Copy, Debug)]
pub struct DungeonView<'a> {
    grid: &'a TileGrid,
    player: CellCoord,
    exit: CellCoord,
    enemies: &'a [EnemySnapshot],
}

impl<'a> DungeonView<'a> {
    /// Captures a new view over the provided state.
    #[must_use]
    pub const fn new(
        grid: &'a TileGrid,
        player: CellCoord,
        exit: CellCoord,
        enemies: &'a [EnemySnapshot],
    ) -> Self {
        Self {
            grid,
            player,
            exit,
            enemies,
        }
    }

    /// Tile grid of the current round.
    #[must_use]
    pub const fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub const fn player(&self) -> CellCoord {
        self.player
    }

    /// Cell holding the exit.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        self.exit
    }

    /// Enemies that have not been defeated yet.
    #[must_use]
    pub const fn enemies(&self) -> &'a [EnemySnapshot] {
        self.enemies
    }

    /// Returns the enemy standing on the cell, if any.
    #[must_use]
    pub fn enemy_at(&self, cell: CellCoord) -> Option<EnemyId> {
        self.enemies
            .iter()
            .find(|enemy| enemy.cell == cell)
            .map(|enemy| enemy.id)
    }
}

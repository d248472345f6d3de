#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction engine that resolves player moves.
//!
//! [`resolve`] inspects a read-only [`DungeonView`] and describes the
//! transition a move would cause without mutating anything. The world commits
//! the returned [`Resolution`] and broadcasts the matching events.

use dungeon_crawl_core::{
    BlockReason, CellCoord, Direction, DungeonView, EnemyId, StatusMessage, Tile,
};

/// Outcome of resolving a single movement intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The move is absorbed: positions, enemies, grid and message stay as they are.
    Blocked(BlockReason),
    /// The player moves onto the target cell.
    Moved(Step),
}

/// Where the player arrived relative to the exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExitArrival {
    /// Enemies remain, so the exit does not open. The player still stands on it.
    Sealed,
    /// No enemies remain and the round is won.
    Escaped,
}

/// Accepted move together with every consequence it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Cell the player leaves.
    pub from: CellCoord,
    /// Cell the player enters.
    pub to: CellCoord,
    /// Enemy removed by entering its cell, if one stood there.
    pub defeated: Option<EnemyId>,
    /// Enemies left once the move completes.
    pub remaining: u32,
    /// Exit evaluation when the target cell is the exit.
    pub exit: Option<ExitArrival>,
}

impl Step {
    /// Status message the session shows after the move.
    ///
    /// `None` clears the message.
    #[must_use]
    pub fn message(&self) -> Option<StatusMessage> {
        match self.exit {
            Some(ExitArrival::Escaped) => Some(StatusMessage::Victory),
            Some(ExitArrival::Sealed) => Some(StatusMessage::ExitBlocked {
                remaining: self.remaining,
            }),
            None => self.defeated.map(|_| StatusMessage::EnemyDefeated {
                remaining: self.remaining,
            }),
        }
    }
}

/// Resolves a one-tile move of the player in `direction`.
///
/// Moves that leave the grid or run into a wall are blocked. Otherwise the
/// player always ends up on the target cell: an enemy standing there is
/// defeated as part of the same move, and arriving on the exit is evaluated
/// against the enemies left afterwards.
#[must_use]
pub fn resolve(view: &DungeonView<'_>, direction: Direction) -> Resolution {
    let from = view.player();
    let Some(to) = from.step(direction) else {
        return Resolution::Blocked(BlockReason::OutOfBounds);
    };

    match view.grid().tile(to) {
        None => return Resolution::Blocked(BlockReason::OutOfBounds),
        Some(Tile::Wall) => return Resolution::Blocked(BlockReason::Wall),
        Some(Tile::Floor | Tile::Exit) => {}
    }

    let defeated = view.enemy_at(to);
    let alive = view.enemies().len() - usize::from(defeated.is_some());
    let remaining = u32::try_from(alive).unwrap_or(u32::MAX);

    let exit = (to == view.exit()).then_some(if remaining == 0 {
        ExitArrival::Escaped
    } else {
        ExitArrival::Sealed
    });

    Resolution::Moved(Step {
        from,
        to,
        defeated,
        remaining,
        exit,
    })
}
